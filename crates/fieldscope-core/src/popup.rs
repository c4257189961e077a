//! Panel visibility under layer-group mutual exclusion.

use std::collections::BTreeMap;

use fieldscope_types::{PanelBody, PanelCategory};
use tracing::debug;

/// Visibility and payload of a single panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    /// Whether the panel is shown.
    pub visible: bool,
    /// What the panel displays.
    pub body: PanelBody,
}

/// Maps panel categories to visible state.
///
/// The layer-group categories (weather, flood, NDVI, soil) are mutually
/// exclusive: opening one closes the others in the same call, so observed
/// state never has two of them visible. The activity panels toggle
/// independently of the group and of each other.
#[derive(Debug, Default)]
pub struct PopupManager {
    panels: BTreeMap<PanelCategory, PanelState>,
}

impl PopupManager {
    /// Manager with every panel hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `category` with `body`.
    ///
    /// For a layer-group category every other group member is closed
    /// first; independent categories leave the rest untouched.
    pub fn open(&mut self, category: PanelCategory, body: PanelBody) {
        if category.in_layer_group() {
            self.panels.retain(|cat, _| !cat.in_layer_group());
        }
        debug!(panel = ?category, "panel opened");
        self.panels.insert(
            category,
            PanelState {
                visible: true,
                body,
            },
        );
    }

    /// Hide `category` and clear its payload.
    pub fn close(&mut self, category: PanelCategory) {
        self.panels.remove(&category);
    }

    /// Flip visibility of an independent panel. Layer-group categories
    /// go through [`PopupManager::open`] with a payload instead.
    pub fn toggle_independent(&mut self, category: PanelCategory) {
        if category.in_layer_group() {
            return;
        }
        if self.is_visible(category) {
            self.close(category);
        } else {
            self.open(category, PanelBody::Empty);
        }
    }

    /// Replace the body of `category` if it is currently visible.
    pub fn set_body(&mut self, category: PanelCategory, body: PanelBody) {
        if let Some(state) = self.panels.get_mut(&category) {
            state.body = body;
        }
    }

    /// Whether `category` is visible.
    #[must_use]
    pub fn is_visible(&self, category: PanelCategory) -> bool {
        self.panels.get(&category).is_some_and(|s| s.visible)
    }

    /// The body shown in `category`, [`PanelBody::Empty`] when hidden.
    #[must_use]
    pub fn body(&self, category: PanelCategory) -> PanelBody {
        self.panels
            .get(&category)
            .map_or(PanelBody::Empty, |s| s.body.clone())
    }

    /// The visible layer-group panel, if any. By construction there is
    /// at most one.
    #[must_use]
    pub fn visible_layer_panel(&self) -> Option<PanelCategory> {
        self.panels
            .iter()
            .find(|(cat, state)| cat.in_layer_group() && state.visible)
            .map(|(cat, _)| *cat)
    }

    /// Snapshot of all panel states.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PanelCategory, PanelState> {
        self.panels.clone()
    }
}
