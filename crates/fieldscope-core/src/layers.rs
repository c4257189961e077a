//! Single-active-layer state machine.

use fieldscope_types::Layer;
use tracing::debug;

/// Tracks which visualization layer is armed. Exactly one value is
/// active at any instant; [`Layer::None`] is the valid "nothing armed"
/// state.
#[derive(Debug, Default)]
pub struct LayerSelector {
    active: Layer,
}

impl LayerSelector {
    /// Selector starting with no layer armed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: Layer::None,
        }
    }

    /// Activate `layer`, deactivating whatever was active before.
    ///
    /// Returns the previously active layer so the caller can tear down
    /// its panel.
    pub fn toggle(&mut self, layer: Layer) -> Layer {
        let previous = std::mem::replace(&mut self.active, layer);
        debug!(from = ?previous, to = ?layer, "layer toggled");
        previous
    }

    /// The currently active layer.
    #[must_use]
    pub const fn current(&self) -> Layer {
        self.active
    }
}
