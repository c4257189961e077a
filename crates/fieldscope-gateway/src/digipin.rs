//! Grid-code encode/decode.
//!
//! The code packs the absolute coordinate, truncated to two decimal
//! places, into the `aaPbb-JKccc-ddC9` pattern: `aa.bb` is the latitude,
//! `ccc.dd` the longitude. Hemisphere signs are not carried -- the grid
//! serves the north-eastern quadrant the product targets. Decode inverts
//! the pattern exactly and rejects anything else.

/// Encode a coordinate into a grid code.
///
/// Returns `None` when the coordinate is out of range or non-finite.
#[must_use]
pub fn encode(lat: f64, lon: f64) -> Option<String> {
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }

    // "09.6310" -> "096310", "077.5945" -> "0775945".
    let lat_digits: String = format!("{:07.4}", lat.abs()).replace('.', "");
    let lon_digits: String = format!("{:08.4}", lon.abs()).replace('.', "");

    let aa = lat_digits.get(0..2)?;
    let bb = lat_digits.get(2..4)?;
    let ccc = lon_digits.get(0..3)?;
    let dd = lon_digits.get(3..5)?;

    Some(format!("{aa}P{bb}-JK{ccc}-{dd}C9"))
}

/// Decode a grid code back into `(latitude, longitude)`.
///
/// Returns `None` for anything that does not match the encode pattern
/// or decodes out of range.
#[must_use]
pub fn decode(code: &str) -> Option<(f64, f64)> {
    let rest = code.strip_suffix("C9")?;
    let mut parts = rest.split('-');
    let lat_part = parts.next()?;
    let lon_int_part = parts.next()?.strip_prefix("JK")?;
    let lon_frac_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (aa, bb) = lat_part.split_once('P')?;
    if aa.len() != 2 || bb.len() != 2 || lon_int_part.len() != 3 || lon_frac_part.len() != 2 {
        return None;
    }

    let lat: f64 = format!("{aa}.{bb}").parse().ok()?;
    let lon: f64 = format!("{lon_int_part}.{lon_frac_part}").parse().ok()?;
    if !(0.0..=90.0).contains(&lat) || !(0.0..=180.0).contains(&lon) {
        return None;
    }
    Some((lat, lon))
}
