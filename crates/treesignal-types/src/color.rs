use serde::{Deserialize, Serialize};

/// Monochromatic palette derived from a single hue.
///
/// All four colours are lowercase `#rrggbb` strings on a shared hue, from
/// dark background to bright highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Base hue in degrees, `0..360`.
    pub hue: u16,
    pub background: String,
    pub border: String,
    pub normal: String,
    pub highlight: String,
}
