use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChannelPath, ColorScheme};

/// Lifecycle state for a panel within the layout.
///
/// `Removed` marks pruned panels in state-machine reasoning; it never
/// appears in layout output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    Active,
    Fading,
    Removed,
}

/// Normalised rectangle in the unit square describing panel placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Renderer-facing layout data for one channel node.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutFrame {
    pub path: ChannelPath,
    pub rect: LayoutRect,
    pub state: PanelState,
    pub weight: f64,
    pub generated_at: DateTime<Utc>,
    pub colors: ColorScheme,
}
