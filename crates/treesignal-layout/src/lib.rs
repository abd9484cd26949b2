//! Treemap layout generation for Tree Signal.
//!
//! Walks the channel tree and emits one frame per non-root node, tiling
//! the unit square. A parent shares its allocated rectangle with its
//! descendants: the parent keeps a band across the top and the children
//! split the remainder side-by-side, so hierarchy stays visible and empty
//! ancestors shrink to a thin label band.

use chrono::{DateTime, Utc};
use treesignal_color::ColorService;
use treesignal_tree::{ChannelNode, ChannelTree};
use treesignal_types::{LayoutFrame, LayoutRect, PanelState};

/// Smallest fraction of the children band a single child may receive.
pub const DEFAULT_MIN_EXTENT: f64 = 0.02;

/// Height fraction a parent keeps when messages were published directly
/// to it.
const PARENT_BAND_WITH_HISTORY: f64 = 0.5;

/// Height fraction an empty parent keeps; the rest goes to its children.
const PARENT_BAND_EMPTY: f64 = 0.2;

/// Generates layout frames from a tree snapshot at a point in time.
///
/// Owns the colour service so panel colours stay stable across frames;
/// replacing the service resets colour assignment.
#[derive(Debug, Clone)]
pub struct LayoutGenerator {
    min_extent: f64,
    colors: ColorService,
}

impl LayoutGenerator {
    pub fn new(colors: ColorService) -> Self {
        Self {
            min_extent: DEFAULT_MIN_EXTENT,
            colors,
        }
    }

    pub fn with_min_extent(mut self, min_extent: f64) -> Self {
        self.min_extent = min_extent;
        self
    }

    pub fn colors(&self) -> &ColorService {
        &self.colors
    }

    pub fn replace_colors(&mut self, colors: ColorService) {
        self.colors = colors;
    }

    /// Produces the ordered frame list for the tree as of `now`.
    ///
    /// Expired messages and stale empty leaves are cleaned up first so the
    /// output never shows dead panels. Deterministic for a fixed tree,
    /// time, and colour-service state; frames appear in depth-first order,
    /// parent band before its children.
    pub fn generate(&mut self, tree: &mut ChannelTree, now: DateTime<Utc>) -> Vec<LayoutFrame> {
        tree.cleanup_expired(now);

        let mut frames = Vec::new();
        if !tree.root().has_children() {
            return frames;
        }
        let unit = LayoutRect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        };
        let children: Vec<&ChannelNode> = tree.root().children().collect();
        self.tile_children(tree, &children, unit, 0, now, &mut frames);
        frames
    }

    /// Tiles `children` across `area` horizontally. Depth 0 ignores node
    /// weights so top-level siblings stay balanced; below that, widths
    /// are weight-proportional with a floor of `min_extent`, and the last
    /// child absorbs the exact remainder so the band tiles without gaps.
    fn tile_children(
        &mut self,
        tree: &ChannelTree,
        children: &[&ChannelNode],
        area: LayoutRect,
        depth: usize,
        now: DateTime<Utc>,
        frames: &mut Vec<LayoutFrame>,
    ) {
        let weights: Vec<f64> = children
            .iter()
            .map(|child| {
                if depth == 0 || child.weight() <= 0.0 {
                    1.0
                } else {
                    child.weight()
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let mut cursor = area.x;
        let end = area.x + area.width;
        for (index, child) in children.iter().enumerate() {
            let remaining = (end - cursor).max(0.0);
            let width = if index + 1 == children.len() {
                remaining
            } else {
                // The floor keeps tiny children visible; the clamp keeps a
                // crowded band inside its parent rectangle.
                (area.width * weights[index] / total)
                    .max(self.min_extent)
                    .min(remaining)
            };
            let rect = LayoutRect {
                x: cursor,
                y: area.y,
                width,
                height: area.height,
            };
            self.place_node(tree, child, rect, depth, now, frames);
            cursor += width;
        }
    }

    /// Emits the frame(s) for one node within its allocated rectangle.
    fn place_node(
        &mut self,
        tree: &ChannelTree,
        node: &ChannelNode,
        rect: LayoutRect,
        depth: usize,
        now: DateTime<Utc>,
        frames: &mut Vec<LayoutFrame>,
    ) {
        if !node.has_children() {
            frames.push(self.frame_for(node, rect, now));
            return;
        }

        let band_fraction = if tree.history_len(node.path()) > 0 {
            PARENT_BAND_WITH_HISTORY
        } else {
            PARENT_BAND_EMPTY
        };
        let band = LayoutRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height * band_fraction,
        };
        frames.push(self.frame_for(node, band, now));

        let rest = LayoutRect {
            x: rect.x,
            y: rect.y + band.height,
            width: rect.width,
            height: rect.height - band.height,
        };
        let children: Vec<&ChannelNode> = node.children().collect();
        self.tile_children(tree, &children, rest, depth + 1, now, frames);
    }

    fn frame_for(&mut self, node: &ChannelNode, rect: LayoutRect, now: DateTime<Utc>) -> LayoutFrame {
        let state = match node.fade_deadline() {
            Some(deadline) if now >= deadline => PanelState::Fading,
            _ => PanelState::Active,
        };
        LayoutFrame {
            path: node.path().clone(),
            rect,
            state,
            weight: node.weight(),
            generated_at: now,
            colors: self.colors.scheme_for_channel(node.path()),
        }
    }
}
