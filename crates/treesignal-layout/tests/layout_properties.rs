//! Property-based tests for rectangle containment and tiling.

use chrono::{DateTime, Utc};
use proptest::collection::vec;
use proptest::prelude::*;
use treesignal_color::{AssignmentMode, ColorService, InheritanceMode};
use treesignal_layout::LayoutGenerator;
use treesignal_tree::ChannelTree;
use treesignal_types::{ChannelPath, LayoutFrame, Message, Severity};

const SEGMENTS: [&str; 3] = ["alpha", "bravo", "charlie"];
const EPSILON: f64 = 1e-9;

fn channel_name(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| SEGMENTS[i % SEGMENTS.len()])
        .collect::<Vec<_>>()
        .join(".")
}

fn message(channel: &str, received_at: DateTime<Utc>) -> Message {
    Message {
        id: "0".repeat(32),
        channel: ChannelPath::parse(channel).unwrap(),
        payload: "payload".to_string(),
        severity: Severity::Info,
        received_at,
        metadata: None,
        lifespan_seconds: 30.0,
    }
}

fn generator() -> LayoutGenerator {
    LayoutGenerator::new(ColorService::new(
        AssignmentMode::Increment,
        InheritanceMode::Unique,
    ))
}

fn populated_tree(paths: &[Vec<usize>], now: DateTime<Utc>) -> ChannelTree {
    let mut tree = ChannelTree::new();
    for path in paths {
        tree.ingest(message(&channel_name(path), now));
    }
    tree
}

/// Direct children of `parent` among the emitted frames, in frame order.
fn children_of<'a>(frames: &'a [LayoutFrame], parent: &ChannelPath) -> Vec<&'a LayoutFrame> {
    frames
        .iter()
        .filter(|frame| frame.path.parent().as_ref() == Some(parent))
        .collect()
}

proptest! {
    // Every frame stays inside the unit square, and every non-root node
    // contributes exactly one frame.
    #[test]
    fn frames_stay_inside_the_unit_square(
        paths in vec(vec(0usize..3, 1..4), 1..25),
    ) {
        let now = Utc::now();
        let mut tree = populated_tree(&paths, now);
        let frames = generator().generate(&mut tree, now);

        let node_count = tree.iter_nodes().count();
        prop_assert_eq!(frames.len(), node_count - 1);

        for frame in &frames {
            prop_assert!(frame.rect.x >= -EPSILON);
            prop_assert!(frame.rect.y >= -EPSILON);
            prop_assert!(frame.rect.width >= 0.0);
            prop_assert!(frame.rect.height >= 0.0);
            prop_assert!(frame.rect.x + frame.rect.width <= 1.0 + EPSILON);
            prop_assert!(frame.rect.y + frame.rect.height <= 1.0 + EPSILON);
        }
    }

    // Siblings tile their band contiguously: widths sum to the parent's
    // width (the whole square for top-level channels) and each child
    // starts where the previous one ended.
    #[test]
    fn sibling_bands_tile_without_gaps(
        paths in vec(vec(0usize..3, 1..4), 1..25),
    ) {
        let now = Utc::now();
        let mut tree = populated_tree(&paths, now);
        let frames = generator().generate(&mut tree, now);

        let top_level = children_of(&frames, &ChannelPath::root());
        let top_sum: f64 = top_level.iter().map(|f| f.rect.width).sum();
        prop_assert!((top_sum - 1.0).abs() < EPSILON);

        for parent in &frames {
            let children = children_of(&frames, &parent.path);
            if children.is_empty() {
                continue;
            }
            let sum: f64 = children.iter().map(|f| f.rect.width).sum();
            prop_assert!(
                (sum - parent.rect.width).abs() < EPSILON,
                "children of {} cover {} of {}",
                parent.path,
                sum,
                parent.rect.width
            );
            let mut cursor = parent.rect.x;
            for child in children {
                prop_assert!((child.rect.x - cursor).abs() < EPSILON);
                cursor += child.rect.width;
            }
        }
    }

    // Top-level siblings always split the square evenly, whatever their
    // weights.
    #[test]
    fn top_level_split_is_even(extra_weight in 1usize..6, fanout in 1usize..4) {
        let now = Utc::now();
        let mut tree = ChannelTree::new();
        for i in 0..fanout {
            tree.ingest(message(SEGMENTS[i], now));
        }
        // Pile extra weight onto the first channel; depth 0 ignores it.
        for _ in 0..extra_weight {
            tree.ingest(message(SEGMENTS[0], now));
        }

        let frames = generator().generate(&mut tree, now);
        prop_assert_eq!(frames.len(), fanout);
        for frame in &frames {
            prop_assert!((frame.rect.width - 1.0 / fanout as f64).abs() < EPSILON);
        }
    }
}
