//! In-memory channel tree for Tree Signal.
//!
//! Maintains the hierarchical channel state the layout engine renders:
//! per-node weights accumulated on ingest, last-message timestamps, fade
//! deadlines derived from the hold/decay configuration, bounded per-channel
//! message history, and subtree pruning with upward weight accounting.
//!
//! The tree is process-local and volatile. All mutation is expected to run
//! under the owning service's lock; operations here are CPU-bound and never
//! block.

use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use treesignal_types::{ChannelPath, Message};

/// History capacity per channel when none is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// How long an empty, childless node survives before stale-leaf cleanup
/// may prune it, in seconds.
const EMPTY_NODE_GRACE_SECONDS: i64 = 10;

const DEFAULT_HOLD_SECONDS: i64 = 10;
const DEFAULT_DECAY_SECONDS: i64 = 5;

// ── Errors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    PruneRoot,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PruneRoot => write!(f, "cannot prune the synthetic root"),
        }
    }
}

impl Error for TreeError {}

// ── Nodes ───────────────────────────────────────────────────────

/// Runtime state at one channel path.
#[derive(Debug, Clone)]
pub struct ChannelNode {
    path: ChannelPath,
    weight: f64,
    last_message_at: Option<DateTime<Utc>>,
    fade_deadline: Option<DateTime<Utc>>,
    locked: bool,
    created_at: DateTime<Utc>,
    children: IndexMap<String, ChannelNode>,
}

impl ChannelNode {
    fn new(path: ChannelPath, created_at: DateTime<Utc>) -> Self {
        Self {
            path,
            weight: 0.0,
            last_message_at: None,
            fade_deadline: None,
            locked: false,
            created_at,
            children: IndexMap::new(),
        }
    }

    pub fn path(&self) -> &ChannelPath {
        &self.path
    }

    /// Activity scalar, never negative.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn last_message_at(&self) -> Option<DateTime<Utc>> {
        self.last_message_at
    }

    /// Past this instant the panel renders as fading.
    pub fn fade_deadline(&self) -> Option<DateTime<Utc>> {
        self.fade_deadline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Locked nodes are exempt from decay scheduling and stale-leaf
    /// cleanup. There is no public API to set this; it is an internal
    /// capability.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, segment: &str) -> Option<&ChannelNode> {
        self.children.get(segment)
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &ChannelNode> {
        self.children.values()
    }

    /// Records a message arrival: weight gains `delta` (floored at zero)
    /// and the last-message timestamp advances, never regresses.
    fn touch(&mut self, timestamp: DateTime<Utc>, delta: f64) {
        self.weight = (self.weight + delta).max(0.0);
        self.last_message_at = Some(match self.last_message_at {
            Some(previous) => previous.max(timestamp),
            None => timestamp,
        });
    }

    fn schedule_fade(&mut self, hold: TimeDelta, decay: TimeDelta) {
        if let Some(last) = self.last_message_at {
            self.fade_deadline = Some(last + hold + decay);
        }
    }
}

// ── Tree ────────────────────────────────────────────────────────

/// The channel tree: a synthetic root, per-node state, and per-channel
/// bounded history.
#[derive(Debug, Clone)]
pub struct ChannelTree {
    root: ChannelNode,
    hold: TimeDelta,
    decay: TimeDelta,
    history: HashMap<ChannelPath, VecDeque<Message>>,
    history_capacity: usize,
}

impl Default for ChannelTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelTree {
    pub fn new() -> Self {
        Self {
            root: ChannelNode::new(ChannelPath::root(), Utc::now()),
            hold: TimeDelta::seconds(DEFAULT_HOLD_SECONDS),
            decay: TimeDelta::seconds(DEFAULT_DECAY_SECONDS),
            history: HashMap::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn root(&self) -> &ChannelNode {
        &self.root
    }

    /// Ingests a message with the default weight delta of 1.
    pub fn ingest(&mut self, message: Message) {
        self.ingest_weighted(message, 1.0);
    }

    /// Walks the message's path from the root, creating missing nodes, and
    /// adds `delta` to every node along the way (root included). Non-root
    /// nodes get a fresh fade deadline. The message lands in the bounded
    /// history for its full path.
    ///
    /// `delta <= 0` is permitted; weights floor at zero and timestamps
    /// still advance.
    pub fn ingest_weighted(&mut self, message: Message, delta: f64) {
        let timestamp = message.received_at;
        let (hold, decay) = (self.hold, self.decay);

        self.root.touch(timestamp, delta);
        let mut node = &mut self.root;
        for (index, segment) in message.channel.segments().iter().enumerate() {
            let child_path = message.channel.prefix(index + 1);
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| ChannelNode::new(child_path, timestamp));
            node.touch(timestamp, delta);
            node.schedule_fade(hold, decay);
        }

        let queue = self.history.entry(message.channel.clone()).or_default();
        queue.push_back(message);
        while queue.len() > self.history_capacity {
            queue.pop_front();
        }
    }

    /// Updates the hold/decay durations used for future fade scheduling.
    /// Existing deadlines are untouched until the next ingest or
    /// [`Self::schedule_decay`].
    pub fn configure_decay(&mut self, hold: TimeDelta, decay: TimeDelta) {
        self.hold = hold;
        self.decay = decay;
    }

    /// Recomputes the fade deadline of every unlocked node that has seen a
    /// message. Weights are not modified.
    pub fn schedule_decay(&mut self) {
        fn visit(node: &mut ChannelNode, hold: TimeDelta, decay: TimeDelta) {
            if !node.locked && node.last_message_at.is_some() {
                node.schedule_fade(hold, decay);
            }
            for child in node.children.values_mut() {
                visit(child, hold, decay);
            }
        }
        let (hold, decay) = (self.hold, self.decay);
        visit(&mut self.root, hold, decay);
    }

    /// Drops expired history entries, then prunes stale empty leaves.
    ///
    /// History queues lose leading messages whose expiry has passed; the
    /// queue key survives even when emptied. A non-root node with no
    /// children, no remaining history, and a creation time older than the
    /// grace interval is pruned through the normal prune path so weight
    /// accounting holds. Nodes with children are never pruned here.
    ///
    /// Idempotent for a fixed `now`.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>) {
        for queue in self.history.values_mut() {
            while queue.front().is_some_and(|message| message.expires_at() <= now) {
                queue.pop_front();
            }
        }

        let grace = TimeDelta::seconds(EMPTY_NODE_GRACE_SECONDS);
        loop {
            let mut stale: Vec<ChannelPath> = Vec::new();
            collect_stale(&self.root, &self.history, now, grace, &mut stale);
            if stale.is_empty() {
                break;
            }
            // Longest paths first; ancestors left childless by this round
            // are picked up on the next until the tree is stable.
            stale.sort_by(|a, b| b.depth().cmp(&a.depth()));
            for path in stale {
                let _ = self.prune(&path);
            }
        }
    }

    /// Detaches the subtree at `path`, subtracts its weight from every
    /// ancestor (floored at zero), and drops history for the subtree's
    /// paths. Missing paths are a no-op; the root cannot be pruned.
    pub fn prune(&mut self, path: &ChannelPath) -> Result<(), TreeError> {
        if path.is_root() {
            return Err(TreeError::PruneRoot);
        }
        let parent_path = path.parent().unwrap_or_else(ChannelPath::root);
        let Some(segment) = path.last() else {
            return Err(TreeError::PruneRoot);
        };
        let Some(parent) = self.node_mut(&parent_path) else {
            return Ok(());
        };
        let Some(removed) = parent.children.shift_remove(segment) else {
            return Ok(());
        };

        let delta = removed.weight;
        let mut node = &mut self.root;
        node.weight = (node.weight - delta).max(0.0);
        for segment in parent_path.segments() {
            match node.children.get_mut(segment) {
                Some(child) => node = child,
                None => break,
            }
            node.weight = (node.weight - delta).max(0.0);
        }

        self.history.retain(|key, _| !key.starts_with(path));
        Ok(())
    }

    pub fn get_node(&self, path: &ChannelPath) -> Option<&ChannelNode> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &ChannelPath) -> Option<&mut ChannelNode> {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }

    /// Recent messages for a channel, oldest first. Empty for unknown
    /// paths.
    pub fn history(&self, path: &ChannelPath) -> impl Iterator<Item = &Message> {
        self.history.get(path).into_iter().flatten()
    }

    pub fn history_len(&self, path: &ChannelPath) -> usize {
        self.history.get(path).map_or(0, VecDeque::len)
    }

    /// Depth-first iteration, root first, children in insertion order.
    /// Yielded references are read-only for the duration of the walk.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &ChannelNode> {
        NodeIter {
            stack: vec![&self.root],
        }
    }
}

fn collect_stale(
    node: &ChannelNode,
    history: &HashMap<ChannelPath, VecDeque<Message>>,
    now: DateTime<Utc>,
    grace: TimeDelta,
    stale: &mut Vec<ChannelPath>,
) {
    for child in node.children.values() {
        if child.children.is_empty() {
            let empty = history.get(&child.path).is_none_or(VecDeque::is_empty);
            if empty && !child.locked && now.signed_duration_since(child.created_at) > grace {
                stale.push(child.path.clone());
            }
        } else {
            collect_stale(child, history, now, grace, stale);
        }
    }
}

struct NodeIter<'a> {
    stack: Vec<&'a ChannelNode>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a ChannelNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.values().rev());
        Some(node)
    }
}
