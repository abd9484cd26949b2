//! Core domain types for Tree Signal.
//!
//! Shared by the channel tree, the layout generator, the colour service,
//! and the HTTP surface. Everything here is plain data; behaviour lives in
//! the sibling crates.

mod color;
mod layout;
mod message;
mod path;

pub use color::ColorScheme;
pub use layout::{LayoutFrame, LayoutRect, PanelState};
pub use message::{DEFAULT_LIFESPAN_SECONDS, InvalidSeverity, Message, Severity};
pub use path::{ChannelPath, ChannelPathError};
