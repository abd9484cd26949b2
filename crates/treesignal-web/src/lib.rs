//! HTTP ingest and control surface for Tree Signal.
//!
//! Producers POST messages to hierarchical channels; the dashboard polls
//! the layout endpoint for a fresh set of treemap frames. All state is
//! process-local and serialised behind one lock.

pub mod api;
pub mod app;
pub mod cleanup;
pub mod config;
pub mod util;
