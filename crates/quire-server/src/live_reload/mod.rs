//! Live reload system for development mode.
//!
//! Tracks connected preview clients and pushes a reload to all of them when
//! watched source files change.

mod debouncer;
mod manager;
mod message;
mod registry;
mod websocket;

pub(crate) use manager::{DEFAULT_DEBOUNCE_MS, LiveReloadManager};
pub use message::LiveReloadMessage;
pub use registry::{
    BroadcastReport, ClientId, ClientRegistry, ClientState, PreviewClient, RegisterError,
};
pub(crate) use websocket::ws_handler;
