//! Messages pushed to live reload clients.

use serde::{Deserialize, Serialize};

/// Server-to-client live reload message.
///
/// Serialized as a JSON object tagged by `command`:
///
/// - `{"command": "info", "url": "/guide"}` (handshake, once per connection)
/// - `{"command": "reload"}` (full page refresh)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum LiveReloadMessage {
    /// Handshake confirming the URL the client watches.
    Info {
        /// Watched URL.
        url: String,
    },
    /// Watched content changed; reload the page.
    Reload,
}

impl LiveReloadMessage {
    /// Encode as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
