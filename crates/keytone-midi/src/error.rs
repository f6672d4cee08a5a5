//! Error types for device operations.

use thiserror::Error;

/// Boxed error from a device backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors a [`MidiDevice`](crate::MidiDevice) reports while connecting or
/// disconnecting.
///
/// Connect failures are returned to the caller of
/// [`DeviceRegistry::attach`](crate::DeviceRegistry::attach). Disconnect
/// failures are logged and swallowed by the registry.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The backend refused the connection.
    #[error("failed to connect MIDI device '{device}': {source}")]
    Connect {
        /// Device name.
        device: String,
        /// Backend error.
        #[source]
        source: BackendError,
    },

    /// The backend failed to release the connection.
    #[error("failed to disconnect MIDI device '{device}': {source}")]
    Disconnect {
        /// Device name.
        device: String,
        /// Backend error.
        #[source]
        source: BackendError,
    },

    /// No port or device matched the request.
    #[error("MIDI device not found: {0}")]
    NotFound(String),
}
