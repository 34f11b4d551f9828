// Error taxonomy shared by the process and sync subsystems

use thiserror::Error;

/// Errors raised by the core subsystems.
///
/// Recovery policy differs by call site rather than by variant: an
/// `Execution` error from process enumeration fails the whole call, while
/// the same variant from a signal send is logged and swallowed because the
/// reaper's success criterion is the follow-up re-check.
#[derive(Debug, Error)]
pub enum Error {
    /// An external command primitive failed (spawn error, nonzero exit,
    /// or output that could not be interpreted).
    #[error("command `{command}` failed: {detail}")]
    Execution { command: String, detail: String },

    /// An inbound payload could not be decoded as a flat string mapping.
    /// The payload is dropped; the connection stays up.
    #[error("malformed message payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A send was attempted on a connection that is no longer open.
    /// Isolated per recipient during broadcast.
    #[error("connection closed before message could be delivered")]
    Delivery,
}

impl Error {
    /// Build an `Execution` error for the given command text.
    pub fn execution(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Execution {
            command: command.into(),
            detail: detail.into(),
        }
    }
}
