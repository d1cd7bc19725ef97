//! Player-level error taxonomy surfaced on the event feed.

use std::error::Error;
use std::fmt;

use crate::engine::EngineError;

/// Failures reported by the player. Causes are carried as strings so the
/// variants stay cloneable for broadcast delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The source name did not resolve to any playable asset.
    SourceNotFound(String),
    /// The engine reported a failure while executing a request.
    RemoteEngine(String),
    /// A queued item reached its terminal failed state.
    FailedToLoad(String),
    /// The applied settings contained duplicate option kinds. Advisory only.
    SettingsNotUnique,
    /// Picture-in-picture was requested but is unavailable.
    PipNotSupported,
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::SourceNotFound(name) => write!(f, "Source not found: {}", name),
            PlayerError::RemoteEngine(cause) => write!(f, "Engine error: {}", cause),
            PlayerError::FailedToLoad(cause) => write!(f, "Failed to load item: {}", cause),
            PlayerError::SettingsNotUnique => write!(f, "Settings contain duplicate option kinds"),
            PlayerError::PipNotSupported => write!(f, "Picture-in-picture is not supported"),
        }
    }
}

impl Error for PlayerError {}

impl From<EngineError> for PlayerError {
    fn from(err: EngineError) -> Self {
        PlayerError::RemoteEngine(err.to_string())
    }
}
