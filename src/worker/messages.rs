//! Control messages posted by the application page

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message posted to the worker, tagged by `type`
///
/// ```json
/// {"type": "GET_VERSION"}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate a waiting worker without waiting for clients to close
    SkipWaiting,
    /// Reply with the worker version tag
    GetVersion,
    /// Delete every cache owned by this application
    ClearCache,
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipWaiting => write!(f, "SKIP_WAITING"),
            Self::GetVersion => write!(f, "GET_VERSION"),
            Self::ClearCache => write!(f, "CLEAR_CACHE"),
        }
    }
}

/// Reply sent back over the message's reply channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    Version { version: String },
    Done { success: bool },
}
