//! Worker lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a cache worker
///
/// ```text
/// installing -> installed -> activating -> activated
///      \            \             \            \
///       +------------+-------------+------------+--> redundant
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Precaching the asset manifest
    Installing,
    /// Installed and waiting for the previous worker to let go
    Installed,
    /// Purging caches of older versions
    Activating,
    /// Controlling clients and handling fetches
    Activated,
    /// Failed install or superseded; terminal
    Redundant,
}

impl WorkerState {
    /// Whether moving to `next` is a legal lifecycle step
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;
        match (self, next) {
            (Redundant, _) => false,
            (_, Redundant) => true,
            (Installing, Installed) | (Installed, Activating) | (Activating, Activated) => true,
            _ => false,
        }
    }

    /// Installed but not yet activating
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Installed)
    }

    pub fn is_controlling(&self) -> bool {
        matches!(self, Self::Activated)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}
