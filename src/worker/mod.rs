//! Offline cache manager
//!
//! Lifecycle, request routing and caching strategies for one deployment
//! version of the application shell, plus the registration that decides
//! which version is in control.

pub mod clients;
mod manager;
pub mod messages;
mod notify;
pub mod registration;
pub mod routing;
pub mod state;
mod strategy;

pub use clients::{Clients, HeadlessClients, Notification, WindowClient};
pub use manager::{ActivateReport, CacheWorker, InstallReport, WorkerSettings};
pub use messages::{ControlMessage, ControlReply};
pub use notify::{ClickOutcome, PushPayload};
pub use registration::{InstallOutcome, Registration, RegistrationRecord, WorkerRecord};
pub use routing::{Route, Router};
pub use state::WorkerState;
