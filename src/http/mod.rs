//! HTTP model and network access
//!
//! The worker never talks to the network directly: every round trip goes
//! through a [`Fetcher`], so tests and alternative hosts can swap the
//! transport without touching routing.

mod fetcher;
pub(crate) mod request;
mod response;

pub use fetcher::{Fetcher, HttpFetcher};
pub use request::{Request, RequestMode};
pub use response::{Response, OFFLINE_MESSAGE};
