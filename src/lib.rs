//! shellcache - offline cache manager for the Hair & Makeup Pro shell
//!
//! Precaches the application shell at install, purges caches of older
//! versions at activation, and answers every intercepted request from the
//! network or the cache according to its route.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod ui;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ShellCacheError, ShellCacheResult};
