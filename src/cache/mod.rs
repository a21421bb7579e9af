//! Versioned response caches
//!
//! Responses are stored in named caches keyed by normalized GET requests.
//! Each deployment version owns two caches; activation of a new version
//! purges every other cache in the namespace.
//!
//! # Cache Names
//!
//! | Kind | Name | Filled by |
//! |------|------|-----------|
//! | Static | `{namespace}-static-{version}` | install, cache-first misses and refreshes |
//! | Dynamic | `{namespace}-dynamic-{version}` | network-first successes |

pub mod disk;
pub mod key;
pub mod manifest;
pub mod memory;
pub mod name;
pub mod storage;

pub use disk::DiskStorage;
pub use key::CacheKey;
pub use manifest::{AssetManifest, ManifestEntry};
pub use memory::MemoryStorage;
pub use name::{CacheKind, CacheNames};
pub use storage::CacheStorage;
