//! Read-through artwork cache.
//!
//! The store is the source of truth; everything here is a disposable
//! accelerator. Dropping the whole cache costs one cold lookup per key,
//! never data.

mod config;
pub mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use store::{ArtworkCache, CacheError, CachedValue, MemoryCache};
