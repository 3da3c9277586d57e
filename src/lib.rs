//! Atelier: content server for an artist's gallery site.
//!
//! Serves the artwork catalog and its sellable products over a JSON API,
//! fronted by an in-process read-through cache. A cron worker periodically
//! rebuilds the cache and reconciles each artwork's persisted content hash.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
