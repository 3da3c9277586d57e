//! Application layer: query services, repository contracts, background jobs.

pub mod artworks;
pub mod error;
pub mod jobs;
pub mod products;
pub mod repos;
