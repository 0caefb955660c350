//! Catalog Cache - catalog REST backend with an embedded read-through cache
//!
//! Reads of users, books, authors and genres are served from an in-process
//! TTL cache and repopulated from the backing store on miss. Every committed
//! write deletes the cache keys it made stale.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheKey, CacheStore, EntityKind, Invalidator, Mutation, ReadThrough};
pub use catalog::{CatalogRepository, CatalogService, MemoryRepository};
pub use config::Config;
