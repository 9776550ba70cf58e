//! Tag-based cache invalidation.
//!
//! Every entity that can affect rendered output owns exactly one cache tag
//! (`tx_blog_post_42`, `tx_blog_category_7`, …). Cached entries declare the
//! tags they depend on; flushing a tag evicts every dependent entry.

mod index;
mod store;
mod tags;

use thiserror::Error;

pub use index::{CacheTagIndex, MemoryTagIndex};
pub use store::CachedEntry;
pub use tags::{CacheTag, EntityKind};

/// Cache failures are loud: a silently stale cache is worse than a
/// surfaced error, so nothing in this crate swallows one.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}
