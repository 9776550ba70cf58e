//! Cache tag derivation for tracked entity kinds.

use std::fmt;

/// Invalidation key shared by all cached renders depending on one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheTag(String);

impl CacheTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracked record kinds, each mapping 1:1 to a host table and a cache-tag
/// namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Post,
    Category,
    Author,
    Comment,
    Tag,
}

impl EntityKind {
    /// Resolve a host table name; unknown tables are untracked.
    pub fn from_table(table: &str) -> Option<Self> {
        match table {
            "pages" => Some(EntityKind::Post),
            "sys_category" => Some(EntityKind::Category),
            "tx_blog_domain_model_author" => Some(EntityKind::Author),
            "tx_blog_domain_model_comment" => Some(EntityKind::Comment),
            "tx_blog_domain_model_tag" => Some(EntityKind::Tag),
            _ => None,
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Post => "pages",
            EntityKind::Category => "sys_category",
            EntityKind::Author => "tx_blog_domain_model_author",
            EntityKind::Comment => "tx_blog_domain_model_comment",
            EntityKind::Tag => "tx_blog_domain_model_tag",
        }
    }

    fn namespace(self) -> &'static str {
        match self {
            EntityKind::Post => "tx_blog_post",
            EntityKind::Category => "tx_blog_category",
            EntityKind::Author => "tx_blog_author",
            EntityKind::Comment => "tx_blog_comment",
            EntityKind::Tag => "tx_blog_tag",
        }
    }

    pub fn cache_tag(self, uid: i64) -> CacheTag {
        CacheTag(format!("{}_{uid}", self.namespace()))
    }
}
