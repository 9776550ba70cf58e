//! Repository traits describing the host content store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{CommentRecord, PostRecord};
use crate::domain::posts::{ArchivePeriod, MonthCount};
use crate::domain::types::ModerationState;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Which parent storage locations a query may read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageScope {
    /// Backend context: no location constraint.
    #[default]
    Unrestricted,
    /// Frontend context: only records below the listed locations.
    Pages(Vec<i64>),
}

/// Request-scoped state the host used to keep in ambient globals, threaded
/// explicitly so the services stay pure.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Page the request resolved to (the candidate current post).
    pub page_id: i64,
    pub language: i64,
    /// Fallback chain of the requested language, most preferred first.
    pub language_fallbacks: Vec<i64>,
    pub storage: StorageScope,
    /// Unix epoch seconds of the request.
    pub now: i64,
}

/// Typed query specification: a struct of optional filters handed to a
/// single execution function instead of a mutable query-builder object.
///
/// Every execution applies the blog-post record type, the language
/// visibility rule, the archive window at `now`, and descending
/// publish-date ordering.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub language: i64,
    pub storage: StorageScope,
    pub now: i64,
    pub author: Option<i64>,
    pub category: Option<i64>,
    pub tag: Option<i64>,
    pub period: Option<ArchivePeriod>,
    pub limit: Option<u32>,
}

impl PostQuery {
    pub fn from_context(ctx: &RequestContext) -> Self {
        Self {
            language: ctx.language,
            storage: ctx.storage.clone(),
            now: ctx.now,
            author: None,
            category: None,
            tag: None,
            period: None,
            limit: None,
        }
    }
}

/// Fields for a comment about to be persisted by intake.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_uid: i64,
    pub author_name: String,
    pub email: String,
    pub url: String,
    pub body: String,
    pub created_at: i64,
    pub status: ModerationState,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Execute a [`PostQuery`].
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError>;

    /// Unrestricted single-record lookup.
    async fn find_post(&self, uid: i64) -> Result<Option<PostRecord>, RepoError>;

    /// Resolve the post shown for `page_id` in `language`.
    ///
    /// Language `0` matches the record itself; any other language matches a
    /// translation whose parent is `page_id`. The visibility rule applies
    /// for the queried language.
    async fn post_with_language(
        &self,
        page_id: i64,
        language: i64,
    ) -> Result<Option<PostRecord>, RepoError>;

    /// Archive buckets with at least one post, newest first. Only records
    /// with positive denormalized month/year columns participate.
    async fn archive_months(&self, query: &PostQuery) -> Result<Vec<MonthCount>, RepoError>;
}

#[async_trait]
pub trait ContentWriteStore: Send + Sync {
    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, RepoError>;

    /// Persist the publish timestamp and its denormalized month/year pair.
    async fn set_publish_fields(
        &self,
        uid: i64,
        publish_date: i64,
        month: i16,
        year: i32,
    ) -> Result<(), RepoError>;
}
