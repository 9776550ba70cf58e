//! Domain entities mirrored from the host content store.
//!
//! Identities are host-assigned integer uids; timestamps are unix epoch
//! seconds with `0` as the "unset" sentinel, exactly as the host stores them.

use serde::Serialize;

use crate::domain::types::ModerationState;

/// A blog post: a page record carrying blog-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub uid: i64,
    /// Parent storage location.
    pub pid: i64,
    pub title: String,
    /// Language this record is written in (`0` = site default).
    pub language: i64,
    /// For translated records, the uid of the default-language original.
    pub translation_parent: i64,
    /// Host visibility bitmask; see [`crate::domain::posts::visible_in_language`].
    pub language_cfg: i16,
    pub publish_date: i64,
    /// `0` means the post never archives.
    pub archive_date: i64,
    pub publish_month: i16,
    pub publish_year: i32,
    pub categories: Vec<i64>,
    pub tags: Vec<i64>,
    pub authors: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecord {
    pub uid: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub uid: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub uid: i64,
    pub name: String,
    pub email: String,
}

/// A visitor comment, created by intake and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub uid: i64,
    pub post_uid: i64,
    pub author_name: String,
    pub email: String,
    pub url: String,
    pub body: String,
    pub created_at: i64,
    pub status: ModerationState,
}
