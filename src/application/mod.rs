//! Application services layer.

pub mod comments;
pub mod error;
pub mod metadata;
pub mod mutations;
pub mod notifications;
pub mod posts;
pub mod related;
pub mod repos;
