//! Blog content core for CMS hosts.
//!
//! foglio keeps posts, categories, tags, authors and comments as host CMS
//! records and answers the content questions around them: scoped and
//! filtered post listings, current-post resolution with language fallback,
//! related-post ranking by shared categories and tags, comment intake with
//! moderation, and tag-based cache invalidation on every tracked write.
//!
//! The crate is invoked in-process by the host; it defines no network
//! surface of its own. Collaborators the host provides (content store,
//! cache tag index, moderation policy, notification fan-out, flash
//! messages, translation) are trait seams under [`application`] and
//! [`cache`], with a Postgres content store adapter in [`infra::db`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
