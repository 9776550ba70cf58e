//! Comment intake: normalization, moderation, persistence and the
//! follow-up side effects (message, notification, cache flush).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::application::error::AppError;
use crate::application::notifications::{Messenger, NotificationEvent, Notifier, Translator};
use crate::application::repos::{ContentWriteStore, NewComment, RequestContext};
use crate::cache::{CacheTagIndex, EntityKind};
use crate::config::CommentSettings;
use crate::domain::entities::PostRecord;
use crate::domain::types::{ModerationState, Severity};

/// Raw submitted form fields. Absent fields deserialize to `None` and
/// normalize to empty strings; a missing field is never an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub body: Option<String>,
}

impl CommentFields {
    /// Trim every field and strip markup from the body.
    pub fn normalize(self) -> CommentDraft {
        let body = self.body.unwrap_or_default();
        let body = ammonia::Builder::empty().clean(&body).to_string();
        CommentDraft {
            name: self.name.unwrap_or_default().trim().to_string(),
            email: self.email.unwrap_or_default().trim().to_string(),
            url: self.url.unwrap_or_default().trim().to_string(),
            body: body.trim().to_string(),
        }
    }
}

/// Normalized comment content handed to the moderation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub name: String,
    pub email: String,
    pub url: String,
    pub body: String,
}

impl CommentDraft {
    /// The author-supplied website, when it parses as an absolute http(s)
    /// URL. An empty field is simply absent.
    pub fn website(&self) -> Option<Url> {
        if self.url.is_empty() {
            return None;
        }
        Url::parse(&self.url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }
}

/// Decides the publication state of a submitted comment.
#[async_trait]
pub trait ModerationPolicy: Send + Sync {
    async fn evaluate(&self, post: &PostRecord, draft: &CommentDraft) -> ModerationState;
}

/// Built-in policy: empty bodies are rejected, suspicious websites and
/// moderated sites queue for review, everything else publishes.
pub struct StandardPolicy {
    require_moderation: bool,
}

impl StandardPolicy {
    pub fn new(require_moderation: bool) -> Self {
        Self { require_moderation }
    }

    pub fn from_settings(settings: &CommentSettings) -> Self {
        Self::new(settings.require_moderation)
    }
}

#[async_trait]
impl ModerationPolicy for StandardPolicy {
    async fn evaluate(&self, _post: &PostRecord, draft: &CommentDraft) -> ModerationState {
        if draft.body.is_empty() {
            return ModerationState::Error;
        }
        if !draft.url.is_empty() && draft.website().is_none() {
            return ModerationState::PendingModeration;
        }
        if self.require_moderation {
            ModerationState::PendingModeration
        } else {
            ModerationState::Published
        }
    }
}

/// Flash-message keys and severity per moderation outcome.
fn message_for(state: ModerationState) -> (&'static str, &'static str, Severity) {
    match state {
        ModerationState::Error => (
            "message.addComment.error.title",
            "message.addComment.error.text",
            Severity::Error,
        ),
        ModerationState::PendingModeration => (
            "message.addComment.moderation.title",
            "message.addComment.moderation.text",
            Severity::Info,
        ),
        ModerationState::Published => (
            "message.addComment.success.title",
            "message.addComment.success.text",
            Severity::Ok,
        ),
    }
}

pub struct CommentIntake {
    store: Arc<dyn ContentWriteStore>,
    policy: Arc<dyn ModerationPolicy>,
    notifier: Arc<dyn Notifier>,
    messenger: Arc<dyn Messenger>,
    translator: Arc<dyn Translator>,
    cache: Arc<dyn CacheTagIndex>,
}

impl CommentIntake {
    pub fn new(
        store: Arc<dyn ContentWriteStore>,
        policy: Arc<dyn ModerationPolicy>,
        notifier: Arc<dyn Notifier>,
        messenger: Arc<dyn Messenger>,
        translator: Arc<dyn Translator>,
        cache: Arc<dyn CacheTagIndex>,
    ) -> Self {
        Self {
            store,
            policy,
            notifier,
            messenger,
            translator,
            cache,
        }
    }

    /// Accept a submitted comment for `post` and return its decided state.
    ///
    /// A rejected comment (`Error`) leaves no trace beyond the queued
    /// message. Any other state persists exactly one comment stamped at
    /// `ctx.now`, dispatches exactly one notification and flushes the
    /// post's cache tag once. Identical resubmissions create independent
    /// comments; there is no deduplication.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        post: &PostRecord,
        fields: CommentFields,
    ) -> Result<ModerationState, AppError> {
        let draft = fields.normalize();
        let state = self.policy.evaluate(post, &draft).await;

        let (title_key, text_key, severity) = message_for(state);
        self.messenger.enqueue(
            self.translator.translate(title_key),
            self.translator.translate(text_key),
            severity,
        );

        if state == ModerationState::Error {
            debug!(post_uid = post.uid, "comment rejected by moderation policy");
            return Ok(state);
        }

        let comment = self
            .store
            .insert_comment(NewComment {
                post_uid: post.uid,
                author_name: draft.name,
                email: draft.email,
                url: draft.url,
                body: draft.body,
                created_at: ctx.now,
                status: state,
            })
            .await?;

        self.notifier
            .notify(NotificationEvent::CommentAdded {
                comment,
                post: post.clone(),
            })
            .await;

        self.cache
            .flush_by_tag(&EntityKind::Post.cache_tag(post.uid))?;

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_normalize_to_empty_strings() {
        let draft = CommentFields::default().normalize();
        assert_eq!(draft.name, "");
        assert_eq!(draft.email, "");
        assert_eq!(draft.url, "");
        assert_eq!(draft.body, "");
    }

    #[test]
    fn body_markup_is_stripped() {
        let fields = CommentFields {
            body: Some("<script>alert(1)</script> nice <b>post</b>".to_string()),
            ..CommentFields::default()
        };
        assert_eq!(fields.normalize().body, "nice post");
    }

    #[test]
    fn website_requires_an_absolute_http_url() {
        let mut draft = CommentFields::default().normalize();
        draft.url = "https://example.org/blog".to_string();
        assert!(draft.website().is_some());

        draft.url = "javascript:alert(1)".to_string();
        assert!(draft.website().is_none());

        draft.url = "not a url".to_string();
        assert!(draft.website().is_none());
    }

    #[tokio::test]
    async fn standard_policy_rejects_empty_bodies() {
        let post = crate::domain::entities::PostRecord {
            uid: 1,
            pid: 1,
            title: String::new(),
            language: 0,
            translation_parent: 0,
            language_cfg: 0,
            publish_date: 0,
            archive_date: 0,
            publish_month: 0,
            publish_year: 0,
            categories: vec![],
            tags: vec![],
            authors: vec![],
        };
        let policy = StandardPolicy::new(false);

        let empty = CommentFields::default().normalize();
        assert_eq!(policy.evaluate(&post, &empty).await, ModerationState::Error);

        let fields = CommentFields {
            body: Some("a real comment".to_string()),
            ..CommentFields::default()
        };
        assert_eq!(
            policy.evaluate(&post, &fields.normalize()).await,
            ModerationState::Published
        );

        let moderated = StandardPolicy::from_settings(&CommentSettings::default());
        let fields = CommentFields {
            body: Some("a real comment".to_string()),
            ..CommentFields::default()
        };
        assert_eq!(
            moderated.evaluate(&post, &fields.normalize()).await,
            ModerationState::PendingModeration
        );
    }

    #[test]
    fn message_keys_follow_the_state() {
        assert_eq!(
            message_for(ModerationState::Error).2,
            Severity::Error
        );
        assert_eq!(
            message_for(ModerationState::PendingModeration),
            (
                "message.addComment.moderation.title",
                "message.addComment.moderation.text",
                Severity::Info
            )
        );
        assert_eq!(
            message_for(ModerationState::Published).2,
            Severity::Ok
        );
    }
}
