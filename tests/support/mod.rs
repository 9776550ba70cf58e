//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono_tz::Tz;

use foglio::application::comments::{CommentDraft, ModerationPolicy};
use foglio::application::notifications::{Messenger, NotificationEvent, Notifier};
use foglio::application::repos::{
    ContentStore, ContentWriteStore, NewComment, PostQuery, RepoError, RequestContext,
    StorageScope,
};
use foglio::cache::{CacheError, CacheTag, CacheTagIndex};
use foglio::domain::entities::{CommentRecord, PostRecord};
use foglio::domain::posts::{MonthCount, visible_in_language, within_archive_window};
use foglio::domain::types::{ModerationState, Severity};

pub const NOW: i64 = 1_750_000_000;

pub fn ctx(now: i64) -> RequestContext {
    RequestContext {
        page_id: 0,
        language: 0,
        language_fallbacks: Vec::new(),
        storage: StorageScope::Unrestricted,
        now,
    }
}

pub fn post(uid: i64) -> PostBuilder {
    PostBuilder {
        record: PostRecord {
            uid,
            pid: 1,
            title: format!("post-{uid}"),
            language: 0,
            translation_parent: 0,
            language_cfg: 0,
            // Distinct publish dates keep listing order deterministic:
            // higher uid sorts newer unless a test overrides it.
            publish_date: 1_700_000_000 + uid,
            archive_date: 0,
            publish_month: 0,
            publish_year: 0,
            categories: Vec::new(),
            tags: Vec::new(),
            authors: Vec::new(),
        },
    }
}

pub struct PostBuilder {
    record: PostRecord,
}

impl PostBuilder {
    pub fn pid(mut self, pid: i64) -> Self {
        self.record.pid = pid;
        self
    }

    pub fn language(mut self, language: i64) -> Self {
        self.record.language = language;
        self
    }

    pub fn translation_of(mut self, parent: i64) -> Self {
        self.record.translation_parent = parent;
        self
    }

    pub fn language_cfg(mut self, cfg: i16) -> Self {
        self.record.language_cfg = cfg;
        self
    }

    pub fn publish_date(mut self, publish_date: i64) -> Self {
        self.record.publish_date = publish_date;
        self
    }

    pub fn archive_date(mut self, archive_date: i64) -> Self {
        self.record.archive_date = archive_date;
        self
    }

    pub fn publish_bucket(mut self, year: i32, month: i16) -> Self {
        self.record.publish_year = year;
        self.record.publish_month = month;
        self
    }

    pub fn categories(mut self, categories: &[i64]) -> Self {
        self.record.categories = categories.to_vec();
        self
    }

    pub fn tags(mut self, tags: &[i64]) -> Self {
        self.record.tags = tags.to_vec();
        self
    }

    pub fn authors(mut self, authors: &[i64]) -> Self {
        self.record.authors = authors.to_vec();
        self
    }

    pub fn build(self) -> PostRecord {
        self.record
    }
}

/// Content store over plain vectors, mirroring the query semantics of the
/// Postgres adapter.
pub struct MemoryContentStore {
    timezone: Tz,
    posts: RwLock<Vec<PostRecord>>,
    comments: RwLock<Vec<CommentRecord>>,
    next_comment_uid: AtomicI64,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            timezone: Tz::UTC,
            posts: RwLock::new(Vec::new()),
            comments: RwLock::new(Vec::new()),
            next_comment_uid: AtomicI64::new(1),
        }
    }

    pub fn with_posts(posts: Vec<PostRecord>) -> Self {
        let store = Self::new();
        *store.posts.write().unwrap() = posts;
        store
    }

    pub fn add_post(&self, post: PostRecord) {
        self.posts.write().unwrap().push(post);
    }

    pub fn comments(&self) -> Vec<CommentRecord> {
        self.comments.read().unwrap().clone()
    }

    pub fn post(&self, uid: i64) -> Option<PostRecord> {
        self.posts
            .read()
            .unwrap()
            .iter()
            .find(|post| post.uid == uid)
            .cloned()
    }

    fn matches(&self, post: &PostRecord, query: &PostQuery) -> Result<bool, RepoError> {
        if !visible_in_language(post.language_cfg, query.language) {
            return Ok(false);
        }
        if !within_archive_window(post.archive_date, query.now) {
            return Ok(false);
        }
        if let StorageScope::Pages(pids) = &query.storage {
            if !pids.contains(&post.pid) {
                return Ok(false);
            }
        }
        if let Some(author) = query.author {
            if !post.authors.contains(&author) {
                return Ok(false);
            }
        }
        if let Some(category) = query.category {
            if !post.categories.contains(&category) {
                return Ok(false);
            }
        }
        if let Some(tag) = query.tag {
            if !post.tags.contains(&tag) {
                return Ok(false);
            }
        }
        if let Some(period) = query.period {
            let (start, end) = period
                .bounds(self.timezone)
                .map_err(|err| RepoError::invalid_input(err.to_string()))?;
            if post.publish_date < start || post.publish_date > end {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError> {
        let posts = self.posts.read().unwrap();
        let mut matched = Vec::new();
        for post in posts.iter() {
            if self.matches(post, query)? {
                matched.push(post.clone());
            }
        }
        matched.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then(b.uid.cmp(&a.uid))
        });
        if let Some(limit) = query.limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }

    async fn find_post(&self, uid: i64) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.post(uid))
    }

    async fn post_with_language(
        &self,
        page_id: i64,
        language: i64,
    ) -> Result<Option<PostRecord>, RepoError> {
        let posts = self.posts.read().unwrap();
        Ok(posts
            .iter()
            .find(|post| {
                if !visible_in_language(post.language_cfg, language) {
                    return false;
                }
                if language > 0 {
                    post.translation_parent == page_id && post.language == language
                } else {
                    post.uid == page_id
                }
            })
            .cloned())
    }

    async fn archive_months(&self, query: &PostQuery) -> Result<Vec<MonthCount>, RepoError> {
        let posts = self.posts.read().unwrap();
        let mut buckets: Vec<MonthCount> = Vec::new();
        for post in posts.iter() {
            if !self.matches(post, query)? {
                continue;
            }
            if post.publish_month <= 0 || post.publish_year <= 0 {
                continue;
            }
            match buckets
                .iter_mut()
                .find(|bucket| bucket.year == post.publish_year && bucket.month == post.publish_month)
            {
                Some(bucket) => bucket.count += 1,
                None => buckets.push(MonthCount {
                    year: post.publish_year,
                    month: post.publish_month,
                    count: 1,
                }),
            }
        }
        buckets.sort_by(|a, b| b.year.cmp(&a.year).then(b.month.cmp(&a.month)));
        Ok(buckets)
    }
}

#[async_trait]
impl ContentWriteStore for MemoryContentStore {
    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, RepoError> {
        let uid = self.next_comment_uid.fetch_add(1, Ordering::SeqCst);
        let record = CommentRecord {
            uid,
            post_uid: comment.post_uid,
            author_name: comment.author_name,
            email: comment.email,
            url: comment.url,
            body: comment.body,
            created_at: comment.created_at,
            status: comment.status,
        };
        self.comments.write().unwrap().push(record.clone());
        Ok(record)
    }

    async fn set_publish_fields(
        &self,
        uid: i64,
        publish_date: i64,
        month: i16,
        year: i32,
    ) -> Result<(), RepoError> {
        let mut posts = self.posts.write().unwrap();
        let Some(post) = posts.iter_mut().find(|post| post.uid == uid) else {
            return Err(RepoError::NotFound);
        };
        post.publish_date = publish_date;
        post.publish_month = month;
        post.publish_year = year;
        Ok(())
    }
}

/// Always returns the configured state.
pub struct FixedPolicy(pub ModerationState);

#[async_trait]
impl ModerationPolicy for FixedPolicy {
    async fn evaluate(&self, _post: &PostRecord, _draft: &CommentDraft) -> ModerationState {
        self.0
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    messages: Mutex<Vec<(String, String, Severity)>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, String, Severity)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Messenger for RecordingMessenger {
    fn enqueue(&self, title: String, body: String, severity: Severity) {
        self.messages.lock().unwrap().push((title, body, severity));
    }
}

/// Simulates an unreachable cache backend.
pub struct FailingTagIndex;

impl CacheTagIndex for FailingTagIndex {
    fn flush_by_tag(&self, _tag: &CacheTag) -> Result<(), CacheError> {
        Err(CacheError::Unavailable(
            "cache backend unreachable".to_string(),
        ))
    }
}
