//! Write-time invalidation hook, invoked by the host's persistence layer
//! after a record is inserted or updated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono_tz::Tz;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::repos::{ContentStore, ContentWriteStore};
use crate::cache::{CacheTagIndex, EntityKind};
use crate::domain::posts::publish_parts;

/// Identity of a freshly written record. Newly created records carry a
/// host-side placeholder until the store assigns a uid after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRef {
    Uid(i64),
    Placeholder(String),
}

pub struct MutationHook {
    read: Arc<dyn ContentStore>,
    write: Arc<dyn ContentWriteStore>,
    cache: Arc<dyn CacheTagIndex>,
    timezone: Tz,
}

impl MutationHook {
    pub fn new(
        read: Arc<dyn ContentStore>,
        write: Arc<dyn ContentWriteStore>,
        cache: Arc<dyn CacheTagIndex>,
        timezone: Tz,
    ) -> Self {
        Self {
            read,
            write,
            cache,
            timezone,
        }
    }

    /// React to a record mutation in `table`.
    ///
    /// Untracked tables are a silent no-op. Post mutations first refresh
    /// the publish timestamp and its denormalized month/year columns, then
    /// every tracked kind flushes its cache tag. A failing cache backend
    /// propagates: stale cache is worse than a surfaced write failure.
    pub async fn on_mutation(
        &self,
        table: &str,
        record: RecordRef,
        new_ids: &HashMap<String, i64>,
        now: i64,
    ) -> Result<(), AppError> {
        let Some(kind) = EntityKind::from_table(table) else {
            debug!(table, "mutation on untracked table ignored");
            return Ok(());
        };

        let uid = match (kind, record) {
            (_, RecordRef::Uid(uid)) => uid,
            (EntityKind::Post, RecordRef::Placeholder(placeholder)) => *new_ids
                .get(&placeholder)
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "no assigned uid for placeholder `{placeholder}`"
                    ))
                })?,
            (_, RecordRef::Placeholder(placeholder)) => {
                return Err(AppError::validation(format!(
                    "placeholder `{placeholder}` is only valid for post mutations"
                )));
            }
        };

        if kind == EntityKind::Post {
            self.refresh_publish_fields(uid, now).await?;
        }

        let tag = kind.cache_tag(uid);
        self.cache.flush_by_tag(&tag)?;
        debug!(tag = tag.as_str(), "flushed cache tag after mutation");
        Ok(())
    }

    /// Default an unset publish timestamp to `now` and re-derive the
    /// month/year projection so archive queries stay consistent with it.
    async fn refresh_publish_fields(&self, uid: i64, now: i64) -> Result<(), AppError> {
        let Some(post) = self.read.find_post(uid).await? else {
            return Ok(());
        };

        let publish_date = if post.publish_date != 0 {
            post.publish_date
        } else {
            now
        };
        let (month, year) = publish_parts(publish_date, self.timezone)?;
        self.write
            .set_publish_fields(uid, publish_date, month, year)
            .await?;
        Ok(())
    }
}
