//! Postgres-backed content store adapter.

mod comments;
mod posts;

use std::sync::Arc;

use chrono_tz::Tz;
use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{RepoError, StorageScope};
use crate::config::DatabaseSettings;
use crate::infra::error::InfraError;

/// Record type discriminant marking a page as a blog post.
pub const DOKTYPE_BLOG_POST: i32 = 137;

#[derive(Clone)]
pub struct PgContentStore {
    pool: Arc<PgPool>,
    timezone: Tz,
}

impl PgContentStore {
    pub fn new(pool: PgPool, timezone: Tz) -> Self {
        Self {
            pool: Arc::new(pool),
            timezone,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(crate) fn timezone(&self) -> Tz {
        self.timezone
    }

    pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, InfraError> {
        PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await
            .map_err(|err| InfraError::database(format!("failed to connect: {err}")))
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|err| InfraError::database(err.to_string()))
    }

    pub async fn health_check(&self) -> Result<(), InfraError> {
        query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(|err| InfraError::database(err.to_string()))
    }

    pub(crate) fn apply_visibility(qb: &mut QueryBuilder<'_, Postgres>, language: i64) {
        if language == 0 {
            qb.push(" AND p.l18n_cfg IN (0, 2) ");
        } else {
            qb.push(" AND p.l18n_cfg < 2 ");
        }
    }

    pub(crate) fn apply_storage(qb: &mut QueryBuilder<'_, Postgres>, scope: &StorageScope) {
        if let StorageScope::Pages(pids) = scope {
            qb.push(" AND p.pid = ANY(");
            qb.push_bind(pids.clone());
            qb.push(") ");
        }
    }

    pub(crate) fn apply_archive_window(qb: &mut QueryBuilder<'_, Postgres>, now: i64) {
        qb.push(" AND (p.archive_date = 0 OR p.archive_date >= ");
        qb.push_bind(now);
        qb.push(") ");
    }

    pub(crate) fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => {
            // Class 23: integrity constraint violations.
            if db.code().is_some_and(|code| code.starts_with("23")) {
                RepoError::Integrity {
                    message: db.message().to_string(),
                }
            } else {
                RepoError::Persistence(db.message().to_string())
            }
        }
        other => RepoError::Persistence(other.to_string()),
    }
}
