//! Query layer over the content store: scoped listings, the current-post
//! resolution with language fallback, and archive aggregation.

use std::sync::Arc;

use tracing::debug;

use crate::application::error::AppError;
use crate::application::repos::{ContentStore, PostQuery, RequestContext};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{ArchivePeriod, MonthCount};

pub struct PostQueryService {
    store: Arc<dyn ContentStore>,
}

impl PostQueryService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve the post the current request points at.
    ///
    /// Tries the requested language first, then walks the fallback chain in
    /// order. An exhausted chain resolves to `Ok(None)`: a normal empty
    /// result, not an error.
    pub async fn current_post(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<PostRecord>, AppError> {
        if let Some(post) = self
            .store
            .post_with_language(ctx.page_id, ctx.language)
            .await?
        {
            return Ok(Some(post));
        }

        for &fallback in &ctx.language_fallbacks {
            if let Some(post) = self.store.post_with_language(ctx.page_id, fallback).await? {
                debug!(
                    page_id = ctx.page_id,
                    requested = ctx.language,
                    resolved = fallback,
                    "current post resolved through language fallback"
                );
                return Ok(Some(post));
            }
        }

        Ok(None)
    }

    pub async fn all(&self, ctx: &RequestContext) -> Result<Vec<PostRecord>, AppError> {
        let query = PostQuery::from_context(ctx);
        Ok(self.store.list_posts(&query).await?)
    }

    pub async fn by_author(
        &self,
        ctx: &RequestContext,
        author: i64,
    ) -> Result<Vec<PostRecord>, AppError> {
        let mut query = PostQuery::from_context(ctx);
        query.author = Some(author);
        Ok(self.store.list_posts(&query).await?)
    }

    pub async fn by_category(
        &self,
        ctx: &RequestContext,
        category: i64,
    ) -> Result<Vec<PostRecord>, AppError> {
        let mut query = PostQuery::from_context(ctx);
        query.category = Some(category);
        Ok(self.store.list_posts(&query).await?)
    }

    pub async fn by_tag(&self, ctx: &RequestContext, tag: i64) -> Result<Vec<PostRecord>, AppError> {
        let mut query = PostQuery::from_context(ctx);
        query.tag = Some(tag);
        Ok(self.store.list_posts(&query).await?)
    }

    pub async fn by_period(
        &self,
        ctx: &RequestContext,
        period: ArchivePeriod,
    ) -> Result<Vec<PostRecord>, AppError> {
        let mut query = PostQuery::from_context(ctx);
        query.period = Some(period);
        Ok(self.store.list_posts(&query).await?)
    }

    /// Months and years with at least one post, for archive navigation.
    pub async fn archive_months(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<MonthCount>, AppError> {
        let query = PostQuery::from_context(ctx);
        Ok(self.store.archive_months(&query).await?)
    }
}
