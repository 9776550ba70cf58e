use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::application::repos::{ContentStore, PostQuery, RepoError};
use crate::domain::entities::PostRecord;
use crate::domain::posts::MonthCount;

use super::{DOKTYPE_BLOG_POST, PgContentStore, map_sqlx_error};

const POST_COLUMNS: &str = "p.uid, p.pid, p.title, p.sys_language_uid, p.l10n_parent, \
     p.l18n_cfg, p.publish_date, p.archive_date, p.publish_month, p.publish_year";

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    uid: i64,
    pid: i64,
    title: String,
    sys_language_uid: i64,
    l10n_parent: i64,
    l18n_cfg: i16,
    publish_date: i64,
    archive_date: i64,
    publish_month: i16,
    publish_year: i32,
}

impl PgContentStore {
    fn select_posts() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!(
            "SELECT {POST_COLUMNS} FROM pages p WHERE p.doktype = {DOKTYPE_BLOG_POST}"
        ))
    }

    fn apply_relation_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
        if let Some(author) = query.author {
            qb.push(
                " AND EXISTS (SELECT 1 FROM pages_authors_mm mm \
                 WHERE mm.page_uid = p.uid AND mm.author_uid = ",
            );
            qb.push_bind(author);
            qb.push(") ");
        }
        if let Some(category) = query.category {
            qb.push(
                " AND EXISTS (SELECT 1 FROM pages_categories_mm mm \
                 WHERE mm.page_uid = p.uid AND mm.category_uid = ",
            );
            qb.push_bind(category);
            qb.push(") ");
        }
        if let Some(tag) = query.tag {
            qb.push(
                " AND EXISTS (SELECT 1 FROM pages_tags_mm mm \
                 WHERE mm.page_uid = p.uid AND mm.tag_uid = ",
            );
            qb.push_bind(tag);
            qb.push(") ");
        }
    }

    async fn relation_map(
        &self,
        table: &str,
        column: &str,
        uids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, RepoError> {
        let sql = format!(
            "SELECT page_uid, {column} FROM {table} \
             WHERE page_uid = ANY($1) ORDER BY page_uid, {column}"
        );
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql)
            .bind(uids.to_vec())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        for (page_uid, other_uid) in rows {
            map.entry(page_uid).or_default().push(other_uid);
        }
        Ok(map)
    }

    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<PostRecord>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let uids: Vec<i64> = rows.iter().map(|row| row.uid).collect();
        let mut categories = self
            .relation_map("pages_categories_mm", "category_uid", &uids)
            .await?;
        let mut tags = self.relation_map("pages_tags_mm", "tag_uid", &uids).await?;
        let mut authors = self
            .relation_map("pages_authors_mm", "author_uid", &uids)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PostRecord {
                uid: row.uid,
                pid: row.pid,
                title: row.title,
                language: row.sys_language_uid,
                translation_parent: row.l10n_parent,
                language_cfg: row.l18n_cfg,
                publish_date: row.publish_date,
                archive_date: row.archive_date,
                publish_month: row.publish_month,
                publish_year: row.publish_year,
                categories: categories.remove(&row.uid).unwrap_or_default(),
                tags: tags.remove(&row.uid).unwrap_or_default(),
                authors: authors.remove(&row.uid).unwrap_or_default(),
            })
            .collect())
    }

    async fn hydrate_one(&self, row: Option<PostRow>) -> Result<Option<PostRecord>, RepoError> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = Self::select_posts();
        Self::apply_visibility(&mut qb, query.language);
        Self::apply_storage(&mut qb, &query.storage);
        Self::apply_archive_window(&mut qb, query.now);
        Self::apply_relation_filters(&mut qb, query);

        if let Some(period) = query.period {
            let (start, end) = period
                .bounds(self.timezone())
                .map_err(|err| RepoError::invalid_input(err.to_string()))?;
            qb.push(" AND p.publish_date >= ");
            qb.push_bind(start);
            qb.push(" AND p.publish_date <= ");
            qb.push_bind(end);
        }

        qb.push(" ORDER BY p.publish_date DESC, p.uid DESC ");

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.hydrate(rows).await
    }

    async fn find_post(&self, uid: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = Self::select_posts();
        qb.push(" AND p.uid = ");
        qb.push_bind(uid);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.hydrate_one(row).await
    }

    async fn post_with_language(
        &self,
        page_id: i64,
        language: i64,
    ) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = Self::select_posts();
        Self::apply_visibility(&mut qb, language);

        if language > 0 {
            qb.push(" AND p.l10n_parent = ");
            qb.push_bind(page_id);
            qb.push(" AND p.sys_language_uid = ");
            qb.push_bind(language);
        } else {
            qb.push(" AND p.uid = ");
            qb.push_bind(page_id);
        }
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.hydrate_one(row).await
    }

    async fn archive_months(&self, query: &PostQuery) -> Result<Vec<MonthCount>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT p.publish_year, p.publish_month, COUNT(*) \
             FROM pages p WHERE p.doktype = {DOKTYPE_BLOG_POST}"
        ));
        Self::apply_visibility(&mut qb, query.language);
        Self::apply_storage(&mut qb, &query.storage);
        Self::apply_archive_window(&mut qb, query.now);
        qb.push(
            " AND p.publish_month > 0 AND p.publish_year > 0 \
             GROUP BY p.publish_year, p.publish_month \
             ORDER BY p.publish_year DESC, p.publish_month DESC ",
        );

        let rows: Vec<(i32, i16, i64)> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(year, month, count)| {
                Ok(MonthCount {
                    year,
                    month,
                    count: Self::convert_count(count)?,
                })
            })
            .collect()
    }
}
