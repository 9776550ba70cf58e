use async_trait::async_trait;

use crate::application::repos::{ContentWriteStore, NewComment, RepoError};
use crate::domain::entities::CommentRecord;

use super::{PgContentStore, map_sqlx_error};

#[async_trait]
impl ContentWriteStore for PgContentStore {
    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, RepoError> {
        let uid: i64 = sqlx::query_scalar(
            "INSERT INTO tx_blog_domain_model_comment \
             (post_uid, author_name, email, url, body, crdate, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING uid",
        )
        .bind(comment.post_uid)
        .bind(&comment.author_name)
        .bind(&comment.email)
        .bind(&comment.url)
        .bind(&comment.body)
        .bind(comment.created_at)
        .bind(comment.status.as_i16())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CommentRecord {
            uid,
            post_uid: comment.post_uid,
            author_name: comment.author_name,
            email: comment.email,
            url: comment.url,
            body: comment.body,
            created_at: comment.created_at,
            status: comment.status,
        })
    }

    async fn set_publish_fields(
        &self,
        uid: i64,
        publish_date: i64,
        month: i16,
        year: i32,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE pages SET publish_date = $1, publish_month = $2, publish_year = $3 \
             WHERE uid = $4",
        )
        .bind(publish_date)
        .bind(month)
        .bind(year)
        .bind(uid)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
