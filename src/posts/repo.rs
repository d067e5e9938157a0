use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::StoreError;
use crate::posts::repo_types::{Comment, Like, NewPost, Post};

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;
    /// All posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    /// Deletes the post only when `user_id` owns it.
    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<Post>, StoreError>;
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    text: String,
    likes: Json<Vec<Like>>,
    comments: Json<Vec<Comment>>,
    date: OffsetDateTime,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Self {
            id: r.id,
            user: r.user_id,
            name: r.name,
            text: r.text,
            likes: r.likes.0,
            comments: r.comments.0,
            date: r.date,
        }
    }
}

#[derive(Clone)]
pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, user_id, name, text, likes, comments, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, text, likes, comments, date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.user)
        .bind(&post.name)
        .bind(&post.text)
        .bind(Json(&post.likes))
        .bind(Json(&post.comments))
        .bind(post.date)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, name, text, likes, comments, date
            FROM posts
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, name, text, likes, comments, date
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, text, likes, comments, date
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }
}
