//! Post operations

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use crate::error::DbError;
use crate::models::{NewPost, Post, PostDetails, PostUpdate};
use crate::repository::Database;

const POST_COLUMNS: &str =
    "id, title, slug, content, excerpt, author_id, published, created_at, updated_at";

/// Link a post to categories; duplicate ids are ignored, unknown ids fail
async fn link_categories(
    conn: &mut SqliteConnection,
    post_id: i64,
    category_ids: &[i64],
) -> Result<(), DbError> {
    for category_id in category_ids {
        sqlx::query("INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(category_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

impl Database {
    // ==================== Post Operations ====================

    /// Insert a new post together with its category links
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, slug, content, excerpt, author_id, published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.author_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&mut *tx)
        .await?;

        let id: i64 = result.get("id");
        link_categories(&mut tx, id, &post.category_ids).await?;
        tx.commit().await?;

        Ok(Post {
            id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            excerpt: post.excerpt,
            author_id: post.author_id,
            published: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a post by ID
    pub async fn get_post_by_id(&self, id: i64) -> Result<Option<Post>, DbError> {
        let result = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Post::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a post by slug, published or not
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DbError> {
        let result = sqlx::query(&format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Post::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List published posts, newest first
    pub async fn list_published_posts(&self) -> Result<Vec<Post>, DbError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE published = 1 ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List every post written by a user, drafts included, newest first
    pub async fn list_posts_by_author(&self, author_id: &str) -> Result<Vec<Post>, DbError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE author_id = ? ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List published posts linked to a category, newest first
    pub async fn list_published_posts_in_category(&self, category_id: i64) -> Result<Vec<Post>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.title, p.slug, p.content, p.excerpt, p.author_id, p.published, p.created_at, p.updated_at
            FROM post_categories pc
            INNER JOIN posts p ON p.id = pc.post_id
            WHERE pc.category_id = ? AND p.published = 1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Post::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to a post
    ///
    /// Returns `None` when the post does not exist.
    pub async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Option<Post>, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE(?, title),
                slug = COALESCE(?, slug),
                content = COALESCE(?, content),
                excerpt = COALESCE(?, excerpt),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.slug)
        .bind(&update.content)
        .bind(&update.excerpt)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(category_ids) = &update.category_ids {
            sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_categories(&mut tx, id, category_ids).await?;
        }

        tx.commit().await?;
        self.get_post_by_id(id).await
    }

    /// Publish or unpublish a post
    pub async fn set_post_published(&self, id: i64, published: bool) -> Result<Option<Post>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET published = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(published)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post_by_id(id).await
    }

    /// Delete a post (category links cascade)
    pub async fn delete_post(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load categories and author for a post
    pub async fn get_post_details(&self, post: Post) -> Result<PostDetails, DbError> {
        let categories = self.get_post_categories(post.id).await?;
        let author = self.get_user_summary(&post.author_id).await?;
        Ok(PostDetails::new(post, categories, author))
    }

    /// Load categories and author for each post, keeping order
    pub async fn get_posts_details(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DbError> {
        let mut details = Vec::with_capacity(posts.len());
        for post in posts {
            details.push(self.get_post_details(post).await?);
        }
        Ok(details)
    }
}
