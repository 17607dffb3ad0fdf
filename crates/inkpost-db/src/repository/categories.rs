//! Category operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Category, NewCategory};
use crate::repository::Database;

impl Database {
    // ==================== Category Operations ====================

    /// Insert a new category
    pub async fn insert_category(&self, category: NewCategory) -> Result<Category, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, slug, description, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(Category {
            id: result.get("id"),
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: now,
        })
    }

    /// Insert categories, skipping any whose slug or name already exists
    ///
    /// Returns the number of categories actually created.
    pub async fn insert_categories_if_missing(&self, categories: &[NewCategory]) -> Result<u64, DbError> {
        let now = Utc::now();
        let mut created = 0;
        for category in categories {
            let result = sqlx::query(
                r#"
                INSERT INTO categories (name, slug, description, created_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?;
            created += result.rows_affected();
        }
        Ok(created)
    }

    /// List all categories, newest first
    pub async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Category::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a category by slug
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Category::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a category by ID
    pub async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Category::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Replace the values of a category
    pub async fn update_category(&self, id: i64, category: NewCategory) -> Result<Option<Category>, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, slug = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_category_by_id(id).await
    }

    /// Delete a category (links to posts cascade)
    pub async fn delete_category(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Categories linked to a post
    pub async fn get_post_categories(&self, post_id: i64) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.slug, c.description, c.created_at
            FROM post_categories pc
            INNER JOIN categories c ON c.id = pc.category_id
            WHERE pc.post_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Category::try_from(row).map_err(DbError::from))
            .collect()
    }
}
