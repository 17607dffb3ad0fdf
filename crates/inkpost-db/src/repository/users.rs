//! User operations

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewUser, User, UserSummary};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.email)));
        }

        let id = format!("user-{}", Uuid::new_v4());

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            email: user.email,
            name: user.name,
            password: user.password,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, email, name, password, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, email, name, password, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get the public identity of a user
    pub async fn get_user_summary(&self, id: &str) -> Result<Option<UserSummary>, DbError> {
        Ok(self.get_user_by_id(id).await?.as_ref().map(UserSummary::from))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::models::NewUser;
    use crate::repository::test_support::memory_db;

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let db = memory_db().await;
        assert!(db.get_user_by_email("demo@example.com").await.unwrap().is_none());

        let user = db
            .insert_user(NewUser {
                email: "demo@example.com".to_string(),
                name: "Demo User".to_string(),
                password: "aa:bb".to_string(),
            })
            .await
            .unwrap();

        assert!(user.id.starts_with("user-"));

        let by_email = db.get_user_by_email("demo@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password, "aa:bb");

        let summary = db.get_user_summary(&user.id).await.unwrap().unwrap();
        assert_eq!(summary.name, "Demo User");

        assert!(db.get_user_by_id("user-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = memory_db().await;
        let new_user = NewUser {
            email: "demo@example.com".to_string(),
            name: "Demo User".to_string(),
            password: "aa:bb".to_string(),
        };

        db.insert_user(new_user.clone()).await.unwrap();
        let result = db.insert_user(new_user).await;
        assert!(matches!(result, Err(DbError::Duplicate(_))));
    }
}
