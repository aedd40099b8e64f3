use uuid::Uuid;

use super::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{Role, User};

impl Database {
    pub async fn find_user_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> ApiResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("User", id))
    }

    /// Inserts a user whose password has already been hashed.
    /// Duplicate usernames or emails are rejected with 400.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        role: Role,
    ) -> ApiResult<User> {
        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut *tx)
            .await?;
        if taken {
            return Err(ApiError::BadRequest("Username already exists".to_string()));
        }
        if let Some(email) = email {
            let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&mut *tx)
                .await?;
            if taken {
                return Err(ApiError::BadRequest("Email already exists".to_string()));
            }
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, email, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ User registered: {} ({})", user.username, user.role);
        Ok(user)
    }
}
