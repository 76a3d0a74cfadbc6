use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Create a new user
pub async fn create_user(pool: &DbPool, new_user: &NewUser) -> Result<User> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (role, display_name, email, location, bio, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_user.role)
    .bind(&new_user.display_name)
    .bind(&new_user.email)
    .bind(&new_user.location)
    .bind(&new_user.bio)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by ID
pub async fn get_user(pool: &DbPool, user_id: i64) -> Result<User> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {user_id} not found")))?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Update profile fields, keeping any field the caller left unset
pub async fn update_profile(pool: &DbPool, user_id: i64, update: &UpdateUser) -> Result<User> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET display_name = COALESCE(?, display_name),
            location = COALESCE(?, location),
            bio = COALESCE(?, bio),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&update.display_name)
    .bind(&update.location)
    .bind(&update.bio)
    .bind(now)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("User {user_id} not found")))?;

    Ok(user)
}

/// Count all users
pub async fn count_users(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
