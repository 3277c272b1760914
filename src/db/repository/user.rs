//! User Repository

use super::{RepoError, RepoResult};
use crate::db::models::{DEFAULT_ROLE, User, UserCreate};
use crate::utils::time::now_millis;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, full_name, password_hash, role FROM user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, full_name, password_hash, role FROM user WHERE email = ? COLLATE NOCASE LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Create a user with a hashed credential and the standard role
pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    if find_by_email(pool, &data.email).await?.is_some() {
        return Err(RepoError::Duplicate("User already exists".into()));
    }

    let password_hash = User::hash_password(&data.password)
        .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

    let result = sqlx::query(
        "INSERT INTO user (email, full_name, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&data.email)
    .bind(&data.full_name)
    .bind(&password_hash)
    .bind(DEFAULT_ROLE)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn maria() -> UserCreate {
        UserCreate {
            email: "maria@tienda.es".into(),
            full_name: "María López".into(),
            password: "s3creto!".into(),
        }
    }

    #[tokio::test]
    async fn create_hashes_password_and_assigns_default_role() {
        let pool = test_pool().await;
        let user = create(&pool, maria()).await.unwrap();

        assert_eq!(user.role, DEFAULT_ROLE);
        assert_ne!(user.password_hash, "s3creto!");
        assert!(user.verify_password("s3creto!").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = test_pool().await;
        create(&pool, maria()).await.unwrap();

        let mut again = maria();
        again.email = "MARIA@tienda.es".into();
        let err = create(&pool, again).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
