//! Category Repository

use super::{RepoError, RepoResult};
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::utils::time::now_millis;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, name FROM category ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Case-insensitive name lookup (the column collates NOCASE)
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Category>> {
    let category =
        sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(
            "A category with that name already exists".into(),
        ));
    }

    let result = sqlx::query("INSERT INTO category (name, created_at) VALUES (?, ?)")
        .bind(&data.name)
        .bind(now_millis())
        .execute(pool)
        .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;

    // Renaming into another category's name (case-insensitive) is a conflict
    if let Some(other) = find_by_name(pool, &data.name).await?
        && other.id != existing.id
    {
        return Err(RepoError::Duplicate(
            "A category with that name already exists".into(),
        ));
    }

    sqlx::query("UPDATE category SET name = ? WHERE id = ?")
        .bind(&data.name)
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }

    // Deletion is blocked while any product still references the category
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Err(RepoError::Conflict(
            "Category has products and cannot be deleted".into(),
        ));
    }

    sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
