//! Product Repository
//!
//! Stock mutations here are restocks and corrections through `update`; the
//! decrement path belongs exclusively to the sale transaction.

use super::{RepoError, RepoResult, category};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::utils::time::now_millis;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, stock, category_id, image_url FROM product ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, stock, category_id, image_url FROM product WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

fn validate_price(price: Decimal) -> RepoResult<()> {
    if price.is_sign_negative() {
        return Err(RepoError::Validation(format!(
            "Price cannot be negative: {price}"
        )));
    }
    Ok(())
}

fn validate_stock(stock: i64) -> RepoResult<()> {
    if stock < 0 {
        return Err(RepoError::Validation(format!(
            "Stock cannot be negative: {stock}"
        )));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    validate_price(data.price)?;
    validate_stock(data.stock)?;

    if category::find_by_id(pool, data.category_id).await?.is_none() {
        return Err(RepoError::Validation(format!(
            "Category {} does not exist",
            data.category_id
        )));
    }

    let result = sqlx::query(
        "INSERT INTO product (name, price, stock, category_id, image_url, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.name)
    .bind(data.price.to_string())
    .bind(data.stock)
    .bind(data.category_id)
    .bind(&data.image_url)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }

    if let Some(price) = data.price {
        validate_price(price)?;
    }
    if let Some(stock) = data.stock {
        validate_stock(stock)?;
    }
    if let Some(category_id) = data.category_id
        && category::find_by_id(pool, category_id).await?.is_none()
    {
        return Err(RepoError::Validation(format!(
            "Category {category_id} does not exist"
        )));
    }

    sqlx::query(
        "UPDATE product SET
            name = COALESCE(?1, name),
            price = COALESCE(?2, price),
            stock = COALESCE(?3, stock),
            category_id = COALESCE(?4, category_id),
            image_url = COALESCE(?5, image_url)
         WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(data.price.map(|p| p.to_string()))
    .bind(data.stock)
    .bind(data.category_id)
    .bind(&data.image_url)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }

    // Historical sales join product for the line name; deleting a sold
    // product would break their materialization
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_item WHERE product_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Err(RepoError::Conflict(
            "Product appears in recorded sales and cannot be deleted".into(),
        ));
    }

    sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
