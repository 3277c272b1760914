//! Product Model
//!
//! `stock` is the inventory ledger: it only goes down inside the sale
//! transaction and up through a product update (restock).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};

use super::row_helpers::decimal_column;

/// Product model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl FromRow<'_, SqliteRow> for Product {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: decimal_column(row, "price")?,
            stock: row.try_get("stock")?,
            category_id: row.try_get("category_id")?,
            image_url: row.try_get("image_url")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    pub category_id: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    /// Absolute stock level (restock path)
    pub stock: Option<i64>,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
}
