//! Sale Models
//!
//! A sale is immutable once committed. Line items snapshot the product id and
//! unit price at sale time; the product *name* is resolved live when the sale
//! is materialized for a response, the price never is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};

use super::row_helpers::{datetime_column, decimal_column};

/// Materialized sale (items resolved with product names)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    /// Server-assigned UTC creation instant (ISO-8601 on the wire)
    pub date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub total: Decimal,
    pub items: Vec<SaleItem>,
}

impl FromRow<'_, SqliteRow> for Sale {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            date: datetime_column(row, "date")?,
            customer_name: row.try_get("customer_name")?,
            total: decimal_column(row, "total")?,
            // Filled in by the repository after the item query
            items: Vec::new(),
        })
    }
}

/// One line of a sale: product reference, quantity and price snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl FromRow<'_, SqliteRow> for SaleItem {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            product_id: row.try_get("product_id")?,
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            unit_price: decimal_column(row, "unit_price")?,
            subtotal: decimal_column(row, "subtotal")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleItemCreate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemCreate {
    pub product_id: i64,
    pub quantity: i64,
}

/// Aggregated date-range report over committed sales
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_sales: i64,
    pub total_amount: Decimal,
    pub sales: Vec<Sale>,
}
