//! Sale Repository
//!
//! Owns the sale-creation transaction: order validation, price snapshots,
//! guarded stock decrements and the atomic commit of the sale with its
//! items. Also answers the read-only sale queries and the date-range report.

use super::{RepoError, RepoResult};
use crate::db::models::{Product, Sale, SaleCreate, SaleItem, SalesReport};
use crate::utils::time::{day_range_millis, now_millis};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

const SELECT_SALE: &str = "SELECT id, date, customer_name, total FROM sale";

const SELECT_ITEMS: &str = "SELECT si.product_id, p.name AS product_name, si.quantity, \
     si.unit_price, si.subtotal \
     FROM sale_item si JOIN product p ON p.id = si.product_id \
     WHERE si.sale_id = ? ORDER BY si.id";

/// Create a sale from a multi-line order.
///
/// Validation happens before any mutation, then everything (stock
/// decrements, sale row, item rows) commits in one transaction. The
/// transaction is taken with `BEGIN IMMEDIATE` so concurrent sales over the
/// same products serialize on the write lock: the loser re-reads the already
/// decremented stock and is rejected instead of overselling. Any error path
/// drops the transaction, which rolls everything back.
pub async fn create(pool: &SqlitePool, data: SaleCreate) -> RepoResult<Sale> {
    if data.items.is_empty() {
        return Err(RepoError::Validation(
            "Sale must contain at least one item".into(),
        ));
    }
    for line in &data.items {
        if line.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "Quantity must be greater than zero (product {})",
                line.product_id
            )));
        }
    }

    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    // Load every distinct referenced product inside the transaction
    let mut products: HashMap<i64, Product> = HashMap::new();
    for line in &data.items {
        if products.contains_key(&line.product_id) {
            continue;
        }
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock, category_id, image_url FROM product WHERE id = ?",
        )
        .bind(line.product_id)
        .fetch_optional(&mut *tx)
        .await?;

        match product {
            Some(p) => {
                products.insert(line.product_id, p);
            }
            None => {
                return Err(RepoError::Validation(
                    "One or more products do not exist".into(),
                ));
            }
        }
    }

    // Cumulative stock check in request order: a later line for the same
    // product sees the stock already claimed by earlier lines
    let mut claimed: HashMap<i64, i64> = HashMap::new();
    let mut items = Vec::with_capacity(data.items.len());
    let mut total = Decimal::ZERO;

    for line in &data.items {
        let product = products.get(&line.product_id).ok_or_else(|| {
            RepoError::Validation("One or more products do not exist".into())
        })?;

        let sold = claimed.entry(line.product_id).or_insert(0);
        if line.quantity > product.stock - *sold {
            return Err(RepoError::InsufficientStock(product.name.clone()));
        }
        *sold += line.quantity;

        // Price snapshot: later catalog edits must not alter this sale.
        // Checked arithmetic: an overflowing amount is a client error, not
        // a panic inside the transaction.
        let unit_price = product.price;
        let subtotal = unit_price
            .checked_mul(Decimal::from(line.quantity))
            .ok_or_else(amount_overflow)?;
        total = total.checked_add(subtotal).ok_or_else(amount_overflow)?;

        items.push(SaleItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            unit_price,
            subtotal,
        });
    }

    apply_decrements(&mut tx, &claimed, &products).await?;

    let date_ms = now_millis();
    let date = DateTime::from_timestamp_millis(date_ms)
        .ok_or_else(|| RepoError::Database(format!("Clock out of range: {date_ms}")))?;

    let insert = sqlx::query("INSERT INTO sale (date, customer_name, total) VALUES (?, ?, ?)")
        .bind(date_ms)
        .bind(&data.customer_name)
        .bind(total.to_string())
        .execute(&mut *tx)
        .await?;
    let sale_id = insert.last_insert_rowid();

    for item in &items {
        sqlx::query(
            "INSERT INTO sale_item (sale_id, product_id, quantity, unit_price, subtotal) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price.to_string())
        .bind(item.subtotal.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Sale {
        id: sale_id,
        date,
        customer_name: data.customer_name,
        total,
        items,
    })
}

fn amount_overflow() -> RepoError {
    RepoError::Validation("Sale amount exceeds the supported range".into())
}

/// Guarded stock decrements, one per distinct product.
///
/// The `stock >= ?` guard re-validates at write time; a zero row count means
/// another committed sale consumed the stock after our read.
async fn apply_decrements(
    tx: &mut Transaction<'_, Sqlite>,
    claimed: &HashMap<i64, i64>,
    products: &HashMap<i64, Product>,
) -> RepoResult<()> {
    for (product_id, quantity) in claimed {
        let result =
            sqlx::query("UPDATE product SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1")
                .bind(quantity)
                .bind(product_id)
                .execute(&mut **tx)
                .await?;

        if result.rows_affected() == 0 {
            let name = products
                .get(product_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| product_id.to_string());
            return Err(RepoError::InsufficientStock(name));
        }
    }
    Ok(())
}

/// All sales, newest first, materialized
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Sale>> {
    let mut sales =
        sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} ORDER BY date DESC, id DESC"))
            .fetch_all(pool)
            .await?;
    for sale in &mut sales {
        sale.items = load_items(pool, sale.id).await?;
    }
    Ok(sales)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match sale {
        Some(mut s) => {
            s.items = load_items(pool, s.id).await?;
            Ok(Some(s))
        }
        None => Ok(None),
    }
}

/// Aggregate sales whose calendar date (UTC) falls within `[from, to]`
/// inclusive: the matched list newest first, their count and the exact sum
/// of their totals. Read-only.
pub async fn report(pool: &SqlitePool, from: NaiveDate, to: NaiveDate) -> RepoResult<SalesReport> {
    if to < from {
        return Err(RepoError::Validation(
            "'to' must be greater than or equal to 'from'".into(),
        ));
    }

    let (start, end) = day_range_millis(from, to);
    let mut sales = sqlx::query_as::<_, Sale>(&format!(
        "{SELECT_SALE} WHERE date >= ? AND date < ? ORDER BY date DESC, id DESC"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    for sale in &mut sales {
        sale.items = load_items(pool, sale.id).await?;
    }

    let total_amount: Decimal = sales.iter().map(|s| s.total).sum();

    Ok(SalesReport {
        from,
        to,
        total_sales: sales.len() as i64,
        total_amount,
        sales,
    })
}

async fn load_items(pool: &SqlitePool, sale_id: i64) -> RepoResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(SELECT_ITEMS)
        .bind(sale_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}
