//! Database Models

pub mod row_helpers;

// Auth
pub mod user;

// Catalog
pub mod category;
pub mod product;

// Sales
pub mod sale;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use sale::{Sale, SaleCreate, SaleItem, SaleItemCreate, SalesReport};
pub use user::{DEFAULT_ROLE, User, UserCreate};
