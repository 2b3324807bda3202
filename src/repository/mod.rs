use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::brand::Brand;
use crate::domain::order::Order;
use crate::domain::product::{NewProduct, Product, ProductType};
use crate::domain::types::{BrandName, ProductId, UserId};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;

pub mod brand;
pub mod errors;
pub mod order;
pub mod product;
#[cfg(test)]
pub mod test;
pub mod user;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing products.
///
/// Text search and category filtering are deliberately *not* pushed into SQL;
/// the view filters are pure functions in the service layer and operate on the
/// full in-memory list, preserving the stored ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductListQuery {
    /// Restrict to one of the two product tables.
    pub product_type: Option<ProductType>,
}

impl ProductListQuery {
    pub fn product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = Some(product_type);
        self
    }
}

/// Query parameters used when listing orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderListQuery {
    /// Keep only orders whose status classifies as successful.
    pub successful_only: bool,
    /// Keep only orders approved at or after this instant.
    pub approved_since: Option<NaiveDateTime>,
    /// Truncate to the N most recently created orders.
    pub limit: Option<i64>,
}

impl OrderListQuery {
    pub fn successful(mut self) -> Self {
        self.successful_only = true;
        self
    }

    pub fn approved_since(mut self, since: NaiveDateTime) -> Self {
        self.approved_since = Some(since);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read-only operations for brand entities.
pub trait BrandReader {
    /// List all brands ordered by canonical name.
    fn list_brands(&self) -> RepositoryResult<Vec<Brand>>;
    /// Look up a brand by case-insensitive name match.
    fn get_brand_by_name(&self, name: &BrandName) -> RepositoryResult<Option<Brand>>;
}

/// Write operations for brand entities.
pub trait BrandWriter {
    /// Return the brand with the given name, creating it when unseen.
    ///
    /// Implementations must be safe under concurrent callers: two parallel
    /// resolutions of the same unseen name yield the same row.
    fn get_or_create_brand(&self, name: &BrandName) -> RepositoryResult<Brand>;
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List products, cellphones before accessories, each table in stored order.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product by table and identifier.
    fn get_product(
        &self,
        product_type: ProductType,
        id: ProductId,
    ) -> RepositoryResult<Option<Product>>;
    /// Products with `0 < stock < 10`, both tables combined.
    fn list_low_stock_products(&self) -> RepositoryResult<Vec<Product>>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Persist a new product into the table matching its kind.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<usize>;
    /// Replace the stored fields of an existing product.
    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize>;
    /// Delete a product by table and identifier.
    fn delete_product(&self, product_type: ProductType, id: ProductId) -> RepositoryResult<usize>;
}

/// Read-only operations for order entities. Orders are written by the
/// external payment webhook, never by this application.
pub trait OrderReader {
    /// List orders, most recently created first.
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<Vec<Order>>;
}

/// Read-only operations for user entities.
pub trait UserReader {
    /// List all users ordered by name.
    fn list_users(&self) -> RepositoryResult<Vec<User>>;
    /// Retrieve a user by identifier.
    fn get_user_by_id(&self, id: &UserId) -> RepositoryResult<Option<User>>;
}

/// Write operations for user entities.
pub trait UserWriter {
    /// Persist a new user.
    fn create_user(&self, user: &NewUser) -> RepositoryResult<usize>;
    /// Update name, email and role of an existing user.
    fn update_user(&self, user: &NewUser) -> RepositoryResult<usize>;
    /// Delete a user by identifier.
    fn delete_user(&self, id: &UserId) -> RepositoryResult<usize>;
}
