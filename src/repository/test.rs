use std::cell::RefCell;
use std::collections::HashSet;

use crate::domain::brand::Brand;
use crate::domain::order::Order;
use crate::domain::product::{NewProduct, Product, ProductType};
use crate::domain::types::{BrandId, BrandName, ProductId, UserId};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    BrandReader, BrandWriter, OrderListQuery, OrderReader, ProductListQuery, ProductReader,
    ProductWriter, UserReader, UserWriter,
};

/// Simple in-memory repository used for unit tests.
#[derive(Default)]
pub struct TestRepository {
    brands: RefCell<Vec<Brand>>,
    products: Vec<Product>,
    orders: Vec<Order>,
    users: RefCell<Vec<User>>,
    /// Product writes recorded by [`ProductWriter::create_product`].
    pub written: RefCell<Vec<NewProduct>>,
    /// Models whose write is rejected, to exercise row-level failures.
    rejected_models: HashSet<String>,
}

impl TestRepository {
    pub fn new(brands: Vec<Brand>, products: Vec<Product>, orders: Vec<Order>) -> Self {
        Self {
            brands: RefCell::new(brands),
            products,
            orders,
            ..Self::default()
        }
    }

    /// Makes every write of the given model fail with a store error.
    pub fn reject_model(mut self, model: &str) -> Self {
        self.rejected_models.insert(model.to_string());
        self
    }

    pub fn brand_names(&self) -> Vec<String> {
        self.brands
            .borrow()
            .iter()
            .map(|brand| brand.name.to_string())
            .collect()
    }
}

impl BrandReader for TestRepository {
    fn list_brands(&self) -> RepositoryResult<Vec<Brand>> {
        Ok(self.brands.borrow().clone())
    }

    fn get_brand_by_name(&self, name: &BrandName) -> RepositoryResult<Option<Brand>> {
        Ok(self
            .brands
            .borrow()
            .iter()
            .find(|brand| brand.name.as_str().eq_ignore_ascii_case(name.as_str()))
            .cloned())
    }
}

impl BrandWriter for TestRepository {
    fn get_or_create_brand(&self, name: &BrandName) -> RepositoryResult<Brand> {
        if let Some(existing) = self.get_brand_by_name(name)? {
            return Ok(existing);
        }

        let mut brands = self.brands.borrow_mut();
        let brand = Brand {
            id: BrandId::new(brands.len() as i32 + 1).expect("positive id"),
            name: name.clone(),
        };
        brands.push(brand.clone());
        Ok(brand)
    }
}

impl ProductReader for TestRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>> {
        let mut items = self.products.clone();
        if let Some(product_type) = query.product_type {
            items.retain(|p| p.kind.product_type() == product_type);
        }
        Ok(items)
    }

    fn get_product(
        &self,
        product_type: ProductType,
        id: ProductId,
    ) -> RepositoryResult<Option<Product>> {
        Ok(self
            .products
            .iter()
            .find(|p| p.id == id && p.kind.product_type() == product_type)
            .cloned())
    }

    fn list_low_stock_products(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.is_low_stock())
            .cloned()
            .collect())
    }
}

impl ProductWriter for TestRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<usize> {
        if self.rejected_models.contains(product.model.as_str()) {
            return Err(RepositoryError::Validation(
                "rechazado por la base de datos".to_string(),
            ));
        }
        self.written.borrow_mut().push(product.clone());
        Ok(1)
    }

    fn update_product(&self, _id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        if self.rejected_models.contains(product.model.as_str()) {
            return Err(RepositoryError::Validation(
                "rechazado por la base de datos".to_string(),
            ));
        }
        Ok(1)
    }

    fn delete_product(&self, _product_type: ProductType, _id: ProductId) -> RepositoryResult<usize> {
        Ok(1)
    }
}

impl OrderReader for TestRepository {
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<Vec<Order>> {
        let mut items = self.orders.clone();
        if query.successful_only {
            items.retain(Order::is_successful);
        }
        if let Some(since) = query.approved_since {
            items.retain(|order| order.date_approved.is_some_and(|approved| approved >= since));
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            items.truncate(limit as usize);
        }
        Ok(items)
    }
}

impl UserReader for TestRepository {
    fn list_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.borrow().clone())
    }

    fn get_user_by_id(&self, id: &UserId) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .borrow()
            .iter()
            .find(|user| &user.id == id)
            .cloned())
    }
}

impl UserWriter for TestRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<usize> {
        self.users.borrow_mut().push(User {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            last_sign_in_at: None,
        });
        Ok(1)
    }

    fn update_user(&self, user: &NewUser) -> RepositoryResult<usize> {
        let mut users = self.users.borrow_mut();
        let Some(existing) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(0);
        };
        existing.name = user.name.clone();
        existing.email = user.email.clone();
        existing.role = user.role;
        Ok(1)
    }

    fn delete_user(&self, id: &UserId) -> RepositoryResult<usize> {
        let mut users = self.users.borrow_mut();
        let before = users.len();
        users.retain(|user| &user.id != id);
        Ok(before - users.len())
    }
}
