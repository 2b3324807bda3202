use crate::auth::AuthenticatedUser;
use crate::domain::product::{Product, ProductType};
use crate::domain::types::TypeConstraintError;
use crate::forms::products::{DeleteProductFormPayload, SaveProductFormPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, Pagination};
use crate::repository::errors::RepositoryError;
use crate::repository::{BrandWriter, ProductListQuery, ProductReader, ProductWriter};
use crate::services::brands::resolve_brand;

use super::{ServiceError, ServiceResult};

/// Category tab selected on the inventory page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryTab {
    #[default]
    All,
    Cellphones,
    Accessories,
}

impl InventoryTab {
    fn matches(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Cellphones => product.kind.product_type() == ProductType::Cellphone,
            Self::Accessories => product.kind.product_type() == ProductType::Accessory,
        }
    }
}

impl TryFrom<&str> for InventoryTab {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "all" => Ok(Self::All),
            "cellphones" => Ok(Self::Cellphones),
            "accessories" => Ok(Self::Accessories),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "inventory tab: {other}"
            ))),
        }
    }
}

/// Applies the inventory view filters: case-insensitive substring search on
/// model and brand, plus the category tab. Input ordering is preserved.
pub fn filter_products(
    products: Vec<Product>,
    search: Option<&str>,
    tab: InventoryTab,
) -> Vec<Product> {
    let needle = search
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase);

    products
        .into_iter()
        .filter(|product| tab.matches(product))
        .filter(|product| match &needle {
            None => true,
            Some(needle) => {
                product.model.as_str().to_lowercase().contains(needle)
                    || product.brand.to_lowercase().contains(needle)
            }
        })
        .collect()
}

/// Core business logic for rendering the inventory page.
///
/// Loads both product tables, applies the view filters in memory and slices
/// out the requested page. Repository errors are converted into
/// `ServiceError` variants so that the HTTP route can remain a thin wrapper.
pub fn show_inventory<R>(
    search: Option<&str>,
    tab: InventoryTab,
    page: usize,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Paginated<Product>>
where
    R: ProductReader,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let products = match repo.list_products(ProductListQuery::default()) {
        Ok(products) => products,
        Err(e) => {
            log::error!("Failed to list products: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let filtered = filter_products(products, search, tab);

    Ok(Paginated::paginate(
        filtered,
        Pagination {
            page,
            per_page: DEFAULT_ITEMS_PER_PAGE,
        },
    ))
}

/// Fetches a single product for the edit screen.
pub fn show_product<R>(
    product_type: ProductType,
    id: i32,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Product>
where
    R: ProductReader,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let id = match id.try_into() {
        Ok(id) => id,
        Err(_) => return Err(ServiceError::NotFound),
    };

    match repo.get_product(product_type, id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Creates or updates a product, resolving its brand first.
///
/// Single-record writes fail atomically: any brand or store error surfaces
/// as one message and nothing is partially applied.
pub fn save_product<R>(
    payload: SaveProductFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: BrandWriter + ProductWriter,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let brand = resolve_brand(&payload.brand, repo)?;
    let id = payload.id;
    let product = payload.into_new_product(Some(brand.id));

    let result = match id {
        Some(id) => repo.update_product(id, &product),
        None => repo.create_product(&product),
    };

    match result {
        Ok(_) => Ok(()),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to save product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Deletes a product from its table.
pub fn delete_product<R>(
    payload: DeleteProductFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: ProductWriter,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    match repo.delete_product(payload.product_type, payload.id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to delete product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::product::{ProductKind, resolve_pricing};
    use crate::domain::types::{
        AccessoryCategory, DiscountPercent, ProductColor, ProductId, ProductModel, ProductPrice,
        StockCount,
    };
    use crate::repository::test::TestRepository;

    pub(crate) fn sample_product(id: i32, model: &str, brand: &str, kind: ProductKind) -> Product {
        let epoch = chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        let pricing = resolve_pricing(ProductPrice::new(1000.0).unwrap(), DiscountPercent::zero());
        Product {
            id: ProductId::new(id).unwrap(),
            model: ProductModel::new(model).unwrap(),
            color: ProductColor::new("Negro").unwrap(),
            description: None,
            brand_id: None,
            brand: brand.to_string(),
            sale_price: pricing.sale_price,
            original_price: pricing.original_price,
            cost_price: ProductPrice::new(0.0).unwrap(),
            discount: DiscountPercent::zero(),
            stock: StockCount::new(5).unwrap(),
            image_urls: vec![],
            shipping: false,
            installments: None,
            installment_price: None,
            kind,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    fn cellphone(id: i32, model: &str, brand: &str) -> Product {
        sample_product(
            id,
            model,
            brand,
            ProductKind::Cellphone {
                imei: None,
                specs: Default::default(),
            },
        )
    }

    fn accessory(id: i32, model: &str, brand: &str) -> Product {
        sample_product(
            id,
            model,
            brand,
            ProductKind::Accessory {
                category: AccessoryCategory::new("Fundas").unwrap(),
            },
        )
    }

    fn sample_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "auth0|1".into(),
            email: "test@example.com".into(),
            name: "Test".into(),
            role: "Vendedor".into(),
        }
    }

    #[test]
    fn search_matches_model_and_brand_case_insensitively() {
        let products = vec![
            cellphone(1, "Galaxy A54", "Samsung"),
            cellphone(2, "iPhone 13", "Apple"),
            accessory(3, "Funda Galaxy", "Genérica"),
        ];

        let by_model = filter_products(products.clone(), Some("galaxy"), InventoryTab::All);
        assert_eq!(by_model.len(), 2);

        let by_brand = filter_products(products, Some("APPLE"), InventoryTab::All);
        assert_eq!(by_brand.len(), 1);
        assert_eq!(by_brand[0].model, "iPhone 13");
    }

    #[test]
    fn tabs_partition_by_product_kind() {
        let products = vec![
            cellphone(1, "Galaxy A54", "Samsung"),
            accessory(2, "Funda", "Genérica"),
        ];

        let cellphones = filter_products(products.clone(), None, InventoryTab::Cellphones);
        assert_eq!(cellphones.len(), 1);
        assert!(cellphones[0].kind.is_cellphone());

        let accessories = filter_products(products, None, InventoryTab::Accessories);
        assert_eq!(accessories.len(), 1);
        assert!(!accessories[0].kind.is_cellphone());
    }

    #[test]
    fn filtering_preserves_input_ordering() {
        let products = vec![
            cellphone(3, "A", "X"),
            cellphone(1, "B", "X"),
            cellphone(2, "C", "X"),
        ];

        let filtered = filter_products(products, None, InventoryTab::All);
        let ids: Vec<i32> = filtered.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn show_inventory_paginates_filtered_products() {
        let repo = TestRepository::new(
            vec![],
            vec![
                cellphone(1, "Galaxy A54", "Samsung"),
                accessory(2, "Funda", "Genérica"),
            ],
            vec![],
        );

        let page = show_inventory(None, InventoryTab::All, 1, &sample_user(), &repo).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 1);
    }
}
