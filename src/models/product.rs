use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NO_BRAND_LABEL, NewProduct as DomainNewProduct, Product as DomainProduct, ProductKind,
    resolve_pricing,
};
use crate::domain::types::{
    AccessoryCategory, DiscountPercent, ImageUrl, Imei, InstallmentCount, ProductColor,
    ProductModel, ProductPrice, StockCount, TypeConstraintError,
};

/// Diesel model representing the `cellphones` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::cellphones)]
pub struct Cellphone {
    pub id: i32,
    pub brand_id: Option<i32>,
    pub model: String,
    pub color: String,
    pub description: Option<String>,
    pub imei: Option<String>,
    pub tech_specs: Option<String>,
    pub sale_price: f64,
    pub cost_price: f64,
    pub stock: i32,
    pub discount: i32,
    pub image_urls: Option<String>,
    pub shipping: bool,
    pub installments: Option<i32>,
    pub installment_price: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Diesel model representing the `accessories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::accessories)]
pub struct Accessory {
    pub id: i32,
    pub brand_id: Option<i32>,
    pub model: String,
    pub color: String,
    pub description: Option<String>,
    pub category: String,
    pub sale_price: f64,
    pub cost_price: f64,
    pub stock: i32,
    pub discount: i32,
    pub image_urls: Option<String>,
    pub shipping: bool,
    pub installments: Option<i32>,
    pub installment_price: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Cellphone`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::cellphones)]
pub struct NewCellphone {
    pub brand_id: Option<i32>,
    pub model: String,
    pub color: String,
    pub description: Option<String>,
    pub imei: Option<String>,
    pub tech_specs: Option<String>,
    pub sale_price: f64,
    pub cost_price: f64,
    pub stock: i32,
    pub discount: i32,
    pub image_urls: Option<String>,
    pub shipping: bool,
    pub installments: Option<i32>,
    pub installment_price: Option<f64>,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Accessory`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::accessories)]
pub struct NewAccessory {
    pub brand_id: Option<i32>,
    pub model: String,
    pub color: String,
    pub description: Option<String>,
    pub category: String,
    pub sale_price: f64,
    pub cost_price: f64,
    pub stock: i32,
    pub discount: i32,
    pub image_urls: Option<String>,
    pub shipping: bool,
    pub installments: Option<i32>,
    pub installment_price: Option<f64>,
    pub updated_at: NaiveDateTime,
}

/// Decodes the JSON-encoded image URL column.
///
/// Rows written by this application always hold a JSON array; anything
/// unparseable (legacy single-URL cells included) degrades to the parseable
/// subset instead of failing the whole listing.
fn parse_image_urls(raw: Option<&str>) -> Vec<ImageUrl> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    if let Ok(urls) = serde_json::from_str::<Vec<String>>(raw) {
        return urls
            .into_iter()
            .filter_map(|url| ImageUrl::new(url).ok())
            .collect();
    }

    ImageUrl::new(raw).map(|url| vec![url]).unwrap_or_default()
}

fn parse_tech_specs(raw: Option<&str>) -> BTreeMap<String, String> {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

/// Serializes image URLs for storage; empty lists are stored as NULL.
pub fn encode_image_urls(urls: &[ImageUrl]) -> Option<String> {
    if urls.is_empty() {
        return None;
    }
    serde_json::to_string(urls).ok()
}

fn encode_tech_specs(specs: &BTreeMap<String, String>) -> Option<String> {
    if specs.is_empty() {
        return None;
    }
    serde_json::to_string(specs).ok()
}

impl Cellphone {
    /// Converts the row into the unified domain product, resolving the brand
    /// display name and the discounted price.
    pub fn into_product(self, brand_name: Option<String>) -> Result<DomainProduct, TypeConstraintError> {
        let discount = DiscountPercent::new(self.discount)?;
        let pricing = resolve_pricing(ProductPrice::new(self.sale_price)?, discount);
        let image_urls = parse_image_urls(self.image_urls.as_deref());

        Ok(DomainProduct {
            id: self.id.try_into()?,
            model: ProductModel::new(self.model)?,
            color: ProductColor::new(self.color)?,
            description: self.description,
            brand_id: self.brand_id.map(TryInto::try_into).transpose()?,
            brand: brand_name.unwrap_or_else(|| NO_BRAND_LABEL.to_string()),
            sale_price: pricing.sale_price,
            original_price: pricing.original_price,
            cost_price: ProductPrice::new(self.cost_price)?,
            discount,
            stock: StockCount::new(self.stock)?,
            image_urls,
            shipping: self.shipping,
            installments: self.installments.map(InstallmentCount::new).transpose()?,
            installment_price: self.installment_price.map(ProductPrice::new).transpose()?,
            kind: ProductKind::Cellphone {
                imei: self.imei.map(Imei::new).transpose()?,
                specs: parse_tech_specs(self.tech_specs.as_deref()),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl Accessory {
    /// Converts the row into the unified domain product, resolving the brand
    /// display name and the discounted price.
    pub fn into_product(self, brand_name: Option<String>) -> Result<DomainProduct, TypeConstraintError> {
        let discount = DiscountPercent::new(self.discount)?;
        let pricing = resolve_pricing(ProductPrice::new(self.sale_price)?, discount);
        let image_urls = parse_image_urls(self.image_urls.as_deref());

        Ok(DomainProduct {
            id: self.id.try_into()?,
            model: ProductModel::new(self.model)?,
            color: ProductColor::new(self.color)?,
            description: self.description,
            brand_id: self.brand_id.map(TryInto::try_into).transpose()?,
            brand: brand_name.unwrap_or_else(|| NO_BRAND_LABEL.to_string()),
            sale_price: pricing.sale_price,
            original_price: pricing.original_price,
            cost_price: ProductPrice::new(self.cost_price)?,
            discount,
            stock: StockCount::new(self.stock)?,
            image_urls,
            shipping: self.shipping,
            installments: self.installments.map(InstallmentCount::new).transpose()?,
            installment_price: self.installment_price.map(ProductPrice::new).transpose()?,
            kind: ProductKind::Accessory {
                category: AccessoryCategory::new(self.category)?,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl NewCellphone {
    /// Builds the insertable row. Returns `None` when the domain product is
    /// not a cellphone.
    pub fn from_domain(product: &DomainNewProduct, now: NaiveDateTime) -> Option<Self> {
        let ProductKind::Cellphone { imei, specs } = &product.kind else {
            return None;
        };

        Some(Self {
            brand_id: product.brand_id.map(Into::into),
            model: product.model.as_str().to_string(),
            color: product.color.as_str().to_string(),
            description: product.description.clone(),
            imei: imei.as_ref().map(|imei| imei.as_str().to_string()),
            tech_specs: encode_tech_specs(specs),
            sale_price: product.list_price.get(),
            cost_price: product.cost_price.get(),
            stock: product.stock.get(),
            discount: product.discount.get(),
            image_urls: encode_image_urls(&product.image_urls),
            shipping: product.shipping,
            installments: product.installments.map(Into::into),
            installment_price: product.installment_price.map(|price| price.get()),
            updated_at: now,
        })
    }
}

impl NewAccessory {
    /// Builds the insertable row. Returns `None` when the domain product is
    /// not an accessory.
    pub fn from_domain(product: &DomainNewProduct, now: NaiveDateTime) -> Option<Self> {
        let ProductKind::Accessory { category } = &product.kind else {
            return None;
        };

        Some(Self {
            brand_id: product.brand_id.map(Into::into),
            model: product.model.as_str().to_string(),
            color: product.color.as_str().to_string(),
            description: product.description.clone(),
            category: category.as_str().to_string(),
            sale_price: product.list_price.get(),
            cost_price: product.cost_price.get(),
            stock: product.stock.get(),
            discount: product.discount.get(),
            image_urls: encode_image_urls(&product.image_urls),
            shipping: product.shipping,
            installments: product.installments.map(Into::into),
            installment_price: product.installment_price.map(|price| price.get()),
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cellphone() -> Cellphone {
        let epoch = chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Cellphone {
            id: 1,
            brand_id: Some(2),
            model: "Galaxy A54".to_string(),
            color: "Negro".to_string(),
            description: None,
            imei: Some("356938035643809".to_string()),
            tech_specs: Some(r#"{"RAM":"8GB","Pantalla":"6.4\""}"#.to_string()),
            sale_price: 1000.0,
            cost_price: 700.0,
            stock: 5,
            discount: 10,
            image_urls: Some(r#"["https://example.com/a54.jpg"]"#.to_string()),
            shipping: true,
            installments: Some(12),
            installment_price: Some(90.0),
            created_at: epoch,
            updated_at: epoch,
        }
    }

    #[test]
    fn cellphone_row_resolves_discounted_price() {
        let product = sample_cellphone()
            .into_product(Some("Samsung".to_string()))
            .unwrap();

        assert_eq!(product.sale_price, 900.0);
        assert_eq!(product.original_price.unwrap(), 1000.0);
        assert_eq!(product.brand, "Samsung");
        assert!(product.kind.is_cellphone());
    }

    #[test]
    fn missing_brand_falls_back_to_sentinel() {
        let mut row = sample_cellphone();
        row.brand_id = None;
        let product = row.into_product(None).unwrap();
        assert_eq!(product.brand, NO_BRAND_LABEL);
    }

    #[test]
    fn malformed_image_urls_degrade_to_empty() {
        let mut row = sample_cellphone();
        row.image_urls = Some("{not json".to_string());
        let product = row.into_product(None).unwrap();
        assert!(product.image_urls.is_empty());
    }

    #[test]
    fn single_url_cell_is_accepted() {
        let urls = parse_image_urls(Some("https://example.com/one.jpg"));
        assert_eq!(urls.len(), 1);
    }
}
