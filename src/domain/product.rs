use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AccessoryCategory, BrandId, DiscountPercent, ImageUrl, Imei, InstallmentCount, ProductColor,
    ProductId, ProductModel, ProductPrice, StockCount, TypeConstraintError,
};

/// Display name used when a product has no brand relation.
pub const NO_BRAND_LABEL: &str = "Sin Marca";

/// Category assigned to accessories imported without one.
pub const DEFAULT_ACCESSORY_CATEGORY: &str = "Otro";

/// Stock strictly below this value (and above zero) counts as "low stock".
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Discriminator for the two product tables.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Cellphone,
    Accessory,
}

impl ProductType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cellphone => "cellphone",
            Self::Accessory => "accessory",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ProductType {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "cellphone" => Ok(Self::Cellphone),
            "accessory" => Ok(Self::Accessory),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "product type: {other}"
            ))),
        }
    }
}

/// Variant-specific payload of a [`Product`].
///
/// A product is exactly one of the two shapes; callers branch on the tag,
/// never on the presence of variant fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    Cellphone {
        imei: Option<Imei>,
        /// Technical specification map (screen, processor, RAM, ...),
        /// keyed by the spreadsheet column names.
        specs: BTreeMap<String, String>,
    },
    Accessory {
        category: AccessoryCategory,
    },
}

impl ProductKind {
    pub const fn product_type(&self) -> ProductType {
        match self {
            Self::Cellphone { .. } => ProductType::Cellphone,
            Self::Accessory { .. } => ProductType::Accessory,
        }
    }

    pub const fn is_cellphone(&self) -> bool {
        matches!(self, Self::Cellphone { .. })
    }
}

/// Sale price after applying the discount, plus the pre-discount price when a
/// discount is active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPricing {
    pub sale_price: ProductPrice,
    pub original_price: Option<ProductPrice>,
}

/// Resolves the stored list price against the discount percentage.
///
/// `discount = 0` leaves the price untouched and `original_price` unset;
/// an active discount moves the list price into `original_price` and scales
/// the sale price by `1 - discount/100`.
pub fn resolve_pricing(list_price: ProductPrice, discount: DiscountPercent) -> ResolvedPricing {
    if discount.is_active() {
        let factor = 1.0 - f64::from(discount.get()) / 100.0;
        ResolvedPricing {
            // list_price >= 0 and factor in [0, 1), so the product stays non-negative
            sale_price: ProductPrice::new(list_price.get() * factor)
                .unwrap_or_else(|_| list_price),
            original_price: Some(list_price),
        }
    } else {
        ResolvedPricing {
            sale_price: list_price,
            original_price: None,
        }
    }
}

/// A catalog product joined with its brand and with pricing resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub model: ProductModel,
    pub color: ProductColor,
    pub description: Option<String>,
    /// Brand relation, absent when the product was stored without one.
    pub brand_id: Option<BrandId>,
    /// Resolved display name; [`NO_BRAND_LABEL`] when the relation is absent.
    pub brand: String,
    pub sale_price: ProductPrice,
    pub original_price: Option<ProductPrice>,
    pub cost_price: ProductPrice,
    pub discount: DiscountPercent,
    pub stock: StockCount,
    pub image_urls: Vec<ImageUrl>,
    pub shipping: bool,
    pub installments: Option<InstallmentCount>,
    pub installment_price: Option<ProductPrice>,
    pub kind: ProductKind,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Whether the product is about to run out: in stock but below the
    /// low-stock threshold. Out-of-stock products are deliberately excluded.
    pub fn is_low_stock(&self) -> bool {
        let stock = self.stock.get();
        stock > 0 && stock < LOW_STOCK_THRESHOLD
    }
}

/// Information required to insert or replace a product record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub brand_id: Option<BrandId>,
    pub model: ProductModel,
    pub color: ProductColor,
    pub description: Option<String>,
    /// Stored list price; the discount is applied on read, not on write.
    pub list_price: ProductPrice,
    pub cost_price: ProductPrice,
    pub discount: DiscountPercent,
    pub stock: StockCount,
    pub image_urls: Vec<ImageUrl>,
    pub shipping: bool,
    pub installments: Option<InstallmentCount>,
    pub installment_price: Option<ProductPrice>,
    pub kind: ProductKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(value: f64) -> ProductPrice {
        ProductPrice::new(value).unwrap()
    }

    #[test]
    fn zero_discount_keeps_list_price() {
        let pricing = resolve_pricing(price(1500.0), DiscountPercent::zero());
        assert_eq!(pricing.sale_price, 1500.0);
        assert_eq!(pricing.original_price, None);
    }

    #[test]
    fn active_discount_scales_sale_price_and_keeps_original() {
        let pricing = resolve_pricing(price(1000.0), DiscountPercent::new(25).unwrap());
        assert_eq!(pricing.sale_price, 750.0);
        assert_eq!(pricing.original_price, Some(price(1000.0)));
    }

    #[test]
    fn full_discount_drops_price_to_zero() {
        let pricing = resolve_pricing(price(800.0), DiscountPercent::new(100).unwrap());
        assert_eq!(pricing.sale_price, 0.0);
        assert_eq!(pricing.original_price, Some(price(800.0)));
    }

    #[test]
    fn product_type_round_trips_through_str() {
        assert_eq!(
            ProductType::try_from("cellphone").unwrap(),
            ProductType::Cellphone
        );
        assert_eq!(
            ProductType::try_from("accessory").unwrap(),
            ProductType::Accessory
        );
        assert!(ProductType::try_from("tablet").is_err());
    }
}
