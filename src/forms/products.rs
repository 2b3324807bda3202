use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{DEFAULT_ACCESSORY_CATEGORY, NewProduct, ProductKind, ProductType};
use crate::domain::types::{
    AccessoryCategory, BrandId, BrandName, DiscountPercent, ImageUrl, Imei, InstallmentCount,
    ProductColor, ProductId, ProductModel, ProductPrice, StockCount, TypeConstraintError,
};

/// HTML form behind the add/edit product screens.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveProductForm {
    /// Present when editing an existing product.
    pub id: Option<i32>,
    pub product_type: String,
    #[validate(length(min = 1))]
    pub brand: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(length(min = 1))]
    pub color: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub sale_price: f64,
    /// Numeric fields arriving from HTML inputs are kept as text so an empty
    /// field falls back to its default instead of failing deserialization.
    pub cost_price: Option<String>,
    pub stock: Option<String>,
    pub discount: Option<String>,
    /// Checkbox: present ("on") when checked.
    pub shipping: Option<String>,
    pub installments: Option<String>,
    pub installment_price: Option<String>,
    /// JSON-encoded array of image URLs.
    pub image_urls: Option<String>,
    pub imei: Option<String>,
    pub category: Option<String>,
    /// JSON-encoded technical specification map (cellphones only).
    pub tech_specs: Option<String>,
}

/// Validated payload of [`SaveProductForm`].
///
/// The brand stays a name here; the service resolves it to an identifier
/// (creating the brand if needed) before building the insertable product.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveProductFormPayload {
    pub id: Option<ProductId>,
    pub brand: BrandName,
    pub model: ProductModel,
    pub color: ProductColor,
    pub description: Option<String>,
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

impl SaveProductFormPayload {
    /// Builds the insertable product once the brand has been resolved.
    pub fn into_new_product(self, brand_id: Option<BrandId>) -> NewProduct {
        NewProduct {
            brand_id,
            model: self.model,
            color: self.color,
            description: self.description,
            list_price: self.list_price,
            cost_price: self.cost_price,
            discount: self.discount,
            stock: self.stock,
            image_urls: self.image_urls,
            shipping: self.shipping,
            installments: self.installments,
            installment_price: self.installment_price,
            kind: self.kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveProductFormError {
    #[error("Save product form validation failed: {0}")]
    Validation(String),
    #[error("Save product form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Save product form contains malformed JSON: {0}")]
    Json(String),
}

impl From<ValidationErrors> for SaveProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SaveProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn numeric_field<T: std::str::FromStr + Default>(
    raw: Option<&str>,
    field: &'static str,
) -> Result<T, SaveProductFormError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(T::default());
    };

    raw.parse()
        .map_err(|_| SaveProductFormError::Validation(format!("{field} must be numeric")))
}

fn optional_numeric_field<T: std::str::FromStr>(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<T>, SaveProductFormError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    raw.parse()
        .map(Some)
        .map_err(|_| SaveProductFormError::Validation(format!("{field} must be numeric")))
}

fn parse_image_urls(raw: Option<&str>) -> Result<Vec<ImageUrl>, SaveProductFormError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };

    let urls: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| SaveProductFormError::Json(format!("image urls: {e}")))?;

    urls.into_iter()
        .map(|url| ImageUrl::new(url).map_err(Into::into))
        .collect()
}

fn parse_tech_specs(raw: Option<&str>) -> Result<BTreeMap<String, String>, SaveProductFormError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(BTreeMap::new());
    };

    serde_json::from_str(raw).map_err(|e| SaveProductFormError::Json(format!("tech specs: {e}")))
}

impl TryFrom<SaveProductForm> for SaveProductFormPayload {
    type Error = SaveProductFormError;

    fn try_from(form: SaveProductForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let product_type = ProductType::try_from(form.product_type.as_str())?;

        let kind = match product_type {
            ProductType::Cellphone => ProductKind::Cellphone {
                imei: form
                    .imei
                    .as_deref()
                    .map(str::trim)
                    .filter(|imei| !imei.is_empty())
                    .map(Imei::new)
                    .transpose()?,
                specs: parse_tech_specs(form.tech_specs.as_deref())?,
            },
            ProductType::Accessory => ProductKind::Accessory {
                category: AccessoryCategory::new(
                    form.category
                        .as_deref()
                        .map(str::trim)
                        .filter(|category| !category.is_empty())
                        .unwrap_or(DEFAULT_ACCESSORY_CATEGORY),
                )?,
            },
        };

        Ok(Self {
            id: form.id.map(ProductId::new).transpose()?,
            brand: BrandName::new(form.brand)?,
            model: ProductModel::new(form.model)?,
            color: ProductColor::new(form.color)?,
            description: form
                .description
                .map(|description| description.trim().to_string())
                .filter(|description| !description.is_empty()),
            list_price: ProductPrice::new(form.sale_price)?,
            cost_price: ProductPrice::new(numeric_field(form.cost_price.as_deref(), "cost_price")?)?,
            discount: DiscountPercent::new(numeric_field(form.discount.as_deref(), "discount")?)?,
            stock: StockCount::new(numeric_field(form.stock.as_deref(), "stock")?)?,
            image_urls: parse_image_urls(form.image_urls.as_deref())?,
            shipping: form.shipping.is_some(),
            installments: optional_numeric_field(form.installments.as_deref(), "installments")?
                .map(InstallmentCount::new)
                .transpose()?,
            installment_price: optional_numeric_field(
                form.installment_price.as_deref(),
                "installment_price",
            )?
            .map(ProductPrice::new)
            .transpose()?,
            kind,
        })
    }
}

/// Form posted by the delete button on the inventory table.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteProductForm {
    #[validate(range(min = 1))]
    pub id: i32,
    pub product_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteProductFormPayload {
    pub id: ProductId,
    pub product_type: ProductType,
}

#[derive(Debug, Error)]
pub enum DeleteProductFormError {
    #[error("Delete product form validation failed: {0}")]
    Validation(String),
    #[error("Delete product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for DeleteProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for DeleteProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<DeleteProductForm> for DeleteProductFormPayload {
    type Error = DeleteProductFormError;

    fn try_from(form: DeleteProductForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            id: ProductId::new(form.id)?,
            product_type: ProductType::try_from(form.product_type.as_str())?,
        })
    }
}
