use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthenticatedUser;
use crate::domain::brand::Brand;
use crate::domain::order::Order;
use crate::domain::product::{
    DEFAULT_ACCESSORY_CATEGORY, NewProduct, Product, ProductKind, ProductType,
};
use crate::domain::types::{
    AccessoryCategory, BrandName, DiscountPercent, ImageUrl, Imei, InstallmentCount, ProductColor,
    ProductModel, ProductPrice, StockCount,
};
use crate::forms::import_export::{ParsedUpload, ParsedUploadRow};
use crate::repository::{
    BrandReader, BrandWriter, OrderListQuery, OrderReader, ProductListQuery, ProductReader,
    ProductWriter,
};

use super::{ServiceError, ServiceResult};

/// Technical-spec columns recognized on cellphone sheets. Any of these found
/// on a row is collected into the product's spec map; everything else is
/// ignored.
pub const TECH_SPEC_COLUMNS: [&str; 12] = [
    "Pantalla",
    "Procesador",
    "RAM",
    "Almacenamiento",
    "Cámara Principal",
    "Cámara Frontal",
    "Batería",
    "Sistema Operativo",
    "Dimensiones",
    "Peso",
    "Conectividad",
    "Capacidad",
];

/// Outcome tally of a bulk import.
///
/// Batches never fail atomically: each row succeeds or contributes an error
/// string, and coerced numeric cells contribute warnings.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ImportReport {
    pub success_count: usize,
    pub error_count: usize,
    /// `Fila <n>: <reason>` per failed row, in sheet order.
    pub errors: Vec<String>,
    /// `Fila <n>: <detail>` per coerced cell, in sheet order.
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn push_error(&mut self, row_number: usize, message: impl AsRef<str>) {
        self.error_count += 1;
        self.errors
            .push(format!("Fila {row_number}: {}", message.as_ref()));
    }

    pub fn push_warning(&mut self, row_number: usize, message: impl AsRef<str>) {
        self.warnings
            .push(format!("Fila {row_number}: {}", message.as_ref()));
    }

    /// One-line summary shown in the upload notification.
    pub fn summary(&self) -> String {
        format!(
            "Carga completada. {} productos guardados, {} errores.",
            self.success_count, self.error_count
        )
    }
}

/// A spreadsheet row mapped to a pending product write.
///
/// The brand is still a name at this point; the importer resolves it to an
/// identifier right before the write.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedImportRow {
    pub brand: BrandName,
    pub product: NewProduct,
    pub warnings: Vec<String>,
}

fn required_value<'a>(row: &'a ParsedUploadRow, column: &str) -> Result<&'a str, String> {
    row.value(column)
        .ok_or_else(|| format!("El campo \"{column}\" es obligatorio"))
}

/// Parses a numeric cell, falling back to 0.
///
/// A missing cell is silently zero; a present but unparseable cell also
/// degrades to zero but is reported back as a warning instead of being
/// swallowed.
fn numeric_value(row: &ParsedUploadRow, column: &str, warnings: &mut Vec<String>) -> f64 {
    match row.value(column) {
        None => 0.0,
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                warnings.push(format!("El campo \"{column}\" no es numérico, se usó 0"));
                0.0
            }
        },
    }
}

fn parse_row_image_urls(row: &ParsedUploadRow) -> Result<Vec<ImageUrl>, String> {
    let Some(raw) = row.value("imageUrl") else {
        return Ok(Vec::new());
    };

    let urls: Vec<String> = serde_json::from_str(raw)
        .map_err(|_| "La columna \"imageUrl\" contiene JSON inválido".to_string())?;

    Ok(urls
        .into_iter()
        .filter_map(|url| ImageUrl::new(url).ok())
        .collect())
}

/// Maps one spreadsheet row to a pending product write.
///
/// The brand cell is first matched fuzzily against the known canonical
/// names; when nothing is close enough the literal value is kept and the
/// resolver will create it.
pub fn map_import_row(
    row: &ParsedUploadRow,
    product_type: ProductType,
    known_brands: &[Brand],
) -> Result<MappedImportRow, String> {
    let mut warnings = Vec::new();

    let brand_raw = required_value(row, "brand")?;
    let brand = match super::brands::match_brand_name(brand_raw, known_brands) {
        Some(matched) => matched.name.clone(),
        None => BrandName::new(brand_raw).map_err(|e| e.to_string())?,
    };

    let model = ProductModel::new(required_value(row, "model")?).map_err(|e| e.to_string())?;
    let color = ProductColor::new(required_value(row, "color")?).map_err(|e| e.to_string())?;

    let list_price = ProductPrice::new(numeric_value(row, "salePrice", &mut warnings))
        .map_err(|e| e.to_string())?;
    let cost_price = ProductPrice::new(numeric_value(row, "costPrice", &mut warnings))
        .map_err(|e| e.to_string())?;
    let stock = StockCount::new(numeric_value(row, "stock", &mut warnings) as i32)
        .map_err(|e| e.to_string())?;
    let discount = DiscountPercent::new(numeric_value(row, "discount", &mut warnings) as i32)
        .map_err(|e| e.to_string())?;

    let installments = match row.value("installments") {
        None => None,
        Some(raw) => match raw.parse::<i32>() {
            Ok(value) => Some(InstallmentCount::new(value).map_err(|e| e.to_string())?),
            Err(_) => {
                warnings.push("El campo \"installments\" no es numérico, se ignoró".to_string());
                None
            }
        },
    };
    let installment_price = row
        .value("installmentPrice")
        .and_then(|raw| raw.parse::<f64>().ok())
        .map(ProductPrice::new)
        .transpose()
        .map_err(|e| e.to_string())?;

    let shipping = row
        .value("shipping")
        .is_some_and(|raw| raw.eq_ignore_ascii_case("true"));

    let kind = match product_type {
        ProductType::Cellphone => {
            let mut specs = BTreeMap::new();
            for column in TECH_SPEC_COLUMNS {
                if let Some(value) = row.value(column) {
                    specs.insert(column.to_string(), value.to_string());
                }
            }
            ProductKind::Cellphone {
                imei: row.value("imei").map(Imei::new).transpose().map_err(|e| e.to_string())?,
                specs,
            }
        }
        ProductType::Accessory => ProductKind::Accessory {
            category: AccessoryCategory::new(
                row.value("category").unwrap_or(DEFAULT_ACCESSORY_CATEGORY),
            )
            .map_err(|e| e.to_string())?,
        },
    };

    Ok(MappedImportRow {
        brand,
        product: NewProduct {
            brand_id: None,
            model,
            color,
            description: row.value("description").map(str::to_string),
            list_price,
            cost_price,
            discount,
            stock,
            image_urls: parse_row_image_urls(row)?,
            shipping,
            installments,
            installment_price,
            kind,
        },
        warnings,
    })
}

/// Core business logic of the bulk import.
///
/// Rows are written sequentially and independently; a failed row is recorded
/// and the batch continues. Only structural problems (no rows at all, the
/// brand list unavailable) fail the whole operation.
pub fn import_products<R>(
    parsed: &ParsedUpload,
    product_type: ProductType,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ImportReport>
where
    R: BrandReader + BrandWriter + ProductWriter,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    if parsed.rows.is_empty() {
        return Err(ServiceError::Form("El archivo está vacío.".to_string()));
    }

    let known_brands = match repo.list_brands() {
        Ok(brands) => brands,
        Err(e) => {
            log::error!("Failed to list brands for import: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let mut report = ImportReport::default();

    for row in &parsed.rows {
        let mapped = match map_import_row(row, product_type, &known_brands) {
            Ok(mapped) => mapped,
            Err(message) => {
                report.push_error(row.row_number, message);
                continue;
            }
        };

        for warning in &mapped.warnings {
            report.push_warning(row.row_number, warning);
        }

        let brand = match repo.get_or_create_brand(&mapped.brand) {
            Ok(brand) => brand,
            Err(e) => {
                report.push_error(row.row_number, e.to_string());
                continue;
            }
        };

        let mut product = mapped.product;
        product.brand_id = Some(brand.id);

        match repo.create_product(&product) {
            Ok(_) => report.success_count += 1,
            Err(e) => report.push_error(row.row_number, e.to_string()),
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DownloadError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

pub const PRODUCT_EXPORT_HEADERS: [&str; 16] = [
    "id",
    "type",
    "brand",
    "model",
    "color",
    "description",
    "salePrice",
    "originalPrice",
    "costPrice",
    "discount",
    "stock",
    "shipping",
    "installments",
    "installmentPrice",
    "imei",
    "category",
];

pub const ORDER_EXPORT_HEADERS: [&str; 9] = [
    "id",
    "payment_id",
    "status",
    "amount",
    "currency",
    "payer_email",
    "created_at",
    "date_approved",
    "items",
];

/// Flattens a product to one export row: the brand relation becomes its
/// display name, image data is omitted, and variant fields fill their own
/// columns (empty for the other variant).
pub fn flatten_product_row(product: &Product) -> Vec<String> {
    let (imei, category) = match &product.kind {
        ProductKind::Cellphone { imei, .. } => (
            imei.as_ref().map(ToString::to_string).unwrap_or_default(),
            String::new(),
        ),
        ProductKind::Accessory { category } => (String::new(), category.to_string()),
    };

    vec![
        product.id.to_string(),
        product.kind.product_type().to_string(),
        product.brand.clone(),
        product.model.to_string(),
        product.color.to_string(),
        product.description.clone().unwrap_or_default(),
        product.sale_price.to_string(),
        product
            .original_price
            .map(|price| price.to_string())
            .unwrap_or_default(),
        product.cost_price.to_string(),
        product.discount.to_string(),
        product.stock.to_string(),
        if product.shipping { "TRUE" } else { "FALSE" }.to_string(),
        product
            .installments
            .map(|count| count.to_string())
            .unwrap_or_default(),
        product
            .installment_price
            .map(|price| price.to_string())
            .unwrap_or_default(),
        imei,
        category,
    ]
}

/// Flattens an order to one export row; the item list is serialized to JSON
/// text so it survives the trip through a single cell.
pub fn flatten_order_row(order: &Order) -> Vec<String> {
    vec![
        order.id.to_string(),
        order.payment_id.clone(),
        order.status.clone(),
        order.amount.to_string(),
        order.currency.clone(),
        order.payer_email.clone(),
        order.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        order
            .date_approved
            .map(|date| date.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default(),
        serde_json::to_string(&order.items).unwrap_or_else(|_| "[]".to_string()),
    ]
}

pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(headers)
                .map_err(|_| DownloadError::CsvRender)?;
            for row in rows {
                let escaped_row: Vec<String> =
                    row.iter().map(|value| escape_csv_cell(value)).collect();
                writer
                    .write_record(&escaped_row)
                    .map_err(|_| DownloadError::CsvRender)?;
            }
            let bytes = writer.into_inner().map_err(|_| DownloadError::CsvRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.csv"),
                content_type: "text/csv; charset=utf-8",
                bytes,
            })
        }
        DownloadFormat::Xlsx => {
            let mut workbook = rust_xlsxwriter::Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in headers.iter().enumerate() {
                worksheet
                    .write_string(0, col_idx as u16, *header)
                    .map_err(|_| DownloadError::XlsxRender)?;
            }

            for (row_idx, row) in rows.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col_idx, value) in row.iter().enumerate() {
                    worksheet
                        .write_string(sheet_row, col_idx as u16, value)
                        .map_err(|_| DownloadError::XlsxRender)?;
                }
            }

            let bytes = workbook
                .save_to_buffer()
                .map_err(|_| DownloadError::XlsxRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

fn escape_csv_cell(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}

/// Renders the full inventory as a downloadable file.
pub fn download_inventory<R>(
    format: &str,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<DownloadFile>
where
    R: ProductReader,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let format =
        DownloadFormat::try_from(format).map_err(|e| ServiceError::Form(e.to_string()))?;

    let products = match repo.list_products(ProductListQuery::default()) {
        Ok(products) => products,
        Err(e) => {
            log::error!("Failed to list products for export: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let rows = products.iter().map(flatten_product_row).collect::<Vec<_>>();

    render_download_file("inventario", format, &PRODUCT_EXPORT_HEADERS, &rows).map_err(|e| {
        log::error!("Failed to render inventory download: {e}");
        ServiceError::Internal
    })
}

/// Renders all orders as a downloadable file.
pub fn download_orders<R>(
    format: &str,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<DownloadFile>
where
    R: OrderReader,
{
    if !user.has_access() {
        return Err(ServiceError::Unauthorized);
    }

    let format =
        DownloadFormat::try_from(format).map_err(|e| ServiceError::Form(e.to_string()))?;

    let orders = match repo.list_orders(OrderListQuery::default()) {
        Ok(orders) => orders,
        Err(e) => {
            log::error!("Failed to list orders for export: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let rows = orders.iter().map(flatten_order_row).collect::<Vec<_>>();

    render_download_file("ventas", format, &ORDER_EXPORT_HEADERS, &rows).map_err(|e| {
        log::error!("Failed to render orders download: {e}");
        ServiceError::Internal
    })
}
