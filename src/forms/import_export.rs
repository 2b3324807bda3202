use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;

/// Columns every import row must provide, regardless of product type.
pub const REQUIRED_COLUMNS: [&str; 5] = ["brand", "model", "color", "salePrice", "stock"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for UploadFormat {
    type Error = UploadParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(UploadParseError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadImportForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
    pub format: Text<String>,
    /// Product-type discriminator: `cellphone` or `accessory`.
    pub product_type: Text<String>,
}

/// One spreadsheet row keyed by header name.
///
/// `row_number` is the 1-based spreadsheet row (data index + header row), the
/// number reported back in import errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUploadRow {
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl ParsedUploadRow {
    /// Returns the trimmed cell under `column`, or `None` when absent/empty.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpload {
    pub format: UploadFormat,
    pub headers: Vec<String>,
    pub rows: Vec<ParsedUploadRow>,
}

#[derive(Debug, Error)]
pub enum UploadParseError {
    #[error("invalid upload format: {0}")]
    InvalidFormat(String),
    #[error("uploaded file is missing")]
    MissingFile,
    #[error("uploaded file extension does not match selected format")]
    ExtensionMismatch,
    #[error("failed to read uploaded file")]
    ReadFailed,
    #[error("failed to parse CSV")]
    CsvParseFailed,
    #[error("failed to parse XLSX")]
    XlsxParseFailed,
    #[error("uploaded file has no worksheet")]
    XlsxMissingSheet,
    #[error("uploaded file has no data rows")]
    EmptySheet,
    #[error("header validation failed: {0}")]
    HeaderValidation(String),
}

impl From<std::io::Error> for UploadParseError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<csv::Error> for UploadParseError {
    fn from(_: csv::Error) -> Self {
        Self::CsvParseFailed
    }
}

impl From<calamine::Error> for UploadParseError {
    fn from(_: calamine::Error) -> Self {
        Self::XlsxParseFailed
    }
}

/// Reads the uploaded spreadsheet into header-keyed rows.
///
/// Only the first worksheet is considered. Header names keep their original
/// casing: product columns are camelCase (`salePrice`) while technical-spec
/// columns are capitalized Spanish (`Pantalla`), matching the sheets the shop
/// already uses.
pub fn parse_upload(form: &mut UploadImportForm) -> Result<ParsedUpload, UploadParseError> {
    let format = UploadFormat::try_from(form.format.as_str())?;

    validate_file_meta(form, format)?;

    let (headers, rows) = match format {
        UploadFormat::Csv => parse_csv_rows(form)?,
        UploadFormat::Xlsx => parse_xlsx_rows(form)?,
    };

    let headers = normalize_headers(headers)?;
    validate_headers(&headers)?;

    if rows.is_empty() {
        return Err(UploadParseError::EmptySheet);
    }

    let parsed_rows = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut values = HashMap::new();
            for (col_idx, header) in headers.iter().enumerate() {
                let value = row.get(col_idx).cloned().unwrap_or_default();
                values.insert(header.clone(), value.trim().to_string());
            }
            ParsedUploadRow {
                row_number: idx + 2,
                values,
            }
        })
        .collect::<Vec<_>>();

    Ok(ParsedUpload {
        format,
        headers,
        rows: parsed_rows,
    })
}

fn normalize_headers(headers: Vec<String>) -> Result<Vec<String>, UploadParseError> {
    let normalized = headers
        .into_iter()
        .map(|header| header.trim().to_string())
        .collect::<Vec<_>>();

    if normalized.is_empty() {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    }

    if normalized.iter().any(|header| header.is_empty()) {
        return Err(UploadParseError::HeaderValidation(
            "header contains empty column name".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for header in &normalized {
        if !seen.insert(header.clone()) {
            return Err(UploadParseError::HeaderValidation(format!(
                "duplicate header column: {header}"
            )));
        }
    }

    Ok(normalized)
}

fn validate_headers(headers: &[String]) -> Result<(), UploadParseError> {
    let header_set = headers.iter().map(String::as_str).collect::<HashSet<_>>();

    for required in REQUIRED_COLUMNS {
        if !header_set.contains(required) {
            return Err(UploadParseError::HeaderValidation(format!(
                "missing required column: {required}"
            )));
        }
    }

    Ok(())
}

fn validate_file_meta(
    form: &UploadImportForm,
    format: UploadFormat,
) -> Result<(), UploadParseError> {
    let Some(file_name) = form.file.file_name.as_ref() else {
        return Err(UploadParseError::MissingFile);
    };

    let extension_ok = match format {
        UploadFormat::Csv => file_name.to_ascii_lowercase().ends_with(".csv"),
        UploadFormat::Xlsx => file_name.to_ascii_lowercase().ends_with(".xlsx"),
    };

    if !extension_ok {
        return Err(UploadParseError::ExtensionMismatch);
    }

    Ok(())
}

fn parse_csv_rows(
    form: &mut UploadImportForm,
) -> Result<(Vec<String>, Vec<Vec<String>>), UploadParseError> {
    let file = form.file.file.as_file_mut();
    file.seek(SeekFrom::Start(0))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok((headers, rows))
}

fn parse_xlsx_rows(
    form: &mut UploadImportForm,
) -> Result<(Vec<String>, Vec<Vec<String>>), UploadParseError> {
    let path = form.file.file.path().to_path_buf();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(UploadParseError::XlsxMissingSheet)??;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    };

    let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();

    let mut rows = Vec::new();
    for row in iter {
        rows.push(row.iter().map(cell_to_string).collect::<Vec<_>>());
    }

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_headers_with_all_required_columns() {
        let headers = headers(&[
            "brand",
            "model",
            "color",
            "salePrice",
            "stock",
            "Pantalla",
            "RAM",
        ]);
        assert!(validate_headers(&headers).is_ok());
    }

    #[test]
    fn rejects_headers_missing_a_required_column() {
        let headers = headers(&["brand", "model", "color", "stock"]);
        let err = validate_headers(&headers).unwrap_err().to_string();
        assert!(err.contains("salePrice"));
    }

    #[test]
    fn rejects_duplicate_header_columns() {
        let err = normalize_headers(headers(&["brand", "brand"]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn header_case_is_preserved() {
        let normalized = normalize_headers(headers(&[" salePrice ", "Pantalla"])).unwrap();
        assert_eq!(normalized, vec!["salePrice", "Pantalla"]);
    }

    #[test]
    fn row_value_filters_empty_cells() {
        let mut values = HashMap::new();
        values.insert("model".to_string(), "".to_string());
        values.insert("color".to_string(), "Negro".to_string());
        let row = ParsedUploadRow {
            row_number: 2,
            values,
        };

        assert_eq!(row.value("model"), None);
        assert_eq!(row.value("color"), Some("Negro"));
        assert_eq!(row.value("stock"), None);
    }
}
