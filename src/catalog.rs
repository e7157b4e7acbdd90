//! Product catalog input.
//!
//! Parses the uploaded CSV table into typed rows, provides the built-in
//! example table, and groups rows by supplier in first-appearance order.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

/// Columns every catalog must provide. Additional columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["supplier", "product_name", "product_code", "unit_price"];

const EXAMPLE_SUPPLIERS: [&str; 5] = ["Moen", "GE", "Kohler", "Copeland", "Hydromatic"];
/// Name, code and unit price in cents.
const EXAMPLE_PRODUCTS: [(&str, &str, i64); 5] = [
    ("Widget A", "A1", 9999),
    ("Widget B", "B2", 12999),
    ("Widget C", "C3", 14999),
    ("Widget D", "D4", 8999),
    ("Widget E", "E5", 10999),
];
const EXAMPLE_REPEAT: usize = 5;

/// Largest accepted unit price.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: supplier must not be empty")]
    EmptySupplier { row: usize },
    #[error("row {row}: invalid unit price `{value}`")]
    InvalidPrice { row: usize, value: String },
    #[error("row {row}: unit price {value} must not be negative")]
    NegativePrice { row: usize, value: Decimal },
    #[error("row {row}: unit price {value} exceeds the maximum of {max}", max = MAX_UNIT_PRICE)]
    PriceTooLarge { row: usize, value: Decimal },
    #[error("no product catalog was provided")]
    MissingCatalog,
}

/// One product row of the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    pub supplier: String,
    pub product_name: String,
    pub product_code: String,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct RawCatalogRow {
    supplier: String,
    product_name: String,
    product_code: String,
    unit_price: String,
}

impl RawCatalogRow {
    fn into_row(self, row: usize) -> Result<CatalogRow, InputError> {
        if self.supplier.trim().is_empty() {
            return Err(InputError::EmptySupplier { row });
        }

        let unit_price = Decimal::from_str(self.unit_price.trim()).map_err(|_| {
            InputError::InvalidPrice {
                row,
                value: self.unit_price.clone(),
            }
        })?;
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(InputError::NegativePrice {
                row,
                value: unit_price,
            });
        }
        if unit_price > MAX_UNIT_PRICE {
            return Err(InputError::PriceTooLarge {
                row,
                value: unit_price,
            });
        }

        Ok(CatalogRow {
            supplier: self.supplier,
            product_name: self.product_name,
            product_code: self.product_code,
            unit_price,
        })
    }
}

/// An ordered product table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    /// Reads a CSV table, checking the header before any row is parsed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(InputError::MissingColumn(column));
            }
        }

        let mut rows = Vec::new();
        for (offset, record) in reader.deserialize::<RawCatalogRow>().enumerate() {
            // Line 1 is the header.
            let line = offset + 2;
            rows.push(record?.into_row(line)?);
        }

        Ok(Self { rows })
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        Self::from_reader(bytes)
    }

    /// The built-in example table: five suppliers with five rows each.
    pub fn example() -> Self {
        let mut rows = Vec::with_capacity(EXAMPLE_SUPPLIERS.len() * EXAMPLE_REPEAT);
        for _ in 0..EXAMPLE_REPEAT {
            for (supplier, (name, code, cents)) in EXAMPLE_SUPPLIERS.iter().zip(EXAMPLE_PRODUCTS) {
                rows.push(CatalogRow {
                    supplier: supplier.to_string(),
                    product_name: name.to_string(),
                    product_code: code.to_string(),
                    unit_price: Decimal::new(cents, 2),
                });
            }
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn group_by_supplier(&self) -> SupplierGroups {
        let mut groups: IndexMap<String, Vec<CatalogRow>> = IndexMap::new();
        for row in &self.rows {
            groups
                .entry(row.supplier.clone())
                .or_default()
                .push(row.clone());
        }
        SupplierGroups { groups }
    }

    /// Writes the table back out as CSV with the canonical header.
    pub fn to_csv(&self) -> Result<Vec<u8>, InputError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| InputError::Csv(csv::Error::from(e.into_error())))
    }
}

/// Catalog rows keyed by supplier, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct SupplierGroups {
    groups: IndexMap<String, Vec<CatalogRow>>,
}

impl SupplierGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, supplier: &str) -> Option<&[CatalogRow]> {
        self.groups.get(supplier).map(Vec::as_slice)
    }

    pub fn suppliers(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CatalogRow])> {
        self.groups
            .iter()
            .map(|(supplier, rows)| (supplier.as_str(), rows.as_slice()))
    }
}
