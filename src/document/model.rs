use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numbering::DocumentNumber;

/// The two document kinds the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Invoice,
    PurchaseOrder,
}

impl DocumentKind {
    /// Heading printed at the top of the page.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::PurchaseOrder => "PURCHASE ORDER",
        }
    }

    /// Artifact file name prefix.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::PurchaseOrder => "PO",
        }
    }

    pub fn number_label(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice Number",
            Self::PurchaseOrder => "PO Number",
        }
    }

    /// `Invoice_0001` style artifact stem.
    pub fn artifact_stem(&self, index: u32) -> String {
        format!("{}_{:04}", self.file_prefix(), index)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Invoice => "Invoice",
            Self::PurchaseOrder => "PurchaseOrder",
        })
    }
}

/// Which kinds a run produces for every supplier group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    Invoice,
    PurchaseOrder,
    #[default]
    Both,
}

impl GenerationMode {
    /// Kinds in rendering order.
    pub fn kinds(&self) -> &'static [DocumentKind] {
        match self {
            Self::Invoice => &[DocumentKind::Invoice],
            Self::PurchaseOrder => &[DocumentKind::PurchaseOrder],
            Self::Both => &[DocumentKind::Invoice, DocumentKind::PurchaseOrder],
        }
    }

    pub fn includes(&self, kind: DocumentKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "invoice" | "invoices" => Ok(Self::Invoice),
            "po" | "purchaseorder" | "purchase_order" | "purchase order" => {
                Ok(Self::PurchaseOrder)
            }
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown generation mode '{other}', expected Invoice, PO or Both"
            )),
        }
    }
}

/// One product/quantity/price entry on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductLine {
    pub name: String,
    pub code: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl ProductLine {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            quantity,
            unit_price,
        }
    }

    /// Saturates at `Decimal::MAX`; catalog input is bounded well below it.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// The vendor side of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierParty {
    pub name: String,
    pub address: String,
}

impl SupplierParty {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Name as printed in the vendor block.
    pub fn display_name(&self) -> String {
        format!("{} Supply", self.name)
    }
}

/// Financial summary of a document. `shipping` is only present on invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Option<Decimal>,
    pub total: Decimal,
}

/// A fully specified document. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub(super) kind: DocumentKind,
    pub(super) sequence: u32,
    pub(super) number: DocumentNumber,
    pub(super) counterpart_number: Option<DocumentNumber>,
    pub(super) date: NaiveDate,
    pub(super) supplier: SupplierParty,
    pub(super) customer_name: String,
    pub(super) lines: Vec<ProductLine>,
    pub(super) totals: Totals,
    pub(super) carrier: String,
    pub(super) payment_terms: String,
}

impl DocumentRecord {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Batch sequence index the record was numbered from.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn number(&self) -> &DocumentNumber {
        &self.number
    }

    /// PO number on an invoice; always `None` on a purchase order.
    pub fn counterpart_number(&self) -> Option<&DocumentNumber> {
        self.counterpart_number.as_ref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn supplier(&self) -> &SupplierParty {
        &self.supplier
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn lines(&self) -> &[ProductLine] {
        &self.lines
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn payment_terms(&self) -> &str {
        &self.payment_terms
    }

    pub fn artifact_stem(&self) -> String {
        self.kind.artifact_stem(self.sequence)
    }
}
