//! Document model - immutable invoice and purchase order records.
//!
//! - `model` - kinds, product lines, parties, totals and the record itself
//! - `builder` - financial computation and record assembly per supplier group

pub mod builder;
pub mod model;

pub use builder::{compute_totals, DocumentBuilder, OrderGroup, TAX_RATE};
pub use model::{
    DocumentKind, DocumentRecord, GenerationMode, ProductLine, SupplierParty, Totals,
};
