use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::model::{
    DocumentKind, DocumentRecord, GenerationMode, ProductLine, SupplierParty, Totals,
};
use crate::numbering::{AncillaryAttributes, NumberSlot};

/// Sales tax applied to every document (6.5%).
pub const TAX_RATE: Decimal = Decimal::from_parts(65, 0, 0, false, 3);

/// Everything known about one supplier group before documents are built.
#[derive(Debug, Clone)]
pub struct OrderGroup {
    pub supplier: SupplierParty,
    pub customer_name: String,
    pub lines: Vec<ProductLine>,
    pub attributes: AncillaryAttributes,
}

/// Sum of line totals, tax rounded to cents (half away from zero), shipping
/// only when given. Arithmetic saturates instead of overflowing.
pub fn compute_totals(lines: &[ProductLine], shipping: Option<Decimal>) -> Totals {
    let subtotal = lines
        .iter()
        .map(ProductLine::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let tax = subtotal
        .saturating_mul(TAX_RATE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let total = subtotal
        .saturating_add(tax)
        .saturating_add(shipping.unwrap_or(Decimal::ZERO));

    Totals {
        subtotal,
        tax,
        shipping,
        total,
    }
}

/// Assembles document records for a single run date.
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder {
    run_date: NaiveDate,
}

impl DocumentBuilder {
    pub fn new(run_date: NaiveDate) -> Self {
        Self { run_date }
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    /// Year stamped into document numbers.
    pub fn year(&self) -> i32 {
        self.run_date.year()
    }

    pub fn date_for(&self, kind: DocumentKind) -> NaiveDate {
        match kind {
            DocumentKind::Invoice => self.run_date,
            DocumentKind::PurchaseOrder => self.run_date.pred_opt().unwrap_or(self.run_date),
        }
    }

    pub fn build(&self, kind: DocumentKind, group: &OrderGroup, slot: &NumberSlot) -> DocumentRecord {
        let (number, counterpart_number, shipping) = match kind {
            DocumentKind::Invoice => (
                slot.invoice.clone(),
                Some(slot.purchase_order.clone()),
                Some(group.attributes.shipping_cost),
            ),
            DocumentKind::PurchaseOrder => (slot.purchase_order.clone(), None, None),
        };

        DocumentRecord {
            kind,
            sequence: slot.index,
            number,
            counterpart_number,
            date: self.date_for(kind),
            supplier: group.supplier.clone(),
            customer_name: group.customer_name.clone(),
            lines: group.lines.clone(),
            totals: compute_totals(&group.lines, shipping),
            carrier: group.attributes.carrier.clone(),
            payment_terms: group.attributes.payment_terms.clone(),
        }
    }

    /// Builds every record the mode asks for, in rendering order.
    pub fn build_for_mode(
        &self,
        mode: GenerationMode,
        group: &OrderGroup,
        slot: &NumberSlot,
    ) -> Vec<DocumentRecord> {
        mode.kinds()
            .iter()
            .map(|kind| self.build(*kind, group, slot))
            .collect()
    }
}
