//! Document numbering and randomized document attributes.
//!
//! Numbers are derived from a per-run sequence index. Nothing is persisted
//! between runs, so uniqueness only holds within a single batch.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;

/// Carriers a purchase order may ship with.
pub const CARRIERS: [&str; 3] = ["FedEx Priority", "UPS Ground", "DHL Express"];

/// Payment terms printed on invoices.
pub const PAYMENT_TERMS: [&str; 3] = ["2% net 10, net 30", "Net 30", "Net 45"];

/// Whole-dollar shipping charge range.
pub const SHIPPING_COST_RANGE: RangeInclusive<u32> = 100..=400;

/// Quantity assigned to each sampled product line.
pub const QUANTITY_RANGE: RangeInclusive<u32> = 5..=25;

const STREET_NUMBER_RANGE: RangeInclusive<u32> = 100..=999;
const NUMBER_OFFSET: u32 = 10_000;

/// Prefix of a document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumberPrefix {
    Invoice,
    PurchaseOrder,
}

impl NumberPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::PurchaseOrder => "PO",
        }
    }
}

/// A document identifier of the form `INV-2025-10001`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentNumber {
    prefix: NumberPrefix,
    year: i32,
    index: u32,
}

impl DocumentNumber {
    pub fn new(prefix: NumberPrefix, year: i32, index: u32) -> Self {
        Self {
            prefix,
            year,
            index,
        }
    }

    pub fn prefix(&self) -> NumberPrefix {
        self.prefix
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Sequence index the number was assigned from (starts at 1).
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Numeric suffix printed on the document.
    pub fn serial(&self) -> u32 {
        NUMBER_OFFSET + self.index
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}-{}",
            self.prefix.as_str(),
            self.year,
            self.serial()
        )
    }
}

impl Serialize for DocumentNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Both numbers reserved for one supplier group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSlot {
    pub index: u32,
    pub invoice: DocumentNumber,
    pub purchase_order: DocumentNumber,
}

/// Monotonic per-run sequence. Invoice and PO numbers share the index but
/// carry independent prefixes.
#[derive(Debug, Clone)]
pub struct DocumentSequence {
    year: i32,
    next: u32,
}

impl DocumentSequence {
    pub fn new(year: i32) -> Self {
        Self { year, next: 1 }
    }

    /// Index the next call to [`DocumentSequence::next_slot`] will hand out.
    pub fn peek(&self) -> u32 {
        self.next
    }

    pub fn next_slot(&mut self) -> NumberSlot {
        let index = self.next;
        self.next += 1;
        NumberSlot {
            index,
            invoice: DocumentNumber::new(NumberPrefix::Invoice, self.year, index),
            purchase_order: DocumentNumber::new(NumberPrefix::PurchaseOrder, self.year, index),
        }
    }
}

/// Attributes drawn once per supplier group and shared by its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncillaryAttributes {
    pub carrier: String,
    pub payment_terms: String,
    pub shipping_cost: Decimal,
}

/// Source of every random choice made during a run.
///
/// Unseeded randomizers draw from OS entropy; a seed makes a whole run
/// reproducible.
pub struct DocumentRandomizer {
    rng: StdRng,
}

impl DocumentRandomizer {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn carrier(&mut self) -> &'static str {
        CARRIERS[self.rng.gen_range(0..CARRIERS.len())]
    }

    pub fn payment_terms(&mut self) -> &'static str {
        PAYMENT_TERMS[self.rng.gen_range(0..PAYMENT_TERMS.len())]
    }

    pub fn shipping_cost(&mut self) -> Decimal {
        Decimal::from(self.rng.gen_range(SHIPPING_COST_RANGE))
    }

    pub fn quantity(&mut self) -> u32 {
        self.rng.gen_range(QUANTITY_RANGE)
    }

    /// Street address used for a supplier's vendor block.
    pub fn street_address(&mut self, supplier: &str) -> String {
        let number = self.rng.gen_range(STREET_NUMBER_RANGE);
        format!("{number} {supplier} Rd, City, ST")
    }

    pub fn ancillary(&mut self) -> AncillaryAttributes {
        AncillaryAttributes {
            carrier: self.carrier().to_string(),
            payment_terms: self.payment_terms().to_string(),
            shipping_cost: self.shipping_cost(),
        }
    }

    /// Picks up to `amount` distinct elements in random order.
    pub fn sample<'a, T>(&mut self, items: &'a [T], amount: usize) -> Vec<&'a T> {
        items
            .choose_multiple(&mut self.rng, amount.min(items.len()))
            .collect()
    }
}

impl fmt::Debug for DocumentRandomizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRandomizer").finish_non_exhaustive()
    }
}
