use serde::{Deserialize, Serialize};

use super::validation::{validate_range, validate_required, ValidationErrors, Validator};
use crate::document::GenerationMode;

pub const DEFAULT_CUSTOMER_NAME: &str = "Ferguson Enterprises, LLC";
pub const DEFAULT_DOCUMENT_COUNT: u32 = 5;
pub const MIN_DOCUMENT_COUNT: u32 = 1;
pub const MAX_DOCUMENT_COUNT: u32 = 50;

/// Maximum product lines sampled per supplier group.
pub const MAX_LINES_PER_GROUP: usize = 5;

/// Options recognized by a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    pub customer_name: String,
    pub mode: GenerationMode,
    /// Number of distinct supplier groups, not of artifacts.
    pub document_count: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
            mode: GenerationMode::default(),
            document_count: DEFAULT_DOCUMENT_COUNT,
            seed: None,
        }
    }
}

impl BatchSettings {
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_document_count(mut self, count: u32) -> Self {
        self.document_count = count;
        self
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = name.into();
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Validator for BatchSettings {
    fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.customer_name, "customer_name", "Customer name", &mut errors);
        validate_range(
            i64::from(self.document_count),
            i64::from(MIN_DOCUMENT_COUNT),
            i64::from(MAX_DOCUMENT_COUNT),
            "count",
            &mut errors,
        );

        errors.into_result()
    }
}
