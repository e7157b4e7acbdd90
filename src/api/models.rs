use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by `POST /api/documents`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateDocumentsRequest {
    /// CSV with columns supplier, product_name, product_code, unit_price.
    #[allow(unused)]
    pub catalog: Option<Vec<u8>>,
    /// Use the built-in example table instead of an upload.
    #[allow(unused)]
    pub use_preset: Option<bool>,
    /// Invoice logos; the file stem must match a supplier name.
    #[allow(unused)]
    pub invoice_logos: Option<Vec<Vec<u8>>>,
    /// Purchase order logos; the file stem must match a supplier name.
    #[allow(unused)]
    pub po_logos: Option<Vec<Vec<u8>>>,
    #[allow(unused)]
    pub customer_name: Option<String>,
    /// Invoice, PO or Both.
    #[allow(unused)]
    pub mode: Option<String>,
    /// Number of supplier groups, 1 to 50.
    #[allow(unused)]
    pub count: Option<u32>,
    #[allow(unused)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
