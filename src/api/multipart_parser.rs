use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use futures::StreamExt;
use log::debug;
use sanitize_filename::sanitize;

use crate::assets::UploadedImage;
use crate::batch::{BatchSettings, CatalogSource, GenerationRequest};
use crate::document::GenerationMode;
use crate::ErrorResponse;

/// Form fields of a generation request, before defaults are applied.
#[derive(Debug, Default)]
pub struct ParsedGenerationForm {
    pub catalog_csv: Option<Vec<u8>>,
    pub use_preset: bool,
    pub invoice_logos: Vec<UploadedImage>,
    pub po_logos: Vec<UploadedImage>,
    pub customer_name: Option<String>,
    pub mode: Option<GenerationMode>,
    pub count: Option<u32>,
    pub seed: Option<u64>,
}

impl ParsedGenerationForm {
    /// The preset wins over an uploaded table when both are sent.
    pub fn catalog_source(&self) -> Option<CatalogSource> {
        if self.use_preset {
            Some(CatalogSource::Example)
        } else {
            self.catalog_csv.clone().map(CatalogSource::Csv)
        }
    }

    pub fn into_request(self, default_customer: &str) -> GenerationRequest {
        let catalog = self.catalog_source();
        let defaults = BatchSettings::default();
        let settings = BatchSettings {
            customer_name: self
                .customer_name
                .unwrap_or_else(|| default_customer.to_string()),
            mode: self.mode.unwrap_or(defaults.mode),
            document_count: self.count.unwrap_or(defaults.document_count),
            seed: self.seed,
        };

        GenerationRequest {
            catalog,
            invoice_logos: self.invoice_logos,
            purchase_order_logos: self.po_logos,
            settings,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
    #[error("Invalid value for `{field}`: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&error.to_string())),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string())),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    pub async fn parse_generation_multipart(
        mut multipart: Multipart,
    ) -> Result<ParsedGenerationForm, MultipartParseError> {
        let mut form = ParsedGenerationForm::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| MultipartParseError::FieldError("Content disposition not found".to_string()))?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let filename = content_disposition.get_filename().map(sanitize);

            match name.as_str() {
                "catalog" => {
                    let bytes = read_bytes(&mut field).await?;
                    // Browsers send an empty part when no file was chosen.
                    if !bytes.is_empty() {
                        form.catalog_csv = Some(bytes);
                    }
                }
                "invoice_logos" | "po_logos" => {
                    let bytes = read_bytes(&mut field).await?;
                    let Some(filename) = filename.filter(|f| !f.is_empty()) else {
                        debug!("Ignoring {} part without a file name", name);
                        continue;
                    };
                    if bytes.is_empty() {
                        continue;
                    }
                    let upload = UploadedImage::new(filename, bytes);
                    if name == "invoice_logos" {
                        form.invoice_logos.push(upload);
                    } else {
                        form.po_logos.push(upload);
                    }
                }
                "use_preset" => {
                    let value = read_text(&mut field).await?;
                    form.use_preset = parse_flag(&value);
                }
                "customer_name" => {
                    let value = read_text(&mut field).await?;
                    if !value.trim().is_empty() {
                        form.customer_name = Some(value.trim().to_string());
                    }
                }
                "mode" => {
                    let value = read_text(&mut field).await?;
                    if !value.trim().is_empty() {
                        let mode = value
                            .trim()
                            .parse()
                            .map_err(|message| MultipartParseError::InvalidValue { field: "mode", message })?;
                        form.mode = Some(mode);
                    }
                }
                "count" => {
                    let value = read_text(&mut field).await?;
                    if !value.trim().is_empty() {
                        let count = value.trim().parse().map_err(|_| MultipartParseError::InvalidValue {
                            field: "count",
                            message: format!("`{}` is not a whole number", value.trim()),
                        })?;
                        form.count = Some(count);
                    }
                }
                "seed" => {
                    let value = read_text(&mut field).await?;
                    if !value.trim().is_empty() {
                        let seed = value.trim().parse().map_err(|_| MultipartParseError::InvalidValue {
                            field: "seed",
                            message: format!("`{}` is not an unsigned integer", value.trim()),
                        })?;
                        form.seed = Some(seed);
                    }
                }
                _ => {
                    // Drain unknown parts so the stream can advance.
                    read_bytes(&mut field).await?;
                }
            }
        }

        Ok(form)
    }
}

async fn read_bytes(field: &mut Field) -> Result<Vec<u8>, MultipartParseError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        buffer.extend_from_slice(&data_chunk);
    }
    Ok(buffer)
}

async fn read_text(field: &mut Field) -> Result<String, MultipartParseError> {
    let bytes = read_bytes(field).await?;
    String::from_utf8(bytes).map_err(|e| MultipartParseError::Utf8Error(e.to_string()))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
