use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpResponse, Responder};
use chrono::Local;
use log::{debug, error, info, warn};

use super::models::{GenerateDocumentsRequest, HealthResponse};
use super::multipart_parser::MultipartParser;
use crate::batch::BatchError;
use crate::catalog::Catalog;
use crate::{AppState, ErrorResponse};

const SAMPLE_CATALOG_FILENAME: &str = "sample_catalog.csv";

fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

fn attachment(filename: &str) -> (header::HeaderName, String) {
    (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename),
    )
}

fn batch_error_response(e: &BatchError) -> HttpResponse {
    if e.is_client_error() {
        warn!("Rejected generation request: {}", e);
        HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
    } else {
        error!("Generation run failed: {}", e);
        HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Generator",
    post,
    path = "/documents",
    request_body(content = inline(GenerateDocumentsRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "ZIP bundle of generated documents", content_type = "application/zip", body = Vec<u8>),
        (status = 400, description = "Invalid catalog or settings", body = ErrorResponse),
        (status = 500, description = "Rendering or packaging failed", body = ErrorResponse)
    )
)]
pub async fn generate_documents(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing generate_documents handler");

    let form = match MultipartParser::parse_generation_multipart(payload).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Failed to parse generation form: {}", e);
            return HttpResponse::from(e);
        }
    };
    debug!(
        "Form parsed: preset={}, csv={}, invoice logos={}, po logos={}",
        form.use_preset,
        form.catalog_csv.is_some(),
        form.invoice_logos.len(),
        form.po_logos.len()
    );

    let request = form.into_request(&data.default_customer);
    let generator = data.generator.clone();
    let run_date = Local::now().date_naive();

    match web::block(move || generator.generate(request, run_date)).await {
        Ok(Ok(bundle)) => {
            info!(
                "Run {} finished with {} documents",
                bundle.report.run_id,
                bundle.report.documents.len()
            );
            HttpResponse::Ok()
                .content_type(content_type_for(bundle.filename))
                .insert_header(attachment(bundle.filename))
                .insert_header(("X-Run-Id", bundle.report.run_id.to_string()))
                .insert_header(("X-Document-Count", bundle.report.documents.len().to_string()))
                .body(bundle.bytes)
        }
        Ok(Err(e)) => batch_error_response(&e),
        Err(e) => {
            error!("Generation task was cancelled: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Generation task was cancelled"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Document Generator",
    get,
    path = "/documents/sample-catalog",
    responses(
        (status = 200, description = "The built-in example catalog as CSV", content_type = "text/csv", body = String),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn get_sample_catalog() -> impl Responder {
    match Catalog::example().to_csv() {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type_for(SAMPLE_CATALOG_FILENAME))
            .insert_header(attachment(SAMPLE_CATALOG_FILENAME))
            .body(bytes),
        Err(e) => {
            error!("Failed to serialize sample catalog: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::ok())
}
