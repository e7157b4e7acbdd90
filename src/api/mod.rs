//! HTTP surface of the document generator.

pub mod handlers;
pub mod models;
pub mod multipart_parser;

use actix_web::web;

/// Registers every route; `/api` routes are scoped here.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/documents")
                    .route(web::post().to(handlers::generate_documents)),
            )
            .service(
                web::resource("/documents/sample-catalog")
                    .route(web::get().to(handlers::get_sample_catalog)),
            ),
    )
    .service(web::resource("/health").route(web::get().to(handlers::health)));
}
