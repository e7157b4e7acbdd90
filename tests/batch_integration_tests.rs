mod common;

use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::tempdir;

use tradedocs_server::assets::UploadedImage;
use tradedocs_server::batch::{BatchError, BatchSettings, CatalogSource, GenerationRequest, GenerationService};
use tradedocs_server::catalog::InputError;
use tradedocs_server::document::{DocumentKind, GenerationMode};
use tradedocs_server::layout::{PdfRenderer, TypstRenderEngine, TypstRenderer};

const CSV: &str = "\
supplier,product_name,product_code,unit_price
Moen,Faucet,F-1,49.50
Kohler,Sink,S-9,210.00
Moen,Valve,V-2,12.25
Zurn,Flush Kit,Z-4,30.00
Kohler,Drain,D-3,18.75
";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn service(root: &std::path::Path) -> GenerationService {
    GenerationService::new(Arc::new(PdfRenderer::new()), root)
}

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_example_catalog_both_mode_bundle() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Example),
        settings: BatchSettings::default().with_seed(Some(2024)),
        ..Default::default()
    };

    let bundle = service(root.path()).generate(request, run_date()).unwrap();

    assert_eq!(bundle.filename, "generated_docs.zip");
    let names = zip_names(&bundle.bytes);
    assert_eq!(names.len(), 10);
    assert_eq!(names.iter().filter(|n| n.starts_with("Invoice_")).count(), 5);
    assert_eq!(names.iter().filter(|n| n.starts_with("PO_")).count(), 5);
    assert!(names.contains(&"Invoice_0005.pdf".to_string()));

    for doc in &bundle.report.documents {
        match doc.kind {
            DocumentKind::Invoice => assert!(doc.total > doc.subtotal),
            DocumentKind::PurchaseOrder => assert_eq!(doc.total, doc.subtotal + doc.tax),
        }
    }
}

#[test]
fn test_uploaded_catalog_yields_one_group_per_supplier() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Csv(CSV.as_bytes().to_vec())),
        settings: BatchSettings::default()
            .with_mode(GenerationMode::Invoice)
            .with_document_count(50),
        ..Default::default()
    };

    let bundle = service(root.path()).generate(request, run_date()).unwrap();
    let report = &bundle.report;

    assert_eq!(report.groups, 3);
    let suppliers: Vec<&str> = report.documents.iter().map(|d| d.supplier.as_str()).collect();
    assert_eq!(suppliers, vec!["Moen", "Kohler", "Zurn"]);

    let moen = &report.documents[0];
    assert_eq!(moen.line_count, 2);
    assert_eq!(moen.number, "INV-2024-10001");
    assert_eq!(moen.counterpart_number.as_deref(), Some("PO-2024-10001"));

    let unique: HashSet<&str> = report.documents.iter().map(|d| d.number.as_str()).collect();
    assert_eq!(unique.len(), report.documents.len());
}

#[test]
fn test_purchase_order_dated_day_before_run() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Csv(CSV.as_bytes().to_vec())),
        settings: BatchSettings::default().with_mode(GenerationMode::PurchaseOrder),
        ..Default::default()
    };

    // 2024-01-01 minus one day crosses the year boundary, the number keeps the run year.
    let bundle = service(root.path()).generate(request, run_date()).unwrap();
    assert!(bundle
        .report
        .documents
        .iter()
        .all(|doc| doc.number.starts_with("PO-2024-") && doc.shipping.is_none()));
}

#[test]
fn test_logos_embedded_by_matching_stem() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Csv(CSV.as_bytes().to_vec())),
        invoice_logos: vec![
            UploadedImage::new("KOHLER.png", common::png_bytes(40, 20)),
            UploadedImage::new("Zurn.jpg", b"corrupt".to_vec()),
        ],
        purchase_order_logos: vec![UploadedImage::new("moen.png", common::png_bytes(10, 10))],
        settings: BatchSettings::default(),
    };

    let bundle = service(root.path()).generate(request, run_date()).unwrap();
    let embedded: Vec<(DocumentKind, &str)> = bundle
        .report
        .documents
        .iter()
        .filter(|d| d.logo_embedded)
        .map(|d| (d.kind, d.supplier.as_str()))
        .collect();

    assert_eq!(
        embedded,
        vec![(DocumentKind::PurchaseOrder, "Moen"), (DocumentKind::Invoice, "Kohler")]
    );
}

#[test]
fn test_bad_catalog_fails_before_any_output() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Csv(b"supplier,product_name,unit_price\nMoen,Faucet,1\n".to_vec())),
        ..Default::default()
    };

    let err = service(root.path()).generate(request, run_date()).unwrap_err();
    assert!(matches!(err, BatchError::Input(InputError::MissingColumn("product_code"))));
    assert!(err.is_client_error());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_catalog_is_input_error() {
    let root = tempdir().unwrap();
    let err = service(root.path())
        .generate(GenerationRequest::default(), run_date())
        .unwrap_err();
    assert!(matches!(err, BatchError::Input(InputError::MissingCatalog)));
}

#[test]
fn test_out_of_range_count_rejected() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Example),
        settings: BatchSettings::default().with_document_count(51),
        ..Default::default()
    };
    let err = service(root.path()).generate(request, run_date()).unwrap_err();
    assert!(matches!(err, BatchError::Settings(_)));
}

#[test]
fn test_default_runs_leave_no_run_directories() {
    let root = tempdir().unwrap();
    let generator = service(root.path());
    let request = || GenerationRequest {
        catalog: Some(CatalogSource::Example),
        ..Default::default()
    };

    for _ in 0..3 {
        let bundle = generator.generate(request(), run_date()).unwrap();
        assert_eq!(zip_names(&bundle.bytes).len(), 10);
        assert!(!root.path().join(bundle.report.run_id.to_string()).exists());
    }
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_failed_run_directory_is_removed() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Example),
        ..Default::default()
    };

    let err = GenerationService::new(Arc::new(TypstRenderer::new(TypstRenderEngine::new("typst-binary-that-does-not-exist"))), root.path())
        .generate(request, run_date())
        .unwrap_err();
    assert!(!err.is_client_error());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_run_directory_kept_when_retained() {
    let root = tempdir().unwrap();
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Example),
        settings: BatchSettings::default().with_document_count(1),
        ..Default::default()
    };

    let bundle = service(root.path())
        .with_retain_artifacts(true)
        .generate(request, run_date())
        .unwrap();
    assert_eq!(zip_names(&bundle.bytes), vec!["Invoice_0001.pdf", "PO_0001.pdf"]);

    let run_dir = root.path().join(bundle.report.run_id.to_string());
    assert!(run_dir.join("Invoice_0001.pdf").is_file());
    assert!(run_dir.join("PO_0001.pdf").is_file());
}

#[test]
fn test_oversized_price_is_rejected_as_input() {
    let root = tempdir().unwrap();
    let csv = "supplier,product_name,product_code,unit_price
Moen,Faucet,F-1,79228162514264337593543950335
";
    let request = GenerationRequest {
        catalog: Some(CatalogSource::Csv(csv.as_bytes().to_vec())),
        ..Default::default()
    };

    let err = service(root.path()).generate(request, run_date()).unwrap_err();
    assert!(matches!(err, BatchError::Input(InputError::PriceTooLarge { row: 2, .. })));
    assert!(err.is_client_error());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_default_seed_makes_runs_repeatable() {
    let root = tempdir().unwrap();
    let generator = service(root.path()).with_default_seed(Some(99));
    let request = || GenerationRequest {
        catalog: Some(CatalogSource::Example),
        ..Default::default()
    };

    let first = generator.generate(request(), run_date()).unwrap();
    let second = generator.generate(request(), run_date()).unwrap();

    assert_ne!(first.report.run_id, second.report.run_id);
    let totals = |b: &tradedocs_server::batch::GeneratedBundle| -> Vec<_> {
        b.report.documents.iter().map(|d| (d.number.clone(), d.total)).collect()
    };
    assert_eq!(totals(&first), totals(&second));
}
