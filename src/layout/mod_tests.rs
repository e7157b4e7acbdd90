use chrono::NaiveDate;
use image::{ImageBuffer, ImageFormat, Rgba};
use rust_decimal_macros::dec;
use std::io::Cursor;
use std::sync::Arc;

use super::composer::{COLUMN_WIDTHS_MM, LOGO_WIDTH_MM, TABLE_HEADERS};
use super::typst::typst_source;
use super::*;
use crate::assets::{LogoAsset, UploadedImage};
use crate::document::{DocumentBuilder, DocumentKind, DocumentRecord, OrderGroup, ProductLine, SupplierParty};
use crate::numbering::{AncillaryAttributes, DocumentSequence};

fn record(kind: DocumentKind, lines: Vec<ProductLine>) -> DocumentRecord {
    let group = OrderGroup {
        supplier: SupplierParty::new("Kohler", "512 Kohler Rd, City, ST"),
        customer_name: "Ferguson Enterprises, LLC".to_string(),
        lines,
        attributes: AncillaryAttributes {
            carrier: "DHL Express".to_string(),
            payment_terms: "Net 45".to_string(),
            shipping_cost: dec!(1200),
        },
    };
    let mut sequence = DocumentSequence::new(2025);
    let slot = sequence.next_slot();
    DocumentBuilder::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()).build(kind, &group, &slot)
}

fn sample_lines() -> Vec<ProductLine> {
    vec![
        ProductLine::new("Widget C", "C3", 10, dec!(149.99)),
        ProductLine::new(
            "An extraordinarily long product name that keeps going",
            "LONG-1",
            5,
            dec!(1000),
        ),
    ]
}

fn logo() -> Arc<LogoAsset> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(20, 10, Rgba([0, 0, 255, 128]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    let upload = UploadedImage::new("Kohler.png", buffer.into_inner());
    Arc::new(LogoAsset::validate(&upload).unwrap())
}

#[test]
fn test_invoice_layout_sections() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), None);

    assert_eq!(layout.artifact_stem, "Invoice_0001");
    let title = layout.find_text("INVOICE").expect("title");
    assert_eq!(title.align, Align::Right);
    assert_eq!(title.weight, Weight::Bold);

    assert!(layout.contains_text("Invoice Number: INV-2025-10001"));
    assert!(layout.contains_text("PO Number: PO-2025-10001"));
    assert!(layout.contains_text("Date: 2025-06-15"));
    assert!(layout.contains_text("Kohler Supply"));
    assert!(layout.contains_text("512 Kohler Rd, City, ST"));
    assert!(layout.contains_text("Ferguson Enterprises, LLC"));
    assert!(layout.contains_text("ATTN: Accounts Payable"));
    assert!(layout.contains_text("Terms:"));
    assert!(layout.contains_text("Net 45"));
    assert!(!layout.contains_text("Shipping Method:"));
    assert!(layout.image().is_none());
}

#[test]
fn test_purchase_order_layout_sections() {
    let layout = compose(&record(DocumentKind::PurchaseOrder, sample_lines()), None);

    assert_eq!(layout.artifact_stem, "PO_0001");
    assert!(layout.contains_text("PURCHASE ORDER"));
    assert!(layout.contains_text("PO Number: PO-2025-10001"));
    assert!(!layout.texts().any(|text| text.text.contains("INV-")));
    assert!(layout.contains_text("Date: 2025-06-14"));
    assert!(layout.contains_text("Shipping Method:"));
    assert!(layout.contains_text("DHL Express"));
    assert!(!layout.contains_text("Terms:"));
    assert!(!layout.texts().any(|text| text.text.starts_with("Shipping:")));
}

#[test]
fn test_only_purchase_order_gaps_before_carrier_line() {
    let invoice = compose(&record(DocumentKind::Invoice, sample_lines()), None);
    let attention = invoice.find_text("ATTN: Accounts Payable").unwrap();
    let terms = invoice.find_text("Terms:").unwrap();
    assert_eq!(terms.rect.y, attention.rect.bottom());

    let order = compose(&record(DocumentKind::PurchaseOrder, sample_lines()), None);
    let attention = order.find_text("ATTN: Accounts Payable").unwrap();
    let carrier = order.find_text("Shipping Method:").unwrap();
    assert_eq!(carrier.rect.y, attention.rect.bottom() + 4.0);
}

#[test]
fn test_item_table_cells() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), None);

    for header in TABLE_HEADERS {
        let cell = layout.find_text(header).expect("header cell");
        assert!(cell.border);
        assert_eq!(cell.weight, Weight::Bold);
    }

    let long_name = layout
        .find_text("An extraordinarily long product name tha")
        .expect("truncated name");
    assert_eq!(long_name.text.chars().count(), 40);
    assert_eq!(long_name.rect.width, COLUMN_WIDTHS_MM[0]);

    assert!(layout.contains_text("$149.99"));
    assert!(layout.contains_text("$1,499.90"));
    assert!(layout.contains_text("$1,000.00"));
    assert!(layout.contains_text("$5,000.00"));

    let bordered = layout.texts().filter(|text| text.border).count();
    assert_eq!(bordered, 5 * 3);
}

#[test]
fn test_table_columns_line_up() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), None);
    let qty = layout.find_text("Qty").unwrap();
    let ten = layout.find_text("10").unwrap();
    assert_eq!(qty.rect.x, ten.rect.x);
    assert_eq!(qty.rect.x, MARGIN_MM + COLUMN_WIDTHS_MM[0] + COLUMN_WIDTHS_MM[1]);
    assert!(ten.rect.y > qty.rect.y);
}

#[test]
fn test_invoice_totals_block() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), None);

    // 1499.90 + 5000 = 6499.90; tax 422.4935 -> 422.49; shipping 1200
    let subtotal = layout.find_text("Subtotal: $6,499.90").expect("subtotal");
    assert_eq!(subtotal.align, Align::Right);
    assert!(layout.contains_text("Tax: $422.49"));
    assert!(layout.contains_text("Shipping: $1,200.00"));
    assert!(layout.contains_text("Total: $8,122.39"));

    let total = layout.find_text("Total: $8,122.39").unwrap();
    assert!(total.rect.y > subtotal.rect.y);
}

#[test]
fn test_purchase_order_totals_block() {
    let layout = compose(&record(DocumentKind::PurchaseOrder, sample_lines()), None);
    assert!(layout.contains_text("Subtotal: $6,499.90"));
    assert!(layout.contains_text("Tax: $422.49"));
    assert!(layout.contains_text("Total: $6,922.39"));
}

#[test]
fn test_logo_placed_top_left_with_aspect_ratio() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), Some(logo()));
    let image = layout.image().expect("logo block");
    assert_eq!(image.rect.x, 10.0);
    assert_eq!(image.rect.y, 8.0);
    assert_eq!(image.rect.width, LOGO_WIDTH_MM);
    assert_eq!(image.rect.height, LOGO_WIDTH_MM / 2.0);
}

#[test]
fn test_empty_document_still_lays_out() {
    let layout = compose(&record(DocumentKind::PurchaseOrder, Vec::new()), None);
    assert!(layout.contains_text("Subtotal: $0.00"));
    assert!(layout.contains_text("Total: $0.00"));
    assert_eq!(layout.texts().filter(|text| text.border).count(), 5);
}

#[test]
fn test_five_lines_fit_on_page() {
    let lines = (0..5)
        .map(|i| ProductLine::new(format!("Widget {i}"), format!("W{i}"), 25, dec!(149.99)))
        .collect();
    let layout = compose(&record(DocumentKind::Invoice, lines), Some(logo()));
    assert!(layout.content_bottom() <= PAGE_HEIGHT_MM - MARGIN_MM);
}

#[test]
fn test_pdf_backend_produces_pdf() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), Some(logo()));
    let renderer = PdfRenderer::new();
    let bytes = renderer.render(&layout).unwrap();

    assert!(bytes.starts_with(b"%PDF"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Helvetica-Bold"));
    assert!(text.contains("/Im1"));
    assert_eq!(renderer.artifact_filename(&layout), "Invoice_0001.pdf");
}

#[test]
fn test_pdf_backend_without_logo_has_no_image() {
    let layout = compose(&record(DocumentKind::PurchaseOrder, sample_lines()), None);
    let bytes = PdfRenderer::new().render(&layout).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(!text.contains("/Im1"));
}

#[test]
fn test_typst_source_mirrors_layout() {
    let layout = compose(&record(DocumentKind::Invoice, sample_lines()), Some(logo()));
    let source = typst_source(&layout);

    assert!(source.starts_with("#set page(width: 210.00mm, height: 297.00mm"));
    assert!(source.contains("\"INVOICE\""));
    assert!(source.contains("weight: \"bold\""));
    assert!(source.contains("image(\"logo.png\", width: 50.00mm)"));
    assert!(source.contains("\"Total: $8,122.39\""));
    assert_eq!(source.matches("#place(").count(), layout.blocks.len());
}
