//! Positions every element of a document record on a single A4 page.

use std::sync::Arc;

use super::common::{format_date, format_money, truncate_chars};
use super::{
    Align, Block, ImageBox, PageLayout, Rect, TextBox, Weight, CONTENT_WIDTH_MM, MARGIN_MM,
    PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use crate::assets::LogoAsset;
use crate::document::{DocumentKind, DocumentRecord};

pub const TITLE_SIZE_PT: f32 = 14.0;
pub const BODY_SIZE_PT: f32 = 9.0;
pub const TITLE_HEIGHT_MM: f32 = 10.0;
pub const LINE_HEIGHT_MM: f32 = 8.0;
pub const LABEL_WIDTH_MM: f32 = 40.0;

pub const LOGO_X_MM: f32 = 10.0;
pub const LOGO_Y_MM: f32 = 8.0;
pub const LOGO_WIDTH_MM: f32 = 50.0;

pub const TABLE_HEADERS: [&str; 5] = ["Product Name", "Code", "Qty", "Unit Price", "Line Total"];
pub const COLUMN_WIDTHS_MM: [f32; 5] = [70.0, 35.0, 15.0, 25.0, 30.0];
pub const PRODUCT_NAME_MAX_CHARS: usize = 40;

const ATTENTION_LINE: &str = "ATTN: Accounts Payable";

/// Lays out `record`, embedding `logo` top-left when one was resolved.
pub fn compose(record: &DocumentRecord, logo: Option<Arc<LogoAsset>>) -> PageLayout {
    let mut page = PageCursor::new(record.artifact_stem());
    let kind = record.kind();

    page.full_line(
        kind.title(),
        TITLE_HEIGHT_MM,
        TITLE_SIZE_PT,
        Weight::Bold,
        Align::Right,
    );
    page.body_line(
        format!("{}: {}", kind.number_label(), record.number()),
        Weight::Regular,
        Align::Right,
    );
    if let Some(po_number) = record.counterpart_number() {
        page.body_line(format!("PO Number: {po_number}"), Weight::Regular, Align::Right);
    }
    page.body_line(
        format!("Date: {}", format_date(record.date())),
        Weight::Regular,
        Align::Right,
    );

    if let Some(logo) = logo {
        let height = LOGO_WIDTH_MM * logo.aspect_ratio();
        page.push(Block::Image(ImageBox {
            rect: Rect::new(LOGO_X_MM, LOGO_Y_MM, LOGO_WIDTH_MM, height),
            logo,
        }));
    }

    page.gap(10.0);
    page.body_line("Vendor:", Weight::Bold, Align::Left);
    page.body_line(record.supplier().display_name(), Weight::Regular, Align::Left);
    page.body_line(record.supplier().address.clone(), Weight::Regular, Align::Left);

    page.gap(4.0);
    page.body_line("Bill To:", Weight::Bold, Align::Left);
    page.body_line(record.customer_name(), Weight::Regular, Align::Left);
    page.body_line(ATTENTION_LINE, Weight::Regular, Align::Left);

    // Terms follow bill-to directly; the carrier line is set apart.
    match kind {
        DocumentKind::PurchaseOrder => {
            page.gap(4.0);
            page.labeled_line("Shipping Method:", record.carrier());
        }
        DocumentKind::Invoice => page.labeled_line("Terms:", record.payment_terms()),
    }

    page.gap(4.0);
    page.table_row(TABLE_HEADERS.map(String::from), Weight::Bold);
    for line in record.lines() {
        page.table_row(
            [
                truncate_chars(&line.name, PRODUCT_NAME_MAX_CHARS),
                line.code.clone(),
                line.quantity.to_string(),
                format_money(line.unit_price),
                format_money(line.line_total()),
            ],
            Weight::Regular,
        );
    }

    let totals = record.totals();
    page.gap(4.0);
    page.body_line(
        format!("Subtotal: {}", format_money(totals.subtotal)),
        Weight::Regular,
        Align::Right,
    );
    page.body_line(
        format!("Tax: {}", format_money(totals.tax)),
        Weight::Regular,
        Align::Right,
    );
    if let Some(shipping) = totals.shipping {
        page.body_line(
            format!("Shipping: {}", format_money(shipping)),
            Weight::Regular,
            Align::Right,
        );
    }
    page.body_line(
        format!("Total: {}", format_money(totals.total)),
        Weight::Regular,
        Align::Right,
    );

    page.finish()
}

/// Top-down flow cursor inside the page margins.
struct PageCursor {
    y: f32,
    layout: PageLayout,
}

impl PageCursor {
    fn new(artifact_stem: String) -> Self {
        Self {
            y: MARGIN_MM,
            layout: PageLayout {
                width: PAGE_WIDTH_MM,
                height: PAGE_HEIGHT_MM,
                artifact_stem,
                blocks: Vec::new(),
            },
        }
    }

    fn push(&mut self, block: Block) {
        self.layout.blocks.push(block);
    }

    fn gap(&mut self, height: f32) {
        self.y += height;
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        x: f32,
        width: f32,
        text: String,
        size_pt: f32,
        weight: Weight,
        align: Align,
        border: bool,
        height: f32,
    ) {
        self.push(Block::Text(TextBox {
            rect: Rect::new(x, self.y, width, height),
            text,
            size_pt,
            weight,
            align,
            border,
        }));
    }

    fn full_line(
        &mut self,
        text: impl Into<String>,
        height: f32,
        size_pt: f32,
        weight: Weight,
        align: Align,
    ) {
        self.text(MARGIN_MM, CONTENT_WIDTH_MM, text.into(), size_pt, weight, align, false, height);
        self.y += height;
    }

    fn body_line(&mut self, text: impl Into<String>, weight: Weight, align: Align) {
        self.full_line(text, LINE_HEIGHT_MM, BODY_SIZE_PT, weight, align);
    }

    fn labeled_line(&mut self, label: &str, value: &str) {
        self.text(
            MARGIN_MM,
            LABEL_WIDTH_MM,
            label.to_string(),
            BODY_SIZE_PT,
            Weight::Bold,
            Align::Left,
            false,
            LINE_HEIGHT_MM,
        );
        self.text(
            MARGIN_MM + LABEL_WIDTH_MM,
            CONTENT_WIDTH_MM - LABEL_WIDTH_MM,
            value.to_string(),
            BODY_SIZE_PT,
            Weight::Regular,
            Align::Left,
            false,
            LINE_HEIGHT_MM,
        );
        self.y += LINE_HEIGHT_MM;
    }

    fn table_row(&mut self, cells: [String; 5], weight: Weight) {
        let mut x = MARGIN_MM;
        for (cell, width) in cells.into_iter().zip(COLUMN_WIDTHS_MM) {
            self.text(x, width, cell, BODY_SIZE_PT, weight, Align::Left, true, LINE_HEIGHT_MM);
            x += width;
        }
        self.y += LINE_HEIGHT_MM;
    }

    fn finish(self) -> PageLayout {
        self.layout
    }
}
