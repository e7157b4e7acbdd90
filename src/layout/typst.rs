//! Typst backend: the same positioned layout, expressed as absolutely placed
//! Typst boxes.

use std::fmt::Write;

use super::common::escape_typst_string;
use super::engine::{Attachment, TypstRenderEngine};
use super::traits::ArtifactRenderer;
use super::{Align, Block, PageLayout, RenderError, Weight};

const FONT_STACK: &str = r#"("Helvetica", "Arial", "Liberation Sans", "DejaVu Sans")"#;

pub struct TypstRenderer {
    engine: TypstRenderEngine,
}

impl TypstRenderer {
    pub fn new(engine: TypstRenderEngine) -> Self {
        Self { engine }
    }
}

impl ArtifactRenderer for TypstRenderer {
    fn render(&self, layout: &PageLayout) -> Result<Vec<u8>, RenderError> {
        let source = typst_source(layout);
        let logo_file = layout.image().map(|image| (logo_filename(layout), image));

        let attachments: Vec<Attachment<'_>> = logo_file
            .iter()
            .map(|(filename, image)| Attachment {
                filename,
                bytes: image.logo.bytes(),
            })
            .collect();

        self.engine.render(&source, &attachments)
    }
}

fn logo_filename(layout: &PageLayout) -> String {
    let extension = layout
        .image()
        .map(|image| image.logo.extension())
        .unwrap_or("png");
    format!("logo.{extension}")
}

/// Typst markup reproducing `layout` with absolute placement.
pub fn typst_source(layout: &PageLayout) -> String {
    let mut source = String::new();
    let _ = writeln!(
        source,
        "#set page(width: {:.2}mm, height: {:.2}mm, margin: 0mm)",
        layout.width, layout.height
    );
    let _ = writeln!(source, "#set text(font: {FONT_STACK})");

    for block in &layout.blocks {
        match block {
            Block::Text(text) => {
                let rect = text.rect;
                let stroke = if text.border { "0.2mm" } else { "none" };
                let align = match text.align {
                    Align::Left => "left",
                    Align::Center => "center",
                    Align::Right => "right",
                };
                let weight = match text.weight {
                    Weight::Regular => "regular",
                    Weight::Bold => "bold",
                };
                let _ = writeln!(
                    source,
                    "#place(top + left, dx: {:.2}mm, dy: {:.2}mm, box(width: {:.2}mm, height: {:.2}mm, stroke: {stroke}, inset: (x: 1mm), align({align} + horizon, text(size: {}pt, weight: \"{weight}\", \"{}\"))))",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    text.size_pt,
                    escape_typst_string(&text.text),
                );
            }
            Block::Image(image) => {
                let rect = image.rect;
                let _ = writeln!(
                    source,
                    "#place(top + left, dx: {:.2}mm, dy: {:.2}mm, image(\"{}\", width: {:.2}mm))",
                    rect.x,
                    rect.y,
                    logo_filename(layout),
                    rect.width,
                );
            }
        }
    }

    source
}
