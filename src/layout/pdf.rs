//! Native PDF backend built on `pdf-writer`.
//!
//! Text uses the base-14 Helvetica faces with WinAnsi encoding, so no font
//! program is embedded. Logos are flattened onto white and embedded as a
//! Flate-compressed RGB image.

use log::debug;
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect as PdfRect, Ref, Str};

use super::metrics::text_width_pt;
use super::traits::ArtifactRenderer;
use super::{Align, Block, ImageBox, PageLayout, RenderError, TextBox, Weight};
use crate::assets::LogoAsset;

const PT_PER_MM: f32 = 72.0 / 25.4;
const CELL_PADDING_MM: f32 = 1.0;
const BORDER_WIDTH_MM: f32 = 0.2;
const COMPRESSION_LEVEL: u8 = 6;

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");
const LOGO_IMAGE: Name<'static> = Name(b"Im1");

/// Renders layouts straight to PDF bytes without external tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactRenderer for PdfRenderer {
    fn render(&self, layout: &PageLayout) -> Result<Vec<u8>, RenderError> {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let regular_font_id = Ref::new(5);
        let bold_font_id = Ref::new(6);
        let image_id = Ref::new(7);

        let logo = layout.image();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(PdfRect::new(
            0.0,
            0.0,
            layout.width * PT_PER_MM,
            layout.height * PT_PER_MM,
        ));
        page.parent(page_tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        resources
            .fonts()
            .pair(REGULAR_FONT, regular_font_id)
            .pair(BOLD_FONT, bold_font_id);
        if logo.is_some() {
            resources.x_objects().pair(LOGO_IMAGE, image_id);
        }
        resources.finish();
        page.finish();

        pdf.type1_font(regular_font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        if let Some(image_box) = logo {
            write_logo(&mut pdf, image_id, &image_box.logo)?;
        }

        let mut content = Content::new();
        for block in &layout.blocks {
            match block {
                Block::Text(text) => draw_text(&mut content, text, layout.height),
                Block::Image(image_box) => draw_image(&mut content, image_box, layout.height),
            }
        }
        let stream = content.finish();
        pdf.stream(content_id, &stream);

        let bytes = pdf.finish();
        debug!("Rendered {} as {} byte PDF", layout.artifact_stem, bytes.len());
        Ok(bytes)
    }
}

fn mm(value: f32) -> f32 {
    value * PT_PER_MM
}

fn draw_text(content: &mut Content, text: &TextBox, page_height: f32) {
    let rect = text.rect;

    if text.border {
        content.set_line_width(mm(BORDER_WIDTH_MM));
        content.rect(
            mm(rect.x),
            mm(page_height - rect.bottom()),
            mm(rect.width),
            mm(rect.height),
        );
        content.stroke();
    }

    if text.text.is_empty() {
        return;
    }

    let width = text_width_pt(&text.text, text.weight, text.size_pt);
    let x = match text.align {
        Align::Left => mm(rect.x + CELL_PADDING_MM),
        Align::Right => mm(rect.right() - CELL_PADDING_MM) - width,
        Align::Center => mm(rect.x) + (mm(rect.width) - width) / 2.0,
    };
    // Vertically centred baseline, same rule classic PDF cell layouts use.
    let size_mm = text.size_pt / PT_PER_MM;
    let baseline = rect.y + rect.height / 2.0 + 0.3 * size_mm;

    let font = match text.weight {
        Weight::Regular => REGULAR_FONT,
        Weight::Bold => BOLD_FONT,
    };
    let encoded = encode_win_ansi(&text.text);

    content.begin_text();
    content.set_font(font, text.size_pt);
    content.next_line(x, mm(page_height - baseline));
    content.show(Str(&encoded));
    content.end_text();
}

fn draw_image(content: &mut Content, image_box: &ImageBox, page_height: f32) {
    let rect = image_box.rect;
    content.save_state();
    content.transform([
        mm(rect.width),
        0.0,
        0.0,
        mm(rect.height),
        mm(rect.x),
        mm(page_height - rect.bottom()),
    ]);
    content.x_object(LOGO_IMAGE);
    content.restore_state();
}

fn write_logo(pdf: &mut Pdf, id: Ref, logo: &LogoAsset) -> Result<(), RenderError> {
    let decoded = image::load_from_memory(logo.bytes()).map_err(RenderError::LogoDecode)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend([r, g, b].map(|channel| flatten_on_white(channel, a)));
    }
    let compressed = compress_to_vec_zlib(&rgb, COMPRESSION_LEVEL);

    let mut image = pdf.image_xobject(id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(width as i32);
    image.height(height as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();
    Ok(())
}

fn flatten_on_white(channel: u8, alpha: u8) -> u8 {
    let channel = u16::from(channel);
    let alpha = u16::from(alpha);
    ((channel * alpha + 255 * (255 - alpha)) / 255) as u8
}

/// WinAnsi bytes for `text`; characters outside Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            0x20..=0x7E | 0xA0..=0xFF => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}
