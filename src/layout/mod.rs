//! Layout renderer - single-page document layout and artifact emission.
//!
//! Layout is computed once, as positioned boxes in millimetres from the
//! top-left corner of an A4 page. Backends only draw what they are given:
//! - `pdf` - native PDF through `pdf-writer`
//! - `typst` - Typst markup compiled by the `typst` CLI

pub mod common;
pub mod composer;
pub mod engine;
pub mod metrics;
pub mod pdf;
pub mod traits;
pub mod typst;

pub use composer::compose;
pub use engine::TypstRenderEngine;
pub use pdf::PdfRenderer;
pub use traits::ArtifactRenderer;
pub use typst::TypstRenderer;

use std::sync::Arc;
use thiserror::Error;

use crate::assets::LogoAsset;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

/// Errors that can occur while producing an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode logo for embedding: {0}")]
    LogoDecode(#[source] image::ImageError),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst input: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {0}")]
    TypstExit(i32),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("failed to write artifact {filename}: {source}")]
    WriteArtifact {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// Axis-aligned box in millimetres, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// A single line of text inside a box, optionally framed as a table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub rect: Rect,
    pub text: String,
    pub size_pt: f32,
    pub weight: Weight,
    pub align: Align,
    pub border: bool,
}

#[derive(Debug, Clone)]
pub struct ImageBox {
    pub rect: Rect,
    pub logo: Arc<LogoAsset>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Text(TextBox),
    Image(ImageBox),
}

/// A fully positioned page, ready for a backend.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub artifact_stem: String,
    pub blocks: Vec<Block>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &TextBox> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Text(text) => Some(text),
            Block::Image(_) => None,
        })
    }

    pub fn image(&self) -> Option<&ImageBox> {
        self.blocks.iter().find_map(|block| match block {
            Block::Image(image) => Some(image),
            Block::Text(_) => None,
        })
    }

    pub fn find_text(&self, text: &str) -> Option<&TextBox> {
        self.texts().find(|candidate| candidate.text == text)
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.find_text(text).is_some()
    }

    /// Lowest edge of any block; content past the page height is not handled.
    pub fn content_bottom(&self) -> f32 {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Text(text) => text.rect.bottom(),
                Block::Image(image) => image.rect.bottom(),
            })
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod mod_tests;
