//! Trait for rendering backends.

use super::{PageLayout, RenderError};

/// Turns a positioned page into the bytes of one artifact.
pub trait ArtifactRenderer: Send + Sync {
    /// File extension of the produced artifact.
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, layout: &PageLayout) -> Result<Vec<u8>, RenderError>;

    /// `Invoice_0001.pdf` style file name for `layout`.
    fn artifact_filename(&self, layout: &PageLayout) -> String {
        format!("{}.{}", layout.artifact_stem, self.extension())
    }
}
