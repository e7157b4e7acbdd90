//! Typst rendering engine.
//!
//! Handles the low-level details of writing Typst source and its attachments
//! to a temporary directory, invoking the compiler, and reading back the PDF.

use std::fs;
use std::process::Command;
use tempfile::tempdir;
use tempfile::TempDir;

use super::RenderError;

const SOURCE_FILE: &str = "document.typ";
const OUTPUT_FILE: &str = "document.pdf";

/// A file placed next to the Typst source, e.g. an embedded logo.
#[derive(Debug, Clone, Copy)]
pub struct Attachment<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

/// Compiles Typst source to PDF through the `typst` CLI.
#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    binary: String,
}

impl Default for TypstRenderEngine {
    fn default() -> Self {
        Self::new("typst")
    }
}

impl TypstRenderEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Render a Typst string to PDF bytes.
    ///
    /// # Arguments
    /// * `typst_source` - The complete Typst source code string.
    /// * `attachments` - Files the source refers to by relative path.
    pub fn render(
        &self,
        typst_source: &str,
        attachments: &[Attachment<'_>],
    ) -> Result<Vec<u8>, RenderError> {
        // Create temp directory for compilation context
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;

        fs::write(temp_dir.path().join(SOURCE_FILE), typst_source)
            .map_err(RenderError::WriteTypst)?;
        for attachment in attachments {
            fs::write(temp_dir.path().join(attachment.filename), attachment.bytes)
                .map_err(RenderError::WriteTypst)?;
        }

        compile_typst_to_pdf(&self.binary, &temp_dir, SOURCE_FILE, OUTPUT_FILE)
    }
}

/// Compile a Typst source file to PDF.
fn compile_typst_to_pdf(
    binary: &str,
    temp_dir: &TempDir,
    typ_filename: &str,
    output_filename: &str,
) -> Result<Vec<u8>, RenderError> {
    let typ_path = temp_dir.path().join(typ_filename);
    let output_path = temp_dir.path().join(output_filename);

    let status = Command::new(binary)
        .arg("compile")
        .arg(&typ_path)
        .arg(&output_path)
        .current_dir(temp_dir.path())
        .status()
        .map_err(RenderError::TypstIo)?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(RenderError::TypstExit(code));
    }

    fs::read(&output_path).map_err(RenderError::ReadPdf)
}
