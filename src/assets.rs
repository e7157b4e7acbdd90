//! Branding logo resolution.
//!
//! Uploaded images are validated by decoding them; valid ones are indexed by
//! their lowercased file stem so a supplier name can find its logo. Images
//! that fail to decode are excluded and remembered, never surfaced as a
//! run failure.

use image::ImageFormat;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::document::DocumentKind;

/// A named blob as received from an upload.
#[derive(Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("`{filename}` has no usable file name stem")]
    MissingStem { filename: String },
    #[error("`{filename}` is not a readable image: {source}")]
    Decode {
        filename: String,
        #[source]
        source: image::ImageError,
    },
}

/// A validated logo image.
pub struct LogoAsset {
    key: String,
    format: ImageFormat,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl LogoAsset {
    /// Decodes the payload fully; a payload that decodes is a valid logo.
    pub fn validate(upload: &UploadedImage) -> Result<Self, AssetError> {
        let key = normalized_stem(&upload.filename).ok_or_else(|| AssetError::MissingStem {
            filename: upload.filename.clone(),
        })?;

        let decode_error = |source| AssetError::Decode {
            filename: upload.filename.clone(),
            source,
        };
        let format = image::guess_format(&upload.bytes).map_err(decode_error)?;
        let decoded = image::load_from_memory_with_format(&upload.bytes, format)
            .map_err(decode_error)?;

        Ok(Self {
            key,
            format,
            width: decoded.width(),
            height: decoded.height(),
            bytes: upload.bytes.clone(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Height over width, used to scale the logo to a fixed width.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f32 / self.width as f32
    }

    /// File extension matching the image's encoded format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

impl fmt::Debug for LogoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoAsset")
            .field("key", &self.key)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// An upload that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAsset {
    pub filename: String,
    pub reason: String,
}

/// Logos of one branding collection keyed by normalized name.
#[derive(Debug, Default)]
pub struct LogoIndex {
    assets: HashMap<String, Arc<LogoAsset>>,
    rejected: Vec<RejectedAsset>,
}

impl LogoIndex {
    pub fn from_uploads<I>(uploads: I) -> Self
    where
        I: IntoIterator<Item = UploadedImage>,
    {
        let mut index = Self::default();
        for upload in uploads {
            index.insert(&upload);
        }
        index
    }

    /// Validates and indexes one upload; a later upload with the same stem wins.
    pub fn insert(&mut self, upload: &UploadedImage) {
        match LogoAsset::validate(upload) {
            Ok(asset) => {
                debug!(
                    "Indexed logo '{}' as '{}' ({}x{})",
                    upload.filename, asset.key, asset.width, asset.height
                );
                self.assets.insert(asset.key.clone(), Arc::new(asset));
            }
            Err(e) => {
                warn!("Skipping logo upload: {}", e);
                self.rejected.push(RejectedAsset {
                    filename: upload.filename.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Case-insensitive lookup by supplier or customer name.
    pub fn lookup(&self, name: &str) -> Option<Arc<LogoAsset>> {
        self.assets.get(&name.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn rejected(&self) -> &[RejectedAsset] {
        &self.rejected
    }
}

/// The two independent branding collections.
#[derive(Debug, Default)]
pub struct LogoLibrary {
    pub invoice: LogoIndex,
    pub purchase_order: LogoIndex,
}

impl LogoLibrary {
    pub fn new(invoice: LogoIndex, purchase_order: LogoIndex) -> Self {
        Self {
            invoice,
            purchase_order,
        }
    }

    pub fn from_uploads(invoice: Vec<UploadedImage>, purchase_order: Vec<UploadedImage>) -> Self {
        Self::new(
            LogoIndex::from_uploads(invoice),
            LogoIndex::from_uploads(purchase_order),
        )
    }

    pub fn collection(&self, kind: DocumentKind) -> &LogoIndex {
        match kind {
            DocumentKind::Invoice => &self.invoice,
            DocumentKind::PurchaseOrder => &self.purchase_order,
        }
    }

    pub fn resolve(&self, kind: DocumentKind, supplier: &str) -> Option<Arc<LogoAsset>> {
        self.collection(kind).lookup(supplier)
    }
}

/// Lowercased file name without directories or extension.
pub fn normalized_stem(filename: &str) -> Option<String> {
    // Browsers on Windows may send full client paths.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    Path::new(base)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_normalized_stem() {
        assert_eq!(normalized_stem("Moen.PNG").as_deref(), Some("moen"));
        assert_eq!(normalized_stem("C:\\logos\\Kohler.jpg").as_deref(), Some("kohler"));
        assert_eq!(normalized_stem("dir/GE.logo.png").as_deref(), Some("ge.logo"));
        assert_eq!(normalized_stem(""), None);
    }

    #[test]
    fn test_valid_image_is_indexed() {
        let index = LogoIndex::from_uploads(vec![UploadedImage::new("Moen.png", png_bytes(4, 2))]);
        assert_eq!(index.len(), 1);

        let logo = index.lookup("MOEN").expect("logo should resolve");
        assert_eq!(logo.key(), "moen");
        assert_eq!(logo.width(), 4);
        assert_eq!(logo.height(), 2);
        assert_eq!(logo.aspect_ratio(), 0.5);
        assert_eq!(logo.extension(), "png");
    }

    #[test]
    fn test_corrupt_image_is_rejected_not_fatal() {
        let index = LogoIndex::from_uploads(vec![
            UploadedImage::new("Broken.png", b"definitely not an image".to_vec()),
            UploadedImage::new("GE.png", png_bytes(1, 1)),
        ]);

        assert_eq!(index.len(), 1);
        assert!(index.lookup("broken").is_none());
        assert!(index.lookup("ge").is_some());
        assert_eq!(index.rejected().len(), 1);
        assert_eq!(index.rejected()[0].filename, "Broken.png");
    }

    #[test]
    fn test_truncated_png_is_rejected() {
        let mut bytes = png_bytes(8, 8);
        bytes.truncate(bytes.len() / 2);
        let index = LogoIndex::from_uploads(vec![UploadedImage::new("Moen.png", bytes)]);
        assert!(index.is_empty());
        assert_eq!(index.rejected().len(), 1);
    }

    #[test]
    fn test_miss_returns_none() {
        let index = LogoIndex::default();
        assert!(index.lookup("Nobody").is_none());
    }

    #[test]
    fn test_collections_are_independent() {
        let library = LogoLibrary::from_uploads(
            vec![UploadedImage::new("Moen.png", png_bytes(2, 2))],
            Vec::new(),
        );
        assert!(library.resolve(DocumentKind::Invoice, "Moen").is_some());
        assert!(library.resolve(DocumentKind::PurchaseOrder, "Moen").is_none());
    }
}
