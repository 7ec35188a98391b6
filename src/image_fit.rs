//! Logo handling: decoding from an image source, aspect-preserving fit to a
//! target width, and PNG re-encoding for embedding.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// A raster scaled to its target size and ready to embed.
pub struct FittedImage {
    /// SHA-256 of `png`, used to embed each distinct image once.
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
    pub png: Vec<u8>,
}

impl fmt::Debug for FittedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedImage")
            .field("key", &self.key)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .finish()
    }
}

impl PartialEq for FittedImage {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Scales images to a fixed width, keeping their aspect ratio.
pub struct ImageFitter;

impl ImageFitter {
    /// Height of a `width × height` image scaled to `target_width`.
    ///
    /// The ratio is computed in floating point; truncating `width / height`
    /// would flatten every landscape logo to ratio 1.
    pub fn fitted_height(width: u32, height: u32, target_width: u32) -> Result<u32> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "source image is {width}×{height}"
            )));
        }
        if target_width == 0 {
            return Err(Error::InvalidImage("target width is 0".to_string()));
        }
        let ratio = width as f64 / height as f64;
        let new_height = (target_width as f64 / ratio).round();
        Ok((new_height as u32).max(1))
    }

    /// Resample `image` to `target_width` wide using nearest-neighbour.
    pub fn fit(image: &DynamicImage, target_width: u32) -> Result<FittedImage> {
        let height = Self::fitted_height(image.width(), image.height(), target_width)?;
        let scaled = image.resize_exact(target_width, height, FilterType::Nearest);

        let mut png = Vec::new();
        scaled
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::ImageDecode(format!("PNG re-encode failed: {e}")))?;

        let key = Sha256::digest(&png)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();

        Ok(FittedImage {
            key,
            width: scaled.width(),
            height: scaled.height(),
            image: scaled,
            png,
        })
    }
}

/// Something that can turn a resource id into a decoded raster.
pub trait ImageSource {
    fn decode(&self, resource: &str) -> Result<DynamicImage>;
}

fn decode_bytes(resource: &str, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| Error::ImageDecode(format!("{resource}: {e}")))
}

/// Resolves resource ids as paths under `root`. `data:` URIs are decoded
/// inline.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for FsImageSource {
    fn decode(&self, resource: &str) -> Result<DynamicImage> {
        if resource.starts_with("data:") {
            let bytes = parse_data_uri(resource)?;
            return decode_bytes("data URI", &bytes);
        }
        let path = self.root.join(resource);
        let bytes = std::fs::read(&path)
            .map_err(|e| Error::ImageDecode(format!("{}: {e}", path.display())))?;
        decode_bytes(resource, &bytes)
    }
}

/// Encoded images keyed by resource id.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(resource.into(), bytes);
    }

    pub fn with(mut self, resource: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(resource, bytes);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn decode(&self, resource: &str) -> Result<DynamicImage> {
        let bytes = self
            .images
            .get(resource)
            .ok_or_else(|| Error::ImageDecode(format!("no such resource: {resource}")))?;
        decode_bytes(resource, bytes)
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| Error::ImageDecode("not a data URI".to_string()))?;
    let (header, data) = rest.split_once(',').ok_or_else(|| {
        Error::ImageDecode("invalid data URI: missing `,` separator".to_string())
    })?;
    if !header.contains(";base64") {
        return Err(Error::ImageDecode(
            "only base64-encoded data URIs are supported".to_string(),
        ));
    }
    BASE64_STD
        .decode(data.trim())
        .map_err(|e| Error::ImageDecode(format!("base64 decode error: {e}")))
}

/// Result of loading the header logo.
#[derive(Debug, Clone)]
pub enum LogoOutcome {
    Fitted(Arc<FittedImage>),
    /// The header band is rendered without a logo.
    Omitted { reason: String },
}

impl LogoOutcome {
    pub fn image(&self) -> Option<&Arc<FittedImage>> {
        match self {
            LogoOutcome::Fitted(img) => Some(img),
            LogoOutcome::Omitted { .. } => None,
        }
    }
}

/// Decode and fit the logo. Decode and geometry failures are logged and
/// recovered as [`LogoOutcome::Omitted`].
pub fn load_logo(
    source: &dyn ImageSource,
    resource: Option<&str>,
    target_width: u32,
) -> LogoOutcome {
    let Some(resource) = resource else {
        return LogoOutcome::Omitted {
            reason: "no logo configured".to_string(),
        };
    };

    match source
        .decode(resource)
        .and_then(|img| ImageFitter::fit(&img, target_width))
    {
        Ok(fitted) => {
            log::debug!(
                "Logo {resource} fitted to {}×{}",
                fitted.width,
                fitted.height
            );
            LogoOutcome::Fitted(Arc::new(fitted))
        }
        Err(e) => {
            log::warn!("Rendering header without logo: {e}");
            LogoOutcome::Omitted {
                reason: e.to_string(),
            }
        }
    }
}
