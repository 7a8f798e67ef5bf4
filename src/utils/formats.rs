use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use crate::core::OutputFormat;
use crate::utils::{CompressorError, CompressorResult};

/// Image formats accepted by the selection bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    GIF,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::GIF => "image/gif",
            Self::WebP => "image/webp",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = CompressorError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "gif" => Ok(Self::GIF),
            "webp" => Ok(Self::WebP),
            _ => Err(CompressorError::encoding(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Lowercase extension of a file name, if any
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Get format from file extension
pub fn format_from_extension(path: &str) -> CompressorResult<ImageFormat> {
    let ext = extension_of(path).ok_or_else(|| {
        CompressorError::encoding(format!("File has no extension: {}", path))
    })?;
    ImageFormat::from_str(&ext)
}

/// Extension the exported file gets for the requested output format.
///
/// `Original` keeps the source extension, falling back to `jpg` when the
/// source name has none.
pub fn output_extension(name: &str, format: OutputFormat) -> String {
    match format.extension() {
        Some(ext) => ext.to_string(),
        None => extension_of(name).unwrap_or_else(|| "jpg".to_string()),
    }
}

/// Derives `compressed_<stem>.<ext>` for a source file name.
pub fn compressed_file_name(name: &str, format: OutputFormat) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("compressed_{}.{}", stem, output_extension(name, format))
}

/// Appends `_<n>` to the stem of an output file name.
pub fn numbered_file_name(file_name: &str, n: usize) -> String {
    let path = Path::new(file_name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{}_{}.{}", stem, n, ext),
        _ => format!("{}_{}", file_name, n),
    }
}

/// Builds a self-describing `data:` URI for the given file bytes.
pub fn to_data_uri(path: &str, bytes: &[u8]) -> String {
    let mime = match format_from_extension(path) {
        Ok(format) => format.mime_type().to_string(),
        Err(_) => format!("image/{}", extension_of(path).unwrap_or_else(|| "octet-stream".to_string())),
    };
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Strips a `data:image/...;base64,` header, leaving the base64 payload.
///
/// Returns `None` when the input is not an image data URI.
pub fn base64_payload(data_uri: &str) -> Option<&str> {
    let rest = data_uri.strip_prefix("data:image")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(payload)
}

pub fn decode_base64(payload: &str) -> CompressorResult<Vec<u8>> {
    Ok(STANDARD.decode(payload)?)
}
