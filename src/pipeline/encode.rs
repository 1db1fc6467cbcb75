//! Image encoding: crop files → base64 payloads for multimodal API calls.
//!
//! Vision endpoints accept images as base64 data-URIs embedded in the JSON
//! request body. Crops are written to disk as JPEG by the splitter (quality
//! matters less than upload size for photographed cards), so encoding here
//! is a straight read-and-base64 of the file bytes plus a MIME sniff from
//! the extension.

use crate::error::AiError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// A base64-encoded image ready to be attached to an AI request.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Base64 of the raw file bytes.
    pub data: String,
    /// MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
}

impl ImageData {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ImageData {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Render as a `data:` URI for chat-completion image parts.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Read an image file and wrap it as [`ImageData`].
pub fn encode_image_file(path: &Path) -> Result<ImageData, AiError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AiError::Api(format!("failed to read image '{}': {e}", path.display())))?;
    let b64 = STANDARD.encode(&bytes);
    debug!("encoded {} -> {} bytes base64", path.display(), b64.len());
    Ok(ImageData::new(b64, mime_type_for(path)))
}

/// Encode a batch of image files, preserving order.
pub fn encode_image_files(paths: &[std::path::PathBuf]) -> Result<Vec<ImageData>, AiError> {
    paths.iter().map(|p| encode_image_file(p)).collect()
}

fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn encodes_file_bytes_as_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crop.jpg");
        std::fs::write(&path, b"fake image data").unwrap();

        let data = encode_image_file(&path).unwrap();
        assert_eq!(data.mime_type, "image/jpeg");
        assert_eq!(data.data, STANDARD.encode(b"fake image data"));
    }

    #[test]
    fn data_uri_embeds_mime_type() {
        let data = ImageData::new("QUJD", "image/png");
        assert_eq!(data.to_data_uri(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn png_extension_maps_to_png_mime() {
        assert_eq!(mime_type_for(&PathBuf::from("ref.PNG")), "image/png");
        assert_eq!(mime_type_for(&PathBuf::from("ref.jpeg")), "image/jpeg");
    }

    #[test]
    fn batch_encode_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..3 {
            let p = dir.path().join(format!("part{i}.jpg"));
            std::fs::write(&p, format!("crop-{i}")).unwrap();
            paths.push(p);
        }
        let encoded = encode_image_files(&paths).unwrap();
        assert_eq!(encoded.len(), 3);
        assert_eq!(encoded[1].data, STANDARD.encode(b"crop-1"));
    }
}
