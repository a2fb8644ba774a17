use crate::utils::error::{ClientError, Result};
use std::path::Path;

const SUPPORTED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// A photo taken at check-in/check-out or used as a profile picture.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoEvidence {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

// Keep raw image bytes out of debug logs.
impl std::fmt::Debug for PhotoEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoEvidence")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PhotoEvidence {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name)?;

        if bytes.is_empty() {
            return Err(ClientError::validation("photo", "Photo file is empty"));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::validation("photo", "Photo path has no file name"))?
            .to_string();

        content_type_for(&file_name)?;
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!("Loaded photo {} ({} bytes)", file_name, bytes.len());
        Self::from_bytes(file_name, bytes)
    }
}

fn content_type_for(file_name: &str) -> Result<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ClientError::validation("photo", "Photo file has no extension"))?;

    SUPPORTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .ok_or_else(|| {
            ClientError::validation(
                "photo",
                format!(
                    "Unsupported photo type: {}. Allowed extensions: jpg, jpeg, png, webp",
                    extension
                ),
            )
        })
}
