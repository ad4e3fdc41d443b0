use crate::config::AttachmentConfig;
use crate::database::attachment::AttachmentRepository;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::attachment::{AttachmentRef, StoredAttachment};
use base64::{Engine as _, engine::general_purpose};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use tracing::debug;

static DATA_URI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^data:([a-zA-Z0-9.+/-]+);base64,(.*)$").expect("Invalid data URI regex"));

/// A decoded image that passed the allow-list, the size ceiling and the signature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    pub fn content_id(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

fn matches_signature(content_type: &str, bytes: &[u8]) -> bool {
    match content_type {
        "image/png" => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "image/jpeg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/gif" => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        "image/webp" => bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        // Types added to the allow-list through configuration are trusted as declared.
        _ => true,
    }
}

pub fn decode_data_uri(input: &str, config: &AttachmentConfig) -> Result<DecodedImage, AppError> {
    let captures = DATA_URI
        .captures(input.trim())
        .ok_or_else(|| AppError::InvalidAttachment("expected a base64 data URI".to_string()))?;
    let content_type = captures[1].to_ascii_lowercase();
    let payload = &captures[2];

    if !config.allowed_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&content_type)) {
        return Err(AppError::InvalidAttachment(format!("content type {} is not allowed", content_type)));
    }

    // Base64 inflates by 4/3, so an oversized payload is refused before decoding.
    let estimated = payload.len() / 4 * 3;
    if estimated > config.max_bytes + 2 {
        return Err(AppError::AttachmentTooLarge {
            size: estimated,
            limit: config.max_bytes,
        });
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::InvalidAttachment(format!("malformed base64 payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::InvalidAttachment("image is empty".to_string()));
    }
    if bytes.len() > config.max_bytes {
        return Err(AppError::AttachmentTooLarge {
            size: bytes.len(),
            limit: config.max_bytes,
        });
    }
    if !matches_signature(&content_type, &bytes) {
        return Err(AppError::InvalidAttachment(format!("content does not look like {}", content_type)));
    }

    Ok(DecodedImage { content_type, bytes })
}

pub struct AttachmentService<'a> {
    repository: &'a StoreRepository,
    config: &'a AttachmentConfig,
}

impl<'a> AttachmentService<'a> {
    pub fn new(repository: &'a StoreRepository, config: &'a AttachmentConfig) -> Self {
        Self { repository, config }
    }

    /// Validates a data URI image and stores it once under the hash of its bytes.
    pub async fn store_data_uri(&self, input: &str) -> Result<AttachmentRef, AppError> {
        let image = decode_data_uri(input, self.config)?;
        let id = image.content_id();

        let stored = StoredAttachment {
            content_type: image.content_type.clone(),
            data: general_purpose::STANDARD.encode(&image.bytes),
        };
        self.repository.put_attachment(&id, &stored).await?;
        debug!(attachment_id = %id, size = image.bytes.len(), content_type = %image.content_type, "attachment stored");

        Ok(AttachmentRef {
            id,
            content_type: image.content_type,
            size: image.bytes.len(),
        })
    }

    pub async fn load(&self, id: &str) -> Result<DecodedImage, AppError> {
        let stored = self
            .repository
            .get_attachment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attachment not found".to_string()))?;
        let bytes = general_purpose::STANDARD
            .decode(&stored.data)
            .map_err(|e| AppError::Internal(format!("stored attachment {} is not valid base64: {}", id, e)))?;
        Ok(DecodedImage {
            content_type: stored.content_type,
            bytes,
        })
    }

    /// The image as an inline data URI, or `None` when it is no longer stored.
    pub async fn data_uri(&self, attachment: &AttachmentRef) -> Result<Option<String>, AppError> {
        Ok(self.repository.get_attachment(&attachment.id).await?.map(|stored| stored.to_data_uri()))
    }
}
