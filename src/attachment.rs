// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Image attachments and their encoding
//!
//! Attachments are encoded concurrently but always come back in the order
//! the user arranged them. One failed attachment fails the whole batch.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AttachmentError, LensError, Result};
use crate::llm::message::ContentPart;

/// Opaque identity of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Where the image bytes live
#[derive(Debug, Clone)]
pub enum AttachmentSource {
    /// Bytes already in memory
    Bytes(Arc<[u8]>),
    /// A file read at encode time
    File(PathBuf),
}

/// A user-selected image
#[derive(Debug, Clone)]
pub struct Attachment {
    id: AttachmentId,
    source: AttachmentSource,
    media_type: String,
}

impl Attachment {
    /// An in-memory image
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, media_type: impl Into<String>) -> Self {
        Self {
            id: AttachmentId::new(),
            source: AttachmentSource::Bytes(bytes.into()),
            media_type: media_type.into(),
        }
    }

    /// An image file; the media type comes from the file extension
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let media_type = media_type_for_path(&path).ok_or_else(|| {
            LensError::InvalidInput(format!(
                "unsupported image type: {} (expected png, jpg, jpeg, webp, gif, heic or heif)",
                path.display()
            ))
        })?;
        Ok(Self {
            id: AttachmentId::new(),
            source: AttachmentSource::File(path),
            media_type: media_type.to_string(),
        })
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn source(&self) -> &AttachmentSource {
        &self.source
    }

    /// Human-readable name for listings
    pub fn display_name(&self) -> String {
        match &self.source {
            AttachmentSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            AttachmentSource::Bytes(bytes) => format!("{} ({} bytes)", self.id, bytes.len()),
        }
    }
}

/// Media type for a supported image extension
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Encode a single attachment into an inline image part
pub async fn encode_attachment(
    attachment: &Attachment,
) -> std::result::Result<ContentPart, AttachmentError> {
    let id = attachment.id();

    if !attachment.media_type.starts_with("image/") {
        return Err(AttachmentError::new(
            id,
            format!("'{}' is not an image media type", attachment.media_type),
        ));
    }

    let bytes: Arc<[u8]> = match &attachment.source {
        AttachmentSource::Bytes(bytes) => Arc::clone(bytes),
        AttachmentSource::File(path) => tokio::fs::read(path)
            .await
            .map_err(|e| AttachmentError::new(id, format!("{}: {}", path.display(), e)))?
            .into(),
    };

    if bytes.is_empty() {
        return Err(AttachmentError::new(id, "image is empty"));
    }

    let data = tokio::task::spawn_blocking(move || {
        base64::engine::general_purpose::STANDARD.encode(&bytes[..])
    })
    .await
    .map_err(|e| AttachmentError::new(id, format!("encoder task failed: {}", e)))?;

    tracing::debug!(
        target: "celestial.attachment",
        attachment = %id,
        media_type = %attachment.media_type,
        encoded_len = data.len(),
        "encoded attachment"
    );

    Ok(ContentPart::image(attachment.media_type.clone(), data))
}

/// Encode every attachment concurrently, preserving input order
pub async fn encode_all(
    attachments: &[Attachment],
) -> std::result::Result<Vec<ContentPart>, AttachmentError> {
    encode_all_with(attachments, |attachment| encode_attachment(attachment)).await
}

/// Like [`encode_all`] with a caller-supplied per-attachment encoder
pub async fn encode_all_with<'a, F, Fut>(
    attachments: &'a [Attachment],
    encode: F,
) -> std::result::Result<Vec<ContentPart>, AttachmentError>
where
    F: Fn(&'a Attachment) -> Fut,
    Fut: Future<Output = std::result::Result<ContentPart, AttachmentError>>,
{
    let parts = futures::future::try_join_all(attachments.iter().map(encode)).await?;
    debug_assert_eq!(parts.len(), attachments.len());
    Ok(parts)
}
