//! Object key scheme and accepted upload types.
//!
//! Keys are `{folder}/{uuid}.{ext}`, or `{uuid}.{ext}` when no folder is
//! given. Extensions come from the client's filename when it carries a
//! recognised one, falling back to the declared content type.

use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Top-level key prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    ProfilePictures,
    CompanyLogos,
    Resumes,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::ProfilePictures => "profile-pictures",
            Folder::CompanyLogos => "company-logos",
            Folder::Resumes => "resumes",
        }
    }
}

/// Build a fresh object key.
pub fn object_key(folder: Option<Folder>, extension: &str) -> String {
    let ext = extension.trim_start_matches('.').to_lowercase();
    match folder {
        Some(folder) => format!("{}/{}.{}", folder.as_str(), Uuid::new_v4(), ext),
        None => format!("{}.{}", Uuid::new_v4(), ext),
    }
}

/// Resolved file type of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType {
    pub extension: &'static str,
    pub content_type: &'static str,
}

const IMAGE_TYPES: &[FileType] = &[
    FileType { extension: "jpg", content_type: "image/jpeg" },
    FileType { extension: "png", content_type: "image/png" },
    FileType { extension: "webp", content_type: "image/webp" },
    FileType { extension: "gif", content_type: "image/gif" },
];

const DOCUMENT_TYPES: &[FileType] = &[
    FileType { extension: "pdf", content_type: "application/pdf" },
    FileType { extension: "doc", content_type: "application/msword" },
    FileType {
        extension: "docx",
        content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    },
];

/// Class of upload an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Document,
}

impl UploadKind {
    fn allowed(&self) -> &'static [FileType] {
        match self {
            UploadKind::Image => IMAGE_TYPES,
            UploadKind::Document => DOCUMENT_TYPES,
        }
    }

    /// Resolve the stored extension and content type for an upload.
    pub fn resolve(&self, filename: Option<&str>, content_type: Option<&str>) -> StorageResult<FileType> {
        let from_name = filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .and_then(|ext| {
                let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
                self.allowed().iter().find(|t| t.extension == ext).copied()
            });
        if let Some(file_type) = from_name {
            return Ok(file_type);
        }

        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase())
            .unwrap_or_default();
        self.allowed()
            .iter()
            .find(|t| t.content_type == declared)
            .copied()
            .ok_or_else(|| {
                let accepted: Vec<&str> = self.allowed().iter().map(|t| t.extension).collect();
                StorageError::unsupported(format!(
                    "expected one of: {}",
                    accepted.join(", ")
                ))
            })
    }
}
