//! S3 object storage for the Talent backend.
//!
//! This crate provides:
//! - Byte uploads for profile pictures, company logos and resumes
//! - Presigned GET URL generation
//! - The object key scheme and accepted upload types

pub mod client;
pub mod error;
pub mod keys;

pub use client::{S3Client, S3Config, DEFAULT_PRESIGN_TTL_SECS};
pub use error::{StorageError, StorageResult};
pub use keys::{object_key, FileType, Folder, UploadKind};
