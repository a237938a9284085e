//! Access rules and cross-collection logic shared by handlers.

pub mod access;
pub mod files;
pub mod matching;

pub use access::{
    authorize_candidate, authorize_email, is_admin, require_admin, require_employer,
    require_employer_or_admin,
};
pub use files::{presigned_url, remove_previous, store_upload};
pub use matching::{compute_matches, persist_matches, MatchedPosting};
