//! Content API error taxonomy

use thiserror::Error;

/// Errors surfaced by the content API client.
///
/// Transport failures, non-success API statuses and malformed payloads are
/// kept distinct from an authoritative "no such document" answer so callers
/// can map them to different page-level outcomes.
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("content API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("failed to decode content API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("content repository exposes no master ref")]
    MissingMasterRef,

    #[error("no {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },
}

impl CmsError {
    /// True when the API answered authoritatively that the document is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }
}
