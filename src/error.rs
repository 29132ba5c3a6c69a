// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Curation workflow errors.
//!
//! Every failure surfaced to a caller is one of these kinds plus a
//! human-readable message. Lower layers (`StoreError`, `ShieldError`,
//! `IdentityError`) convert into this type at the workflow boundary.

use crate::identity::IdentityError;
use crate::shielding::ShieldError;
use crate::storage::StoreError;

/// Error type for curation operations.
#[derive(Debug, thiserror::Error)]
pub enum CurationError {
    /// Backend reported not ready; retry later.
    #[error("Record store is not available")]
    StoreUnavailable,

    /// No record stored under this id.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The index key holds something other than a JSON array of ids.
    #[error("Record index is corrupt: {0}")]
    CorruptIndex(String),

    /// A record key holds malformed JSON.
    #[error("Record {id} is corrupt: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Submission input rejected before any write.
    #[error("Invalid submission: {0}")]
    Validation(String),

    /// Blob was not produced by the active shielding scheme.
    #[error("Malformed shielded value: {0}")]
    MalformedBlob(String),

    /// Signature declined, failed, or did not verify.
    #[error("Disclosure denied: {0}")]
    DisclosureDenied(String),

    /// Status precondition violated.
    #[error("Cannot {event} a record that is already {status}")]
    InvalidTransition { status: String, event: String },

    /// Actor is not allowed to review this record.
    #[error("{actor} is not allowed to review record {id}")]
    Unauthorized { actor: String, id: String },

    /// Backend I/O failure other than unavailability.
    #[error("Store error: {0}")]
    Store(String),
}

impl CurationError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurationError::StoreUnavailable => "store_unavailable",
            CurationError::NotFound(_) => "not_found",
            CurationError::CorruptIndex(_) => "corrupt_index",
            CurationError::CorruptRecord { .. } => "corrupt_record",
            CurationError::Validation(_) => "validation_error",
            CurationError::MalformedBlob(_) => "malformed_blob",
            CurationError::DisclosureDenied(_) => "disclosure_denied",
            CurationError::InvalidTransition { .. } => "invalid_transition",
            CurationError::Unauthorized { .. } => "unauthorized",
            CurationError::Store(_) => "store_error",
        }
    }

    /// Whether the caller may reasonably retry the same call later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CurationError::StoreUnavailable | CurationError::Store(_))
    }
}

impl From<StoreError> for CurationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable => CurationError::StoreUnavailable,
            other => CurationError::Store(other.to_string()),
        }
    }
}

impl From<ShieldError> for CurationError {
    fn from(e: ShieldError) -> Self {
        match e {
            ShieldError::MalformedBlob(msg) => CurationError::MalformedBlob(msg),
            ShieldError::OutOfDomain(msg) => CurationError::Validation(msg),
            ShieldError::Crypto(msg) => CurationError::MalformedBlob(msg),
        }
    }
}

impl From<IdentityError> for CurationError {
    fn from(e: IdentityError) -> Self {
        CurationError::DisclosureDenied(e.to_string())
    }
}

/// Result type for curation operations.
pub type CurationResult<T> = Result<T, CurationError>;
