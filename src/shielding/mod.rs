// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Shielding Schemes
//!
//! A shielding scheme hides a numeric value inside an opaque [`Blob`] and
//! recovers it later. Callers only ever see the two-method
//! [`ShieldingScheme`] contract, so schemes can be swapped without touching
//! the workflow.
//!
//! ## Schemes
//!
//! - [`SealedScheme`] - ChaCha20-Poly1305 with a fresh random nonce per
//!   value. Two encodings of the same number never share bytes, and any
//!   tampering fails authentication.
//! - [`DemoScheme`] - the reversible `FHE-<base64>` text encoding used by
//!   early prototypes. Kept for reading legacy records and for demos;
//!   it is NOT a security boundary.
//!
//! ## Supported Domain
//!
//! Finite, non-negative numbers. Field-specific ranges (rating `1..=5`,
//! usage counts) are enforced by submission validation, not here.

pub mod demo;
pub mod sealed;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use demo::DemoScheme;
pub use sealed::SealedScheme;

/// Opaque shielded value as persisted in record JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(String);

impl Blob {
    /// Wrap an already-encoded blob string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by shielding schemes.
#[derive(Debug, thiserror::Error)]
pub enum ShieldError {
    /// Blob was not produced by this scheme (or was tampered with).
    #[error("{0}")]
    MalformedBlob(String),

    /// Value outside the supported domain.
    #[error("value out of domain: {0}")]
    OutOfDomain(String),

    /// Key setup or randomness failure.
    #[error("crypto failure: {0}")]
    Crypto(String),
}

/// Pluggable encode/decode pair hiding a numeric value in an opaque blob.
///
/// Implementations must satisfy `decode(encode(v)) == v` for every value in
/// the supported domain and must fail with [`ShieldError::MalformedBlob`]
/// rather than return a garbled number for foreign blobs.
pub trait ShieldingScheme: Send + Sync {
    /// Shield a value.
    fn encode(&self, value: f64) -> Result<Blob, ShieldError>;

    /// Recover a shielded value.
    fn decode(&self, blob: &Blob) -> Result<f64, ShieldError>;
}

impl<T: ShieldingScheme + ?Sized> ShieldingScheme for Arc<T> {
    fn encode(&self, value: f64) -> Result<Blob, ShieldError> {
        (**self).encode(value)
    }

    fn decode(&self, blob: &Blob) -> Result<f64, ShieldError> {
        (**self).decode(blob)
    }
}

impl<T: ShieldingScheme + ?Sized> ShieldingScheme for &T {
    fn encode(&self, value: f64) -> Result<Blob, ShieldError> {
        (**self).encode(value)
    }

    fn decode(&self, blob: &Blob) -> Result<f64, ShieldError> {
        (**self).decode(blob)
    }
}

/// Reject values outside the supported domain.
pub(crate) fn ensure_supported(value: f64) -> Result<(), ShieldError> {
    if !value.is_finite() {
        return Err(ShieldError::OutOfDomain(format!("{value} is not finite")));
    }
    if value < 0.0 {
        return Err(ShieldError::OutOfDomain(format!("{value} is negative")));
    }
    Ok(())
}
