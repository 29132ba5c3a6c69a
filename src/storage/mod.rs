// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Storage
//!
//! Records live in an external key/value store that only offers three
//! operations: an availability flag, `getData(key)` and `setData(key, value)`.
//! This module defines that capability as [`KeyValueStore`] and layers typed
//! record access on top of it in [`RecordRepository`].
//!
//! ## Key Layout
//!
//! ```text
//! tool_keys        # JSON array of record ids (the index)
//! tool_{id}        # JSON document for one record
//! ```
//!
//! The `tool` prefix is configurable (see [`StoreKeys`]).
//!
//! ## Index Consistency
//!
//! The backend has no native list append. When a backend implements
//! [`KeyValueStore::compare_and_swap`], index appends retry until they win;
//! otherwise the append is a plain read-modify-write and two concurrent
//! submissions can each write back an index missing the other's id. The
//! losing record stays in the store but disappears from listings.

pub mod contract;
pub mod keys;
pub mod memory;
pub mod records;

use std::future::Future;
use std::sync::Arc;

pub use contract::ContractStore;
pub use keys::{StoreKeys, DEFAULT_KEY_PREFIX};
pub use memory::MemoryStore;
pub use records::{IndexSnapshot, RecordRepository};

/// Errors reported by a key/value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is not available")]
    Unavailable,

    #[error("invalid store address: {0}")]
    InvalidAddress(String),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),
}

/// Result type for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// External key/value capability the records live in.
///
/// Keys are opaque ASCII strings. A key that was never written reads as an
/// empty byte vector.
pub trait KeyValueStore: Send + Sync {
    /// Address identifying this store (bound into disclosure challenges).
    fn address(&self) -> String;

    /// Whether the backend is ready to serve requests.
    fn is_available(&self) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Read the raw value at `key`.
    fn get_data(&self, key: &str) -> impl Future<Output = StoreResult<Vec<u8>>> + Send;

    /// Overwrite the value at `key`.
    fn set_data(&self, key: &str, value: &[u8]) -> impl Future<Output = StoreResult<()>> + Send;

    /// Whether [`KeyValueStore::compare_and_swap`] is implemented.
    fn supports_compare_and_swap(&self) -> bool {
        false
    }

    /// Write `new` only if the current value equals `expected`.
    ///
    /// Returns `Ok(false)` when the current value differs.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: &[u8],
        new: &[u8],
    ) -> impl Future<Output = StoreResult<bool>> + Send {
        let _ = (key, expected, new);
        async { Err(StoreError::Unsupported("compare-and-swap")) }
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn address(&self) -> String {
        (**self).address()
    }

    fn is_available(&self) -> impl Future<Output = StoreResult<bool>> + Send {
        (**self).is_available()
    }

    fn get_data(&self, key: &str) -> impl Future<Output = StoreResult<Vec<u8>>> + Send {
        (**self).get_data(key)
    }

    fn set_data(&self, key: &str, value: &[u8]) -> impl Future<Output = StoreResult<()>> + Send {
        (**self).set_data(key, value)
    }

    fn supports_compare_and_swap(&self) -> bool {
        (**self).supports_compare_and_swap()
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: &[u8],
        new: &[u8],
    ) -> impl Future<Output = StoreResult<bool>> + Send {
        (**self).compare_and_swap(key, expected, new)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn address(&self) -> String {
        (**self).address()
    }

    fn is_available(&self) -> impl Future<Output = StoreResult<bool>> + Send {
        (**self).is_available()
    }

    fn get_data(&self, key: &str) -> impl Future<Output = StoreResult<Vec<u8>>> + Send {
        (**self).get_data(key)
    }

    fn set_data(&self, key: &str, value: &[u8]) -> impl Future<Output = StoreResult<()>> + Send {
        (**self).set_data(key, value)
    }

    fn supports_compare_and_swap(&self) -> bool {
        (**self).supports_compare_and_swap()
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: &[u8],
        new: &[u8],
    ) -> impl Future<Output = StoreResult<bool>> + Send {
        (**self).compare_and_swap(key, expected, new)
    }
}
