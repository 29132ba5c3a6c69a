// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key constants and utilities for the record store layout.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{CurationError, CurationResult};

/// Default prefix for record and index keys.
pub const DEFAULT_KEY_PREFIX: &str = "tool";

/// Suffix of the index key (`{prefix}_keys`).
const INDEX_SUFFIX: &str = "keys";

/// Length of the random part of generated record ids.
const ID_SUFFIX_LEN: usize = 8;

/// Key utilities for the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    prefix: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl StoreKeys {
    /// Create with a custom prefix (separate namespaces, tests).
    ///
    /// # Errors
    /// `Validation` unless the prefix is non-empty ASCII letters, digits or
    /// `-`. An `_` would let `{a}_{id}` collide with `{a_b}_keys`.
    pub fn new(prefix: impl Into<String>) -> CurationResult<Self> {
        let prefix = prefix.into();
        if !Self::is_valid_prefix(&prefix) {
            return Err(CurationError::Validation(format!(
                "invalid key prefix '{prefix}' (expected ASCII letters, digits or '-')"
            )));
        }
        Ok(Self { prefix })
    }

    /// Whether `prefix` may be used as a key prefix.
    pub fn is_valid_prefix(prefix: &str) -> bool {
        !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key holding the JSON array of all record ids.
    pub fn index_key(&self) -> String {
        format!("{}_{INDEX_SUFFIX}", self.prefix)
    }

    /// Key holding one record document.
    pub fn record_key(&self, id: &str) -> String {
        format!("{}_{id}", self.prefix)
    }

    /// Whether `id` may be used as a record id.
    ///
    /// Rejects ids whose record key would collide with the index key and
    /// ids that are not plain ASCII.
    pub fn is_valid_id(&self, id: &str) -> bool {
        !id.is_empty()
            && id != INDEX_SUFFIX
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Generate a fresh record id: `{prefix}-{unix_millis}-{random}`.
    pub fn generate_id(&self) -> String {
        self.generate_id_at(Utc::now().timestamp_millis())
    }

    /// Generate a record id for a given millisecond timestamp.
    pub fn generate_id_at(&self, unix_millis: i64) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("{}-{unix_millis}-{}", self.prefix, &random[..ID_SUFFIX_LEN])
    }
}
