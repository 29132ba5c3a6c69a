// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process key/value backend.
//!
//! Used for local development, demos and tests. It can run with or without
//! compare-and-swap so both index update disciplines can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError, StoreResult};

/// In-memory key/value store.
#[derive(Debug)]
pub struct MemoryStore {
    address: String,
    available: AtomicBool,
    atomic_updates: bool,
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Store with compare-and-swap support.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            available: AtomicBool::new(true),
            atomic_updates: true,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store without compare-and-swap, mirroring a plain get/set backend.
    pub fn non_atomic(address: impl Into<String>) -> Self {
        Self {
            atomic_updates: false,
            ..Self::new(address)
        }
    }

    /// Toggle the availability flag.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Write a raw value directly, bypassing availability.
    pub async fn seed(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.write().await.insert(key.into(), value.into());
    }

    /// Read a raw value directly, bypassing availability.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn is_available(&self) -> StoreResult<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn get_data(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.ensure_available()?;
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.ensure_available()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn supports_compare_and_swap(&self) -> bool {
        self.atomic_updates
    }

    async fn compare_and_swap(&self, key: &str, expected: &[u8], new: &[u8]) -> StoreResult<bool> {
        if !self.atomic_updates {
            return Err(StoreError::Unsupported("compare-and-swap"));
        }
        self.ensure_available()?;

        let mut entries = self.entries.write().await;
        let current = entries.get(key).map(Vec::as_slice).unwrap_or_default();
        if current != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), new.to_vec());
        Ok(true)
    }
}
