// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, Signature};
use tokio::sync::Barrier;

use crate::identity::{Identity, IdentityError, LocalIdentity};
use crate::shielding::{Blob, ShieldError, ShieldingScheme};
use crate::storage::{KeyValueStore, StoreResult};

/// Store wrapper that holds the first two reads of one key until both have
/// completed, so two writers are guaranteed to observe the same value.
pub struct GatedStore<S> {
    inner: S,
    gated_key: String,
    gated_reads: AtomicUsize,
    barrier: Barrier,
}

impl<S: KeyValueStore> GatedStore<S> {
    pub fn new(inner: S, gated_key: impl Into<String>) -> Self {
        Self {
            inner,
            gated_key: gated_key.into(),
            gated_reads: AtomicUsize::new(2),
            barrier: Barrier::new(2),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn take_gate(&self, key: &str) -> bool {
        key == self.gated_key
            && self
                .gated_reads
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
    }
}

impl<S: KeyValueStore> KeyValueStore for GatedStore<S> {
    fn address(&self) -> String {
        self.inner.address()
    }

    async fn is_available(&self) -> StoreResult<bool> {
        self.inner.is_available().await
    }

    async fn get_data(&self, key: &str) -> StoreResult<Vec<u8>> {
        let gated = self.take_gate(key);
        let value = self.inner.get_data(key).await?;
        if gated {
            self.barrier.wait().await;
        }
        Ok(value)
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.inner.set_data(key, value).await
    }

    fn supports_compare_and_swap(&self) -> bool {
        self.inner.supports_compare_and_swap()
    }

    async fn compare_and_swap(&self, key: &str, expected: &[u8], new: &[u8]) -> StoreResult<bool> {
        self.inner.compare_and_swap(key, expected, new).await
    }
}

/// Scheme wrapper counting calls.
pub struct CountingScheme<Sh> {
    inner: Sh,
    encodes: AtomicUsize,
    decodes: AtomicUsize,
}

impl<Sh: ShieldingScheme> CountingScheme<Sh> {
    pub fn new(inner: Sh) -> Self {
        Self {
            inner,
            encodes: AtomicUsize::new(0),
            decodes: AtomicUsize::new(0),
        }
    }

    pub fn encode_calls(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }

    pub fn decode_calls(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

impl<Sh: ShieldingScheme> ShieldingScheme for CountingScheme<Sh> {
    fn encode(&self, value: f64) -> Result<Blob, ShieldError> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(value)
    }

    fn decode(&self, blob: &Blob) -> Result<f64, ShieldError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        self.inner.decode(blob)
    }
}

/// Connected identity that declines every signature request.
pub struct RejectingIdentity {
    address: Address,
}

impl RejectingIdentity {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Identity for RejectingIdentity {
    fn current_address(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn sign(&self, _message: &str) -> Result<Signature, IdentityError> {
        Err(IdentityError::UserRejected)
    }
}

/// Claims one address but signs with another key.
pub struct ImpostorIdentity {
    claimed: Address,
    signer: LocalIdentity,
}

impl ImpostorIdentity {
    pub fn new(claimed: Address, signer: LocalIdentity) -> Self {
        Self { claimed, signer }
    }
}

impl Identity for ImpostorIdentity {
    fn current_address(&self) -> Option<Address> {
        Some(self.claimed)
    }

    async fn sign(&self, message: &str) -> Result<Signature, IdentityError> {
        self.signer.sign(message).await
    }
}
