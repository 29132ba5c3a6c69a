// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Disclosure Protocol
//!
//! Reveals a shielded value only after the requester signs a fresh challenge.
//!
//! ## Flow
//!
//! 1. Build the challenge from the session's [`DisclosureContext`]
//! 2. Ask the identity to sign it (any failure or refusal denies)
//! 3. Recover the signer from the signature; it must be the identity's
//!    connected address
//! 4. Decode the blob and hand the value back to the caller
//!
//! Decoded values are never written back or cached: every disclosure asks
//! for a new signature.
//!
//! ## Challenge Format
//!
//! ```text
//! publickey:{public_key}
//! contractAddresses:{store_address}
//! contractsChainId:{chain_id}
//! startTimestamp:{start_timestamp}
//! durationDays:{duration_days}
//! ```
//!
//! Lines are joined with `\n` and there is no trailing newline.

use alloy::primitives::Address;
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{CurationError, CurationResult};
use crate::identity::Identity;
use crate::shielding::{Blob, ShieldingScheme};

/// Random bytes behind a session's public key material.
pub const SESSION_KEY_BYTES: usize = 1000;

/// Default disclosure window.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Tolerated clock skew for window starts in the future.
pub const CLOCK_SKEW_SECS: i64 = 60;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parameters bound into a disclosure challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureContext {
    pub public_key: String,
    pub store_address: String,
    pub chain_id: u64,
    /// Unix seconds.
    pub start_timestamp: i64,
    pub duration_days: u32,
}

impl DisclosureContext {
    /// Open a session starting now with fresh key material.
    pub fn open(
        store_address: impl Into<String>,
        chain_id: u64,
        duration_days: u32,
    ) -> CurationResult<Self> {
        Ok(Self {
            public_key: generate_public_key()?,
            store_address: store_address.into(),
            chain_id,
            start_timestamp: Utc::now().timestamp(),
            duration_days,
        })
    }

    /// Canonical challenge text. Byte-for-byte stable for equal inputs.
    pub fn challenge(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            self.store_address,
            self.chain_id,
            self.start_timestamp,
            self.duration_days
        )
    }

    /// End of the window (exclusive), unix seconds.
    pub fn expires_at(&self) -> i64 {
        self.start_timestamp
            .saturating_add(i64::from(self.duration_days).saturating_mul(SECONDS_PER_DAY))
    }

    /// Whether `now` falls inside the window.
    pub fn is_active_at(&self, now: i64) -> bool {
        now.saturating_add(CLOCK_SKEW_SECS) >= self.start_timestamp && now < self.expires_at()
    }
}

/// `0x` followed by hex of [`SESSION_KEY_BYTES`] random bytes.
fn generate_public_key() -> CurationResult<String> {
    let mut bytes = vec![0u8; SESSION_KEY_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| CurationError::DisclosureDenied("session key generation failed".to_string()))?;
    Ok(format!("0x{}", alloy::hex::encode(bytes)))
}

/// Signature-gated decoder.
pub struct DisclosureProtocol<'a, Sh: ?Sized> {
    scheme: &'a Sh,
}

impl<'a, Sh: ShieldingScheme + ?Sized> DisclosureProtocol<'a, Sh> {
    pub fn new(scheme: &'a Sh) -> Self {
        Self { scheme }
    }

    /// Reveal `blob` for `identity` within `context`.
    pub async fn disclose<I: Identity + ?Sized>(
        &self,
        blob: &Blob,
        identity: &I,
        context: &DisclosureContext,
    ) -> CurationResult<f64> {
        self.disclose_at(blob, identity, context, Utc::now().timestamp())
            .await
    }

    /// [`Self::disclose`] with an explicit clock.
    pub async fn disclose_at<I: Identity + ?Sized>(
        &self,
        blob: &Blob,
        identity: &I,
        context: &DisclosureContext,
        now: i64,
    ) -> CurationResult<f64> {
        let requester = identity
            .current_address()
            .ok_or_else(|| deny(None, "no identity connected"))?;

        if !context.is_active_at(now) {
            return Err(deny(Some(&requester), "disclosure window is not active"));
        }

        let challenge = context.challenge();
        let signature = identity.sign(&challenge).await.map_err(|e| {
            tracing::warn!(requester = %requester, error = %e, "Disclosure signature not obtained");
            CurationError::DisclosureDenied(e.to_string())
        })?;

        let signer = signature
            .recover_address_from_msg(challenge.as_bytes())
            .map_err(|_| deny(Some(&requester), "signature could not be verified"))?;
        if signer != requester {
            return Err(deny(
                Some(&requester),
                "signature was not produced by the connected identity",
            ));
        }

        let value = self.scheme.decode(blob)?;
        tracing::info!(
            requester = %requester,
            chain_id = context.chain_id,
            "Disclosure granted"
        );
        Ok(value)
    }
}

fn deny(requester: Option<&Address>, reason: &str) -> CurationError {
    match requester {
        Some(requester) => {
            tracing::warn!(requester = %requester, reason, "Disclosure denied")
        }
        None => tracing::warn!(reason, "Disclosure denied"),
    }
    CurationError::DisclosureDenied(reason.to_string())
}
