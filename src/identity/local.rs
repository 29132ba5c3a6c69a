// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local private-key identity.
//!
//! Loads secp256k1 keys stored as PEM (SEC1 or PKCS#8) or hex and signs
//! challenges in-process.

use alloy::{
    primitives::{Address, Signature},
    signers::{local::PrivateKeySigner, Signer},
};
use k256::SecretKey;

use super::{Identity, IdentityError};

/// Identity backed by an in-process private key.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    signer: PrivateKeySigner,
}

impl LocalIdentity {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Fresh random key (demos, tests).
    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    /// Load from a hex-encoded key (with or without `0x`).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, IdentityError> {
        let trimmed = private_key_hex.trim();
        let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let key_bytes =
            alloy::hex::decode(hex).map_err(|e| IdentityError::InvalidKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map(Self::new)
            .map_err(|e| IdentityError::InvalidKey(e.to_string()))
    }

    /// Load from a PEM-encoded key.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, IdentityError> {
        let key_bytes = secret_key_from_pem(pem_bytes)?.to_bytes();
        PrivateKeySigner::from_slice(&key_bytes)
            .map(Self::new)
            .map_err(|e| IdentityError::InvalidKey(e.to_string()))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

/// Parse a PEM private key, accepting SEC1 or PKCS#8 encodings.
fn secret_key_from_pem(pem_bytes: &[u8]) -> Result<SecretKey, IdentityError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| IdentityError::InvalidKey(format!("Invalid UTF-8: {e}")))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| IdentityError::InvalidKey(format!("Invalid PEM: {e}")))?;

    SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| {
            use k256::pkcs8::DecodePrivateKey;
            SecretKey::from_pkcs8_der(pem.contents())
        })
        .map_err(|e| IdentityError::InvalidKey(format!("Invalid key format: {e}")))
}

impl Identity for LocalIdentity {
    fn current_address(&self) -> Option<Address> {
        Some(self.signer.address())
    }

    async fn sign(&self, message: &str) -> Result<Signature, IdentityError> {
        self.signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| IdentityError::Signing(e.to_string()))
    }
}
