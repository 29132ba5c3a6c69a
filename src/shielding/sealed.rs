// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AEAD shielding scheme.
//!
//! ## Blob Layout
//!
//! ```text
//! sealed-v1:<base64( nonce[12] || ciphertext[8] || tag[16] )>
//! ```
//!
//! The plaintext is always the 8-byte big-endian `f64`, so every blob has
//! the same length regardless of the value. A fresh random nonce per call
//! makes repeated encodings of one value unlinkable.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, CHACHA20_POLY1305, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;

use super::{ensure_supported, Blob, ShieldError, ShieldingScheme};

/// Blob prefix for this scheme and format version.
pub const SEALED_PREFIX: &str = "sealed-v1:";

/// Additional authenticated data bound into every blob.
const SEALED_AAD: &[u8] = b"tool-curation/shield/v1";

const VALUE_LEN: usize = 8;
const TAG_LEN: usize = 16;
const SEALED_LEN: usize = NONCE_LEN + VALUE_LEN + TAG_LEN;

type HmacSha256 = Hmac<Sha256>;

/// ChaCha20-Poly1305 shielding scheme.
#[derive(Debug)]
pub struct SealedScheme {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl SealedScheme {
    /// Build from a raw 32-byte key.
    pub fn new(key: &[u8; 32]) -> Result<Self, ShieldError> {
        let unbound = UnboundKey::new(&CHACHA20_POLY1305, key)
            .map_err(|_| ShieldError::Crypto("invalid key length".to_string()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Derive the key from a deployment secret and a context label
    /// (HMAC-SHA256), so one secret can serve several stores.
    pub fn derive(master_secret: &[u8], context: &str) -> Result<Self, ShieldError> {
        if master_secret.is_empty() {
            return Err(ShieldError::Crypto("master secret is empty".to_string()));
        }
        let mut mac = <HmacSha256 as Mac>::new_from_slice(master_secret)
            .map_err(|e| ShieldError::Crypto(e.to_string()))?;
        mac.update(context.as_bytes());
        let digest = mac.finalize().into_bytes();

        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self::new(&key)
    }

    /// Generate a scheme with a random key (tests, ephemeral demos).
    pub fn generate() -> Result<Self, ShieldError> {
        let rng = SystemRandom::new();
        let mut key = [0u8; 32];
        rng.fill(&mut key)
            .map_err(|_| ShieldError::Crypto("random key generation failed".to_string()))?;
        Self::new(&key)
    }
}

impl ShieldingScheme for SealedScheme {
    fn encode(&self, value: f64) -> Result<Blob, ShieldError> {
        ensure_supported(value)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| ShieldError::Crypto("nonce generation failed".to_string()))?;

        let mut in_out = value.to_be_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(SEALED_AAD),
                &mut in_out,
            )
            .map_err(|_| ShieldError::Crypto("seal failed".to_string()))?;

        let mut sealed = Vec::with_capacity(SEALED_LEN);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);

        Ok(Blob::new(format!(
            "{SEALED_PREFIX}{}",
            Base64::encode_string(&sealed)
        )))
    }

    fn decode(&self, blob: &Blob) -> Result<f64, ShieldError> {
        let encoded = blob
            .as_str()
            .strip_prefix(SEALED_PREFIX)
            .ok_or_else(|| ShieldError::MalformedBlob(format!("missing {SEALED_PREFIX} prefix")))?;

        let sealed = Base64::decode_vec(encoded)
            .map_err(|e| ShieldError::MalformedBlob(format!("invalid base64: {e}")))?;
        if sealed.len() != SEALED_LEN {
            return Err(ShieldError::MalformedBlob(format!(
                "expected {SEALED_LEN} bytes, got {}",
                sealed.len()
            )));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| ShieldError::MalformedBlob("invalid nonce".to_string()))?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(SEALED_AAD), &mut in_out)
            .map_err(|_| ShieldError::MalformedBlob("authentication failed".to_string()))?;

        let bytes: [u8; VALUE_LEN] = <[u8; VALUE_LEN]>::try_from(&plaintext[..])
            .map_err(|_| ShieldError::MalformedBlob("unexpected plaintext length".to_string()))?;
        let value = f64::from_be_bytes(bytes);

        ensure_supported(value).map_err(|e| ShieldError::MalformedBlob(e.to_string()))?;
        Ok(value)
    }
}
