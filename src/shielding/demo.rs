// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reversible demonstration encoding: `FHE-` followed by the base64 of the
//! decimal value.
//!
//! Anyone holding the blob can read the value. Use [`super::SealedScheme`]
//! for real deployments.

use base64ct::{Base64, Encoding};

use super::{ensure_supported, Blob, ShieldError, ShieldingScheme};

/// Blob prefix written by the demo encoding.
pub const DEMO_PREFIX: &str = "FHE-";

/// Reference reversible encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoScheme;

impl ShieldingScheme for DemoScheme {
    fn encode(&self, value: f64) -> Result<Blob, ShieldError> {
        ensure_supported(value)?;
        let text = value.to_string();
        Ok(Blob::new(format!(
            "{DEMO_PREFIX}{}",
            Base64::encode_string(text.as_bytes())
        )))
    }

    fn decode(&self, blob: &Blob) -> Result<f64, ShieldError> {
        let encoded = blob
            .as_str()
            .strip_prefix(DEMO_PREFIX)
            .ok_or_else(|| ShieldError::MalformedBlob(format!("missing {DEMO_PREFIX} prefix")))?;

        let bytes = Base64::decode_vec(encoded)
            .map_err(|e| ShieldError::MalformedBlob(format!("invalid base64: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ShieldError::MalformedBlob("payload is not UTF-8".to_string()))?;
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| ShieldError::MalformedBlob("payload is not a number".to_string()))?;

        ensure_supported(value).map_err(|e| ShieldError::MalformedBlob(e.to_string()))?;
        Ok(value)
    }
}
