// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Capability
//!
//! The workflow never holds keys itself. It asks an [`Identity`] for the
//! currently connected address and for EIP-191 message signatures; browser
//! wallets, hardware signers and [`LocalIdentity`] all fit behind it.

pub mod local;

use std::future::Future;

use alloy::primitives::{Address, Signature};

pub use local::LocalIdentity;

/// Identity errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The user declined the signature request.
    #[error("signature request rejected by user")]
    UserRejected,

    /// No wallet is connected.
    #[error("no identity connected")]
    NotConnected,

    /// Key material could not be loaded.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Signer failure.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Wallet identity able to prove control of an address.
pub trait Identity: Send + Sync {
    /// Connected address, if any.
    fn current_address(&self) -> Option<Address>;

    /// Sign `message` as an EIP-191 personal message.
    fn sign(&self, message: &str) -> impl Future<Output = Result<Signature, IdentityError>> + Send;
}
