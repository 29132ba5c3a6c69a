// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tool Curation - shielded submission and review workflow
//!
//! This crate implements the review pipeline for community-submitted
//! education tools. Each record carries public metadata plus two shielded
//! numeric fields (rating and usage) that are only revealed after the viewer
//! signs a fresh disclosure challenge.
//!
//! ## Modules
//!
//! - `shielding` - Pluggable encode/decode schemes for numeric fields
//! - `storage` - Key/value store capability and the record repository
//! - `identity` - Wallet identity capability (address + message signing)
//! - `disclosure` - Signature-gated disclosure of shielded fields
//! - `curation` - Record lifecycle state machine and review policies
//! - `workflow` - `Curator` orchestrator tying the above together
//! - `config` - Environment configuration
//! - `telemetry` - Tracing subscriber setup

pub mod config;
pub mod curation;
pub mod disclosure;
pub mod error;
pub mod identity;
pub mod models;
pub mod shielding;
pub mod storage;
pub mod telemetry;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::CurationConfig;
pub use curation::{CurationEvent, RecordStatus, ReviewPolicy, ReviewerSet, SubmitterReview};
pub use disclosure::{DisclosureContext, DisclosureProtocol};
pub use error::{CurationError, CurationResult};
pub use identity::{Identity, LocalIdentity};
pub use models::{CurationStats, NewRecord, RecordFilter, ShieldedField, ToolRecord};
pub use shielding::{Blob, DemoScheme, SealedScheme, ShieldingScheme};
pub use storage::{ContractStore, KeyValueStore, MemoryStore, StoreKeys};
pub use workflow::{Curator, Listing};
