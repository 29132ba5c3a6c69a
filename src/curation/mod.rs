// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Curation State Machine
//!
//! ```text
//!            Approve
//!   Pending ─────────► Approved (terminal)
//!      │
//!      └─────────────► Rejected (terminal)
//!            Reject
//! ```
//!
//! A transition only ever changes `status`. Who may fire it is decided by a
//! pluggable [`ReviewPolicy`].

pub mod policy;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{CurationError, CurationResult};
use crate::models::ToolRecord;

pub use policy::{ReviewPolicy, ReviewerSet, SubmitterReview};

/// Record lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Awaiting review
    #[default]
    Pending,
    /// Accepted into the catalogue
    Approved,
    /// Turned down
    Rejected,
}

impl RecordStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "pending"),
            RecordStatus::Approved => write!(f, "approved"),
            RecordStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationEvent {
    Approve,
    Reject,
}

impl CurationEvent {
    /// Status a pending record moves to.
    pub fn target(&self) -> RecordStatus {
        match self {
            CurationEvent::Approve => RecordStatus::Approved,
            CurationEvent::Reject => RecordStatus::Rejected,
        }
    }
}

impl std::fmt::Display for CurationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurationEvent::Approve => write!(f, "approve"),
            CurationEvent::Reject => write!(f, "reject"),
        }
    }
}

/// Apply `event` to `record` on behalf of `actor`.
///
/// Returns the updated record; the input is never modified.
///
/// # Errors
/// - `InvalidTransition` if the record is not pending
/// - `Unauthorized` if the policy refuses `actor`
pub fn transition<P: ReviewPolicy + ?Sized>(
    record: &ToolRecord,
    event: CurationEvent,
    actor: &Address,
    policy: &P,
) -> CurationResult<ToolRecord> {
    if record.status != RecordStatus::Pending {
        return Err(CurationError::InvalidTransition {
            status: record.status.to_string(),
            event: event.to_string(),
        });
    }

    if !policy.may_review(record, actor) {
        return Err(CurationError::Unauthorized {
            actor: actor.to_string(),
            id: record.id.clone(),
        });
    }

    Ok(ToolRecord {
        status: event.target(),
        ..record.clone()
    })
}
