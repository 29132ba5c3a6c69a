// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Review authorization policies.
//!
//! The state machine asks a [`ReviewPolicy`] whether an actor may approve or
//! reject a record, so moderation rules can change without touching the
//! transition logic.

use std::collections::HashSet;

use alloy::primitives::Address;

use crate::models::ToolRecord;

/// Decides whether `actor` may review `record`.
pub trait ReviewPolicy: Send + Sync {
    fn may_review(&self, record: &ToolRecord, actor: &Address) -> bool;
}

/// Only the original submitter may review their own record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitterReview;

impl ReviewPolicy for SubmitterReview {
    fn may_review(&self, record: &ToolRecord, actor: &Address) -> bool {
        record.is_submitted_by(actor)
    }
}

/// A fixed set of moderator addresses may review any record.
#[derive(Debug, Clone, Default)]
pub struct ReviewerSet {
    reviewers: HashSet<Address>,
    allow_self_review: bool,
}

impl ReviewerSet {
    pub fn new(reviewers: impl IntoIterator<Item = Address>) -> Self {
        Self {
            reviewers: reviewers.into_iter().collect(),
            allow_self_review: false,
        }
    }

    /// Also let submitters review their own records.
    pub fn with_self_review(mut self) -> Self {
        self.allow_self_review = true;
        self
    }

    pub fn contains(&self, actor: &Address) -> bool {
        self.reviewers.contains(actor)
    }
}

impl ReviewPolicy for ReviewerSet {
    fn may_review(&self, record: &ToolRecord, actor: &Address) -> bool {
        self.contains(actor) || (self.allow_self_review && record.is_submitted_by(actor))
    }
}

impl<F> ReviewPolicy for F
where
    F: Fn(&ToolRecord, &Address) -> bool + Send + Sync,
{
    fn may_review(&self, record: &ToolRecord, actor: &Address) -> bool {
        self(record, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::RecordStatus;
    use crate::shielding::Blob;

    fn record_by(submitter: Address) -> ToolRecord {
        ToolRecord {
            id: "tool-1-abcd".to_string(),
            name: "n".to_string(),
            description: "d".to_string(),
            category: "Other".to_string(),
            shielded_rating: Blob::new("x"),
            shielded_usage: Blob::new("y"),
            submitter: submitter.to_string().to_lowercase(),
            created_at: 0,
            status: RecordStatus::Pending,
        }
    }

    #[test]
    fn submitter_review_matches_lowercased_addresses() {
        let submitter = Address::repeat_byte(0xab);
        let record = record_by(submitter);
        assert!(SubmitterReview.may_review(&record, &submitter));
        assert!(!SubmitterReview.may_review(&record, &Address::repeat_byte(0x01)));
    }

    #[test]
    fn reviewer_set_excludes_submitter_unless_enabled() {
        let submitter = Address::repeat_byte(0xab);
        let moderator = Address::repeat_byte(0x01);
        let record = record_by(submitter);

        let strict = ReviewerSet::new([moderator]);
        assert!(strict.may_review(&record, &moderator));
        assert!(!strict.may_review(&record, &submitter));

        let relaxed = ReviewerSet::new([moderator]).with_self_review();
        assert!(relaxed.may_review(&record, &submitter));
    }

    #[test]
    fn closures_are_policies() {
        let nobody = |_: &ToolRecord, _: &Address| false;
        let record = record_by(Address::repeat_byte(0xab));
        assert!(!nobody.may_review(&record, &Address::repeat_byte(0xab)));
    }
}
