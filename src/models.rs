// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::ops::RangeInclusive;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::curation::RecordStatus;
use crate::error::{CurationError, CurationResult};
use crate::shielding::Blob;

/// Categories a tool may be filed under.
pub const CATEGORIES: [&str; 5] = [
    "Assessment",
    "Communication",
    "Grading",
    "Analytics",
    "Other",
];

/// Filter value meaning "any category".
pub const ALL_CATEGORIES: &str = "All";

/// Accepted rating values.
pub const RATING_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Largest accepted usage count.
pub const MAX_USAGE: f64 = u32::MAX as f64;

/// One curated submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub shielded_rating: Blob,
    pub shielded_usage: Blob,
    /// Hex address of the submitting wallet.
    pub submitter: String,
    /// Unix seconds.
    pub created_at: i64,
    pub status: RecordStatus,
}

impl ToolRecord {
    /// The blob backing a shielded field.
    pub fn shielded(&self, field: ShieldedField) -> &Blob {
        match field {
            ShieldedField::Rating => &self.shielded_rating,
            ShieldedField::Usage => &self.shielded_usage,
        }
    }

    /// Whether `actor` submitted this record (hex compared case-insensitively).
    pub fn is_submitted_by(&self, actor: &Address) -> bool {
        self.submitter.eq_ignore_ascii_case(&actor.to_string())
    }
}

/// Input for a new submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub description: String,
    pub rating: f64,
    pub usage: f64,
    pub category: String,
}

impl NewRecord {
    /// Check required fields and numeric ranges.
    pub fn validate(&self) -> CurationResult<()> {
        if self.name.trim().is_empty() {
            return Err(CurationError::Validation("name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(CurationError::Validation(
                "description is required".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(CurationError::Validation("category is required".to_string()));
        }
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(CurationError::Validation(format!(
                "unknown category '{}' (expected one of {})",
                self.category,
                CATEGORIES.join(", ")
            )));
        }
        if !self.rating.is_finite() || !RATING_RANGE.contains(&self.rating) {
            return Err(CurationError::Validation(format!(
                "rating must be between {} and {}",
                RATING_RANGE.start(),
                RATING_RANGE.end()
            )));
        }
        if !self.usage.is_finite() || self.usage < 0.0 || self.usage > MAX_USAGE {
            return Err(CurationError::Validation(format!(
                "usage must be between 0 and {MAX_USAGE}"
            )));
        }
        Ok(())
    }
}

/// Shielded numeric fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShieldedField {
    Rating,
    Usage,
}

impl std::fmt::Display for ShieldedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShieldedField::Rating => write!(f, "rating"),
            ShieldedField::Usage => write!(f, "usage"),
        }
    }
}

impl std::str::FromStr for ShieldedField {
    type Err = CurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rating" => Ok(ShieldedField::Rating),
            "usage" => Ok(ShieldedField::Usage),
            other => Err(CurationError::Validation(format!(
                "unknown shielded field '{other}'"
            ))),
        }
    }
}

/// Search and category filter over listed records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    /// Exact category; `None` or `"All"` matches everything.
    pub category: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ToolRecord) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => record.category == category,
        };
        if !category_ok {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = fold(term);
                fold(&record.name).contains(&term) || fold(&record.description).contains(&term)
            }
        }
    }
}

/// Normalize text for case-insensitive matching.
fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Counts shown alongside a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationStats {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
    pub categories: usize,
}

impl CurationStats {
    pub fn from_records(records: &[ToolRecord]) -> Self {
        let count = |status: RecordStatus| records.iter().filter(|r| r.status == status).count();
        Self {
            total: records.len(),
            approved: count(RecordStatus::Approved),
            pending: count(RecordStatus::Pending),
            rejected: count(RecordStatus::Rejected),
            categories: CATEGORIES.len(),
        }
    }
}
