// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Curation Workflow
//!
//! [`Curator`] composes the record repository, the shielding scheme, the
//! disclosure protocol and the curation state machine into the operations a
//! UI drives: list, filter, submit, disclose, approve and reject.
//!
//! Every call is independent. Per-request state (who is acting, the
//! disclosure session) is passed in explicitly; the curator itself holds no
//! mutable state besides what lives in the store.

use alloy::primitives::Address;
use chrono::Utc;

use crate::curation::{self, CurationEvent, ReviewPolicy, SubmitterReview};
use crate::disclosure::{DisclosureContext, DisclosureProtocol};
use crate::error::{CurationError, CurationResult};
use crate::identity::Identity;
use crate::models::{CurationStats, NewRecord, RecordFilter, ShieldedField, ToolRecord};
use crate::shielding::ShieldingScheme;
use crate::storage::{KeyValueStore, RecordRepository, StoreKeys};

/// Attempts at finding an unused record id before giving up.
const MAX_ID_ATTEMPTS: usize = 4;

/// Compare-and-swap attempts at writing a reviewed record.
const MAX_REVIEW_ATTEMPTS: usize = 8;

/// Result of loading every indexed record.
#[derive(Debug, Default)]
pub struct Listing {
    /// Readable records, newest first.
    pub records: Vec<ToolRecord>,
    /// Indexed ids that could not be read, with the reason.
    pub skipped: Vec<(String, CurationError)>,
    /// Set when the index itself was unreadable.
    pub index_warning: Option<CurationError>,
}

/// Workflow orchestrator over one store.
pub struct Curator<S, Sh, P = SubmitterReview> {
    store: S,
    scheme: Sh,
    policy: P,
    keys: StoreKeys,
}

impl<S: KeyValueStore, Sh: ShieldingScheme> Curator<S, Sh> {
    /// Curator using the self-review policy and the default key layout.
    pub fn new(store: S, scheme: Sh) -> Self {
        Self {
            store,
            scheme,
            policy: SubmitterReview,
            keys: StoreKeys::default(),
        }
    }
}

impl<S: KeyValueStore, Sh: ShieldingScheme, P: ReviewPolicy> Curator<S, Sh, P> {
    /// Swap the review policy.
    pub fn with_policy<Q: ReviewPolicy>(self, policy: Q) -> Curator<S, Sh, Q> {
        Curator {
            store: self.store,
            scheme: self.scheme,
            policy,
            keys: self.keys,
        }
    }

    /// Use a different key prefix.
    pub fn with_keys(mut self, keys: StoreKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheme(&self) -> &Sh {
        &self.scheme
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    fn records(&self) -> RecordRepository<'_, S> {
        RecordRepository::new(&self.store, &self.keys)
    }

    /// All readable records, newest first.
    ///
    /// Unreadable entries are skipped and logged; see [`Self::load_listing`].
    pub async fn list_records(&self) -> CurationResult<Vec<ToolRecord>> {
        Ok(self.load_listing().await?.records)
    }

    /// Load every indexed record, keeping track of what was skipped.
    ///
    /// # Errors
    /// Fails only when the store is unavailable or the index read fails.
    pub async fn load_listing(&self) -> CurationResult<Listing> {
        let repo = self.records();
        let index = repo.read_index().await?;

        let mut listing = Listing {
            index_warning: index.warning(),
            ..Listing::default()
        };

        for id in &index.ids {
            match repo.get(id).await {
                Ok(record) => listing.records.push(record),
                Err(CurationError::StoreUnavailable) => return Err(CurationError::StoreUnavailable),
                Err(e) => {
                    tracing::warn!(
                        record_id = %id,
                        error = %e,
                        code = e.error_code(),
                        "Skipping unreadable record"
                    );
                    listing.skipped.push((id.clone(), e));
                }
            }
        }

        listing
            .records
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(
            count = listing.records.len(),
            skipped = listing.skipped.len(),
            "Loaded record listing"
        );
        Ok(listing)
    }

    /// Records matching `filter`, newest first.
    pub async fn list_filtered(&self, filter: &RecordFilter) -> CurationResult<Vec<ToolRecord>> {
        let mut records = self.list_records().await?;
        records.retain(|record| filter.matches(record));
        Ok(records)
    }

    /// Status counts over the current listing.
    pub async fn stats(&self) -> CurationResult<CurationStats> {
        let records = self.list_records().await?;
        Ok(CurationStats::from_records(&records))
    }

    /// Submit a new record and return its id.
    ///
    /// Input is validated and both numeric fields are shielded before
    /// anything is written.
    ///
    /// # Errors
    /// - `Validation` for bad input (nothing written)
    /// - `CorruptIndex` if the index is unreadable (nothing written)
    /// - `StoreUnavailable` / `Store` for backend failures
    pub async fn submit(&self, submitter: &Address, input: &NewRecord) -> CurationResult<String> {
        input.validate()?;

        let shielded_rating = self.scheme.encode(input.rating)?;
        let shielded_usage = self.scheme.encode(input.usage)?;

        let repo = self.records();
        repo.ensure_available().await?;
        let id = self.fresh_id(&repo).await?;

        let index = repo.read_index().await?;
        if let Some(err) = index.warning() {
            return Err(err);
        }

        let record = ToolRecord {
            id: id.clone(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            category: input.category.clone(),
            shielded_rating,
            shielded_usage,
            submitter: submitter.to_string().to_lowercase(),
            created_at: Utc::now().timestamp(),
            status: curation::RecordStatus::Pending,
        };

        repo.put(&record).await?;
        repo.append_after(&id, index).await?;

        tracing::info!(
            record_id = %id,
            submitter = %submitter,
            category = %record.category,
            "Record submitted"
        );
        Ok(id)
    }

    async fn fresh_id(&self, repo: &RecordRepository<'_, S>) -> CurationResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.keys.generate_id();
            if !repo.exists(&id).await? {
                return Ok(id);
            }
            tracing::debug!(record_id = %id, "Generated id already in use, regenerating");
        }
        Err(CurationError::Store(
            "could not allocate an unused record id".to_string(),
        ))
    }

    /// Read one record.
    pub async fn get_record(&self, id: &str) -> CurationResult<ToolRecord> {
        let repo = self.records();
        repo.ensure_available().await?;
        repo.get(id).await
    }

    /// Open a disclosure session bound to this curator's store.
    pub fn open_disclosure(
        &self,
        chain_id: u64,
        duration_days: u32,
    ) -> CurationResult<DisclosureContext> {
        DisclosureContext::open(self.store.address(), chain_id, duration_days)
    }

    /// Reveal one shielded field of a record to `identity`.
    ///
    /// The value is returned to the caller only; nothing is written back.
    pub async fn request_disclosure<I: Identity + ?Sized>(
        &self,
        id: &str,
        field: ShieldedField,
        identity: &I,
        context: &DisclosureContext,
    ) -> CurationResult<f64> {
        let record = self.get_record(id).await?;
        tracing::debug!(record_id = %id, field = %field, "Disclosure requested");

        DisclosureProtocol::new(&self.scheme)
            .disclose(record.shielded(field), identity, context)
            .await
    }

    /// Approve a pending record.
    pub async fn approve(&self, id: &str, actor: &Address) -> CurationResult<ToolRecord> {
        self.apply(id, CurationEvent::Approve, actor).await
    }

    /// Reject a pending record.
    pub async fn reject(&self, id: &str, actor: &Address) -> CurationResult<ToolRecord> {
        self.apply(id, CurationEvent::Reject, actor).await
    }

    /// Read, transition and write back one record.
    ///
    /// With compare-and-swap the write only lands if the record is unchanged
    /// since it was read; otherwise the record is re-read and the transition
    /// re-run, so a review that lost the race fails with `InvalidTransition`.
    pub async fn apply(
        &self,
        id: &str,
        event: CurationEvent,
        actor: &Address,
    ) -> CurationResult<ToolRecord> {
        let repo = self.records();
        repo.ensure_available().await?;

        if !self.store.supports_compare_and_swap() {
            tracing::warn!(
                record_id = %id,
                store = %self.store.address(),
                "Review write is not atomic on this backend; concurrent reviews can overwrite each other"
            );
            let record = repo.get(id).await?;
            let updated = self.review(&record, event, actor)?;
            repo.put(&updated).await?;
            return Ok(self.reviewed(updated, actor));
        }

        for attempt in 1..=MAX_REVIEW_ATTEMPTS {
            let (record, raw) = repo.get_with_raw(id).await?;
            let updated = self.review(&record, event, actor)?;
            if repo.replace(&updated, &raw).await? {
                return Ok(self.reviewed(updated, actor));
            }
            tracing::debug!(record_id = %id, attempt, "Record changed underneath review, retrying");
        }

        Err(CurationError::Store(format!(
            "review of {id} lost {MAX_REVIEW_ATTEMPTS} compare-and-swap races"
        )))
    }

    fn review(
        &self,
        record: &ToolRecord,
        event: CurationEvent,
        actor: &Address,
    ) -> CurationResult<ToolRecord> {
        curation::transition(record, event, actor, &self.policy).inspect_err(|e| {
            tracing::warn!(
                record_id = %record.id,
                actor = %actor,
                event = %event,
                code = e.error_code(),
                "Transition refused"
            );
        })
    }

    fn reviewed(&self, record: ToolRecord, actor: &Address) -> ToolRecord {
        tracing::info!(
            record_id = %record.id,
            actor = %actor,
            status = %record.status,
            "Record reviewed"
        );
        record
    }
}
