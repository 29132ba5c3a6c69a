// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Record repository over a key/value store.
//!
//! Records are stored one JSON document per key; a separate index key holds
//! the JSON array of all record ids. The record id itself is not part of the
//! document, it is carried by the key.

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StoreKeys};
use crate::curation::RecordStatus;
use crate::error::{CurationError, CurationResult};
use crate::models::ToolRecord;
use crate::shielding::Blob;

/// Upper bound on compare-and-swap attempts for one index append.
const MAX_INDEX_CAS_ATTEMPTS: usize = 16;

/// Persisted record document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordDocument {
    name: String,
    description: String,
    rating: Blob,
    usage: Blob,
    category: String,
    submitter: String,
    timestamp: i64,
    #[serde(default)]
    status: RecordStatus,
}

impl RecordDocument {
    fn into_record(self, id: &str) -> ToolRecord {
        ToolRecord {
            id: id.to_string(),
            name: self.name,
            description: self.description,
            category: self.category,
            shielded_rating: self.rating,
            shielded_usage: self.usage,
            submitter: self.submitter,
            created_at: self.timestamp,
            status: self.status,
        }
    }
}

impl From<&ToolRecord> for RecordDocument {
    fn from(record: &ToolRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            rating: record.shielded_rating.clone(),
            usage: record.shielded_usage.clone(),
            category: record.category.clone(),
            submitter: record.submitter.clone(),
            timestamp: record.created_at,
            status: record.status,
        }
    }
}

/// Index contents as read at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    /// Record ids in index order.
    pub ids: Vec<String>,
    /// Exact bytes read, used as the compare-and-swap expectation.
    pub raw: Vec<u8>,
    /// Parse failure, when the stored index was not a JSON array of ids.
    pub corruption: Option<String>,
}

impl IndexSnapshot {
    pub fn is_corrupt(&self) -> bool {
        self.corruption.is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// The corruption as a typed warning.
    pub fn warning(&self) -> Option<CurationError> {
        self.corruption
            .as_ref()
            .map(|reason| CurationError::CorruptIndex(reason.clone()))
    }

    fn parse(raw: Vec<u8>) -> Self {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Self {
                ids: Vec::new(),
                raw,
                corruption: None,
            };
        }

        match serde_json::from_slice::<Vec<String>>(&raw) {
            Ok(ids) => {
                let mut unique: Vec<String> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                Self {
                    ids: unique,
                    raw,
                    corruption: None,
                }
            }
            Err(e) => Self {
                ids: Vec::new(),
                raw,
                corruption: Some(e.to_string()),
            },
        }
    }
}

/// Repository for record operations on a key/value store.
pub struct RecordRepository<'a, S> {
    store: &'a S,
    keys: &'a StoreKeys,
}

impl<'a, S: KeyValueStore> RecordRepository<'a, S> {
    /// Create a new RecordRepository.
    pub fn new(store: &'a S, keys: &'a StoreKeys) -> Self {
        Self { store, keys }
    }

    /// Fail with `StoreUnavailable` unless the backend reports ready.
    pub async fn ensure_available(&self) -> CurationResult<()> {
        if self.store.is_available().await? {
            Ok(())
        } else {
            Err(CurationError::StoreUnavailable)
        }
    }

    /// Read the index.
    ///
    /// A never-written index reads as empty. A corrupt index also reads as
    /// empty but is logged and flagged in the snapshot.
    pub async fn read_index(&self) -> CurationResult<IndexSnapshot> {
        self.ensure_available().await?;

        let raw = self.store.get_data(&self.keys.index_key()).await?;
        let snapshot = IndexSnapshot::parse(raw);
        if let Some(reason) = &snapshot.corruption {
            tracing::warn!(
                key = %self.keys.index_key(),
                error = %reason,
                code = "corrupt_index",
                "Record index is corrupt, treating as empty"
            );
        }
        Ok(snapshot)
    }

    /// Whether anything is stored under the record key for `id`.
    pub async fn exists(&self, id: &str) -> CurationResult<bool> {
        let raw = self.store.get_data(&self.keys.record_key(id)).await?;
        Ok(!raw.is_empty())
    }

    /// Get a record by ID.
    pub async fn get(&self, id: &str) -> CurationResult<ToolRecord> {
        Ok(self.get_with_raw(id).await?.0)
    }

    /// Get a record together with the exact bytes it was decoded from,
    /// for use as a [`Self::replace`] expectation.
    pub async fn get_with_raw(&self, id: &str) -> CurationResult<(ToolRecord, Vec<u8>)> {
        let raw = self.store.get_data(&self.keys.record_key(id)).await?;
        if raw.is_empty() {
            return Err(CurationError::NotFound(id.to_string()));
        }

        let document: RecordDocument =
            serde_json::from_slice(&raw).map_err(|e| CurationError::CorruptRecord {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok((document.into_record(id), raw))
    }

    /// Write a record, replacing whatever is stored under its id.
    pub async fn put(&self, record: &ToolRecord) -> CurationResult<()> {
        let bytes = self.encode_record(record)?;
        self.store
            .set_data(&self.keys.record_key(&record.id), &bytes)
            .await?;
        Ok(())
    }

    /// Write a record only if its stored bytes are still `expected`.
    ///
    /// Returns `Ok(false)` when another writer got there first. Requires a
    /// backend with compare-and-swap.
    pub async fn replace(&self, record: &ToolRecord, expected: &[u8]) -> CurationResult<bool> {
        let bytes = self.encode_record(record)?;
        let swapped = self
            .store
            .compare_and_swap(&self.keys.record_key(&record.id), expected, &bytes)
            .await?;
        Ok(swapped)
    }

    fn encode_record(&self, record: &ToolRecord) -> CurationResult<Vec<u8>> {
        if !self.keys.is_valid_id(&record.id) {
            return Err(CurationError::Validation(format!(
                "invalid record id '{}'",
                record.id
            )));
        }

        serde_json::to_vec(&RecordDocument::from(record)).map_err(|e| CurationError::CorruptRecord {
            id: record.id.clone(),
            reason: e.to_string(),
        })
    }

    /// Add `id` to the index (read-modify-write).
    pub async fn append_to_index(&self, id: &str) -> CurationResult<()> {
        let snapshot = self.read_index().await?;
        self.append_after(id, snapshot).await
    }

    /// Add `id` to the index, starting from an index read earlier.
    ///
    /// With compare-and-swap the write only lands if the index is still
    /// `snapshot`; on conflict the index is re-read and the append retried.
    /// Without it the write is unconditional and can drop ids appended by
    /// concurrent writers since `snapshot` was taken.
    ///
    /// # Errors
    /// Returns `CorruptIndex` rather than overwriting an unreadable index.
    pub async fn append_after(&self, id: &str, snapshot: IndexSnapshot) -> CurationResult<()> {
        let index_key = self.keys.index_key();

        if !self.store.supports_compare_and_swap() {
            if let Some(err) = snapshot.warning() {
                return Err(err);
            }
            if snapshot.contains(id) {
                return Ok(());
            }

            tracing::warn!(
                record_id = %id,
                store = %self.store.address(),
                "Index append is not atomic on this backend; concurrent submissions can drop ids"
            );
            let mut ids = snapshot.ids;
            ids.push(id.to_string());
            self.store
                .set_data(&index_key, &encode_index(&ids)?)
                .await?;
            return Ok(());
        }

        let mut snapshot = snapshot;
        for attempt in 1..=MAX_INDEX_CAS_ATTEMPTS {
            if let Some(err) = snapshot.warning() {
                return Err(err);
            }
            if snapshot.contains(id) {
                return Ok(());
            }

            let mut ids = snapshot.ids.clone();
            ids.push(id.to_string());
            let updated = encode_index(&ids)?;

            if self
                .store
                .compare_and_swap(&index_key, &snapshot.raw, &updated)
                .await?
            {
                return Ok(());
            }

            tracing::debug!(record_id = %id, attempt, "Index changed underneath append, retrying");
            snapshot = self.read_index().await?;
        }

        Err(CurationError::Store(format!(
            "index append for {id} lost {MAX_INDEX_CAS_ATTEMPTS} compare-and-swap races"
        )))
    }
}

fn encode_index(ids: &[String]) -> CurationResult<Vec<u8>> {
    serde_json::to_vec(ids).map_err(|e| CurationError::CorruptIndex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn test_record(id: &str) -> ToolRecord {
        ToolRecord {
            id: id.to_string(),
            name: "Quiz Builder".to_string(),
            description: "Adaptive quizzes".to_string(),
            category: "Assessment".to_string(),
            shielded_rating: Blob::new("FHE-NA=="),
            shielded_usage: Blob::new("FHE-MTIw"),
            submitter: "0xAbC0000000000000000000000000000000000001".to_string(),
            created_at: 1_700_000_000,
            status: RecordStatus::Pending,
        }
    }

    #[tokio::test]
    async fn put_and_get_record() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        let repo = RecordRepository::new(&store, &keys);

        let record = test_record("tool-1-abcd");
        repo.put(&record).await.unwrap();

        assert_eq!(repo.get("tool-1-abcd").await.unwrap(), record);
        assert!(repo.exists("tool-1-abcd").await.unwrap());
    }

    #[tokio::test]
    async fn stored_document_uses_legacy_schema() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        let repo = RecordRepository::new(&store, &keys);

        repo.put(&test_record("tool-1-abcd")).await.unwrap();

        let raw = store.raw("tool_tool-1-abcd").await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["rating"], "FHE-NA==");
        assert_eq!(json["usage"], "FHE-MTIw");
        assert_eq!(json["timestamp"], 1_700_000_000);
        assert_eq!(json["status"], "pending");
        assert!(json.get("id").is_none());
    }

    #[tokio::test]
    async fn missing_status_defaults_to_pending() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        store
            .seed(
                "tool_old",
                r#"{"name":"n","description":"d","rating":"FHE-NA==","usage":"FHE-MQ==","category":"Other","submitter":"0x1","timestamp":5}"#,
            )
            .await;

        let record = RecordRepository::new(&store, &keys).get("old").await.unwrap();
        assert_eq!(record.status, RecordStatus::Pending);
        assert_eq!(record.created_at, 5);
    }

    #[tokio::test]
    async fn get_distinguishes_missing_and_corrupt() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        store.seed("tool_broken", "{not json").await;
        let repo = RecordRepository::new(&store, &keys);

        assert!(matches!(repo.get("nope").await, Err(CurationError::NotFound(_))));
        assert!(matches!(
            repo.get("broken").await,
            Err(CurationError::CorruptRecord { .. })
        ));
    }

    #[tokio::test]
    async fn unwritten_index_is_empty() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        let snapshot = RecordRepository::new(&store, &keys).read_index().await.unwrap();
        assert!(snapshot.ids.is_empty());
        assert!(!snapshot.is_corrupt());
    }

    #[tokio::test]
    async fn corrupt_index_reads_as_empty_with_warning() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        store.seed("tool_keys", "[\"a\",").await;

        let snapshot = RecordRepository::new(&store, &keys).read_index().await.unwrap();
        assert!(snapshot.ids.is_empty());
        assert!(matches!(snapshot.warning(), Some(CurationError::CorruptIndex(_))));
    }

    #[tokio::test]
    async fn append_refuses_to_overwrite_corrupt_index() {
        let store = MemoryStore::non_atomic("0xstore");
        let keys = StoreKeys::default();
        store.seed("tool_keys", "{\"oops\":1}").await;

        let result = RecordRepository::new(&store, &keys).append_to_index("b").await;
        assert!(matches!(result, Err(CurationError::CorruptIndex(_))));
        assert_eq!(store.raw("tool_keys").await.unwrap(), b"{\"oops\":1}");
    }

    #[tokio::test]
    async fn unavailable_store_fails_index_read() {
        let store = MemoryStore::new("0xstore");
        store.set_available(false);
        let keys = StoreKeys::default();

        let result = RecordRepository::new(&store, &keys).read_index().await;
        assert!(matches!(result, Err(CurationError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn append_is_idempotent_and_ordered() {
        for store in [MemoryStore::new("0xstore"), MemoryStore::non_atomic("0xstore")] {
            let keys = StoreKeys::default();
            let repo = RecordRepository::new(&store, &keys);

            repo.append_to_index("a").await.unwrap();
            repo.append_to_index("b").await.unwrap();
            repo.append_to_index("a").await.unwrap();

            assert_eq!(repo.read_index().await.unwrap().ids, vec!["a", "b"]);
            assert_eq!(store.raw("tool_keys").await.unwrap(), br#"["a","b"]"#);
        }
    }

    #[tokio::test]
    async fn stale_snapshot_is_retried_with_compare_and_swap() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        let repo = RecordRepository::new(&store, &keys);

        let stale = repo.read_index().await.unwrap();
        repo.append_to_index("first").await.unwrap();
        repo.append_after("second", stale).await.unwrap();

        assert_eq!(repo.read_index().await.unwrap().ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn stale_snapshot_loses_ids_without_compare_and_swap() {
        let store = MemoryStore::non_atomic("0xstore");
        let keys = StoreKeys::default();
        let repo = RecordRepository::new(&store, &keys);

        let stale = repo.read_index().await.unwrap();
        repo.append_to_index("first").await.unwrap();
        repo.append_after("second", stale).await.unwrap();

        assert_eq!(repo.read_index().await.unwrap().ids, vec!["second"]);
    }

    #[tokio::test]
    async fn replace_only_lands_on_unchanged_record() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        let repo = RecordRepository::new(&store, &keys);
        repo.put(&test_record("tool-1-abcd")).await.unwrap();

        let (record, raw) = repo.get_with_raw("tool-1-abcd").await.unwrap();
        let approved = ToolRecord {
            status: RecordStatus::Approved,
            ..record.clone()
        };
        let rejected = ToolRecord {
            status: RecordStatus::Rejected,
            ..record
        };

        assert!(repo.replace(&approved, &raw).await.unwrap());
        assert!(!repo.replace(&rejected, &raw).await.unwrap());
        assert_eq!(
            repo.get("tool-1-abcd").await.unwrap().status,
            RecordStatus::Approved
        );
    }

    #[tokio::test]
    async fn put_rejects_reserved_ids() {
        let store = MemoryStore::new("0xstore");
        let keys = StoreKeys::default();
        let repo = RecordRepository::new(&store, &keys);

        let result = repo.put(&test_record("keys")).await;
        assert!(matches!(result, Err(CurationError::Validation(_))));
        assert!(store.is_empty().await);
    }
}
