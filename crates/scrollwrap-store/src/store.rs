//! Acceptance record envelope over a [`SessionKv`].

use std::sync::Arc;

use tracing::{debug, info};

use scrollwrap_types::{AcceptanceRecord, DocumentRef};

use crate::session::SessionKv;
use crate::{StoreError, StoreResult};

/// Replaced records kept per document before the oldest is dropped.
const SUPERSEDED_CAP: usize = 8;

/// Reads and writes acceptance records at deterministic, per-document keys.
///
/// One read at mount, one write at commit. Version mismatches and corrupt
/// entries read as absent; the stale entry is left in place (it may match a
/// future mount, and superseded records are never deleted).
pub struct AcceptanceStore {
    kv: Arc<dyn SessionKv>,
}

impl AcceptanceStore {
    pub fn new(kv: Arc<dyn SessionKv>) -> Self {
        Self { kv }
    }

    /// Storage key for a document's current acceptance record.
    pub fn entry_key(document_id: &str) -> String {
        format!("scrollwrap.accept.{document_id}")
    }

    fn superseded_key(document_id: &str) -> String {
        format!("scrollwrap.accept.{document_id}.superseded")
    }

    /// Read the stored record for `document_id`, whatever its version.
    ///
    /// A present-but-unparseable entry is reported as [`StoreError::Corrupt`];
    /// callers that only care about a usable record should prefer
    /// [`load_matching`](Self::load_matching).
    pub async fn load(&self, document_id: &str) -> StoreResult<Option<AcceptanceRecord>> {
        let raw = match self.kv.get(&Self::entry_key(document_id)).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let record: AcceptanceRecord =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Some(record))
    }

    /// Read the stored record and apply version matching.
    ///
    /// Returns `Ok(None)` when nothing is stored, when the stored version
    /// does not match the displayed one, or when the entry is corrupt; only
    /// availability problems surface as errors.
    pub async fn load_matching(
        &self,
        document: &DocumentRef,
    ) -> StoreResult<Option<AcceptanceRecord>> {
        match self.load(&document.id).await {
            Ok(Some(record)) if record.matches_version(&document.version) => Ok(Some(record)),
            Ok(Some(record)) => {
                debug!(
                    document = %document,
                    stored_version = %record.version,
                    "Stored acceptance is for another version; treating as absent"
                );
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(StoreError::Corrupt(reason)) => {
                debug!(
                    document = %document,
                    reason = %reason,
                    "Stored acceptance entry is corrupt; treating as absent"
                );
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /// Persist `record` as the current acceptance for `document_id`.
    ///
    /// An existing record with a different version is appended to the
    /// bounded supersession history before being replaced.
    pub async fn save(&self, document_id: &str, record: &AcceptanceRecord) -> StoreResult<()> {
        if let Ok(Some(existing)) = self.load(document_id).await {
            if existing.version != record.version {
                self.append_superseded(document_id, existing).await?;
                info!(
                    document_id = %document_id,
                    new_version = %record.version,
                    "Superseding stored acceptance for changed document version"
                );
            }
        }

        let raw =
            serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.put(&Self::entry_key(document_id), &raw).await
    }

    /// Replaced records for `document_id`, oldest first.
    pub async fn superseded(&self, document_id: &str) -> StoreResult<Vec<AcceptanceRecord>> {
        let raw = match self.kv.get(&Self::superseded_key(document_id)).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn append_superseded(
        &self,
        document_id: &str,
        record: AcceptanceRecord,
    ) -> StoreResult<()> {
        let mut history = self.superseded(document_id).await.unwrap_or_default();
        history.push(record);
        if history.len() > SUPERSEDED_CAP {
            let excess = history.len() - SUPERSEDED_CAP;
            history.drain(..excess);
        }

        let raw = serde_json::to_string(&history)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.put(&Self::superseded_key(document_id), &raw).await
    }
}
