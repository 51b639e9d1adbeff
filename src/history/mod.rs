//! Concession history log.
//!
//! The log is a single JSON array stored as one blob. Every operation
//! downloads the whole array and re-uploads it wholesale (pretty-printed),
//! matching the storage format the rest of the system reads. Entries are
//! treated as append-only, but updates mutate records in place; the match
//! nearest the tail is the authoritative one. There is no locking, so
//! concurrent writers are last-writer-wins on the whole array.

use crate::blob::BlobStore;
use crate::errors::AppError;
use crate::models::HistoryRecord;

/// Fixed blob path of the history log.
pub const HISTORY_LOG_PATH: &str = "RailwayConcession/concessionHistory.json";

/// Outcome of a tail-first mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutateOutcome {
    Updated,
    NotFound,
}

/// History log over the blob store.
#[derive(Clone)]
pub struct HistoryLog {
    blobs: BlobStore,
}

impl HistoryLog {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    /// Load the whole log. A missing blob is an empty log; a blob that does
    /// not parse as a JSON array fails with `MalformedLog`.
    pub async fn load(&self) -> Result<Vec<HistoryRecord>, AppError> {
        let Some(bytes) = self.blobs.get(HISTORY_LOG_PATH).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_slice::<Vec<HistoryRecord>>(&bytes).map_err(|e| {
            AppError::MalformedLog(format!("History log is not a JSON array: {}", e))
        })
    }

    /// Find the most recent record for a certificate number (tail-first scan).
    pub async fn find_latest(&self, certificate_number: &str) -> Result<Option<HistoryRecord>, AppError> {
        let history = self.load().await?;
        Ok(history
            .into_iter()
            .rev()
            .find(|record| record.certificate_number == certificate_number))
    }

    /// Apply a mutation to the most recent record matching the certificate
    /// number. At most one record is mutated per call, always the match
    /// nearest the end of the array. Nothing is uploaded on `NotFound`.
    pub async fn mutate_latest<F>(
        &self,
        certificate_number: &str,
        mutation: F,
    ) -> Result<MutateOutcome, AppError>
    where
        F: FnOnce(&mut HistoryRecord),
    {
        let mut history = self.load().await?;

        let Some(record) = history
            .iter_mut()
            .rev()
            .find(|record| record.certificate_number == certificate_number)
        else {
            return Ok(MutateOutcome::NotFound);
        };

        mutation(record);
        self.store(&history).await?;
        Ok(MutateOutcome::Updated)
    }

    /// Rewrite the certificate number (and pass number) in EVERY matching
    /// entry. Deliberately broader than `mutate_latest`: certificate
    /// correction touches the full lineage of a number, while cancellation
    /// touches only the latest pass.
    pub async fn rewrite_certificate(
        &self,
        old_number: &str,
        new_number: &str,
    ) -> Result<usize, AppError> {
        let mut history = self.load().await?;

        let mut rewritten = 0;
        for record in history.iter_mut() {
            if record.certificate_number == old_number {
                record.certificate_number = new_number.to_string();
                record.pass_num = Some(new_number.to_string());
                rewritten += 1;
            }
        }

        if rewritten > 0 {
            self.store(&history).await?;
        }
        Ok(rewritten)
    }

    /// Append one record to the end of the log.
    pub async fn append(&self, record: HistoryRecord) -> Result<(), AppError> {
        let mut history = self.load().await?;
        history.push(record);
        self.store(&history).await
    }

    async fn store(&self, history: &[HistoryRecord]) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(history)
            .map_err(|e| AppError::Internal(format!("Failed to serialize history log: {}", e)))?;
        self.blobs.put(HISTORY_LOG_PATH, &json).await
    }
}
