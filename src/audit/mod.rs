//! Audit trail for coaching runs
//!
//! Every analysis is recorded with hashes of its input snapshot and its
//! output, so a run can be compared against a replay of the same history.
//! The log is bounded; the oldest records are evicted first.

use crate::models::{CoachingReport, Transaction};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingRecord {
    pub audit_id: Uuid,
    pub user_id: Uuid,
    pub snapshot_hash: String,
    pub output_hash: String,
    pub transaction_count: usize,
    pub report: CoachingReport,
    pub created_at: DateTime<Utc>,
}

impl CoachingRecord {
    pub fn new(user_id: Uuid, transactions: &[Transaction], report: CoachingReport) -> Self {
        Self {
            audit_id: Uuid::new_v4(),
            user_id,
            snapshot_hash: compute_hash(transactions),
            output_hash: compute_hash(&report),
            transaction_count: transactions.len(),
            report,
            created_at: Utc::now(),
        }
    }
}

/// Records kept before the oldest are evicted
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

#[derive(Default)]
struct Records {
    by_id: HashMap<Uuid, CoachingRecord>,
    order: VecDeque<Uuid>,
}

/// Audit trail storage
pub struct AuditLog {
    records: Arc<RwLock<Records>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
            capacity: capacity.max(1),
        }
    }

    /// Store a coaching record, evicting the oldest when full
    pub async fn record(&self, record: CoachingRecord) -> Result<Uuid> {
        let audit_id = record.audit_id;
        let mut records = self.records.write().await;

        if records.by_id.insert(audit_id, record).is_none() {
            records.order.push_back(audit_id);
        }

        while records.order.len() > self.capacity {
            if let Some(oldest) = records.order.pop_front() {
                records.by_id.remove(&oldest);
                debug!(audit_id = %oldest, "Evicted audit record");
            }
        }

        Ok(audit_id)
    }

    /// Retrieve a record by audit ID
    pub async fn get(&self, audit_id: Uuid) -> Result<Option<CoachingRecord>> {
        let records = self.records.read().await;
        Ok(records.by_id.get(&audit_id).cloned())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// List all audit IDs for a user (sorted by created_at)
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let records = self.records.read().await;

        let mut items: Vec<_> = records
            .by_id
            .iter()
            .filter(|(_, record)| record.user_id == user_id)
            .map(|(id, record)| (*id, record.created_at))
            .collect();

        items.sort_by_key(|(_, created_at)| *created_at);

        Ok(items.into_iter().map(|(id, _)| id).collect())
    }

    /// Check that a stored report still matches its output hash
    pub async fn verify_integrity(&self, audit_id: Uuid) -> Result<bool> {
        let records = self.records.read().await;

        Ok(records
            .by_id
            .get(&audit_id)
            .map(|record| compute_hash(&record.report) == record.output_hash)
            .unwrap_or(false))
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of a value's JSON form, streamed into the hasher
pub fn compute_hash<T: Serialize + ?Sized>(value: &T) -> String {
    let mut hasher = Sha256::new();

    if serde_json::to_writer(&mut HashWriter(&mut hasher), value).is_err() {
        return String::new();
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
