//! Run Ledger: the append-only, attempt-ordered record of a run. Owned
//! exclusively by the run loop; all writes go through it, in order.

use crate::models::{ApplicationRecord, ApplicationStatus};

#[derive(Debug, Default)]
pub struct RunLedger {
    records: Vec<ApplicationRecord>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its index.
    pub fn push(&mut self, record: ApplicationRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn record_mut(&mut self, index: usize) -> Option<&mut ApplicationRecord> {
        self.records.get_mut(index)
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Success and Verified both count as submitted.
    pub fn submitted_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_submitted()).count()
    }

    pub fn count_with_status(&self, status: ApplicationStatus) -> usize {
        self.records.iter().filter(|r| r.status() == status).count()
    }
}
