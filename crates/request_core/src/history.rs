//! Ordered in-memory log of submitted requests and their outcomes.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use shared::domain::{Method, RecordId};
use shared::error::HistoryError;

/// Reason phrase paired with the numeric status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub code: u16,
    pub reason: String,
}

/// One submitted request attempt. Outcome fields start unset and are written
/// exactly once, when the poll applies the completed exchange.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub id: RecordId,
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub submitted_at: DateTime<Local>,
    pub status: Option<StatusLine>,
    pub elapsed: Option<Duration>,
    pub preview: String,
}

impl RequestRecord {
    /// One-line history caption: `GET https://host/path (200, 132 ms)`.
    pub fn display_label(&self) -> String {
        let status = self
            .status
            .as_ref()
            .map(|line| line.code.to_string())
            .unwrap_or_else(|| "...".to_string());
        let duration = self
            .elapsed
            .map(|elapsed| format!("{:.0} ms", elapsed.as_secs_f64() * 1000.0))
            .unwrap_or_else(|| "pending".to_string());
        format!("{} {} ({status}, {duration})", self.method, self.url)
    }
}

/// Append-only submission log; entries leave only through delete/clear.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Vec<RequestRecord>,
    next_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a fresh record and hands back its id. Never fails.
    pub fn append(
        &mut self,
        method: Method,
        url: String,
        headers: HashMap<String, String>,
        body: String,
    ) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(RequestRecord {
            id,
            method,
            url,
            headers,
            body,
            submitted_at: Local::now(),
            status: None,
            elapsed: None,
            preview: String::new(),
        });
        id
    }

    pub fn get(&self, index: usize) -> Result<&RequestRecord, HistoryError> {
        self.records.get(index).ok_or(HistoryError::OutOfRange {
            index,
            len: self.records.len(),
        })
    }

    pub fn delete(&mut self, index: usize) -> Result<RequestRecord, HistoryError> {
        if index >= self.records.len() {
            return Err(HistoryError::OutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Read-only oldest-first view; reversing for display is the caller's job.
    pub fn snapshot(&self) -> &[RequestRecord] {
        &self.records
    }

    /// Only the record returned here may drive the live response panel.
    pub fn latest_id(&self) -> Option<RecordId> {
        self.records.last().map(|record| record.id)
    }

    /// Writes the outcome fields of the record with `id`. Returns false when
    /// the record was deleted before its outcome arrived.
    pub(crate) fn apply_outcome(
        &mut self,
        id: RecordId,
        status: Option<StatusLine>,
        elapsed: Duration,
        preview: String,
    ) -> bool {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.status = status;
                record.elapsed = Some(elapsed);
                record.preview = preview;
                true
            }
            None => false,
        }
    }
}
