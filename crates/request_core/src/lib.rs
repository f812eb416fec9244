use std::sync::Arc;

use shared::domain::{Method, RecordId};
use shared::error::{HistoryError, SubmitError, ValidationWarning};
use tracing::{debug, warn};

pub mod dispatch;
pub mod format;
pub mod history;
pub mod transport;

pub use dispatch::{Completed, DispatchJob, Dispatcher, Outcome, RequestPhase};
pub use history::{HistoryStore, RequestRecord, StatusLine};
pub use transport::{
    Exchange, HttpTransport, Transport, TransportError, TransportRequest, DEFAULT_TIMEOUT,
};

/// Returned by a successful submit: the new record's id plus any non-fatal
/// findings from header parsing.
#[derive(Debug)]
pub struct Submission {
    pub id: RecordId,
    pub warnings: Vec<ValidationWarning>,
}

/// Live-panel payload for the most-recently-submitted record, with the
/// presentation formatting already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseView {
    pub status_line: String,
    pub elapsed: String,
    pub headers: String,
    pub body: String,
}

/// What one poll pass observed.
#[derive(Debug, Default)]
pub struct PollReport {
    /// At least one completed pair arrived; the history display is stale.
    pub history_changed: bool,
    /// Set only when the completed record is still the latest history entry.
    pub latest_response: Option<ResponseView>,
}

/// Coordinates the history store with the dispatch pipeline. Lives on the
/// presentation context; `submit` and `poll` never block it.
pub struct RequestSession {
    history: HistoryStore,
    dispatcher: Dispatcher,
}

impl RequestSession {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            history: HistoryStore::new(),
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Validates and enqueues one request. The record is appended to history
    /// before dispatch completes; malformed header lines are skipped with a
    /// warning rather than blocking the submission.
    pub fn submit(
        &mut self,
        method: Method,
        url: &str,
        raw_header_text: &str,
        body: &str,
    ) -> Result<Submission, SubmitError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SubmitError::MissingUrl);
        }
        let (headers, warnings) = format::parse_header_lines(raw_header_text);
        for warning in &warnings {
            warn!("submit: {warning}");
        }
        let body = body.trim();

        let id = self
            .history
            .append(method, url.to_string(), headers.clone(), body.to_string());
        self.dispatcher.enqueue(DispatchJob {
            id,
            request: TransportRequest {
                method,
                url: url.to_string(),
                headers,
                body: body.to_string(),
            },
        });
        debug!(record_id = id.0, method = %method, url, "submit: request queued");
        Ok(Submission { id, warnings })
    }

    /// Drains the result publisher without blocking, applies each outcome to
    /// its record, and reports a live-panel update when the completed record
    /// is still the latest entry. Outcomes for deleted records are dropped.
    pub fn poll(&mut self) -> PollReport {
        let mut report = PollReport::default();
        for done in self.dispatcher.drain_completed() {
            report.history_changed = true;
            let elapsed_text = format!("{:.2} s", done.elapsed.as_secs_f64());
            let (status, preview, view) = match &done.outcome {
                Outcome::Success(exchange) => (
                    Some(StatusLine {
                        code: exchange.status,
                        reason: exchange.reason.clone(),
                    }),
                    format::preview_text(&exchange.body),
                    ResponseView {
                        status_line: format!("{} {}", exchange.status, exchange.reason),
                        elapsed: elapsed_text,
                        headers: format::format_headers(&exchange.headers),
                        body: format::format_body(&exchange.body),
                    },
                ),
                Outcome::Failure(err) => (
                    None,
                    err.to_string(),
                    ResponseView {
                        status_line: "Request failed".to_string(),
                        elapsed: elapsed_text,
                        headers: String::new(),
                        body: err.to_string(),
                    },
                ),
            };

            let applied = self
                .history
                .apply_outcome(done.id, status, done.elapsed, preview);
            if applied && self.history.latest_id() == Some(done.id) {
                report.latest_response = Some(view);
            }
        }
        report
    }

    pub fn delete(&mut self, index: usize) -> Result<(), HistoryError> {
        let record = self.history.delete(index)?;
        debug!(record_id = record.id.0, "history: entry deleted");
        Ok(())
    }

    pub fn clear(&mut self) {
        debug!(len = self.history.len(), "history: cleared");
        self.history.clear();
    }

    /// Pipeline phase of a record; completed also covers ids never enqueued.
    pub fn phase(&self, id: RecordId) -> RequestPhase {
        self.dispatcher.phase(id)
    }

    pub fn queued_len(&self) -> usize {
        self.dispatcher.queued_len()
    }

    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }
}

impl Default for RequestSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
