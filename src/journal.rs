//! Exchange journal.
//!
//! Every request made through an [`EncryptedClient`](crate::EncryptedClient)
//! leaves one [`ExchangeRecord`]: method, URL, status, envelope size and
//! outcome. Key bytes, plaintext and envelope contents are never recorded.
//!
//! The in-memory history is bounded. Once `retention` records are held the
//! oldest is evicted; callers that need the full history attach an
//! [`ExchangeSink`] or [`Journal::drain`] periodically.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetch::Method;

/// Records kept in memory by [`Journal::new`].
pub const DEFAULT_RETENTION: usize = 1024;

/// Destination for exchange records outside the in-memory window.
pub trait ExchangeSink: Send {
    /// Receives each record as soon as the client has finished the request.
    fn append(&mut self, record: ExchangeRecord);
}

/// How a client request ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// Response body sealed into an envelope.
    Sealed,
    /// Request refused or failed; the reason is the error's display text.
    Failed(String),
}

/// One client request, as seen from the outside of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub method: Method,
    pub url: String,
    /// HTTP status, if a response arrived.
    pub status: Option<u16>,
    /// Envelope size in bytes, if one was produced.
    pub envelope_len: Option<usize>,
    pub outcome: ExchangeOutcome,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of exchanges plus the sinks that mirror it.
pub struct Journal {
    records: VecDeque<ExchangeRecord>,
    retention: usize,
    sinks: Vec<Box<dyn ExchangeSink>>,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("records", &self.records.len())
            .field("retention", &self.retention)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retention` records in memory. Zero keeps none; sinks
    /// still see every record.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            records: VecDeque::new(),
            retention,
            sinks: Vec::new(),
        }
    }

    /// Mirror every future record into `sink`.
    pub fn add_forward_sink(&mut self, sink: Box<dyn ExchangeSink>) {
        self.sinks.push(sink);
    }

    /// Hand `record` to the sinks, then keep it, evicting the oldest entry
    /// when the window is full.
    pub fn append(&mut self, record: ExchangeRecord) {
        for sink in self.sinks.iter_mut() {
            sink.append(record.clone());
        }
        if self.retention == 0 {
            return;
        }
        while self.records.len() >= self.retention {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Take every retained record, oldest first, leaving the window empty.
    pub fn drain(&mut self) -> Vec<ExchangeRecord> {
        self.records.drain(..).collect()
    }

    /// Forget the retained records. Sinks are unaffected.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, ExchangeRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&ExchangeRecord> {
        self.records.back()
    }
}

/// JSON-lines file sink: one serialised record per line, appended.
pub struct FileExchangeSink {
    file: File,
}

impl FileExchangeSink {
    /// Open `path` for appending, creating it if missing.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl ExchangeSink for FileExchangeSink {
    fn append(&mut self, record: ExchangeRecord) {
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "could not serialise exchange record");
                return;
            }
        };
        if let Err(err) = writeln!(self.file, "{line}").and_then(|_| self.file.flush()) {
            tracing::warn!(error = %err, "could not write exchange record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: ExchangeOutcome) -> ExchangeRecord {
        ExchangeRecord {
            method: Method::Get,
            url: "https://example.test".into(),
            status: Some(200),
            envelope_len: Some(48),
            outcome,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut journal = Journal::new();
        assert!(journal.is_empty());
        assert_eq!(journal.retention(), DEFAULT_RETENTION);

        journal.append(record(ExchangeOutcome::Sealed));
        journal.append(record(ExchangeOutcome::Failed("unreachable".into())));

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.iter().next().unwrap().outcome, ExchangeOutcome::Sealed);
        assert_eq!(
            journal.last().unwrap().outcome,
            ExchangeOutcome::Failed("unreachable".into())
        );
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let mut journal = Journal::with_retention(2);
        journal.append(record(ExchangeOutcome::Failed("first".into())));
        journal.append(record(ExchangeOutcome::Failed("second".into())));
        journal.append(record(ExchangeOutcome::Sealed));

        assert_eq!(journal.len(), 2);
        assert_eq!(
            journal.iter().next().unwrap().outcome,
            ExchangeOutcome::Failed("second".into())
        );
        assert_eq!(journal.last().unwrap().outcome, ExchangeOutcome::Sealed);
    }

    #[test]
    fn test_zero_retention_keeps_nothing() {
        let mut journal = Journal::with_retention(0);
        journal.append(record(ExchangeOutcome::Sealed));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_drain_and_clear_empty_the_window() {
        let mut journal = Journal::new();
        journal.append(record(ExchangeOutcome::Sealed));
        journal.append(record(ExchangeOutcome::Failed("x".into())));

        let drained = journal.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].outcome, ExchangeOutcome::Sealed);
        assert!(journal.is_empty());

        journal.append(record(ExchangeOutcome::Sealed));
        journal.clear();
        assert!(journal.is_empty());
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(ExchangeOutcome::Failed("decryption failed".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "failed", "reason": "decryption failed"}));

        let json = serde_json::to_value(ExchangeOutcome::Sealed).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "sealed"}));
    }
}
