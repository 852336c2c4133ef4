// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exchange log implementation.

use crate::exchange::{CapturedExchange, CapturedOutcome, CapturedRequest};
use parking_lot::Mutex;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Append-only log of exchanges.
///
/// Clones share the same underlying storage, so a transport and the test
/// that drives it can each hold a handle.
pub struct ExchangeLog {
    start: Instant,
    exchanges: Arc<Mutex<Vec<CapturedExchange>>>,
    file_writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl ExchangeLog {
    /// Create a new in-memory exchange log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            exchanges: Arc::new(Mutex::new(Vec::new())),
            file_writer: None,
        }
    }

    /// Create an exchange log that also appends each record to a JSONL file
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            start: Instant::now(),
            exchanges: Arc::new(Mutex::new(Vec::new())),
            file_writer: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
        })
    }

    /// Record an exchange and return its sequence number
    pub fn record(&self, request: CapturedRequest, outcome: CapturedOutcome) -> u64 {
        let mut exchanges = self.exchanges.lock();
        let seq = exchanges.len() as u64;
        let exchange = CapturedExchange {
            seq,
            timestamp: SystemTime::now(),
            elapsed: self.start.elapsed(),
            request,
            outcome,
        };

        if let Some(ref writer) = self.file_writer {
            use std::io::Write;
            let mut w = writer.lock();
            if let Ok(json) = serde_json::to_string(&exchange) {
                let _ = writeln!(w, "{}", json);
                let _ = w.flush();
            }
        }

        exchanges.push(exchange);
        seq
    }

    /// Get all captured exchanges
    pub fn exchanges(&self) -> Vec<CapturedExchange> {
        self.exchanges.lock().clone()
    }

    /// Get the last N exchanges, oldest first
    pub fn last(&self, n: usize) -> Vec<CapturedExchange> {
        let all = self.exchanges.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Count exchanges matching a predicate
    pub fn count<F: Fn(&CapturedExchange) -> bool>(&self, pred: F) -> usize {
        self.exchanges.lock().iter().filter(|e| pred(e)).count()
    }

    /// Find exchanges whose URL contains `pattern`
    pub fn find_by_url(&self, pattern: &str) -> Vec<CapturedExchange> {
        self.find(|e| e.request.url.contains(pattern))
    }

    /// Find exchanges answered by a registered handler
    pub fn find_replies(&self) -> Vec<CapturedExchange> {
        self.find(|e| matches!(e.outcome, CapturedOutcome::Replied { .. }))
    }

    /// Find exchanges that were let through untouched
    pub fn find_passthrough(&self) -> Vec<CapturedExchange> {
        self.find(|e| matches!(e.outcome, CapturedOutcome::Passthrough))
    }

    /// Find exchanges the transport had to answer itself
    pub fn find_unhandled(&self) -> Vec<CapturedExchange> {
        self.find(|e| matches!(e.outcome, CapturedOutcome::Unhandled { .. }))
    }

    fn find<F: Fn(&CapturedExchange) -> bool>(&self, pred: F) -> Vec<CapturedExchange> {
        self.exchanges
            .lock()
            .iter()
            .filter(|e| pred(e))
            .cloned()
            .collect()
    }

    /// Get the total number of exchanges
    pub fn len(&self) -> usize {
        self.exchanges.lock().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.exchanges.lock().is_empty()
    }

    /// Clear all recorded exchanges
    pub fn clear(&self) {
        self.exchanges.lock().clear();
    }
}

impl Default for ExchangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ExchangeLog {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            exchanges: Arc::clone(&self.exchanges),
            file_writer: self.file_writer.as_ref().map(Arc::clone),
        }
    }
}

impl std::fmt::Debug for ExchangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeLog")
            .field("len", &self.len())
            .field("file", &self.file_writer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
