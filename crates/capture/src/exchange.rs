// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Captured exchange data types.

use crate::duration_serde;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One call seen by a fake transport, and what became of it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedExchange {
    /// Sequence number
    pub seq: u64,

    /// Wall-clock timestamp
    pub timestamp: SystemTime,

    /// Elapsed time since capture started
    #[serde(rename = "elapsed_us", with = "duration_serde")]
    pub elapsed: Duration,

    /// The intercepted request
    pub request: CapturedRequest,

    /// Reply, pass-through or fallback
    pub outcome: CapturedOutcome,
}

/// Request as the transport received it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    /// Header pairs in insertion order, names as sent
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
}

impl CapturedRequest {
    /// Build a request record without headers or body
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Captured outcome of an exchange
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapturedOutcome {
    /// A registered handler produced a reply
    Replied {
        status: u16,
        headers: Vec<(String, String)>,
        body: Option<String>,
    },
    /// No route was registered, so the call was left alone
    Passthrough,
    /// The call was intercepted but nothing replied; the transport answered itself
    Unhandled { status: u16 },
}

impl CapturedOutcome {
    /// Status code sent back, if the call was answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Replied { status, .. } | Self::Unhandled { status } => Some(*status),
            Self::Passthrough => None,
        }
    }
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
