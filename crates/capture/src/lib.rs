// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exchange capture and recording for test assertions.
//!
//! Every call that reaches a quartz fake transport is recorded here together
//! with what happened to it: a reply, a pass-through, or the transport's
//! fallback answer for calls nobody handled.

mod duration_serde;
mod exchange;
mod log;

pub use exchange::{CapturedExchange, CapturedOutcome, CapturedRequest};
pub use log::ExchangeLog;
