// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Quartz: route-matched fake HTTP responses for unit tests
//!
//! A [`Quartz`] session intercepts outgoing calls on a fake transport and
//! answers the ones that match a registered route with an Express-style
//! handler. Calls that match nothing pass through untouched.
//!
//! ```ignore
//! use quartz::{Method, Options, Quartz};
//!
//! let mut quartz = Quartz::new(Options::default());
//! quartz.get("/users/1", |res| {
//!     res.json(&serde_json::json!({ "id": 1 })).ok();
//! });
//! quartz.start();
//!
//! if let Some(transport) = quartz.transport() {
//!     let dispatch = transport.request(Method::GET, "/users/1");
//!     transport.respond();
//!     let reply = dispatch.id().and_then(|id| transport.reply(id));
//! }
//! ```

/// Re-exported capture types from quartz-capture crate.
pub mod capture {
    pub use quartz_capture::{CapturedExchange, CapturedOutcome, CapturedRequest, ExchangeLog};
}
pub mod config;
pub mod error;
pub mod headers;
pub mod logger;
pub mod query;
pub mod response;
pub mod route;
pub mod session;
pub mod time;
pub mod transport;

pub use config::{Options, QuartzConfig};
pub use error::QuartzError;
pub use headers::Headers;
pub use http::Method;
pub use logger::{CollectingSink, Level, LogSink, Logger, TracingSink};
pub use query::QueryMap;
pub use response::{Payload, ResponseContext};
pub use route::Route;
pub use session::Quartz;
pub use time::{Clock, ClockHandle, FakeClock};
pub use transport::{FakeTransport, InterceptedRequest, Reply, RequestId, Transport};
