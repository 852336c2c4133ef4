// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport seam between the session and whatever intercepts requests.
//!
//! A transport stands in for the network. It is created when a session
//! starts and torn down with [`Transport::restore`] when it stops. In
//! between it asks its filter whether each call should be intercepted,
//! and hands intercepted calls to the callbacks registered with
//! [`Transport::respond_with`].
//!
//! [`FakeTransport`] is the in-memory implementation used by tests.

mod fake;

pub use fake::FakeTransport;

use crate::headers::Headers;
use crate::route::Route;
use crate::time::ClockHandle;
use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Called with each intercepted call; replies through [`InterceptedRequest::respond`]
pub type ReplyCallback = Arc<dyn Fn(&mut InterceptedRequest) + Send + Sync>;

/// Returns true when the call should bypass interception
pub type RequestFilter = Arc<dyn Fn(&Method, &str) -> bool + Send + Sync>;

/// Runs as soon as a call is created, before filtering
pub type CreateHook = Arc<dyn Fn(&InterceptedRequest) + Send + Sync>;

/// Simulated request/response channel
pub trait Transport {
    fn create(clock: ClockHandle) -> Self
    where
        Self: Sized;

    /// Delay between interception and the reply being produced
    fn set_auto_respond_after(&mut self, latency: Duration);

    /// Register a responder; `None` verb matches every verb
    fn respond_with(&mut self, verb: Option<Method>, route: Route, callback: ReplyCallback);

    fn set_filter(&mut self, filter: RequestFilter);

    fn set_on_create(&mut self, hook: CreateHook);

    /// Stop intercepting
    fn restore(&mut self);
}

/// Identifies one call made through a transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a transport did with a call when it was sent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Intercepted; the reply will be available under this id
    Queued(RequestId),
    /// Not intercepted; would have gone to the real network
    Passthrough,
}

impl Dispatch {
    pub fn id(self) -> Option<RequestId> {
        match self {
            Self::Queued(id) => Some(id),
            Self::Passthrough => None,
        }
    }

    pub fn is_passthrough(self) -> bool {
        matches!(self, Self::Passthrough)
    }
}

/// Simulated reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub headers: Headers,
    pub body: Option<String>,
}

impl Reply {
    pub fn new(status: u16, headers: Headers, body: Option<String>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Answer for calls no responder dealt with
    pub fn not_found() -> Self {
        Self::new(404, Headers::new(), Some(String::new()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(self.body_str())
    }
}

/// A call held by the transport while it is being answered
#[derive(Clone, Debug)]
pub struct InterceptedRequest {
    id: RequestId,
    method: Method,
    url: String,
    request_headers: Headers,
    body: Option<String>,
    params: Vec<Option<String>>,
    reply: Option<Reply>,
    ignored_replies: u32,
}

impl InterceptedRequest {
    pub fn new(
        id: RequestId,
        method: Method,
        url: impl Into<String>,
        request_headers: Headers,
        body: Option<String>,
    ) -> Self {
        Self {
            id,
            method,
            url: url.into(),
            request_headers,
            body,
            params: Vec::new(),
            reply: None,
            ignored_replies: 0,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Regex capture groups of the route that matched, from group 1
    pub fn params(&self) -> &[Option<String>] {
        &self.params
    }

    /// Set by the transport before the matching responder runs
    pub fn set_params(&mut self, params: Vec<Option<String>>) {
        self.params = params;
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub fn request_headers_mut(&mut self) -> &mut Headers {
        &mut self.request_headers
    }

    /// Record the reply. Only the first reply counts; later ones return false.
    pub fn respond(&mut self, status: u16, headers: Headers, body: Option<String>) -> bool {
        if self.reply.is_some() {
            self.ignored_replies += 1;
            return false;
        }
        self.reply = Some(Reply::new(status, headers, body));
        true
    }

    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    pub fn is_answered(&self) -> bool {
        self.reply.is_some()
    }

    /// Replies dropped because one was already recorded
    pub fn ignored_replies(&self) -> u32 {
        self.ignored_replies
    }

    pub(crate) fn take_reply(&mut self) -> Option<Reply> {
        self.reply.take()
    }
}
