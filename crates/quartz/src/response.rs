// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Express-style reply helpers for an intercepted call.
//!
//! A [`ResponseContext`] is built fresh for every intercepted call and handed
//! to the route's handler. Header helpers work on the call's header map, and
//! that same map is sent back with the reply:
//!
//! ```ignore
//! quartz.get("/users/1", |res| {
//!     res.status(404).send(serde_json::json!({ "error": "missing" }));
//! });
//! ```

use crate::error::QuartzError;
use crate::headers::Headers;
use crate::logger::Logger;
use crate::query::QueryMap;
use crate::transport::InterceptedRequest;
use http::Method;
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body handed to [`ResponseContext::send`]
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Empty,
    Text(String),
    /// Serialized and sent as `application/json`
    Json(serde_json::Value),
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Option<String>> for Payload {
    fn from(text: Option<String>) -> Self {
        text.map_or(Self::Empty, Self::Text)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Per-call reply builder passed to route handlers
pub struct ResponseContext<'a> {
    request: &'a mut InterceptedRequest,
    status: Option<u16>,
    default_status: u16,
    query: QueryMap,
    logger: &'a Logger,
}

impl<'a> ResponseContext<'a> {
    pub fn new(
        request: &'a mut InterceptedRequest,
        default_status: u16,
        query: QueryMap,
        logger: &'a Logger,
    ) -> Self {
        Self {
            request,
            status: None,
            default_status,
            query,
            logger,
        }
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn url(&self) -> &str {
        self.request.url()
    }

    /// Request body, if the call carried one
    pub fn body(&self) -> Option<&str> {
        self.request.body()
    }

    /// Query parameters parsed from the URL
    pub fn query(&self) -> &QueryMap {
        &self.query
    }

    /// Capture groups of a regex route, in order from group 1
    pub fn params(&self) -> &[Option<String>] {
        self.request.params()
    }

    /// Capture group `index`, counting from 1 as in the regex
    pub fn param(&self, index: usize) -> Option<&str> {
        let slot = index.checked_sub(1)?;
        self.request.params().get(slot)?.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        self.request.request_headers()
    }

    /// Header value, looked up ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.request.request_headers().get(name)
    }

    /// Set a header, reusing the stored name when one matches ignoring case
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.request_headers_mut().set(name, value);
        self
    }

    /// Set several headers at once
    pub fn set_all<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.request.request_headers_mut().extend(headers);
        self
    }

    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.set("content-type", content_type)
    }

    pub fn status(&mut self, code: u16) -> &mut Self {
        self.status = Some(code);
        self
    }

    /// Status that will be sent: the one set, else the configured default
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(self.default_status)
    }

    /// Serialize `data` and send it as `application/json`
    pub fn json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<&mut Self, QuartzError> {
        let body = serde_json::to_string(data)?;
        Ok(self.content_type(JSON_CONTENT_TYPE).complete(Some(body)))
    }

    /// Send text as-is, nothing for [`Payload::Empty`], or JSON for values
    pub fn send(&mut self, payload: impl Into<Payload>) -> &mut Self {
        match payload.into() {
            Payload::Empty => self.complete(None),
            Payload::Text(text) => self.complete(Some(text)),
            Payload::Json(value) => self
                .content_type(JSON_CONTENT_TYPE)
                .complete(Some(value.to_string())),
        }
    }

    /// Send with no body
    pub fn end(&mut self) -> &mut Self {
        self.send(Payload::Empty)
    }

    /// Whether a reply has already been handed to the transport
    pub fn is_sent(&self) -> bool {
        self.request.is_answered()
    }

    fn complete(&mut self, body: Option<String>) -> &mut Self {
        let status = self.status_code();
        let headers = self.request.request_headers().clone();
        let accepted = self.request.respond(status, headers, body);
        if accepted {
            self.logger.log(format_args!(
                "replied {} to {} {}",
                status,
                self.request.method(),
                self.request.url()
            ));
        } else {
            self.logger.warn(format_args!(
                "{} {} already replied; dropping {}",
                self.request.method(),
                self.request.url(),
                status
            ));
        }
        self
    }
}

impl std::fmt::Debug for ResponseContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseContext")
            .field("method", self.request.method())
            .field("url", &self.request.url())
            .field("status", &self.status_code())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
