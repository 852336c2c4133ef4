// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session options and TOML/JSON config files.
//!
//! [`Options`] is what a session is built from; it can carry closures
//! (query parser override, on-create hook, log sink). [`QuartzConfig`] is
//! the serializable subset plus a list of canned route fixtures, loaded
//! from a file:
//!
//! ```toml
//! default_status_code = 200
//! latency_ms = 5
//!
//! [[routes]]
//! verb = "get"
//! route = { type = "exact", path = "/health" }
//! body = "ok"
//!
//! [[routes]]
//! route = { type = "regex", pattern = "^/users/\\d+$" }
//! status = 200
//! body = { id = 1, name = "ada" }
//! ```

use crate::error::QuartzError;
use crate::logger::{LogSink, Logger, TracingSink, DEFAULT_PREFIX, DEFAULT_VERBOSITY};
use crate::query::{default_parser, QueryParser};
use crate::response::{Payload, ResponseContext};
use crate::route::{normalize_verb, Handler, Registration, Route};
use crate::time::ClockHandle;
use crate::transport::CreateHook;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Status sent when a handler never calls `status`
pub const DEFAULT_STATUS_CODE: u16 = 200;
/// Delay between interception and reply
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(10);

/// Settings a session is created with
#[derive(Clone)]
pub struct Options {
    pub default_status_code: u16,
    /// Replaces [`QueryMap::from_url`](crate::query::QueryMap::from_url)
    pub parse_querystring: Option<QueryParser>,
    pub latency: Duration,
    /// Runs for every call the transport creates
    pub on_create: Option<CreateHook>,
    /// Logging verbosity, see [`crate::logger`]
    pub debug: i8,
    pub log_prefix: String,
    /// Defaults to [`TracingSink`]
    pub log_sink: Option<Arc<dyn LogSink>>,
    pub clock: ClockHandle,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_status_code: DEFAULT_STATUS_CODE,
            parse_querystring: None,
            latency: DEFAULT_LATENCY,
            on_create: None,
            debug: DEFAULT_VERBOSITY,
            log_prefix: DEFAULT_PREFIX.to_string(),
            log_sink: None,
            clock: ClockHandle::default(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying the scalar settings of a config file
    pub fn from_config(config: &QuartzConfig) -> Self {
        let defaults = Self::default();
        Self {
            default_status_code: config
                .default_status_code
                .unwrap_or(defaults.default_status_code),
            latency: config
                .latency_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.latency),
            debug: config.debug.unwrap_or(defaults.debug),
            log_prefix: config.log_prefix.clone().unwrap_or(defaults.log_prefix),
            ..Self::default()
        }
    }

    pub fn with_default_status_code(mut self, code: u16) -> Self {
        self.default_status_code = code;
        self
    }

    pub fn with_query_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> crate::query::QueryMap + Send + Sync + 'static,
    {
        self.parse_querystring = Some(Arc::new(parser));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_on_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::transport::InterceptedRequest) + Send + Sync + 'static,
    {
        self.on_create = Some(Arc::new(hook));
        self
    }

    pub fn with_debug(mut self, verbosity: i8) -> Self {
        self.debug = verbosity;
        self
    }

    pub fn with_log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = prefix.into();
        self
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn with_clock(mut self, clock: impl Into<ClockHandle>) -> Self {
        self.clock = clock.into();
        self
    }

    /// Configured parser, or the default one
    pub fn query_parser(&self) -> QueryParser {
        self.parse_querystring.clone().unwrap_or_else(default_parser)
    }

    /// Logger built from the verbosity, prefix and sink
    pub fn logger(&self) -> Logger {
        let sink = self
            .log_sink
            .clone()
            .unwrap_or_else(|| Arc::new(TracingSink));
        Logger::new(self.debug, sink).with_prefix(&self.log_prefix)
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("default_status_code", &self.default_status_code)
            .field("latency", &self.latency)
            .field("debug", &self.debug)
            .field("log_prefix", &self.log_prefix)
            .field("custom_parser", &self.parse_querystring.is_some())
            .field("on_create", &self.on_create.is_some())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Config file contents
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuartzConfig {
    /// Shown in the log line written when the fixtures are registered
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub default_status_code: Option<u16>,

    #[serde(default)]
    pub latency_ms: Option<u64>,

    /// Logging verbosity (-1 errors only, up to 3 for everything)
    #[serde(default)]
    pub debug: Option<i8>,

    #[serde(default)]
    pub log_prefix: Option<String>,

    /// Canned routes, registered in order
    #[serde(default)]
    pub routes: Vec<RouteFixture>,
}

impl QuartzConfig {
    /// Load from a `.json` file, or TOML for any other extension
    pub fn load(path: &Path) -> Result<Self, QuartzError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check status codes and verbosity without compiling routes
    pub fn validate(&self) -> Result<(), QuartzError> {
        if let Some(code) = self.default_status_code {
            check_status(code)?;
        }
        if let Some(debug) = self.debug {
            if !(-1..=3).contains(&debug) {
                return Err(QuartzError::Validation(format!(
                    "Invalid debug level {}: must be between -1 and 3",
                    debug
                )));
            }
        }
        for route in &self.routes {
            if let Some(code) = route.status {
                check_status(code)?;
            }
        }
        Ok(())
    }
}

fn check_status(code: u16) -> Result<(), QuartzError> {
    if (100..=999).contains(&code) {
        Ok(())
    } else {
        Err(QuartzError::Validation(format!(
            "Invalid status code {}: must be a three-digit number",
            code
        )))
    }
}

/// A route answered with a fixed reply
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteFixture {
    /// HTTP verb; omitted means any verb
    #[serde(default)]
    pub verb: Option<String>,

    pub route: RouteSpec,

    /// Falls back to the session's default status
    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub body: Option<BodySpec>,
}

/// Route matcher as written in config files
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteSpec {
    Exact { path: String },
    Regex { pattern: String },
    Glob { pattern: String },
}

impl RouteSpec {
    pub fn compile(&self) -> Result<Route, QuartzError> {
        match self {
            Self::Exact { path } => Ok(Route::Exact(path.clone())),
            Self::Regex { pattern } => Route::regex(pattern),
            Self::Glob { pattern } => Route::glob(pattern),
        }
    }
}

/// Fixture body: text is sent as-is, anything else as JSON
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BodySpec {
    Text(String),
    Json(serde_json::Value),
}

impl RouteFixture {
    /// Turn the fixture into a registration with a canned handler
    pub fn compile(&self) -> Result<Registration, QuartzError> {
        let verb = self.verb.as_deref().map(normalize_verb).transpose()?;
        let route = self.route.compile()?;

        let status = self.status;
        let headers = self.headers.clone();
        let payload = match &self.body {
            None => Payload::Empty,
            Some(BodySpec::Text(text)) => Payload::Text(text.clone()),
            Some(BodySpec::Json(value)) => Payload::Json(value.clone()),
        };
        let handler: Handler = Arc::new(move |res: &mut ResponseContext<'_>| {
            if let Some(code) = status {
                res.status(code);
            }
            res.set_all(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
            res.send(payload.clone());
        });

        Ok(Registration::new(verb, route, handler))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
