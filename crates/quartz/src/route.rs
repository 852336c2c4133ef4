// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Route matching and the ordered handler registry.

use crate::error::QuartzError;
use crate::response::ResponseContext;
use http::Method;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// User callback run for a matching intercepted call
pub type Handler = Arc<dyn Fn(&mut ResponseContext<'_>) + Send + Sync>;

/// Which URLs a registration applies to
#[derive(Clone, Debug)]
pub enum Route {
    /// URL must equal the string exactly, query string included
    Exact(String),
    /// Regex tested anywhere in the URL
    Pattern(Regex),
    /// Shell-style wildcard match over the whole URL
    Glob(glob::Pattern),
}

impl Route {
    pub fn regex(pattern: &str) -> Result<Self, QuartzError> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    pub fn glob(pattern: &str) -> Result<Self, QuartzError> {
        Ok(Self::Glob(glob::Pattern::new(pattern)?))
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(path) => path == url,
            Self::Pattern(re) => re.is_match(url),
            Self::Glob(pattern) => pattern.matches(url),
        }
    }

    /// Capture groups of a regex route, in order from group 1.
    ///
    /// Groups that did not take part in the match are `None`. Exact and glob
    /// routes, and URLs the regex does not match, yield nothing.
    pub fn captures(&self, url: &str) -> Vec<Option<String>> {
        let Self::Pattern(re) = self else {
            return Vec::new();
        };
        re.captures(url)
            .map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => f.write_str(path),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Self::Glob(pattern) => write!(f, "glob:{}", pattern.as_str()),
        }
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Self::Exact(path.to_string())
    }
}

impl From<String> for Route {
    fn from(path: String) -> Self {
        Self::Exact(path)
    }
}

impl From<Regex> for Route {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<glob::Pattern> for Route {
    fn from(pattern: glob::Pattern) -> Self {
        Self::Glob(pattern)
    }
}

/// Uppercase a verb string and parse it as an HTTP method
pub fn normalize_verb(verb: &str) -> Result<Method, QuartzError> {
    let upper = verb.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| QuartzError::InvalidVerb(verb.to_string()))
}

/// `None` on either side matches anything; a blank requested verb counts as `None`
pub fn verb_matches(registered: Option<&Method>, requested: Option<&str>) -> bool {
    let requested = requested.map(str::trim).filter(|v| !v.is_empty());
    match (registered, requested) {
        (None, _) | (_, None) => true,
        (Some(method), Some(verb)) => method.as_str().eq_ignore_ascii_case(verb),
    }
}

/// One `(verb, route, handler)` registration
#[derive(Clone)]
pub struct Registration {
    /// `None` matches every verb
    pub verb: Option<Method>,
    pub route: Route,
    pub handler: Handler,
}

impl Registration {
    pub fn new(verb: Option<Method>, route: Route, handler: Handler) -> Self {
        Self {
            verb,
            route,
            handler,
        }
    }

    pub fn matches(&self, url: &str, verb: Option<&str>) -> bool {
        self.route.matches(url) && verb_matches(self.verb.as_ref(), verb)
    }

    /// `GET /users` style label for logs
    pub fn label(&self) -> String {
        match &self.verb {
            Some(method) => format!("{} {}", method, self.route),
            None => format!("* {}", self.route),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("verb", &self.verb)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Registrations in insertion order
#[derive(Clone, Debug, Default)]
pub struct RouteRegistry {
    registrations: Vec<Registration>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }

    /// Whether any registration covers `url` for `verb`.
    ///
    /// A `None` verb asks about the route alone.
    pub fn exists(&self, url: &str, verb: Option<&str>) -> bool {
        self.find(url, verb).is_some()
    }

    /// First registration, in insertion order, covering `url` for `verb`
    pub fn find(&self, url: &str, verb: Option<&str>) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.matches(url, verb))
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    pub fn clear(&mut self) {
        self.registrations.clear();
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
