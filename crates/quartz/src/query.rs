// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Query string parsing for intercepted URLs.
//!
//! Parsing never fails: tokens without an `=` are dropped, and values that are not valid percent-encoded UTF-8 decode
//! lossily.

use percent_encoding::percent_decode_str;
use std::sync::Arc;

/// Pluggable URL → query mapping function
pub type QueryParser = Arc<dyn Fn(&str) -> QueryMap + Send + Sync>;

/// Parser used when no override is configured
pub fn default_parser() -> QueryParser {
    Arc::new(QueryMap::from_url)
}

/// Flat, insertion-ordered mapping of query parameters.
///
/// Keys are stored as sent. When a key has upper-case characters, its
/// lower-cased form is stored as well (unless that key was already present),
/// so handlers can look parameters up without caring about case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryMap {
    pairs: Vec<(String, String)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the part of `url` after the first `?`
    pub fn from_url(url: &str) -> Self {
        match url.split_once('?') {
            Some((_, query)) => Self::parse(query),
            None => Self::new(),
        }
    }

    /// Parse a bare query string such as `a=1&b=2`
    pub fn parse(query: &str) -> Self {
        let mut map = Self::new();
        for token in query.split('&') {
            // `&amp;` arrives as `&` followed by an `amp;` token
            let token = token.strip_prefix("amp;").unwrap_or(token);
            let Some((key, raw)) = token.split_once('=') else {
                continue;
            };
            let value = decode_value(raw);
            let lower = key.to_lowercase();
            if lower != key && !map.contains_key(&lower) {
                map.insert(lower, value.clone());
            }
            map.insert(key.to_string(), value);
        }
        map
    }

    /// Insert or replace a value, keeping the key's original position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Exact lookup first, then the first key equal ignoring case
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            self.pairs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// `+` means space in form encoding, so swap it before percent-decoding
fn decode_value(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
