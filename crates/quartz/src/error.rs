// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error type shared by the session, config loader and response shaper.

use thiserror::Error;

/// Errors that can occur while configuring or driving a fake server
#[derive(Debug, Error)]
pub enum QuartzError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid regex route: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid glob route: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Invalid HTTP verb '{0}'")]
    InvalidVerb(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
