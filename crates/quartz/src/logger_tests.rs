// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use yare::parameterized;

fn collecting(verbosity: i8) -> (Logger, CollectingSink) {
    let sink = CollectingSink::new();
    let logger = Logger::new(verbosity, Arc::new(sink.clone()));
    (logger, sink)
}

#[parameterized(
    error_at_default = { Level::Error, -1, true },
    warn_at_default = { Level::Warn, -1, false },
    warn_at_zero = { Level::Warn, 0, true },
    info_at_zero = { Level::Info, 0, false },
    info_at_one = { Level::Info, 1, true },
    log_at_one = { Level::Log, 1, false },
    log_at_two = { Level::Log, 2, true },
    debug_at_two = { Level::Debug, 2, false },
    debug_at_three = { Level::Debug, 3, true },
    error_at_three = { Level::Error, 3, true },
)]
fn level_threshold(level: Level, verbosity: i8, emitted: bool) {
    let (logger, sink) = collecting(verbosity);
    logger.emit(level, format_args!("message"));

    assert_eq!(logger.enabled(level), emitted);
    assert_eq!(sink.lines().len(), usize::from(emitted));
}

#[test]
fn test_default_prefix_applied() {
    let (logger, sink) = collecting(3);
    logger.info(format_args!("started with {} handlers", 2));

    assert_eq!(
        sink.lines(),
        vec![(Level::Info, "[quartz] started with 2 handlers".to_string())]
    );
}

#[test]
fn test_custom_and_empty_prefix() {
    let (logger, sink) = collecting(3);
    logger.clone().with_prefix("[api]").warn(format_args!("slow"));
    logger.with_prefix("").error(format_args!("bare"));

    assert_eq!(sink.at(Level::Warn), vec!["[api] slow".to_string()]);
    assert_eq!(sink.at(Level::Error), vec!["bare".to_string()]);
}

#[test]
fn test_each_method_routes_to_its_level() {
    let (logger, sink) = collecting(3);
    logger.debug(format_args!("d"));
    logger.log(format_args!("l"));
    logger.info(format_args!("i"));
    logger.warn(format_args!("w"));
    logger.error(format_args!("e"));

    let levels: Vec<Level> = sink.lines().into_iter().map(|(l, _)| l).collect();
    assert_eq!(
        levels,
        vec![Level::Debug, Level::Log, Level::Info, Level::Warn, Level::Error]
    );
}

#[test]
fn test_default_logger_is_errors_only() {
    let logger = Logger::default();
    assert_eq!(logger.verbosity(), DEFAULT_VERBOSITY);
    assert_eq!(logger.prefix(), DEFAULT_PREFIX);
    assert!(logger.enabled(Level::Error));
    assert!(!logger.enabled(Level::Warn));
}

#[test]
fn test_collecting_sink_clear() {
    let (logger, sink) = collecting(0);
    logger.warn(format_args!("one"));
    sink.clear();
    assert!(sink.lines().is_empty());
}
