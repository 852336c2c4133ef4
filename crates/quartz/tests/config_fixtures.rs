// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sessions built from TOML and JSON fixture files.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use quartz::{Method, Quartz, QuartzConfig, QuartzError, Reply};
use rstest::rstest;
use serde_json::json;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn started(name: &str) -> Quartz {
    let config = QuartzConfig::load(&fixture(name)).unwrap();
    let mut quartz = Quartz::from_config(&config).unwrap();
    quartz.start();
    quartz
}

fn exchange(quartz: &Quartz, method: Method, url: &str) -> Option<Reply> {
    let transport = quartz.transport()?;
    let id = transport.request(method, url).id()?;
    transport.respond();
    transport.reply(id)
}

#[test]
fn toml_fixture_loads_all_routes() {
    let config = QuartzConfig::load(&fixture("users.toml")).unwrap();
    assert_eq!(config.name, "users-api");
    assert_eq!(config.routes.len(), 3);

    let quartz = Quartz::from_config(&config).unwrap();
    assert_eq!(quartz.route_count(), 3);
    assert!(quartz.handler_exists("/users/42", Some("GET")));
    assert!(quartz.handler_exists("/users/42", Some("DELETE")));
    assert!(!quartz.handler_exists("/users/42", Some("PUT")));
}

#[rstest]
#[case(Method::GET, "/health", 200, "ok")]
#[case(Method::GET, "/users/7", 200, r#"{"id":1,"name":"ada"}"#)]
#[case(Method::DELETE, "/users/7", 204, "")]
fn toml_fixture_replies(
    #[case] method: Method,
    #[case] url: &str,
    #[case] status: u16,
    #[case] body: &str,
) {
    let quartz = started("users.toml");
    let reply = exchange(&quartz, method, url).unwrap();
    assert_eq!(reply.status, status);
    assert_eq!(reply.body_str(), body);
}

#[test]
fn toml_fixture_headers_are_sent() {
    let quartz = started("users.toml");
    let reply = exchange(&quartz, Method::GET, "/users/1").unwrap();
    assert_eq!(reply.header("x-source"), Some("fixture"));
    assert_eq!(reply.header("content-type"), Some("application/json"));
}

#[test]
fn json_fixture_replies() {
    let quartz = started("users.json");

    let created = exchange(&quartz, Method::POST, "/users").unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.json().unwrap(), json!({ "id": 2 }));

    let asset = exchange(&quartz, Method::GET, "/static/app.js").unwrap();
    assert_eq!(asset.body_str(), "asset");
}

#[test]
fn unknown_urls_pass_through_fixture_sessions() {
    let quartz = started("users.json");
    let transport = quartz.transport().unwrap();
    assert!(transport.request(Method::GET, "/users").is_passthrough());
}

#[test]
fn fixtures_can_be_added_to_a_running_session() {
    let mut quartz = Quartz::default();
    quartz.start();

    let config = QuartzConfig::load(&fixture("users.json")).unwrap();
    quartz.register_fixtures(&config).unwrap();
    assert_eq!(quartz.transport().unwrap().responder_count(), 2);
}

#[test]
fn invalid_fixture_is_rejected() {
    let config: QuartzConfig = toml::from_str(
        r#"
[[routes]]
route = { type = "regex", pattern = "(unclosed" }
"#,
    )
    .unwrap();
    assert!(matches!(
        Quartz::from_config(&config),
        Err(QuartzError::Regex(_))
    ));
}
