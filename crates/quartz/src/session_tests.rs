// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::logger::{CollectingSink, Level};
use crate::query::QueryMap;
use crate::time::{Clock, FakeClock};
use serde_json::json;
use std::time::Duration;
use yare::parameterized;

fn options() -> Options {
    Options::new()
        .with_latency(Duration::ZERO)
        .with_clock(FakeClock::new(0))
}

fn running(quartz: &Quartz) -> FakeTransport {
    quartz.transport().unwrap().clone()
}

/// Send one call and answer it, returning the reply
fn call(quartz: &Quartz, method: Method, url: &str) -> Option<crate::transport::Reply> {
    let transport = running(quartz);
    let id = transport.request(method, url).id()?;
    transport.respond();
    transport.reply(id)
}

#[test]
fn test_new_session_is_stopped() {
    let quartz = Quartz::new(options());
    assert!(!quartz.is_started());
    assert!(quartz.transport().is_none());
    assert_eq!(quartz.route_count(), 0);
}

#[parameterized(
    get = { "GET" },
    post = { "POST" },
    put = { "PUT" },
    delete = { "DELETE" },
    patch = { "PATCH" },
)]
fn test_all_matches_every_verb(verb: &str) {
    let mut quartz = Quartz::new(options());
    quartz.all("/any", |res| {
        res.send("hit");
    });
    quartz.start();

    let method = Method::from_bytes(verb.as_bytes()).unwrap();
    let reply = call(&quartz, method, "/any").unwrap();
    assert_eq!(reply.body_str(), "hit");
}

#[test]
fn test_verb_specific_route_ignores_other_verbs() {
    let mut quartz = Quartz::new(options());
    quartz.post("/items", |res| {
        res.status(201).end();
    });
    quartz.start();

    let reply = call(&quartz, Method::POST, "/items").unwrap();
    assert_eq!(reply.status, 201);

    let dispatch = running(&quartz).request(Method::GET, "/items");
    assert!(dispatch.is_passthrough());
}

#[parameterized(
    opts = { "opts", Method::OPTIONS },
    head = { "head", Method::HEAD },
    get = { "get", Method::GET },
    post = { "post", Method::POST },
    put = { "put", Method::PUT },
    del = { "del", Method::DELETE },
)]
fn test_verb_shortcuts(shortcut: &str, method: Method) {
    let mut quartz = Quartz::new(options());
    let handler = |res: &mut ResponseContext<'_>| {
        res.send("ok");
    };
    match shortcut {
        "opts" => quartz.opts("/x", handler),
        "head" => quartz.head("/x", handler),
        "get" => quartz.get("/x", handler),
        "post" => quartz.post("/x", handler),
        "put" => quartz.put("/x", handler),
        "del" => quartz.del("/x", handler),
        other => panic!("unknown shortcut {other}"),
    };

    assert!(quartz.handler_exists("/x", Some(method.as_str())));
    assert!(quartz.handler_exists("/x", None));
    assert!(!quartz.handler_exists("/y", Some(method.as_str())));
}

#[test]
fn test_on_normalizes_and_rejects_verbs() {
    let mut quartz = Quartz::new(options());
    quartz
        .on(Some(" patch "), "/doc", |res| {
            res.end();
        })
        .unwrap();
    assert!(quartz.handler_exists("/doc", Some("PATCH")));
    assert!(quartz.handler_exists("/doc", Some("patch")));

    let err = quartz.on(Some("NOT A VERB"), "/doc", |res| {
        res.end();
    });
    assert!(matches!(err, Err(QuartzError::InvalidVerb(_))));
    assert_eq!(quartz.route_count(), 1);
}

#[test]
fn test_register_after_start_binds_immediately() {
    let mut quartz = Quartz::new(options());
    quartz.start();
    assert_eq!(running(&quartz).responder_count(), 0);

    quartz.get("/late", |res| {
        res.send("late");
    });
    assert_eq!(running(&quartz).responder_count(), 1);
    assert_eq!(call(&quartz, Method::GET, "/late").unwrap().body_str(), "late");
}

#[test]
fn test_stop_then_start_replays_registrations() {
    let mut quartz = Quartz::new(options());
    quartz.get("/a", |res| {
        res.send("a");
    });
    quartz.start();
    let first = running(&quartz);

    quartz.get("/b", |res| {
        res.send("b");
    });
    quartz.stop();
    assert!(first.is_restored());
    assert!(first.request(Method::GET, "/a").is_passthrough());

    quartz.start();
    assert_eq!(running(&quartz).responder_count(), 2);
    assert_eq!(call(&quartz, Method::GET, "/a").unwrap().body_str(), "a");
    assert_eq!(call(&quartz, Method::GET, "/b").unwrap().body_str(), "b");
}

#[test]
fn test_aliases_drive_lifecycle() {
    let mut quartz = Quartz::new(options());
    quartz.listen();
    assert!(quartz.is_started());
    quartz.close();
    assert!(!quartz.is_started());
    quartz.init();
    assert!(quartz.is_started());
    quartz.shutdown();
    assert!(!quartz.is_started());
}

#[test]
fn test_double_start_and_stop_warn() {
    let sink = CollectingSink::new();
    let mut quartz = Quartz::new(options().with_log_sink(Arc::new(sink.clone())).with_debug(0));

    quartz.stop();
    quartz.start();
    let transport = running(&quartz);
    quartz.start();

    assert_eq!(sink.at(Level::Warn).len(), 2);
    // The second start kept the first transport
    assert!(!transport.is_restored());
    assert_eq!(running(&quartz).responder_count(), transport.responder_count());
}

#[test]
fn test_restart() {
    let mut quartz = Quartz::new(options());
    quartz.get("/a", |res| {
        res.end();
    });
    quartz.restart();
    let first = running(&quartz);
    quartz.restart();
    assert!(first.is_restored());
    assert_eq!(running(&quartz).responder_count(), 1);
}

#[test]
fn test_unregistered_route_passes_through() {
    let mut quartz = Quartz::new(options());
    quartz.get("/known", |res| {
        res.end();
    });
    quartz.start();

    let transport = running(&quartz);
    assert!(transport.request(Method::GET, "/unknown").is_passthrough());
    assert_eq!(transport.exchanges().find_passthrough().len(), 1);
}

#[test]
fn test_reply_echoes_request_headers() {
    let mut quartz = Quartz::new(options());
    quartz.get("/missing", |res| {
        res.status(404).send(());
    });
    quartz.start();

    let transport = running(&quartz);
    let headers: crate::headers::Headers = [("X-Trace", "abc")].into_iter().collect();
    let id = transport
        .send(Method::GET, "/missing", headers, None)
        .id()
        .unwrap();
    transport.respond();

    let reply = transport.reply(id).unwrap();
    assert_eq!(reply.status, 404);
    assert_eq!(reply.header("x-trace"), Some("abc"));
    assert_eq!(reply.body, None);
}

#[test]
fn test_default_status_code_applies() {
    let mut quartz = Quartz::new(options().with_default_status_code(299));
    quartz.get("/", |res| {
        res.send("body");
    });
    quartz.start();
    assert_eq!(call(&quartz, Method::GET, "/").unwrap().status, 299);
}

#[test]
fn test_json_reply() {
    let mut quartz = Quartz::new(options());
    quartz.get("/x", |res| {
        res.json(&json!({"x": 1})).unwrap();
    });
    quartz.start();

    let reply = call(&quartz, Method::GET, "/x").unwrap();
    assert_eq!(reply.body_str(), r#"{"x":1}"#);
    assert_eq!(reply.header("content-type"), Some("application/json"));
}

#[test]
fn test_handler_sees_parsed_query() {
    let mut quartz = Quartz::new(options());
    quartz.get(Route::regex("^/search").unwrap(), |res| {
        let term = res.query().get("q").unwrap_or("").to_string();
        res.send(term);
    });
    quartz.start();

    let reply = call(&quartz, Method::GET, "/search?q=hello+world").unwrap();
    assert_eq!(reply.body_str(), "hello world");
}

#[test]
fn test_handler_sees_regex_groups() {
    let mut quartz = Quartz::new(options());
    quartz.get(Route::regex(r"^/users/(\d+)$").unwrap(), |res| {
        let id = res.param(1).unwrap_or("none").to_string();
        res.send(id);
    });
    quartz.start();

    let reply = call(&quartz, Method::GET, "/users/42").unwrap();
    assert_eq!(reply.body_str(), "42");
}

#[test]
fn test_custom_query_parser() {
    let mut quartz = Quartz::new(options().with_query_parser(|url| {
        QueryMap::from_iter([("url", url)])
    }));
    quartz.all(Route::glob("/p*").unwrap(), |res| {
        let seen = res.query().get("url").unwrap_or("").to_string();
        res.send(seen);
    });
    quartz.start();

    let reply = call(&quartz, Method::GET, "/path?a=1").unwrap();
    assert_eq!(reply.body_str(), "/path?a=1");
}

#[test]
fn test_latest_registration_wins() {
    let mut quartz = Quartz::new(options());
    quartz.get("/dup", |res| {
        res.send("first");
    });
    quartz.get("/dup", |res| {
        res.send("second");
    });
    quartz.start();
    assert_eq!(call(&quartz, Method::GET, "/dup").unwrap().body_str(), "second");
}

#[test]
fn test_silent_handler_gets_not_found_and_warning() {
    let sink = CollectingSink::new();
    let mut quartz = Quartz::new(options().with_log_sink(Arc::new(sink.clone())).with_debug(0));
    quartz.get("/quiet", |_res| {});
    quartz.start();

    let reply = call(&quartz, Method::GET, "/quiet").unwrap();
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body_str(), "");
    assert!(sink
        .at(Level::Warn)
        .iter()
        .any(|line| line.contains("did not reply")));
}

#[test]
fn test_on_create_hook_sees_every_call() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let mut quartz = Quartz::new(options().with_on_create(move |req| {
        log.lock().push(req.url().to_string());
    }));
    quartz.get("/a", |res| {
        res.end();
    });
    quartz.start();

    let transport = running(&quartz);
    transport.request(Method::GET, "/a");
    transport.request(Method::GET, "/elsewhere");
    assert_eq!(*seen.lock(), vec!["/a", "/elsewhere"]);
}

#[test]
fn test_logging_follows_verbosity() {
    let sink = CollectingSink::new();
    let mut quartz = Quartz::new(
        options()
            .with_log_sink(Arc::new(sink.clone()))
            .with_debug(3)
            .with_log_prefix("[t]"),
    );
    quartz.get("/a", |res| {
        res.send("a");
    });
    quartz.start();
    call(&quartz, Method::GET, "/a");
    running(&quartz).request(Method::GET, "/b");

    assert_eq!(sink.at(Level::Debug)[0], "[t] registered GET /a");
    assert!(sink.at(Level::Info).iter().any(|l| l.contains("matched GET /a")));
    assert_eq!(sink.at(Level::Log), vec!["[t] replied 200 to GET /a"]);
    assert!(sink
        .at(Level::Debug)
        .iter()
        .any(|l| l.contains("no route for GET /b")));
}

#[test]
fn test_quiet_by_default() {
    let sink = CollectingSink::new();
    let mut quartz = Quartz::new(options().with_log_sink(Arc::new(sink.clone())));
    quartz.get("/a", |res| {
        res.end();
    });
    quartz.start();
    call(&quartz, Method::GET, "/a");
    assert!(sink.lines().is_empty());
}

#[test]
fn test_from_config_registers_fixtures() {
    let config: QuartzConfig = toml::from_str(
        r#"
default_status_code = 202
latency_ms = 0

[[routes]]
verb = "get"
route = { type = "exact", path = "/health" }
body = "ok"
"#,
    )
    .unwrap();
    let mut quartz = Quartz::from_config(&config).unwrap();
    assert_eq!(quartz.route_count(), 1);
    quartz.start();

    let reply = call(&quartz, Method::GET, "/health").unwrap();
    assert_eq!(reply.status, 202);
    assert_eq!(reply.body_str(), "ok");
}

#[test]
fn test_from_config_rejects_invalid() {
    let config = QuartzConfig {
        default_status_code: Some(7),
        ..Default::default()
    };
    assert!(matches!(
        Quartz::from_config(&config),
        Err(QuartzError::Validation(_))
    ));
}

#[test]
fn test_register_fixtures_logs_config_name() {
    let sink = CollectingSink::new();
    let mut quartz = Quartz::new(options().with_log_sink(Arc::new(sink.clone())).with_debug(1));
    let named: QuartzConfig = toml::from_str(
        r#"
name = "users-api"

[[routes]]
route = { type = "exact", path = "/health" }
"#,
    )
    .unwrap();
    quartz.register_fixtures(&named).unwrap();
    quartz.register_fixtures(&QuartzConfig::default()).unwrap();

    assert_eq!(
        sink.at(Level::Info),
        vec![
            "[quartz] registering 1 fixture route(s) from users-api",
            "[quartz] registering 0 fixture route(s) from config",
        ]
    );
}

#[tokio::test]
async fn test_latency_with_fake_clock() {
    let clock = FakeClock::new(0);
    let mut quartz = Quartz::new(
        Options::new()
            .with_latency(Duration::from_millis(50))
            .with_clock(clock.clone()),
    );
    quartz.get("/slow", |res| {
        res.send("done");
    });
    quartz.start();

    let transport = running(&quartz);
    let id = transport.request(Method::GET, "/slow").id().unwrap();
    assert_eq!(transport.respond_due(), 0);

    transport.settle().await;
    assert_eq!(clock.now_millis(), 50);
    assert_eq!(transport.reply(id).unwrap().body_str(), "done");
}

#[test]
fn test_drop_restores_transport() {
    let mut quartz = Quartz::new(options());
    quartz.start();
    let transport = running(&quartz);
    drop(quartz);
    assert!(transport.is_restored());
}
