// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory transport.
//!
//! Calls are queued with a deadline of `now + auto_respond_after` on the
//! transport's clock and answered by [`FakeTransport::respond_due`],
//! [`FakeTransport::respond`] or [`FakeTransport::settle`]. When several
//! responders match a call, the most recently registered one answers it.
//! A call that no responder answers gets a bare 404.

use super::{
    CreateHook, Dispatch, InterceptedRequest, Reply, ReplyCallback, RequestFilter, RequestId,
    Transport,
};
use crate::capture::{CapturedOutcome, CapturedRequest, ExchangeLog};
use crate::headers::Headers;
use crate::route::{verb_matches, Route};
use crate::time::{Clock, ClockHandle, FakeClock};
use http::Method;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

struct Responder {
    verb: Option<Method>,
    route: Route,
    callback: ReplyCallback,
}

struct Queued {
    due: u64,
    request: InterceptedRequest,
}

#[derive(Default)]
struct FakeState {
    auto_respond_after: Duration,
    responders: Vec<Responder>,
    filter: Option<RequestFilter>,
    on_create: Option<CreateHook>,
    queue: VecDeque<Queued>,
    replies: HashMap<RequestId, Reply>,
    next_id: u64,
    restored: bool,
}

/// Cloneable handle on a shared in-memory transport
#[derive(Clone)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
    clock: ClockHandle,
    exchanges: ExchangeLog,
}

impl FakeTransport {
    pub fn new(clock: ClockHandle) -> Self {
        Self::with_exchange_log(clock, ExchangeLog::new())
    }

    /// Record exchanges into an existing log, e.g. one mirrored to a file
    pub fn with_exchange_log(clock: ClockHandle, exchanges: ExchangeLog) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            clock,
            exchanges,
        }
    }

    /// Send a call with no headers or body
    pub fn request(&self, method: Method, url: &str) -> Dispatch {
        self.send(method, url, Headers::new(), None)
    }

    /// Send a call into the transport, as code under test would
    pub fn send(
        &self,
        method: Method,
        url: &str,
        headers: Headers,
        body: Option<String>,
    ) -> Dispatch {
        let (id, on_create, filter, restored) = {
            let mut state = self.state.lock();
            let id = RequestId(state.next_id);
            state.next_id += 1;
            (
                id,
                state.on_create.clone(),
                state.filter.clone(),
                state.restored,
            )
        };

        let request = InterceptedRequest::new(id, method, url, headers, body);
        if let Some(hook) = on_create {
            hook(&request);
        }

        let bypass = restored || filter.is_some_and(|f| f(request.method(), request.url()));
        if bypass {
            self.exchanges
                .record(capture(&request), CapturedOutcome::Passthrough);
            return Dispatch::Passthrough;
        }

        let mut state = self.state.lock();
        let due = self.clock.deadline_after(state.auto_respond_after);
        state.queue.push_back(Queued { due, request });
        Dispatch::Queued(id)
    }

    /// Answer every queued call regardless of latency
    pub fn respond(&self) -> usize {
        self.process(None)
    }

    /// Answer queued calls whose deadline has passed
    pub fn respond_due(&self) -> usize {
        self.process(Some(self.clock.now_millis()))
    }

    /// Wait on the clock until every queued call has been answered.
    ///
    /// With a frozen fake clock this returns as soon as nothing more is due.
    pub async fn settle(&self) {
        loop {
            let next_due = self.state.lock().queue.iter().map(|q| q.due).min();
            let Some(due) = next_due else {
                return;
            };
            let wait = self.clock.until(due);
            if !wait.is_zero() {
                self.clock.sleep(wait).await;
            }
            let answered = self.respond_due();
            let frozen = self.clock.as_fake().is_some_and(FakeClock::is_frozen);
            if answered == 0 && frozen {
                return;
            }
        }
    }

    /// Reply recorded for a call, once it has been answered
    pub fn reply(&self, id: RequestId) -> Option<Reply> {
        self.state.lock().replies.get(&id).cloned()
    }

    /// Number of calls waiting for a reply
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn responder_count(&self) -> usize {
        self.state.lock().responders.len()
    }

    pub fn auto_respond_after(&self) -> Duration {
        self.state.lock().auto_respond_after
    }

    pub fn is_restored(&self) -> bool {
        self.state.lock().restored
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    /// Every call seen so far and what happened to it
    pub fn exchanges(&self) -> &ExchangeLog {
        &self.exchanges
    }

    fn process(&self, now: Option<u64>) -> usize {
        let ready: Vec<InterceptedRequest> = {
            let mut state = self.state.lock();
            let (ready, waiting): (VecDeque<Queued>, VecDeque<Queued>) = state
                .queue
                .drain(..)
                .partition(|q| now.is_none_or(|now| q.due <= now));
            state.queue = waiting;
            ready.into_iter().map(|q| q.request).collect()
        };
        let count = ready.len();
        for request in ready {
            self.answer(request);
        }
        count
    }

    fn answer(&self, mut request: InterceptedRequest) {
        let captured = capture(&request);
        let matched = {
            let state = self.state.lock();
            state
                .responders
                .iter()
                .rev()
                .find(|r| {
                    verb_matches(r.verb.as_ref(), Some(request.method().as_str()))
                        && r.route.matches(request.url())
                })
                .map(|r| (Arc::clone(&r.callback), r.route.captures(request.url())))
        };

        // Lock released: callbacks may send further calls
        if let Some((callback, params)) = matched {
            request.set_params(params);
            callback(&mut request);
        }

        let (reply, outcome) = match request.take_reply() {
            Some(reply) => {
                let outcome = CapturedOutcome::Replied {
                    status: reply.status,
                    headers: reply.headers.to_pairs(),
                    body: reply.body.clone(),
                };
                (reply, outcome)
            }
            None => {
                let reply = Reply::not_found();
                let outcome = CapturedOutcome::Unhandled {
                    status: reply.status,
                };
                (reply, outcome)
            }
        };
        self.exchanges.record(captured, outcome);
        self.state.lock().replies.insert(request.id(), reply);
    }
}

impl Transport for FakeTransport {
    fn create(clock: ClockHandle) -> Self {
        Self::new(clock)
    }

    fn set_auto_respond_after(&mut self, latency: Duration) {
        self.state.lock().auto_respond_after = latency;
    }

    fn respond_with(&mut self, verb: Option<Method>, route: Route, callback: ReplyCallback) {
        self.state.lock().responders.push(Responder {
            verb,
            route,
            callback,
        });
    }

    fn set_filter(&mut self, filter: RequestFilter) {
        self.state.lock().filter = Some(filter);
    }

    fn set_on_create(&mut self, hook: CreateHook) {
        self.state.lock().on_create = Some(hook);
    }

    fn restore(&mut self) {
        self.state.lock().restored = true;
    }
}

impl std::fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("FakeTransport")
            .field("responders", &state.responders.len())
            .field("pending", &state.queue.len())
            .field("restored", &state.restored)
            .finish_non_exhaustive()
    }
}

fn capture(request: &InterceptedRequest) -> CapturedRequest {
    CapturedRequest {
        method: request.method().to_string(),
        url: request.url().to_string(),
        headers: request.request_headers().to_pairs(),
        body: request.body().map(str::to_string),
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
