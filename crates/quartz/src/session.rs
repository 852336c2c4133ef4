// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session controller: registers routes and binds them to a transport.
//!
//! Routes may be registered before or after [`Quartz::start`]. Registrations
//! are kept in order and replayed onto a fresh transport every time the
//! session starts, so a `stop`/`start` cycle keeps every route working.
//!
//! ```ignore
//! let mut quartz = Quartz::new(Options::default());
//! quartz
//!     .get("/users", |res| {
//!         res.send(serde_json::json!([{ "id": 1 }]));
//!     })
//!     .start();
//! ```

use crate::config::{Options, QuartzConfig};
use crate::error::QuartzError;
use crate::logger::Logger;
use crate::response::ResponseContext;
use crate::route::{normalize_verb, Handler, Registration, Route, RouteRegistry};
use crate::transport::{FakeTransport, InterceptedRequest, ReplyCallback, Transport};
use http::Method;
use parking_lot::RwLock;
use std::sync::Arc;

/// Fake server session over a transport `T`
pub struct Quartz<T: Transport = FakeTransport> {
    options: Options,
    logger: Logger,
    registry: Arc<RwLock<RouteRegistry>>,
    transport: Option<T>,
}

impl Quartz<FakeTransport> {
    /// Session over the in-memory [`FakeTransport`]
    pub fn new(options: Options) -> Self {
        Self::with_transport(options)
    }

    /// Session configured from a config file, fixtures registered
    pub fn from_config(config: &QuartzConfig) -> Result<Self, QuartzError> {
        config.validate()?;
        let mut quartz = Self::new(Options::from_config(config));
        quartz.register_fixtures(config)?;
        Ok(quartz)
    }
}

impl Default for Quartz<FakeTransport> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl<T: Transport> Quartz<T> {
    /// Session over any transport; it is created on [`start`](Self::start)
    pub fn with_transport(options: Options) -> Self {
        let logger = options.logger();
        Self {
            options,
            logger,
            registry: Arc::new(RwLock::new(RouteRegistry::new())),
            transport: None,
        }
    }

    /// Create the transport and attach every registered route
    pub fn start(&mut self) -> &mut Self {
        if self.transport.is_some() {
            self.logger
                .warn(format_args!("start called while already started; ignoring"));
            return self;
        }

        let mut transport = T::create(self.options.clock.clone());
        transport.set_auto_respond_after(self.options.latency);

        let registry = Arc::clone(&self.registry);
        let logger = self.logger.clone();
        transport.set_filter(Arc::new(move |method: &Method, url: &str| {
            let handled = registry.read().exists(url, Some(method.as_str()));
            if !handled {
                logger.debug(format_args!("no route for {} {}; passing through", method, url));
            }
            !handled
        }));

        if let Some(hook) = &self.options.on_create {
            transport.set_on_create(Arc::clone(hook));
        }

        let registrations: Vec<Registration> = self.registry.read().iter().cloned().collect();
        for registration in &registrations {
            let callback = self.responder(registration);
            transport.respond_with(
                registration.verb.clone(),
                registration.route.clone(),
                callback,
            );
        }

        self.transport = Some(transport);
        self.logger.info(format_args!(
            "started with {} route(s), latency {}ms",
            registrations.len(),
            self.options.latency.as_millis()
        ));
        self
    }

    pub fn listen(&mut self) -> &mut Self {
        self.start()
    }

    pub fn init(&mut self) -> &mut Self {
        self.start()
    }

    /// Restore and drop the transport; registrations are kept
    pub fn stop(&mut self) -> &mut Self {
        match self.transport.take() {
            Some(mut transport) => {
                transport.restore();
                self.logger.info(format_args!("stopped"));
            }
            None => {
                self.logger
                    .warn(format_args!("stop called while not started; ignoring"));
            }
        }
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.stop()
    }

    pub fn shutdown(&mut self) -> &mut Self {
        self.stop()
    }

    /// Stop if running, then start with every registration reattached
    pub fn restart(&mut self) -> &mut Self {
        if self.transport.is_some() {
            self.stop();
        }
        self.start()
    }

    pub fn is_started(&self) -> bool {
        self.transport.is_some()
    }

    /// Register a handler for `verb` (any verb when `None`).
    ///
    /// The verb is uppercased; strings that are not valid HTTP method tokens
    /// are rejected.
    pub fn on<R, F>(
        &mut self,
        verb: Option<&str>,
        route: R,
        handler: F,
    ) -> Result<&mut Self, QuartzError>
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        let verb = verb.map(normalize_verb).transpose()?;
        Ok(self.register(verb, route.into(), Arc::new(handler)))
    }

    /// Append a registration, binding it right away when started
    pub fn register(&mut self, verb: Option<Method>, route: Route, handler: Handler) -> &mut Self {
        let registration = Registration::new(verb, route, handler);
        self.logger
            .debug(format_args!("registered {}", registration.label()));

        if self.transport.is_some() {
            let callback = self.responder(&registration);
            if let Some(transport) = self.transport.as_mut() {
                transport.respond_with(
                    registration.verb.clone(),
                    registration.route.clone(),
                    callback,
                );
            }
        }

        self.registry.write().register(registration);
        self
    }

    /// Register every fixture in `config`, in order
    pub fn register_fixtures(&mut self, config: &QuartzConfig) -> Result<&mut Self, QuartzError> {
        let source = if config.name.is_empty() {
            "config"
        } else {
            config.name.as_str()
        };
        self.logger.info(format_args!(
            "registering {} fixture route(s) from {}",
            config.routes.len(),
            source
        ));
        for fixture in &config.routes {
            let registration = fixture.compile()?;
            self.register(registration.verb, registration.route, registration.handler);
        }
        Ok(self)
    }

    pub fn all<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(None, route.into(), Arc::new(handler))
    }

    pub fn opts<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(Some(Method::OPTIONS), route.into(), Arc::new(handler))
    }

    pub fn head<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(Some(Method::HEAD), route.into(), Arc::new(handler))
    }

    pub fn get<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(Some(Method::GET), route.into(), Arc::new(handler))
    }

    pub fn post<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(Some(Method::POST), route.into(), Arc::new(handler))
    }

    pub fn put<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(Some(Method::PUT), route.into(), Arc::new(handler))
    }

    pub fn del<R, F>(&mut self, route: R, handler: F) -> &mut Self
    where
        R: Into<Route>,
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.register(Some(Method::DELETE), route.into(), Arc::new(handler))
    }

    /// Whether a registered route covers `url` for `verb` (any verb when `None`)
    pub fn handler_exists(&self, url: &str, verb: Option<&str>) -> bool {
        self.registry.read().exists(url, verb)
    }

    /// Number of registrations, bound or buffered
    pub fn route_count(&self) -> usize {
        self.registry.read().len()
    }

    /// The running transport, `None` while stopped
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Transport callback: shape the reply helpers, then run the handler
    fn responder(&self, registration: &Registration) -> ReplyCallback {
        let handler = Arc::clone(&registration.handler);
        let parser = self.options.query_parser();
        let default_status = self.options.default_status_code;
        let logger = self.logger.clone();
        let label = registration.label();

        Arc::new(move |request: &mut InterceptedRequest| {
            logger.info(format_args!(
                "{} {} matched {}",
                request.method(),
                request.url(),
                label
            ));
            let query = (parser)(request.url());
            let mut res = ResponseContext::new(request, default_status, query, &logger);
            (handler)(&mut res);
            if !res.is_sent() {
                logger.warn(format_args!("handler for {} did not reply", label));
            }
        })
    }
}

impl<T: Transport> Drop for Quartz<T> {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.restore();
        }
    }
}

impl<T: Transport> std::fmt::Debug for Quartz<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quartz")
            .field("started", &self.is_started())
            .field("routes", &self.route_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
