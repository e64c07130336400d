use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::{debug, info_span, warn};

use super::response::Response;
use crate::config::AppConfig;
use crate::di::Container;
use crate::dispatcher::{DispatchError, DispatchState, Dispatcher, Request};
use crate::events::{EventData, EventsManager, APPLICATION_BEFORE_SEND_RESPONSE, APPLICATION_BOOT};
use crate::router::Router;

/// Web entry point: URI in, [`Response`] out.
///
/// Application events (`application:boot`, `application:beforeSendResponse`)
/// are fired against the response being built, so listeners can add headers
/// or rewrite the final body.
#[derive(Debug)]
pub struct Application {
    dispatcher: Dispatcher<Request>,
    router: Router,
    events: Option<Arc<EventsManager<Response>>>,
}

impl Application {
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            dispatcher: Dispatcher::new(container),
            router: Router::new(),
            events: None,
        }
    }

    /// Build from a loaded configuration: dispatcher conventions and route table.
    ///
    /// # Errors
    ///
    /// A route entry that does not compile.
    pub fn from_config(config: &AppConfig, container: Container) -> anyhow::Result<Self> {
        let mut app = Self::new(container);
        config.dispatcher.apply_request(&mut app.dispatcher);
        app.router = config.build_router()?;
        Ok(app)
    }

    pub fn set_router(&mut self, router: Router) {
        self.router = router;
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn set_events_manager(&mut self, events: Arc<EventsManager<Response>>) {
        self.events = Some(events);
    }

    /// Listeners for the `dispatch:*` events of the inner dispatcher.
    pub fn set_dispatch_events(&mut self, events: Arc<EventsManager<DispatchState>>) {
        self.dispatcher.set_events_manager(events);
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<Request> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<Request> {
        &mut self.dispatcher
    }

    fn fire(&self, name: &str, response: &mut Response) {
        if let Some(events) = &self.events {
            let body = response.body.clone();
            events.fire(name, response, EventData::Response(&body));
        }
    }

    /// Route `uri`, dispatch it and convert the returned value.
    ///
    /// - a string becomes a `text/plain` body
    /// - `false` becomes an empty body
    /// - `null` becomes `204 No Content`
    /// - anything else is sent as JSON
    ///
    /// # Errors
    ///
    /// Dispatch errors nobody handled; use [`DispatchError::status_code`] to
    /// answer them.
    pub fn handle(&mut self, method: &Method, uri: &str) -> Result<Response, DispatchError> {
        let span = info_span!("request", method = %method, uri = %uri);
        let _entered = span.enter();

        let mut response = Response::default();
        self.fire(APPLICATION_BOOT, &mut response);

        self.dispatcher.reset();
        let target = self.router.route(method, uri);
        debug!(target = ?target, "Request routed");
        target.apply(&mut self.dispatcher);

        let returned = self.dispatcher.dispatch().map_err(|err| {
            warn!(code = err.code(), error = %err, "Unhandled dispatch error");
            err
        })?;

        match returned {
            Value::String(text) => {
                response.set_header("content-type", "text/plain; charset=utf-8");
                response.body = Value::String(text);
            }
            Value::Bool(false) => {
                response.body = Value::Null;
            }
            Value::Null => {
                response.status = 204;
                response.body = Value::Null;
            }
            other => {
                response.set_header("content-type", "application/json");
                response.body = other;
            }
        }

        self.fire(APPLICATION_BEFORE_SEND_RESPONSE, &mut response);
        Ok(response)
    }
}
