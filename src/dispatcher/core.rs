//! Dispatcher core module - the dispatch loop.
//!
//! One call to [`Dispatcher::dispatch`] resolves `handler + action + params`,
//! invokes the action, and repeats while a listener or the action itself
//! forwarded somewhere else. The loop is capped at [`MAX_DISPATCHES`]
//! iterations.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, info_span, warn};

use super::error::DispatchError;
use super::flavor::{Flavor, Request};
use super::state::{DispatchState, Forward};
use crate::di::{Container, HandlerResolver};
use crate::events::{
    EventData, EventsManager, Verdict, AFTER_DISPATCH, AFTER_DISPATCH_LOOP, BEFORE_DISPATCH,
    BEFORE_DISPATCH_LOOP, BEFORE_EXCEPTION, BEFORE_NOT_FOUND_ACTION,
};
use crate::ids::DispatchId;

/// Iteration cap of one `dispatch()` call; reaching it raises `CyclicRouting`.
pub const MAX_DISPATCHES: u32 = 256;

/// What the loop does after a resolution failure went through `beforeException`.
enum Recovery {
    /// A listener forwarded; run the next iteration
    Retry,
    /// Handled without a forward; leave the loop
    Stop,
    /// Nobody handled it
    Fail(DispatchError),
}

/// Resolves and invokes handler actions for flavor `F`.
///
/// ```rust
/// use soli::di::{Action, Container, HandlerDefinition};
/// use soli::dispatcher::Dispatcher;
/// use serde_json::json;
///
/// let mut container = Container::new();
/// container.register(
///     HandlerDefinition::new("IndexController", |_| ())
///         .action("indexAction", |_: &mut (), _: &mut Action<'_>| Ok(json!("home"))),
/// );
///
/// let mut dispatcher: Dispatcher = Dispatcher::new(container);
/// assert_eq!(dispatcher.dispatch().unwrap(), json!("home"));
/// ```
#[derive(Debug)]
pub struct Dispatcher<F: Flavor = Request> {
    state: DispatchState,
    container: Container,
    events: Option<Arc<EventsManager<DispatchState>>>,
    returned_value: Value,
    last_handler: Option<String>,
    _flavor: PhantomData<F>,
}

impl<F: Flavor> Default for Dispatcher<F> {
    fn default() -> Self {
        Self::new(Container::new())
    }
}

impl<F: Flavor> Dispatcher<F> {
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            state: DispatchState::new(F::DEFAULT_HANDLER, F::DEFAULT_ACTION, F::HANDLER_SUFFIX),
            container,
            events: None,
            returned_value: Value::Null,
            last_handler: None,
            _flavor: PhantomData,
        }
    }

    pub fn set_events_manager(&mut self, events: Arc<EventsManager<DispatchState>>) {
        self.events = Some(events);
    }

    #[must_use]
    pub fn events_manager(&self) -> Option<&Arc<EventsManager<DispatchState>>> {
        self.events.as_ref()
    }

    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    #[must_use]
    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DispatchState {
        &mut self.state
    }

    /// Value returned by the last invoked action.
    #[must_use]
    pub fn returned_value(&self) -> &Value {
        &self.returned_value
    }

    /// Type name of the last handler an action was invoked on.
    #[must_use]
    pub fn last_handler(&self) -> Option<&str> {
        self.last_handler.as_deref()
    }

    /// Current target as a map keyed the way this flavor serializes forwards.
    #[must_use]
    pub fn target(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            F::HANDLER_KEY.to_string(),
            self.state.handler_name().map_or(Value::Null, Value::from),
        );
        map.insert(
            "action".to_string(),
            self.state.action_name().map_or(Value::Null, Value::from),
        );
        map.insert("params".to_string(), self.state.params().clone());
        Value::Object(map)
    }

    fn fire(&mut self, name: &str, data: EventData<'_>) -> Verdict {
        match &self.events {
            Some(events) => events.fire(name, &mut self.state, data),
            None => Verdict::Continue,
        }
    }

    /// Run the dispatch loop until no forward is pending.
    ///
    /// Returns the value of the last invoked action (`Null` when nothing ran),
    /// or `Value::Bool(false)` when `dispatch:beforeDispatchLoop` was stopped.
    ///
    /// # Errors
    ///
    /// Any resolution failure or action error that no `dispatch:beforeException`
    /// listener handled.
    pub fn dispatch(&mut self) -> Result<Value, DispatchError> {
        let dispatch_id = DispatchId::new();
        let span = info_span!("dispatch", dispatch_id = %dispatch_id, flavor = F::NAME);
        let _entered = span.enter();

        if self.fire(BEFORE_DISPATCH_LOOP, EventData::None).is_stop() {
            debug!("Dispatch loop vetoed before start");
            return Ok(Value::Bool(false));
        }

        let mut response = Value::Null;
        let mut number_dispatches: u32 = 0;
        self.state.finished = false;

        loop {
            number_dispatches += 1;

            if number_dispatches >= MAX_DISPATCHES {
                let err = DispatchError::cyclic_routing();
                error!(
                    iterations = number_dispatches,
                    handler = ?self.state.handler_name(),
                    action = ?self.state.action_name(),
                    "Cyclic routing detected"
                );
                if self.handle_exception(&err) {
                    break;
                }
                return Err(err);
            }

            self.state.finished = true;
            self.state.resolve_empty_properties();

            let handler_type = self.state.handler_type_name();
            let action_method = self.state.action_method_name();

            debug!(
                iteration = number_dispatches,
                handler_type = %handler_type,
                action_method = %action_method,
                "Dispatch iteration"
            );

            if self.fire(BEFORE_DISPATCH, EventData::None).is_stop() || !self.state.finished {
                if self.state.finished {
                    break;
                }
                continue;
            }

            if !self.container.exists(&handler_type) {
                match self.recover(DispatchError::handler_not_found(&handler_type)) {
                    Recovery::Retry => continue,
                    Recovery::Stop => break,
                    Recovery::Fail(err) => return Err(err),
                }
            }

            if !self.state.has_valid_params() {
                match self.recover(DispatchError::invalid_params()) {
                    Recovery::Retry => continue,
                    Recovery::Stop => break,
                    Recovery::Fail(err) => return Err(err),
                }
            }

            if !self.container.is_callable(&handler_type, &action_method) {
                let verdict = self.fire(BEFORE_NOT_FOUND_ACTION, EventData::None);
                if verdict.is_stop() || !self.state.finished {
                    if self.state.finished {
                        break;
                    }
                    continue;
                }

                match self.recover(DispatchError::action_not_found(&handler_type, &action_method)) {
                    Recovery::Retry => continue,
                    Recovery::Stop => break,
                    Recovery::Fail(err) => return Err(err),
                }
            }

            self.last_handler = Some(handler_type.clone());
            match self
                .container
                .invoke(&handler_type, &action_method, &mut self.state)
            {
                Ok(value) => {
                    self.returned_value = value.clone();
                    response = value;
                }
                Err(source) => {
                    let err = DispatchError::from_action(source);
                    warn!(
                        handler_type = %handler_type,
                        action_method = %action_method,
                        error = %err,
                        "Action failed"
                    );
                    let handled = self.handle_exception(&err);
                    if !handled {
                        return Err(err);
                    }
                    if !self.state.finished {
                        continue;
                    }
                }
            }

            self.fire(AFTER_DISPATCH, EventData::Response(&response));

            if self.state.finished {
                break;
            }
        }

        self.fire(AFTER_DISPATCH_LOOP, EventData::Response(&response));

        info!(
            iterations = number_dispatches,
            handler = ?self.last_handler,
            "Dispatch complete"
        );
        Ok(response)
    }

    fn recover(&mut self, err: DispatchError) -> Recovery {
        let handled = self.handle_exception(&err);
        if !self.state.finished {
            debug!(error = %err, "Failure recovered by forward");
            Recovery::Retry
        } else if handled {
            warn!(error = %err, "Failure handled by listener");
            Recovery::Stop
        } else {
            Recovery::Fail(err)
        }
    }

    /// Offer `err` to the `dispatch:beforeException` listeners.
    ///
    /// Handled when a listener stopped the chain or forwarded. Always `false`
    /// without an events manager.
    pub fn handle_exception(&mut self, err: &DispatchError) -> bool {
        if self.events.is_none() {
            return false;
        }
        let forwards_before = self.state.forward_count();
        let verdict = self.fire(BEFORE_EXCEPTION, EventData::Exception(err));
        verdict.is_stop() || self.state.forward_count() != forwards_before
    }

    /// Re-target the next iteration. See [`Forward`].
    pub fn forward(&mut self, forward: Forward) {
        self.state.forward(forward);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.state.set_default_namespace(namespace);
    }

    #[must_use]
    pub fn default_namespace(&self) -> &str {
        self.state.default_namespace()
    }

    pub fn set_namespace_name(&mut self, namespace: impl Into<String>) {
        self.state.set_namespace_name(namespace);
    }

    #[must_use]
    pub fn namespace_name(&self) -> Option<&str> {
        self.state.namespace_name()
    }

    pub fn set_default_handler(&mut self, handler: impl Into<String>) {
        self.state.set_default_handler(handler);
    }

    pub fn set_default_action(&mut self, action: impl Into<String>) {
        self.state.set_default_action(action);
    }

    pub fn set_handler_name(&mut self, handler: impl Into<String>) {
        self.state.set_handler_name(handler);
    }

    #[must_use]
    pub fn handler_name(&self) -> Option<&str> {
        self.state.handler_name()
    }

    pub fn set_action_name(&mut self, action: impl Into<String>) {
        self.state.set_action_name(action);
    }

    #[must_use]
    pub fn action_name(&self) -> Option<&str> {
        self.state.action_name()
    }

    pub fn set_handler_suffix(&mut self, suffix: impl Into<String>) {
        self.state.set_handler_suffix(suffix);
    }

    pub fn set_action_suffix(&mut self, suffix: impl Into<String>) {
        self.state.set_action_suffix(suffix);
    }

    pub fn set_params(&mut self, params: Value) {
        self.state.set_params(params);
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: Value) {
        self.state.set_param(name, value);
    }

    #[must_use]
    pub fn params(&self) -> &Value {
        self.state.params()
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.state.param(name)
    }

    #[must_use]
    pub fn previous_handler_name(&self) -> Option<&str> {
        self.state.previous_handler_name()
    }

    #[must_use]
    pub fn previous_action_name(&self) -> Option<&str> {
        self.state.previous_action_name()
    }
}
