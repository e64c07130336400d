//! # Dependency Injection Module
//!
//! The container the dispatcher resolves handlers from.
//!
//! Handlers are registered up front as [`HandlerDefinition`]s: a concrete type
//! name (`UserController`, `app::tasks::MainTask`), a factory, an optional
//! `initialize` hook and a table of action methods (`viewAction`, ...). This
//! registry answers the two questions the dispatch loop asks before invoking
//! anything ([`HandlerResolver`]) and owns the shared handler instances.
//!
//! Named services (`Arc<T>`) are injected explicitly: factories receive the
//! [`Services`] map, and actions reach it through [`Action::service`].
//!
//! ```rust
//! use soli::di::{Action, Container, HandlerDefinition};
//! use serde_json::{json, Value};
//!
//! #[derive(Default)]
//! struct IndexController { hits: u32 }
//!
//! let mut container = Container::new();
//! container.register(
//!     HandlerDefinition::new("IndexController", |_| IndexController::default())
//!         .action("indexAction", |ctl: &mut IndexController, _action: &mut Action<'_>| {
//!             ctl.hits += 1;
//!             Ok(json!({ "hits": ctl.hits }))
//!         }),
//! );
//! assert!(container.has("IndexController"));
//! ```

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use serde_json::Value;
use tracing::debug;

use crate::dispatcher::{DispatchState, Forward};

/// Existence and callability checks the dispatch loop performs before invoking.
pub trait HandlerResolver {
    /// A handler type with this concrete name can be constructed.
    fn exists(&self, type_name: &str) -> bool;
    /// `method` can be invoked on an instance of `type_name`.
    fn is_callable(&self, type_name: &str, method: &str) -> bool;
}

/// Named, shared service instances.
#[derive(Clone, Default)]
pub struct Services {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Services").field("names", &names).finish()
    }
}

impl Services {
    pub fn set<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: T) {
        self.set_arc(name, Arc::new(service));
    }

    pub fn set_arc<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: Arc<T>) {
        self.entries.insert(name.into(), service);
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The service registered under `name`, if it exists and is a `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .get(name)
            .and_then(|service| Arc::clone(service).downcast::<T>().ok())
    }
}

/// Invocation context handed to an action body.
pub struct Action<'a> {
    state: &'a mut DispatchState,
    services: &'a Services,
}

impl<'a> Action<'a> {
    pub(crate) fn new(state: &'a mut DispatchState, services: &'a Services) -> Self {
        Self { state, services }
    }

    /// Positional params, including the indexed entries of a named map.
    #[must_use]
    pub fn args(&self) -> Vec<&Value> {
        self.state.positional_params()
    }

    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.state.param(&index.to_string())
    }

    #[must_use]
    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(Value::as_str)
    }

    /// Named param (positional params answer to their index).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.state.param(name)
    }

    #[must_use]
    pub fn params(&self) -> &Value {
        self.state.params()
    }

    /// Re-target the next loop iteration; takes effect once this action returns.
    pub fn forward(&mut self, forward: Forward) {
        self.state.forward(forward);
    }

    #[must_use]
    pub fn state(&self) -> &DispatchState {
        &*self.state
    }

    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services.get(name)
    }
}

type Factory<H> = Box<dyn Fn(&Services) -> H + Send + Sync>;
type Initializer<H> = Box<dyn Fn(&mut H) + Send + Sync>;
type ActionFn<H> = Box<dyn Fn(&mut H, &mut Action<'_>) -> anyhow::Result<Value> + Send + Sync>;

/// Registration of one concrete handler type and its actions.
pub struct HandlerDefinition<H> {
    type_name: String,
    factory: Factory<H>,
    initialize: Option<Initializer<H>>,
    actions: HashMap<String, ActionFn<H>>,
}

impl<H: Send + 'static> HandlerDefinition<H> {
    pub fn new<F>(type_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Services) -> H + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            factory: Box::new(factory),
            initialize: None,
            actions: HashMap::new(),
        }
    }

    /// Hook run on the shared instance before every action invocation.
    #[must_use]
    pub fn on_initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        self.initialize = Some(Box::new(hook));
        self
    }

    /// Register an action under its full method name (`viewAction`).
    #[must_use]
    pub fn action<F>(mut self, method: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut H, &mut Action<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.actions.insert(method.into(), Box::new(body));
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Object-safe view of a `HandlerDefinition<H>` so the container can hold any `H`.
trait ErasedDefinition: Send + Sync {
    fn has_action(&self, method: &str) -> bool;
    fn action_names(&self) -> Vec<String>;
    fn construct(&self, services: &Services) -> Box<dyn Any + Send>;
    fn initialize(&self, instance: &mut (dyn Any + Send));
    fn invoke(
        &self,
        instance: &mut (dyn Any + Send),
        method: &str,
        action: &mut Action<'_>,
    ) -> anyhow::Result<Value>;
}

impl<H: Send + 'static> ErasedDefinition for HandlerDefinition<H> {
    fn has_action(&self, method: &str) -> bool {
        self.actions.contains_key(method)
    }

    fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn construct(&self, services: &Services) -> Box<dyn Any + Send> {
        Box::new((self.factory)(services))
    }

    fn initialize(&self, instance: &mut (dyn Any + Send)) {
        if let (Some(hook), Some(handler)) = (&self.initialize, instance.downcast_mut::<H>()) {
            hook(handler);
        }
    }

    fn invoke(
        &self,
        instance: &mut (dyn Any + Send),
        method: &str,
        action: &mut Action<'_>,
    ) -> anyhow::Result<Value> {
        let body = self
            .actions
            .get(method)
            .ok_or_else(|| anyhow!("action {method} is not registered on {}", self.type_name))?;
        let handler = instance
            .downcast_mut::<H>()
            .ok_or_else(|| anyhow!("shared instance of {} has an unexpected type", self.type_name))?;
        body(handler, action)
    }
}

/// Handler definitions, their shared instances, and named services.
#[derive(Default)]
pub struct Container {
    definitions: HashMap<String, Box<dyn ErasedDefinition>>,
    instances: HashMap<String, Box<dyn Any + Send>>,
    services: Services,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("handlers", &self.handler_names())
            .field("instances", &self.instances.len())
            .field("services", &self.services)
            .finish()
    }
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler type. A definition with the same name is replaced
    /// and any cached instance of it dropped.
    pub fn register<H: Send + 'static>(&mut self, definition: HandlerDefinition<H>) {
        let type_name = definition.type_name.clone();
        if self.instances.remove(&type_name).is_some() {
            debug!(type_name = %type_name, "Dropped shared instance of replaced handler");
        }
        debug!(
            type_name = %type_name,
            actions = definition.actions.len(),
            "Handler registered"
        );
        self.definitions.insert(type_name, Box::new(definition));
    }

    /// A handler definition or a service is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.definitions.contains_key(name) || self.services.has(name)
    }

    /// Sorted concrete names of every registered handler.
    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Sorted method names registered on `type_name`.
    #[must_use]
    pub fn action_names(&self, type_name: &str) -> Vec<String> {
        self.definitions
            .get(type_name)
            .map(|def| def.action_names())
            .unwrap_or_default()
    }

    /// Shared instance of `type_name`, constructed on first use.
    ///
    /// `None` when the type is unknown or is not an `H`.
    pub fn get_shared<H: Send + 'static>(&mut self, type_name: &str) -> Option<&mut H> {
        let instance = self.shared_instance(type_name)?;
        instance.downcast_mut::<H>()
    }

    /// Drop every cached handler instance; the next lookup constructs afresh.
    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }

    pub fn set_service<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: T) {
        self.services.set(name, service);
    }

    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services.get(name)
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    fn shared_instance(&mut self, type_name: &str) -> Option<&mut (dyn Any + Send)> {
        let definition = self.definitions.get(type_name)?;
        Some(Self::cached_or_construct(
            &mut self.instances,
            &**definition,
            &self.services,
            type_name,
        ))
    }

    /// Cached instance of `type_name`, constructing it from `definition` on first use.
    fn cached_or_construct<'c>(
        instances: &'c mut HashMap<String, Box<dyn Any + Send>>,
        definition: &dyn ErasedDefinition,
        services: &Services,
        type_name: &str,
    ) -> &'c mut (dyn Any + Send) {
        let instance = match instances.entry(type_name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(type_name = %type_name, "Constructing shared handler instance");
                entry.insert(definition.construct(services))
            }
        };
        &mut **instance
    }

    /// Resolve the shared instance, run its `initialize` hook, then call `method`.
    pub(crate) fn invoke(
        &mut self,
        type_name: &str,
        method: &str,
        state: &mut DispatchState,
    ) -> anyhow::Result<Value> {
        let definition = self
            .definitions
            .get(type_name)
            .ok_or_else(|| anyhow!("handler {type_name} is not registered"))?;
        let instance = Self::cached_or_construct(
            &mut self.instances,
            &**definition,
            &self.services,
            type_name,
        );

        definition.initialize(instance);

        let mut action = Action::new(state, &self.services);
        definition.invoke(instance, method, &mut action)
    }
}

impl HandlerResolver for Container {
    fn exists(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }

    fn is_callable(&self, type_name: &str, method: &str) -> bool {
        self.definitions
            .get(type_name)
            .is_some_and(|def| def.has_action(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Counter {
        initialized: u32,
        calls: u32,
        prefix: String,
    }

    fn counter_definition() -> HandlerDefinition<Counter> {
        HandlerDefinition::new("CounterController", |services: &Services| Counter {
            initialized: 0,
            calls: 0,
            prefix: services
                .get::<String>("prefix")
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        })
        .on_initialize(|c: &mut Counter| c.initialized += 1)
        .action("bumpAction", |c: &mut Counter, action: &mut Action<'_>| {
            c.calls += 1;
            let by = action.arg(0).and_then(Value::as_u64).unwrap_or(1);
            Ok(json!({ "calls": c.calls, "by": by, "prefix": c.prefix }))
        })
        .action("failAction", |_c: &mut Counter, _action: &mut Action<'_>| {
            Err(anyhow!("boom"))
        })
    }

    #[test]
    fn test_resolver_predicates() {
        let mut container = Container::new();
        container.register(counter_definition());
        assert!(container.exists("CounterController"));
        assert!(!container.exists("MissingController"));
        assert!(container.is_callable("CounterController", "bumpAction"));
        assert!(!container.is_callable("CounterController", "nopeAction"));
        assert!(!container.is_callable("MissingController", "bumpAction"));
        assert_eq!(
            container.action_names("CounterController"),
            vec!["bumpAction".to_string(), "failAction".to_string()]
        );
    }

    #[test]
    fn test_invoke_shares_instance_and_runs_initialize() {
        let mut container = Container::new();
        container.set_service("prefix", "svc".to_string());
        container.register(counter_definition());

        let mut state = DispatchState::new("index", "index", "Controller");
        state.set_params(json!([5]));

        let first = container
            .invoke("CounterController", "bumpAction", &mut state)
            .unwrap();
        let second = container
            .invoke("CounterController", "bumpAction", &mut state)
            .unwrap();
        assert_eq!(first, json!({"calls": 1, "by": 5, "prefix": "svc"}));
        assert_eq!(second["calls"], json!(2));

        let shared = container.get_shared::<Counter>("CounterController").unwrap();
        assert_eq!(shared.initialized, 2);
    }

    #[test]
    fn test_action_errors_are_returned() {
        let mut container = Container::new();
        container.register(counter_definition());
        let mut state = DispatchState::new("index", "index", "Controller");
        let err = container
            .invoke("CounterController", "failAction", &mut state)
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_get_shared_and_invoke_use_one_instance() {
        let mut container = Container::new();
        container.register(counter_definition());
        container.get_shared::<Counter>("CounterController").unwrap().calls = 10;

        let mut state = DispatchState::new("index", "index", "Controller");
        let value = container
            .invoke("CounterController", "bumpAction", &mut state)
            .unwrap();
        assert_eq!(value["calls"], json!(11));
        assert_eq!(
            container.get_shared::<Counter>("CounterController").unwrap().calls,
            11
        );
    }

    #[test]
    fn test_get_shared_with_wrong_type_is_none() {
        let mut container = Container::new();
        container.register(counter_definition());
        assert!(container.get_shared::<String>("CounterController").is_none());
        assert!(container.get_shared::<Counter>("Missing").is_none());
    }

    #[test]
    fn test_reregistering_drops_cached_instance() {
        let mut container = Container::new();
        container.register(counter_definition());
        container.get_shared::<Counter>("CounterController").unwrap().calls = 9;
        container.register(counter_definition());
        assert_eq!(
            container.get_shared::<Counter>("CounterController").unwrap().calls,
            0
        );
    }

    #[test]
    fn test_services_are_typed() {
        let mut services = Services::default();
        services.set("answer", 42_u32);
        assert_eq!(services.get::<u32>("answer").as_deref(), Some(&42));
        assert!(services.get::<String>("answer").is_none());
        assert!(!services.has("missing"));
    }

    #[test]
    fn test_action_forward_marks_state() {
        let mut container = Container::new();
        container.register(
            HandlerDefinition::new("HopController", |_| ()).action(
                "aAction",
                |_h: &mut (), action: &mut Action<'_>| {
                    action.forward(Forward::to_action("b"));
                    Ok(Value::Null)
                },
            ),
        );
        let mut state = DispatchState::new("hop", "a", "Controller");
        state.set_action_name("a");
        container.invoke("HopController", "aAction", &mut state).unwrap();
        assert!(!state.is_finished());
        assert_eq!(state.action_name(), Some("b"));
    }
}
