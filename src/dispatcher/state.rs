use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Re-target request for the *next* loop iteration.
///
/// Every field is optional; only the present ones overwrite the dispatch
/// state. The handler field accepts either `controller` or `task` when
/// deserialized, matching the flavor that issued it.
///
/// ```
/// use soli::dispatcher::Forward;
/// use serde_json::json;
///
/// let fwd = Forward::to("error", "show").with_params(json!(["missing"]));
/// assert_eq!(fwd.handler.as_deref(), Some("error"));
///
/// let fwd: Forward = serde_json::from_value(json!({"task": "main", "action": "hello"})).unwrap();
/// assert_eq!(fwd.handler.as_deref(), Some("main"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forward {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(
        default,
        alias = "controller",
        alias = "task",
        skip_serializing_if = "Option::is_none"
    )]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Forward {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward to `handler`/`action`.
    pub fn to(handler: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            handler: Some(handler.into()),
            action: Some(action.into()),
            ..Self::default()
        }
    }

    /// Forward to another action on the current handler.
    pub fn to_action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    /// Forward to another handler, keeping the current action.
    pub fn to_handler(handler: impl Into<String>) -> Self {
        Self {
            handler: Some(handler.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// Upper-case the first character only (`user_profile` -> `User_profile`).
pub(crate) fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Mutable record driving one dispatcher.
///
/// It persists across forwards within one `dispatch()` call and across calls;
/// callers reusing a dispatcher for an unrelated request must call
/// [`DispatchState::reset`] (or set handler/action/params explicitly) first.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchState {
    namespace: Option<String>,
    handler_name: Option<String>,
    action_name: Option<String>,
    params: Value,

    previous_handler_name: Option<String>,
    previous_action_name: Option<String>,

    pub(crate) finished: bool,
    forwards: u64,

    default_namespace: String,
    default_handler: String,
    default_action: String,

    handler_suffix: String,
    action_suffix: String,
}

impl DispatchState {
    pub fn new(
        default_handler: impl Into<String>,
        default_action: impl Into<String>,
        handler_suffix: impl Into<String>,
    ) -> Self {
        Self {
            namespace: None,
            handler_name: None,
            action_name: None,
            params: Value::Array(Vec::new()),
            previous_handler_name: None,
            previous_action_name: None,
            finished: false,
            forwards: 0,
            default_namespace: String::new(),
            default_handler: default_handler.into(),
            default_action: default_action.into(),
            handler_suffix: handler_suffix.into(),
            action_suffix: "Action".to_string(),
        }
    }

    /// Re-target the next loop iteration. See [`Forward`].
    pub fn forward(&mut self, forward: Forward) {
        let Forward {
            namespace,
            handler,
            action,
            params,
        } = forward;

        if let Some(namespace) = namespace {
            self.namespace = Some(namespace);
        }
        if let Some(handler) = handler {
            self.previous_handler_name = self.handler_name.take();
            self.handler_name = Some(handler);
        }
        if let Some(action) = action {
            self.previous_action_name = self.action_name.take();
            self.action_name = Some(action);
        }
        if let Some(params) = params {
            self.set_params(params);
        }

        self.finished = false;
        self.forwards += 1;
    }

    /// Clear handler/action/params and the forward history, keeping defaults and suffixes.
    pub fn reset(&mut self) {
        self.namespace = None;
        self.handler_name = None;
        self.action_name = None;
        self.params = Value::Array(Vec::new());
        self.previous_handler_name = None;
        self.previous_action_name = None;
        self.finished = false;
    }

    /// `false` while a forward is pending.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total forwards issued on this state; used to tell whether a listener forwarded.
    #[must_use]
    pub(crate) fn forward_count(&self) -> u64 {
        self.forwards
    }

    pub(crate) fn resolve_empty_properties(&mut self) {
        if is_blank(&self.namespace) {
            self.namespace = Some(self.default_namespace.clone());
        }
        if is_blank(&self.handler_name) {
            self.handler_name = Some(self.default_handler.clone());
        }
        if is_blank(&self.action_name) {
            self.action_name = Some(self.default_action.clone());
        }
    }

    /// Namespace used for lookup with separators trimmed, or `""` when none applies.
    #[must_use]
    pub fn resolved_namespace(&self) -> String {
        let raw = match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => self.default_namespace.as_str(),
        };
        raw.trim_matches(|c| c == ':' || c == '\\').to_string()
    }

    /// Concrete handler type name, e.g. `app::controllers::UserController`.
    #[must_use]
    pub fn handler_type_name(&self) -> String {
        let handler = ucfirst(self.handler_name.as_deref().unwrap_or_default());
        let namespace = self.resolved_namespace();
        if namespace.is_empty() {
            format!("{handler}{}", self.handler_suffix)
        } else {
            format!("{namespace}::{handler}{}", self.handler_suffix)
        }
    }

    /// Concrete action method name, e.g. `viewAction`.
    #[must_use]
    pub fn action_method_name(&self) -> String {
        format!(
            "{}{}",
            self.action_name.as_deref().unwrap_or_default(),
            self.action_suffix
        )
    }

    /// Params can be handed to an action: a positional array or a named map.
    #[must_use]
    pub fn has_valid_params(&self) -> bool {
        self.params.is_array() || self.params.is_object()
    }

    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = namespace.into();
    }

    #[must_use]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn set_namespace_name(&mut self, namespace: impl Into<String>) {
        self.namespace = Some(namespace.into());
    }

    #[must_use]
    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_default_handler(&mut self, handler: impl Into<String>) {
        self.default_handler = handler.into();
    }

    #[must_use]
    pub fn default_handler(&self) -> &str {
        &self.default_handler
    }

    pub fn set_default_action(&mut self, action: impl Into<String>) {
        self.default_action = action.into();
    }

    #[must_use]
    pub fn default_action(&self) -> &str {
        &self.default_action
    }

    pub fn set_handler_name(&mut self, handler: impl Into<String>) {
        self.handler_name = Some(handler.into());
    }

    #[must_use]
    pub fn handler_name(&self) -> Option<&str> {
        self.handler_name.as_deref()
    }

    pub fn set_action_name(&mut self, action: impl Into<String>) {
        self.action_name = Some(action.into());
    }

    #[must_use]
    pub fn action_name(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    pub fn set_handler_suffix(&mut self, suffix: impl Into<String>) {
        self.handler_suffix = suffix.into();
    }

    #[must_use]
    pub fn handler_suffix(&self) -> &str {
        &self.handler_suffix
    }

    pub fn set_action_suffix(&mut self, suffix: impl Into<String>) {
        self.action_suffix = suffix.into();
    }

    #[must_use]
    pub fn action_suffix(&self) -> &str {
        &self.action_suffix
    }

    /// Bulk-replace the params. `Null` resets them to an empty array; any
    /// other non-array value is kept as-is and rejected at invocation time.
    pub fn set_params(&mut self, params: Value) {
        self.params = match params {
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };
    }

    /// Set one named param. Positional params are re-keyed by index first,
    /// anything else is replaced by a fresh map.
    pub fn set_param(&mut self, name: impl Into<String>, value: Value) {
        if !self.params.is_object() {
            let map = match std::mem::take(&mut self.params) {
                Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| (idx.to_string(), item))
                    .collect(),
                _ => Map::new(),
            };
            self.params = Value::Object(map);
        }
        if let Value::Object(map) = &mut self.params {
            map.insert(name.into(), value);
        }
    }

    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Look up one param by name; positional params answer to their index.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        match &self.params {
            Value::Object(map) => map.get(name),
            Value::Array(items) => name.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => None,
        }
    }

    /// Params that can be passed by position, in index order.
    ///
    /// A named map keeps the integer keys `set_param` re-keyed positional
    /// params under, so those still count.
    #[must_use]
    pub fn positional_params(&self) -> Vec<&Value> {
        match &self.params {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => {
                let mut indexed: Vec<(usize, &Value)> = map
                    .iter()
                    .filter_map(|(key, value)| key.parse::<usize>().ok().map(|idx| (idx, value)))
                    .collect();
                indexed.sort_unstable_by_key(|(idx, _)| *idx);
                indexed.into_iter().map(|(_, value)| value).collect()
            }
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn previous_handler_name(&self) -> Option<&str> {
        self.previous_handler_name.as_deref()
    }

    #[must_use]
    pub fn previous_action_name(&self) -> Option<&str> {
        self.previous_action_name.as_deref()
    }
}
