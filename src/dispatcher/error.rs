use std::fmt;

/// Failure category raised by the dispatch loop.
///
/// The numeric codes are stable and exposed through [`DispatchErrorKind::code`]
/// so listeners and callers can branch on them without matching strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchErrorKind {
    /// An error returned by the invoked action itself
    Action,
    /// The loop reached the iteration cap (a forward chain that never settles)
    CyclicRouting,
    /// The resolved handler type is not registered
    HandlerNotFound,
    /// Params are neither a positional array nor a named object
    InvalidParams,
    /// The resolved action method is not callable on the handler
    ActionNotFound,
}

impl DispatchErrorKind {
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            DispatchErrorKind::Action => 0,
            DispatchErrorKind::CyclicRouting => 1,
            DispatchErrorKind::HandlerNotFound => 2,
            DispatchErrorKind::InvalidParams => 3,
            DispatchErrorKind::ActionNotFound => 4,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchErrorKind::Action => "action",
            DispatchErrorKind::CyclicRouting => "cyclic_routing",
            DispatchErrorKind::HandlerNotFound => "handler_not_found",
            DispatchErrorKind::InvalidParams => "invalid_params",
            DispatchErrorKind::ActionNotFound => "action_not_found",
        }
    }
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error surfaced by [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
///
/// Every kind is first offered to the `dispatch:beforeException` listeners;
/// only unhandled ones reach the caller.
#[derive(Debug)]
pub struct DispatchError {
    kind: DispatchErrorKind,
    message: String,
    source: Option<anyhow::Error>,
}

impl DispatchError {
    pub fn new(kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn cyclic_routing() -> Self {
        Self::new(
            DispatchErrorKind::CyclicRouting,
            "Dispatcher has detected a cyclic routing causing stability problems",
        )
    }

    pub(crate) fn handler_not_found(type_name: &str) -> Self {
        Self::new(
            DispatchErrorKind::HandlerNotFound,
            format!("Not Found handler: {type_name}"),
        )
    }

    pub(crate) fn invalid_params() -> Self {
        Self::new(
            DispatchErrorKind::InvalidParams,
            "Action parameters must be an array or a map",
        )
    }

    pub(crate) fn action_not_found(type_name: &str, method: &str) -> Self {
        Self::new(
            DispatchErrorKind::ActionNotFound,
            format!("Not Found Action: {type_name}->{method}"),
        )
    }

    /// Wrap an error returned by an action body.
    pub fn from_action(err: anyhow::Error) -> Self {
        Self {
            kind: DispatchErrorKind::Action,
            message: err.to_string(),
            source: Some(err),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DispatchErrorKind {
        self.kind
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status a web front end should answer with when this error is unhandled.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind {
            DispatchErrorKind::HandlerNotFound | DispatchErrorKind::ActionNotFound => 404,
            DispatchErrorKind::InvalidParams => 400,
            DispatchErrorKind::CyclicRouting | DispatchErrorKind::Action => 500,
        }
    }

    /// The action error this dispatch error wraps, if any.
    #[must_use]
    pub fn action_error(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch error ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| {
            let inner: &(dyn std::error::Error + 'static) = e.as_ref();
            inner
        })
    }
}
