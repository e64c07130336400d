//! # Events Module
//!
//! Named lifecycle events with listeners that can veto continuation or mutate
//! the source they are fired against.
//!
//! Event names are `namespace:kind` (e.g. `dispatch:beforeDispatch`). A
//! listener attached to the full name only hears that event; a listener
//! attached to the namespace (`dispatch`) hears every event in it.
//!
//! Listeners run in attach order, exact-name listeners before namespace
//! listeners. The first one returning [`Verdict::Stop`] halts the chain and the
//! stop is reported back to the code that fired the event.
//!
//! ```rust
//! use soli::events::{EventsManager, Verdict};
//!
//! let mut events: EventsManager<Vec<String>> = EventsManager::new();
//! events.attach("app", |event: &soli::events::Event<'_>, seen: &mut Vec<String>| {
//!     seen.push(event.name().to_string());
//!     Verdict::Continue
//! });
//!
//! let mut seen = Vec::new();
//! events.fire("app:boot", &mut seen, soli::events::EventData::None);
//! assert_eq!(seen, vec!["app:boot".to_string()]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::dispatcher::DispatchError;

pub const BEFORE_DISPATCH_LOOP: &str = "dispatch:beforeDispatchLoop";
pub const BEFORE_DISPATCH: &str = "dispatch:beforeDispatch";
pub const BEFORE_NOT_FOUND_ACTION: &str = "dispatch:beforeNotFoundAction";
pub const AFTER_DISPATCH: &str = "dispatch:afterDispatch";
pub const AFTER_DISPATCH_LOOP: &str = "dispatch:afterDispatchLoop";
pub const BEFORE_EXCEPTION: &str = "dispatch:beforeException";

pub const APPLICATION_BOOT: &str = "application:boot";
pub const APPLICATION_BEFORE_SEND_RESPONSE: &str = "application:beforeSendResponse";

/// What a listener wants the firing code to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Continue,
    /// Veto; for `dispatch:beforeException` this marks the error as handled
    Stop,
}

impl Verdict {
    #[must_use]
    pub fn is_stop(self) -> bool {
        matches!(self, Verdict::Stop)
    }
}

/// Extra data carried alongside an event.
#[derive(Debug, Clone, Copy)]
pub enum EventData<'a> {
    None,
    Response(&'a Value),
    Exception(&'a DispatchError),
}

/// An event as seen by a listener.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    name: &'a str,
    data: EventData<'a>,
}

impl<'a> Event<'a> {
    #[must_use]
    pub fn new(name: &'a str, data: EventData<'a>) -> Self {
        Self { name, data }
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Part before the `:` (the whole name when there is none).
    #[must_use]
    pub fn namespace(&self) -> &'a str {
        self.name.split_once(':').map_or(self.name, |(ns, _)| ns)
    }

    /// Part after the `:`.
    #[must_use]
    pub fn kind(&self) -> &'a str {
        self.name.split_once(':').map_or("", |(_, kind)| kind)
    }

    #[must_use]
    pub fn data(&self) -> EventData<'a> {
        self.data
    }

    #[must_use]
    pub fn response(&self) -> Option<&'a Value> {
        match self.data {
            EventData::Response(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn exception(&self) -> Option<&'a DispatchError> {
        match self.data {
            EventData::Exception(err) => Some(err),
            _ => None,
        }
    }
}

/// Something that reacts to events fired against a source of type `S`.
pub trait Listener<S>: Send + Sync {
    fn handle(&self, event: &Event<'_>, source: &mut S) -> Verdict;
}

impl<S, F> Listener<S> for F
where
    F: Fn(&Event<'_>, &mut S) -> Verdict + Send + Sync,
{
    fn handle(&self, event: &Event<'_>, source: &mut S) -> Verdict {
        self(event, source)
    }
}

/// Registry of listeners keyed by event name or namespace.
pub struct EventsManager<S> {
    listeners: HashMap<String, Vec<Arc<dyn Listener<S>>>>,
}

impl<S> Default for EventsManager<S> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<S> Clone for EventsManager<S> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<S> fmt::Debug for EventsManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventsManager")
            .field("listeners", &counts)
            .finish()
    }
}

impl<S> EventsManager<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener to a full event name or to a namespace.
    pub fn attach<L>(&mut self, event_type: impl Into<String>, listener: L)
    where
        L: Listener<S> + 'static,
    {
        self.attach_arc(event_type, Arc::new(listener));
    }

    pub fn attach_arc(&mut self, event_type: impl Into<String>, listener: Arc<dyn Listener<S>>) {
        let event_type = event_type.into();
        debug!(event_type = %event_type, "Listener attached");
        self.listeners.entry(event_type).or_default().push(listener);
    }

    /// Remove every listener attached to `event_type`.
    pub fn detach_all(&mut self, event_type: &str) {
        self.listeners.remove(event_type);
    }

    #[must_use]
    pub fn has_listeners(&self, event_type: &str) -> bool {
        self.listeners
            .get(event_type)
            .is_some_and(|list| !list.is_empty())
    }

    /// Fire `name` against `source`. Returns [`Verdict::Stop`] as soon as a
    /// listener stops the chain, [`Verdict::Continue`] otherwise (including
    /// when nobody listens).
    pub fn fire(&self, name: &str, source: &mut S, data: EventData<'_>) -> Verdict {
        let event = Event::new(name, data);
        let namespace = event.namespace();

        let exact = self.listeners.get(name).into_iter().flatten();
        let scoped = if namespace != name {
            self.listeners.get(namespace)
        } else {
            None
        };

        for listener in exact.chain(scoped.into_iter().flatten()) {
            if listener.handle(&event, source).is_stop() {
                debug!(event = %name, "Event propagation stopped by listener");
                return Verdict::Stop;
            }
        }

        trace!(event = %name, "Event fired");
        Verdict::Continue
    }
}
