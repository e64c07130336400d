use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info_span};

use crate::config::AppConfig;
use crate::di::Container;
use crate::dispatcher::{Command, DispatchError, DispatchState, Dispatcher};
use crate::events::{EventData, EventsManager, APPLICATION_BOOT};
use crate::router::split_args;

/// Console entry point: argv in, the task's return value out.
#[derive(Debug)]
pub struct Console {
    dispatcher: Dispatcher<Command>,
}

impl Console {
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            dispatcher: Dispatcher::new(container),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig, container: Container) -> Self {
        let mut console = Self::new(container);
        config.dispatcher.apply_command(&mut console.dispatcher);
        console
    }

    /// Listeners for `application:boot` and the `dispatch:*` events.
    pub fn set_events_manager(&mut self, events: Arc<EventsManager<DispatchState>>) {
        self.dispatcher.set_events_manager(events);
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<Command> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<Command> {
        &mut self.dispatcher
    }

    /// Route `args` (`[task, action, params...]`) and dispatch.
    ///
    /// # Errors
    ///
    /// Dispatch errors nobody handled.
    pub fn handle<S: AsRef<str>>(&mut self, args: &[S]) -> Result<Value, DispatchError> {
        let span = info_span!("command", argc = args.len());
        let _entered = span.enter();

        self.dispatcher.reset();
        if let Some(events) = self.dispatcher.events_manager().cloned() {
            events.fire(APPLICATION_BOOT, self.dispatcher.state_mut(), EventData::None);
        }

        let target = split_args(args);
        debug!(target = ?target, "Command routed");
        target.apply(&mut self.dispatcher);

        self.dispatcher.dispatch()
    }
}
