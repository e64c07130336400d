use serde_json::Value;

use super::core::Dispatcher;

/// Compile-time configuration of a dispatcher flavor.
///
/// The loop is identical for both flavors; only naming conventions differ.
pub trait Flavor: Send + Sync + 'static {
    /// Short name recorded on the dispatch span (`request` / `command`)
    const NAME: &'static str;
    /// Appended to the upper-cased handler name to form the type name
    const HANDLER_SUFFIX: &'static str;
    const DEFAULT_HANDLER: &'static str;
    const DEFAULT_ACTION: &'static str;
    /// Key naming the handler in a serialized forward (`controller` / `task`)
    const HANDLER_KEY: &'static str;
}

/// Web flavor: `IndexController::indexAction` by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Request;

/// Console flavor: `MainTask::mainAction` by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Command;

impl Flavor for Request {
    const NAME: &'static str = "request";
    const HANDLER_SUFFIX: &'static str = "Controller";
    const DEFAULT_HANDLER: &'static str = "index";
    const DEFAULT_ACTION: &'static str = "index";
    const HANDLER_KEY: &'static str = "controller";
}

impl Flavor for Command {
    const NAME: &'static str = "command";
    const HANDLER_SUFFIX: &'static str = "Task";
    const DEFAULT_HANDLER: &'static str = "main";
    const DEFAULT_ACTION: &'static str = "main";
    const HANDLER_KEY: &'static str = "task";
}

impl Dispatcher<Request> {
    pub fn set_controller_name(&mut self, controller: impl Into<String>) {
        self.set_handler_name(controller);
    }

    #[must_use]
    pub fn controller_name(&self) -> Option<&str> {
        self.handler_name()
    }

    pub fn set_default_controller(&mut self, controller: impl Into<String>) {
        self.set_default_handler(controller);
    }

    #[must_use]
    pub fn previous_controller_name(&self) -> Option<&str> {
        self.previous_handler_name()
    }

    pub fn set_controller_suffix(&mut self, suffix: impl Into<String>) {
        self.set_handler_suffix(suffix);
    }
}

impl Dispatcher<Command> {
    pub fn set_task_name(&mut self, task: impl Into<String>) {
        self.set_handler_name(task);
    }

    #[must_use]
    pub fn task_name(&self) -> Option<&str> {
        self.handler_name()
    }

    pub fn set_default_task(&mut self, task: impl Into<String>) {
        self.set_default_handler(task);
    }

    #[must_use]
    pub fn previous_task_name(&self) -> Option<&str> {
        self.previous_handler_name()
    }

    pub fn set_task_suffix(&mut self, suffix: impl Into<String>) {
        self.set_handler_suffix(suffix);
    }

    /// Positional params as strings, the way argv arrived.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        self.state()
            .positional_params()
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}
