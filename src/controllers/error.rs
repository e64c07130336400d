use serde_json::{json, Value};

use crate::di::{Action, HandlerDefinition};

/// Target of not-found forwards; reports what was originally asked for.
#[derive(Debug, Default)]
pub struct ErrorController;

impl ErrorController {
    fn show(&mut self, action: &mut Action<'_>) -> anyhow::Result<Value> {
        let message = action.arg_str(0).unwrap_or("Not Found").to_string();
        let state = action.state();
        Ok(json!({
            "error": message,
            "controller": state.previous_handler_name(),
            "action": state.previous_action_name(),
        }))
    }
}

#[must_use]
pub fn definition() -> HandlerDefinition<ErrorController> {
    HandlerDefinition::new("ErrorController", |_| ErrorController)
        .action("showAction", ErrorController::show)
}
