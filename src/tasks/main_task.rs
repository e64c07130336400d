use serde_json::{json, Value};

use crate::di::{Action, HandlerDefinition};
use crate::dispatcher::Forward;

/// Default console task.
#[derive(Debug, Default)]
pub struct MainTask;

impl MainTask {
    fn main(&mut self, _action: &mut Action<'_>) -> anyhow::Result<Value> {
        Ok(Value::String("main task".to_string()))
    }

    /// `hello [name]`; without a name it forwards back to `main`.
    fn hello(&mut self, action: &mut Action<'_>) -> anyhow::Result<Value> {
        match action.arg_str(0) {
            Some(name) => Ok(Value::String(format!("hello {name}"))),
            None => {
                action.forward(Forward::to_action("main"));
                Ok(Value::Null)
            }
        }
    }

    fn args(&mut self, action: &mut Action<'_>) -> anyhow::Result<Value> {
        Ok(json!({ "args": action.args() }))
    }
}

#[must_use]
pub fn definition() -> HandlerDefinition<MainTask> {
    HandlerDefinition::new("MainTask", |_| MainTask)
        .action("mainAction", MainTask::main)
        .action("helloAction", MainTask::hello)
        .action("argsAction", MainTask::args)
}
