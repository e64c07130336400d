use serde_json::{json, Value};

use crate::di::{Action, HandlerDefinition};

/// Landing page controller.
#[derive(Debug, Default)]
pub struct IndexController {
    visits: u64,
}

impl IndexController {
    fn index(&mut self, _action: &mut Action<'_>) -> anyhow::Result<Value> {
        self.visits += 1;
        Ok(json!({ "name": "Soli", "visits": self.visits }))
    }

    fn test(&mut self, _action: &mut Action<'_>) -> anyhow::Result<Value> {
        Ok(Value::String("test string.".to_string()))
    }

    fn not_found(&mut self, action: &mut Action<'_>) -> anyhow::Result<Value> {
        let path = action
            .args()
            .into_iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("/");
        Ok(json!({ "error": "not found", "path": path }))
    }
}

#[must_use]
pub fn definition() -> HandlerDefinition<IndexController> {
    HandlerDefinition::new("IndexController", |_| IndexController::default())
        .action("indexAction", IndexController::index)
        .action("testAction", IndexController::test)
        .action("notFoundAction", IndexController::not_found)
}
