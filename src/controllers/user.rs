use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::di::{Action, HandlerDefinition};

pub const USER_SERVICE: &str = "userService";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

/// In-memory user store shared through the container.
#[derive(Debug, Default)]
pub struct UserService {
    users: RwLock<BTreeMap<u64, User>>,
}

impl UserService {
    #[must_use]
    pub fn with_users<I>(users: I) -> Self
    where
        I: IntoIterator<Item = User>,
    {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub fn find_by_id(&self, id: u64) -> anyhow::Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow!("user store lock poisoned"))?;
        Ok(users.get(&id).cloned())
    }

    pub fn register(&self, username: &str) -> anyhow::Result<User> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("user store lock poisoned"))?;
        let id = users.keys().next_back().map_or(1, |last| last + 1);
        let user = User {
            id,
            username: username.to_string(),
        };
        users.insert(id, user.clone());
        Ok(user)
    }
}

#[derive(Debug)]
pub struct UserController {
    users: Option<Arc<UserService>>,
}

impl UserController {
    fn service(&self) -> anyhow::Result<&UserService> {
        self.users
            .as_deref()
            .ok_or_else(|| anyhow!("service '{USER_SERVICE}' is not registered"))
    }

    fn view(&mut self, action: &mut Action<'_>) -> anyhow::Result<Value> {
        let raw = action
            .arg(0)
            .or_else(|| action.param("id"))
            .ok_or_else(|| anyhow!("missing user id"))?;
        let id = match raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .with_context(|| format!("invalid user id {raw}"))?;

        let user = self
            .service()?
            .find_by_id(id)?
            .ok_or_else(|| anyhow!("user {id} not found"))?;
        Ok(serde_json::to_value(user)?)
    }

    fn register(&mut self, action: &mut Action<'_>) -> anyhow::Result<Value> {
        let username = action.arg_str(0).unwrap_or("wukong").to_string();
        let user = self.service()?.register(&username)?;
        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(Value::String("registration success!".to_string()))
    }
}

#[must_use]
pub fn definition() -> HandlerDefinition<UserController> {
    HandlerDefinition::new("UserController", |services| UserController {
        users: services.get::<UserService>(USER_SERVICE),
    })
    .action("viewAction", UserController::view)
    .action("registerAction", UserController::register)
}
