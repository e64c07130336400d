//! Application configuration file (YAML or TOML).
//!
//! ```yaml
//! dispatcher:
//!   default_namespace: ""
//!   controller_suffix: Controller
//! routes:
//!   - { method: GET, path: "/users/{id}", controller: user, action: view }
//! logging:
//!   level: info
//!   format: pretty
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dispatcher::{Command, Dispatcher, Request};
use crate::logging::{LogConfig, LoggingSection};
use crate::router::Router;

/// Naming conventions applied to both dispatcher flavors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub default_namespace: String,
    pub controller_suffix: String,
    pub task_suffix: String,
    pub action_suffix: String,
    pub default_controller: String,
    pub default_task: String,
    pub default_action: Option<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_namespace: String::new(),
            controller_suffix: "Controller".to_string(),
            task_suffix: "Task".to_string(),
            action_suffix: "Action".to_string(),
            default_controller: "index".to_string(),
            default_task: "main".to_string(),
            default_action: None,
        }
    }
}

impl DispatcherConfig {
    pub fn apply_request(&self, dispatcher: &mut Dispatcher<Request>) {
        dispatcher.set_default_namespace(self.default_namespace.as_str());
        dispatcher.set_controller_suffix(self.controller_suffix.as_str());
        dispatcher.set_action_suffix(self.action_suffix.as_str());
        dispatcher.set_default_controller(self.default_controller.as_str());
        if let Some(action) = &self.default_action {
            dispatcher.set_default_action(action.as_str());
        }
    }

    pub fn apply_command(&self, dispatcher: &mut Dispatcher<Command>) {
        dispatcher.set_default_namespace(self.default_namespace.as_str());
        dispatcher.set_task_suffix(self.task_suffix.as_str());
        dispatcher.set_action_suffix(self.action_suffix.as_str());
        dispatcher.set_default_task(self.default_task.as_str());
        if let Some(action) = &self.default_action {
            dispatcher.set_default_action(action.as_str());
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// One static route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    pub controller: String,
    pub action: String,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dispatcher: DispatcherConfig,
    pub routes: Vec<RouteConfig>,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Compile the route table.
    ///
    /// # Errors
    ///
    /// An unknown HTTP method or a pattern that does not compile.
    pub fn build_router(&self) -> Result<Router> {
        let mut router = Router::new();
        for route in &self.routes {
            let method = Method::from_bytes(route.method.to_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method '{}'", route.method))?;
            router
                .add(method, &route.path, route.controller.as_str(), route.action.as_str())
                .with_context(|| format!("invalid route pattern '{}'", route.path))?;
        }
        info!(routes_count = router.routes().len(), "Routing table loaded");
        Ok(router)
    }

    /// Logging settings with `SOLI_LOG_*` environment overrides applied.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_sources(&self.logging, |key| std::env::var(key).ok())
    }
}

/// Load configuration from `path`. YAML (`.yaml`/`.yml`) and TOML (`.toml`) are
/// supported; a missing file yields the defaults.
///
/// # Errors
///
/// Unreadable or unparseable files, or an unsupported extension.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let config: AppConfig = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML config {}", path.display()))?,
        "toml" => toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML config {}", path.display()))?,
        other => bail!(
            "unsupported config format '{other}' for {} (expected yaml, yml or toml)",
            path.display()
        ),
    };

    debug!(
        path = %path.display(),
        routes = config.routes.len(),
        "Config loaded"
    );
    Ok(config)
}
