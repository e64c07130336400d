//! # soli
//!
//! **soli** is a small MVC dispatch core: it resolves a `handler + action +
//! params` triple to a registered action, runs it, and lets event listeners or
//! the action itself forward execution somewhere else within the same call.
//!
//! ## Architecture
//!
//! - **[`dispatcher`]** - the dispatch loop, its state, errors and the
//!   request/command flavors
//! - **[`di`]** - container of handler definitions, shared instances and
//!   named services
//! - **[`events`]** - named lifecycle events with vetoing listeners
//! - **[`router`]** - URI / argv to handler, action and params
//! - **[`application`]** - web and console shells around the dispatcher
//! - **[`config`]** - YAML/TOML configuration
//! - **[`logging`]** - tracing subscriber setup
//! - **[`cli`]** - the `soli` binary's command line
//!
//! ### Dispatch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App as Application
//!     participant Router
//!     participant Dispatcher
//!     participant Events as EventsManager
//!     participant Container
//!
//!     App->>Router: route(GET, "/user/view/7")
//!     Router-->>App: user / view / ["7"]
//!     App->>Dispatcher: dispatch()
//!     Dispatcher->>Events: dispatch:beforeDispatchLoop
//!     loop until no forward is pending (max 256)
//!         Dispatcher->>Events: dispatch:beforeDispatch
//!         Dispatcher->>Container: exists(UserController)?
//!         Dispatcher->>Container: is_callable(viewAction)?
//!         Dispatcher->>Container: invoke(UserController, viewAction)
//!         Container-->>Dispatcher: value / error
//!         Dispatcher->>Events: dispatch:afterDispatch
//!     end
//!     Dispatcher->>Events: dispatch:afterDispatchLoop
//!     Dispatcher-->>App: value
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use soli::application::Application;
//! use soli::di::{Action, Container, HandlerDefinition};
//! use serde_json::json;
//!
//! struct UserController;
//!
//! let mut container = Container::new();
//! container.register(
//!     HandlerDefinition::new("UserController", |_| UserController).action(
//!         "viewAction",
//!         |_: &mut UserController, action: &mut Action<'_>| {
//!             Ok(json!({ "id": action.arg_str(0) }))
//!         },
//!     ),
//! );
//!
//! let mut app = Application::new(container);
//! let response = app.handle(&http::Method::GET, "/user/view/7").unwrap();
//! assert_eq!(response.body, json!({ "id": "7" }));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod di;
pub mod dispatcher;
pub mod events;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod router;
pub mod tasks;

pub use application::{Application, Console, Response};
pub use di::{Action, Container, HandlerDefinition, HandlerResolver};
pub use dispatcher::{
    Command, DispatchError, DispatchErrorKind, DispatchState, Dispatcher, Forward, Request,
};
pub use events::{Event, EventData, EventsManager, Listener, Verdict};
