//! # Dispatcher Module
//!
//! The dispatcher turns a `handler + action + params` triple into an action
//! invocation, and keeps doing so while something asks it to go elsewhere.
//!
//! ## Overview
//!
//! A [`Dispatcher`] owns:
//! - a [`DispatchState`] (current target, defaults, suffixes, forward history)
//! - a [`Container`](crate::di::Container) it resolves handler types from
//! - an optional [`EventsManager`](crate::events::EventsManager) whose listeners
//!   observe every stage and may veto or forward
//!
//! ## Request Flow
//!
//! 1. `dispatch:beforeDispatchLoop` fires (a stop returns `false` immediately)
//! 2. Empty namespace/handler/action fall back to their defaults
//! 3. The concrete names are built: `ns::UserController` / `viewAction`
//! 4. `dispatch:beforeDispatch` fires
//! 5. Handler existence, params shape and action callability are checked
//! 6. The action runs on the container's shared handler instance
//! 7. `dispatch:afterDispatch` fires with the returned value
//! 8. Steps 2-7 repeat while a forward is pending
//! 9. `dispatch:afterDispatchLoop` fires and the last value is returned
//!
//! ## Forwarding
//!
//! A [`Forward`] issued by a listener or an action replaces the target of the
//! *next* iteration. The previous handler/action names are kept for
//! introspection. A forward chain that never settles is cut at
//! [`MAX_DISPATCHES`] iterations with a `CyclicRouting` error.
//!
//! ## Error Handling
//!
//! Every failure is first offered to `dispatch:beforeException`. A listener
//! that stops the chain or forwards handles it; anything unhandled is returned
//! as a [`DispatchError`].
//!
//! ## Flavors
//!
//! [`Request`] (`IndexController::indexAction`) and [`Command`]
//! (`MainTask::mainAction`) share the loop and differ only in naming.

mod core;
mod error;
mod flavor;
mod state;


pub use core::{Dispatcher, MAX_DISPATCHES};
pub use error::{DispatchError, DispatchErrorKind};
pub use flavor::{Command, Flavor, Request};
pub use state::{DispatchState, Forward};
