//! # Router Module
//!
//! Turns a request URI (web) or argv (console) into the handler, action and
//! positional params the dispatcher starts from.
//!
//! ## Overview
//!
//! Two layers:
//!
//! 1. **Route table** (optional): `(method, pattern, controller, action)`
//!    entries where patterns such as `/users/{id}` are compiled to anchored
//!    regexes. Captured segments become positional params.
//!
//! 2. **Positional split**: anything the table does not match is split on `/`.
//!    The first segment names the handler, the second the action, the rest are
//!    params. The query string is ignored and segments are percent-decoded.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use soli::router::{split_uri, Router};
//!
//! let target = split_uri("/user/view/42?tab=posts");
//! assert_eq!(target.handler.as_deref(), Some("user"));
//! assert_eq!(target.action.as_deref(), Some("view"));
//! assert_eq!(target.params, vec!["42".to_string()]);
//!
//! let mut router = Router::new();
//! router.add(Method::GET, "/u/{id}", "user", "view").unwrap();
//! let target = router.route(&Method::GET, "/u/7");
//! assert_eq!(target.params, vec!["7".to_string()]);
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{sanitize_uri, split_args, split_uri, Route, RouteTarget, Router};
