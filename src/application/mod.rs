//! # Application Module
//!
//! Thin shells that feed the dispatcher: [`Application`] routes a request URI
//! and converts the action's value into a [`Response`]; [`Console`] routes argv
//! and hands back the task's value untouched.

mod console;
mod response;
mod web;

pub use console::Console;
pub use response::{HeaderVec, Response, MAX_INLINE_HEADERS};
pub use web::Application;
