//! Sample web controllers.
//!
//! Each module exposes `definition()`, the [`HandlerDefinition`](crate::di::HandlerDefinition)
//! that [`register_all`](crate::registry::register_all) puts into the container.

pub mod error;
pub mod index;
pub mod user;

pub use error::ErrorController;
pub use index::IndexController;
pub use user::{User, UserController, UserService};
