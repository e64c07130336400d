//! # CLI Module
//!
//! Command-line surface of the `soli` binary, which wires the sample
//! application from [`registry`](crate::registry) to the dispatcher.
//!
//! ## Commands
//!
//! ### `request`
//!
//! Dispatch a web request and print the response as JSON:
//!
//! ```bash
//! soli request /user/view/1
//! soli request /users --method POST
//! ```
//!
//! ### `run`
//!
//! Run a console task; the value is printed as text or JSON:
//!
//! ```bash
//! soli run main hello world
//! ```
//!
//! ### `routes`
//!
//! List the route table from the config file:
//!
//! ```bash
//! soli --config soli.yaml routes
//! ```
//!
//! ## Global Flags
//!
//! - `--config <FILE>` - YAML or TOML configuration (env `SOLI_CONFIG`, default `soli.yaml`)
//! - `--log-level <LEVEL>` - overrides the configured level

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands};
