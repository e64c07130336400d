//! Unit tests for CLI commands

use crate::cli::{execute, Cli, Commands};
use crate::config::{AppConfig, RouteConfig};
use clap::Parser;

fn run(args: &[&str], config: &AppConfig) -> (anyhow::Result<()>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let result = execute(&cli, config, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_request_command_defaults() {
    let cli = Cli::try_parse_from(["soli", "request", "/user/view/1"]).unwrap();
    match cli.command {
        Commands::Request { uri, method } => {
            assert_eq!(uri, "/user/view/1");
            assert_eq!(method, "GET");
        }
        _ => panic!("Expected Request command"),
    }
    assert!(cli.log_level.is_none());
}

#[test]
fn test_run_command_collects_params() {
    let cli = Cli::try_parse_from(["soli", "run", "main", "hello", "a", "b"]).unwrap();
    match cli.command {
        Commands::Run {
            task,
            action,
            params,
        } => {
            assert_eq!(task.as_deref(), Some("main"));
            assert_eq!(action.as_deref(), Some("hello"));
            assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli =
        Cli::try_parse_from(["soli", "routes", "--config", "app.toml", "--log-level", "debug"])
            .unwrap();
    assert!(matches!(cli.command, Commands::Routes));
    assert_eq!(cli.config.to_string_lossy(), "app.toml");
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["soli", "serve"]).is_err());
}

#[test]
fn test_execute_request_prints_json_response() {
    let (result, out) = run(&["soli", "request", "/"], &AppConfig::default());
    result.unwrap();
    let printed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(printed["status"], 200);
    assert_eq!(printed["body"]["name"], "Soli");
}

#[test]
fn test_execute_request_missing_controller_forwards_to_error() {
    let (result, out) = run(&["soli", "request", "/nope/x"], &AppConfig::default());
    result.unwrap();
    let printed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(printed["body"]["error"], "Not Found handler: NopeController");
    assert_eq!(printed["body"]["controller"], "nope");
}

#[test]
fn test_execute_request_failed_action_reports_error() {
    let (result, out) = run(&["soli", "request", "/user/view/999"], &AppConfig::default());
    assert!(result.is_err());
    let printed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(printed["status"], 500);
    assert_eq!(printed["body"]["error"], "user 999 not found");
}

#[test]
fn test_execute_run_prints_text() {
    let (result, out) = run(&["soli", "run", "main", "hello", "world"], &AppConfig::default());
    result.unwrap();
    assert_eq!(out, "hello world\n");

    let (result, out) = run(&["soli", "run"], &AppConfig::default());
    result.unwrap();
    assert_eq!(out, "main task\n");
}

#[test]
fn test_execute_routes_lists_table() {
    let config = AppConfig {
        routes: vec![RouteConfig {
            method: "GET".to_string(),
            path: "/users/{id}".to_string(),
            controller: "user".to_string(),
            action: "view".to_string(),
        }],
        ..AppConfig::default()
    };
    let (result, out) = run(&["soli", "routes"], &config);
    result.unwrap();
    assert_eq!(out, "GET /users/{id} -> user/view\n");

    let (result, out) = run(&["soli", "routes"], &AppConfig::default());
    result.unwrap();
    assert!(out.starts_with("No routes configured"));
}
