//! tasktrack - personal task tracker library
//!
//! This library provides the core of the tasktrack CLI and terminal
//! dashboard: a single local user, a task collection persisted in a small
//! key-value store, and the derived view state used to browse it.
//!
//! # Core Concepts
//!
//! - **Session**: a locally stored username, no authentication
//! - **Tasks**: title, description, priority, optional due date, categories
//! - **Filters**: status/priority mode, free-text search, category selection
//! - **Intents**: explicit UI events applied by the dashboard controller
//!
//! # Module Organization
//!
//! - `app`: Application root owning session and dashboard
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `dashboard`: Task collection controller and intents
//! - `error`: Error types and result aliases
//! - `filter`: Visible subset, counts, due states, search highlighting
//! - `lock`: File locking and atomic writes
//! - `normalize`: Coercion of stored records into tasks
//! - `output`: Human and JSON command output
//! - `session`: Login and logout
//! - `storage`: Key-value stores and task/username persistence
//! - `task`: Task model and timestamp parsing
//! - `ui`: Interactive terminal dashboard

pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod lock;
pub mod normalize;
pub mod output;
pub mod session;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
