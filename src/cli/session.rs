//! tasktrack login/logout/whoami

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::open_app;

/// Options for `tasktrack login`
pub struct LoginOptions {
    pub name: String,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack logout`
pub struct LogoutOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack whoami`
pub struct WhoamiOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct SessionReport {
    logged_in: bool,
    username: Option<String>,
    persisted: bool,
}

pub fn run_login(options: LoginOptions) -> Result<()> {
    let mut app = open_app(options.data_dir);
    let name = app.login(&options.name)?;
    let persisted = app.persistence().is_available();
    let task_count = app.dashboard().map(|d| d.tasks().len()).unwrap_or(0);

    let mut human = HumanOutput::new(format!("Welcome, {name}"));
    human.push_summary("tasks", task_count.to_string());
    if !persisted {
        human.push_warning("no data directory available; login lasts for this command only");
    }
    human.push_next_step("tasktrack add \"<title>\"");
    human.push_next_step("tasktrack ui");

    emit_success(
        options.output,
        "login",
        &SessionReport {
            logged_in: true,
            username: Some(name),
            persisted,
        },
        Some(&human),
    )
}

pub fn run_logout(options: LogoutOptions) -> Result<()> {
    let mut app = open_app(options.data_dir);
    let previous = app.username().map(str::to_string);
    app.logout()?;

    let header = match previous.as_deref() {
        Some(name) => format!("Logged out {name}"),
        None => "Logged out".to_string(),
    };
    let human = HumanOutput::new(header);

    emit_success(
        options.output,
        "logout",
        &SessionReport {
            logged_in: false,
            username: None,
            persisted: app.persistence().is_available(),
        },
        Some(&human),
    )
}

pub fn run_whoami(options: WhoamiOptions) -> Result<()> {
    let app = open_app(options.data_dir);
    let username = app.username().map(str::to_string);

    let mut human = HumanOutput::new(username.clone().unwrap_or_else(|| "Not logged in".to_string()));
    if username.is_none() {
        human.push_next_step("tasktrack login <name>");
    }

    emit_success(
        options.output,
        "whoami",
        &SessionReport {
            logged_in: username.is_some(),
            username,
            persisted: app.persistence().is_available(),
        },
        Some(&human),
    )
}
