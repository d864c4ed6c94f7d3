//! Command-line interface for tasktrack
//!
//! This module defines the CLI structure using clap derive macros.
//! Session commands live in `session`, task commands in `task`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::storage::{self, Persistence, DATA_DIR_ENV};

mod session;
mod task;

/// tasktrack - personal task tracker
///
/// Log in with a username, then create, edit, filter, and search tasks
/// stored in a local data directory.
#[derive(Parser, Debug)]
#[command(name = "tasktrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding stored tasks and the username
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with a username (stored locally, no password)
    Login {
        /// Username, at least two characters
        name: String,
    },

    /// Forget the stored username
    Logout,

    /// Show the logged-in username
    Whoami,

    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD, YYYY-MM-DDTHH:MM, or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Category label (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },

    /// Edit a task's title, description, priority, due date, or categories
    Edit {
        /// Task ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// New due date
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Replace categories with these labels (repeatable)
        #[arg(short, long = "category", conflicts_with = "clear_categories")]
        categories: Vec<String>,

        /// Remove all categories
        #[arg(long)]
        clear_categories: bool,
    },

    /// Toggle a task between pending and completed
    #[command(visible_alias = "done")]
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks
    List {
        /// Filter: all, completed, pending, high, medium, low
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Case-insensitive search over title, description, and categories
        #[arg(short, long)]
        search: Option<String>,

        /// Only tasks with any of these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },

    /// Show one task
    Show {
        /// Task ID
        id: String,
    },

    /// Show counts, overdue tasks, and categories
    Stats,

    /// List category labels in use
    Categories,

    /// Open the interactive terminal dashboard
    Ui,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let data_dir = self.data_dir;

        match self.command {
            Commands::Login { name } => session::run_login(session::LoginOptions {
                name,
                data_dir,
                output,
            }),
            Commands::Logout => session::run_logout(session::LogoutOptions { data_dir, output }),
            Commands::Whoami => session::run_whoami(session::WhoamiOptions { data_dir, output }),
            Commands::Add {
                title,
                description,
                priority,
                due,
                categories,
            } => task::run_add(task::AddOptions {
                title,
                description,
                priority,
                due,
                categories,
                data_dir,
                output,
            }),
            Commands::Edit {
                id,
                title,
                description,
                priority,
                due,
                clear_due,
                categories,
                clear_categories,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                priority,
                due,
                clear_due,
                categories,
                clear_categories,
                data_dir,
                output,
            }),
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions {
                id,
                data_dir,
                output,
            }),
            Commands::Rm { id, yes } => task::run_rm(task::RmOptions {
                id,
                yes,
                data_dir,
                output,
            }),
            Commands::List {
                filter,
                search,
                categories,
            } => task::run_list(task::ListOptions {
                filter,
                search,
                categories,
                data_dir,
                output,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions {
                id,
                data_dir,
                output,
            }),
            Commands::Stats => task::run_stats(task::StatsOptions { data_dir, output }),
            Commands::Categories => {
                task::run_categories(task::CategoriesOptions { data_dir, output })
            }
            Commands::Ui => task::run_ui(data_dir),
        }
    }
}

/// Resolve storage and configuration, then restore the session.
pub(crate) fn open_app(data_dir: Option<PathBuf>) -> App {
    let resolved = storage::resolve_data_dir(data_dir.as_deref());
    let config = resolved
        .as_deref()
        .map(Config::load_from_dir)
        .unwrap_or_default();
    tracing::debug!(data_dir = ?resolved, "opening app");
    App::open(Persistence::for_data_dir(resolved), config)
}
