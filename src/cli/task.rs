//! tasktrack task commands
//!
//! add, edit, toggle, rm, list, show, stats, categories, ui

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::app::App;
use crate::dashboard::Dashboard;
use crate::error::{Error, Result};
use crate::filter::{self, DueState, FilterMode, TaskCounts};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{parse_timestamp, Task, TaskId, TaskInput};

use super::open_app;

/// Options for `tasktrack add`
pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub categories: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack edit`
pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub categories: Vec<String>,
    pub clear_categories: bool,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack toggle`
pub struct ToggleOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack rm`
pub struct RmOptions {
    pub id: String,
    pub yes: bool,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack list`
pub struct ListOptions {
    pub filter: String,
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack show`
pub struct ShowOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack stats`
pub struct StatsOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `tasktrack categories`
pub struct CategoriesOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct TaskView<'a> {
    #[serde(flatten)]
    task: &'a Task,
    due_state: DueState,
}

#[derive(Serialize)]
struct TaskChangeReport<'a> {
    changed: bool,
    message: String,
    task: Option<TaskView<'a>>,
}

#[derive(Serialize)]
struct DeleteReport {
    deleted: bool,
    id: TaskId,
    title: String,
}

#[derive(Serialize)]
struct TaskListReport<'a> {
    total: usize,
    filter: FilterMode,
    search: Option<String>,
    categories: Vec<String>,
    tasks: Vec<TaskView<'a>>,
}

#[derive(Serialize)]
struct StatsReport {
    counts: TaskCounts,
    overdue: usize,
    categories: Vec<String>,
}

#[derive(Serialize)]
struct CategoriesReport {
    categories: Vec<String>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut app = open_app(options.data_dir);
    let priority = match options.priority.as_deref() {
        Some(value) => value.parse()?,
        None => app.config().tasks.priority(),
    };
    let input = TaskInput {
        title: options.title,
        description: options.description.unwrap_or_default(),
        priority,
        due_date: options.due,
        categories: options.categories,
    };

    let window = app.config().display.due_soon_window();
    let dashboard = app.dashboard_mut()?;
    let outcome = dashboard.create(input)?;
    let task = outcome.task_id.and_then(|id| dashboard.find(id));

    let mut human = HumanOutput::new(outcome.message.clone());
    if let Some(task) = task {
        push_task_summary(&mut human, task, window);
    }
    human.push_next_step("tasktrack list");

    emit_success(
        options.output,
        "add",
        &TaskChangeReport {
            changed: outcome.changed,
            message: outcome.message.clone(),
            task: task.map(|task| view(task, window)),
        },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let id = parse_task_id(&options.id)?;
    let mut app = open_app(options.data_dir);
    let window = app.config().display.due_soon_window();
    let dashboard = app.dashboard_mut()?;
    let current = require_task(dashboard, id)?;

    let mut input = TaskInput::from_task(current);
    if let Some(title) = options.title {
        input.title = title;
    }
    if let Some(description) = options.description {
        input.description = description;
    }
    if let Some(priority) = options.priority.as_deref() {
        input.priority = priority.parse()?;
    }
    if options.clear_due {
        input.due_date = None;
    } else if let Some(due) = options.due {
        input.due_date = Some(due);
    }
    if options.clear_categories {
        input.categories.clear();
    } else if !options.categories.is_empty() {
        input.categories = options.categories;
    }

    dashboard.begin_edit(id);
    let outcome = match dashboard.update(input) {
        Ok(outcome) => outcome,
        Err(err) => {
            dashboard.cancel_form();
            return Err(err);
        }
    };
    let task = dashboard.find(id);

    let mut human = HumanOutput::new(outcome.message.clone());
    if let Some(task) = task {
        push_task_summary(&mut human, task, window);
    }

    emit_success(
        options.output,
        "edit",
        &TaskChangeReport {
            changed: outcome.changed,
            message: outcome.message.clone(),
            task: task.map(|task| view(task, window)),
        },
        Some(&human),
    )
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    let id = parse_task_id(&options.id)?;
    let mut app = open_app(options.data_dir);
    let window = app.config().display.due_soon_window();
    let dashboard = app.dashboard_mut()?;
    require_task(dashboard, id)?;

    let outcome = dashboard.toggle_complete(id)?;
    let task = dashboard.find(id);

    let mut human = HumanOutput::new(outcome.message.clone());
    if let Some(task) = task {
        human.push_summary("status", status_label(task));
    }

    emit_success(
        options.output,
        "toggle",
        &TaskChangeReport {
            changed: outcome.changed,
            message: outcome.message.clone(),
            task: task.map(|task| view(task, window)),
        },
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let id = parse_task_id(&options.id)?;
    let mut app = open_app(options.data_dir);
    let dashboard = app.dashboard_mut()?;
    let title = require_task(dashboard, id)?.title.clone();

    if !options.yes && !confirm_delete(&title)? {
        let human = HumanOutput::new("Delete cancelled");
        return emit_success(
            options.output,
            "rm",
            &DeleteReport {
                deleted: false,
                id,
                title,
            },
            Some(&human),
        );
    }

    let outcome = dashboard.delete_confirmed(id)?;
    let human = HumanOutput::new(outcome.message);

    emit_success(
        options.output,
        "rm",
        &DeleteReport {
            deleted: outcome.changed,
            id,
            title,
        },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let mode: FilterMode = options.filter.parse()?;
    let mut app = open_app(options.data_dir);
    let window = app.config().display.due_soon_window();
    let dashboard = app.dashboard_mut()?;

    let query = options.search.clone().unwrap_or_default();
    let filter_state = dashboard.filter_mut();
    filter_state.set_mode(mode);
    filter_state.set_query(query.clone());
    for label in &options.categories {
        let label = label.trim();
        if !label.is_empty() && !filter_state.is_selected(label) {
            filter_state.toggle_category(label);
        }
    }

    let visible = dashboard.visible();
    let now = Utc::now();

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Showing", format!("{} of {}", visible.len(), dashboard.tasks().len()));
    human.push_summary("Filter", mode.label());
    if !query.is_empty() {
        human.push_summary("Search", query.clone());
    }
    let selected = dashboard.filter().selected_categories().to_vec();
    if !selected.is_empty() {
        human.push_summary("Categories", selected.join(", "));
    }
    let overdue = dashboard.overdue_count(now);
    if overdue > 0 {
        human.push_warning(format!("{overdue} overdue"));
    }
    if visible.is_empty() {
        human.push_detail(filter::empty_state_message(dashboard.filter()));
        if dashboard.tasks().is_empty() {
            human.push_next_step("tasktrack add \"<title>\"");
        }
    }
    for task in &visible {
        human.push_detail(list_line(task, now, window));
    }

    emit_success(
        options.output,
        "list",
        &TaskListReport {
            total: visible.len(),
            filter: mode,
            search: options.search,
            categories: selected,
            tasks: visible.iter().map(|task| view(task, window)).collect(),
        },
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let id = parse_task_id(&options.id)?;
    let mut app = open_app(options.data_dir);
    let window = app.config().display.due_soon_window();
    let dashboard = app.dashboard_mut()?;
    let task = require_task(dashboard, id)?;

    let mut human = HumanOutput::new(task.title.clone());
    push_task_summary(&mut human, task, window);
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }

    emit_success(options.output, "show", &view(task, window), Some(&human))
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let mut app = open_app(options.data_dir);
    let dashboard = app.dashboard_mut()?;
    let counts = dashboard.counts();
    let overdue = dashboard.overdue_count(Utc::now());
    let categories = dashboard.categories();

    let mut human = HumanOutput::new("Task stats");
    for mode in FilterMode::ALL {
        human.push_summary(mode.label(), counts.for_mode(mode).to_string());
    }
    human.push_summary("Overdue", overdue.to_string());
    if !categories.is_empty() {
        human.push_summary("Categories", categories.join(", "));
    }

    emit_success(
        options.output,
        "stats",
        &StatsReport {
            counts,
            overdue,
            categories,
        },
        Some(&human),
    )
}

pub fn run_categories(options: CategoriesOptions) -> Result<()> {
    let mut app = open_app(options.data_dir);
    let categories = app.dashboard_mut()?.categories();

    let mut human = HumanOutput::new("Categories");
    if categories.is_empty() {
        human.push_detail("None");
    }
    for label in &categories {
        human.push_detail(format!("#{label}"));
    }

    emit_success(
        options.output,
        "categories",
        &CategoriesReport { categories },
        Some(&human),
    )
}

pub fn run_ui(data_dir: Option<PathBuf>) -> Result<()> {
    let app: App = open_app(data_dir);
    crate::ui::run(app)
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid task id '{}'", raw.trim())))
}

fn require_task(dashboard: &Dashboard, id: TaskId) -> Result<&Task> {
    dashboard.find(id).ok_or(Error::TaskNotFound(id))
}

fn confirm_delete(title: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(
        stderr,
        "Are you sure you want to delete \"{title}\"? [y/N] "
    )?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn view(task: &Task, window: chrono::Duration) -> TaskView<'_> {
    TaskView {
        task,
        due_state: filter::due_state(task, Utc::now(), window),
    }
}

fn status_label(task: &Task) -> &'static str {
    if task.completed {
        "completed"
    } else {
        "pending"
    }
}

fn push_task_summary(human: &mut HumanOutput, task: &Task, window: chrono::Duration) {
    human.push_summary("id", task.id.to_string());
    human.push_summary("status", status_label(task));
    human.push_summary("priority", task.priority.as_str());
    if let Some(due) = task.due_date.as_deref() {
        let state = filter::due_state(task, Utc::now(), window);
        let mut value = display_timestamp(due);
        if state == DueState::Overdue {
            value.push_str(" (Overdue)");
        }
        human.push_summary("due", value);
    }
    if !task.categories.is_empty() {
        human.push_summary("categories", task.categories.join(", "));
    }
    human.push_summary("created", display_timestamp(&task.created_at));
}

fn list_line(task: &Task, now: DateTime<Utc>, window: chrono::Duration) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{check} {} [{}] {}", task.id, task.priority, task.title);
    for label in &task.categories {
        line.push_str(&format!(" #{label}"));
    }
    if let Some(due) = task.due_date.as_deref() {
        line.push_str(&format!(" (due {}", display_timestamp(due)));
        match filter::due_state(task, now, window) {
            DueState::Overdue => line.push_str(", overdue)"),
            DueState::DueSoon => line.push_str(", due soon)"),
            _ => line.push(')'),
        }
    }
    line
}

/// Local-time rendering of a stored timestamp; unparsable text is shown as is.
fn display_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}
