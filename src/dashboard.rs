//! Dashboard controller: owner of the in-memory task collection.
//!
//! Every mutation writes the full collection back through `Persistence`.
//! If that write fails the in-memory change is kept and the error is
//! returned, so the caller can report it and retry on the next mutation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::filter::{self, FilterMode, FilterState, TaskCounts};
use crate::normalize::unused_id;
use crate::storage::Persistence;
use crate::task::{format_timestamp, Task, TaskId, TaskInput};

/// Result of a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub changed: bool,
    pub message: String,
    pub task_id: Option<TaskId>,
}

impl Outcome {
    fn changed(message: impl Into<String>, task_id: TaskId) -> Self {
        Self {
            changed: true,
            message: message.into(),
            task_id: Some(task_id),
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
            task_id: None,
        }
    }
}

/// An explicit user intent, as emitted by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateTask(TaskInput),
    UpdateTask(TaskInput),
    BeginEdit(TaskId),
    OpenForm,
    CancelForm,
    /// Ask to delete; opens the confirmation gate.
    DeleteTask(TaskId),
    ConfirmDelete,
    CancelDelete,
    ToggleComplete(TaskId),
    ChangeFilter(FilterMode),
    ChangeSearch(String),
    ToggleCategory(String),
    ClearCategories,
}

#[derive(Debug)]
pub struct Dashboard {
    tasks: Vec<Task>,
    filter: FilterState,
    form_open: bool,
    editing: Option<TaskId>,
    pending_delete: Option<TaskId>,
    persistence: Persistence,
}

impl Dashboard {
    /// Load the stored collection.
    pub fn load(persistence: Persistence) -> Self {
        let tasks = persistence.load_tasks();
        tracing::debug!(count = tasks.len(), "dashboard loaded");
        Self {
            tasks,
            filter: FilterState::default(),
            form_open: false,
            editing: None,
            pending_delete: None,
            persistence,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn editing(&self) -> Option<&Task> {
        self.editing.and_then(|id| self.find(id))
    }

    pub fn pending_delete(&self) -> Option<&Task> {
        self.pending_delete.and_then(|id| self.find(id))
    }

    pub fn visible(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn counts(&self) -> TaskCounts {
        filter::counts(&self.tasks)
    }

    pub fn categories(&self) -> Vec<String> {
        filter::available_categories(&self.tasks)
    }

    pub fn overdue_count(&self, now: DateTime<Utc>) -> usize {
        filter::overdue_count(&self.tasks, now)
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    /// Close the form and drop any editing context.
    pub fn cancel_form(&mut self) {
        self.form_open = false;
        self.editing = None;
    }

    /// Start editing `id`; false when no such task exists.
    pub fn begin_edit(&mut self, id: TaskId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.editing = Some(id);
        true
    }

    pub fn create(&mut self, input: TaskInput) -> Result<Outcome> {
        self.create_at(input, Utc::now())
    }

    /// Create a task as of `now`; the new task goes to the front.
    pub fn create_at(&mut self, input: TaskInput, now: DateTime<Utc>) -> Result<Outcome> {
        let input = input.sanitize()?;
        let id = self.next_id(now.timestamp_millis());
        let task = Task {
            id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: format_timestamp(now),
            priority: input.priority,
            due_date: input.due_date,
            categories: input.categories,
        };
        let message = format!("Created \"{}\"", task.title);
        self.tasks.insert(0, task);
        self.form_open = false;
        tracing::debug!(id, "task created");
        self.persist()?;
        Ok(Outcome::changed(message, id))
    }

    /// Apply `input` to the task being edited.
    ///
    /// Without an editing context this is a no-op.
    pub fn update(&mut self, input: TaskInput) -> Result<Outcome> {
        let Some(id) = self.editing else {
            return Ok(Outcome::unchanged("Nothing is being edited"));
        };
        let input = input.sanitize()?;
        self.editing = None;
        self.form_open = false;
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(Outcome::unchanged(format!("Task {id} no longer exists")));
        };
        task.title = input.title;
        task.description = input.description;
        task.priority = input.priority;
        task.due_date = input.due_date;
        task.categories = input.categories;
        let message = format!("Updated \"{}\"", task.title);
        tracing::debug!(id, "task updated");
        self.persist()?;
        Ok(Outcome::changed(message, id))
    }

    /// Open the delete confirmation for `id`.
    pub fn request_delete(&mut self, id: TaskId) -> Option<&Task> {
        self.find(id)?;
        self.pending_delete = Some(id);
        self.find(id)
    }

    pub fn confirm_delete(&mut self) -> Result<Outcome> {
        match self.pending_delete.take() {
            Some(id) => self.delete_confirmed(id),
            None => Ok(Outcome::unchanged("No delete pending")),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Remove `id` after the user has already confirmed.
    pub fn delete_confirmed(&mut self, id: TaskId) -> Result<Outcome> {
        let Some(pos) = self.tasks.iter().position(|task| task.id == id) else {
            return Ok(Outcome::unchanged(format!("Task {id} not found")));
        };
        let removed = self.tasks.remove(pos);
        if self.editing == Some(id) {
            self.editing = None;
        }
        if self.pending_delete == Some(id) {
            self.pending_delete = None;
        }
        tracing::debug!(id, "task deleted");
        self.persist()?;
        Ok(Outcome::changed(format!("Deleted \"{}\"", removed.title), id))
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> Result<Outcome> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(Outcome::unchanged(format!("Task {id} not found")));
        };
        task.completed = !task.completed;
        let message = if task.completed {
            format!("Completed \"{}\"", task.title)
        } else {
            format!("Reopened \"{}\"", task.title)
        };
        tracing::debug!(id, completed = task.completed, "task toggled");
        self.persist()?;
        Ok(Outcome::changed(message, id))
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome> {
        match intent {
            Intent::CreateTask(input) => self.create(input),
            Intent::UpdateTask(input) => self.update(input),
            Intent::BeginEdit(id) => Ok(if self.begin_edit(id) {
                Outcome {
                    changed: false,
                    message: format!("Editing task {id}"),
                    task_id: Some(id),
                }
            } else {
                Outcome::unchanged(format!("Task {id} not found"))
            }),
            Intent::OpenForm => {
                self.open_form();
                Ok(Outcome::unchanged("New task"))
            }
            Intent::CancelForm => {
                self.cancel_form();
                Ok(Outcome::unchanged("Cancelled"))
            }
            Intent::DeleteTask(id) => Ok(match self.request_delete(id) {
                Some(task) => Outcome::unchanged(format!("Delete \"{}\"?", task.title)),
                None => Outcome::unchanged(format!("Task {id} not found")),
            }),
            Intent::ConfirmDelete => self.confirm_delete(),
            Intent::CancelDelete => {
                self.cancel_delete();
                Ok(Outcome::unchanged("Delete cancelled"))
            }
            Intent::ToggleComplete(id) => self.toggle_complete(id),
            Intent::ChangeFilter(mode) => {
                self.filter.set_mode(mode);
                Ok(Outcome::unchanged(format!("Filter: {}", mode.label())))
            }
            Intent::ChangeSearch(query) => {
                self.filter.set_query(query);
                Ok(Outcome::unchanged(""))
            }
            Intent::ToggleCategory(label) => {
                self.filter.toggle_category(&label);
                Ok(Outcome::unchanged(""))
            }
            Intent::ClearCategories => {
                self.filter.clear_categories();
                Ok(Outcome::unchanged("Categories cleared"))
            }
        }
    }

    /// Creation time in ms, or `max + 1` when that id is taken.
    fn next_id(&self, now_ms: i64) -> TaskId {
        let candidate = now_ms.max(1);
        if self.find(candidate).is_none() {
            return candidate;
        }
        let taken: HashSet<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        unused_id(&taken)
    }

    fn persist(&self) -> Result<()> {
        self.persistence.store_tasks(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    fn dashboard() -> (Dashboard, Persistence) {
        let persistence = Persistence::in_memory();
        (Dashboard::load(persistence.clone()), persistence)
    }

    fn input(title: &str) -> TaskInput {
        TaskInput::new(title)
    }

    #[test]
    fn create_prepends_and_persists() {
        let (mut dash, persistence) = dashboard();
        dash.open_form();
        let first = dash.create_at(input("first"), now()).expect("create");
        let second = dash
            .create_at(input("second"), now() + chrono::Duration::seconds(1))
            .expect("create");

        assert!(first.changed && second.changed);
        let titles: Vec<&str> = dash.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert!(!dash.is_form_open());

        let task = &dash.tasks()[1];
        assert_eq!(task.id, now().timestamp_millis());
        assert_eq!(task.created_at, "2024-01-15T10:00:00.000Z");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);

        assert_eq!(persistence.load_tasks(), dash.tasks().to_vec());
    }

    #[test]
    fn create_with_blank_title_leaves_state_unchanged() {
        let (mut dash, persistence) = dashboard();
        dash.open_form();
        let err = dash.create_at(input("   "), now()).expect_err("blank title");
        assert!(err.is_validation());
        assert!(dash.tasks().is_empty());
        assert!(dash.is_form_open());
        assert!(persistence.load_tasks().is_empty());
    }

    #[test]
    fn same_millisecond_creations_get_unique_ids() {
        let (mut dash, _) = dashboard();
        dash.create_at(input("a"), now()).expect("create");
        dash.create_at(input("b"), now()).expect("create");
        let ids: Vec<TaskId> = dash.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![now().timestamp_millis() + 1, now().timestamp_millis()]);
    }

    #[test]
    fn id_collision_next_to_maximal_id_takes_lowest_free() {
        let (mut dash, persistence) = dashboard();
        dash.create_at(input("now"), now()).expect("create");
        let mut stored = dash.tasks().to_vec();
        stored[0].id = i64::MAX;
        stored.push(Task {
            id: now().timestamp_millis(),
            ..stored[0].clone()
        });
        persistence.store_tasks(&stored).expect("store");

        let mut dash = Dashboard::load(persistence);
        let outcome = dash.create_at(input("next"), now()).expect("create");
        assert_eq!(outcome.task_id, Some(1));
    }

    #[test]
    fn create_trims_and_dedupes() {
        let (mut dash, _) = dashboard();
        let mut data = input("  Write report  ");
        data.description = "  draft  ".to_string();
        data.categories = vec!["work".into(), "work".into(), " ".into()];
        dash.create_at(data, now()).expect("create");
        let task = &dash.tasks()[0];
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "draft");
        assert_eq!(task.categories, vec!["work".to_string()]);
    }

    #[test]
    fn update_without_editing_context_is_noop() {
        let (mut dash, _) = dashboard();
        dash.create_at(input("a"), now()).expect("create");
        let before = dash.tasks().to_vec();
        let outcome = dash.update(input("changed")).expect("update");
        assert!(!outcome.changed);
        assert_eq!(dash.tasks(), before.as_slice());
    }

    #[test]
    fn update_replaces_editable_fields_only() {
        let (mut dash, persistence) = dashboard();
        let id = dash
            .create_at(input("a"), now())
            .expect("create")
            .task_id
            .expect("id");
        dash.toggle_complete(id).expect("toggle");

        assert!(dash.begin_edit(id));
        let mut data = input("b");
        data.priority = Priority::High;
        data.due_date = Some("2024-02-01".to_string());
        data.categories = vec!["x".to_string()];
        let outcome = dash.update(data).expect("update");
        assert!(outcome.changed);

        let task = dash.find(id).expect("task");
        assert_eq!(task.title, "b");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date.as_deref(), Some("2024-02-01"));
        assert!(task.completed);
        assert_eq!(task.created_at, "2024-01-15T10:00:00.000Z");
        assert!(dash.editing().is_none());
        assert_eq!(persistence.load_tasks(), dash.tasks().to_vec());
    }

    #[test]
    fn begin_edit_unknown_id_fails() {
        let (mut dash, _) = dashboard();
        assert!(!dash.begin_edit(42));
        assert!(dash.editing().is_none());
    }

    #[test]
    fn toggle_twice_is_identity() {
        let (mut dash, _) = dashboard();
        let id = dash.create_at(input("a"), now()).expect("create").task_id.expect("id");
        let before = dash.tasks().to_vec();
        dash.toggle_complete(id).expect("toggle");
        assert!(dash.find(id).expect("task").completed);
        dash.toggle_complete(id).expect("toggle");
        assert_eq!(dash.tasks(), before.as_slice());
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let (mut dash, _) = dashboard();
        let outcome = dash.toggle_complete(7).expect("toggle");
        assert!(!outcome.changed);
    }

    #[test]
    fn delete_goes_through_confirmation_gate() {
        let (mut dash, persistence) = dashboard();
        let id = dash.create_at(input("a"), now()).expect("create").task_id.expect("id");
        dash.create_at(input("b"), now()).expect("create");

        assert_eq!(dash.request_delete(id).map(|t| t.title.as_str()), Some("a"));
        dash.cancel_delete();
        assert!(dash.pending_delete().is_none());
        assert_eq!(dash.tasks().len(), 2);

        dash.request_delete(id);
        let outcome = dash.confirm_delete().expect("delete");
        assert!(outcome.changed);
        assert_eq!(dash.tasks().len(), 1);
        assert!(dash.find(id).is_none());
        assert_eq!(persistence.load_tasks().len(), 1);
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let (mut dash, _) = dashboard();
        dash.create_at(input("a"), now()).expect("create");
        assert!(dash.request_delete(99).is_none());
        assert!(!dash.confirm_delete().expect("confirm").changed);
        assert!(!dash.delete_confirmed(99).expect("delete").changed);
        assert_eq!(dash.tasks().len(), 1);
    }

    #[test]
    fn dispatch_routes_intents() {
        let (mut dash, _) = dashboard();
        dash.dispatch(Intent::OpenForm).expect("open");
        assert!(dash.is_form_open());
        dash.dispatch(Intent::CreateTask(input("Buy milk"))).expect("create");
        let id = dash.tasks()[0].id;

        dash.dispatch(Intent::ToggleComplete(id)).expect("toggle");
        dash.dispatch(Intent::ChangeFilter(FilterMode::Completed)).expect("filter");
        assert_eq!(dash.visible().len(), 1);
        dash.dispatch(Intent::ChangeSearch("bread".to_string())).expect("search");
        assert!(dash.visible().is_empty());
        dash.dispatch(Intent::ChangeSearch(String::new())).expect("search");

        dash.dispatch(Intent::ToggleCategory("errand".to_string())).expect("cat");
        assert!(dash.visible().is_empty());
        dash.dispatch(Intent::ClearCategories).expect("clear");
        assert_eq!(dash.visible().len(), 1);

        dash.dispatch(Intent::BeginEdit(id)).expect("edit");
        dash.dispatch(Intent::CancelForm).expect("cancel");
        assert!(dash.editing().is_none());

        dash.dispatch(Intent::DeleteTask(id)).expect("request");
        dash.dispatch(Intent::ConfirmDelete).expect("confirm");
        assert!(dash.tasks().is_empty());
    }

    #[test]
    fn reload_restores_collection() {
        let (mut dash, persistence) = dashboard();
        dash.create_at(input("a"), now()).expect("create");
        let reloaded = Dashboard::load(persistence);
        assert_eq!(reloaded.tasks(), dash.tasks());
        assert_eq!(reloaded.counts().all, 1);
    }
}
