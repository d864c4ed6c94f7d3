use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{App, View};
use crate::dashboard::{Dashboard, Intent, Outcome};
use crate::error::Result;
use crate::filter::FilterMode;
use crate::task::{Task, TaskId};

use super::editor::{
    CategoryAction, CategoryPicker, EditorAction, EditorKind, EditorState, LoginAction, LoginForm,
};
use super::view;

const NARROW_WIDTH: u16 = 90;
const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Default, Clone, Copy)]
struct Viewport {
    width: u16,
    height: u16,
}

pub struct AppState {
    pub(crate) app: App,
    pub(crate) login: LoginForm,
    pub(crate) editor: Option<EditorState>,
    pub(crate) category_picker: Option<CategoryPicker>,
    pub(crate) selected: usize,
    pub(crate) search_active: bool,
    pub(crate) show_help: bool,
    pub(crate) now: DateTime<Utc>,
    status_message: Option<String>,
    info_message: Option<String>,
    viewport: Viewport,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self {
            app,
            login: LoginForm::default(),
            editor: None,
            category_picker: None,
            selected: 0,
            search_active: false,
            show_help: false,
            now: Utc::now(),
            status_message: None,
            info_message: None,
            viewport: Viewport::default(),
        }
    }

    fn update_viewport(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
    }

    pub(crate) fn is_narrow(&self) -> bool {
        self.viewport.width > 0 && self.viewport.width < NARROW_WIDTH
    }

    pub(crate) fn dashboard(&self) -> Option<&Dashboard> {
        self.app.dashboard()
    }

    pub(crate) fn visible_ids(&self) -> Vec<TaskId> {
        self.dashboard()
            .map(|dashboard| dashboard.visible().iter().map(|task| task.id).collect())
            .unwrap_or_default()
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        let dashboard = self.dashboard()?;
        dashboard.visible().get(self.selected).copied()
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|task| task.id)
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.app.view() == View::Login {
            return "type a username  enter log in  esc quit".to_string();
        }
        if self.dashboard().and_then(Dashboard::pending_delete).is_some() {
            return "y confirm delete  esc cancel".to_string();
        }
        if let Some(editor) = self.editor.as_ref() {
            if editor.confirming() {
                return "y/enter save  backspace back  esc cancel".to_string();
            }
            return "tab next field  enter next/review  ctrl+s review  esc cancel".to_string();
        }
        if self.category_picker.is_some() {
            return "j/k move  space toggle  x clear all  esc close".to_string();
        }
        if self.search_active {
            return "type to search  enter done  esc clear".to_string();
        }
        if self.show_help {
            return "? or esc close help".to_string();
        }
        "n new  e edit  space done  d delete  / search  c categories  ? help  q quit".to_string()
    }

    pub(crate) fn task_count_summary(&self) -> String {
        let Some(dashboard) = self.dashboard() else {
            return String::new();
        };
        let counts = dashboard.counts();
        let visible = dashboard.visible().len();
        format!(
            "{visible} shown  {} total  {} pending  {} completed",
            counts.all, counts.pending, counts.completed
        )
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn clear_status(&mut self) {
        self.status_message = None;
        self.info_message = None;
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        if outcome.message.is_empty() {
            self.clear_status();
        } else {
            self.set_info(outcome.message);
        }
    }

    /// Route an intent through the dashboard and report the result.
    fn dispatch(&mut self, intent: Intent) -> Option<Outcome> {
        let result = self
            .app
            .dashboard_mut()
            .and_then(|dashboard| dashboard.dispatch(intent));
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, "dashboard intent failed");
                self.set_error(err.to_string());
                return None;
            }
        };
        self.apply_outcome(outcome.clone());
        self.clamp_selection();
        Some(outcome)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn select_task(&mut self, id: TaskId) {
        if let Some(pos) = self.visible_ids().iter().position(|candidate| *candidate == id) {
            self.selected = pos;
        }
        self.clamp_selection();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    fn list_jump(&self) -> isize {
        let height = self.viewport.height.saturating_sub(10);
        (height / 2).max(1) as isize
    }

    fn submit_login(&mut self) {
        match self.app.login(&self.login.value) {
            Ok(name) => {
                self.login = LoginForm::default();
                self.selected = 0;
                self.set_info(format!("Welcome, {name}"));
            }
            Err(err) => {
                self.login.error = Some(err.to_string());
            }
        }
    }

    fn logout(&mut self) {
        self.editor = None;
        self.category_picker = None;
        self.search_active = false;
        self.show_help = false;
        self.selected = 0;
        match self.app.logout() {
            Ok(()) => self.set_info("Logged out".to_string()),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn open_new_editor(&mut self) {
        let priority = self.app.config().tasks.priority();
        if self.dispatch(Intent::OpenForm).is_some() {
            self.editor = Some(EditorState::new_task(priority));
        }
    }

    fn open_edit_editor(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            self.set_info("No task selected".to_string());
            return;
        };
        if self.dispatch(Intent::BeginEdit(task.id)).is_none() {
            return;
        }
        if self.dispatch(Intent::OpenForm).is_some() {
            self.editor = Some(EditorState::edit_task(&task));
            self.set_info(format!("Editing \"{}\"", task.title));
        }
    }

    fn submit_editor(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let input = editor.build_input();
        let intent = match editor.kind() {
            EditorKind::NewTask => Intent::CreateTask(input),
            EditorKind::EditTask => Intent::UpdateTask(input),
        };
        let result = self
            .app
            .dashboard_mut()
            .and_then(|dashboard| dashboard.dispatch(intent));
        match result {
            Ok(outcome) => {
                self.editor = None;
                let task_id = outcome.task_id;
                self.apply_outcome(outcome);
                if let Some(id) = task_id {
                    self.select_task(id);
                }
            }
            Err(err) if err.is_validation() => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_error(err.to_string());
                }
            }
            Err(err) => {
                // The controller keeps the change in memory; only the write failed.
                tracing::warn!(error = %err, "saving task failed");
                self.editor = None;
                self.set_error(err.to_string());
                self.clamp_selection();
            }
        }
    }

    fn change_search(&mut self, query: String) {
        self.selected = 0;
        self.dispatch(Intent::ChangeSearch(query));
    }

    fn current_query(&self) -> String {
        self.dashboard()
            .map(|dashboard| dashboard.filter().query.clone())
            .unwrap_or_default()
    }
}

pub fn run(app: App) -> Result<()> {
    let mut state = AppState::new(app);
    run_terminal(&mut state)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width, size.height);

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            app.now = Utc::now();
            terminal.draw(|frame| {
                app.update_viewport(frame.size().width, frame.size().height);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    app.update_viewport(width, height);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Apply one key press; true means quit.
pub(crate) fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.app.view() == View::Login {
        match app.login.handle_key(key) {
            LoginAction::Quit => return true,
            LoginAction::Submit => app.submit_login(),
            LoginAction::None => {}
        }
        return false;
    }

    if app.dashboard().and_then(Dashboard::pending_delete).is_some() {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('y') | KeyCode::Enter => {
                app.dispatch(Intent::ConfirmDelete);
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.dispatch(Intent::CancelDelete);
            }
            _ => {}
        }
        return false;
    }

    if let Some(editor) = app.editor.as_mut() {
        match editor.handle_key(key) {
            EditorAction::Cancel => {
                app.editor = None;
                app.dispatch(Intent::CancelForm);
            }
            EditorAction::Submit => app.submit_editor(),
            EditorAction::None => {}
        }
        return false;
    }

    if let Some(picker) = app.category_picker.as_mut() {
        match picker.handle_key(key) {
            CategoryAction::Close => app.category_picker = None,
            CategoryAction::Toggle(label) => {
                app.selected = 0;
                app.dispatch(Intent::ToggleCategory(label));
            }
            CategoryAction::ClearAll => {
                app.selected = 0;
                app.dispatch(Intent::ClearCategories);
            }
            CategoryAction::None => {}
        }
        return false;
    }

    if app.search_active {
        let mut query = app.current_query();
        match key.code {
            KeyCode::Esc => {
                app.search_active = false;
                app.change_search(String::new());
            }
            KeyCode::Enter => app.search_active = false,
            KeyCode::Backspace => {
                query.pop();
                app.change_search(query);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.change_search(String::new());
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                query.push(ch);
                app.change_search(query);
            }
            _ => {}
        }
        return false;
    }

    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')
        ) {
            app.show_help = false;
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => {
            if app.current_query().is_empty() {
                return true;
            }
            app.change_search(String::new());
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_selection(app.list_jump());
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_selection(-app.list_jump());
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Home | KeyCode::Char('g') => app.selected = 0,
        KeyCode::End | KeyCode::Char('G') => {
            app.selected = app.visible_ids().len().saturating_sub(1);
        }
        KeyCode::Char('n') => app.open_new_editor(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_editor(),
        KeyCode::Char('d') => match app.selected_id() {
            Some(id) => {
                app.dispatch(Intent::DeleteTask(id));
            }
            None => app.set_info("No task selected".to_string()),
        },
        KeyCode::Char(' ') | KeyCode::Char('x') => match app.selected_id() {
            Some(id) => {
                app.dispatch(Intent::ToggleComplete(id));
            }
            None => app.set_info("No task selected".to_string()),
        },
        KeyCode::Char('/') => {
            app.search_active = true;
            app.clear_status();
        }
        KeyCode::Char('c') => {
            let categories = app
                .dashboard()
                .map(Dashboard::categories)
                .unwrap_or_default();
            if categories.is_empty() {
                app.set_info("No categories yet".to_string());
            } else {
                app.category_picker = Some(CategoryPicker::new(categories));
            }
        }
        KeyCode::Char('C') => {
            app.selected = 0;
            app.dispatch(Intent::ClearCategories);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            let current = app
                .dashboard()
                .map(|dashboard| dashboard.filter().mode)
                .unwrap_or_default();
            let mode = if key.code == KeyCode::Tab {
                current.next()
            } else {
                current.prev()
            };
            app.selected = 0;
            app.dispatch(Intent::ChangeFilter(mode));
        }
        KeyCode::Char(ch @ '1'..='6') => {
            let idx = ch as usize - '1' as usize;
            if let Some(mode) = FilterMode::ALL.get(idx).copied() {
                app.selected = 0;
                app.dispatch(Intent::ChangeFilter(mode));
            }
        }
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    false
}
