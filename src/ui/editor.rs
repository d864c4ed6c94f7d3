use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{Priority, Task, TaskId, TaskInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFieldId {
    Title,
    Description,
    Priority,
    Due,
    Categories,
}

#[derive(Debug, Clone)]
pub struct EditorField {
    pub id: EditorFieldId,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    fields: Vec<EditorField>,
    priority: Priority,
    active: usize,
    confirming: bool,
    error: Option<String>,
    task_id: Option<TaskId>,
}

impl EditorState {
    pub fn new_task(default_priority: Priority) -> Self {
        Self::build(EditorKind::NewTask, TaskInput::default(), default_priority, None)
    }

    pub fn edit_task(task: &Task) -> Self {
        Self::build(
            EditorKind::EditTask,
            TaskInput::from_task(task),
            task.priority,
            Some(task.id),
        )
    }

    fn build(
        kind: EditorKind,
        input: TaskInput,
        priority: Priority,
        task_id: Option<TaskId>,
    ) -> Self {
        let field = |id, label, value: String, required| EditorField {
            id,
            label,
            value,
            required,
        };
        Self {
            kind,
            fields: vec![
                field(EditorFieldId::Title, "Title", input.title, true),
                field(EditorFieldId::Description, "Description", input.description, false),
                field(EditorFieldId::Priority, "Priority", String::new(), false),
                field(
                    EditorFieldId::Due,
                    "Due",
                    input.due_date.unwrap_or_default(),
                    false,
                ),
                field(
                    EditorFieldId::Categories,
                    "Categories",
                    input.categories.join(", "),
                    false,
                ),
            ],
            priority,
            active: 0,
            confirming: false,
            error: None,
            task_id,
        }
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    pub fn fields(&self) -> &[EditorField] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_field(&self) -> Option<EditorFieldId> {
        self.fields.get(self.active).map(|field| field.id)
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn confirming(&self) -> bool {
        self.confirming
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.confirming = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.confirming {
            return self.handle_confirm_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => {
                    if let Some(field) = self.current_field_mut() {
                        field.value.clear();
                    }
                    self.error = None;
                }
                KeyCode::Char('s') => return self.attempt_confirm(),
                _ => {}
            }
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Tab | KeyCode::Down => self.move_active(1),
            KeyCode::BackTab | KeyCode::Up => self.move_active(-1),
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return self.attempt_confirm();
                }
                self.move_active(1);
            }
            KeyCode::Left if self.on_priority() => self.cycle_priority(-1),
            KeyCode::Right | KeyCode::Char(' ') if self.on_priority() => self.cycle_priority(1),
            KeyCode::Char(ch) if self.on_priority() => {
                if let Some(priority) = priority_shortcut(ch) {
                    self.priority = priority;
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.current_field_mut() {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    if let Some(field) = self.current_field_mut() {
                        field.value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        EditorAction::None
    }

    /// Raw form values; trimming and validation happen in the controller.
    pub fn build_input(&self) -> TaskInput {
        let due = self.field_value(EditorFieldId::Due).trim();
        TaskInput {
            title: self.field_value(EditorFieldId::Title).to_string(),
            description: self.field_value(EditorFieldId::Description).to_string(),
            priority: self.priority,
            due_date: if due.is_empty() {
                None
            } else {
                Some(due.to_string())
            },
            categories: split_categories(self.field_value(EditorFieldId::Categories)),
        }
    }

    fn attempt_confirm(&mut self) -> EditorAction {
        if self.field_value(EditorFieldId::Title).trim().is_empty() {
            self.error = Some("Task title is required".to_string());
            self.confirming = false;
            return EditorAction::None;
        }
        self.error = None;
        self.confirming = true;
        EditorAction::None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancel,
            KeyCode::Backspace | KeyCode::Char('e') => {
                self.confirming = false;
                self.error = None;
                EditorAction::None
            }
            KeyCode::Char('y') | KeyCode::Enter => EditorAction::Submit,
            _ => EditorAction::None,
        }
    }

    fn on_priority(&self) -> bool {
        self.active_field() == Some(EditorFieldId::Priority)
    }

    fn cycle_priority(&mut self, delta: isize) {
        let len = Priority::ALL.len() as isize;
        let current = Priority::ALL
            .iter()
            .position(|priority| *priority == self.priority)
            .unwrap_or(1) as isize;
        self.priority = Priority::ALL[(current + delta).rem_euclid(len) as usize];
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            self.active = 0;
            return;
        }
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    fn current_field_mut(&mut self) -> Option<&mut EditorField> {
        self.fields.get_mut(self.active)
    }

    fn field_value(&self, id: EditorFieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }
}

/// Username entry on the login screen.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Quit,
    Submit,
}

impl LoginForm {
    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('u') {
                self.value.clear();
                self.error = None;
            }
            return LoginAction::None;
        }
        match key.code {
            KeyCode::Esc => return LoginAction::Quit,
            KeyCode::Enter => return LoginAction::Submit,
            KeyCode::Backspace => {
                self.value.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.value.push(ch),
            _ => return LoginAction::None,
        }
        self.error = None;
        LoginAction::None
    }
}

/// Category filter chips, with the cursor over the available labels.
#[derive(Debug, Clone)]
pub struct CategoryPicker {
    options: Vec<String>,
    selected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryAction {
    None,
    Close,
    Toggle(String),
    ClearAll,
}

impl CategoryPicker {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> CategoryAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('c') => CategoryAction::Close,
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                CategoryAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                CategoryAction::None
            }
            KeyCode::Char(' ') | KeyCode::Enter => self
                .options
                .get(self.selected)
                .cloned()
                .map(CategoryAction::Toggle)
                .unwrap_or(CategoryAction::None),
            KeyCode::Char('x') => CategoryAction::ClearAll,
            _ => CategoryAction::None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.selected = next as usize;
    }
}

fn split_categories(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|label| label.trim().trim_start_matches('#').to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

fn priority_shortcut(ch: char) -> Option<Priority> {
    match ch.to_ascii_lowercase() {
        'l' => Some(Priority::Low),
        'm' => Some(Priority::Medium),
        'h' => Some(Priority::High),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(editor: &mut EditorState, code: KeyCode) -> EditorAction {
        editor.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(editor: &mut EditorState, text: &str) {
        for ch in text.chars() {
            press(editor, KeyCode::Char(ch));
        }
    }

    #[test]
    fn editor_requires_title() {
        let mut editor = EditorState::new_task(Priority::Medium);
        for _ in 0..editor.fields().len() {
            let action = press(&mut editor, KeyCode::Enter);
            assert_eq!(action, EditorAction::None);
        }
        assert_eq!(editor.error(), Some("Task title is required"));
        assert!(!editor.confirming());
    }

    #[test]
    fn editor_builds_input_from_fields() {
        let mut editor = EditorState::new_task(Priority::Low);
        type_text(&mut editor, "Write report");
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "quarterly");
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Right);
        press(&mut editor, KeyCode::Right);
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "2024-02-01");
        press(&mut editor, KeyCode::Tab);
        type_text(&mut editor, "work, #writing, ,work");

        let input = editor.build_input();
        assert_eq!(input.title, "Write report");
        assert_eq!(input.description, "quarterly");
        assert_eq!(input.priority, Priority::High);
        assert_eq!(input.due_date.as_deref(), Some("2024-02-01"));
        assert_eq!(input.categories, vec!["work", "writing", "work"]);
    }

    #[test]
    fn priority_field_does_not_take_text() {
        let mut editor = EditorState::new_task(Priority::Medium);
        press(&mut editor, KeyCode::Tab);
        press(&mut editor, KeyCode::Tab);
        assert_eq!(editor.active_field(), Some(EditorFieldId::Priority));
        press(&mut editor, KeyCode::Char('h'));
        assert_eq!(editor.priority(), Priority::High);
        press(&mut editor, KeyCode::Char('z'));
        assert_eq!(editor.priority(), Priority::High);
        press(&mut editor, KeyCode::Left);
        assert_eq!(editor.priority(), Priority::Medium);
    }

    #[test]
    fn confirm_step_submits_or_returns() {
        let mut editor = EditorState::new_task(Priority::Medium);
        type_text(&mut editor, "x");
        let action = editor.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(action, EditorAction::None);
        assert!(editor.confirming());
        press(&mut editor, KeyCode::Backspace);
        assert!(!editor.confirming());
        editor.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(press(&mut editor, KeyCode::Enter), EditorAction::Submit);
    }

    #[test]
    fn edit_task_prefills_fields() {
        let task = Task {
            id: 9,
            title: "Pay rent".to_string(),
            description: "landlord".to_string(),
            completed: false,
            created_at: "2024-01-15T10:00:00.000Z".to_string(),
            priority: Priority::High,
            due_date: Some("2024-02-01".to_string()),
            categories: vec!["home".to_string(), "money".to_string()],
        };
        let editor = EditorState::edit_task(&task);
        assert_eq!(editor.kind(), EditorKind::EditTask);
        assert_eq!(editor.task_id(), Some(9));
        let input = editor.build_input();
        assert_eq!(input, TaskInput::from_task(&task));
    }

    #[test]
    fn login_form_collects_text() {
        let mut form = LoginForm::default();
        for ch in "al".chars() {
            form.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        assert_eq!(form.value, "al");
        assert_eq!(
            form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            LoginAction::Submit
        );
    }

    #[test]
    fn category_picker_toggles_current_option() {
        let mut picker = CategoryPicker::new(vec!["work".to_string(), "home".to_string()]);
        picker.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert_eq!(
            picker.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)),
            CategoryAction::Toggle("home".to_string())
        );
        assert_eq!(
            picker.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
            CategoryAction::ClearAll
        );
    }
}
