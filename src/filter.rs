//! Visible-subset computation, counts, and search highlighting.
//!
//! Everything here is a pure function of a borrowed task slice plus the
//! current `FilterState`; nothing is cached between renders.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Priority, Task};

/// Which slice of the collection is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Pending,
    High,
    Medium,
    Low,
}

impl FilterMode {
    pub const ALL: [FilterMode; 6] = [
        FilterMode::All,
        FilterMode::Completed,
        FilterMode::Pending,
        FilterMode::High,
        FilterMode::Medium,
        FilterMode::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Completed => "completed",
            FilterMode::Pending => "pending",
            FilterMode::High => "high",
            FilterMode::Medium => "medium",
            FilterMode::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Completed => "Completed",
            FilterMode::Pending => "Pending",
            FilterMode::High => "High",
            FilterMode::Medium => "Medium",
            FilterMode::Low => "Low",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => task.completed,
            FilterMode::Pending => !task.completed,
            FilterMode::High => task.priority == Priority::High,
            FilterMode::Medium => task.priority == Priority::Medium,
            FilterMode::Low => task.priority == Priority::Low,
        }
    }

    pub fn next(self) -> FilterMode {
        let idx = Self::ALL.iter().position(|mode| *mode == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> FilterMode {
        let idx = Self::ALL.iter().position(|mode| *mode == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown filter '{normalized}' (expected all|completed|pending|high|medium|low)"
                ))
            })
    }
}

/// Non-persisted view state: filter mode, search query, selected categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub mode: FilterMode,
    pub query: String,
    selected: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Add `label` to the selection, or remove it if already selected.
    pub fn toggle_category(&mut self, label: &str) {
        if let Some(pos) = self.selected.iter().position(|item| item == label) {
            self.selected.remove(pos);
        } else {
            self.selected.push(label.to_string());
        }
    }

    pub fn clear_categories(&mut self) {
        self.selected.clear();
    }

    pub fn selected_categories(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.iter().any(|item| item == label)
    }

    /// Whether search or category narrowing is in effect.
    pub fn is_narrowed(&self) -> bool {
        !self.query.is_empty() || !self.selected.is_empty()
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        visible(tasks, self.mode, &self.query, &self.selected)
    }
}

/// Tasks passing the mode, search, and category predicates, in input order.
pub fn visible<'a>(
    tasks: &'a [Task],
    mode: FilterMode,
    query: &str,
    selected_categories: &[String],
) -> Vec<&'a Task> {
    let query_norm = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| mode.matches(task))
        .filter(|task| matches_search(task, &query_norm))
        .filter(|task| matches_categories(task, selected_categories))
        .collect()
}

fn matches_search(task: &Task, query_norm: &str) -> bool {
    if query_norm.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(query_norm)
        || task.description.to_lowercase().contains(query_norm)
        || task
            .categories
            .iter()
            .any(|category| category.to_lowercase().contains(query_norm))
}

fn matches_categories(task: &Task, selected: &[String]) -> bool {
    selected.is_empty() || selected.iter().any(|label| task.has_category(label))
}

/// Per-mode totals over the full collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub all: usize,
    pub completed: usize,
    pub pending: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TaskCounts {
    pub fn for_mode(&self, mode: FilterMode) -> usize {
        match mode {
            FilterMode::All => self.all,
            FilterMode::Completed => self.completed,
            FilterMode::Pending => self.pending,
            FilterMode::High => self.high,
            FilterMode::Medium => self.medium,
            FilterMode::Low => self.low,
        }
    }
}

pub fn counts(tasks: &[Task]) -> TaskCounts {
    let mut counts = TaskCounts {
        all: tasks.len(),
        ..TaskCounts::default()
    };
    for task in tasks {
        if task.completed {
            counts.completed += 1;
        } else {
            counts.pending += 1;
        }
        match task.priority {
            Priority::High => counts.high += 1,
            Priority::Medium => counts.medium += 1,
            Priority::Low => counts.low += 1,
        }
    }
    counts
}

/// Distinct category labels in first-seen order.
pub fn available_categories(tasks: &[Task]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for category in tasks.iter().flat_map(|task| task.categories.iter()) {
        if seen.insert(category.as_str()) {
            labels.push(category.clone());
        }
    }
    labels
}

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_at().is_some_and(|due| due < now)
}

pub fn overdue_count(tasks: &[Task], now: DateTime<Utc>) -> usize {
    tasks.iter().filter(|task| is_overdue(task, now)).count()
}

/// Deadline classification used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    /// No deadline, or one that does not parse
    NoDeadline,
    Done,
    Overdue,
    DueSoon,
    Later,
}

impl DueState {
    pub fn label(self) -> &'static str {
        match self {
            DueState::NoDeadline => "",
            DueState::Done => "done",
            DueState::Overdue => "overdue",
            DueState::DueSoon => "due soon",
            DueState::Later => "later",
        }
    }
}

pub fn due_state(task: &Task, now: DateTime<Utc>, soon_window: Duration) -> DueState {
    let Some(due) = task.due_at() else {
        return DueState::NoDeadline;
    };
    if task.completed {
        DueState::Done
    } else if due < now {
        DueState::Overdue
    } else if due - now < soon_window {
        DueState::DueSoon
    } else {
        DueState::Later
    }
}

/// A run of text, flagged when it matches the search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Split `text` into matching and non-matching runs for `query`.
///
/// Matching is literal and case-insensitive; every non-overlapping
/// occurrence is flagged. An empty query yields the whole text unmatched.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let needle = query.to_lowercase();
    if needle.is_empty() || text.is_empty() {
        return vec![Segment {
            text,
            matched: false,
        }];
    }

    // Fold the same way `visible` does, remembering which source char
    // produced each folded byte.
    let haystack = text.to_lowercase();
    let mut origin = Vec::with_capacity(haystack.len());
    let mut folded = haystack.chars();
    for (byte, ch) in text.char_indices() {
        for _ in 0..ch.to_lowercase().count() {
            if let Some(lower) = folded.next() {
                origin.extend(std::iter::repeat(byte).take(lower.len_utf8()));
            }
        }
    }
    origin.resize(haystack.len(), text.len());

    let mut segments = Vec::new();
    let mut plain_start = 0;
    for (folded_start, found) in haystack.match_indices(needle.as_str()) {
        let start = origin[folded_start].max(plain_start);
        let last = origin[folded_start + found.len() - 1];
        let end = last + text[last..].chars().next().map_or(0, char::len_utf8);
        if end <= start {
            continue;
        }
        if plain_start < start {
            segments.push(Segment {
                text: &text[plain_start..start],
                matched: false,
            });
        }
        segments.push(Segment {
            text: &text[start..end],
            matched: true,
        });
        plain_start = end;
    }

    if plain_start < text.len() {
        segments.push(Segment {
            text: &text[plain_start..],
            matched: false,
        });
    }
    segments
}

/// Message shown when the visible list is empty.
pub fn empty_state_message(filter: &FilterState) -> &'static str {
    if filter.is_narrowed() {
        "No tasks found"
    } else {
        "No tasks yet"
    }
}
