//! Task model.
//!
//! Tasks are persisted as a JSON array under the `taskTracker_tasks` key with
//! camelCase field names, so the payload stays readable by other clients of
//! the same store.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type TaskId = i64;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority '{other}' (expected low|medium|high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Task {
    /// Parsed deadline, if the task has one in a recognised format.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(parse_timestamp)
    }

    pub fn created_at_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn has_category(&self, label: &str) -> bool {
        self.categories.iter().any(|category| category == label)
    }
}

/// Editable fields of a task, as submitted by a form or command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub categories: Vec<String>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            due_date: task.due_date.clone(),
            categories: task.categories.clone(),
        }
    }

    /// Trim, validate, and clean the input.
    ///
    /// Fails only on an empty title or an unreadable due date.
    pub fn sanitize(self) -> Result<TaskInput> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("Task title is required".to_string()));
        }
        let due_date = validate_due_date(self.due_date)?;
        Ok(TaskInput {
            title,
            description: self.description.trim().to_string(),
            priority: self.priority,
            due_date,
            categories: clean_categories(self.categories),
        })
    }
}

/// Trim labels, drop blanks, and drop repeats while keeping first-seen order.
pub fn clean_categories(categories: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    categories
        .into_iter()
        .map(|category| category.trim().to_string())
        .filter(|category| !category.is_empty())
        .filter(|category| seen.insert(category.clone()))
        .collect()
}

fn validate_due_date(due_date: Option<String>) -> Result<Option<String>> {
    let Some(raw) = due_date else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if parse_timestamp(trimmed).is_none() {
        return Err(Error::Validation(format!(
            "Invalid due date '{trimmed}' (expected YYYY-MM-DD, YYYY-MM-DDTHH:MM, or RFC 3339)"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Parse a stored or user-entered timestamp.
///
/// Naive values carry no offset and are read in local time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(naive);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(local_to_utc)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp the way `createdAt` is stored (millisecond precision, `Z`).
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
