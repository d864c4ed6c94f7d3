//! Migration of stored task records into the current `Task` shape.
//!
//! Records written by older versions may lack `priority`, `categories`, or
//! `dueDate`, or carry values of the wrong type. Normalization never fails:
//! every object record becomes a valid `Task`.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::task::{clean_categories, format_timestamp, Priority, Task, TaskId};

const UNTITLED: &str = "Untitled task";

/// Coerce one raw record into a `Task`.
///
/// A missing or unreadable `id` becomes 0; `normalize_all` repairs it.
pub fn normalize(raw: &Value, now: DateTime<Utc>) -> Task {
    Task {
        id: read_id(raw.get("id")),
        title: read_title(raw.get("title")),
        description: raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        completed: raw.get("completed").map(is_truthy).unwrap_or(false),
        created_at: read_created_at(raw.get("createdAt"), now),
        priority: read_priority(raw.get("priority")),
        due_date: raw
            .get("dueDate")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        categories: read_categories(raw.get("categories")),
    }
}

/// Normalize a stored collection, skipping non-object entries and repairing
/// ids so the result holds the uniqueness invariant.
pub fn normalize_all(records: &[Value], now: DateTime<Utc>) -> Vec<Task> {
    let mut tasks: Vec<Task> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            if record.is_object() {
                Some(normalize(record, now))
            } else {
                tracing::warn!(index, "skipping stored task that is not an object");
                None
            }
        })
        .collect();
    repair_ids(&mut tasks);
    tasks
}

fn repair_ids(tasks: &mut [Task]) {
    let mut seen: HashSet<TaskId> = HashSet::new();
    let mut repairs = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        if !(task.id > 0 && seen.insert(task.id)) {
            repairs.push(index);
        }
    }
    for index in repairs {
        let new_id = unused_id(&seen);
        tracing::warn!(old_id = tasks[index].id, new_id, "reassigning task id");
        tasks[index].id = new_id;
        seen.insert(new_id);
    }
}

/// The smallest id above every taken one, or the lowest free positive id
/// once the maximum is `TaskId::MAX`.
pub(crate) fn unused_id(taken: &HashSet<TaskId>) -> TaskId {
    let max = taken.iter().copied().max().unwrap_or(0).max(0);
    match max.checked_add(1) {
        Some(id) => id,
        None => (1..=TaskId::MAX)
            .find(|id| !taken.contains(id))
            .unwrap_or(1),
    }
}

fn read_id(value: Option<&Value>) -> TaskId {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn read_title(value: Option<&Value>) -> String {
    let title = match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    };
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

fn read_created_at(value: Option<&Value>, now: DateTime<Utc>) -> String {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .map(format_timestamp)
            .unwrap_or_else(|| format_timestamp(now)),
        _ => format_timestamp(now),
    }
}

fn read_priority(value: Option<&Value>) -> Priority {
    match value {
        None | Some(Value::Null) => Priority::Medium,
        Some(Value::String(text)) => text.parse().unwrap_or_else(|_| {
            tracing::warn!(priority = %text, "unknown stored priority, using medium");
            Priority::Medium
        }),
        Some(other) => {
            tracing::warn!(priority = %other, "non-text stored priority, using medium");
            Priority::Medium
        }
    }
}

fn read_categories(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    clean_categories(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// JavaScript truthiness, which older clients used when writing `completed`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn legacy_record_gets_defaults() {
        let task = normalize(&json!({"id": 1, "title": "x", "completed": true}), now());
        assert_eq!(
            task,
            Task {
                id: 1,
                title: "x".to_string(),
                description: String::new(),
                completed: true,
                created_at: "2025-03-01T12:00:00.000Z".to_string(),
                priority: Priority::Medium,
                due_date: None,
                categories: Vec::new(),
            }
        );
    }

    #[test]
    fn canonical_record_is_unchanged() {
        let original = Task {
            id: 1705312800000,
            title: "Review".to_string(),
            description: "ES6 features".to_string(),
            completed: false,
            created_at: "2024-01-15T10:00:00.000Z".to_string(),
            priority: Priority::High,
            due_date: Some("2024-01-20T09:00".to_string()),
            categories: vec!["study".to_string()],
        };
        let raw = serde_json::to_value(&original).expect("serialize");
        assert_eq!(normalize(&raw, now()), original);
    }

    #[test]
    fn out_of_enum_priority_is_sanitized() {
        let task = normalize(&json!({"id": 1, "title": "x", "priority": "urgent"}), now());
        assert_eq!(task.priority, Priority::Medium);
        let task = normalize(&json!({"id": 1, "title": "x", "priority": "High"}), now());
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn completed_uses_truthiness() {
        let cases = [
            (json!(1), true),
            (json!(0), false),
            (json!("yes"), true),
            (json!(""), false),
            (json!(null), false),
        ];
        for (value, expected) in cases {
            let task = normalize(&json!({"id": 1, "title": "x", "completed": value}), now());
            assert_eq!(task.completed, expected);
        }
    }

    #[test]
    fn categories_must_be_an_array_of_text() {
        let task = normalize(&json!({"id": 1, "title": "x", "categories": "work"}), now());
        assert!(task.categories.is_empty());
        let task = normalize(
            &json!({"id": 1, "title": "x", "categories": ["work", 3, " ", "home"]}),
            now(),
        );
        assert_eq!(task.categories, vec!["work".to_string(), "home".to_string()]);
    }

    #[test]
    fn missing_title_gets_placeholder() {
        let task = normalize(&json!({"id": 1}), now());
        assert_eq!(task.title, UNTITLED);
    }

    #[test]
    fn numeric_created_at_is_epoch_millis() {
        let task = normalize(&json!({"id": 1, "title": "x", "createdAt": 0}), now());
        assert_eq!(task.created_at, "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn normalize_all_repairs_missing_and_duplicate_ids() {
        let records = vec![
            json!({"id": 5, "title": "a"}),
            json!({"title": "b"}),
            json!({"id": 5, "title": "c"}),
            json!("garbage"),
        ];
        let tasks = normalize_all(&records, now());
        let ids: Vec<TaskId> = tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[test]
    fn maximal_id_is_kept_without_overflow() {
        let tasks = normalize_all(&[json!({"id": i64::MAX, "title": "x"})], now());
        assert_eq!(tasks[0].id, i64::MAX);
    }

    #[test]
    fn repair_after_maximal_id_uses_lowest_free_id() {
        let records = vec![
            json!({"id": 1e300, "title": "huge"}),
            json!({"id": 1, "title": "one"}),
            json!({"title": "missing"}),
            json!({"id": -4, "title": "negative"}),
        ];
        let tasks = normalize_all(&records, now());
        let ids: Vec<TaskId> = tasks.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![i64::MAX, 1, 2, 3]);
    }
}
