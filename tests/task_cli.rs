mod support;

use predicates::str::contains;
use serde_json::Value;

use support::DataDir;

fn logged_in() -> DataDir {
    let data = DataDir::new();
    data.login("alice");
    data
}

fn list_titles(data: &DataDir, args: &[&str]) -> Vec<String> {
    let mut full = vec!["list"];
    full.extend_from_slice(args);
    let value = data.json(&full);
    value["data"]["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|task| task["title"].as_str().expect("title").to_string())
        .collect()
}

#[test]
fn add_list_toggle_rm_flow() {
    let data = logged_in();

    let value = data.json(&[
        "add",
        "  Buy milk  ",
        "-d",
        "two litres",
        "-p",
        "high",
        "-c",
        "home",
        "-c",
        " home ",
    ]);
    assert_eq!(value["schema_version"], "tasktrack.v1");
    assert_eq!(value["command"], "add");
    assert_eq!(value["status"], "success");
    let task = &value["data"]["task"];
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["description"], "two litres");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["completed"], false);
    assert_eq!(task["categories"], serde_json::json!(["home"]));
    assert_eq!(task["due_state"], "no_deadline");
    assert!(task["createdAt"].as_str().expect("createdAt").ends_with('Z'));
    let milk = task["id"].as_i64().expect("id");

    let call = data.add(&["Call mom"]);
    assert_eq!(list_titles(&data, &[]), vec!["Call mom", "Buy milk"]);

    let value = data.json(&["toggle", &milk.to_string()]);
    assert_eq!(value["data"]["task"]["completed"], true);
    assert_eq!(list_titles(&data, &["-f", "completed"]), vec!["Buy milk"]);
    assert_eq!(list_titles(&data, &["-f", "pending"]), vec!["Call mom"]);

    data.cmd()
        .args(["done", &milk.to_string()])
        .assert()
        .success()
        .stdout(contains("Reopened \"Buy milk\""));

    let value = data.json(&["rm", &call.to_string(), "--yes"]);
    assert_eq!(value["data"]["deleted"], true);
    assert_eq!(value["data"]["title"], "Call mom");
    assert_eq!(list_titles(&data, &[]), vec!["Buy milk"]);
}

#[test]
fn add_rejects_blank_title() {
    let data = logged_in();

    let output = data
        .cmd()
        .args(["add", "   ", "--json"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("error envelope");
    assert_eq!(value["error"]["message"], "Task title is required");
    assert_eq!(value["error"]["kind"], "validation");
    assert!(data.read_file("taskTracker_tasks").is_none());
}

#[test]
fn add_rejects_bad_due_date_and_priority() {
    let data = logged_in();

    data.cmd()
        .args(["add", "Pay rent", "--due", "next tuesday"])
        .assert()
        .code(2)
        .stderr(contains("Invalid due date"));
    data.cmd()
        .args(["add", "Pay rent", "-p", "urgent"])
        .assert()
        .code(2)
        .stderr(contains("unknown priority"));
}

#[test]
fn edit_changes_only_given_fields() {
    let data = logged_in();
    let id = data.add(&["Draft", "-d", "first pass", "--due", "2030-01-15", "-c", "work"]);
    let id = id.to_string();

    let value = data.json(&["edit", &id, "--title", "Draft v2", "-p", "low"]);
    let task = &value["data"]["task"];
    assert_eq!(task["title"], "Draft v2");
    assert_eq!(task["priority"], "low");
    assert_eq!(task["description"], "first pass");
    assert_eq!(task["dueDate"], "2030-01-15");
    assert_eq!(task["categories"], serde_json::json!(["work"]));

    let value = data.json(&["edit", &id, "--clear-due", "--clear-categories"]);
    let task = &value["data"]["task"];
    assert!(task.get("dueDate").is_none());
    assert_eq!(task["categories"], serde_json::json!([]));
    assert_eq!(task["title"], "Draft v2");
}

#[test]
fn edit_rejects_blank_title_and_keeps_task() {
    let data = logged_in();
    let id = data.add(&["Keep"]).to_string();

    data.cmd()
        .args(["edit", &id, "--title", " "])
        .assert()
        .code(2)
        .stderr(contains("Task title is required"));

    let value = data.json(&["show", &id]);
    assert_eq!(value["data"]["title"], "Keep");
}

#[test]
fn unknown_and_malformed_ids() {
    let data = logged_in();

    let output = data
        .cmd()
        .args(["show", "424242", "--json"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("error envelope");
    assert_eq!(value["error"]["details"]["id"], 424242);
    assert_eq!(value["next_steps"][0], "tasktrack list");

    data.cmd()
        .args(["toggle", "abc"])
        .assert()
        .code(2)
        .stderr(contains("invalid task id 'abc'"));
}

#[test]
fn rm_prompt_can_be_declined() {
    let data = logged_in();
    let id = data.add(&["Precious"]).to_string();

    data.cmd()
        .args(["rm", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Delete cancelled"))
        .stderr(contains("Are you sure you want to delete \"Precious\"?"));
    assert_eq!(list_titles(&data, &[]), vec!["Precious"]);

    data.cmd()
        .args(["rm", &id])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(contains("Deleted \"Precious\""));
    assert!(list_titles(&data, &[]).is_empty());
}

#[test]
fn list_search_and_category_filters() {
    let data = logged_in();
    data.add(&["Write report", "-d", "quarterly numbers", "-c", "work"]);
    data.add(&["Buy milk", "-c", "home"]);
    data.add(&["Plan trip", "-d", "Report back to family", "-c", "home", "-c", "travel"]);

    assert_eq!(
        list_titles(&data, &["-s", "REPORT"]),
        vec!["Plan trip", "Write report"]
    );
    assert_eq!(list_titles(&data, &["-c", "home"]), vec!["Plan trip", "Buy milk"]);
    assert_eq!(
        list_titles(&data, &["-c", "work", "-c", "travel"]),
        vec!["Plan trip", "Write report"]
    );
    assert_eq!(list_titles(&data, &["-c", "home", "-s", "milk"]), vec!["Buy milk"]);

    data.cmd()
        .args(["list", "-s", "zzz"])
        .assert()
        .success()
        .stdout(contains("No tasks found"));
}

#[test]
fn list_rejects_unknown_filter() {
    let data = logged_in();

    data.cmd()
        .args(["list", "-f", "someday"])
        .assert()
        .code(2);
}

#[test]
fn empty_list_message() {
    let data = logged_in();

    data.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No tasks yet"));
}

#[test]
fn stats_and_categories() {
    let data = logged_in();
    let a = data.add(&["A", "-p", "high", "-c", "work"]);
    data.add(&["B", "-p", "low", "-c", "home"]);
    data.add(&["C", "--due", "2000-01-01", "-c", "work"]);
    data.json(&["toggle", &a.to_string()]);

    let value = data.json(&["stats"]);
    let counts = &value["data"]["counts"];
    assert_eq!(counts["all"], 3);
    assert_eq!(counts["completed"], 1);
    assert_eq!(counts["pending"], 2);
    assert_eq!(counts["high"], 1);
    assert_eq!(counts["medium"], 1);
    assert_eq!(counts["low"], 1);
    assert_eq!(value["data"]["overdue"], 1);

    let value = data.json(&["categories"]);
    assert_eq!(value["data"]["categories"], serde_json::json!(["work", "home"]));
}

#[test]
fn overdue_task_is_flagged() {
    let data = logged_in();
    let id = data.add(&["Late", "--due", "2000-01-01"]);

    let value = data.json(&["show", &id.to_string()]);
    assert_eq!(value["data"]["due_state"], "overdue");

    data.json(&["toggle", &id.to_string()]);
    let value = data.json(&["show", &id.to_string()]);
    assert_eq!(value["data"]["due_state"], "done");
}

#[test]
fn corrupt_task_store_starts_empty() {
    let data = logged_in();
    data.write_file("taskTracker_tasks", "{not json")
        .expect("write corrupt store");

    assert!(list_titles(&data, &[]).is_empty());

    data.add(&["Fresh start"]);
    assert_eq!(list_titles(&data, &[]), vec!["Fresh start"]);
}

#[test]
fn legacy_records_are_normalized() {
    let data = logged_in();
    data.write_file(
        "taskTracker_tasks",
        r#"[
            {"id": 5, "title": "Old", "completed": true, "createdAt": "2024-01-15T10:00:00.000Z"},
            {"id": 5, "title": "Dup", "priority": "urgent", "categories": ["a", " a ", ""]},
            {"description": "no title or id"}
        ]"#,
    )
    .expect("write legacy store");

    let value = data.json(&["list"]);
    let tasks = value["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0]["priority"], "medium");
    assert_eq!(tasks[0]["categories"], serde_json::json!([]));
    assert_eq!(tasks[1]["priority"], "medium");
    assert_eq!(tasks[1]["categories"], serde_json::json!(["a"]));
    assert_eq!(tasks[2]["title"], "Untitled task");

    let ids: Vec<i64> = tasks
        .iter()
        .map(|task| task["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids[0], 5);
    assert_ne!(ids[1], 5);
    assert_ne!(ids[2], ids[1]);
}

#[test]
fn quiet_suppresses_human_output() {
    let data = logged_in();

    data.cmd()
        .args(["add", "Silent", "-q"])
        .assert()
        .success()
        .stdout("");
}
