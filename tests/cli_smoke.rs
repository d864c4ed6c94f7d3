mod support;

use predicates::str::contains;

use support::{tasktrack_cmd, DataDir};

#[test]
fn tasktrack_help_works() {
    tasktrack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Personal task tracker"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "login",
        "logout",
        "whoami",
        "add",
        "edit",
        "toggle",
        "rm",
        "list",
        "show",
        "stats",
        "categories",
        "ui",
    ];

    for cmd in subcommands {
        tasktrack_cmd().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn data_dir_flag_overrides_env() {
    let env_dir = DataDir::new();
    let flag_dir = DataDir::new();

    env_dir
        .cmd()
        .args(["login", "alice", "--data-dir"])
        .arg(flag_dir.path())
        .assert()
        .success();

    assert!(flag_dir.read_file("taskTracker_user").is_some());
    assert!(env_dir.read_file("taskTracker_user").is_none());
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let data = DataDir::new();
    data.write_file("config.toml", "[session]\nmin_username_len = 0\n")
        .expect("write config");

    data.cmd()
        .args(["login", "a"])
        .assert()
        .code(2)
        .stderr(contains("Username must be at least 2 characters"));
}

#[test]
fn config_min_username_len_is_honored() {
    let data = DataDir::new();
    data.write_file("config.toml", "[session]\nmin_username_len = 4\n")
        .expect("write config");

    data.cmd()
        .args(["login", "bob"])
        .assert()
        .code(2)
        .stderr(contains("Username must be at least 4 characters"));
    data.cmd().args(["login", "bobby"]).assert().success();
}

#[test]
fn config_default_priority_applies_to_new_tasks() {
    let data = DataDir::new();
    data.write_file("config.toml", "[tasks]\ndefault_priority = \"high\"\n")
        .expect("write config");
    data.login("alice");

    let value = data.json(&["add", "Ship it"]);
    assert_eq!(value["data"]["task"]["priority"], "high");
}
