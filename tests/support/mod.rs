#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway data directory for one test.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.file(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_file(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.file(name)).ok()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = tasktrack_cmd();
        cmd.env("TASKTRACK_DIR", self.path());
        cmd
    }

    /// Run with `--json` and return the parsed envelope; asserts success.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }

    pub fn login(&self, name: &str) {
        self.cmd().args(["login", name]).assert().success();
    }

    /// Create a task and return its id.
    pub fn add(&self, args: &[&str]) -> i64 {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let value = self.json(&full);
        value["data"]["task"]["id"].as_i64().expect("task id")
    }
}

pub fn tasktrack_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tasktrack").expect("binary");
    cmd.env_remove("TASKTRACK_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}
