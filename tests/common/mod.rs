#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { _tmp: tmp, home }
    }

    pub fn with_config(toml: &str) -> Self {
        let env = Self::new();
        let dir = env.home.join(".config/vawards");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("config.toml"), toml).expect("write config");
        env
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.home.join(".local/share/vawards/nominations.json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("vawards");
        cmd.env("HOME", &self.home)
            .env_remove("KOBO_KPI_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Runs a command expected to fail and returns its JSON error envelope.
    pub fn run_json_err(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json error output")
    }

    pub fn create(&self, nominator: &str, nominee: &str, cycle: &str, why: &str) -> String {
        let v = self.run_json(&[
            "create",
            "--nominator",
            nominator,
            "--nominee",
            nominee,
            "--cycle",
            cycle,
            "--justification",
            why,
        ]);
        v["data"]["id"].as_str().expect("id").to_string()
    }
}
