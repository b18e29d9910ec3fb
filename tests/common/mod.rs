//! Shared helpers for driving the `gorb` binary in integration tests.
#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch workspace with an isolated config.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write `value` as pretty JSON under the workspace.
    pub fn write_json(&self, rel: &str, value: &Value) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, serde_json::to_vec_pretty(value).expect("serialize"))
            .expect("write json");
        path
    }

    pub fn write_text(&self, rel: &str, text: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, text).expect("write text");
        path
    }

    pub fn read_json(&self, rel: &str) -> Value {
        read_json(&self.path(rel))
    }

    /// Run `gorb` with `args` from the workspace root.
    pub fn gorb(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_gorb"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("GORB_CONFIG")
            .env_remove("GORB_LM_COMMAND")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .env("HOME", self.dir.path())
            .output()
            .expect("run gorb")
    }
}

pub fn read_json(path: &Path) -> Value {
    let bytes = fs::read(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
    serde_json::from_slice(&bytes).expect("parse json")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Path to a checked-in fixture under `tests/fixtures`.
pub fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(rel)
}
