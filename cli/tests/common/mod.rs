//! Common test utilities and fixtures
//!
//! This module provides shared test helpers for artifetch CLI tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a command whose config, data and home directories live in a temp dir
pub fn cmd_with_temp_home() -> (Command, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cmd = cmd_in_home(temp_dir.path());
    (cmd, temp_dir)
}

/// Creates a command that uses `home` as its home directory
pub fn cmd_in_home(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("artifetch").expect("Failed to find artifetch binary");
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes an artifact into a repository directory in Maven 2 layout
pub fn seed_artifact(repo: &Path, group: &str, artifact: &str, version: &str, content: &[u8]) -> PathBuf {
    let path = repo
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version)
        .join(format!("{}-{}.jar", artifact, version));
    fs::create_dir_all(path.parent().expect("artifact path has a parent"))
        .expect("Failed to create artifact directory");
    fs::write(&path, content).expect("Failed to write artifact");
    path
}
