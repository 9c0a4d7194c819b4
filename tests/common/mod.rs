//! Common test utilities for mergegate integration tests.
//!
//! Provides `TestEnv`, a temporary working directory in which the default
//! `./whitelist.txt` and `./committers.txt` paths resolve.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;
pub use tempfile::TempDir;

/// A test environment with an isolated working directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty working directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the mergegate binary running in the test directory.
    ///
    /// Ambient configuration from the developer's shell is cleared so it
    /// cannot leak into assertions.
    pub fn mergegate(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mergegate"));
        cmd.current_dir(self.dir.path());
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("MERGEGATE_CONFIG");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Get a mergegate Command that reads commit access from `access.txt`.
    pub fn with_file_source(&self) -> Command {
        let mut cmd = self.mergegate();
        cmd.args(["--source-file", "access.txt"]);
        cmd
    }

    /// Write a file relative to the test directory.
    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.path().join(name), contents).unwrap();
    }

    /// Read a file relative to the test directory.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).unwrap()
    }

    /// Whether a file exists relative to the test directory.
    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Get the path to the test directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
