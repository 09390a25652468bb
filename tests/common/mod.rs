//! Common test utilities for layerconf integration tests
//!
//! Provides a shared fixture and helper schemas.

#![allow(dead_code)]

use layerconf::{ConfigSchema, ConfigurationManager, ValidationRule};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture providing a temporary base directory and a manager bound to it
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub manager: ConfigurationManager,
}

impl TestFixture {
    /// Create a fixture with default configuration
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigurationManager::builder("test-app")
            .base_dir(temp_dir.path())
            .build()
            .expect("Failed to create manager");
        Self { temp_dir, manager }
    }

    /// Drop the manager and construct a fresh one against the same base
    /// directory, simulating a process restart.
    pub fn reopen(self) -> Self {
        let TestFixture { temp_dir, manager } = self;
        drop(manager);
        let manager = ConfigurationManager::builder("test-app")
            .base_dir(temp_dir.path())
            .build()
            .expect("Failed to reopen manager");
        Self { temp_dir, manager }
    }

    /// Path of a persisted scope file ("global", "user") or other document
    pub fn file_path(&self, stem: &str) -> PathBuf {
        self.temp_dir.path().join(format!("{stem}.json"))
    }

    /// Raw content of a persisted document, if present
    pub fn read_file(&self, stem: &str) -> Option<String> {
        std::fs::read_to_string(self.file_path(stem)).ok()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Schema constraining `onboarding.user_level` to known levels
pub fn onboarding_schema() -> ConfigSchema {
    ConfigSchema::new("onboarding", "1.0.0").rule(ValidationRule::one_of(
        "onboarding.user_level",
        &["beginner", "intermediate", "advanced"],
    ))
}
