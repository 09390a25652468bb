//! Versioned configuration migration
//!
//! Migrations form a directed chain of version-to-version tree transforms.
//! `migrate` walks the chain one hop at a time on a working copy and fails
//! with a typed error when no forward edge exists, leaving the caller's tree
//! untouched.

use crate::error::{Error, Result};
use crate::value::ConfigValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Version tag written to `system.version` by the shipped chain tip
pub const CURRENT_VERSION: &str = "1.2.0";

/// Tree transform applied by one migration step
pub type TransformFn = Arc<dyn Fn(ConfigValue) -> ConfigValue + Send + Sync>;

/// One directed edge in the migration chain
#[derive(Clone)]
pub struct MigrationStep {
    /// Source version
    pub from_version: String,
    /// Destination version
    pub to_version: String,
    transform: TransformFn,
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from_version, self.to_version)
    }
}

/// State machine over version strings.
///
/// One forward edge is kept per source version; registering a second edge
/// from the same version replaces the first.
#[derive(Debug, Default)]
pub struct Migrator {
    steps: HashMap<String, MigrationStep>,
}

impl Migrator {
    /// Create a migrator with no registered steps
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a migrator carrying the shipped linear chain
    /// `1.0.0 -> 1.1.0 -> 1.2.0`.
    #[must_use]
    pub fn with_builtin_chain() -> Self {
        let mut migrator = Self::new();

        migrator.register_migration("1.0.0", "1.1.0", |tree| {
            let mut defaults = ConfigValue::object();
            defaults.set_path("discovery.show_tips", true.into());
            defaults.set_path("discovery.show_tutorials", true.into());
            defaults.set_path("discovery.recommendations", true.into());
            stamp(overlay_existing(defaults, &tree), "1.1.0")
        });

        migrator.register_migration("1.1.0", "1.2.0", |tree| {
            let mut defaults = ConfigValue::object();
            defaults.set_path("accessibility.high_contrast", false.into());
            defaults.set_path("accessibility.reduced_motion", false.into());
            defaults.set_path("accessibility.font_scale", 1.0.into());
            stamp(overlay_existing(defaults, &tree), "1.2.0")
        });

        migrator
    }

    /// Register a directed migration edge
    pub fn register_migration<F>(
        &mut self,
        from_version: impl Into<String>,
        to_version: impl Into<String>,
        transform: F,
    ) where
        F: Fn(ConfigValue) -> ConfigValue + Send + Sync + 'static,
    {
        let from_version = from_version.into();
        let to_version = to_version.into();
        log::debug!("Registered migration {from_version} -> {to_version}");
        self.steps.insert(
            from_version.clone(),
            MigrationStep {
                from_version,
                to_version,
                transform: Arc::new(transform),
            },
        );
    }

    /// The single forward edge from a version, if registered
    pub fn next_hop(&self, from_version: &str) -> Option<&MigrationStep> {
        self.steps.get(from_version)
    }

    /// Whether a chain from one version to another is fully registered
    pub fn can_migrate(&self, from_version: &str, to_version: &str) -> bool {
        let mut current = from_version.to_string();
        let mut hops = 0;
        while current != to_version {
            match self.next_hop(&current) {
                Some(step) => current = step.to_version.clone(),
                None => return false,
            }
            hops += 1;
            if hops > self.steps.len() {
                return false;
            }
        }
        true
    }

    /// Migrate a tree from one version to another.
    ///
    /// Transforms run against a working copy; the caller's tree is never
    /// partially mutated.
    ///
    /// # Errors
    ///
    /// Returns `Error::MigrationMissingStep` when no edge exists from the
    /// current version toward the target.
    pub fn migrate(
        &self,
        tree: &ConfigValue,
        from_version: &str,
        to_version: &str,
    ) -> Result<ConfigValue> {
        let mut working = tree.clone();
        let mut current = from_version.to_string();
        let mut hops = 0;

        while current != to_version {
            let step = self
                .next_hop(&current)
                .ok_or_else(|| Error::MigrationMissingStep {
                    from: current.clone(),
                    to: to_version.to_string(),
                })?;
            log::info!("Migrating configuration {current} -> {}", step.to_version);
            working = (step.transform)(working);
            current = step.to_version.clone();

            // A malformed registration could loop; bound by edge count.
            hops += 1;
            if hops > self.steps.len() {
                return Err(Error::MigrationMissingStep {
                    from: current,
                    to: to_version.to_string(),
                });
            }
        }

        Ok(working)
    }
}

/// Merge `tree` over additive defaults so existing values win
fn overlay_existing(mut defaults: ConfigValue, tree: &ConfigValue) -> ConfigValue {
    defaults.deep_merge(tree);
    defaults
}

fn stamp(mut tree: ConfigValue, version: &str) -> ConfigValue {
    tree.set_path("system.version", version.into());
    tree
}

// =============================================================================
// Tests
// =============================================================================
