//! # layerconf - Layered Configuration Resolution Engine
//!
//! A library for storing, merging, validating, caching, persisting,
//! migrating, and backing up structured configuration data across multiple
//! precedence scopes and optional named profiles.
//!
//! ## Features
//!
//! - **Scoped Storage**: Four independent layers (`Global`, `User`,
//!   `Session`, `Temporary`) with a fixed, named resolution order
//! - **Profiles**: Named settings bundles acting as a fallback layer below
//!   all scopes, with at most one active at a time
//! - **Schema Validation**: Named rule-sets evaluated against whole scope
//!   trees on every validated write
//! - **Caching**: Memoized resolved reads with coarse, never-stale
//!   invalidation on any mutation
//! - **Persistence**: Pluggable JSON (default) or YAML scope files with
//!   atomic writes
//! - **Change Events**: Ordered listeners receiving `(key, old, new)` after
//!   every successful mutation
//! - **Migration**: A versioned chain of tree transforms applied to
//!   persisted configuration
//! - **Backup & Restore**: Point-in-time snapshots of all persisted scopes
//!   and profiles
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use layerconf::{ConfigurationManager, Scope, SetOptions};
//!
//! let manager = ConfigurationManager::builder("my-app")
//!     .base_dir("~/.config/my-app")
//!     .build()?;
//!
//! // User-scope write with validation and persistence
//! manager.set("ui.theme", "dark");
//!
//! // Session-scope write, in memory only
//! manager.set_with(
//!     "ui.zoom",
//!     1.25,
//!     SetOptions::default().scope(Scope::Session).in_memory(),
//! );
//!
//! // Resolution searches Global, User, Session, Temporary, then the
//! // active profile
//! let theme = manager.get_or("ui.theme", "light".into());
//! # Ok::<(), layerconf::Error>(())
//! ```
//!
//! ## Validation
//!
//! ```rust,no_run
//! use layerconf::{ConfigSchema, ConfigurationManager, ValidationRule};
//!
//! # let manager = ConfigurationManager::builder("my-app").build()?;
//! manager.register_schema(
//!     ConfigSchema::new("onboarding", "1.0.0").rule(ValidationRule::one_of(
//!         "onboarding.user_level",
//!         &["beginner", "intermediate", "advanced"],
//!     )),
//! );
//!
//! // Rejected: every registered schema runs against the candidate tree
//! assert!(!manager.set("onboarding.user_level", "wizard"));
//! # Ok::<(), layerconf::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! All operations are synchronous and run to completion on the calling
//! thread. The engine provides no ordering guarantee between concurrent
//! writers; callers performing read-modify-write sequences from multiple
//! threads must supply external mutual exclusion.

// Core modules
mod error;
mod events;
mod manager;
mod sync;

pub mod backup;
pub mod cache;
pub mod migrate;
pub mod profiles;
pub mod schema;
pub mod scope;
pub mod storage;
pub mod value;

// Re-exports from core
pub use backup::{BackupInfo, BackupManager, BackupRecord};
pub use cache::CacheStrategy;
pub use error::{Error, Result};
pub use events::ChangeNotifier;
pub use manager::{
    ConfigurationManager, ExportDocument, ManagerConfig, ManagerConfigBuilder, SetOptions,
};
pub use migrate::{CURRENT_VERSION, MigrationStep, Migrator};
pub use profiles::{ConfigurationProfile, ProfileStore};
pub use schema::{ConfigSchema, SchemaValidator, ValidationRule, ValidatorPlugin};
pub use scope::{Scope, ScopeStore};
pub use storage::{JsonProvider, PersistenceProvider};
pub use value::{ConfigMap, ConfigValue};

#[cfg(feature = "yaml")]
pub use storage::YamlProvider;
