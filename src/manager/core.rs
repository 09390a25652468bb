use crate::cache::{CacheStrategy, ResolveCache};
use crate::error::{Error, Result};
use crate::events::ChangeNotifier;
use crate::migrate::{CURRENT_VERSION, Migrator};
use crate::profiles::ProfileStore;
use crate::schema::{ConfigSchema, SchemaValidator, ValidatorPlugin};
use crate::scope::{Scope, ScopeStore};
use crate::storage::{JsonProvider, PersistenceProvider};
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Configuration for constructing a [`ConfigurationManager`]
pub struct ManagerConfig<P: PersistenceProvider = JsonProvider> {
    /// Application name, used for the default base directory
    pub app_name: String,
    /// Base storage location for scope files, profiles, and backups
    pub base_dir: PathBuf,
    /// Persistence provider for all documents
    pub provider: P,
    /// Strategy for the resolved-read cache
    pub cache_strategy: CacheStrategy,
    /// Migration chain applied to persisted trees at load time
    pub migrator: Option<Migrator>,
}

/// Builder for [`ManagerConfig`]
pub struct ManagerConfigBuilder<P: PersistenceProvider = JsonProvider> {
    app_name: String,
    base_dir: Option<PathBuf>,
    provider: P,
    cache_strategy: CacheStrategy,
    migrator: Option<Migrator>,
}

impl ManagerConfigBuilder<JsonProvider> {
    /// Start a builder with the default JSON provider
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            base_dir: None,
            provider: JsonProvider::new(),
            cache_strategy: CacheStrategy::default(),
            migrator: Some(Migrator::with_builtin_chain()),
        }
    }
}

impl<P: PersistenceProvider> ManagerConfigBuilder<P> {
    /// Override the base storage location
    #[must_use]
    pub fn base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Swap the persistence provider
    pub fn provider<Q: PersistenceProvider>(self, provider: Q) -> ManagerConfigBuilder<Q> {
        ManagerConfigBuilder {
            app_name: self.app_name,
            base_dir: self.base_dir,
            provider,
            cache_strategy: self.cache_strategy,
            migrator: self.migrator,
        }
    }

    /// Set the cache strategy
    #[must_use]
    pub fn cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.cache_strategy = strategy;
        self
    }

    /// Replace the load-time migration chain
    #[must_use]
    pub fn migrator(mut self, migrator: Migrator) -> Self {
        self.migrator = Some(migrator);
        self
    }

    /// Disable load-time migration entirely
    #[must_use]
    pub fn without_migrations(mut self) -> Self {
        self.migrator = None;
        self
    }

    /// Finish the builder and construct the manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be created or the cache
    /// strategy is invalid.
    pub fn build(self) -> Result<ConfigurationManager<P>> {
        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Cannot determine user config directory".into()))?
                .join(&self.app_name),
        };
        ConfigurationManager::new(ManagerConfig {
            app_name: self.app_name,
            base_dir,
            provider: self.provider,
            cache_strategy: self.cache_strategy,
            migrator: self.migrator,
        })
    }
}

// =============================================================================
// Configuration Manager
// =============================================================================

/// Façade over scopes, profiles, validation, caching, persistence, change
/// notification, migration, and backups.
///
/// This is the only type external callers use directly. The hosting
/// application owns the instance and passes it where needed; there is no
/// process-wide singleton.
///
/// Interior locks guard individual structures for memory safety only. The
/// manager gives no ordering guarantee between concurrent writers; callers
/// mutating from multiple threads must supply external mutual exclusion.
///
/// # Example
///
/// ```rust,no_run
/// use layerconf::ConfigurationManager;
///
/// let manager = ConfigurationManager::builder("my-app")
///     .base_dir("~/.config/my-app")
///     .build()?;
///
/// manager.set("ui.theme", "dark");
/// let theme = manager.get("ui.theme");
/// # Ok::<(), layerconf::Error>(())
/// ```
pub struct ConfigurationManager<P: PersistenceProvider = JsonProvider> {
    /// Base storage location
    pub(crate) base_dir: PathBuf,
    /// Persistence provider
    pub(crate) provider: P,
    /// One tree per scope
    pub(crate) scopes: RwLock<ScopeStore>,
    /// Named profiles plus active selection
    pub(crate) profiles: RwLock<ProfileStore>,
    /// Registered schemas
    pub(crate) validator: RwLock<SchemaValidator>,
    /// Resolved-read cache
    pub(crate) cache: ResolveCache,
    /// Change listeners
    pub(crate) events: ChangeNotifier,
    /// Load-time migration chain
    pub(crate) migrator: Option<Migrator>,
}

impl ConfigurationManager<JsonProvider> {
    /// Create a builder for `ConfigurationManager` with a fluent API.
    ///
    /// This is the recommended way to create a manager.
    pub fn builder(app_name: impl Into<String>) -> ManagerConfigBuilder<JsonProvider> {
        ManagerConfigBuilder::new(app_name)
    }
}

impl<P: PersistenceProvider> ConfigurationManager<P> {
    /// Create a manager against a base storage location.
    ///
    /// Loads the `global` and `user` trees and all profiles. A missing or
    /// corrupt file yields an empty tree, never an error. Persisted trees
    /// whose `system.version` is behind the migration chain tip are migrated
    /// forward and re-persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be created or the cache
    /// strategy is invalid.
    pub fn new(config: ManagerConfig<P>) -> Result<Self> {
        std::fs::create_dir_all(&config.base_dir).map_err(|e| Error::DirectoryCreate {
            path: config.base_dir.clone(),
            source: e,
        })?;

        let manager = Self {
            cache: ResolveCache::new(config.cache_strategy)?,
            base_dir: config.base_dir,
            provider: config.provider,
            scopes: RwLock::new(ScopeStore::new()),
            profiles: RwLock::new(ProfileStore::new()),
            validator: RwLock::new(SchemaValidator::new()),
            events: ChangeNotifier::new(),
            migrator: config.migrator,
        };

        {
            let mut scopes = manager.scopes.write_recovered();
            for scope in [Scope::Global, Scope::User] {
                let tree = manager.load_scope_tree(scope);
                scopes.replace(scope, tree);
            }
        }

        let profiles = manager.load_profile_store();
        *manager.profiles.write_recovered() = profiles;

        info!(
            "Initialized ConfigurationManager for '{}' at {}",
            config.app_name,
            manager.base_dir.display()
        );
        Ok(manager)
    }

    /// Best-effort load of a persisted scope tree, migrating stale versions
    fn load_scope_tree(&self, scope: Scope) -> ConfigValue {
        let path = self.scope_path(scope);
        if !self.provider.exists(&path) {
            return ConfigValue::object();
        }

        let tree: ConfigValue = match self.provider.load::<ConfigValue>(&path) {
            Ok(tree) if tree.is_object() => tree,
            Ok(_) => {
                warn!("Scope file {} has a non-object root, starting empty", path.display());
                return ConfigValue::object();
            }
            Err(e) => {
                warn!("Failed to load scope file {}: {e}, starting empty", path.display());
                return ConfigValue::object();
            }
        };

        self.migrate_if_stale(scope, tree, &path)
    }

    /// Migrate a loaded tree forward when its stamp is behind the chain tip
    fn migrate_if_stale(&self, scope: Scope, tree: ConfigValue, path: &Path) -> ConfigValue {
        let Some(migrator) = &self.migrator else {
            return tree;
        };
        let Some(stamp) = tree
            .get_path("system.version")
            .and_then(|v| v.as_str())
            .map(String::from)
        else {
            return tree;
        };
        if stamp == CURRENT_VERSION || !migrator.can_migrate(&stamp, CURRENT_VERSION) {
            return tree;
        }

        match migrator.migrate(&tree, &stamp, CURRENT_VERSION) {
            Ok(migrated) => {
                info!("Migrated {scope} scope from {stamp} to {CURRENT_VERSION}");
                if let Err(e) = self.provider.save(path, &migrated) {
                    warn!("Failed to persist migrated {scope} scope: {e}");
                }
                migrated
            }
            Err(e) => {
                warn!("Migration of {scope} scope failed: {e}, keeping loaded tree");
                tree
            }
        }
    }

    /// Best-effort load of the profiles file
    fn load_profile_store(&self) -> ProfileStore {
        let path = self.profiles_path();
        if !self.provider.exists(&path) {
            return ProfileStore::new();
        }
        match self.provider.load(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!("Failed to load profiles file {}: {e}, starting empty", path.display());
                ProfileStore::new()
            }
        }
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Path of a persisted scope file
    pub(crate) fn scope_path(&self, scope: Scope) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", scope.file_stem(), self.provider.extension()))
    }

    /// Path of the profiles file
    pub(crate) fn profiles_path(&self) -> PathBuf {
        self.base_dir
            .join(format!("profiles.{}", self.provider.extension()))
    }

    /// Directory holding backup files
    pub(crate) fn backups_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    // =========================================================================
    // Accessors & registration
    // =========================================================================

    /// Base storage location
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The persistence provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The change notifier, for direct listener management
    pub fn events(&self) -> &ChangeNotifier {
        &self.events
    }

    /// Register a change listener invoked with `(key, old, new)` after every
    /// successful mutation
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&str, &ConfigValue, &ConfigValue) + Send + Sync + 'static,
    {
        self.events.subscribe(listener);
    }

    /// Register a schema; re-registration under the same name overwrites
    pub fn register_schema(&self, schema: ConfigSchema) {
        self.validator.write_recovered().register_schema(schema);
    }

    /// Register a validator plugin's rules as a schema
    pub fn register_validator_plugin(&self, plugin: &dyn ValidatorPlugin) {
        self.validator.write_recovered().register_plugin(plugin);
    }

    /// The load-time migrator, when enabled
    pub fn migrator(&self) -> Option<&Migrator> {
        self.migrator.as_ref()
    }
}
