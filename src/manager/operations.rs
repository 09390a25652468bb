use crate::error::{Error, Result};
use crate::manager::core::ConfigurationManager;
use crate::scope::Scope;
use crate::storage::PersistenceProvider;
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

use log::{debug, info, warn};
use std::collections::HashMap;

/// Options for a single mutating write
#[derive(Debug, Clone, Copy)]
pub struct SetOptions {
    /// Target scope (defaults to `User`)
    pub scope: Scope,
    /// Run every registered schema against the candidate tree
    pub validate: bool,
    /// Persist the owning scope when it is `Global` or `User`
    pub persist: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            scope: Scope::User,
            validate: true,
            persist: true,
        }
    }
}

impl SetOptions {
    /// Target a specific scope
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Skip schema validation for this write
    #[must_use]
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Keep this write in memory only
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.persist = false;
        self
    }
}

impl<P: PersistenceProvider> ConfigurationManager<P> {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolve a key across scopes, falling back to the active profile.
    ///
    /// Scopes are searched in resolution order (`Global`, `User`, `Session`,
    /// `Temporary`); the first scope holding a non-null value wins. When no
    /// scope holds the key the active profile's settings tree is consulted.
    /// Resolutions are served from the cache when it already holds the key.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        if let Some(hit) = self.cache.get(key) {
            return Some(hit);
        }
        let resolved = self.resolve(key)?;
        self.cache.insert(key, resolved.clone());
        Some(resolved)
    }

    /// Resolve a key, returning `default` when nothing matches
    pub fn get_or(&self, key: &str, default: ConfigValue) -> ConfigValue {
        self.get(key).unwrap_or(default)
    }

    /// Read a key from one scope only, bypassing cache and profile fallback
    pub fn get_scoped(&self, key: &str, scope: Scope) -> Option<ConfigValue> {
        let scopes = self.scopes.read_recovered();
        scopes
            .tree(scope)
            .get_path(key)
            .filter(|v| !v.is_null())
            .cloned()
    }

    fn resolve(&self, key: &str) -> Option<ConfigValue> {
        {
            let scopes = self.scopes.read_recovered();
            for scope in Scope::RESOLUTION_ORDER {
                if let Some(value) = scopes.tree(scope).get_path(key) {
                    if !value.is_null() {
                        return Some(value.clone());
                    }
                }
            }
        }

        let profiles = self.profiles.read_recovered();
        profiles
            .active()
            .and_then(|p| p.settings.get_path(key))
            .filter(|v| !v.is_null())
            .cloned()
    }

    /// Deep-merge all four scopes plus the active profile into one tree.
    ///
    /// Merge order is `Temporary, Session, User, Global` with later operands
    /// overwriting, so `Global` has the highest effective precedence,
    /// consistent with [`get`](Self::get). The active profile contributes
    /// only keys absent from every scope.
    pub fn get_all_settings(&self) -> ConfigValue {
        let mut merged = {
            let profiles = self.profiles.read_recovered();
            profiles
                .active()
                .map(|p| p.settings.clone())
                .unwrap_or_else(ConfigValue::object)
        };

        let scopes = self.scopes.read_recovered();
        for scope in [Scope::Temporary, Scope::Session, Scope::User, Scope::Global] {
            merged.deep_merge(scopes.tree(scope));
        }
        merged
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Set a key in the `User` scope with validation and persistence.
    ///
    /// Returns `false` when validation or persistence rejects the write; the
    /// reason is logged and available through
    /// [`try_set_with`](Self::try_set_with).
    pub fn set(&self, key: &str, value: impl Into<ConfigValue>) -> bool {
        self.set_with(key, value, SetOptions::default())
    }

    /// Set a key with explicit options, reporting success as a boolean
    pub fn set_with(&self, key: &str, value: impl Into<ConfigValue>, options: SetOptions) -> bool {
        match self.try_set_with(key, value.into(), options) {
            Ok(()) => true,
            Err(e) => {
                warn!("Rejected write to '{key}': {e}");
                false
            }
        }
    }

    /// Set a key with explicit options, surfacing the rejection reason.
    ///
    /// When validation is requested, the candidate mutation is applied to a
    /// copy of the target scope and every registered schema runs against
    /// that copy; any rule failure anywhere in the tree aborts the write.
    /// For persisted scopes the candidate is written to disk before being
    /// committed to memory, so a failed save leaves both untouched.
    /// Listeners observe `(key, old, new)` with the old value captured via
    /// resolved [`get`](Self::get) before the mutation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` carrying every rule's error string, or an
    /// I/O error when persisting the owning scope fails.
    pub fn try_set_with(&self, key: &str, value: ConfigValue, options: SetOptions) -> Result<()> {
        let old_value = self.get(key).unwrap_or(ConfigValue::Null);

        let candidate = {
            let scopes = self.scopes.read_recovered();
            let mut tree = scopes.tree(options.scope).clone();
            tree.set_path(key, value.clone());
            tree
        };

        if options.validate {
            let validator = self.validator.read_recovered();
            let errors = validator.validate_all(&candidate);
            if !errors.is_empty() {
                return Err(Error::Validation { errors });
            }
        }

        if options.persist && options.scope.is_persistent() {
            self.provider.save(&self.scope_path(options.scope), &candidate)?;
        }

        self.scopes.write_recovered().replace(options.scope, candidate);
        self.cache.invalidate();
        debug!("Set '{key}' in {} scope", options.scope);

        self.events.notify(key, &old_value, &value);
        Ok(())
    }

    /// Clear a scope's tree, persist it when applicable, and invalidate the
    /// cache. Returns `false` only when persisting the cleared tree fails.
    pub fn reset_to_defaults(&self, scope: Scope) -> bool {
        self.scopes.write_recovered().clear(scope);

        let persisted = match self.persist_scope(scope) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist cleared {scope} scope: {e}");
                false
            }
        };

        self.cache.invalidate();
        info!("Reset {scope} scope to defaults");
        persisted
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Run every registered schema against every scope's tree.
    ///
    /// Mutates nothing; returns the error strings per scope (empty when a
    /// scope passes).
    pub fn validate_all(&self) -> HashMap<Scope, Vec<String>> {
        let validator = self.validator.read_recovered();
        let scopes = self.scopes.read_recovered();
        Scope::RESOLUTION_ORDER
            .iter()
            .map(|&scope| (scope, validator.validate_all(scopes.tree(scope))))
            .collect()
    }

    /// Fill absent rule fields in a scope with their declared defaults.
    ///
    /// Persists the scope when applicable and invalidates the cache when
    /// anything changed. Returns whether the tree changed.
    pub fn apply_schema_defaults(&self, scope: Scope) -> bool {
        let candidate = {
            let validator = self.validator.read_recovered();
            let scopes = self.scopes.read_recovered();
            let mut tree = scopes.tree(scope).clone();
            validator.apply_defaults(&mut tree);
            if tree == *scopes.tree(scope) {
                return false;
            }
            tree
        };

        self.scopes.write_recovered().replace(scope, candidate);
        if let Err(e) = self.persist_scope(scope) {
            warn!("Failed to persist defaults for {scope} scope: {e}");
        }
        self.cache.invalidate();
        debug!("Applied schema defaults to {scope} scope");
        true
    }
}
