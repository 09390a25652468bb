use crate::error::Result;
use crate::manager::core::ConfigurationManager;
use crate::migrate::CURRENT_VERSION;
use crate::profiles::ConfigurationProfile;
use crate::scope::Scope;
use crate::storage::PersistenceProvider;
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use time::OffsetDateTime;

/// Single structured document produced by export and consumed by import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Global scope tree
    pub global: ConfigValue,
    /// User scope tree
    pub user: ConfigValue,
    /// Profiles, present when exported with `include_profiles`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<ConfigurationProfile>>,
    /// Active profile id, present when exported with `include_profiles`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile_id: Option<String>,
    /// When the export was taken (RFC 3339)
    #[serde(with = "time::serde::rfc3339")]
    pub export_timestamp: OffsetDateTime,
    /// Configuration version at export time
    pub version: String,
}

impl<P: PersistenceProvider> ConfigurationManager<P> {
    /// Persist a scope's current tree to its file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the save fails. Non-persistent scopes are a
    /// no-op.
    pub(crate) fn persist_scope(&self, scope: Scope) -> Result<()> {
        if !scope.is_persistent() {
            return Ok(());
        }
        let tree = self.scopes.read_recovered().tree(scope).clone();
        self.provider.save(&self.scope_path(scope), &tree)
    }

    /// Persist the profiles file from the current store.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the save fails.
    pub(crate) fn persist_profiles(&self) -> Result<()> {
        let store = self.profiles.read_recovered().clone();
        self.provider.save(&self.profiles_path(), &store)
    }

    // =========================================================================
    // Export / Import
    // =========================================================================

    /// Serialize the `Global` and `User` trees (and optionally all profiles)
    /// into a single document at `path`. Returns `false` when the write
    /// fails.
    pub fn export_configuration(&self, path: &Path, include_profiles: bool) -> bool {
        let document = {
            let scopes = self.scopes.read_recovered();
            let profiles = self.profiles.read_recovered();
            ExportDocument {
                global: scopes.tree(Scope::Global).clone(),
                user: scopes.tree(Scope::User).clone(),
                profiles: include_profiles.then(|| profiles.list().to_vec()),
                active_profile_id: include_profiles
                    .then(|| profiles.active_profile_id.clone())
                    .flatten(),
                export_timestamp: OffsetDateTime::now_utc(),
                version: CURRENT_VERSION.to_string(),
            }
        };

        match self.provider.save(path, &document) {
            Ok(()) => {
                info!("Exported configuration to {}", path.display());
                true
            }
            Err(e) => {
                warn!("Export to {} failed: {e}", path.display());
                false
            }
        }
    }

    /// Load an export document and apply its `Global`/`User` trees.
    ///
    /// With `merge`, each loaded tree is applied as a shallow update at the
    /// top level of the existing tree; without it the trees are replaced
    /// outright. Always re-persists both scopes and invalidates the cache.
    /// Returns `false` when the document cannot be read or either persist
    /// fails, leaving prior state untouched.
    pub fn import_configuration(&self, path: &Path, merge: bool) -> bool {
        let document: ExportDocument = match self.provider.load(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Import from {} failed: {e}", path.display());
                return false;
            }
        };

        let (new_global, new_user) = {
            let scopes = self.scopes.read_recovered();
            (
                imported_tree(scopes.tree(Scope::Global), document.global, merge),
                imported_tree(scopes.tree(Scope::User), document.user, merge),
            )
        };

        if let Err(e) = self
            .provider
            .save(&self.scope_path(Scope::Global), &new_global)
            .and_then(|()| self.provider.save(&self.scope_path(Scope::User), &new_user))
        {
            warn!("Import from {} failed to persist: {e}", path.display());
            return false;
        }

        {
            let mut scopes = self.scopes.write_recovered();
            scopes.replace(Scope::Global, new_global);
            scopes.replace(Scope::User, new_user);
        }
        self.cache.invalidate();

        info!(
            "Imported configuration from {} ({})",
            path.display(),
            if merge { "merged" } else { "replaced" }
        );
        true
    }
}

/// Apply an imported section to an existing tree.
///
/// Merge mode is a shallow dict update at the top level; otherwise the
/// loaded tree replaces the existing one. Non-object loaded roots become
/// empty trees.
fn imported_tree(existing: &ConfigValue, loaded: ConfigValue, merge: bool) -> ConfigValue {
    let loaded = if loaded.is_object() {
        loaded
    } else {
        ConfigValue::object()
    };

    if !merge {
        return loaded;
    }

    let mut merged = existing.clone();
    if let (Some(base), Some(overlay)) = (merged.as_object_mut(), loaded.as_object()) {
        for (key, value) in overlay {
            base.insert(key.clone(), value.clone());
        }
    }
    merged
}
