//! Point-in-time backup and restore
//!
//! A backup is one named, timestamped file holding both persisted scope
//! trees, every profile, and the active selection. Restore replaces the
//! corresponding in-memory and on-disk state wholesale.

use crate::error::{Error, Result};
use crate::manager::ConfigurationManager;
use crate::migrate::CURRENT_VERSION;
use crate::profiles::ConfigurationProfile;
use crate::scope::Scope;
use crate::storage::PersistenceProvider;
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

/// On-disk shape of one backup file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Backup name (filename stem)
    pub name: String,
    /// Creation timestamp (RFC 3339)
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Configuration version at backup time
    pub version: String,
    /// Global scope tree
    pub global: ConfigValue,
    /// User scope tree
    pub user: ConfigValue,
    /// Every known profile
    pub profiles: Vec<ConfigurationProfile>,
    /// Active profile id at backup time
    pub active_profile_id: Option<String>,
}

/// Summary of one backup file, as reported by [`BackupManager::list`]
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Path of the backup file
    pub path: PathBuf,
    /// Backup name
    pub name: String,
    /// Creation timestamp
    pub created_at: OffsetDateTime,
    /// Configuration version at backup time
    pub version: String,
}

/// Backup operations, borrowed from a [`ConfigurationManager`]
pub struct BackupManager<'a, P: PersistenceProvider> {
    manager: &'a ConfigurationManager<P>,
}

impl<P: PersistenceProvider> ConfigurationManager<P> {
    /// Get the backup manager
    pub fn backup(&self) -> BackupManager<'_, P> {
        BackupManager { manager: self }
    }
}

impl<P: PersistenceProvider> BackupManager<'_, P> {
    /// Snapshot both persisted scopes, all profiles, and the active
    /// selection into one file under the backups directory.
    ///
    /// Without an explicit name a timestamped one is generated.
    ///
    /// # Errors
    ///
    /// Returns an error when the backup file cannot be written.
    pub fn create(&self, name: Option<&str>) -> Result<PathBuf> {
        let now = OffsetDateTime::now_utc();
        let name = match name {
            Some(n) => n.to_string(),
            None => {
                let stamp = now
                    .format(format_description!(
                        "[year][month][day]-[hour][minute][second]"
                    ))
                    .map_err(|e| Error::BackupFailed(format!("timestamp format: {e}")))?;
                format!("backup-{stamp}")
            }
        };

        let record = {
            let scopes = self.manager.scopes.read_recovered();
            let profiles = self.manager.profiles.read_recovered();
            BackupRecord {
                name: name.clone(),
                created_at: now,
                version: CURRENT_VERSION.to_string(),
                global: scopes.tree(Scope::Global).clone(),
                user: scopes.tree(Scope::User).clone(),
                profiles: profiles.list().to_vec(),
                active_profile_id: profiles.active_profile_id.clone(),
            }
        };

        let path = self
            .manager
            .backups_dir()
            .join(format!("{name}.{}", self.manager.provider.extension()));
        self.manager.provider.save(&path, &record)?;

        info!("Created backup '{name}' at {}", path.display());
        Ok(path)
    }

    /// Replace in-memory and persisted `Global`/`User` trees and the full
    /// profile set from a backup file.
    ///
    /// An unreadable or malformed file leaves existing state untouched and
    /// returns `false`. Restored scopes are re-persisted and the cache is
    /// invalidated.
    pub fn restore(&self, path: &Path) -> bool {
        let record: BackupRecord = match self.manager.provider.load(path) {
            Ok(record) => record,
            Err(e) => {
                warn!("Restore from {} failed: {e}", path.display());
                return false;
            }
        };

        let global = object_or_empty(record.global);
        let user = object_or_empty(record.user);

        if let Err(e) = self
            .manager
            .provider
            .save(&self.manager.scope_path(Scope::Global), &global)
            .and_then(|()| {
                self.manager
                    .provider
                    .save(&self.manager.scope_path(Scope::User), &user)
            })
        {
            warn!("Restore from {} failed to persist scopes: {e}", path.display());
            return false;
        }

        {
            let mut scopes = self.manager.scopes.write_recovered();
            scopes.replace(Scope::Global, global);
            scopes.replace(Scope::User, user);
        }
        {
            let mut profiles = self.manager.profiles.write_recovered();
            profiles.replace_all(record.profiles, record.active_profile_id);
        }
        if let Err(e) = self.manager.persist_profiles() {
            warn!("Restored profiles could not be persisted: {e}");
        }
        self.manager.cache.invalidate();

        info!("Restored backup '{}' from {}", record.name, path.display());
        true
    }

    /// Enumerate backup files, newest first.
    ///
    /// Individually corrupt files are skipped with a warning.
    pub fn list(&self) -> Vec<BackupInfo> {
        let dir = self.manager.backups_dir();
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let matches_ext =
                path.extension().and_then(|ext| ext.to_str()) == Some(self.manager.provider.extension());
            if !matches_ext {
                continue;
            }
            match self.manager.provider.load::<BackupRecord>(&path) {
                Ok(record) => backups.push(BackupInfo {
                    path,
                    name: record.name,
                    created_at: record.created_at,
                    version: record.version,
                }),
                Err(e) => {
                    warn!("Skipping corrupt backup {}: {e}", path.display());
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        backups
    }

    /// Remove a backup file. Returns `false` when deletion fails.
    pub fn delete(&self, path: &Path) -> bool {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted backup {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to delete backup {}: {e}", path.display());
                false
            }
        }
    }
}

fn object_or_empty(tree: ConfigValue) -> ConfigValue {
    if tree.is_object() {
        tree
    } else {
        ConfigValue::object()
    }
}
