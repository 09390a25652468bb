//! Named configuration profiles
//!
//! A profile is a user-selectable bundle of settings acting as a fallback
//! layer below all scopes. At most one profile is active at a time. The
//! `ProfileStore` is also the on-disk shape of the profiles file:
//! `{active_profile_id, profiles}`.

use crate::value::{ConfigMap, ConfigValue};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

static PROFILE_SEQ: AtomicU64 = AtomicU64::new(0);

/// A named settings bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigurationProfile {
    /// Stable identifier, generated at creation
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Creation timestamp (RFC 3339)
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification timestamp (RFC 3339)
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    /// Settings tree, always an object at the root
    pub settings: ConfigValue,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: ConfigMap,
}

impl ConfigurationProfile {
    /// Create a profile with a generated id.
    ///
    /// A non-object settings root is coerced to an empty tree.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: Option<ConfigValue>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        let seq = PROFILE_SEQ.fetch_add(1, Ordering::Relaxed);
        let settings = match settings {
            Some(tree) if tree.is_object() => tree,
            _ => ConfigValue::object(),
        };
        Self {
            id: format!("profile-{}-{seq}", now.unix_timestamp_nanos()),
            name: name.into(),
            description: description.into(),
            created_at: now,
            last_modified: now,
            settings,
            metadata: ConfigMap::new(),
        }
    }

    /// Stamp the last-modified timestamp
    pub fn touch(&mut self) {
        self.last_modified = OffsetDateTime::now_utc();
    }
}

// =============================================================================
// Profile Store
// =============================================================================

/// All known profiles plus the active selection.
///
/// Serializes directly as the persisted profiles file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStore {
    /// Id of the active profile, if any
    pub active_profile_id: Option<String>,
    /// Profiles in creation order
    profiles: Vec<ConfigurationProfile>,
}

impl ProfileStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile (appended in creation order)
    pub fn insert(&mut self, profile: ConfigurationProfile) {
        self.profiles.push(profile);
    }

    /// Look up a profile by id
    pub fn get(&self, id: &str) -> Option<&ConfigurationProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Look up a profile mutably by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ConfigurationProfile> {
        self.profiles.iter_mut().find(|p| p.id == id)
    }

    /// Remove a profile by id; clears the active selection if it pointed at
    /// the removed profile. Returns false for an unknown id.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(pos) = self.profiles.iter().position(|p| p.id == id) else {
            return false;
        };
        self.profiles.remove(pos);
        if self.active_profile_id.as_deref() == Some(id) {
            self.active_profile_id = None;
            log::info!("Deleted active profile '{id}', cleared active selection");
        }
        true
    }

    /// Mark a profile as active. Returns false for an unknown id.
    pub fn activate(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active_profile_id = Some(id.to_string());
        true
    }

    /// Clear the active selection
    pub fn deactivate(&mut self) {
        self.active_profile_id = None;
    }

    /// The active profile, if one is selected
    pub fn active(&self) -> Option<&ConfigurationProfile> {
        self.active_profile_id.as_deref().and_then(|id| self.get(id))
    }

    /// All profiles in creation order
    pub fn list(&self) -> &[ConfigurationProfile] {
        &self.profiles
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True if no profiles exist
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Replace the full profile set and active selection.
    ///
    /// An active id not present in the new set is dropped.
    pub fn replace_all(&mut self, profiles: Vec<ConfigurationProfile>, active: Option<String>) {
        self.profiles = profiles;
        self.active_profile_id = active.filter(|id| self.get(id).is_some());
    }
}

// =============================================================================
// Tests
// =============================================================================
