use crate::error::Result;
use crate::manager::core::ConfigurationManager;
use crate::profiles::ConfigurationProfile;
use crate::storage::PersistenceProvider;
use crate::sync::RwLockExt;
use crate::value::ConfigValue;

use log::{info, warn};

impl<P: PersistenceProvider> ConfigurationManager<P> {
    /// Create a profile and persist the profile set.
    ///
    /// The new profile is not activated. Returns the generated profile id.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the profiles file cannot be written; the
    /// profile is still present in memory.
    pub fn create_profile(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        settings: Option<ConfigValue>,
    ) -> Result<String> {
        let profile = ConfigurationProfile::new(name, description, settings);
        let id = profile.id.clone();

        self.profiles.write_recovered().insert(profile);
        self.persist_profiles()?;

        info!("Created profile '{id}'");
        Ok(id)
    }

    /// Activate a profile by id.
    ///
    /// Exactly one profile is active afterwards. Activation changes the
    /// fallback layer, so the cache is invalidated. Returns `false` for an
    /// unknown id or when persisting the selection fails (the previous
    /// selection is restored).
    pub fn activate_profile(&self, id: &str) -> bool {
        let previous = {
            let mut profiles = self.profiles.write_recovered();
            let previous = profiles.active_profile_id.clone();
            if !profiles.activate(id) {
                return false;
            }
            previous
        };

        if let Err(e) = self.persist_profiles() {
            warn!("Failed to persist profile activation '{id}': {e}");
            self.profiles.write_recovered().active_profile_id = previous;
            return false;
        }

        self.cache.invalidate();
        info!("Activated profile '{id}'");
        true
    }

    /// Look up a profile by id
    pub fn get_profile(&self, id: &str) -> Option<ConfigurationProfile> {
        self.profiles.read_recovered().get(id).cloned()
    }

    /// All profiles in creation order
    pub fn list_profiles(&self) -> Vec<ConfigurationProfile> {
        self.profiles.read_recovered().list().to_vec()
    }

    /// The active profile, if one is selected
    pub fn active_profile(&self) -> Option<ConfigurationProfile> {
        self.profiles.read_recovered().active().cloned()
    }

    /// Delete a profile by id.
    ///
    /// Clears the active selection when it pointed at the deleted profile.
    /// Returns `false` for an unknown id.
    pub fn delete_profile(&self, id: &str) -> bool {
        if !self.profiles.write_recovered().remove(id) {
            return false;
        }

        if let Err(e) = self.persist_profiles() {
            warn!("Failed to persist profile deletion '{id}': {e}");
        }
        self.cache.invalidate();
        info!("Deleted profile '{id}'");
        true
    }

    /// Replace a profile's settings tree, stamping `last_modified`.
    ///
    /// Returns `false` for an unknown id. Invalidates the cache since the
    /// fallback layer may have changed.
    pub fn update_profile_settings(&self, id: &str, settings: ConfigValue) -> bool {
        {
            let mut profiles = self.profiles.write_recovered();
            let Some(profile) = profiles.get_mut(id) else {
                return false;
            };
            profile.settings = if settings.is_object() {
                settings
            } else {
                ConfigValue::object()
            };
            profile.touch();
        }

        if let Err(e) = self.persist_profiles() {
            warn!("Failed to persist profile update '{id}': {e}");
        }
        self.cache.invalidate();
        true
    }
}
