//! Configuration scopes and the per-scope tree store

use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};

/// Configuration scope (precedence layer).
///
/// Resolution searches scopes in the order below and returns the first
/// non-null hit, so `Global` carries the highest effective precedence. This
/// is a deliberate, named policy (see `Scope::RESOLUTION_ORDER`); it inverts
/// the "most specific wins" convention some layered-config systems use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Machine-wide configuration, persisted
    Global,
    /// Per-user configuration, persisted
    User,
    /// Current-session configuration, in-memory only
    Session,
    /// Scratch configuration, in-memory only
    Temporary,
}

impl Scope {
    /// Scopes in resolution order: the first scope containing a non-null
    /// value at a key wins.
    pub const RESOLUTION_ORDER: [Scope; 4] =
        [Scope::Global, Scope::User, Scope::Session, Scope::Temporary];

    /// Whether this scope survives process restart
    #[must_use]
    pub fn is_persistent(self) -> bool {
        matches!(self, Scope::Global | Scope::User)
    }

    /// File stem used for the persisted scope file
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::User => "user",
            Scope::Session => "session",
            Scope::Temporary => "temporary",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}

// =============================================================================
// Scope Store
// =============================================================================

/// One mutable configuration tree per scope.
///
/// Every tree is always a valid object at the root.
#[derive(Debug, Clone)]
pub struct ScopeStore {
    global: ConfigValue,
    user: ConfigValue,
    session: ConfigValue,
    temporary: ConfigValue,
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStore {
    /// Create a store with four empty trees
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: ConfigValue::object(),
            user: ConfigValue::object(),
            session: ConfigValue::object(),
            temporary: ConfigValue::object(),
        }
    }

    /// Get the tree for a scope
    pub fn tree(&self, scope: Scope) -> &ConfigValue {
        match scope {
            Scope::Global => &self.global,
            Scope::User => &self.user,
            Scope::Session => &self.session,
            Scope::Temporary => &self.temporary,
        }
    }

    /// Get the mutable tree for a scope
    pub fn tree_mut(&mut self, scope: Scope) -> &mut ConfigValue {
        match scope {
            Scope::Global => &mut self.global,
            Scope::User => &mut self.user,
            Scope::Session => &mut self.session,
            Scope::Temporary => &mut self.temporary,
        }
    }

    /// Replace the tree for a scope.
    ///
    /// Non-object roots are coerced to an empty object to uphold the root
    /// invariant.
    pub fn replace(&mut self, scope: Scope, tree: ConfigValue) {
        let tree = if tree.is_object() {
            tree
        } else {
            log::warn!("Rejected non-object root for {scope} scope, using empty tree");
            ConfigValue::object()
        };
        *self.tree_mut(scope) = tree;
    }

    /// Clear a scope back to an empty tree
    pub fn clear(&mut self, scope: Scope) {
        *self.tree_mut(scope) = ConfigValue::object();
    }
}

// =============================================================================
// Tests
// =============================================================================
