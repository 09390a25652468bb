//! Schema-driven validation
//!
//! A schema is a named set of rules evaluated against an *entire* scope tree,
//! never against a single changed key. Validated writes run every registered
//! schema; one failing rule anywhere aborts the write.

use crate::error::{Error, Result};
use crate::value::ConfigValue;
use std::sync::Arc;

/// Predicate applied to a value found at a rule's field path
pub type Predicate = Arc<dyn Fn(&ConfigValue) -> bool + Send + Sync>;

// =============================================================================
// Validation Rule
// =============================================================================

/// A single validation rule bound to a dot-path inside the tree.
///
/// # Example
///
/// ```
/// use layerconf::{ConfigValue, ValidationRule};
///
/// let rule = ValidationRule::one_of(
///     "onboarding.user_level",
///     &["beginner", "intermediate", "advanced"],
/// )
/// .required()
/// .default_value("beginner".into());
///
/// assert!(rule.check(&ConfigValue::from("beginner")));
/// assert!(!rule.check(&ConfigValue::from("wizard")));
/// ```
#[derive(Clone)]
pub struct ValidationRule {
    /// Dot-path the rule applies to
    pub field_path: String,
    /// Error message emitted when the predicate rejects a present value
    pub error_message: String,
    /// Whether absence of the field is itself a violation
    pub required: bool,
    /// Default filled in by [`SchemaValidator::apply_defaults`]
    pub default_value: Option<ConfigValue>,
    predicate: Predicate,
}

impl std::fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("field_path", &self.field_path)
            .field("error_message", &self.error_message)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

impl ValidationRule {
    /// Create a rule from an arbitrary predicate
    pub fn new<F>(
        field_path: impl Into<String>,
        error_message: impl Into<String>,
        predicate: F,
    ) -> Self
    where
        F: Fn(&ConfigValue) -> bool + Send + Sync + 'static,
    {
        Self {
            field_path: field_path.into(),
            error_message: error_message.into(),
            required: false,
            default_value: None,
            predicate: Arc::new(predicate),
        }
    }

    /// Mark the field as required (absence becomes a violation)
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a default used by [`SchemaValidator::apply_defaults`]
    #[must_use]
    pub fn default_value(mut self, value: ConfigValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Run the predicate against a value
    pub fn check(&self, value: &ConfigValue) -> bool {
        (self.predicate)(value)
    }

    // =========================================================================
    // Common rule constructors
    // =========================================================================

    /// Value must be one of the given strings
    pub fn one_of(field_path: impl Into<String>, options: &[&str]) -> Self {
        let field_path = field_path.into();
        let allowed: Vec<String> = options.iter().map(|s| (*s).to_string()).collect();
        let message = format!(
            "Value for '{field_path}' must be one of: {}",
            allowed.join(", ")
        );
        Self::new(field_path, message, move |value| {
            value.as_str().is_some_and(|s| allowed.iter().any(|a| a == s))
        })
    }

    /// Value must be a number within `[min, max]`
    pub fn range(field_path: impl Into<String>, min: f64, max: f64) -> Self {
        let field_path = field_path.into();
        let message = format!("Value for '{field_path}' must be between {min} and {max}");
        Self::new(field_path, message, move |value| {
            value.as_f64().is_some_and(|n| n >= min && n <= max)
        })
    }

    /// Value must be a string matching the regex pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the pattern is not a valid regex.
    pub fn pattern(field_path: impl Into<String>, pattern: &str) -> Result<Self> {
        let field_path = field_path.into();
        let re = regex::Regex::new(pattern)
            .map_err(|e| Error::Config(format!("Invalid regex pattern '{pattern}': {e}")))?;
        let message = format!("Value for '{field_path}' does not match pattern: {pattern}");
        Ok(Self::new(field_path, message, move |value| {
            value.as_str().is_some_and(|s| re.is_match(s))
        }))
    }

    /// Value must be a boolean
    pub fn boolean(field_path: impl Into<String>) -> Self {
        let field_path = field_path.into();
        let message = format!("Value for '{field_path}' must be a boolean");
        Self::new(field_path, message, |value| {
            matches!(value, ConfigValue::Bool(_))
        })
    }

    /// Value must be a string
    pub fn string(field_path: impl Into<String>) -> Self {
        let field_path = field_path.into();
        let message = format!("Value for '{field_path}' must be a string");
        Self::new(field_path, message, |value| {
            matches!(value, ConfigValue::String(_))
        })
    }
}

// =============================================================================
// Config Schema
// =============================================================================

/// A named, versioned set of validation rules
#[derive(Debug, Clone)]
pub struct ConfigSchema {
    /// Schema name (re-registration under the same name overwrites)
    pub name: String,
    /// Schema version tag
    pub version: String,
    /// Rules, evaluated in registration order
    pub rules: Vec<ValidationRule>,
    /// When set, every flattened dot-path in the tree must fall under one of
    /// these keys
    pub allowed_keys: Option<Vec<String>>,
    /// Dot-paths that must hold a non-null value
    pub required_keys: Vec<String>,
}

impl ConfigSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            rules: Vec::new(),
            allowed_keys: None,
            required_keys: Vec::new(),
        }
    }

    /// Append a rule
    #[must_use]
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Restrict the tree to the given key prefixes
    #[must_use]
    pub fn allow_keys(mut self, keys: &[&str]) -> Self {
        self.allowed_keys = Some(keys.iter().map(|s| (*s).to_string()).collect());
        self
    }

    /// Require non-null values at the given dot-paths
    #[must_use]
    pub fn require_keys(mut self, keys: &[&str]) -> Self {
        self.required_keys
            .extend(keys.iter().map(|s| (*s).to_string()));
        self
    }
}

// =============================================================================
// Validator Plugin
// =============================================================================

/// Extension point for host applications contributing validation rules.
///
/// Plugins are registered explicitly at startup; the engine performs no
/// filesystem-based discovery.
pub trait ValidatorPlugin: Send + Sync {
    /// Schema name the contributed rules are registered under
    fn name(&self) -> &str;

    /// Rules contributed by this plugin
    fn validation_rules(&self) -> Vec<ValidationRule>;
}

// =============================================================================
// Schema Validator
// =============================================================================

/// Holds registered schemas and evaluates them against whole trees
#[derive(Debug, Default)]
pub struct SchemaValidator {
    // Vec keeps registration order; re-registration replaces in place.
    schemas: Vec<ConfigSchema>,
}

impl SchemaValidator {
    /// Create an empty validator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema by name; re-registration overwrites in place
    pub fn register_schema(&mut self, schema: ConfigSchema) {
        log::debug!("Registering schema '{}' v{}", schema.name, schema.version);
        match self.schemas.iter_mut().find(|s| s.name == schema.name) {
            Some(existing) => *existing = schema,
            None => self.schemas.push(schema),
        }
    }

    /// Register a plugin's rules as a schema named after the plugin
    pub fn register_plugin(&mut self, plugin: &dyn ValidatorPlugin) {
        let mut schema = ConfigSchema::new(plugin.name(), "1.0.0");
        schema.rules = plugin.validation_rules();
        self.register_schema(schema);
    }

    /// Names of registered schemas in registration order
    pub fn schema_names(&self) -> Vec<String> {
        self.schemas.iter().map(|s| s.name.clone()).collect()
    }

    /// True if no schemas are registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate a tree against one named schema.
    ///
    /// Returns error strings in a fixed order: required-key violations,
    /// then allowed-key violations, then rule violations in registration
    /// order. An unknown schema name yields a single error string.
    pub fn validate(&self, tree: &ConfigValue, schema_name: &str) -> Vec<String> {
        match self.schemas.iter().find(|s| s.name == schema_name) {
            Some(schema) => Self::validate_against(tree, schema),
            None => vec![format!("Schema '{schema_name}' not registered")],
        }
    }

    /// Validate a tree against every registered schema, in registration order
    pub fn validate_all(&self, tree: &ConfigValue) -> Vec<String> {
        self.schemas
            .iter()
            .flat_map(|schema| Self::validate_against(tree, schema))
            .collect()
    }

    fn validate_against(tree: &ConfigValue, schema: &ConfigSchema) -> Vec<String> {
        let mut errors = Vec::new();

        for key in &schema.required_keys {
            if !tree.contains_path(key) {
                errors.push(format!("Missing required key: {key}"));
            }
        }

        if let Some(allowed) = &schema.allowed_keys {
            for path in tree.flatten_paths() {
                let permitted = allowed
                    .iter()
                    .any(|a| path == *a || path.starts_with(&format!("{a}.")));
                if !permitted {
                    errors.push(format!("Key not allowed: {path}"));
                }
            }
        }

        for rule in &schema.rules {
            match tree.get_path(&rule.field_path) {
                Some(value) if !value.is_null() => {
                    if !rule.check(value) {
                        errors.push(rule.error_message.clone());
                    }
                }
                _ => {
                    if rule.required {
                        errors.push(format!("Missing required field: {}", rule.field_path));
                    }
                }
            }
        }

        errors
    }

    /// Fill absent rule fields that declare a default value.
    ///
    /// Only fields missing from the tree are touched.
    pub fn apply_defaults(&self, tree: &mut ConfigValue) {
        for schema in &self.schemas {
            for rule in &schema.rules {
                if let Some(default) = &rule.default_value {
                    if !tree.contains_path(&rule.field_path) {
                        tree.set_path(&rule.field_path, default.clone());
                    }
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
