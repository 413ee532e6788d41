//! Assembly configuration.
//!
//! Configuration can be loaded from TOML, for example from the `[assembly]`
//! table of a schemaweave manifest.
//!
//! # Example Configuration
//!
//! ```toml
//! merge_roots = true
//!
//! [root_types]
//! query = "Query"
//! mutation = "Mutation"
//! subscription = "Subscription"
//!
//! [compiler]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```

use serde::{Deserialize, Serialize};

/// Options for one assembly call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Merge all units of a root operation type into one declaration.
    /// When disabled, additional declarations are emitted as `extend type`.
    /// Default: true
    #[serde(default = "default_merge_roots")]
    pub merge_roots: bool,

    /// Names of the root operation types.
    #[serde(default)]
    pub root_types: RootTypeNames,

    /// Options handed to the dynamic schema compiler.
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Names of the root operation types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootTypeNames {
    /// Default: "Query"
    #[serde(default = "default_query")]
    pub query: String,

    /// Default: "Mutation"
    #[serde(default = "default_mutation")]
    pub mutation: String,

    /// Default: "Subscription"
    #[serde(default = "default_subscription")]
    pub subscription: String,
}

/// Limits applied by [`DynamicSchemaCompiler`](crate::DynamicSchemaCompiler).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_merge_roots() -> bool {
    true
}

fn default_query() -> String {
    "Query".to_string()
}

fn default_mutation() -> String {
    "Mutation".to_string()
}

fn default_subscription() -> String {
    "Subscription".to_string()
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            merge_roots: default_merge_roots(),
            root_types: RootTypeNames::default(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl Default for RootTypeNames {
    fn default() -> Self {
        Self {
            query: default_query(),
            mutation: default_mutation(),
            subscription: default_subscription(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

impl RootTypeNames {
    /// Returns whether `name` is one of the root operation type names.
    #[must_use]
    pub fn is_root(&self, name: &str) -> bool {
        self.query == name || self.mutation == name || self.subscription == name
    }

    fn validate(&self) -> Result<(), String> {
        let names = [&self.query, &self.mutation, &self.subscription];
        for name in names {
            if !crate::sdl::is_valid_name(name) {
                return Err(format!("root_types: `{name}` is not a valid GraphQL name"));
            }
        }
        if self.query == self.mutation
            || self.query == self.subscription
            || self.mutation == self.subscription
        {
            return Err("root_types: query, mutation and subscription names must differ".into());
        }
        Ok(())
    }
}

impl AssemblyConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.root_types.validate()?;
        if self.compiler.max_depth == 0 {
            return Err("compiler.max_depth must be > 0".into());
        }
        if self.compiler.max_complexity == 0 {
            return Err("compiler.max_complexity must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssemblyConfig::default();
        assert!(config.merge_roots);
        assert_eq!(config.root_types.query, "Query");
        assert_eq!(config.root_types.mutation, "Mutation");
        assert_eq!(config.root_types.subscription, "Subscription");
        assert_eq!(config.compiler.max_depth, 15);
        assert_eq!(config.compiler.max_complexity, 500);
        assert!(config.compiler.introspection);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_root() {
        let roots = RootTypeNames::default();
        assert!(roots.is_root("Query"));
        assert!(roots.is_root("Subscription"));
        assert!(!roots.is_root("User"));
    }

    #[test]
    fn test_invalid_root_names() {
        let mut config = AssemblyConfig::default();
        config.root_types.mutation = "Query".into();
        assert!(config.validate().is_err());

        let mut config = AssemblyConfig::default();
        config.root_types.query = "Root-Query".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_max_depth() {
        let mut config = AssemblyConfig::default();
        config.compiler.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            merge_roots = false

            [root_types]
            query = "RootQuery"

            [compiler]
            introspection = false
        "#;

        let config: AssemblyConfig = toml::from_str(toml).unwrap();
        assert!(!config.merge_roots);
        assert_eq!(config.root_types.query, "RootQuery");
        assert_eq!(config.root_types.mutation, "Mutation");
        assert_eq!(config.compiler.max_depth, 15);
        assert!(!config.compiler.introspection);
    }
}
