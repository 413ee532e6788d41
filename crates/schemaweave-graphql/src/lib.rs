//! # schemaweave-graphql
//!
//! Assembles a GraphQL schema from independently authored definition units.
//!
//! Each unit holds one SDL declaration, the units it requires and the
//! behavior bound to its fields. The engine collects the complete unit set,
//! checks every cross-reference, merges root operation types contributed by
//! several units and produces one ordered document that a schema compiler
//! turns into an executable schema.
//!
//! It supports:
//!
//! - Forward and circular references through deferred markers
//! - Root type merging with deterministic field order
//! - Field aliases, argument aliases and subscription sources
//! - Directive visitors decorating field resolvers
//! - Custom scalar hooks and abstract type resolution
//!
//! ## Example
//!
//! ```ignore
//! let user = DefinitionUnit::builder("type User { id: ID! fullName: String }")
//!     .alias("fullName", "full_name")
//!     .build()?;
//! let query = DefinitionUnit::builder("type Query { user: User }")
//!     .requires(&user)
//!     .resolver("user", |_| async { Ok(load_user().await) })
//!     .build()?;
//!
//! let schema = make_executable_schema([query], &AssemblyConfig::default())?;
//! ```
//!
//! ## Configuration
//!
//! [`AssemblyConfig`] deserializes from TOML:
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
//!
//! ## Modules
//!
//! - [`config`] - Assembly and compiler configuration
//! - [`unit`] - Definition units and their bound behavior
//! - [`schema`] - Assembly pipeline and schema compilers
//! - [`sdl`] - SDL inspection helpers
//! - [`error`] - Error types for unit validation and assembly

pub mod config;
pub mod error;
pub mod schema;
pub mod sdl;
pub mod unit;

// Re-export main types
pub use config::{AssemblyConfig, CompilerConfig, RootTypeNames};
pub use error::{ErrorKind, SchemaDefinitionError};
pub use schema::{
    AssembledSchema, DynamicSchemaCompiler, FieldKey, SchemaCompiler, assemble,
    make_executable_schema,
};
pub use unit::{
    DefinitionUnit, DirectiveSite, FieldBinding, NativeType, Requirement, Resolver, ResolverArgs,
    ScalarHooks, UnitKind, UnitRef, resolver_fn,
};

/// Result type for schema assembly operations.
pub type Result<T> = std::result::Result<T, SchemaDefinitionError>;
