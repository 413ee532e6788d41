//! Integration tests for schema assembly.
//!
//! These tests drive the public API from unit construction to the assembled
//! document, covering requirement resolution, root merging and consistency
//! checks.

use async_graphql::Value;
use schemaweave_graphql::{
    AssemblyConfig, DefinitionUnit, ErrorKind, SchemaDefinitionError, UnitRef, assemble,
    make_executable_schema,
};

// =============================================================================
// Helpers
// =============================================================================

fn unit(sdl: &str) -> UnitRef {
    DefinitionUnit::builder(sdl).build().unwrap()
}

fn no_merge() -> AssemblyConfig {
    AssemblyConfig {
        merge_roots: false,
        ..Default::default()
    }
}

// =============================================================================
// Requirements
// =============================================================================

#[test]
fn test_user_and_query_assemble() {
    let user = DefinitionUnit::builder("type User { id: ID! username: String fullName: String }")
        .alias("fullName", "full_name")
        .build()
        .unwrap();
    let query = DefinitionUnit::builder("type Query { user: User }")
        .requires(&user)
        .resolver("user", |_| async { Ok(Value::Null) })
        .build()
        .unwrap();

    let schema = assemble([query], &AssemblyConfig::default()).unwrap();
    assert_eq!(schema.type_order(), ["User", "Query"]);
    assert!(schema.document().starts_with("type User"));
    assert!(schema.document().ends_with("type Query {\n  user: User\n}"));
}

#[test]
fn test_missing_requirement_is_reported() {
    let query = unit("type Query { user: User }");
    let err = assemble([query], &AssemblyConfig::default()).unwrap_err();
    assert_eq!(
        err,
        SchemaDefinitionError::MissingDependency {
            unit: "Query".into(),
            type_name: "User".into(),
        }
    );
    assert_eq!(err.error_code(), "MISSING_DEPENDENCY");
}

#[test]
fn test_deferred_cycle_is_order_independent() {
    let user = DefinitionUnit::builder("type User { name: String group: Group }")
        .defer("Group")
        .build()
        .unwrap();
    let group = DefinitionUnit::builder("type Group { name: String members: [User!]! }")
        .requires(&user)
        .build()
        .unwrap();
    let query = DefinitionUnit::builder("type Query { groups: [Group!]! }")
        .requires(&group)
        .build()
        .unwrap();

    let config = AssemblyConfig::default();
    let forward = assemble([query.clone(), user.clone(), group.clone()], &config).unwrap();
    let backward = assemble([group, user, query], &config).unwrap();

    let mut forward_types = forward.type_order().to_vec();
    let mut backward_types = backward.type_order().to_vec();
    forward_types.sort();
    backward_types.sort();
    assert_eq!(forward_types, backward_types);
}

#[test]
fn test_unresolved_deferred_type() {
    let user = DefinitionUnit::builder("type User { group: Group }")
        .defer("Group")
        .build()
        .unwrap();
    let query = DefinitionUnit::builder("type Query { me: User }")
        .requires(&user)
        .build()
        .unwrap();

    let err = assemble([query], &AssemblyConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedDeferredType);
}

// =============================================================================
// Root merging
// =============================================================================

#[test]
fn test_merged_root_is_input_order_independent() {
    let first = unit("type Query { b: Int a: Int }");
    let second = unit("type Query { c: Int }");

    let config = AssemblyConfig::default();
    let one = assemble([second.clone(), first.clone()], &config).unwrap();
    let other = assemble([first, second], &config).unwrap();

    assert_eq!(one.document(), other.document());
    assert_eq!(one.document(), "type Query {\n  a: Int\n  b: Int\n  c: Int\n}");
}

#[test]
fn test_duplicate_root_field_depends_on_merging() {
    let first = unit("type Mutation { reset: Boolean }");
    let second = unit("type Mutation { reset: Boolean }");
    let query = unit("type Query { ok: Boolean }");

    let err = assemble(
        [query.clone(), first.clone(), second.clone()],
        &AssemblyConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SchemaDefinitionError::DuplicateRootField {
            type_name: "Mutation".into(),
            field_name: "reset".into(),
        }
    );

    let schema = assemble([query, first, second], &no_merge()).unwrap();
    assert!(schema.document().contains("type Mutation { reset: Boolean }"));
    assert!(
        schema
            .document()
            .contains("extend type Mutation {\n  reset: Boolean\n}")
    );
}

#[test]
fn test_unmerged_roots_compile_when_fields_differ() {
    let first = DefinitionUnit::builder("type Query { a: Int }")
        .resolver("a", |_| async { Ok(Value::Number(1.into())) })
        .build()
        .unwrap();
    let second = DefinitionUnit::builder("type Query { b: Int }")
        .resolver("b", |_| async { Ok(Value::Number(2.into())) })
        .build()
        .unwrap();

    let schema = make_executable_schema([first, second], &no_merge()).unwrap();
    assert!(schema.sdl().contains("type Query"));
}

// =============================================================================
// Consistency
// =============================================================================

#[test]
fn test_duplicate_type_name() {
    let first = unit("type User { id: ID }");
    let second = unit("type User { name: String }");
    let query = DefinitionUnit::builder("type Query { me: User }")
        .requires(&first)
        .build()
        .unwrap();

    let err = assemble([query, second], &AssemblyConfig::default()).unwrap_err();
    assert_eq!(
        err,
        SchemaDefinitionError::DuplicateTypeName {
            type_name: "User".into(),
        }
    );
}

#[test]
fn test_compiler_rejection_is_wrapped() {
    // A root must be an object type; only the compiler checks this.
    let query = unit("scalar Query");

    let err = make_executable_schema([query], &AssemblyConfig::default())
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::CompilationError);
    assert_eq!(err.error_code(), "COMPILATION_ERROR");
}

#[test]
fn test_config_from_toml_drives_assembly() {
    let config: AssemblyConfig = toml::from_str(
        r#"
        merge_roots = true

        [root_types]
        query = "RootQuery"
        "#,
    )
    .unwrap();
    config.validate().unwrap();

    let first = unit("type RootQuery { a: Int }");
    let second = unit("type RootQuery { a: Int }");
    let err = assemble([first, second], &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateRootField);
}
