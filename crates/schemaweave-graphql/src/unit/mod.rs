//! Definition units.
//!
//! A [`DefinitionUnit`] holds one SDL declaration together with the behavior
//! bound to it and the units it requires. Units are validated once, when
//! [`UnitBuilder::build`] runs, and are immutable afterwards.
//!
//! ```ignore
//! let user = DefinitionUnit::builder("type User { id: ID! fullName: String }")
//!     .alias("fullName", "full_name")
//!     .build()?;
//!
//! let query = DefinitionUnit::builder("type Query { user: User }")
//!     .requires(&user)
//!     .resolver("user", |_| async { Ok(Value::Null) })
//!     .build()?;
//! ```

mod binding;

pub use binding::{
    DirectiveSite, DirectiveVisitor, FieldBinding, NativeType, Resolver, ResolverArgs,
    ScalarFn, ScalarHooks, Subscriber, TypeResolver, default_resolver, resolver_fn,
    subscriber_fn,
};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_graphql::Value;
use futures_util::stream::Stream;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::SchemaDefinitionError;
use crate::sdl::{self, Declaration};

/// Shared handle to a definition unit.
pub type UnitRef = Arc<DefinitionUnit>;

/// Kind of the declaration held by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Object,
    Input,
    Interface,
    Union,
    Scalar,
    Directive,
    Enum,
}

impl UnitKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Input => "input",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Scalar => "scalar",
            Self::Directive => "directive",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder for a unit that is not available where the requirement is
/// declared, typically to break a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeferredType(String);

impl DeferredType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A dependency of a unit.
#[derive(Clone)]
pub enum Requirement {
    /// A unit available at declaration time.
    Concrete(UnitRef),
    /// A unit looked up by name once the whole assembly input is known.
    Deferred(DeferredType),
}

impl Requirement {
    /// Name of the required type or directive.
    pub fn name(&self) -> &str {
        match self {
            Self::Concrete(unit) => unit.name(),
            Self::Deferred(marker) => marker.name(),
        }
    }

    /// Returns whether this requirement provides the type or directive `name`.
    pub(crate) fn provides(&self, name: &str, directive: bool) -> bool {
        match self {
            Self::Concrete(unit) => {
                unit.name() == name && (unit.kind() == UnitKind::Directive) == directive
            }
            // Deferred markers stand in for types only.
            Self::Deferred(marker) => !directive && marker.name() == name,
        }
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(unit) => f.debug_tuple("Concrete").field(&unit.name()).finish(),
            Self::Deferred(marker) => f.debug_tuple("Deferred").field(&marker.name()).finish(),
        }
    }
}

/// One SDL declaration plus its bound behavior.
pub struct DefinitionUnit {
    sdl: String,
    declaration: Declaration,
    requirements: Vec<Requirement>,
    resolvers: IndexMap<String, Resolver>,
    aliases: IndexMap<String, String>,
    argument_aliases: IndexMap<String, IndexMap<String, String>>,
    subscribers: IndexMap<String, Subscriber>,
    type_resolver: Option<TypeResolver>,
    scalar_hooks: Option<ScalarHooks>,
    visitor: Option<DirectiveVisitor>,
}

impl fmt::Debug for DefinitionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionUnit")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("extension", &self.is_extension())
            .field("requirements", &self.requirements)
            .field("resolvers", &self.resolvers.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl DefinitionUnit {
    /// Starts building a unit from an SDL fragment.
    pub fn builder(sdl: impl Into<String>) -> UnitBuilder {
        UnitBuilder::new(sdl)
    }

    /// Starts building a single-operation mutation unit.
    ///
    /// The fragment must declare the mutation root type with exactly one
    /// field; `resolver` is bound to that field.
    pub fn mutation<F, Fut>(sdl: impl Into<String>, resolver: F) -> MutationBuilder
    where
        F: Fn(ResolverArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = async_graphql::Result<Value>> + Send + 'static,
    {
        MutationBuilder {
            inner: UnitBuilder::new(sdl),
            resolver: resolver_fn(resolver),
            arguments: IndexMap::new(),
            root_name: "Mutation".to_string(),
        }
    }

    /// Declared type (or directive) name.
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn kind(&self) -> UnitKind {
        self.declaration.kind
    }

    /// Whether the unit holds an `extend ...` declaration.
    pub fn is_extension(&self) -> bool {
        self.declaration.extension
    }

    /// The SDL fragment as written by the author.
    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn resolvers(&self) -> &IndexMap<String, Resolver> {
        &self.resolvers
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn argument_aliases(&self) -> &IndexMap<String, IndexMap<String, String>> {
        &self.argument_aliases
    }

    pub fn subscribers(&self) -> &IndexMap<String, Subscriber> {
        &self.subscribers
    }

    pub fn type_resolver(&self) -> Option<&TypeResolver> {
        self.type_resolver.as_ref()
    }

    pub fn scalar_hooks(&self) -> Option<&ScalarHooks> {
        self.scalar_hooks.as_ref()
    }

    pub fn visitor(&self) -> Option<&DirectiveVisitor> {
        self.visitor.as_ref()
    }

    /// Field bindings of this unit: explicit resolvers first, then aliases of
    /// fields without a resolver.
    pub fn field_bindings(&self) -> impl Iterator<Item = (&str, FieldBinding)> + '_ {
        let resolvers = self
            .resolvers
            .iter()
            .map(|(field, resolver)| (field.as_str(), FieldBinding::Resolver(resolver.clone())));
        let aliases = self
            .aliases
            .iter()
            .filter(|(field, _)| !self.resolvers.contains_key(*field))
            .map(|(field, key)| (field.as_str(), FieldBinding::Alias(key.clone())));
        resolvers.chain(aliases)
    }
}

/// Builder for [`DefinitionUnit`].
pub struct UnitBuilder {
    sdl: String,
    requirements: Vec<Requirement>,
    resolvers: IndexMap<String, Resolver>,
    aliases: IndexMap<String, String>,
    argument_aliases: IndexMap<String, IndexMap<String, String>>,
    subscribers: IndexMap<String, Subscriber>,
    type_resolver: Option<TypeResolver>,
    scalar_hooks: Option<ScalarHooks>,
    visitor: Option<DirectiveVisitor>,
    native_types: IndexMap<String, NativeType>,
    expected_name: Option<String>,
    expected_kind: Option<UnitKind>,
}

impl UnitBuilder {
    fn new(sdl: impl Into<String>) -> Self {
        Self {
            sdl: sdl.into(),
            requirements: Vec::new(),
            resolvers: IndexMap::new(),
            aliases: IndexMap::new(),
            argument_aliases: IndexMap::new(),
            subscribers: IndexMap::new(),
            type_resolver: None,
            scalar_hooks: None,
            visitor: None,
            native_types: IndexMap::new(),
            expected_name: None,
            expected_kind: None,
        }
    }

    /// Requires a unit that is already built.
    #[must_use]
    pub fn requires(mut self, unit: &UnitRef) -> Self {
        self.requirements.push(Requirement::Concrete(Arc::clone(unit)));
        self
    }

    /// Requires several units that are already built.
    #[must_use]
    pub fn requires_all<'a>(mut self, units: impl IntoIterator<Item = &'a UnitRef>) -> Self {
        self.requirements
            .extend(units.into_iter().map(|u| Requirement::Concrete(Arc::clone(u))));
        self
    }

    /// Requires a type by name, resolved when the schema is assembled.
    #[must_use]
    pub fn defer(mut self, type_name: impl Into<String>) -> Self {
        self.requirements
            .push(Requirement::Deferred(DeferredType::new(type_name)));
        self
    }

    /// Binds a resolver to a field.
    #[must_use]
    pub fn resolver<F, Fut>(self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(ResolverArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = async_graphql::Result<Value>> + Send + 'static,
    {
        self.bind(field, resolver_fn(f))
    }

    /// Binds an already wrapped resolver to a field.
    #[must_use]
    pub fn bind(mut self, field: impl Into<String>, resolver: Resolver) -> Self {
        self.resolvers.insert(field.into(), resolver);
        self
    }

    /// Resolves `field` by reading `key` from the parent value.
    #[must_use]
    pub fn alias(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.aliases.insert(field.into(), key.into());
        self
    }

    /// Hands argument `argument` of `field` to the resolver under `key`.
    #[must_use]
    pub fn argument_alias(
        mut self,
        field: impl Into<String>,
        argument: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.argument_aliases
            .entry(field.into())
            .or_default()
            .insert(argument.into(), key.into());
        self
    }

    /// Binds an event source to a subscription field.
    #[must_use]
    pub fn subscriber<F, S>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(ResolverArgs) -> S + Send + Sync + 'static,
        S: Stream<Item = async_graphql::Result<Value>> + Send + 'static,
    {
        self.subscribers.insert(field.into(), subscriber_fn(f));
        self
    }

    /// Sets the concrete-type lookup of an interface or union.
    #[must_use]
    pub fn type_resolver(
        mut self,
        f: impl Fn(&Value) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.type_resolver = Some(Arc::new(f));
        self
    }

    /// Sets the hooks of a custom scalar.
    #[must_use]
    pub fn scalar(mut self, hooks: ScalarHooks) -> Self {
        self.scalar_hooks = Some(hooks);
        self
    }

    /// Sets the visitor of a directive.
    #[must_use]
    pub fn visitor(
        mut self,
        f: impl Fn(&DirectiveSite, Resolver) -> Resolver + Send + Sync + 'static,
    ) -> Self {
        self.visitor = Some(Arc::new(f));
        self
    }

    /// Declares the native type a field's resolver produces.
    ///
    /// A mismatch with a built-in scalar field type is logged, not rejected.
    #[must_use]
    pub fn native_type(mut self, field: impl Into<String>, native: NativeType) -> Self {
        self.native_types.insert(field.into(), native);
        self
    }

    /// Requires the fragment to declare `name`.
    #[must_use]
    pub fn expect_name(mut self, name: impl Into<String>) -> Self {
        self.expected_name = Some(name.into());
        self
    }

    /// Requires the fragment to declare a `kind`.
    #[must_use]
    pub fn expect_kind(mut self, kind: UnitKind) -> Self {
        self.expected_kind = Some(kind);
        self
    }

    /// Parses the fragment and validates the bound behavior against it.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency between fragment and behavior.
    pub fn build(self) -> Result<UnitRef, SchemaDefinitionError> {
        let declaration = sdl::parse_declaration(&self.sdl)?;
        self.finish(declaration)
    }

    fn finish(self, declaration: Declaration) -> Result<UnitRef, SchemaDefinitionError> {
        if let Some(kind) = self.expected_kind {
            check_kind(&declaration, kind)?;
        }
        if let Some(expected) = &self.expected_name {
            check_name(&declaration, expected)?;
        }

        self.check_behavior_kinds(&declaration)?;
        self.check_field_targets(&declaration)?;
        self.check_native_types(&declaration);

        debug!(
            unit = %declaration.name,
            kind = %declaration.kind,
            extension = declaration.extension,
            requirements = self.requirements.len(),
            "Built definition unit"
        );

        Ok(Arc::new(DefinitionUnit {
            sdl: self.sdl,
            declaration,
            requirements: self.requirements,
            resolvers: self.resolvers,
            aliases: self.aliases,
            argument_aliases: self.argument_aliases,
            subscribers: self.subscribers,
            type_resolver: self.type_resolver,
            scalar_hooks: self.scalar_hooks,
            visitor: self.visitor,
        }))
    }

    fn check_behavior_kinds(&self, declaration: &Declaration) -> Result<(), SchemaDefinitionError> {
        let kind = declaration.kind;
        let unsupported = |behavior: &str| SchemaDefinitionError::UnsupportedBehavior {
            type_name: declaration.name.clone(),
            kind: kind.to_string(),
            behavior: behavior.to_string(),
        };

        if kind != UnitKind::Object {
            if !self.resolvers.is_empty() {
                return Err(unsupported("resolvers"));
            }
            if !self.aliases.is_empty() || !self.argument_aliases.is_empty() {
                return Err(unsupported("aliases"));
            }
            if !self.subscribers.is_empty() {
                return Err(unsupported("subscribers"));
            }
            if !self.native_types.is_empty() {
                return Err(unsupported("native type hints"));
            }
        }
        if self.type_resolver.is_some() && !matches!(kind, UnitKind::Interface | UnitKind::Union) {
            return Err(unsupported("a type resolver"));
        }
        if self.scalar_hooks.is_some() && kind != UnitKind::Scalar {
            return Err(unsupported("scalar hooks"));
        }
        if self.visitor.is_some() && kind != UnitKind::Directive {
            return Err(unsupported("a directive visitor"));
        }
        Ok(())
    }

    fn check_field_targets(&self, declaration: &Declaration) -> Result<(), SchemaDefinitionError> {
        // Behavior is keyed by GraphQL field name; alias targets are lookup
        // keys on the parent value and never matched against the schema.
        let targets = self
            .resolvers
            .keys()
            .chain(self.aliases.keys())
            .chain(self.subscribers.keys())
            .chain(self.native_types.keys());
        for field in targets {
            if declaration.field(field).is_none() {
                return Err(SchemaDefinitionError::unmatched_resolver(
                    &declaration.name,
                    field,
                ));
            }
        }

        for (field_name, arguments) in &self.argument_aliases {
            let field = declaration.field(field_name).ok_or_else(|| {
                SchemaDefinitionError::unmatched_resolver(&declaration.name, field_name)
            })?;
            for argument in arguments.keys() {
                if !field.arguments.contains(argument) {
                    return Err(SchemaDefinitionError::UnknownArgument {
                        type_name: declaration.name.clone(),
                        field_name: field_name.clone(),
                        argument: argument.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_native_types(&self, declaration: &Declaration) {
        for (field_name, declared) in native_type_mismatches(declaration, &self.native_types) {
            warn!(
                type_name = %declaration.name,
                field = %field_name,
                declared = %declared,
                "Resolver native type does not match the declared scalar"
            );
        }
    }
}

/// Fields whose native type hint disagrees with their built-in scalar type,
/// paired with the declared scalar. Fields of other types are not compared.
fn native_type_mismatches<'a>(
    declaration: &'a Declaration,
    native_types: &'a IndexMap<String, NativeType>,
) -> Vec<(&'a str, &'a str)> {
    native_types
        .iter()
        .filter_map(|(field_name, native)| {
            let field = declaration.field(field_name)?;
            let mismatch = sdl::is_builtin_scalar(&field.type_name)
                && field.type_name != native.graphql_name();
            mismatch.then_some((field_name.as_str(), field.type_name.as_str()))
        })
        .collect()
}

fn check_kind(declaration: &Declaration, expected: UnitKind) -> Result<(), SchemaDefinitionError> {
    if declaration.kind != expected {
        return Err(SchemaDefinitionError::KindMismatch {
            type_name: declaration.name.clone(),
            expected: expected.to_string(),
            found: declaration.kind.to_string(),
        });
    }
    Ok(())
}

fn check_name(declaration: &Declaration, expected: &str) -> Result<(), SchemaDefinitionError> {
    if declaration.name != expected {
        return Err(SchemaDefinitionError::NameMismatch {
            expected: expected.to_string(),
            found: declaration.name.clone(),
        });
    }
    Ok(())
}

/// Builder for a mutation unit exposing a single operation.
pub struct MutationBuilder {
    inner: UnitBuilder,
    resolver: Resolver,
    arguments: IndexMap<String, String>,
    root_name: String,
}

impl MutationBuilder {
    #[must_use]
    pub fn requires(mut self, unit: &UnitRef) -> Self {
        self.inner = self.inner.requires(unit);
        self
    }

    #[must_use]
    pub fn defer(mut self, type_name: impl Into<String>) -> Self {
        self.inner = self.inner.defer(type_name);
        self
    }

    /// Hands argument `argument` of the mutation to the resolver under `key`.
    #[must_use]
    pub fn argument_alias(mut self, argument: impl Into<String>, key: impl Into<String>) -> Self {
        self.arguments.insert(argument.into(), key.into());
        self
    }

    /// Overrides the mutation root type name (default `Mutation`).
    #[must_use]
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// # Errors
    ///
    /// Fails when the fragment is not a single-field declaration of the
    /// mutation root, or when an argument alias names an unknown argument.
    pub fn build(self) -> Result<UnitRef, SchemaDefinitionError> {
        let declaration = sdl::parse_declaration(&self.inner.sdl)?;
        check_kind(&declaration, UnitKind::Object)?;
        check_name(&declaration, &self.root_name)?;
        if declaration.fields.len() != 1 {
            return Err(SchemaDefinitionError::FieldCount {
                type_name: declaration.name.clone(),
                expected: 1,
                found: declaration.fields.len(),
            });
        }

        let field = declaration.fields[0].name.clone();
        let mut inner = self.inner.bind(field.clone(), self.resolver);
        if !self.arguments.is_empty() {
            inner.argument_aliases.insert(field, self.arguments);
        }
        inner.finish(declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn noop(_: ResolverArgs) -> impl Future<Output = async_graphql::Result<Value>> {
        async { Ok(Value::Null) }
    }

    #[test]
    fn test_builds_object_unit() {
        let unit = DefinitionUnit::builder("type User { id: ID! username: String }")
            .build()
            .unwrap();
        assert_eq!(unit.name(), "User");
        assert_eq!(unit.kind(), UnitKind::Object);
        assert!(!unit.is_extension());
        assert!(unit.requirements().is_empty());
    }

    #[test]
    fn test_rejects_multiple_declarations() {
        let err = DefinitionUnit::builder("type User\n\ntype Group")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultipleDeclarations);
    }

    #[test]
    fn test_rejects_unmatched_resolver() {
        let err = DefinitionUnit::builder("type User { id: ID! }")
            .resolver("name", noop)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::UnmatchedResolver {
                type_name: "User".into(),
                field_name: "name".into(),
            }
        );
    }

    #[test]
    fn test_resolver_matches_field_not_alias() {
        let unit = DefinitionUnit::builder("type User { fullName: String }")
            .resolver("fullName", noop)
            .alias("fullName", "full_name")
            .build()
            .unwrap();
        assert!(unit.resolvers().contains_key("fullName"));

        let err = DefinitionUnit::builder("type User { fullName: String }")
            .resolver("full_name", noop)
            .alias("fullName", "full_name")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnmatchedResolver);
    }

    #[test]
    fn test_rejects_alias_for_unknown_field() {
        let err = DefinitionUnit::builder("type User { fullName: String }")
            .alias("full_name", "fullName")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnmatchedResolver);
    }

    #[test]
    fn test_field_bindings_prefer_resolvers() {
        let unit = DefinitionUnit::builder("type User { fullName: String email: String }")
            .resolver("fullName", noop)
            .alias("fullName", "full_name")
            .alias("email", "email_address")
            .build()
            .unwrap();
        let bindings: Vec<(&str, FieldBinding)> = unit.field_bindings().collect();
        assert_eq!(bindings.len(), 2);
        assert!(matches!(bindings[0], ("fullName", FieldBinding::Resolver(_))));
        assert!(matches!(&bindings[1], ("email", FieldBinding::Alias(key)) if key == "email_address"));
    }

    #[test]
    fn test_rejects_unknown_argument_alias() {
        let err = DefinitionUnit::builder("type Query { split(text: String!): [String!]! }")
            .argument_alias("split", "separator", "sep")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_rejects_behavior_on_wrong_kind() {
        let err = DefinitionUnit::builder("scalar DateTime")
            .type_resolver(|_| None)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedBehavior);

        let err = DefinitionUnit::builder("input UserInput { name: String }")
            .resolver("name", noop)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedBehavior);
    }

    #[test]
    fn test_native_type_mismatch_is_not_fatal() {
        let unit = DefinitionUnit::builder("type Stats { total: Int }")
            .native_type("total", NativeType::String)
            .build();
        assert!(unit.is_ok());
    }

    #[test]
    fn test_native_type_mismatches() {
        let declaration =
            sdl::parse_declaration("type Stats { total: Int ratio: Float id: ID! owner: User }")
                .unwrap();
        let mut hints = IndexMap::new();
        hints.insert("total".to_string(), NativeType::String);
        hints.insert("ratio".to_string(), NativeType::Float);
        hints.insert("id".to_string(), NativeType::Id);
        hints.insert("owner".to_string(), NativeType::Int);

        assert_eq!(
            native_type_mismatches(&declaration, &hints),
            vec![("total", "Int")]
        );
    }

    #[test]
    fn test_expectations() {
        let err = DefinitionUnit::builder("type User { id: ID }")
            .expect_name("Query")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameMismatch);

        let err = DefinitionUnit::builder("enum Role { ADMIN }")
            .expect_kind(UnitKind::Object)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);
    }

    #[test]
    fn test_deferred_requirement() {
        let unit = DefinitionUnit::builder("type User { group: Group }")
            .defer("Group")
            .build()
            .unwrap();
        assert_eq!(unit.requirements().len(), 1);
        assert_eq!(unit.requirements()[0].name(), "Group");
        assert!(unit.requirements()[0].provides("Group", false));
        assert!(!unit.requirements()[0].provides("Group", true));
    }

    #[test]
    fn test_mutation_rejects_invalid_declarations() {
        let err = DefinitionUnit::mutation("typo User", noop).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSdl);

        let err = DefinitionUnit::mutation("scalar DateTime", noop)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);

        let err = DefinitionUnit::mutation("type User\n\ntype Group", noop)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultipleDeclarations);

        let err = DefinitionUnit::mutation("type User { id: ID! }", noop)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameMismatch);
    }

    #[test]
    fn test_mutation_requires_single_field() {
        let err = DefinitionUnit::mutation("type Mutation", noop)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::FieldCount {
                type_name: "Mutation".into(),
                expected: 1,
                found: 0,
            }
        );

        let err = DefinitionUnit::mutation(
            r#"
            type Mutation {
                userCreate(name: String!): Boolean!
                userUpdate(id: ID!, name: String!): Boolean!
            }
            "#,
            noop,
        )
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldCount);
    }

    #[test]
    fn test_mutation_binds_sole_field() {
        let unit = DefinitionUnit::mutation(
            "type Mutation { split(strToSplit: String!): [String!]! }",
            noop,
        )
        .argument_alias("strToSplit", "split_str")
        .build()
        .unwrap();
        assert!(unit.resolvers().contains_key("split"));
        assert_eq!(
            unit.argument_aliases()["split"].get("strToSplit"),
            Some(&"split_str".to_string())
        );
    }

    #[test]
    fn test_mutation_rejects_unknown_argument() {
        let err = DefinitionUnit::mutation(
            "type Mutation { userCreate(name: String!): Boolean! }",
            noop,
        )
        .argument_alias("realName", "real_name")
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
