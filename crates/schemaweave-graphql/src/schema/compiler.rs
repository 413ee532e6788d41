//! Schema compilation.
//!
//! [`SchemaCompiler`] is the seam between assembly and execution. The crate
//! ships [`DynamicSchemaCompiler`], which rebuilds the assembled document with
//! async-graphql's dynamic schema API and wires the flattened bindings into
//! field resolvers.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface,
    InterfaceField, Object, ResolverContext, Scalar, Schema, SchemaBuilder, Subscription,
    SubscriptionField, SubscriptionFieldFuture, TypeRef, Union,
};
use async_graphql::{Name, Value};
use async_graphql_parser::parse_schema;
use async_graphql_parser::types::{
    BaseType, ConstDirective, EnumValueDefinition, FieldDefinition, InputValueDefinition, Type,
    TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::Positioned;
use futures_util::stream::StreamExt;
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::assembler::AssembledSchema;
use crate::config::CompilerConfig;
use crate::sdl::named_type;
use crate::unit::{FieldBinding, ResolverArgs, ScalarFn, TypeResolver};

/// Turns an assembled schema into an executable one.
///
/// Errors are plain messages; [`AssembledSchema::compile`] wraps them into
/// [`crate::SchemaDefinitionError::CompilationError`].
pub trait SchemaCompiler {
    type Output;

    fn compile(&self, schema: &AssembledSchema) -> Result<Self::Output, String>;
}

/// Compiles assembled schemas into [`async_graphql::dynamic::Schema`].
///
/// # Example
///
/// ```ignore
/// let assembled = assemble(units, &AssemblyConfig::default())?;
/// let schema = assembled.compile(&DynamicSchemaCompiler::new(CompilerConfig::default()))?;
///
/// let response = schema.execute("{ user { fullName } }").await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DynamicSchemaCompiler {
    config: CompilerConfig,
}

impl DynamicSchemaCompiler {
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }
}

impl SchemaCompiler for DynamicSchemaCompiler {
    type Output = Schema;

    fn compile(&self, assembled: &AssembledSchema) -> Result<Schema, String> {
        debug!("Starting dynamic schema compilation");

        let document = parse_schema(assembled.document()).map_err(|e| e.to_string())?;
        let types = fold_types(&document.definitions)?;

        let roots = assembled.root_types();
        if !types.contains_key(roots.query.as_str()) {
            return Err(format!("Query root type `{}` is not declared", roots.query));
        }
        let mutation = types
            .contains_key(roots.mutation.as_str())
            .then_some(roots.mutation.as_str());
        let subscription = types
            .contains_key(roots.subscription.as_str())
            .then_some(roots.subscription.as_str());

        let mut schema_builder = Schema::build(&roots.query, mutation, subscription);
        let outputs = OutputKinds::new(&types, assembled);

        for (name, ty) in &types {
            schema_builder = match &ty.kind {
                FoldedKind::Scalar => self.register_scalar(schema_builder, name, ty, assembled),
                FoldedKind::Enum(values) => register_enum(schema_builder, name, ty, values),
                FoldedKind::Input(fields) => register_input(schema_builder, name, ty, fields),
                FoldedKind::Union(members) => register_union(schema_builder, name, ty, members),
                FoldedKind::Interface { implements, fields } => {
                    register_interface(schema_builder, name, ty, implements, fields)
                }
                FoldedKind::Object { implements, fields } => {
                    if Some(*name) == subscription {
                        register_subscription(schema_builder, name, ty, fields, assembled, &outputs)?
                    } else {
                        register_object(schema_builder, name, ty, implements, fields, assembled, &outputs)
                    }
                }
            };
            trace!(type_name = %name, "Registered type");
        }

        // Configure limits
        let mut schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if !self.config.introspection {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder.finish().map_err(|e| e.to_string())?;

        debug!(types = types.len(), "Dynamic schema compilation complete");
        Ok(schema)
    }
}

impl DynamicSchemaCompiler {
    /// Registers a scalar, validating inputs through its parse hooks.
    fn register_scalar(
        &self,
        builder: SchemaBuilder,
        name: &str,
        ty: &FoldedType<'_>,
        assembled: &AssembledSchema,
    ) -> SchemaBuilder {
        let mut scalar = Scalar::new(name);
        if let Some(description) = ty.description {
            scalar = scalar.description(description);
        }
        if let Some(hooks) = assembled.scalar(name) {
            let hooks = hooks.clone();
            scalar = scalar.validator(move |value| hooks.accepts(value));
        }
        builder.register(scalar)
    }
}

/// A type declaration with all its extensions folded in.
struct FoldedType<'a> {
    description: Option<&'a str>,
    kind: FoldedKind<'a>,
}

enum FoldedKind<'a> {
    Scalar,
    Object {
        implements: Vec<&'a str>,
        fields: Vec<&'a FieldDefinition>,
    },
    Interface {
        implements: Vec<&'a str>,
        fields: Vec<&'a FieldDefinition>,
    },
    Union(Vec<&'a str>),
    Enum(Vec<&'a EnumValueDefinition>),
    Input(Vec<&'a InputValueDefinition>),
}

impl<'a> FoldedKind<'a> {
    fn new(kind: &'a TypeKind) -> Self {
        match kind {
            TypeKind::Scalar => Self::Scalar,
            TypeKind::Object(object) => Self::Object {
                implements: object.implements.iter().map(|n| n.node.as_str()).collect(),
                fields: object.fields.iter().map(|f| &f.node).collect(),
            },
            TypeKind::Interface(interface) => Self::Interface {
                implements: interface.implements.iter().map(|n| n.node.as_str()).collect(),
                fields: interface.fields.iter().map(|f| &f.node).collect(),
            },
            TypeKind::Union(union) => Self::Union(union.members.iter().map(|m| m.node.as_str()).collect()),
            TypeKind::Enum(enum_type) => Self::Enum(enum_type.values.iter().map(|v| &v.node).collect()),
            TypeKind::InputObject(input) => Self::Input(input.fields.iter().map(|f| &f.node).collect()),
        }
    }

    /// Appends an extension of the same kind.
    fn extend(&mut self, name: &str, extension: FoldedKind<'a>) -> Result<(), String> {
        match (self, extension) {
            (Self::Scalar, Self::Scalar) => {}
            (
                Self::Object { implements, fields },
                Self::Object {
                    implements: more_implements,
                    fields: more_fields,
                },
            )
            | (
                Self::Interface { implements, fields },
                Self::Interface {
                    implements: more_implements,
                    fields: more_fields,
                },
            ) => {
                for interface in more_implements {
                    if !implements.contains(&interface) {
                        implements.push(interface);
                    }
                }
                fields.extend(more_fields);
            }
            (Self::Union(members), Self::Union(more)) => members.extend(more),
            (Self::Enum(values), Self::Enum(more)) => values.extend(more),
            (Self::Input(fields), Self::Input(more)) => fields.extend(more),
            _ => return Err(format!("Extension of `{name}` does not match the kind of its definition")),
        }
        Ok(())
    }

    fn field_names(&self) -> Vec<&'a str> {
        match self {
            Self::Object { fields, .. } | Self::Interface { fields, .. } => {
                fields.iter().map(|f| f.name.node.as_str()).collect()
            }
            Self::Input(fields) => fields.iter().map(|f| f.name.node.as_str()).collect(),
            Self::Enum(values) => values.iter().map(|v| v.value.node.as_str()).collect(),
            Self::Union(_) | Self::Scalar => Vec::new(),
        }
    }
}

/// Collects type definitions by name and folds extensions into them.
fn fold_types(
    definitions: &[TypeSystemDefinition],
) -> Result<IndexMap<&str, FoldedType<'_>>, String> {
    let type_definitions: Vec<&TypeDefinition> = definitions
        .iter()
        .filter_map(|definition| match definition {
            TypeSystemDefinition::Type(def) => Some(&def.node),
            _ => None,
        })
        .collect();

    let mut types = IndexMap::new();
    for def in type_definitions.iter().filter(|def| !def.extend) {
        let name = def.name.node.as_str();
        let folded = FoldedType {
            description: def.description.as_ref().map(|d| d.node.as_str()),
            kind: FoldedKind::new(&def.kind),
        };
        if types.insert(name, folded).is_some() {
            return Err(format!("Type `{name}` is defined more than once"));
        }
    }

    for def in type_definitions.iter().filter(|def| def.extend) {
        let name = def.name.node.as_str();
        let folded = types
            .get_mut(name)
            .ok_or_else(|| format!("Type `{name}` is extended but never defined"))?;
        folded.kind.extend(name, FoldedKind::new(&def.kind))?;
    }

    for (name, folded) in &types {
        let mut seen = Vec::new();
        for field in folded.kind.field_names() {
            if seen.contains(&field) {
                return Err(format!("Field `{name}.{field}` is declared more than once"));
            }
            seen.push(field);
        }
    }

    Ok(types)
}

fn register_enum(
    builder: SchemaBuilder,
    name: &str,
    ty: &FoldedType<'_>,
    values: &[&EnumValueDefinition],
) -> SchemaBuilder {
    let mut enum_type = Enum::new(name);
    if let Some(description) = ty.description {
        enum_type = enum_type.description(description);
    }
    for value in values {
        let mut item = EnumItem::new(value.value.node.as_str());
        if let Some(description) = &value.description {
            item = item.description(description.node.as_str());
        }
        if let Some(reason) = deprecation(&value.directives) {
            item = item.deprecation(Some(reason.as_str()));
        }
        enum_type = enum_type.item(item);
    }
    builder.register(enum_type)
}

fn register_input(
    builder: SchemaBuilder,
    name: &str,
    ty: &FoldedType<'_>,
    fields: &[&InputValueDefinition],
) -> SchemaBuilder {
    let mut input = InputObject::new(name);
    if let Some(description) = ty.description {
        input = input.description(description);
    }
    for field in fields {
        input = input.field(input_value(field));
    }
    builder.register(input)
}

fn register_union(
    builder: SchemaBuilder,
    name: &str,
    ty: &FoldedType<'_>,
    members: &[&str],
) -> SchemaBuilder {
    let mut union = Union::new(name);
    if let Some(description) = ty.description {
        union = union.description(description);
    }
    for member in members {
        union = union.possible_type(*member);
    }
    builder.register(union)
}

fn register_interface(
    builder: SchemaBuilder,
    name: &str,
    ty: &FoldedType<'_>,
    implements: &[&str],
    fields: &[&FieldDefinition],
) -> SchemaBuilder {
    let mut interface = Interface::new(name);
    if let Some(description) = ty.description {
        interface = interface.description(description);
    }
    for parent in implements {
        interface = interface.implement(*parent);
    }
    for field in fields {
        let mut interface_field =
            InterfaceField::new(field.name.node.as_str(), type_ref(&field.ty.node));
        for argument in &field.arguments {
            interface_field = interface_field.argument(input_value(&argument.node));
        }
        if let Some(description) = &field.description {
            interface_field = interface_field.description(description.node.as_str());
        }
        interface = interface.field(interface_field);
    }
    builder.register(interface)
}

fn register_object(
    builder: SchemaBuilder,
    name: &str,
    ty: &FoldedType<'_>,
    implements: &[&str],
    fields: &[&FieldDefinition],
    assembled: &AssembledSchema,
    outputs: &OutputKinds,
) -> SchemaBuilder {
    let mut object = Object::new(name);
    if let Some(description) = ty.description {
        object = object.description(description);
    }
    for interface in implements {
        object = object.implement(*interface);
    }
    for field in fields {
        object = object.field(object_field(name, field, assembled, outputs));
    }
    builder.register(object)
}

/// Builds an object field whose resolver runs the field's binding.
fn object_field(
    type_name: &str,
    field: &FieldDefinition,
    assembled: &AssembledSchema,
    outputs: &OutputKinds,
) -> Field {
    let field_name = field.name.node.as_str();
    let binding = assembled
        .resolver(type_name, field_name)
        .cloned()
        .unwrap_or_else(|| FieldBinding::Alias(field_name.to_string()));
    let default_resolved = matches!(binding, FieldBinding::Alias(_));
    let resolver = binding.into_resolver();
    let renames = assembled
        .argument_aliases(type_name, field_name)
        .cloned()
        .unwrap_or_default();
    let output = outputs.get(named_type(&field.ty.node), default_resolved);

    let mut built = Field::new(field_name, type_ref(&field.ty.node), move |ctx| {
        let resolver = resolver.clone();
        let output = output.clone();
        let args = resolver_args(&ctx, &renames);
        FieldFuture::new(async move {
            let value = resolver(args).await?;
            output.convert(value).map(Some)
        })
    });

    for argument in &field.arguments {
        built = built.argument(input_value(&argument.node));
    }
    if let Some(description) = &field.description {
        built = built.description(description.node.as_str());
    }
    if let Some(reason) = deprecation(&field.directives) {
        built = built.deprecation(Some(reason.as_str()));
    }
    built
}

/// Registers the subscription root. Every field needs a subscriber.
fn register_subscription(
    builder: SchemaBuilder,
    name: &str,
    ty: &FoldedType<'_>,
    fields: &[&FieldDefinition],
    assembled: &AssembledSchema,
    outputs: &OutputKinds,
) -> Result<SchemaBuilder, String> {
    let mut subscription = Subscription::new(name);
    if let Some(description) = ty.description {
        subscription = subscription.description(description);
    }

    for field in fields {
        let field_name = field.name.node.as_str();
        let subscriber = assembled
            .subscriber(name, field_name)
            .cloned()
            .ok_or_else(|| format!("Subscription field `{name}.{field_name}` has no subscriber"))?;
        let renames = assembled
            .argument_aliases(name, field_name)
            .cloned()
            .unwrap_or_default();
        let output = outputs.get(named_type(&field.ty.node), false);

        let mut built = SubscriptionField::new(field_name, type_ref(&field.ty.node), move |ctx| {
            let subscriber = subscriber.clone();
            let output = output.clone();
            let args = resolver_args(&ctx, &renames);
            SubscriptionFieldFuture::new(async move {
                let events = subscriber(args).map(move |event| event.and_then(|value| output.convert(value)));
                Ok::<_, async_graphql::Error>(events)
            })
        });
        for argument in &field.arguments {
            built = built.argument(input_value(&argument.node));
        }
        if let Some(description) = &field.description {
            built = built.description(description.node.as_str());
        }
        subscription = subscription.field(built);
    }

    Ok(builder.register(subscription))
}

/// Collects the parent value and the (renamed) arguments of a field call.
fn resolver_args(ctx: &ResolverContext<'_>, renames: &IndexMap<String, String>) -> ResolverArgs {
    let parent = ctx.parent_value.as_value().cloned().unwrap_or(Value::Null);
    let args = ctx
        .args
        .iter()
        .map(|(name, value)| {
            let key = renames
                .get(name.as_str())
                .cloned()
                .unwrap_or_else(|| name.to_string());
            (key, value.as_value().clone())
        })
        .collect();
    ResolverArgs { parent, args }
}

fn input_value(value: &InputValueDefinition) -> InputValue {
    let mut input = InputValue::new(value.name.node.as_str(), type_ref(&value.ty.node));
    if let Some(default) = &value.default_value {
        input = input.default_value(default.node.clone());
    }
    if let Some(description) = &value.description {
        input = input.description(description.node.as_str());
    }
    input
}

fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::named(name.as_str()),
        BaseType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    };
    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn deprecation(directives: &[Positioned<ConstDirective>]) -> Option<String> {
    let directive = directives
        .iter()
        .find(|d| d.node.name.node.as_str() == "deprecated")?;
    let reason = directive
        .node
        .get_argument("reason")
        .and_then(|value| match &value.node {
            Value::String(reason) => Some(reason.clone()),
            _ => None,
        });
    Some(reason.unwrap_or_else(|| "No longer supported".to_string()))
}

/// How resolved values of a named type are handed to async-graphql.
#[derive(Clone)]
enum OutputKind {
    Plain,
    Enum,
    Abstract {
        type_name: String,
        type_resolver: Option<TypeResolver>,
    },
    Serialize(ScalarFn),
}

impl OutputKind {
    fn convert<'a>(&self, value: Value) -> async_graphql::Result<FieldValue<'a>> {
        let value = match value {
            Value::Null => return Ok(FieldValue::NULL),
            Value::List(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.convert(item))
                    .collect::<async_graphql::Result<Vec<_>>>()?;
                return Ok(FieldValue::list(items));
            }
            value => value,
        };

        match self {
            Self::Plain => Ok(FieldValue::value(value)),
            Self::Enum => Ok(FieldValue::value(match value {
                Value::String(item) => Value::Enum(Name::new(item)),
                other => other,
            })),
            Self::Serialize(serialize) => serialize(&value)
                .map(FieldValue::value)
                .map_err(async_graphql::Error::new),
            Self::Abstract {
                type_name,
                type_resolver,
            } => {
                let concrete = type_resolver
                    .as_ref()
                    .and_then(|resolve| resolve(&value))
                    .or_else(|| typename(&value))
                    .ok_or_else(|| {
                        async_graphql::Error::new(format!(
                            "Cannot determine the concrete type of an `{type_name}` value"
                        ))
                    })?;
                Ok(FieldValue::value(value).with_type(concrete))
            }
        }
    }
}

fn typename(value: &Value) -> Option<String> {
    match value {
        Value::Object(fields) => match fields.get("__typename") {
            Some(Value::String(name)) => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Output handling of every named type that needs more than pass-through.
struct OutputKinds(HashMap<String, OutputKind>);

impl OutputKinds {
    fn new(types: &IndexMap<&str, FoldedType<'_>>, assembled: &AssembledSchema) -> Self {
        let mut kinds = HashMap::new();
        for (name, ty) in types {
            let kind = match &ty.kind {
                FoldedKind::Enum(_) => OutputKind::Enum,
                FoldedKind::Interface { .. } | FoldedKind::Union(_) => OutputKind::Abstract {
                    type_name: (*name).to_string(),
                    type_resolver: assembled.type_resolver(name).cloned(),
                },
                FoldedKind::Scalar => match assembled.scalar(name).and_then(|h| h.serialize.clone()) {
                    Some(serialize) => OutputKind::Serialize(serialize),
                    None => continue,
                },
                _ => continue,
            };
            kinds.insert((*name).to_string(), kind);
        }
        Self(kinds)
    }

    /// Output kind for a field of type `type_name`. Scalar serialization only
    /// applies to default-resolved fields.
    fn get(&self, type_name: &str, default_resolved: bool) -> Arc<OutputKind> {
        let kind = match self.0.get(type_name) {
            Some(OutputKind::Serialize(_)) if !default_resolved => OutputKind::Plain,
            Some(kind) => kind.clone(),
            None => OutputKind::Plain,
        };
        Arc::new(kind)
    }
}
