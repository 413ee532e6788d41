//! Schema assembly.
//!
//! Orders the validated parts, concatenates their SDL into one document and
//! flattens the behavior of every unit into lookup tables keyed by type and
//! field name. The result is handed to a [`SchemaCompiler`].

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::compiler::SchemaCompiler;
use super::{Part, consistency, requirements, roots};
use crate::config::{AssemblyConfig, RootTypeNames};
use crate::error::SchemaDefinitionError;
use crate::unit::{
    DirectiveSite, DirectiveVisitor, FieldBinding, ScalarHooks, Subscriber, TypeResolver,
    UnitKind, UnitRef,
};

/// Identifies a field of the assembled schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub type_name: String,
    pub field_name: String,
}

impl FieldKey {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// The merged SDL document plus every binding needed to execute it.
pub struct AssembledSchema {
    document: String,
    type_order: Vec<String>,
    root_types: RootTypeNames,
    resolvers: IndexMap<FieldKey, FieldBinding>,
    argument_aliases: IndexMap<FieldKey, IndexMap<String, String>>,
    subscribers: IndexMap<FieldKey, Subscriber>,
    type_resolvers: IndexMap<String, TypeResolver>,
    scalars: IndexMap<String, ScalarHooks>,
    visitors: IndexMap<String, DirectiveVisitor>,
}

impl fmt::Debug for AssembledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssembledSchema")
            .field("type_order", &self.type_order)
            .field("resolvers", &self.resolvers)
            .field("argument_aliases", &self.argument_aliases)
            .field("subscribers", &self.subscribers.keys().collect::<Vec<_>>())
            .field("type_resolvers", &self.type_resolvers.keys().collect::<Vec<_>>())
            .field("scalars", &self.scalars)
            .field("visitors", &self.visitors.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl AssembledSchema {
    /// The ordered SDL document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Emitted type and directive names, in document order. A name appears
    /// once per emitted declaration, so extended types may repeat.
    pub fn type_order(&self) -> &[String] {
        &self.type_order
    }

    pub fn root_types(&self) -> &RootTypeNames {
        &self.root_types
    }

    /// Binding of a field, after directive visitors were applied.
    pub fn resolver(&self, type_name: &str, field_name: &str) -> Option<&FieldBinding> {
        self.resolvers.get(&FieldKey::new(type_name, field_name))
    }

    pub fn resolvers(&self) -> &IndexMap<FieldKey, FieldBinding> {
        &self.resolvers
    }

    /// Argument renames of a field, keyed by declared argument name.
    pub fn argument_aliases(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Option<&IndexMap<String, String>> {
        self.argument_aliases.get(&FieldKey::new(type_name, field_name))
    }

    pub fn subscriber(&self, type_name: &str, field_name: &str) -> Option<&Subscriber> {
        self.subscribers.get(&FieldKey::new(type_name, field_name))
    }

    pub fn type_resolver(&self, type_name: &str) -> Option<&TypeResolver> {
        self.type_resolvers.get(type_name)
    }

    pub fn scalar(&self, type_name: &str) -> Option<&ScalarHooks> {
        self.scalars.get(type_name)
    }

    pub fn visitors(&self) -> &IndexMap<String, DirectiveVisitor> {
        &self.visitors
    }

    /// Hands the assembled schema to a compiler.
    ///
    /// # Errors
    ///
    /// Any compiler failure is returned as
    /// [`SchemaDefinitionError::CompilationError`] with the message unchanged.
    pub fn compile<C: SchemaCompiler>(&self, compiler: &C) -> Result<C::Output, SchemaDefinitionError> {
        compiler
            .compile(self)
            .map_err(SchemaDefinitionError::CompilationError)
    }
}

/// Assembles definition units into one schema document.
///
/// The inputs are completed with their transitive requirements, root types
/// are merged (or re-emitted as extensions), and the result is checked for
/// consistency before bindings are flattened.
///
/// # Errors
///
/// Fails fast with the first [`SchemaDefinitionError`] found; no partial
/// schema is produced. An invalid `config` is rejected with
/// [`SchemaDefinitionError::InvalidConfig`] before any unit is looked at.
pub fn assemble(
    units: impl IntoIterator<Item = UnitRef>,
    config: &AssemblyConfig,
) -> Result<AssembledSchema, SchemaDefinitionError> {
    config
        .validate()
        .map_err(|message| SchemaDefinitionError::InvalidConfig { message })?;
    debug!("Starting schema assembly");

    let units = requirements::resolve(units, &config.root_types)?;
    let parts = roots::merge(&units, config)?;
    consistency::validate(&parts, &config.root_types)?;

    let order = topological_order(&parts);
    let mut document = String::new();
    let mut type_order = Vec::with_capacity(order.len());
    for &index in &order {
        let part = &parts[index];
        if !document.is_empty() {
            document.push_str("\n\n");
        }
        document.push_str(part.sdl.trim());
        type_order.push(part.name.clone());
        trace!(part = %part.name, kind = %part.kind, extension = part.extension, "Emitted part");
    }

    let mut schema = AssembledSchema {
        document,
        type_order,
        root_types: config.root_types.clone(),
        resolvers: IndexMap::new(),
        argument_aliases: IndexMap::new(),
        subscribers: IndexMap::new(),
        type_resolvers: IndexMap::new(),
        scalars: IndexMap::new(),
        visitors: IndexMap::new(),
    };
    for &index in &order {
        flatten(&parts[index], &mut schema);
    }
    apply_visitors(&parts, &order, &mut schema);

    debug!(
        types = schema.type_order.len(),
        resolvers = schema.resolvers.len(),
        visitors = schema.visitors.len(),
        "Schema assembly complete"
    );
    Ok(schema)
}

/// Orders parts so each follows the parts it references.
///
/// Among ready parts the one earliest in input order goes first; when only
/// cyclic parts remain, the earliest of them is emitted regardless.
fn topological_order(parts: &[Part]) -> Vec<usize> {
    let mut definitions: HashMap<(bool, &str), usize> = HashMap::new();
    for (index, part) in parts.iter().enumerate() {
        if !part.extension {
            let directive = part.kind == UnitKind::Directive;
            definitions.entry((directive, part.name.as_str())).or_insert(index);
        }
    }

    let dependencies: Vec<IndexSet<usize>> = parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let mut deps = IndexSet::new();
            for unit in &part.sources {
                let declaration = unit.declaration();
                let types = declaration.type_refs.iter().map(|name| (false, name.as_str()));
                let directives = declaration
                    .directive_refs
                    .iter()
                    .map(|name| (true, name.as_str()));
                for key in types.chain(directives) {
                    if let Some(&dep) = definitions.get(&key) {
                        if dep != index {
                            deps.insert(dep);
                        }
                    }
                }
            }
            deps
        })
        .collect();

    let mut emitted = vec![false; parts.len()];
    let mut order = Vec::with_capacity(parts.len());
    while order.len() < parts.len() {
        let ready = (0..parts.len())
            .find(|&i| !emitted[i] && dependencies[i].iter().all(|&dep| emitted[dep]));
        let next = match ready.or_else(|| emitted.iter().position(|done| !done)) {
            Some(next) => next,
            None => break,
        };
        emitted[next] = true;
        order.push(next);
    }
    order
}

fn flatten(part: &Part, schema: &mut AssembledSchema) {
    for unit in &part.sources {
        for (field, binding) in unit.field_bindings() {
            schema
                .resolvers
                .entry(FieldKey::new(&part.name, field))
                .or_insert(binding);
        }
        for (field, renames) in unit.argument_aliases() {
            schema
                .argument_aliases
                .entry(FieldKey::new(&part.name, field))
                .or_default()
                .extend(renames.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        for (field, subscriber) in unit.subscribers() {
            schema
                .subscribers
                .insert(FieldKey::new(&part.name, field), subscriber.clone());
        }
        if let Some(type_resolver) = unit.type_resolver() {
            schema
                .type_resolvers
                .entry(part.name.clone())
                .or_insert_with(|| type_resolver.clone());
        }
        if let Some(hooks) = unit.scalar_hooks() {
            schema
                .scalars
                .entry(part.name.clone())
                .or_insert_with(|| hooks.clone());
        }
        if let Some(visitor) = unit.visitor() {
            schema.visitors.insert(part.name.clone(), visitor.clone());
        }
    }
}

/// Decorates the binding of every object field carrying a directive that has
/// a visitor. Visitors run once per directive use, in the order written.
fn apply_visitors(parts: &[Part], order: &[usize], schema: &mut AssembledSchema) {
    if schema.visitors.is_empty() {
        return;
    }

    for &index in order {
        let part = &parts[index];
        if part.kind != UnitKind::Object {
            continue;
        }
        for field in &part.fields {
            for directive in &field.directives {
                let Some(visitor) = schema.visitors.get(&directive.name) else {
                    continue;
                };
                let key = FieldKey::new(&part.name, &field.name);
                let current = schema
                    .resolvers
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| FieldBinding::Alias(field.name.clone()));
                let site = DirectiveSite {
                    directive: directive.name.clone(),
                    type_name: part.name.clone(),
                    field_name: field.name.clone(),
                    arguments: directive.arguments.clone(),
                };
                let decorated = visitor(&site, current.into_resolver());
                trace!(field = %key, directive = %directive.name, "Applied directive visitor");
                schema.resolvers.insert(key, FieldBinding::Resolver(decorated));
            }
        }
    }
}
