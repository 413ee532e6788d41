//! SDL inspection and printing.
//!
//! Fragments are parsed with `async-graphql-parser`. Only the summary needed
//! by the assembly engine is kept: the declared name and kind, the fields
//! with their arguments, and every named type and directive the fragment
//! refers to. Fields are re-printed when root declarations are merged.

use std::fmt::Write as _;

use async_graphql::Value;
use async_graphql_parser::parse_schema;
use async_graphql_parser::types::{
    BaseType, ConstDirective, DirectiveDefinition, FieldDefinition, InputValueDefinition, Type,
    TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::Positioned;
use async_graphql_value::Name;
use indexmap::{IndexMap, IndexSet};

use crate::error::SchemaDefinitionError;
use crate::unit::UnitKind;

/// Scalars every GraphQL schema provides.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Directives every GraphQL schema provides.
pub const BUILTIN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// Summary of the single declaration held by a definition unit.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub kind: UnitKind,
    pub extension: bool,
    pub description: Option<String>,
    pub implements: Vec<String>,
    /// Type-level directives, printed.
    pub directives: Vec<String>,
    pub fields: Vec<FieldDecl>,
    /// Named types referenced by the declaration, built-in scalars excluded.
    pub type_refs: IndexSet<String>,
    /// Custom directives used by the declaration.
    pub directive_refs: IndexSet<String>,
}

/// A field (or input field) of a declaration.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub arguments: Vec<String>,
    /// Innermost named type of the field, e.g. `User` for `[User!]!`.
    pub type_name: String,
    pub directives: Vec<DirectiveUse>,
    /// The field re-printed as SDL, indented for a type body.
    pub sdl: String,
}

/// A directive applied to a field.
#[derive(Debug, Clone)]
pub struct DirectiveUse {
    pub name: String,
    pub arguments: IndexMap<String, Value>,
}

impl Declaration {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Returns whether `name` is a built-in scalar.
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// Returns whether `name` is a valid GraphQL name (`/[_A-Za-z][_0-9A-Za-z]*/`).
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Parses a fragment that must hold exactly one declaration.
pub(crate) fn parse_declaration(sdl: &str) -> Result<Declaration, SchemaDefinitionError> {
    if is_blank(sdl) {
        return Err(SchemaDefinitionError::NoDeclaration);
    }

    let document = parse_schema(sdl).map_err(|e| SchemaDefinitionError::InvalidSdl {
        message: e.to_string(),
    })?;

    let mut definitions = document.definitions;
    match definitions.len() {
        0 => return Err(SchemaDefinitionError::NoDeclaration),
        1 => {}
        count => {
            return Err(SchemaDefinitionError::MultipleDeclarations {
                count,
                names: definitions.iter().map(definition_name).collect(),
            });
        }
    }

    match definitions.remove(0) {
        TypeSystemDefinition::Schema(_) => Err(SchemaDefinitionError::UnsupportedDeclaration {
            message: "schema definitions are configured through root type names".into(),
        }),
        TypeSystemDefinition::Type(def) => Ok(type_declaration(&def.node)),
        TypeSystemDefinition::Directive(def) => Ok(directive_declaration(&def.node)),
    }
}

/// Innermost named type of `ty`.
pub(crate) fn named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => named_type(inner),
    }
}

fn is_blank(sdl: &str) -> bool {
    sdl.lines().map(str::trim).all(|line| line.is_empty() || line.starts_with('#'))
}

fn definition_name(definition: &TypeSystemDefinition) -> String {
    match definition {
        TypeSystemDefinition::Schema(_) => "schema".to_string(),
        TypeSystemDefinition::Type(def) => def.node.name.node.to_string(),
        TypeSystemDefinition::Directive(def) => format!("@{}", def.node.name.node),
    }
}

#[derive(Default)]
struct References {
    types: IndexSet<String>,
    directives: IndexSet<String>,
}

impl References {
    fn add_type(&mut self, name: &str) {
        if !is_builtin_scalar(name) {
            self.types.insert(name.to_string());
        }
    }

    fn add_directives(&mut self, directives: &[Positioned<ConstDirective>]) {
        for directive in directives {
            let name = directive.node.name.node.as_str();
            if !BUILTIN_DIRECTIVES.contains(&name) {
                self.directives.insert(name.to_string());
            }
        }
    }

    fn add_input_value(&mut self, value: &InputValueDefinition) {
        self.add_type(named_type(&value.ty.node));
        self.add_directives(&value.directives);
    }
}

fn type_declaration(def: &TypeDefinition) -> Declaration {
    let name = def.name.node.to_string();
    let mut refs = References::default();
    refs.add_directives(&def.directives);

    let (kind, implements, fields) = match &def.kind {
        TypeKind::Scalar => (UnitKind::Scalar, Vec::new(), Vec::new()),
        TypeKind::Object(object) => (
            UnitKind::Object,
            names(&object.implements),
            output_fields(&object.fields, &mut refs),
        ),
        TypeKind::Interface(interface) => (
            UnitKind::Interface,
            names(&interface.implements),
            output_fields(&interface.fields, &mut refs),
        ),
        TypeKind::Union(union) => {
            for member in &union.members {
                refs.add_type(member.node.as_str());
            }
            (UnitKind::Union, Vec::new(), Vec::new())
        }
        TypeKind::Enum(enum_type) => {
            for value in &enum_type.values {
                refs.add_directives(&value.node.directives);
            }
            (UnitKind::Enum, Vec::new(), Vec::new())
        }
        TypeKind::InputObject(input) => (
            UnitKind::Input,
            Vec::new(),
            input_fields(&input.fields, &mut refs),
        ),
    };

    for interface in &implements {
        refs.add_type(interface);
    }

    // An extension depends on the declaration it extends.
    if def.extend {
        refs.types.insert(name.clone());
    } else {
        refs.types.shift_remove(&name);
    }

    Declaration {
        name,
        kind,
        extension: def.extend,
        description: def.description.as_ref().map(|d| d.node.clone()),
        implements,
        directives: def.directives.iter().map(|d| print_directive(&d.node)).collect(),
        fields,
        type_refs: refs.types,
        directive_refs: refs.directives,
    }
}

fn directive_declaration(def: &DirectiveDefinition) -> Declaration {
    let mut refs = References::default();
    for argument in &def.arguments {
        refs.add_input_value(&argument.node);
    }

    Declaration {
        name: def.name.node.to_string(),
        kind: UnitKind::Directive,
        extension: false,
        description: def.description.as_ref().map(|d| d.node.clone()),
        implements: Vec::new(),
        directives: Vec::new(),
        fields: Vec::new(),
        type_refs: refs.types,
        directive_refs: refs.directives,
    }
}

fn names(names: &[Positioned<Name>]) -> Vec<String> {
    names.iter().map(|n| n.node.to_string()).collect()
}

fn output_fields(fields: &[Positioned<FieldDefinition>], refs: &mut References) -> Vec<FieldDecl> {
    fields
        .iter()
        .map(|field| {
            let field = &field.node;
            refs.add_type(named_type(&field.ty.node));
            refs.add_directives(&field.directives);
            for argument in &field.arguments {
                refs.add_input_value(&argument.node);
            }
            FieldDecl {
                name: field.name.node.to_string(),
                arguments: field
                    .arguments
                    .iter()
                    .map(|a| a.node.name.node.to_string())
                    .collect(),
                type_name: named_type(&field.ty.node).to_string(),
                directives: field.directives.iter().map(|d| directive_use(&d.node)).collect(),
                sdl: print_field(field),
            }
        })
        .collect()
}

fn input_fields(
    fields: &[Positioned<InputValueDefinition>],
    refs: &mut References,
) -> Vec<FieldDecl> {
    fields
        .iter()
        .map(|field| {
            let field = &field.node;
            refs.add_input_value(field);
            FieldDecl {
                name: field.name.node.to_string(),
                arguments: Vec::new(),
                type_name: named_type(&field.ty.node).to_string(),
                directives: field.directives.iter().map(|d| directive_use(&d.node)).collect(),
                sdl: format!("  {}", print_input_value(field)),
            }
        })
        .collect()
}

fn directive_use(directive: &ConstDirective) -> DirectiveUse {
    DirectiveUse {
        name: directive.name.node.to_string(),
        arguments: directive
            .arguments
            .iter()
            .map(|(name, value)| (name.node.to_string(), value.node.clone()))
            .collect(),
    }
}

/// Descriptions are printed as quoted strings; `Value`'s `Display` escapes them.
fn print_description(description: &str) -> String {
    Value::String(description.to_string()).to_string()
}

fn print_directive(directive: &ConstDirective) -> String {
    if directive.arguments.is_empty() {
        return format!("@{}", directive.name.node);
    }
    let arguments: Vec<String> = directive
        .arguments
        .iter()
        .map(|(name, value)| format!("{}: {}", name.node, value.node))
        .collect();
    format!("@{}({})", directive.name.node, arguments.join(", "))
}

fn print_input_value(value: &InputValueDefinition) -> String {
    let mut out = String::new();
    if let Some(description) = &value.description {
        out.push_str(&print_description(&description.node));
        out.push(' ');
    }
    let _ = write!(out, "{}: {}", value.name.node, value.ty.node);
    if let Some(default) = &value.default_value {
        let _ = write!(out, " = {}", default.node);
    }
    for directive in &value.directives {
        out.push(' ');
        out.push_str(&print_directive(&directive.node));
    }
    out
}

fn print_field(field: &FieldDefinition) -> String {
    let mut out = String::new();
    if let Some(description) = &field.description {
        let _ = writeln!(out, "  {}", print_description(&description.node));
    }
    let _ = write!(out, "  {}", field.name.node);
    if !field.arguments.is_empty() {
        let arguments: Vec<String> = field
            .arguments
            .iter()
            .map(|a| print_input_value(&a.node))
            .collect();
        let _ = write!(out, "({})", arguments.join(", "));
    }
    let _ = write!(out, ": {}", field.ty.node);
    for directive in &field.directives {
        out.push(' ');
        out.push_str(&print_directive(&directive.node));
    }
    out
}

/// Shape of an object declaration to print.
pub(crate) struct ObjectSdl<'a> {
    pub extend: bool,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub implements: &'a [String],
    pub directives: &'a [String],
    pub fields: Vec<&'a FieldDecl>,
}

impl ObjectSdl<'_> {
    pub(crate) fn print(&self) -> String {
        let mut out = String::new();
        if self.extend {
            out.push_str("extend ");
        } else if let Some(description) = self.description {
            let _ = writeln!(out, "{}", print_description(description));
        }
        let _ = write!(out, "type {}", self.name);
        if !self.implements.is_empty() {
            let _ = write!(out, " implements {}", self.implements.join(" & "));
        }
        for directive in self.directives {
            let _ = write!(out, " {directive}");
        }
        if !self.fields.is_empty() {
            out.push_str(" {\n");
            for field in &self.fields {
                out.push_str(&field.sdl);
                out.push('\n');
            }
            out.push('}');
        }
        out
    }
}
