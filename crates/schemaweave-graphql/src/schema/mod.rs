//! Schema assembly and compilation.
//!
//! This module turns a set of definition units into one schema. Assembly is
//! synchronous and keeps no state between calls; every call receives the
//! complete set of units it works on.
//!
//! ## Components
//!
//! - `requirements` - Collects transitive requirements and resolves deferred markers
//! - `roots` - Merges root operation types (or re-emits them as extensions)
//! - `consistency` - Post-merge checks on names, extensions and binding targets
//! - [`assemble`] - Orders parts, builds the document and flattens bindings
//! - [`DynamicSchemaCompiler`] - Compiles an [`AssembledSchema`] with async-graphql
//!
//! ## Pipeline
//!
//! 1. Inputs are completed with their concrete requirements, depth first
//! 2. Every referenced type must be provided by a requirement
//! 3. Deferred markers are checked against the complete set
//! 4. Root groups are merged, other units pass through unchanged
//! 5. Parts are validated, ordered and concatenated
//! 6. The assembled schema is handed to a [`SchemaCompiler`]

mod assembler;
mod compiler;
mod consistency;
mod requirements;
mod roots;

pub use assembler::{AssembledSchema, FieldKey, assemble};
pub use compiler::{DynamicSchemaCompiler, SchemaCompiler};

use async_graphql::dynamic::Schema;

use crate::config::AssemblyConfig;
use crate::error::SchemaDefinitionError;
use crate::sdl::FieldDecl;
use crate::unit::{UnitKind, UnitRef};

/// Assembles `units` and compiles them with [`DynamicSchemaCompiler`].
///
/// # Errors
///
/// Returns the first assembly error, or
/// [`SchemaDefinitionError::CompilationError`] when async-graphql rejects the
/// assembled schema.
pub fn make_executable_schema(
    units: impl IntoIterator<Item = UnitRef>,
    config: &AssemblyConfig,
) -> Result<Schema, SchemaDefinitionError> {
    let assembled = assemble(units, config)?;
    assembled.compile(&DynamicSchemaCompiler::new(config.compiler.clone()))
}

/// One declaration of the document being assembled: a unit passed through
/// unchanged, or a root type synthesized from several units.
#[derive(Debug, Clone)]
pub(crate) struct Part {
    pub name: String,
    pub kind: UnitKind,
    pub extension: bool,
    /// Declares (or extends) a root operation type.
    pub root: bool,
    pub sdl: String,
    pub fields: Vec<FieldDecl>,
    /// Units whose declarations and behavior this part carries.
    pub sources: Vec<UnitRef>,
}

impl Part {
    fn from_unit(unit: &UnitRef) -> Self {
        let declaration = unit.declaration();
        Self {
            name: declaration.name.clone(),
            kind: declaration.kind,
            extension: declaration.extension,
            root: false,
            sdl: unit.sdl().trim().to_string(),
            fields: declaration.fields.clone(),
            sources: vec![UnitRef::clone(unit)],
        }
    }
}
