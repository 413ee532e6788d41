//! Root operation type merging.
//!
//! Units declaring `Query`, `Mutation` or `Subscription` (or the configured
//! root names) are grouped. With merging enabled every group becomes one
//! synthesized declaration whose fields are sorted by name, so the output
//! does not depend on input order. With merging disabled each unit keeps its
//! own declaration and all but one are emitted as `extend type`.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::Part;
use crate::config::AssemblyConfig;
use crate::error::SchemaDefinitionError;
use crate::sdl::{FieldDecl, ObjectSdl};
use crate::unit::{UnitKind, UnitRef};

/// Turns the resolved unit set into assembly parts.
pub(crate) fn merge(
    units: &[UnitRef],
    config: &AssemblyConfig,
) -> Result<Vec<Part>, SchemaDefinitionError> {
    let is_root = |unit: &UnitRef| {
        unit.kind() == UnitKind::Object && config.root_types.is_root(unit.name())
    };

    let mut groups: IndexMap<&str, Vec<&UnitRef>> = IndexMap::new();
    for unit in units.iter().filter(|u| is_root(*u)) {
        groups.entry(unit.name()).or_default().push(unit);
    }

    let mut parts = Vec::with_capacity(units.len());
    let mut emitted_roots = HashSet::new();
    for unit in units {
        if !is_root(unit) {
            parts.push(Part::from_unit(unit));
            continue;
        }

        let name = unit.name();
        let Some(group) = groups.get(name) else {
            continue;
        };
        if config.merge_roots {
            // The merged declaration takes the position of the group's first member.
            if emitted_roots.insert(name) {
                parts.push(merge_group(name, group)?);
            }
        } else {
            parts.push(pass_through(unit, group));
        }
    }

    debug!(
        parts = parts.len(),
        root_groups = groups.len(),
        merge_roots = config.merge_roots,
        "Processed root types"
    );
    Ok(parts)
}

/// Synthesizes one declaration from all members of a root group.
fn merge_group(name: &str, members: &[&UnitRef]) -> Result<Part, SchemaDefinitionError> {
    let mut seen = HashSet::new();
    let mut fields: Vec<&FieldDecl> = Vec::new();
    let mut implements: Vec<String> = Vec::new();
    let mut directives: Vec<String> = Vec::new();
    let mut description = None;

    for member in members {
        let declaration = member.declaration();
        for field in &declaration.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaDefinitionError::DuplicateRootField {
                    type_name: name.to_string(),
                    field_name: field.name.clone(),
                });
            }
            fields.push(field);
        }
        for interface in &declaration.implements {
            if !implements.contains(interface) {
                implements.push(interface.clone());
            }
        }
        for directive in &declaration.directives {
            if !directives.contains(directive) {
                directives.push(directive.clone());
            }
        }
        if description.is_none() {
            description = declaration.description.as_deref();
        }
    }

    fields.sort_by(|a, b| a.name.cmp(&b.name));

    let sdl = ObjectSdl {
        extend: false,
        name,
        description,
        implements: &implements,
        directives: &directives,
        fields: fields.clone(),
    }
    .print();

    trace!(root = %name, members = members.len(), fields = fields.len(), "Merged root type");

    Ok(Part {
        name: name.to_string(),
        kind: UnitKind::Object,
        extension: false,
        root: true,
        sdl,
        fields: fields.into_iter().cloned().collect(),
        sources: members.iter().map(|m| (*m).clone()).collect(),
    })
}

/// Keeps a root unit's declaration, re-emitting it as an extension unless it
/// is the group's designated definition.
fn pass_through(unit: &UnitRef, group: &[&UnitRef]) -> Part {
    let definition = group
        .iter()
        .find(|member| !member.is_extension())
        .or_else(|| group.first())
        .copied();
    let is_definition = definition.is_some_and(|d| Arc::ptr_eq(d, unit));

    let mut part = Part::from_unit(unit);
    part.root = true;
    if is_definition == !unit.is_extension() {
        return part;
    }

    let declaration = unit.declaration();
    part.extension = !is_definition;
    part.sdl = ObjectSdl {
        extend: part.extension,
        name: &declaration.name,
        description: declaration.description.as_deref(),
        implements: &declaration.implements,
        directives: &declaration.directives,
        fields: declaration.fields.iter().collect(),
    }
    .print();
    part
}
