//! Post-merge consistency checks.

use std::collections::HashSet;

use tracing::debug;

use super::Part;
use crate::config::RootTypeNames;
use crate::error::SchemaDefinitionError;
use crate::unit::{DefinitionUnit, Requirement, UnitKind};

/// Validates the merged part set. The first inconsistency wins.
pub(crate) fn validate(parts: &[Part], roots: &RootTypeNames) -> Result<(), SchemaDefinitionError> {
    check_unique_names(parts)?;

    let types: HashSet<&str> = parts
        .iter()
        .filter(|p| p.kind != UnitKind::Directive && !p.extension)
        .map(|p| p.name.as_str())
        .collect();
    let directives: HashSet<&str> = parts
        .iter()
        .filter(|p| p.kind == UnitKind::Directive)
        .map(|p| p.name.as_str())
        .collect();

    for part in parts {
        if part.extension && !types.contains(part.name.as_str()) {
            return Err(SchemaDefinitionError::missing_dependency(&part.name, &part.name));
        }
        for unit in &part.sources {
            check_requirements(unit, &types, &directives)?;
            check_targets(part, unit, roots)?;
        }
    }

    debug!(parts = parts.len(), "Schema parts are consistent");
    Ok(())
}

fn check_unique_names(parts: &[Part]) -> Result<(), SchemaDefinitionError> {
    let mut seen = HashSet::new();
    for part in parts.iter().filter(|p| !p.root && !p.extension) {
        let directive = part.kind == UnitKind::Directive;
        if !seen.insert((directive, part.name.as_str())) {
            return Err(SchemaDefinitionError::DuplicateTypeName {
                type_name: part.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_requirements(
    unit: &DefinitionUnit,
    types: &HashSet<&str>,
    directives: &HashSet<&str>,
) -> Result<(), SchemaDefinitionError> {
    for requirement in unit.requirements() {
        match requirement {
            Requirement::Concrete(required) => {
                let present = if required.kind() == UnitKind::Directive {
                    directives.contains(required.name())
                } else {
                    types.contains(required.name())
                };
                if !present {
                    return Err(SchemaDefinitionError::missing_dependency(
                        unit.name(),
                        required.name(),
                    ));
                }
            }
            Requirement::Deferred(marker) => {
                if !types.contains(marker.name()) {
                    return Err(SchemaDefinitionError::UnresolvedDeferredType {
                        unit: unit.name().to_string(),
                        type_name: marker.name().to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Behavior bound to a unit must target fields of the part it ended up in.
fn check_targets(
    part: &Part,
    unit: &DefinitionUnit,
    roots: &RootTypeNames,
) -> Result<(), SchemaDefinitionError> {
    let has_field = |name: &str| part.fields.iter().any(|f| f.name == name);

    let targets = unit
        .resolvers()
        .keys()
        .chain(unit.aliases().keys())
        .chain(unit.subscribers().keys())
        .chain(unit.argument_aliases().keys());
    for field in targets {
        if !has_field(field.as_str()) {
            return Err(SchemaDefinitionError::unmatched_resolver(&part.name, field));
        }
    }

    if !unit.subscribers().is_empty() && part.name != roots.subscription {
        return Err(SchemaDefinitionError::UnsupportedBehavior {
            type_name: part.name.clone(),
            kind: part.kind.to_string(),
            behavior: "subscribers outside the subscription root".into(),
        });
    }
    Ok(())
}
