//! Requirement resolution.
//!
//! Collects the complete unit set of an assembly call and checks that every
//! type a unit refers to is provided by one of its requirements. Deferred
//! markers are resolved against the complete set, never against a partial
//! view, so the outcome does not depend on input order.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::RootTypeNames;
use crate::error::SchemaDefinitionError;
use crate::unit::{DefinitionUnit, Requirement, UnitKind, UnitRef};

/// Returns the inputs followed, depth first, by the concrete requirements not
/// yet seen, after verifying every unit's requirements.
pub(crate) fn resolve(
    inputs: impl IntoIterator<Item = UnitRef>,
    roots: &RootTypeNames,
) -> Result<Vec<UnitRef>, SchemaDefinitionError> {
    let mut seen = HashSet::new();
    let mut units = Vec::new();
    for unit in inputs {
        collect(&unit, &mut seen, &mut units);
    }
    debug!(units = units.len(), "Collected definition units");

    let type_names: HashSet<&str> = units
        .iter()
        .filter(|u| u.kind() != UnitKind::Directive)
        .map(|u| u.name())
        .collect();

    for unit in &units {
        check_coverage(unit, roots)?;
        check_deferred(unit, &type_names)?;
        trace!(unit = %unit.name(), "Requirements satisfied");
    }

    Ok(units)
}

fn collect(unit: &UnitRef, seen: &mut HashSet<*const DefinitionUnit>, out: &mut Vec<UnitRef>) {
    if !seen.insert(Arc::as_ptr(unit)) {
        return;
    }
    out.push(Arc::clone(unit));
    for requirement in unit.requirements() {
        if let Requirement::Concrete(required) = requirement {
            collect(required, seen, out);
        }
    }
}

/// Every referenced type and custom directive must come from a requirement.
fn check_coverage(unit: &DefinitionUnit, roots: &RootTypeNames) -> Result<(), SchemaDefinitionError> {
    let declaration = unit.declaration();
    let provided = |name: &str, directive: bool| {
        unit.requirements()
            .iter()
            .any(|requirement| requirement.provides(name, directive))
    };

    for type_name in &declaration.type_refs {
        // Root types are merge targets; extending one needs no requirement.
        let extends_root = declaration.extension
            && type_name == &declaration.name
            && roots.is_root(type_name);
        if !extends_root && !provided(type_name.as_str(), false) {
            return Err(SchemaDefinitionError::missing_dependency(unit.name(), type_name));
        }
    }
    for directive in &declaration.directive_refs {
        if !provided(directive.as_str(), true) {
            return Err(SchemaDefinitionError::missing_dependency(
                unit.name(),
                format!("@{directive}"),
            ));
        }
    }
    Ok(())
}

fn check_deferred(unit: &DefinitionUnit, type_names: &HashSet<&str>) -> Result<(), SchemaDefinitionError> {
    for requirement in unit.requirements() {
        if let Requirement::Deferred(marker) = requirement {
            if !type_names.contains(marker.name()) {
                return Err(SchemaDefinitionError::UnresolvedDeferredType {
                    unit: unit.name().to_string(),
                    type_name: marker.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::unit::DefinitionUnit;

    fn unit(sdl: &str) -> UnitRef {
        DefinitionUnit::builder(sdl).build().unwrap()
    }

    fn names(units: &[UnitRef]) -> Vec<&str> {
        units.iter().map(|u| u.name()).collect()
    }

    #[test]
    fn test_collects_transitive_requirements_once() {
        let role = unit("enum Role { ADMIN USER }");
        let user = DefinitionUnit::builder("type User { role: Role }")
            .requires(&role)
            .build()
            .unwrap();
        let query = DefinitionUnit::builder("type Query { user: User me: User }")
            .requires(&user)
            .build()
            .unwrap();

        let units = resolve(vec![query, user.clone()], &RootTypeNames::default()).unwrap();
        assert_eq!(names(&units), vec!["Query", "User", "Role"]);
    }

    #[test]
    fn test_missing_dependency() {
        let query = unit("type Query { user: User }");
        let err = resolve(vec![query], &RootTypeNames::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::MissingDependency {
                unit: "Query".into(),
                type_name: "User".into(),
            }
        );
    }

    #[test]
    fn test_requirement_must_declare_the_referenced_type() {
        let group = unit("type Group { id: ID! }");
        let query = DefinitionUnit::builder("type Query { user: User }")
            .requires(&group)
            .build()
            .unwrap();
        let err = resolve(vec![query], &RootTypeNames::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
    }

    #[test]
    fn test_missing_directive_dependency() {
        let query = unit("type Query { name: String @upper }");
        let err = resolve(vec![query], &RootTypeNames::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::MissingDependency {
                unit: "Query".into(),
                type_name: "@upper".into(),
            }
        );
    }

    #[test]
    fn test_deferred_marker_resolves_regardless_of_order() {
        let user = DefinitionUnit::builder("type User { group: Group }")
            .defer("Group")
            .build()
            .unwrap();
        let group = DefinitionUnit::builder("type Group { members: [User!]! }")
            .requires(&user)
            .build()
            .unwrap();

        let roots = RootTypeNames::default();
        assert!(resolve(vec![user.clone(), group.clone()], &roots).is_ok());
        assert!(resolve(vec![group.clone(), user.clone()], &roots).is_ok());
        // User is collected through Group's concrete requirement.
        assert!(resolve(vec![group], &roots).is_ok());
    }

    #[test]
    fn test_unresolved_deferred_marker() {
        let user = DefinitionUnit::builder("type User { group: Group }")
            .defer("Group")
            .build()
            .unwrap();
        let err = resolve(vec![user], &RootTypeNames::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::UnresolvedDeferredType {
                unit: "User".into(),
                type_name: "Group".into(),
            }
        );
    }

    #[test]
    fn test_extension_requires_its_base() {
        let extension = unit("extend type User { age: Int }");
        let err = resolve(vec![extension], &RootTypeNames::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDependency);

        let root_extension = unit("extend type Query { version: String }");
        assert!(resolve(vec![root_extension], &RootTypeNames::default()).is_ok());
    }
}
