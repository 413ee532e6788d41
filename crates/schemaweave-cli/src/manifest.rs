//! Manifest loading.
//!
//! A manifest lists SDL units and how they depend on each other:
//!
//! ```toml
//! [assembly]
//! merge_roots = true
//!
//! [[unit]]
//! id = "user"
//! file = "user.graphql"
//! deferred = ["Group"]
//! aliases = { fullName = "full_name" }
//!
//! [[unit]]
//! id = "query"
//! sdl = "type Query { user: User }"
//! requires = ["user"]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use schemaweave_graphql::{AssemblyConfig, DefinitionUnit, UnitRef};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestFile {
    #[serde(default)]
    pub assembly: AssemblyConfig,
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    pub id: String,
    /// SDL file, relative to the manifest directory.
    pub file: Option<PathBuf>,
    /// Inline SDL.
    pub sdl: Option<String>,
    /// Ids of the units this one requires.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Type names resolved once all units are known.
    #[serde(default)]
    pub deferred: Vec<String>,
    /// Field name -> lookup key for default resolution, applied in manifest order.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

/// A loaded manifest: its configuration and the built units, in manifest order.
pub struct Manifest {
    pub config: AssemblyConfig,
    pub units: Vec<UnitRef>,
}

pub fn load(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let file: ManifestFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    file.assembly
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid [assembly] configuration: {e}"))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let units = build_units(&file.units, base_dir)?;
    debug!(units = units.len(), manifest = %path.display(), "Loaded manifest");

    Ok(Manifest {
        config: file.assembly,
        units,
    })
}

/// Builds every entry after the entries it requires.
fn build_units(entries: &[UnitEntry], base_dir: &Path) -> Result<Vec<UnitRef>> {
    let mut index = HashMap::new();
    for (position, entry) in entries.iter().enumerate() {
        if index.insert(entry.id.as_str(), position).is_some() {
            bail!("Unit id `{}` is used more than once", entry.id);
        }
    }
    for entry in entries {
        for required in &entry.requires {
            if !index.contains_key(required.as_str()) {
                bail!("Unit `{}` requires unknown unit `{required}`", entry.id);
            }
        }
    }

    let mut built: Vec<Option<UnitRef>> = vec![None; entries.len()];
    let mut visiting = Vec::new();
    for position in 0..entries.len() {
        build_entry(position, entries, &index, base_dir, &mut built, &mut visiting)?;
    }
    Ok(built.into_iter().flatten().collect())
}

fn build_entry(
    position: usize,
    entries: &[UnitEntry],
    index: &HashMap<&str, usize>,
    base_dir: &Path,
    built: &mut [Option<UnitRef>],
    visiting: &mut Vec<usize>,
) -> Result<UnitRef> {
    if let Some(unit) = &built[position] {
        return Ok(UnitRef::clone(unit));
    }
    let entry = &entries[position];
    if let Some(start) = visiting.iter().position(|&p| p == position) {
        let cycle: Vec<&str> = visiting[start..]
            .iter()
            .map(|&p| entries[p].id.as_str())
            .chain(std::iter::once(entry.id.as_str()))
            .collect();
        bail!(
            "Requirement cycle: {}. List one of these types under `deferred` instead of `requires`",
            cycle.join(" -> ")
        );
    }

    visiting.push(position);
    let mut requirements = Vec::with_capacity(entry.requires.len());
    for required in &entry.requires {
        let required_position = index[required.as_str()];
        requirements.push(build_entry(
            required_position,
            entries,
            index,
            base_dir,
            built,
            visiting,
        )?);
    }
    visiting.pop();

    let sdl = read_sdl(entry, base_dir)?;
    let mut builder = DefinitionUnit::builder(sdl).requires_all(&requirements);
    for deferred in &entry.deferred {
        builder = builder.defer(deferred);
    }
    for (field, key) in &entry.aliases {
        builder = builder.alias(field, key);
    }
    let unit = builder
        .build()
        .with_context(|| format!("Invalid unit `{}`", entry.id))?;

    built[position] = Some(UnitRef::clone(&unit));
    Ok(unit)
}

fn read_sdl(entry: &UnitEntry, base_dir: &Path) -> Result<String> {
    match (&entry.file, &entry.sdl) {
        (Some(file), None) => {
            let path = base_dir.join(file);
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read SDL file {}", path.display()))
        }
        (None, Some(sdl)) => Ok(sdl.clone()),
        (Some(_), Some(_)) => bail!("Unit `{}` sets both `file` and `sdl`", entry.id),
        (None, None) => bail!("Unit `{}` needs either `file` or `sdl`", entry.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("schema.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_builds_units_with_requirements() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("user.graphql"),
            "type User { id: ID! fullName: String }",
        )
        .unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "query"
            sdl = "type Query { user: User }"
            requires = ["user"]

            [[unit]]
            id = "user"
            file = "user.graphql"
            aliases = { fullName = "full_name" }
            "#,
        );

        let manifest = load(&path).unwrap();
        let names: Vec<&str> = manifest.units.iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["Query", "User"]);
        assert_eq!(manifest.units[1].aliases()["fullName"], "full_name");
        assert!(manifest.config.merge_roots);
    }

    #[test]
    fn test_assembly_table_is_applied() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [assembly]
            merge_roots = false

            [assembly.compiler]
            introspection = false

            [[unit]]
            id = "query"
            sdl = "type Query { ok: Boolean }"
            "#,
        );

        let manifest = load(&path).unwrap();
        assert!(!manifest.config.merge_roots);
        assert!(!manifest.config.compiler.introspection);
        assert_eq!(manifest.config.compiler.max_depth, 15);
    }

    #[test]
    fn test_requirement_cycle_suggests_deferred() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "user"
            sdl = "type User { group: Group }"
            requires = ["group"]

            [[unit]]
            id = "group"
            sdl = "type Group { members: [User!]! }"
            requires = ["user"]
            "#,
        );

        let err = load(&path).err().unwrap().to_string();
        assert!(err.contains("user -> group -> user"), "{err}");
        assert!(err.contains("deferred"), "{err}");
    }

    #[test]
    fn test_deferred_breaks_the_cycle() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "user"
            sdl = "type User { group: Group }"
            deferred = ["Group"]

            [[unit]]
            id = "group"
            sdl = "type Group { members: [User!]! }"
            requires = ["user"]
            "#,
        );

        let manifest = load(&path).unwrap();
        assert_eq!(manifest.units.len(), 2);
    }

    #[test]
    fn test_unknown_requirement() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "query"
            sdl = "type Query { user: User }"
            requires = ["user"]
            "#,
        );

        let err = load(&path).err().unwrap().to_string();
        assert!(err.contains("unknown unit `user`"), "{err}");
    }

    #[test]
    fn test_first_bad_alias_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "user"
            sdl = "type User { id: ID }"
            aliases = { ddd = "d", bbb = "b", id = "user_id", aaa = "a" }
            "#,
        );

        for _ in 0..10 {
            let err = format!("{:#}", load(&path).err().unwrap());
            assert!(err.contains("bound to `ddd`"), "{err}");
        }
    }

    #[test]
    fn test_unit_source_must_be_unique() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "query"
            "#,
        );
        let err = load(&path).err().unwrap().to_string();
        assert!(err.contains("needs either `file` or `sdl`"), "{err}");
    }

    #[test]
    fn test_invalid_unit_names_its_id() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"
            [[unit]]
            id = "broken"
            sdl = "type User\ntype Group"
            "#,
        );
        let err = load(&path).err().unwrap();
        assert!(format!("{err:#}").contains("Invalid unit `broken`"));
    }
}
