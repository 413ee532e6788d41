use std::path::Path;

use anyhow::{Context, Result};
use schemaweave_graphql::{DynamicSchemaCompiler, assemble};
use tracing::info;

use crate::manifest;
use crate::output::{print_list, print_success};

/// Assembles the manifest and compiles the result into an executable schema.
pub fn check(path: &Path) -> Result<()> {
    let manifest = manifest::load(path)?;
    let assembled = assemble(manifest.units.iter().cloned(), &manifest.config)
        .with_context(|| format!("Failed to assemble {}", path.display()))?;

    let compiler = DynamicSchemaCompiler::new(manifest.config.compiler.clone());
    assembled
        .compile(&compiler)
        .with_context(|| format!("Failed to compile {}", path.display()))?;
    info!(types = assembled.type_order().len(), "Schema compiled");

    print_success(&format!(
        "{} units assembled into {} declarations",
        manifest.units.len(),
        assembled.type_order().len()
    ));
    print_list("Types", assembled.type_order());
    Ok(())
}
