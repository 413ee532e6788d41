use std::path::Path;

use anyhow::{Context, Result};
use schemaweave_graphql::assemble;

use crate::manifest;

/// Prints the assembled SDL document to stdout.
pub fn print(path: &Path, no_merge_roots: bool) -> Result<()> {
    let mut manifest = manifest::load(path)?;
    if no_merge_roots {
        manifest.config.merge_roots = false;
    }

    let assembled = assemble(manifest.units.iter().cloned(), &manifest.config)
        .with_context(|| format!("Failed to assemble {}", path.display()))?;
    println!("{}", assembled.document());
    Ok(())
}
