//! Handler for `condor resolve`.

use std::path::Path;

use miette::Result;

use condor_core::artifact::ArtifactKey;
use condor_core::descriptor::Descriptor;
use condor_resolver::activation::{self, ResolvedGraph};
use condor_resolver::graph::ModuleGraph;
use condor_util::errors::CondorError;

pub fn exec(file: &Path, why: Option<&str>) -> Result<()> {
    let descriptor = Descriptor::from_path(file)?;
    let graph = ModuleGraph::build(&descriptor.modules)?;
    let resolved = activation::resolve(&graph, &descriptor.roots)?;

    match why {
        Some(key) => explain(&resolved, key),
        None => {
            print!("{resolved}");
            let mut capabilities = resolved.capabilities().peekable();
            if capabilities.peek().is_some() {
                println!("[capabilities]");
                for (name, provider) in capabilities {
                    println!("  {name} -> {provider}");
                }
            }
            Ok(())
        }
    }
}

fn explain(resolved: &ResolvedGraph, key: &str) -> Result<()> {
    let key = ArtifactKey::parse(key).ok_or_else(|| CondorError::Generic {
        message: format!("Invalid artifact key: {key}"),
    })?;

    if let Some(by) = resolved.excluded_by(&key) {
        println!("{key} is excluded by {by}.");
        return Ok(());
    }
    let Some(path) = resolved.explain(&key) else {
        println!("{key} is not active.");
        return Ok(());
    };
    for (depth, (module, activation)) in path.into_iter().enumerate() {
        let scope = resolved
            .scope_of(module)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "excluded".to_string());
        println!("{}{module} ({scope}, {activation})", "  ".repeat(depth));
    }
    Ok(())
}
