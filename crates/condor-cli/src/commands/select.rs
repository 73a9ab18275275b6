//! Handler for `condor select`.

use std::collections::BTreeSet;
use std::path::Path;

use miette::Result;

use condor_core::config::GlobalConfig;
use condor_core::declaration::ElementKey;
use condor_core::descriptor::Descriptor;
use condor_resolver::catalog::ElementCatalog;
use condor_resolver::selector;
use condor_util::errors::CondorError;

pub fn exec(file: &Path, elements: &[String], config: &GlobalConfig) -> Result<()> {
    let descriptor = Descriptor::from_path(file)?;
    let catalog = ElementCatalog::index(&descriptor.unions)?;
    let requested: BTreeSet<ElementKey> = elements
        .iter()
        .map(|e| ElementKey::from(e.as_str()))
        .collect();

    if let Some(selection) = selector::select(&catalog, &requested)? {
        print!("{selection}");
        return Ok(());
    }

    println!("No union covers the requested elements.");
    if config.select.require_selection {
        return Err(CondorError::Resolution {
            message: format!("no union provides all of: {}", elements.join(", ")),
        }
        .into());
    }
    Ok(())
}
