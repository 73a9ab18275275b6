//! Handler for `condor catalog`.

use std::path::Path;

use miette::Result;

use condor_core::descriptor::Descriptor;
use condor_resolver::catalog::ElementCatalog;

pub fn exec(file: &Path) -> Result<()> {
    let descriptor = Descriptor::from_path(file)?;
    let catalog = ElementCatalog::index(&descriptor.unions)?;
    print!("{catalog}");
    Ok(())
}
