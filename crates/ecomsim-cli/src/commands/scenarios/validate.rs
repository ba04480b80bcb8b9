use std::path::Path;

use anyhow::Result;
use ecomsim_scenarios::{load_spec_from_path, resolve_scenarios};
use tracing::info;

pub fn handle(spec: &Path) -> Result<()> {
    let set = load_spec_from_path(spec)?;
    let resolved = resolve_scenarios(&set)?;
    info!(spec = %spec.display(), scenarios = resolved.len(), "spec validated");
    println!(
        "Scenario spec validated successfully ({} scenario{})",
        resolved.len(),
        if resolved.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
