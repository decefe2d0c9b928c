//! Manifest loading.

use std::path::Path;

use anyhow::Context;

use reconciler::Organization;

/// Reads and parses the YAML manifest at `path`.
pub fn load(path: &Path) -> anyhow::Result<Organization> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
}

pub fn parse(text: &str) -> Result<Organization, serde_yaml::Error> {
    serde_yaml::from_str(text)
}
