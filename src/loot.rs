use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::schema::Item;

pub const LOOT_FILE: &str = "pull-secrets-commands.txt";

const HEADER: &str = "\
#############################################
# The profile you will use to perform these commands is most likely not the profile you used to run the enumeration
# Set the $profile environment variable to the profile you are going to use to pull the secrets/parameters.
# E.g., export profile=dev-prod.
#############################################

";

/// Loot file contents: the header block, then one fetch command per item.
pub fn render_loot(items: &[Item]) -> String {
    let mut out = String::from(HEADER);
    for item in items {
        out.push_str(&item.loot_command());
        out.push('\n');
    }
    out
}

/// Writes the loot file into `<profile_dir>/loot/`.
pub fn write_loot(items: &[Item], profile_dir: &Path) -> Result<PathBuf> {
    let dir = profile_dir.join("loot");
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(LOOT_FILE);
    fs::write(&path, render_loot(items))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
