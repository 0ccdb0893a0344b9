use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

pub const HOME_OVERRIDE_VAR: &str = "DUEPING_HOME";

/// `$DUEPING_HOME` if set, else `$HOME/.dueping`.
pub fn dueping_home() -> Result<PathBuf> {
    home_from(|var| std::env::var(var).ok())
}

fn home_from(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let set = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(dir) = set(HOME_OVERRIDE_VAR) {
        return Ok(PathBuf::from(dir));
    }
    match set("HOME") {
        Some(home) => Ok(PathBuf::from(home).join(".dueping")),
        None => bail!("neither {HOME_OVERRIDE_VAR} nor HOME is set; pass --config"),
    }
}

/// Only `config init` writes here; everything else just reads.
pub fn ensure_dueping_home() -> Result<PathBuf> {
    let dir = dueping_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(dueping_home()?.join("config.toml"))
}
