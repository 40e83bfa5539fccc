use anyhow::{Context, Result};
use qcomm_infrastructure::ConfigService;
use qcomm_infrastructure::paths::QCommPaths;
use std::path::PathBuf;

pub fn init(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => QCommPaths::config_file()?,
    };

    if path.exists() {
        anyhow::bail!("{} already exists; remove it first", path.display());
    }

    ConfigService::save_default(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init(Some(path.clone())).unwrap();

        let loaded = ConfigService::load_from(&path).unwrap();
        assert_eq!(loaded, qcomm_core::config::SimulationConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        assert!(init(Some(path)).is_err());
    }
}
