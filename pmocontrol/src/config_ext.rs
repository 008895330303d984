//! Extension de pmoconfig pour le stockage des configurations de session

use std::path::PathBuf;

use anyhow::Result;

/// Variable d'environnement prioritaire sur la configuration
pub const CONFIG_STORE_PATH_ENV: &str = "CONFIG_STORE_PATH";

/// Trait d'extension pour pmoconfig::Config
pub trait MediaStoreConfigExt {
    /// Retourne le répertoire des configurations de session, créé au besoin
    fn config_store_dir(&self) -> Result<PathBuf>;
}

impl MediaStoreConfigExt for pmoconfig::Config {
    fn config_store_dir(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_STORE_PATH_ENV) {
            if !path.trim().is_empty() {
                std::fs::create_dir_all(&path)?;
                return Ok(PathBuf::from(path));
            }
        }

        // Utilise get_managed_dir pour créer le répertoire sessions s'il n'existe pas
        let dir = self.get_managed_dir(&["media", "config_store", "directory"], "sessions")?;
        Ok(PathBuf::from(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_dir_is_managed_under_config_dir() {
        if std::env::var_os(CONFIG_STORE_PATH_ENV).is_some() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let config = pmoconfig::Config::load_config(dir.path().to_str().unwrap()).unwrap();

        let store_dir = config.config_store_dir().unwrap();
        assert_eq!(store_dir, dir.path().join("sessions"));
        assert!(store_dir.is_dir());
    }
}
