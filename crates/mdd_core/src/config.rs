use crate::consts::{CONFIG_FILE, DEFAULT_REPO};
use crate::digest::HashAlg;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Tool settings kept in `<home>/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub hash_alg: HashAlg,
    pub repo: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { hash_alg: HashAlg::Sha256, repo: DEFAULT_REPO.to_string() }
    }
}

impl Config {
    /// Reads the config, writing the defaults first when none exists yet.
    pub fn load_or_init(home: &Path) -> Result<Self> {
        let p = home.join(CONFIG_FILE);
        if !p.exists() {
            let cfg = Self::default();
            fs::create_dir_all(home)?;
            fs::write(&p, serde_json::to_string_pretty(&cfg)?)?;
            info!(path = %p.display(), "wrote default config");
            return Ok(cfg);
        }
        let s = fs::read_to_string(p)?;
        Ok(serde_json::from_str(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_is_initialized() {
        let dir = tempdir().unwrap();
        let cfg = Config::load_or_init(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        let raw = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(raw.contains("\"hash_alg\": \"sha256\""));
        assert_eq!(Config::load_or_init(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn reads_existing_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"hash_alg": "md5", "repo": "http://localhost/repo/"}"#,
        )
        .unwrap();
        let cfg = Config::load_or_init(dir.path()).unwrap();
        assert_eq!(cfg.hash_alg, HashAlg::Md5);
        assert_eq!(cfg.repo, "http://localhost/repo/");
    }

    #[test]
    fn bad_algorithm_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{"hash_alg": "crc", "repo": ""}"#).unwrap();
        assert!(Config::load_or_init(dir.path()).is_err());
    }
}
