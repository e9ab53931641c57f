//! Where catalog files live.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

pub const DATABASE_FILE: &str = "font-database.scm";
pub const FEATURES_FILE: &str = "font-features.scm";
pub const FEATURES_BIS_FILE: &str = "font-features.bis.scm";
pub const CHARACTERISTICS_FILE: &str = "font-characteristics.scm";
pub const SUBSTITUTIONS_FILE: &str = "font-substitutions.scm";
pub const DELTA_DATABASE_FILE: &str = "delta-database.scm";
pub const DELTA_FEATURES_FILE: &str = "delta-features.scm";
pub const DELTA_CHARACTERISTICS_FILE: &str = "delta-characteristics.scm";

/// Directories holding the per-user catalog and the global reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub local_dir: PathBuf,
    pub global_dir: PathBuf,
}

impl CatalogConfig {
    pub fn new(local_dir: impl Into<PathBuf>, global_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            global_dir: global_dir.into(),
        }
    }

    /// `FONTCAT_CACHE_DIR` / `FONTCAT_GLOBAL_DIR`, else the platform's cache
    /// and data directories.
    pub fn from_env() -> Result<Self> {
        let dirs = ProjectDirs::from("org", "fontcat", "fontcat");
        let local_dir = match env::var_os("FONTCAT_CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs
                .as_ref()
                .map(|d| d.cache_dir().join("fonts"))
                .ok_or_else(|| anyhow!("cannot determine a cache directory; set FONTCAT_CACHE_DIR"))?,
        };
        let global_dir = match env::var_os("FONTCAT_GLOBAL_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs
                .as_ref()
                .map(|d| d.data_dir().join("fonts"))
                .ok_or_else(|| anyhow!("cannot determine a data directory; set FONTCAT_GLOBAL_DIR"))?,
        };
        Ok(Self::new(local_dir, global_dir))
    }

    pub fn local(&self, file: &str) -> PathBuf {
        self.local_dir.join(file)
    }

    pub fn global(&self, file: &str) -> PathBuf {
        self.global_dir.join(file)
    }

    pub fn local_database(&self) -> PathBuf {
        self.local(DATABASE_FILE)
    }

    pub fn local_features(&self) -> PathBuf {
        self.local(FEATURES_FILE)
    }

    pub fn local_characteristics(&self) -> PathBuf {
        self.local(CHARACTERISTICS_FILE)
    }

    pub fn delta_database(&self) -> PathBuf {
        self.local(DELTA_DATABASE_FILE)
    }

    pub fn delta_features(&self) -> PathBuf {
        self.local(DELTA_FEATURES_FILE)
    }

    pub fn delta_characteristics(&self) -> PathBuf {
        self.local(DELTA_CHARACTERISTICS_FILE)
    }

    pub fn global_database(&self) -> PathBuf {
        self.global(DATABASE_FILE)
    }

    pub fn global_features(&self) -> PathBuf {
        self.global(FEATURES_FILE)
    }

    pub fn global_features_bis(&self) -> PathBuf {
        self.global(FEATURES_BIS_FILE)
    }

    pub fn global_characteristics(&self) -> PathBuf {
        self.global(CHARACTERISTICS_FILE)
    }

    pub fn global_substitutions(&self) -> PathBuf {
        self.global(SUBSTITUTIONS_FILE)
    }

    pub fn with_local_dir(mut self, dir: &Path) -> Self {
        self.local_dir = dir.to_path_buf();
        self
    }

    pub fn with_global_dir(mut self, dir: &Path) -> Self {
        self.global_dir = dir.to_path_buf();
        self
    }
}
