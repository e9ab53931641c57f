#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Result};
use fontcat_core::paths::{file_name, FontPaths, PathExpr};
use fontcat_core::{Catalog, CatalogConfig, FontIntrospector, FontKey, Services};
use tempfile::TempDir;

/// Reads face names from a fixed map keyed by file name.
#[derive(Debug, Default, Clone)]
pub struct StubIntrospector {
    faces: HashMap<String, Vec<FontKey>>,
}

impl StubIntrospector {
    pub fn with(mut self, file: &str, faces: &[(&str, &str)]) -> Self {
        self.faces.insert(
            file.to_string(),
            faces.iter().map(|(f, s)| FontKey::new(*f, *s)).collect(),
        );
        self
    }
}

impl FontIntrospector for StubIntrospector {
    fn introspect_names(&self, path: &Path) -> Result<Vec<FontKey>> {
        let name = file_name(path).unwrap_or_default();
        self.faces
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow!("unreadable font {name}"))
    }

    fn font_exists(&self, _name: &str) -> bool {
        false
    }

    fn analyze_metrics(&self, name: &str) -> Result<Vec<String>> {
        Err(anyhow!("no metrics for {name}"))
    }
}

pub struct StubPaths {
    pub truetype: PathBuf,
    pub user: Option<PathBuf>,
}

impl FontPaths for StubPaths {
    fn truetype_path(&self) -> PathExpr {
        PathExpr::with_sub_dirs(&self.truetype, false)
    }

    fn user_path(&self) -> PathExpr {
        match &self.user {
            Some(dir) => PathExpr::with_sub_dirs(dir, false),
            None => PathExpr::Empty,
        }
    }
}

/// A temporary tree with `fonts/`, `user/`, `cache/` and `global/`.
pub struct Fixture {
    pub root: TempDir,
    pub saves: Rc<Cell<usize>>,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        for dir in ["fonts", "user", "cache", "global"] {
            fs::create_dir_all(root.path().join(dir)).expect("mkdir");
        }
        Self {
            root,
            saves: Rc::new(Cell::new(0)),
        }
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.root.path().join("fonts")
    }

    pub fn user_dir(&self) -> PathBuf {
        self.root.path().join("user")
    }

    pub fn config(&self) -> CatalogConfig {
        CatalogConfig::new(self.root.path().join("cache"), self.root.path().join("global"))
    }

    /// A font file whose content is `size` zero bytes.
    pub fn font(&self, name: &str, size: usize) -> PathBuf {
        let path = self.fonts_dir().join(name);
        fs::write(&path, vec![0u8; size]).expect("write font");
        path
    }

    pub fn write_global(&self, file: &str, text: &str) {
        fs::write(self.root.path().join("global").join(file), text).expect("write global");
    }

    pub fn write_local(&self, file: &str, text: &str) {
        fs::write(self.root.path().join("cache").join(file), text).expect("write local");
    }

    pub fn read_local(&self, file: &str) -> String {
        fs::read_to_string(self.root.path().join("cache").join(file)).expect("read local")
    }

    pub fn read_global(&self, file: &str) -> String {
        fs::read_to_string(self.root.path().join("global").join(file)).expect("read global")
    }

    pub fn catalog(&self, introspector: StubIntrospector) -> Catalog {
        let paths = StubPaths {
            truetype: self.fonts_dir(),
            user: Some(self.user_dir()),
        };
        let saves = Rc::clone(&self.saves);
        let services = Services::new(paths, introspector)
            .with_listener(move || saves.set(saves.get() + 1));
        Catalog::new(self.config(), services)
    }
}
