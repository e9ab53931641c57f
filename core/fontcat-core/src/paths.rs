//! Font search paths and the path expressions the scanner walks.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use walkdir::WalkDir;

/// Suffixes of files the catalog tracks.
pub const FONT_SUFFIXES: &[&str] = &["ttf", "ttc", "otf", "tfm"];

/// Suffixes of TrueType-family containers (the subset the scanner opens).
pub const TRUETYPE_SUFFIXES: &[&str] = &["ttf", "ttc", "otf"];

/// A set of locations to scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PathExpr {
    #[default]
    Empty,
    Union(Box<PathExpr>, Box<PathExpr>),
    Directory(PathBuf),
    File(PathBuf),
}

impl PathExpr {
    /// Classify an on-disk path; anything that is neither a directory nor a
    /// regular file is `Empty`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            PathExpr::Directory(path)
        } else if path.is_file() {
            PathExpr::File(path)
        } else {
            PathExpr::Empty
        }
    }

    pub fn union(self, other: PathExpr) -> Self {
        match (self, other) {
            (PathExpr::Empty, b) => b,
            (a, PathExpr::Empty) => a,
            (a, b) => PathExpr::Union(Box::new(a), Box::new(b)),
        }
    }

    pub fn union_all<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = PathExpr>,
    {
        exprs.into_iter().fold(PathExpr::Empty, PathExpr::union)
    }

    /// `root` together with every directory below it.
    pub fn with_sub_dirs(root: &Path, follow_symlinks: bool) -> Self {
        if !root.is_dir() {
            return PathExpr::from_path(root);
        }
        let dirs = WalkDir::new(root)
            .follow_links(follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("skipping unreadable path under {}: {err}", root.display());
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| PathExpr::Directory(entry.into_path()));
        PathExpr::union_all(dirs)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PathExpr::Empty)
    }
}

/// Provider of the locations that hold font resources.
pub trait FontPaths {
    /// TrueType/OpenType resources.
    fn truetype_path(&self) -> PathExpr;

    /// Metafont resources (`.tfm`).
    fn metafont_path(&self) -> PathExpr {
        PathExpr::Empty
    }

    /// The user's private font directory, merged in when a catalog is first
    /// migrated from the global reference.
    fn user_path(&self) -> PathExpr {
        PathExpr::Empty
    }
}

/// Filesystem roots, each expanded to itself plus all sub-directories.
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    truetype: Vec<PathBuf>,
    metafont: Vec<PathBuf>,
    user: Option<PathBuf>,
    follow_symlinks: bool,
}

impl SearchPaths {
    pub fn new<I, P>(truetype: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            truetype: truetype.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_truetype<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.truetype = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metafont<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.metafont = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user = Some(dir.into());
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Roots from `FONTCAT_TRUETYPE_PATH` / `FONTCAT_METAFONT_PATH`, falling
    /// back to the platform's system font directories.
    pub fn from_env() -> Self {
        let truetype = env::var("FONTCAT_TRUETYPE_PATH")
            .map(|raw| split_path_list(&raw))
            .unwrap_or_else(|_| system_font_roots());
        let metafont = env::var("FONTCAT_METAFONT_PATH")
            .map(|raw| split_path_list(&raw))
            .unwrap_or_default();
        let user = env::var_os("FONTCAT_USER_FONTS")
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|d| d.data_dir().join("fontcat/fonts/truetype")));

        Self {
            truetype,
            metafont,
            user,
            follow_symlinks: false,
        }
    }

    /// Every root this provider scans, TrueType first.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.truetype
            .iter()
            .chain(&self.metafont)
            .chain(&self.user)
            .cloned()
            .collect()
    }

    fn expand(&self, roots: &[PathBuf]) -> PathExpr {
        PathExpr::union_all(
            roots
                .iter()
                .filter(|root| root.exists())
                .map(|root| PathExpr::with_sub_dirs(root, self.follow_symlinks)),
        )
    }
}

impl FontPaths for SearchPaths {
    fn truetype_path(&self) -> PathExpr {
        self.expand(&self.truetype)
    }

    fn metafont_path(&self) -> PathExpr {
        self.expand(&self.metafont)
    }

    fn user_path(&self) -> PathExpr {
        match &self.user {
            Some(dir) => PathExpr::with_sub_dirs(dir, self.follow_symlinks),
            None => PathExpr::Empty,
        }
    }
}

fn split_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split([':', ';'])
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Conventional font directories for the current platform that exist.
pub fn system_font_roots() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    #[cfg(any(target_os = "macos", target_os = "linux"))]
    let home = BaseDirs::new().map(|d| d.home_dir().to_path_buf());

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/System/Library/Fonts"));
        candidates.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = &home {
            candidates.push(home.join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        candidates.push(PathBuf::from("/usr/share/fonts"));
        candidates.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = &home {
            candidates.push(home.join(".local/share/fonts"));
            candidates.push(home.join(".fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(system_root) = env::var_os("SYSTEMROOT") {
            candidates.push(PathBuf::from(system_root).join("Fonts"));
        }
        if let Some(local_appdata) = env::var_os("LOCALAPPDATA") {
            candidates.push(PathBuf::from(local_appdata).join("Microsoft/Windows/Fonts"));
        }
    }

    candidates.retain(|p| p.exists());
    candidates.sort();
    candidates.dedup();
    candidates
}

/// Directory entries sorted by name, so walks are reproducible.
pub(crate) fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))? {
        let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Lower-cased extension of `path`.
pub fn file_suffix(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
}

/// File name without directory and without suffix.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

/// File name without directory.
pub fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().to_string())
}

pub fn is_font_suffix(suffix: &str) -> bool {
    FONT_SUFFIXES.contains(&suffix)
}

pub fn is_truetype_suffix(suffix: &str) -> bool {
    TRUETYPE_SUFFIXES.contains(&suffix)
}

pub(crate) fn has_font_suffix(path: &Path) -> bool {
    file_suffix(path).is_some_and(|s| is_font_suffix(&s))
}

pub(crate) fn has_truetype_suffix(path: &Path) -> bool {
    file_suffix(path).is_some_and(|s| is_truetype_suffix(&s))
}
