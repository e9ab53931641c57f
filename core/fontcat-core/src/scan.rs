//! Building catalog tables from font files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::features::encode_feature;
use crate::order::compare;
use crate::paths::{file_name, has_truetype_suffix, is_font_suffix, read_dir_sorted, PathExpr};
use crate::query::families_of;
use crate::services::{FeatureGuesser, FontIntrospector};
use crate::table::{CharacteristicsTable, FeatureTable, FontTable, SuffixIndex, VariantIndex};
use crate::value::{FontKey, Location, Record, Value};

/// File names never opened by the scanner.
pub const BLACKLIST: &[&str] = &[
    "AppleMyungjo.ttf",
    "NISC18030.ttf",
    "Gungseouche.ttf",
    "blex.ttf",
    "blsy.ttf",
    "rblmi.ttf",
];

/// File-name prefixes of families the scanner skips.
pub const BLACKLIST_PREFIXES: &[&str] = &["FonetikaDania"];

pub fn on_blacklist(name: &str) -> bool {
    BLACKLIST.contains(&name) || BLACKLIST_PREFIXES.iter().any(|p| name.starts_with(p))
}

#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    /// Threads used to read font names; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
}

/// Counters reported by [`build`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub files: usize,
    pub skipped: usize,
    pub faces: usize,
}

/// Register every font file under `expr` in `fonts` and `suffixes`.
///
/// Each face found becomes a `(file, index, size)` location under its
/// `(family, style)` key. Files that cannot be read are skipped.
pub fn build(
    expr: &PathExpr,
    fonts: &mut FontTable,
    suffixes: &mut SuffixIndex,
    introspector: &dyn FontIntrospector,
    opts: &ScanOptions,
) -> Result<ScanSummary> {
    let mut leaves = Vec::new();
    collect_leaves(expr, &mut leaves);

    let mut summary = ScanSummary::default();
    leaves.retain(|path| {
        let blocked = file_name(path).is_some_and(|name| on_blacklist(&name));
        if blocked {
            tracing::debug!("skipping blacklisted {}", path.display());
            summary.skipped += 1;
        }
        !blocked
    });
    for leaf in &leaves {
        suffixes.register(leaf);
    }

    let read_names = || -> Vec<Result<Vec<FontKey>>> {
        leaves
            .par_iter()
            .map(|path| introspector.introspect_names(path))
            .collect()
    };
    let names = match opts.jobs {
        Some(jobs) => ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("building scan thread pool")?
            .install(read_names),
        None => read_names(),
    };

    for (path, result) in leaves.iter().zip(names) {
        tracing::debug!("Process {}", path.display());
        match result.and_then(|keys| register_faces(path, keys, fonts)) {
            Ok(faces) => {
                summary.files += 1;
                summary.faces += faces;
            }
            Err(err) => {
                tracing::warn!("skipping {}: {err:#}", path.display());
                summary.skipped += 1;
            }
        }
    }

    tracing::info!(
        "scanned {} font files ({} faces, {} skipped)",
        summary.files,
        summary.faces,
        summary.skipped
    );
    Ok(summary)
}

fn register_faces(path: &Path, keys: Vec<FontKey>, fonts: &mut FontTable) -> Result<usize> {
    let size = fs::metadata(path)
        .with_context(|| format!("reading size of {}", path.display()))?
        .len();
    let name = file_name(path).unwrap_or_default();
    let faces = keys.len();
    for (index, key) in keys.into_iter().enumerate() {
        fonts.insert_unique(key, Location::new(name.clone(), index as u32, size));
    }
    Ok(faces)
}

/// Regular files denoted by `expr`; directories contribute their
/// TrueType-suffixed entries.
fn collect_leaves(expr: &PathExpr, out: &mut Vec<PathBuf>) {
    match expr {
        PathExpr::Empty => {}
        PathExpr::Union(a, b) => {
            collect_leaves(a, out);
            collect_leaves(b, out);
        }
        PathExpr::Directory(dir) => match read_dir_sorted(dir) {
            Ok(entries) => {
                for entry in entries.into_iter().filter(|e| has_truetype_suffix(e)) {
                    collect_leaves(&PathExpr::from_path(entry), out);
                }
            }
            Err(err) => tracing::warn!("{err:#}"),
        },
        PathExpr::File(path) => out.push(path.clone()),
    }
}

/// Logical font name for a location file: the stem, with a trailing `10`
/// dropped when only the shorter name is a known resource.
pub fn logical_name(file: &str, introspector: &dyn FontIntrospector) -> String {
    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());
    if !introspector.font_exists(&stem) {
        if let Some(short) = stem.strip_suffix("10") {
            return short.to_string();
        }
    }
    stem
}

/// Derive metric characteristics for every cataloged face.
///
/// Faces that already have characteristics are left alone unless `force`.
/// Returns the number of faces analyzed.
pub fn build_characteristics(
    fonts: &FontTable,
    characteristics: &mut CharacteristicsTable,
    introspector: &dyn FontIntrospector,
    force: bool,
) -> usize {
    let mut keys: Vec<&FontKey> = fonts.keys().collect();
    keys.sort_by(|a, b| compare(&a.to_value(), &b.to_value()));

    let mut analyzed = 0;
    for key in keys {
        tracing::debug!("Analyzing {} {}", key.family, key.style);
        for location in fonts.get(key).into_iter().flatten() {
            if !force && characteristics.contains(key) {
                continue;
            }
            if !location.is_sized() || !location.suffix().is_some_and(|s| is_font_suffix(&s)) {
                continue;
            }
            tracing::debug!("| Processing {}, {}", location.file, location.index);
            let name = logical_name(&location.file, introspector);
            if !introspector.font_exists(&name) {
                continue;
            }
            match introspector.analyze_metrics(&name) {
                Ok(traits) => {
                    tracing::debug!("{name} ~> {traits:?}");
                    characteristics.insert(key.clone(), traits);
                    analyzed += 1;
                }
                Err(err) => tracing::warn!("cannot analyze {name}: {err:#}"),
            }
        }
    }
    analyzed
}

/// Give every family without a feature entry a guessed one, keyed by family.
///
/// Returns the number of families added.
pub fn guess_features(
    fonts: &FontTable,
    features: &mut FeatureTable,
    variants: &mut VariantIndex,
    guesser: &dyn FeatureGuesser,
) -> usize {
    let mut added = 0;
    for family in families_of(fonts) {
        let key = Value::atom(&family);
        if features.contains(&key) {
            continue;
        }
        let tags: Vec<Value> = guesser
            .guess_features(&family)
            .iter()
            .map(|f| Value::atom(encode_feature(f)))
            .collect();
        if let Some(first) = tags.first() {
            variants.insert_unique(first.clone(), key.clone());
        }
        features.insert(key, tags);
        added += 1;
    }
    added
}
