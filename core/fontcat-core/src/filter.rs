//! Pruning a catalog down to the fonts that are actually on disk.
//!
//! A persisted font table may name files that were deleted or replaced by a
//! newer release of a different size. Filtering walks the search paths,
//! looks every physical face up in a [`BackTable`] built from the old table
//! and rebuilds the table from the faces it finds. When only the size of a
//! face changed, the closest recorded size stands in for the lookup so the
//! logical keys survive, but the rebuilt table always records the size that
//! is on disk now.
//!
//! Subfont indices are tried from 0 upward and the walk stops at the first
//! index the back table does not know, so a collection whose cataloged
//! indices have a gap is only partially recovered.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::order::compare;
use crate::paths::{file_name, has_font_suffix, read_dir_sorted, PathExpr};
use crate::table::{CharacteristicsTable, FeatureTable, FontTable};
use crate::value::{FontKey, Location, Record};

/// Upper bound on subfont indices tried per file.
pub const MAX_SUBFONTS: u32 = 512;

/// Reverse index from a location to the keys that reference it.
///
/// Sized locations are also indexed by their `(file, index)` prefix so a
/// stale size can still be found.
#[derive(Debug, Default, Clone)]
pub struct BackTable {
    entries: HashMap<Location, Vec<FontKey>>,
}

impl BackTable {
    pub fn build(fonts: &FontTable) -> Self {
        let mut keys: Vec<&FontKey> = fonts.keys().collect();
        keys.sort_by(|a, b| compare(&a.to_value(), &b.to_value()));

        let mut back = BackTable::default();
        for key in keys {
            for location in fonts.get(key).into_iter().flatten() {
                back.add(location.clone(), key);
                if location.is_sized() {
                    back.add(location.prefix(), key);
                }
            }
        }
        back
    }

    fn add(&mut self, location: Location, key: &FontKey) {
        let keys = self.entries.entry(location).or_default();
        if !keys.contains(key) {
            keys.push(key.clone());
        }
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.entries.contains_key(location)
    }

    pub fn keys_for(&self, location: &Location) -> &[FontKey] {
        self.entries
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The recorded location that best stands in for `stale`.
///
/// Candidates are the sized locations sharing `stale`'s `(file, index)`
/// across every key indexed under that prefix; the one whose size is closest
/// to `stale`'s wins, earlier candidates winning ties. Without candidates the
/// bare prefix is returned.
pub fn best_approximation(fonts: &FontTable, back: &BackTable, stale: &Location) -> Location {
    let prefix = stale.prefix();
    let target = stale.size.unwrap_or(0);

    let mut best: Option<(u64, &Location)> = None;
    for key in back.keys_for(&prefix) {
        for candidate in fonts.get(key).into_iter().flatten() {
            let Some(size) = candidate.size else {
                continue;
            };
            if candidate.file != prefix.file || candidate.index != prefix.index {
                continue;
            }
            let distance = size.abs_diff(target);
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }
    }

    match best {
        Some((_, location)) => location.clone(),
        None => prefix,
    }
}

/// Rebuild `fonts` from the faces found under `exprs`.
pub fn filter(fonts: &FontTable, exprs: &[PathExpr]) -> FontTable {
    let started = Instant::now();
    let back = BackTable::build(fonts);
    let mut rebuilt = FontTable::new();

    for expr in exprs {
        collect(expr, fonts, &back, &mut rebuilt);
    }

    tracing::debug!(
        "filter kept {} of {} keys in {} ms",
        rebuilt.len(),
        fonts.len(),
        started.elapsed().as_millis()
    );
    rebuilt
}

fn collect(expr: &PathExpr, fonts: &FontTable, back: &BackTable, rebuilt: &mut FontTable) {
    match expr {
        PathExpr::Empty => {}
        PathExpr::Union(a, b) => {
            collect(a, fonts, back, rebuilt);
            collect(b, fonts, back, rebuilt);
        }
        PathExpr::Directory(dir) => {
            let started = Instant::now();
            match read_dir_sorted(dir) {
                Ok(entries) => {
                    for entry in entries {
                        if has_font_suffix(&entry) && entry.is_file() {
                            collect_file(&entry, fonts, back, rebuilt);
                        }
                    }
                }
                Err(err) => tracing::warn!("{err:#}"),
            }
            tracing::debug!(
                "font dir {} in {} ms",
                dir.display(),
                started.elapsed().as_millis()
            );
        }
        PathExpr::File(path) => collect_file(path, fonts, back, rebuilt),
    }
}

fn collect_file(path: &Path, fonts: &FontTable, back: &BackTable, rebuilt: &mut FontTable) {
    let Some(name) = file_name(path) else {
        return;
    };
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) => {
            tracing::warn!("cannot stat {}: {err}", path.display());
            return;
        }
    };

    for index in 0..MAX_SUBFONTS {
        let current = Location::new(name.clone(), index, size);
        let lookup = if !back.contains(&current) && back.contains(&current.prefix()) {
            best_approximation(fonts, back, &current)
        } else {
            current.clone()
        };
        if !back.contains(&lookup) {
            return;
        }
        for key in back.keys_for(&lookup) {
            rebuilt.insert_unique(key.clone(), current.clone());
        }
    }
    tracing::debug!("collecting {name} reaches the subfont limit {MAX_SUBFONTS}");
}

/// Feature entries keyed by a family still present in `fonts`.
pub fn filter_features(fonts: &FontTable, features: &FeatureTable) -> FeatureTable {
    let families: HashSet<&str> = fonts.keys().map(|k| k.family.as_str()).collect();
    features
        .iter()
        .filter(|(key, _)| key.as_atom().is_some_and(|family| families.contains(family)))
        .map(|(key, tags)| (key.clone(), tags.clone()))
        .collect()
}

/// Characteristics of faces still present in `fonts`.
pub fn filter_characteristics(
    fonts: &FontTable,
    characteristics: &CharacteristicsTable,
) -> CharacteristicsTable {
    characteristics
        .iter()
        .filter(|(key, _)| fonts.contains(key))
        .map(|(key, traits)| (key.clone(), traits.clone()))
        .collect()
}
