//! Loading and saving catalog tables as record blocks.
//!
//! Loads are tolerant: a missing file is an empty table, a file that does
//! not parse is treated as empty, and individual records of the wrong shape
//! are skipped. Loads merge into the table they are given, later records
//! overriding earlier bindings, which is how local files override global
//! ones. Saves write records in canonical order and report I/O errors.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::codec::{parse_block, print_block};
use crate::order::canonical_sort;
use crate::query::styles_of;
use crate::table::{
    CharacteristicsTable, FeatureTable, FontTable, SubstitutionTable, SuffixIndex, VariantIndex,
};
use crate::value::{FontKey, Location, Record, Value};

/// Top-level records of the block at `path`; empty when absent or unreadable.
pub fn read_records(path: &Path) -> Vec<Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!("cannot read catalog {}: {err}", path.display());
            return Vec::new();
        }
    };
    match parse_block(&text) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!("ignoring malformed catalog {}: {err:#}", path.display());
            Vec::new()
        }
    }
}

/// Sort `records` canonically and write them to `path`.
pub fn write_records(path: &Path, mut records: Vec<Value>) -> Result<()> {
    canonical_sort(&mut records);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating catalog directory {}", parent.display()))?;
    }
    fs::write(path, print_block(&records))
        .with_context(|| format!("writing catalog {}", path.display()))?;
    tracing::debug!("saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Merge `((family style) (location ...))` records into `fonts`.
pub fn load_fonts(path: &Path, fonts: &mut FontTable) -> usize {
    let mut loaded = 0;
    for record in read_records(path) {
        let Some([key, files]) = pair(&record) else {
            skip(path, &record);
            continue;
        };
        match (FontKey::from_value(key), Vec::<Location>::from_value(files)) {
            (Some(key), Some(files)) => {
                fonts.insert(key, files);
                loaded += 1;
            }
            _ => skip(path, &record),
        }
    }
    loaded
}

/// Merge `(key tag ...)` records into `features`, indexing each key under its
/// first tag in `variants`.
pub fn load_features(path: &Path, features: &mut FeatureTable, variants: &mut VariantIndex) -> usize {
    let mut loaded = 0;
    for record in read_records(path) {
        match record.as_tuple() {
            Some([key, tags @ ..]) if !tags.is_empty() => {
                features.insert(key.clone(), tags.to_vec());
                variants.insert_unique(tags[0].clone(), key.clone());
                loaded += 1;
            }
            _ => skip(path, &record),
        }
    }
    loaded
}

/// Merge `((family style) (trait ...))` records into `characteristics`.
pub fn load_characteristics(path: &Path, characteristics: &mut CharacteristicsTable) -> usize {
    let mut loaded = 0;
    for record in read_records(path) {
        let Some([key, traits]) = pair(&record) else {
            skip(path, &record);
            continue;
        };
        match (FontKey::from_value(key), Vec::<String>::from_value(traits)) {
            (Some(key), Some(traits)) => {
                characteristics.insert(key, traits);
                loaded += 1;
            }
            _ => skip(path, &record),
        }
    }
    loaded
}

/// Merge substitution rules `((family ...) (target ...))` into
/// `substitutions`, keeping only rules whose target family has a style in
/// `fonts`.
pub fn load_substitutions(
    path: &Path,
    fonts: &FontTable,
    substitutions: &mut SubstitutionTable,
) -> usize {
    let mut loaded = 0;
    for record in read_records(path) {
        let Some((family, target)) = substitution_ends(&record) else {
            skip(path, &record);
            continue;
        };
        if styles_of(fonts, target).is_empty() {
            continue;
        }
        substitutions.insert_unique(family.to_string(), record.clone());
        loaded += 1;
    }
    loaded
}

fn substitution_ends(record: &Value) -> Option<(&str, &str)> {
    let [from, to] = pair(record)?;
    let family = from.as_tuple()?.first()?.as_atom()?;
    let target = to.as_tuple()?.first()?.as_atom()?;
    Some((family, target))
}

/// Register the suffix of every location file named in the database at
/// `path`.
pub fn load_suffixes(path: &Path, suffixes: &mut SuffixIndex) {
    let started = Instant::now();
    let mut fonts = FontTable::new();
    load_fonts(path, &mut fonts);
    for (_, files) in &fonts {
        for file in files {
            suffixes.register(Path::new(&file.file));
        }
    }
    tracing::debug!(
        "loaded suffixes from {} in {} ms",
        path.display(),
        started.elapsed().as_millis()
    );
}

pub fn save_fonts(path: &Path, fonts: &FontTable) -> Result<()> {
    write_records(path, fonts.to_pairs())
}

/// Features are stored flattened as `(key tag ...)`; keys without tags
/// cannot be represented and are left out.
pub fn save_features(path: &Path, features: &FeatureTable) -> Result<()> {
    let records = features
        .iter()
        .filter(|(_, tags)| !tags.is_empty())
        .map(|(key, tags)| Value::tuple(std::iter::once(key.clone()).chain(tags.iter().cloned())))
        .collect();
    write_records(path, records)
}

pub fn save_characteristics(path: &Path, characteristics: &CharacteristicsTable) -> Result<()> {
    write_records(path, characteristics.to_pairs())
}

fn pair(record: &Value) -> Option<&[Value; 2]> {
    record.as_tuple()?.try_into().ok()
}

fn skip(path: &Path, record: &Value) {
    tracing::debug!("skipping malformed record in {}: {record}", path.display());
}
