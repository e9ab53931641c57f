//! Differences between a local catalog and the global reference.

use std::hash::Hash;

use anyhow::Result;
use serde::Serialize;

use crate::config::CatalogConfig;
use crate::store;
use crate::table::{CharacteristicsTable, FeatureTable, FontTable, Table, VariantIndex};

/// Remove from `local` every key that `reference` binds to an equal value.
///
/// Returns the number of keys removed.
pub fn keep_delta<K, V>(local: &mut Table<K, V>, reference: &Table<K, V>) -> usize
where
    K: Eq + Hash + Clone,
    V: PartialEq,
{
    let unchanged: Vec<K> = local
        .iter()
        .filter(|(key, value)| reference.get(key) == Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    for key in &unchanged {
        local.remove(key);
    }
    unchanged.len()
}

/// Entries written to each delta file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeltaSummary {
    pub fonts: usize,
    pub features: usize,
    pub characteristics: usize,
}

#[derive(Debug, Default)]
struct Snapshot {
    fonts: FontTable,
    features: FeatureTable,
    variants: VariantIndex,
    characteristics: CharacteristicsTable,
}

impl Snapshot {
    fn global(config: &CatalogConfig) -> Self {
        let mut snapshot = Snapshot::default();
        store::load_fonts(&config.global_database(), &mut snapshot.fonts);
        store::load_features(
            &config.global_features(),
            &mut snapshot.features,
            &mut snapshot.variants,
        );
        store::load_characteristics(&config.global_characteristics(), &mut snapshot.characteristics);
        snapshot
    }

    /// The global tables with the local files loaded over them.
    fn merged(config: &CatalogConfig) -> Self {
        let mut snapshot = Snapshot::global(config);
        store::load_fonts(&config.local_database(), &mut snapshot.fonts);
        store::load_features(
            &config.local_features(),
            &mut snapshot.features,
            &mut snapshot.variants,
        );
        store::load_characteristics(&config.local_characteristics(), &mut snapshot.characteristics);
        snapshot
    }
}

/// Write the local entries that differ from the global catalog to the delta
/// files of the local directory.
pub fn save_local_delta(config: &CatalogConfig) -> Result<DeltaSummary> {
    let reference = Snapshot::global(config);
    let mut merged = Snapshot::merged(config);

    keep_delta(&mut merged.fonts, &reference.fonts);
    keep_delta(&mut merged.features, &reference.features);
    keep_delta(&mut merged.characteristics, &reference.characteristics);

    store::save_fonts(&config.delta_database(), &merged.fonts)?;
    store::save_features(&config.delta_features(), &merged.features)?;
    store::save_characteristics(&config.delta_characteristics(), &merged.characteristics)?;

    let summary = DeltaSummary {
        fonts: merged.fonts.len(),
        features: merged.features.len(),
        characteristics: merged.characteristics.len(),
    };
    tracing::info!(
        "local delta: {} fonts, {} features, {} characteristics",
        summary.fonts,
        summary.features,
        summary.characteristics
    );
    Ok(summary)
}
