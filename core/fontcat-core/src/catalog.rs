//! The catalog context: every table, its load state and the collaborators
//! used to fill it.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::CatalogConfig;
use crate::delta::{self, DeltaSummary};
use crate::filter;
use crate::paths::{file_name, read_dir_sorted, PathExpr};
use crate::scan::{self, ScanOptions, ScanSummary};
use crate::services::Services;
use crate::store;
use crate::table::{
    CharacteristicsTable, FeatureTable, FontTable, SubstitutionTable, SuffixIndex, VariantIndex,
};

/// Length of the digest-style file names picked up when extending from a
/// directory.
const DIGEST_NAME_LEN: usize = 36;

/// The global reference, loaded apart from the primary tables.
#[derive(Debug, Default)]
pub(crate) struct GlobalTables {
    pub(crate) fonts: FontTable,
    pub(crate) features: FeatureTable,
    pub(crate) variants: VariantIndex,
    pub(crate) characteristics: CharacteristicsTable,
    pub(crate) substitutions: SubstitutionTable,
}

/// A font catalog backed by a local cache directory and a global reference.
///
/// Tables are loaded on first use and stay loaded until [`Catalog::reset`].
pub struct Catalog {
    pub(crate) config: CatalogConfig,
    pub(crate) services: Services,
    pub(crate) options: ScanOptions,
    pub(crate) fonts: FontTable,
    pub(crate) features: FeatureTable,
    pub(crate) variants: VariantIndex,
    pub(crate) characteristics: CharacteristicsTable,
    pub(crate) substitutions: SubstitutionTable,
    pub(crate) suffixes: SuffixIndex,
    pub(crate) global: GlobalTables,
    extra_paths: Vec<PathBuf>,
    loaded: bool,
    global_loaded: bool,
}

impl Catalog {
    pub fn new(config: CatalogConfig, services: Services) -> Self {
        Self {
            config,
            services,
            options: ScanOptions::default(),
            fonts: FontTable::new(),
            features: FeatureTable::new(),
            variants: VariantIndex::new(),
            characteristics: CharacteristicsTable::new(),
            substitutions: SubstitutionTable::new(),
            suffixes: SuffixIndex::new(),
            global: GlobalTables::default(),
            extra_paths: Vec::new(),
            loaded: false,
            global_loaded: false,
        }
    }

    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    pub fn feature_table(&self) -> &FeatureTable {
        &self.features
    }

    pub fn characteristics_table(&self) -> &CharacteristicsTable {
        &self.characteristics
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drop every table and clear both load flags.
    pub fn reset(&mut self) {
        self.fonts = FontTable::new();
        self.features = FeatureTable::new();
        self.variants = VariantIndex::new();
        self.characteristics = CharacteristicsTable::new();
        self.substitutions = SubstitutionTable::new();
        self.suffixes = SuffixIndex::new();
        self.global = GlobalTables::default();
        self.loaded = false;
        self.global_loaded = false;
    }

    /// Load the local catalog, migrating from the global reference when a
    /// local table is empty. Later calls do nothing.
    ///
    /// Migration filters the global tables against the fonts on disk, picks
    /// up the user's private fonts and saves the result locally. Save
    /// failures are logged; the in-memory catalog is still usable.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        let mut user_fonts = 0;

        store::load_fonts(&self.config.local_database(), &mut self.fonts);
        if self.fonts.is_empty() {
            tracing::info!(
                "building local font catalog from {}",
                self.config.global_database().display()
            );
            store::load_fonts(&self.config.global_database(), &mut self.fonts);
            self.filter();
            let user_dir = self.services.paths.user_path();
            user_fonts = self.add_font_files(&extension_files(&user_dir));
            self.save_logged(store::save_fonts(&self.config.local_database(), &self.fonts));
            store::load_suffixes(&self.config.local_database(), &mut self.suffixes);
        }

        store::load_features(&self.config.local_features(), &mut self.features, &mut self.variants);
        if self.features.is_empty() {
            store::load_features(
                &self.config.global_features(),
                &mut self.features,
                &mut self.variants,
            );
            self.filter_features();
            self.save_logged(store::save_features(&self.config.local_features(), &self.features));
        }

        store::load_characteristics(&self.config.local_characteristics(), &mut self.characteristics);
        if self.characteristics.is_empty() {
            store::load_characteristics(
                &self.config.global_characteristics(),
                &mut self.characteristics,
            );
            self.filter_characteristics();
            self.save_logged(store::save_characteristics(
                &self.config.local_characteristics(),
                &self.characteristics,
            ));
        }

        store::load_substitutions(
            &self.config.global_substitutions(),
            &self.fonts,
            &mut self.substitutions,
        );
        self.loaded = true;

        if user_fonts > 0 {
            self.build_characteristics(false);
            self.guess_features();
            if let Err(err) = self.save() {
                tracing::warn!("cannot save font catalog: {err:#}");
            }
        }
        tracing::debug!(
            "catalog loaded: {} fonts, {} features, {} characteristics",
            self.fonts.len(),
            self.features.len(),
            self.characteristics.len()
        );
    }

    /// Load the global reference into tables disjoint from the primary
    /// catalog. Later calls do nothing.
    pub fn global_load(&mut self) {
        if self.global_loaded {
            return;
        }
        tracing::warn!("missing font, loading global substitution list");
        let global = &mut self.global;
        store::load_fonts(&self.config.global_database(), &mut global.fonts);
        store::load_features(
            &self.config.global_features(),
            &mut global.features,
            &mut global.variants,
        );
        store::load_characteristics(
            &self.config.global_characteristics(),
            &mut global.characteristics,
        );
        store::load_substitutions(
            &self.config.global_substitutions(),
            &global.fonts,
            &mut global.substitutions,
        );
        self.global_loaded = true;
    }

    /// Persist the font, feature and characteristics tables locally and
    /// refresh the suffix index from the saved font table.
    pub fn save(&mut self) -> Result<()> {
        store::save_fonts(&self.config.local_database(), &self.fonts)?;
        self.notify();
        store::save_features(&self.config.local_features(), &self.features)?;
        self.notify();
        store::save_characteristics(&self.config.local_characteristics(), &self.characteristics)?;
        self.notify();
        store::load_suffixes(&self.config.local_database(), &mut self.suffixes);
        Ok(())
    }

    /// Scan `expr` into the font table.
    pub fn build(&mut self, expr: &PathExpr) -> Result<ScanSummary> {
        scan::build(
            expr,
            &mut self.fonts,
            &mut self.suffixes,
            self.services.introspector.as_ref(),
            &self.options,
        )
    }

    /// Rescan the configured TrueType path on top of the loaded catalog and
    /// save it.
    pub fn build_local(&mut self) -> Result<ScanSummary> {
        self.load();
        let expr = self.services.paths.truetype_path();
        let summary = self.build(&expr)?;
        self.build_characteristics(false);
        self.guess_features();
        self.save()?;
        Ok(summary)
    }

    /// Add a single font file, or the digest-named files of a directory, to
    /// the local catalog and save it.
    ///
    /// Added files are remembered so later filtering keeps them. Returns the
    /// number of faces added.
    pub fn extend_local(&mut self, path: &Path) -> Result<usize> {
        let files = extension_files(&PathExpr::from_path(path));
        if files.is_empty() {
            return Ok(0);
        }
        self.load();
        let faces = self.add_font_files(&files);
        self.build_characteristics(false);
        self.guess_features();
        self.save()?;
        Ok(faces)
    }

    /// Rebuild the global reference from `expr`, or from the configured
    /// TrueType path, on top of the existing global tables.
    ///
    /// Features are written to the `.bis` file for review rather than over
    /// the curated global feature list. The catalog is reset afterwards.
    pub fn build_global(&mut self, expr: Option<PathExpr>) -> Result<ScanSummary> {
        self.reset();
        store::load_fonts(&self.config.global_database(), &mut self.fonts);
        store::load_features(
            &self.config.global_features(),
            &mut self.features,
            &mut self.variants,
        );
        store::load_characteristics(
            &self.config.global_characteristics(),
            &mut self.characteristics,
        );
        self.loaded = true;
        self.global_loaded = true;

        let expr = expr.unwrap_or_else(|| self.services.paths.truetype_path());
        let result = self.build_global_from(&expr);
        self.reset();
        result
    }

    fn build_global_from(&mut self, expr: &PathExpr) -> Result<ScanSummary> {
        let summary = self.build(expr)?;
        self.build_characteristics(false);
        self.guess_features();
        store::save_fonts(&self.config.global_database(), &self.fonts)?;
        self.notify();
        store::save_features(&self.config.global_features_bis(), &self.features)?;
        self.notify();
        store::save_characteristics(&self.config.global_characteristics(), &self.characteristics)?;
        self.notify();
        Ok(summary)
    }

    /// Analyze the faces of the font table; see [`scan::build_characteristics`].
    pub fn build_characteristics(&mut self, force: bool) -> usize {
        scan::build_characteristics(
            &self.fonts,
            &mut self.characteristics,
            self.services.introspector.as_ref(),
            force,
        )
    }

    /// Guess features for families that have none.
    pub fn guess_features(&mut self) -> usize {
        scan::guess_features(
            &self.fonts,
            &mut self.features,
            &mut self.variants,
            self.services.guesser.as_ref(),
        )
    }

    /// Restrict the font table to the faces present on the search paths
    /// and the files added through [`Catalog::extend_local`].
    pub fn filter(&mut self) {
        let paths = &self.services.paths;
        let extra = PathExpr::union_all(self.extra_paths.iter().cloned().map(PathExpr::File));
        let exprs = [
            paths.truetype_path(),
            paths.user_path(),
            paths.metafont_path(),
            extra,
        ];
        let before = self.fonts.len();
        self.fonts = filter::filter(&self.fonts, &exprs);
        tracing::info!("filtered font catalog: {} of {} keys kept", self.fonts.len(), before);
    }

    pub fn filter_features(&mut self) {
        self.features = filter::filter_features(&self.fonts, &self.features);
    }

    pub fn filter_characteristics(&mut self) {
        self.characteristics = filter::filter_characteristics(&self.fonts, &self.characteristics);
    }

    /// Write the local entries that differ from the global reference to the
    /// delta files. The catalog is reset afterwards.
    pub fn save_local_delta(&mut self) -> Result<DeltaSummary> {
        self.reset();
        let summary = delta::save_local_delta(&self.config)?;
        self.notify();
        Ok(summary)
    }

    fn add_font_files(&mut self, files: &[PathBuf]) -> usize {
        let mut faces = 0;
        for file in files {
            if !self.extra_paths.contains(file) {
                self.extra_paths.push(file.clone());
            }
            match self.build(&PathExpr::File(file.clone())) {
                Ok(summary) => faces += summary.faces,
                Err(err) => tracing::warn!("cannot add {}: {err:#}", file.display()),
            }
        }
        faces
    }

    fn save_logged(&self, result: Result<()>) {
        match result {
            Ok(()) => self.notify(),
            Err(err) => tracing::warn!("cannot save font catalog: {err:#}"),
        }
    }

    fn notify(&self) {
        self.services.listener.catalog_changed();
    }
}

/// Files an extension adds: a lone file, or the digest-named entries of
/// the directories in `expr`.
fn extension_files(expr: &PathExpr) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_extension_files(expr, &mut files);
    files
}

fn collect_extension_files(expr: &PathExpr, out: &mut Vec<PathBuf>) {
    match expr {
        PathExpr::Empty => {}
        PathExpr::Union(a, b) => {
            collect_extension_files(a, out);
            collect_extension_files(b, out);
        }
        PathExpr::File(path) => out.push(path.clone()),
        PathExpr::Directory(dir) => match read_dir_sorted(dir) {
            Ok(entries) => out.extend(entries.into_iter().filter(|entry| {
                entry.is_file()
                    && file_name(entry).is_some_and(|n| n.chars().count() == DIGEST_NAME_LEN)
            })),
            Err(err) => tracing::warn!("{err:#}"),
        },
    }
}
