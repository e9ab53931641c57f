//! Read-only lookups over the catalog tables.
//!
//! Every query loads the catalog on first use and answers absent keys with
//! an empty result.

use crate::catalog::Catalog;
use crate::order::sort_labels;
use crate::store;
use crate::table::FontTable;
use crate::value::{FontKey, Value};

/// Distinct family names in canonical label order.
pub fn families_of(fonts: &FontTable) -> Vec<String> {
    let mut families: Vec<String> = fonts.keys().map(|k| k.family.clone()).collect();
    families.sort_unstable();
    families.dedup();
    sort_labels(&mut families);
    families
}

/// Styles cataloged for `family`, in canonical label order.
pub fn styles_of(fonts: &FontTable, family: &str) -> Vec<String> {
    let mut styles: Vec<String> = fonts
        .keys()
        .filter(|k| k.family == family)
        .map(|k| k.style.clone())
        .collect();
    sort_labels(&mut styles);
    styles
}

/// Addressable file names of a face; collection members are expanded and
/// unsized locations are left out.
pub fn face_files(fonts: &FontTable, key: &FontKey) -> Vec<String> {
    fonts
        .get(key)
        .into_iter()
        .flatten()
        .filter(|location| location.is_sized())
        .map(|location| location.face_file_name())
        .collect()
}

impl Catalog {
    pub fn families(&mut self) -> Vec<String> {
        self.load();
        families_of(&self.fonts)
    }

    /// Families of the last saved local delta.
    pub fn delta_families(&self) -> Vec<String> {
        let mut delta = FontTable::new();
        store::load_fonts(&self.config.delta_database(), &mut delta);
        families_of(&delta)
    }

    /// Families of the global reference catalog.
    pub fn global_families(&mut self) -> Vec<String> {
        self.global_load();
        families_of(&self.global.fonts)
    }

    pub fn styles(&mut self, family: &str) -> Vec<String> {
        self.load();
        styles_of(&self.fonts, family)
    }

    /// Styles known to the global reference catalog.
    pub fn global_styles(&mut self, family: &str) -> Vec<String> {
        self.global_load();
        styles_of(&self.global.fonts, family)
    }

    pub fn search(&mut self, family: &str, style: &str) -> Vec<String> {
        self.load();
        face_files(&self.fonts, &FontKey::new(family, style))
    }

    pub fn characteristics(&mut self, family: &str, style: &str) -> Vec<String> {
        self.load();
        self.characteristics
            .get(&FontKey::new(family, style))
            .cloned()
            .unwrap_or_default()
    }

    /// Characteristics recorded in the global reference catalog.
    pub fn global_characteristics(&mut self, family: &str, style: &str) -> Vec<String> {
        self.global_load();
        self.global
            .characteristics
            .get(&FontKey::new(family, style))
            .cloned()
            .unwrap_or_default()
    }

    pub fn substitutions(&mut self, family: &str) -> Vec<Value> {
        self.load();
        self.substitutions
            .get(&family.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Substitution rules whose targets exist in the global reference.
    pub fn global_substitutions(&mut self, family: &str) -> Vec<Value> {
        self.global_load();
        self.global
            .substitutions
            .get(&family.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Feature tags of the global reference for `key`.
    pub fn global_features(&mut self, key: &Value) -> Vec<Value> {
        self.global_load();
        self.global.features.get(key).cloned().unwrap_or_default()
    }

    pub fn features(&mut self, key: &Value) -> Vec<Value> {
        self.load();
        self.features.get(key).cloned().unwrap_or_default()
    }

    /// Feature keys whose first tag is `variant`.
    pub fn variants_of(&mut self, variant: &Value) -> Vec<Value> {
        self.load();
        self.variants.get(variant).cloned().unwrap_or_default()
    }

    /// Global feature keys whose first tag is `variant`.
    pub fn global_variants_of(&mut self, variant: &Value) -> Vec<Value> {
        self.global_load();
        self.global.variants.get(variant).cloned().unwrap_or_default()
    }

    /// Whether a font file with this stem was ever cataloged.
    pub fn exists(&mut self, basename: &str) -> bool {
        self.ensure_suffixes();
        self.suffixes.contains(basename)
    }

    pub fn suffixes(&mut self, basename: &str) -> Vec<String> {
        self.ensure_suffixes();
        self.suffixes.suffixes(basename).to_vec()
    }

    fn ensure_suffixes(&mut self) {
        if !self.suffixes.is_empty() {
            return;
        }
        store::load_suffixes(&self.config.local_database(), &mut self.suffixes);
        store::load_suffixes(&self.config.global_database(), &mut self.suffixes);
    }
}
