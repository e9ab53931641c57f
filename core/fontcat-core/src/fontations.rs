//! Font introspection backed by read-fonts and skrifa.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use read_fonts::tables::name::NameId;
use read_fonts::tables::os2::SelectionFlags;
use read_fonts::{FileRef, FontRef, TableProvider};
use skrifa::{FontRef as SkrifaFontRef, MetadataProvider};
use walkdir::WalkDir;

use crate::paths::{file_stem, has_truetype_suffix};
use crate::services::FontIntrospector;
use crate::value::FontKey;

const ENGLISH_US: u16 = 0x0409;

/// Unicode blocks reported as `cover=<name>` when at least half of their
/// letters are mapped.
const COVERAGE: &[(&str, u32, u32)] = &[
    ("latin", 0x0041, 0x007A),
    ("greek", 0x0391, 0x03C9),
    ("cyrillic", 0x0410, 0x044F),
    ("hebrew", 0x05D0, 0x05EA),
    ("arabic", 0x0627, 0x064A),
    ("cjk", 0x4E00, 0x4EFF),
];

/// Reads name tables and metrics straight from font files.
///
/// Logical names (file stems) resolve against the configured roots; the
/// stem index is built on first use.
#[derive(Debug)]
pub struct FontationsIntrospector {
    roots: Vec<PathBuf>,
    by_stem: OnceLock<HashMap<String, PathBuf>>,
}

impl FontationsIntrospector {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            by_stem: OnceLock::new(),
        }
    }

    fn resolve(&self, name: &str) -> Option<&PathBuf> {
        self.by_stem
            .get_or_init(|| index_stems(&self.roots))
            .get(name)
    }
}

impl FontIntrospector for FontationsIntrospector {
    fn introspect_names(&self, path: &Path) -> Result<Vec<FontKey>> {
        let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        let fallback_family = file_stem(path).unwrap_or_else(|| path.display().to_string());

        let file =
            FileRef::new(&data).with_context(|| format!("parsing font {}", path.display()))?;

        let mut keys = Vec::new();
        for font in file.fonts() {
            let font = font.with_context(|| format!("parsing font {}", path.display()))?;
            let family = find_name(
                &font,
                &[NameId::TYPOGRAPHIC_FAMILY_NAME, NameId::FAMILY_NAME],
            )
            .unwrap_or_else(|| fallback_family.clone());
            let style = find_name(
                &font,
                &[NameId::TYPOGRAPHIC_SUBFAMILY_NAME, NameId::SUBFAMILY_NAME],
            )
            .unwrap_or_else(|| "Regular".to_string());
            keys.push(FontKey::new(family, style));
        }
        Ok(keys)
    }

    fn font_exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    fn analyze_metrics(&self, name: &str) -> Result<Vec<String>> {
        let path = self
            .resolve(name)
            .ok_or_else(|| anyhow!("no font resource named {name}"))?;
        let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        let font = FontRef::from_index(&data, 0)
            .with_context(|| format!("parsing font {}", path.display()))?;
        let sfont = SkrifaFontRef::from_index(&data, 0)
            .with_context(|| format!("parsing font {}", path.display()))?;

        let mut traits = Vec::new();
        if let Ok(os2) = font.os2() {
            traits.push(format!("weight={}", os2.us_weight_class()));
            traits.push(format!("width={}", os2.us_width_class()));
            let italic = os2.fs_selection().contains(SelectionFlags::ITALIC);
            traits.push(format!("slant={}", if italic { "italic" } else { "upright" }));
            let raw_family = os2.s_family_class() as u16;
            traits.push(format!("class={}.{}", raw_family >> 8, raw_family & 0x00FF));
        }
        if let Ok(post) = font.post() {
            let mono = post.is_fixed_pitch() != 0;
            traits.push(format!("mono={}", if mono { "yes" } else { "no" }));
        }
        if let Ok(maxp) = font.maxp() {
            traits.push(format!("glyphs={}", maxp.num_glyphs()));
        }
        traits.extend(collect_coverage(&sfont));
        Ok(traits)
    }
}

fn find_name(font: &FontRef, ids: &[NameId]) -> Option<String> {
    let name_table = font.name().ok()?;
    let data = name_table.string_data();

    for id in ids {
        let mut fallback = None;
        for record in name_table.name_record() {
            if record.name_id() != *id || !record.is_unicode() {
                continue;
            }
            let Ok(entry) = record.string(data) else {
                continue;
            };
            let rendered = entry.to_string().trim().to_string();
            if rendered.is_empty() {
                continue;
            }
            if record.language_id() == ENGLISH_US {
                return Some(rendered);
            }
            fallback.get_or_insert(rendered);
        }
        if fallback.is_some() {
            return fallback;
        }
    }
    None
}

fn collect_coverage(font: &SkrifaFontRef) -> Vec<String> {
    let charmap = font.charmap();
    COVERAGE
        .iter()
        .filter(|(_, lo, hi)| {
            let total = hi - lo + 1;
            let mapped = (*lo..=*hi).filter(|cp| charmap.map(*cp).is_some()).count() as u32;
            mapped * 2 >= total
        })
        .map(|(name, _, _)| format!("cover={name}"))
        .collect()
}

fn index_stems(roots: &[PathBuf]) -> HashMap<String, PathBuf> {
    let mut by_stem = HashMap::new();
    for root in roots {
        for entry in WalkDir::new(root).sort_by_file_name().into_iter().flatten() {
            if entry.file_type().is_file() && has_truetype_suffix(entry.path()) {
                if let Some(stem) = file_stem(entry.path()) {
                    by_stem.entry(stem).or_insert_with(|| entry.path().to_path_buf());
                }
            }
        }
    }
    by_stem
}
