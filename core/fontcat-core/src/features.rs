//! Feature tags guessed from family names.

use regex::Regex;

use crate::services::FeatureGuesser;

/// Keyword rules applied to a family name, in tag order.
const RULES: &[(&str, &str)] = &[
    (r"(?i)\b(sans|grotesk|grotesque|gothic)\b", "sansserif"),
    (r"(?i)\bslab\b", "slab"),
    (r"(?i)\b(mono|monospace|code|courier|typewriter|console)\b", "mono"),
    (r"(?i)\b(script|hand|handwriting|brush|calligraphy|calligraphic)\b", "script"),
    (r"(?i)\bmath\b", "math"),
    (r"(?i)\b(condensed|narrow|compressed)\b", "condensed"),
    (r"(?i)\b(display|poster|titling)\b", "display"),
    (r"(?i)\b(symbol|symbols|dingbats|emoji)\b", "symbol"),
];

/// Regex-driven guesser over family names.
#[derive(Debug, Clone)]
pub struct HeuristicFeatureGuesser {
    rules: Vec<(Regex, &'static str)>,
}

impl HeuristicFeatureGuesser {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .filter_map(|(pattern, tag)| Regex::new(pattern).ok().map(|re| (re, *tag)))
            .collect();
        Self { rules }
    }
}

impl Default for HeuristicFeatureGuesser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureGuesser for HeuristicFeatureGuesser {
    fn guess_features(&self, family: &str) -> Vec<String> {
        let mut tags: Vec<String> = self
            .rules
            .iter()
            .filter(|(re, _)| re.is_match(family))
            .map(|(_, tag)| tag.to_string())
            .collect();

        // Faces that are neither sans nor slab nor symbolic read as serif.
        let classified = tags
            .iter()
            .any(|t| matches!(t.as_str(), "sansserif" | "slab" | "script" | "symbol" | "math"));
        if !classified {
            tags.insert(0, "serif".to_string());
        }
        tags
    }
}

/// Normalise a feature name into a tag atom: lower-case, runs of whitespace
/// and underscores collapsed to `-`.
pub fn encode_feature(feature: &str) -> String {
    feature
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
