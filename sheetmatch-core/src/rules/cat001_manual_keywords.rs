//! CAT001: Model keywords and barcode ranges

use super::{Category, CategoryRule};
use crate::config::{NamedRange, RulesConfig};
use crate::matcher::{MatchedDevice, key_suffix};

/// Flags devices whose model mentions a review keyword, or whose trailing
/// barcode digits fall inside one of the configured ranges.
///
/// Configuration:
/// - `manual_keywords`: substrings searched in the lowercased model text
/// - `ranges`: inclusive numeric ranges for the last six characters of the key
pub struct ManualKeywordsRule {
    keywords: Vec<String>,
    ranges: Vec<NamedRange>,
}

impl ManualKeywordsRule {
    pub fn new(config: &RulesConfig) -> Self {
        Self {
            keywords: config
                .manual_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            ranges: config.ranges.clone(),
        }
    }

    /// Name of the range containing the key's trailing digits, if any
    pub fn matching_range(&self, key: &str) -> Option<&NamedRange> {
        let suffix = key_suffix(key);
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let value: u32 = suffix.parse().ok()?;
        self.ranges.iter().find(|range| range.contains(value))
    }
}

impl CategoryRule for ManualKeywordsRule {
    fn id(&self) -> &str {
        "CAT001"
    }

    fn name(&self) -> &str {
        "Model keywords and barcode ranges"
    }

    fn category(&self) -> Category {
        Category::Category1
    }

    fn matches(&self, device: &MatchedDevice) -> bool {
        let model = device.info.to_lowercase();
        self.keywords.iter().any(|k| model.contains(k.as_str()))
            || self.matching_range(&device.key).is_some()
    }
}
