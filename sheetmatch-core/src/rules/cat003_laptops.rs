//! CAT003: Laptops

use super::{Category, CategoryRule};
use crate::config::RulesConfig;
use crate::matcher::MatchedDevice;

pub struct LaptopsRule {
    marker: Option<String>,
}

impl LaptopsRule {
    pub fn new(config: &RulesConfig) -> Self {
        Self {
            marker: config.laptop_marker.as_ref().map(|m| m.to_lowercase()),
        }
    }
}

impl CategoryRule for LaptopsRule {
    fn id(&self) -> &str {
        "CAT003"
    }

    fn name(&self) -> &str {
        "Laptops"
    }

    fn category(&self) -> Category {
        Category::Category3
    }

    // Laptops are reported as-is
    fn manual_add(&self) -> bool {
        false
    }

    fn matches(&self, device: &MatchedDevice) -> bool {
        self.marker
            .as_ref()
            .is_some_and(|m| device.key.to_lowercase().contains(m.as_str()))
    }
}
