//! CAT002: Model keyword outside excluded keys

use super::{Category, CategoryRule};
use crate::config::RulesConfig;
use crate::matcher::MatchedDevice;

pub struct ModelKeywordRule {
    keyword: Option<String>,
    excluded_key: Option<String>,
}

impl ModelKeywordRule {
    pub fn new(config: &RulesConfig) -> Self {
        let rule = config.model_keyword.as_ref();
        Self {
            keyword: rule.map(|r| r.keyword.to_lowercase()),
            excluded_key: rule
                .and_then(|r| r.excluded_key.as_ref())
                .map(|k| k.to_lowercase()),
        }
    }
}

impl CategoryRule for ModelKeywordRule {
    fn id(&self) -> &str {
        "CAT002"
    }

    fn name(&self) -> &str {
        "Model keyword outside excluded keys"
    }

    fn category(&self) -> Category {
        Category::Category2
    }

    fn matches(&self, device: &MatchedDevice) -> bool {
        let Some(keyword) = &self.keyword else {
            return false;
        };

        let excluded = self
            .excluded_key
            .as_ref()
            .is_some_and(|k| device.key.to_lowercase().contains(k.as_str()));

        device.info.to_lowercase().contains(keyword.as_str()) && !excluded
    }
}
