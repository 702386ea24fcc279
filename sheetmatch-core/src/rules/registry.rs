//! Rule registry for creating rule instances

use super::*;
use crate::config::RulesConfig;

/// Create instances of all categorization rules
pub fn create_rules(config: &RulesConfig) -> Vec<Box<dyn CategoryRule>> {
    vec![
        Box::new(cat001_manual_keywords::ManualKeywordsRule::new(config)),
        Box::new(cat002_model_keyword::ModelKeywordRule::new(config)),
        Box::new(cat003_laptops::LaptopsRule::new(config)),
    ]
}

/// Get the IDs of all available rules
pub fn rule_ids() -> Vec<&'static str> {
    vec!["CAT001", "CAT002", "CAT003"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_rule_per_category() {
        let rules = create_rules(&RulesConfig::default());
        let categories: Vec<Category> = rules.iter().map(|r| r.category()).collect();
        assert_eq!(categories, Category::ALL.to_vec());

        let ids: Vec<&str> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids, rule_ids());
    }
}
