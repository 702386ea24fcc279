//! Categorization rule system

pub mod registry;

// Rule implementations
pub mod cat001_manual_keywords;
pub mod cat002_model_keyword;
pub mod cat003_laptops;

use crate::matcher::MatchedDevice;

/// Trait that all categorization rules must implement
pub trait CategoryRule: Send + Sync {
    /// Unique rule identifier (e.g., "CAT001")
    fn id(&self) -> &str;

    /// Human-readable rule name
    fn name(&self) -> &str;

    /// Report column the rule fills
    fn category(&self) -> Category;

    /// Whether matches need manual review
    fn manual_add(&self) -> bool {
        true
    }

    /// Check whether a device belongs to the category
    fn matches(&self, device: &MatchedDevice) -> bool;
}

/// Report categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Category1,
    Category2,
    Category3,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Category1, Category::Category2, Category::Category3];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Category1 => "Category1",
            Category::Category2 => "Category2",
            Category::Category3 => "Category3",
        }
    }
}
