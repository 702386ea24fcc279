//! sheetmatch-core: Core library for reconciling device inventory spreadsheets
//!
//! Identifiers from one workbook are searched in a device table, resolved to
//! model descriptions through a lookup table, reduced to the latest record per
//! device, categorized by rules and written out as a CSV report.

pub mod config;
pub mod entry;
pub mod matcher;
pub mod reader;
pub mod report;
pub mod rules;
pub mod timestamp;
pub mod writer;

use anyhow::{Context, Result};

pub use config::{Config, Location};
pub use entry::Entry;
pub use matcher::{IdentifierMatches, MatchedDevice, Matcher};
pub use reader::{CellValue, Table};
pub use report::{Categorizer, IdentifierReport, Report, ReportSummary};
pub use rules::{Category, CategoryRule};
pub use timestamp::Timestamp;

/// The three inputs of a reconciliation run
#[derive(Debug, Clone)]
pub struct Sources {
    pub identifiers: Vec<String>,
    pub primary: Table,
    pub secondary: Table,
}

/// Main reconciliation interface
pub struct Reconciler {
    config: Config,
    categorizer: Categorizer,
}

impl Reconciler {
    /// Create a new reconciler with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new reconciler with custom configuration
    pub fn with_config(config: Config) -> Self {
        let categorizer = Categorizer::new(&config.rules);
        Self {
            config,
            categorizer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the identifier list and both tables of a location
    pub fn load_sources(&self, location: &Location) -> Result<Sources> {
        let sources = &self.config.sources;

        let identifiers = reader::read_identifiers(
            &location.identifiers,
            &sources.identifier_sheet,
            &sources.identifier_column,
        )
        .with_context(|| {
            format!(
                "Failed to read identifiers from {}",
                location.identifiers.display()
            )
        })?;

        let primary = reader::read_data_table(
            &location.primary,
            &sources.primary_sheet,
            reader::PRIMARY_MIN_COLUMNS,
        )
        .with_context(|| format!("Failed to read devices from {}", location.primary.display()))?;

        let secondary = reader::read_data_table(
            &location.secondary,
            &sources.secondary_sheet,
            reader::SECONDARY_MIN_COLUMNS,
        )
        .with_context(|| format!("Failed to read models from {}", location.secondary.display()))?;

        Ok(Sources {
            identifiers,
            primary,
            secondary,
        })
    }

    /// Find the latest devices of every identifier
    pub fn find_matches(&self, sources: &Sources) -> Vec<IdentifierMatches> {
        Matcher::new(
            &sources.primary,
            &sources.secondary,
            &self.config.rules.model_markers,
        )
        .match_all(&sources.identifiers)
    }

    /// Categorize matches into the final report
    pub fn categorize(&self, matches: &[IdentifierMatches]) -> Report {
        self.categorizer.categorize(matches)
    }

    /// Match and categorize in one step
    pub fn reconcile(&self, sources: &Sources) -> Report {
        self.categorize(&self.find_matches(sources))
    }

    /// Load a location's files and reconcile them
    pub fn reconcile_location(&self, location: &Location) -> Result<Report> {
        let sources = self.load_sources(location)?;
        Ok(self.reconcile(&sources))
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_in_memory() {
        let sources = Sources {
            identifiers: vec!["ABC123".to_string(), "ZZZ999".to_string()],
            primary: Table::from_text_rows(
                "Devices",
                &["Name", "Path1", "Path2", "Unused", "Date"],
                &[&["DEV-LPT-000123", "\\abc123\\path", "", "", "02/01/2024"]],
            ),
            secondary: Table::from_text_rows(
                "Models",
                &["Code", "Unused", "Info"],
                &[&["LPT-000123", "", "Laptop Model X"]],
            ),
        };

        let report = Reconciler::new().reconcile(&sources);
        let rows = report.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "DEV-LPT-000123 (02/01/2024) [Laptop Model X]");
        assert_eq!(rows[0][4], "DEV-LPT-000123 (02/01/2024) [Laptop Model X]");
        assert_eq!(rows[1][1], "No Device Found (01/01/1900) [No Info Found]");
    }
}
