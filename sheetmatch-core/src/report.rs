//! Categorized per-identifier reports

use crate::config::RulesConfig;
use crate::entry::Entry;
use crate::matcher::IdentifierMatches;
use crate::rules::{Category, CategoryRule, registry};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Separator between entries inside one report cell
pub const ENTRY_SEPARATOR: &str = ";\n ";

/// Entries of one identifier, split by column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierReport {
    pub identifier: String,
    pub original: Vec<Entry>,
    pub category1: Vec<Entry>,
    pub category2: Vec<Entry>,
    pub category3: Vec<Entry>,
}

impl IdentifierReport {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn category(&self, category: Category) -> &[Entry] {
        match category {
            Category::Category1 => &self.category1,
            Category::Category2 => &self.category2,
            Category::Category3 => &self.category3,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut Vec<Entry> {
        match category {
            Category::Category1 => &mut self.category1,
            Category::Category2 => &mut self.category2,
            Category::Category3 => &mut self.category3,
        }
    }

    /// All entries of all columns, original first
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.original
            .iter()
            .chain(&self.category1)
            .chain(&self.category2)
            .chain(&self.category3)
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.original
            .iter_mut()
            .chain(self.category1.iter_mut())
            .chain(self.category2.iter_mut())
            .chain(self.category3.iter_mut())
    }

    /// Whether the identifier matched no device at all
    pub fn is_not_found(&self) -> bool {
        !self.original.is_empty() && self.original.iter().all(|e| e.device.is_not_found())
    }

    /// CSV row: identifier, then each column joined with [`ENTRY_SEPARATOR`]
    pub fn to_row(&self) -> [String; 5] {
        [
            self.identifier.clone(),
            join_entries(&self.original),
            join_entries(&self.category1),
            join_entries(&self.category2),
            join_entries(&self.category3),
        ]
    }
}

pub fn join_entries(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Reports for all identifiers, ordered by identifier
#[derive(Debug, Clone, Default)]
pub struct Report {
    reports: BTreeMap<String, IdentifierReport>,
    owners: HashMap<String, BTreeSet<String>>,
}

impl Report {
    pub fn identifiers(&self) -> impl Iterator<Item = &IdentifierReport> {
        self.reports.values()
    }

    pub fn get(&self, identifier: &str) -> Option<&IdentifierReport> {
        self.reports.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Identifiers a device key was found under
    pub fn owners_of(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.owners.get(key)
    }

    /// Device keys claimed by more than one identifier, sorted
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .owners
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Rows for the CSV writer, sorted by identifier
    pub fn rows(&self) -> Vec<[String; 5]> {
        self.reports.values().map(IdentifierReport::to_row).collect()
    }

    pub fn summary(&self) -> ReportSummary {
        let count = |category: Category| -> usize {
            self.reports
                .values()
                .map(|r| r.category(category).len())
                .sum()
        };

        ReportSummary {
            identifiers: self.reports.len(),
            not_found: self.reports.values().filter(|r| r.is_not_found()).count(),
            duplicate_keys: self.duplicate_keys().len(),
            category1: count(Category::Category1),
            category2: count(Category::Category2),
            category3: count(Category::Category3),
        }
    }
}

/// Counts shown at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub identifiers: usize,
    pub not_found: usize,
    pub duplicate_keys: usize,
    pub category1: usize,
    pub category2: usize,
    pub category3: usize,
}

/// Sorts matched devices into report columns
pub struct Categorizer {
    rules: Vec<Box<dyn CategoryRule>>,
}

impl Categorizer {
    /// Create a categorizer with the standard rules
    pub fn new(config: &RulesConfig) -> Self {
        Self::with_rules(registry::create_rules(config))
    }

    pub fn with_rules(rules: Vec<Box<dyn CategoryRule>>) -> Self {
        Self { rules }
    }

    /// Build the report: categorize, keep the most recent year, mark duplicates
    pub fn categorize(&self, matches: &[IdentifierMatches]) -> Report {
        let mut reports: BTreeMap<String, IdentifierReport> = BTreeMap::new();
        let mut owners: HashMap<String, BTreeSet<String>> = HashMap::new();

        for item in matches {
            if item.devices.is_empty() {
                debug!("No devices for '{}'", item.identifier);
            }

            let report = reports
                .entry(item.identifier.clone())
                .or_insert_with(|| IdentifierReport::new(item.identifier.as_str()));

            for device in &item.devices {
                if !device.is_not_found() {
                    owners
                        .entry(device.key.clone())
                        .or_default()
                        .insert(item.identifier.clone());
                }

                report.original.push(Entry::new(device.clone()));

                for rule in &self.rules {
                    if rule.matches(device) {
                        let entry = if rule.manual_add() {
                            Entry::manual(device.clone())
                        } else {
                            Entry::new(device.clone())
                        };
                        report.category_mut(rule.category()).push(entry);
                    }
                }
            }

            for category in Category::ALL {
                filter_by_recent_year(report.category_mut(category));
            }
        }

        mark_duplicates(&mut reports, &owners);

        Report { reports, owners }
    }
}

/// Keep only entries from the most recent year present.
///
/// Entries whose timestamp is not `YYYY-MM-DD HH:MM:SS` have no year; they are
/// dropped whenever some other entry has one, and kept when none does.
pub fn filter_by_recent_year(entries: &mut Vec<Entry>) {
    let Some(latest) = entries.iter().filter_map(Entry::year).max() else {
        return;
    };
    entries.retain(|entry| entry.year() == Some(latest));
}

/// Tag every entry whose device key belongs to more than one identifier
fn mark_duplicates(
    reports: &mut BTreeMap<String, IdentifierReport>,
    owners: &HashMap<String, BTreeSet<String>>,
) {
    for report in reports.values_mut() {
        for entry in report.entries_mut() {
            if owners.get(entry.key()).is_some_and(|ids| ids.len() > 1) {
                entry.duplicate = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelKeywordConfig, NamedRange};
    use crate::entry::{DUPLICATE_TAG, MANUAL_ADD_TAG};
    use crate::matcher::MatchedDevice;
    use crate::timestamp::Timestamp;

    fn rules() -> RulesConfig {
        RulesConfig {
            manual_keywords: vec!["kiosk".to_string()],
            ranges: vec![NamedRange {
                name: "Courtroom".to_string(),
                start: 100000,
                end: 100999,
            }],
            model_keyword: Some(ModelKeywordConfig {
                keyword: "tablet".to_string(),
                excluded_key: Some("shr".to_string()),
            }),
            ..RulesConfig::default()
        }
    }

    fn device(key: &str, date: &str, info: &str) -> MatchedDevice {
        MatchedDevice::new(key, Timestamp::parse(date), info)
    }

    fn matches(identifier: &str, devices: Vec<MatchedDevice>) -> IdentifierMatches {
        IdentifierMatches {
            identifier: identifier.to_string(),
            devices,
        }
    }

    fn texts(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_not_found_identifier() {
        let report = Categorizer::new(&rules())
            .categorize(&[matches("ABC", vec![MatchedDevice::not_found()])]);

        let abc = report.get("ABC").unwrap();
        assert_eq!(
            texts(&abc.original),
            vec!["No Device Found (01/01/1900) [No Info Found]"]
        );
        assert!(abc.is_not_found());
        assert!(abc.category1.is_empty() && abc.category2.is_empty() && abc.category3.is_empty());
    }

    #[test]
    fn test_placeholder_is_never_a_duplicate() {
        let report = Categorizer::new(&rules()).categorize(&[
            matches("A", vec![MatchedDevice::not_found()]),
            matches("B", vec![MatchedDevice::not_found()]),
        ]);

        assert!(report.duplicate_keys().is_empty());
        for r in report.identifiers() {
            assert!(!r.original[0].duplicate);
        }
    }

    #[test]
    fn test_categories_and_manual_tag() {
        let report = Categorizer::new(&rules()).categorize(&[matches(
            "ID1",
            vec![
                device("DEV-DPC-000001", "2024-01-01 00:00:00", "Lobby Kiosk"),
                device("DEV-DPC-100200", "2024-02-01 00:00:00", "Desktop"),
                device("DEV-DPC-000003", "2024-03-01 00:00:00", "Tablet 8"),
                device("DEV-SHR-000004", "2024-03-01 00:00:00", "Tablet 8"),
                device("DEV-LPT-000005", "2024-04-01 00:00:00", "Kiosk Laptop"),
            ],
        )]);

        let r = report.get("ID1").unwrap();
        assert_eq!(r.original.len(), 5);
        assert_eq!(
            r.category1.iter().map(Entry::key).collect::<Vec<_>>(),
            vec!["DEV-DPC-000001", "DEV-DPC-100200", "DEV-LPT-000005"]
        );
        assert_eq!(
            r.category2.iter().map(Entry::key).collect::<Vec<_>>(),
            vec!["DEV-DPC-000003"]
        );
        assert_eq!(
            r.category3.iter().map(Entry::key).collect::<Vec<_>>(),
            vec!["DEV-LPT-000005"]
        );

        for entry in r.category1.iter().chain(&r.category2) {
            assert!(entry.to_string().ends_with(MANUAL_ADD_TAG));
        }
        for entry in r.category3.iter().chain(&r.original) {
            assert!(!entry.to_string().contains(MANUAL_ADD_TAG));
        }
    }

    #[test]
    fn test_year_filter_keeps_latest_year() {
        let mut entries = vec![
            Entry::new(device("A", "2023-05-01 00:00:00", "x")),
            Entry::new(device("B", "2024-01-01 00:00:00", "x")),
            Entry::new(device("C", "02/01/2024", "x")),
            Entry::new(device("D", "2024-12-31 23:59:59", "x")),
        ];
        let before = entries.len();
        filter_by_recent_year(&mut entries);

        assert!(entries.len() <= before);
        assert_eq!(entries.iter().map(Entry::key).collect::<Vec<_>>(), vec!["B", "D"]);
    }

    #[test]
    fn test_year_filter_without_parseable_years() {
        let mut entries = vec![
            Entry::new(device("A", "01/01/2023", "x")),
            Entry::new(device("B", "02/01/2024", "x")),
        ];
        filter_by_recent_year(&mut entries);
        assert_eq!(entries.len(), 2);

        let mut empty: Vec<Entry> = Vec::new();
        filter_by_recent_year(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_year_filter_skips_original() {
        let report = Categorizer::new(&rules()).categorize(&[matches(
            "ID1",
            vec![
                device("DEV-DPC-000001", "2022-01-01 00:00:00", "Kiosk"),
                device("DEV-DPC-000002", "2024-01-01 00:00:00", "Kiosk"),
            ],
        )]);

        let r = report.get("ID1").unwrap();
        assert_eq!(r.original.len(), 2);
        assert_eq!(r.category1.len(), 1);
        assert_eq!(r.category1[0].key(), "DEV-DPC-000002");
    }

    #[test]
    fn test_duplicates_marked_everywhere() {
        let shared = device("DEV-DPC-000001", "2024-01-01 00:00:00", "Kiosk");
        let report = Categorizer::new(&rules()).categorize(&[
            matches("B", vec![shared.clone()]),
            matches(
                "A",
                vec![shared, device("DEV-LPT-000009", "2024-01-01 00:00:00", "x")],
            ),
        ]);

        assert_eq!(report.duplicate_keys(), vec!["DEV-DPC-000001"]);
        assert_eq!(
            report.owners_of("DEV-DPC-000001").map(|ids| ids.len()),
            Some(2)
        );

        for r in report.identifiers() {
            for entry in r.entries() {
                let text = entry.to_string();
                if entry.key() == "DEV-DPC-000001" {
                    assert!(text.ends_with(DUPLICATE_TAG), "{}", text);
                } else {
                    assert!(!text.contains(DUPLICATE_TAG), "{}", text);
                }
            }
        }

        let a = report.get("A").unwrap();
        assert_eq!(
            a.category1[0].to_string(),
            "DEV-DPC-000001 (2024-01-01 00:00:00) [Kiosk] *Manual Add* DUPLICATE"
        );
    }

    #[test]
    fn test_rows_sorted_by_identifier() {
        let report = Categorizer::new(&rules()).categorize(&[
            matches("Z9", vec![MatchedDevice::not_found()]),
            matches(
                "A1",
                vec![
                    device("DEV-DPC-000001", "01/01/2024", "Desktop"),
                    device("DEV-DPC-000002", "01/02/2024", "Desktop"),
                ],
            ),
        ]);

        let rows = report.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "A1");
        assert_eq!(
            rows[0][1],
            "DEV-DPC-000001 (01/01/2024) [Desktop];\n DEV-DPC-000002 (01/02/2024) [Desktop]"
        );
        assert_eq!(rows[0][2], "");
        assert_eq!(rows[1][0], "Z9");
    }

    #[test]
    fn test_empty_device_list_gives_empty_row() {
        let report = Categorizer::new(&rules()).categorize(&[
            matches("EMPTY", Vec::new()),
            matches("OK", vec![MatchedDevice::not_found()]),
        ]);
        assert_eq!(report.len(), 2);

        let empty = report.get("EMPTY").unwrap();
        assert!(empty.original.is_empty());
        assert!(!empty.is_not_found());

        let rows = report.rows();
        assert_eq!(rows[0], ["EMPTY", "", "", "", ""].map(String::from));
        assert_eq!(report.summary().not_found, 1);
    }

    #[test]
    fn test_duplicate_key_with_spaces() {
        let shared = device("DEV LPT 000001", "2024-01-01 00:00:00", "Kiosk");
        let report = Categorizer::new(&rules()).categorize(&[
            matches("A", vec![shared.clone()]),
            matches("B", vec![shared]),
            matches("C", vec![device("DEV LPT 000002", "2024-01-01 00:00:00", "Kiosk")]),
        ]);

        assert_eq!(report.duplicate_keys(), vec!["DEV LPT 000001"]);
        assert!(report.get("A").unwrap().original[0].duplicate);
        assert!(report.get("B").unwrap().original[0].duplicate);
        assert!(!report.get("C").unwrap().original[0].duplicate);
    }

    #[test]
    fn test_summary() {
        let report = Categorizer::new(&rules()).categorize(&[
            matches("A", vec![device("DEV-LPT-000001", "2024-01-01 00:00:00", "Kiosk")]),
            matches("B", vec![device("DEV-LPT-000001", "2024-01-01 00:00:00", "Kiosk")]),
            matches("C", vec![MatchedDevice::not_found()]),
        ]);

        let summary = report.summary();
        assert_eq!(summary.identifiers, 3);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.duplicate_keys, 1);
        assert_eq!(summary.category1, 2);
        assert_eq!(summary.category2, 0);
        assert_eq!(summary.category3, 2);
    }
}
