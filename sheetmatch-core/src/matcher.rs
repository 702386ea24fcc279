//! Identifier matching against the device and model tables

use crate::reader::Table;
use crate::timestamp::Timestamp;
use log::{debug, warn};
use std::collections::HashMap;

/// Placeholder device reported when an identifier matches nothing
pub const NO_DEVICE_KEY: &str = "No Device Found";
pub const NO_DEVICE_DATE: &str = "01/01/1900";
pub const NO_DEVICE_INFO: &str = "No Info Found";

/// Model code of a device key without any marker
pub const NO_MODEL_CODE: &str = "No Substring Found";
/// Info text of a model code absent from the lookup table
pub const NO_MODEL_INFO: &str = "No Match Found";

/// Number of trailing key characters identifying a physical device
pub const SUFFIX_LEN: usize = 6;

// Device table columns
const KEY_COL: usize = 0;
const SEARCH_COLS: [usize; 2] = [1, 2];
const TIMESTAMP_COL: usize = 4;

// Model table columns
const MODEL_CODE_COL: usize = 0;
const MODEL_INFO_COL: usize = 2;

/// Resolved attributes of one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDevice {
    pub key: String,
    pub timestamp: Timestamp,
    pub info: String,
}

impl MatchedDevice {
    pub fn new(key: impl Into<String>, timestamp: Timestamp, info: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            timestamp,
            info: info.into(),
        }
    }

    /// The placeholder used when nothing matched
    pub fn not_found() -> Self {
        Self::new(NO_DEVICE_KEY, Timestamp::parse(NO_DEVICE_DATE), NO_DEVICE_INFO)
    }

    pub fn is_not_found(&self) -> bool {
        self.key == NO_DEVICE_KEY
    }

    pub fn suffix(&self) -> &str {
        key_suffix(&self.key)
    }
}

/// All devices found for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierMatches {
    pub identifier: String,
    pub devices: Vec<MatchedDevice>,
}

/// Case-insensitive index from model code to info text
#[derive(Debug, Clone, Default)]
pub struct ModelIndex {
    info_by_code: HashMap<String, String>,
}

impl ModelIndex {
    pub fn from_table(table: &Table) -> Self {
        let mut info_by_code = HashMap::new();
        for row in 0..table.rows.len() {
            // First row wins for repeated codes
            info_by_code
                .entry(table.text(row, MODEL_CODE_COL).to_lowercase())
                .or_insert_with(|| table.text(row, MODEL_INFO_COL));
        }
        Self { info_by_code }
    }

    pub fn lookup(&self, model_code: &str) -> &str {
        self.info_by_code
            .get(&model_code.to_lowercase())
            .map(String::as_str)
            .unwrap_or(NO_MODEL_INFO)
    }
}

/// Finds device records for identifiers
pub struct Matcher<'a> {
    primary: &'a Table,
    models: ModelIndex,
    markers: Vec<String>,
}

impl<'a> Matcher<'a> {
    pub fn new(primary: &'a Table, secondary: &Table, markers: &[String]) -> Self {
        Self {
            primary,
            models: ModelIndex::from_table(secondary),
            markers: markers.iter().map(|m| m.to_uppercase()).collect(),
        }
    }

    /// Match every identifier, keeping input order
    pub fn match_all(&self, identifiers: &[String]) -> Vec<IdentifierMatches> {
        identifiers
            .iter()
            .map(|identifier| IdentifierMatches {
                identifier: identifier.clone(),
                devices: self.match_identifier(identifier),
            })
            .collect()
    }

    /// Latest device per key suffix, or the placeholder when nothing matches
    pub fn match_identifier(&self, identifier: &str) -> Vec<MatchedDevice> {
        let search_key = format!("\\{}", identifier).to_lowercase();
        let mut found = Vec::new();

        for row in 0..self.primary.rows.len() {
            let is_match = SEARCH_COLS.iter().any(|&col| {
                self.primary
                    .text(row, col)
                    .to_lowercase()
                    .contains(&search_key)
            });
            if !is_match {
                continue;
            }

            let key = self.primary.text(row, KEY_COL);
            if key.is_empty() {
                warn!(
                    "Skipping row {} of sheet '{}': empty device key",
                    row + 2,
                    self.primary.sheet
                );
                continue;
            }

            let model_code = extract_model_code(&key, &self.markers);
            let info = self.models.lookup(&model_code).to_string();
            debug!("{}: matched {} (model {} -> {})", identifier, key, model_code, info);

            let timestamp = Timestamp::from_cell(self.primary.cell(row, TIMESTAMP_COL));
            found.push(MatchedDevice::new(key, timestamp, info));
        }

        let devices = latest_by_suffix(latest_by_key(found));
        if devices.is_empty() {
            vec![MatchedDevice::not_found()]
        } else {
            devices
        }
    }
}

/// Model code: the device key upper-cased, from the first marker found
///
/// Markers are tried in priority order, so a key containing both uses the
/// first marker of the list even when the second appears earlier.
pub fn extract_model_code(key: &str, markers: &[String]) -> String {
    let upper = key.to_uppercase();
    markers
        .iter()
        .find_map(|marker| upper.find(&marker.to_uppercase()))
        .map(|index| upper[index..].to_string())
        .unwrap_or_else(|| NO_MODEL_CODE.to_string())
}

/// Last six characters of a key, or the whole key when shorter
pub fn key_suffix(key: &str) -> &str {
    match key.char_indices().rev().nth(SUFFIX_LEN - 1) {
        Some((index, _)) => &key[index..],
        None => key,
    }
}

/// One device per full key, keeping the latest timestamp
pub fn latest_by_key(devices: Vec<MatchedDevice>) -> Vec<MatchedDevice> {
    keep_latest(devices, |d| d.key.as_str())
}

/// One device per key suffix, keeping the latest timestamp
pub fn latest_by_suffix(devices: Vec<MatchedDevice>) -> Vec<MatchedDevice> {
    keep_latest(devices, MatchedDevice::suffix)
}

/// Reduce to one device per group, in first-seen group order; ties keep the earlier device
fn keep_latest<F>(devices: Vec<MatchedDevice>, group: F) -> Vec<MatchedDevice>
where
    F: Fn(&MatchedDevice) -> &str,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<MatchedDevice> = Vec::new();

    for device in devices {
        match positions.get(group(&device)) {
            Some(&index) => {
                if device.timestamp.is_later_than(&kept[index].timestamp) {
                    kept[index] = device;
                }
            }
            None => {
                positions.insert(group(&device).to_string(), kept.len());
                kept.push(device);
            }
        }
    }

    kept
}
