//! Report entries and their tags

use crate::matcher::MatchedDevice;
use std::fmt;

/// Tag for rule-based matches that need human review
pub const MANUAL_ADD_TAG: &str = "*Manual Add*";
/// Tag for devices claimed by more than one identifier
pub const DUPLICATE_TAG: &str = "DUPLICATE";

/// One device as listed in a report column
///
/// Renders as `key (timestamp) [info]`, followed by the manual-add and
/// duplicate tags in that order when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub device: MatchedDevice,
    pub manual_add: bool,
    pub duplicate: bool,
}

impl Entry {
    pub fn new(device: MatchedDevice) -> Self {
        Self {
            device,
            manual_add: false,
            duplicate: false,
        }
    }

    pub fn manual(device: MatchedDevice) -> Self {
        Self {
            manual_add: true,
            ..Self::new(device)
        }
    }

    pub fn key(&self) -> &str {
        &self.device.key
    }

    /// Year of the entry's timestamp, when written as `YYYY-MM-DD HH:MM:SS`
    pub fn year(&self) -> Option<i32> {
        self.device.timestamp.report_year()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [{}]",
            self.device.key, self.device.timestamp, self.device.info
        )?;
        if self.manual_add {
            write!(f, " {}", MANUAL_ADD_TAG)?;
        }
        if self.duplicate {
            write!(f, " {}", DUPLICATE_TAG)?;
        }
        Ok(())
    }
}
