//! Two-line element sets as they come out of a catalog.

use crate::{OrbitalError, Result};
use serde::{Deserialize, Serialize};

/// One catalog entry: a display name plus the two raw TLE lines.
///
/// The lines are kept verbatim; nothing is validated until [`ElementSet::parse`]
/// is called, so a malformed entry only fails the unit of work that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSet {
    pub name: String,
    pub tle_line1: String,
    pub tle_line2: String,
}

impl ElementSet {
    pub fn new(name: impl Into<String>, tle_line1: impl Into<String>, tle_line2: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tle_line1: tle_line1.into(),
            tle_line2: tle_line2.into(),
        }
    }

    /// NORAD catalog number from columns 3-7 of line 1, if present.
    pub fn norad_id(&self) -> Option<u32> {
        self.tle_line1.get(2..7)?.trim().parse().ok()
    }

    /// Parse the raw lines into SGP4 mean elements.
    pub fn parse(&self) -> Result<sgp4::Elements> {
        sgp4::Elements::from_tle(
            Some(self.name.clone()),
            self.tle_line1.trim_end().as_bytes(),
            self.tle_line2.trim_end().as_bytes(),
        )
        .map_err(|e| OrbitalError::InvalidTle(format!("{}: {:?}", self.name, e)))
    }
}
