//! Printer profile configuration
//!
//! A profile describes the fixed pitch geometry of a target printer:
//! how many characters fit on one line at each of the three supported
//! pitches. Profiles are plain serde documents so deployments can keep
//! them in JSON config next to the device address.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProfileError, ProfileResult};

/// Physical printer class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterType {
    /// 9-pin impact head (LX class)
    #[default]
    NinePin,
    /// 24-pin impact head (LQ class)
    TwentyFourPin,
}

/// Fixed pitch geometry for a target printer
///
/// Widths are line capacities in characters. Common carriages:
/// - 80-column (8" line): 80 / 96 / 120
/// - 40-column (76mm roll): 33 / 40 / 50
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterProfile {
    #[serde(default)]
    pub printer_type: PrinterType,
    /// Line width at 10 cpi (pica)
    pub width10: usize,
    /// Line width at 12 cpi (elite)
    pub width12: usize,
    /// Line width at 15 cpi (condensed)
    pub width15: usize,
}

impl Default for PrinterProfile {
    /// 80-column carriage
    fn default() -> Self {
        Self {
            printer_type: PrinterType::NinePin,
            width10: 80,
            width12: 96,
            width15: 120,
        }
    }
}

impl PrinterProfile {
    /// Parse and validate a profile from a JSON document
    pub fn from_json(json: &str) -> ProfileResult<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        debug!(?profile, "printer profile loaded");
        Ok(profile)
    }

    /// Reject geometry the encoder cannot lay text out on
    pub fn validate(&self) -> ProfileResult<()> {
        for (pitch, width) in [(10, self.width10), (12, self.width12), (15, self.width15)] {
            if width == 0 {
                return Err(ProfileError::InvalidWidth { pitch, width });
            }
        }
        Ok(())
    }
}
