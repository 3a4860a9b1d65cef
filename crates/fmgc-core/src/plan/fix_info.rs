//! Pilot-entered fix info: reference fixes with radii and radials drawn on
//! the navigation display.

use serde::{Deserialize, Serialize};

use crate::navdata::Fix;

/// Number of fix info slots on the FIX INFO page.
pub const FIX_INFO_SLOTS: usize = 4;

/// One fix info entry: a reference fix plus the circles and bearings to
/// display around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixInfoEntry {
    pub fix: Fix,
    /// Circle radii around the fix, in nautical miles.
    pub radii: Vec<f64>,
    /// Magnetic radials from the fix, in degrees.
    pub radials: Vec<f64>,
}
