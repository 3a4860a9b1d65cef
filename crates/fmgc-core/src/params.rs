//! Parameter structs for operations taking external inputs.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// The aircraft state a direct-to needs: where the aircraft is and which way
/// it is tracking. All values come from the surrounding avionics; the engine
/// never reads sensors itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentPosition {
    pub coordinates: Coordinates,
    /// True track in degrees.
    pub true_track: f64,
    /// Local magnetic variation in degrees, east positive.
    pub magnetic_variation: f64,
}
