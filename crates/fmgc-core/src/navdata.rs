//! Navigation database interface and record types.
//!
//! The database is an external, read-only data provider. The engine consumes
//! it through the [`NavigationDatabase`] trait; lookups are blocking and the
//! plan's async operations run them on the blocking thread pool.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::{self, Coordinates};

/// Identity of a fix: ident plus location code. Two fixes are the same
/// navigation point exactly when both components match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    pub ident: String,
    /// ICAO two-letter location/region code, e.g. "ED" for Germany.
    pub icao_code: String,
    pub location: Coordinates,
}

impl Fix {
    pub fn new(ident: impl Into<String>, icao_code: impl Into<String>, location: Coordinates) -> Self {
        Self {
            ident: ident.into(),
            icao_code: icao_code.into(),
            location,
        }
    }

    /// Composite-key identity comparison (ident + location code).
    pub fn is_same_fix(&self, other: &Fix) -> bool {
        self.ident == other.ident && self.icao_code == other.icao_code
    }
}

/// Factory for synthetic fixes that do not come from the database (turning
/// points, extended centerline anchors, runway thresholds).
pub struct WaypointFactory;

impl WaypointFactory {
    /// Creates a fix at an arbitrary location, e.g. the present position.
    pub fn from_location(ident: &str, location: Coordinates) -> Fix {
        Fix::new(ident, "", location)
    }

    /// Creates a fix projected from a place along a bearing for a distance.
    pub fn from_place_bearing_distance(
        ident: &str,
        place: Coordinates,
        distance_nm: f64,
        bearing: f64,
    ) -> Fix {
        Fix::new(ident, "", geo::place_bearing_distance(place, bearing, distance_nm))
    }

    /// Creates a fix at a runway threshold, named `<airport><runway>`,
    /// e.g. "EDDF07C".
    pub fn from_airport_and_runway(airport: &Airport, runway: &Runway) -> Fix {
        Fix::new(
            format!("{}{}", airport.ident, runway.number_ident()),
            airport.icao_code.clone(),
            runway.threshold_location,
        )
    }
}

/// An airport record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub ident: String,
    pub icao_code: String,
    pub location: Coordinates,
    /// Field elevation in feet.
    pub elevation: f64,
}

impl Airport {
    /// The airport itself as an enroute-usable fix.
    pub fn as_fix(&self) -> Fix {
        Fix::new(self.ident.clone(), self.icao_code.clone(), self.location)
    }
}

/// A runway record. Idents use the "RWxx" database convention ("RW07C").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runway {
    pub ident: String,
    pub airport_ident: String,
    pub threshold_location: Coordinates,
    pub bearing: f64,
    pub magnetic_bearing: f64,
    /// Threshold elevation in feet.
    pub elevation: f64,
}

impl Runway {
    /// The runway ident without the "RW" prefix, e.g. "07C".
    pub fn number_ident(&self) -> &str {
        self.ident.strip_prefix("RW").unwrap_or(&self.ident)
    }
}

/// ARINC 424 altitude constraint descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeDescriptor {
    AtAlt1,
    AtOrAboveAlt1,
    AtOrBelowAlt1,
    BetweenAlt1Alt2,
    AtOrAboveAlt2,
}

/// An altitude constraint attached to a procedure leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltitudeConstraint {
    pub descriptor: AltitudeDescriptor,
    pub altitude1: f64,
    pub altitude2: Option<f64>,
}

/// Speed constraint descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedDescriptor {
    Mandatory,
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedConstraint {
    pub descriptor: SpeedDescriptor,
    pub speed: f64,
}

/// Direction of a turn prescribed by a procedure leg or hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

/// What kind of point a procedure leg terminates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointDescriptor {
    Airport,
    Runway,
    Navaid,
    Essential,
}

/// One leg of a procedure as returned by the navigation database.
///
/// This is the externally owned, immutable shape that
/// [`crate::leg::FlightPlanLeg::from_procedure_leg`] maps into the plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureLeg {
    #[serde(rename = "type")]
    pub leg_type: crate::leg::LegType,
    pub waypoint: Option<Fix>,
    pub waypoint_descriptor: Option<WaypointDescriptor>,
    pub recommended_navaid: Option<Fix>,
    pub magnetic_course: Option<f64>,
    /// Leg length in nautical miles, for distance-terminated legs and holds.
    pub length: Option<f64>,
    /// Leg time in minutes, for time-terminated holds.
    pub length_time: Option<f64>,
    pub altitude_constraint: Option<AltitudeConstraint>,
    pub speed_constraint: Option<SpeedConstraint>,
    pub turn_direction: Option<TurnDirection>,
    pub overfly: bool,
    pub rnp: Option<f64>,
    pub procedure_ident: String,
}

/// A transition (runway or enroute) belonging to a SID, STAR or approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureTransition {
    pub ident: String,
    pub legs: Vec<ProcedureLeg>,
}

/// A SID record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub ident: String,
    pub common_legs: Vec<ProcedureLeg>,
    pub runway_transitions: Vec<ProcedureTransition>,
    pub enroute_transitions: Vec<ProcedureTransition>,
}

/// A STAR record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub ident: String,
    pub common_legs: Vec<ProcedureLeg>,
    pub runway_transitions: Vec<ProcedureTransition>,
    pub enroute_transitions: Vec<ProcedureTransition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApproachType {
    Ils,
    Gps,
    Rnav,
    Vor,
    VorDme,
    Ndb,
    Loc,
    Unknown,
}

/// An approach record, including its missed-approach legs and vias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approach {
    pub ident: String,
    #[serde(rename = "type")]
    pub approach_type: ApproachType,
    /// Runway served by this approach, "RWxx" convention.
    pub runway_ident: Option<String>,
    pub legs: Vec<ProcedureLeg>,
    pub missed_legs: Vec<ProcedureLeg>,
    /// Approach vias (transitions from a feeder fix onto the final).
    pub transitions: Vec<ProcedureTransition>,
}

/// Read-only navigation data provider.
///
/// Implementations may block (file-backed navdata readers typically do); the
/// plan invokes them through `tokio::task::spawn_blocking`. Lookups return
/// the full set for an airport; turning a missing identifier into a domain
/// error is the caller's responsibility.
pub trait NavigationDatabase: Send + Sync {
    fn get_airport(&self, ident: &str) -> Result<Option<Airport>>;
    fn get_runways(&self, airport_ident: &str) -> Result<Vec<Runway>>;
    fn get_departures(&self, airport_ident: &str) -> Result<Vec<Departure>>;
    fn get_arrivals(&self, airport_ident: &str) -> Result<Vec<Arrival>>;
    fn get_approaches(&self, airport_ident: &str) -> Result<Vec<Approach>>;
}

/// Shared handle to a navigation database.
pub type DatabaseHandle = Arc<dyn NavigationDatabase>;
