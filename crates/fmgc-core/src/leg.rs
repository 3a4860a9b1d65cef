//! Flight plan leg and element model.
//!
//! A [`FlightPlanLeg`] is one element of a flight plan: a path with an ARINC
//! 424 path-terminator type, display naming and optional pilot annotations
//! (holds, cruise steps). Legs are always built through the named factories
//! on [`FlightPlanLeg`] because the correct ident/annotation/constraint
//! derivation depends on the context that created the leg.
//!
//! A [`FlightPlanElement`] is the closed union of a leg and a
//! [discontinuity](FlightPlanElement::Discontinuity), the explicit marker for
//! a break in path continuity between two legs.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::navdata::{
    Airport, Fix, ProcedureLeg, Runway, TurnDirection, WaypointDescriptor, WaypointFactory,
};
use crate::segment::{SegmentClass, SegmentKind};

/// ARINC 424 leg path-terminator types.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegType {
    /// Arc to fix
    AF,
    /// Course to altitude
    CA,
    /// Course to DME distance
    CD,
    /// Course to fix
    CF,
    /// Course to intercept
    CI,
    /// Course to radial
    CR,
    /// Direct to fix
    DF,
    /// Fix to altitude
    FA,
    /// Fix to distance
    FC,
    /// Fix to DME distance
    FD,
    /// Fix to manual termination
    FM,
    /// Hold to altitude
    HA,
    /// Hold to fix
    HF,
    /// Hold to manual termination
    HM,
    /// Initial fix
    IF,
    /// Procedure turn
    PI,
    /// Radius to fix
    RF,
    /// Track to fix
    #[default]
    TF,
    /// Heading to altitude
    VA,
    /// Heading to DME distance
    VD,
    /// Heading to intercept
    VI,
    /// Heading to manual termination
    VM,
    /// Heading to radial
    VR,
}

/// The procedural definition of a leg. Immutable once the leg is built; the
/// effective type on the leg may diverge from `definition.leg_type` (e.g.
/// after an IF upgrade following a discontinuity).
pub type LegDefinition = ProcedureLeg;

/// Bit-set of special leg markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegFlags(u32);

impl LegFlags {
    /// The synthetic turning point of a direct-to.
    pub const DIRECT_TO_TURNING_POINT: LegFlags = LegFlags(1 << 0);

    pub fn contains(self, other: LegFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: LegFlags) {
        self.0 |= other.0;
    }
}

/// Holding pattern parameters, either database-derived or pilot-entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldData {
    pub inbound_magnetic_course: f64,
    pub turn_direction: TurnDirection,
    /// Leg distance in nautical miles, if distance-defined.
    pub distance: Option<f64>,
    /// Leg time in minutes, if time-defined.
    pub time: Option<f64>,
}

/// A scheduled step climb/descent attached to a leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseStepEntry {
    pub to_altitude: f64,
    pub distance_before_termination: f64,
    pub is_ignored: bool,
}

/// Whether a leg's altitude constraint applies in climb or descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintType {
    Climb,
    Descent,
    #[default]
    Unconstrained,
}

impl ConstraintType {
    /// Default constraint classification for a leg created in a segment.
    /// Missed approach legs are climb-constrained even though the segment is
    /// arrival class.
    pub fn for_segment(kind: SegmentKind) -> Self {
        if kind == SegmentKind::MissedApproach {
            return Self::Climb;
        }

        match kind.class() {
            SegmentClass::Departure => Self::Climb,
            SegmentClass::Arrival => Self::Descent,
            SegmentClass::Enroute => Self::Unconstrained,
        }
    }
}

/// A serialized flight plan leg, the persisted form handed across process or
/// session boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedFlightPlanLeg {
    pub ident: String,
    pub annotation: String,
    pub is_discontinuity: bool,
    pub definition: LegDefinition,
    pub effective_type: LegType,
    pub modified_hold: Option<HoldData>,
    pub default_hold: Option<HoldData>,
    pub cruise_step: Option<CruiseStepEntry>,
}

/// A leg in a flight plan. Not to be confused with a procedure leg, the
/// database shape it is mapped from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPlanLeg {
    /// Effective type; starts as `definition.leg_type` and may be upgraded
    /// (e.g. to IF after a discontinuity).
    #[serde(rename = "type")]
    pub leg_type: LegType,
    pub definition: LegDefinition,
    pub ident: String,
    pub annotation: String,
    pub airway_ident: Option<String>,
    pub flags: LegFlags,
    pub default_hold: Option<HoldData>,
    pub modified_hold: Option<HoldData>,
    pub hold_imm_exit: bool,
    pub constraint_type: ConstraintType,
    pub cruise_step: Option<CruiseStepEntry>,
    /// The segment this leg currently belongs to. Context, not ownership:
    /// moving a leg requires [`FlightPlanLeg::clone_for_segment`].
    pub segment: SegmentKind,
}

impl FlightPlanLeg {
    fn new(
        segment: SegmentKind,
        definition: LegDefinition,
        ident: String,
        annotation: String,
        airway_ident: Option<String>,
    ) -> Self {
        Self {
            leg_type: definition.leg_type,
            definition,
            ident,
            annotation,
            airway_ident,
            flags: LegFlags::default(),
            default_hold: None,
            modified_hold: None,
            hold_imm_exit: false,
            constraint_type: ConstraintType::default(),
            cruise_step: None,
            segment,
        }
    }

    /// Determines whether this leg is a fix-terminating leg (AF, CF, IF, DF,
    /// RF, TF, HF).
    pub fn is_xf(&self) -> bool {
        matches!(
            self.definition.leg_type,
            LegType::AF
                | LegType::CF
                | LegType::IF
                | LegType::DF
                | LegType::RF
                | LegType::TF
                | LegType::HF
        )
    }

    /// Fix-initiated legs (FA, FC, FD, FM).
    pub fn is_fx(&self) -> bool {
        matches!(
            self.definition.leg_type,
            LegType::FA | LegType::FC | LegType::FD | LegType::FM
        )
    }

    /// Holding legs (HA, HF, HM).
    pub fn is_hx(&self) -> bool {
        matches!(
            self.definition.leg_type,
            LegType::HA | LegType::HF | LegType::HM
        )
    }

    /// Legs with a manual (vectors) termination.
    pub fn is_vectors(&self) -> bool {
        matches!(self.definition.leg_type, LegType::FM | LegType::VM)
    }

    /// Whether the leg terminates at a runway fix.
    pub fn is_runway(&self) -> bool {
        self.definition.waypoint_descriptor == Some(WaypointDescriptor::Runway)
    }

    /// Returns the termination waypoint if this is an XF, FX or HX leg,
    /// `None` otherwise (vector legs have no deterministic end point).
    pub fn termination_waypoint(&self) -> Option<&Fix> {
        if !self.is_xf() && !self.is_fx() && !self.is_hx() {
            return None;
        }

        self.definition.waypoint.as_ref()
    }

    /// Determines whether the leg terminates with a specified waypoint.
    /// Only XF legs have a well-defined termination for this purpose.
    pub fn terminates_with_waypoint(&self, waypoint: &Fix) -> bool {
        if !self.is_xf() {
            return false;
        }

        self.definition
            .waypoint
            .as_ref()
            .is_some_and(|it| it.is_same_fix(waypoint))
    }

    /// Copies constraint and path-shape data from another leg's definition,
    /// keeping this leg's own type, waypoint and course.
    pub fn with_definition_from(mut self, other: &FlightPlanLeg) -> Self {
        self.definition.altitude_constraint = other.definition.altitude_constraint;
        self.definition.speed_constraint = other.definition.speed_constraint;
        self.definition.rnp = other.definition.rnp;
        self.definition.overfly = other.definition.overfly;
        self
    }

    /// Copies pilot-entered annotations from another leg.
    pub fn with_pilot_entered_data_from(mut self, other: &FlightPlanLeg) -> Self {
        self.modified_hold = other.modified_hold.clone();
        self.cruise_step = other.cruise_step.clone();
        self.constraint_type = other.constraint_type;
        self
    }

    /// Produces a deep, segment-independent snapshot of this leg.
    pub fn serialize(&self) -> SerializedFlightPlanLeg {
        SerializedFlightPlanLeg {
            ident: self.ident.clone(),
            annotation: self.annotation.clone(),
            is_discontinuity: false,
            definition: self.definition.clone(),
            effective_type: self.leg_type,
            modified_hold: self.modified_hold.clone(),
            default_hold: self.default_hold.clone(),
            cruise_step: self.cruise_step.clone(),
        }
    }

    /// Rebuilds a leg from its serialized form, bound to the given segment.
    pub fn deserialize(serialized: &SerializedFlightPlanLeg, segment: SegmentKind) -> Self {
        let procedure_ident = serialized.definition.procedure_ident.clone();
        let mut leg = Self::from_procedure_leg(segment, serialized.definition.clone(), &procedure_ident);

        leg.ident = serialized.ident.clone();
        leg.annotation = serialized.annotation.clone();
        leg.leg_type = serialized.effective_type;
        leg.modified_hold = serialized.modified_hold.clone();
        leg.default_hold = serialized.default_hold.clone();
        leg.cruise_step = serialized.cruise_step.clone();

        leg
    }

    /// Produces a copy of this leg bound to another segment. Preserves ident,
    /// annotation, effective type, holds and cruise step; only the ownership
    /// context changes.
    pub fn clone_for_segment(&self, segment: SegmentKind) -> Self {
        Self {
            segment,
            ..self.clone()
        }
    }

    /// The synthetic start of a direct-to: a CF leg at the present position.
    pub fn turning_point(
        segment: SegmentKind,
        location: Coordinates,
        magnetic_course: f64,
    ) -> Self {
        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::CF,
                waypoint: Some(WaypointFactory::from_location("T-P", location)),
                magnetic_course: Some(magnetic_course),
                ..Default::default()
            },
            "T-P".to_string(),
            String::new(),
            None,
        )
    }

    /// Alternate form of a direct-to start: a short FC stub along the current
    /// track, used when the turning point must carry a track-out.
    pub fn direct_to_turn_start(
        segment: SegmentKind,
        location: Coordinates,
        magnetic_course: f64,
    ) -> Self {
        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::FC,
                waypoint: Some(WaypointFactory::from_place_bearing_distance(
                    "T-P",
                    location,
                    0.1,
                    magnetic_course,
                )),
                magnetic_course: Some(magnetic_course),
                length: Some(0.1),
                ..Default::default()
            },
            String::new(),
            String::new(),
            None,
        )
    }

    /// The synthetic end of a direct-to: a DF leg onto the target waypoint.
    pub fn direct_to_turn_end(segment: SegmentKind, target_waypoint: Fix) -> Self {
        let ident = target_waypoint.ident.clone();

        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::DF,
                waypoint: Some(target_waypoint),
                ..Default::default()
            },
            ident,
            String::new(),
            None,
        )
    }

    /// A pilot-entered manual hold (HM) at a fix.
    pub fn manual_hold(segment: SegmentKind, waypoint: Fix, hold: &HoldData) -> Self {
        let ident = waypoint.ident.clone();

        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::HM,
                waypoint: Some(waypoint),
                turn_direction: Some(hold.turn_direction),
                magnetic_course: Some(hold.inbound_magnetic_course),
                length: hold.distance,
                length_time: hold.time,
                ..Default::default()
            },
            ident,
            String::new(),
            None,
        )
    }

    /// Maps a procedure leg from the database into a flight plan leg,
    /// deriving display naming and the constraint classification from the
    /// owning segment.
    pub fn from_procedure_leg(
        segment: SegmentKind,
        definition: ProcedureLeg,
        procedure_ident: &str,
    ) -> Self {
        let (ident, annotation) = procedure_leg_ident_and_annotation(&definition, procedure_ident);

        let mut leg = Self::new(segment, definition, ident, annotation, None);
        leg.constraint_type = ConstraintType::for_segment(segment);

        leg
    }

    /// An IF leg anchored at an airport, or at a runway threshold when one is
    /// given. Used for origin and destination legs and for runway-anchored
    /// approach termination.
    pub fn from_airport_and_runway(
        segment: SegmentKind,
        procedure_ident: &str,
        airport: &Airport,
        runway: Option<&Runway>,
    ) -> Self {
        let (waypoint, descriptor, course) = match runway {
            Some(runway) => (
                WaypointFactory::from_airport_and_runway(airport, runway),
                WaypointDescriptor::Runway,
                Some(runway.magnetic_bearing),
            ),
            None => (airport.as_fix(), WaypointDescriptor::Airport, None),
        };

        let ident = waypoint.ident.clone();

        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::IF,
                waypoint: Some(waypoint),
                waypoint_descriptor: Some(descriptor),
                magnetic_course: course,
                ..Default::default()
            },
            ident,
            procedure_ident.to_string(),
            None,
        )
    }

    /// The FA climb-out leg along the runway heading, used when a runway is
    /// selected but no departure procedure is.
    pub fn origin_extended_centerline(segment: SegmentKind, runway_leg: &FlightPlanLeg) -> Self {
        let altitude = runway_leg
            .definition
            .altitude_constraint
            .map_or(1500.0, |it| it.altitude1 + 1500.0);
        let course = runway_leg.definition.magnetic_course.unwrap_or(0.0);

        let prefix: String = runway_leg.ident.chars().take(3).collect();
        let annotation = format!("{prefix}{:03}", course.round() as i64);
        let ident = format!("{:.0}", altitude.round());

        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::FA,
                waypoint: runway_leg.termination_waypoint().cloned(),
                magnetic_course: Some(course),
                altitude_constraint: Some(crate::navdata::AltitudeConstraint {
                    descriptor: crate::navdata::AltitudeDescriptor::AtOrAboveAlt1,
                    altitude1: altitude,
                    altitude2: None,
                }),
                ..Default::default()
            },
            ident,
            annotation,
            None,
        )
    }

    /// An IF fix 5 NM out on the extended centerline of the destination
    /// runway, used to synthesize a flyable approach when none is selected.
    pub fn destination_extended_centerline(
        segment: SegmentKind,
        airport: &Airport,
        runway: &Runway,
    ) -> Self {
        let waypoint = WaypointFactory::from_place_bearing_distance(
            "CF",
            airport.location,
            5.0,
            crate::geo::clamp_angle(runway.bearing + 180.0),
        );
        let ident = waypoint.ident.clone();

        Self::new(
            segment,
            LegDefinition {
                leg_type: LegType::IF,
                waypoint: Some(waypoint),
                ..Default::default()
            },
            ident,
            String::new(),
            None,
        )
    }

    /// A leg onto an enroute fix, TF by default.
    pub fn from_enroute_fix(
        segment: SegmentKind,
        waypoint: Fix,
        airway_ident: Option<&str>,
        leg_type: LegType,
    ) -> Self {
        let ident = waypoint.ident.clone();

        Self::new(
            segment,
            LegDefinition {
                leg_type,
                waypoint: Some(waypoint),
                ..Default::default()
            },
            ident,
            airway_ident.unwrap_or_default().to_string(),
            airway_ident.map(str::to_string),
        )
    }
}

/// Derives the display ident and annotation for a procedure leg.
fn procedure_leg_ident_and_annotation(
    definition: &ProcedureLeg,
    procedure_ident: &str,
) -> (String, String) {
    let ident = if let Some(waypoint) = &definition.waypoint {
        waypoint.ident.clone()
    } else {
        match definition.leg_type {
            LegType::FM | LegType::VM => "MANUAL".to_string(),
            LegType::CI | LegType::VI => "INTCPT".to_string(),
            LegType::PI => "PROC TURN".to_string(),
            LegType::CA | LegType::VA | LegType::FA => definition
                .altitude_constraint
                .map_or_else(|| "ALT".to_string(), |it| format!("{:.0}", it.altitude1)),
            LegType::CR | LegType::VR => definition
                .recommended_navaid
                .as_ref()
                .map_or_else(|| "RADIAL".to_string(), |it| it.ident.clone()),
            _ => definition
                .recommended_navaid
                .as_ref()
                .map_or_else(String::new, |it| it.ident.clone()),
        }
    };

    (ident, procedure_ident.to_string())
}

/// One element of a flight plan: a leg, or an explicit discontinuity marker
/// carrying no data besides its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightPlanElement {
    Leg(FlightPlanLeg),
    Discontinuity,
}

impl FlightPlanElement {
    /// Returns the contained leg, or `None` for a discontinuity.
    pub fn as_leg(&self) -> Option<&FlightPlanLeg> {
        match self {
            Self::Leg(leg) => Some(leg),
            Self::Discontinuity => None,
        }
    }

    pub fn as_leg_mut(&mut self) -> Option<&mut FlightPlanLeg> {
        match self {
            Self::Leg(leg) => Some(leg),
            Self::Discontinuity => None,
        }
    }

    pub fn is_discontinuity(&self) -> bool {
        matches!(self, Self::Discontinuity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navdata::{AltitudeConstraint, AltitudeDescriptor};

    fn fix(ident: &str) -> Fix {
        Fix::new(ident, "ED", Coordinates::new(50.0, 8.5))
    }

    fn tf_leg(ident: &str) -> FlightPlanLeg {
        FlightPlanLeg::from_enroute_fix(SegmentKind::Enroute, fix(ident), None, LegType::TF)
    }

    #[test]
    fn test_xf_classification() {
        assert!(tf_leg("DEBHI").is_xf());

        let hold = HoldData {
            inbound_magnetic_course: 90.0,
            turn_direction: TurnDirection::Right,
            distance: None,
            time: Some(1.0),
        };
        let hm = FlightPlanLeg::manual_hold(SegmentKind::Enroute, fix("DEBHI"), &hold);
        assert!(!hm.is_xf());
        assert!(hm.is_hx());

        let def = LegDefinition {
            leg_type: LegType::VM,
            ..Default::default()
        };
        let vm = FlightPlanLeg::from_procedure_leg(SegmentKind::Departure, def, "DEB7C");
        assert!(vm.is_vectors());
        assert_eq!(vm.ident, "MANUAL");
        assert!(vm.termination_waypoint().is_none());
    }

    #[test]
    fn test_terminates_with_waypoint_needs_identity_match() {
        let leg = tf_leg("DEBHI");

        assert!(leg.terminates_with_waypoint(&fix("DEBHI")));
        assert!(!leg.terminates_with_waypoint(&fix("OTHER")));

        // Same ident, different region: not the same fix
        let foreign = Fix::new("DEBHI", "LF", Coordinates::new(48.0, 2.0));
        assert!(!leg.terminates_with_waypoint(&foreign));
    }

    #[test]
    fn test_constraint_type_from_segment() {
        let def = ProcedureLeg {
            leg_type: LegType::CF,
            waypoint: Some(fix("DF407")),
            ..Default::default()
        };

        let dep = FlightPlanLeg::from_procedure_leg(SegmentKind::Departure, def.clone(), "DEB7C");
        assert_eq!(dep.constraint_type, ConstraintType::Climb);

        let arr = FlightPlanLeg::from_procedure_leg(SegmentKind::Arrival, def.clone(), "DEB1A");
        assert_eq!(arr.constraint_type, ConstraintType::Descent);

        let missed =
            FlightPlanLeg::from_procedure_leg(SegmentKind::MissedApproach, def, "I07C");
        assert_eq!(missed.constraint_type, ConstraintType::Climb);
    }

    #[test]
    fn test_serialize_deserialize_is_idempotent() {
        let mut leg = tf_leg("DEBHI");
        leg.leg_type = LegType::IF;
        leg.modified_hold = Some(HoldData {
            inbound_magnetic_course: 270.0,
            turn_direction: TurnDirection::Left,
            distance: Some(4.0),
            time: None,
        });
        leg.cruise_step = Some(CruiseStepEntry {
            to_altitude: 36000.0,
            distance_before_termination: 12.0,
            is_ignored: false,
        });
        leg.definition.altitude_constraint = Some(AltitudeConstraint {
            descriptor: AltitudeDescriptor::AtOrBelowAlt1,
            altitude1: 5000.0,
            altitude2: None,
        });

        let serialized = leg.serialize();
        let roundtripped = FlightPlanLeg::deserialize(&serialized, SegmentKind::Enroute);

        assert_eq!(roundtripped.serialize(), serialized);
        assert_eq!(roundtripped.leg_type, LegType::IF);
    }

    #[test]
    fn test_origin_centerline_annotation_survives_multibyte_idents() {
        let mut runway = tf_leg("ÅÅ7C");
        runway.definition.magnetic_course = Some(69.0);

        let climb_out =
            FlightPlanLeg::origin_extended_centerline(SegmentKind::Departure, &runway);

        assert_eq!(climb_out.leg_type, LegType::FA);
        assert_eq!(climb_out.annotation, "ÅÅ7069");
        assert_eq!(climb_out.ident, "1500");
    }

    #[test]
    fn test_clone_rebinds_segment_only() {
        let leg = tf_leg("DEBHI");
        let clone = leg.clone_for_segment(SegmentKind::Arrival);

        assert_eq!(clone.segment, SegmentKind::Arrival);
        assert_eq!(clone.serialize(), leg.serialize());
    }
}
