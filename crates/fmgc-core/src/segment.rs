//! Flight plan segments.
//!
//! A segment is a contiguous, phase-scoped group of legs. Concatenating all
//! segments in [`SegmentKind::ALL`] order yields the complete flight plan
//! sequence with no overlap and no gaps in index space.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::leg::{FlightPlanElement, FlightPlanLeg, SerializedFlightPlanLeg};
use crate::navdata::{Approach, Arrival, Departure, ProcedureTransition};

/// The flight phase a segment belongs to, in canonical plan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Origin,
    DepartureRunwayTransition,
    Departure,
    DepartureEnrouteTransition,
    Enroute,
    ArrivalEnrouteTransition,
    Arrival,
    ArrivalRunwayTransition,
    ApproachVia,
    Approach,
    Destination,
    MissedApproach,
}

impl SegmentKind {
    /// All segment kinds in canonical concatenation order.
    pub const ALL: [SegmentKind; 12] = [
        SegmentKind::Origin,
        SegmentKind::DepartureRunwayTransition,
        SegmentKind::Departure,
        SegmentKind::DepartureEnrouteTransition,
        SegmentKind::Enroute,
        SegmentKind::ArrivalEnrouteTransition,
        SegmentKind::Arrival,
        SegmentKind::ArrivalRunwayTransition,
        SegmentKind::ApproachVia,
        SegmentKind::Approach,
        SegmentKind::Destination,
        SegmentKind::MissedApproach,
    ];

    /// Position in the canonical order.
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|&it| it == self).unwrap_or(0)
    }

    pub fn class(self) -> SegmentClass {
        match self {
            SegmentKind::Origin
            | SegmentKind::DepartureRunwayTransition
            | SegmentKind::Departure
            | SegmentKind::DepartureEnrouteTransition => SegmentClass::Departure,
            SegmentKind::Enroute => SegmentClass::Enroute,
            SegmentKind::ArrivalEnrouteTransition
            | SegmentKind::Arrival
            | SegmentKind::ArrivalRunwayTransition
            | SegmentKind::ApproachVia
            | SegmentKind::Approach
            | SegmentKind::Destination
            | SegmentKind::MissedApproach => SegmentClass::Arrival,
        }
    }
}

/// Broad phase classification used for constraint typing and flight area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentClass {
    Departure,
    Enroute,
    Arrival,
}

/// Reference to the externally owned procedure record a segment was
/// populated from. Shared, never deep-copied.
#[derive(Debug, Clone)]
pub enum ProcedureRef {
    Departure(Arc<Departure>),
    Arrival(Arc<Arrival>),
    Approach(Arc<Approach>),
    Transition(Arc<ProcedureTransition>),
}

impl ProcedureRef {
    pub fn ident(&self) -> &str {
        match self {
            Self::Departure(it) => &it.ident,
            Self::Arrival(it) => &it.ident,
            Self::Approach(it) => &it.ident,
            Self::Transition(it) => &it.ident,
        }
    }
}

/// An ordered, contiguous group of legs belonging to one phase of flight.
#[derive(Debug, Clone)]
pub struct FlightPlanSegment {
    pub kind: SegmentKind,
    /// The elements owned by this segment, in sequence order.
    pub all_legs: Vec<FlightPlanElement>,
    /// The procedure this segment was populated from, if any.
    pub procedure: Option<ProcedureRef>,
    /// Whether this segment's boundary legs have been reconciled with its
    /// neighbors. Cleared by procedure changes, set during a restring flush.
    pub strung: bool,
    /// Whether the boundary with the enroute segment specifically has been
    /// reconciled.
    pub strung_enroute: bool,
}

impl FlightPlanSegment {
    pub fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            all_legs: Vec::new(),
            procedure: None,
            strung: false,
            strung_enroute: false,
        }
    }

    pub fn class(&self) -> SegmentClass {
        self.kind.class()
    }

    pub fn leg_count(&self) -> usize {
        self.all_legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_legs.is_empty()
    }

    /// The last element, if any.
    pub fn last_element(&self) -> Option<&FlightPlanElement> {
        self.all_legs.last()
    }

    /// The last real leg, skipping a trailing discontinuity.
    pub fn last_leg(&self) -> Option<&FlightPlanLeg> {
        self.all_legs.iter().rev().find_map(FlightPlanElement::as_leg)
    }

    /// The first real leg, skipping a leading discontinuity.
    pub fn first_leg(&self) -> Option<&FlightPlanLeg> {
        self.all_legs.iter().find_map(FlightPlanElement::as_leg)
    }

    /// Replaces this segment's legs, rebinding each leg's context to this
    /// segment and clearing the strung state.
    pub fn replace_legs(&mut self, legs: Vec<FlightPlanElement>) {
        self.all_legs = legs
            .into_iter()
            .map(|element| match element {
                FlightPlanElement::Leg(leg) => {
                    FlightPlanElement::Leg(leg.clone_for_segment(self.kind))
                }
                FlightPlanElement::Discontinuity => FlightPlanElement::Discontinuity,
            })
            .collect();
        self.strung = false;
    }

    /// Clears the segment's legs and procedure selection.
    pub fn clear(&mut self) {
        self.all_legs.clear();
        self.procedure = None;
        self.strung = false;
        self.strung_enroute = false;
    }

    /// Deep-copies this segment for a cloned plan. Legs are distinct owned
    /// copies; the procedure record stays shared (externally owned).
    pub fn clone_for_plan(&self) -> Self {
        Self {
            kind: self.kind,
            all_legs: self
                .all_legs
                .iter()
                .map(|element| match element {
                    FlightPlanElement::Leg(leg) => {
                        FlightPlanElement::Leg(leg.clone_for_segment(self.kind))
                    }
                    FlightPlanElement::Discontinuity => FlightPlanElement::Discontinuity,
                })
                .collect(),
            procedure: self.procedure.clone(),
            strung: self.strung,
            strung_enroute: self.strung_enroute,
        }
    }

    /// Serializes this segment's elements.
    pub fn serialize(&self) -> SerializedFlightPlanSegment {
        SerializedFlightPlanSegment {
            all_legs: self
                .all_legs
                .iter()
                .map(|element| match element {
                    FlightPlanElement::Leg(leg) => {
                        SerializedFlightPlanElement::Leg(leg.serialize())
                    }
                    FlightPlanElement::Discontinuity => {
                        SerializedFlightPlanElement::Discontinuity {
                            is_discontinuity: true,
                        }
                    }
                })
                .collect(),
        }
    }

    /// Restores this segment's elements from a serialized form. Procedure
    /// references and strung state are not part of the serialized form.
    pub fn set_from_serialized(&mut self, serialized: &SerializedFlightPlanSegment) {
        self.all_legs = serialized
            .all_legs
            .iter()
            .map(|element| match element {
                SerializedFlightPlanElement::Leg(leg) => {
                    FlightPlanElement::Leg(FlightPlanLeg::deserialize(leg, self.kind))
                }
                SerializedFlightPlanElement::Discontinuity { .. } => {
                    FlightPlanElement::Discontinuity
                }
            })
            .collect();
    }
}

/// Serialized element: a full leg snapshot or a discontinuity tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedFlightPlanElement {
    Leg(SerializedFlightPlanLeg),
    #[serde(rename_all = "camelCase")]
    Discontinuity { is_discontinuity: bool },
}

/// Serialized form of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedFlightPlanSegment {
    pub all_legs: Vec<SerializedFlightPlanElement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::leg::LegType;
    use crate::navdata::Fix;

    fn enroute_with(idents: &[&str]) -> FlightPlanSegment {
        let mut segment = FlightPlanSegment::new(SegmentKind::Enroute);
        segment.all_legs = idents
            .iter()
            .map(|ident| {
                FlightPlanElement::Leg(FlightPlanLeg::from_enroute_fix(
                    SegmentKind::Enroute,
                    Fix::new(*ident, "ED", Coordinates::new(50.0, 8.5)),
                    None,
                    LegType::TF,
                ))
            })
            .collect();
        segment
    }

    #[test]
    fn test_canonical_order_covers_every_kind_once() {
        for (index, kind) in SegmentKind::ALL.iter().enumerate() {
            assert_eq!(kind.position(), index);
        }
    }

    #[test]
    fn test_boundary_legs_skip_discontinuities() {
        let mut segment = enroute_with(&["ANEKI", "RIDAR"]);
        segment.all_legs.push(FlightPlanElement::Discontinuity);

        assert_eq!(segment.last_leg().unwrap().ident, "RIDAR");
        assert_eq!(segment.first_leg().unwrap().ident, "ANEKI");
    }

    #[test]
    fn test_clone_for_plan_owns_distinct_legs() {
        let segment = enroute_with(&["ANEKI"]);
        let mut clone = segment.clone_for_plan();

        clone.all_legs[0].as_leg_mut().unwrap().ident = "CHANGED".to_string();
        assert_eq!(segment.all_legs[0].as_leg().unwrap().ident, "ANEKI");
    }

    #[test]
    fn test_segment_serialize_roundtrip() {
        let mut segment = enroute_with(&["ANEKI", "RIDAR"]);
        segment.all_legs.insert(1, FlightPlanElement::Discontinuity);

        let serialized = segment.serialize();
        let mut restored = FlightPlanSegment::new(SegmentKind::Enroute);
        restored.set_from_serialized(&serialized);

        assert_eq!(restored.serialize(), serialized);
        assert!(restored.all_legs[1].is_discontinuity());
    }
}
