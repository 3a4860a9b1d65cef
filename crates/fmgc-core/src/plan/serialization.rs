//! Whole-plan serialization.
//!
//! The serialized form captures everything needed to rebuild a plan against
//! the same navigation database: per-phase segment snapshots, the active leg
//! index, context identifiers, pilot entries and performance data. Procedure
//! records themselves are not embedded; they are re-resolved on restore.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::perf::FlightPlanPerformanceData;
use crate::segment::{SegmentKind, SerializedFlightPlanSegment};

use super::base::BaseFlightPlan;
use super::fix_info::{FixInfoEntry, FIX_INFO_SLOTS};

/// Snapshot of the twelve segments, one field per phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSegments {
    pub origin_segment: SerializedFlightPlanSegment,
    pub departure_runway_transition_segment: SerializedFlightPlanSegment,
    pub departure_segment: SerializedFlightPlanSegment,
    pub departure_enroute_transition_segment: SerializedFlightPlanSegment,
    pub enroute_segment: SerializedFlightPlanSegment,
    pub arrival_enroute_transition_segment: SerializedFlightPlanSegment,
    pub arrival_segment: SerializedFlightPlanSegment,
    pub arrival_runway_transition_segment: SerializedFlightPlanSegment,
    pub approach_via_segment: SerializedFlightPlanSegment,
    pub approach_segment: SerializedFlightPlanSegment,
    pub destination_segment: SerializedFlightPlanSegment,
    pub missed_approach_segment: SerializedFlightPlanSegment,
}

impl SerializedSegments {
    fn field(&self, kind: SegmentKind) -> &SerializedFlightPlanSegment {
        match kind {
            SegmentKind::Origin => &self.origin_segment,
            SegmentKind::DepartureRunwayTransition => &self.departure_runway_transition_segment,
            SegmentKind::Departure => &self.departure_segment,
            SegmentKind::DepartureEnrouteTransition => {
                &self.departure_enroute_transition_segment
            }
            SegmentKind::Enroute => &self.enroute_segment,
            SegmentKind::ArrivalEnrouteTransition => &self.arrival_enroute_transition_segment,
            SegmentKind::Arrival => &self.arrival_segment,
            SegmentKind::ArrivalRunwayTransition => &self.arrival_runway_transition_segment,
            SegmentKind::ApproachVia => &self.approach_via_segment,
            SegmentKind::Approach => &self.approach_segment,
            SegmentKind::Destination => &self.destination_segment,
            SegmentKind::MissedApproach => &self.missed_approach_segment,
        }
    }
}

/// Serialized form of one [`BaseFlightPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedFlightPlanBody {
    pub active_leg_index: usize,
    pub origin_airport: Option<String>,
    pub origin_runway: Option<String>,
    pub destination_airport: Option<String>,
    pub destination_runway: Option<String>,
    pub segments: SerializedSegments,
}

/// Serialized form of a complete flight plan, alternate included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedFlightPlan {
    #[serde(flatten)]
    pub body: SerializedFlightPlanBody,
    pub alternate_flight_plan: SerializedFlightPlanBody,
    pub fix_info: Vec<Option<FixInfoEntry>>,
    pub performance_data: FlightPlanPerformanceData,
    pub flight_number: Option<String>,
}

impl BaseFlightPlan {
    /// Snapshots this plan's segments and context.
    pub fn serialize_body(&self) -> SerializedFlightPlanBody {
        SerializedFlightPlanBody {
            active_leg_index: self.active_leg_index(),
            origin_airport: self.origin_airport().map(|it| it.ident.clone()),
            origin_runway: self.origin_runway().map(|it| it.ident.clone()),
            destination_airport: self.destination_airport().map(|it| it.ident.clone()),
            destination_runway: self.destination_runway().map(|it| it.ident.clone()),
            segments: SerializedSegments {
                origin_segment: self.segment(SegmentKind::Origin).serialize(),
                departure_runway_transition_segment: self
                    .segment(SegmentKind::DepartureRunwayTransition)
                    .serialize(),
                departure_segment: self.segment(SegmentKind::Departure).serialize(),
                departure_enroute_transition_segment: self
                    .segment(SegmentKind::DepartureEnrouteTransition)
                    .serialize(),
                enroute_segment: self.segment(SegmentKind::Enroute).serialize(),
                arrival_enroute_transition_segment: self
                    .segment(SegmentKind::ArrivalEnrouteTransition)
                    .serialize(),
                arrival_segment: self.segment(SegmentKind::Arrival).serialize(),
                arrival_runway_transition_segment: self
                    .segment(SegmentKind::ArrivalRunwayTransition)
                    .serialize(),
                approach_via_segment: self.segment(SegmentKind::ApproachVia).serialize(),
                approach_segment: self.segment(SegmentKind::Approach).serialize(),
                destination_segment: self.segment(SegmentKind::Destination).serialize(),
                missed_approach_segment: self.segment(SegmentKind::MissedApproach).serialize(),
            },
        }
    }

    /// Restores segments and context from a serialized body. Airports,
    /// runways and procedure availability are re-resolved from the database;
    /// segments whose procedures no longer resolve keep their leg snapshots
    /// with no procedure reference attached.
    pub async fn set_from_serialized_body(
        &mut self,
        body: &SerializedFlightPlanBody,
    ) -> Result<()> {
        if let Some(ident) = &body.origin_airport {
            let ident = ident.clone();
            self.origin_airport = self.with_database(move |db| db.get_airport(&ident)).await?;

            if let Some(airport) = self.origin_airport.clone() {
                let airport_ident = airport.ident.clone();
                self.available_origin_runways = self
                    .with_database(move |db| db.get_runways(&airport_ident))
                    .await?;
                let airport_ident = airport.ident;
                self.available_departures = self
                    .with_database(move |db| db.get_departures(&airport_ident))
                    .await?
                    .into_iter()
                    .map(std::sync::Arc::new)
                    .collect();
            }
        }
        self.origin_runway = body.origin_runway.as_ref().and_then(|ident| {
            self.available_origin_runways
                .iter()
                .find(|it| &it.ident == ident)
                .cloned()
        });

        if let Some(ident) = &body.destination_airport {
            let ident = ident.clone();
            self.destination_airport =
                self.with_database(move |db| db.get_airport(&ident)).await?;

            if let Some(airport) = self.destination_airport.clone() {
                let airport_ident = airport.ident.clone();
                self.available_destination_runways = self
                    .with_database(move |db| db.get_runways(&airport_ident))
                    .await?;
                let airport_ident = airport.ident.clone();
                self.available_arrivals = self
                    .with_database(move |db| db.get_arrivals(&airport_ident))
                    .await?
                    .into_iter()
                    .map(std::sync::Arc::new)
                    .collect();
                let airport_ident = airport.ident;
                self.available_approaches = self
                    .with_database(move |db| db.get_approaches(&airport_ident))
                    .await?
                    .into_iter()
                    .map(std::sync::Arc::new)
                    .collect();
            }
        }
        self.destination_runway = body.destination_runway.as_ref().and_then(|ident| {
            self.available_destination_runways
                .iter()
                .find(|it| &it.ident == ident)
                .cloned()
        });

        for kind in SegmentKind::ALL {
            self.segment_mut(kind)
                .set_from_serialized(body.segments.field(kind));
        }

        self.set_active_leg_index(body.active_leg_index)?;
        Ok(())
    }
}

/// Normalizes a serialized fix info list into the fixed slot array.
pub(crate) fn fix_info_from_serialized(
    serialized: &[Option<FixInfoEntry>],
) -> [Option<FixInfoEntry>; FIX_INFO_SLOTS] {
    let mut slots: [Option<FixInfoEntry>; FIX_INFO_SLOTS] = Default::default();
    for (slot, entry) in slots.iter_mut().zip(serialized.iter()) {
        *slot = entry.clone();
    }
    slots
}
