//! Procedure selection operations: origin/destination airports and runways,
//! SIDs, STARs, approaches and their transitions.
//!
//! Every setter resolves database records first, applies the structural
//! change second, and finishes by enqueueing the maintenance operations that
//! reconcile segment boundaries. Callers flush the queue when they are done
//! batching changes.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{FlightPlanError, ProcedureKind, Result};
use crate::leg::{FlightPlanElement, FlightPlanLeg, LegType};
use crate::navdata::{Approach, Arrival, Departure, ProcedureLeg, ProcedureTransition, Runway};
use crate::segment::{ProcedureRef, SegmentKind};

use super::base::{BaseFlightPlan, QueuedOperation, RestringOptions};

impl BaseFlightPlan {
    // ------------------------------------------------------------------
    // Origin
    // ------------------------------------------------------------------

    /// Sets the origin airport, resetting every departure selection and
    /// reloading the origin's runways and departures from the database.
    pub async fn set_origin_airport(&mut self, ident: &str) -> Result<()> {
        let ident_owned = ident.to_string();
        let airport = self
            .with_database(move |db| db.get_airport(&ident_owned))
            .await?
            .ok_or_else(|| FlightPlanError::AirportNotFound {
                ident: ident.to_string(),
            })?;

        let ident_owned = ident.to_string();
        let runways = self
            .with_database(move |db| db.get_runways(&ident_owned))
            .await?;
        let ident_owned = ident.to_string();
        let departures = self
            .with_database(move |db| db.get_departures(&ident_owned))
            .await?;

        info!("plan {}: origin set to {}", self.index, airport.ident);

        self.origin_airport = Some(airport);
        self.origin_runway = None;
        self.available_origin_runways = runways;
        self.available_departures = departures.into_iter().map(Arc::new).collect();

        self.segment_mut(SegmentKind::DepartureRunwayTransition).clear();
        self.segment_mut(SegmentKind::Departure).clear();
        self.segment_mut(SegmentKind::DepartureEnrouteTransition).clear();

        self.refresh_origin_legs();
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::DEPARTURE));
        self.increment_version();
        Ok(())
    }

    /// Sets or clears the origin runway. Keeps the selected departure and
    /// re-derives its runway transition for the new runway.
    pub fn set_origin_runway(&mut self, runway_ident: Option<&str>) -> Result<()> {
        if self.origin_airport.is_none() {
            return Err(FlightPlanError::precondition(
                "cannot set origin runway without an origin airport",
            ));
        }

        self.origin_runway = match runway_ident {
            Some(ident) => Some(self.resolve_origin_runway(ident)?.clone()),
            None => None,
        };

        self.rebuild_departure_runway_transition();
        self.refresh_origin_legs();
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::DEPARTURE));
        self.increment_version();
        Ok(())
    }

    /// Selects or clears the departure procedure. Clearing also clears both
    /// departure transitions; selecting re-derives the runway transition and
    /// invalidates any previously selected enroute transition.
    pub fn set_departure(&mut self, ident: Option<&str>) -> Result<()> {
        match ident {
            None => {
                self.segment_mut(SegmentKind::DepartureRunwayTransition).clear();
                self.segment_mut(SegmentKind::Departure).clear();
                self.segment_mut(SegmentKind::DepartureEnrouteTransition).clear();
            }
            Some(ident) => {
                let airport_ident = self
                    .origin_airport
                    .as_ref()
                    .map(|it| it.ident.clone())
                    .ok_or_else(|| {
                        FlightPlanError::precondition(
                            "cannot set a departure without an origin airport",
                        )
                    })?;

                let departure = self
                    .available_departures
                    .iter()
                    .find(|it| it.ident == ident)
                    .cloned()
                    .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                        kind: ProcedureKind::Departure,
                        ident: ident.to_string(),
                        airport: airport_ident,
                    })?;

                debug!("plan {}: departure set to {}", self.index, departure.ident);

                let legs = self.map_procedure_legs(
                    SegmentKind::Departure,
                    &departure.common_legs,
                    &departure.ident,
                );
                let segment = self.segment_mut(SegmentKind::Departure);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Departure(Arc::clone(&departure)));

                // Previous enroute transition belongs to the old procedure
                self.segment_mut(SegmentKind::DepartureEnrouteTransition).clear();
                self.rebuild_departure_runway_transition();
            }
        }

        self.refresh_origin_legs();
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::DEPARTURE));
        self.increment_version();
        Ok(())
    }

    /// Selects or clears the departure enroute transition.
    pub fn set_departure_enroute_transition(&mut self, ident: Option<&str>) -> Result<()> {
        match ident {
            None => self.segment_mut(SegmentKind::DepartureEnrouteTransition).clear(),
            Some(ident) => {
                let departure = self
                    .selected_departure()
                    .ok_or_else(|| {
                        FlightPlanError::precondition(
                            "cannot set a departure transition without a departure",
                        )
                    })?;

                let airport_ident = self
                    .origin_airport
                    .as_ref()
                    .map_or_else(String::new, |it| it.ident.clone());
                let transition = departure
                    .enroute_transitions
                    .iter()
                    .find(|it| it.ident == ident)
                    .cloned()
                    .map(Arc::new)
                    .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                        kind: ProcedureKind::DepartureEnrouteTransition,
                        ident: ident.to_string(),
                        airport: airport_ident,
                    })?;

                let procedure_ident = departure.ident.clone();
                let legs = self.map_procedure_legs(
                    SegmentKind::DepartureEnrouteTransition,
                    &transition.legs,
                    &procedure_ident,
                );
                let segment = self.segment_mut(SegmentKind::DepartureEnrouteTransition);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Transition(transition));
            }
        }

        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::DEPARTURE));
        self.increment_version();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Destination
    // ------------------------------------------------------------------

    /// Sets or clears the destination airport, resetting every arrival-side
    /// selection and reloading runways, arrivals and approaches.
    pub async fn set_destination_airport(&mut self, ident: Option<&str>) -> Result<()> {
        match ident {
            None => {
                self.destination_airport = None;
                self.destination_runway = None;
                self.available_destination_runways.clear();
                self.available_arrivals.clear();
                self.available_approaches.clear();
                self.available_approach_vias.clear();
                self.clear_arrival_segments();
                self.segment_mut(SegmentKind::Destination).clear();
            }
            Some(ident) => {
                let ident_owned = ident.to_string();
                let airport = self
                    .with_database(move |db| db.get_airport(&ident_owned))
                    .await?
                    .ok_or_else(|| FlightPlanError::AirportNotFound {
                        ident: ident.to_string(),
                    })?;

                let ident_owned = ident.to_string();
                let runways = self
                    .with_database(move |db| db.get_runways(&ident_owned))
                    .await?;
                let ident_owned = ident.to_string();
                let arrivals = self
                    .with_database(move |db| db.get_arrivals(&ident_owned))
                    .await?;
                let ident_owned = ident.to_string();
                let approaches = self
                    .with_database(move |db| db.get_approaches(&ident_owned))
                    .await?;

                info!("plan {}: destination set to {}", self.index, airport.ident);

                self.destination_airport = Some(airport);
                self.destination_runway = None;
                self.available_destination_runways = runways;
                self.available_arrivals = arrivals.into_iter().map(Arc::new).collect();
                self.available_approaches = approaches.into_iter().map(Arc::new).collect();
                self.available_approach_vias.clear();

                self.clear_arrival_segments();
                self.refresh_destination_legs();
            }
        }

        self.enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
        self.increment_version();
        Ok(())
    }

    /// Sets or clears the destination runway. Keeps the selected arrival and
    /// re-derives its runway transition for the new runway.
    pub fn set_destination_runway(&mut self, runway_ident: Option<&str>) -> Result<()> {
        if self.destination_airport.is_none() {
            return Err(FlightPlanError::precondition(
                "cannot set destination runway without a destination airport",
            ));
        }

        self.destination_runway = match runway_ident {
            Some(ident) => Some(self.resolve_destination_runway(ident)?.clone()),
            None => None,
        };

        self.refresh_destination_legs();
        self.enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
        self.increment_version();
        Ok(())
    }

    /// Selects or clears the arrival procedure. Clearing also clears both
    /// arrival transitions.
    pub fn set_arrival(&mut self, ident: Option<&str>) -> Result<()> {
        match ident {
            None => {
                self.segment_mut(SegmentKind::ArrivalEnrouteTransition).clear();
                self.segment_mut(SegmentKind::Arrival).clear();
                self.segment_mut(SegmentKind::ArrivalRunwayTransition).clear();
            }
            Some(ident) => {
                let airport_ident = self
                    .destination_airport
                    .as_ref()
                    .map(|it| it.ident.clone())
                    .ok_or_else(|| {
                        FlightPlanError::precondition(
                            "cannot set an arrival without a destination airport",
                        )
                    })?;

                let arrival = self
                    .available_arrivals
                    .iter()
                    .find(|it| it.ident == ident)
                    .cloned()
                    .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                        kind: ProcedureKind::Arrival,
                        ident: ident.to_string(),
                        airport: airport_ident,
                    })?;

                debug!("plan {}: arrival set to {}", self.index, arrival.ident);

                let legs = self.map_procedure_legs(
                    SegmentKind::Arrival,
                    &arrival.common_legs,
                    &arrival.ident,
                );
                let segment = self.segment_mut(SegmentKind::Arrival);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Arrival(Arc::clone(&arrival)));

                self.segment_mut(SegmentKind::ArrivalEnrouteTransition).clear();
            }
        }

        self.enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
        self.increment_version();
        Ok(())
    }

    /// Selects or clears the arrival enroute transition.
    pub fn set_arrival_enroute_transition(&mut self, ident: Option<&str>) -> Result<()> {
        match ident {
            None => self.segment_mut(SegmentKind::ArrivalEnrouteTransition).clear(),
            Some(ident) => {
                let arrival = self.selected_arrival().ok_or_else(|| {
                    FlightPlanError::precondition(
                        "cannot set an arrival transition without an arrival",
                    )
                })?;

                let airport_ident = self
                    .destination_airport
                    .as_ref()
                    .map_or_else(String::new, |it| it.ident.clone());
                let transition = arrival
                    .enroute_transitions
                    .iter()
                    .find(|it| it.ident == ident)
                    .cloned()
                    .map(Arc::new)
                    .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                        kind: ProcedureKind::ArrivalEnrouteTransition,
                        ident: ident.to_string(),
                        airport: airport_ident,
                    })?;

                let procedure_ident = arrival.ident.clone();
                let legs = self.map_procedure_legs(
                    SegmentKind::ArrivalEnrouteTransition,
                    &transition.legs,
                    &procedure_ident,
                );
                let segment = self.segment_mut(SegmentKind::ArrivalEnrouteTransition);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Transition(transition));
            }
        }

        self.enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
        self.increment_version();
        Ok(())
    }

    /// Selects or clears the approach. Selecting an approach implicitly sets
    /// the destination runway it serves, populates the missed approach
    /// segment and invalidates any via chosen for a different approach.
    pub fn set_approach(&mut self, ident: Option<&str>) -> Result<()> {
        if self.destination_airport.is_none() {
            return Err(FlightPlanError::precondition(
                "cannot set an approach without a destination airport",
            ));
        }

        let previous_ident = self
            .segment(SegmentKind::Approach)
            .procedure
            .as_ref()
            .map(|it| it.ident().to_string());

        match ident {
            None => {
                self.segment_mut(SegmentKind::ApproachVia).clear();
                self.segment_mut(SegmentKind::Approach).clear();
                self.segment_mut(SegmentKind::MissedApproach).clear();
                self.available_approach_vias.clear();
            }
            Some(ident) => {
                let airport_ident = self
                    .destination_airport
                    .as_ref()
                    .map_or_else(String::new, |it| it.ident.clone());
                let approach = self
                    .available_approaches
                    .iter()
                    .find(|it| it.ident == ident)
                    .cloned()
                    .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                        kind: ProcedureKind::Approach,
                        ident: ident.to_string(),
                        airport: airport_ident,
                    })?;

                info!("plan {}: approach set to {}", self.index, approach.ident);

                // The approach dictates the runway it serves
                if let Some(runway_ident) = &approach.runway_ident {
                    if let Some(runway) = self
                        .available_destination_runways
                        .iter()
                        .find(|it| &it.ident == runway_ident)
                        .cloned()
                    {
                        self.destination_runway = Some(runway);
                        self.refresh_destination_legs();
                    }
                }

                let legs = self.create_approach_leg_set(Some(approach.as_ref()));
                let segment = self.segment_mut(SegmentKind::Approach);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Approach(Arc::clone(&approach)));

                let missed_legs = self.map_procedure_legs(
                    SegmentKind::MissedApproach,
                    &approach.missed_legs,
                    &approach.ident,
                );
                self.segment_mut(SegmentKind::MissedApproach).replace_legs(missed_legs);

                if previous_ident.as_deref() != Some(approach.ident.as_str()) {
                    self.segment_mut(SegmentKind::ApproachVia).clear();
                }
                self.available_approach_vias = approach
                    .transitions
                    .iter()
                    .cloned()
                    .map(Arc::new)
                    .collect();
            }
        }

        self.enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
        self.increment_version();
        Ok(())
    }

    /// Selects or clears the approach via.
    pub fn set_approach_via(&mut self, ident: Option<&str>) -> Result<()> {
        match ident {
            None => self.segment_mut(SegmentKind::ApproachVia).clear(),
            Some(ident) => {
                let approach = self.selected_approach().ok_or_else(|| {
                    FlightPlanError::precondition("cannot set an approach via without an approach")
                })?;
                let procedure_ident = approach.ident.clone();

                let airport_ident = self
                    .destination_airport
                    .as_ref()
                    .map_or_else(String::new, |it| it.ident.clone());
                let transition = self
                    .available_approach_vias
                    .iter()
                    .find(|it| it.ident == ident)
                    .cloned()
                    .ok_or_else(|| FlightPlanError::ProcedureNotFound {
                        kind: ProcedureKind::ApproachVia,
                        ident: ident.to_string(),
                        airport: airport_ident,
                    })?;

                let legs = self.map_procedure_legs(
                    SegmentKind::ApproachVia,
                    &transition.legs,
                    &procedure_ident,
                );
                let segment = self.segment_mut(SegmentKind::ApproachVia);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Transition(transition));
            }
        }

        self.enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
        self.increment_version();
        Ok(())
    }

    /// Diversion revision at the leg at `index`: everything after that leg
    /// is removed, a discontinuity is inserted, and the given airport becomes
    /// the new destination with all arrival selections cleared.
    pub async fn new_dest(&mut self, index: usize, airport_ident: &str) -> Result<()> {
        if index >= self.first_missed_approach_leg_index() {
            return Err(FlightPlanError::precondition(
                "cannot start a diversion inside the missed approach",
            ));
        }
        self.leg_element_at(index)?;

        self.redistribute_legs_at(index);

        let count = self.leg_count();
        if index + 1 < count {
            self.remove_range(index + 1, count)?;
        }

        self.set_destination_airport(Some(airport_ident)).await?;

        // Gap between the diversion point and whatever gets strung after it
        let (kind, local) = self.segment_position_for_index(index)?;
        let segment = self.segment_mut(kind);
        if local + 1 >= segment.all_legs.len()
            || !segment.all_legs[local + 1].is_discontinuity()
        {
            segment.all_legs.insert(local + 1, FlightPlanElement::Discontinuity);
        }

        self.increment_version();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rebuild (queued handler)
    // ------------------------------------------------------------------

    /// Re-derives the arrival-side selections that depend on each other:
    /// the arrival runway transition for the current runway, the validity of
    /// the approach via, the destination leg, and the synthesized approach
    /// when no procedure is selected. Idempotent.
    pub(crate) fn rebuild_arrival_and_approach(&mut self) -> Result<()> {
        if self.destination_airport.is_none() {
            self.clear_arrival_segments();
            self.segment_mut(SegmentKind::Destination).clear();
            return Ok(());
        }

        self.rebuild_arrival_runway_transition();

        // A via left over from a different approach is invalid
        let via_still_valid = match &self.segment(SegmentKind::ApproachVia).procedure {
            Some(ProcedureRef::Transition(via)) => self
                .available_approach_vias
                .iter()
                .any(|it| it.ident == via.ident),
            Some(_) => false,
            None => true,
        };
        if !via_still_valid {
            warn!(
                "plan {}: dropping approach via no longer served by the selected approach",
                self.index
            );
            self.segment_mut(SegmentKind::ApproachVia).clear();
        }

        // Synthesize an extended-centerline approach when none is selected
        if self.selected_approach().is_none()
            && self.segment(SegmentKind::Approach).is_empty()
            && self.destination_runway.is_some()
        {
            let legs = self.create_approach_leg_set(None);
            self.segment_mut(SegmentKind::Approach).replace_legs(legs);
        }

        // The destination leg is regenerated only if restringing has not
        // already collapsed it into the approach
        let destination = self.segment(SegmentKind::Destination);
        if destination.is_empty() && !destination.strung {
            self.refresh_destination_legs();
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Leg-set construction
    // ------------------------------------------------------------------

    /// Maps database procedure legs into plan legs, prepending an IF at the
    /// initial fix when the procedure starts with a fix-initiated leg.
    pub(crate) fn map_procedure_legs(
        &self,
        kind: SegmentKind,
        legs: &[ProcedureLeg],
        procedure_ident: &str,
    ) -> Vec<FlightPlanElement> {
        let mut mapped: Vec<FlightPlanElement> = legs
            .iter()
            .map(|leg| {
                FlightPlanElement::Leg(FlightPlanLeg::from_procedure_leg(
                    kind,
                    leg.clone(),
                    procedure_ident,
                ))
            })
            .collect();

        let needs_initial_fix = mapped
            .first()
            .and_then(FlightPlanElement::as_leg)
            .is_some_and(|leg| leg.is_fx());

        if needs_initial_fix {
            let initial = mapped[0]
                .as_leg()
                .and_then(FlightPlanLeg::termination_waypoint)
                .cloned();
            if let Some(fix) = initial {
                mapped.insert(
                    0,
                    FlightPlanElement::Leg(FlightPlanLeg::from_enroute_fix(
                        kind,
                        fix,
                        None,
                        LegType::IF,
                    )),
                );
            }
        }

        mapped
    }

    /// Builds the approach segment's legs. With a selected approach, maps its
    /// legs and substitutes a runway-anchored termination when the final leg
    /// ends at a known runway. Without one, synthesizes an extended
    /// centerline pair onto the selected runway.
    pub(crate) fn create_approach_leg_set(
        &self,
        approach: Option<&Approach>,
    ) -> Vec<FlightPlanElement> {
        let Some(airport) = &self.destination_airport else {
            return Vec::new();
        };

        let Some(approach) = approach else {
            let Some(runway) = &self.destination_runway else {
                return Vec::new();
            };

            return vec![
                FlightPlanElement::Leg(FlightPlanLeg::destination_extended_centerline(
                    SegmentKind::Approach,
                    airport,
                    runway,
                )),
                FlightPlanElement::Leg(FlightPlanLeg::from_airport_and_runway(
                    SegmentKind::Approach,
                    "",
                    airport,
                    Some(runway),
                )),
            ];
        };

        let mut mapped =
            self.map_procedure_legs(SegmentKind::Approach, &approach.legs, &approach.ident);

        // Anchor the final leg at the runway threshold when it is a runway leg
        let last_is_runway = mapped
            .last()
            .and_then(FlightPlanElement::as_leg)
            .is_some_and(FlightPlanLeg::is_runway);

        if last_is_runway {
            let last = mapped
                .pop()
                .and_then(|it| match it {
                    FlightPlanElement::Leg(leg) => Some(leg),
                    FlightPlanElement::Discontinuity => None,
                })
                .unwrap_or_else(|| {
                    FlightPlanLeg::from_airport_and_runway(SegmentKind::Approach, "", airport, None)
                });

            let runway = self.runway_from_runway_leg(&last);
            let mut substituted = FlightPlanLeg::from_airport_and_runway(
                SegmentKind::Approach,
                &approach.ident,
                airport,
                runway.as_ref(),
            );

            if !mapped.is_empty() {
                // Keep the procedure's path geometry, only rename the fix
                let waypoint = substituted.definition.waypoint.take();
                let descriptor = substituted.definition.waypoint_descriptor.take();
                substituted.leg_type = last.leg_type;
                substituted.definition = last.definition.clone();
                substituted.definition.waypoint = waypoint;
                substituted.definition.waypoint_descriptor = descriptor;
            }

            mapped.push(FlightPlanElement::Leg(substituted));
        }

        mapped
    }

    // ------------------------------------------------------------------
    // Derived segments
    // ------------------------------------------------------------------

    /// Regenerates the origin segment: a runway-or-airport anchored IF leg,
    /// followed by a climb-out centerline leg when a runway is selected but
    /// no departure procedure is.
    pub(crate) fn refresh_origin_legs(&mut self) {
        let Some(airport) = self.origin_airport.clone() else {
            self.segment_mut(SegmentKind::Origin).clear();
            return;
        };

        let runway_leg = FlightPlanLeg::from_airport_and_runway(
            SegmentKind::Origin,
            "",
            &airport,
            self.origin_runway.as_ref(),
        );

        let mut legs = Vec::with_capacity(2);
        if self.origin_runway.is_some() && self.selected_departure().is_none() {
            let centerline =
                FlightPlanLeg::origin_extended_centerline(SegmentKind::Origin, &runway_leg);
            legs.push(FlightPlanElement::Leg(runway_leg));
            legs.push(FlightPlanElement::Leg(centerline));
        } else {
            legs.push(FlightPlanElement::Leg(runway_leg));
        }

        self.segment_mut(SegmentKind::Origin).replace_legs(legs);
    }

    /// Regenerates the destination segment's airport/runway leg.
    pub(crate) fn refresh_destination_legs(&mut self) {
        let Some(airport) = self.destination_airport.clone() else {
            self.segment_mut(SegmentKind::Destination).clear();
            return;
        };

        let leg = FlightPlanLeg::from_airport_and_runway(
            SegmentKind::Destination,
            "",
            &airport,
            self.destination_runway.as_ref(),
        );

        self.segment_mut(SegmentKind::Destination)
            .replace_legs(vec![FlightPlanElement::Leg(leg)]);
    }

    fn rebuild_departure_runway_transition(&mut self) {
        let transition = match (&self.origin_runway, self.selected_departure()) {
            (Some(runway), Some(departure)) => departure
                .runway_transitions
                .iter()
                .find(|it| it.ident == runway.ident)
                .cloned()
                .map(|transition| (departure.ident.clone(), Arc::new(transition))),
            _ => None,
        };

        match transition {
            Some((procedure_ident, transition)) => {
                let legs = self.map_procedure_legs(
                    SegmentKind::DepartureRunwayTransition,
                    &transition.legs,
                    &procedure_ident,
                );
                let segment = self.segment_mut(SegmentKind::DepartureRunwayTransition);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Transition(transition));
            }
            None => self.segment_mut(SegmentKind::DepartureRunwayTransition).clear(),
        }
    }

    fn rebuild_arrival_runway_transition(&mut self) {
        let desired = match (&self.destination_runway, self.selected_arrival()) {
            (Some(runway), Some(arrival)) => arrival
                .runway_transitions
                .iter()
                .find(|it| it.ident == runway.ident)
                .cloned()
                .map(|transition| (arrival.ident.clone(), Arc::new(transition))),
            _ => None,
        };

        let current_ident = self
            .segment(SegmentKind::ArrivalRunwayTransition)
            .procedure
            .as_ref()
            .map(|it| it.ident().to_string());

        match desired {
            Some((procedure_ident, transition)) => {
                if current_ident.as_deref() == Some(transition.ident.as_str()) {
                    return;
                }

                let legs = self.map_procedure_legs(
                    SegmentKind::ArrivalRunwayTransition,
                    &transition.legs,
                    &procedure_ident,
                );
                let segment = self.segment_mut(SegmentKind::ArrivalRunwayTransition);
                segment.replace_legs(legs);
                segment.procedure = Some(ProcedureRef::Transition(transition));
            }
            None => {
                if current_ident.is_some() {
                    self.segment_mut(SegmentKind::ArrivalRunwayTransition).clear();
                }
            }
        }
    }

    fn clear_arrival_segments(&mut self) {
        self.segment_mut(SegmentKind::ArrivalEnrouteTransition).clear();
        self.segment_mut(SegmentKind::Arrival).clear();
        self.segment_mut(SegmentKind::ArrivalRunwayTransition).clear();
        self.segment_mut(SegmentKind::ApproachVia).clear();
        self.segment_mut(SegmentKind::Approach).clear();
        self.segment_mut(SegmentKind::MissedApproach).clear();
    }

    // ------------------------------------------------------------------
    // Selection accessors
    // ------------------------------------------------------------------

    pub fn selected_departure(&self) -> Option<Arc<Departure>> {
        match &self.segment(SegmentKind::Departure).procedure {
            Some(ProcedureRef::Departure(it)) => Some(Arc::clone(it)),
            _ => None,
        }
    }

    pub fn selected_arrival(&self) -> Option<Arc<Arrival>> {
        match &self.segment(SegmentKind::Arrival).procedure {
            Some(ProcedureRef::Arrival(it)) => Some(Arc::clone(it)),
            _ => None,
        }
    }

    pub fn selected_approach(&self) -> Option<Arc<Approach>> {
        match &self.segment(SegmentKind::Approach).procedure {
            Some(ProcedureRef::Approach(it)) => Some(Arc::clone(it)),
            _ => None,
        }
    }

    pub fn selected_approach_via(&self) -> Option<Arc<ProcedureTransition>> {
        match &self.segment(SegmentKind::ApproachVia).procedure {
            Some(ProcedureRef::Transition(it)) => Some(Arc::clone(it)),
            _ => None,
        }
    }

    fn resolve_origin_runway(&self, ident: &str) -> Result<&Runway> {
        self.available_origin_runways
            .iter()
            .find(|it| it.ident == ident)
            .ok_or_else(|| FlightPlanError::RunwayNotFound {
                ident: ident.to_string(),
                airport: self
                    .origin_airport
                    .as_ref()
                    .map_or_else(String::new, |it| it.ident.clone()),
            })
    }

    fn resolve_destination_runway(&self, ident: &str) -> Result<&Runway> {
        self.available_destination_runways
            .iter()
            .find(|it| it.ident == ident)
            .ok_or_else(|| FlightPlanError::RunwayNotFound {
                ident: ident.to_string(),
                airport: self
                    .destination_airport
                    .as_ref()
                    .map_or_else(String::new, |it| it.ident.clone()),
            })
    }

    /// Resolves a runway-terminated procedure leg to the runway record it
    /// names, by threshold fix ident ("EDDF07C" or "RW07C" conventions).
    pub(crate) fn runway_from_runway_leg(&self, leg: &FlightPlanLeg) -> Option<Runway> {
        let airport_ident = self
            .destination_airport
            .as_ref()
            .map_or("", |it| it.ident.as_str());

        self.available_destination_runways
            .iter()
            .find(|runway| {
                leg.ident == runway.ident
                    || leg.ident == format!("{airport_ident}{}", runway.number_ident())
            })
            .cloned()
    }
}
