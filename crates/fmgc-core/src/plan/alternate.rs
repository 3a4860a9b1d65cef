//! Alternate flight plan management.
//!
//! The alternate is a full plan in its own right, originating at the primary
//! destination. Enabling it grafts its route onto the primary plan after a
//! chosen leg, making the alternate destination the new destination.

use log::info;

use crate::error::{FlightPlanError, Result};
use crate::leg::FlightPlanElement;
use crate::perf::PerformanceDataKey;
use crate::segment::SegmentKind;

use super::base::{BaseFlightPlan, QueuedOperation, RestringOptions};
use super::FlightPlan;

impl FlightPlan {
    /// The alternate flight plan.
    pub fn alternate(&self) -> &BaseFlightPlan {
        &self.alternate
    }

    /// Mutable access to the alternate plan. The alternate supports the full
    /// mutation set of a base plan; selections made here are what
    /// [`FlightPlan::enable_altn`] later carries over.
    pub fn alternate_mut(&mut self) -> &mut BaseFlightPlan {
        &mut self.alternate
    }

    /// Sets or clears the alternate destination. The alternate plan always
    /// originates at the primary destination; clearing deletes the alternate
    /// entirely.
    pub async fn set_alternate_destination_airport(
        &mut self,
        ident: Option<&str>,
    ) -> Result<()> {
        let Some(ident) = ident else {
            self.delete_alternate_flight_plan();
            return Ok(());
        };

        let primary_destination = self
            .base
            .destination_airport()
            .map(|it| it.ident.clone())
            .ok_or_else(|| {
                FlightPlanError::precondition(
                    "cannot set an alternate without a primary destination",
                )
            })?;

        self.alternate.set_origin_airport(&primary_destination).await?;
        self.alternate.set_destination_airport(Some(ident)).await?;
        self.alternate.flush_operation_queue()?;

        self.base.increment_version();
        Ok(())
    }

    /// Deletes the alternate flight plan, leaving an empty one behind.
    pub fn delete_alternate_flight_plan(&mut self) {
        self.alternate = Box::new(BaseFlightPlan::new(
            self.index,
            true,
            std::sync::Arc::clone(&self.base.database),
        ));
        self.base.increment_version();
    }

    /// Enables the alternate: truncates the primary plan after the leg at
    /// `at_index`, carries the alternate's destination and arrival selections
    /// over, splices the alternate's route in, and deletes the alternate.
    ///
    /// `cruise_level` becomes the new cruise flight level; the cost index is
    /// reset to zero. Not transactional: a database failure partway through
    /// leaves the plan truncated, to be repaired by further pilot input.
    pub async fn enable_altn(&mut self, at_index: usize, cruise_level: f64) -> Result<()> {
        let alternate_destination = self
            .alternate
            .destination_airport()
            .map(|it| it.ident.clone())
            .ok_or_else(|| {
                FlightPlanError::precondition(
                    "cannot enable the alternate without an alternate destination",
                )
            })?;

        self.base.leg_element_at(at_index)?;

        info!(
            "plan {}: enabling alternate to {alternate_destination} at leg {at_index}",
            self.index
        );

        // Selections to carry over, captured before the alternate is deleted
        let runway = self.alternate.destination_runway().map(|it| it.ident.clone());
        let approach = self.alternate.selected_approach().map(|it| it.ident.clone());
        let via = self.alternate.selected_approach_via().map(|it| it.ident.clone());
        let arrival = self.alternate.selected_arrival().map(|it| it.ident.clone());
        let arrival_transition = self
            .alternate
            .segment(SegmentKind::ArrivalEnrouteTransition)
            .procedure
            .as_ref()
            .map(|it| it.ident().to_string());

        // Everything after the revision point goes
        self.base.redistribute_legs_at(at_index);
        let count = self.base.leg_count();
        if at_index + 1 < count {
            self.base.remove_range(at_index + 1, count)?;
        }

        // Re-target the primary plan at the alternate destination
        self.base
            .set_destination_airport(Some(alternate_destination.as_str()))
            .await?;
        if let Some(runway) = runway.as_deref() {
            self.base.set_destination_runway(Some(runway))?;
        }
        if let Some(approach) = approach.as_deref() {
            self.base.set_approach(Some(approach))?;
        }
        if let Some(via) = via.as_deref() {
            self.base.set_approach_via(Some(via))?;
        }
        if let Some(arrival) = arrival.as_deref() {
            self.base.set_arrival(Some(arrival))?;
        }
        if let Some(transition) = arrival_transition.as_deref() {
            self.base.set_arrival_enroute_transition(Some(transition))?;
        }

        // Graft the alternate's route (its origin through enroute) onto the
        // primary enroute segment
        let mut grafted: Vec<FlightPlanElement> = Vec::new();
        for kind in [
            SegmentKind::Origin,
            SegmentKind::DepartureRunwayTransition,
            SegmentKind::Departure,
            SegmentKind::DepartureEnrouteTransition,
            SegmentKind::Enroute,
        ] {
            for element in &self.alternate.segment(kind).all_legs {
                grafted.push(match element {
                    FlightPlanElement::Leg(leg) => {
                        FlightPlanElement::Leg(leg.clone_for_segment(SegmentKind::Enroute))
                    }
                    FlightPlanElement::Discontinuity => FlightPlanElement::Discontinuity,
                });
            }
        }

        let enroute = self.base.segment_mut(SegmentKind::Enroute);
        let boundary_is_leg_to_leg = enroute
            .all_legs
            .last()
            .is_some_and(|it| it.as_leg().is_some())
            && grafted.first().is_some_and(|it| it.as_leg().is_some());
        if boundary_is_leg_to_leg {
            enroute.all_legs.push(FlightPlanElement::Discontinuity);
        }
        enroute.all_legs.extend(grafted);
        enroute.strung = false;

        self.set_performance_data(PerformanceDataKey::CruiseFlightLevel, Some(cruise_level));
        self.set_performance_data(PerformanceDataKey::CostIndex, Some(0.0));
        self.update_destination_default_performance_data();

        self.delete_alternate_flight_plan();

        self.base
            .enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
        self.base
            .enqueue_operation(QueuedOperation::Restring(RestringOptions::ALL));
        self.base.flush_operation_queue()
    }
}
