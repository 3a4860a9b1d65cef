//! The flight plan and its mutation API.
//!
//! A [`FlightPlan`] composes two [`BaseFlightPlan`]s (the primary route and
//! the alternate), the performance data, fix info entries and the flight
//! number. All mutations go through methods here or on the base plan; each
//! one either fully applies and bumps the version counter, or fails with a
//! [`crate::error::FlightPlanError`] and leaves the plan untouched.
//!
//! Structural mutations enqueue deferred maintenance (restringing, arrival
//! rebuild) which is flushed before the mutation returns, so observers never
//! see a half-reconciled plan between calls.

mod alternate;
mod base;
mod builder;
mod direct_to;
mod fix_info;
mod procedure_ops;
mod restring;
mod serialization;
#[cfg(test)]
mod tests;

pub use base::{BaseFlightPlan, QueuedOperation, RestringOptions};
pub use builder::FlightPlanBuilder;
pub use fix_info::{FixInfoEntry, FIX_INFO_SLOTS};
pub use serialization::{SerializedFlightPlan, SerializedFlightPlanBody, SerializedSegments};

use std::sync::Arc;

use log::debug;

use crate::error::{FlightPlanError, Result};
use crate::events::{EventSinkHandle, FlightPlanEvent};
use crate::leg::{CruiseStepEntry, FlightPlanElement, FlightPlanLeg, HoldData};
use crate::navdata::Fix;
use crate::params::PresentPosition;
use crate::perf::{
    FlightPlanPerformanceData, FmsConfig, ImportedPerformanceData, PerformanceDataKey,
};
use crate::segment::{FlightPlanSegment, SegmentKind};

/// A complete flight plan: primary route, alternate route, performance data
/// and pilot entries. Built through [`FlightPlanBuilder`].
pub struct FlightPlan {
    pub(crate) index: usize,
    pub(crate) base: BaseFlightPlan,
    pub(crate) alternate: Box<BaseFlightPlan>,
    pub(crate) performance_data: FlightPlanPerformanceData,
    pub(crate) fix_infos: [Option<FixInfoEntry>; FIX_INFO_SLOTS],
    pub(crate) flight_number: Option<String>,
    pub(crate) config: FmsConfig,
    pub(crate) events: EventSinkHandle,
}

impl FlightPlan {
    /// Index of this plan within the surrounding flight plan manager.
    pub fn index(&self) -> usize {
        self.index
    }

    // ------------------------------------------------------------------
    // Primary plan queries (delegation)
    // ------------------------------------------------------------------

    pub fn version(&self) -> u64 {
        self.base.version()
    }

    pub fn leg_count(&self) -> usize {
        self.base.leg_count()
    }

    pub fn all_elements(&self) -> impl Iterator<Item = &FlightPlanElement> {
        self.base.all_elements()
    }

    pub fn element_at(&self, index: usize) -> Result<&FlightPlanElement> {
        self.base.element_at(index)
    }

    pub fn maybe_element_at(&self, index: usize) -> Option<&FlightPlanElement> {
        self.base.maybe_element_at(index)
    }

    pub fn leg_element_at(&self, index: usize) -> Result<&FlightPlanLeg> {
        self.base.leg_element_at(index)
    }

    pub fn segment(&self, kind: SegmentKind) -> &FlightPlanSegment {
        self.base.segment(kind)
    }

    pub fn active_leg_index(&self) -> usize {
        self.base.active_leg_index()
    }

    pub fn active_leg(&self) -> Option<&FlightPlanLeg> {
        self.base.active_leg()
    }

    pub fn first_missed_approach_leg_index(&self) -> usize {
        self.base.first_missed_approach_leg_index()
    }

    pub fn segment_position_for_index(&self, index: usize) -> Result<(SegmentKind, usize)> {
        self.base.segment_position_for_index(index)
    }

    pub fn first_index_of_segment(&self, kind: SegmentKind) -> usize {
        self.base.first_index_of_segment(kind)
    }

    pub fn origin_airport(&self) -> Option<&crate::navdata::Airport> {
        self.base.origin_airport()
    }

    pub fn origin_runway(&self) -> Option<&crate::navdata::Runway> {
        self.base.origin_runway()
    }

    pub fn destination_airport(&self) -> Option<&crate::navdata::Airport> {
        self.base.destination_airport()
    }

    pub fn destination_runway(&self) -> Option<&crate::navdata::Runway> {
        self.base.destination_runway()
    }

    // ------------------------------------------------------------------
    // Primary plan mutations (delegation, queue flushed per call)
    // ------------------------------------------------------------------

    pub fn set_active_leg_index(&mut self, index: usize) -> Result<()> {
        self.base.set_active_leg_index(index)
    }

    pub fn remove_element_at(&mut self, index: usize) -> Result<()> {
        self.base.remove_element_at(index)
    }

    pub fn insert_element_after(
        &mut self,
        index: usize,
        element: FlightPlanElement,
        insert_discontinuity: bool,
    ) -> Result<()> {
        self.base.insert_element_after(index, element, insert_discontinuity)
    }

    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.base.remove_range(start, end)
    }

    pub async fn set_origin_airport(&mut self, ident: &str) -> Result<()> {
        self.base.set_origin_airport(ident).await?;
        self.update_origin_default_performance_data();
        self.base.flush_operation_queue()
    }

    pub fn set_origin_runway(&mut self, runway_ident: Option<&str>) -> Result<()> {
        self.base.set_origin_runway(runway_ident)?;
        self.base.flush_operation_queue()
    }

    pub fn set_departure(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_departure(ident)?;
        self.base.flush_operation_queue()
    }

    pub fn set_departure_enroute_transition(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_departure_enroute_transition(ident)?;
        self.base.flush_operation_queue()
    }

    pub async fn set_destination_airport(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_destination_airport(ident).await?;
        self.update_destination_default_performance_data();
        self.base.flush_operation_queue()
    }

    pub fn set_destination_runway(&mut self, runway_ident: Option<&str>) -> Result<()> {
        self.base.set_destination_runway(runway_ident)?;
        self.base.flush_operation_queue()
    }

    pub fn set_arrival(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_arrival(ident)?;
        self.base.flush_operation_queue()
    }

    pub fn set_arrival_enroute_transition(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_arrival_enroute_transition(ident)?;
        self.base.flush_operation_queue()
    }

    pub fn set_approach(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_approach(ident)?;
        self.base.flush_operation_queue()
    }

    pub fn set_approach_via(&mut self, ident: Option<&str>) -> Result<()> {
        self.base.set_approach_via(ident)?;
        self.base.flush_operation_queue()
    }

    /// Diversion: truncate after the leg at `index` and fly to a new
    /// destination. Clears the alternate, whose origin is no longer valid.
    pub async fn new_dest(&mut self, index: usize, airport_ident: &str) -> Result<()> {
        self.base.new_dest(index, airport_ident).await?;
        self.update_destination_default_performance_data();
        self.delete_alternate_flight_plan();
        self.base.flush_operation_queue()
    }

    pub fn direct_to_leg(&mut self, ppos: &PresentPosition, target_index: usize) -> Result<()> {
        self.base.direct_to_leg(ppos, target_index)
    }

    pub fn direct_to_waypoint(&mut self, ppos: &PresentPosition, waypoint: &Fix) -> Result<()> {
        self.base.direct_to_waypoint(ppos, waypoint)
    }

    pub fn add_or_edit_manual_hold(&mut self, index: usize, hold: HoldData) -> Result<usize> {
        self.base.add_or_edit_manual_hold(index, hold)
    }

    pub fn set_pilot_entered_hold(&mut self, index: usize, hold: Option<HoldData>) -> Result<()> {
        self.base.set_pilot_entered_hold(index, hold)
    }

    pub fn set_cruise_step(&mut self, index: usize, step: CruiseStepEntry) -> Result<()> {
        self.base.set_cruise_step(index, step)
    }

    pub fn remove_cruise_step(&mut self, index: usize) -> Result<()> {
        self.base.remove_cruise_step(index)
    }

    // ------------------------------------------------------------------
    // Flight number
    // ------------------------------------------------------------------

    pub fn flight_number(&self) -> Option<&str> {
        self.flight_number.as_deref()
    }

    pub fn set_flight_number(&mut self, flight_number: &str) {
        self.flight_number = Some(flight_number.to_string());
        self.events.on_event(FlightPlanEvent::FlightNumberChanged {
            plan_index: self.index,
            for_alternate: false,
            flight_number: flight_number.to_string(),
        });
        self.base.increment_version();
    }

    // ------------------------------------------------------------------
    // Fix info
    // ------------------------------------------------------------------

    /// The fix info entry in `slot` (1 through [`FIX_INFO_SLOTS`]).
    pub fn fix_info(&self, slot: usize) -> Result<Option<&FixInfoEntry>> {
        Ok(self.fix_infos[Self::fix_info_slot_index(slot)?].as_ref())
    }

    /// Sets or clears the fix info entry in `slot`.
    pub fn set_fix_info(&mut self, slot: usize, entry: Option<FixInfoEntry>) -> Result<()> {
        let index = Self::fix_info_slot_index(slot)?;
        self.fix_infos[index] = entry.clone();

        self.events.on_event(FlightPlanEvent::FixInfoChanged {
            plan_index: self.index,
            for_alternate: false,
            slot,
            entry,
        });
        self.base.increment_version();
        Ok(())
    }

    /// Edits the fix info entry in `slot` in place. The callback receives the
    /// current entry and returns its replacement; returning `None` clears the
    /// slot. Observers are notified with the resulting entry.
    pub fn edit_fix_info_entry(
        &mut self,
        slot: usize,
        edit: impl FnOnce(Option<FixInfoEntry>) -> Option<FixInfoEntry>,
    ) -> Result<()> {
        let index = Self::fix_info_slot_index(slot)?;
        let entry = edit(self.fix_infos[index].take());
        self.fix_infos[index] = entry.clone();

        self.events.on_event(FlightPlanEvent::FixInfoChanged {
            plan_index: self.index,
            for_alternate: false,
            slot,
            entry,
        });
        self.base.increment_version();
        Ok(())
    }

    fn fix_info_slot_index(slot: usize) -> Result<usize> {
        if slot == 0 || slot > FIX_INFO_SLOTS {
            return Err(FlightPlanError::OutOfRange {
                index: slot,
                length: FIX_INFO_SLOTS,
            });
        }
        Ok(slot - 1)
    }

    // ------------------------------------------------------------------
    // Performance data
    // ------------------------------------------------------------------

    pub fn performance_data(&self) -> &FlightPlanPerformanceData {
        &self.performance_data
    }

    /// Writes one performance parameter and notifies observers.
    pub fn set_performance_data(&mut self, key: PerformanceDataKey, value: Option<f64>) {
        self.performance_data.set(key, value);
        self.events.on_event(FlightPlanEvent::PerformanceDataChanged {
            plan_index: self.index,
            for_alternate: false,
            key,
            value,
        });
        self.base.increment_version();
    }

    /// Applies uplinked performance values in one step.
    pub fn set_imported_performance_data(&mut self, data: ImportedPerformanceData) {
        self.set_performance_data(
            PerformanceDataKey::DatabaseTransitionAltitude,
            data.departure_transition_altitude,
        );
        self.set_performance_data(
            PerformanceDataKey::DatabaseTransitionLevel,
            data.destination_transition_level,
        );
        self.set_performance_data(PerformanceDataKey::CostIndex, data.cost_index);
        self.set_performance_data(
            PerformanceDataKey::CruiseFlightLevel,
            data.cruise_flight_level,
        );
    }

    /// Lowers the thrust reduction altitude so it does not exceed the lowest
    /// climb constraint in the plan, rounded to the nearest 10 feet. Both the
    /// default and any pilot entry are clamped. Returns whether a change was
    /// made.
    pub fn reconcile_thrust_reduction_with_constraints(&mut self) -> bool {
        self.reconcile_altitude_with_constraints(
            PerformanceDataKey::DefaultThrustReductionAltitude,
            PerformanceDataKey::PilotThrustReductionAltitude,
        )
    }

    /// Same reconciliation for the acceleration altitude.
    pub fn reconcile_acceleration_with_constraints(&mut self) -> bool {
        self.reconcile_altitude_with_constraints(
            PerformanceDataKey::DefaultAccelerationAltitude,
            PerformanceDataKey::PilotAccelerationAltitude,
        )
    }

    fn reconcile_altitude_with_constraints(
        &mut self,
        default_key: PerformanceDataKey,
        pilot_key: PerformanceDataKey,
    ) -> bool {
        let Some(lowest) = self.base.lowest_climb_constraint() else {
            return false;
        };
        let lowest = (lowest / 10.0).round() * 10.0;

        let effective = self
            .performance_data
            .get(pilot_key)
            .or(self.performance_data.get(default_key));
        let Some(effective) = effective else {
            return false;
        };

        if effective <= lowest {
            return false;
        }

        debug!(
            "plan {}: clamping {default_key:?} to climb constraint {lowest}",
            self.index
        );

        if let Some(default) = self.performance_data.get(default_key) {
            self.set_performance_data(default_key, Some(default.min(lowest)));
        }
        if let Some(pilot) = self.performance_data.get(pilot_key) {
            self.set_performance_data(pilot_key, Some(pilot.min(lowest)));
        }

        true
    }

    /// Re-derives the takeoff altitude defaults from the origin elevation and
    /// the configured AGL offsets, discarding pilot entries that referred to
    /// the previous origin.
    pub(crate) fn update_origin_default_performance_data(&mut self) {
        let elevation = self.base.origin_airport().map(|it| it.elevation);

        let defaults = [
            (
                PerformanceDataKey::DefaultThrustReductionAltitude,
                PerformanceDataKey::PilotThrustReductionAltitude,
                self.config.thrust_reduction_altitude_offset,
            ),
            (
                PerformanceDataKey::DefaultAccelerationAltitude,
                PerformanceDataKey::PilotAccelerationAltitude,
                self.config.acceleration_altitude_offset,
            ),
            (
                PerformanceDataKey::DefaultEngineOutAccelerationAltitude,
                PerformanceDataKey::PilotEngineOutAccelerationAltitude,
                self.config.engine_out_acceleration_altitude_offset,
            ),
        ];

        for (default_key, pilot_key, offset) in defaults {
            let value = elevation.map(|it| ((it + offset) / 10.0).round() * 10.0);
            self.set_performance_data(default_key, value);
            self.set_performance_data(pilot_key, None);
        }
    }

    /// Same derivation for the missed approach altitudes at the destination.
    pub(crate) fn update_destination_default_performance_data(&mut self) {
        let elevation = self.base.destination_airport().map(|it| it.elevation);

        let defaults = [
            (
                PerformanceDataKey::DefaultMissedThrustReductionAltitude,
                PerformanceDataKey::PilotMissedThrustReductionAltitude,
                self.config.thrust_reduction_altitude_offset,
            ),
            (
                PerformanceDataKey::DefaultMissedAccelerationAltitude,
                PerformanceDataKey::PilotMissedAccelerationAltitude,
                self.config.acceleration_altitude_offset,
            ),
            (
                PerformanceDataKey::DefaultMissedEngineOutAccelerationAltitude,
                PerformanceDataKey::PilotMissedEngineOutAccelerationAltitude,
                self.config.engine_out_acceleration_altitude_offset,
            ),
        ];

        for (default_key, pilot_key, offset) in defaults {
            let value = elevation.map(|it| ((it + offset) / 10.0).round() * 10.0);
            self.set_performance_data(default_key, value);
            self.set_performance_data(pilot_key, None);
        }
    }

    // ------------------------------------------------------------------
    // Cloning and serialization
    // ------------------------------------------------------------------

    /// Deep-copies this plan into a new plan index. Mutating either copy
    /// never affects the other; externally owned records stay shared.
    pub fn clone_plan(&self, index: usize) -> Self {
        Self {
            index,
            base: self.base.clone_plan(index),
            alternate: Box::new(self.alternate.clone_plan(index)),
            performance_data: self.performance_data.clone(),
            fix_infos: self.fix_infos.clone(),
            flight_number: self.flight_number.clone(),
            config: self.config,
            events: Arc::clone(&self.events),
        }
    }

    /// Snapshots the full plan, alternate included.
    pub fn serialize(&self) -> SerializedFlightPlan {
        SerializedFlightPlan {
            body: self.base.serialize_body(),
            alternate_flight_plan: self.alternate.serialize_body(),
            fix_info: self.fix_infos.to_vec(),
            performance_data: self.performance_data.clone(),
            flight_number: self.flight_number.clone(),
        }
    }

    /// Snapshots the full plan as a JSON document, suitable for persistence
    /// across a power cycle.
    pub fn serialize_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    /// Restores this plan from a JSON snapshot produced by
    /// [`Self::serialize_to_json`], re-resolving procedures against the
    /// navigation database.
    pub async fn restore_from_json(&mut self, json: &str) -> Result<()> {
        let serialized: SerializedFlightPlan = serde_json::from_str(json)?;
        self.restore_from_serialized(&serialized).await
    }

    pub(crate) async fn restore_from_serialized(
        &mut self,
        serialized: &SerializedFlightPlan,
    ) -> Result<()> {
        self.base.set_from_serialized_body(&serialized.body).await?;
        self.alternate
            .set_from_serialized_body(&serialized.alternate_flight_plan)
            .await?;

        self.fix_infos = serialization::fix_info_from_serialized(&serialized.fix_info);
        self.performance_data = serialized.performance_data.clone();
        self.flight_number = serialized.flight_number.clone();

        self.base.increment_version();
        Ok(())
    }
}
