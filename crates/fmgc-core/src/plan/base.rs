//! Segment-spanning flight plan state and operations.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, trace};
use tokio::task;

use crate::error::{FlightPlanError, Result};
use crate::leg::{ConstraintType, CruiseStepEntry, FlightPlanElement, FlightPlanLeg, HoldData};
use crate::navdata::{
    AltitudeDescriptor, Airport, Approach, Arrival, DatabaseHandle, Departure,
    NavigationDatabase, ProcedureTransition, Runway,
};
use crate::segment::{FlightPlanSegment, SegmentClass, SegmentKind};

/// A deferred whole-plan maintenance operation, processed by
/// [`BaseFlightPlan::flush_operation_queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuedOperation {
    /// Re-derive which arrival/approach/transition combination is still valid
    /// given the current selections.
    RebuildArrivalAndApproach,
    /// Recompute inter-segment leg connectivity.
    Restring(RestringOptions),
}

/// Scope flags for a queued restring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestringOptions {
    pub departure: bool,
    pub arrival: bool,
}

impl RestringOptions {
    pub const ALL: RestringOptions = RestringOptions {
        departure: true,
        arrival: true,
    };
    pub const DEPARTURE: RestringOptions = RestringOptions {
        departure: true,
        arrival: false,
    };
    pub const ARRIVAL: RestringOptions = RestringOptions {
        departure: false,
        arrival: true,
    };

    fn merge(self, other: RestringOptions) -> RestringOptions {
        RestringOptions {
            departure: self.departure || other.departure,
            arrival: self.arrival || other.arrival,
        }
    }
}

/// A flight plan as an ordered collection of phase segments, plus the global
/// state that spans them: active leg index, version counter and the pending
/// operation queue.
///
/// This is also the shape of an alternate flight plan; the parent
/// [`crate::plan::FlightPlan`] composes two of these.
pub struct BaseFlightPlan {
    pub(crate) index: usize,
    pub(crate) for_alternate: bool,
    pub(crate) segments: Vec<FlightPlanSegment>,
    pub(crate) database: DatabaseHandle,

    active_leg_index: usize,
    version: u64,
    pending_operations: VecDeque<QueuedOperation>,

    pub(crate) origin_airport: Option<Airport>,
    pub(crate) origin_runway: Option<Runway>,
    pub(crate) destination_airport: Option<Airport>,
    pub(crate) destination_runway: Option<Runway>,

    pub(crate) available_origin_runways: Vec<Runway>,
    pub(crate) available_departures: Vec<Arc<Departure>>,
    pub(crate) available_destination_runways: Vec<Runway>,
    pub(crate) available_arrivals: Vec<Arc<Arrival>>,
    pub(crate) available_approaches: Vec<Arc<Approach>>,
    pub(crate) available_approach_vias: Vec<Arc<ProcedureTransition>>,
}

impl BaseFlightPlan {
    pub(crate) fn new(index: usize, for_alternate: bool, database: DatabaseHandle) -> Self {
        Self {
            index,
            for_alternate,
            segments: SegmentKind::ALL.iter().map(|&kind| FlightPlanSegment::new(kind)).collect(),
            database,
            active_leg_index: 0,
            version: 0,
            pending_operations: VecDeque::new(),
            origin_airport: None,
            origin_runway: None,
            destination_airport: None,
            destination_runway: None,
            available_origin_runways: Vec::new(),
            available_departures: Vec::new(),
            available_destination_runways: Vec::new(),
            available_arrivals: Vec::new(),
            available_approaches: Vec::new(),
            available_approach_vias: Vec::new(),
        }
    }

    /// Runs a blocking navigation database lookup on the blocking pool.
    pub(crate) async fn with_database<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn NavigationDatabase) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let database = Arc::clone(&self.database);

        task::spawn_blocking(move || f(database.as_ref()))
            .await
            .map_err(|e| FlightPlanError::internal(format!("task join error: {e}")))?
    }

    // ------------------------------------------------------------------
    // Segment access
    // ------------------------------------------------------------------

    pub fn segment(&self, kind: SegmentKind) -> &FlightPlanSegment {
        &self.segments[kind.position()]
    }

    pub(crate) fn segment_mut(&mut self, kind: SegmentKind) -> &mut FlightPlanSegment {
        &mut self.segments[kind.position()]
    }

    // ------------------------------------------------------------------
    // Index machinery
    // ------------------------------------------------------------------

    /// All elements of the plan in sequence order.
    pub fn all_elements(&self) -> impl Iterator<Item = &FlightPlanElement> {
        self.segments.iter().flat_map(|segment| segment.all_legs.iter())
    }

    /// Total number of elements in the plan.
    pub fn leg_count(&self) -> usize {
        self.segments.iter().map(FlightPlanSegment::leg_count).sum()
    }

    /// The element at a global index, if the index is within the plan.
    pub fn maybe_element_at(&self, index: usize) -> Option<&FlightPlanElement> {
        self.all_elements().nth(index)
    }

    /// The element at a global index.
    pub fn element_at(&self, index: usize) -> Result<&FlightPlanElement> {
        self.maybe_element_at(index).ok_or(FlightPlanError::OutOfRange {
            index,
            length: self.leg_count(),
        })
    }

    /// The leg at a global index; a discontinuity there is an error.
    pub fn leg_element_at(&self, index: usize) -> Result<&FlightPlanLeg> {
        self.element_at(index)?
            .as_leg()
            .ok_or(FlightPlanError::NotALeg { index })
    }

    pub(crate) fn leg_element_at_mut(&mut self, index: usize) -> Result<&mut FlightPlanLeg> {
        let length = self.leg_count();
        self.segments
            .iter_mut()
            .flat_map(|segment| segment.all_legs.iter_mut())
            .nth(index)
            .ok_or(FlightPlanError::OutOfRange { index, length })?
            .as_leg_mut()
            .ok_or(FlightPlanError::NotALeg { index })
    }

    /// Maps a global index to its owning segment and the local index within
    /// that segment.
    pub fn segment_position_for_index(&self, index: usize) -> Result<(SegmentKind, usize)> {
        let mut accumulator = 0;

        for segment in &self.segments {
            let count = segment.leg_count();
            if index < accumulator + count {
                return Ok((segment.kind, index - accumulator));
            }
            accumulator += count;
        }

        Err(FlightPlanError::OutOfRange {
            index,
            length: accumulator,
        })
    }

    /// The global index of the first element of a segment.
    pub fn first_index_of_segment(&self, kind: SegmentKind) -> usize {
        self.segments
            .iter()
            .take_while(|segment| segment.kind != kind)
            .map(FlightPlanSegment::leg_count)
            .sum()
    }

    /// The stable boundary beyond which direct-to and most revisions are
    /// forbidden: the first index of the missed approach segment.
    pub fn first_missed_approach_leg_index(&self) -> usize {
        self.first_index_of_segment(SegmentKind::MissedApproach)
    }

    // ------------------------------------------------------------------
    // Active leg
    // ------------------------------------------------------------------

    /// Index of the active leg. Equal to [`Self::leg_count`] when the
    /// sequence is complete.
    pub fn active_leg_index(&self) -> usize {
        self.active_leg_index
    }

    pub fn active_leg(&self) -> Option<&FlightPlanLeg> {
        self.maybe_element_at(self.active_leg_index)
            .and_then(FlightPlanElement::as_leg)
    }

    pub fn set_active_leg_index(&mut self, index: usize) -> Result<()> {
        if index > self.leg_count() {
            return Err(FlightPlanError::OutOfRange {
                index,
                length: self.leg_count(),
            });
        }

        self.active_leg_index = index;
        self.increment_version();
        Ok(())
    }

    /// Shifts the active leg index after `removed` elements before it were
    /// deleted, clamping to the end of the plan.
    fn adjust_active_leg_index(&mut self, removed_before_active: usize) {
        self.active_leg_index = self
            .active_leg_index
            .saturating_sub(removed_before_active)
            .min(self.leg_count());
    }

    /// Records that `count` elements starting at `global_start` were removed
    /// by an internal pass, keeping the active leg index pointing at the same
    /// leg.
    pub(crate) fn note_elements_removed(&mut self, global_start: usize, count: usize) {
        let removed_before_active = (global_start + count)
            .min(self.active_leg_index)
            .saturating_sub(global_start.min(self.active_leg_index));
        self.adjust_active_leg_index(removed_before_active);
    }

    // ------------------------------------------------------------------
    // Versioning
    // ------------------------------------------------------------------

    /// Monotonic change counter, the single authoritative "plan changed"
    /// signal consumed by external observers.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Must be called by every mutating operation before it returns.
    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    // ------------------------------------------------------------------
    // Operation queue
    // ------------------------------------------------------------------

    /// Enqueues a deferred maintenance operation, deduplicating by kind.
    /// Restring scopes are merged rather than queued twice.
    pub fn enqueue_operation(&mut self, operation: QueuedOperation) {
        match operation {
            QueuedOperation::RebuildArrivalAndApproach => {
                let already_queued = self
                    .pending_operations
                    .iter()
                    .any(|it| matches!(it, QueuedOperation::RebuildArrivalAndApproach));

                if !already_queued {
                    self.pending_operations.push_back(operation);
                }
            }
            QueuedOperation::Restring(options) => {
                for queued in &mut self.pending_operations {
                    if let QueuedOperation::Restring(existing) = queued {
                        *existing = existing.merge(options);
                        return;
                    }
                }

                self.pending_operations.push_back(QueuedOperation::Restring(options));
            }
        }
    }

    /// Drains the queued operations in enqueue order. Each handler is
    /// idempotent; the first failure aborts the flush and surfaces the error
    /// without applying the remaining operations.
    pub fn flush_operation_queue(&mut self) -> Result<()> {
        let mut ran_any = false;

        while let Some(operation) = self.pending_operations.pop_front() {
            trace!(
                "plan {} (alternate: {}): flushing {operation:?}",
                self.index,
                self.for_alternate
            );

            match operation {
                QueuedOperation::RebuildArrivalAndApproach => self.rebuild_arrival_and_approach()?,
                QueuedOperation::Restring(options) => self.restring(options)?,
            }

            ran_any = true;
        }

        if ran_any {
            self.increment_version();
        }

        Ok(())
    }

    pub(crate) fn has_pending_operations(&self) -> bool {
        !self.pending_operations.is_empty()
    }

    // ------------------------------------------------------------------
    // Element mutations
    // ------------------------------------------------------------------

    /// Removes the element at a global index.
    pub fn remove_element_at(&mut self, index: usize) -> Result<()> {
        let (kind, local) = self.segment_position_for_index(index)?;
        let active = self.active_leg_index;
        let length_before = self.leg_count();

        self.segment_mut(kind).all_legs.remove(local);
        self.dedupe_discontinuities_in(kind);

        // The dedupe may collapse a second discontinuity made adjacent by the
        // removal. Every element it drops sits at the removal point, so the
        // full delta shifts the active leg whenever the removal was ahead of
        // it.
        let removed = length_before - self.leg_count();
        if index < active {
            self.adjust_active_leg_index(removed);
        } else {
            self.adjust_active_leg_index(0);
        }

        self.increment_version();
        Ok(())
    }

    /// Inserts an element after the given global index, optionally followed
    /// by a discontinuity.
    pub fn insert_element_after(
        &mut self,
        index: usize,
        element: FlightPlanElement,
        insert_discontinuity: bool,
    ) -> Result<()> {
        let (kind, local) = self.segment_position_for_index(index)?;

        let element = match element {
            FlightPlanElement::Leg(leg) => FlightPlanElement::Leg(leg.clone_for_segment(kind)),
            FlightPlanElement::Discontinuity => FlightPlanElement::Discontinuity,
        };

        let segment = self.segment_mut(kind);
        segment.all_legs.insert(local + 1, element);
        if insert_discontinuity {
            segment.all_legs.insert(local + 2, FlightPlanElement::Discontinuity);
        }

        // Insertion ahead of the active leg pushes it down the index space
        if index + 1 <= self.active_leg_index {
            let inserted = if insert_discontinuity { 2 } else { 1 };
            self.active_leg_index += inserted;
        }

        self.increment_version();
        Ok(())
    }

    /// Removes elements in the half-open global range `[start, end)` across
    /// segment boundaries. An end past the plan length is clamped; a start
    /// greater than the end is an error.
    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(FlightPlanError::precondition(format!(
                "invalid removal range: {start} > {end}"
            )));
        }

        let length = self.leg_count();
        if start >= length {
            return Err(FlightPlanError::OutOfRange {
                index: start,
                length,
            });
        }
        let end = end.min(length);

        let active = self.active_leg_index;
        let removed_before_active = end.min(active).saturating_sub(start.min(active));

        let mut offset = 0;
        for segment in &mut self.segments {
            let count = segment.all_legs.len();
            let segment_start = offset;
            let segment_end = offset + count;
            offset = segment_end;

            let overlap_start = start.max(segment_start);
            let overlap_end = end.min(segment_end);
            if overlap_start < overlap_end {
                segment
                    .all_legs
                    .drain(overlap_start - segment_start..overlap_end - segment_start);
            }
        }

        self.adjust_active_leg_index(removed_before_active);
        self.increment_version();
        Ok(())
    }

    /// Splits the concatenated leg sequence at a global index, re-homing the
    /// boundary legs into the enroute segment so that a global-index-based
    /// revision can operate within a single segment. Preserves total order.
    ///
    /// For an index in a departure-class segment, that segment's legs from
    /// the local index onward plus everything in later departure segments
    /// move to the front of enroute. For an arrival-class index, everything
    /// from the start of the arrival portion up to and including the index
    /// moves to the back of enroute.
    pub fn redistribute_legs_at(&mut self, index: usize) -> usize {
        let Ok((kind, local)) = self.segment_position_for_index(index) else {
            return 0;
        };

        let enroute_position = SegmentKind::Enroute.position();
        let target_position = kind.position();

        let mut moved: Vec<FlightPlanElement> = Vec::new();

        match kind.class() {
            SegmentClass::Enroute => return 0,
            SegmentClass::Departure => {
                moved.extend(self.segments[target_position].all_legs.split_off(local));
                for position in target_position + 1..enroute_position {
                    moved.append(&mut self.segments[position].all_legs);
                }

                for element in &mut moved {
                    if let FlightPlanElement::Leg(leg) = element {
                        leg.segment = SegmentKind::Enroute;
                    }
                }

                let enroute = &mut self.segments[enroute_position];
                let count = moved.len();
                moved.append(&mut enroute.all_legs);
                enroute.all_legs = moved;

                self.segments[target_position].strung = true;
                if count > 0 {
                    self.increment_version();
                }
                count
            }
            SegmentClass::Arrival => {
                for position in enroute_position + 1..target_position {
                    moved.append(&mut self.segments[position].all_legs);
                }
                moved.extend(self.segments[target_position].all_legs.drain(..=local));

                for element in &mut moved {
                    if let FlightPlanElement::Leg(leg) = element {
                        leg.segment = SegmentKind::Enroute;
                    }
                }

                let count = moved.len();
                self.segments[enroute_position].all_legs.append(&mut moved);

                self.segments[target_position].strung = true;
                if count > 0 {
                    self.increment_version();
                }
                count
            }
        }
    }

    /// Removes adjacent duplicate discontinuities inside one segment.
    pub(crate) fn dedupe_discontinuities_in(&mut self, kind: SegmentKind) {
        let segment = self.segment_mut(kind);
        segment
            .all_legs
            .dedup_by(|a, b| a.is_discontinuity() && b.is_discontinuity());
    }

    // ------------------------------------------------------------------
    // Constraint queries (hooks for vertical guidance)
    // ------------------------------------------------------------------

    /// The lowest constraining altitude among all climb-phase constraints in
    /// the plan, if any. Derived on demand, never stored.
    pub fn lowest_climb_constraint(&self) -> Option<f64> {
        self.all_elements()
            .filter_map(FlightPlanElement::as_leg)
            .filter(|leg| leg.constraint_type == ConstraintType::Climb)
            .filter_map(|leg| leg.definition.altitude_constraint)
            .filter_map(|constraint| match constraint.descriptor {
                AltitudeDescriptor::AtAlt1
                | AltitudeDescriptor::AtOrBelowAlt1
                | AltitudeDescriptor::BetweenAlt1Alt2 => Some(constraint.altitude1),
                AltitudeDescriptor::AtOrAboveAlt1 | AltitudeDescriptor::AtOrAboveAlt2 => None,
            })
            .fold(None, |lowest, altitude| {
                Some(lowest.map_or(altitude, |it: f64| it.min(altitude)))
            })
    }

    // ------------------------------------------------------------------
    // Hold and cruise step annotations
    // ------------------------------------------------------------------

    /// Adds a manual hold at the leg at `index`, or edits the hold already
    /// there. An HM leg in place receives the pilot-entered parameters; any
    /// other XF leg gets an HM leg inserted after it.
    ///
    /// Returns the index of the holding leg.
    pub fn add_or_edit_manual_hold(&mut self, index: usize, hold: HoldData) -> Result<usize> {
        if self.leg_element_at(index)?.is_hx() {
            let leg = self.leg_element_at_mut(index)?;
            leg.modified_hold = Some(hold);
            self.increment_version();
            return Ok(index);
        }

        let waypoint = self
            .leg_element_at(index)?
            .termination_waypoint()
            .cloned()
            .ok_or_else(|| FlightPlanError::precondition("cannot hold at a leg without a fix termination"))?;
        let (kind, _) = self.segment_position_for_index(index)?;

        let mut hold_leg = FlightPlanLeg::manual_hold(kind, waypoint, &hold);
        hold_leg.modified_hold = Some(hold);
        self.insert_element_after(index, FlightPlanElement::Leg(hold_leg), false)?;

        Ok(index + 1)
    }

    /// Sets or clears the pilot-entered hold parameters of the leg at `index`.
    pub fn set_pilot_entered_hold(&mut self, index: usize, hold: Option<HoldData>) -> Result<()> {
        let leg = self.leg_element_at_mut(index)?;
        leg.modified_hold = hold;
        self.increment_version();
        Ok(())
    }

    /// Attaches a scheduled cruise step to the leg at `index`.
    pub fn set_cruise_step(&mut self, index: usize, step: CruiseStepEntry) -> Result<()> {
        let leg = self.leg_element_at_mut(index)?;
        leg.cruise_step = Some(step);
        self.increment_version();
        Ok(())
    }

    /// Removes the cruise step from the leg at `index`, if any.
    pub fn remove_cruise_step(&mut self, index: usize) -> Result<()> {
        let leg = self.leg_element_at_mut(index)?;
        leg.cruise_step = None;
        self.increment_version();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Context accessors
    // ------------------------------------------------------------------

    pub fn origin_airport(&self) -> Option<&Airport> {
        self.origin_airport.as_ref()
    }

    pub fn origin_runway(&self) -> Option<&Runway> {
        self.origin_runway.as_ref()
    }

    pub fn destination_airport(&self) -> Option<&Airport> {
        self.destination_airport.as_ref()
    }

    pub fn destination_runway(&self) -> Option<&Runway> {
        self.destination_runway.as_ref()
    }

    pub fn available_origin_runways(&self) -> &[Runway] {
        &self.available_origin_runways
    }

    pub fn available_destination_runways(&self) -> &[Runway] {
        &self.available_destination_runways
    }

    /// Deep-copies this plan: every non-discontinuity element is a distinct
    /// owned copy; externally owned records stay shared.
    pub fn clone_plan(&self, index: usize) -> Self {
        let mut clone = Self::new(index, self.for_alternate, Arc::clone(&self.database));

        clone.version = self.version;
        clone.active_leg_index = self.active_leg_index;
        clone.segments = self.segments.iter().map(FlightPlanSegment::clone_for_plan).collect();

        clone.origin_airport = self.origin_airport.clone();
        clone.origin_runway = self.origin_runway.clone();
        clone.destination_airport = self.destination_airport.clone();
        clone.destination_runway = self.destination_runway.clone();

        clone.available_origin_runways = self.available_origin_runways.clone();
        clone.available_departures = self.available_departures.clone();
        clone.available_destination_runways = self.available_destination_runways.clone();
        clone.available_arrivals = self.available_arrivals.clone();
        clone.available_approaches = self.available_approaches.clone();
        clone.available_approach_vias = self.available_approach_vias.clone();

        debug!(
            "plan {}: cloned into plan {index} at version {}",
            self.index, self.version
        );

        clone
    }
}
