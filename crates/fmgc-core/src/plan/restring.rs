//! Restringing: reconciling leg connectivity at segment boundaries.
//!
//! After any structural edit the plan's segments may overlap (a procedure
//! repeats the fix the previous segment ends at) or may be geometrically
//! disconnected (the previous segment ends in vectors). The restring pass
//! walks each boundary between non-empty segments and either collapses the
//! duplicated termination or inserts an explicit discontinuity.

use log::trace;

use crate::error::Result;
use crate::leg::{FlightPlanElement, LegType};
use crate::segment::{SegmentClass, SegmentKind};

use super::base::{BaseFlightPlan, RestringOptions};

impl BaseFlightPlan {
    /// Reconciles all segment boundaries within the requested scope. Runs as
    /// a queued operation during a flush; idempotent on an already-consistent
    /// plan.
    pub(crate) fn restring(&mut self, options: RestringOptions) -> Result<()> {
        let populated: Vec<SegmentKind> = SegmentKind::ALL
            .iter()
            .copied()
            .filter(|&kind| !self.segment(kind).is_empty())
            .collect();

        // Skipping already-strung boundaries must use the flags as they were
        // when the pass started, not flags this pass sets itself
        let strung_at_start: Vec<bool> = SegmentKind::ALL
            .iter()
            .map(|&kind| self.segment(kind).strung)
            .collect();

        for pair in populated.windows(2) {
            let (prev, next) = (pair[0], pair[1]);

            let touches_departure = prev.class() == SegmentClass::Departure
                || next.class() == SegmentClass::Departure;
            let touches_arrival =
                prev.class() == SegmentClass::Arrival || next.class() == SegmentClass::Arrival;
            let in_scope = (options.departure && touches_departure)
                || (options.arrival && touches_arrival);
            if !in_scope {
                continue;
            }

            if strung_at_start[prev.position()] && strung_at_start[next.position()] {
                continue;
            }

            self.string_boundary(prev, next);
        }

        self.trim_leading_discontinuity();
        Ok(())
    }

    /// Reconciles one boundary between two non-empty segments.
    fn string_boundary(&mut self, prev_kind: SegmentKind, next_kind: SegmentKind) {
        trace!("plan {}: stringing {prev_kind:?} -> {next_kind:?}", self.index);

        let prev_ends_open = self
            .segment(prev_kind)
            .last_element()
            .is_some_and(FlightPlanElement::is_discontinuity);

        if !prev_ends_open {
            if let Some(prev_last) = self.segment(prev_kind).last_leg() {
                if prev_last.is_vectors() {
                    // A manual termination never connects; the gap is explicit
                    self.ensure_leading_discontinuity(next_kind);
                } else if prev_last.is_xf() {
                    let termination = prev_last.termination_waypoint().cloned();

                    if let Some(termination) = termination {
                        let duplicate = self
                            .segment(next_kind)
                            .all_legs
                            .iter()
                            .position(|element| {
                                element
                                    .as_leg()
                                    .is_some_and(|leg| leg.terminates_with_waypoint(&termination))
                            });

                        match duplicate {
                            Some(index) => {
                                let global_start = self.first_index_of_segment(next_kind);
                                self.segment_mut(next_kind).all_legs.drain(..=index);
                                self.note_elements_removed(global_start, index + 1);
                            }
                            None => {
                                let next_declares_new_start = self
                                    .segment(next_kind)
                                    .first_leg()
                                    .is_some_and(|leg| leg.leg_type == LegType::IF);
                                if next_declares_new_start {
                                    self.ensure_leading_discontinuity(next_kind);
                                }
                            }
                        }
                    }
                } else {
                    // Course/heading terminations (CA, VA, CI, ...) connect
                    // onto anything except a new initial fix
                    let next_declares_new_start = self
                        .segment(next_kind)
                        .first_leg()
                        .is_some_and(|leg| leg.leg_type == LegType::IF);
                    if next_declares_new_start {
                        self.ensure_leading_discontinuity(next_kind);
                    }
                }
            }
        } else if self
            .segment(next_kind)
            .all_legs
            .first()
            .is_some_and(FlightPlanElement::is_discontinuity)
        {
            // Gap on both sides of the boundary collapses to one
            let global_start = self.first_index_of_segment(next_kind);
            self.segment_mut(next_kind).all_legs.remove(0);
            self.note_elements_removed(global_start, 1);
        }

        self.segment_mut(prev_kind).strung = true;
        self.segment_mut(next_kind).strung = true;
        if prev_kind == SegmentKind::Enroute {
            self.segment_mut(next_kind).strung_enroute = true;
        }
        if next_kind == SegmentKind::Enroute {
            self.segment_mut(prev_kind).strung_enroute = true;
        }
    }

    fn ensure_leading_discontinuity(&mut self, kind: SegmentKind) {
        let segment = self.segment_mut(kind);
        let already_open = segment
            .all_legs
            .first()
            .is_some_and(FlightPlanElement::is_discontinuity);

        if !already_open {
            segment.all_legs.insert(0, FlightPlanElement::Discontinuity);
        }
    }

    /// A plan never starts with a discontinuity.
    fn trim_leading_discontinuity(&mut self) {
        let first_populated = SegmentKind::ALL
            .iter()
            .copied()
            .find(|&kind| !self.segment(kind).is_empty());

        if let Some(kind) = first_populated {
            let starts_open = self
                .segment(kind)
                .all_legs
                .first()
                .is_some_and(FlightPlanElement::is_discontinuity);

            if starts_open {
                self.segment_mut(kind).all_legs.remove(0);
                self.note_elements_removed(0, 1);
            }
        }
    }
}
