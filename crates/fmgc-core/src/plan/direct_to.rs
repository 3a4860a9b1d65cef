//! Direct-to revisions.
//!
//! A direct-to replaces everything between the aircraft and the chosen point
//! with a synthetic turning point at the present position followed by a DF
//! leg onto the target. The target can be a leg already in the plan or an
//! arbitrary fix; the fix form degrades to the leg form when the fix already
//! terminates a leg.

use log::debug;

use crate::error::{FlightPlanError, Result};
use crate::geo::true_to_magnetic;
use crate::leg::{FlightPlanElement, FlightPlanLeg, LegFlags, LegType};
use crate::navdata::Fix;
use crate::params::PresentPosition;
use crate::segment::SegmentKind;

use super::base::BaseFlightPlan;

impl BaseFlightPlan {
    /// Goes direct to the leg at `target_index`. The target must be a
    /// fix-terminating leg ahead of the missed approach.
    ///
    /// Afterwards the plan starts with the turning point, the direct leg onto
    /// the target's fix is active, and everything that preceded the target is
    /// gone.
    pub fn direct_to_leg(
        &mut self,
        ppos: &PresentPosition,
        target_index: usize,
    ) -> Result<()> {
        if target_index >= self.first_missed_approach_leg_index() {
            return Err(FlightPlanError::precondition(
                "cannot go direct to a missed approach leg",
            ));
        }

        let target = self.leg_element_at(target_index)?;
        if !target.is_xf() {
            return Err(FlightPlanError::precondition(
                "cannot go direct to a leg without a fix termination",
            ));
        }

        debug!(
            "plan {}: direct to leg {target_index} ({})",
            self.index, target.ident
        );

        let magnetic_course = true_to_magnetic(ppos.true_track, ppos.magnetic_variation);

        // Re-home everything between the plan start and the target into the
        // enroute segment so the splice happens within one segment
        self.redistribute_legs_at(0);
        self.redistribute_legs_at(target_index);

        let (kind, local) = self.segment_position_for_index(target_index)?;
        if kind != SegmentKind::Enroute {
            return Err(FlightPlanError::internal(
                "direct-to target not in enroute after leg redistribution",
            ));
        }

        let target = self
            .segment(SegmentKind::Enroute)
            .all_legs[local]
            .as_leg()
            .ok_or(FlightPlanError::NotALeg { index: target_index })?
            .clone();
        let target_fix = target
            .termination_waypoint()
            .cloned()
            .ok_or_else(|| FlightPlanError::precondition("direct-to target has no fix"))?;

        let mut turning_point = FlightPlanLeg::turning_point(
            SegmentKind::Enroute,
            ppos.coordinates,
            magnetic_course,
        );
        turning_point.flags.insert(LegFlags::DIRECT_TO_TURNING_POINT);

        let turn_end = FlightPlanLeg::direct_to_turn_end(SegmentKind::Enroute, target_fix)
            .with_definition_from(&target)
            .with_pilot_entered_data_from(&target);

        let enroute = self.segment_mut(SegmentKind::Enroute);
        enroute.all_legs.drain(..=local);
        enroute
            .all_legs
            .insert(0, FlightPlanElement::Leg(turn_end));
        enroute
            .all_legs
            .insert(0, FlightPlanElement::Leg(turning_point));

        let turn_end_index = self.first_index_of_segment(SegmentKind::Enroute) + 1;
        self.set_active_leg_index(turn_end_index)?;

        self.increment_version();
        Ok(())
    }

    /// Goes direct to an arbitrary fix. If the fix already terminates a leg
    /// ahead of the missed approach, this is exactly a direct-to onto that
    /// leg; otherwise the fix is spliced in before the active leg with a
    /// discontinuity after it.
    pub fn direct_to_waypoint(
        &mut self,
        ppos: &PresentPosition,
        waypoint: &Fix,
    ) -> Result<()> {
        let existing_index = self
            .all_elements()
            .position(|element| {
                element
                    .as_leg()
                    .is_some_and(|leg| leg.terminates_with_waypoint(waypoint))
            })
            .filter(|&index| index < self.first_missed_approach_leg_index());

        if let Some(index) = existing_index {
            return self.direct_to_leg(ppos, index);
        }

        let active = self.active_leg_index();
        if active >= self.leg_count() {
            return Err(FlightPlanError::precondition(
                "cannot go direct without an active leg",
            ));
        }

        debug!(
            "plan {}: direct to waypoint {} (not in plan)",
            self.index, waypoint.ident
        );

        let magnetic_course = true_to_magnetic(ppos.true_track, ppos.magnetic_variation);

        self.redistribute_legs_at(0);
        self.redistribute_legs_at(active);

        let (kind, local) = self.segment_position_for_index(active)?;
        if kind != SegmentKind::Enroute {
            return Err(FlightPlanError::internal(
                "active leg not in enroute after leg redistribution",
            ));
        }

        let mut turning_point = FlightPlanLeg::turning_point(
            SegmentKind::Enroute,
            ppos.coordinates,
            magnetic_course,
        );
        turning_point.flags.insert(LegFlags::DIRECT_TO_TURNING_POINT);

        let turn_end =
            FlightPlanLeg::direct_to_turn_end(SegmentKind::Enroute, waypoint.clone());

        let enroute = self.segment_mut(SegmentKind::Enroute);
        enroute.all_legs.drain(..local);

        let followed_by_leg = enroute
            .all_legs
            .first()
            .is_some_and(|it| it.as_leg().is_some());
        if followed_by_leg {
            enroute.all_legs.insert(0, FlightPlanElement::Discontinuity);
        }
        enroute
            .all_legs
            .insert(0, FlightPlanElement::Leg(turn_end));
        enroute
            .all_legs
            .insert(0, FlightPlanElement::Leg(turning_point));

        let turn_end_index = self.first_index_of_segment(SegmentKind::Enroute) + 1;
        self.set_active_leg_index(turn_end_index)?;

        if followed_by_leg {
            self.clean_up_after_discontinuity(turn_end_index + 1)?;
        }

        self.increment_version();
        Ok(())
    }

    /// Normalizes the plan after a discontinuity was inserted at
    /// `discontinuity_index`: drops any legs up to the next fix-terminating
    /// leg and upgrades that leg to a plain IF so the path restarts cleanly.
    pub(crate) fn clean_up_after_discontinuity(
        &mut self,
        discontinuity_index: usize,
    ) -> Result<()> {
        let next_xf = self
            .all_elements()
            .enumerate()
            .skip(discontinuity_index + 1)
            .find_map(|(index, element)| {
                element.as_leg().filter(|leg| leg.is_xf()).map(|_| index)
            });

        let Some(xf_index) = next_xf else {
            return Ok(());
        };

        if xf_index > discontinuity_index + 1 {
            self.remove_range(discontinuity_index + 1, xf_index)?;
        }

        let restart_index = discontinuity_index + 1;
        let old = self.leg_element_at(restart_index)?.clone();

        if !matches!(old.leg_type, LegType::IF | LegType::CF) {
            let fix = old
                .termination_waypoint()
                .cloned()
                .ok_or_else(|| FlightPlanError::internal("xf leg without a fix"))?;

            let (kind, local) = self.segment_position_for_index(restart_index)?;
            let upgraded = FlightPlanLeg::from_enroute_fix(kind, fix, None, LegType::IF)
                .with_definition_from(&old)
                .with_pilot_entered_data_from(&old);

            self.segment_mut(kind).all_legs[local] = FlightPlanElement::Leg(upgraded);
        }

        Ok(())
    }
}
