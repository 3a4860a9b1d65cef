use crate::error::Result;
use crate::geo::Coordinates;
use crate::leg::{FlightPlanElement, FlightPlanLeg, LegType};
use crate::navdata::{
    Airport, AltitudeConstraint, AltitudeDescriptor, Approach, Arrival, Departure, Fix,
    NavigationDatabase, Runway,
};
use crate::segment::SegmentKind;

use super::base::{QueuedOperation, RestringOptions};
use super::{FlightPlan, FlightPlanBuilder};

struct EmptyDatabase;

impl NavigationDatabase for EmptyDatabase {
    fn get_airport(&self, _ident: &str) -> Result<Option<Airport>> {
        Ok(None)
    }

    fn get_runways(&self, _airport_ident: &str) -> Result<Vec<Runway>> {
        Ok(Vec::new())
    }

    fn get_departures(&self, _airport_ident: &str) -> Result<Vec<Departure>> {
        Ok(Vec::new())
    }

    fn get_arrivals(&self, _airport_ident: &str) -> Result<Vec<Arrival>> {
        Ok(Vec::new())
    }

    fn get_approaches(&self, _airport_ident: &str) -> Result<Vec<Approach>> {
        Ok(Vec::new())
    }
}

fn empty_plan() -> FlightPlan {
    FlightPlanBuilder::new()
        .with_database(EmptyDatabase)
        .build()
        .unwrap()
}

fn fix(ident: &str) -> Fix {
    Fix::new(ident, "ED", Coordinates::new(50.0, 8.5))
}

fn leg(kind: SegmentKind, ident: &str) -> FlightPlanElement {
    FlightPlanElement::Leg(FlightPlanLeg::from_enroute_fix(
        kind,
        fix(ident),
        None,
        LegType::TF,
    ))
}

fn idents(plan: &FlightPlan) -> Vec<String> {
    plan.all_elements()
        .map(|element| match element.as_leg() {
            Some(leg) => leg.ident.clone(),
            None => "---".to_string(),
        })
        .collect()
}

#[test]
fn test_redistribute_moves_departure_legs_into_enroute() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Origin).all_legs =
        vec![leg(SegmentKind::Origin, "EDDF")];
    plan.base.segment_mut(SegmentKind::Departure).all_legs = vec![
        leg(SegmentKind::Departure, "DF407"),
        leg(SegmentKind::Departure, "TOBAK"),
    ];
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];

    let moved = plan.base.redistribute_legs_at(0);

    assert_eq!(moved, 3);
    assert!(plan.segment(SegmentKind::Origin).is_empty());
    assert!(plan.segment(SegmentKind::Departure).is_empty());
    assert_eq!(
        idents(&plan),
        vec!["EDDF", "DF407", "TOBAK", "ANEKI", "RIDAR"]
    );
    for element in &plan.segment(SegmentKind::Enroute).all_legs {
        assert_eq!(element.as_leg().unwrap().segment, SegmentKind::Enroute);
    }
}

#[test]
fn test_redistribute_moves_arrival_prefix_into_enroute() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];
    plan.base.segment_mut(SegmentKind::Arrival).all_legs = vec![
        leg(SegmentKind::Arrival, "LOGAN"),
        leg(SegmentKind::Arrival, "LAM"),
    ];
    plan.base.segment_mut(SegmentKind::Approach).all_legs =
        vec![leg(SegmentKind::Approach, "FI27R")];

    // Index 3 is LAM: everything through it moves behind the enroute legs
    let moved = plan.base.redistribute_legs_at(3);

    assert_eq!(moved, 2);
    assert!(plan.segment(SegmentKind::Arrival).is_empty());
    assert_eq!(plan.segment(SegmentKind::Enroute).leg_count(), 4);
    assert_eq!(
        idents(&plan),
        vec!["ANEKI", "RIDAR", "LOGAN", "LAM", "FI27R"]
    );
}

#[test]
fn test_redistribute_within_enroute_is_a_noop() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];

    assert_eq!(plan.base.redistribute_legs_at(1), 0);
    assert_eq!(idents(&plan), vec!["ANEKI", "RIDAR"]);
}

#[test]
fn test_remove_range_spans_segments_and_keeps_active_leg() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];
    plan.base.segment_mut(SegmentKind::Arrival).all_legs = vec![
        leg(SegmentKind::Arrival, "LOGAN"),
        leg(SegmentKind::Arrival, "LAM"),
    ];
    plan.set_active_leg_index(3).unwrap();

    plan.remove_range(1, 3).unwrap();

    assert_eq!(idents(&plan), vec!["ANEKI", "LAM"]);
    // Active leg is still LAM
    assert_eq!(plan.active_leg().unwrap().ident, "LAM");
}

#[test]
fn test_remove_range_rejects_inverted_bounds() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs =
        vec![leg(SegmentKind::Enroute, "ANEKI")];

    assert!(plan.remove_range(1, 0).is_err());
    assert_eq!(plan.leg_count(), 1);
}

#[test]
fn test_operation_queue_dedupes_by_kind() {
    let mut plan = empty_plan();

    plan.base
        .enqueue_operation(QueuedOperation::Restring(RestringOptions::DEPARTURE));
    plan.base
        .enqueue_operation(QueuedOperation::Restring(RestringOptions::ARRIVAL));
    plan.base
        .enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);
    plan.base
        .enqueue_operation(QueuedOperation::RebuildArrivalAndApproach);

    plan.base.flush_operation_queue().unwrap();
    assert!(!plan.base.has_pending_operations());
}

#[test]
fn test_flush_increments_version_once() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs =
        vec![leg(SegmentKind::Enroute, "ANEKI")];

    let before = plan.version();
    plan.base
        .enqueue_operation(QueuedOperation::Restring(RestringOptions::ALL));
    plan.base.flush_operation_queue().unwrap();

    assert_eq!(plan.version(), before + 1);

    // An empty queue is a no-op
    let before = plan.version();
    plan.base.flush_operation_queue().unwrap();
    assert_eq!(plan.version(), before);
}

#[test]
fn test_restring_collapses_duplicated_termination() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Departure).all_legs = vec![
        leg(SegmentKind::Departure, "DF407"),
        leg(SegmentKind::Departure, "ANEKI"),
    ];
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];

    plan.base.restring(RestringOptions::ALL).unwrap();

    assert_eq!(idents(&plan), vec!["DF407", "ANEKI", "RIDAR"]);
    assert!(plan.segment(SegmentKind::Departure).strung);
    assert!(plan.segment(SegmentKind::Enroute).strung);
}

#[test]
fn test_restring_inserts_discontinuity_after_vectors() {
    let mut plan = empty_plan();

    let vectors = FlightPlanLeg::from_procedure_leg(
        SegmentKind::Departure,
        crate::navdata::ProcedureLeg {
            leg_type: LegType::VM,
            ..Default::default()
        },
        "DEB7C",
    );
    plan.base.segment_mut(SegmentKind::Departure).all_legs =
        vec![FlightPlanElement::Leg(vectors)];
    plan.base.segment_mut(SegmentKind::Enroute).all_legs =
        vec![leg(SegmentKind::Enroute, "ANEKI")];

    plan.base.restring(RestringOptions::ALL).unwrap();
    assert_eq!(idents(&plan), vec!["MANUAL", "---", "ANEKI"]);

    // Idempotent: a second pass changes nothing
    plan.base.restring(RestringOptions::ALL).unwrap();
    assert_eq!(idents(&plan), vec!["MANUAL", "---", "ANEKI"]);
}

#[test]
fn test_lowest_climb_constraint_ignores_descent_constraints() {
    let mut plan = empty_plan();

    let climb = FlightPlanLeg::from_procedure_leg(
        SegmentKind::Departure,
        crate::navdata::ProcedureLeg {
            leg_type: LegType::CF,
            waypoint: Some(fix("DF407")),
            altitude_constraint: Some(AltitudeConstraint {
                descriptor: AltitudeDescriptor::AtOrBelowAlt1,
                altitude1: 4000.0,
                altitude2: None,
            }),
            ..Default::default()
        },
        "DEB7C",
    );
    let mut lower = climb.clone();
    lower.definition.altitude_constraint = Some(AltitudeConstraint {
        descriptor: AltitudeDescriptor::AtAlt1,
        altitude1: 3000.0,
        altitude2: None,
    });
    let descent = FlightPlanLeg::from_procedure_leg(
        SegmentKind::Arrival,
        crate::navdata::ProcedureLeg {
            leg_type: LegType::CF,
            waypoint: Some(fix("LOGAN")),
            altitude_constraint: Some(AltitudeConstraint {
                descriptor: AltitudeDescriptor::AtAlt1,
                altitude1: 2000.0,
                altitude2: None,
            }),
            ..Default::default()
        },
        "LOGA2H",
    );

    plan.base.segment_mut(SegmentKind::Departure).all_legs = vec![
        FlightPlanElement::Leg(climb),
        FlightPlanElement::Leg(lower),
    ];
    plan.base.segment_mut(SegmentKind::Arrival).all_legs =
        vec![FlightPlanElement::Leg(descent)];

    assert_eq!(plan.base.lowest_climb_constraint(), Some(3000.0));
}

#[test]
fn test_insert_element_after_with_discontinuity() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];

    plan.insert_element_after(0, leg(SegmentKind::Enroute, "DEBHI"), true)
        .unwrap();

    assert_eq!(idents(&plan), vec!["ANEKI", "DEBHI", "---", "RIDAR"]);
}

#[test]
fn test_remove_collapsing_discontinuities_keeps_active_leg() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "DF407"),
        FlightPlanElement::Discontinuity,
        leg(SegmentKind::Enroute, "DEBHI"),
        FlightPlanElement::Discontinuity,
        leg(SegmentKind::Enroute, "TOBAK"),
    ];
    plan.set_active_leg_index(4).unwrap();

    // Removing DEBHI makes the two discontinuities adjacent; the dedupe
    // drops a second element ahead of the active leg
    plan.remove_element_at(2).unwrap();

    assert_eq!(idents(&plan), vec!["DF407", "---", "TOBAK"]);
    assert_eq!(plan.active_leg().unwrap().ident, "TOBAK");
}

#[test]
fn test_insert_ahead_of_active_leg_shifts_active_index() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs = vec![
        leg(SegmentKind::Enroute, "ANEKI"),
        leg(SegmentKind::Enroute, "RIDAR"),
    ];
    plan.set_active_leg_index(1).unwrap();

    plan.insert_element_after(0, leg(SegmentKind::Enroute, "DEBHI"), true)
        .unwrap();

    assert_eq!(idents(&plan), vec!["ANEKI", "DEBHI", "---", "RIDAR"]);
    assert_eq!(plan.active_leg_index(), 3);
    assert_eq!(plan.active_leg().unwrap().ident, "RIDAR");

    // Insertion behind the active leg leaves it alone
    plan.insert_element_after(3, leg(SegmentKind::Enroute, "LOGAN"), false)
        .unwrap();
    assert_eq!(plan.active_leg().unwrap().ident, "RIDAR");
}

#[test]
fn test_fix_info_slots_are_one_based() {
    let mut plan = empty_plan();
    let entry = super::FixInfoEntry {
        fix: fix("ANEKI"),
        radii: vec![10.0],
        radials: vec![90.0, 180.0],
    };

    assert!(plan.set_fix_info(0, Some(entry.clone())).is_err());
    assert!(plan.set_fix_info(5, Some(entry.clone())).is_err());

    plan.set_fix_info(4, Some(entry.clone())).unwrap();
    assert_eq!(plan.fix_info(4).unwrap(), Some(&entry));
    assert_eq!(plan.fix_info(1).unwrap(), None);

    plan.set_fix_info(4, None).unwrap();
    assert_eq!(plan.fix_info(4).unwrap(), None);
}

#[test]
fn test_edit_fix_info_entry_in_place() {
    let mut plan = empty_plan();
    plan.set_fix_info(
        2,
        Some(super::FixInfoEntry {
            fix: fix("ANEKI"),
            radii: vec![10.0],
            radials: vec![90.0],
        }),
    )
    .unwrap();

    let version = plan.version();
    plan.edit_fix_info_entry(2, |current| {
        let mut entry = current.unwrap();
        entry.radii.push(25.0);
        Some(entry)
    })
    .unwrap();

    assert_eq!(plan.fix_info(2).unwrap().unwrap().radii, vec![10.0, 25.0]);
    assert!(plan.version() > version);

    // Returning None clears the slot; slot 0 is rejected like set_fix_info
    plan.edit_fix_info_entry(2, |_| None).unwrap();
    assert_eq!(plan.fix_info(2).unwrap(), None);
    assert!(plan.edit_fix_info_entry(0, |current| current).is_err());
}

#[test]
fn test_manual_hold_inserts_or_edits() {
    let mut plan = empty_plan();
    plan.base.segment_mut(SegmentKind::Enroute).all_legs =
        vec![leg(SegmentKind::Enroute, "ANEKI")];

    let hold = crate::leg::HoldData {
        inbound_magnetic_course: 270.0,
        turn_direction: crate::navdata::TurnDirection::Right,
        distance: None,
        time: Some(1.5),
    };

    let hold_index = plan.add_or_edit_manual_hold(0, hold.clone()).unwrap();
    assert_eq!(hold_index, 1);
    assert!(plan.leg_element_at(1).unwrap().is_hx());

    // Editing the hold in place keeps the leg count
    let edited = crate::leg::HoldData {
        inbound_magnetic_course: 90.0,
        ..hold
    };
    let edit_index = plan.add_or_edit_manual_hold(1, edited.clone()).unwrap();
    assert_eq!(edit_index, 1);
    assert_eq!(plan.leg_count(), 2);
    assert_eq!(
        plan.leg_element_at(1).unwrap().modified_hold.as_ref(),
        Some(&edited)
    );
}
