use std::sync::Mutex;

use fmgc_core::geo::Coordinates;
use fmgc_core::leg::LegType;
use fmgc_core::navdata::{
    Airport, AltitudeConstraint, AltitudeDescriptor, Approach, ApproachType, Arrival, Departure,
    Fix, NavigationDatabase, ProcedureLeg, ProcedureTransition, Runway, WaypointDescriptor,
};
use fmgc_core::{
    FlightPlan, FlightPlanBuilder, FlightPlanEvent, FlightPlanEventSink, Result,
};

/// Helper function to create a test flight plan backed by the in-memory
/// navigation database
pub fn create_test_plan() -> FlightPlan {
    FlightPlanBuilder::new()
        .with_database(TestDatabase)
        .build()
        .expect("Failed to create flight plan")
}

/// Event sink that records every event for assertions
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<FlightPlanEvent>>,
}

impl RecordingEventSink {
    pub fn events(&self) -> Vec<FlightPlanEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl FlightPlanEventSink for RecordingEventSink {
    fn on_event(&self, event: FlightPlanEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// The idents of every element in the plan, discontinuities as "---"
pub fn idents(plan: &FlightPlan) -> Vec<String> {
    plan.all_elements()
        .map(|element| match element.as_leg() {
            Some(leg) => leg.ident.clone(),
            None => "---".to_string(),
        })
        .collect()
}

pub fn ed_fix(ident: &str, lat: f64, long: f64) -> Fix {
    Fix::new(ident, "ED", Coordinates::new(lat, long))
}

fn eg_fix(ident: &str, lat: f64, long: f64) -> Fix {
    Fix::new(ident, "EG", Coordinates::new(lat, long))
}

fn tf(waypoint: Fix, procedure_ident: &str) -> ProcedureLeg {
    ProcedureLeg {
        leg_type: LegType::TF,
        waypoint: Some(waypoint),
        procedure_ident: procedure_ident.to_string(),
        ..Default::default()
    }
}

fn cf(waypoint: Fix, course: f64, procedure_ident: &str) -> ProcedureLeg {
    ProcedureLeg {
        leg_type: LegType::CF,
        waypoint: Some(waypoint),
        magnetic_course: Some(course),
        procedure_ident: procedure_ident.to_string(),
        ..Default::default()
    }
}

/// In-memory navigation database with three airports:
///
/// - EDDF with runway RW07C and the OBOK5C departure (runway transition for
///   RW07C, enroute transition to ANEKI)
/// - EGLL with runway RW27R, the LOGA2H arrival and the I27R ILS approach
///   (LAM via, missed approach back to LAM)
/// - EHAM with runway RW18R and the I18R approach, used as an alternate
pub struct TestDatabase;

impl NavigationDatabase for TestDatabase {
    fn get_airport(&self, ident: &str) -> Result<Option<Airport>> {
        Ok(match ident {
            "EDDF" => Some(Airport {
                ident: "EDDF".to_string(),
                icao_code: "ED".to_string(),
                location: Coordinates::new(50.033, 8.570),
                elevation: 364.0,
            }),
            "EGLL" => Some(Airport {
                ident: "EGLL".to_string(),
                icao_code: "EG".to_string(),
                location: Coordinates::new(51.477, -0.461),
                elevation: 83.0,
            }),
            "EHAM" => Some(Airport {
                ident: "EHAM".to_string(),
                icao_code: "EH".to_string(),
                location: Coordinates::new(52.308, 4.764),
                elevation: -11.0,
            }),
            _ => None,
        })
    }

    fn get_runways(&self, airport_ident: &str) -> Result<Vec<Runway>> {
        Ok(match airport_ident {
            "EDDF" => vec![
                Runway {
                    ident: "RW07C".to_string(),
                    airport_ident: "EDDF".to_string(),
                    threshold_location: Coordinates::new(50.034, 8.535),
                    bearing: 69.8,
                    magnetic_bearing: 68.0,
                    elevation: 362.0,
                },
                Runway {
                    ident: "RW25C".to_string(),
                    airport_ident: "EDDF".to_string(),
                    threshold_location: Coordinates::new(50.040, 8.587),
                    bearing: 249.8,
                    magnetic_bearing: 248.0,
                    elevation: 352.0,
                },
            ],
            "EGLL" => vec![
                Runway {
                    ident: "RW27R".to_string(),
                    airport_ident: "EGLL".to_string(),
                    threshold_location: Coordinates::new(51.478, -0.433),
                    bearing: 271.4,
                    magnetic_bearing: 271.0,
                    elevation: 79.0,
                },
                Runway {
                    ident: "RW09L".to_string(),
                    airport_ident: "EGLL".to_string(),
                    threshold_location: Coordinates::new(51.478, -0.485),
                    bearing: 91.4,
                    magnetic_bearing: 91.0,
                    elevation: 78.0,
                },
            ],
            "EHAM" => vec![Runway {
                ident: "RW18R".to_string(),
                airport_ident: "EHAM".to_string(),
                threshold_location: Coordinates::new(52.349, 4.720),
                bearing: 183.2,
                magnetic_bearing: 183.0,
                elevation: -14.0,
            }],
            _ => Vec::new(),
        })
    }

    fn get_departures(&self, airport_ident: &str) -> Result<Vec<Departure>> {
        if airport_ident != "EDDF" {
            return Ok(Vec::new());
        }

        Ok(vec![Departure {
            ident: "OBOK5C".to_string(),
            common_legs: vec![ProcedureLeg {
                altitude_constraint: Some(AltitudeConstraint {
                    descriptor: AltitudeDescriptor::AtOrBelowAlt1,
                    altitude1: 5000.0,
                    altitude2: None,
                }),
                ..tf(ed_fix("TOBAK", 50.12, 8.80), "OBOK5C")
            }],
            runway_transitions: vec![ProcedureTransition {
                ident: "RW07C".to_string(),
                legs: vec![ProcedureLeg {
                    altitude_constraint: Some(AltitudeConstraint {
                        descriptor: AltitudeDescriptor::AtOrAboveAlt1,
                        altitude1: 1500.0,
                        altitude2: None,
                    }),
                    ..cf(ed_fix("DF407", 50.05, 8.64), 68.0, "OBOK5C")
                }],
            }],
            enroute_transitions: vec![ProcedureTransition {
                ident: "ANEKI".to_string(),
                legs: vec![tf(ed_fix("ANEKI", 50.30, 8.90), "OBOK5C")],
            }],
        }])
    }

    fn get_arrivals(&self, airport_ident: &str) -> Result<Vec<Arrival>> {
        if airport_ident != "EGLL" {
            return Ok(Vec::new());
        }

        Ok(vec![Arrival {
            ident: "LOGA2H".to_string(),
            common_legs: vec![
                tf(eg_fix("LOGAN", 51.74, 1.61), "LOGA2H"),
                tf(eg_fix("LAM", 51.65, 0.15), "LOGA2H"),
            ],
            runway_transitions: vec![ProcedureTransition {
                ident: "RW27R".to_string(),
                legs: vec![tf(eg_fix("BIG", 51.33, 0.03), "LOGA2H")],
            }],
            enroute_transitions: vec![ProcedureTransition {
                ident: "SABER".to_string(),
                legs: vec![tf(eg_fix("SABER", 51.80, 2.35), "LOGA2H")],
            }],
        }])
    }

    fn get_approaches(&self, airport_ident: &str) -> Result<Vec<Approach>> {
        Ok(match airport_ident {
            "EGLL" => vec![Approach {
                ident: "I27R".to_string(),
                approach_type: ApproachType::Ils,
                runway_ident: Some("RW27R".to_string()),
                legs: vec![
                    cf(eg_fix("FI27R", 51.479, -0.250), 271.0, "I27R"),
                    ProcedureLeg {
                        waypoint_descriptor: Some(WaypointDescriptor::Runway),
                        ..cf(eg_fix("RW27R", 51.478, -0.433), 271.0, "I27R")
                    },
                ],
                missed_legs: vec![
                    ProcedureLeg {
                        leg_type: LegType::CA,
                        magnetic_course: Some(271.0),
                        altitude_constraint: Some(AltitudeConstraint {
                            descriptor: AltitudeDescriptor::AtOrAboveAlt1,
                            altitude1: 1080.0,
                            altitude2: None,
                        }),
                        procedure_ident: "I27R".to_string(),
                        ..Default::default()
                    },
                    ProcedureLeg {
                        leg_type: LegType::DF,
                        waypoint: Some(eg_fix("LAM", 51.65, 0.15)),
                        procedure_ident: "I27R".to_string(),
                        ..Default::default()
                    },
                ],
                transitions: vec![ProcedureTransition {
                    ident: "LAM".to_string(),
                    legs: vec![
                        ProcedureLeg {
                            leg_type: LegType::IF,
                            waypoint: Some(eg_fix("LAM", 51.65, 0.15)),
                            procedure_ident: "I27R".to_string(),
                            ..Default::default()
                        },
                        tf(eg_fix("FI27R", 51.479, -0.250), "I27R"),
                    ],
                }],
            }],
            "EHAM" => vec![Approach {
                ident: "I18R".to_string(),
                approach_type: ApproachType::Ils,
                runway_ident: Some("RW18R".to_string()),
                legs: vec![
                    cf(Fix::new("FN18R", "EH", Coordinates::new(52.42, 4.72)), 183.0, "I18R"),
                    ProcedureLeg {
                        waypoint_descriptor: Some(WaypointDescriptor::Runway),
                        ..cf(
                            Fix::new("RW18R", "EH", Coordinates::new(52.349, 4.720)),
                            183.0,
                            "I18R",
                        )
                    },
                ],
                missed_legs: vec![ProcedureLeg {
                    leg_type: LegType::CA,
                    magnetic_course: Some(183.0),
                    altitude_constraint: Some(AltitudeConstraint {
                        descriptor: AltitudeDescriptor::AtOrAboveAlt1,
                        altitude1: 2000.0,
                        altitude2: None,
                    }),
                    procedure_ident: "I18R".to_string(),
                    ..Default::default()
                }],
                transitions: Vec::new(),
            }],
            _ => Vec::new(),
        })
    }
}
