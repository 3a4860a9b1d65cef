//! Core library for flight plan management.
//!
//! This crate provides the flight plan data model and mutation engine of a
//! flight management system: phase-ordered segments of ARINC 424 legs,
//! procedure selection against a navigation database, revisions (direct-to,
//! diversion, alternate), performance data and serialization.
//!
//! # Architecture
//!
//! - **Leg model** ([`leg`]): legs, discontinuities and the factories that
//!   build them from database procedure legs or synthetic fixes
//! - **Segments** ([`segment`]): twelve phase-scoped leg containers whose
//!   concatenation is the flight plan sequence
//! - **Plan** ([`plan`]): the mutation API; every operation fully applies
//!   and bumps a version counter, or fails and leaves the plan untouched
//! - **Navigation data** ([`navdata`]): the read-only database interface,
//!   consumed through `tokio::task::spawn_blocking`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fmgc_core::FlightPlanBuilder;
//! # use fmgc_core::navdata::{NavigationDatabase, Airport, Runway, Departure, Arrival, Approach};
//! # struct MyNavdata;
//! # impl NavigationDatabase for MyNavdata {
//! #     fn get_airport(&self, _: &str) -> fmgc_core::Result<Option<Airport>> { Ok(None) }
//! #     fn get_runways(&self, _: &str) -> fmgc_core::Result<Vec<Runway>> { Ok(vec![]) }
//! #     fn get_departures(&self, _: &str) -> fmgc_core::Result<Vec<Departure>> { Ok(vec![]) }
//! #     fn get_arrivals(&self, _: &str) -> fmgc_core::Result<Vec<Arrival>> { Ok(vec![]) }
//! #     fn get_approaches(&self, _: &str) -> fmgc_core::Result<Vec<Approach>> { Ok(vec![]) }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut plan = FlightPlanBuilder::new()
//!     .with_database(MyNavdata)
//!     .build()?;
//!
//! plan.set_origin_airport("EDDF").await?;
//! plan.set_destination_airport(Some("EGLL")).await?;
//! plan.set_origin_runway(Some("RW07C"))?;
//!
//! println!("plan has {} legs", plan.leg_count());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod geo;
pub mod leg;
pub mod navdata;
pub mod params;
pub mod perf;
pub mod plan;
pub mod segment;

// Re-export commonly used types
pub use error::{FlightPlanError, ProcedureKind, Result};
pub use events::{EventSinkHandle, FlightPlanEvent, FlightPlanEventSink, NullEventSink};
pub use geo::Coordinates;
pub use leg::{
    ConstraintType, CruiseStepEntry, FlightPlanElement, FlightPlanLeg, HoldData, LegFlags,
    LegType, SerializedFlightPlanLeg,
};
pub use navdata::{DatabaseHandle, Fix, NavigationDatabase};
pub use params::PresentPosition;
pub use perf::{
    FlightPlanPerformanceData, FmsConfig, ImportedPerformanceData, PerformanceDataKey,
};
pub use plan::{
    BaseFlightPlan, FixInfoEntry, FlightPlan, FlightPlanBuilder, SerializedFlightPlan,
    FIX_INFO_SLOTS,
};
pub use segment::{FlightPlanSegment, SegmentClass, SegmentKind};
