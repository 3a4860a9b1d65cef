//! Builder for creating and configuring FlightPlan instances.

use std::sync::Arc;

use crate::error::{FlightPlanError, Result};
use crate::events::{EventSinkHandle, FlightPlanEventSink, NullEventSink};
use crate::navdata::{DatabaseHandle, NavigationDatabase};
use crate::perf::FmsConfig;

use super::base::BaseFlightPlan;
use super::serialization::SerializedFlightPlan;
use super::FlightPlan;

/// Builder for creating and configuring FlightPlan instances.
#[derive(Clone)]
pub struct FlightPlanBuilder {
    database: Option<DatabaseHandle>,
    events: Option<EventSinkHandle>,
    config: FmsConfig,
    index: usize,
}

impl FlightPlanBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database: None,
            events: None,
            config: FmsConfig::default(),
            index: 0,
        }
    }

    /// Sets the navigation database. Required.
    pub fn with_database<D: NavigationDatabase + 'static>(mut self, database: D) -> Self {
        self.database = Some(Arc::new(database));
        self
    }

    /// Sets a shared navigation database handle.
    pub fn with_database_handle(mut self, database: DatabaseHandle) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the change notification sink. Defaults to discarding events.
    pub fn with_event_sink<S: FlightPlanEventSink + 'static>(mut self, sink: S) -> Self {
        self.events = Some(Arc::new(sink));
        self
    }

    /// Sets a shared change notification sink handle.
    pub fn with_event_sink_handle(mut self, sink: EventSinkHandle) -> Self {
        self.events = Some(sink);
        self
    }

    /// Overrides the configured altitude offsets.
    pub fn with_config(mut self, config: FmsConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the plan index reported in change events.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Builds an empty flight plan.
    ///
    /// # Errors
    ///
    /// Returns `FlightPlanError::Precondition` if no database was provided.
    pub fn build(self) -> Result<FlightPlan> {
        let database = self.database.ok_or_else(|| {
            FlightPlanError::precondition("a navigation database is required")
        })?;
        let events = self.events.unwrap_or_else(|| Arc::new(NullEventSink));

        Ok(FlightPlan {
            index: self.index,
            base: BaseFlightPlan::new(self.index, false, Arc::clone(&database)),
            alternate: Box::new(BaseFlightPlan::new(self.index, true, database)),
            performance_data: Default::default(),
            fix_infos: Default::default(),
            flight_number: None,
            config: self.config,
            events,
        })
    }

    /// Builds a flight plan restored from a serialized snapshot, re-resolving
    /// airports, runways and procedure availability against the database.
    pub async fn build_from_serialized(
        self,
        serialized: &SerializedFlightPlan,
    ) -> Result<FlightPlan> {
        let mut plan = self.build()?;
        plan.restore_from_serialized(serialized).await?;
        Ok(plan)
    }
}

impl Default for FlightPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
