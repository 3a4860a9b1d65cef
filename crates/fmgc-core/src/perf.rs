//! Flight plan performance data.
//!
//! Each parameter carries a system-computed default and an optional pilot
//! entry; the effective value is pilot-if-present-else-default. Defaults for
//! the takeoff and missed-approach altitudes derive from airport elevation
//! plus configured AGL offsets.

use serde::{Deserialize, Serialize};

/// Configuration values the engine reads from the surrounding avionics
/// configuration store. All offsets are feet AGL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FmsConfig {
    pub thrust_reduction_altitude_offset: f64,
    pub acceleration_altitude_offset: f64,
    pub engine_out_acceleration_altitude_offset: f64,
}

impl Default for FmsConfig {
    fn default() -> Self {
        Self {
            thrust_reduction_altitude_offset: 1500.0,
            acceleration_altitude_offset: 1500.0,
            engine_out_acceleration_altitude_offset: 1500.0,
        }
    }
}

/// Identifies one performance data parameter for typed set operations and
/// change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceDataKey {
    DefaultThrustReductionAltitude,
    PilotThrustReductionAltitude,
    DefaultAccelerationAltitude,
    PilotAccelerationAltitude,
    DefaultEngineOutAccelerationAltitude,
    PilotEngineOutAccelerationAltitude,
    DefaultMissedThrustReductionAltitude,
    PilotMissedThrustReductionAltitude,
    DefaultMissedAccelerationAltitude,
    PilotMissedAccelerationAltitude,
    DefaultMissedEngineOutAccelerationAltitude,
    PilotMissedEngineOutAccelerationAltitude,
    DatabaseTransitionAltitude,
    PilotTransitionAltitude,
    DatabaseTransitionLevel,
    PilotTransitionLevel,
    CostIndex,
    CruiseFlightLevel,
}

/// Performance values received from a company route or uplink, applied in
/// one step by [`crate::plan::FlightPlan::set_imported_performance_data`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedPerformanceData {
    pub departure_transition_altitude: Option<f64>,
    pub destination_transition_level: Option<f64>,
    pub cost_index: Option<f64>,
    pub cruise_flight_level: Option<f64>,
}

/// Numeric and altitude parameters attached to a flight plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPlanPerformanceData {
    pub default_thrust_reduction_altitude: Option<f64>,
    pub pilot_thrust_reduction_altitude: Option<f64>,
    pub default_acceleration_altitude: Option<f64>,
    pub pilot_acceleration_altitude: Option<f64>,
    pub default_engine_out_acceleration_altitude: Option<f64>,
    pub pilot_engine_out_acceleration_altitude: Option<f64>,
    pub default_missed_thrust_reduction_altitude: Option<f64>,
    pub pilot_missed_thrust_reduction_altitude: Option<f64>,
    pub default_missed_acceleration_altitude: Option<f64>,
    pub pilot_missed_acceleration_altitude: Option<f64>,
    pub default_missed_engine_out_acceleration_altitude: Option<f64>,
    pub pilot_missed_engine_out_acceleration_altitude: Option<f64>,
    pub database_transition_altitude: Option<f64>,
    pub pilot_transition_altitude: Option<f64>,
    pub database_transition_level: Option<f64>,
    pub pilot_transition_level: Option<f64>,
    pub cost_index: Option<f64>,
    pub cruise_flight_level: Option<f64>,
}

impl FlightPlanPerformanceData {
    /// Effective thrust reduction altitude: pilot entry if present, else the
    /// system default.
    pub fn thrust_reduction_altitude(&self) -> Option<f64> {
        self.pilot_thrust_reduction_altitude
            .or(self.default_thrust_reduction_altitude)
    }

    pub fn acceleration_altitude(&self) -> Option<f64> {
        self.pilot_acceleration_altitude
            .or(self.default_acceleration_altitude)
    }

    pub fn engine_out_acceleration_altitude(&self) -> Option<f64> {
        self.pilot_engine_out_acceleration_altitude
            .or(self.default_engine_out_acceleration_altitude)
    }

    pub fn missed_thrust_reduction_altitude(&self) -> Option<f64> {
        self.pilot_missed_thrust_reduction_altitude
            .or(self.default_missed_thrust_reduction_altitude)
    }

    pub fn missed_acceleration_altitude(&self) -> Option<f64> {
        self.pilot_missed_acceleration_altitude
            .or(self.default_missed_acceleration_altitude)
    }

    pub fn missed_engine_out_acceleration_altitude(&self) -> Option<f64> {
        self.pilot_missed_engine_out_acceleration_altitude
            .or(self.default_missed_engine_out_acceleration_altitude)
    }

    pub fn transition_altitude(&self) -> Option<f64> {
        self.pilot_transition_altitude
            .or(self.database_transition_altitude)
    }

    pub fn transition_level(&self) -> Option<f64> {
        self.pilot_transition_level.or(self.database_transition_level)
    }

    /// Reads the parameter identified by `key`.
    pub fn get(&self, key: PerformanceDataKey) -> Option<f64> {
        match key {
            PerformanceDataKey::DefaultThrustReductionAltitude => {
                self.default_thrust_reduction_altitude
            }
            PerformanceDataKey::PilotThrustReductionAltitude => {
                self.pilot_thrust_reduction_altitude
            }
            PerformanceDataKey::DefaultAccelerationAltitude => self.default_acceleration_altitude,
            PerformanceDataKey::PilotAccelerationAltitude => self.pilot_acceleration_altitude,
            PerformanceDataKey::DefaultEngineOutAccelerationAltitude => {
                self.default_engine_out_acceleration_altitude
            }
            PerformanceDataKey::PilotEngineOutAccelerationAltitude => {
                self.pilot_engine_out_acceleration_altitude
            }
            PerformanceDataKey::DefaultMissedThrustReductionAltitude => {
                self.default_missed_thrust_reduction_altitude
            }
            PerformanceDataKey::PilotMissedThrustReductionAltitude => {
                self.pilot_missed_thrust_reduction_altitude
            }
            PerformanceDataKey::DefaultMissedAccelerationAltitude => {
                self.default_missed_acceleration_altitude
            }
            PerformanceDataKey::PilotMissedAccelerationAltitude => {
                self.pilot_missed_acceleration_altitude
            }
            PerformanceDataKey::DefaultMissedEngineOutAccelerationAltitude => {
                self.default_missed_engine_out_acceleration_altitude
            }
            PerformanceDataKey::PilotMissedEngineOutAccelerationAltitude => {
                self.pilot_missed_engine_out_acceleration_altitude
            }
            PerformanceDataKey::DatabaseTransitionAltitude => self.database_transition_altitude,
            PerformanceDataKey::PilotTransitionAltitude => self.pilot_transition_altitude,
            PerformanceDataKey::DatabaseTransitionLevel => self.database_transition_level,
            PerformanceDataKey::PilotTransitionLevel => self.pilot_transition_level,
            PerformanceDataKey::CostIndex => self.cost_index,
            PerformanceDataKey::CruiseFlightLevel => self.cruise_flight_level,
        }
    }

    /// Writes the parameter identified by `key`.
    pub fn set(&mut self, key: PerformanceDataKey, value: Option<f64>) {
        let slot = match key {
            PerformanceDataKey::DefaultThrustReductionAltitude => {
                &mut self.default_thrust_reduction_altitude
            }
            PerformanceDataKey::PilotThrustReductionAltitude => {
                &mut self.pilot_thrust_reduction_altitude
            }
            PerformanceDataKey::DefaultAccelerationAltitude => {
                &mut self.default_acceleration_altitude
            }
            PerformanceDataKey::PilotAccelerationAltitude => &mut self.pilot_acceleration_altitude,
            PerformanceDataKey::DefaultEngineOutAccelerationAltitude => {
                &mut self.default_engine_out_acceleration_altitude
            }
            PerformanceDataKey::PilotEngineOutAccelerationAltitude => {
                &mut self.pilot_engine_out_acceleration_altitude
            }
            PerformanceDataKey::DefaultMissedThrustReductionAltitude => {
                &mut self.default_missed_thrust_reduction_altitude
            }
            PerformanceDataKey::PilotMissedThrustReductionAltitude => {
                &mut self.pilot_missed_thrust_reduction_altitude
            }
            PerformanceDataKey::DefaultMissedAccelerationAltitude => {
                &mut self.default_missed_acceleration_altitude
            }
            PerformanceDataKey::PilotMissedAccelerationAltitude => {
                &mut self.pilot_missed_acceleration_altitude
            }
            PerformanceDataKey::DefaultMissedEngineOutAccelerationAltitude => {
                &mut self.default_missed_engine_out_acceleration_altitude
            }
            PerformanceDataKey::PilotMissedEngineOutAccelerationAltitude => {
                &mut self.pilot_missed_engine_out_acceleration_altitude
            }
            PerformanceDataKey::DatabaseTransitionAltitude => {
                &mut self.database_transition_altitude
            }
            PerformanceDataKey::PilotTransitionAltitude => &mut self.pilot_transition_altitude,
            PerformanceDataKey::DatabaseTransitionLevel => &mut self.database_transition_level,
            PerformanceDataKey::PilotTransitionLevel => &mut self.pilot_transition_level,
            PerformanceDataKey::CostIndex => &mut self.cost_index,
            PerformanceDataKey::CruiseFlightLevel => &mut self.cruise_flight_level,
        };

        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_value_prefers_pilot_entry() {
        let mut perf = FlightPlanPerformanceData::default();
        assert_eq!(perf.thrust_reduction_altitude(), None);

        perf.set(
            PerformanceDataKey::DefaultThrustReductionAltitude,
            Some(1864.0),
        );
        assert_eq!(perf.thrust_reduction_altitude(), Some(1864.0));

        perf.set(
            PerformanceDataKey::PilotThrustReductionAltitude,
            Some(2500.0),
        );
        assert_eq!(perf.thrust_reduction_altitude(), Some(2500.0));

        perf.set(PerformanceDataKey::PilotThrustReductionAltitude, None);
        assert_eq!(perf.thrust_reduction_altitude(), Some(1864.0));
    }

    #[test]
    fn test_get_set_roundtrip_for_every_key() {
        let keys = [
            PerformanceDataKey::DefaultThrustReductionAltitude,
            PerformanceDataKey::PilotThrustReductionAltitude,
            PerformanceDataKey::DefaultAccelerationAltitude,
            PerformanceDataKey::PilotAccelerationAltitude,
            PerformanceDataKey::DefaultEngineOutAccelerationAltitude,
            PerformanceDataKey::PilotEngineOutAccelerationAltitude,
            PerformanceDataKey::DefaultMissedThrustReductionAltitude,
            PerformanceDataKey::PilotMissedThrustReductionAltitude,
            PerformanceDataKey::DefaultMissedAccelerationAltitude,
            PerformanceDataKey::PilotMissedAccelerationAltitude,
            PerformanceDataKey::DefaultMissedEngineOutAccelerationAltitude,
            PerformanceDataKey::PilotMissedEngineOutAccelerationAltitude,
            PerformanceDataKey::DatabaseTransitionAltitude,
            PerformanceDataKey::PilotTransitionAltitude,
            PerformanceDataKey::DatabaseTransitionLevel,
            PerformanceDataKey::PilotTransitionLevel,
            PerformanceDataKey::CostIndex,
            PerformanceDataKey::CruiseFlightLevel,
        ];

        let mut perf = FlightPlanPerformanceData::default();
        for (index, key) in keys.iter().enumerate() {
            perf.set(*key, Some(index as f64));
        }
        for (index, key) in keys.iter().enumerate() {
            assert_eq!(perf.get(*key), Some(index as f64));
        }
    }
}
