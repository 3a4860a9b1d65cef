//! Change notification interface.
//!
//! The engine emits a structured event whenever an externally observable
//! field changes. Consumers (guidance, displays) subscribe through
//! [`FlightPlanEventSink`]; they are expected to be idempotent on receipt
//! and must not re-enter the mutation API from the handler.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::perf::PerformanceDataKey;
use crate::plan::FixInfoEntry;

/// A change record: which plan, whether it concerns the alternate, and what
/// changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum FlightPlanEvent {
    #[serde(rename_all = "camelCase")]
    FixInfoChanged {
        plan_index: usize,
        for_alternate: bool,
        /// Slot number, 1 through 4.
        slot: usize,
        entry: Option<FixInfoEntry>,
    },
    #[serde(rename_all = "camelCase")]
    FlightNumberChanged {
        plan_index: usize,
        for_alternate: bool,
        flight_number: String,
    },
    #[serde(rename_all = "camelCase")]
    PerformanceDataChanged {
        plan_index: usize,
        for_alternate: bool,
        key: PerformanceDataKey,
        value: Option<f64>,
    },
}

/// Observer interface for plan change notifications.
pub trait FlightPlanEventSink: Send + Sync {
    fn on_event(&self, event: FlightPlanEvent);
}

/// Sink that discards all events. Default when no observer is attached.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl FlightPlanEventSink for NullEventSink {
    fn on_event(&self, _event: FlightPlanEvent) {}
}

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn FlightPlanEventSink>;
