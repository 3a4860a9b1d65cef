//! Error types for the flight planning library.

use thiserror::Error;

/// Comprehensive error type for all flight plan operations.
///
/// Every failure is detected before any internal collection is mutated, so a
/// rejected operation leaves the plan structurally unchanged.
#[derive(Error, Debug)]
pub enum FlightPlanError {
    /// A revision was attempted that the current plan state does not allow
    /// (e.g. direct-to into the missed approach, setting an approach without
    /// a destination airport, enabling an alternate with none defined).
    #[error("precondition violated: {reason}")]
    Precondition { reason: String },

    /// An airport identifier did not resolve against the navigation database.
    #[error("airport '{ident}' not found in the navigation database")]
    AirportNotFound { ident: String },

    /// A runway identifier did not resolve for the given airport.
    #[error("runway '{ident}' not found at {airport}")]
    RunwayNotFound { ident: String, airport: String },

    /// A procedure identifier was not present in the database's returned set
    /// for the current airport context.
    #[error("no {kind} '{ident}' found for {airport}")]
    ProcedureNotFound {
        kind: ProcedureKind,
        ident: String,
        airport: String,
    },

    /// A global leg index was outside the plan's index space.
    #[error("element index {index} out of range for plan with {length} elements")]
    OutOfRange { index: usize, length: usize },

    /// An element was expected to be a leg but was a discontinuity.
    #[error("element at index {index} is a discontinuity, not a leg")]
    NotALeg { index: usize },

    /// Serialization/deserialization errors
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Failures outside the domain taxonomy (e.g. a blocking database task
    /// being cancelled by the runtime).
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// The kind of procedure a failed lookup was resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Departure,
    DepartureEnrouteTransition,
    Arrival,
    ArrivalEnrouteTransition,
    Approach,
    ApproachVia,
}

impl std::fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Departure => "departure",
            Self::DepartureEnrouteTransition => "departure enroute transition",
            Self::Arrival => "arrival",
            Self::ArrivalEnrouteTransition => "arrival enroute transition",
            Self::Approach => "approach",
            Self::ApproachVia => "approach via",
        };
        f.write_str(name)
    }
}

impl FlightPlanError {
    /// Creates a precondition violation with the given reason.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type alias for flight plan operations
pub type Result<T> = std::result::Result<T, FlightPlanError>;
