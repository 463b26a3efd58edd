//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from lookup and booking errors, which live with the timetable
//! and the booking ledger.

use chrono::NaiveDate;

use super::PeriodId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A second exception for the same (period, date) pair
    #[error("period {period} already has an exception on {date}")]
    DuplicateException { period: PeriodId, date: NaiveDate },

    /// Invalid ticket segment construction (backward travel, foreign halts, ...)
    #[error("invalid ticket segment: {0}")]
    InvalidTicket(&'static str),

    /// Itinerary has no ticket segments
    #[error("itinerary must have at least one ticket")]
    EmptyItinerary,

    /// Two tickets claim the same position inside one itinerary
    #[error("duplicate ticket sequence {0} in itinerary")]
    DuplicateTicketSequence(u16),
}
