//! Application state for the web layer.

use std::sync::Arc;

use crate::booking::BookingLedger;
use crate::planner::SearchConfig;
use crate::timetable::Timetable;

/// Shared application state.
///
/// The timetable is read-only after startup; the ledger serializes its own
/// mutations, so the state clones freely across request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The loaded schedule graph
    pub timetable: Arc<Timetable>,

    /// Booked travels and seat occupancy
    pub bookings: Arc<BookingLedger>,

    /// Itinerary search configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(timetable: Timetable, bookings: BookingLedger, config: SearchConfig) -> Self {
        Self {
            timetable: Arc::new(timetable),
            bookings: Arc::new(bookings),
            config: Arc::new(config),
        }
    }
}
