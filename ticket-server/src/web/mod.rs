//! Web layer for the ticket server.
//!
//! A thin JSON surface over the planner and the booking ledger: station
//! autocomplete, itinerary search, and travel booking.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
