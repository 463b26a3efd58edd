//! Domain types for the ticket search engine.
//!
//! This module contains the core schedule and itinerary types. Types that
//! carry invariants (ticket segments, itineraries, service periods) enforce
//! them at construction time, so code that receives them can trust their
//! validity.

mod error;
mod halt;
mod ids;
mod itinerary;
mod period;
mod station;
mod train;

pub use error::DomainError;
pub use halt::Halt;
pub use ids::{HaltId, PeriodId, StationId, TrainId, TrainTypeId, TravelId};
pub use itinerary::{Itinerary, TicketSegment};
pub use period::{Period, PeriodException};
pub use station::Station;
pub use train::{Train, TrainType};
