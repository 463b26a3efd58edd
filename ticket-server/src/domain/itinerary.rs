//! Search-result itineraries.
//!
//! An [`Itinerary`] is a travel that has not been booked (yet): an ordered
//! list of [`TicketSegment`]s with the requested date and passenger count.
//! Segments carry their resolved distance and fare so results can be
//! rendered without going back to the schedule.

use chrono::NaiveDate;

use super::{DomainError, Halt, Station, Train, TrainId, TrainType};

/// One single-train segment of an itinerary.
///
/// Fare and distance are fixed at construction from the endpoints'
/// great-circle distance and the train type's per-kilometer price. The fare
/// is per passenger; [`Itinerary::total_price`] scales by the party size.
///
/// # Invariants
///
/// - Both halts belong to `train`
/// - `start.sequence < end.sequence` (travels forward along the route)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TicketSegment {
    train: TrainId,
    start: Halt,
    end: Halt,
    sequence: u16,
    distance_km: f64,
    price: f64,
}

impl TicketSegment {
    /// Builds a segment from resolved schedule entities, validating that
    /// they belong together.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the halts are not on `train`, travel backward along
    /// the route, or the stations/type passed do not match the halts/train.
    pub fn new(
        train: &Train,
        train_type: &TrainType,
        start: &Halt,
        end: &Halt,
        from: &Station,
        to: &Station,
        sequence: u16,
    ) -> Result<Self, DomainError> {
        if start.train != train.id || end.train != train.id {
            return Err(DomainError::InvalidTicket("halts are not on this train"));
        }
        if start.sequence >= end.sequence {
            return Err(DomainError::InvalidTicket(
                "start sequence must be below end sequence",
            ));
        }
        if from.id != start.station || to.id != end.station {
            return Err(DomainError::InvalidTicket(
                "stations do not match the halts",
            ));
        }
        if train_type.id != train.train_type {
            return Err(DomainError::InvalidTicket(
                "train type does not match the train",
            ));
        }

        let distance_km = from.distance_to(to);
        Ok(Self {
            train: train.id,
            start: *start,
            end: *end,
            sequence,
            distance_km,
            price: distance_km * train_type.km_price,
        })
    }

    /// The train this segment rides.
    pub fn train(&self) -> TrainId {
        self.train
    }

    /// Boarding halt.
    pub fn start(&self) -> &Halt {
        &self.start
    }

    /// Alighting halt.
    pub fn end(&self) -> &Halt {
        &self.end
    }

    /// Position of this segment within its itinerary (0 = first leg).
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Great-circle distance between the endpoint stations, in kilometers.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Fare for one passenger on this segment.
    pub fn price(&self) -> f64 {
        self.price
    }
}

/// A complete search result: one journey, possibly with a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    date: NaiveDate,
    passengers: u32,
    tickets: Vec<TicketSegment>,
}

impl Itinerary {
    /// Builds an itinerary from its segments.
    ///
    /// Segments are ordered by their sequence index; the order they are
    /// passed in does not matter.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `tickets` is empty or two segments claim the same
    /// sequence index.
    pub fn new(
        date: NaiveDate,
        passengers: u32,
        mut tickets: Vec<TicketSegment>,
    ) -> Result<Self, DomainError> {
        if tickets.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }
        tickets.sort_by_key(|t| t.sequence);
        for pair in tickets.windows(2) {
            if pair[0].sequence == pair[1].sequence {
                return Err(DomainError::DuplicateTicketSequence(pair[0].sequence));
            }
        }
        Ok(Self {
            date,
            passengers,
            tickets,
        })
    }

    /// Travel date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Party size.
    pub fn passengers(&self) -> u32 {
        self.passengers
    }

    /// Segments in travel order.
    pub fn tickets(&self) -> &[TicketSegment] {
        &self.tickets
    }

    /// Number of train legs.
    pub fn leg_count(&self) -> usize {
        self.tickets.len()
    }

    /// True when no train change is needed.
    pub fn is_direct(&self) -> bool {
        self.tickets.len() == 1
    }

    /// Total fare for the whole party.
    pub fn total_price(&self) -> f64 {
        self.tickets.iter().map(|t| t.price()).sum::<f64>() * f64::from(self.passengers)
    }

    /// Total traveled distance in kilometers.
    pub fn total_distance(&self) -> f64 {
        self.tickets.iter().map(|t| t.distance_km()).sum()
    }
}
