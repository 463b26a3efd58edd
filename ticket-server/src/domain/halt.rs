//! Halts: one stop event of a train at a station.

use chrono::NaiveTime;

use super::{HaltId, StationId, TrainId};

/// One stop of one train at one station.
///
/// `sequence` is the zero-based position of the stop along the train's
/// route; it is unique within a train and increases in physical travel
/// order. Arrival and departure are clock times; the date comes from the
/// service period of the train, not from the halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halt {
    pub id: HaltId,
    pub train: TrainId,
    pub station: StationId,
    pub arrival: NaiveTime,
    pub departure: NaiveTime,
    pub sequence: u16,
}

impl Halt {
    /// Creates a new halt.
    pub fn new(
        id: HaltId,
        train: TrainId,
        station: StationId,
        arrival: NaiveTime,
        departure: NaiveTime,
        sequence: u16,
    ) -> Self {
        Self {
            id,
            train,
            station,
            arrival,
            departure,
            sequence,
        }
    }
}
