//! Seat inventory and booked travels.
//!
//! Capacity is shared along the route: a booked ticket occupies its train's
//! seats at every halt from its start sequence to its end sequence,
//! inclusive on both ends. Two bookings that never share a station still
//! count against capacity at every halt they jointly pass through.
//!
//! The ledger is the one place the core mutates shared state. `book()`
//! re-checks capacity and commits under a single lock, so two concurrent
//! bookings cannot both pass the check and jointly overbook a halt.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::domain::{HaltId, TrainId, TravelId};
use crate::timetable::{Timetable, TimetableError};

/// Booking failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Timetable(#[from] TimetableError),

    /// The requested segment is not a valid ride on its train
    #[error("invalid ticket: {0}")]
    InvalidTicket(&'static str),

    /// A travel needs at least one ticket
    #[error("travel has no tickets")]
    EmptyTravel,

    #[error("unknown travel {0}")]
    UnknownTravel(TravelId),

    /// Capacity was consumed between the caller's search and this commit;
    /// the caller should search again
    #[error("no capacity left on train {train} for {date}; search again")]
    Conflict { train: TrainId, date: NaiveDate },
}

/// Lifecycle of a booked travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

/// One booked segment.
///
/// Endpoint sequences are denormalized from the halts at booking time so
/// occupancy scans never go back to the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub train: TrainId,
    pub start_halt: HaltId,
    pub end_halt: HaltId,
    pub start_seq: u16,
    pub end_seq: u16,
    /// Position within the travel (0 = first leg).
    pub sequence: u16,
}

/// A booked (or cancelled) travel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Travel {
    pub id: TravelId,
    pub date: NaiveDate,
    pub passengers: u32,
    pub status: BookingStatus,
    /// Tickets in travel order.
    pub tickets: Vec<Ticket>,
}

/// A segment to book: endpoints only, validated against the timetable by
/// [`BookingLedger::book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRequest {
    pub train: TrainId,
    pub start_halt: HaltId,
    pub end_halt: HaltId,
}

/// The booked-seat ledger.
///
/// Search queries read occupancy through [`can_hold`](Self::can_hold);
/// bookings go through [`book`](Self::book). All state sits behind one
/// mutex; bookings are rare compared to searches and the critical section
/// is a handful of map operations.
#[derive(Debug, Default)]
pub struct BookingLedger {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    travels: HashMap<TravelId, Travel>,
    by_train_date: HashMap<(TrainId, NaiveDate), Vec<TravelId>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Booked seats on `train` at the halt with `sequence`, on `date`.
    pub fn occupancy(&self, train: TrainId, date: NaiveDate, sequence: u16) -> u32 {
        self.lock().occupied_at(train, date, sequence)
    }

    /// Can `train` absorb `additional` passengers over the halt range
    /// `[start_seq, end_seq]` on `date`?
    ///
    /// True when no halt in the range would exceed the train's capacity.
    /// Over-capacity is a filtering outcome, not an error; the `Err` side
    /// only reports unknown references.
    pub fn can_hold(
        &self,
        timetable: &Timetable,
        train: TrainId,
        date: NaiveDate,
        start_seq: u16,
        end_seq: u16,
        additional: u32,
    ) -> Result<bool, TimetableError> {
        let capacity = timetable.train(train)?.capacity;
        let covered = covered_sequences(timetable, train, start_seq, end_seq)?;
        Ok(self.lock().fits(train, date, &covered, additional, capacity))
    }

    /// Books a travel, atomically re-checking capacity for every segment.
    ///
    /// Validation (existence, halt ownership, forward travel) happens
    /// against the timetable outside the lock; the capacity check and the
    /// commit happen under it. A failed re-check means a concurrent booking
    /// took the seats since the caller searched: [`BookingError::Conflict`].
    pub fn book(
        &self,
        timetable: &Timetable,
        date: NaiveDate,
        passengers: u32,
        segments: &[TicketRequest],
    ) -> Result<TravelId, BookingError> {
        if segments.is_empty() {
            return Err(BookingError::EmptyTravel);
        }

        let mut tickets = Vec::with_capacity(segments.len());
        let mut checks = Vec::with_capacity(segments.len());
        for (position, segment) in segments.iter().enumerate() {
            let train = timetable.train(segment.train)?;
            let start = *timetable.halt(segment.start_halt)?;
            let end = *timetable.halt(segment.end_halt)?;
            if start.train != train.id || end.train != train.id {
                return Err(BookingError::InvalidTicket("halts are not on this train"));
            }
            if start.sequence >= end.sequence {
                return Err(BookingError::InvalidTicket(
                    "start sequence must be below end sequence",
                ));
            }
            let covered = covered_sequences(timetable, train.id, start.sequence, end.sequence)?;
            checks.push((train.id, covered, train.capacity));
            tickets.push(Ticket {
                train: train.id,
                start_halt: start.id,
                end_halt: end.id,
                start_seq: start.sequence,
                end_seq: end.sequence,
                sequence: position as u16,
            });
        }

        let mut inner = self.lock();
        for (train, covered, capacity) in &checks {
            if !inner.fits(*train, date, covered, passengers, *capacity) {
                return Err(BookingError::Conflict {
                    train: *train,
                    date,
                });
            }
        }

        let id = TravelId(inner.next_id);
        inner.next_id += 1;
        for ticket in &tickets {
            let entry = inner.by_train_date.entry((ticket.train, date)).or_default();
            // One entry per travel even when several tickets ride the train.
            if !entry.contains(&id) {
                entry.push(id);
            }
        }
        inner.travels.insert(
            id,
            Travel {
                id,
                date,
                passengers,
                status: BookingStatus::Booked,
                tickets,
            },
        );
        Ok(id)
    }

    /// Fetches a travel by id.
    pub fn travel(&self, id: TravelId) -> Result<Travel, BookingError> {
        self.lock()
            .travels
            .get(&id)
            .cloned()
            .ok_or(BookingError::UnknownTravel(id))
    }

    /// Cancels a travel, releasing its seats. Cancelling twice is a no-op.
    pub fn cancel(&self, id: TravelId) -> Result<(), BookingError> {
        let mut inner = self.lock();
        let travel = inner
            .travels
            .get_mut(&id)
            .ok_or(BookingError::UnknownTravel(id))?;
        travel.status = BookingStatus::Cancelled;
        Ok(())
    }

    /// Number of travels ever booked (including cancelled ones).
    pub fn travel_count(&self) -> usize {
        self.lock().travels.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock means a panic elsewhere while holding it; every
        // critical section below leaves the maps consistent, so keep going.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    /// Seats taken on `train` at halt `sequence` on `date`: the sum of
    /// passenger counts of active travels whose tickets cover the halt.
    fn occupied_at(&self, train: TrainId, date: NaiveDate, sequence: u16) -> u32 {
        let Some(ids) = self.by_train_date.get(&(train, date)) else {
            return 0;
        };
        ids.iter()
            .filter_map(|id| self.travels.get(id))
            .filter(|travel| travel.status == BookingStatus::Booked)
            .map(|travel| {
                travel
                    .tickets
                    .iter()
                    .filter(|t| t.train == train && t.start_seq <= sequence && sequence <= t.end_seq)
                    .map(|_| travel.passengers)
                    .sum::<u32>()
            })
            .sum()
    }

    fn fits(
        &self,
        train: TrainId,
        date: NaiveDate,
        sequences: &[u16],
        additional: u32,
        capacity: u32,
    ) -> bool {
        sequences
            .iter()
            .all(|&seq| self.occupied_at(train, date, seq) + additional <= capacity)
    }
}

/// Sequence numbers of the train's halts inside `[start_seq, end_seq]`.
fn covered_sequences(
    timetable: &Timetable,
    train: TrainId,
    start_seq: u16,
    end_seq: u16,
) -> Result<Vec<u16>, TimetableError> {
    Ok(timetable
        .halts_for_train(train)?
        .map(|h| h.sequence)
        .filter(|seq| (start_seq..=end_seq).contains(seq))
        .collect())
}
