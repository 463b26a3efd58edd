//! Two-phase itinerary search.
//!
//! Phase 1 asks the schedule graph for direct candidate legs and filters
//! them through the service calendar and the seat inventory. Phase 2 runs
//! only when phase 1 produced nothing: single-connection candidates, with
//! both trains checked against the calendar and both legs against capacity
//! independently.

use tracing::{debug, trace};

use crate::booking::BookingLedger;
use crate::domain::{DomainError, Itinerary, StationId, TicketSegment};
use crate::timetable::{DirectRun, TimeMode, Timetable, TimetableError};

use super::config::SearchConfig;

/// Error from itinerary search.
///
/// Unknown references surface as errors so callers can distinguish "no
/// route exists" from "bad reference". Empty result sets are a normal,
/// non-error outcome.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Timetable(#[from] TimetableError),

    /// Candidate materialization failed; indicates inconsistent schedule data
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Request for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Origin station.
    pub origin: StationId,

    /// Destination station.
    pub destination: StationId,

    /// Travel date.
    pub date: chrono::NaiveDate,

    /// Requested clock hour; the search window spans one hour either side.
    pub hour: u32,

    /// Party size.
    pub passengers: u32,

    /// Whether the window constrains departure or arrival times.
    pub mode: TimeMode,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(
        origin: StationId,
        destination: StationId,
        date: chrono::NaiveDate,
        hour: u32,
        passengers: u32,
        mode: TimeMode,
    ) -> Self {
        Self {
            origin,
            destination,
            date,
            hour,
            passengers,
            mode,
        }
    }
}

/// Itinerary planner over a timetable and a booking ledger.
///
/// Stateless and read-only: any number of searches may run concurrently
/// against the same timetable and ledger.
pub struct Planner<'a> {
    timetable: &'a Timetable,
    bookings: &'a BookingLedger,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(
        timetable: &'a Timetable,
        bookings: &'a BookingLedger,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            timetable,
            bookings,
            config,
        }
    }

    /// Search for itineraries matching the request.
    ///
    /// Results keep the schedule graph's ordering (departure time, then
    /// arrival time). Direct itineraries win outright: connections are only
    /// searched when no direct candidate survives the filters.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<Itinerary>, SearchError> {
        self.timetable.station(request.origin)?;
        self.timetable.station(request.destination)?;

        let window = self.config.window_around(request.hour);

        let direct = self.direct_phase(request, window)?;
        if !direct.is_empty() {
            return Ok(direct);
        }

        debug!(
            origin = %request.origin,
            destination = %request.destination,
            "no direct itinerary, searching connections"
        );
        self.connection_phase(request, window)
    }

    fn direct_phase(
        &self,
        request: &SearchRequest,
        window: crate::timetable::TimeWindow,
    ) -> Result<Vec<Itinerary>, SearchError> {
        let runs = self.timetable.direct_runs(
            request.origin,
            request.destination,
            window,
            request.mode,
        )?;
        debug!(candidates = runs.len(), "direct candidates");

        let mut results = Vec::new();
        for run in runs {
            if !self.leg_is_open(&run, request)? {
                continue;
            }
            let ticket = self.ticket(&run, 0)?;
            results.push(Itinerary::new(
                request.date,
                request.passengers,
                vec![ticket],
            )?);
        }
        Ok(results)
    }

    fn connection_phase(
        &self,
        request: &SearchRequest,
        window: crate::timetable::TimeWindow,
    ) -> Result<Vec<Itinerary>, SearchError> {
        let runs = self.timetable.connection_runs(
            request.origin,
            request.destination,
            window,
            request.mode,
            self.config.max_connection(),
        )?;
        debug!(candidates = runs.len(), "connection candidates");

        let mut results = Vec::new();
        for run in runs {
            // Both trains must run and both legs must have seats.
            if !self.leg_is_open(&run.first, request)? || !self.leg_is_open(&run.second, request)? {
                continue;
            }
            let tickets = vec![self.ticket(&run.first, 0)?, self.ticket(&run.second, 1)?];
            results.push(Itinerary::new(request.date, request.passengers, tickets)?);
        }
        Ok(results)
    }

    /// Calendar and capacity filter for one candidate leg.
    fn leg_is_open(&self, run: &DirectRun, request: &SearchRequest) -> Result<bool, SearchError> {
        if !self.timetable.train_runs_on(run.train, request.date)? {
            trace!(train = %run.train, date = %request.date, "train does not run");
            return Ok(false);
        }

        let start = self.timetable.halt(run.boarding)?;
        let end = self.timetable.halt(run.alighting)?;
        if !self.bookings.can_hold(
            self.timetable,
            run.train,
            request.date,
            start.sequence,
            end.sequence,
            request.passengers,
        )? {
            trace!(train = %run.train, "no seats left for the party");
            return Ok(false);
        }

        Ok(true)
    }

    /// Materializes one candidate leg as a ticket segment.
    fn ticket(&self, run: &DirectRun, sequence: u16) -> Result<TicketSegment, SearchError> {
        let train = self.timetable.train(run.train)?;
        let train_type = self.timetable.train_type(train.train_type)?;
        let start = self.timetable.halt(run.boarding)?;
        let end = self.timetable.halt(run.alighting)?;
        let from = self.timetable.station(start.station)?;
        let to = self.timetable.station(end.station)?;
        Ok(TicketSegment::new(
            train, train_type, start, end, from, to, sequence,
        )?)
    }
}
