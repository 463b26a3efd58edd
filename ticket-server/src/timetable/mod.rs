//! The schedule graph: an indexed, in-memory view of the timetable.
//!
//! Replaces the original relational joins with explicit repository lookups:
//! per-station and per-train halt indices are built once by the
//! [`TimetableBuilder`], then merge-joined per query. The result-set and
//! ordering contract of the queries is what matters, not the join mechanism.

mod builder;
mod loader;

pub use builder::{BuildError, TimetableBuilder};
pub use loader::{LoadError, load_schedule};

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::domain::{
    Halt, HaltId, Period, PeriodId, Station, StationId, Train, TrainId, TrainType, TrainTypeId,
};

/// Lookup and maintenance failures on the schedule graph.
///
/// An unknown reference is an error, not an empty result: "no route exists"
/// and "you asked about a station that does not exist" must stay
/// distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    #[error("unknown train {0}")]
    UnknownTrain(TrainId),

    #[error("unknown halt {0}")]
    UnknownHalt(HaltId),

    #[error("unknown period {0}")]
    UnknownPeriod(PeriodId),

    #[error("unknown train type {0}")]
    UnknownTrainType(TrainTypeId),

    /// A station referenced by halts cannot be removed
    #[error("station {0} is still referenced by halts")]
    StationInUse(StationId),
}

/// Which clock field the search window constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeMode {
    /// Window applies to the boarding halt's departure time.
    #[default]
    DepartAfter,
    /// Window applies to the alighting halt's arrival time.
    ArriveBefore,
}

impl TimeMode {
    /// The reference clock value of a candidate leg under this mode.
    fn reference(self, boarding: &Halt, alighting: &Halt) -> NaiveTime {
        match self {
            TimeMode::DepartAfter => boarding.departure,
            TimeMode::ArriveBefore => alighting.arrival,
        }
    }
}

/// Error returned when parsing an invalid time mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time mode: expected \"depart_after\" or \"arrive_before\"")]
pub struct InvalidTimeMode;

impl FromStr for TimeMode {
    type Err = InvalidTimeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "depart_after" => Ok(TimeMode::DepartAfter),
            "arrive_before" => Ok(TimeMode::ArriveBefore),
            _ => Err(InvalidTimeMode),
        }
    }
}

/// A half-open clock window `[start, end)`, clamped to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start_secs: u32,
    end_secs: u32,
}

impl TimeWindow {
    /// The window `[hour - half_span, hour + half_span)`, clamped to
    /// `[00:00, 24:00)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveTime;
    /// use ticket_server::timetable::TimeWindow;
    ///
    /// let w = TimeWindow::around_hour(8, 60);
    /// assert!(w.contains(NaiveTime::from_hms_opt(7, 0, 0).unwrap()));
    /// assert!(w.contains(NaiveTime::from_hms_opt(8, 59, 59).unwrap()));
    /// // The upper bound is exclusive.
    /// assert!(!w.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
    /// ```
    pub fn around_hour(hour: u32, half_span_mins: u16) -> Self {
        let span = u32::from(half_span_mins) * 60;
        let center = hour * 3600;
        Self {
            start_secs: center.saturating_sub(span),
            end_secs: (center + span).min(24 * 3600),
        }
    }

    /// Is the clock value inside the window?
    pub fn contains(&self, t: NaiveTime) -> bool {
        let secs = t.num_seconds_from_midnight();
        self.start_secs <= secs && secs < self.end_secs
    }
}

/// One direct candidate leg: board `train` at `boarding`, alight at
/// `alighting`, with `boarding.sequence < alighting.sequence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectRun {
    pub train: TrainId,
    pub boarding: HaltId,
    pub alighting: HaltId,
}

/// One single-connection candidate: two legs on different trains meeting at
/// the same intermediate station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRun {
    pub first: DirectRun,
    pub second: DirectRun,
}

/// The read side of the schedule: stations, train types, periods, trains,
/// halts, and the indices the search queries run on.
///
/// Built via [`TimetableBuilder`]; queries are read-only and freely shared
/// across threads. The mutating maintenance operations (`remove_*`,
/// `purge_unreferenced_periods`) belong to the admin/cleanup flows and take
/// `&mut self`.
#[derive(Debug, Default)]
pub struct Timetable {
    stations: HashMap<StationId, Station>,
    train_types: HashMap<TrainTypeId, TrainType>,
    periods: HashMap<PeriodId, Period>,
    trains: HashMap<TrainId, Train>,
    halts: HashMap<HaltId, Halt>,
    /// Halt ids per train, sorted by sequence.
    halts_by_train: HashMap<TrainId, Vec<HaltId>>,
    /// Halt ids per station, sorted by departure time.
    halts_by_station: HashMap<StationId, Vec<HaltId>>,
}

impl Timetable {
    /// Starts building a timetable.
    pub fn builder() -> TimetableBuilder {
        TimetableBuilder::new()
    }

    pub fn station(&self, id: StationId) -> Result<&Station, TimetableError> {
        self.stations
            .get(&id)
            .ok_or(TimetableError::UnknownStation(id))
    }

    pub fn train(&self, id: TrainId) -> Result<&Train, TimetableError> {
        self.trains.get(&id).ok_or(TimetableError::UnknownTrain(id))
    }

    pub fn halt(&self, id: HaltId) -> Result<&Halt, TimetableError> {
        self.halts.get(&id).ok_or(TimetableError::UnknownHalt(id))
    }

    pub fn period(&self, id: PeriodId) -> Result<&Period, TimetableError> {
        self.periods
            .get(&id)
            .ok_or(TimetableError::UnknownPeriod(id))
    }

    pub fn train_type(&self, id: TrainTypeId) -> Result<&TrainType, TimetableError> {
        self.train_types
            .get(&id)
            .ok_or(TimetableError::UnknownTrainType(id))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn train_count(&self) -> usize {
        self.trains.len()
    }

    pub fn halt_count(&self) -> usize {
        self.halts.len()
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// All stations, in unspecified order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    /// Finds a station by exact name, case-insensitively.
    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        self.stations
            .values()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive substring search over station names, for the
    /// search-form autocomplete. Results are sorted by name.
    pub fn search_stations(&self, query: &str, limit: usize) -> Vec<&Station> {
        let needle = query.to_lowercase();
        let mut matches: Vec<&Station> = self
            .stations
            .values()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.truncate(limit);
        matches
    }

    /// Halts of a train in route order.
    pub fn halts_for_train(
        &self,
        id: TrainId,
    ) -> Result<impl Iterator<Item = &Halt>, TimetableError> {
        if !self.trains.contains_key(&id) {
            return Err(TimetableError::UnknownTrain(id));
        }
        Ok(self
            .halts_by_train
            .get(&id)
            .into_iter()
            .flatten()
            .map(move |hid| &self.halts[hid]))
    }

    /// Does this train run on `date`?
    ///
    /// A train without a period runs every day, the documented fallback for
    /// malformed import data. A dangling period reference is a lookup error.
    pub fn train_runs_on(&self, id: TrainId, date: NaiveDate) -> Result<bool, TimetableError> {
        let train = self.train(id)?;
        match train.period {
            None => Ok(true),
            Some(pid) => Ok(self.period(pid)?.runs_on(date)),
        }
    }

    /// All direct candidate legs from `from` to `to` whose reference clock
    /// value falls in `window`.
    ///
    /// Both halts are on one train and the boarding sequence is strictly
    /// below the alighting sequence; a train passing through both stations
    /// in the other direction does not qualify. Ordered by departure time,
    /// then arrival time (ties broken by ids for determinism).
    pub fn direct_runs(
        &self,
        from: StationId,
        to: StationId,
        window: TimeWindow,
        mode: TimeMode,
    ) -> Result<Vec<DirectRun>, TimetableError> {
        self.station(from)?;
        self.station(to)?;

        let arrivals = self.halts_by_train_at(to);
        let mut runs = Vec::new();
        for boarding in self.station_halts(from) {
            let Some(candidates) = arrivals.get(&boarding.train) else {
                continue;
            };
            for &alighting in candidates {
                if alighting.sequence <= boarding.sequence {
                    continue;
                }
                if !window.contains(mode.reference(boarding, alighting)) {
                    continue;
                }
                runs.push(DirectRun {
                    train: boarding.train,
                    boarding: boarding.id,
                    alighting: alighting.id,
                });
            }
        }

        runs.sort_by_key(|r| {
            let d = &self.halts[&r.boarding];
            let a = &self.halts[&r.alighting];
            (d.departure, a.arrival, r.train, r.boarding, r.alighting)
        });
        Ok(runs)
    }

    /// All single-connection candidates from `from` to `to`.
    ///
    /// The two legs ride different trains and meet at one intermediate
    /// station; the first leg's arrival strictly precedes the second leg's
    /// departure and the change gap is at most `max_gap`. A second-leg
    /// departure whose clock value is not after the first-leg arrival would
    /// wrap midnight and is rejected. The window predicate applies to the
    /// first leg's reference field. Ordered by first-leg departure, then
    /// final arrival.
    pub fn connection_runs(
        &self,
        from: StationId,
        to: StationId,
        window: TimeWindow,
        mode: TimeMode,
        max_gap: Duration,
    ) -> Result<Vec<ConnectionRun>, TimetableError> {
        self.station(from)?;
        self.station(to)?;

        let arrivals_at_to = self.halts_by_train_at(to);
        let max_gap_secs = max_gap.num_seconds();
        let mut runs = Vec::new();

        for d1 in self.station_halts(from) {
            if mode == TimeMode::DepartAfter && !window.contains(d1.departure) {
                continue;
            }
            for a1 in self.train_halts(d1.train) {
                if a1.sequence <= d1.sequence {
                    continue;
                }
                if mode == TimeMode::ArriveBefore && !window.contains(a1.arrival) {
                    continue;
                }
                for d2 in self.station_halts(a1.station) {
                    if d2.train == d1.train {
                        continue;
                    }
                    let gap = i64::from(d2.departure.num_seconds_from_midnight())
                        - i64::from(a1.arrival.num_seconds_from_midnight());
                    if gap <= 0 || gap > max_gap_secs {
                        continue;
                    }
                    let Some(ends) = arrivals_at_to.get(&d2.train) else {
                        continue;
                    };
                    for &a2 in ends {
                        if a2.sequence <= d2.sequence {
                            continue;
                        }
                        runs.push(ConnectionRun {
                            first: DirectRun {
                                train: d1.train,
                                boarding: d1.id,
                                alighting: a1.id,
                            },
                            second: DirectRun {
                                train: d2.train,
                                boarding: d2.id,
                                alighting: a2.id,
                            },
                        });
                    }
                }
            }
        }

        runs.sort_by_key(|r| {
            let d1 = &self.halts[&r.first.boarding];
            let a2 = &self.halts[&r.second.alighting];
            (
                d1.departure,
                a2.arrival,
                r.first.train,
                r.second.train,
                r.first.boarding,
                r.first.alighting,
                r.second.boarding,
                r.second.alighting,
            )
        });
        Ok(runs)
    }

    /// Removes a train and all of its halts (cascade).
    pub fn remove_train(&mut self, id: TrainId) -> Result<(), TimetableError> {
        if self.trains.remove(&id).is_none() {
            return Err(TimetableError::UnknownTrain(id));
        }
        if let Some(hids) = self.halts_by_train.remove(&id) {
            for hid in hids {
                if let Some(halt) = self.halts.remove(&hid) {
                    if let Some(at_station) = self.halts_by_station.get_mut(&halt.station) {
                        at_station.retain(|h| *h != hid);
                    }
                }
            }
        }
        Ok(())
    }

    /// Removes a station. Fails while any halt references it.
    pub fn remove_station(&mut self, id: StationId) -> Result<(), TimetableError> {
        if !self.stations.contains_key(&id) {
            return Err(TimetableError::UnknownStation(id));
        }
        if self
            .halts_by_station
            .get(&id)
            .is_some_and(|halts| !halts.is_empty())
        {
            return Err(TimetableError::StationInUse(id));
        }
        self.halts_by_station.remove(&id);
        self.stations.remove(&id);
        Ok(())
    }

    /// Deletes every period no train references. Returns how many were
    /// removed. Periods in use are never touched.
    pub fn purge_unreferenced_periods(&mut self) -> usize {
        let referenced: HashSet<PeriodId> =
            self.trains.values().filter_map(|t| t.period).collect();
        let before = self.periods.len();
        self.periods.retain(|id, _| referenced.contains(id));
        before - self.periods.len()
    }

    /// Halts at a station in departure-time order.
    fn station_halts(&self, station: StationId) -> impl Iterator<Item = &Halt> {
        self.halts_by_station
            .get(&station)
            .into_iter()
            .flatten()
            .map(move |hid| &self.halts[hid])
    }

    /// Halts of a train in route order (no existence check; internal ids).
    fn train_halts(&self, train: TrainId) -> impl Iterator<Item = &Halt> {
        self.halts_by_train
            .get(&train)
            .into_iter()
            .flatten()
            .map(move |hid| &self.halts[hid])
    }

    /// Halts at a station grouped by train, for the join side of a query.
    fn halts_by_train_at(&self, station: StationId) -> HashMap<TrainId, Vec<&Halt>> {
        let mut map: HashMap<TrainId, Vec<&Halt>> = HashMap::new();
        for halt in self.station_halts(station) {
            map.entry(halt.train).or_default().push(halt);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::domain::PeriodException;

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A, B, C, D in a line; train 1 goes A→B→C, train 2 goes C→D,
    /// train 3 goes C→B→A (the reverse direction).
    fn fixture() -> Timetable {
        let mut b = Timetable::builder();
        for (id, name) in [(1, "Alpha"), (2, "Beta"), (3, "Gamma"), (4, "Delta")] {
            b.add_station(Station::new(StationId(id), name, 45.0 + id as f64, 3.0))
                .unwrap();
        }
        b.add_train_type(TrainType::new(TrainTypeId(1), "TER", 0.10))
            .unwrap();
        b.add_period(Period::new(
            PeriodId(1),
            [true; 7],
            date(2024, 1, 1),
            date(2024, 12, 31),
        ))
        .unwrap();

        for (id, number) in [(1, 100), (2, 200), (3, 300)] {
            b.add_train(Train::new(
                TrainId(id),
                number,
                Some(PeriodId(1)),
                TrainTypeId(1),
                100,
            ))
            .unwrap();
        }

        let halts = [
            // (halt, train, station, arr, dep, seq)
            (10, 1, 1, "08:00", "08:00", 0),
            (11, 1, 2, "08:30", "08:32", 1),
            (12, 1, 3, "09:00", "09:02", 2),
            (20, 2, 3, "09:30", "09:30", 0),
            (21, 2, 4, "10:15", "10:15", 1),
            (30, 3, 3, "08:00", "08:00", 0),
            (31, 3, 2, "08:40", "08:42", 1),
            (32, 3, 1, "09:10", "09:10", 2),
        ];
        for (h, t, s, arr, dep, seq) in halts {
            b.add_halt(Halt::new(
                HaltId(h),
                TrainId(t),
                StationId(s),
                time(arr),
                time(dep),
                seq,
            ))
            .unwrap();
        }
        b.build()
    }

    #[test]
    fn window_is_half_open_and_clamped() {
        let w = TimeWindow::around_hour(8, 60);
        assert!(w.contains(time("07:00")));
        assert!(w.contains(time("08:59")));
        assert!(!w.contains(time("09:00")));
        assert!(!w.contains(time("06:59")));

        // Clamped at the start of the day.
        let w = TimeWindow::around_hour(0, 60);
        assert!(w.contains(time("00:00")));
        assert!(w.contains(time("00:59")));
        assert!(!w.contains(time("01:00")));

        // Clamped at the end of the day.
        let w = TimeWindow::around_hour(23, 60);
        assert!(w.contains(time("23:59")));
        assert!(w.contains(time("22:00")));
    }

    #[test]
    fn time_mode_parses() {
        assert_eq!("depart_after".parse::<TimeMode>(), Ok(TimeMode::DepartAfter));
        assert_eq!(
            "arrive_before".parse::<TimeMode>(),
            Ok(TimeMode::ArriveBefore)
        );
        assert!("whenever".parse::<TimeMode>().is_err());
    }

    #[test]
    fn direct_runs_finds_forward_leg() {
        let tt = fixture();
        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(3),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
            )
            .unwrap();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].train, TrainId(1));
        assert_eq!(runs[0].boarding, HaltId(10));
        assert_eq!(runs[0].alighting, HaltId(12));
    }

    #[test]
    fn direct_runs_never_travels_backward() {
        let tt = fixture();
        // Train 3 serves C then A; asking for A→C must not use it backward,
        // and train 1 departs A at 08:00 which is outside the 10:00 window.
        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(3),
                TimeWindow::around_hour(10, 60),
                TimeMode::DepartAfter,
            )
            .unwrap();
        assert!(runs.is_empty());

        // The reverse direction rides train 3 only.
        let runs = tt
            .direct_runs(
                StationId(3),
                StationId(1),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
            )
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].train, TrainId(3));
    }

    #[test]
    fn direct_runs_window_mode_selects_reference_field() {
        let tt = fixture();

        // Depart-after on the 09:00 hour: train 1 leaves Alpha at 08:00,
        // outside [08:00, 10:00)? No, 08:00 is inside. Use hour 10:
        // [09:00, 11:00) excludes the 08:00 departure.
        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(2),
                TimeWindow::around_hour(10, 60),
                TimeMode::DepartAfter,
            )
            .unwrap();
        assert!(runs.is_empty());

        // Arrive-before on the same hour window checks the 08:30 arrival
        // at Beta instead, still outside [09:00, 11:00).
        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(2),
                TimeWindow::around_hour(10, 60),
                TimeMode::ArriveBefore,
            )
            .unwrap();
        assert!(runs.is_empty());

        // [08:00, 10:00) around hour 9 contains the 08:30 arrival.
        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(2),
                TimeWindow::around_hour(9, 60),
                TimeMode::ArriveBefore,
            )
            .unwrap();
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn direct_runs_unknown_station_is_an_error() {
        let tt = fixture();
        let err = tt
            .direct_runs(
                StationId(99),
                StationId(1),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
            )
            .unwrap_err();
        assert_eq!(err, TimetableError::UnknownStation(StationId(99)));
    }

    #[test]
    fn direct_runs_ordered_by_departure_then_arrival() {
        let mut b = Timetable::builder();
        b.add_station(Station::new(StationId(1), "A", 45.0, 3.0))
            .unwrap();
        b.add_station(Station::new(StationId(2), "B", 46.0, 3.0))
            .unwrap();
        b.add_train_type(TrainType::new(TrainTypeId(1), "TER", 0.10))
            .unwrap();
        // Three trains A→B: late departure, early departure with slow
        // arrival, early departure with fast arrival.
        for (train, dep, arr) in [(1, "08:40", "09:10"), (2, "08:10", "09:30"), (3, "08:10", "09:00")] {
            b.add_train(Train::new(TrainId(train), train * 100, None, TrainTypeId(1), 50))
                .unwrap();
            b.add_halt(Halt::new(
                HaltId(train * 10),
                TrainId(train),
                StationId(1),
                time(dep),
                time(dep),
                0,
            ))
            .unwrap();
            b.add_halt(Halt::new(
                HaltId(train * 10 + 1),
                TrainId(train),
                StationId(2),
                time(arr),
                time(arr),
                1,
            ))
            .unwrap();
        }
        let tt = b.build();

        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(2),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
            )
            .unwrap();
        let trains: Vec<_> = runs.iter().map(|r| r.train.0).collect();
        // 08:10/09:00 first, then 08:10/09:30, then 08:40/09:10.
        assert_eq!(trains, vec![3, 2, 1]);
    }

    #[test]
    fn connection_runs_joins_two_trains() {
        let tt = fixture();
        // A→D: train 1 (A→C, arr 09:00) then train 2 (C→D, dep 09:30).
        let runs = tt
            .connection_runs(
                StationId(1),
                StationId(4),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
                Duration::hours(3),
            )
            .unwrap();

        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.first.train, TrainId(1));
        assert_eq!(run.second.train, TrainId(2));
        assert_eq!(run.first.boarding, HaltId(10));
        assert_eq!(run.first.alighting, HaltId(12));
        assert_eq!(run.second.boarding, HaltId(20));
        assert_eq!(run.second.alighting, HaltId(21));
    }

    #[test]
    fn connection_runs_rejects_long_gaps() {
        let tt = fixture();
        // The C→D connection gap is 30 minutes; a 20-minute cap kills it.
        let runs = tt
            .connection_runs(
                StationId(1),
                StationId(4),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
                Duration::minutes(20),
            )
            .unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn connection_runs_rejects_midnight_wrap() {
        let mut b = Timetable::builder();
        for id in 1..=3u32 {
            b.add_station(Station::new(StationId(id), format!("S{id}"), 45.0, 3.0))
                .unwrap();
        }
        b.add_train_type(TrainType::new(TrainTypeId(1), "Night", 0.08))
            .unwrap();
        b.add_train(Train::new(TrainId(1), 100, None, TrainTypeId(1), 50))
            .unwrap();
        b.add_train(Train::new(TrainId(2), 200, None, TrainTypeId(1), 50))
            .unwrap();
        // Leg 1 arrives at 23:50; the only onward train leaves at 00:10,
        // which reads as "before" on the clock and must be rejected.
        b.add_halt(Halt::new(HaltId(1), TrainId(1), StationId(1), time("23:00"), time("23:00"), 0))
            .unwrap();
        b.add_halt(Halt::new(HaltId(2), TrainId(1), StationId(2), time("23:50"), time("23:50"), 1))
            .unwrap();
        b.add_halt(Halt::new(HaltId(3), TrainId(2), StationId(2), time("00:10"), time("00:10"), 0))
            .unwrap();
        b.add_halt(Halt::new(HaltId(4), TrainId(2), StationId(3), time("01:00"), time("01:00"), 1))
            .unwrap();
        let tt = b.build();

        let runs = tt
            .connection_runs(
                StationId(1),
                StationId(3),
                TimeWindow::around_hour(23, 60),
                TimeMode::DepartAfter,
                Duration::hours(3),
            )
            .unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn connection_runs_never_reuses_a_train() {
        let tt = fixture();
        // Any candidate from A must change trains; none may ride train 1 twice.
        let runs = tt
            .connection_runs(
                StationId(1),
                StationId(3),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
                Duration::hours(3),
            )
            .unwrap();
        for run in runs {
            assert_ne!(run.first.train, run.second.train);
        }
    }

    #[test]
    fn train_runs_on_respects_period_and_fallback() {
        let mut b = Timetable::builder();
        b.add_station(Station::new(StationId(1), "A", 45.0, 3.0))
            .unwrap();
        b.add_train_type(TrainType::new(TrainTypeId(1), "TER", 0.10))
            .unwrap();
        let mut period = Period::new(
            PeriodId(1),
            [true, true, true, true, true, false, false],
            date(2024, 1, 1),
            date(2024, 12, 31),
        );
        period
            .add_exception(PeriodException {
                date: date(2024, 5, 1),
                add_day: false,
            })
            .unwrap();
        b.add_period(period).unwrap();
        b.add_train(Train::new(TrainId(1), 100, Some(PeriodId(1)), TrainTypeId(1), 50))
            .unwrap();
        b.add_train(Train::new(TrainId(2), 200, None, TrainTypeId(1), 50))
            .unwrap();
        let tt = b.build();

        // 2024-05-01 is a Wednesday, removed by exception.
        assert!(!tt.train_runs_on(TrainId(1), date(2024, 5, 1)).unwrap());
        assert!(tt.train_runs_on(TrainId(1), date(2024, 5, 2)).unwrap());
        // Saturday.
        assert!(!tt.train_runs_on(TrainId(1), date(2024, 5, 4)).unwrap());
        // No period: runs whenever asked.
        assert!(tt.train_runs_on(TrainId(2), date(2024, 5, 4)).unwrap());
        assert!(tt.train_runs_on(TrainId(2), date(2030, 1, 1)).unwrap());
    }

    #[test]
    fn remove_train_cascades_halts() {
        let mut tt = fixture();
        let halts_before = tt.halt_count();
        tt.remove_train(TrainId(1)).unwrap();

        assert_eq!(tt.halt_count(), halts_before - 3);
        assert!(tt.train(TrainId(1)).is_err());
        assert!(tt.halt(HaltId(10)).is_err());
        // Station index no longer mentions the removed halts.
        let runs = tt
            .direct_runs(
                StationId(1),
                StationId(3),
                TimeWindow::around_hour(8, 60),
                TimeMode::DepartAfter,
            )
            .unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn remove_station_is_protected_while_referenced() {
        let mut tt = fixture();
        let err = tt.remove_station(StationId(4)).unwrap_err();
        assert_eq!(err, TimetableError::StationInUse(StationId(4)));

        // Dropping the only train serving Delta unlocks the removal.
        tt.remove_train(TrainId(2)).unwrap();
        tt.remove_station(StationId(4)).unwrap();
        assert!(tt.station(StationId(4)).is_err());
    }

    #[test]
    fn purge_keeps_referenced_periods() {
        let mut b = Timetable::builder();
        b.add_station(Station::new(StationId(1), "A", 45.0, 3.0))
            .unwrap();
        b.add_train_type(TrainType::new(TrainTypeId(1), "TER", 0.10))
            .unwrap();
        b.add_period(Period::new(PeriodId(1), [true; 7], date(2024, 1, 1), date(2024, 12, 31)))
            .unwrap();
        b.add_period(Period::new(PeriodId(2), [true; 7], date(2024, 1, 1), date(2024, 12, 31)))
            .unwrap();
        b.add_train(Train::new(TrainId(1), 100, Some(PeriodId(1)), TrainTypeId(1), 50))
            .unwrap();
        let mut tt = b.build();

        assert_eq!(tt.purge_unreferenced_periods(), 1);
        assert!(tt.period(PeriodId(1)).is_ok());
        assert!(tt.period(PeriodId(2)).is_err());
        // Idempotent.
        assert_eq!(tt.purge_unreferenced_periods(), 0);
    }

    #[test]
    fn station_search_is_case_insensitive_substring() {
        let tt = fixture();
        let hits = tt.search_stations("aMm", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Gamma");

        let hits = tt.search_stations("a", 2);
        assert_eq!(hits.len(), 2);
        // Sorted by name: Alpha, Beta.
        assert_eq!(hits[0].name, "Alpha");
        assert_eq!(hits[1].name, "Beta");

        assert!(tt.station_by_name("gamma").is_some());
        assert!(tt.station_by_name("nowhere").is_none());
    }
}
