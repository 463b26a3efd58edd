//! Incremental construction of a [`Timetable`] with referential checks.
//!
//! Entities must be added bottom-up: stations, train types and periods
//! first, then trains, then halts. Every cross-reference is validated at
//! insertion time so a built timetable is internally consistent.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::domain::{
    DomainError, Halt, HaltId, Period, PeriodException, PeriodId, Station, StationId, Train,
    TrainId, TrainType, TrainTypeId,
};

use super::Timetable;

/// Referential or uniqueness violations while assembling a timetable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("duplicate station {0}")]
    DuplicateStation(StationId),

    #[error("duplicate train type {0}")]
    DuplicateTrainType(TrainTypeId),

    #[error("duplicate period {0}")]
    DuplicatePeriod(PeriodId),

    #[error("duplicate train {0}")]
    DuplicateTrain(TrainId),

    #[error("duplicate halt {0}")]
    DuplicateHalt(HaltId),

    #[error("train {train} already has a halt with sequence {sequence}")]
    DuplicateHaltSequence { train: TrainId, sequence: u16 },

    #[error("halt references unknown station {0}")]
    UnknownStation(StationId),

    #[error("halt references unknown train {0}")]
    UnknownTrain(TrainId),

    #[error("train references unknown period {0}")]
    UnknownPeriod(PeriodId),

    #[error("train references unknown train type {0}")]
    UnknownTrainType(TrainTypeId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Builder for [`Timetable`]. See the module docs for the insertion order.
#[derive(Debug, Default)]
pub struct TimetableBuilder {
    stations: HashMap<StationId, Station>,
    train_types: HashMap<TrainTypeId, TrainType>,
    periods: HashMap<PeriodId, Period>,
    trains: HashMap<TrainId, Train>,
    halts: HashMap<HaltId, Halt>,
    sequences_seen: HashMap<TrainId, HashSet<u16>>,
}

impl TimetableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_station(&mut self, station: Station) -> Result<(), BuildError> {
        if self.stations.contains_key(&station.id) {
            return Err(BuildError::DuplicateStation(station.id));
        }
        self.stations.insert(station.id, station);
        Ok(())
    }

    pub fn add_train_type(&mut self, train_type: TrainType) -> Result<(), BuildError> {
        if self.train_types.contains_key(&train_type.id) {
            return Err(BuildError::DuplicateTrainType(train_type.id));
        }
        self.train_types.insert(train_type.id, train_type);
        Ok(())
    }

    pub fn add_period(&mut self, period: Period) -> Result<(), BuildError> {
        if self.periods.contains_key(&period.id) {
            return Err(BuildError::DuplicatePeriod(period.id));
        }
        self.periods.insert(period.id, period);
        Ok(())
    }

    /// Attaches an exception to an already-added period.
    pub fn add_period_exception(
        &mut self,
        period: PeriodId,
        exception: PeriodException,
    ) -> Result<(), BuildError> {
        let period = self
            .periods
            .get_mut(&period)
            .ok_or(BuildError::UnknownPeriod(period))?;
        period.add_exception(exception)?;
        Ok(())
    }

    pub fn add_train(&mut self, train: Train) -> Result<(), BuildError> {
        if self.trains.contains_key(&train.id) {
            return Err(BuildError::DuplicateTrain(train.id));
        }
        if let Some(period) = train.period {
            if !self.periods.contains_key(&period) {
                return Err(BuildError::UnknownPeriod(period));
            }
        }
        if !self.train_types.contains_key(&train.train_type) {
            return Err(BuildError::UnknownTrainType(train.train_type));
        }
        self.trains.insert(train.id, train);
        Ok(())
    }

    pub fn add_halt(&mut self, halt: Halt) -> Result<(), BuildError> {
        if self.halts.contains_key(&halt.id) {
            return Err(BuildError::DuplicateHalt(halt.id));
        }
        if !self.trains.contains_key(&halt.train) {
            return Err(BuildError::UnknownTrain(halt.train));
        }
        if !self.stations.contains_key(&halt.station) {
            return Err(BuildError::UnknownStation(halt.station));
        }
        let seen = self.sequences_seen.entry(halt.train).or_default();
        if !seen.insert(halt.sequence) {
            return Err(BuildError::DuplicateHaltSequence {
                train: halt.train,
                sequence: halt.sequence,
            });
        }
        self.halts.insert(halt.id, halt);
        Ok(())
    }

    /// Finalizes the timetable and builds the query indices.
    pub fn build(self) -> Timetable {
        let mut halts_by_train: HashMap<TrainId, Vec<HaltId>> = HashMap::new();
        let mut halts_by_station: HashMap<StationId, Vec<HaltId>> = HashMap::new();
        for halt in self.halts.values() {
            halts_by_train.entry(halt.train).or_default().push(halt.id);
            halts_by_station
                .entry(halt.station)
                .or_default()
                .push(halt.id);
        }
        for ids in halts_by_train.values_mut() {
            ids.sort_by_key(|id| self.halts[id].sequence);
        }
        for ids in halts_by_station.values_mut() {
            ids.sort_by_key(|id| (self.halts[id].departure, self.halts[id].arrival, id.0));
        }

        for train in self.trains.values() {
            if train.period.is_none() {
                // Import fallback: such trains answer "runs" for every date.
                warn!(train = %train.id, number = train.number, "train has no service period");
            }
        }

        Timetable {
            stations: self.stations,
            train_types: self.train_types,
            periods: self.periods,
            trains: self.trains,
            halts: self.halts,
            halts_by_train,
            halts_by_station,
        }
    }
}
