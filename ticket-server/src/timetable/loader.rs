//! Schedule snapshot loader.
//!
//! Reads the JSON snapshot produced by the GTFS import pipeline (which is
//! not part of this server) and assembles a [`Timetable`] through the
//! builder, so every referential check applies to loaded data too.
//!
//! Dates are `YYYY-MM-DD`; times are `HH:MM` or `HH:MM:SS` clock values.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::info;

use crate::domain::{
    Halt, HaltId, Period, PeriodException, PeriodId, Station, StationId, Train, TrainId, TrainType,
    TrainTypeId,
};

use super::{BuildError, Timetable, TimetableBuilder};

/// Failure to read or assemble a schedule snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed schedule file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid date {value:?}: {source}")]
    Date {
        value: String,
        source: chrono::ParseError,
    },

    #[error("invalid time {value:?}: {source}")]
    Time {
        value: String,
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Build(#[from] BuildError),
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    stations: Vec<StationRecord>,
    train_types: Vec<TrainTypeRecord>,
    periods: Vec<PeriodRecord>,
    trains: Vec<TrainRecord>,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: u32,
    name: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct TrainTypeRecord {
    id: u32,
    name: String,
    km_price: f64,
}

#[derive(Debug, Deserialize)]
struct PeriodRecord {
    id: u32,
    monday: bool,
    tuesday: bool,
    wednesday: bool,
    thursday: bool,
    friday: bool,
    saturday: bool,
    sunday: bool,
    start_date: String,
    end_date: String,
    #[serde(default)]
    exceptions: Vec<ExceptionRecord>,
}

#[derive(Debug, Deserialize)]
struct ExceptionRecord {
    date: String,
    add_day: bool,
}

#[derive(Debug, Deserialize)]
struct TrainRecord {
    id: u32,
    number: u32,
    period: Option<u32>,
    train_type: u32,
    capacity: u32,
    halts: Vec<HaltRecord>,
}

#[derive(Debug, Deserialize)]
struct HaltRecord {
    id: u32,
    station: u32,
    arrival: String,
    departure: String,
    sequence: u16,
}

/// Loads a schedule snapshot from a JSON file.
pub fn load_schedule(path: impl AsRef<Path>) -> Result<Timetable, LoadError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let file: ScheduleFile = serde_json::from_str(&raw)?;

    let mut builder = TimetableBuilder::new();

    for record in file.stations {
        builder.add_station(Station::new(
            StationId(record.id),
            record.name,
            record.lat,
            record.lng,
        ))?;
    }
    for record in file.train_types {
        builder.add_train_type(TrainType::new(
            TrainTypeId(record.id),
            record.name,
            record.km_price,
        ))?;
    }
    for record in file.periods {
        let id = PeriodId(record.id);
        let weekdays = [
            record.monday,
            record.tuesday,
            record.wednesday,
            record.thursday,
            record.friday,
            record.saturday,
            record.sunday,
        ];
        builder.add_period(Period::new(
            id,
            weekdays,
            parse_date(&record.start_date)?,
            parse_date(&record.end_date)?,
        ))?;
        for exception in record.exceptions {
            builder.add_period_exception(
                id,
                PeriodException {
                    date: parse_date(&exception.date)?,
                    add_day: exception.add_day,
                },
            )?;
        }
    }
    for record in file.trains {
        let train_id = TrainId(record.id);
        builder.add_train(Train::new(
            train_id,
            record.number,
            record.period.map(PeriodId),
            TrainTypeId(record.train_type),
            record.capacity,
        ))?;
        for halt in record.halts {
            builder.add_halt(Halt::new(
                HaltId(halt.id),
                train_id,
                StationId(halt.station),
                parse_time(&halt.arrival)?,
                parse_time(&halt.departure)?,
                halt.sequence,
            ))?;
        }
    }

    let timetable = builder.build();
    info!(
        stations = timetable.station_count(),
        trains = timetable.train_count(),
        halts = timetable.halt_count(),
        periods = timetable.period_count(),
        "schedule snapshot loaded"
    );
    Ok(timetable)
}

fn parse_date(value: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| LoadError::Date {
        value: value.to_string(),
        source,
    })
}

fn parse_time(value: &str) -> Result<NaiveTime, LoadError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|source| LoadError::Time {
            value: value.to_string(),
            source,
        })
}
