//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::booking::Travel;
use crate::domain::{Itinerary, TicketSegment};
use crate::timetable::Timetable;

/// Request to search stations by name.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Name fragment to match, case-insensitively
    pub q: String,

    /// Maximum number of results (default 10, capped at 50)
    pub limit: Option<usize>,
}

/// A station in autocomplete results.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Response for station search.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StationResult>,
}

/// Request to search itineraries.
#[derive(Debug, Deserialize)]
pub struct ItinerarySearchRequest {
    /// Origin station id
    pub from: u32,

    /// Destination station id
    pub to: u32,

    /// Travel date, `YYYY-MM-DD`
    pub date: String,

    /// Requested clock hour (0-23); the search window spans one hour
    /// either side
    pub hour: u32,

    /// Party size (positive)
    pub passengers: u32,

    /// `depart_after` (default) or `arrive_before`
    pub mode: Option<String>,
}

/// One ticket segment in a search result.
#[derive(Debug, Serialize)]
pub struct TicketResult {
    pub sequence: u16,
    pub train: u32,
    pub train_number: u32,
    pub start_halt: u32,
    pub end_halt: u32,
    pub from_station: u32,
    pub from_name: String,
    pub departure: String,
    pub to_station: u32,
    pub to_name: String,
    pub arrival: String,
    pub distance_km: f64,
    /// Fare for one passenger on this segment
    pub price: f64,
}

impl TicketResult {
    /// Builds the wire form of a segment, resolving display names.
    pub fn from_segment(timetable: &Timetable, segment: &TicketSegment) -> Self {
        let station_name = |id| {
            timetable
                .station(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|_| "Unknown".to_string())
        };
        let train_number = timetable
            .train(segment.train())
            .map(|t| t.number)
            .unwrap_or_default();

        Self {
            sequence: segment.sequence(),
            train: segment.train().0,
            train_number,
            start_halt: segment.start().id.0,
            end_halt: segment.end().id.0,
            from_station: segment.start().station.0,
            from_name: station_name(segment.start().station),
            departure: segment.start().departure.format("%H:%M").to_string(),
            to_station: segment.end().station.0,
            to_name: station_name(segment.end().station),
            arrival: segment.end().arrival.format("%H:%M").to_string(),
            distance_km: segment.distance_km(),
            price: segment.price(),
        }
    }
}

/// One itinerary in a search result.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    pub tickets: Vec<TicketResult>,
    pub changes: usize,
    pub total_price: f64,
    pub total_distance_km: f64,
}

impl ItineraryResult {
    pub fn from_itinerary(timetable: &Timetable, itinerary: &Itinerary) -> Self {
        Self {
            tickets: itinerary
                .tickets()
                .iter()
                .map(|t| TicketResult::from_segment(timetable, t))
                .collect(),
            changes: itinerary.leg_count().saturating_sub(1),
            total_price: itinerary.total_price(),
            total_distance_km: itinerary.total_distance(),
        }
    }
}

/// Response for itinerary search.
#[derive(Debug, Serialize)]
pub struct ItinerarySearchResponse {
    pub date: String,
    pub passengers: u32,
    pub itineraries: Vec<ItineraryResult>,
}

/// One segment of a booking request.
#[derive(Debug, Deserialize)]
pub struct BookTicketRequest {
    pub train: u32,
    pub start_halt: u32,
    pub end_halt: u32,
}

/// Request to book a travel.
#[derive(Debug, Deserialize)]
pub struct BookTravelRequest {
    /// Travel date, `YYYY-MM-DD`
    pub date: String,

    /// Party size (positive)
    pub passengers: u32,

    /// Segments in travel order
    pub tickets: Vec<BookTicketRequest>,
}

/// Response to a booking request.
#[derive(Debug, Serialize)]
pub struct BookTravelResponse {
    pub travel_id: u64,
    pub status: String,
}

/// A booked ticket on the wire.
#[derive(Debug, Serialize)]
pub struct BookedTicketResult {
    pub sequence: u16,
    pub train: u32,
    pub start_halt: u32,
    pub end_halt: u32,
}

/// A booked travel on the wire.
#[derive(Debug, Serialize)]
pub struct TravelResult {
    pub travel_id: u64,
    pub date: String,
    pub passengers: u32,
    pub status: String,
    pub tickets: Vec<BookedTicketResult>,
}

impl TravelResult {
    pub fn from_travel(travel: &Travel) -> Self {
        Self {
            travel_id: travel.id.0,
            date: travel.date.format("%Y-%m-%d").to_string(),
            passengers: travel.passengers,
            status: format!("{:?}", travel.status).to_lowercase(),
            tickets: travel
                .tickets
                .iter()
                .map(|t| BookedTicketResult {
                    sequence: t.sequence,
                    train: t.train.0,
                    start_halt: t.start_halt.0,
                    end_halt: t.end_halt.0,
                })
                .collect(),
        }
    }
}

/// Error payload for all failure responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
