//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::booking::{BookingError, TicketRequest};
use crate::domain::{HaltId, StationId, TrainId, TravelId};
use crate::planner::{Planner, SearchError, SearchRequest, TimeMode};
use crate::timetable::TimetableError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations/search", get(search_stations))
        .route("/search/itinerary", get(search_itinerary))
        .route("/travel/book", post(book_travel))
        .route("/travel/:id", get(get_travel))
        .route("/travel/:id/cancel", post(cancel_travel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Station name autocomplete.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let stations = state
        .timetable
        .search_stations(&req.q, limit)
        .into_iter()
        .map(|s| StationResult {
            id: s.id.0,
            name: s.name.clone(),
            lat: s.lat,
            lng: s.lng,
        })
        .collect();
    Json(StationSearchResponse { stations })
}

/// Search itineraries between two stations.
async fn search_itinerary(
    State(state): State<AppState>,
    Query(req): Query<ItinerarySearchRequest>,
) -> Result<Json<ItinerarySearchResponse>, AppError> {
    let date = parse_date(&req.date)?;
    let mode = parse_mode(req.mode.as_deref())?;
    if req.passengers == 0 {
        return Err(AppError::BadRequest {
            message: "passenger count must be positive".to_string(),
        });
    }
    if req.hour > 23 {
        return Err(AppError::BadRequest {
            message: format!("hour must be 0-23, got {}", req.hour),
        });
    }

    let request = SearchRequest::new(
        StationId(req.from),
        StationId(req.to),
        date,
        req.hour,
        req.passengers,
        mode,
    );
    let planner = Planner::new(&state.timetable, &state.bookings, &state.config);
    let itineraries = planner.search(&request)?;

    Ok(Json(ItinerarySearchResponse {
        date: req.date,
        passengers: req.passengers,
        itineraries: itineraries
            .iter()
            .map(|it| ItineraryResult::from_itinerary(&state.timetable, it))
            .collect(),
    }))
}

/// Book a travel.
async fn book_travel(
    State(state): State<AppState>,
    Json(req): Json<BookTravelRequest>,
) -> Result<Json<BookTravelResponse>, AppError> {
    let date = parse_date(&req.date)?;
    if req.passengers == 0 {
        return Err(AppError::BadRequest {
            message: "passenger count must be positive".to_string(),
        });
    }

    let segments: Vec<TicketRequest> = req
        .tickets
        .iter()
        .map(|t| TicketRequest {
            train: TrainId(t.train),
            start_halt: HaltId(t.start_halt),
            end_halt: HaltId(t.end_halt),
        })
        .collect();

    let id = state
        .bookings
        .book(&state.timetable, date, req.passengers, &segments)?;

    Ok(Json(BookTravelResponse {
        travel_id: id.0,
        status: "booked".to_string(),
    }))
}

/// Fetch a booked travel.
async fn get_travel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TravelResult>, AppError> {
    let travel = state.bookings.travel(TravelId(id))?;
    Ok(Json(TravelResult::from_travel(&travel)))
}

/// Cancel a booked travel, releasing its seats.
async fn cancel_travel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TravelResult>, AppError> {
    state.bookings.cancel(TravelId(id))?;
    let travel = state.bookings.travel(TravelId(id))?;
    Ok(Json(TravelResult::from_travel(&travel)))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
        message: format!("invalid date: {value}"),
    })
}

fn parse_mode(value: Option<&str>) -> Result<TimeMode, AppError> {
    match value {
        None => Ok(TimeMode::default()),
        Some(s) => s.parse().map_err(|_| AppError::BadRequest {
            message: format!("invalid mode: {s}"),
        }),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<TimetableError> for AppError {
    fn from(e: TimetableError) -> Self {
        match e {
            TimetableError::StationInUse(_) => AppError::Conflict {
                message: e.to_string(),
            },
            _ => AppError::NotFound {
                message: e.to_string(),
            },
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Timetable(inner) => inner.into(),
            SearchError::Domain(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Timetable(inner) => inner.into(),
            BookingError::InvalidTicket(_) | BookingError::EmptyTravel => AppError::BadRequest {
                message: e.to_string(),
            },
            BookingError::UnknownTravel(_) => AppError::NotFound {
                message: e.to_string(),
            },
            BookingError::Conflict { .. } => AppError::Conflict {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
