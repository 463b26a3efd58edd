use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use ticket_server::booking::BookingLedger;
use ticket_server::planner::SearchConfig;
use ticket_server::timetable::load_schedule;
use ticket_server::web::{AppState, create_router};

/// Schedule snapshot read when SCHEDULE_FILE is not set.
const DEFAULT_SCHEDULE_FILE: &str = "data/schedule.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load the schedule snapshot produced by the GTFS import
    let schedule_path =
        std::env::var("SCHEDULE_FILE").unwrap_or_else(|_| DEFAULT_SCHEDULE_FILE.to_string());
    let timetable = load_schedule(&schedule_path)
        .unwrap_or_else(|e| panic!("Failed to load schedule from {schedule_path}: {e}"));
    tracing::info!(
        stations = timetable.station_count(),
        trains = timetable.train_count(),
        halts = timetable.halt_count(),
        "timetable ready"
    );

    let state = AppState::new(timetable, BookingLedger::new(), SearchConfig::default());
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("TICKET_SERVER_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

    println!("Ticket server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health               - Health check");
    println!("  GET  /api/stations/search  - Station name autocomplete");
    println!("  GET  /search/itinerary     - Search itineraries");
    println!("  POST /travel/book          - Book a travel");
    println!("  GET  /travel/{{id}}          - Fetch a booked travel");
    println!("  POST /travel/{{id}}/cancel   - Cancel a booked travel");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
