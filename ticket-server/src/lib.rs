//! Train ticket search and booking server.
//!
//! Answers: "how do I get from this station to that one, on this date,
//! around this hour, with seats left for my party?" Works over GTFS-derived
//! schedule data, with direct and one-connection itineraries.

pub mod booking;
pub mod domain;
pub mod planner;
pub mod timetable;
pub mod web;
