//! Search configuration for the itinerary planner.

use chrono::Duration;

use crate::timetable::TimeWindow;

/// Configuration parameters for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Half-width of the search window around the requested hour (minutes).
    /// The window is `[hour - half, hour + half)`.
    pub window_half_span_mins: u16,

    /// Maximum time between arriving at a connection station and leaving it
    /// on the second train (minutes). Longer waits are rejected.
    pub max_connection_mins: i64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(window_half_span_mins: u16, max_connection_mins: i64) -> Self {
        Self {
            window_half_span_mins,
            max_connection_mins,
        }
    }

    /// The clock window for a requested hour.
    pub fn window_around(&self, hour: u32) -> TimeWindow {
        TimeWindow::around_hour(hour, self.window_half_span_mins)
    }

    /// Returns the maximum connection gap as a Duration.
    pub fn max_connection(&self) -> Duration {
        Duration::minutes(self.max_connection_mins)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window_half_span_mins: 60, // +/- 1 hour
            max_connection_mins: 180,  // 3 hours
        }
    }
}
