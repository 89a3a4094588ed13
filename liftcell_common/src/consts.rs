//! System-wide constants for the lift cell workspace.
//!
//! Single source of truth for numeric defaults and limits.

/// Number of stations (lifts) in the cell.
pub const STATION_COUNT: i16 = 2;

/// Default supervisor tick period [ms].
pub const TICK_PERIOD_MS_DEFAULT: u64 = 100;

/// Minimum allowed tick period [ms].
pub const TICK_PERIOD_MS_MIN: u64 = 50;

/// Maximum allowed tick period [ms].
pub const TICK_PERIOD_MS_MAX: u64 = 100;

/// Default engine travel time per row [s].
pub const ROW_TRAVEL_S_DEFAULT: f64 = 0.05;

/// Floor for a single engine move duration [s].
pub const ENGINE_MOVE_MIN_S: f64 = 0.1;

/// Default pick/place dip duration [s].
pub const DIP_S_DEFAULT: f64 = 0.5;

/// Default fork extension/retraction duration [s].
pub const FORK_TRAVEL_S_DEFAULT: f64 = 1.0;

/// Default watchdog window [s] — supervisor must toggle within this.
pub const WATCHDOG_WINDOW_S_DEFAULT: f64 = 5.0;

/// Default lowest addressable row.
pub const ROW_MIN_DEFAULT: i64 = 1;

/// Default highest addressable row.
pub const ROW_MAX_DEFAULT: i64 = 100;

/// Default split row: rows at or below extend the forks left, above extend right.
pub const SIDE_SPLIT_ROW_DEFAULT: i64 = 50;

/// Latched hardware/motion error code (watchdog expiry, motion timeout, lost tray).
pub const HARD_ERROR_CODE: i16 = 888;

/// Cap on published string field length (sequence comments, alarm texts).
pub const WIRE_STRING_MAX: usize = 200;
