//! Cell configuration: TOML loading with validation.
//!
//! Physical row ranges, motion durations, and the watchdog window are site
//! parameters, not constants — every value here has a default from
//! `liftcell_common::consts` so the binary also runs configless.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use liftcell_common::config::{ConfigError, ConfigLoader, SharedConfig};
use liftcell_common::consts::*;
use liftcell_common::state::LiftId;

/// Per-lift site parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftConfig {
    /// Lowest addressable row.
    #[serde(default = "default_row_min")]
    pub row_min: i64,
    /// Highest addressable row.
    #[serde(default = "default_row_max")]
    pub row_max: i64,
    /// Row reported at startup (0 = undefined/park).
    #[serde(default)]
    pub initial_row: i64,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            row_min: ROW_MIN_DEFAULT,
            row_max: ROW_MAX_DEFAULT,
            initial_row: 0,
        }
    }
}

impl LiftConfig {
    /// True if `row` is inside this lift's physical range.
    #[inline]
    pub fn in_range(&self, row: i64) -> bool {
        row >= self.row_min && row <= self.row_max
    }
}

/// Complete cell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellConfig {
    /// Base block: log level and service name.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Supervisor tick period [ms].
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Engine travel time per row [s].
    #[serde(default = "default_row_travel_s")]
    pub row_travel_s: f64,

    /// Pick/place dip duration [s].
    #[serde(default = "default_dip_s")]
    pub dip_s: f64,

    /// Fork extension/retraction duration [s].
    #[serde(default = "default_fork_travel_s")]
    pub fork_travel_s: f64,

    /// Watchdog window [s]; supervisor must toggle `xWatchDog` within it.
    #[serde(default = "default_watchdog_window_s")]
    pub watchdog_window_s: f64,

    /// Rows at or below this extend the forks left; above, right.
    #[serde(default = "default_side_split_row")]
    pub side_split_row: i64,

    /// Per-lift parameters, indexed by station.
    #[serde(default)]
    pub lifts: [LiftConfig; 2],
}

fn default_row_min() -> i64 {
    ROW_MIN_DEFAULT
}
fn default_row_max() -> i64 {
    ROW_MAX_DEFAULT
}
fn default_tick_period_ms() -> u64 {
    TICK_PERIOD_MS_DEFAULT
}
fn default_row_travel_s() -> f64 {
    ROW_TRAVEL_S_DEFAULT
}
fn default_dip_s() -> f64 {
    DIP_S_DEFAULT
}
fn default_fork_travel_s() -> f64 {
    FORK_TRAVEL_S_DEFAULT
}
fn default_watchdog_window_s() -> f64 {
    WATCHDOG_WINDOW_S_DEFAULT
}
fn default_side_split_row() -> i64 {
    SIDE_SPLIT_ROW_DEFAULT
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            tick_period_ms: TICK_PERIOD_MS_DEFAULT,
            row_travel_s: ROW_TRAVEL_S_DEFAULT,
            dip_s: DIP_S_DEFAULT,
            fork_travel_s: FORK_TRAVEL_S_DEFAULT,
            watchdog_window_s: WATCHDOG_WINDOW_S_DEFAULT,
            side_split_row: SIDE_SPLIT_ROW_DEFAULT,
            lifts: [LiftConfig::default(), LiftConfig::default()],
        }
    }
}

impl CellConfig {
    /// Load and validate a cell configuration file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation of all parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !(TICK_PERIOD_MS_MIN..=TICK_PERIOD_MS_MAX).contains(&self.tick_period_ms) {
            return Err(ConfigError::ValidationError(format!(
                "tick_period_ms must be within {TICK_PERIOD_MS_MIN}..={TICK_PERIOD_MS_MAX}, got {}",
                self.tick_period_ms
            )));
        }
        for (name, v) in [
            ("row_travel_s", self.row_travel_s),
            ("dip_s", self.dip_s),
            ("fork_travel_s", self.fork_travel_s),
            ("watchdog_window_s", self.watchdog_window_s),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        if self.watchdog_window_s * 1000.0 <= self.tick_period_ms as f64 {
            return Err(ConfigError::ValidationError(
                "watchdog_window_s must exceed one tick period".to_string(),
            ));
        }
        for (idx, lift) in self.lifts.iter().enumerate() {
            if lift.row_min < 1 || lift.row_min > lift.row_max {
                return Err(ConfigError::ValidationError(format!(
                    "lift {idx}: invalid row range {}..={}",
                    lift.row_min, lift.row_max
                )));
            }
            if lift.initial_row != 0 && !lift.in_range(lift.initial_row) {
                return Err(ConfigError::ValidationError(format!(
                    "lift {idx}: initial_row {} outside {}..={}",
                    lift.initial_row, lift.row_min, lift.row_max
                )));
            }
        }
        Ok(())
    }

    /// Parameters of one lift.
    #[inline]
    pub fn lift(&self, id: LiftId) -> &LiftConfig {
        &self.lifts[id.station_index()]
    }

    /// Tick period as a [`Duration`].
    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Watchdog window as a [`Duration`].
    #[inline]
    pub fn watchdog_window(&self) -> Duration {
        Duration::from_secs_f64(self.watchdog_window_s)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_valid() {
        assert!(CellConfig::default().validate().is_ok());
    }

    #[test]
    fn load_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
tick_period_ms = 50
fork_travel_s = 0.25

[shared]
log_level = "debug"
service_name = "bench-cell"

[[lifts]]
row_min = 1
row_max = 40
initial_row = 5

[[lifts]]
row_min = 1
row_max = 40
initial_row = 30
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = CellConfig::load_validated(file.path()).unwrap();
        assert_eq!(config.tick_period_ms, 50);
        assert_eq!(config.fork_travel_s, 0.25);
        assert_eq!(config.lift(LiftId::Lift1).initial_row, 5);
        assert_eq!(config.lift(LiftId::Lift2).row_max, 40);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.row_travel_s, ROW_TRAVEL_S_DEFAULT);
    }

    #[test]
    fn rejects_out_of_band_tick_period() {
        let mut config = CellConfig::default();
        config.tick_period_ms = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_nonpositive_durations() {
        let mut config = CellConfig::default();
        config.fork_travel_s = 0.0;
        assert!(config.validate().is_err());

        let mut config = CellConfig::default();
        config.row_travel_s = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_row_ranges() {
        let mut config = CellConfig::default();
        config.lifts[0].row_min = 10;
        config.lifts[0].row_max = 5;
        assert!(config.validate().is_err());

        let mut config = CellConfig::default();
        config.lifts[1].initial_row = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn in_range_uses_inclusive_bounds() {
        let lift = LiftConfig {
            row_min: 1,
            row_max: 100,
            initial_row: 0,
        };
        assert!(lift.in_range(1));
        assert!(lift.in_range(100));
        assert!(!lift.in_range(0));
        assert!(!lift.in_range(101));
    }
}
