//! Prelude module for common re-exports.
//!
//! `use liftcell_common::prelude::*;` pulls in the types nearly every
//! consumer needs without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Wire Vocabulary ────────────────────────────────────────────────
pub use crate::state::{CancelReason, ForkSide, HandshakeJob, LiftId, StationStatus, TaskType};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{HARD_ERROR_CODE, STATION_COUNT, TICK_PERIOD_MS_DEFAULT};
