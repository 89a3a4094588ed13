//! Timed motion primitives: engine (row) moves and fork moves.
//!
//! Each primitive is a start instant plus a nominal duration; it reports
//! done once the clock passes the nominal duration. There is no queueing —
//! starting a primitive while one is in flight is a programming error.
//!
//! A primitive that fails to complete by 2 × its nominal duration has
//! stalled (jammed fork, tripped drive); the driver then reports
//! [`MotionEvent::TimedOut`] and the sequencer latches error 888. In this
//! simulation model a stall only happens when injected via
//! [`MotionDriver::inject_stall`].

use std::time::Duration;
use tracing::debug;

use liftcell_common::consts::ENGINE_MOVE_MIN_S;
use liftcell_common::state::ForkSide;

use crate::config::CellConfig;

/// Row-offset behavior of an engine move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetMode {
    /// Travel to the target row exactly.
    Exact,
    /// Short dip below the tray to slide the forks under it.
    PickupOffset,
    /// Short dip to set the tray down onto the rack.
    PlaceOffset,
}

/// Completion (or failure) of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// Engine move finished; the lift now sits at `row`.
    EngineArrived { row: i64, mode: OffsetMode },
    /// Fork move finished; the forks now sit at `side`.
    ForkArrived { side: ForkSide },
    /// Primitive exceeded twice its nominal duration.
    TimedOut { what: &'static str },
}

#[derive(Debug, Clone, Copy)]
struct EngineMove {
    target_row: i64,
    mode: OffsetMode,
    started: Duration,
    nominal: Duration,
}

#[derive(Debug, Clone, Copy)]
struct ForkMove {
    target: ForkSide,
    started: Duration,
    nominal: Duration,
}

#[derive(Debug, Clone, Copy)]
enum Active {
    Idle,
    Engine(EngineMove),
    Fork(ForkMove),
}

/// Per-lift motion driver. At most one primitive in flight.
#[derive(Debug)]
pub struct MotionDriver {
    active: Active,
    stalled: bool,
}

impl MotionDriver {
    pub fn new() -> Self {
        Self {
            active: Active::Idle,
            stalled: false,
        }
    }

    /// True when no primitive is in flight.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.active, Active::Idle)
    }

    /// Start an engine move toward `target_row`.
    ///
    /// Duration scales with the row distance for [`OffsetMode::Exact`]
    /// moves (with a fixed floor); dip moves use the configured dip time.
    pub fn start_engine_move(
        &mut self,
        now: Duration,
        current_row: i64,
        target_row: i64,
        mode: OffsetMode,
        config: &CellConfig,
    ) {
        debug_assert!(self.is_idle(), "engine move started while busy");
        let nominal = match mode {
            OffsetMode::Exact => {
                let rows = (target_row - current_row).unsigned_abs();
                let travel = rows as f64 * config.row_travel_s;
                Duration::from_secs_f64(travel.max(ENGINE_MOVE_MIN_S))
            }
            OffsetMode::PickupOffset | OffsetMode::PlaceOffset => {
                Duration::from_secs_f64(config.dip_s)
            }
        };
        debug!(?mode, current_row, target_row, ?nominal, "engine move started");
        self.active = Active::Engine(EngineMove {
            target_row,
            mode,
            started: now,
            nominal,
        });
    }

    /// Start a fork move toward `side`.
    pub fn start_fork_move(&mut self, now: Duration, side: ForkSide, config: &CellConfig) {
        debug_assert!(self.is_idle(), "fork move started while busy");
        debug!(?side, "fork move started");
        self.active = Active::Fork(ForkMove {
            target: side,
            started: now,
            nominal: Duration::from_secs_f64(config.fork_travel_s),
        });
    }

    /// Advance the driver to `now`, returning a completion event if the
    /// in-flight primitive finished (or stalled past its deadline).
    pub fn poll(&mut self, now: Duration) -> Option<MotionEvent> {
        let (elapsed, nominal, what) = match &self.active {
            Active::Idle => return None,
            Active::Engine(m) => (now.saturating_sub(m.started), m.nominal, "engine move"),
            Active::Fork(m) => (now.saturating_sub(m.started), m.nominal, "fork move"),
        };

        if self.stalled {
            if elapsed > nominal * 2 {
                debug!(what, "motion deadline exceeded");
                self.active = Active::Idle;
                self.stalled = false;
                return Some(MotionEvent::TimedOut { what });
            }
            return None;
        }

        if elapsed < nominal {
            return None;
        }

        let event = match self.active {
            Active::Engine(m) => MotionEvent::EngineArrived {
                row: m.target_row,
                mode: m.mode,
            },
            Active::Fork(m) => MotionEvent::ForkArrived { side: m.target },
            Active::Idle => unreachable!(),
        };
        debug!(?event, "motion finished");
        self.active = Active::Idle;
        Some(event)
    }

    /// Drop any in-flight primitive (error entry, init).
    pub fn reset(&mut self) {
        self.active = Active::Idle;
        self.stalled = false;
    }

    /// Fault injection: the in-flight primitive never completes and will
    /// run into its 2× deadline instead.
    pub fn inject_stall(&mut self) {
        self.stalled = true;
    }
}

impl Default for MotionDriver {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
