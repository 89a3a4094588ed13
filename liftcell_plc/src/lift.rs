//! Per-lift model: physical state, job bookkeeping, and reach intervals.

use liftcell_common::state::{CancelReason, ForkSide, HandshakeJob, LiftId, StationStatus, TaskType};

use crate::config::CellConfig;
use crate::motion::MotionDriver;
use crate::sequencer::cycle;

// ─── Reach ──────────────────────────────────────────────────────────

/// Closed row interval a lift occupies or may occupy before its next safe
/// checkpoint. The empty reach (`0..=0`) means "nowhere": a parked lift at
/// the undefined row reserves nothing and overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reach {
    pub min: i64,
    pub max: i64,
}

impl Reach {
    pub const EMPTY: Self = Self { min: 0, max: 0 };

    /// Span of all positive rows in `rows`. Row 0 (undefined) never
    /// extends a span; with no positive rows the reach is empty.
    pub fn span(rows: impl IntoIterator<Item = i64>) -> Self {
        let mut it = rows.into_iter().filter(|&r| r > 0);
        let first = match it.next() {
            Some(r) => r,
            None => return Self::EMPTY,
        };
        let (min, max) = it.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r)));
        Self { min, max }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// Closed-interval intersection test; empty reaches overlap nothing.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min <= other.max && other.min <= self.max
    }
}

// ─── Job ────────────────────────────────────────────────────────────

/// An admitted job, normalized by the validator (BringAway's origin is the
/// row the lift stood on at admission; MoveTo targets `destination`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveJob {
    pub task: TaskType,
    pub origin: i64,
    pub destination: i64,
}

impl ActiveJob {
    /// The row interval this job needs, seen from `current_row`.
    pub fn reach_from(&self, current_row: i64) -> Reach {
        match self.task {
            TaskType::Full | TaskType::PreparePickup => {
                Reach::span([current_row, self.origin, self.destination])
            }
            TaskType::MoveTo | TaskType::BringAway => {
                Reach::span([current_row, self.destination])
            }
        }
    }
}

// ─── Lift State ─────────────────────────────────────────────────────

/// Complete per-lift state: the physical model, the sequencer's cycle and
/// published fields, and the motion driver.
#[derive(Debug)]
pub struct LiftState {
    pub id: LiftId,

    // ── Physical model ──
    /// Current row (0 = undefined/park).
    pub row: i64,
    /// Current fork side.
    pub fork_side: ForkSide,
    /// Tray on the forks.
    pub tray_present: bool,
    /// Motion primitive driver.
    pub motion: MotionDriver,

    // ── Sequencer ──
    /// Current cycle code — the sequencer state itself.
    pub cycle: i16,
    /// Admitted job, if any.
    pub job: Option<ActiveJob>,
    /// Pending handshake advertisement.
    pub handshake: HandshakeJob,
    /// Reach interval recomputed each tick.
    pub reach: Reach,
    /// Edge tracker: a low acknowledge sample has been seen since the
    /// last consumed rising edge.
    pub(crate) ack_seen_low: bool,

    // ── Published fields ──
    pub station_status: StationStatus,
    /// Published cancel code (0 = none).
    pub cancel_published: i16,
    /// Latched error code (0 = none).
    pub error_code: i16,
    pub short_alarm: String,
    pub alarm_solution: String,
    pub state_description: String,
    pub seq_comment: String,
}

impl LiftState {
    pub fn new(id: LiftId, config: &CellConfig) -> Self {
        Self {
            id,
            row: config.lift(id).initial_row,
            fork_side: ForkSide::Middle,
            tray_present: false,
            motion: MotionDriver::new(),
            cycle: cycle::INIT,
            job: None,
            handshake: HandshakeJob::None,
            reach: Reach::EMPTY,
            ack_seen_low: false,
            station_status: StationStatus::Booting,
            cancel_published: 0,
            error_code: 0,
            short_alarm: String::new(),
            alarm_solution: String::new(),
            state_description: "Initializing".to_string(),
            seq_comment: "Initializing".to_string(),
        }
    }

    /// True while a job occupies this lift (from validation up to, but not
    /// including, the Rejected terminal).
    #[inline]
    pub fn job_active(&self) -> bool {
        self.cycle >= cycle::VALIDATE && self.cycle < cycle::REJECTED
    }

    /// True while the lift sits in the latched-error state.
    #[inline]
    pub fn errored(&self) -> bool {
        self.cycle == cycle::ERROR
    }

    /// Recompute this lift's reach from its current row and job.
    pub fn update_reach(&mut self) {
        self.reach = match &self.job {
            Some(job) => job.reach_from(self.row),
            None => Reach::span([self.row]),
        };
    }

    /// Latch the published cancel reason. Kept with the cycle transition in
    /// a single call so reason and state move atomically.
    pub(crate) fn reject(&mut self, reason: CancelReason, comment: impl Into<String>) {
        self.cancel_published = reason as i16;
        self.cycle = cycle::REJECTED;
        self.job = None;
        self.handshake = HandshakeJob::None;
        self.station_status = StationStatus::Warning;
        self.seq_comment = comment.into();
    }

    /// Force the lift into the latched-error state (cycle 888), e.g. from
    /// the watchdog, a motion timeout, or a hardware fault report.
    pub fn enter_error(&mut self, alarm: &str, solution: &str) {
        self.error_code = liftcell_common::consts::HARD_ERROR_CODE;
        self.short_alarm = alarm.to_string();
        self.alarm_solution = solution.to_string();
        self.state_description = alarm.to_string();
        self.station_status = StationStatus::Error;
        self.cycle = cycle::ERROR;
        self.job = None;
        self.handshake = HandshakeJob::None;
        self.motion.reset();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
