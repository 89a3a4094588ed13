//! Per-lift sequencer: the cycle-numbered job state machine.
//!
//! The integer cycle code IS the state — supervisor UIs display it, so the
//! numbers are part of the external contract. Each tick is one call to
//! [`step`]: `(state, inputs, clock) → (state', publications, primitive
//! starts)`. No coroutines, no wall-clock reads.
//!
//! Flow overview:
//!
//! ```text
//! -10 Init → 0 Idle → 10 Ready → 25 Validation → 30 Accepted
//!     Full          100..299   (pickup leg, then delivery leg)
//!     MoveTo        300..399
//!     PreparePickup 400..499
//!     BringAway     joins the Full delivery leg at 201
//! 650 Rejected (cancel code published)    888 Error (xClearError → -10)
//! ```

use std::time::Duration;
use tracing::{info, warn};

use liftcell_common::state::{CancelReason, ForkSide, HandshakeJob, StationStatus, TaskType};

use crate::config::CellConfig;
use crate::lift::{LiftState, Reach};
use crate::motion::{MotionEvent, OffsetMode};
use crate::validator::{self, JobRequest, PeerView};

/// Sequencer cycle codes. External contract — do not renumber.
pub mod cycle {
    /// Zero all fields, re-center the forks.
    pub const INIT: i16 = -10;
    /// Waiting for automatic mode.
    pub const IDLE: i16 = 0;
    /// Waiting for a job assignment.
    pub const READY: i16 = 10;
    /// Admission checks run here.
    pub const VALIDATE: i16 = 25;
    /// Dispatch into the task-specific flow.
    pub const ACCEPTED: i16 = 30;

    // ── Full flow: pickup leg ──
    pub const FULL_GET_TRAY_HS: i16 = 100;
    pub const FULL_FORKS_HOME: i16 = 101;
    pub const FULL_TO_ORIGIN: i16 = 102; // ..=105
    pub const FULL_FORKS_PICKUP: i16 = 150; // ..=153
    pub const FULL_PICKUP_DIP: i16 = 155;
    pub const FULL_PICKUP_LIFT: i16 = 156;
    pub const FULL_FORKS_RETRACT: i16 = 160; // ..=163
    pub const FULL_PICKUP_DONE: i16 = 199;

    // ── Full flow: delivery leg (BringAway joins here) ──
    pub const FULL_SET_TRAY_HS: i16 = 201;
    pub const FULL_TO_DEST: i16 = 202; // ..=205
    pub const FULL_FORKS_PLACE: i16 = 250; // ..=253
    pub const FULL_PLACE_DIP: i16 = 255;
    pub const FULL_PLACE_LIFT: i16 = 256;
    pub const FULL_FORKS_CLEAR: i16 = 260; // ..=263
    pub const FULL_DONE: i16 = 299;

    // ── MoveTo flow ──
    pub const MOVETO_CHECK: i16 = 300;
    pub const MOVETO_TRAVEL: i16 = 301;
    pub const MOVETO_DONE: i16 = 399;

    // ── PreparePickup flow ──
    pub const PREP_GET_TRAY_HS: i16 = 400;
    pub const PREP_TO_ORIGIN: i16 = 402; // ..=405
    pub const PREP_FORKS_PICKUP: i16 = 450; // ..=453
    pub const PREP_DONE: i16 = 499;

    /// Job refused or aborted; cancel code published.
    pub const REJECTED: i16 = 650;
    /// Latched error; waits for `xClearError`.
    pub const ERROR: i16 = 888;
}

/// Per-lift supervisor inputs sampled from `EcoToPlc` at the tick start.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiftInputs {
    pub task_type: i64,
    pub origin: i64,
    pub destination: i64,
    pub acknowledge: bool,
    /// Nonzero aborts the active job (both spellings merged on lift 1).
    pub cancel_request: i64,
    pub clear_error: bool,
}

/// Everything one sequencer step may see besides its own lift.
pub struct StepCtx<'a> {
    pub inputs: LiftInputs,
    pub peer: PeerView,
    pub config: &'a CellConfig,
    pub now: Duration,
    /// Watchdog has been serviced at least once.
    pub auto_enabled: bool,
    /// Cross-lift gate: at most one job admission per tick.
    pub admission_free: &'a mut bool,
}

/// Which rack side serves a row.
fn side_for_row(row: i64, config: &CellConfig) -> ForkSide {
    if row <= config.side_split_row {
        ForkSide::Left
    } else {
        ForkSide::Right
    }
}

/// Advertise a handshake point. On the advertisement tick the edge tracker
/// restarts: only a low observed at or after the advertisement arms the
/// next rising edge, so an acknowledge held high from earlier never counts.
fn advertise_handshake(lift: &mut LiftState, job: HandshakeJob, inputs: &LiftInputs) {
    if lift.handshake != job {
        lift.handshake = job;
        lift.ack_seen_low = !inputs.acknowledge;
    }
}

/// Edge-and-drop acknowledge: a rising edge counts only after a low sample
/// has been observed since the handshake was advertised.
fn consume_ack(lift: &mut LiftState, inputs: &LiftInputs) -> bool {
    if lift.ack_seen_low && inputs.acknowledge {
        lift.ack_seen_low = false;
        lift.handshake = HandshakeJob::None;
        true
    } else {
        false
    }
}

/// Advance one lift sequencer by one tick.
pub fn step(lift: &mut LiftState, ctx: &mut StepCtx<'_>) {
    if !ctx.inputs.acknowledge {
        lift.ack_seen_low = true;
    }

    // Latched error: only xClearError leaves it, always toward Init.
    if lift.cycle == cycle::ERROR {
        lift.station_status = StationStatus::Error;
        if ctx.inputs.clear_error {
            info!(lift = ?lift.id, code = lift.error_code, "error cleared by supervisor");
            lift.error_code = 0;
            lift.short_alarm.clear();
            lift.alarm_solution.clear();
            lift.cancel_published = 0;
            lift.state_description = "Initializing".to_string();
            lift.seq_comment = "Initializing after error clear".to_string();
            lift.station_status = StationStatus::Booting;
            lift.cycle = cycle::INIT;
        }
        return;
    }

    // Settle any in-flight primitive first.
    if let Some(event) = lift.motion.poll(ctx.now) {
        match event {
            MotionEvent::EngineArrived { row, mode } => {
                lift.row = row;
                apply_dip_completion(lift, mode);
            }
            MotionEvent::ForkArrived { side } => {
                lift.fork_side = side;
            }
            MotionEvent::TimedOut { what } => {
                warn!(lift = ?lift.id, what, "motion primitive deadline exceeded");
                lift.enter_error(
                    "Motion timeout",
                    "Inspect drive and forks, then set xClearError.",
                );
                return;
            }
        }
    }

    // A busy primitive owns the lift; the cycle resumes on completion.
    if !lift.motion.is_idle() {
        return;
    }

    // Supervisor cancel, honored once the primitive above has finished.
    if ctx.inputs.cancel_request != 0 && lift.job_active() {
        info!(lift = ?lift.id, cycle = lift.cycle, "job cancelled by supervisor");
        lift.reject(
            CancelReason::ByEcosystem,
            "Job cancelled by supervisor - waiting for job clear",
        );
        return;
    }

    let previous = lift.cycle;
    run_cycle(lift, ctx);
    if lift.cycle != previous {
        info!(lift = ?lift.id, from = previous, to = lift.cycle, "cycle transition");
    }
}

/// Dip completions advance the pickup/place sub-sequence and toggle the
/// tray exactly once, on the final exact move.
fn apply_dip_completion(lift: &mut LiftState, mode: OffsetMode) {
    match (lift.cycle, mode) {
        (cycle::FULL_PICKUP_DIP, OffsetMode::PickupOffset) => {
            lift.cycle = cycle::FULL_PICKUP_LIFT;
        }
        (cycle::FULL_PICKUP_LIFT, OffsetMode::Exact) => {
            lift.tray_present = true;
            lift.cycle = cycle::FULL_FORKS_RETRACT;
        }
        (cycle::FULL_PLACE_DIP, OffsetMode::PlaceOffset) => {
            lift.cycle = cycle::FULL_PLACE_LIFT;
        }
        (cycle::FULL_PLACE_LIFT, OffsetMode::Exact) => {
            lift.tray_present = false;
            lift.cycle = cycle::FULL_FORKS_CLEAR;
        }
        _ => {}
    }
}

fn run_cycle(lift: &mut LiftState, ctx: &mut StepCtx<'_>) {
    match lift.cycle {
        cycle::INIT => {
            lift.job = None;
            lift.handshake = HandshakeJob::None;
            lift.cancel_published = 0;
            lift.seq_comment = "Init: centering forks".to_string();
            if lift.fork_side == ForkSide::Middle {
                lift.seq_comment = "Init complete".to_string();
                lift.cycle = cycle::IDLE;
            } else {
                lift.motion
                    .start_fork_move(ctx.now, ForkSide::Middle, ctx.config);
            }
        }

        cycle::IDLE => {
            lift.station_status = StationStatus::Ok;
            lift.seq_comment = "Idle - waiting for automatic mode".to_string();
            if ctx.auto_enabled {
                lift.cycle = cycle::READY;
            }
        }

        cycle::READY => {
            lift.station_status = StationStatus::Ok;
            lift.state_description = "Ready for Job".to_string();
            lift.seq_comment = "Ready - waiting for job assignment".to_string();
            lift.handshake = HandshakeJob::None;
            if ctx.inputs.task_type != 0 {
                lift.seq_comment = format!(
                    "Job received (task {}, O:{}, D:{}) - validating",
                    ctx.inputs.task_type, ctx.inputs.origin, ctx.inputs.destination
                );
                lift.cycle = cycle::VALIDATE;
            }
        }

        cycle::VALIDATE => {
            // One admission per tick keeps the two validators from racing
            // for the same shaft rows; the later lift re-validates next
            // tick against the winner's reservation.
            if !*ctx.admission_free {
                lift.seq_comment = "Validation deferred - peer admitted this tick".to_string();
                return;
            }
            if ctx.inputs.task_type == 0 {
                // Supervisor withdrew the request before admission.
                lift.cycle = cycle::READY;
                return;
            }
            let Some(task) = TaskType::from_i64(ctx.inputs.task_type) else {
                warn!(lift = ?lift.id, raw = ctx.inputs.task_type, "unknown task type");
                lift.reject(
                    CancelReason::InvalidAssignment,
                    format!("Unknown task type {}", ctx.inputs.task_type),
                );
                return;
            };
            let request = JobRequest {
                task,
                origin: ctx.inputs.origin,
                destination: ctx.inputs.destination,
            };
            match validator::admit(&request, lift, &ctx.peer, ctx.config) {
                Ok(job) => {
                    *ctx.admission_free = false;
                    lift.job = Some(job);
                    lift.cancel_published = 0;
                    lift.short_alarm.clear();
                    lift.alarm_solution.clear();
                    lift.station_status = StationStatus::Notification;
                    lift.seq_comment = format!(
                        "Task {:?} accepted (O:{}, D:{})",
                        job.task, job.origin, job.destination
                    );
                    lift.cycle = cycle::ACCEPTED;
                }
                Err(reason) => {
                    warn!(lift = ?lift.id, ?reason, "job rejected");
                    lift.reject(
                        reason,
                        format!("Job rejected ({reason:?}) - waiting for job clear"),
                    );
                }
            }
        }

        cycle::ACCEPTED => {
            let Some(job) = lift.job else {
                lift.reject(CancelReason::InvalidAssignment, "No job at dispatch");
                return;
            };
            lift.cycle = match job.task {
                TaskType::Full => cycle::FULL_GET_TRAY_HS,
                TaskType::MoveTo => cycle::MOVETO_CHECK,
                TaskType::PreparePickup => cycle::PREP_GET_TRAY_HS,
                // BringAway already carries its tray: delivery leg only.
                TaskType::BringAway => cycle::FULL_SET_TRAY_HS,
            };
            lift.seq_comment = format!("Dispatching {:?}", job.task);
        }

        // ── Full: pickup leg ──
        cycle::FULL_GET_TRAY_HS => {
            advertise_handshake(lift, HandshakeJob::GetTray, &ctx.inputs);
            lift.seq_comment = "Waiting GetTray acknowledge".to_string();
            if consume_ack(lift, &ctx.inputs) {
                lift.cycle = cycle::FULL_FORKS_HOME;
            }
        }
        cycle::FULL_FORKS_HOME => {
            lift.seq_comment = "Centering forks before travel".to_string();
            if lift.fork_side == ForkSide::Middle {
                lift.cycle = cycle::FULL_TO_ORIGIN;
            } else {
                lift.motion
                    .start_fork_move(ctx.now, ForkSide::Middle, ctx.config);
            }
        }
        c if in_group(c, cycle::FULL_TO_ORIGIN) => {
            let target = lift.job.map(|j| j.origin).unwrap_or(0);
            engine_group(lift, ctx, cycle::FULL_TO_ORIGIN, target, cycle::FULL_FORKS_PICKUP);
        }
        c if in_group(c, cycle::FULL_FORKS_PICKUP) => {
            let origin = lift.job.map(|j| j.origin).unwrap_or(0);
            let side = side_for_row(origin, ctx.config);
            fork_group(lift, ctx, cycle::FULL_FORKS_PICKUP, side, cycle::FULL_PICKUP_DIP, None);
        }
        cycle::FULL_PICKUP_DIP => {
            let origin = lift.job.map(|j| j.origin).unwrap_or(lift.row);
            lift.seq_comment = format!("Pickup at {origin}: lowering under tray");
            lift.motion
                .start_engine_move(ctx.now, lift.row, origin, OffsetMode::PickupOffset, ctx.config);
        }
        cycle::FULL_PICKUP_LIFT => {
            let origin = lift.job.map(|j| j.origin).unwrap_or(lift.row);
            lift.seq_comment = format!("Pickup at {origin}: lifting tray");
            lift.motion
                .start_engine_move(ctx.now, lift.row, origin, OffsetMode::Exact, ctx.config);
        }
        c if in_group(c, cycle::FULL_FORKS_RETRACT) => {
            fork_group(
                lift,
                ctx,
                cycle::FULL_FORKS_RETRACT,
                ForkSide::Middle,
                cycle::FULL_PICKUP_DONE,
                Some(true),
            );
        }
        cycle::FULL_PICKUP_DONE => {
            lift.seq_comment = "Pickup phase complete".to_string();
            lift.cycle = cycle::FULL_SET_TRAY_HS;
        }

        // ── Full / BringAway: delivery leg ──
        cycle::FULL_SET_TRAY_HS => {
            advertise_handshake(lift, HandshakeJob::SetTray, &ctx.inputs);
            lift.seq_comment = "Waiting SetTray acknowledge".to_string();
            if consume_ack(lift, &ctx.inputs) {
                lift.cycle = cycle::FULL_TO_DEST;
            }
        }
        c if in_group(c, cycle::FULL_TO_DEST) => {
            let target = lift.job.map(|j| j.destination).unwrap_or(0);
            engine_group(lift, ctx, cycle::FULL_TO_DEST, target, cycle::FULL_FORKS_PLACE);
        }
        c if in_group(c, cycle::FULL_FORKS_PLACE) => {
            let dest = lift.job.map(|j| j.destination).unwrap_or(0);
            let side = side_for_row(dest, ctx.config);
            fork_group(lift, ctx, cycle::FULL_FORKS_PLACE, side, cycle::FULL_PLACE_DIP, None);
        }
        cycle::FULL_PLACE_DIP => {
            let dest = lift.job.map(|j| j.destination).unwrap_or(lift.row);
            lift.seq_comment = format!("Place at {dest}: setting tray down");
            lift.motion
                .start_engine_move(ctx.now, lift.row, dest, OffsetMode::PlaceOffset, ctx.config);
        }
        cycle::FULL_PLACE_LIFT => {
            let dest = lift.job.map(|j| j.destination).unwrap_or(lift.row);
            lift.seq_comment = format!("Place at {dest}: clearing forks");
            lift.motion
                .start_engine_move(ctx.now, lift.row, dest, OffsetMode::Exact, ctx.config);
        }
        c if in_group(c, cycle::FULL_FORKS_CLEAR) => {
            fork_group(
                lift,
                ctx,
                cycle::FULL_FORKS_CLEAR,
                ForkSide::Middle,
                cycle::FULL_DONE,
                Some(false),
            );
        }
        cycle::FULL_DONE => {
            terminal_wait(lift, ctx, "Job complete - waiting for job clear");
        }

        // ── MoveTo ──
        cycle::MOVETO_CHECK => {
            let dest = lift.job.map(|j| j.destination).unwrap_or(0);
            if lift.row == dest {
                lift.seq_comment = format!("Already at target row {dest}");
                lift.cycle = cycle::MOVETO_DONE;
            } else if Reach::span([lift.row, dest]).overlaps(&ctx.peer.reach) {
                // Shaft not free; wait without blocking the tick.
                lift.seq_comment = format!("Waiting for shaft clearance toward {dest}");
            } else {
                lift.seq_comment = format!("Moving to row {dest}");
                lift.motion
                    .start_engine_move(ctx.now, lift.row, dest, OffsetMode::Exact, ctx.config);
                lift.cycle = cycle::MOVETO_TRAVEL;
            }
        }
        cycle::MOVETO_TRAVEL => {
            let dest = lift.job.map(|j| j.destination).unwrap_or(0);
            if lift.row == dest {
                lift.cycle = cycle::MOVETO_DONE;
            }
        }
        cycle::MOVETO_DONE => {
            terminal_wait(lift, ctx, "Move complete - waiting for job clear");
        }

        // ── PreparePickup ──
        cycle::PREP_GET_TRAY_HS => {
            advertise_handshake(lift, HandshakeJob::GetTray, &ctx.inputs);
            lift.seq_comment = "Waiting GetTray acknowledge".to_string();
            if consume_ack(lift, &ctx.inputs) {
                lift.cycle = cycle::PREP_TO_ORIGIN;
            }
        }
        c if in_group(c, cycle::PREP_TO_ORIGIN) => {
            let target = lift.job.map(|j| j.origin).unwrap_or(0);
            engine_group(lift, ctx, cycle::PREP_TO_ORIGIN, target, cycle::PREP_FORKS_PICKUP);
        }
        c if in_group(c, cycle::PREP_FORKS_PICKUP) => {
            let origin = lift.job.map(|j| j.origin).unwrap_or(0);
            let side = side_for_row(origin, ctx.config);
            fork_group(lift, ctx, cycle::PREP_FORKS_PICKUP, side, cycle::PREP_DONE, None);
        }
        cycle::PREP_DONE => {
            terminal_wait(lift, ctx, "Prepared for pickup - waiting for job clear");
        }

        cycle::REJECTED => {
            lift.station_status = StationStatus::Warning;
            if ctx.inputs.task_type == 0 && ctx.inputs.cancel_request == 0 {
                lift.cancel_published = 0;
                lift.cycle = cycle::READY;
            }
        }

        other => {
            warn!(lift = ?lift.id, cycle = other, "undefined sequencer cycle");
            lift.enter_error(
                "Sequencer reached undefined cycle",
                "Clear the error to reinitialize the lift.",
            );
        }
    }
}

/// True when `current` lies in the 4-step group starting at `base`.
#[inline]
fn in_group(current: i16, base: i16) -> bool {
    (base..base + 4).contains(&current)
}

/// Four-step engine travel group: start / travel / verify / settle.
///
/// Holds at the start step while an errored peer blocks the path — the
/// only cross-lift coupling outside the validator.
fn engine_group(lift: &mut LiftState, ctx: &StepCtx<'_>, base: i16, target: i64, next: i16) {
    match lift.cycle - base {
        0 => {
            if lift.row == target {
                lift.cycle = base + 3;
            } else if ctx.peer.errored
                && Reach::span([lift.row, target]).overlaps(&ctx.peer.reach)
            {
                lift.seq_comment = format!("Holding before row {target}: peer lift in error");
            } else {
                lift.seq_comment = format!("Moving to row {target}");
                lift.motion
                    .start_engine_move(ctx.now, lift.row, target, OffsetMode::Exact, ctx.config);
                lift.cycle = base + 1;
            }
        }
        1 => {
            if lift.row == target {
                lift.cycle = base + 2;
            }
        }
        2 => {
            // Position verify; a drift here restarts the move.
            lift.cycle = if lift.row == target { base + 3 } else { base };
        }
        _ => {
            lift.seq_comment = format!("At row {target}");
            lift.cycle = next;
        }
    }
}

/// Four-step fork travel group: start / travel / verify / settle.
///
/// `expect_tray` adds the tray check at the verify step (retract after
/// pickup must still hold the tray; clearing after place must not).
fn fork_group(
    lift: &mut LiftState,
    ctx: &StepCtx<'_>,
    base: i16,
    side: ForkSide,
    next: i16,
    expect_tray: Option<bool>,
) {
    match lift.cycle - base {
        0 => {
            if lift.fork_side == side {
                lift.cycle = base + 3;
            } else {
                lift.seq_comment = format!("Forks to {side:?}");
                lift.motion.start_fork_move(ctx.now, side, ctx.config);
                lift.cycle = base + 1;
            }
        }
        1 => {
            if lift.fork_side == side {
                lift.cycle = base + 2;
            }
        }
        2 => {
            if let Some(expected) = expect_tray {
                if lift.tray_present != expected {
                    let alarm = if expected {
                        "Tray lost after pickup"
                    } else {
                        "Tray still present after place"
                    };
                    warn!(lift = ?lift.id, alarm, "tray check failed");
                    lift.enter_error(alarm, "Inspect the rack position, then set xClearError.");
                    return;
                }
            }
            lift.cycle = if lift.fork_side == side { base + 3 } else { base };
        }
        _ => {
            lift.seq_comment = format!("Forks at {side:?}");
            lift.cycle = next;
        }
    }
}

/// Terminal step shared by 299/399/499: hold until the supervisor clears
/// the job inputs, then return to Ready.
fn terminal_wait(lift: &mut LiftState, ctx: &StepCtx<'_>, comment: &str) {
    lift.station_status = StationStatus::Ok;
    lift.handshake = HandshakeJob::None;
    lift.seq_comment = comment.to_string();
    if ctx.inputs.task_type == 0 {
        lift.job = None;
        lift.cycle = cycle::READY;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
