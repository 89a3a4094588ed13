//! Job admission checks.
//!
//! Pure function over the requesting lift, the peer snapshot, and the
//! request. The check order is fixed and part of the external contract:
//! the first failing check determines the published cancel code and no
//! further checks run.

use liftcell_common::state::{CancelReason, TaskType};

use crate::config::CellConfig;
use crate::lift::{ActiveJob, LiftState, Reach};

/// Job inputs as read from the `EcoToPlc` assignment cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRequest {
    pub task: TaskType,
    pub origin: i64,
    pub destination: i64,
}

/// What the validator may know about the peer lift.
#[derive(Debug, Clone, Copy)]
pub struct PeerView {
    /// The peer's declared reach interval.
    pub reach: Reach,
    /// The peer currently owns a job (validation through terminal wait).
    pub job_active: bool,
    /// The peer sits in the latched-error state.
    pub errored: bool,
}

/// Admission check ladder. On success returns the normalized job:
/// BringAway's origin becomes the lift's current row, MoveTo carries its
/// target in `destination` with no origin.
pub fn admit(
    request: &JobRequest,
    lift: &LiftState,
    peer: &PeerView,
    config: &CellConfig,
) -> Result<ActiveJob, CancelReason> {
    let job = normalize(request, lift.row);
    let range = config.lift(lift.id);

    // 1. Crossing the peer's reserved rows.
    if peer.job_active && job.reach_from(lift.row).overlaps(&peer.reach) {
        return Err(CancelReason::LiftsCross);
    }

    // 2. Undefined (zero) positions per task shape. MoveTo targets
    //    `destination` only and is checked at step 5.
    let zero_position = match request.task {
        TaskType::Full => request.origin == 0 || request.destination == 0,
        TaskType::PreparePickup => request.origin == 0,
        TaskType::BringAway => request.destination == 0,
        TaskType::MoveTo => false,
    };
    if zero_position {
        return Err(CancelReason::InvalidZeroPosition);
    }

    // 3. Tray preconditions: pickup legs need empty forks, BringAway needs
    //    a tray to carry.
    if request.task.picks_up() && lift.tray_present {
        return Err(CancelReason::PickupWithTray);
    }
    if request.task == TaskType::BringAway && !lift.tray_present {
        return Err(CancelReason::InvalidAssignment);
    }

    // 4. Destination outside the physical range.
    if request.destination > 0 && !range.in_range(request.destination) {
        return Err(CancelReason::DestinationOutOfReach);
    }

    // 5. Missing destination for a destination-bearing flow.
    if request.task.needs_destination() && request.destination <= 0 {
        return Err(CancelReason::InvalidAssignment);
    }

    // 6. Origin outside the physical range.
    if request.origin > 0 && !range.in_range(request.origin) {
        return Err(CancelReason::OriginOutOfReach);
    }

    Ok(job)
}

fn normalize(request: &JobRequest, current_row: i64) -> ActiveJob {
    match request.task {
        TaskType::BringAway => ActiveJob {
            task: request.task,
            origin: current_row,
            destination: request.destination,
        },
        TaskType::MoveTo => ActiveJob {
            task: request.task,
            origin: 0,
            destination: request.destination,
        },
        TaskType::Full | TaskType::PreparePickup => ActiveJob {
            task: request.task,
            origin: request.origin,
            destination: request.destination,
        },
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
