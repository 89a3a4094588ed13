//! Wire-visible state enums for the dual-lift cell.
//!
//! All enums use `#[repr(i16)]` because the supervisor-facing variable tree
//! carries them as 16-bit integers. Raw integers are converted exactly once,
//! at the variable-space boundary, via the `from_i16`/`from_i64` constructors;
//! the core never branches on raw values.

use serde::{Deserialize, Serialize};

// ─── Lift Identity ──────────────────────────────────────────────────

/// Identifies one of the two lifts sharing the shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiftId {
    /// Lift 1 — station index 0, `Elevator1` on the wire.
    Lift1,
    /// Lift 2 — station index 1, `Elevator2` on the wire.
    Lift2,
}

impl LiftId {
    /// Both lifts in deterministic tick order.
    pub const BOTH: [Self; 2] = [Self::Lift1, Self::Lift2];

    /// 1-based lift number as used in wire path segments (`Elevator1`).
    #[inline]
    pub const fn number(self) -> u8 {
        match self {
            Self::Lift1 => 1,
            Self::Lift2 => 2,
        }
    }

    /// 0-based station index as used under `PlcToEco/StationData/`.
    #[inline]
    pub const fn station_index(self) -> usize {
        match self {
            Self::Lift1 => 0,
            Self::Lift2 => 1,
        }
    }

    /// The other lift in the shaft.
    #[inline]
    pub const fn peer(self) -> Self {
        match self {
            Self::Lift1 => Self::Lift2,
            Self::Lift2 => Self::Lift1,
        }
    }
}

// ─── Job Vocabulary ─────────────────────────────────────────────────

/// Task type written by the supervisor into `iTaskType`.
///
/// 0 on the wire means "no job" and has no variant here — a job exists
/// only while the raw value is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum TaskType {
    /// Pick a tray at origin, deliver it to destination.
    Full = 1,
    /// Translate the lift to a row; no tray handling.
    MoveTo = 2,
    /// Move to origin and pre-extend the forks for a later pickup.
    PreparePickup = 3,
    /// Deliver the tray already on the forks to destination.
    BringAway = 4,
}

impl TaskType {
    /// Convert from the raw `iTaskType` wire value. Returns `None` for
    /// values outside `1..=4` (including 0 = idle).
    #[inline]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Full),
            2 => Some(Self::MoveTo),
            3 => Some(Self::PreparePickup),
            4 => Some(Self::BringAway),
            _ => None,
        }
    }

    /// True for tasks whose first leg picks a tray up (tray must be absent).
    #[inline]
    pub const fn picks_up(self) -> bool {
        matches!(self, Self::Full | Self::PreparePickup)
    }

    /// True for tasks that need a usable destination row.
    #[inline]
    pub const fn needs_destination(self) -> bool {
        matches!(self, Self::Full | Self::MoveTo | Self::BringAway)
    }
}

/// Reason a job was refused or aborted — the on-wire cancel code enum.
///
/// Published as `iCancelAssignment` (0 = none). The numeric values are part
/// of the external contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum CancelReason {
    /// Pickup requested while a tray is already on the forks.
    PickupWithTray = 1,
    /// Destination row outside the lift's physical range.
    DestinationOutOfReach = 2,
    /// Origin row outside the lift's physical range.
    OriginOutOfReach = 3,
    /// A required position was zero (undefined).
    InvalidZeroPosition = 4,
    /// Executing the job would cross the other lift's reserved rows.
    LiftsCross = 5,
    /// Malformed assignment (unknown task, missing destination, no tray for BringAway).
    InvalidAssignment = 6,
    /// The supervisor cancelled the job.
    ByEcosystem = 7,
}

impl CancelReason {
    #[inline]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::PickupWithTray),
            2 => Some(Self::DestinationOutOfReach),
            3 => Some(Self::OriginOutOfReach),
            4 => Some(Self::InvalidZeroPosition),
            5 => Some(Self::LiftsCross),
            6 => Some(Self::InvalidAssignment),
            7 => Some(Self::ByEcosystem),
            _ => None,
        }
    }
}

// ─── Station Presentation ───────────────────────────────────────────

/// Per-station status published as `iStationStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum StationStatus {
    /// Status not applicable.
    NotApplicable = 0,
    /// Normal operation.
    Ok = 1,
    /// Informational — a job is in progress.
    Notification = 2,
    /// A job was rejected; operator attention useful.
    Warning = 3,
    /// Latched error; requires `xClearError`.
    Error = 4,
    /// Starting up.
    Booting = 5,
    /// Station offline.
    Offline = 6,
    /// Semi-automatic mode.
    SemiAuto = 7,
    /// Teach mode.
    Teach = 8,
    /// Hand (manual) mode.
    Hand = 9,
    /// Homing.
    Home = 10,
    /// Stopped.
    Stop = 11,
}

impl StationStatus {
    #[inline]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::NotApplicable),
            1 => Some(Self::Ok),
            2 => Some(Self::Notification),
            3 => Some(Self::Warning),
            4 => Some(Self::Error),
            5 => Some(Self::Booting),
            6 => Some(Self::Offline),
            7 => Some(Self::SemiAuto),
            8 => Some(Self::Teach),
            9 => Some(Self::Hand),
            10 => Some(Self::Home),
            11 => Some(Self::Stop),
            _ => None,
        }
    }
}

impl Default for StationStatus {
    fn default() -> Self {
        Self::Booting
    }
}

// ─── Mechanics ──────────────────────────────────────────────────────

/// Lateral fork extension state, published as `iCurrentForkSide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum ForkSide {
    /// Extended to the left rack.
    Left = 0,
    /// Retracted (travel position).
    Middle = 1,
    /// Extended to the right rack.
    Right = 2,
}

impl ForkSide {
    #[inline]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

impl Default for ForkSide {
    fn default() -> Self {
        Self::Middle
    }
}

/// Acknowledgement the sequencer is waiting for at a handshake point,
/// published as `Handshake/iJobType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum HandshakeJob {
    /// No handshake pending.
    None = 0,
    /// Confirm the pickup leg may proceed.
    GetTray = 1,
    /// Confirm the delivery leg may proceed.
    SetTray = 2,
}

impl HandshakeJob {
    #[inline]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::GetTray),
            2 => Some(Self::SetTray),
            _ => None,
        }
    }
}

impl Default for HandshakeJob {
    fn default() -> Self {
        Self::None
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_roundtrip() {
        for v in 1..=4i64 {
            let t = TaskType::from_i64(v).unwrap();
            assert_eq!(t as i64, v);
        }
        assert!(TaskType::from_i64(0).is_none());
        assert!(TaskType::from_i64(5).is_none());
        assert!(TaskType::from_i64(-1).is_none());
    }

    #[test]
    fn task_type_shape_predicates() {
        assert!(TaskType::Full.picks_up());
        assert!(TaskType::PreparePickup.picks_up());
        assert!(!TaskType::MoveTo.picks_up());
        assert!(!TaskType::BringAway.picks_up());

        assert!(TaskType::Full.needs_destination());
        assert!(TaskType::MoveTo.needs_destination());
        assert!(TaskType::BringAway.needs_destination());
        assert!(!TaskType::PreparePickup.needs_destination());
    }

    #[test]
    fn cancel_reason_roundtrip() {
        for v in 1..=7i16 {
            let r = CancelReason::from_i16(v).unwrap();
            assert_eq!(r as i16, v);
        }
        assert!(CancelReason::from_i16(0).is_none());
        assert!(CancelReason::from_i16(8).is_none());
    }

    #[test]
    fn station_status_roundtrip() {
        for v in 0..=11i16 {
            let s = StationStatus::from_i16(v).unwrap();
            assert_eq!(s as i16, v);
        }
        assert!(StationStatus::from_i16(12).is_none());
    }

    #[test]
    fn fork_side_roundtrip() {
        for v in 0..=2i16 {
            let s = ForkSide::from_i16(v).unwrap();
            assert_eq!(s as i16, v);
        }
        assert!(ForkSide::from_i16(3).is_none());
        assert_eq!(ForkSide::default(), ForkSide::Middle);
    }

    #[test]
    fn handshake_job_roundtrip() {
        for v in 0..=2i16 {
            let h = HandshakeJob::from_i16(v).unwrap();
            assert_eq!(h as i16, v);
        }
        assert!(HandshakeJob::from_i16(3).is_none());
    }

    #[test]
    fn lift_id_wire_identity() {
        assert_eq!(LiftId::Lift1.number(), 1);
        assert_eq!(LiftId::Lift2.number(), 2);
        assert_eq!(LiftId::Lift1.station_index(), 0);
        assert_eq!(LiftId::Lift2.station_index(), 1);
        assert_eq!(LiftId::Lift1.peer(), LiftId::Lift2);
        assert_eq!(LiftId::Lift2.peer(), LiftId::Lift1);
    }
}
