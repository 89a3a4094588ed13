//! Fieldbus variable paths.
//!
//! The supervisor and the PLC core share a flat tree of named cells under
//! two roots: `EcoToPlc` (supervisor writes, core reads) and `PlcToEco`
//! (core writes, supervisor reads). These builders are the only place path
//! strings are assembled.
//!
//! Lift 1 carries a historical misspelling of `iCancelAssignment`
//! (`iCancelAssignent`, missing 't') that deployed supervisors still use.
//! Both spellings are published and accepted on lift 1; lift 2 uses the
//! corrected spelling only. This is wire compatibility, not a bug to fix.

use crate::state::LiftId;

/// Paths the supervisor writes and the core reads.
pub mod eco_to_plc {
    use super::LiftId;

    /// Liveness bit; the supervisor sets it, the core clears it each tick.
    pub const WATCHDOG: &str = "EcoToPlc/xWatchDog";

    /// Handshake acknowledgement bit.
    pub fn acknowledge_movement(lift: LiftId) -> String {
        format!("EcoToPlc/Elevator{}/xAcknowledgeMovement", lift.number())
    }

    /// Supervisor-driven cancel request (nonzero aborts the active job).
    pub fn cancel_assignment(lift: LiftId) -> String {
        format!("EcoToPlc/Elevator{}/iCancelAssignment", lift.number())
    }

    /// Misspelled alias of [`cancel_assignment`], lift 1 only.
    pub fn cancel_assignment_alias(lift: LiftId) -> Option<String> {
        match lift {
            LiftId::Lift1 => Some("EcoToPlc/Elevator1/iCancelAssignent".to_string()),
            LiftId::Lift2 => None,
        }
    }

    /// Error acknowledgement bit; routes an errored lift back to Init.
    pub fn clear_error(lift: LiftId) -> String {
        format!("EcoToPlc/Elevator{}/xClearError", lift.number())
    }

    fn assignment(lift: LiftId, field: &str) -> String {
        let n = lift.number();
        format!("EcoToPlc/Elevator{n}/Elevator{n}EcoSystAssignment/{field}")
    }

    /// Requested task type (0 = no job).
    pub fn task_type(lift: LiftId) -> String {
        assignment(lift, "iTaskType")
    }

    /// Requested origin row.
    pub fn origination(lift: LiftId) -> String {
        assignment(lift, "iOrigination")
    }

    /// Requested destination row.
    pub fn destination(lift: LiftId) -> String {
        assignment(lift, "iDestination")
    }
}

/// Paths the core writes and the supervisor reads.
pub mod plc_to_eco {
    use super::LiftId;

    /// Station count (constant 2). The historical spelling is part of the wire contract.
    pub const AMOUNT_OF_STATIONS: &str = "PlcToEco/StationDataToEco/iAmountOfSations";

    /// Aggregate cell status.
    pub const MAIN_STATUS: &str = "PlcToEco/StationDataToEco/iMainStatus";

    fn station(lift: LiftId, field: &str) -> String {
        format!("PlcToEco/StationData/{}/{field}", lift.station_index())
    }

    /// Current sequencer cycle number.
    pub fn cycle(lift: LiftId) -> String {
        station(lift, "iCycle")
    }

    /// Station status enum value.
    pub fn station_status(lift: LiftId) -> String {
        station(lift, "iStationStatus")
    }

    /// Expected acknowledgement kind at the pending handshake point.
    pub fn handshake_job_type(lift: LiftId) -> String {
        station(lift, "Handshake/iJobType")
    }

    /// Handshake row number. Declared but unused by deployed supervisors; always 0.
    pub fn handshake_row_nr(lift: LiftId) -> String {
        station(lift, "Handshake/iRowNr")
    }

    /// Published cancel reason code (0 = none).
    pub fn cancel_assignment(lift: LiftId) -> String {
        station(lift, "iCancelAssignment")
    }

    /// Misspelled alias of [`cancel_assignment`], lift 1 only.
    pub fn cancel_assignment_alias(lift: LiftId) -> Option<String> {
        match lift {
            LiftId::Lift1 => Some("PlcToEco/StationData/0/iCancelAssignent".to_string()),
            LiftId::Lift2 => None,
        }
    }

    /// One-line alarm description.
    pub fn short_alarm_description(lift: LiftId) -> String {
        station(lift, "sShortAlarmDescription")
    }

    /// Suggested operator action for the active alarm.
    pub fn alarm_solution(lift: LiftId) -> String {
        station(lift, "sAlarmSolution")
    }

    /// Human-readable station state.
    pub fn station_state_description(lift: LiftId) -> String {
        station(lift, "sStationStateDescription")
    }

    fn elevator(lift: LiftId, field: &str) -> String {
        format!("PlcToEco/Elevator{}/{field}", lift.number())
    }

    /// Sequencer step comment.
    pub fn seq_step_comment(lift: LiftId) -> String {
        elevator(lift, "sSeq_Step_comment")
    }

    /// Current row (0 = undefined/park).
    pub fn elevator_row_location(lift: LiftId) -> String {
        elevator(lift, "iElevatorRowLocation")
    }

    /// Tray-on-forks flag. Also writable by the supervisor as a documented
    /// test override; all other supervisor writes to `PlcToEco` are reverted.
    pub fn tray_in_elevator(lift: LiftId) -> String {
        elevator(lift, "xTrayInElevator")
    }

    /// Current fork side.
    pub fn current_fork_side(lift: LiftId) -> String {
        elevator(lift, "iCurrentForkSide")
    }

    /// Latched error code (0 = none).
    pub fn error_code(lift: LiftId) -> String {
        elevator(lift, "iErrorCode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LiftId::{Lift1, Lift2};

    #[test]
    fn assignment_paths_nest_per_elevator() {
        assert_eq!(
            eco_to_plc::task_type(Lift1),
            "EcoToPlc/Elevator1/Elevator1EcoSystAssignment/iTaskType"
        );
        assert_eq!(
            eco_to_plc::destination(Lift2),
            "EcoToPlc/Elevator2/Elevator2EcoSystAssignment/iDestination"
        );
    }

    #[test]
    fn typo_alias_exists_only_on_lift1() {
        assert_eq!(
            eco_to_plc::cancel_assignment_alias(Lift1).as_deref(),
            Some("EcoToPlc/Elevator1/iCancelAssignent")
        );
        assert!(eco_to_plc::cancel_assignment_alias(Lift2).is_none());

        assert_eq!(
            plc_to_eco::cancel_assignment_alias(Lift1).as_deref(),
            Some("PlcToEco/StationData/0/iCancelAssignent")
        );
        assert!(plc_to_eco::cancel_assignment_alias(Lift2).is_none());
    }

    #[test]
    fn station_paths_use_zero_based_index() {
        assert_eq!(plc_to_eco::cycle(Lift1), "PlcToEco/StationData/0/iCycle");
        assert_eq!(
            plc_to_eco::handshake_job_type(Lift2),
            "PlcToEco/StationData/1/Handshake/iJobType"
        );
    }

    #[test]
    fn elevator_paths_use_one_based_number() {
        assert_eq!(
            plc_to_eco::elevator_row_location(Lift1),
            "PlcToEco/Elevator1/iElevatorRowLocation"
        );
        assert_eq!(
            plc_to_eco::tray_in_elevator(Lift2),
            "PlcToEco/Elevator2/xTrayInElevator"
        );
    }
}
