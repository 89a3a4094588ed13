//! Variable-tree glue: registration, input sampling, and publication.
//!
//! The core owns the `PlcToEco` half of the tree and samples the `EcoToPlc`
//! half at the top of each tick. Publication writes go through the variable
//! space's change suppression, so listeners see a per-tick diff.
//!
//! Supervisor writes into `PlcToEco` are tolerated and reverted on the next
//! publication — with one documented exception: `xTrayInElevator` is a test
//! backdoor (used to stage BringAway flows) and is adopted into the model
//! instead of reverted.

use tracing::info;

use liftcell_common::consts::STATION_COUNT;
use liftcell_common::paths::{eco_to_plc, plc_to_eco};
use liftcell_common::state::{LiftId, StationStatus};

use crate::config::CellConfig;
use crate::lift::LiftState;
use crate::sequencer::{cycle, LiftInputs};
use crate::varspace::{Value, VariableSpace, VarSpaceError};

/// Register the complete variable tree with startup values.
pub fn register_tree(vars: &mut VariableSpace, config: &CellConfig) {
    vars.register(eco_to_plc::WATCHDOG, Value::Bool(false));
    vars.register(plc_to_eco::AMOUNT_OF_STATIONS, Value::Int16(STATION_COUNT));
    vars.register(
        plc_to_eco::MAIN_STATUS,
        Value::Int16(StationStatus::Booting as i16),
    );

    for lift in LiftId::BOTH {
        // Supervisor side.
        vars.register(eco_to_plc::acknowledge_movement(lift), Value::Bool(false));
        vars.register(eco_to_plc::cancel_assignment(lift), Value::Int64(0));
        if let Some(alias) = eco_to_plc::cancel_assignment_alias(lift) {
            vars.register(alias, Value::Int64(0));
        }
        vars.register(eco_to_plc::clear_error(lift), Value::Bool(false));
        vars.register(eco_to_plc::task_type(lift), Value::Int64(0));
        vars.register(eco_to_plc::origination(lift), Value::Int64(0));
        vars.register(eco_to_plc::destination(lift), Value::Int64(0));

        // Core side.
        vars.register(plc_to_eco::cycle(lift), Value::Int16(cycle::INIT));
        vars.register(
            plc_to_eco::station_status(lift),
            Value::Int16(StationStatus::Booting as i16),
        );
        vars.register(plc_to_eco::handshake_job_type(lift), Value::Int16(0));
        vars.register(plc_to_eco::handshake_row_nr(lift), Value::Int16(0));
        vars.register(plc_to_eco::cancel_assignment(lift), Value::Int16(0));
        if let Some(alias) = plc_to_eco::cancel_assignment_alias(lift) {
            vars.register(alias, Value::Int16(0));
        }
        vars.register(
            plc_to_eco::short_alarm_description(lift),
            Value::Str(String::new()),
        );
        vars.register(plc_to_eco::alarm_solution(lift), Value::Str(String::new()));
        vars.register(
            plc_to_eco::station_state_description(lift),
            Value::Str("Initializing".to_string()),
        );
        vars.register(
            plc_to_eco::seq_step_comment(lift),
            Value::Str("Initializing".to_string()),
        );
        vars.register(
            plc_to_eco::elevator_row_location(lift),
            Value::Int16(config.lift(lift).initial_row as i16),
        );
        vars.register(plc_to_eco::tray_in_elevator(lift), Value::Bool(false));
        vars.register(plc_to_eco::current_fork_side(lift), Value::Int16(1));
        vars.register(plc_to_eco::error_code(lift), Value::Int16(0));
    }
}

/// Sample one lift's supervisor inputs.
///
/// Lift 1's cancel request honors both spellings; any nonzero value counts.
pub fn sample_inputs(
    vars: &VariableSpace,
    lift: LiftId,
) -> Result<LiftInputs, VarSpaceError> {
    let mut cancel_request = vars.read_i64(&eco_to_plc::cancel_assignment(lift))?;
    if let Some(alias) = eco_to_plc::cancel_assignment_alias(lift) {
        let aliased = vars.read_i64(&alias)?;
        if cancel_request == 0 {
            cancel_request = aliased;
        }
    }
    Ok(LiftInputs {
        task_type: vars.read_i64(&eco_to_plc::task_type(lift))?,
        origin: vars.read_i64(&eco_to_plc::origination(lift))?,
        destination: vars.read_i64(&eco_to_plc::destination(lift))?,
        acknowledge: vars.read_bool(&eco_to_plc::acknowledge_movement(lift))?,
        cancel_request,
        clear_error: vars.read_bool(&eco_to_plc::clear_error(lift))?,
    })
}

/// Adopt an external `xTrayInElevator` write into the model.
///
/// After every publication the cell value equals the model, so any
/// difference seen here is a supervisor override.
pub fn adopt_tray_override(
    vars: &VariableSpace,
    lift: &mut LiftState,
) -> Result<(), VarSpaceError> {
    let published = vars.read_bool(&plc_to_eco::tray_in_elevator(lift.id))?;
    if published != lift.tray_present {
        info!(lift = ?lift.id, tray = published, "tray override adopted from supervisor");
        lift.tray_present = published;
    }
    Ok(())
}

/// Mirror one lift's model into `PlcToEco`.
pub fn publish_lift(vars: &mut VariableSpace, lift: &LiftState) -> Result<(), VarSpaceError> {
    let id = lift.id;
    vars.write_i16(&plc_to_eco::cycle(id), lift.cycle)?;
    vars.write_i16(&plc_to_eco::station_status(id), lift.station_status as i16)?;
    vars.write_i16(&plc_to_eco::handshake_job_type(id), lift.handshake as i16)?;
    vars.write_i16(&plc_to_eco::handshake_row_nr(id), 0)?;
    vars.write_i16(&plc_to_eco::cancel_assignment(id), lift.cancel_published)?;
    if let Some(alias) = plc_to_eco::cancel_assignment_alias(id) {
        vars.write_i16(&alias, lift.cancel_published)?;
    }
    vars.write_str(&plc_to_eco::short_alarm_description(id), &lift.short_alarm)?;
    vars.write_str(&plc_to_eco::alarm_solution(id), &lift.alarm_solution)?;
    vars.write_str(
        &plc_to_eco::station_state_description(id),
        &lift.state_description,
    )?;
    vars.write_str(&plc_to_eco::seq_step_comment(id), &lift.seq_comment)?;
    vars.write_i16(&plc_to_eco::elevator_row_location(id), lift.row as i16)?;
    vars.write_bool(&plc_to_eco::tray_in_elevator(id), lift.tray_present)?;
    vars.write_i16(&plc_to_eco::current_fork_side(id), lift.fork_side as i16)?;
    vars.write_i16(&plc_to_eco::error_code(id), lift.error_code)?;
    Ok(())
}

/// Publish the aggregate cell status.
pub fn publish_main_status(
    vars: &mut VariableSpace,
    status: StationStatus,
) -> Result<(), VarSpaceError> {
    vars.write_i16(plc_to_eco::MAIN_STATUS, status as i16)?;
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> VariableSpace {
        let mut vars = VariableSpace::new();
        register_tree(&mut vars, &CellConfig::default());
        vars
    }

    #[test]
    fn tree_registers_both_roots() {
        let vars = registered();
        assert!(!vars.list_paths("EcoToPlc/").is_empty());
        assert!(!vars.list_paths("PlcToEco/").is_empty());
        // Lift 1 carries the alias cells, lift 2 does not.
        assert_eq!(vars.list_paths("EcoToPlc/Elevator1/iCancelAssign").len(), 2);
        assert_eq!(vars.list_paths("EcoToPlc/Elevator2/iCancelAssign").len(), 1);
    }

    #[test]
    fn cancel_request_honors_the_typo_alias_on_lift1() {
        let mut vars = registered();
        vars.write_i64("EcoToPlc/Elevator1/iCancelAssignent", 7).unwrap();
        let inputs = sample_inputs(&vars, LiftId::Lift1).unwrap();
        assert_eq!(inputs.cancel_request, 7);

        // Corrected spelling wins when both are set.
        vars.write_i64("EcoToPlc/Elevator1/iCancelAssignment", 3).unwrap();
        let inputs = sample_inputs(&vars, LiftId::Lift1).unwrap();
        assert_eq!(inputs.cancel_request, 3);
    }

    #[test]
    fn publish_mirrors_lift_fields() {
        let mut vars = registered();
        let config = CellConfig::default();
        let mut lift = LiftState::new(LiftId::Lift2, &config);
        lift.row = 42;
        lift.cycle = cycle::READY;
        lift.tray_present = true;
        publish_lift(&mut vars, &lift).unwrap();

        assert_eq!(vars.read_i16("PlcToEco/StationData/1/iCycle").unwrap(), 10);
        assert_eq!(
            vars.read_i16("PlcToEco/Elevator2/iElevatorRowLocation").unwrap(),
            42
        );
        assert!(vars.read_bool("PlcToEco/Elevator2/xTrayInElevator").unwrap());
    }

    #[test]
    fn cancel_code_published_under_both_spellings_on_lift1() {
        let mut vars = registered();
        let config = CellConfig::default();
        let mut lift = LiftState::new(LiftId::Lift1, &config);
        lift.cancel_published = 5;
        publish_lift(&mut vars, &lift).unwrap();

        assert_eq!(
            vars.read_i16("PlcToEco/StationData/0/iCancelAssignment").unwrap(),
            5
        );
        assert_eq!(
            vars.read_i16("PlcToEco/StationData/0/iCancelAssignent").unwrap(),
            5
        );
    }

    #[test]
    fn tray_override_is_adopted() {
        let mut vars = registered();
        let config = CellConfig::default();
        let mut lift = LiftState::new(LiftId::Lift1, &config);
        publish_lift(&mut vars, &lift).unwrap();

        vars.write_bool("PlcToEco/Elevator1/xTrayInElevator", true).unwrap();
        adopt_tray_override(&vars, &mut lift).unwrap();
        assert!(lift.tray_present);
    }
}
