//! Cell supervisor: the process-wide tick loop.
//!
//! Scheduling is single-threaded cooperative over a fixed period. One call
//! to [`Cell::tick`] runs the whole cycle body: sample `EcoToPlc`, service
//! the watchdog, advance lift 1 then lift 2 (so the validator always sees a
//! coherent snapshot), recompute reach, publish to `PlcToEco`. Between
//! ticks nothing moves, so there are no locks and no races to reason about.

use std::time::Duration;
use tracing::warn;

use liftcell_common::paths::eco_to_plc;
use liftcell_common::state::{LiftId, StationStatus};

use crate::config::CellConfig;
use crate::lift::LiftState;
use crate::publish;
use crate::sequencer::{self, StepCtx};
use crate::validator::PeerView;
use crate::varspace::{VariableSpace, VarSpaceError};

/// The dual-lift cell: both sequencers, the variable tree, and the watchdog.
pub struct Cell {
    config: CellConfig,
    vars: VariableSpace,
    lifts: [LiftState; 2],
    /// Last instant the supervisor's watchdog toggle was seen. `None`
    /// until the first toggle, and again after an expiry.
    watchdog_alive_at: Option<Duration>,
}

impl Cell {
    pub fn new(config: CellConfig) -> Self {
        let mut vars = VariableSpace::new();
        publish::register_tree(&mut vars, &config);
        let lifts = [
            LiftState::new(LiftId::Lift1, &config),
            LiftState::new(LiftId::Lift2, &config),
        ];
        Self {
            config,
            vars,
            lifts,
            watchdog_alive_at: None,
        }
    }

    /// Advance the whole cell by one tick at monotonic time `now`.
    pub fn tick(&mut self, now: Duration) -> Result<(), VarSpaceError> {
        // ═══ SAMPLE PHASE ═══
        let inputs = [
            publish::sample_inputs(&self.vars, LiftId::Lift1)?,
            publish::sample_inputs(&self.vars, LiftId::Lift2)?,
        ];
        for lift in &mut self.lifts {
            publish::adopt_tray_override(&self.vars, lift)?;
        }
        self.service_watchdog(now)?;

        // ═══ PROCESS PHASE ═══
        let auto_enabled = self.watchdog_alive_at.is_some();
        let mut admission_free = true;
        for id in LiftId::BOTH {
            let peer = {
                let p = &self.lifts[id.peer().station_index()];
                PeerView {
                    reach: p.reach,
                    job_active: p.job_active(),
                    errored: p.errored(),
                }
            };
            let (first, second) = self.lifts.split_at_mut(1);
            let lift = match id {
                LiftId::Lift1 => &mut first[0],
                LiftId::Lift2 => &mut second[0],
            };
            let mut ctx = StepCtx {
                inputs: inputs[id.station_index()],
                peer,
                config: &self.config,
                now,
                auto_enabled,
                admission_free: &mut admission_free,
            };
            sequencer::step(lift, &mut ctx);
            lift.update_reach();
        }

        // ═══ PUBLISH PHASE ═══
        for lift in &self.lifts {
            publish::publish_lift(&mut self.vars, lift)?;
        }
        let status = self.main_status();
        publish::publish_main_status(&mut self.vars, status)?;
        Ok(())
    }

    /// Echo the supervisor's watchdog toggle and police its deadline.
    fn service_watchdog(&mut self, now: Duration) -> Result<(), VarSpaceError> {
        if self.vars.read_bool(eco_to_plc::WATCHDOG)? {
            self.vars.write_bool(eco_to_plc::WATCHDOG, false)?;
            self.watchdog_alive_at = Some(now);
            return Ok(());
        }
        if let Some(alive_at) = self.watchdog_alive_at {
            if now.saturating_sub(alive_at) > self.config.watchdog_window() {
                warn!("supervisor watchdog expired; all lifts to error");
                for lift in &mut self.lifts {
                    if !lift.errored() {
                        lift.enter_error(
                            "Watchdog expired",
                            "Restart the supervisor connection, then set xClearError per lift.",
                        );
                    }
                }
                // Liveness resumes only with the next supervisor toggle.
                self.watchdog_alive_at = None;
            }
        }
        Ok(())
    }

    /// Aggregate status: any error dominates, then warnings, then boot.
    fn main_status(&self) -> StationStatus {
        let statuses = self.lifts.iter().map(|l| l.station_status);
        for wanted in [
            StationStatus::Error,
            StationStatus::Warning,
            StationStatus::Booting,
            StationStatus::Notification,
        ] {
            if statuses.clone().any(|s| s == wanted) {
                return wanted;
            }
        }
        StationStatus::Ok
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn config(&self) -> &CellConfig {
        &self.config
    }

    pub fn vars(&self) -> &VariableSpace {
        &self.vars
    }

    /// Mutable variable access — how tests and the transport play supervisor.
    pub fn vars_mut(&mut self) -> &mut VariableSpace {
        &mut self.vars
    }

    pub fn lift(&self, id: LiftId) -> &LiftState {
        &self.lifts[id.station_index()]
    }

    /// Fault-injection access for timeout tests.
    pub fn lift_mut(&mut self, id: LiftId) -> &mut LiftState {
        &mut self.lifts[id.station_index()]
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
