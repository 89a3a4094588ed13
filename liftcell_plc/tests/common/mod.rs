//! Shared harness: drives a [`Cell`] the way the supervisor would — through
//! the variable tree only, with a synthetic clock.
#![allow(dead_code)]

use std::time::Duration;

use liftcell_common::paths::{eco_to_plc, plc_to_eco};
use liftcell_common::prelude::*;
use liftcell_plc::cell::Cell;
use liftcell_plc::config::CellConfig;
use liftcell_plc::sequencer::cycle;

pub struct Harness {
    pub cell: Cell,
    pub now: Duration,
    /// Toggle the watchdog before every tick (a live supervisor).
    pub feed_watchdog: bool,
}

impl Harness {
    /// A cell booted to Ready on both lifts with a live watchdog.
    pub fn ready() -> Self {
        Self::ready_with(CellConfig::default())
    }

    pub fn ready_with(config: CellConfig) -> Self {
        let mut harness = Self {
            cell: Cell::new(config),
            now: Duration::ZERO,
            feed_watchdog: true,
        };
        let booted = harness.run_until(
            |c| {
                c.lift(LiftId::Lift1).cycle == cycle::READY
                    && c.lift(LiftId::Lift2).cycle == cycle::READY
            },
            20,
        );
        assert!(booted, "lifts failed to reach Ready");
        harness
    }

    /// One supervisor tick.
    pub fn tick(&mut self) {
        if self.feed_watchdog {
            self.cell
                .vars_mut()
                .write_bool(eco_to_plc::WATCHDOG, true)
                .unwrap();
        }
        self.now += self.cell.config().tick_period();
        self.cell.tick(self.now).unwrap();
    }

    /// Tick while acknowledging every advertised handshake on `lifts` with
    /// a proper false→true→false swing.
    pub fn tick_with_auto_ack(&mut self, lifts: &[LiftId]) {
        for &lift in lifts {
            let pending = self
                .cell
                .vars()
                .read_i16(&plc_to_eco::handshake_job_type(lift))
                .unwrap()
                != 0;
            let ack_path = eco_to_plc::acknowledge_movement(lift);
            let ack_high = self.cell.vars().read_bool(&ack_path).unwrap();
            if pending && !ack_high {
                self.cell.vars_mut().write_bool(&ack_path, true).unwrap();
            } else if !pending && ack_high {
                self.cell.vars_mut().write_bool(&ack_path, false).unwrap();
            }
        }
        self.tick();
    }

    /// Tick until `pred` holds, at most `max_ticks` times.
    pub fn run_until(&mut self, pred: impl Fn(&Cell) -> bool, max_ticks: usize) -> bool {
        for _ in 0..max_ticks {
            if pred(&self.cell) {
                return true;
            }
            self.tick();
        }
        pred(&self.cell)
    }

    // ─── Supervisor writes ──────────────────────────────────────────

    pub fn write_job(&mut self, lift: LiftId, task: i64, origin: i64, destination: i64) {
        let vars = self.cell.vars_mut();
        vars.write_i64(&eco_to_plc::task_type(lift), task).unwrap();
        vars.write_i64(&eco_to_plc::origination(lift), origin).unwrap();
        vars.write_i64(&eco_to_plc::destination(lift), destination)
            .unwrap();
    }

    /// Clear all job inputs, including the cancel request (both spellings).
    pub fn clear_job(&mut self, lift: LiftId) {
        self.write_job(lift, 0, 0, 0);
        let vars = self.cell.vars_mut();
        vars.write_i64(&eco_to_plc::cancel_assignment(lift), 0).unwrap();
        if let Some(alias) = eco_to_plc::cancel_assignment_alias(lift) {
            vars.write_i64(&alias, 0).unwrap();
        }
    }

    pub fn request_cancel(&mut self, lift: LiftId, value: i64) {
        self.cell
            .vars_mut()
            .write_i64(&eco_to_plc::cancel_assignment(lift), value)
            .unwrap();
    }

    /// Wait for `expected` to be advertised, then swing the acknowledge.
    pub fn acknowledge(&mut self, lift: LiftId, expected: HandshakeJob) {
        let advertised = self.run_until(
            |c| {
                c.vars()
                    .read_i16(&plc_to_eco::handshake_job_type(lift))
                    .unwrap()
                    == expected as i16
            },
            400,
        );
        assert!(advertised, "handshake {expected:?} never advertised");

        let ack_path = eco_to_plc::acknowledge_movement(lift);
        self.cell.vars_mut().write_bool(&ack_path, true).unwrap();
        let consumed = self.run_until(
            |c| {
                c.vars()
                    .read_i16(&plc_to_eco::handshake_job_type(lift))
                    .unwrap()
                    == 0
            },
            50,
        );
        assert!(consumed, "handshake {expected:?} never consumed");
        self.cell.vars_mut().write_bool(&ack_path, false).unwrap();
    }

    // ─── Published-state reads ──────────────────────────────────────

    pub fn cycle_of(&self, lift: LiftId) -> i16 {
        self.cell.vars().read_i16(&plc_to_eco::cycle(lift)).unwrap()
    }

    pub fn cancel_code_of(&self, lift: LiftId) -> i16 {
        self.cell
            .vars()
            .read_i16(&plc_to_eco::cancel_assignment(lift))
            .unwrap()
    }

    pub fn row_of(&self, lift: LiftId) -> i16 {
        self.cell
            .vars()
            .read_i16(&plc_to_eco::elevator_row_location(lift))
            .unwrap()
    }

    pub fn tray_of(&self, lift: LiftId) -> bool {
        self.cell
            .vars()
            .read_bool(&plc_to_eco::tray_in_elevator(lift))
            .unwrap()
    }

    pub fn fork_side_of(&self, lift: LiftId) -> i16 {
        self.cell
            .vars()
            .read_i16(&plc_to_eco::current_fork_side(lift))
            .unwrap()
    }

    pub fn error_code_of(&self, lift: LiftId) -> i16 {
        self.cell
            .vars()
            .read_i16(&plc_to_eco::error_code(lift))
            .unwrap()
    }
}
