//! # Arm Control Executable
//!
//! Drives the joint position controller against a simulated arm at a fixed
//! cycle rate.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the simulated arm and JointPosCtrl
//!     - Start JointPosCtrl, capturing the arm's current pose
//!     - Main loop:
//!         - JointPosCtrl update with the nominal cycle period
//!         - Simulated arm step
//!         - Archiving
//!         - Cycle management

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the arm executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use chrono::Utc;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use arm_lib::{
    joint_pos_ctrl::{self, JointPosCtrl, StatusReport},
    sim_arm::SimArm,
};
use params::ArmExecParams;
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::Controller,
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Joint position control of the simulated arm")]
struct Opt {
    /// Number of cycles to run, overriding the parameter file. 0 runs until
    /// interrupted.
    #[structopt(long)]
    cycles: Option<u64>,

    /// Minimum level of log messages, must be `info` or more verbose.
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// One archived cycle. Flattened as csv can't write arrays under a header.
#[derive(Serialize)]
struct CycleRecord {
    time_s: f64,
    elapsed_s: f64,
    alpha: f64,
    holding: bool,
    cmd_0_rad: f64,
    cmd_1_rad: f64,
    cmd_2_rad: f64,
    cmd_3_rad: f64,
    cmd_4_rad: f64,
    cmd_5_rad: f64,
    cmd_6_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "arm_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let exec_params: ArmExecParams = util::params::load("arm_exec.toml")
        .wrap_err("Could not load exec params")?;
    let ctrl_params: joint_pos_ctrl::Params = util::params::load("joint_pos_ctrl.toml")
        .wrap_err("Could not load JointPosCtrl params")?;

    let (cycle_period, ctrl_period) = cycle_periods(exec_params.cycle_period_s)?;
    let num_cycles = opt.cycles.unwrap_or(exec_params.num_cycles);

    info!("Parameters loaded");

    // ---- SIMULATED ARM ----

    if exec_params.sim_joint_names.len() != exec_params.sim_initial_pos_rad.len() {
        return Err(eyre!(
            "Simulated arm has {} joint names but {} initial positions",
            exec_params.sim_joint_names.len(),
            exec_params.sim_initial_pos_rad.len()
        ));
    }

    let arm = SimArm::new(
        exec_params.sim_joint_names.iter()
            .cloned()
            .zip(exec_params.sim_initial_pos_rad.iter().cloned())
    );

    info!("Simulated arm initialised with {} joints", arm.num_joints());

    // ---- MODULE INITIALISATION ----

    let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
    ctrl.init(&arm, ctrl_params)
        .wrap_err("Failed to initialise JointPosCtrl")?;
    info!("JointPosCtrl init complete");

    let mut archiver = if exec_params.archive_cycles {
        Some(
            Archiver::from_path(&session, "joint_pos_ctrl.csv")
                .wrap_err("Failed to create the JointPosCtrl archive")?
        )
    } else {
        None
    };

    // Number of cycles between progress messages, roughly 1 Hz
    let cycles_per_status = ((1.0 / exec_params.cycle_period_s).round() as u64).max(1);

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    ctrl.starting(&Utc::now());

    let mut num_cycles_done: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROL ----

        ctrl.update(&Utc::now(), ctrl_period);
        arm.step();

        let report = ctrl.report();

        // ---- ARCHIVE ----

        if let Some(ref mut a) = archiver {
            if let Err(e) = a.serialise(CycleRecord::new(session::get_elapsed_seconds(), &report)) {
                warn!("Could not archive JointPosCtrl status: {}", e);
            }
        }

        if num_cycles_done % cycles_per_status == 0 {
            info!(
                "Cycle {}: alpha = {:.3}, elapsed = {:.3} s",
                num_cycles_done, report.alpha, report.elapsed_s
            );
        }

        // ---- CYCLE MANAGEMENT ----

        num_cycles_done += 1;
        if num_cycles != 0 && num_cycles_done >= num_cycles {
            break;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    info!("Final joint positions: {:?} rad", arm.positions());
    info!("End of execution after {} cycles", num_cycles_done);

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the loop's sleep period and the period passed to the controller each
/// cycle from the configured cycle period.
///
/// The controller always gets the nominal period, overruns are only warned
/// about.
fn cycle_periods(cycle_period_s: f64) -> Result<(Duration, chrono::Duration)> {
    if !(cycle_period_s.is_finite() && cycle_period_s > 0.0) {
        return Err(eyre!("Cycle period must be positive, found {} s", cycle_period_s));
    }

    let cycle_period = Duration::from_secs_f64(cycle_period_s);
    let ctrl_period = chrono::Duration::from_std(cycle_period)
        .wrap_err("Cycle period is too long")?;

    Ok((cycle_period, ctrl_period))
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CycleRecord {
    fn new(time_s: f64, report: &StatusReport) -> Self {
        let cmd = &report.cmd_pos_rad;

        Self {
            time_s,
            elapsed_s: report.elapsed_s,
            alpha: report.alpha,
            holding: report.holding,
            cmd_0_rad: cmd[0],
            cmd_1_rad: cmd[1],
            cmd_2_rad: cmd[2],
            cmd_3_rad: cmd[3],
            cmd_4_rad: cmd[4],
            cmd_5_rad: cmd[5],
            cmd_6_rad: cmd[6],
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
