//! # Arm Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
pub struct ArmExecParams {

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles to run before exiting, or 0 to run until interrupted.
    #[serde(default)]
    pub num_cycles: u64,

    /// Names of the joints on the simulated arm.
    pub sim_joint_names: Vec<String>,

    /// Position of each simulated joint at startup, index aligned with
    /// `sim_joint_names`.
    ///
    /// Units: radians
    pub sim_initial_pos_rad: Vec<f64>,

    /// If true a status record is archived every cycle.
    #[serde(default)]
    pub archive_cycles: bool,
}
