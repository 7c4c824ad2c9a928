//! Parameters structure for JointPosCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{DEFAULT_MOTION_DURATION_S, DEFAULT_START_TOLERANCE_RAD};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for joint position control.
///
/// The joint and target lists are left unsized here so that a file with the
/// wrong number of entries is reported by the controller's validation rather
/// than as a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- JOINTS ----
    /// Names of the controlled joints, in joint order.
    pub joint_names: Vec<String>,

    /// Target position of each joint, index aligned with `joint_names`.
    ///
    /// Units: radians
    pub target_pos_rad: Vec<f64>,

    // ---- MOTION ----
    /// Time taken to blend from the starting pose to the target pose.
    ///
    /// Units: seconds
    #[serde(default = "default_motion_duration_s")]
    pub motion_duration_s: f64,

    // ---- SAFETY ----
    /// Maximum allowed deviation of any joint from the reference start pose,
    /// no larger than `MAX_START_TOLERANCE_RAD`.
    ///
    /// Units: radians
    #[serde(default = "default_start_tolerance_rad")]
    pub start_tolerance_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Create parameters for the given joints and target using the default
    /// motion duration and start tolerance.
    pub fn new(joint_names: Vec<String>, target_pos_rad: Vec<f64>) -> Self {
        Self {
            joint_names,
            target_pos_rad,
            motion_duration_s: default_motion_duration_s(),
            start_tolerance_rad: default_start_tolerance_rad(),
        }
    }
}

fn default_motion_duration_s() -> f64 {
    DEFAULT_MOTION_DURATION_S
}

fn default_start_tolerance_rad() -> f64 {
    DEFAULT_START_TOLERANCE_RAD
}
