//! Joint position control module
//!
//! Moves the arm from the pose it is in when motion starts to a fixed target
//! pose, blending every joint linearly over the same time window and then
//! holding the target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod interp;
mod params;
mod state;
mod validate;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// Internal
use crate::hw_if::HandleError;
pub use interp::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of joints on the arm.
pub const NUM_JOINTS: usize = 7;

/// The pose the arm must be in, within the start tolerance, before the
/// controller will initialise.
///
/// Units: radians
pub const REFERENCE_START_POS_RAD: JointPositions =
    [0.0, -FRAC_PI_4, 0.0, -3.0 * FRAC_PI_4, 0.0, FRAC_PI_2, FRAC_PI_4];

/// Default duration of the blend from the starting pose to the target.
///
/// Units: seconds
pub const DEFAULT_MOTION_DURATION_S: f64 = 5.0;

/// Default maximum deviation of any joint from the reference start pose.
///
/// Units: radians
pub const DEFAULT_START_TOLERANCE_RAD: f64 = 0.1;

/// Largest start tolerance a parameter file may ask for.
///
/// Units: radians
pub const MAX_START_TOLERANCE_RAD: f64 = DEFAULT_START_TOLERANCE_RAD;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// One position per joint, in joint order.
///
/// Units: radians
pub type JointPositions = [f64; NUM_JOINTS];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during JointPosCtrl initialisation.
///
/// Once the controller is running there is no error path, everything the
/// interpolator relies on is checked here.
#[derive(Debug, thiserror::Error)]
pub enum JointPosCtrlError {
    #[error("Invalid joint position controller configuration: {0}")]
    ConfigurationError(#[from] ConfigError),

    #[error(
        "Robot is not in the expected starting position: joint {index} ({name}) is at \
         {measured_rad:.4} rad, expected {expected_rad:.4} ± {tolerance_rad} rad. Move the arm \
         to the start pose first."
    )]
    HardwareStateError {
        index: usize,
        name: String,
        measured_rad: f64,
        expected_rad: f64,
        tolerance_rad: f64,
    },

    #[error("Could not bind joint handle: {0}")]
    HandleBindingError(#[from] HandleError),
}

/// The configuration check which failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("wrong number of joint names, got {0} instead of 7")]
    JointNameCount(usize),

    #[error("wrong number of target positions, got {0} instead of 7")]
    TargetCount(usize),

    #[error("target position of joint {0} is not finite")]
    NonFiniteTarget(usize),

    #[error("motion duration must be positive and finite, got {0} s")]
    InvalidMotionDuration(f64),

    #[error("start tolerance must be between 0 and 0.1 rad, got {0} rad")]
    InvalidStartTolerance(f64),
}
