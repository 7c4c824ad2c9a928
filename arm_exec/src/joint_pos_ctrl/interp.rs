//! Interpolation between the starting and target poses

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::Duration;
use util::{
    maths::{clamp, lerp},
    time::duration_to_seconds,
};

use super::{JointPositions, NUM_JOINTS};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalised progress through the motion, in `[0, 1]`.
///
/// `motion_duration_s` must be positive and finite. An elapsed time too large
/// to be represented in seconds counts as a finished motion.
pub fn calc_alpha(elapsed: Duration, motion_duration_s: f64) -> f64 {
    match duration_to_seconds(elapsed) {
        Some(elapsed_s) => clamp(&(elapsed_s / motion_duration_s), &0.0, &1.0),
        None => 1.0,
    }
}

/// Commanded position of every joint for the given progress.
///
/// All joints share the same `alpha` so they arrive at the target together.
pub fn calc_cmd_pos_rad(
    start_pos_rad: &JointPositions,
    target_pos_rad: &JointPositions,
    alpha: f64,
) -> JointPositions {
    let mut cmd_pos_rad = [0.0; NUM_JOINTS];

    for i in 0..NUM_JOINTS {
        cmd_pos_rad[i] = lerp(start_pos_rad[i], target_pos_rad[i], alpha);
    }

    cmd_pos_rad
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
