//! Configuration validation for JointPosCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::error;
use std::convert::TryInto;

use super::{
    ConfigError, JointPosCtrlError, JointPositions, Params, MAX_START_TOLERANCE_RAD, NUM_JOINTS,
    REFERENCE_START_POS_RAD,
};
use crate::hw_if::{JointHandle, PositionJointInterface};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything the interpolator needs, only obtainable through [`validate`].
pub(crate) struct Bindings<H> {
    /// One handle per joint, in joint order.
    pub(crate) handles: [H; NUM_JOINTS],

    pub(crate) target_pos_rad: JointPositions,

    pub(crate) motion_duration_s: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check the parameters and the current state of the arm, and bind the joint
/// handles.
///
/// Checks are performed in the order:
///     1. Motion duration and start tolerance are usable, the tolerance being
///        no larger than `MAX_START_TOLERANCE_RAD`
///     2. Exactly `NUM_JOINTS` joint names
///     3. Every joint name resolves to a handle
///     4. Every joint is within the tolerance of `REFERENCE_START_POS_RAD`
///     5. Exactly `NUM_JOINTS` finite target positions
///
/// Nothing is commanded. On error all acquired handles are dropped.
pub(crate) fn validate<I>(
    hardware: &I,
    params: &Params,
) -> Result<Bindings<I::Handle>, JointPosCtrlError>
where
    I: PositionJointInterface,
{
    validate_motion_params(params).map_err(log_err)?;

    // ---- JOINT HANDLES ----

    if params.joint_names.len() != NUM_JOINTS {
        return Err(log_err(
            ConfigError::JointNameCount(params.joint_names.len()).into(),
        ));
    }

    let mut handles = Vec::with_capacity(NUM_JOINTS);
    for name in params.joint_names.iter() {
        handles.push(hardware.get_handle(name).map_err(|e| log_err(e.into()))?);
    }

    let handles: [I::Handle; NUM_JOINTS] = match handles.try_into() {
        Ok(h) => h,
        Err(h) => {
            return Err(log_err(
                ConfigError::JointNameCount(h.len()).into(),
            ))
        }
    };

    // ---- START POSE ----

    for (i, handle) in handles.iter().enumerate() {
        let measured_rad = handle.position();
        let expected_rad = REFERENCE_START_POS_RAD[i];

        // Written so that a NaN measurement is rejected too
        if !((measured_rad - expected_rad).abs() <= params.start_tolerance_rad) {
            return Err(log_err(JointPosCtrlError::HardwareStateError {
                index: i,
                name: handle.name().to_string(),
                measured_rad,
                expected_rad,
                tolerance_rad: params.start_tolerance_rad,
            }));
        }
    }

    // ---- TARGET ----

    if params.target_pos_rad.len() != NUM_JOINTS {
        return Err(log_err(
            ConfigError::TargetCount(params.target_pos_rad.len()).into(),
        ));
    }

    let mut target_pos_rad = [0.0; NUM_JOINTS];
    for (i, pos_rad) in params.target_pos_rad.iter().enumerate() {
        if !pos_rad.is_finite() {
            return Err(log_err(ConfigError::NonFiniteTarget(i).into()));
        }
        target_pos_rad[i] = *pos_rad;
    }

    Ok(Bindings {
        handles,
        target_pos_rad,
        motion_duration_s: params.motion_duration_s,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn validate_motion_params(params: &Params) -> Result<(), JointPosCtrlError> {
    if !(params.motion_duration_s.is_finite() && params.motion_duration_s > 0.0) {
        return Err(ConfigError::InvalidMotionDuration(params.motion_duration_s).into());
    }

    let tol_rad = params.start_tolerance_rad;
    if !(tol_rad >= 0.0 && tol_rad <= MAX_START_TOLERANCE_RAD) {
        return Err(ConfigError::InvalidStartTolerance(params.start_tolerance_rad).into());
    }

    Ok(())
}

fn log_err(e: JointPosCtrlError) -> JointPosCtrlError {
    error!("JointPosCtrl: {}", e);
    e
}
