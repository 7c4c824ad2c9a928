//! # Simulated Arm
//!
//! An ideal position-servo arm. Each joint reaches its last commanded
//! position on the next call to [`SimArm::step`]. Handles share the joint
//! state through reference-counted cells so the simulation and the
//! controller can both see it from the single control-loop thread.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use std::{cell::Cell, collections::HashMap, rc::Rc};

use crate::hw_if::{HandleError, JointHandle, PositionJointInterface};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A simulated arm made of position-controlled joints.
pub struct SimArm {
    /// Joints in the order they were given at construction
    joints: Vec<Rc<SimJoint>>,

    /// Lookup from joint name into `joints`
    index: HashMap<String, usize>,
}

/// Handle onto a joint of a [`SimArm`].
pub struct SimJointHandle {
    joint: Rc<SimJoint>,
}

struct SimJoint {
    name: String,

    /// Measured position of the joint.
    ///
    /// Units: radians
    pos_rad: Cell<f64>,

    /// Last demanded position, or `None` if nothing has been commanded yet.
    ///
    /// Units: radians
    cmd_rad: Cell<Option<f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimArm {
    /// Create a new arm from `(name, initial position)` pairs.
    ///
    /// If a name is repeated the later joint shadows the earlier one in
    /// lookups.
    pub fn new<S: Into<String>>(joints: impl IntoIterator<Item = (S, f64)>) -> Self {
        let joints: Vec<Rc<SimJoint>> = joints
            .into_iter()
            .map(|(name, pos_rad)| {
                Rc::new(SimJoint {
                    name: name.into(),
                    pos_rad: Cell::new(pos_rad),
                    cmd_rad: Cell::new(None),
                })
            })
            .collect();

        let index = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.name.clone(), i))
            .collect();

        debug!("SimArm created with {} joints", joints.len());

        Self { joints, index }
    }

    /// Advance the simulation by one cycle, moving each commanded joint to
    /// its demand.
    pub fn step(&self) {
        for joint in self.joints.iter() {
            if let Some(cmd_rad) = joint.cmd_rad.get() {
                joint.pos_rad.set(cmd_rad);
            }
        }
    }

    /// Number of joints in the arm.
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// Measured positions of all joints, in construction order.
    pub fn positions(&self) -> Vec<f64> {
        self.joints.iter().map(|j| j.pos_rad.get()).collect()
    }

    /// Measured position of the named joint.
    pub fn position(&self, name: &str) -> Option<f64> {
        self.joint(name).map(|j| j.pos_rad.get())
    }

    /// Last command sent to the named joint, `None` if the joint doesn't
    /// exist or hasn't been commanded.
    pub fn command(&self, name: &str) -> Option<f64> {
        self.joint(name).and_then(|j| j.cmd_rad.get())
    }

    /// Move the named joint directly, as if pushed by an external force.
    pub fn set_position(&self, name: &str, pos_rad: f64) -> Result<(), HandleError> {
        match self.joint(name) {
            Some(j) => {
                j.pos_rad.set(pos_rad);
                Ok(())
            }
            None => Err(HandleError::UnknownJoint(name.to_string())),
        }
    }

    fn joint(&self, name: &str) -> Option<&Rc<SimJoint>> {
        self.index.get(name).map(|&i| &self.joints[i])
    }
}

impl PositionJointInterface for SimArm {
    type Handle = SimJointHandle;

    fn get_handle(&self, name: &str) -> Result<Self::Handle, HandleError> {
        match self.joint(name) {
            Some(j) => Ok(SimJointHandle { joint: j.clone() }),
            None => Err(HandleError::UnknownJoint(name.to_string())),
        }
    }
}

impl JointHandle for SimJointHandle {
    fn name(&self) -> &str {
        &self.joint.name
    }

    fn position(&self) -> f64 {
        self.joint.pos_rad.get()
    }

    fn set_command(&mut self, command_rad: f64) {
        self.joint.cmd_rad.set(Some(command_rad));
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
