//! # Hardware Interface
//!
//! Controllers never talk to the actuators directly. The host provides a
//! [`PositionJointInterface`] from which a controller acquires one
//! [`JointHandle`] per joint during initialisation, and keeps those handles
//! for the rest of its life.

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A handle onto a single position-controlled joint.
pub trait JointHandle {
    /// Name of the joint this handle is bound to.
    fn name(&self) -> &str;

    /// The current measured position of the joint.
    ///
    /// Units: radians
    fn position(&self) -> f64;

    /// Demand a position for the joint.
    ///
    /// Units: radians
    fn set_command(&mut self, command_rad: f64);
}

/// A hardware interface exposing position-controlled joints by name.
pub trait PositionJointInterface {
    /// The handle type given out by this interface.
    type Handle: JointHandle;

    /// Get the handle of the joint with the given name.
    fn get_handle(&self, name: &str) -> Result<Self::Handle, HandleError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when acquiring a joint handle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandleError {
    #[error("No joint named \"{0}\" is exposed by the position joint interface")]
    UnknownJoint(String),
}
