//! # Arm library.
//!
//! This library allows other crates in the workspace to access items defined inside the arm
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Hardware interface - the traits through which controllers read and command joints
pub mod hw_if;

/// Joint position control module - blends the arm from its starting pose to a target pose
pub mod joint_pos_ctrl;

/// Simulated arm - an ideal position servo arm implementing the hardware interface
pub mod sim_arm;
