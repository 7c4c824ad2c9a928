//! Module interfaces
//!
//! Each real-time controller in `arm_exec` shall implement all the items in
//! this module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Duration, Utc};

// ---------------------------------------------------------------------------
// CONTROLLER
// ---------------------------------------------------------------------------

/// A controller driven by a fixed-rate control loop.
///
/// The driver calls `init` once, then `starting` on each (re)start of
/// motion, then `update` once per control tick. Ticks are strictly
/// sequential.
pub trait Controller {
    /// The hardware abstraction the controller binds its handles against.
    type Hardware;
    /// Data required during initialisation
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Initialise the controller.
    ///
    /// # Inputs
    /// - `hardware`: The hardware abstraction to acquire handles from.
    /// - `init_data`: The input data required by the controller.
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance, in which case the controller must
    ///   not be started.
    fn init(&mut self, hardware: &Self::Hardware, init_data: Self::InitData)
        -> Result<(), Self::InitError>;

    /// Called when the controller is (re)started by the host, before the
    /// first `update` of a new motion.
    fn starting(&mut self, time: &DateTime<Utc>);

    /// Main cyclic processing function.
    ///
    /// # Inputs
    /// - `time`: The current time.
    /// - `period`: The time elapsed since the previous tick.
    ///
    /// Must complete in bounded time and must not block.
    fn update(&mut self, time: &DateTime<Utc>, period: Duration);
}
