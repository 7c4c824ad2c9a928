//! Implementations for the JointPosCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

// Internal
use super::{
    calc_alpha, calc_cmd_pos_rad,
    validate::{validate, Bindings},
    JointPosCtrlError, JointPositions, Params, NUM_JOINTS,
};
use crate::hw_if::{JointHandle, PositionJointInterface};
use util::{module::Controller, raise_error, time::duration_to_seconds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint position control module state
pub struct JointPosCtrl<I: PositionJointInterface> {
    /// Handles and validated target, `None` until `init` succeeds.
    bindings: Option<Bindings<I::Handle>>,

    motion: Motion,

    report: StatusReport,
}

/// Status report for JointPosCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Time since the motion started.
    ///
    /// Units: seconds
    pub elapsed_s: f64,

    /// Normalised progress through the motion, in `[0, 1]`.
    pub alpha: f64,

    /// True once the target has been reached and is being held.
    pub holding: bool,

    /// Position commanded to each joint on the last tick.
    ///
    /// Units: radians
    pub cmd_pos_rad: JointPositions,
}

/// Motion state machine
#[derive(Clone, Copy, Debug)]
enum Motion {
    /// No starting pose captured yet.
    Idle,

    /// Blending from `start_pos_rad` to the target, then holding.
    Running {
        start_pos_rad: JointPositions,
        elapsed: Duration,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<I: PositionJointInterface> Controller for JointPosCtrl<I> {
    type Hardware = I;
    type InitData = Params;
    type InitError = JointPosCtrlError;

    /// Initialise the JointPosCtrl module.
    ///
    /// Validates the parameters against the hardware and binds the joint
    /// handles. Any previous bindings are released first, so a failed
    /// re-initialisation leaves the controller unable to start.
    fn init(
        &mut self,
        hardware: &Self::Hardware,
        init_data: Self::InitData,
    ) -> Result<(), Self::InitError> {
        self.bindings = None;
        self.motion = Motion::Idle;
        self.report = StatusReport::default();

        let bindings = validate(hardware, &init_data)?;

        info!(
            "JointPosCtrl initialised: target {:?} rad over {} s",
            bindings.target_pos_rad, bindings.motion_duration_s
        );

        self.bindings = Some(bindings);

        Ok(())
    }

    /// Capture the starting pose and restart the motion clock.
    fn starting(&mut self, _time: &DateTime<Utc>) {
        let bindings = match self.bindings {
            Some(ref b) => b,
            None => raise_error!("JointPosCtrl started before successful initialisation"),
        };

        let mut start_pos_rad = [0.0; NUM_JOINTS];
        for (i, handle) in bindings.handles.iter().enumerate() {
            start_pos_rad[i] = handle.position();
        }

        self.motion = Motion::Running {
            start_pos_rad,
            elapsed: Duration::zero(),
        };
        self.report = StatusReport {
            elapsed_s: 0.0,
            alpha: 0.0,
            holding: false,
            cmd_pos_rad: start_pos_rad,
        };

        info!("JointPosCtrl starting");
        debug!("Starting pose: {:?} rad", start_pos_rad);
    }

    /// Perform cyclic processing of joint position control.
    fn update(&mut self, _time: &DateTime<Utc>, period: Duration) {
        let bindings = match self.bindings {
            Some(ref mut b) => b,
            None => raise_error!("JointPosCtrl updated before successful initialisation"),
        };

        let (start_pos_rad, elapsed) = match self.motion {
            Motion::Running {
                ref start_pos_rad,
                ref mut elapsed,
            } => (start_pos_rad, elapsed),
            Motion::Idle => raise_error!("JointPosCtrl updated before starting"),
        };

        // Accumulate the period given by the driver. Negative periods would
        // run the motion backwards so they're dropped.
        if period < Duration::zero() {
            warn!("JointPosCtrl ignoring negative period of {}", period);
        } else {
            *elapsed = elapsed.checked_add(&period).unwrap_or_else(Duration::max_value);
        }

        let alpha = calc_alpha(*elapsed, bindings.motion_duration_s);
        let cmd_pos_rad = calc_cmd_pos_rad(start_pos_rad, &bindings.target_pos_rad, alpha);

        for (handle, cmd_rad) in bindings.handles.iter_mut().zip(cmd_pos_rad.iter()) {
            handle.set_command(*cmd_rad);
        }

        let holding = alpha >= 1.0;
        if holding && !self.report.holding {
            info!("JointPosCtrl reached target, holding");
        }

        self.report = StatusReport {
            elapsed_s: duration_to_seconds(*elapsed).unwrap_or(std::f64::INFINITY),
            alpha,
            holding,
            cmd_pos_rad,
        };

        trace!("JointPosCtrl alpha = {:.4}", alpha);
    }
}

impl<I: PositionJointInterface> JointPosCtrl<I> {
    /// Create an uninitialised controller.
    pub fn new() -> Self {
        Self {
            bindings: None,
            motion: Motion::Idle,
            report: StatusReport::default(),
        }
    }

    /// Status of the last `starting` or `update` call.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// True if `init` has succeeded and the controller may be started.
    pub fn is_initialised(&self) -> bool {
        self.bindings.is_some()
    }

    /// True once a starting pose has been captured.
    pub fn is_running(&self) -> bool {
        matches!(self.motion, Motion::Running { .. })
    }

    /// The captured starting pose, if running.
    pub fn start_pos_rad(&self) -> Option<JointPositions> {
        match self.motion {
            Motion::Running { start_pos_rad, .. } => Some(start_pos_rad),
            Motion::Idle => None,
        }
    }

    /// The validated target pose, if initialised.
    pub fn target_pos_rad(&self) -> Option<JointPositions> {
        self.bindings.as_ref().map(|b| b.target_pos_rad)
    }
}

impl<I: PositionJointInterface> Default for JointPosCtrl<I> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::joint_pos_ctrl::{ConfigError, MAX_START_TOLERANCE_RAD, REFERENCE_START_POS_RAD};
    use crate::sim_arm::SimArm;

    const TARGET: [f64; NUM_JOINTS] = [0.5, -0.6, 0.1, -2.0, 0.2, 1.4, 0.9];
    const SCENARIO_START: [f64; NUM_JOINTS] = [0.0, -0.785, 0.0, -2.356, 0.0, 1.571, 0.785];
    const EPS: f64 = 1e-12;

    fn joint_names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("panda_joint{}", i)).collect()
    }

    fn sim_arm(pos_rad: &[f64]) -> SimArm {
        SimArm::new(joint_names(pos_rad.len()).into_iter().zip(pos_rad.iter().cloned()))
    }

    fn params() -> Params {
        Params::new(joint_names(NUM_JOINTS), TARGET.to_vec())
    }

    fn init_ctrl(arm: &SimArm) -> JointPosCtrl<SimArm> {
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        ctrl.init(arm, params()).unwrap();
        ctrl
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_scenario() {
        let arm = sim_arm(&SCENARIO_START);
        let mut ctrl = init_ctrl(&arm);

        ctrl.starting(&now());

        let expected_alpha = [0.2, 0.4, 0.6, 0.8, 1.0];
        let expected_j0 = [0.1, 0.2, 0.3, 0.4, 0.5];

        for tick in 0..5 {
            ctrl.update(&now(), Duration::seconds(1));
            arm.step();

            let report = ctrl.report();
            assert!((report.alpha - expected_alpha[tick]).abs() < EPS);
            assert!((report.cmd_pos_rad[0] - expected_j0[tick]).abs() < EPS);
            assert!((arm.command("panda_joint1").unwrap() - expected_j0[tick]).abs() < EPS);
        }

        assert!(ctrl.report().holding);
        assert_eq!(arm.positions(), TARGET.to_vec());
    }

    #[test]
    fn test_zero_elapsed_commands_start_pose() {
        let arm = sim_arm(&SCENARIO_START);
        let mut ctrl = init_ctrl(&arm);

        ctrl.starting(&now());
        ctrl.update(&now(), Duration::zero());

        assert_eq!(ctrl.report().alpha, 0.0);
        assert_eq!(ctrl.report().cmd_pos_rad, SCENARIO_START);
        for (i, name) in joint_names(NUM_JOINTS).iter().enumerate() {
            assert_eq!(arm.command(name), Some(SCENARIO_START[i]));
        }
    }

    #[test]
    fn test_hold_at_target() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl = init_ctrl(&arm);

        ctrl.starting(&now());

        // 1 kHz loop for 5 s then well beyond
        for _ in 0..5000 {
            ctrl.update(&now(), Duration::milliseconds(1));
            arm.step();
        }
        assert_eq!(ctrl.report().cmd_pos_rad, TARGET);

        for _ in 0..1000 {
            ctrl.update(&now(), Duration::milliseconds(1));
            arm.step();
            assert_eq!(ctrl.report().alpha, 1.0);
            assert!(ctrl.report().holding);
            assert_eq!(ctrl.report().cmd_pos_rad, TARGET);
        }
        assert_eq!(arm.positions(), TARGET.to_vec());
    }

    #[test]
    fn test_monotonic_blend() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl = init_ctrl(&arm);

        ctrl.starting(&now());

        let mut prev = ctrl.report();
        for _ in 0..600 {
            // Jittery periods, as a real loop would see
            ctrl.update(&now(), Duration::microseconds(9_000));
            ctrl.update(&now(), Duration::microseconds(11_000));
            let report = ctrl.report();

            assert!(report.alpha >= prev.alpha);
            for i in 0..NUM_JOINTS {
                if REFERENCE_START_POS_RAD[i] <= TARGET[i] {
                    assert!(report.cmd_pos_rad[i] >= prev.cmd_pos_rad[i] - EPS);
                    assert!(report.cmd_pos_rad[i] <= TARGET[i] + EPS);
                } else {
                    assert!(report.cmd_pos_rad[i] <= prev.cmd_pos_rad[i] + EPS);
                    assert!(report.cmd_pos_rad[i] >= TARGET[i] - EPS);
                }
            }
            prev = report;
        }
        assert_eq!(prev.cmd_pos_rad, TARGET);
    }

    #[test]
    fn test_negative_period_ignored() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl = init_ctrl(&arm);

        ctrl.starting(&now());
        ctrl.update(&now(), Duration::seconds(2));
        ctrl.update(&now(), Duration::seconds(-1));

        assert_eq!(ctrl.report().elapsed_s, 2.0);
        assert!((ctrl.report().alpha - 0.4).abs() < EPS);
    }

    #[test]
    fn test_restart_recaptures_start() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl = init_ctrl(&arm);
        assert!(!ctrl.is_running());
        assert_eq!(ctrl.start_pos_rad(), None);

        ctrl.starting(&now());
        assert!(ctrl.is_running());
        assert_eq!(ctrl.start_pos_rad(), Some(REFERENCE_START_POS_RAD));

        for _ in 0..3 {
            ctrl.update(&now(), Duration::seconds(1));
            arm.step();
        }
        assert!((ctrl.report().alpha - 0.6).abs() < EPS);

        // Restart part way through the motion
        let mid_pose = ctrl.report().cmd_pos_rad;
        ctrl.starting(&now());
        assert!(ctrl.is_running());
        assert_eq!(ctrl.start_pos_rad(), Some(mid_pose));
        assert_eq!(ctrl.report().elapsed_s, 0.0);

        ctrl.update(&now(), Duration::zero());
        assert_eq!(ctrl.report().cmd_pos_rad, mid_pose);

        // Something moves the arm before the next restart
        arm.set_position("panda_joint1", 0.45).unwrap();
        ctrl.starting(&now());
        assert_eq!(ctrl.start_pos_rad().unwrap()[0], 0.45);
        assert_eq!(ctrl.report().elapsed_s, 0.0);

        ctrl.update(&now(), Duration::seconds(1));
        assert!((ctrl.report().alpha - 0.2).abs() < EPS);
        assert!((ctrl.report().cmd_pos_rad[0] - (0.8 * 0.45 + 0.2 * 0.5)).abs() < EPS);
    }

    #[test]
    fn test_configurable_duration() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        let mut p = params();
        p.motion_duration_s = 2.0;
        ctrl.init(&arm, p).unwrap();

        ctrl.starting(&now());
        ctrl.update(&now(), Duration::seconds(1));
        assert_eq!(ctrl.report().alpha, 0.5);
        ctrl.update(&now(), Duration::seconds(1));
        assert_eq!(ctrl.report().cmd_pos_rad, TARGET);
    }

    #[test]
    fn test_joint_name_count() {
        for n in [6, 8].iter() {
            let arm = sim_arm(&[0.0; 8][..*n]);
            let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
            let mut p = params();
            p.joint_names = joint_names(*n);

            match ctrl.init(&arm, p) {
                Err(JointPosCtrlError::ConfigurationError(ConfigError::JointNameCount(c))) => {
                    assert_eq!(c, *n)
                }
                _ => panic!("Expected a joint name count error"),
            }
            assert!(!ctrl.is_initialised());
        }
    }

    #[test]
    fn test_target_count() {
        for n in [6, 8].iter() {
            let arm = sim_arm(&REFERENCE_START_POS_RAD);
            let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
            let mut p = params();
            p.target_pos_rad = vec![0.0; *n];

            match ctrl.init(&arm, p) {
                Err(JointPosCtrlError::ConfigurationError(ConfigError::TargetCount(c))) => {
                    assert_eq!(c, *n)
                }
                _ => panic!("Expected a target count error"),
            }
            assert!(!ctrl.is_initialised());
        }
    }

    #[test]
    fn test_invalid_motion_params() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);

        for duration_s in [0.0, -1.0, std::f64::NAN, std::f64::INFINITY].iter() {
            let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
            let mut p = params();
            p.motion_duration_s = *duration_s;
            match ctrl.init(&arm, p) {
                Err(JointPosCtrlError::ConfigurationError(
                    ConfigError::InvalidMotionDuration(_),
                )) => (),
                _ => panic!("Expected an invalid motion duration error"),
            }
        }

        for tol_rad in [-0.1, 0.11, 1e9, std::f64::NAN, std::f64::INFINITY].iter() {
            let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
            let mut p = params();
            p.start_tolerance_rad = *tol_rad;
            match ctrl.init(&arm, p) {
                Err(JointPosCtrlError::ConfigurationError(
                    ConfigError::InvalidStartTolerance(_),
                )) => (),
                _ => panic!("Expected an invalid start tolerance error"),
            }
        }

        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        let mut p = params();
        p.target_pos_rad[4] = std::f64::NAN;
        match ctrl.init(&arm, p) {
            Err(JointPosCtrlError::ConfigurationError(ConfigError::NonFiniteTarget(4))) => (),
            _ => panic!("Expected a non-finite target error"),
        }
    }

    #[test]
    fn test_start_pose_deviation() {
        // Joint 0 at 0.2 is too far from the reference
        let mut pos_rad = REFERENCE_START_POS_RAD;
        pos_rad[0] = 0.2;
        let arm = sim_arm(&pos_rad);
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();

        match ctrl.init(&arm, params()) {
            Err(JointPosCtrlError::HardwareStateError { index, name, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(name, "panda_joint1");
            }
            _ => panic!("Expected a hardware state error"),
        }
        assert!(!ctrl.is_initialised());
        assert_eq!(arm.command("panda_joint1"), None);

        // At 0.05 it's within tolerance
        arm.set_position("panda_joint1", 0.05).unwrap();
        ctrl.init(&arm, params()).unwrap();
        assert!(ctrl.is_initialised());
        assert_eq!(ctrl.target_pos_rad(), Some(TARGET));

        // The last joint is checked as well
        arm.set_position("panda_joint7", REFERENCE_START_POS_RAD[6] - 0.11).unwrap();
        match ctrl.init(&arm, params()) {
            Err(JointPosCtrlError::HardwareStateError { index, .. }) => assert_eq!(index, 6),
            _ => panic!("Expected a hardware state error"),
        }
        assert!(!ctrl.is_initialised());

        // A joint reading NaN is never accepted
        arm.set_position("panda_joint7", std::f64::NAN).unwrap();
        assert!(ctrl.init(&arm, params()).is_err());
    }

    #[test]
    fn test_start_pose_guard_not_widened() {
        // Every joint far from the reference pose
        let arm = sim_arm(&[1.0; NUM_JOINTS]);

        let mut p = params();
        p.start_tolerance_rad = MAX_START_TOLERANCE_RAD;
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        match ctrl.init(&arm, p) {
            Err(JointPosCtrlError::HardwareStateError { index, expected_rad, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(expected_rad, REFERENCE_START_POS_RAD[0]);
            }
            _ => panic!("Expected a hardware state error"),
        }

        let mut p = params();
        p.start_tolerance_rad = 1e9;
        assert!(ctrl.init(&arm, p).is_err());
        assert!(!ctrl.is_initialised());

        // A file naming some other start pose has no effect on the check
        let p: Params = util::params::from_str(
            r#"
            joint_names = [
                "panda_joint1", "panda_joint2", "panda_joint3", "panda_joint4",
                "panda_joint5", "panda_joint6", "panda_joint7",
            ]
            target_pos_rad = [0.5, -0.6, 0.1, -2.0, 0.2, 1.4, 0.9]
            reference_start_pos_rad = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
            "#,
        )
        .unwrap();
        match ctrl.init(&arm, p) {
            Err(JointPosCtrlError::HardwareStateError { .. }) => (),
            _ => panic!("Expected a hardware state error"),
        }
        assert_eq!(arm.command("panda_joint1"), None);
    }

    #[test]
    fn test_unknown_joint() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        let mut p = params();
        p.joint_names[3] = "elbow".to_string();

        match ctrl.init(&arm, p) {
            Err(JointPosCtrlError::HandleBindingError(e)) => {
                assert!(e.to_string().contains("elbow"))
            }
            _ => panic!("Expected a handle binding error"),
        }
        assert!(!ctrl.is_initialised());
    }

    #[test]
    #[should_panic]
    fn test_update_before_init() {
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        ctrl.update(&now(), Duration::milliseconds(1));
    }

    #[test]
    #[should_panic]
    fn test_starting_after_failed_init() {
        let arm = sim_arm(&[1.0; NUM_JOINTS]);
        let mut ctrl: JointPosCtrl<SimArm> = JointPosCtrl::new();
        assert!(ctrl.init(&arm, params()).is_err());
        ctrl.starting(&now());
    }

    #[test]
    #[should_panic]
    fn test_update_before_starting() {
        let arm = sim_arm(&REFERENCE_START_POS_RAD);
        let mut ctrl = init_ctrl(&arm);
        ctrl.update(&now(), Duration::milliseconds(1));
    }
}
