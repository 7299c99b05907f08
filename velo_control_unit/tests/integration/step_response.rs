//! Closed-loop step response against the first-order motor model.
//!
//! Time is driven by `ManualClock`, so the controller's measured `dt` and
//! the plant's integration step are identical and results are exact.

use velo_control_unit::clock::{Clock, ManualClock};
use velo_control_unit::control::velocity::VelocityController;
use velo_control_unit::sim::{MotorModel, Plant};

/// Reference wheel: 0.5 rad/s per % drive, 100 ms time constant.
fn reference_motor() -> MotorModel {
    MotorModel::new(0.5, 0.1)
}

/// Advance `ticks` ms, run one control cycle and step the motor.
fn step(
    controller: &mut VelocityController<ManualClock>,
    motor: &mut MotorModel,
    clock: &ManualClock,
    ticks: u64,
) -> f64 {
    clock.advance(ticks);
    let effort = controller.run(motor.feedback());
    motor.apply(effort, ticks as f64 / clock.ticks_per_second() as f64);
    effort
}

#[test]
fn converges_to_setpoint_with_zero_steady_state_error() {
    let clock = ManualClock::millis();
    let mut controller =
        VelocityController::new(2.0, 5.0, 10.0, -100.0, 100.0, clock.clone()).unwrap();
    let mut motor = reference_motor();

    for _ in 0..1000 {
        step(&mut controller, &mut motor, &clock, 10);
    }

    let error = (motor.velocity() - 10.0).abs();
    assert!(error < 1e-3, "steady-state error {error}");
    // Integral term alone holds the motor: u = v / K = 20 %.
    assert!((controller.output() - 20.0).abs() < 1e-2);
}

#[test]
fn proportional_only_leaves_steady_state_error() {
    let clock = ManualClock::millis();
    let mut controller =
        VelocityController::new(2.0, 0.0, 10.0, -100.0, 100.0, clock.clone()).unwrap();
    let mut motor = reference_motor();

    for _ in 0..1000 {
        step(&mut controller, &mut motor, &clock, 10);
    }

    // v = K·kp·e, e = sp − v → v = sp·K·kp / (1 + K·kp) = 5
    assert!((motor.velocity() - 5.0).abs() < 1e-3);
}

#[test]
fn jittered_cycle_times_still_converge() {
    let clock = ManualClock::millis();
    let mut controller =
        VelocityController::new(2.0, 5.0, -6.0, -100.0, 100.0, clock.clone()).unwrap();
    let mut motor = reference_motor();

    for i in 0..1000 {
        let ticks = if i % 2 == 0 { 5 } else { 15 };
        step(&mut controller, &mut motor, &clock, ticks);
    }

    assert!((motor.velocity() + 6.0).abs() < 1e-3);
}

#[test]
fn unreachable_setpoint_does_not_wind_up() {
    let clock = ManualClock::millis();
    // Stiff gains: the P term alone saturates while the error exceeds 10.
    let mut controller =
        VelocityController::new(10.0, 50.0, 80.0, -100.0, 100.0, clock.clone()).unwrap();
    let mut motor = reference_motor();

    // Full drive only reaches 50 rad/s: saturated for the whole phase.
    for _ in 0..300 {
        let effort = step(&mut controller, &mut motor, &clock, 10);
        assert_eq!(effort, 100.0);
    }
    assert!(controller.integrator().abs() < 1e-9);
    assert!((motor.velocity() - 50.0).abs() < 1e-3);

    // Reachable setpoint: leaves saturation immediately and settles.
    controller.set_setpoint(20.0).unwrap();
    let first = step(&mut controller, &mut motor, &clock, 10);
    assert!(first < 0.0, "expected braking effort, got {first}");
    for _ in 0..1000 {
        step(&mut controller, &mut motor, &clock, 10);
    }
    assert!((motor.velocity() - 20.0).abs() < 1e-3);
}

#[test]
fn retuning_mid_run_keeps_tracking() {
    let clock = ManualClock::millis();
    let mut controller =
        VelocityController::new(1.0, 1.0, 8.0, -100.0, 100.0, clock.clone()).unwrap();
    let mut motor = reference_motor();

    for _ in 0..200 {
        step(&mut controller, &mut motor, &clock, 10);
    }
    controller.set_gains(2.0, 5.0).unwrap();
    for _ in 0..1000 {
        step(&mut controller, &mut motor, &clock, 10);
    }
    assert!((motor.velocity() - 8.0).abs() < 1e-3);
}

#[test]
fn reset_after_pause_avoids_spurious_kick() {
    let clock = ManualClock::millis();
    let mut controller =
        VelocityController::new(2.0, 5.0, 10.0, -100.0, 100.0, clock.clone()).unwrap();
    let mut motor = reference_motor();
    for _ in 0..1000 {
        step(&mut controller, &mut motor, &clock, 10);
    }

    // Loop paused for 60 s while the motor coasted to a stop.
    clock.advance(60_000);
    motor = reference_motor();
    controller.reset();

    let effort = step(&mut controller, &mut motor, &clock, 10);
    // Fresh start: 2·10 + 5·(10·0.01) = 20.5, not a saturated kick.
    assert!((effort - 20.5).abs() < 1e-9);
}
