//! Cycle runner in real time with the monotonic clock.

use velo_common::control::ClockResolution;
use velo_common::prelude::DEFAULT_CYCLE_TIME;
use velo_control_unit::clock::MonotonicClock;
use velo_control_unit::config::CycleConfig;
use velo_control_unit::control::velocity::VelocityController;
use velo_control_unit::cycle::CycleRunner;
use velo_control_unit::sim::MotorModel;

#[test]
fn real_time_loop_tracks_setpoint() {
    let clock = MonotonicClock::new(ClockResolution::Micros);
    let controller = VelocityController::new(20.0, 500.0, 10.0, -100.0, 100.0, clock).unwrap();
    let cycle = CycleConfig {
        cycle_time_us: 1_000,
        max_cycles: 300,
    };
    let mut runner = CycleRunner::new(controller, MotorModel::new(0.5, 0.1), &cycle);

    let stats = runner.run().unwrap().clone();
    assert_eq!(stats.cycle_count, 300);
    assert!(stats.min_cycle_ns <= stats.max_cycle_ns);

    let velocity = runner.plant().velocity();
    assert!((velocity - 10.0).abs() < 0.5, "velocity {velocity}");
    let (lo, hi) = runner.controller().effort_limits();
    assert!((lo..=hi).contains(&runner.controller().output()));
}

#[test]
fn runner_can_be_retuned_between_runs() {
    let clock = MonotonicClock::millis();
    let controller = VelocityController::with_defaults(clock);
    let cycle = CycleConfig {
        cycle_time_us: DEFAULT_CYCLE_TIME.as_micros() as u32 / 10,
        max_cycles: 5,
    };
    let mut runner = CycleRunner::new(controller, MotorModel::new(0.5, 0.1), &cycle);

    // Zero gains: no effort, motor stays at rest.
    runner.run().unwrap();
    assert_eq!(runner.controller().output(), 0.0);
    assert_eq!(runner.plant().velocity(), 0.0);

    runner.controller_mut().set_gains(1.0, 0.0).unwrap();
    runner.controller_mut().set_setpoint(4.0).unwrap();
    runner.run().unwrap();
    assert!(runner.controller().output() > 0.0);
    assert!(runner.plant().velocity() > 0.0);
}
