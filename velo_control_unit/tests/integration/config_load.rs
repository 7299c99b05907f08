//! Configuration loading: shipped file, overrides of defaults, rejections.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use velo_common::config::{ConfigError, LogLevel};
use velo_common::control::ClockResolution;
use velo_control_unit::clock::{Clock, ManualClock};
use velo_control_unit::config::load_config;
use velo_control_unit::control::velocity::VelocityController;

fn shipped_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/velocity.toml")
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn shipped_config_is_valid() {
    let config = load_config(&shipped_config()).unwrap();
    assert_eq!(config.shared.service_name, "velo-left-wheel");
    assert_eq!(config.shared.log_level, LogLevel::Info);
    assert_eq!(config.controller.setpoint, 10.0);
    assert_eq!(config.controller.clock_resolution, ClockResolution::Millis);
    assert_eq!(config.cycle.cycle_time_us, 10_000);
    assert!(config.motor.time_constant > 0.0);
}

#[test]
fn loaded_parameters_build_controller() {
    let file = write_config(
        r#"
[shared]
service_name = "velo-right-wheel"
log_level = "debug"

[controller]
kp = 2.0
ki = 0.5
setpoint = 10.0
effort_min = -80.0
effort_max = 80.0
clock_resolution = "micros"
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);

    let clock = ManualClock::new(config.controller.clock_resolution);
    let mut controller = VelocityController::from_params(&config.controller, clock.clone()).unwrap();
    assert_eq!(controller.effort_limits(), (-80.0, 80.0));

    clock.advance(100_000);
    assert_eq!(clock.ticks_per_second(), 1_000_000);
    assert!((controller.run(0.0) - 20.5).abs() < 1e-12);
}

#[test]
fn missing_file_reported() {
    let result = load_config(Path::new("/nonexistent/velocity.toml"));
    assert_eq!(result.unwrap_err(), ConfigError::FileNotFound);
}

#[test]
fn inverted_limits_fail_validation() {
    let file = write_config(
        r#"
[shared]
service_name = "velo-test"

[controller]
effort_min = 50.0
effort_max = -50.0
"#,
    );
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn nan_gain_fails_validation() {
    let file = write_config(
        r#"
[shared]
service_name = "velo-test"

[controller]
kp = nan
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("controller.kp"), "{err}");
}

#[test]
fn empty_service_name_fails_validation() {
    let file = write_config("[shared]\nservice_name = \"\"\n");
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}
