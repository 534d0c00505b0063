mod common;

use common::{RecordingDrive, ScriptedVision, centered};
use seeker_core::error::BuildError;
use seeker_core::{Bounds, DynController, TargetingCfg, TunableDefaults};
use rstest::rstest;

#[rstest]
fn missing_vision_yields_typed_build_error() {
    let err = DynController::builder()
        .with_drive(RecordingDrive::default())
        .try_build()
        .expect_err("should fail with MissingVision");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingVision) => {}
        other => panic!("expected MissingVision, got: {other:?}"),
    }
}

#[rstest]
fn missing_drive_yields_typed_build_error() {
    let err = DynController::builder()
        .with_vision(ScriptedVision::constant(centered()))
        .try_build()
        .expect_err("should fail with MissingDrive");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingDrive)
    ));
}

#[rstest]
#[case(0, Bounds::default())]
#[case(10_001, Bounds::default())]
#[case(20, Bounds { rotational: 0.0, ..Bounds::default() })]
#[case(20, Bounds { depth: f64::NAN, ..Bounds::default() })]
fn invalid_targeting_is_rejected(#[case] window_frames: usize, #[case] bounds: Bounds) {
    let err = DynController::builder()
        .with_vision(ScriptedVision::constant(centered()))
        .with_drive(RecordingDrive::default())
        .with_targeting(TargetingCfg {
            window_frames,
            bounds,
        })
        .build()
        .expect_err("invalid targeting");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
#[case(TunableDefaults { kchange: 0.0, ..TunableDefaults::default() })]
#[case(TunableDefaults { error_tolerance: -0.1, ..TunableDefaults::default() })]
#[case(TunableDefaults { max_depth_speed: f64::INFINITY, ..TunableDefaults::default() })]
#[case(TunableDefaults { kp: f64::NAN, ..TunableDefaults::default() })]
fn invalid_tunable_defaults_are_rejected(#[case] defaults: TunableDefaults) {
    let err = DynController::builder()
        .with_vision(ScriptedVision::constant(centered()))
        .with_drive(RecordingDrive::default())
        .with_tunable_defaults(defaults)
        .build()
        .expect_err("invalid defaults");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn boxed_controller_runs_a_session() {
    let mut c = DynController::builder()
        .with_vision(ScriptedVision::constant(centered()))
        .with_drive(RecordingDrive::default())
        .with_preference_group("turret")
        .build()
        .expect("valid");
    c.start();
    let report = c.tick().expect("tick");
    assert_eq!(report.frame, 1);
    assert!(report.has_target);
}
