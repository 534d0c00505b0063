use rstest::rstest;
use seeker_config::{BoundsCfg, IlluminatorMode, SimCfg, TelemetryRow};
use seeker_sim::{
    LedState, RecordingWheels, ReplayVision, SimError, SimPlant, TankDrive, WheelOutput,
};
use seeker_traits::{Axis, DriveActuator, Telemetry, VisionSource};

fn quiet_cfg() -> SimCfg {
    SimCfg {
        noise: 0.0,
        dropout: 0.0,
        sensor_fault: 0.0,
        ..SimCfg::default()
    }
}

#[test]
fn replay_returns_frames_then_no_target() {
    let rows = vec![
        TelemetryRow {
            rotational: 1.0,
            lateral: 2.0,
            depth: 0.5,
            has_target: true,
        },
        TelemetryRow {
            rotational: -1.0,
            lateral: 0.0,
            depth: 0.6,
            has_target: false,
        },
    ];
    let mut v = ReplayVision::from_rows(rows, IlluminatorMode::Default);
    assert_eq!(v.remaining(), 2);
    assert_eq!(v.read().unwrap(), Telemetry::new(1.0, 2.0, 0.5, true));
    assert_eq!(v.read().unwrap(), Telemetry::new(-1.0, 0.0, 0.6, false));
    assert!(v.is_exhausted());
    for _ in 0..3 {
        assert_eq!(v.read().unwrap(), Telemetry::no_target());
    }
}

#[rstest]
#[case(IlluminatorMode::Default, LedState::Pipeline)]
#[case(IlluminatorMode::Blink, LedState::Blink)]
#[case(IlluminatorMode::On, LedState::On)]
#[case(IlluminatorMode::Off, LedState::Off)]
fn illuminator_follows_configured_mode(#[case] mode: IlluminatorMode, #[case] lit: LedState) {
    let mut v = ReplayVision::new(Vec::new(), mode);
    v.set_illuminator(true).unwrap();
    assert_eq!(v.illuminator().state(), lit);
    v.set_illuminator(false).unwrap();
    assert_eq!(v.illuminator().state(), LedState::Off);
    assert_eq!(v.illuminator().switches(), 2);
}

#[test]
fn plant_reports_true_offsets_without_noise() {
    let plant = SimPlant::new(&quiet_cfg(), &BoundsCfg::default(), IlluminatorMode::On);
    let mut vision = plant.vision();
    let t = vision.read().unwrap();
    assert_eq!(t, Telemetry::new(12.0, 4.0, 0.35, true));
    assert_eq!(plant.reads(), 1);
}

#[rstest]
#[case(Axis::Rotational, 0.5, [11.0, 4.0, 0.35])]
#[case(Axis::Lateral, 1.0, [12.0, 3.0, 0.35])]
#[case(Axis::Depth, 1.0, [12.0, 4.0, 0.4])]
fn plant_moves_with_corrections(#[case] axis: Axis, #[case] gain: f64, #[case] want: [f64; 3]) {
    let plant = SimPlant::new(&quiet_cfg(), &BoundsCfg::default(), IlluminatorMode::On);
    let mut drive = plant.drive();
    drive.apply_correction(axis, gain).unwrap();
    let got = plant.offsets();
    for i in 0..3 {
        assert!((got[i] - want[i]).abs() < 1e-12, "{axis}: {got:?}");
    }
    assert_eq!(plant.corrections(), 1);
}

#[test]
fn plant_sensor_faults_are_typed() {
    let cfg = SimCfg {
        sensor_fault: 1.0,
        ..quiet_cfg()
    };
    let plant = SimPlant::new(&cfg, &BoundsCfg::default(), IlluminatorMode::On);
    let err = plant.vision().read().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SimError>(),
        Some(SimError::SensorFault(_))
    ));
}

#[test]
fn plant_dropouts_report_no_target() {
    let cfg = SimCfg {
        dropout: 1.0,
        ..quiet_cfg()
    };
    let plant = SimPlant::new(&cfg, &BoundsCfg::default(), IlluminatorMode::On);
    assert!(!plant.vision().read().unwrap().has_target);
}

#[test]
fn noisy_plant_is_reproducible_per_seed() {
    let cfg = SimCfg {
        noise: 0.05,
        ..SimCfg::default()
    };
    let a = SimPlant::new(&cfg, &BoundsCfg::default(), IlluminatorMode::On);
    let b = SimPlant::new(&cfg, &BoundsCfg::default(), IlluminatorMode::On);
    let (mut va, mut vb) = (a.vision(), b.vision());
    for _ in 0..50 {
        assert_eq!(va.read().unwrap(), vb.read().unwrap());
    }
}

#[test]
fn tank_drive_maps_and_clamps() {
    let mut drive = TankDrive::new(RecordingWheels::default()).with_max_output(0.5);
    drive.apply_correction(Axis::Rotational, 0.25).unwrap();
    drive.apply_correction(Axis::Depth, 0.8).unwrap();
    drive.apply_correction(Axis::Lateral, -0.1).unwrap();
    assert_eq!(
        drive.wheels().history,
        vec![[-0.25, 0.25], [-0.5, -0.5], [-0.1, -0.1]]
    );
}

#[test]
fn tank_drive_rejects_non_finite_gain() {
    let mut drive = TankDrive::new(RecordingWheels::default());
    let err = drive.apply_correction(Axis::Depth, f64::NAN).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SimError>(),
        Some(SimError::DriveFault(_))
    ));
    assert!(drive.into_inner().history.is_empty());
}

struct Unplugged;

impl WheelOutput for Unplugged {
    fn set_wheels(&mut self, _left: f64, _right: f64) -> seeker_sim::error::Result<()> {
        Err(SimError::DriveFault("can bus down".into()))
    }
}

#[test]
fn wheel_errors_surface_through_the_drive() {
    let mut drive = TankDrive::new(Unplugged);
    let err = drive.apply_correction(Axis::Rotational, 0.1).unwrap_err();
    assert!(err.to_string().contains("can bus down"));
}
