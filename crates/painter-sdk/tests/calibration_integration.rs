//! 标定集成测试
//!
//! 在回环 TCP 模拟控制器上运行完整的传感器探测标定，
//! 并检查标定结果的持久化与坐标变换。

mod fake_controller;

use fake_controller::FakeController;
use painter_sdk::calibration::{ProbeConfig, persist};
use painter_sdk::prelude::*;
use std::time::Duration;

fn connect(controller: &FakeController) -> RobotLink {
    RobotLinkBuilder::new()
        .host("127.0.0.1")
        .command_port(controller.command_port)
        .status_port(controller.status_port)
        .read_timeout(Duration::from_secs(2))
        .settle_delay(Duration::ZERO)
        .connect()
        .expect("connect to fake controller")
}

fn down(x: f64, y: f64, z: f64) -> CartesianPose {
    CartesianPose::new(Vector3::new(x, y, z), RpyRotation::new(180.0, 0.0, 0.0))
}

#[test]
fn test_canvas_to_world_reference_case() {
    let canvas = CoordinateSystem2D::build(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(100.0, 0.0, 0.0),
        Vector3::new(0.0, 50.0, 0.0),
        RpyRotation::default(),
        1.0,
        Vector3::new(0.0, 0.0, 1.0),
    )
    .unwrap();
    let p = canvas.canvas_to_world(50.0, 25.0, 10.0).unwrap();
    assert!(p.approx_eq(&Vector3::new(50.0, 25.0, 10.0), 1e-12));
    assert!(matches!(
        canvas.canvas_to_world(101.0, 0.0, 0.0),
        Err(CalibrationError::OutOfBounds { .. })
    ));
    assert!(canvas.canvas_to_world(0.0, 51.0, 0.0).is_err());
}

#[test]
fn test_sensor_probe_calibration_over_tcp() {
    // 表面在 z = 100，接近位姿在表面上方 5 mm
    let controller = FakeController::start([0.0, 0.0, 300.0, 180.0, 0.0, 0.0], 100.0);
    let link = connect(&controller);

    let config = CalibrationConfig {
        probe: ProbeConfig {
            step: 1.0,
            max_travel: 10.0,
            sensor_length: 5.0,
            ..ProbeConfig::default()
        },
        ..CalibrationConfig::default()
    };
    let approaches = [
        down(0.0, 0.0, 105.0),
        down(100.0, 0.0, 105.0),
        down(0.0, 50.0, 105.0),
    ];

    let mut strategy = SensorProbeStrategy::new(&link, approaches, &config).unwrap();
    let canvas = strategy.calibrate().unwrap();

    // 接触时工具中心点在 z = 100，表面点再沿工具 +Z（向下）5 mm
    assert!(canvas.zero().approx_eq(&Vector3::new(0.0, 0.0, 95.0), 1e-6));
    assert!((canvas.max_x() - 100.0).abs() < 1e-6);
    assert!((canvas.max_y() - 50.0).abs() < 1e-6);
    assert!(canvas.z_shift_dir().approx_eq(&Vector3::UNIT_Z, 1e-6));

    let p = canvas.canvas_to_world(50.0, 25.0, 10.0).unwrap();
    assert!(p.approx_eq(&Vector3::new(50.0, 25.0, 105.0), 1e-6));

    // 最后一次回退后工具停在 Y 轴点的接近位姿
    let final_pose = controller.pose();
    assert!((final_pose[1] - 50.0).abs() < 1e-6);
    assert!((final_pose[2] - 105.0).abs() < 1e-6);

    // 每一步都是一次相对直线运动
    let relative_moves = controller
        .received()
        .iter()
        .filter(|frame| frame.contains("\"relFlag\":1"))
        .count();
    assert_eq!(relative_moves, 15);

    // 保存并重新加载
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.json");
    persist::save_coordinate_system(&canvas, &path).unwrap();
    let mut preloaded = PreloadedCalibration::from_file(&path).unwrap();
    let restored = preloaded.calibrate().unwrap();
    assert!(restored.zero().approx_eq(&canvas.zero(), 1e-9));
    assert!((restored.max_x() - canvas.max_x()).abs() < 1e-9);
}

#[test]
fn test_probe_without_surface_reports_no_contact() {
    let controller = FakeController::start([0.0, 0.0, 300.0, 180.0, 0.0, 0.0], -1000.0);
    let link = connect(&controller);

    let config = CalibrationConfig {
        probe: ProbeConfig {
            max_travel: 3.0,
            ..ProbeConfig::default()
        },
        ..CalibrationConfig::default()
    };
    let approach = down(0.0, 0.0, 105.0);
    let strategy =
        SensorProbeStrategy::new(&link, [approach, approach, approach], &config).unwrap();

    let err = strategy.probe(&approach).unwrap_err();
    assert!(matches!(err, CalibrationError::NoContact { .. }));
    // 放弃后回到接近位姿
    assert!((controller.pose()[2] - 105.0).abs() < 1e-9);
}
