//! 画布标定示例
//!
//! 连接机械臂，交互式完成针尖标定（已有记录时直接加载），
//! 然后把工具移动到画布中心上方 10 mm。
//!
//! ```bash
//! cargo run -p painter-sdk --example calibrate_canvas -- 192.168.1.100 canvas.json
//! ```

use anyhow::{Context, Result};
use painter_sdk::calibration::persist;
use painter_sdk::prelude::*;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    painter_sdk::init_logging();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| LinkConfig::default().host);
    let record = PathBuf::from(args.next().unwrap_or_else(|| "canvas.json".to_string()));

    let link = RobotLinkBuilder::new()
        .host(host.as_str())
        .connect()
        .with_context(|| format!("connecting to {}", host))?;
    link.subscribe_debug(std::sync::Arc::new(painter_sdk::driver::TracingReplyLogger));

    link.power_on()?;
    link.enable_robot()?;

    let config = CalibrationConfig::default();
    let mut strategy: Box<dyn CalibrationStrategy + '_> = if record.exists() {
        Box::new(PreloadedCalibration::from_file(&record)?)
    } else {
        Box::new(NeedleStrategy::new(&link, LineOperator::stdio(), &config))
    };
    info!("Calibrating with the {} strategy", strategy.name());
    let canvas = strategy.calibrate()?;
    persist::save_coordinate_system(&canvas, &record)
        .with_context(|| format!("saving {}", record.display()))?;
    println!("Canvas: {}", canvas);

    let center = canvas.canvas_to_pose(canvas.max_x() / 2.0, canvas.max_y() / 2.0, 10.0)?;
    link.move_linear(&center, 20.0, 50.0, MovementType::Absolute)?;
    println!("Tool above canvas center at {}", center);

    link.disable_robot()?;
    Ok(())
}
