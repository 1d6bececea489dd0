//! 标定记录的 JSON 持久化
//!
//! 坐标系记录包含全部字段（三个点、姿态、单位比例、缓存的方向和边界），
//! 原样写出、原样读回；读回后检查缓存字段与三个点是否一致。

use crate::coordinate::CoordinateSystem2D;
use crate::error::CalibrationError;
use crate::strategy::LocationDictionary;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// 序列化为 JSON 文本
pub fn to_json<T: Serialize>(value: &T) -> Result<String, CalibrationError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// 从 JSON 文本反序列化
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, CalibrationError> {
    Ok(serde_json::from_str(text)?)
}

/// 写入 JSON 文件
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), CalibrationError> {
    fs::write(path, to_json(value)?)?;
    debug!("Saved {}", path.display());
    Ok(())
}

/// 读取 JSON 文件
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CalibrationError> {
    let text = fs::read_to_string(path)?;
    from_json(&text)
}

/// 坐标系 → JSON 文本
pub fn coordinate_system_to_json(system: &CoordinateSystem2D) -> Result<String, CalibrationError> {
    to_json(system)
}

/// JSON 文本 → 坐标系（检查一致性）
pub fn coordinate_system_from_json(text: &str) -> Result<CoordinateSystem2D, CalibrationError> {
    let system: CoordinateSystem2D = from_json(text)?;
    system.validate()?;
    Ok(system)
}

pub fn save_coordinate_system(
    system: &CoordinateSystem2D,
    path: impl AsRef<Path>,
) -> Result<(), CalibrationError> {
    save_json(system, path.as_ref())
}

pub fn load_coordinate_system(path: impl AsRef<Path>) -> Result<CoordinateSystem2D, CalibrationError> {
    let text = fs::read_to_string(path.as_ref())?;
    coordinate_system_from_json(&text)
}

pub fn save_locations(
    locations: &LocationDictionary,
    path: impl AsRef<Path>,
) -> Result<(), CalibrationError> {
    save_json(locations, path.as_ref())
}

pub fn load_locations(path: impl AsRef<Path>) -> Result<LocationDictionary, CalibrationError> {
    load_json(path.as_ref())
}
