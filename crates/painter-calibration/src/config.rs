//! 标定配置
//!
//! ```toml
//! units_per_length = 1.0
//! needle_length = 20.0
//! orientation = "zero_sample"
//! approach_speed = 20.0
//! approach_accel = 50.0
//!
//! [probe]
//! step = 1.0
//! max_travel = 50.0
//! sensor_length = 15.0
//! analog_index = 0
//! in_range_min = 0.0
//! in_range_max = 1.0
//! speed = 5.0
//! accel = 10.0
//! ```

use painter_driver::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 标定结果中工具姿态的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationSource {
    /// 沿用零点采样时的工具姿态
    #[default]
    ZeroSample,
    /// 由三个点计算：工具 Z 轴垂直指向平面，X 轴沿画布 X 轴
    PlaneNormal,
}

/// 传感器探测参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// 单步行程（毫米）
    pub step: f64,
    /// 最大行程（毫米），超过仍未接触则放弃
    pub max_travel: f64,
    /// 传感器触点到工具中心点沿工具 Z 轴的距离（毫米）
    pub sensor_length: f64,
    /// 传感器所在的模拟输入序号
    pub analog_index: usize,
    /// "未接触" 读数区间下限
    pub in_range_min: f64,
    /// "未接触" 读数区间上限
    pub in_range_max: f64,
    /// 探测速度（毫米/秒）
    pub speed: f64,
    /// 探测加速度（毫米/秒²）
    pub accel: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            max_travel: 50.0,
            sensor_length: 0.0,
            analog_index: 0,
            in_range_min: 0.0,
            in_range_max: 1.0,
            speed: 5.0,
            accel: 10.0,
        }
    }
}

impl ProbeConfig {
    /// 读数是否表示"尚未接触"
    pub fn is_in_range(&self, reading: f64) -> bool {
        reading >= self.in_range_min && reading <= self.in_range_max
    }

    /// 行程上限对应的最大步数
    pub fn max_steps(&self) -> usize {
        (self.max_travel / self.step).floor() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(invalid("probe.step", "must be positive"));
        }
        if !(self.max_travel.is_finite() && self.max_travel >= self.step) {
            return Err(invalid("probe.max_travel", "must be at least one step"));
        }
        if self.in_range_min > self.in_range_max {
            return Err(invalid("probe.in_range_min", "must not exceed in_range_max"));
        }
        if !(self.speed > 0.0 && self.accel > 0.0) {
            return Err(invalid("probe.speed", "speed and accel must be positive"));
        }
        Ok(())
    }
}

/// 标定配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// 画布单位 / 世界长度单位
    pub units_per_length: f64,
    /// 针尖到工具中心点的距离（毫米）
    pub needle_length: f64,
    /// 工具姿态来源
    pub orientation: OrientationSource,
    /// 移动到接近位姿的速度
    pub approach_speed: f64,
    /// 移动到接近位姿的加速度
    pub approach_accel: f64,
    /// 传感器探测参数
    pub probe: ProbeConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            units_per_length: 1.0,
            needle_length: 20.0,
            orientation: OrientationSource::default(),
            approach_speed: 20.0,
            approach_accel: 50.0,
            probe: ProbeConfig::default(),
        }
    }
}

impl CalibrationConfig {
    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CalibrationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.units_per_length.is_finite() && self.units_per_length > 0.0) {
            return Err(invalid("units_per_length", "must be positive"));
        }
        if !(self.needle_length.is_finite() && self.needle_length >= 0.0) {
            return Err(invalid("needle_length", "must not be negative"));
        }
        if !(self.approach_speed > 0.0 && self.approach_accel > 0.0) {
            return Err(invalid("approach_speed", "speed and accel must be positive"));
        }
        self.probe.validate()
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
