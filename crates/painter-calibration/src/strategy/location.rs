//! 单点位置采集
//!
//! 记录一组带序号的工具位姿（画笔架、清洗槽、烘干位等），
//! 与坐标系标定共用操作员交互和 JSON 持久化。

use crate::error::CalibrationError;
use crate::operator::{LocationAction, OperatorPrompt};
use crate::robot::CalibrationRobot;
use painter_geometry::CartesianPose;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use tracing::{info, warn};

/// 序号 → 位姿（按序号有序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationDictionary {
    entries: BTreeMap<u32, CartesianPose>,
}

impl LocationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录位姿，返回被覆盖的旧值
    pub fn insert(&mut self, index: u32, pose: CartesianPose) -> Option<CartesianPose> {
        self.entries.insert(index, pose)
    }

    pub fn get(&self, index: u32) -> Option<&CartesianPose> {
        self.entries.get(&index)
    }

    pub fn remove(&mut self, index: u32) -> Option<CartesianPose> {
        self.entries.remove(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u32, CartesianPose> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a LocationDictionary {
    type Item = (&'a u32, &'a CartesianPose);
    type IntoIter = btree_map::Iter<'a, u32, CartesianPose>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(u32, CartesianPose)> for LocationDictionary {
    fn from_iter<I: IntoIterator<Item = (u32, CartesianPose)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// 位置采集流程
///
/// 操作员每选择一个序号就记录当前位姿；没有任何记录时结束会重新询问。
pub struct LocationCapture<R, P> {
    robot: R,
    operator: P,
    locations: LocationDictionary,
}

impl<R: CalibrationRobot, P: OperatorPrompt> LocationCapture<R, P> {
    pub fn new(robot: R, operator: P) -> Self {
        Self::with_existing(robot, operator, LocationDictionary::new())
    }

    /// 在已有记录上继续采集
    pub fn with_existing(robot: R, operator: P, locations: LocationDictionary) -> Self {
        Self {
            robot,
            operator,
            locations,
        }
    }

    /// 运行采集，返回全部记录
    ///
    /// # 错误
    ///
    /// - `Aborted`: 操作员放弃
    /// - `Link`: 读取位姿失败
    pub fn capture(&mut self) -> Result<LocationDictionary, CalibrationError> {
        loop {
            match self.operator.next_location_action(self.locations.len())? {
                LocationAction::Capture(index) => {
                    let pose = self.robot.current_pose()?;
                    if self.locations.insert(index, pose).is_some() {
                        info!("Location {} updated: {}", index, pose);
                    } else {
                        info!("Location {} captured: {}", index, pose);
                    }
                    self.operator
                        .notify(&format!("Location {} = {}", index, pose));
                },
                LocationAction::Finish if self.locations.is_empty() => {
                    warn!("No locations captured yet");
                    self.operator
                        .notify("No locations captured yet, capture at least one");
                },
                LocationAction::Finish => return Ok(self.locations.clone()),
                LocationAction::Abort => return Err(CalibrationError::Aborted),
            }
        }
    }

    pub fn locations(&self) -> &LocationDictionary {
        &self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::ScriptedOperator;
    use crate::robot::sim::SimRobot;
    use painter_geometry::{RpyRotation, Vector3};

    fn pose(x: f64) -> CartesianPose {
        CartesianPose::new(Vector3::new(x, 0.0, 0.0), RpyRotation::default())
    }

    #[test]
    fn test_capture_reprompts_when_empty() {
        let robot = SimRobot::new(pose(5.0), |_| 0.0);
        let mut operator = ScriptedOperator::with_locations([
            LocationAction::Finish,
            LocationAction::Capture(3),
            LocationAction::Capture(1),
            LocationAction::Finish,
        ]);

        let locations = LocationCapture::new(&robot, &mut operator)
            .capture()
            .unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(
            locations.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(locations.get(3), Some(&pose(5.0)));
        assert!(operator.messages()[0].starts_with("No locations captured"));
    }

    #[test]
    fn test_capture_overwrites_and_aborts() {
        let robot = SimRobot::new(pose(1.0), |_| 0.0);
        let existing: LocationDictionary = [(7, pose(-1.0))].into_iter().collect();
        let mut capture = LocationCapture::with_existing(
            &robot,
            ScriptedOperator::with_locations([LocationAction::Capture(7)]),
            existing,
        );
        assert!(matches!(capture.capture(), Err(CalibrationError::Aborted)));
        assert_eq!(capture.locations().get(7), Some(&pose(1.0)));
    }

    #[test]
    fn test_dictionary_json_shape() {
        let mut locations = LocationDictionary::new();
        locations.insert(2, CartesianPose::from_array([1.0, 2.0, 3.0, 180.0, 0.0, 90.0]));
        let json = serde_json::to_value(&locations).unwrap();
        assert_eq!(json["2"]["position"]["dx"], 1.0);
        assert_eq!(json["2"]["orientation"]["yaw"], 90.0);

        let restored: LocationDictionary = serde_json::from_value(json).unwrap();
        assert_eq!(restored, locations);
    }
}
