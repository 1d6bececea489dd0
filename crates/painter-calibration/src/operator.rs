//! 操作员交互
//!
//! 交互式标定由 [`OperatorPrompt`] 驱动：每轮询问一次操作员的选择。
//! [`LineOperator`] 基于文本行（终端）实现，[`ScriptedOperator`]
//! 按预先给定的动作序列回答（无人值守、测试）。

use crate::error::CalibrationError;
use crate::session::{CalibrationPoint, CalibrationState};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::info;

/// 坐标系标定时操作员的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAction {
    /// 以当前位置采样指定点
    Sample(CalibrationPoint),
    /// 完成标定
    Finish,
    /// 放弃标定
    Abort,
}

/// 位置采集时操作员的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAction {
    /// 以当前位置记录指定序号
    Capture(u32),
    /// 结束采集
    Finish,
    /// 放弃采集
    Abort,
}

/// 操作员接口
pub trait OperatorPrompt {
    /// 询问坐标系标定的下一步
    fn next_action(
        &mut self,
        state: CalibrationState,
        completion_mask: u8,
    ) -> Result<OperatorAction, CalibrationError>;

    /// 询问位置采集的下一步
    fn next_location_action(&mut self, captured: usize)
    -> Result<LocationAction, CalibrationError>;

    /// 向操作员显示消息（采样结果、可恢复错误）
    fn notify(&mut self, _message: &str) {}
}

impl<P: OperatorPrompt + ?Sized> OperatorPrompt for &mut P {
    fn next_action(
        &mut self,
        state: CalibrationState,
        completion_mask: u8,
    ) -> Result<OperatorAction, CalibrationError> {
        (**self).next_action(state, completion_mask)
    }

    fn next_location_action(
        &mut self,
        captured: usize,
    ) -> Result<LocationAction, CalibrationError> {
        (**self).next_location_action(captured)
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message)
    }
}

/// 文本行操作员
///
/// 坐标系标定菜单：`1` 零点、`2` X 轴点、`3` Y 轴点、`0` 完成、`q` 放弃。
/// 位置采集：输入序号记录当前位置，`d` 完成，`q` 放弃。
/// 输入结束（EOF）视为放弃；无法识别的输入重新询问。
pub struct LineOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 读取一行，EOF 返回 `None`
    fn read_choice(&mut self) -> Result<Option<String>, CalibrationError> {
        self.output.write_all(b"> ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_ascii_lowercase()))
    }

    /// 取回内部的输入输出
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl LineOperator<io::StdinLock<'static>, io::Stdout> {
    /// 使用标准输入输出
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> OperatorPrompt for LineOperator<R, W> {
    fn next_action(
        &mut self,
        state: CalibrationState,
        completion_mask: u8,
    ) -> Result<OperatorAction, CalibrationError> {
        loop {
            writeln!(
                self.output,
                "Calibration [{:?}, sampled {:03b}]\n  1) zero point\n  2) X axis point\n  3) Y axis point\n  0) finish\n  q) abort",
                state, completion_mask
            )?;
            let Some(choice) = self.read_choice()? else {
                return Ok(OperatorAction::Abort);
            };
            let action = match choice.as_str() {
                "1" => OperatorAction::Sample(CalibrationPoint::Zero),
                "2" => OperatorAction::Sample(CalibrationPoint::AxisX),
                "3" => OperatorAction::Sample(CalibrationPoint::AxisY),
                "0" => OperatorAction::Finish,
                "q" => OperatorAction::Abort,
                other => {
                    writeln!(self.output, "Unrecognised option '{}'", other)?;
                    continue;
                },
            };
            return Ok(action);
        }
    }

    fn next_location_action(
        &mut self,
        captured: usize,
    ) -> Result<LocationAction, CalibrationError> {
        loop {
            writeln!(
                self.output,
                "Locations captured: {}. Enter an index to capture, d) done, q) abort",
                captured
            )?;
            let Some(choice) = self.read_choice()? else {
                return Ok(LocationAction::Abort);
            };
            match choice.as_str() {
                "d" => return Ok(LocationAction::Finish),
                "q" => return Ok(LocationAction::Abort),
                other => match other.parse::<u32>() {
                    Ok(index) => return Ok(LocationAction::Capture(index)),
                    Err(_) => writeln!(self.output, "Unrecognised option '{}'", other)?,
                },
            }
        }
    }

    fn notify(&mut self, message: &str) {
        // 终端已不可写时没有别的渠道可报告
        let _ = writeln!(self.output, "{}", message);
    }
}

/// 脚本操作员
///
/// 依次返回预设的动作，用完后返回 `Abort`。
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    actions: VecDeque<OperatorAction>,
    location_actions: VecDeque<LocationAction>,
    messages: Vec<String>,
}

impl ScriptedOperator {
    pub fn new(actions: impl IntoIterator<Item = OperatorAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_locations(actions: impl IntoIterator<Item = LocationAction>) -> Self {
        Self {
            location_actions: actions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// 收到的全部消息
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// 剩余未使用的动作数
    pub fn remaining(&self) -> usize {
        self.actions.len() + self.location_actions.len()
    }
}

impl OperatorPrompt for ScriptedOperator {
    fn next_action(
        &mut self,
        _state: CalibrationState,
        _completion_mask: u8,
    ) -> Result<OperatorAction, CalibrationError> {
        Ok(self.actions.pop_front().unwrap_or(OperatorAction::Abort))
    }

    fn next_location_action(
        &mut self,
        _captured: usize,
    ) -> Result<LocationAction, CalibrationError> {
        Ok(self
            .location_actions
            .pop_front()
            .unwrap_or(LocationAction::Abort))
    }

    fn notify(&mut self, message: &str) {
        info!("{}", message);
        self.messages.push(message.to_string());
    }
}
