//! 协议常量定义
//!
//! 指令名、回复字段名和默认端口。

/// 默认指令通道端口
pub const DEFAULT_COMMAND_PORT: u16 = 10001;
/// 默认状态通道端口
pub const DEFAULT_STATUS_PORT: u16 = 10000;

/// 指令名
pub mod cmd {
    pub const POWER_ON: &str = "power_on";
    pub const POWER_OFF: &str = "power_off";
    pub const ENABLE_ROBOT: &str = "enable_robot";
    pub const DISABLE_ROBOT: &str = "disable_robot";
    pub const JOINT_MOVE: &str = "joint_move";
    pub const MOVE_LINEAR: &str = "moveL";
    pub const END_MOVE: &str = "end_move";
    pub const SET_DIGITAL_OUTPUT: &str = "set_digital_output";
    pub const GET_DATA: &str = "get_data";
}

/// 字段名
pub mod field {
    pub const CMD_NAME: &str = "cmdName";
    pub const ERROR_CODE: &str = "errorCode";
    pub const ERROR_MSG: &str = "errorMsg";

    pub const JOINT_POSITION: &str = "jointPosition";
    pub const SPEED: &str = "speed";
    pub const ACCEL: &str = "accel";
    pub const REL_FLAG: &str = "relFlag";

    pub const IO_TYPE: &str = "type";
    pub const IO_INDEX: &str = "index";
    pub const IO_VALUE: &str = "value";

    pub const JOINT_ACTUAL_POSITION: &str = "joint_actual_position";
    pub const ACTUAL_POSITION: &str = "actual_position";
    pub const DIN: &str = "din";
    pub const AIN: &str = "ain";
    pub const DRAG_STATUS: &str = "drag_status";
    pub const PROTECTIVE_STOP: &str = "protective_stop";
}

/// 成功的错误码
pub const ERROR_CODE_OK: &str = "0";
