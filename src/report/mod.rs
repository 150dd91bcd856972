//! 仿真事件记录（供展示层使用）
//!
//! 引擎不直接向控制台输出，而是把地址分配、路由变化、每一跳的发送/ACK
//! 等记录为结构化事件，由调用方决定如何展示或写成 JSON。

mod types;

pub use types::{DeviceInfo, EventLog, LinkInfo, SimEvent, SimEventKind};
