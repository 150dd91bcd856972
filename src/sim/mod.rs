//! 仿真支撑模块
//!
//! 仿真时间、配置以及从 JSON 描述构建拓扑。

// 子模块声明
mod config;
mod spec;
mod time;

// 重新导出公共接口
pub use config::{DEFAULT_ACK_DELAY_MS, SimConfig};
pub use spec::{
    AdvertisementSpec, DeviceSpec, ForwardingSpec, RouteSpec, SCHEMA_VERSION, SpecError,
    TopologySpec,
};
pub use time::SimTime;
