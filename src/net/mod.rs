//! 网络拓扑与路由/转发引擎
//!
//! 此模块包含设备、连接、地址分配、路由表收敛、最短路径搜索和多跳转发仿真。

// 子模块声明
mod id;
mod device;
mod link;
mod error;
mod network;
mod network_report;
mod address;
mod routing;
mod path;
mod transmit;
mod forward;

// 重新导出公共接口
pub use id::{DeviceId, LinkId};
pub use device::{Device, DeviceKind, MacAddr};
pub use link::Connection;
pub use error::{AddressError, ForwardError, TopologyError};
pub use network::Network;
pub use address::{AddressBlock, AllocationReport};
pub use routing::{
    Advertisements, ConvergenceReport, ForwardTarget, ForwardingTable, RouteEntry, Router,
    RoutingTable,
};
pub use transmit::AckRoundTrip;
pub use forward::{Delivery, ForwardReport};
