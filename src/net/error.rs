//! 错误类型
//!
//! 所有错误都是局部、可恢复的：检测到错误的操作直接返回，不影响后续调用。

use std::net::Ipv4Addr;

use thiserror::Error;

use super::id::DeviceId;

/// 拓扑操作错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    #[error("device {0} is not a router")]
    NotARouter(DeviceId),

    #[error("device {0} is not a switch")]
    NotASwitch(DeviceId),

    #[error("no devices attached to switch {0}")]
    NoAttachedDevices(DeviceId),

    #[error("device {0} cannot be connected to itself")]
    SelfConnection(DeviceId),
}

/// 地址分配错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// 地址块耗尽：已分配的设备保留地址，剩余设备保持未分配
    #[error("address block exhausted: {assigned} devices addressed, {remaining} left unaddressed")]
    AddressExhausted { assigned: usize, remaining: usize },

    #[error("address {0} is already in use")]
    AddressInUse(Ipv4Addr),

    #[error("address {0} is outside the configured block")]
    OutOfBlock(Ipv4Addr),

    #[error("invalid address block: {0}")]
    InvalidBlock(String),

    #[error("prefix /{0} leaves no room for host addresses")]
    InvalidPrefix(u8),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// 转发仿真错误：终止本次转发，引擎可继续用于后续调用
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("router {router} has no forwarding entry for {}", display_addr(.destination))]
    NoForwardingEntry {
        router: DeviceId,
        destination: Option<Ipv4Addr>,
    },

    #[error("next hop {next_hop} from router {router} does not name a known router")]
    NextHopNotFound { router: DeviceId, next_hop: String },

    #[error("no valid path from {from} to next hop {next_hop}")]
    NoPathToNextHop { from: DeviceId, next_hop: DeviceId },

    #[error("forwarding loop: router {0} visited twice")]
    ForwardingLoop(DeviceId),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

fn display_addr(addr: &Option<Ipv4Addr>) -> String {
    match addr {
        Some(a) => a.to_string(),
        None => "unaddressed receiver".to_string(),
    }
}
