//! 设备类型
//!
//! 定义网络中的设备（终端、交换机、集线器、网桥、路由器）及其能力集合。

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::id::DeviceId;
use super::routing::Router;

/// 设备种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// 普通终端设备
    Host,
    Switch,
    Hub,
    Bridge,
    Router,
}

impl DeviceKind {
    /// 是否为终端（流量的起点/终点）
    pub fn is_end_host(self) -> bool {
        matches!(self, DeviceKind::Host)
    }

    /// 是否参与路由（持有路由表）
    pub fn participates_in_routing(self) -> bool {
        matches!(self, DeviceKind::Router)
    }

    /// 是否持有转发表
    pub fn has_forwarding_table(self) -> bool {
        matches!(self, DeviceKind::Router)
    }

    /// 二层基础设施：交换机、集线器、网桥
    pub fn is_infrastructure(self) -> bool {
        matches!(self, DeviceKind::Switch | DeviceKind::Hub | DeviceKind::Bridge)
    }

    /// 是否需要分配网络地址
    pub fn is_addressable(self) -> bool {
        !self.is_infrastructure()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Host => "Device",
            DeviceKind::Switch => "Switch",
            DeviceKind::Hub => "Hub",
            DeviceKind::Bridge => "Bridge",
            DeviceKind::Router => "Router",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 物理地址（MAC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// 由设备标识符派生：`00:00:00` 前缀 + 标识符低 24 位。
    pub fn derive(id: DeviceId) -> Self {
        let v = id.0 as u32;
        MacAddr([0, 0, 0, (v >> 16) as u8, (v >> 8) as u8, v as u8])
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// 网络设备
#[derive(Debug, Clone)]
pub struct Device {
    id: DeviceId,
    name: String,
    kind: DeviceKind,
    mac: MacAddr,
    pub(crate) address: Option<Ipv4Addr>,
    /// 仅当 `kind == Router` 时存在
    pub(crate) router: Option<Router>,
    /// 交换机端口表（按接入顺序）
    pub(crate) ports: Vec<DeviceId>,
}

impl Device {
    /// 创建新设备；路由器会同时创建空的路由表和转发表。
    pub fn new(id: DeviceId, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            mac: MacAddr::derive(id),
            address: None,
            router: kind.participates_in_routing().then(|| Router::new(id)),
            ports: Vec::new(),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    /// 网络地址（分配前为 None）
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    pub fn is_router(&self) -> bool {
        self.router.is_some()
    }

    /// 交换机端口表
    pub fn ports(&self) -> &[DeviceId] {
        &self.ports
    }
}
