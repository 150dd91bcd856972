//! 拓扑描述（JSON）
//!
//! 设备引用既可以是设备名，也可以是字面地址。设备名在路由/转发表中
//! 解析为该设备分配到的地址，在下一跳中解析为设备标识符。

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::config::SimConfig;
use crate::net::{
    AddressError, DeviceId, DeviceKind, ForwardTarget, ForwardingTable, Network, TopologyError,
};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("unsupported schema_version {0}")]
    UnsupportedSchema(u32),

    #[error("duplicate device name {0:?}")]
    DuplicateName(String),

    #[error("unknown device {0:?}")]
    UnknownDevice(String),

    #[error("device {0:?} has no address")]
    Unaddressed(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("invalid topology json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySpec {
    pub schema_version: u32,
    #[serde(default)]
    pub config: Option<SimConfig>,
    pub devices: Vec<DeviceSpec>,
    #[serde(default)]
    pub links: Vec<(String, String)>,
    /// 交换机端口接入：(交换机, 设备)
    #[serde(default)]
    pub attachments: Vec<(String, String)>,
    /// 手动指定的地址，先于自动分配生效
    #[serde(default)]
    pub addresses: BTreeMap<String, Ipv4Addr>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub advertisements: Vec<AdvertisementSpec>,
    #[serde(default)]
    pub forwarding: Vec<ForwardingSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub name: String,
    pub kind: DeviceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSpec {
    pub router: String,
    pub destination: String,
    pub next_hop: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvertisementSpec {
    pub router: String,
    pub from: String,
    /// 目的地 -> 距离
    pub vector: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingSpec {
    pub router: String,
    /// 目的地 -> "local" / 设备名 / 链路标识
    pub table: BTreeMap<String, String>,
}

impl TopologySpec {
    pub fn from_json(raw: &str) -> Result<Self, SpecError> {
        let spec: TopologySpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(SpecError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    /// 组装拓扑、分配地址并写入路由器配置
    pub fn build(&self) -> Result<Network, SpecError> {
        self.build_into(Network::with_config(self.config.unwrap_or_default()))
    }

    /// 在给定（通常为空、已配置好事件记录）的网络上组装拓扑。`self.config` 不再生效。
    #[tracing::instrument(skip(self, net), fields(devices = self.devices.len(), links = self.links.len()))]
    pub fn build_into(&self, mut net: Network) -> Result<Network, SpecError> {
        for d in &self.devices {
            if net.device_by_name(&d.name).is_some() {
                return Err(SpecError::DuplicateName(d.name.clone()));
            }
            net.add_device(d.name.clone(), d.kind);
        }
        for (a, b) in &self.links {
            net.connect(id_of(&net, a)?, id_of(&net, b)?)?;
        }
        for (switch, device) in &self.attachments {
            net.attach(id_of(&net, switch)?, id_of(&net, device)?)?;
        }
        for (name, addr) in &self.addresses {
            net.assign_address(id_of(&net, name)?, *addr)?;
        }
        let alloc = net.assign_addresses()?;
        debug!(assigned = alloc.assigned.len(), "地址分配完成");

        for r in &self.routes {
            let router = id_of(&net, &r.router)?;
            let destination = addr_of(&net, &r.destination)?;
            let next_hop = id_of(&net, &r.next_hop)?;
            net.add_route(router, destination, next_hop)?;
        }
        for adv in &self.advertisements {
            let router = id_of(&net, &adv.router)?;
            let from = id_of(&net, &adv.from)?;
            let vector = adv
                .vector
                .iter()
                .map(|(dst, d)| Ok((addr_of(&net, dst)?, *d)))
                .collect::<Result<Vec<_>, SpecError>>()?;
            net.update_routing_table(router, from, &vector)?;
        }
        for fwd in &self.forwarding {
            let router = id_of(&net, &fwd.router)?;
            let mut table = ForwardingTable::new();
            for (dst, target) in &fwd.table {
                table.insert(addr_of(&net, dst)?, target_of(&net, target));
            }
            net.set_forwarding_table(router, table)?;
        }

        info!(devices = net.devices().len(), "拓扑构建完成");
        Ok(net)
    }
}

fn id_of(net: &Network, name: &str) -> Result<DeviceId, SpecError> {
    net.device_by_name(name)
        .map(|d| d.id())
        .ok_or_else(|| SpecError::UnknownDevice(name.to_string()))
}

fn addr_of(net: &Network, reference: &str) -> Result<Ipv4Addr, SpecError> {
    if let Ok(addr) = reference.parse() {
        return Ok(addr);
    }
    let device = net
        .device_by_name(reference)
        .ok_or_else(|| SpecError::UnknownDevice(reference.to_string()))?;
    device
        .address()
        .ok_or_else(|| SpecError::Unaddressed(reference.to_string()))
}

/// 设备名解析为其地址；其他字符串（含 "local"、接口名）原样保留
fn target_of(net: &Network, raw: &str) -> ForwardTarget {
    match net.device_by_name(raw).and_then(|d| d.address()) {
        Some(addr) => ForwardTarget::Next(addr.to_string()),
        None => ForwardTarget::from(raw),
    }
}
