//! 网络拓扑管理
//!
//! 拓扑持有全部设备（保持插入顺序）和按有序设备对索引的连接。
//! 其他组件都通过 `Network` 读取拓扑，只有它能增删设备与连接。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::device::{Device, DeviceKind};
use super::error::TopologyError;
use super::id::{DeviceId, LinkId};
use super::link::Connection;
use super::routing::{ConvergenceReport, ForwardingTable, Router};
use crate::report::{EventLog, SimEventKind};
use crate::sim::{SimConfig, SimTime};
use tracing::{debug, info, trace};

/// 网络拓扑
#[derive(Debug, Default)]
pub struct Network {
    devices: Vec<Device>,
    links: Vec<Connection>,
    /// 有序设备对 -> 连接
    edges: HashMap<(DeviceId, DeviceId), LinkId>,
    /// 有向索引的创建顺序（重复连接原位覆盖，不追加）
    directed: Vec<(DeviceId, DeviceId)>,
    pub(crate) config: SimConfig,
    pub(crate) clock: SimTime,
    /// 事件记录（可选，供展示层使用）
    pub events: Option<EventLog>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// 当前仿真时间（每次 ACK 往返推进一次）
    pub fn now(&self) -> SimTime {
        self.clock
    }

    /// 添加设备，返回新分配的标识符
    pub fn add_device(&mut self, name: impl Into<String>, kind: DeviceKind) -> DeviceId {
        let id = DeviceId(self.devices.len());
        let device = Device::new(id, name, kind);
        info!(device = ?id, name = device.name(), kind = %kind, mac = %device.mac(), "添加设备");
        self.devices.push(device);
        id
    }

    pub fn add_host(&mut self, name: impl Into<String>) -> DeviceId {
        self.add_device(name, DeviceKind::Host)
    }

    pub fn add_switch(&mut self, name: impl Into<String>) -> DeviceId {
        self.add_device(name, DeviceKind::Switch)
    }

    pub fn add_hub(&mut self, name: impl Into<String>) -> DeviceId {
        self.add_device(name, DeviceKind::Hub)
    }

    pub fn add_bridge(&mut self, name: impl Into<String>) -> DeviceId {
        self.add_device(name, DeviceKind::Bridge)
    }

    pub fn add_router(&mut self, name: impl Into<String>) -> DeviceId {
        self.add_device(name, DeviceKind::Router)
    }

    /// 连接两个设备（创建双向连接：(a,b) 与 (b,a) 指向同一连接）
    pub fn connect(&mut self, a: DeviceId, b: DeviceId) -> Result<LinkId, TopologyError> {
        self.device(a)?;
        self.device(b)?;
        if a == b {
            return Err(TopologyError::SelfConnection(a));
        }

        let id = LinkId(self.links.len());
        self.links.push(Connection::new(id, a, b));
        for key in [(a, b), (b, a)] {
            if self.edges.insert(key, id).is_none() {
                self.directed.push(key);
            } else {
                trace!(from = ?key.0, to = ?key.1, "重复连接，覆盖索引");
            }
        }
        debug!(link = ?id, a = ?a, b = ?b, "创建连接");
        Ok(id)
    }

    /// 查找 from -> to 的连接
    pub fn connection(&self, from: DeviceId, to: DeviceId) -> Option<LinkId> {
        self.edges.get(&(from, to)).copied()
    }

    pub fn link(&self, id: LinkId) -> Option<&Connection> {
        self.links.get(id.0)
    }

    pub fn links(&self) -> &[Connection] {
        &self.links
    }

    /// 邻居：以 `d` 为首元素的有向索引的另一端，按创建顺序。
    pub fn neighbors(&self, d: DeviceId) -> Vec<DeviceId> {
        self.directed
            .iter()
            .filter(|(from, _)| *from == d)
            .map(|&(_, to)| to)
            .collect()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> Result<&Device, TopologyError> {
        self.devices
            .get(id.0)
            .ok_or(TopologyError::UnknownDevice(id))
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> Result<&mut Device, TopologyError> {
        self.devices
            .get_mut(id.0)
            .ok_or(TopologyError::UnknownDevice(id))
    }

    pub fn device_by_name(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name() == name)
    }

    pub fn router(&self, id: DeviceId) -> Result<&Router, TopologyError> {
        self.device(id)?
            .router
            .as_ref()
            .ok_or(TopologyError::NotARouter(id))
    }

    pub fn router_mut(&mut self, id: DeviceId) -> Result<&mut Router, TopologyError> {
        self.device_mut(id)?
            .router
            .as_mut()
            .ok_or(TopologyError::NotARouter(id))
    }

    /// 第一个地址为 `addr` 的路由器
    pub fn router_by_address(&self, addr: Ipv4Addr) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.is_router() && d.address() == Some(addr))
    }

    /// 只有当 `id` 是路由器时才返回
    pub fn router_by_id(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.0).filter(|d| d.is_router())
    }

    /// 把设备接入交换机端口并建立连接
    pub fn attach(&mut self, switch: DeviceId, device: DeviceId) -> Result<LinkId, TopologyError> {
        if self.device(switch)?.kind() != DeviceKind::Switch {
            return Err(TopologyError::NotASwitch(switch));
        }
        let link = self.connect(switch, device)?;
        self.device_mut(switch)?.ports.push(device);
        Ok(link)
    }

    /// 令牌在交换机端口间按接入顺序传递一轮，返回令牌经过的设备
    #[tracing::instrument(skip(self))]
    pub fn token_passing(&self, switch: DeviceId) -> Result<Vec<DeviceId>, TopologyError> {
        let sw = self.device(switch)?;
        if sw.kind() != DeviceKind::Switch {
            return Err(TopologyError::NotASwitch(switch));
        }
        if sw.ports().is_empty() {
            return Err(TopologyError::NoAttachedDevices(switch));
        }
        for port in sw.ports() {
            trace!(device = ?port, "令牌传递");
        }
        debug!(ports = sw.ports().len(), "令牌回到交换机");
        Ok(sw.ports().to_vec())
    }

    /// 为路由器写入静态路由
    pub fn add_route(
        &mut self,
        router: DeviceId,
        destination: Ipv4Addr,
        next_hop: DeviceId,
    ) -> Result<(), TopologyError> {
        self.router_mut(router)?.add_route(destination, next_hop);
        self.emit(SimEventKind::RouteInstalled {
            router: router.0,
            destination: destination.to_string(),
            next_hop: next_hop.0,
        });
        Ok(())
    }

    /// 路由器接收来自 `source` 的距离向量
    pub fn update_routing_table(
        &mut self,
        router: DeviceId,
        source: DeviceId,
        vector: &[(Ipv4Addr, u32)],
    ) -> Result<(), TopologyError> {
        self.router_mut(router)?
            .update_routing_table(source, vector.iter().copied());
        for &(destination, distance) in vector {
            self.emit(SimEventKind::AdvertisementReceived {
                router: router.0,
                from: source.0,
                destination: destination.to_string(),
                distance,
            });
        }
        Ok(())
    }

    pub fn set_forwarding_table(
        &mut self,
        router: DeviceId,
        table: ForwardingTable,
    ) -> Result<(), TopologyError> {
        self.router_mut(router)?.set_forwarding_table(table);
        Ok(())
    }

    /// 在单个路由器上运行距离向量收敛
    pub fn run_distance_vector_convergence(
        &mut self,
        router: DeviceId,
    ) -> Result<ConvergenceReport, TopologyError> {
        let rt = self.router_mut(router)?;
        let report = rt.run_distance_vector_convergence();
        let changes: Vec<(Ipv4Addr, Option<DeviceId>)> = report
            .updated
            .iter()
            .map(|dst| (*dst, rt.route(*dst).and_then(|e| e.next_hop())))
            .collect();

        for (destination, next_hop) in changes {
            self.emit(SimEventKind::RouteConverged {
                router: router.0,
                destination: destination.to_string(),
                next_hop: next_hop.map(|id| id.0),
            });
        }
        Ok(report)
    }

    /// 按插入顺序在每个路由器上运行收敛
    pub fn converge_all(&mut self) -> Vec<(DeviceId, ConvergenceReport)> {
        let routers: Vec<DeviceId> = self
            .devices
            .iter()
            .filter(|d| d.is_router())
            .map(|d| d.id())
            .collect();
        routers
            .into_iter()
            .filter_map(|id| {
                self.run_distance_vector_convergence(id)
                    .ok()
                    .map(|report| (id, report))
            })
            .collect()
    }
}
