//! 路由器状态：路由表（静态 / 距离向量双模式）与转发表
//!
//! 路由表的值有两种形态：
//! - 静态阶段由 `add_route` 写入的下一跳 `NextHop`；
//! - 距离向量阶段由 `update_routing_table` 写入的 `Vector`，
//!   即「通告路由器 -> 距离」的映射。
//!
//! 收敛算法只处理 `Vector` 形态，选出距离最小的通告者作为下一跳，
//! 并把该目的地折叠为 `NextHop`。转发决策只看转发表，与路由表互相独立。

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use tracing::{debug, trace};

use super::id::DeviceId;

/// 某个目的地收到的距离通告，保持通告者首次出现的顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advertisements(Vec<(DeviceId, u32)>);

impl Advertisements {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入通告；已存在的通告者原位覆盖
    pub fn set(&mut self, from: DeviceId, distance: u32) {
        match self.0.iter_mut().find(|(id, _)| *id == from) {
            Some(slot) => slot.1 = distance,
            None => self.0.push((from, distance)),
        }
    }

    pub fn get(&self, from: DeviceId) -> Option<u32> {
        self.0.iter().find(|(id, _)| *id == from).map(|&(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, u32)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 严格最小距离的通告者；距离相同时先出现者胜出。`own` 的通告被忽略。
    pub fn best_excluding(&self, own: DeviceId) -> Option<(DeviceId, u32)> {
        let mut best: Option<(DeviceId, u32)> = None;
        for (from, distance) in self.iter() {
            if from == own {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((from, distance));
            }
        }
        best
    }
}

impl FromIterator<(DeviceId, u32)> for Advertisements {
    fn from_iter<I: IntoIterator<Item = (DeviceId, u32)>>(iter: I) -> Self {
        let mut adv = Advertisements::new();
        for (from, d) in iter {
            adv.set(from, d);
        }
        adv
    }
}

/// 路由表条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEntry {
    /// 下一跳路由器
    NextHop(DeviceId),
    /// 距离向量通告（尚未收敛）
    Vector(Advertisements),
    /// 收敛时没有任何可用通告者
    Unreachable,
}

impl RouteEntry {
    pub fn next_hop(&self) -> Option<DeviceId> {
        match self {
            RouteEntry::NextHop(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteEntry::NextHop(id) => write!(f, "via {id}"),
            RouteEntry::Vector(adv) => {
                f.write_str("{")?;
                for (i, (from, d)) in adv.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{from}: {d}")?;
                }
                f.write_str("}")
            }
            RouteEntry::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// 转发表条目
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForwardTarget {
    /// 目的地直连，无需继续转发
    Local,
    /// 邻居链路标识（若能解析为某路由器的地址则视为下一跳路由器）
    Next(String),
}

impl From<&str> for ForwardTarget {
    fn from(s: &str) -> Self {
        match s {
            "local" => ForwardTarget::Local,
            other => ForwardTarget::Next(other.to_string()),
        }
    }
}

impl fmt::Display for ForwardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardTarget::Local => f.write_str("local"),
            ForwardTarget::Next(s) => f.write_str(s),
        }
    }
}

pub type RoutingTable = BTreeMap<Ipv4Addr, RouteEntry>;
pub type ForwardingTable = BTreeMap<Ipv4Addr, ForwardTarget>;

/// 一次收敛的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceReport {
    /// 完整扫描的轮数（最后一轮没有任何更新）
    pub passes: usize,
    /// 被改写的目的地（按首次改写顺序）
    pub updated: Vec<Ipv4Addr>,
}

impl ConvergenceReport {
    pub fn changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// 路由器的路由表与转发表
#[derive(Debug, Clone)]
pub struct Router {
    id: DeviceId,
    routing_table: RoutingTable,
    forwarding_table: ForwardingTable,
}

impl Router {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            routing_table: RoutingTable::new(),
            forwarding_table: ForwardingTable::new(),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// 写入静态路由；无论原条目是什么形态都直接覆盖
    pub fn add_route(&mut self, destination: Ipv4Addr, next_hop: DeviceId) {
        trace!(router = ?self.id, %destination, ?next_hop, "写入静态路由");
        self.routing_table
            .insert(destination, RouteEntry::NextHop(next_hop));
    }

    /// 合并来自 `source` 的距离向量通告。
    ///
    /// 不校验 `source` 是否真的是邻居。目的地原先不是 `Vector` 形态时会被重置为空通告表。
    pub fn update_routing_table<I>(&mut self, source: DeviceId, vector: I)
    where
        I: IntoIterator<Item = (Ipv4Addr, u32)>,
    {
        for (destination, distance) in vector {
            let entry = self
                .routing_table
                .entry(destination)
                .or_insert_with(|| RouteEntry::Vector(Advertisements::new()));
            if !matches!(entry, RouteEntry::Vector(_)) {
                *entry = RouteEntry::Vector(Advertisements::new());
            }
            if let RouteEntry::Vector(adv) = entry {
                adv.set(source, distance);
            }
            trace!(router = ?self.id, %destination, ?source, distance, "收到距离通告");
        }
    }

    /// 整体替换转发表
    pub fn set_forwarding_table(&mut self, table: ForwardingTable) {
        debug!(router = ?self.id, entries = table.len(), "替换转发表");
        self.forwarding_table = table;
    }

    pub fn route(&self, destination: Ipv4Addr) -> Option<&RouteEntry> {
        self.routing_table.get(&destination)
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn forwarding_entry(&self, destination: Ipv4Addr) -> Option<&ForwardTarget> {
        self.forwarding_table.get(&destination)
    }

    pub fn forwarding_table(&self) -> &ForwardingTable {
        &self.forwarding_table
    }

    /// 距离向量收敛（不动点迭代）。
    ///
    /// 在路由表快照上反复扫描：每个 `Vector` 目的地选出距离严格最小的通告者，
    /// 若与当前表中的值不同则覆盖为 `NextHop`（或 `Unreachable`）。
    /// 某一轮没有任何改写时结束。静态路由与已收敛的条目保持原值不变。
    ///
    /// 快照中概念上还包含自身条目 `{self: {self: 0}}`，但它总被跳过，因此不必真的插入。
    #[tracing::instrument(skip(self), fields(router = ?self.id))]
    pub fn run_distance_vector_convergence(&mut self) -> ConvergenceReport {
        let snapshot: Vec<(Ipv4Addr, RouteEntry)> = self
            .routing_table
            .iter()
            .map(|(dst, entry)| (*dst, entry.clone()))
            .collect();

        let mut report = ConvergenceReport::default();
        loop {
            report.passes += 1;
            let mut updated = false;

            for (destination, entry) in &snapshot {
                let RouteEntry::Vector(adv) = entry else {
                    trace!(%destination, entry = %entry, "已是下一跳，保持不变");
                    continue;
                };

                let chosen = match adv.best_excluding(self.id) {
                    Some((next_hop, _)) => RouteEntry::NextHop(next_hop),
                    None => RouteEntry::Unreachable,
                };

                if self.routing_table.get(destination) != Some(&chosen) {
                    debug!(%destination, chosen = %chosen, pass = report.passes, "更新下一跳");
                    self.routing_table.insert(*destination, chosen);
                    if !report.updated.contains(destination) {
                        report.updated.push(*destination);
                    }
                    updated = true;
                }
            }

            if !updated {
                break;
            }
        }

        debug!(
            passes = report.passes,
            updated = report.updated.len(),
            "收敛完成"
        );
        report
    }
}
