use serde::{Deserialize, Serialize};

use crate::net::DeviceKind;

/// 仿真事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEventKind {
    /// 拓扑元信息（建议作为第一条事件）
    Meta {
        devices: Vec<DeviceInfo>,
        links: Vec<LinkInfo>,
    },
    AddressAssigned { device: usize, address: String },
    /// 地址块耗尽，分配提前结束
    AddressExhausted { assigned: usize, remaining: usize },
    RouteInstalled {
        router: usize,
        destination: String,
        next_hop: usize,
    },
    AdvertisementReceived {
        router: usize,
        from: usize,
        destination: String,
        distance: u32,
    },
    /// 收敛改写了某个目的地；`next_hop` 为 None 表示不可达
    RouteConverged {
        router: usize,
        destination: String,
        next_hop: Option<usize>,
    },
    DataSent {
        from: usize,
        to: usize,
        link: Option<usize>,
        payload: String,
    },
    AckReceived { from: usize, to: usize },
    Delivered { router: usize, destination: String },
    ForwardFailed { router: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: usize,
    pub name: String,
    pub kind: DeviceKind,
    pub mac: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub id: usize,
    pub a: usize,
    pub b: usize,
}

/// 一条事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(flatten)]
    pub kind: SimEventKind,
}

/// 内存中的事件收集器，仿真结束后可整体序列化
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
}

impl EventLog {
    pub fn push(&mut self, ev: SimEvent) {
        self.events.push(ev);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 按类型筛选事件
    pub fn kinds(&self) -> impl Iterator<Item = &SimEventKind> {
        self.events.iter().map(|ev| &ev.kind)
    }
}
