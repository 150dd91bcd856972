//! 最短路径搜索
//!
//! 均匀代价搜索（每条边代价为 1），感知设备类型：
//! - 当前节点与邻居都是路由器时，不把邻居当作普通边，而是查当前路由器的路由表：
//!   目的地址有下一跳且不是自己时，把下一跳路由器以 cost+1 入队；否则跳过该邻居。
//! - 其余情况按原始邻接关系展开。

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::net::Ipv4Addr;

use tracing::{debug, trace};

use super::device::Device;
use super::id::DeviceId;
use super::network::Network;

/// 搜索前沿条目
struct Frontier {
    cost: u32,
    at: DeviceId,
    /// 入队序号：同一设备以相同代价多次入队时，先入队者先出
    seq: u64,
    path: Vec<DeviceId>,
}

// BinaryHeap 是 max-heap；需要最小代价优先，代价相同按设备插入顺序、再按入队顺序，因此反向比较。
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then(self.at.cmp(&other.at))
            .then(self.seq.cmp(&other.seq))
            .reverse()
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Frontier {}

impl Network {
    /// 从 `source` 到 `destination` 的最短路径（含两端）；不可达时返回空。
    #[tracing::instrument(skip(self))]
    pub fn find_shortest_path(&self, source: DeviceId, destination: DeviceId) -> Vec<DeviceId> {
        let Ok(dst) = self.device(destination) else {
            return Vec::new();
        };
        if self.device(source).is_err() {
            return Vec::new();
        }
        let dst_addr = dst.address();

        let mut heap = BinaryHeap::new();
        let mut visited = HashSet::new();
        let mut seq = 0u64;
        heap.push(Frontier {
            cost: 0,
            at: source,
            seq,
            path: Vec::new(),
        });

        while let Some(Frontier { cost, at, mut path, .. }) = heap.pop() {
            if at == destination {
                path.push(at);
                debug!(cost, hops = path.len() - 1, "找到路径");
                return path;
            }
            if !visited.insert(at) {
                continue;
            }

            let Ok(current) = self.device(at) else {
                continue;
            };
            path.push(at);

            for neighbor in self.neighbors(at) {
                let both_routers = current.is_router()
                    && self.device(neighbor).is_ok_and(|d| d.is_router());
                let next = if both_routers {
                    match self.routed_next_hop(current, dst_addr) {
                        Some(next) => next,
                        None => {
                            trace!(from = ?at, neighbor = ?neighbor, "路由表未允许该路由器间的边");
                            continue;
                        }
                    }
                } else {
                    neighbor
                };
                seq += 1;
                heap.push(Frontier {
                    cost: cost + 1,
                    at: next,
                    seq,
                    path: path.clone(),
                });
            }
        }

        debug!("不可达");
        Vec::new()
    }

    /// 当前路由器路由表给出的、可解析为路由器的下一跳
    fn routed_next_hop(&self, current: &Device, destination: Option<Ipv4Addr>) -> Option<DeviceId> {
        let next = current
            .router()?
            .route(destination?)?
            .next_hop()
            .filter(|&id| id != current.id())?;
        self.router_by_id(next).map(|d| d.id())
    }
}
