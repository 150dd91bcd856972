//! 多跳转发仿真
//!
//! 路由器查转发表得到下一跳路由器，用最短路径把数据送到该路由器，
//! 然后在下一跳路由器上继续，直到某一段的转发表给出 `local`。

use std::net::Ipv4Addr;

use tracing::{info, warn};

use super::device::DeviceKind;
use super::error::ForwardError;
use super::id::DeviceId;
use super::network::Network;
use super::routing::ForwardTarget;
use super::transmit::AckRoundTrip;
use crate::report::SimEventKind;

/// 转发结束的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// `router` 的转发表把目的地标为 local
    Delivered { router: DeviceId },
    /// 发送方是集线器：直接交给下一跳路由器后结束
    HandedToNextHop { from: DeviceId, next_hop: DeviceId },
}

/// 一次转发的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReport {
    pub delivery: Delivery,
    /// 依次仿真的每一跳
    pub hops: Vec<AckRoundTrip>,
    /// 路由器之间走过的段数；集线器交给下一跳的那一跳不计入
    pub segments: usize,
}

impl Network {
    /// 从 `router` 开始，把 `sender` 发往 `receiver` 的数据逐段转发。
    ///
    /// 任一段失败都会终止本次转发；已仿真的跳仍然记录在事件日志中。
    #[tracing::instrument(skip(self, payload))]
    pub fn forward_data(
        &mut self,
        router: DeviceId,
        sender: DeviceId,
        receiver: DeviceId,
        payload: &str,
    ) -> Result<ForwardReport, ForwardError> {
        if let Err(err) = self.device(sender) {
            return Err(self.forward_failed(router, err.into()));
        }
        let destination = match self.device(receiver) {
            Ok(d) => d.address(),
            Err(err) => return Err(self.forward_failed(router, err.into())),
        };
        info!(?destination, "开始转发");

        let mut hops = Vec::new();
        let mut visited: Vec<DeviceId> = Vec::new();
        let mut via = router;
        let mut from = sender;

        loop {
            if visited.contains(&via) {
                return Err(self.forward_failed(via, ForwardError::ForwardingLoop(via)));
            }
            visited.push(via);

            let target = match self.forwarding_target(via, destination) {
                Ok(target) => target,
                Err(err) => return Err(self.forward_failed(via, err)),
            };

            let next_hop = match target {
                ForwardTarget::Local => {
                    info!(router = ?via, hops = hops.len(), "✅ 数据到达目的地");
                    self.emit(SimEventKind::Delivered {
                        router: via.0,
                        destination: destination.map(|a| a.to_string()).unwrap_or_default(),
                    });
                    return Ok(ForwardReport {
                        delivery: Delivery::Delivered { router: via },
                        hops,
                        segments: visited.len() - 1,
                    });
                }
                ForwardTarget::Next(label) => match self.resolve_next_hop(&label) {
                    Some(id) => id,
                    None => {
                        let err = ForwardError::NextHopNotFound {
                            router: via,
                            next_hop: label,
                        };
                        return Err(self.forward_failed(via, err));
                    }
                },
            };

            let from_kind = match self.device(from) {
                Ok(d) => d.kind(),
                Err(err) => return Err(self.forward_failed(via, err.into())),
            };
            if from_kind == DeviceKind::Hub {
                hops.push(self.simulate_hop(from, next_hop, payload));
                info!(hub = ?from, next_hop = ?next_hop, "集线器直接交给下一跳");
                return Ok(ForwardReport {
                    delivery: Delivery::HandedToNextHop { from, next_hop },
                    hops,
                    segments: visited.len() - 1,
                });
            }

            let path = self.find_shortest_path(from, next_hop);
            if path.is_empty() {
                let err = ForwardError::NoPathToNextHop { from, next_hop };
                return Err(self.forward_failed(via, err));
            }
            for pair in path.windows(2) {
                hops.push(self.simulate_hop(pair[0], pair[1], payload));
            }

            from = next_hop;
            via = next_hop;
        }
    }

    fn forwarding_target(
        &self,
        router: DeviceId,
        destination: Option<Ipv4Addr>,
    ) -> Result<ForwardTarget, ForwardError> {
        let rt = self.router(router)?;
        destination
            .and_then(|addr| rt.forwarding_entry(addr))
            .cloned()
            .ok_or(ForwardError::NoForwardingEntry {
                router,
                destination,
            })
    }

    /// 邻居链路标识只有在是某个路由器的地址时才能解析
    fn resolve_next_hop(&self, label: &str) -> Option<DeviceId> {
        let addr: Ipv4Addr = label.parse().ok()?;
        self.router_by_address(addr).map(|d| d.id())
    }

    fn forward_failed(&mut self, router: DeviceId, err: ForwardError) -> ForwardError {
        warn!(router = ?router, error = %err, "转发失败");
        self.emit(SimEventKind::ForwardFailed {
            router: router.0,
            reason: err.to_string(),
        });
        err
    }
}
