//! 数据传输仿真
//!
//! 每一跳都是一次「发送数据 -> 等待 ACK -> 收到 ACK」的往返。等待只推进仿真时钟，
//! 不真正阻塞；ACK 总会到达，不建模丢包、超时与重传。

use tracing::{debug, info};

use super::error::TopologyError;
use super::id::{DeviceId, LinkId};
use super::network::Network;
use crate::report::SimEventKind;
use crate::sim::SimTime;

/// 一次 ACK 往返
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckRoundTrip {
    pub from: DeviceId,
    pub to: DeviceId,
    /// 两端之间的连接；路由器按路由表跳到非相邻路由器时为 None
    pub link: Option<LinkId>,
    pub sent_at: SimTime,
    pub acked_at: SimTime,
}

impl Network {
    /// 仿真一跳并推进时钟
    pub(crate) fn simulate_hop(&mut self, from: DeviceId, to: DeviceId, payload: &str) -> AckRoundTrip {
        let link = self.connection(from, to);
        let sent_at = self.clock;
        self.emit(SimEventKind::DataSent {
            from: from.0,
            to: to.0,
            link: link.map(|l| l.0),
            payload: payload.to_string(),
        });
        debug!(from = ?from, to = ?to, link = ?link, "发送数据，等待 ACK");

        self.clock = self.clock.saturating_add(self.config.ack_delay());
        self.emit(SimEventKind::AckReceived {
            from: to.0,
            to: from.0,
        });
        debug!(from = ?to, at = ?self.clock, "收到 ACK");

        AckRoundTrip {
            from,
            to,
            link,
            sent_at,
            acked_at: self.clock,
        }
    }

    /// 停等协议：一次数据发送、一次 ACK
    #[tracing::instrument(skip(self, payload))]
    pub fn transmit_stop_and_wait(
        &mut self,
        sender: DeviceId,
        receiver: DeviceId,
        payload: &str,
    ) -> Result<AckRoundTrip, TopologyError> {
        self.device(sender)?;
        self.device(receiver)?;
        info!("停等传输");
        Ok(self.simulate_hop(sender, receiver, payload))
    }

    /// 滑动窗口传输。
    ///
    /// 目前与停等协议行为一致：只做一次往返，`window_size` 仅记录在日志中。
    #[tracing::instrument(skip(self, payload))]
    pub fn transmit_sliding_window(
        &mut self,
        sender: DeviceId,
        receiver: DeviceId,
        payload: &str,
        window_size: usize,
    ) -> Result<AckRoundTrip, TopologyError> {
        self.device(sender)?;
        self.device(receiver)?;
        info!(window_size, "滑动窗口传输");
        Ok(self.simulate_hop(sender, receiver, payload))
    }
}
