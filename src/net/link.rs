//! 连接类型
//!
//! 一条连接是两个设备之间的双向链路，拓扑为它建立两条有向索引。

use super::id::{DeviceId, LinkId};

/// 双向连接
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub id: LinkId,
    pub a: DeviceId,
    pub b: DeviceId,
}

impl Connection {
    pub fn new(id: LinkId, a: DeviceId, b: DeviceId) -> Self {
        Self { id, a, b }
    }

    /// 给定一端，返回另一端
    pub fn peer(&self, end: DeviceId) -> Option<DeviceId> {
        if end == self.a {
            Some(self.b)
        } else if end == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
