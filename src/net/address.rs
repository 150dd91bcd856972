//! 地址分配
//!
//! 从可配置的地址块（默认 192.168.0.0/24）为终端和路由器分配互不相同的地址。
//! 交换机、集线器、网桥不分配地址。

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::AddressError;
use super::id::DeviceId;
use super::network::Network;
use crate::report::SimEventKind;

/// 可分配的地址块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Ipv4Net", into = "Ipv4Net")]
pub struct AddressBlock(Ipv4Net);

impl AddressBlock {
    /// 最长前缀：/31 和 /32 没有可用主机地址
    pub const MAX_PREFIX: u8 = 30;

    pub fn new(net: Ipv4Net) -> Result<Self, AddressError> {
        if net.prefix_len() > Self::MAX_PREFIX {
            return Err(AddressError::InvalidPrefix(net.prefix_len()));
        }
        Ok(Self(net.trunc()))
    }

    pub fn net(&self) -> Ipv4Net {
        self.0
    }

    /// 第一个主机地址（网络地址 + 1）
    pub fn first_host(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.0.network()) + 1)
    }

    /// 最后一个主机地址（广播地址 - 1）
    pub fn last_host(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.0.broadcast()) - 1)
    }

    /// 可用主机地址数：2^(32-prefix) - 2
    pub fn capacity(&self) -> u64 {
        (1u64 << (32 - self.0.prefix_len())) - 2
    }

    /// 是否为块内主机地址
    pub fn contains_host(&self, addr: Ipv4Addr) -> bool {
        addr >= self.first_host() && addr <= self.last_host()
    }
}

impl Default for AddressBlock {
    fn default() -> Self {
        Self(Ipv4Net::new_assert(Ipv4Addr::new(192, 168, 0, 0), 24))
    }
}

impl TryFrom<Ipv4Net> for AddressBlock {
    type Error = AddressError;

    fn try_from(net: Ipv4Net) -> Result<Self, Self::Error> {
        AddressBlock::new(net)
    }
}

impl From<AddressBlock> for Ipv4Net {
    fn from(block: AddressBlock) -> Self {
        block.0
    }
}

impl FromStr for AddressBlock {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: Ipv4Net = s
            .parse()
            .map_err(|e: ipnet::AddrParseError| AddressError::InvalidBlock(format!("{s}: {e}")))?;
        AddressBlock::new(net)
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 一次分配的结果（按设备顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    pub assigned: Vec<(DeviceId, Ipv4Addr)>,
}

impl Network {
    /// 按设备列表顺序为需要地址的设备分配地址。
    ///
    /// 计数器从块内第一个主机地址开始、只前进不回退；跳过任何设备（包括基础设施）
    /// 已占用的地址。已有地址的设备保持不变。块耗尽时返回 `AddressExhausted`，
    /// 此前分配的地址保留。
    #[tracing::instrument(skip(self), fields(block = %self.config.address_block))]
    pub fn assign_addresses(&mut self) -> Result<AllocationReport, AddressError> {
        let block = self.config.address_block;
        let mut next = u32::from(block.first_host());
        let last = u32::from(block.last_host());
        let mut report = AllocationReport::default();

        let pending: Vec<DeviceId> = self
            .devices()
            .iter()
            .filter(|d| d.kind().is_addressable() && d.address().is_none())
            .map(|d| d.id())
            .collect();
        debug!(pending = pending.len(), capacity = block.capacity(), "开始分配地址");

        for (idx, id) in pending.iter().enumerate() {
            let addr = loop {
                if next > last {
                    let remaining = pending.len() - idx;
                    warn!(assigned = report.assigned.len(), remaining, "地址块耗尽");
                    self.emit(SimEventKind::AddressExhausted {
                        assigned: report.assigned.len(),
                        remaining,
                    });
                    return Err(AddressError::AddressExhausted {
                        assigned: report.assigned.len(),
                        remaining,
                    });
                }
                let candidate = Ipv4Addr::from(next);
                next += 1;
                if !self.address_in_use(candidate) {
                    break candidate;
                }
                debug!(%candidate, "地址已被占用，跳过");
            };

            self.device_mut(*id)?.address = Some(addr);
            info!(device = ?id, address = %addr, "分配地址");
            self.emit(SimEventKind::AddressAssigned {
                device: id.0,
                address: addr.to_string(),
            });
            report.assigned.push((*id, addr));
        }

        Ok(report)
    }

    /// 手动指定地址；地址必须在块内且未被占用。
    pub fn assign_address(&mut self, id: DeviceId, addr: Ipv4Addr) -> Result<(), AddressError> {
        if !self.config.address_block.contains_host(addr) {
            return Err(AddressError::OutOfBlock(addr));
        }
        if self
            .devices()
            .iter()
            .any(|d| d.id() != id && d.address() == Some(addr))
        {
            return Err(AddressError::AddressInUse(addr));
        }
        self.device_mut(id)?.address = Some(addr);
        debug!(device = ?id, address = %addr, "手动指定地址");
        self.emit(SimEventKind::AddressAssigned {
            device: id.0,
            address: addr.to_string(),
        });
        Ok(())
    }

    /// 地址是否已被任意设备占用
    pub fn address_in_use(&self, addr: Ipv4Addr) -> bool {
        self.devices().iter().any(|d| d.address() == Some(addr))
    }
}
