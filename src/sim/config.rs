//! 仿真配置

use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::net::AddressBlock;

/// 默认 ACK 往返时延（毫秒）
pub const DEFAULT_ACK_DELAY_MS: u64 = 2_000;

/// 仿真配置：地址块与每跳 ACK 时延
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub address_block: AddressBlock,
    #[serde(default = "default_ack_delay_ms")]
    pub ack_delay_ms: u64,
}

fn default_ack_delay_ms() -> u64 {
    DEFAULT_ACK_DELAY_MS
}

impl SimConfig {
    pub fn ack_delay(&self) -> SimTime {
        SimTime::from_millis(self.ack_delay_ms)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            address_block: AddressBlock::default(),
            ack_delay_ms: DEFAULT_ACK_DELAY_MS,
        }
    }
}
