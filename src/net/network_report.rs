//! 网络的事件记录钩子

use crate::report::{DeviceInfo, LinkInfo, SimEvent, SimEventKind};

use super::Network;

impl Network {
    /// 打开事件记录（已打开时保持不变）
    pub fn enable_events(&mut self) {
        self.events.get_or_insert_with(Default::default);
    }

    pub(crate) fn emit(&mut self, kind: SimEventKind) {
        let t_ns = self.clock.0;
        if let Some(log) = &mut self.events {
            log.push(SimEvent { t_ns, kind });
        }
    }

    /// 记录当前拓扑快照
    pub fn emit_meta(&mut self) {
        if self.events.is_none() {
            return;
        }
        let devices = self
            .devices()
            .iter()
            .map(|d| DeviceInfo {
                id: d.id().0,
                name: d.name().to_string(),
                kind: d.kind(),
                mac: d.mac().to_string(),
                address: d.address().map(|a| a.to_string()),
            })
            .collect();
        let links = self
            .links()
            .iter()
            .map(|l| LinkInfo {
                id: l.id.0,
                a: l.a.0,
                b: l.b.0,
            })
            .collect();
        self.emit(SimEventKind::Meta { devices, links });
    }
}
