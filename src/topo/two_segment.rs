//! 双网段拓扑构建
//!
//! 拓扑结构：
//!
//! ```text
//! h1,h2,h3 -- hub1 -- s1 -- r1 -- r2 -- s2 -- hub2 -- h4,h5,h6
//! ```

use crate::net::{DeviceId, ForwardTarget, ForwardingTable, Network, TopologyError};

/// 双网段拓扑中各设备的标识符
#[derive(Debug, Clone)]
pub struct TwoSegment {
    pub hubs: [DeviceId; 2],
    pub switches: [DeviceId; 2],
    pub routers: [DeviceId; 2],
    /// h1..h6；前三个在 r1 一侧，后三个在 r2 一侧
    pub hosts: [DeviceId; 6],
}

impl TwoSegment {
    pub fn left_hosts(&self) -> &[DeviceId] {
        &self.hosts[..3]
    }

    pub fn right_hosts(&self) -> &[DeviceId] {
        &self.hosts[3..]
    }
}

/// 构建双网段拓扑（只添加设备与连接，不分配地址）
pub fn build_two_segment(net: &mut Network) -> Result<TwoSegment, TopologyError> {
    let hub1 = net.add_hub("hub1");
    let hub2 = net.add_hub("hub2");
    let s1 = net.add_switch("s1");
    let s2 = net.add_switch("s2");
    let r1 = net.add_router("r1");
    let r2 = net.add_router("r2");
    let hosts = [
        net.add_host("h1"),
        net.add_host("h2"),
        net.add_host("h3"),
        net.add_host("h4"),
        net.add_host("h5"),
        net.add_host("h6"),
    ];

    for &h in &hosts[..3] {
        net.connect(hub1, h)?;
    }
    net.connect(s1, hub1)?;
    net.connect(s1, r1)?;
    net.connect(r1, r2)?;
    net.connect(r2, s2)?;
    net.connect(s2, hub2)?;
    for &h in &hosts[3..] {
        net.connect(hub2, h)?;
    }

    Ok(TwoSegment {
        hubs: [hub1, hub2],
        switches: [s1, s2],
        routers: [r1, r2],
        hosts,
    })
}

/// 写入路由器配置（需在地址分配之后调用）。
///
/// - 两台路由器互为静态路由；
/// - 对端网段的主机通过距离向量通告学习，等待收敛；
/// - 本侧主机在转发表中为 local，对端主机指向对端路由器地址。
pub fn configure_two_segment(net: &mut Network, topo: &TwoSegment) -> Result<(), TopologyError> {
    let [r1, r2] = topo.routers;
    let r1_addr = net.device(r1)?.address();
    let r2_addr = net.device(r2)?.address();

    if let Some(addr) = r2_addr {
        net.add_route(r1, addr, r2)?;
    }
    if let Some(addr) = r1_addr {
        net.add_route(r2, addr, r1)?;
    }

    for (router, peer, remote) in [
        (r1, r2, topo.right_hosts()),
        (r2, r1, topo.left_hosts()),
    ] {
        let vector: Vec<_> = remote
            .iter()
            .filter_map(|&h| net.device(h).ok()?.address())
            .map(|addr| (addr, 1))
            .collect();
        net.update_routing_table(router, peer, &vector)?;
    }

    for (router, local, remote, peer_addr) in [
        (r1, topo.left_hosts(), topo.right_hosts(), r2_addr),
        (r2, topo.right_hosts(), topo.left_hosts(), r1_addr),
    ] {
        let mut table = ForwardingTable::new();
        for &h in local {
            if let Some(addr) = net.device(h)?.address() {
                table.insert(addr, ForwardTarget::Local);
            }
        }
        if let Some(peer) = peer_addr {
            for &h in remote {
                if let Some(addr) = net.device(h)?.address() {
                    table.insert(addr, ForwardTarget::Next(peer.to_string()));
                }
            }
        }
        net.set_forwarding_table(router, table)?;
    }

    Ok(())
}
