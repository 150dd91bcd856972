use std::net::Ipv4Addr;

use crate::net::{
    Delivery, DeviceId, ForwardError, ForwardTarget, ForwardingTable, Network, TopologyError,
};
use crate::report::SimEventKind;
use crate::sim::SimTime;
use crate::topo::two_segment::{TwoSegment, build_two_segment, configure_two_segment};

fn two_segment() -> (Network, TwoSegment) {
    let mut net = Network::new();
    let topo = build_two_segment(&mut net).unwrap();
    net.assign_addresses().unwrap();
    configure_two_segment(&mut net, &topo).unwrap();
    (net, topo)
}

fn addr(net: &Network, id: DeviceId) -> Ipv4Addr {
    net.device(id).unwrap().address().expect("addressed")
}

fn data_sent(net: &Network) -> usize {
    net.events
        .as_ref()
        .map(|log| {
            log.kinds()
                .filter(|k| matches!(k, SimEventKind::DataSent { .. }))
                .count()
        })
        .unwrap_or(0)
}

#[test]
fn missing_forwarding_entry_stops_without_transmitting() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let x = net.add_host("x");
    let s = net.add_host("s");
    net.connect(r1, x).unwrap();
    net.assign_addresses().unwrap();
    net.enable_events();

    let err = net.forward_data(r1, s, x, "hi").unwrap_err();
    assert_eq!(
        err,
        ForwardError::NoForwardingEntry {
            router: r1,
            destination: Some(addr(&net, x)),
        }
    );
    assert_eq!(data_sent(&net), 0);
    assert_eq!(net.now(), SimTime::ZERO);
}

#[test]
fn local_entry_delivers_with_zero_hops() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let x = net.add_host("x");
    let s = net.add_host("s");
    net.assign_addresses().unwrap();
    let x_addr = addr(&net, x);
    net.set_forwarding_table(r1, ForwardingTable::from([(x_addr, ForwardTarget::Local)]))
        .unwrap();

    let report = net.forward_data(r1, s, x, "hi").unwrap();
    assert_eq!(report.delivery, Delivery::Delivered { router: r1 });
    assert!(report.hops.is_empty());
    assert_eq!(report.segments, 0);
    assert_eq!(net.now(), SimTime::ZERO);
}

#[test]
fn unaddressed_receiver_has_no_forwarding_entry() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let s = net.add_host("s");
    let x = net.add_host("x");

    let err = net.forward_data(r1, s, x, "hi").unwrap_err();
    assert_eq!(
        err,
        ForwardError::NoForwardingEntry {
            router: r1,
            destination: None,
        }
    );
    assert!(err.to_string().contains("unaddressed"));
}

#[test]
fn forwarding_from_a_non_router_is_rejected() {
    let mut net = Network::new();
    let h = net.add_host("h");
    let err = net.forward_data(h, h, h, "hi").unwrap_err();
    assert_eq!(err, ForwardError::Topology(TopologyError::NotARouter(h)));
}

fn forward_failed(net: &Network) -> usize {
    net.events
        .as_ref()
        .map(|log| {
            log.kinds()
                .filter(|k| matches!(k, SimEventKind::ForwardFailed { .. }))
                .count()
        })
        .unwrap_or(0)
}

#[test]
fn unknown_sender_or_receiver_is_reported_as_forward_failure() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let s = net.add_host("s");
    net.assign_addresses().unwrap();
    net.enable_events();
    let ghost = DeviceId(99);

    let err = net.forward_data(r1, s, ghost, "hi").unwrap_err();
    assert_eq!(err, ForwardError::Topology(TopologyError::UnknownDevice(ghost)));
    assert_eq!(forward_failed(&net), 1);

    let err = net.forward_data(r1, ghost, s, "hi").unwrap_err();
    assert_eq!(err, ForwardError::Topology(TopologyError::UnknownDevice(ghost)));
    assert_eq!(forward_failed(&net), 2);
    assert_eq!(data_sent(&net), 0);
}

#[test]
fn data_crosses_both_segments_of_the_two_segment_network() {
    let (mut net, topo) = two_segment();
    net.enable_events();
    net.converge_all();

    let [_, hub2] = topo.hubs;
    let [_, s2] = topo.switches;
    let [r1, r2] = topo.routers;
    let (h1, h6) = (topo.hosts[0], topo.hosts[5]);

    let report = net.forward_data(r2, h6, h1, "Hello, World!").unwrap();
    assert_eq!(report.delivery, Delivery::Delivered { router: r1 });
    assert_eq!(report.segments, 1);

    let hops: Vec<(DeviceId, DeviceId)> = report.hops.iter().map(|h| (h.from, h.to)).collect();
    assert_eq!(hops, vec![(h6, hub2), (hub2, s2), (s2, r2), (r2, r1)]);
    assert!(report.hops.iter().all(|h| h.link.is_some()));
    assert_eq!(net.now(), SimTime::from_secs(8));
    assert_eq!(data_sent(&net), 4);
}

#[test]
fn link_identifier_that_names_no_router_is_not_found() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let s = net.add_host("s");
    let x = net.add_host("x");
    net.assign_addresses().unwrap();
    let x_addr = addr(&net, x);
    net.set_forwarding_table(r1, ForwardingTable::from([(x_addr, ForwardTarget::from("eth0"))]))
        .unwrap();

    let err = net.forward_data(r1, s, x, "hi").unwrap_err();
    assert_eq!(
        err,
        ForwardError::NextHopNotFound {
            router: r1,
            next_hop: "eth0".to_string(),
        }
    );

    // 地址属于主机而不是路由器，同样找不到
    let s_addr = addr(&net, s).to_string();
    net.set_forwarding_table(r1, ForwardingTable::from([(x_addr, ForwardTarget::Next(s_addr))]))
        .unwrap();
    assert!(matches!(
        net.forward_data(r1, s, x, "hi"),
        Err(ForwardError::NextHopNotFound { .. })
    ));
}

#[test]
fn hub_sender_hands_data_straight_to_next_hop() {
    let mut net = Network::new();
    let hub = net.add_hub("hub");
    let r1 = net.add_router("r1");
    let r2 = net.add_router("r2");
    let x = net.add_host("x");
    net.connect(hub, r1).unwrap();
    net.assign_addresses().unwrap();
    let x_addr = addr(&net, x);
    let r2_addr = addr(&net, r2).to_string();
    net.set_forwarding_table(r1, ForwardingTable::from([(x_addr, ForwardTarget::Next(r2_addr))]))
        .unwrap();

    let report = net.forward_data(r1, hub, x, "hi").unwrap();
    assert_eq!(
        report.delivery,
        Delivery::HandedToNextHop {
            from: hub,
            next_hop: r2
        }
    );
    assert_eq!(report.hops.len(), 1);
    // 集线器到路由器不算路由器之间的段
    assert_eq!(report.segments, 0);
    assert_eq!(report.hops[0].from, hub);
    assert_eq!(report.hops[0].to, r2);
    assert_eq!(report.hops[0].link, None);
    assert_eq!(net.now(), SimTime::from_secs(2));
}

#[test]
fn unreachable_next_hop_router_reports_no_path() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let r2 = net.add_router("r2");
    let s = net.add_host("s");
    let x = net.add_host("x");
    net.connect(s, r1).unwrap();
    net.assign_addresses().unwrap();
    let x_addr = addr(&net, x);
    let r2_addr = addr(&net, r2).to_string();
    net.set_forwarding_table(r1, ForwardingTable::from([(x_addr, ForwardTarget::Next(r2_addr))]))
        .unwrap();

    let err = net.forward_data(r1, s, x, "hi").unwrap_err();
    assert_eq!(err, ForwardError::NoPathToNextHop { from: s, next_hop: r2 });
}

#[test]
fn routers_pointing_at_each_other_are_detected_as_a_loop() {
    let mut net = Network::new();
    let r1 = net.add_router("r1");
    let r2 = net.add_router("r2");
    let s = net.add_host("s");
    let x = net.add_host("x");
    net.connect(s, r1).unwrap();
    net.connect(r1, r2).unwrap();
    net.assign_addresses().unwrap();
    net.enable_events();

    let (r1_addr, r2_addr, x_addr) = (addr(&net, r1), addr(&net, r2), addr(&net, x));
    net.add_route(r1, r2_addr, r2).unwrap();
    net.add_route(r2, r1_addr, r1).unwrap();
    net.set_forwarding_table(
        r1,
        ForwardingTable::from([(x_addr, ForwardTarget::Next(r2_addr.to_string()))]),
    )
    .unwrap();
    net.set_forwarding_table(
        r2,
        ForwardingTable::from([(x_addr, ForwardTarget::Next(r1_addr.to_string()))]),
    )
    .unwrap();

    let err = net.forward_data(r1, s, x, "hi").unwrap_err();
    assert_eq!(err, ForwardError::ForwardingLoop(r1));
    // s->r1, r1->r2, r2->r1 都已仿真
    assert_eq!(data_sent(&net), 3);

    assert_eq!(forward_failed(&net), 1);
}

#[test]
fn failed_forward_does_not_poison_later_calls() {
    let (mut net, topo) = two_segment();
    let [r1, r2] = topo.routers;
    let (h1, h6) = (topo.hosts[0], topo.hosts[5]);

    // 集线器没有地址
    assert!(net.forward_data(r1, h1, topo.hubs[0], "x").is_err());
    // 未收敛也能转发：r2 到 r1 的静态路由已足够
    let report = net.forward_data(r2, h6, h1, "x").unwrap();
    assert_eq!(report.delivery, Delivery::Delivered { router: r1 });
}
