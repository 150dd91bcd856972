use crate::net::{DeviceId, DeviceKind, Network, TopologyError};

#[test]
fn device_ids_follow_insertion_order_and_never_collide() {
    let mut net = Network::new();
    let ids: Vec<DeviceId> = (0..50).map(|i| net.add_host(format!("h{i}"))).collect();
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(*id, DeviceId(i));
    }
    let macs: std::collections::HashSet<String> =
        net.devices().iter().map(|d| d.mac().to_string()).collect();
    assert_eq!(macs.len(), 50);
    assert_eq!(net.devices()[1].mac().to_string(), "00:00:00:00:00:01");
}

#[test]
fn connect_is_symmetric() {
    let mut net = Network::new();
    let a = net.add_host("a");
    let b = net.add_host("b");
    let link = net.connect(a, b).expect("connect");

    assert_eq!(net.neighbors(a), vec![b]);
    assert_eq!(net.neighbors(b), vec![a]);
    assert_eq!(net.connection(a, b), Some(link));
    assert_eq!(net.connection(b, a), Some(link));
}

#[test]
fn neighbors_follow_connection_creation_order() {
    let mut net = Network::new();
    let hub = net.add_hub("hub");
    let a = net.add_host("a");
    let b = net.add_host("b");
    let c = net.add_host("c");
    net.connect(hub, c).unwrap();
    net.connect(a, hub).unwrap();
    net.connect(hub, b).unwrap();

    assert_eq!(net.neighbors(hub), vec![c, a, b]);
    assert!(net.neighbors(DeviceId(99)).is_empty());
}

#[test]
fn duplicate_connect_overwrites_index_without_duplicating_neighbors() {
    let mut net = Network::new();
    let a = net.add_host("a");
    let b = net.add_host("b");
    let first = net.connect(a, b).unwrap();
    let second = net.connect(b, a).unwrap();

    assert_ne!(first, second);
    assert_eq!(net.neighbors(a), vec![b]);
    assert_eq!(net.neighbors(b), vec![a]);
    assert_eq!(net.connection(a, b), Some(second));
    assert_eq!(net.links().len(), 2);
}

#[test]
fn connect_rejects_self_and_unknown_devices() {
    let mut net = Network::new();
    let a = net.add_host("a");
    assert_eq!(net.connect(a, a), Err(TopologyError::SelfConnection(a)));
    assert_eq!(
        net.connect(a, DeviceId(7)),
        Err(TopologyError::UnknownDevice(DeviceId(7)))
    );
    assert!(net.neighbors(a).is_empty());
}

#[test]
fn capabilities_by_kind() {
    assert!(DeviceKind::Host.is_end_host());
    assert!(DeviceKind::Host.is_addressable());
    assert!(DeviceKind::Router.participates_in_routing());
    assert!(DeviceKind::Router.has_forwarding_table());
    assert!(DeviceKind::Router.is_addressable());
    for kind in [DeviceKind::Switch, DeviceKind::Hub, DeviceKind::Bridge] {
        assert!(kind.is_infrastructure());
        assert!(!kind.is_addressable());
        assert!(!kind.participates_in_routing());
    }
}

#[test]
fn only_routers_carry_routing_state() {
    let mut net = Network::new();
    let h = net.add_host("h");
    let r = net.add_router("r");

    assert!(net.router(r).is_ok());
    assert_eq!(net.router(h).unwrap_err(), TopologyError::NotARouter(h));
    assert!(net.router_by_id(r).is_some());
    assert!(net.router_by_id(h).is_none());
    assert_eq!(net.device_by_name("r").map(|d| d.id()), Some(r));
}

#[test]
fn router_by_address_ignores_non_routers() {
    let mut net = Network::new();
    let h = net.add_host("h");
    let r = net.add_router("r");
    net.assign_addresses().unwrap();

    let h_addr = net.device(h).unwrap().address().unwrap();
    let r_addr = net.device(r).unwrap().address().unwrap();
    assert!(net.router_by_address(h_addr).is_none());
    assert_eq!(net.router_by_address(r_addr).map(|d| d.id()), Some(r));
}

#[test]
fn token_passes_switch_ports_in_attach_order() {
    let mut net = Network::new();
    let sw = net.add_switch("s");
    let a = net.add_host("a");
    let b = net.add_host("b");
    let h = net.add_hub("hub");

    assert_eq!(net.token_passing(sw), Err(TopologyError::NoAttachedDevices(sw)));

    net.attach(sw, b).unwrap();
    net.attach(sw, a).unwrap();
    assert_eq!(net.token_passing(sw).unwrap(), vec![b, a]);
    assert_eq!(net.neighbors(sw), vec![b, a]);

    assert_eq!(net.attach(h, a), Err(TopologyError::NotASwitch(h)));
    assert_eq!(net.token_passing(h), Err(TopologyError::NotASwitch(h)));
}
