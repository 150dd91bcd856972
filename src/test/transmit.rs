use crate::net::{DeviceId, Network, TopologyError};
use crate::report::SimEventKind;
use crate::sim::{SimConfig, SimTime};

#[test]
fn stop_and_wait_and_sliding_window_are_single_round_trips() {
    let mut net = Network::new();
    let a = net.add_host("a");
    let b = net.add_host("b");
    let link = net.connect(a, b).unwrap();

    let sw = net.transmit_stop_and_wait(a, b, "hello").unwrap();
    assert_eq!((sw.from, sw.to, sw.link), (a, b, Some(link)));
    assert_eq!(sw.sent_at, SimTime::ZERO);
    assert_eq!(sw.acked_at, SimTime::from_secs(2));

    let win = net.transmit_sliding_window(a, b, "hello", 8).unwrap();
    assert_eq!((win.from, win.to, win.link), (a, b, Some(link)));
    assert_eq!(win.acked_at.0 - win.sent_at.0, sw.acked_at.0 - sw.sent_at.0);
    assert_eq!(net.now(), SimTime::from_secs(4));
}

#[test]
fn ack_delay_comes_from_config() {
    let mut net = Network::with_config(SimConfig {
        ack_delay_ms: 5,
        ..SimConfig::default()
    });
    let a = net.add_host("a");
    let b = net.add_host("b");

    let rt = net.transmit_stop_and_wait(a, b, "x").unwrap();
    assert_eq!(rt.link, None);
    assert_eq!(rt.acked_at, SimTime::from_millis(5));
}

#[test]
fn transmit_to_unknown_device_fails() {
    let mut net = Network::new();
    let a = net.add_host("a");
    assert_eq!(
        net.transmit_stop_and_wait(a, DeviceId(3), "x"),
        Err(TopologyError::UnknownDevice(DeviceId(3)))
    );
    assert_eq!(net.now(), SimTime::ZERO);
}

#[test]
fn each_round_trip_records_send_and_ack() {
    let mut net = Network::new();
    net.enable_events();
    let a = net.add_host("a");
    let b = net.add_host("b");
    net.transmit_sliding_window(a, b, "payload", 2).unwrap();

    let log = net.events.as_ref().unwrap();
    let kinds: Vec<_> = log.kinds().cloned().collect();
    assert_eq!(
        kinds,
        vec![
            SimEventKind::DataSent {
                from: a.0,
                to: b.0,
                link: None,
                payload: "payload".to_string(),
            },
            SimEventKind::AckReceived { from: b.0, to: a.0 },
        ]
    );
    assert_eq!(log.events[0].t_ns, 0);
    assert_eq!(log.events[1].t_ns, SimTime::from_secs(2).0);
}
