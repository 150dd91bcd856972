//! 局域网路由/转发仿真
//!
//! 默认运行内置的双网段拓扑，也可以通过 `--topology` 读取 JSON 描述。

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use lansim_rs::net::{AddressBlock, Delivery, DeviceId, ForwardTarget, Network, Router};
use lansim_rs::sim::TopologySpec;
use lansim_rs::topo::two_segment::{build_two_segment, configure_two_segment};

#[derive(Debug, Parser)]
#[command(name = "lansim", about = "局域网仿真：地址分配、距离向量收敛与多跳转发")]
struct Args {
    /// 拓扑描述 JSON；缺省使用内置双网段拓扑
    #[arg(long)]
    topology: Option<PathBuf>,
    /// 地址块（CIDR），覆盖拓扑文件中的配置
    #[arg(long)]
    block: Option<AddressBlock>,
    /// 每跳 ACK 往返时延（毫秒）
    #[arg(long)]
    ack_delay_ms: Option<u64>,
    #[arg(long, default_value = "h6")]
    sender: String,
    #[arg(long, default_value = "h1")]
    receiver: String,
    /// 发起转发的路由器；缺省自动选择
    #[arg(long)]
    via: Option<String>,
    #[arg(long, default_value = "Hello, World!")]
    payload: String,
    #[arg(long, default_value_t = 2)]
    window_size: usize,
    /// 把事件日志写成 JSON
    #[arg(long)]
    events_json: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut net = match build_network(&args) {
        Ok(net) => net,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };
    net.emit_meta();

    print_devices(&net);

    let (Some(sender), Some(receiver)) = (lookup(&net, &args.sender), lookup(&net, &args.receiver))
    else {
        eprintln!("error: unknown sender {:?} or receiver {:?}", args.sender, args.receiver);
        process::exit(1);
    };

    let rt = net
        .transmit_stop_and_wait(sender, receiver, &args.payload)
        .expect("sender and receiver exist");
    println!("stop_and_wait from={} to={} acked_at_ms={}", rt.from.0, rt.to.0, rt.acked_at.as_millis());
    let rt = net
        .transmit_sliding_window(sender, receiver, &args.payload, args.window_size)
        .expect("sender and receiver exist");
    println!(
        "sliding_window from={} to={} window={} acked_at_ms={}",
        rt.from.0,
        rt.to.0,
        args.window_size,
        rt.acked_at.as_millis()
    );

    for (router, report) in net.converge_all() {
        println!(
            "converged router={} passes={} updated={}",
            router.0,
            report.passes,
            report.updated.len()
        );
    }
    print_routing_tables(&net);

    let via = match &args.via {
        Some(name) => lookup(&net, name),
        None => default_router(&net, receiver),
    };
    let Some(via) = via else {
        eprintln!("error: no router to forward from");
        process::exit(1);
    };

    match net.forward_data(via, sender, receiver, &args.payload) {
        Ok(report) => {
            let result = match report.delivery {
                Delivery::Delivered { router } => format!("delivered router={}", router.0),
                Delivery::HandedToNextHop { from, next_hop } => {
                    format!("handed_off from={} next_hop={}", from.0, next_hop.0)
                }
            };
            println!(
                "forward {result} hops={} segments={} done_at_ms={}",
                report.hops.len(),
                report.segments,
                net.now().as_millis()
            );
        }
        Err(err) => println!("forward failed: {err}"),
    }

    if let Some(path) = args.events_json {
        if let Some(log) = net.events.take() {
            let json = serde_json::to_string_pretty(&log.events).expect("serialize events");
            fs::write(&path, json).expect("write events json");
            eprintln!("wrote events to {}", path.display());
        }
    }
}

fn build_network(args: &Args) -> Result<Network, Box<dyn std::error::Error>> {
    let spec = match &args.topology {
        Some(path) => Some(TopologySpec::from_json(&fs::read_to_string(path)?)?),
        None => None,
    };

    let mut config = spec
        .as_ref()
        .and_then(|s| s.config)
        .unwrap_or_default();
    if let Some(block) = args.block {
        config.address_block = block;
    }
    if let Some(ms) = args.ack_delay_ms {
        config.ack_delay_ms = ms;
    }

    let mut net = Network::with_config(config);
    if args.events_json.is_some() {
        net.enable_events();
    }

    match spec {
        Some(spec) => Ok(spec.build_into(net)?),
        None => {
            let topo = build_two_segment(&mut net)?;
            net.assign_addresses()?;
            configure_two_segment(&mut net, &topo)?;
            Ok(net)
        }
    }
}

/// 设备名或标识符
fn lookup(net: &Network, reference: &str) -> Option<DeviceId> {
    if let Some(d) = net.device_by_name(reference) {
        return Some(d.id());
    }
    let id = DeviceId(reference.parse().ok()?);
    net.device(id).ok().map(|d| d.id())
}

/// 优先选择转发表把接收方指向下一跳的路由器，其次是任何含该条目的路由器
fn default_router(net: &Network, receiver: DeviceId) -> Option<DeviceId> {
    let addr = net.device(receiver).ok()?.address();
    let routers = || net.devices().iter().filter_map(|d| d.router());
    let entry = |r: &Router| addr.and_then(|a| r.forwarding_entry(a).cloned());
    routers()
        .find(|r| matches!(entry(*r), Some(ForwardTarget::Next(_))))
        .or_else(|| routers().find(|r| entry(*r).is_some()))
        .or_else(|| routers().next())
        .map(|r| r.id())
}

fn print_devices(net: &Network) {
    for d in net.devices() {
        let addr = d
            .address()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "device id={} name={} kind={} mac={} ip={}",
            d.id().0,
            d.name(),
            d.kind(),
            d.mac(),
            addr
        );
    }
}

fn print_routing_tables(net: &Network) {
    for d in net.devices() {
        let Some(router) = d.router() else {
            continue;
        };
        for (dst, entry) in router.routes() {
            println!("route router={} dst={} entry={}", d.name(), dst, entry);
        }
    }
}
