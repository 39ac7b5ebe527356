mod analyze;
mod capture;
mod export;
mod models;
mod utils;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{info, warn};

use crate::analyze::{build_prompt, ExplainClient};
use crate::capture::engine::{CaptureEngine, EngineState};
use crate::capture::interfaces;
use crate::export::csv::write_csv_file;
use crate::export::pcap::write_pcap_file;
use crate::models::config::CaptureConfig;
use crate::models::flow::ConversationTracker;
use crate::models::stats::StatsAggregator;
use crate::utils::logging;

#[derive(Parser, Debug)]
#[clap(version, about = "Live packet capture with flow tracking and protocol statistics")]
struct Args {
    /// Network interface to capture from
    #[clap(short, long)]
    interface: Option<String>,

    /// BPF filter expression (a compile failure is non-fatal)
    #[clap(short, long)]
    filter: Option<String>,

    /// Stop after this many packets (0 = unlimited)
    #[clap(short = 'c', long, default_value = "0")]
    limit: u64,

    /// Disable promiscuous mode
    #[clap(long)]
    no_promiscuous: bool,

    /// Drain interval for consumers, in milliseconds
    #[clap(long, default_value = "100")]
    drain_ms: u64,

    /// Trailing window for the rolling packet rate, in seconds
    #[clap(long, default_value = "1")]
    rate_window: u64,

    /// List capture-capable interfaces and exit
    #[clap(long)]
    list_interfaces: bool,

    /// Write the session history as a PCAP file on exit
    #[clap(long)]
    export_pcap: Option<PathBuf>,

    /// Write the session history as CSV on exit
    #[clap(long)]
    export_csv: Option<PathBuf>,

    /// Ask the explanation service about the last captured packet
    #[clap(long)]
    explain_last: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logger(logging::get_log_level(&args.log_level));

    info!("starting packetcat v{}", env!("CARGO_PKG_VERSION"));

    if args.list_interfaces {
        for info in interfaces::list_interfaces() {
            println!("{}", info.formatted_display());
        }
        return Ok(());
    }

    let interface = args
        .interface
        .clone()
        .ok_or_else(|| anyhow!("no interface specified; use --interface or --list-interfaces"))?;

    let config = CaptureConfig {
        interface,
        filter: args.filter.clone(),
        limit: args.limit,
        promiscuous: !args.no_promiscuous,
        ..CaptureConfig::default()
    };

    let (mut engine, mut status_rx) = CaptureEngine::new();
    engine.start(config)?;

    let queue = engine.queue();
    let mut conversations = ConversationTracker::new();
    let mut stats = StatsAggregator::new(args.rate_window);
    let session_start = Instant::now();

    // Consumers drain on a fixed interval; the capture thread is never
    // blocked by them.
    let mut ticker = tokio::time::interval(Duration::from_millis(args.drain_ms.max(10)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping capture");
                engine.stop();
            }
            _ = ticker.tick() => {
                while let Ok(msg) = status_rx.try_recv() {
                    info!("{}", msg);
                }
                for packet in queue.drain() {
                    stats.record(&packet);
                    conversations.record(&packet);
                    println!(
                        "{:>5}  {}  +{}ms  {:<8} {:>21} -> {:<21} {:>5}B  risk {:.1}",
                        packet.seq,
                        packet.timestamp.format("%H:%M:%S%.3f"),
                        packet.delta_ms,
                        packet.protocol,
                        packet.source_endpoint(),
                        packet.destination_endpoint(),
                        packet.length,
                        packet.risk_score,
                    );
                }
                if engine.state() == EngineState::Closed && queue.is_empty() {
                    break;
                }
            }
        }
    }

    engine.join();
    stats.finish();
    while let Ok(msg) = status_rx.try_recv() {
        info!("{}", msg);
    }

    let snapshot = stats.snapshot(session_start.elapsed().as_millis() as u64);
    info!(
        "session finished: {} packets, {} bytes",
        snapshot.total_packets, snapshot.total_bytes
    );
    let mut protocols: Vec<_> = snapshot.protocols.iter().collect();
    protocols.sort_by(|a, b| b.1.cmp(a.1));
    for (protocol, count) in protocols {
        info!("  {:<8} {}", protocol, count);
    }

    let mut convs: Vec<_> = conversations.iter().map(|(_, c)| c.clone()).collect();
    convs.sort_by(|a, b| b.packet_count.cmp(&a.packet_count));
    info!("{} conversations tracked", convs.len());
    for conv in convs.iter().take(10) {
        info!(
            "  {} {}:{} <-> {}:{}  {} packets, {} bytes",
            conv.protocol,
            conv.src_addr,
            conv.src_port,
            conv.dst_addr,
            conv.dst_port,
            conv.packet_count,
            conv.total_bytes,
        );
    }

    let history = engine.store().ordered();
    if let Some(path) = &args.export_pcap {
        write_pcap_file(path, engine.link_kind(), &history)?;
        info!("wrote {} packets to {}", history.len(), path.display());
    }
    if let Some(path) = &args.export_csv {
        write_csv_file(path, &history)?;
        info!("wrote {} rows to {}", history.len(), path.display());
    }

    if args.explain_last {
        match history.last() {
            Some(last) => match ExplainClient::from_env() {
                Ok(client) => match client.explain(&build_prompt(last)).await {
                    Ok(text) => println!("{}", text),
                    Err(e) => warn!("explanation failed: {}", e),
                },
                Err(e) => warn!("explanation unavailable: {}", e),
            },
            None => info!("no packets captured, nothing to explain"),
        }
    }

    Ok(())
}
