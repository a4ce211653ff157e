use std::collections::VecDeque;
use std::path::PathBuf;

use clap::Parser;

use toy_router::transport::tcp::flags as tcp_flags;
use toy_router::{parse_packet, logging, PacketBuilder, Router, SimConfig, Transport};

#[derive(Parser)]
#[command(name = "toy-router", about = "Simulated IPv4 packet forwarding")]
struct Cli {
    /// Path to a TOML configuration file (built-in routes if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive, overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// The sample traffic of a small home network.
fn demo_packets() -> Vec<(String, PacketBuilder)> {
    let host = "192.168.1.100";
    let dns = |src_port, dst: &str, payload: &str| {
        PacketBuilder::new(
            host,
            dst,
            Transport::Udp {
                src_port,
                dst_port: 53,
            },
        )
        .payload(payload)
    };
    let syn = |src: &str, dst: &str, src_port, dst_port| {
        PacketBuilder::new(
            src,
            dst,
            Transport::Tcp {
                src_port,
                dst_port,
                flags: tcp_flags::SYN,
            },
        )
    };

    vec![
        (
            "Local WiFi ping".to_string(),
            PacketBuilder::new(host, "192.168.1.50", Transport::echo_request(1234, 1))
                .payload("ping"),
        ),
        (
            "Google DNS query".to_string(),
            dns(54321, "8.8.8.8", "DNS_QUERY_google.com_A"),
        ),
        (
            "Cloudflare DNS query".to_string(),
            dns(54322, "1.1.1.1", "DNS_QUERY_cloudflare.com_A"),
        ),
        (
            "Localhost connection".to_string(),
            syn("127.0.0.1", "127.0.0.1", 45678, 8080),
        ),
        (
            "YouTube HTTPS".to_string(),
            syn(host, "142.250.184.78", 33445, 443),
        ),
        (
            "Expired packet (TTL=0)".to_string(),
            dns(12345, "8.8.8.8", "expired_query").ttl(0),
        ),
    ]
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match SimConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("failed to load config from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let log_file = cli.log_file.as_deref().or(config.logging.file.as_deref());
    if let Err(e) = logging::init(level, log_file) {
        eprintln!("failed to open log file: {e}");
        std::process::exit(1);
    }

    let router = match config.routing_table() {
        Ok(table) => Router::new(table),
        Err(e) => {
            tracing::error!("invalid routing configuration: {e}");
            std::process::exit(1);
        }
    };

    println!("=== Routing Simulation ===");
    let mut queue = VecDeque::new();
    for (description, builder) in demo_packets() {
        let description = format!("{}: {} -> {}", description, builder.src_ip, builder.dst_ip);
        let packet = builder.build();
        if packet.is_empty() {
            tracing::warn!("Skipping invalid packet: {}", description);
        } else {
            tracing::debug!("Queued packet: {}", description);
            queue.push_back(packet);
        }
    }

    let mut count = 0;
    while let Some(packet) = queue.pop_front() {
        count += 1;
        println!("\n--- Processing Packet {} ---", count);
        match parse_packet(&packet) {
            Ok(parsed) => {
                println!("{}", parsed);
                println!("{}", router.decide(&parsed.ip));
            }
            Err(e) => println!("Malformed packet: {}", e),
        }
    }

    println!("\n{}", router.table());
    tracing::info!("Routing simulation completed");
}
