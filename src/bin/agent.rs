//! traceinbox agent binary
//!
//! Runs on every node: opens the event store and serves webhook ingest and
//! alert queries over TCP.

use std::sync::Arc;

use clap::Parser;
use traceinbox::network::Server;
use traceinbox::{AlertService, Config, EventStorage};

/// traceinbox agent
#[derive(Parser, Debug)]
#[command(name = "traceinbox-agent")]
#[command(about = "Per-node diagnostic agent with a durable alert inbox")]
#[command(version)]
struct Args {
    /// Listen port (default: $DEEPTRACED_PORT, then 50051)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for persisted events (default: $WORK_DIR, then /tmp)
    #[arg(long)]
    persistence_dir: Option<String>,

    /// Rotate an event file once it exceeds this many bytes (0 = 10 MiB)
    #[arg(long, default_value = "0")]
    max_file_size: u64,

    /// Node rank used in event file names (default: $NODE_RANK)
    #[arg(long)]
    rank: Option<String>,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    traceinbox::logging::init("info,traceinbox=debug");

    let args = Args::parse();

    let mut builder = traceinbox::config::ConfigBuilder::from_env()
        .max_file_size(args.max_file_size)
        .max_connections(args.max_connections);
    if let Some(port) = args.port {
        builder = builder.listen_addr(format!("0.0.0.0:{}", port));
    }
    if let Some(dir) = &args.persistence_dir {
        builder = builder.base_dir(dir);
    }
    if let Some(rank) = &args.rank {
        builder = builder.node_rank(rank);
    }
    let config: Config = builder.build();

    tracing::info!("traceinbox agent v{}", traceinbox::VERSION);
    tracing::info!("Persistence directory: {}", config.base_dir.display());
    tracing::info!("Listen address: {}", config.listen_addr);

    // The service must not start without its store
    let storage = match EventStorage::open(config.clone()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to init storage: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, AlertService::new(storage)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to listen: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
