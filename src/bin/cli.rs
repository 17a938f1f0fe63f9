//! traceinbox CLI Client
//!
//! Fans requests out to every agent and aggregates the results.

use std::time::Duration;

use clap::{Parser, Subcommand};
use crossbeam::channel;
use traceinbox::network::Client;
use traceinbox::service::{AlertRecord, GetAlertsRequest, SendEventRequest};
use traceinbox::Result;

/// traceinbox CLI
#[derive(Parser, Debug)]
#[command(name = "traceinbox-cli")]
#[command(about = "Query and feed traceinbox agents across a cluster")]
#[command(version)]
struct Args {
    /// Agent addresses (host:port), comma separated
    #[arg(long, value_delimiter = ',', default_value = "127.0.0.1:50051")]
    hosts: Vec<String>,

    /// Per-agent timeout in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch alerts from every agent
    Alerts {
        /// Start of the time range (ms since epoch)
        #[arg(long)]
        start: Option<i64>,

        /// End of the time range (ms since epoch, default now)
        #[arg(long)]
        end: Option<i64>,

        /// Minimum severity
        #[arg(long, default_value = "0")]
        min_severity: i32,

        /// Only alerts not delivered before
        #[arg(long)]
        unprocessed: bool,
    },

    /// Deliver a text alert to every agent
    Send {
        /// Alert text
        text: String,
    },

    /// Ping every agent
    Ping,
}

fn main() {
    traceinbox::logging::init("warn");

    let args = Args::parse();
    let timeout = Duration::from_millis(args.timeout_ms);

    let failures = match args.command {
        Commands::Alerts { start, end, min_severity, unprocessed } => {
            let request = GetAlertsRequest {
                start_time: start,
                end_time: end,
                min_severity,
                unprocessed,
            };
            report(fan_out(&args.hosts, timeout, |client| client.get_alerts(request.clone())), print_alerts)
        }
        Commands::Send { text } => report(
            fan_out(&args.hosts, timeout, |client| client.send_event(SendEventRequest::text(text.clone()))),
            |host, response| println!("[{}] {}", host, response.status),
        ),
        Commands::Ping => report(
            fan_out(&args.hosts, timeout, |client| client.ping()),
            |host, _| println!("[{}] PONG", host),
        ),
    };

    if failures > 0 {
        std::process::exit(1);
    }
}

/// Run `op` against every host concurrently; results come back in host order
fn fan_out<T, F>(hosts: &[String], timeout: Duration, op: F) -> Vec<(String, Result<T>)>
where
    T: Send,
    F: Fn(&mut Client) -> Result<T> + Sync,
{
    let (tx, rx) = channel::unbounded();

    crossbeam::scope(|scope| {
        for (i, host) in hosts.iter().enumerate() {
            let tx = tx.clone();
            let op = &op;
            scope.spawn(move |_| {
                let result = Client::connect(host, timeout).and_then(|mut client| op(&mut client));
                let _ = tx.send((i, result));
            });
        }
    })
    .unwrap_or_else(|_| tracing::error!("A fan-out worker panicked"));
    drop(tx);

    let mut results: Vec<(usize, Result<T>)> = rx.into_iter().collect();
    results.sort_by_key(|(i, _)| *i);
    results
        .into_iter()
        .map(|(i, result)| (hosts[i].clone(), result))
        .collect()
}

/// Print every success, report every failure; returns the failure count
fn report<T>(results: Vec<(String, Result<T>)>, print: impl Fn(&str, T)) -> usize {
    let mut failures = 0;
    for (host, result) in results {
        match result {
            Ok(value) => print(&host, value),
            Err(e) => {
                failures += 1;
                eprintln!("[{}] error: {}", host, e);
            }
        }
    }
    failures
}

fn print_alerts(host: &str, alerts: Vec<AlertRecord>) {
    if alerts.is_empty() {
        println!("[{}] no alerts", host);
        return;
    }
    for alert in alerts {
        let when = chrono::DateTime::from_timestamp_millis(alert.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| alert.timestamp.to_string());
        println!("[{}] {} severity={} {}", host, when, alert.severity, alert.message);
    }
}
