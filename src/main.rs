use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use http_sweep_rs::config::{parse_port_list, ScanConfig};
use http_sweep_rs::types::Found;
use http_sweep_rs::{logging, probe_single_target, scan_with_cancel};

/// http-sweep-rs — find HTTP(S) servers on a subnet and report what they run.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "http-sweep-rs",
    version,
    about = "Find HTTP(S) servers on a subnet and report their Server header.",
    long_about = None
)]
struct Cli {
    /// CIDR to scan; `local` scans the subnet of the first non-loopback IPv4 interface.
    #[arg(long, default_value = "local")]
    cidr: String,

    /// Plain HTTP ports, tried first (comma-separated, ranges allowed).
    #[arg(long, default_value = "80,8080")]
    http: String,

    /// HTTPS ports, tried after the plain ones.
    #[arg(long, default_value = "443")]
    tls: String,

    /// Per-request timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 1000)]
    timeout_ms: u64,

    /// Cap on hosts probed at once (the open file limit always applies).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Accept self-signed and otherwise invalid TLS certificates.
    #[arg(long, default_value_t = false)]
    insecure: bool,

    /// Log every failed probe.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Print each result as a JSON line.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write all results as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Probe a single URL instead of sweeping a subnet.
    #[arg(long)]
    probe: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug)?;

    let config = ScanConfig {
        http_ports: parse_port_list(&cli.http).context("--http")?,
        tls_ports: parse_port_list(&cli.tls).context("--tls")?,
        timeout: Duration::from_millis(cli.timeout_ms),
        debug: cli.debug,
        concurrency: cli.concurrency,
        accept_invalid_certs: cli.insecure,
        ..ScanConfig::default()
    };

    let collected: Arc<Mutex<Vec<Found>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let collected = collected.clone();
        let json = cli.json;
        let keep = cli.output.is_some();
        move |f: Found| {
            if json {
                match serde_json::to_string(&f) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "failed to encode result"),
                }
            } else {
                println!("{f}  [{}]", f.timestamp);
            }
            if keep {
                if let Ok(mut v) = collected.lock() {
                    v.push(f);
                }
            }
        }
    };

    if let Some(url) = cli.probe.as_deref() {
        if !probe_single_target(&config, url, &sink).await? {
            tracing::info!(%url, "no response");
        }
    } else {
        tracing::info!(
            cidr = %cli.cidr,
            http = ?config.http_ports,
            tls = ?config.tls_ports,
            "starting sweep"
        );

        // Ctrl-C cancels the sweep; results found so far are kept.
        let cancel = CancellationToken::new();
        let cancel_ctrlc = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel_ctrlc.cancel();
        });

        scan_with_cancel(&config, &cli.cidr, sink, cancel).await?;
    }

    if let Some(path) = cli.output.as_deref() {
        let results = collected.lock().map(|v| v.clone()).unwrap_or_default();
        write_results_json(path, &results)
            .with_context(|| format!("failed to write JSON to {}", path.display()))?;
        tracing::info!(path = %path.display(), count = results.len(), "wrote results");
    }

    Ok(())
}

fn write_results_json(path: &std::path::Path, results: &[Found]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}
