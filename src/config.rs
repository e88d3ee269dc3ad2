use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::limits::DEFAULT_FD_MARGIN;

/// Settings for one scan, passed explicitly down to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Plain HTTP ports, tried first and in this order.
    pub http_ports: Vec<u16>,
    /// HTTPS ports, tried after all plain ports and in this order.
    pub tls_ports: Vec<u16>,
    /// Upper bound on each HEAD request.
    pub timeout: Duration,
    /// Log individual probe failures at debug level.
    pub debug: bool,
    /// File descriptors kept out of the concurrency budget.
    pub fd_margin: u64,
    /// Optional cap on concurrent host probes, below the descriptor budget.
    pub concurrency: Option<usize>,
    pub accept_invalid_certs: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            http_ports: vec![80, 8080],
            tls_ports: vec![443],
            timeout: Duration::from_secs(10),
            debug: false,
            fd_margin: DEFAULT_FD_MARGIN,
            concurrency: None,
            accept_invalid_certs: false,
        }
    }
}

impl ScanConfig {
    pub fn with_ports(mut self, http_ports: Vec<u16>, tls_ports: Vec<u16>) -> Self {
        self.http_ports = http_ports;
        self.tls_ports = tls_ports;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse a comma-separated port list such as `80,8080,8000-8002`.
///
/// Order of first appearance is kept and duplicates are dropped. Blank input
/// gives an empty list.
pub fn parse_port_list(s: &str) -> Result<Vec<u16>> {
    let mut out: Vec<u16> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        if let Some((a, b)) = item.split_once('-') {
            let start = parse_port_str(a.trim())
                .with_context(|| format!("invalid start in range: {item}"))?;
            let end = parse_port_str(b.trim())
                .with_context(|| format!("invalid end in range: {item}"))?;
            if start > end {
                bail!("invalid range {start}-{end} (start > end)");
            }
            for p in start..=end {
                if seen.insert(p) {
                    out.push(p);
                }
            }
            continue;
        }

        let p = parse_port_str(item).with_context(|| format!("invalid port value: {item}"))?;
        if seen.insert(p) {
            out.push(p);
        }
    }

    Ok(out)
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
