use async_trait::async_trait;
use reqwest::{redirect, Client, Url};
use std::net::{IpAddr, SocketAddr};
use tokio_util::sync::CancellationToken;

use crate::config::ScanConfig;
use crate::error::{Result, SweepError};
use crate::sink::FoundSink;
use crate::types::{Found, ServerIdent};

/// Something that can check one host and report the server it found.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Probe `addr`, returning the first server that answered. Returns `None`
    /// when nothing answered or `cancel` fired first.
    async fn probe(&self, addr: IpAddr, cancel: &CancellationToken) -> Option<Found>;
}

/// Candidate URLs for one host: every plain HTTP port, then every TLS port,
/// each group in the order given. The first URL to answer wins.
pub fn probe_targets(addr: IpAddr, http_ports: &[u16], tls_ports: &[u16]) -> Vec<Url> {
    let plain = http_ports.iter().map(|&p| ("http", p));
    let tls = tls_ports.iter().map(|&p| ("https", p));
    plain
        .chain(tls)
        .filter_map(|(scheme, port)| {
            Url::parse(&format!("{scheme}://{}/", SocketAddr::new(addr, port))).ok()
        })
        .collect()
}

/// Probes hosts with HTTP HEAD requests over a shared client.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    http_ports: Vec<u16>,
    tls_ports: Vec<u16>,
    debug: bool,
}

impl HttpProber {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(redirect::Policy::limited(10))
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            http_ports: config.http_ports.clone(),
            tls_ports: config.tls_ports.clone(),
            debug: config.debug,
        })
    }

    /// Probe `addr` and hand the first hit to `sink`. Returns whether
    /// anything was found.
    pub async fn probe_host(&self, addr: IpAddr, sink: &dyn FoundSink) -> bool {
        match self.probe(addr, &CancellationToken::new()).await {
            Some(found) => {
                sink.found(found);
                true
            }
            None => false,
        }
    }

    /// Send one HEAD request and turn a response, whatever its status, into
    /// a [`Found`]. Redirects are followed and the final response's `Server`
    /// header is used; address and port stay those of `url`.
    pub async fn head(&self, url: &Url, cancel: &CancellationToken) -> Option<Found> {
        let res = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            res = self.client.head(url.clone()).send() => res,
        };
        let resp = match res {
            Ok(resp) => resp,
            Err(e) => {
                if self.debug {
                    tracing::debug!(%url, error = %e, "probe failed");
                }
                return None;
            }
        };

        let header = resp
            .headers()
            .get(reqwest::header::SERVER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        let port = url.port_or_known_default().unwrap_or_default();
        Some(Found::observed(bare_host(url), port, ServerIdent::parse(&header)))
    }
}

#[async_trait]
impl HostProbe for HttpProber {
    async fn probe(&self, addr: IpAddr, cancel: &CancellationToken) -> Option<Found> {
        for url in probe_targets(addr, &self.http_ports, &self.tls_ports) {
            if cancel.is_cancelled() {
                return None;
            }
            if let Some(found) = self.head(&url, cancel).await {
                return Some(found);
            }
        }
        None
    }
}

/// Probe exactly one URL, e.g. `https://10.0.0.5:8443`.
pub async fn probe_single_target(
    config: &ScanConfig,
    url: &str,
    sink: &dyn FoundSink,
) -> Result<bool> {
    let parsed = Url::parse(url).map_err(|e| SweepError::InvalidUrl {
        input: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return Err(SweepError::InvalidUrl {
            input: url.to_string(),
            reason: "expected an http:// or https:// URL with a host".into(),
        });
    }
    let prober = HttpProber::new(config)?;
    match prober.head(&parsed, &CancellationToken::new()).await {
        Some(found) => {
            sink.found(found);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Host part of a probe URL without IPv6 brackets.
fn bare_host(url: &Url) -> String {
    match url.host() {
        Some(url::Host::Ipv6(a)) => a.to_string(),
        Some(h) => h.to_string(),
        None => String::new(),
    }
}
