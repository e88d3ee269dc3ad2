use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Application, version and vendor parsed from a `Server` response header.
///
/// `Apache/2.4.41 (Ubuntu)` becomes `("Apache", "2.4.41", "Ubuntu")`.
/// Missing pieces are empty strings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerIdent {
    pub application: String,
    pub version: String,
    pub vendor: String,
}

impl ServerIdent {
    pub fn parse(header: &str) -> Self {
        let mut segments = header.split('/');
        let application = segments.next().unwrap_or_default().to_string();

        let mut version = String::new();
        let mut vendor = String::new();
        if let Some(rest) = segments.next() {
            let mut fields = rest.split_whitespace();
            if let Some(v) = fields.next() {
                version = v.to_string();
            }
            if let Some(v) = fields.next() {
                vendor = v.trim_matches(|c| c == '(' || c == ')').to_string();
            }
        }

        Self {
            application,
            version,
            vendor,
        }
    }
}

/// One HTTP(S) server discovered on a host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub address: String,
    pub port: u16,
    pub application: String,
    pub version: String,
    pub vendor: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Found {
    /// Build a result observed now, in local time when the offset is known.
    pub fn observed(address: impl Into<String>, port: u16, ident: ServerIdent) -> Self {
        let timestamp =
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            address: address.into(),
            port,
            application: ident.application,
            version: ident.version,
            vendor: ident.vendor,
            timestamp,
        }
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.address, self.port, self.application)?;
        if !self.version.is_empty() {
            write!(f, "/{}", self.version)?;
        }
        if !self.vendor.is_empty() {
            write!(f, " ({})", self.vendor)?;
        }
        Ok(())
    }
}

/// Outcome counters for one sweep.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Hosts whose task was started, including ones later cut short by
    /// cancellation or a panic.
    pub hosts_dispatched: u64,
    pub hosts_found: u64,
    pub cancelled: bool,
}
