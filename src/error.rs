use thiserror::Error;

/// Errors that stop a sweep before or instead of probing.
///
/// Per-probe network failures are deliberately absent: a host that does not
/// answer simply produces no [`Found`](crate::types::Found).
#[derive(Debug, Error)]
pub enum SweepError {
    /// The open file descriptor limit could not be read.
    #[error("failed to query open file limit: {0}")]
    Environment(#[source] std::io::Error),

    #[error("failed to list network interfaces: {0}")]
    Interfaces(#[source] std::io::Error),

    #[error("no non-loopback IPv4 interface found")]
    NoLocalNetwork,

    #[error("invalid CIDR {input:?}: {source}")]
    InvalidCidr {
        input: String,
        #[source]
        source: ipnet::AddrParseError,
    },

    #[error("invalid probe URL {input:?}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl SweepError {
    /// True for errors raised while working out which subnet to sweep.
    pub fn is_subnet_resolution(&self) -> bool {
        matches!(
            self,
            SweepError::Interfaces(_) | SweepError::NoLocalNetwork | SweepError::InvalidCidr { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
