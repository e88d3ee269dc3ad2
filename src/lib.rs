//! Library crate for http-sweep-rs: find HTTP(S) servers across a subnet.
pub mod config;
pub mod error;
pub mod limits;
pub mod logging;
pub mod netdetect;
pub mod probe;
pub mod scan;
pub mod sink;
pub mod sweep;
pub mod types;

pub use config::ScanConfig;
pub use error::SweepError;
pub use netdetect::resolve_local_subnet;
pub use probe::probe_single_target;
pub use scan::{scan, scan_local, scan_stream, scan_with_cancel};
pub use sink::{Finder, FinderSink, FoundSink};
pub use types::{Found, ServerIdent, SweepSummary};
