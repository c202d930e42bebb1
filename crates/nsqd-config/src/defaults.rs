use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use sha2::{Digest, Sha256};

/// Default TCP port for client connections.
pub const DEFAULT_TCP_PORT: u16 = 4150;

/// Default HTTP port for the administrative API.
pub const DEFAULT_HTTP_PORT: u16 = 4151;

/// Default HTTPS port for the administrative API.
pub const DEFAULT_HTTPS_PORT: u16 = 4152;

/// Number of distinct node identifiers.
pub const NODE_ID_SPACE: i64 = 1024;

/// Default in-memory queue depth per topic and channel.
pub const DEFAULT_MEM_QUEUE_SIZE: i64 = 10_000;

/// Default rollover size for disk-backed queue files.
pub const DEFAULT_MAX_BYTES_PER_FILE: i64 = 100 * 1024 * 1024;

/// Default maximum message size accepted from producers.
pub const DEFAULT_MAX_MSG_SIZE: i64 = 1024 * 1024;

/// Default maximum body size for multi-message publishes.
pub const DEFAULT_MAX_BODY_SIZE: i64 = 5 * 1024 * 1024;

/// Default prefix applied to statsd keys; `%s` expands to the broadcast address.
pub const DEFAULT_STATSD_PREFIX: &str = "nsq.%s";

/// Default deflate compression level.
pub const DEFAULT_MAX_DEFLATE_LEVEL: i64 = 6;

pub(crate) const fn unspecified_addr(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
}

pub(crate) const fn seconds(value: u64) -> Duration {
    Duration::from_secs(value)
}

pub(crate) const fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Host name reported by the operating system, or `localhost` when it
/// cannot be determined.
#[must_use]
pub fn default_hostname() -> String {
    hostname().unwrap_or_else(|| "localhost".to_owned())
}

/// Node identifier derived from the host name so restarts keep the same id.
#[must_use]
pub fn default_node_id() -> i64 {
    node_id_for(&default_hostname())
}

/// Maps a host name onto the node identifier space.
#[must_use]
pub fn node_id_for(hostname: &str) -> i64 {
    let digest = Sha256::digest(hostname.as_bytes());
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix) % NODE_ID_SPACE.unsigned_abs();
    i64::try_from(value).unwrap_or_default()
}

#[cfg(unix)]
fn hostname() -> Option<String> {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
}

#[cfg(not(unix))]
fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME")
        .ok()
        .filter(|name| !name.is_empty())
}
