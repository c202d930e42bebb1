//! The fully resolved option set handed to the engine.

use std::net::SocketAddr;
use std::time::Duration;

use camino::Utf8PathBuf;

use crate::defaults::{
    self, DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_BYTES_PER_FILE,
    DEFAULT_MAX_DEFLATE_LEVEL, DEFAULT_MAX_MSG_SIZE, DEFAULT_MEM_QUEUE_SIZE, DEFAULT_STATSD_PREFIX,
    DEFAULT_TCP_PORT, millis, seconds, unspecified_addr,
};
use crate::logging::{LogFormat, LogLevel};
use crate::tls::{TlsClientAuthPolicy, TlsRequired, TlsVersion};

/// Final daemon configuration.
///
/// [`Options::default`] supplies the compiled-in layer; [`crate::resolve`]
/// overlays the configuration file and command-line flags on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Unique identifier of this node within the cluster.
    pub node_id: i64,
    /// Minimum severity logged.
    pub log_level: LogLevel,
    /// Output encoding for log records.
    pub log_format: LogFormat,
    /// Directory holding metadata and disk-backed queues; empty means the
    /// working directory.
    pub data_path: Utf8PathBuf,

    /// Listen address for TCP clients.
    pub tcp_address: SocketAddr,
    /// Listen address for the HTTP API.
    pub http_address: SocketAddr,
    /// Listen address for the HTTPS API.
    pub https_address: SocketAddr,
    /// Address registered with lookup daemons.
    pub broadcast_address: String,
    /// TCP port registered with lookup daemons; `0` uses the listen port.
    pub broadcast_tcp_port: u16,
    /// HTTP port registered with lookup daemons; `0` uses the listen port.
    pub broadcast_http_port: u16,
    /// Lookup daemons to register with.
    pub lookupd_tcp_addresses: Vec<String>,
    /// Authorisation services consulted for client identities.
    pub auth_http_addresses: Vec<String>,
    /// Connect timeout for outbound HTTP requests.
    pub http_client_connect_timeout: Duration,
    /// Request timeout for outbound HTTP requests.
    pub http_client_request_timeout: Duration,

    /// Messages kept in memory per topic and channel before spilling to disk.
    pub mem_queue_size: i64,
    /// Rollover size of disk queue files.
    pub max_bytes_per_file: i64,
    /// Messages written between disk syncs.
    pub sync_every: i64,
    /// Maximum time between disk syncs.
    pub sync_timeout: Duration,
    /// Interval between in-flight and deferred queue scans.
    pub queue_scan_interval: Duration,
    /// Upper bound on queue scan workers.
    pub queue_scan_worker_pool_max: i64,

    /// Default time a message may stay in flight.
    pub msg_timeout: Duration,
    /// Largest timeout a client may request for a message.
    pub max_msg_timeout: Duration,
    /// Largest message accepted from producers.
    pub max_msg_size: i64,
    /// Largest publish body accepted.
    pub max_body_size: i64,
    /// Largest requeue delay.
    pub max_req_timeout: Duration,
    /// Idle time before a client connection is dropped.
    pub client_timeout: Duration,
    /// Consumers allowed per channel; `0` means unlimited.
    pub max_channel_consumers: i64,

    /// Largest heartbeat interval a client may negotiate.
    pub max_heartbeat_interval: Duration,
    /// Largest ready count a client may request.
    pub max_rdy_count: i64,
    /// Largest output buffer a client may negotiate.
    pub max_output_buffer_size: i64,
    /// Largest output buffer timeout a client may negotiate.
    pub max_output_buffer_timeout: Duration,
    /// Smallest output buffer timeout a client may negotiate.
    pub min_output_buffer_timeout: Duration,
    /// Output buffer timeout used when a client does not negotiate one.
    pub output_buffer_timeout: Duration,

    /// Statsd daemon receiving metrics; empty disables publishing.
    pub statsd_address: String,
    /// Prefix applied to metric keys.
    pub statsd_prefix: String,
    /// Metrics push interval.
    pub statsd_interval: Duration,
    /// Whether memory statistics are published.
    pub statsd_mem_stats: bool,
    /// Size limit for statsd UDP packets.
    pub statsd_udp_packet_size: i64,

    /// Window over which end-to-end latency percentiles are computed.
    pub e2e_processing_latency_window_time: Duration,
    /// Percentiles reported for end-to-end latency.
    pub e2e_processing_latency_percentiles: Vec<f64>,

    /// Server certificate.
    pub tls_cert: Option<Utf8PathBuf>,
    /// Server private key.
    pub tls_key: Option<Utf8PathBuf>,
    /// Root CA used to verify client certificates.
    pub tls_root_ca_file: Option<Utf8PathBuf>,
    /// Client certificate policy.
    pub tls_client_auth_policy: TlsClientAuthPolicy,
    /// Whether clients must use TLS.
    pub tls_required: TlsRequired,
    /// Oldest accepted TLS version.
    pub tls_min_version: TlsVersion,

    /// Whether clients may negotiate deflate compression.
    pub deflate: bool,
    /// Highest deflate level a client may negotiate.
    pub max_deflate_level: i64,
    /// Whether clients may negotiate snappy compression.
    pub snappy: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            node_id: defaults::default_node_id(),
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            data_path: Utf8PathBuf::new(),

            tcp_address: unspecified_addr(DEFAULT_TCP_PORT),
            http_address: unspecified_addr(DEFAULT_HTTP_PORT),
            https_address: unspecified_addr(DEFAULT_HTTPS_PORT),
            broadcast_address: defaults::default_hostname(),
            broadcast_tcp_port: 0,
            broadcast_http_port: 0,
            lookupd_tcp_addresses: Vec::new(),
            auth_http_addresses: Vec::new(),
            http_client_connect_timeout: seconds(2),
            http_client_request_timeout: seconds(5),

            mem_queue_size: DEFAULT_MEM_QUEUE_SIZE,
            max_bytes_per_file: DEFAULT_MAX_BYTES_PER_FILE,
            sync_every: 2500,
            sync_timeout: seconds(2),
            queue_scan_interval: millis(100),
            queue_scan_worker_pool_max: 4,

            msg_timeout: seconds(60),
            max_msg_timeout: seconds(15 * 60),
            max_msg_size: DEFAULT_MAX_MSG_SIZE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_req_timeout: seconds(60 * 60),
            client_timeout: seconds(60),
            max_channel_consumers: 0,

            max_heartbeat_interval: seconds(60),
            max_rdy_count: 2500,
            max_output_buffer_size: 64 * 1024,
            max_output_buffer_timeout: seconds(30),
            min_output_buffer_timeout: millis(25),
            output_buffer_timeout: millis(250),

            statsd_address: String::new(),
            statsd_prefix: DEFAULT_STATSD_PREFIX.to_owned(),
            statsd_interval: seconds(60),
            statsd_mem_stats: true,
            statsd_udp_packet_size: 508,

            e2e_processing_latency_window_time: seconds(10 * 60),
            e2e_processing_latency_percentiles: Vec::new(),

            tls_cert: None,
            tls_key: None,
            tls_root_ca_file: None,
            tls_client_auth_policy: TlsClientAuthPolicy::default(),
            tls_required: TlsRequired::default(),
            tls_min_version: TlsVersion::default(),

            deflate: true,
            max_deflate_level: DEFAULT_MAX_DEFLATE_LEVEL,
            snappy: true,
        }
    }
}

impl Options {
    /// TCP port advertised to lookup daemons.
    #[must_use]
    pub fn advertised_tcp_port(&self) -> u16 {
        match self.broadcast_tcp_port {
            0 => self.tcp_address.port(),
            port => port,
        }
    }

    /// HTTP port advertised to lookup daemons.
    #[must_use]
    pub fn advertised_http_port(&self) -> u16 {
        match self.broadcast_http_port {
            0 => self.http_address.port(),
            port => port,
        }
    }

    /// Filter directive for the log subscriber.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        self.log_level.as_filter()
    }

    /// Whether log lines are emitted as JSON objects.
    #[must_use]
    pub const fn structured_logs(&self) -> bool {
        matches!(self.log_format, LogFormat::Json)
    }

    /// Whether TLS material has been configured.
    #[must_use]
    pub fn tls_enabled(&self) -> bool {
        let configured =
            |path: &Option<Utf8PathBuf>| path.as_ref().is_some_and(|path| !path.as_str().is_empty());
        configured(&self.tls_cert) && configured(&self.tls_key)
    }
}
