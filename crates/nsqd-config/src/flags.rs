//! Command-line flag definitions.
//!
//! Every option has a matching long flag. Flags are optional: an absent flag
//! leaves the file or default value untouched, so each field is wrapped in
//! `Option` rather than carrying a clap default.

use std::net::SocketAddr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};

use crate::duration::parse_duration;
use crate::logging::{LogFormat, LogLevel};
use crate::tls::{TlsClientAuthPolicy, TlsRequired, TlsVersion};

/// Command-line interface of the broker daemon.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "nsqd",
    about = "Realtime distributed message broker daemon",
    disable_version_flag = true
)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
    /// Prints version information and exits.
    #[arg(long)]
    pub version: bool,
    /// Per-option overrides.
    #[command(flatten)]
    pub overrides: FlagOverrides,
}

impl Cli {
    /// Configuration file selected with `--config`, treating an empty value
    /// as "no file".
    #[must_use]
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config
            .as_deref()
            .filter(|path| !path.as_str().trim().is_empty())
    }
}

/// Option values supplied on the command line.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FlagOverrides {
    /// Unique node identifier (0-1023).
    #[arg(long, value_name = "ID")]
    pub node_id: Option<i64>,
    /// Minimum log level (debug, info, warn, error, fatal).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
    /// Log record encoding (json, compact).
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
    /// Directory for metadata and disk-backed queues.
    #[arg(long, value_name = "DIR")]
    pub data_path: Option<Utf8PathBuf>,

    /// Address to listen on for TCP clients.
    #[arg(long, value_name = "ADDR")]
    pub tcp_address: Option<SocketAddr>,
    /// Address to listen on for HTTP clients.
    #[arg(long, value_name = "ADDR")]
    pub http_address: Option<SocketAddr>,
    /// Address to listen on for HTTPS clients.
    #[arg(long, value_name = "ADDR")]
    pub https_address: Option<SocketAddr>,
    /// Address registered with lookup daemons.
    #[arg(long, value_name = "HOST")]
    pub broadcast_address: Option<String>,
    /// TCP port registered with lookup daemons.
    #[arg(long, value_name = "PORT")]
    pub broadcast_tcp_port: Option<u16>,
    /// HTTP port registered with lookup daemons.
    #[arg(long, value_name = "PORT")]
    pub broadcast_http_port: Option<u16>,
    /// Lookup daemon TCP address (repeatable).
    #[arg(long = "lookupd-tcp-address", value_name = "ADDR")]
    pub lookupd_tcp_addresses: Option<Vec<String>>,
    /// Authorisation service HTTP address (repeatable).
    #[arg(long = "auth-http-address", value_name = "ADDR")]
    pub auth_http_addresses: Option<Vec<String>>,
    /// Connect timeout for outbound HTTP requests.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub http_client_connect_timeout: Option<Duration>,
    /// Request timeout for outbound HTTP requests.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub http_client_request_timeout: Option<Duration>,

    /// Messages kept in memory per topic and channel.
    #[arg(long, value_name = "COUNT")]
    pub mem_queue_size: Option<i64>,
    /// Rollover size of disk queue files.
    #[arg(long, value_name = "BYTES")]
    pub max_bytes_per_file: Option<i64>,
    /// Messages written between disk syncs.
    #[arg(long, value_name = "COUNT")]
    pub sync_every: Option<i64>,
    /// Maximum time between disk syncs.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub sync_timeout: Option<Duration>,
    /// Interval between queue scans.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub queue_scan_interval: Option<Duration>,
    /// Upper bound on queue scan workers.
    #[arg(long, value_name = "COUNT")]
    pub queue_scan_worker_pool_max: Option<i64>,

    /// Default time a message may stay in flight.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub msg_timeout: Option<Duration>,
    /// Largest timeout a client may request for a message.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub max_msg_timeout: Option<Duration>,
    /// Largest message accepted from producers.
    #[arg(long, value_name = "BYTES")]
    pub max_msg_size: Option<i64>,
    /// Largest publish body accepted.
    #[arg(long, value_name = "BYTES")]
    pub max_body_size: Option<i64>,
    /// Largest requeue delay.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub max_req_timeout: Option<Duration>,
    /// Idle time before a client connection is dropped.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub client_timeout: Option<Duration>,
    /// Consumers allowed per channel (0 for unlimited).
    #[arg(long, value_name = "COUNT")]
    pub max_channel_consumers: Option<i64>,

    /// Largest heartbeat interval a client may negotiate.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub max_heartbeat_interval: Option<Duration>,
    /// Largest ready count a client may request.
    #[arg(long, value_name = "COUNT")]
    pub max_rdy_count: Option<i64>,
    /// Largest output buffer a client may negotiate.
    #[arg(long, value_name = "BYTES")]
    pub max_output_buffer_size: Option<i64>,
    /// Largest output buffer timeout a client may negotiate.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub max_output_buffer_timeout: Option<Duration>,
    /// Smallest output buffer timeout a client may negotiate.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub min_output_buffer_timeout: Option<Duration>,
    /// Output buffer timeout used when a client does not negotiate one.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub output_buffer_timeout: Option<Duration>,

    /// Statsd daemon receiving metrics.
    #[arg(long, value_name = "ADDR")]
    pub statsd_address: Option<String>,
    /// Prefix applied to metric keys.
    #[arg(long, value_name = "PREFIX")]
    pub statsd_prefix: Option<String>,
    /// Metrics push interval.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub statsd_interval: Option<Duration>,
    /// Publish memory statistics.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub statsd_mem_stats: Option<bool>,
    /// Size limit for statsd UDP packets.
    #[arg(long, value_name = "BYTES")]
    pub statsd_udp_packet_size: Option<i64>,

    /// Window for end-to-end latency percentiles.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub e2e_processing_latency_window_time: Option<Duration>,
    /// End-to-end latency percentile to report (repeatable, comma separated).
    #[arg(
        long = "e2e-processing-latency-percentile",
        value_name = "FLOAT",
        value_delimiter = ','
    )]
    pub e2e_processing_latency_percentiles: Option<Vec<f64>>,

    /// Server certificate.
    #[arg(long, value_name = "PATH")]
    pub tls_cert: Option<Utf8PathBuf>,
    /// Server private key.
    #[arg(long, value_name = "PATH")]
    pub tls_key: Option<Utf8PathBuf>,
    /// Root CA used to verify client certificates.
    #[arg(long, value_name = "PATH")]
    pub tls_root_ca_file: Option<Utf8PathBuf>,
    /// Client certificate policy (require, require-verify).
    #[arg(long, value_name = "POLICY")]
    pub tls_client_auth_policy: Option<TlsClientAuthPolicy>,
    /// Require TLS from clients (false, true, tcp-https).
    #[arg(long, value_name = "MODE")]
    pub tls_required: Option<TlsRequired>,
    /// Oldest accepted TLS version (tls1.0 to tls1.3).
    #[arg(long, value_name = "VERSION")]
    pub tls_min_version: Option<TlsVersion>,

    /// Allow deflate compression.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub deflate: Option<bool>,
    /// Highest deflate level a client may negotiate.
    #[arg(long, value_name = "LEVEL")]
    pub max_deflate_level: Option<i64>,
    /// Allow snappy compression.
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub snappy: Option<bool>,
}
