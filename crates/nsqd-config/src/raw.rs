//! Decoding of the optional TOML configuration file.
//!
//! Every key mirrors a field of [`crate::Options`] but is optional: an absent
//! key means "not specified" and leaves the lower-precedence value in place.
//! Unknown keys are rejected so a misspelt option never silently falls back
//! to its default.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::duration;
use crate::logging::{LogFormat, LogLevel};

/// Configuration decoded from a file, prior to validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub node_id: Option<i64>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    pub data_path: Option<Utf8PathBuf>,

    pub tcp_address: Option<SocketAddr>,
    pub http_address: Option<SocketAddr>,
    pub https_address: Option<SocketAddr>,
    pub broadcast_address: Option<String>,
    pub broadcast_tcp_port: Option<u16>,
    pub broadcast_http_port: Option<u16>,
    #[serde(alias = "nsqlookupd_tcp_addresses")]
    pub lookupd_tcp_addresses: Option<Vec<String>>,
    pub auth_http_addresses: Option<Vec<String>>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub http_client_connect_timeout: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub http_client_request_timeout: Option<Duration>,

    pub mem_queue_size: Option<i64>,
    pub max_bytes_per_file: Option<i64>,
    pub sync_every: Option<i64>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub sync_timeout: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub queue_scan_interval: Option<Duration>,
    pub queue_scan_worker_pool_max: Option<i64>,

    #[serde(deserialize_with = "duration::deserialize_option")]
    pub msg_timeout: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub max_msg_timeout: Option<Duration>,
    pub max_msg_size: Option<i64>,
    pub max_body_size: Option<i64>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub max_req_timeout: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub client_timeout: Option<Duration>,
    pub max_channel_consumers: Option<i64>,

    #[serde(deserialize_with = "duration::deserialize_option")]
    pub max_heartbeat_interval: Option<Duration>,
    pub max_rdy_count: Option<i64>,
    pub max_output_buffer_size: Option<i64>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub max_output_buffer_timeout: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub min_output_buffer_timeout: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub output_buffer_timeout: Option<Duration>,

    pub statsd_address: Option<String>,
    pub statsd_prefix: Option<String>,
    #[serde(deserialize_with = "duration::deserialize_option")]
    pub statsd_interval: Option<Duration>,
    pub statsd_mem_stats: Option<bool>,
    pub statsd_udp_packet_size: Option<i64>,

    #[serde(deserialize_with = "duration::deserialize_option")]
    pub e2e_processing_latency_window_time: Option<Duration>,
    pub e2e_processing_latency_percentiles: Option<Vec<f64>>,

    pub tls_cert: Option<Utf8PathBuf>,
    pub tls_key: Option<Utf8PathBuf>,
    pub tls_root_ca_file: Option<Utf8PathBuf>,
    pub tls_client_auth_policy: Option<String>,
    #[serde(deserialize_with = "deserialize_setting_text")]
    pub tls_required: Option<String>,
    pub tls_min_version: Option<String>,

    pub deflate: Option<bool>,
    pub max_deflate_level: Option<i64>,
    pub snappy: Option<bool>,
}

impl RawConfig {
    /// Reads and decodes the configuration file at `path`.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigFileError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigFileError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decodes configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Settings that operators write either as a TOML boolean or as one of a
/// fixed set of words, e.g. `tls_required = false` or `"tcp-https"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SettingText {
    Flag(bool),
    Text(String),
}

fn deserialize_setting_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match SettingText::deserialize(deserializer)? {
        SettingText::Flag(flag) => flag.to_string(),
        SettingText::Text(text) => text,
    };
    Ok(Some(text))
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Configured file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The file was not valid TOML or did not match the option schema.
    #[error("failed to load config file '{path}': {source}")]
    Decode {
        /// Configured file path.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigFileError {
    /// Path of the file that failed to load.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Read { path, .. } | Self::Decode { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn absent_keys_stay_unspecified() {
        let raw = RawConfig::from_toml_str("mem_queue_size = 50\n").expect("decode");
        assert_eq!(raw.mem_queue_size, Some(50));
        assert_eq!(raw.tcp_address, None);
        assert_eq!(raw.msg_timeout, None);
    }

    #[test]
    fn decodes_durations_lists_and_addresses() {
        let raw = RawConfig::from_toml_str(
            r#"
tcp_address = "127.0.0.1:5000"
msg_timeout = "90s"
sync_timeout = 1500
nsqlookupd_tcp_addresses = ["lookup-a:4160", "lookup-b:4160"]
e2e_processing_latency_percentiles = [0.99, 1.0]
"#,
        )
        .expect("decode");
        assert_eq!(raw.tcp_address.map(|addr| addr.port()), Some(5000));
        assert_eq!(raw.msg_timeout, Some(Duration::from_secs(90)));
        assert_eq!(raw.sync_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(
            raw.lookupd_tcp_addresses,
            Some(vec!["lookup-a:4160".to_owned(), "lookup-b:4160".to_owned()])
        );
        assert_eq!(raw.e2e_processing_latency_percentiles, Some(vec![0.99, 1.0]));
    }

    #[rstest]
    #[case::boolean_false("tls_required = false", "false")]
    #[case::boolean_true("tls_required = true", "true")]
    #[case::word("tls_required = \"tcp-https\"", "tcp-https")]
    fn tls_required_accepts_booleans_and_words(#[case] text: &str, #[case] expected: &str) {
        let raw = RawConfig::from_toml_str(text).expect("decode");
        assert_eq!(raw.tls_required.as_deref(), Some(expected));
    }

    #[test]
    fn tls_required_rejects_other_types() {
        assert!(RawConfig::from_toml_str("tls_required = 1").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let error = RawConfig::from_toml_str("mem_queue_sise = 50\n")
            .expect_err("unknown keys must be rejected");
        assert!(error.to_string().contains("mem_queue_sise"));
    }

    #[test]
    fn reports_the_failing_path() {
        let path = Utf8PathBuf::from("/definitely/not/here/nsqd.toml");
        let error = RawConfig::from_file(&path).expect_err("missing file must fail");
        assert_eq!(error.path(), path.as_path());
        assert!(error.to_string().contains("/definitely/not/here/nsqd.toml"));
    }
}
