//! Domain rules applied to the configuration file and to the merged options.

use std::str::FromStr;
use std::time::Duration;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::defaults::NODE_ID_SPACE;
use crate::duration::format_duration;
use crate::options::Options;
use crate::raw::RawConfig;
use crate::tls::{TlsClientAuthPolicy, TlsRequired, TlsVersion};

/// Violations of the configuration rules.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// `tls_min_version` named an unsupported protocol version.
    #[error("unknown tls_min_version '{0}' (expected tls1.0, tls1.1, tls1.2, or tls1.3)")]
    TlsMinVersion(String),
    /// `tls_required` held an unsupported value.
    #[error("invalid tls_required '{0}' (expected false, true, or tcp-https)")]
    TlsRequired(String),
    /// `tls_client_auth_policy` held an unsupported value.
    #[error("invalid tls_client_auth_policy '{0}' (expected require or require-verify)")]
    TlsClientAuthPolicy(String),
    /// Only one half of the certificate/key pair was provided.
    #[error("tls_cert and tls_key must be configured together")]
    TlsPairIncomplete,
    /// TLS was required without certificate material.
    #[error("tls_required = {0} requires tls_cert and tls_key")]
    TlsRequiredWithoutCertificate(TlsRequired),
    /// A latency percentile fell outside `(0, 1]`.
    #[error("e2e processing latency percentile {0} must be greater than 0 and at most 1")]
    Percentile(f64),
    /// The deflate level fell outside `1..=9`.
    #[error("max_deflate_level {0} must be between 1 and 9")]
    DeflateLevel(i64),
    /// The node identifier fell outside the identifier space.
    #[error("node_id {0} must be between 0 and 1023")]
    NodeId(i64),
    /// A size or count option was negative.
    #[error("{option} must not be negative, got {value}")]
    Negative {
        /// Offending option name.
        option: &'static str,
        /// Supplied value.
        value: i64,
    },
    /// A lower bound exceeded its matching upper bound.
    #[error("{lower} ({lower_value}) must not exceed {upper} ({upper_value})")]
    Ordering {
        /// Option expected to be the smaller one.
        lower: &'static str,
        /// Rendered value of the smaller option.
        lower_value: String,
        /// Option expected to be the larger one.
        upper: &'static str,
        /// Rendered value of the larger option.
        upper_value: String,
    },
}

/// File configuration that passed validation.
///
/// Holds the decoded file plus the typed forms of the string-valued TLS
/// settings. Only this type is accepted by [`crate::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedConfig {
    pub(crate) raw: RawConfig,
    pub(crate) tls_required: Option<TlsRequired>,
    pub(crate) tls_min_version: Option<TlsVersion>,
    pub(crate) tls_client_auth_policy: Option<TlsClientAuthPolicy>,
}

impl ValidatedConfig {
    /// The decoded file contents.
    #[must_use]
    pub fn raw(&self) -> &RawConfig {
        &self.raw
    }
}

impl RawConfig {
    /// Checks the file against the domain rules.
    pub fn validate(mut self) -> Result<ValidatedConfig, ValidationError> {
        let tls_min_version = parse_setting(
            self.tls_min_version.as_deref(),
            ValidationError::TlsMinVersion,
        )?;
        let tls_required =
            parse_setting(self.tls_required.as_deref(), ValidationError::TlsRequired)?;
        let tls_client_auth_policy = parse_setting(
            self.tls_client_auth_policy.as_deref(),
            ValidationError::TlsClientAuthPolicy,
        )?;

        self.tls_cert = non_empty_path(self.tls_cert);
        self.tls_key = non_empty_path(self.tls_key);
        self.tls_root_ca_file = non_empty_path(self.tls_root_ca_file);
        if self.tls_cert.is_some() != self.tls_key.is_some() {
            return Err(ValidationError::TlsPairIncomplete);
        }
        if let Some(node_id) = self.node_id {
            check_node_id(node_id)?;
        }
        if let Some(level) = self.max_deflate_level {
            check_deflate_level(level)?;
        }
        if let Some(percentiles) = &self.e2e_processing_latency_percentiles {
            check_percentiles(percentiles)?;
        }
        for (option, value) in [
            ("mem_queue_size", self.mem_queue_size),
            ("max_bytes_per_file", self.max_bytes_per_file),
            ("sync_every", self.sync_every),
            ("queue_scan_worker_pool_max", self.queue_scan_worker_pool_max),
            ("max_msg_size", self.max_msg_size),
            ("max_body_size", self.max_body_size),
            ("max_channel_consumers", self.max_channel_consumers),
            ("max_rdy_count", self.max_rdy_count),
            ("max_output_buffer_size", self.max_output_buffer_size),
            ("statsd_udp_packet_size", self.statsd_udp_packet_size),
        ] {
            if let Some(value) = value {
                check_non_negative(option, value)?;
            }
        }
        if let (Some(lower), Some(upper)) = (self.msg_timeout, self.max_msg_timeout) {
            check_ordering("msg_timeout", lower, "max_msg_timeout", upper)?;
        }

        Ok(ValidatedConfig {
            raw: self,
            tls_required,
            tls_min_version,
            tls_client_auth_policy,
        })
    }
}

/// Rules that can only be checked once every source has been merged.
pub(crate) fn check_resolved(options: &Options) -> Result<(), ValidationError> {
    if options.tls_cert.is_some() != options.tls_key.is_some() {
        return Err(ValidationError::TlsPairIncomplete);
    }
    if options.tls_required != TlsRequired::Disabled && !options.tls_enabled() {
        return Err(ValidationError::TlsRequiredWithoutCertificate(
            options.tls_required,
        ));
    }
    check_node_id(options.node_id)?;
    check_deflate_level(options.max_deflate_level)?;
    check_percentiles(&options.e2e_processing_latency_percentiles)?;
    check_ordering(
        "msg_timeout",
        options.msg_timeout,
        "max_msg_timeout",
        options.max_msg_timeout,
    )?;
    check_ordering(
        "min_output_buffer_timeout",
        options.min_output_buffer_timeout,
        "max_output_buffer_timeout",
        options.max_output_buffer_timeout,
    )
}

fn parse_setting<T: FromStr>(
    value: Option<&str>,
    error: fn(String) -> ValidationError,
) -> Result<Option<T>, ValidationError> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.parse::<T>().map_err(|_| error(text.to_owned())))
        .transpose()
}

/// An empty path means "not configured".
pub(crate) fn non_empty_path(path: Option<Utf8PathBuf>) -> Option<Utf8PathBuf> {
    path.filter(|path| !path.as_str().trim().is_empty())
}

fn check_node_id(node_id: i64) -> Result<(), ValidationError> {
    if (0..NODE_ID_SPACE).contains(&node_id) {
        Ok(())
    } else {
        Err(ValidationError::NodeId(node_id))
    }
}

fn check_deflate_level(level: i64) -> Result<(), ValidationError> {
    if (1..=9).contains(&level) {
        Ok(())
    } else {
        Err(ValidationError::DeflateLevel(level))
    }
}

fn check_percentiles(percentiles: &[f64]) -> Result<(), ValidationError> {
    match percentiles
        .iter()
        .find(|value| !(**value > 0.0 && **value <= 1.0))
    {
        Some(value) => Err(ValidationError::Percentile(*value)),
        None => Ok(()),
    }
}

fn check_non_negative(option: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        Err(ValidationError::Negative { option, value })
    } else {
        Ok(())
    }
}

fn check_ordering(
    lower: &'static str,
    lower_value: Duration,
    upper: &'static str,
    upper_value: Duration,
) -> Result<(), ValidationError> {
    if lower_value > upper_value {
        Err(ValidationError::Ordering {
            lower,
            lower_value: format_duration(lower_value),
            upper,
            upper_value: format_duration(upper_value),
        })
    } else {
        Ok(())
    }
}
