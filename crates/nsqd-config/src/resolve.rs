//! Layered option resolution: defaults, then the configuration file, then
//! command-line flags.

use camino::Utf8PathBuf;

use crate::flags::FlagOverrides;
use crate::options::Options;
use crate::validate::{ValidatedConfig, ValidationError, check_resolved, non_empty_path};

/// Merges the three configuration sources into the final option set.
///
/// Each option takes its value from exactly one source: the flag when set,
/// otherwise the file when the key is present, otherwise the default. Values
/// are replaced wholesale, so a list from the file is never combined with a
/// list from the flags. The merged result is then checked for rules that
/// span several options.
///
/// The function performs no I/O; identical inputs always produce identical
/// output.
pub fn resolve(
    defaults: Options,
    file: Option<&ValidatedConfig>,
    flags: &FlagOverrides,
) -> Result<Options, ValidationError> {
    let mut options = defaults;
    if let Some(file) = file {
        apply_file(&mut options, file);
    }
    apply_flags(&mut options, flags);
    check_resolved(&options)?;
    Ok(options)
}

fn overlay<T: Clone>(slot: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        slot.clone_from(value);
    }
}

/// An empty path clears the slot so an operator can switch TLS off from a
/// higher-precedence source.
fn overlay_path(slot: &mut Option<Utf8PathBuf>, value: Option<&Utf8PathBuf>) {
    if let Some(value) = value {
        *slot = non_empty_path(Some(value.clone()));
    }
}

fn apply_file(options: &mut Options, file: &ValidatedConfig) {
    let raw = file.raw();
    overlay(&mut options.node_id, raw.node_id.as_ref());
    overlay(&mut options.log_level, raw.log_level.as_ref());
    overlay(&mut options.log_format, raw.log_format.as_ref());
    overlay(&mut options.data_path, raw.data_path.as_ref());

    overlay(&mut options.tcp_address, raw.tcp_address.as_ref());
    overlay(&mut options.http_address, raw.http_address.as_ref());
    overlay(&mut options.https_address, raw.https_address.as_ref());
    overlay(&mut options.broadcast_address, raw.broadcast_address.as_ref());
    overlay(&mut options.broadcast_tcp_port, raw.broadcast_tcp_port.as_ref());
    overlay(&mut options.broadcast_http_port, raw.broadcast_http_port.as_ref());
    overlay(
        &mut options.lookupd_tcp_addresses,
        raw.lookupd_tcp_addresses.as_ref(),
    );
    overlay(
        &mut options.auth_http_addresses,
        raw.auth_http_addresses.as_ref(),
    );
    overlay(
        &mut options.http_client_connect_timeout,
        raw.http_client_connect_timeout.as_ref(),
    );
    overlay(
        &mut options.http_client_request_timeout,
        raw.http_client_request_timeout.as_ref(),
    );

    overlay(&mut options.mem_queue_size, raw.mem_queue_size.as_ref());
    overlay(&mut options.max_bytes_per_file, raw.max_bytes_per_file.as_ref());
    overlay(&mut options.sync_every, raw.sync_every.as_ref());
    overlay(&mut options.sync_timeout, raw.sync_timeout.as_ref());
    overlay(
        &mut options.queue_scan_interval,
        raw.queue_scan_interval.as_ref(),
    );
    overlay(
        &mut options.queue_scan_worker_pool_max,
        raw.queue_scan_worker_pool_max.as_ref(),
    );

    overlay(&mut options.msg_timeout, raw.msg_timeout.as_ref());
    overlay(&mut options.max_msg_timeout, raw.max_msg_timeout.as_ref());
    overlay(&mut options.max_msg_size, raw.max_msg_size.as_ref());
    overlay(&mut options.max_body_size, raw.max_body_size.as_ref());
    overlay(&mut options.max_req_timeout, raw.max_req_timeout.as_ref());
    overlay(&mut options.client_timeout, raw.client_timeout.as_ref());
    overlay(
        &mut options.max_channel_consumers,
        raw.max_channel_consumers.as_ref(),
    );

    overlay(
        &mut options.max_heartbeat_interval,
        raw.max_heartbeat_interval.as_ref(),
    );
    overlay(&mut options.max_rdy_count, raw.max_rdy_count.as_ref());
    overlay(
        &mut options.max_output_buffer_size,
        raw.max_output_buffer_size.as_ref(),
    );
    overlay(
        &mut options.max_output_buffer_timeout,
        raw.max_output_buffer_timeout.as_ref(),
    );
    overlay(
        &mut options.min_output_buffer_timeout,
        raw.min_output_buffer_timeout.as_ref(),
    );
    overlay(
        &mut options.output_buffer_timeout,
        raw.output_buffer_timeout.as_ref(),
    );

    overlay(&mut options.statsd_address, raw.statsd_address.as_ref());
    overlay(&mut options.statsd_prefix, raw.statsd_prefix.as_ref());
    overlay(&mut options.statsd_interval, raw.statsd_interval.as_ref());
    overlay(&mut options.statsd_mem_stats, raw.statsd_mem_stats.as_ref());
    overlay(
        &mut options.statsd_udp_packet_size,
        raw.statsd_udp_packet_size.as_ref(),
    );

    overlay(
        &mut options.e2e_processing_latency_window_time,
        raw.e2e_processing_latency_window_time.as_ref(),
    );
    overlay(
        &mut options.e2e_processing_latency_percentiles,
        raw.e2e_processing_latency_percentiles.as_ref(),
    );

    overlay_path(&mut options.tls_cert, raw.tls_cert.as_ref());
    overlay_path(&mut options.tls_key, raw.tls_key.as_ref());
    overlay_path(&mut options.tls_root_ca_file, raw.tls_root_ca_file.as_ref());
    overlay(
        &mut options.tls_client_auth_policy,
        file.tls_client_auth_policy.as_ref(),
    );
    overlay(&mut options.tls_required, file.tls_required.as_ref());
    overlay(&mut options.tls_min_version, file.tls_min_version.as_ref());

    overlay(&mut options.deflate, raw.deflate.as_ref());
    overlay(&mut options.max_deflate_level, raw.max_deflate_level.as_ref());
    overlay(&mut options.snappy, raw.snappy.as_ref());
}

fn apply_flags(options: &mut Options, flags: &FlagOverrides) {
    overlay(&mut options.node_id, flags.node_id.as_ref());
    overlay(&mut options.log_level, flags.log_level.as_ref());
    overlay(&mut options.log_format, flags.log_format.as_ref());
    overlay(&mut options.data_path, flags.data_path.as_ref());

    overlay(&mut options.tcp_address, flags.tcp_address.as_ref());
    overlay(&mut options.http_address, flags.http_address.as_ref());
    overlay(&mut options.https_address, flags.https_address.as_ref());
    overlay(
        &mut options.broadcast_address,
        flags.broadcast_address.as_ref(),
    );
    overlay(
        &mut options.broadcast_tcp_port,
        flags.broadcast_tcp_port.as_ref(),
    );
    overlay(
        &mut options.broadcast_http_port,
        flags.broadcast_http_port.as_ref(),
    );
    overlay(
        &mut options.lookupd_tcp_addresses,
        flags.lookupd_tcp_addresses.as_ref(),
    );
    overlay(
        &mut options.auth_http_addresses,
        flags.auth_http_addresses.as_ref(),
    );
    overlay(
        &mut options.http_client_connect_timeout,
        flags.http_client_connect_timeout.as_ref(),
    );
    overlay(
        &mut options.http_client_request_timeout,
        flags.http_client_request_timeout.as_ref(),
    );

    overlay(&mut options.mem_queue_size, flags.mem_queue_size.as_ref());
    overlay(
        &mut options.max_bytes_per_file,
        flags.max_bytes_per_file.as_ref(),
    );
    overlay(&mut options.sync_every, flags.sync_every.as_ref());
    overlay(&mut options.sync_timeout, flags.sync_timeout.as_ref());
    overlay(
        &mut options.queue_scan_interval,
        flags.queue_scan_interval.as_ref(),
    );
    overlay(
        &mut options.queue_scan_worker_pool_max,
        flags.queue_scan_worker_pool_max.as_ref(),
    );

    overlay(&mut options.msg_timeout, flags.msg_timeout.as_ref());
    overlay(&mut options.max_msg_timeout, flags.max_msg_timeout.as_ref());
    overlay(&mut options.max_msg_size, flags.max_msg_size.as_ref());
    overlay(&mut options.max_body_size, flags.max_body_size.as_ref());
    overlay(&mut options.max_req_timeout, flags.max_req_timeout.as_ref());
    overlay(&mut options.client_timeout, flags.client_timeout.as_ref());
    overlay(
        &mut options.max_channel_consumers,
        flags.max_channel_consumers.as_ref(),
    );

    overlay(
        &mut options.max_heartbeat_interval,
        flags.max_heartbeat_interval.as_ref(),
    );
    overlay(&mut options.max_rdy_count, flags.max_rdy_count.as_ref());
    overlay(
        &mut options.max_output_buffer_size,
        flags.max_output_buffer_size.as_ref(),
    );
    overlay(
        &mut options.max_output_buffer_timeout,
        flags.max_output_buffer_timeout.as_ref(),
    );
    overlay(
        &mut options.min_output_buffer_timeout,
        flags.min_output_buffer_timeout.as_ref(),
    );
    overlay(
        &mut options.output_buffer_timeout,
        flags.output_buffer_timeout.as_ref(),
    );

    overlay(&mut options.statsd_address, flags.statsd_address.as_ref());
    overlay(&mut options.statsd_prefix, flags.statsd_prefix.as_ref());
    overlay(&mut options.statsd_interval, flags.statsd_interval.as_ref());
    overlay(&mut options.statsd_mem_stats, flags.statsd_mem_stats.as_ref());
    overlay(
        &mut options.statsd_udp_packet_size,
        flags.statsd_udp_packet_size.as_ref(),
    );

    overlay(
        &mut options.e2e_processing_latency_window_time,
        flags.e2e_processing_latency_window_time.as_ref(),
    );
    overlay(
        &mut options.e2e_processing_latency_percentiles,
        flags.e2e_processing_latency_percentiles.as_ref(),
    );

    overlay_path(&mut options.tls_cert, flags.tls_cert.as_ref());
    overlay_path(&mut options.tls_key, flags.tls_key.as_ref());
    overlay_path(
        &mut options.tls_root_ca_file,
        flags.tls_root_ca_file.as_ref(),
    );
    overlay(
        &mut options.tls_client_auth_policy,
        flags.tls_client_auth_policy.as_ref(),
    );
    overlay(&mut options.tls_required, flags.tls_required.as_ref());
    overlay(&mut options.tls_min_version, flags.tls_min_version.as_ref());

    overlay(&mut options.deflate, flags.deflate.as_ref());
    overlay(
        &mut options.max_deflate_level,
        flags.max_deflate_level.as_ref(),
    );
    overlay(&mut options.snappy, flags.snappy.as_ref());
}
