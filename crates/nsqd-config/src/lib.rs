//! Configuration for the `nsqd` broker daemon.
//!
//! Three sources feed the final [`Options`]: compiled-in defaults, an
//! optional TOML file selected with `--config`, and command-line flags. The
//! file is decoded into a [`RawConfig`], checked by [`RawConfig::validate`],
//! and then merged with the flags by [`resolve`]. Precedence runs from
//! defaults (lowest) through the file to flags (highest).

mod defaults;
mod duration;
mod flags;
mod logging;
mod options;
mod raw;
mod resolve;
mod tls;
mod validate;

pub use defaults::{
    DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, DEFAULT_TCP_PORT, NODE_ID_SPACE, default_hostname,
    default_node_id, node_id_for,
};
pub use duration::{DurationParseError, format_duration, parse_duration};
pub use flags::{Cli, FlagOverrides};
pub use logging::{LogFormat, LogLevel, LogParseError};
pub use options::Options;
pub use raw::{ConfigFileError, RawConfig};
pub use resolve::resolve;
pub use tls::{TlsClientAuthPolicy, TlsRequired, TlsVersion};
pub use validate::{ValidatedConfig, ValidationError};
