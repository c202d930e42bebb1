/// Version line printed for `--version`.
#[must_use]
pub fn version_string() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
