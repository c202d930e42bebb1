//! Facts about how the process was launched.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Opts a launch into supervised behaviour. Service managers that already
/// honour a working directory (systemd's `WorkingDirectory=`) leave it unset.
pub const SUPERVISED_ENV_VAR: &str = "NSQD_SUPERVISED";

/// Launch context consulted by `Init`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    supervised: bool,
    executable: Option<PathBuf>,
}

impl PlatformInfo {
    /// Inspects the environment of the current process.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(|name| env::var_os(name))
    }

    fn detect_from(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        Self {
            supervised: lookup(SUPERVISED_ENV_VAR).is_some(),
            executable: env::current_exe().ok(),
        }
    }

    /// An interactive foreground launch.
    #[must_use]
    pub fn interactive() -> Self {
        Self::default()
    }

    /// A launch by a service manager, running `executable`.
    #[must_use]
    pub fn supervised(executable: impl Into<PathBuf>) -> Self {
        Self {
            supervised: true,
            executable: Some(executable.into()),
        }
    }

    /// Whether a service manager started the process.
    #[must_use]
    pub fn is_supervised(&self) -> bool {
        self.supervised
    }

    /// Path of the running executable, when known.
    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// Directory the process should switch to before resolving relative
    /// paths, or `None` for interactive launches.
    #[must_use]
    pub fn service_directory(&self) -> Option<&Path> {
        if !self.supervised {
            return None;
        }
        self.executable().and_then(Path::parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    type Vars = &'static [(&'static str, &'static str)];

    fn environment(vars: Vars) -> impl Fn(&str) -> Option<OsString> {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| OsString::from(value))
        }
    }

    #[rstest]
    #[case::bare(&[], false)]
    #[case::systemd_unit(&[("INVOCATION_ID", "4f1c")], false)]
    #[case::opted_in(&[(SUPERVISED_ENV_VAR, "1")], true)]
    #[case::systemd_and_opted_in(&[("INVOCATION_ID", "4f1c"), (SUPERVISED_ENV_VAR, "1")], true)]
    fn only_the_explicit_opt_in_marks_a_supervised_launch(
        #[case] vars: Vars,
        #[case] supervised: bool,
    ) {
        let platform = PlatformInfo::detect_from(environment(vars));
        assert_eq!(platform.is_supervised(), supervised);
        assert_eq!(platform.service_directory().is_some(), supervised);
    }

    #[test]
    fn interactive_launch_keeps_working_directory() {
        assert_eq!(PlatformInfo::interactive().service_directory(), None);
    }

    #[test]
    fn supervised_launch_uses_executable_directory() {
        let platform = PlatformInfo::supervised("/opt/nsq/bin/nsqd");
        assert!(platform.is_supervised());
        assert_eq!(
            platform.service_directory(),
            Some(Path::new("/opt/nsq/bin"))
        );
    }
}
