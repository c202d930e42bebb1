use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;

use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use nsqd_config::{Cli, Options, RawConfig, resolve};

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    loaded: RefCell<Option<Options>>,
    error: RefCell<Option<String>>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("nsqd")]),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
        }
    }

    fn write_config(&self, contents: &str) {
        let path = self.temp_dir.path().join("nsqd.toml");
        if let Err(error) = fs::write(&path, contents) {
            panic!("failed to write configuration: {error}");
        }

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config"));
        args.push(path.into_os_string());
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match load_options(args) {
            Ok(options) => {
                *self.loaded.borrow_mut() = Some(options);
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(error);
            }
        }
    }

    fn options(&self) -> Options {
        self.load();

        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }

        match self.loaded.borrow().as_ref() {
            Some(options) => options.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

fn load_options(args: Vec<OsString>) -> Result<Options, String> {
    let cli = Cli::try_parse_from(args).map_err(|error| error.to_string())?;
    let file = match cli.config_path() {
        Some(path) => {
            let raw = RawConfig::from_file(path).map_err(|error| error.to_string())?;
            Some(raw.validate().map_err(|error| error.to_string())?)
        }
        None => None,
    };
    resolve(Options::default(), file.as_ref(), &cli.overrides).map_err(|error| error.to_string())
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("an empty configuration file flag")]
fn given_empty_config_flag(harness: &Harness) {
    harness.push_cli_arg("--config=");
}

#[given("a configuration file setting the TCP address to \"{address}\"")]
fn given_configuration_file(harness: &Harness, address: String) {
    harness.write_config(&format!("tcp_address = \"{address}\"\n"));
}

#[when("the CLI sets the TCP address to \"{address}\"")]
fn when_cli_override(harness: &Harness, address: String) {
    harness.push_cli_arg("--tcp-address");
    harness.push_cli_arg(address);
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("loading the configuration resolves the TCP port to {port}")]
fn then_resolved_port(harness: &Harness, port: u16) {
    assert_eq!(harness.options().tcp_address.port(), port);
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let options = harness.options();
    let defaults = Options::default();

    assert_eq!(options.tcp_address.port(), 4150);
    assert_eq!(options, defaults);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply when no file is configured"
)]
fn defaults_without_file(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The configuration file overrides defaults"
)]
fn file_overrides_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command-line flags override the configuration file"
)]
fn flags_override_file(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command-line flags override defaults without a file"
)]
fn flags_override_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}
