use std::process::ExitCode;

fn main() -> ExitCode {
    nsqd::run_daemon()
}
