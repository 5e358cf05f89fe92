use std::process::ExitCode;

fn main() -> ExitCode {
    legacy_bridge::cli::run()
}
