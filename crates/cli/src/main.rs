use std::process::ExitCode;

fn main() -> ExitCode {
    adops_cli::run()
}
