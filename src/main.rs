//! zit - a minimal local version-control tool

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = zit::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
