//! Runs the DAENCE known-answer tests and exits non-zero on
//! failure.

use std::process::ExitCode;

fn main() -> ExitCode {
    match daence::self_test() {
        Ok(()) => {
            println!("daence: self-test passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("daence: {err}");
            ExitCode::FAILURE
        }
    }
}
