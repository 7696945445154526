use std::process::ExitCode;

fn main() -> ExitCode {
    match nsdird::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("nsdird: {error}");
            ExitCode::FAILURE
        }
    }
}
