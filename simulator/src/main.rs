use std::process::ExitCode;

fn main() -> ExitCode {
    match simulator::modules::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("elevator-sim: {}", e);
            ExitCode::FAILURE
        }
    }
}
