use std::process::ExitCode;

fn main() -> ExitCode {
    match triple_if::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(triple_if::errors::get_exit_code(&e))
        }
    }
}
