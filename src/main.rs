use std::process::ExitCode;

fn main() -> ExitCode {
    match deploy_verify::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
