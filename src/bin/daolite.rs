use daolite::cli::{self, Invocation};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    info!("Starting daolite...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = Invocation::parse(&args).and_then(|invocation| cli::run(&invocation));

    match outcome {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
