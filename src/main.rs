use clap::Parser;
use clap::error::ErrorKind;
use covid_observations::cli::args::{Args, requests_load};
use covid_observations::cli::commands;
use std::process;

fn main() {
    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    // Unknown arguments without --load are reported and the process exits cleanly
    let args = match Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
                || requests_load(&argv)
            {
                e.exit();
            }
            eprintln!("invalid parameters: {:?}", &argv[1..]);
            process::exit(0);
        }
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    // Ctrl+C stops the server gracefully and aborts a load in progress
    let result = runtime.block_on(commands::run(args));

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
