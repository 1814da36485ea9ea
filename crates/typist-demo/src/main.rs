#![forbid(unsafe_code)]

//! Typist demo binary entry point.

use typist_demo::cli::{self, Opts, Parsed};
use typist_demo::{app, logging};

fn main() {
    let opts = match Opts::parse() {
        Ok(Parsed::Run(opts)) => opts,
        Ok(Parsed::Help) => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Parsed::Version) => {
            println!("typist-demo {}", cli::VERSION);
            return;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if let Some(path) = &opts.log_file
        && let Err(e) = logging::init_file(path)
    {
        eprintln!("Failed to open log file {}: {e}", path.display());
        std::process::exit(1);
    }
    for error in &opts.env_errors {
        tracing::warn!(%error, "ignoring environment override");
    }
    if let Err(errors) = opts.config.validate() {
        for error in &errors {
            tracing::warn!(%error, "nothing to animate");
        }
    }

    match app::run(&opts) {
        Ok(exit) => tracing::debug!(?exit, "demo finished"),
        Err(e) => {
            eprintln!("Runtime error: {e}");
            std::process::exit(1);
        }
    }
}
