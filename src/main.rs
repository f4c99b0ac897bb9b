//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `certinfo` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Ctrl-C handling
//! - Exit code mapping
//!
//! All core functionality is implemented in the library crate.

use std::io;
use std::process;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use certinfo::app::cancel_on_ctrl_c;
use certinfo::initialization::{init_crypto_provider, init_logger_with};
use certinfo::output::IgnoreBrokenPipe;
use certinfo::{run, Config, OutputFormat};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = init_logger_with(config.effective_log_level(), config.log_format.clone()) {
        eprintln!("certinfo: failed to initialize logger: {e}");
        process::exit(1);
    }

    init_crypto_provider();

    let cancel = CancellationToken::new();
    let signal_task = cancel_on_ctrl_c(cancel.clone());

    let mut stdout = IgnoreBrokenPipe::new(io::stdout());
    let outcome = run(&config, &mut stdout, &cancel).await;
    signal_task.abort();

    match outcome {
        Ok(outcome) => {
            if let Some(combined) = &outcome.combined {
                if config.output != OutputFormat::None {
                    eprintln!("problem running certinfo: {combined}");
                }
            }
            process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("certinfo: {e:#}");
            process::exit(1);
        }
    }
}
