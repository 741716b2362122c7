use mcsrv_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stdout belongs to the child.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI, run, and exit with the child's status. Exiting here also
    // ends a stdin bridge still blocked on the terminal.
    match Cli::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("mcsrv error: {:#}", err);
            std::process::exit(1);
        }
    }
}
