//! branch-decrypt - decrypt .st files on every remote branch
//!
//! Reads GITHUB_USERNAME, GITHUB_TOKEN, REPO_NAME and REPO_OWNER from the
//! environment, then sweeps every remote branch except main/master.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use branch_decrypt::cli::run::handle_run;
use branch_decrypt::cli::Cli;
use branch_decrypt::error::SweepError;

fn main() {
    // Initialize logging; progress lines are info events from this crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,branch_decrypt=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = handle_run(cli) {
        handle_error(e);
        std::process::exit(1);
    }
}

/// Report a fatal error
fn handle_error(e: SweepError) {
    match &e {
        // The working tree may hold half-applied changes
        SweepError::Finalize { .. }
        | SweepError::PushRejected { .. }
        | SweepError::Push { .. }
        | SweepError::PushAuthentication { .. } => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("The run stopped partway. Run 'git status' in the repository before retrying.");
        }
        _ => {
            eprintln!("Error: {}", e);
        }
    }
}
