use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsdigest::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Variables already in the environment win over .env.
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth {
            account,
            no_browser,
        } => {
            let Some(account) = account.filter(|a| !a.is_empty()) else {
                eprintln!("Usage: newsdigest auth --account=<name>");
                eprintln!("Example: newsdigest auth --account=personal");
                std::process::exit(1);
            };
            newsdigest::auth::run(&account, !no_browser)
        }
        Commands::CheckConfig => newsdigest::check::run(),
    }
}
