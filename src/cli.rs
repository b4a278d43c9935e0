use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "newsdigest",
    version,
    about = "Authorize Gmail accounts and check newsletter digest configuration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authorize a Gmail account and print its refresh token
    Auth {
        /// Account name (letters, digits, underscores)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "")]
        account: Option<String>,

        /// Print the consent URL without opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Validate environment configuration and print a summary
    CheckConfig,
}
