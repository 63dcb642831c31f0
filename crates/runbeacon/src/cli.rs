use clap::{Parser, Subcommand};

/// Runbeacon – workflow run notifier for chat webhooks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Activate verbose output (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarise the current workflow run and post it to the webhook
    Send {
        /// Print the webhook payload instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print build information
    Version {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_with_dry_run() {
        let cli = Cli::try_parse_from(["runbeacon", "-vv", "send", "--dry-run"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Send { dry_run: true }));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["runbeacon"]).is_err());
    }
}
