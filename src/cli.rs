use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "chatline", about = "Terminal chat client with local conversation state")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the interactive shell
    Run,
    /// Print conversations, newest activity first
    Conversations {
        /// Only show participants whose name contains this text
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Print the latest messages of one conversation
    Messages {
        conversation: String,
        /// Number of messages to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn defaults_to_run_when_command_is_missing() {
        let cli = Cli::parse_from(["chatline"]);

        assert_eq!(cli.command_or_default(), Command::Run);
    }

    #[test]
    fn parses_explicit_run_command() {
        let cli = Cli::parse_from(["chatline", "run", "--config", "custom.toml"]);

        assert_eq!(cli.command_or_default(), Command::Run);
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn parses_conversations_with_query() {
        let cli = Cli::parse_from(["chatline", "conversations", "--query", "emma"]);

        assert_eq!(
            cli.command_or_default(),
            Command::Conversations {
                query: Some("emma".to_owned())
            }
        );
    }

    #[test]
    fn parses_messages_with_limit() {
        let cli = Cli::parse_from(["chatline", "messages", "c1", "-l", "5"]);

        assert_eq!(
            cli.command_or_default(),
            Command::Messages {
                conversation: "c1".to_owned(),
                limit: Some(5),
            }
        );
    }
}
