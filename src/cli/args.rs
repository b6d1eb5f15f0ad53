//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Truth-match Monte Carlo decay chains against reference decay patterns
#[derive(Parser, Debug)]
#[command(name = "decaymatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Project directory holding .decaymatch.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the canonical form of a decay pattern
    Show {
        /// Decay descriptor, e.g. "D*+ -> [D0 -> K- pi+] pi+"
        pattern: String,
    },

    /// Keep candidates whose decay chain matches a pattern
    Filter {
        /// Decay descriptor to match
        pattern: String,
        /// Candidate file (JSON array or JSON lines)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Print only the indices of retained candidates
        #[arg(long, conflicts_with = "json")]
        indices: bool,
        /// Print retained candidates as JSON lines
        #[arg(long)]
        json: bool,
        /// Evaluate candidates in parallel
        #[arg(short, long)]
        parallel: bool,
    },

    /// Count candidates per decay channel
    Classify {
        /// Candidate file (JSON array or JSON lines)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Channel as NAME=DESCRIPTOR; repeatable, mode ids follow the order given
        #[arg(short, long = "channel", value_name = "NAME=DESCRIPTOR")]
        channels: Vec<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Evaluate candidates in parallel
        #[arg(short, long)]
        parallel: bool,
    },

    /// List known particle names and PDG codes
    Particles,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_repeated_channel_flags_when_parsing_then_keeps_order() {
        let cli = Cli::try_parse_from([
            "decaymatch",
            "-dd",
            "classify",
            "cands.json",
            "-c",
            "Kpi=D0 -> K- pi+",
            "--channel",
            "K3pi=D0 -> K- pi+ pi+ pi-",
        ])
        .unwrap();
        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Classify { channels, .. }) => {
                assert_eq!(channels.len(), 2);
                assert!(channels[0].starts_with("Kpi="));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_indices_and_json_when_parsing_then_conflict() {
        let result = Cli::try_parse_from([
            "decaymatch",
            "filter",
            "D0 -> K- pi+",
            "cands.json",
            "--indices",
            "--json",
        ]);
        assert!(result.is_err());
    }
}
