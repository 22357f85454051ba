use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Requirement traceability enforcement: test naming, bidirectional links and chains"
)]
pub struct Cli {
    /// Path to a configuration file (default: $FDL_CONFIG, ./fdl.yaml, user config)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory of requirement documents
    #[clap(long, global = true)]
    pub requirements_dir: Option<PathBuf>,

    /// Root directory of test files
    #[clap(long, global = true)]
    pub tests_dir: Option<PathBuf>,

    /// Root directory of code units
    #[clap(long, global = true)]
    pub code_dir: Option<PathBuf>,

    /// Test file extension (default: py)
    #[clap(long, global = true)]
    pub ext: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate test file names against TC-{LEVEL}-{ID}_{component}.{ext}
    Naming {
        /// Validate a single test file
        #[clap(long, conflicts_with_all = ["level", "all"])]
        file: Option<PathBuf>,

        /// Validate all tests of one level (UT, IT, ST, AT)
        #[clap(long, conflicts_with = "all")]
        level: Option<String>,

        /// Validate every test file
        #[clap(long)]
        all: bool,

        /// Directory to scan (default: the configured tests directory)
        #[clap(long)]
        directory: Option<PathBuf>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Validate bidirectional links between requirements and tests
    Links {
        /// Validate one requirement's tested_by links
        #[clap(long, conflicts_with_all = ["test", "all"])]
        requirement: Option<String>,

        /// Validate one test's back-reference
        #[clap(long, conflicts_with = "all")]
        test: Option<String>,

        /// Validate every requirement and every test
        #[clap(long)]
        all: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show the traceability chain below a requirement
    Tree {
        /// Start from a user story
        #[clap(long, conflicts_with_all = ["sys", "sw", "id", "all"])]
        us: Option<String>,

        /// Start from a system requirement
        #[clap(long, conflicts_with_all = ["sw", "id", "all"])]
        sys: Option<String>,

        /// Start from a software requirement
        #[clap(long, conflicts_with_all = ["id", "all"])]
        sw: Option<String>,

        /// Start from any requirement, level inferred from its prefix
        #[clap(long, conflicts_with = "all")]
        id: Option<String>,

        /// Analyze every requirement
        #[clap(long)]
        all: bool,

        /// Output format
        #[clap(long, value_enum, default_value_t = TreeFormat::Text)]
        format: TreeFormat,

        /// Exit with status 1 unless every analyzed chain is complete
        #[clap(long)]
        strict: bool,
    },

    /// Configuration file management
    #[clap(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Where to write it (default: ./fdl.yaml)
        #[clap(long)]
        path: Option<PathBuf>,

        /// Write to the per-user configuration path instead
        #[clap(long, conflicts_with = "path")]
        user: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeFormat {
    Text,
    Json,
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tree_with_global_flags() {
        let cli = Cli::try_parse_from([
            "fdl",
            "tree",
            "--sw",
            "SW-REQ-010",
            "--format",
            "markdown",
            "--tests-dir",
            "qa",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.tests_dir, Some(PathBuf::from("qa")));
        match cli.command {
            Command::Tree { sw, format, strict, .. } => {
                assert_eq!(sw.as_deref(), Some("SW-REQ-010"));
                assert_eq!(format, TreeFormat::Markdown);
                assert!(!strict);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_exclusive_selectors_conflict() {
        assert!(Cli::try_parse_from(["fdl", "naming", "--file", "a.py", "--all"]).is_err());
        assert!(Cli::try_parse_from(["fdl", "links", "--requirement", "SW-1", "--test", "t.py"]).is_err());
        assert!(Cli::try_parse_from(["fdl", "tree", "--us", "US-1", "--sw", "SW-1"]).is_err());
    }
}
