use clap::{Args, Parser, Subcommand, ValueEnum};
use codex_core::MergePolicy;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "codex",
    author = "Codex Contributors",
    version,
    about = "Codex - equation catalog, archive and Veritas ledger"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a file in addition to stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Configuration file (defaults to ./codex.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Archive file, overriding the configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub archive: Option<PathBuf>,

    /// Ledger file, overriding the configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// User recorded in locks and ledger events
    #[arg(long, global = true, value_name = "NAME")]
    pub user: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new archive file
    Init(InitArgs),
    /// Register an equation in the archive
    AddEq(AddEqArgs),
    /// List equations, optionally filtered
    ListEq(ListEqArgs),
    /// Show one equation
    ShowEq(ShowEqArgs),
    /// Remove an equation
    RemoveEq {
        /// Equation id
        id: String,
    },
    /// Show classification tags with counts
    Classes,
    /// Case-insensitive text search over id, name, description and formula
    Search {
        text: String,
    },
    /// Merge a catalog JSON file into the archive
    Import(ImportArgs),
    /// Write the archive's equations as catalog JSON
    Export {
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },
    /// Compare formula symbols with declared variables
    ScanSymbols {
        /// Only scan this equation
        id: Option<String>,
    },
    /// Add a lineage member
    AddMember(AddMemberArgs),
    /// List lineage members
    ListMembers,
    /// Remove a lineage member
    RemoveMember {
        /// Member UUID as printed by `list-members`
        id: Uuid,
    },
    /// Append an arbitrary event to the ledger
    Log(LogArgs),
    /// Print ledger blocks
    Chain {
        /// Only blocks with this event name
        #[arg(long)]
        event: Option<String>,
    },
    /// Replay the ledger and verify every hash link
    VerifyChain {
        /// Move a ledger with invalid JSON aside and start a new one
        #[arg(long)]
        quarantine: bool,
    },
    /// Print sample lookups from the builtin catalog
    Demo,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Archive title
    #[arg(long, default_value = "Codex Archive")]
    pub title: String,

    /// Start from the builtin catalog
    #[arg(long)]
    pub seed: bool,

    /// Replace an existing archive file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct AddEqArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub formula: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub classification: String,

    /// Declared variable (repeatable)
    #[arg(long = "variable", value_name = "NAME")]
    pub variables: Vec<String>,

    #[arg(long, default_value = "")]
    pub origin: String,

    /// Fail instead of overwriting an existing id
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct ListEqArgs {
    #[arg(long)]
    pub classification: Option<String>,

    #[arg(long)]
    pub origin: Option<String>,

    /// Print JSON instead of one line per equation
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowEqArgs {
    pub id: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// What to do with ids already in the archive
    #[arg(long, value_enum, default_value_t = PolicyArg::Keep)]
    pub policy: PolicyArg,
}

#[derive(Args, Debug)]
pub struct AddMemberArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub role: String,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Event name
    pub event: String,

    /// JSON payload
    #[arg(long, default_value = "{}")]
    pub payload: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    Keep,
    Overwrite,
    Reject,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Keep => MergePolicy::KeepExisting,
            PolicyArg::Overwrite => MergePolicy::Overwrite,
            PolicyArg::Reject => MergePolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_eq_with_repeated_variables() {
        let cli = Cli::try_parse_from([
            "codex", "add-eq", "--id", "EQ1", "--name", "Energia", "--formula", "E = m c^2",
            "--variable", "E", "--variable", "m", "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::AddEq(args) => {
                assert_eq!(args.id, "EQ1");
                assert_eq!(args.variables, vec!["E", "m"]);
                assert!(args.strict);
                assert!(args.classification.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["codex", "list-eq", "-vv", "--archive", "a.cdx"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.archive, Some(PathBuf::from("a.cdx")));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["codex", "demo", "-q", "-v"]).is_err());
    }

    #[test]
    fn remove_member_requires_uuid() {
        assert!(Cli::try_parse_from(["codex", "remove-member", "not-a-uuid"]).is_err());
        let cli = Cli::try_parse_from(["codex", "remove-member", "67e55044-10b1-426f-9247-bb680e5fe0c8"]).unwrap();
        assert!(matches!(cli.command, Commands::RemoveMember { .. }));
    }

    #[test]
    fn import_policy_maps_to_merge_policy() {
        let cli = Cli::try_parse_from(["codex", "import", "x.json", "--policy", "reject"]).unwrap();
        match cli.command {
            Commands::Import(args) => assert_eq!(MergePolicy::from(args.policy), MergePolicy::Reject),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
