//! # Codex CLI
//!
//! Command-line front end for the equation archive and the Veritas ledger.
//! See `codex --help` for the command list.

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{equations, ledger, members, Context};
use error::{CliError, Result};
use tracing::{debug, info};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Error: failed to set up logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let CliError::Core(core) = &e {
            if core.is_recoverable() {
                eprintln!("The archive is in use; try again once the other edit finishes.");
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("codex {} starting", env!("CARGO_PKG_VERSION"));
    let config = config::resolve(&cli)?;
    let ctx = Context::new(config);
    debug!("Running {:?}", cli.command);

    match &cli.command {
        Commands::Init(args) => equations::init(&ctx, args),
        Commands::AddEq(args) => equations::add_eq(&ctx, args),
        Commands::ListEq(args) => equations::list_eq(&ctx, args),
        Commands::ShowEq(args) => equations::show_eq(&ctx, args),
        Commands::RemoveEq { id } => equations::remove_eq(&ctx, id),
        Commands::Classes => equations::classes(&ctx),
        Commands::Search { text } => equations::search(&ctx, text),
        Commands::Import(args) => equations::import(&ctx, args),
        Commands::Export { output } => equations::export(&ctx, output),
        Commands::ScanSymbols { id } => equations::scan_symbols(&ctx, id.as_deref()),
        Commands::AddMember(args) => members::add_member(&ctx, args),
        Commands::ListMembers => members::list_members(&ctx),
        Commands::RemoveMember { id } => members::remove_member(&ctx, id),
        Commands::Log(args) => ledger::log(&ctx, &args.event, &args.payload),
        Commands::Chain { event } => ledger::chain(&ctx, event.as_deref()),
        Commands::VerifyChain { quarantine } => ledger::verify_chain(&ctx, *quarantine),
        Commands::Demo => ledger::demo(),
    }
}
