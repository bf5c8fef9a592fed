//! qrmark CLI - ticket verification, redemption and ledger inspection.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod input;
mod output;

use commands::{audit, list, redeem, total, verify};

#[derive(Parser)]
#[command(name = "qrmark")]
#[command(about = "qrmark ticket verification and redemption CLI")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArg {
    /// Path to the service configuration (TOML)
    #[arg(long)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a ticket and redeem it for a user
    Redeem {
        #[command(flatten)]
        config: ConfigArg,
        /// Authenticated user redeeming the ticket
        #[arg(long)]
        user: u64,
        /// Ticket string, or '-' / omitted to read stdin
        ticket: Option<String>,
        /// Output the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a ticket against a public key without redeeming it
    Verify {
        /// PEM or DER encoded P-256 public key
        #[arg(long)]
        key: PathBuf,
        /// Ticket string, or '-' / omitted to read stdin
        ticket: Option<String>,
        /// Clock skew tolerance in seconds
        #[arg(long, default_value_t = 0)]
        leeway: u64,
    },
    /// Show point totals
    Total {
        #[command(subcommand)]
        target: TotalTarget,
    },
    /// List committed redemptions, newest first
    List {
        #[command(flatten)]
        config: ConfigArg,
        /// Only records redeemed by this user
        #[arg(long)]
        user: Option<u64>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a journal for duplicate redemptions
    Audit {
        /// Path to journal file
        journal: PathBuf,
        /// Treat a truncated final frame as end of journal
        #[arg(long)]
        permissive: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TotalTarget {
    /// Points committed to one user
    User {
        #[command(flatten)]
        config: ConfigArg,
        /// User ID
        id: u64,
    },
    /// Points committed to all members of a school
    School {
        #[command(flatten)]
        config: ConfigArg,
        /// School ID
        id: u64,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Redeem {
            config,
            user,
            ticket,
            json,
        } => redeem::run(config.config, user, ticket, json),
        Commands::Verify {
            key,
            ticket,
            leeway,
        } => verify::run(key, ticket, leeway),
        Commands::Total { target } => match target {
            TotalTarget::User { config, id } => total::user(config.config, id),
            TotalTarget::School { config, id } => total::school(config.config, id),
        },
        Commands::List {
            config,
            user,
            page,
            json,
        } => list::run(config.config, user, page, json),
        Commands::Audit {
            journal,
            permissive,
            json,
        } => audit::run(journal, permissive, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,qrmark=debug" } else { "warn,qrmark=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
