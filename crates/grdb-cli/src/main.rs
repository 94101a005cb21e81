//! `grdb` command-line interface.

mod commands;
mod formatter;
mod prompt;

use clap::{Parser, Subcommand};
use grdb_core::migration::ProjectLayout;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "grdb")]
#[command(version, about = "Declarative schema migrations for grdb projects")]
struct Args {
    /// Project root directory.
    #[arg(short = 'P', long, default_value = ".", global = true)]
    project: PathBuf,

    /// Schema directory, when it is not `<project>/schema`.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the project's migration history.
    Migration {
        #[command(subcommand)]
        action: MigrationAction,
    },
}

#[derive(Subcommand, Debug)]
enum MigrationAction {
    /// Diff the schema directory against history and write a new migration.
    Create {
        /// Accept confident proposals without prompting; refuse the rest.
        #[arg(long)]
        non_interactive: bool,

        /// Permit proposals that discard existing data.
        #[arg(long)]
        allow_unsafe: bool,
    },
    /// Apply pending migrations and advance the applied log.
    Apply {
        /// Verify the chain without touching the log.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show where the applied log stands relative to the files.
    Status,
    /// List applied migrations.
    Log,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("grdb=info".parse().unwrap())
                .add_directive("grdb_core=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut layout = ProjectLayout::new(&args.project);
    if let Some(dir) = &args.schema_dir {
        layout = layout.with_schema_dir(dir);
    }

    match args.command {
        Command::Migration { action } => match action {
            MigrationAction::Create {
                non_interactive,
                allow_unsafe,
            } => commands::migration_create(layout, non_interactive, allow_unsafe),
            MigrationAction::Apply { dry_run } => commands::migration_apply(layout, dry_run),
            MigrationAction::Status => commands::migration_status(layout),
            MigrationAction::Log => commands::migration_log(layout),
        },
    }
}
