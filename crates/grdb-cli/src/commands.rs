//! Implementations of the `migration` subcommands.

use crate::formatter;
use crate::prompt::{self, ReadlinePrompt, Review};
use grdb_core::migration::{
    apply_pending, status, DdlStatement, MigrationLog, MigrationPlan, MigrationStatus, Planner,
    ProjectLayout, AUTO_ACCEPT_THRESHOLD,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// `migration create`: diff, review (or auto-accept), write.
pub fn migration_create(
    layout: ProjectLayout,
    non_interactive: bool,
    allow_unsafe: bool,
) -> CliResult {
    let planner = Planner::new(layout);
    let plan = planner.plan()?;
    if plan.is_empty() {
        println!("No schema changes detected.");
        return Ok(());
    }

    let statements = if non_interactive {
        auto_accept(&plan, allow_unsafe)?
    } else {
        let mut input = ReadlinePrompt::new()?;
        match prompt::review_proposals(&plan.proposals, &mut input)? {
            Review::Accepted(statements) => statements,
            Review::Stopped(statements) if !statements.is_empty() => {
                println!("Writing the confirmed changes only.");
                statements
            }
            Review::Stopped(_) => {
                println!("Nothing confirmed; no migration written.");
                return Ok(());
            }
            Review::Aborted => {
                println!("Aborted; no migration written.");
                return Ok(());
            }
        }
    };

    let (path, script) = planner.write_migration(&plan, statements)?;
    println!(
        "Created {} ({})",
        path.display(),
        formatter::short_id(&script.id)
    );
    Ok(())
}

/// Accept every proposal the engine is confident about, or refuse the run.
fn auto_accept(
    plan: &MigrationPlan,
    allow_unsafe: bool,
) -> Result<Vec<DdlStatement>, Box<dyn std::error::Error>> {
    let mut statements = Vec::new();
    for proposal in &plan.proposals {
        if proposal.confidence < AUTO_ACCEPT_THRESHOLD {
            return Err(format!(
                "cannot auto-accept '{}' (confidence {:.2}); run without --non-interactive",
                proposal.prompt, proposal.confidence
            )
            .into());
        }
        if !proposal.required_input.is_empty() {
            return Err(format!(
                "'{}' needs a user-supplied expression; run without --non-interactive",
                proposal.prompt
            )
            .into());
        }
        if proposal.safety.needs_unsafe_flag() && !allow_unsafe {
            return Err(format!(
                "'{}' discards data; pass --allow-unsafe to accept it",
                proposal.prompt
            )
            .into());
        }
        statements.extend(proposal.statements.clone());
    }
    Ok(statements)
}

/// `migration apply`: replay the chain and advance the applied log.
pub fn migration_apply(layout: ProjectLayout, dry_run: bool) -> CliResult {
    let planner = Planner::new(layout);
    let report = apply_pending(&planner.repo(), dry_run)?;
    if report.applied.is_empty() {
        println!("Nothing to apply.");
        return Ok(());
    }
    for id in &report.applied {
        if report.dry_run {
            println!("Would apply {}", formatter::short_id(id));
        } else {
            println!("Applied {}", formatter::short_id(id));
        }
    }
    Ok(())
}

/// `migration status`: table of files vs. the applied log.
pub fn migration_status(layout: ProjectLayout) -> CliResult {
    let planner = Planner::new(layout);
    let migrations = planner.history()?;
    let log = MigrationLog::load(planner.repo().dir())?;
    if migrations.is_empty() && log.is_empty() {
        println!("No migrations.");
        return Ok(());
    }

    println!("{}", formatter::status_table(&migrations, &log));
    let state = status(&log, &migrations);
    println!("{state}");
    if matches!(state, MigrationStatus::Diverged { .. }) {
        return Err("the applied log does not match the migration files".into());
    }
    Ok(())
}

/// `migration log`: what has been applied, and when.
pub fn migration_log(layout: ProjectLayout) -> CliResult {
    let planner = Planner::new(layout);
    let log = MigrationLog::load(planner.repo().dir())?;
    if log.is_empty() {
        println!("No migrations applied.");
        return Ok(());
    }
    println!("{}", formatter::log_table(&log));
    Ok(())
}
