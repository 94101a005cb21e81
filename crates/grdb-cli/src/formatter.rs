//! Table rendering for `migration status` and `migration log`.

use comfy_table::{Cell, Table};
use grdb_core::migration::{MigrationLog, NumberedMigration};

/// Shorten a migration id for display.
pub fn short_id(id: &str) -> String {
    if id.len() > 14 {
        format!("{}..", &id[..14])
    } else {
        id.to_string()
    }
}

/// One row per migration file, with when it was applied.
pub fn status_table(migrations: &[NumberedMigration], log: &MigrationLog) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "migration", "applied at"]);
    for m in migrations {
        let applied = log
            .entries
            .iter()
            .find(|e| e.number == m.number && e.id == m.script.id);
        table.add_row(vec![
            Cell::new(format!("{:05}", m.number)),
            Cell::new(short_id(&m.script.id)),
            Cell::new(match applied {
                Some(entry) => entry.applied_at.to_rfc3339(),
                None => "pending".to_string(),
            }),
        ]);
    }
    table
}

/// One row per applied migration, in application order.
pub fn log_table(log: &MigrationLog) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "migration", "applied at", "statements"]);
    for entry in &log.entries {
        table.add_row(vec![
            Cell::new(format!("{:05}", entry.number)),
            Cell::new(short_id(&entry.id)),
            Cell::new(entry.applied_at.to_rfc3339()),
            Cell::new(entry.statements),
        ]);
    }
    table
}
