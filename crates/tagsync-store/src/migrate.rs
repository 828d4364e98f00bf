use crate::error::{Result, StoreError};
use rusqlite::{Connection, OptionalExtension};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version; versions are contiguous from 1.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "001_init.sql",
    sql: include_str!("../migrations/001_init.sql"),
}];

const SCHEMA_TABLE: &str = "CREATE TABLE IF NOT EXISTS tagsync_schema (version INTEGER NOT NULL);
     INSERT INTO tagsync_schema (version)
     SELECT 0 WHERE NOT EXISTS (SELECT 1 FROM tagsync_schema);";

/// Applies pending migrations in one transaction; a failure leaves the
/// schema at its previous version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(SCHEMA_TABLE)?;
    let current = schema_version(&tx)?;

    let latest = MIGRATIONS.last().map_or(0, |migration| migration.version);
    if current > latest {
        return Err(StoreError::Migration(format!(
            "db version {current} newer than available migrations {latest}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql).map_err(|err| {
            StoreError::Migration(format!("{} failed: {err}", migration.name))
        })?;
        let updated = tx.execute("UPDATE tagsync_schema SET version = ?1;", [migration.version])?;
        if updated != 1 {
            return Err(StoreError::Migration(format!(
                "expected single schema row, updated {updated}"
            )));
        }
    }

    tx.commit()?;
    Ok(())
}

/// Current schema version, 0 before the first migration.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'tagsync_schema';",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(0);
    }
    let version: Option<i64> = conn
        .query_row("SELECT version FROM tagsync_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::{run_migrations, schema_version, MIGRATIONS};
    use crate::db::open_in_memory;

    #[test]
    fn versions_are_contiguous() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, index as i64 + 1, "{}", migration.name);
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = open_in_memory().expect("open");
        assert_eq!(schema_version(&conn).expect("version"), 0);
        run_migrations(&conn).expect("first");
        run_migrations(&conn).expect("second");
        assert_eq!(
            schema_version(&conn).expect("version"),
            MIGRATIONS.len() as i64
        );
    }

    #[test]
    fn newer_database_is_refused() {
        let conn = open_in_memory().expect("open");
        run_migrations(&conn).expect("migrate");
        conn.execute("UPDATE tagsync_schema SET version = 99;", [])
            .expect("bump");
        assert!(run_migrations(&conn).is_err());
    }
}
