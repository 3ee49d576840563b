//! Versioned schema migrations
//!
//! Storage backends implement [`Migration`] once per schema change and a
//! [`MigrationManager`] that records applied versions in
//! `_tollgate_migrations`. Versions are applied in ascending order and each
//! one runs in its own transaction.
use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;
use tollgate_core::error::StorageError;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Duplicate migration version {0}")]
    DuplicateVersion(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MigrationError> for tollgate_core::Error {
    fn from(err: MigrationError) -> Self {
        tollgate_core::Error::Storage(StorageError::Migration(err.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Apply the schema change
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Revert the schema change
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique version number for ordering migrations
    fn version(&self) -> i64;

    /// Human readable name of the migration
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix timestamp in seconds
    pub applied_at: i64,
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        "_tollgate_migrations"
    }

    /// Create the tracking table if it does not exist
    async fn initialize(&self) -> Result<()>;

    /// Apply every migration that has not been recorded yet
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Revert applied migrations, newest first
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;
}

/// Select the migrations missing from `applied`, in ascending version order
///
/// Fails if two migrations share a version, since only one of them could
/// ever be recorded.
pub fn pending<'m, DB: Database>(
    migrations: &'m [Box<dyn Migration<DB>>],
    applied: &[MigrationRecord],
) -> Result<Vec<&'m dyn Migration<DB>>> {
    let mut seen = HashSet::new();
    for migration in migrations {
        if !seen.insert(migration.version()) {
            return Err(MigrationError::DuplicateVersion(migration.version()));
        }
    }

    let applied: HashSet<i64> = applied.iter().map(|r| r.version).collect();
    let mut pending: Vec<&dyn Migration<DB>> = migrations
        .iter()
        .map(|m| m.as_ref())
        .filter(|m| !applied.contains(&m.version()))
        .collect();
    pending.sort_by_key(|m| m.version());
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Sqlite;

    struct Noop(i64);

    #[async_trait]
    impl Migration<Sqlite> for Noop {
        async fn up<'a>(&'a self, _conn: &'a mut sqlx::SqliteConnection) -> Result<()> {
            Ok(())
        }

        async fn down<'a>(&'a self, _conn: &'a mut sqlx::SqliteConnection) -> Result<()> {
            Ok(())
        }

        fn version(&self) -> i64 {
            self.0
        }

        fn name(&self) -> &str {
            "noop"
        }
    }

    fn record(version: i64) -> MigrationRecord {
        MigrationRecord {
            version,
            name: "noop".to_string(),
            applied_at: 0,
        }
    }

    #[test]
    fn test_pending_skips_applied_and_sorts() {
        let migrations: Vec<Box<dyn Migration<Sqlite>>> =
            vec![Box::new(Noop(3)), Box::new(Noop(1)), Box::new(Noop(2))];

        let versions: Vec<i64> = pending(&migrations, &[record(2)])
            .unwrap()
            .iter()
            .map(|m| m.version())
            .collect();
        assert_eq!(versions, vec![1, 3]);
    }

    #[test]
    fn test_pending_rejects_duplicate_versions() {
        let migrations: Vec<Box<dyn Migration<Sqlite>>> = vec![Box::new(Noop(1)), Box::new(Noop(1))];
        assert!(matches!(
            pending(&migrations, &[]),
            Err(MigrationError::DuplicateVersion(1))
        ));
    }
}
