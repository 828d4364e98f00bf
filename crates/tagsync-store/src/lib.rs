pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod query;
pub mod repo;

use crate::error::{Result, StoreError};
use rusqlite::Connection;
use std::path::Path;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `work` inside one transaction. Nothing is committed when it fails.
    pub fn transaction<T, E>(
        &self,
        work: impl FnOnce(&Connection) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(StoreError::from)?;
        let value = work(&tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    pub fn posts(&self) -> repo::PostsRepo<'_> {
        repo::PostsRepo::new(&self.conn)
    }

    pub fn rules(&self) -> repo::RulesRepo<'_> {
        repo::RulesRepo::new(&self.conn)
    }

    pub fn history(&self) -> repo::HistoryRepo<'_> {
        repo::HistoryRepo::new(&self.conn)
    }

    pub fn proposals(&self) -> repo::ProposalsRepo<'_> {
        repo::ProposalsRepo::new(&self.conn)
    }
}
