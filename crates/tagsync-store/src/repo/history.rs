use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::str::FromStr;
use tagsync_core::{AppliedHistoryKey, PostId, RuleId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub rule_id: RuleId,
    pub post_id: PostId,
    pub actor: String,
    pub applied_at: i64,
}

impl HistoryRecord {
    pub fn key(&self) -> AppliedHistoryKey {
        AppliedHistoryKey::new(self.rule_id, self.post_id)
    }
}

/// Applied-rule records. They only suppress re-proposals; losing one causes
/// a rule to be evaluated again, nothing more.
pub struct HistoryRepo<'a> {
    conn: &'a Connection,
}

impl<'a> HistoryRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn record(&self, record: &HistoryRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO applied_history (rule_id, post_id, actor, applied_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.rule_id.to_string(),
                record.post_id.get(),
                record.actor,
                record.applied_at
            ],
        )?;
        Ok(())
    }

    /// Keys with at least one record at or after `since`.
    pub fn recent_keys(&self, since: i64) -> Result<HashSet<AppliedHistoryKey>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT rule_id, post_id FROM applied_history WHERE applied_at >= ?1;",
        )?;
        let mut rows = stmt.query([since])?;
        let mut keys = HashSet::new();
        while let Some(row) = rows.next()? {
            let rule_id = parse_rule_id(row.get(0)?)?;
            let post_id = PostId::new(row.get(1)?)?;
            keys.insert(AppliedHistoryKey::new(rule_id, post_id));
        }
        Ok(keys)
    }

    pub fn was_applied_since(&self, key: AppliedHistoryKey, since: i64) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM applied_history
                 WHERE rule_id = ?1 AND post_id = ?2 AND applied_at >= ?3
                 LIMIT 1;",
                params![key.rule_id.to_string(), key.post_id.get(), since],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn list_for_post(&self, post_id: PostId) -> Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT rule_id, post_id, actor, applied_at
             FROM applied_history
             WHERE post_id = ?1
             ORDER BY applied_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([post_id.get()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(HistoryRecord {
                rule_id: parse_rule_id(row.get(0)?)?,
                post_id: PostId::new(row.get(1)?)?,
                actor: row.get(2)?,
                applied_at: row.get(3)?,
            });
        }
        Ok(records)
    }

    /// Drops records older than `before`.
    pub fn prune(&self, before: i64) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM applied_history WHERE applied_at < ?1;", [before])?;
        Ok(deleted)
    }
}

fn parse_rule_id(raw: String) -> Result<RuleId> {
    RuleId::from_str(&raw).map_err(|_| StoreError::InvalidId(raw))
}
