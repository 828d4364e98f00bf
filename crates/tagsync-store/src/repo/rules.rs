use crate::error::{Result, StoreError};
use rusqlite::{params, Connection};
use std::str::FromStr;
use tagsync_core::{ReplacementRule, RuleId, TagDelta, TagRuleDelta};

pub struct RulesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> RulesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(
        &self,
        now_utc: i64,
        match_spec: TagDelta,
        replace_spec: TagRuleDelta,
        autofix: bool,
    ) -> Result<ReplacementRule> {
        let rule = ReplacementRule::new(RuleId::new(), match_spec, replace_spec, autofix);
        self.insert(now_utc, &rule)?;
        Ok(rule)
    }

    /// Persists the rule as its two canonical strings and the autofix flag.
    pub fn insert(&self, now_utc: i64, rule: &ReplacementRule) -> Result<()> {
        if rule.replace_spec.is_zero() {
            return Err(StoreError::InvalidRule(
                "replace spec cannot be empty".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO replacement_rules (id, match_spec, replace_spec, autofix, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                rule.id.to_string(),
                rule.match_string(),
                rule.replace_string(),
                rule.autofix,
                now_utc
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: RuleId) -> Result<Option<ReplacementRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, match_spec, replace_spec, autofix
             FROM replacement_rules
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(rule_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// All rules in creation order, which is also their evaluation order.
    pub fn list(&self) -> Result<Vec<ReplacementRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, match_spec, replace_spec, autofix
             FROM replacement_rules
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next()? {
            rules.push(rule_from_row(row)?);
        }
        Ok(rules)
    }

    pub fn set_autofix(&self, id: RuleId, autofix: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE replacement_rules SET autofix = ?1 WHERE id = ?2;",
            params![autofix, id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("rule {id}")));
        }
        Ok(())
    }

    pub fn delete(&self, id: RuleId) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM replacement_rules WHERE id = ?1;",
            [id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

fn rule_from_row(row: &rusqlite::Row<'_>) -> Result<ReplacementRule> {
    let id_str: String = row.get(0)?;
    let id = RuleId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let match_spec: String = row.get(1)?;
    let replace_spec: String = row.get(2)?;
    let autofix: bool = row.get(3)?;
    Ok(ReplacementRule::from_persisted(
        id,
        &match_spec,
        &replace_spec,
        autofix,
    ))
}
