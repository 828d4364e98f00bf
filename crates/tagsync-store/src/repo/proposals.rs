use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use tagsync_core::{PostId, ProposalId, ProposedEdit, RuleId, TagRuleDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStatus {
    Open,
    Committed,
    Dismissed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "open",
            ProposalStatus::Committed => "committed",
            ProposalStatus::Dismissed => "dismissed",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "open" => Ok(ProposalStatus::Open),
            "committed" => Ok(ProposalStatus::Committed),
            "dismissed" => Ok(ProposalStatus::Dismissed),
            _ => Err(StoreError::InvalidProposal(format!(
                "unknown proposal status {value}"
            ))),
        }
    }
}

/// A prompt-bucket edit waiting for a moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub id: ProposalId,
    pub post_id: PostId,
    pub rule_id: RuleId,
    pub delta: TagRuleDelta,
    pub status: ProposalStatus,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}

impl Proposal {
    pub fn as_edit(&self) -> ProposedEdit {
        ProposedEdit {
            rule_id: self.rule_id,
            delta: self.delta.clone(),
        }
    }
}

pub struct ProposalsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ProposalsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Opens a proposal unless one is already open for the same post and
    /// rule. Returns the open proposal and whether it was created now.
    pub fn open(
        &self,
        now_utc: i64,
        post_id: PostId,
        edit: &ProposedEdit,
    ) -> Result<(Proposal, bool)> {
        let id = ProposalId::new();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO rule_proposals
             (id, post_id, rule_id, replace_spec, status, created_at, resolved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL);",
            params![
                id.to_string(),
                post_id.get(),
                edit.rule_id.to_string(),
                edit.delta.api_string(),
                ProposalStatus::Open.as_str(),
                now_utc
            ],
        )?;

        let proposal = self
            .find_open(post_id, edit.rule_id)?
            .ok_or_else(|| StoreError::InvalidProposal("missing proposal after insert".into()))?;
        Ok((proposal, inserted > 0))
    }

    pub fn find_open(&self, post_id: PostId, rule_id: RuleId) -> Result<Option<Proposal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, rule_id, replace_spec, status, created_at, resolved_at
             FROM rule_proposals
             WHERE post_id = ?1 AND rule_id = ?2 AND status = ?3;",
        )?;
        let mut rows = stmt.query(params![
            post_id.get(),
            rule_id.to_string(),
            ProposalStatus::Open.as_str()
        ])?;
        if let Some(row) = rows.next()? {
            Ok(Some(proposal_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get(&self, id: ProposalId) -> Result<Option<Proposal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, rule_id, replace_spec, status, created_at, resolved_at
             FROM rule_proposals
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(proposal_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Open proposals, oldest first, optionally for a single post.
    pub fn list_open(&self, post_id: Option<PostId>) -> Result<Vec<Proposal>> {
        let mut stmt = match post_id {
            Some(_) => self.conn.prepare(
                "SELECT id, post_id, rule_id, replace_spec, status, created_at, resolved_at
                 FROM rule_proposals
                 WHERE status = ?1 AND post_id = ?2
                 ORDER BY created_at ASC, rowid ASC;",
            )?,
            None => self.conn.prepare(
                "SELECT id, post_id, rule_id, replace_spec, status, created_at, resolved_at
                 FROM rule_proposals
                 WHERE status = ?1
                 ORDER BY post_id ASC, created_at ASC, rowid ASC;",
            )?,
        };

        let mut rows = match post_id {
            Some(post_id) => stmt.query(params![ProposalStatus::Open.as_str(), post_id.get()])?,
            None => stmt.query([ProposalStatus::Open.as_str()])?,
        };

        let mut proposals = Vec::new();
        while let Some(row) = rows.next()? {
            proposals.push(proposal_from_row(row)?);
        }
        Ok(proposals)
    }

    /// Moves an open proposal to a final status.
    pub fn resolve(&self, now_utc: i64, id: ProposalId, status: ProposalStatus) -> Result<()> {
        if status == ProposalStatus::Open {
            return Err(StoreError::InvalidProposal(
                "cannot resolve a proposal as open".to_string(),
            ));
        }
        let updated = self.conn.execute(
            "UPDATE rule_proposals
             SET status = ?1, resolved_at = ?2
             WHERE id = ?3 AND status = ?4;",
            params![
                status.as_str(),
                now_utc,
                id.to_string(),
                ProposalStatus::Open.as_str()
            ],
        )?;
        if updated == 0 {
            let exists: Option<String> = self
                .conn
                .query_row(
                    "SELECT status FROM rule_proposals WHERE id = ?1;",
                    [id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match exists {
                Some(current) => {
                    StoreError::InvalidProposal(format!("proposal {id} is already {current}"))
                }
                None => StoreError::NotFound(format!("proposal {id}")),
            });
        }
        Ok(())
    }
}

fn proposal_from_row(row: &rusqlite::Row<'_>) -> Result<Proposal> {
    let id_str: String = row.get(0)?;
    let id = ProposalId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let post_id = PostId::new(row.get(1)?)?;
    let rule_str: String = row.get(2)?;
    let rule_id = RuleId::from_str(&rule_str).map_err(|_| StoreError::InvalidId(rule_str.clone()))?;
    let replace_spec: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    Ok(Proposal {
        id,
        post_id,
        rule_id,
        delta: TagRuleDelta::parse(&replace_spec),
        status: ProposalStatus::from_str(&status_str)?,
        created_at: row.get(5)?,
        resolved_at: row.get(6)?,
    })
}
