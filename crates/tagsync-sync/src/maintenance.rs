//! The rule maintenance cycle: evaluate every mirrored post against the
//! rule catalogue, submit automatic edits, queue the rest for moderators.
//!
//! History is written only after the remote API accepted an edit, in the
//! same transaction that refreshes the mirror. A crash in between loses the
//! history row and the rule is simply evaluated again next cycle, so replace
//! specs have to be safe to apply twice.

use crate::api::PostEditor;
use crate::{Result, SyncError};
use chrono::Duration;
use serde::Serialize;
use std::collections::HashSet;
use tagsync_core::{
    combine, evaluate_post, MatchOutcome, PostId, ProposalId, ProposedEdit, RuleId, TagRuleDelta,
    TagSet,
};
use tagsync_store::error::StoreError;
use tagsync_store::repo::{HistoryRecord, HistoryRepo, PostsRepo, Proposal, ProposalStatus, ProposalsRepo};
use tagsync_store::Store;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub now_utc: i64,
    pub retention_days: i64,
    pub actor: String,
    pub edit_reason: String,
    pub dry_run: bool,
}

impl CycleOptions {
    /// Oldest history timestamp that still suppresses a rule.
    pub fn history_since(&self) -> i64 {
        self.now_utc - Duration::days(self.retention_days).num_seconds()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedEdit {
    pub post_id: PostId,
    pub diff: TagRuleDelta,
    pub rule_ids: Vec<RuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditFailure {
    pub post_id: PostId,
    pub rule_ids: Vec<RuleId>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub dry_run: bool,
    pub rules: usize,
    pub posts_evaluated: usize,
    /// Automatic edits sent, or in a dry run the edits that would be sent.
    pub submitted: Vec<SubmittedEdit>,
    pub proposals_opened: usize,
    pub suppressed: usize,
    pub failures: Vec<EditFailure>,
}

pub fn run_cycle(
    store: &Store,
    editor: &dyn PostEditor,
    options: &CycleOptions,
) -> Result<CycleReport> {
    let mut report = CycleReport {
        dry_run: options.dry_run,
        ..CycleReport::default()
    };

    let rules = store.rules().list()?;
    report.rules = rules.len();
    if rules.is_empty() {
        debug!("no replacement rules, skipping cycle");
        return Ok(report);
    }

    let applied = store.history().recent_keys(options.history_since())?;
    let posts = store.posts().load_all()?;
    report.posts_evaluated = posts.len();

    for (post_id, tags) in &posts {
        let outcome = evaluate_post(&rules, *post_id, tags, &applied);
        report.suppressed += outcome.suppressed.len();
        if outcome.is_empty() {
            continue;
        }
        if !outcome.auto.is_empty() {
            apply_auto(store, editor, options, &outcome, &mut report)?;
        }
        queue_prompts(store, options, &outcome, &mut report)?;
    }

    info!(
        rules = report.rules,
        posts = report.posts_evaluated,
        submitted = report.submitted.len(),
        proposals = report.proposals_opened,
        failures = report.failures.len(),
        dry_run = report.dry_run,
        "maintenance cycle finished"
    );
    Ok(report)
}

fn apply_auto(
    store: &Store,
    editor: &dyn PostEditor,
    options: &CycleOptions,
    outcome: &MatchOutcome,
    report: &mut CycleReport,
) -> Result<()> {
    let post_id = outcome.post_id;
    let rule_ids = outcome.auto_rule_ids();
    let combined = outcome.auto_delta();

    if combined.is_zero() {
        return Ok(());
    }

    if options.dry_run {
        report.submitted.push(SubmittedEdit {
            post_id,
            diff: combined,
            rule_ids,
        });
        return Ok(());
    }

    match submit(editor, post_id, &combined, &options.edit_reason) {
        Ok(remote_tags) => {
            store.transaction(|conn| -> Result<()> {
                record_history(&HistoryRepo::new(conn), options, post_id, &rule_ids)?;
                PostsRepo::new(conn).replace_tags(options.now_utc, post_id, &remote_tags)?;
                Ok(())
            })?;
            info!(post = %post_id, diff = %combined, rules = rule_ids.len(), "automatic edit applied");
            report.submitted.push(SubmittedEdit {
                post_id,
                diff: combined,
                rule_ids,
            });
        }
        Err(err) => {
            warn!(post = %post_id, diff = %combined, error = %err, "automatic edit failed");
            report.failures.push(EditFailure {
                post_id,
                rule_ids,
                error: err.to_string(),
            });
        }
    }
    Ok(())
}

fn queue_prompts(
    store: &Store,
    options: &CycleOptions,
    outcome: &MatchOutcome,
    report: &mut CycleReport,
) -> Result<()> {
    for edit in &outcome.prompt {
        if options.dry_run {
            let open = store.proposals().find_open(outcome.post_id, edit.rule_id)?;
            if open.is_none() {
                report.proposals_opened += 1;
            }
            continue;
        }
        let (proposal, created) = store
            .proposals()
            .open(options.now_utc, outcome.post_id, edit)?;
        if created {
            debug!(post = %outcome.post_id, proposal = %proposal.id, diff = %edit.delta, "proposal opened");
            report.proposals_opened += 1;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub post_id: PostId,
    pub diff: TagRuleDelta,
    pub proposal_ids: Vec<ProposalId>,
    pub rule_ids: Vec<RuleId>,
}

/// Submits a moderator's selection of open proposals for one post as a
/// single edit, folded in the order given.
///
/// Nothing is recorded when the submission fails.
pub fn commit_proposals(
    store: &Store,
    editor: &dyn PostEditor,
    post_id: PostId,
    proposal_ids: &[ProposalId],
    options: &CycleOptions,
) -> Result<CommitReport> {
    if proposal_ids.is_empty() {
        return Err(StoreError::InvalidProposal("no proposals selected".to_string()).into());
    }

    let mut seen = HashSet::new();
    let mut selected: Vec<Proposal> = Vec::with_capacity(proposal_ids.len());
    for id in proposal_ids {
        if !seen.insert(*id) {
            continue;
        }
        selected.push(load_open_proposal(store, *id, post_id)?);
    }

    let edits: Vec<ProposedEdit> = selected.iter().map(Proposal::as_edit).collect();
    let diff = combine(&edits);
    let rule_ids: Vec<RuleId> = edits.iter().map(|edit| edit.rule_id).collect();

    let remote_tags = submit(editor, post_id, &diff, &options.edit_reason)?;

    store.transaction(|conn| -> Result<()> {
        record_history(&HistoryRepo::new(conn), options, post_id, &rule_ids)?;
        let proposals = ProposalsRepo::new(conn);
        for proposal in &selected {
            proposals.resolve(options.now_utc, proposal.id, ProposalStatus::Committed)?;
        }
        PostsRepo::new(conn).replace_tags(options.now_utc, post_id, &remote_tags)?;
        Ok(())
    })?;

    info!(post = %post_id, diff = %diff, proposals = selected.len(), "proposals committed");
    Ok(CommitReport {
        post_id,
        diff,
        proposal_ids: selected.iter().map(|proposal| proposal.id).collect(),
        rule_ids,
    })
}

/// Rejects an open proposal. The rule is recorded as handled for the post so
/// it is not proposed again inside the retention window.
pub fn dismiss_proposal(
    store: &Store,
    proposal_id: ProposalId,
    options: &CycleOptions,
) -> Result<Proposal> {
    let proposal = store
        .proposals()
        .get(proposal_id)?
        .ok_or_else(|| StoreError::NotFound(format!("proposal {proposal_id}")))?;

    store.transaction(|conn| -> Result<()> {
        ProposalsRepo::new(conn).resolve(options.now_utc, proposal.id, ProposalStatus::Dismissed)?;
        record_history(
            &HistoryRepo::new(conn),
            options,
            proposal.post_id,
            &[proposal.rule_id],
        )?;
        Ok(())
    })?;

    info!(post = %proposal.post_id, proposal = %proposal.id, "proposal dismissed");
    Ok(proposal)
}

fn load_open_proposal(store: &Store, id: ProposalId, post_id: PostId) -> Result<Proposal> {
    let proposal = store
        .proposals()
        .get(id)?
        .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
    if proposal.post_id != post_id {
        return Err(StoreError::InvalidProposal(format!(
            "proposal {id} belongs to post {}",
            proposal.post_id
        ))
        .into());
    }
    if proposal.status != ProposalStatus::Open {
        return Err(StoreError::InvalidProposal(format!(
            "proposal {id} is already {}",
            proposal.status.as_str()
        ))
        .into());
    }
    Ok(proposal)
}

fn submit(
    editor: &dyn PostEditor,
    post_id: PostId,
    diff: &TagRuleDelta,
    reason: &str,
) -> Result<TagSet> {
    let remote = editor.submit_edit(post_id, diff, reason)?;
    if remote.id != post_id {
        return Err(SyncError::Rejected {
            post_id: post_id.get(),
            message: format!("api answered for post {}", remote.id),
        });
    }
    Ok(remote.tags)
}

fn record_history(
    history: &HistoryRepo<'_>,
    options: &CycleOptions,
    post_id: PostId,
    rule_ids: &[RuleId],
) -> Result<()> {
    for rule_id in rule_ids {
        history.record(&HistoryRecord {
            rule_id: *rule_id,
            post_id,
            actor: options.actor.clone(),
            applied_at: options.now_utc,
        })?;
    }
    Ok(())
}
