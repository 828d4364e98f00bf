use crate::commands::maintain::{build_editor, cycle_options};
use crate::commands::{print_json, Context};
use crate::util::{format_timestamp, parse_post_id, parse_proposal_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tagsync_core::{PostId, ProposalId, RuleId};
use tagsync_store::repo::Proposal;
use tagsync_sync::maintenance;

#[derive(Debug, Subcommand)]
pub enum ProposalCommand {
    Ls(ProposalListArgs),
    /// Submit selected proposals of one post as a single edit
    Commit(ProposalCommitArgs),
    Dismiss(ProposalDismissArgs),
}

#[derive(Debug, Args)]
pub struct ProposalListArgs {
    #[arg(long)]
    pub post: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProposalCommitArgs {
    pub post: String,
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ProposalDismissArgs {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct ProposalDto {
    id: ProposalId,
    post_id: PostId,
    rule_id: RuleId,
    delta: String,
    status: &'static str,
    created_at: i64,
}

impl From<&Proposal> for ProposalDto {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.id,
            post_id: proposal.post_id,
            rule_id: proposal.rule_id,
            delta: proposal.delta.api_string(),
            status: proposal.status.as_str(),
            created_at: proposal.created_at,
        }
    }
}

pub fn list_proposals(ctx: &Context<'_>, args: ProposalListArgs) -> Result<()> {
    let post = args.post.as_deref().map(parse_post_id).transpose()?;
    let proposals = ctx.store.proposals().list_open(post)?;
    let items: Vec<ProposalDto> = proposals.iter().map(ProposalDto::from).collect();

    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    if items.is_empty() {
        println!("no open proposals");
        return Ok(());
    }
    for item in items {
        println!(
            "{}  post {}  [{}]  {}",
            item.id,
            item.post_id,
            item.delta,
            format_timestamp(item.created_at)
        );
    }
    Ok(())
}

pub fn commit_proposals(ctx: &Context<'_>, args: ProposalCommitArgs) -> Result<()> {
    let post = parse_post_id(&args.post)?;
    let ids = args
        .ids
        .iter()
        .map(|raw| parse_proposal_id(raw))
        .collect::<Result<Vec<_>>>()?;
    let options = cycle_options(ctx.config, false, None)?;
    let editor = build_editor(ctx.config, false)?;
    let report = maintenance::commit_proposals(ctx.store, editor.as_ref(), post, &ids, &options)?;

    if ctx.json {
        print_json(&report)?;
    } else {
        println!(
            "post {} edited: {} ({} proposals)",
            report.post_id,
            report.diff,
            report.proposal_ids.len()
        );
    }
    Ok(())
}

pub fn dismiss_proposal(ctx: &Context<'_>, args: ProposalDismissArgs) -> Result<()> {
    let id = parse_proposal_id(&args.id)?;
    let options = cycle_options(ctx.config, false, None)?;
    let proposal = maintenance::dismiss_proposal(ctx.store, id, &options)?;

    if ctx.json {
        print_json(&serde_json::json!({
            "id": proposal.id,
            "post_id": proposal.post_id,
            "dismissed": true
        }))?;
    } else {
        println!("proposal {} dismissed", proposal.id);
    }
    Ok(())
}
