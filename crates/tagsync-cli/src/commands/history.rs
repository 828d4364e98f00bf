use crate::commands::maintain::resolve_retention_days;
use crate::commands::{print_json, Context};
use crate::util::{format_timestamp, now_utc, parse_post_id};
use anyhow::Result;
use chrono::Duration;
use clap::{Args, Subcommand};
use serde::Serialize;
use tagsync_core::RuleId;

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// Rules recorded as applied to a post
    Ls(HistoryListArgs),
    /// Drop records older than the retention window
    Prune(HistoryPruneArgs),
}

#[derive(Debug, Args)]
pub struct HistoryListArgs {
    pub post: String,
}

#[derive(Debug, Args)]
pub struct HistoryPruneArgs {
    #[arg(long)]
    pub retention_days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct HistoryDto {
    rule_id: RuleId,
    actor: String,
    applied_at: i64,
}

pub fn list_history(ctx: &Context<'_>, args: HistoryListArgs) -> Result<()> {
    let post = parse_post_id(&args.post)?;
    let items: Vec<HistoryDto> = ctx
        .store
        .history()
        .list_for_post(post)?
        .into_iter()
        .map(|record| HistoryDto {
            rule_id: record.rule_id,
            actor: record.actor,
            applied_at: record.applied_at,
        })
        .collect();

    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    if items.is_empty() {
        println!("no history for post {}", post);
        return Ok(());
    }
    for item in items {
        println!(
            "{}  {}  {}",
            format_timestamp(item.applied_at),
            item.rule_id,
            item.actor
        );
    }
    Ok(())
}

pub fn prune_history(ctx: &Context<'_>, args: HistoryPruneArgs) -> Result<()> {
    let days = resolve_retention_days(ctx.config, args.retention_days)?;
    let before = now_utc() - Duration::days(days).num_seconds();
    let pruned = ctx.store.history().prune(before)?;

    if ctx.json {
        print_json(&serde_json::json!({ "pruned": pruned }))?;
    } else {
        println!("{} history records pruned", pruned);
    }
    Ok(())
}
