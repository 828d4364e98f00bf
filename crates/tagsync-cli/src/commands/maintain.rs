use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::now_utc;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use tagsync_config::{AppConfig, MAX_RETENTION_DAYS, MIN_RETENTION_DAYS};
use tagsync_sync::maintenance::{run_cycle, CycleOptions, CycleReport};
use tagsync_sync::{ApiClient, ApiSettings, OfflineEditor, PostEditor};
use tracing::info;

#[derive(Debug, Args)]
pub struct MaintainArgs {
    /// Report what would change without editing or recording anything
    #[arg(long)]
    pub dry_run: bool,
    /// Override the configured history retention window
    #[arg(long)]
    pub retention_days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct MaintainDto {
    #[serde(flatten)]
    report: CycleReport,
    history_pruned: usize,
}

pub fn maintain(ctx: &Context<'_>, args: MaintainArgs) -> Result<()> {
    let options = cycle_options(ctx.config, args.dry_run, args.retention_days)?;
    let editor = build_editor(ctx.config, args.dry_run)?;
    let report = run_cycle(ctx.store, editor.as_ref(), &options)?;

    let history_pruned = if options.dry_run {
        0
    } else {
        ctx.store.history().prune(options.history_since())?
    };
    if history_pruned > 0 {
        info!(rows = history_pruned, "expired history pruned");
    }

    if ctx.json {
        return print_json(&MaintainDto {
            report,
            history_pruned,
        });
    }

    let verb = if report.dry_run { "would submit" } else { "submitted" };
    for edit in &report.submitted {
        println!("{} post {}: {}", verb, edit.post_id, edit.diff);
    }
    for failure in &report.failures {
        println!("failed post {}: {}", failure.post_id, failure.error);
    }
    println!(
        "{} rules, {} posts, {} edits {}, {} proposals opened, {} failures",
        report.rules,
        report.posts_evaluated,
        report.submitted.len(),
        verb,
        report.proposals_opened,
        report.failures.len()
    );
    Ok(())
}

pub fn cycle_options(
    config: &AppConfig,
    dry_run: bool,
    retention_days: Option<i64>,
) -> Result<CycleOptions> {
    let retention_days = resolve_retention_days(config, retention_days)?;
    Ok(CycleOptions {
        now_utc: now_utc(),
        retention_days,
        actor: config.maintenance.actor.clone(),
        edit_reason: config.maintenance.edit_reason.clone(),
        dry_run,
    })
}

pub fn resolve_retention_days(config: &AppConfig, retention_days: Option<i64>) -> Result<i64> {
    let days = retention_days.unwrap_or(config.maintenance.history_retention_days);
    // an empty window would let a real run prune every history row
    if !(MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS).contains(&days) {
        return Err(invalid_input(format!(
            "retention days must be between {MIN_RETENTION_DAYS} and {MAX_RETENTION_DAYS}"
        )));
    }
    Ok(days)
}

/// Dry runs never submit, so they work without credentials.
pub fn build_editor(config: &AppConfig, dry_run: bool) -> Result<Box<dyn PostEditor>> {
    if dry_run {
        return Ok(Box::new(OfflineEditor));
    }
    let api = &config.api;
    let (Some(login), Some(api_key)) = (&api.login, &api.api_key) else {
        return Err(invalid_input(
            "api login and api_key must be configured to submit edits",
        ));
    };
    let client = ApiClient::new(ApiSettings {
        base_url: api.base_url.clone(),
        login: login.clone(),
        api_key: api_key.clone(),
        user_agent: api.user_agent.clone(),
        timeout_secs: api.timeout_secs,
    })
    .with_context(|| "create api client")?;
    Ok(Box::new(client))
}
