use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{now_utc, parse_rule_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tagsync_core::{ReplacementRule, RuleId, TagDelta, TagRuleDelta, DEFAULT_DELIMITER};

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    Add(RuleAddArgs),
    Ls(RuleListArgs),
    Rm(RuleRemoveArgs),
    /// Switch a rule between automatic and moderator-approved edits
    Autofix(RuleAutofixArgs),
}

#[derive(Debug, Args)]
pub struct RuleAddArgs {
    /// Tags that must be present, `-tag` for tags that must be absent
    #[arg(long = "match", allow_hyphen_values = true)]
    pub match_spec: String,
    /// Change applied to matching posts
    #[arg(long = "replace", allow_hyphen_values = true)]
    pub replace_spec: String,
    #[arg(long)]
    pub autofix: bool,
}

#[derive(Debug, Args)]
pub struct RuleListArgs {}

#[derive(Debug, Args)]
pub struct RuleRemoveArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct RuleAutofixArgs {
    pub id: String,
    #[arg(long, conflicts_with = "off")]
    pub on: bool,
    #[arg(long)]
    pub off: bool,
}

#[derive(Debug, Serialize)]
struct RuleDto {
    id: RuleId,
    match_spec: String,
    replace_spec: String,
    autofix: bool,
}

impl From<&ReplacementRule> for RuleDto {
    fn from(rule: &ReplacementRule) -> Self {
        Self {
            id: rule.id,
            match_spec: rule.match_string(),
            replace_spec: rule.replace_string(),
            autofix: rule.autofix,
        }
    }
}

pub fn add_rule(ctx: &Context<'_>, args: RuleAddArgs) -> Result<()> {
    let match_spec = TagDelta::parse(&args.match_spec, DEFAULT_DELIMITER);
    let replace_spec = TagRuleDelta::parse(&args.replace_spec);
    if replace_spec.is_zero() {
        return Err(invalid_input("replace spec cannot be empty"));
    }
    let rule = ctx
        .store
        .rules()
        .create(now_utc(), match_spec, replace_spec, args.autofix)?;

    let dto = RuleDto::from(&rule);
    if ctx.json {
        print_json(&dto)?;
    } else {
        println!("rule {} added: [{}] => [{}]", dto.id, dto.match_spec, dto.replace_spec);
    }
    Ok(())
}

pub fn list_rules(ctx: &Context<'_>, _args: RuleListArgs) -> Result<()> {
    let rules = ctx.store.rules().list()?;
    let items: Vec<RuleDto> = rules.iter().map(RuleDto::from).collect();

    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    if items.is_empty() {
        println!("no rules");
        return Ok(());
    }

    for item in items {
        let mode = if item.autofix { "auto" } else { "prompt" };
        println!(
            "{}  {:<6}  [{}] => [{}]",
            item.id, mode, item.match_spec, item.replace_spec
        );
    }
    Ok(())
}

pub fn remove_rule(ctx: &Context<'_>, args: RuleRemoveArgs) -> Result<()> {
    let id = parse_rule_id(&args.id)?;
    if !ctx.store.rules().delete(id)? {
        return Err(not_found(format!("rule {id}")));
    }

    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("rule {} removed", id);
    }
    Ok(())
}

pub fn set_autofix(ctx: &Context<'_>, args: RuleAutofixArgs) -> Result<()> {
    let id = parse_rule_id(&args.id)?;
    let autofix = match (args.on, args.off) {
        (true, false) => true,
        (false, true) => false,
        _ => return Err(invalid_input("pass either --on or --off")),
    };
    ctx.store.rules().set_autofix(id, autofix)?;

    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "autofix": autofix }))?;
    } else {
        println!("rule {} autofix {}", id, if autofix { "on" } else { "off" });
    }
    Ok(())
}
