use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use tagsync_core::PostId;
use tagsync_store::query::PostQuery;
use tracing::debug;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// e.g. "solo -comic {cat,dog}"
    #[arg(allow_hyphen_values = true)]
    pub expression: String,
    /// Print the compiled template instead of running it
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
struct ExplainDto<'a> {
    template: &'a str,
    tokens: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct QueryResultDto {
    expression: String,
    posts: Vec<PostId>,
}

pub fn run_query(ctx: &Context<'_>, args: QueryArgs) -> Result<()> {
    let query = PostQuery::parse(&args.expression)?;
    let compiled = query.compiled();
    debug!(template = %compiled.template, literals = compiled.tokens.len(), "expression compiled");

    if args.explain {
        if ctx.json {
            return print_json(&ExplainDto {
                template: &compiled.template,
                tokens: &compiled.tokens,
            });
        }
        println!("{}", compiled.template);
        for (name, tag) in &compiled.tokens {
            println!("  {} = {}", name, tag);
        }
        return Ok(());
    }

    let posts = ctx.store.posts().search(&query)?;
    if ctx.json {
        return print_json(&QueryResultDto {
            expression: args.expression,
            posts,
        });
    }

    if posts.is_empty() {
        println!("no matching posts");
        return Ok(());
    }
    for post in posts {
        println!("{}", post);
    }
    Ok(())
}
