use crate::commands::{print_json, Context};
use crate::error::not_found;
use crate::util::{now_utc, parse_post_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tagsync_core::{PostId, TagSet, DEFAULT_DELIMITER};
use tagsync_store::repo::PostsRepo;

#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// Replace the mirrored tags of a post
    Set(PostSetArgs),
    Show(PostShowArgs),
    /// Apply changes: `tag` or `+tag` adds, `-tag` removes (`*` wildcards allowed)
    Tag(PostChangeArgs),
    /// Flip bare tags, `-tag` removes, `+tag` adds
    Toggle(PostChangeArgs),
    Rm(PostShowArgs),
}

#[derive(Debug, Args)]
pub struct PostSetArgs {
    pub id: String,
    pub tags: String,
}

#[derive(Debug, Args)]
pub struct PostShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct PostChangeArgs {
    pub id: String,
    #[arg(allow_hyphen_values = true)]
    pub changes: String,
}

#[derive(Debug, Serialize)]
struct PostDto {
    id: PostId,
    tags: Vec<String>,
}

pub fn set_post(ctx: &Context<'_>, args: PostSetArgs) -> Result<()> {
    let id = parse_post_id(&args.id)?;
    let mut tags = TagSet::new();
    tags.apply_delimited(&args.tags, DEFAULT_DELIMITER);
    save_tags(ctx, id, &tags)?;
    print_post(ctx, id, &tags)
}

pub fn show_post(ctx: &Context<'_>, args: PostShowArgs) -> Result<()> {
    let id = parse_post_id(&args.id)?;
    let tags = load_tags(ctx, id)?;
    print_post(ctx, id, &tags)
}

pub fn tag_post(ctx: &Context<'_>, args: PostChangeArgs) -> Result<()> {
    let id = parse_post_id(&args.id)?;
    let mut tags = load_tags(ctx, id)?;
    tags.apply_delimited(&args.changes, DEFAULT_DELIMITER);
    save_tags(ctx, id, &tags)?;
    print_post(ctx, id, &tags)
}

pub fn toggle_post(ctx: &Context<'_>, args: PostChangeArgs) -> Result<()> {
    let id = parse_post_id(&args.id)?;
    let mut tags = load_tags(ctx, id)?;
    tags.toggle_delimited(&args.changes, DEFAULT_DELIMITER);
    save_tags(ctx, id, &tags)?;
    print_post(ctx, id, &tags)
}

pub fn remove_post(ctx: &Context<'_>, args: PostShowArgs) -> Result<()> {
    let id = parse_post_id(&args.id)?;
    if !ctx.store.posts().delete(id)? {
        return Err(not_found(format!("post {id}")));
    }

    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("post {} removed", id);
    }
    Ok(())
}

fn load_tags(ctx: &Context<'_>, id: PostId) -> Result<TagSet> {
    ctx.store
        .posts()
        .get_tags(id)?
        .ok_or_else(|| not_found(format!("post {id}")))
}

fn save_tags(ctx: &Context<'_>, id: PostId, tags: &TagSet) -> Result<()> {
    ctx.store
        .transaction(|conn| PostsRepo::new(conn).replace_tags(now_utc(), id, tags))?;
    Ok(())
}

fn print_post(ctx: &Context<'_>, id: PostId, tags: &TagSet) -> Result<()> {
    let dto = PostDto {
        id,
        tags: tags.to_strings(),
    };
    if ctx.json {
        print_json(&dto)?;
    } else if dto.tags.is_empty() {
        println!("post {}: no tags", dto.id);
    } else {
        println!("post {}: {}", dto.id, dto.tags.join(" "));
    }
    Ok(())
}
