use crate::commands::print_json;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tagsync_core::{TagDelta, TagSet, DEFAULT_DELIMITER};

#[derive(Debug, Args)]
pub struct DeltaArgs {
    /// Tag changes, e.g. "foo -bar =baz"
    #[arg(allow_hyphen_values = true)]
    pub changes: String,
    /// Further changes folded in order; later ones win
    #[arg(long = "then", allow_hyphen_values = true)]
    pub then: Vec<String>,
    /// Only keep the part that would change this tag list
    #[arg(long)]
    pub against: Option<String>,
    #[arg(long)]
    pub invert: bool,
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

#[derive(Debug, Serialize)]
struct DeltaDto {
    delta: String,
    additions: Vec<String>,
    removals: Vec<String>,
}

pub fn print_delta(json: bool, args: DeltaArgs) -> Result<()> {
    let delta = build_delta(&args);
    let dto = DeltaDto {
        delta: delta.canonical_string(&args.delimiter),
        additions: delta.additions().map(|tag| tag.as_str().to_string()).collect(),
        removals: delta.removals().map(|tag| tag.as_str().to_string()).collect(),
    };

    if json {
        return print_json(&dto);
    }
    println!("{}", dto.delta);
    Ok(())
}

fn build_delta(args: &DeltaArgs) -> TagDelta {
    let parts: Vec<TagDelta> = std::iter::once(&args.changes)
        .chain(args.then.iter())
        .map(|raw| TagDelta::parse(raw, &args.delimiter))
        .collect();
    let mut delta = TagDelta::flatten(parts.iter());
    if let Some(raw) = &args.against {
        let mut tags = TagSet::new();
        tags.apply_delimited(raw, &args.delimiter);
        delta = delta.effective_against(&tags);
    }
    if args.invert {
        delta = delta.invert();
    }
    delta
}
