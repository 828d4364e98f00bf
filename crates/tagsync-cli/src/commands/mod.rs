use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use tagsync_config::AppConfig;
use tagsync_store::Store;

pub mod delta;
pub mod history;
pub mod maintain;
pub mod posts;
pub mod proposals;
pub mod query;
pub mod rules;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
