use crate::error::invalid_input;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tagsync_core::{PostId, ProposalId, RuleId};

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ts.to_string(),
    }
}

pub fn parse_post_id(raw: &str) -> Result<PostId> {
    Ok(PostId::from_str(raw)?)
}

pub fn parse_rule_id(raw: &str) -> Result<RuleId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("rule id cannot be empty"));
    }
    RuleId::from_str(trimmed).map_err(|_| invalid_input("invalid rule id"))
}

pub fn parse_proposal_id(raw: &str) -> Result<ProposalId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("proposal id cannot be empty"));
    }
    ProposalId::from_str(trimmed).map_err(|_| invalid_input("invalid proposal id"))
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_post_id, parse_rule_id};

    #[test]
    fn parses_post_ids() {
        assert_eq!(parse_post_id(" 42 ").expect("id").get(), 42);
        assert!(parse_post_id("0").is_err());
        assert!(parse_post_id("abc").is_err());
    }

    #[test]
    fn rejects_malformed_rule_ids() {
        assert!(parse_rule_id("").is_err());
        assert!(parse_rule_id("not-a-uuid").is_err());
    }

    #[test]
    fn formats_epoch() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
    }
}
