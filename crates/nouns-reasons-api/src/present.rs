// SPDX-License-Identifier: Apache-2.0

//! Display formatting for votes: relative age, rationale links, support
//! styling and voter naming.

use std::sync::OnceLock;

use nouns_reasons_model::{Support, Vote};
use regex::{Captures, Regex};

use crate::dto::VoteCardDto;

pub const REASON_PLACEHOLDER: &str = "no reason :(";
pub const AVATAR_PLACEHOLDER: &str = "/avatar-placeholder.svg";
pub const ETHERSCAN_ADDRESS_BASE: &str = "https://etherscan.io/address/";
pub const PROPOSAL_BASE: &str = "https://nouns.wtf/vote/";

const TIME_UNITS: [(&str, u64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
];

const URL_PATTERN: &str =
    r"(?i)\b(?:https?|ftp|file)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]";

/// Coarse age of `timestamp_secs` as seen at `now_secs`, both unix seconds.
#[must_use]
pub fn time_ago(timestamp_secs: u64, now_secs: u64) -> String {
    let elapsed = now_secs.saturating_sub(timestamp_secs);
    for (unit, seconds) in TIME_UNITS {
        let count = elapsed / seconds;
        if count >= 1 {
            let plural = if count > 1 { "s" } else { "" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_string()
}

fn url_regex() -> Option<&'static Regex> {
    static URL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    URL_RE.get_or_init(|| Regex::new(URL_PATTERN).ok()).as_ref()
}

/// Replaces every URL in `text` with an underlined `*link*` anchor.
#[must_use]
pub fn linkify(text: &str) -> String {
    let Some(re) = url_regex() else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        format!(
            r#"<a style="text-decoration:underline;" href="{}" target="_blank" rel="noopener noreferrer">*link*</a>"#,
            &caps[0]
        )
    })
    .into_owned()
}

/// Rendered rationale and whether it is the muted placeholder.
#[must_use]
pub fn render_reason(reason: Option<&str>) -> (String, bool) {
    match reason.filter(|r| !r.trim().is_empty()) {
        Some(text) => (linkify(text), false),
        None => (REASON_PLACEHOLDER.to_string(), true),
    }
}

#[must_use]
pub const fn support_style(support: Support) -> &'static str {
    match support {
        Support::For => "text-green-400",
        Support::Against => "text-red-400",
        Support::Abstain => "text-gray-500",
    }
}

/// The resolved name, or the first eight characters of the address.
#[must_use]
pub fn display_name(ens_name: Option<&str>, address: &str) -> String {
    match ens_name.filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => address.chars().take(8).collect(),
    }
}

#[must_use]
pub fn votes_label(votes: u64) -> String {
    if votes == 1 {
        "1 vote".to_string()
    } else {
        format!("{votes} votes")
    }
}

#[must_use]
pub fn etherscan_address_url(address: &str) -> String {
    format!("{ETHERSCAN_ADDRESS_BASE}{address}")
}

#[must_use]
pub fn proposal_url(proposal_id: &str) -> String {
    format!("{PROPOSAL_BASE}{proposal_id}")
}

#[must_use]
pub fn proposal_label(proposal_id: &str, title: &str) -> String {
    format!("Proposal {proposal_id}: {title}")
}

/// Chain lookups that decorate a card. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardContext {
    pub ens_name: Option<String>,
    pub avatar_url: Option<String>,
    pub block_timestamp: Option<u64>,
    pub now_secs: u64,
}

#[must_use]
pub fn vote_card(vote: &Vote, ctx: &CardContext) -> VoteCardDto {
    let address = vote.voter.as_str();
    let (reason_html, reason_muted) = render_reason(vote.reason.as_deref());
    VoteCardDto {
        vote_id: vote.id.clone(),
        voter: address.to_string(),
        display_name: display_name(ctx.ens_name.as_deref(), address),
        avatar_url: ctx
            .avatar_url
            .clone()
            .unwrap_or_else(|| AVATAR_PLACEHOLDER.to_string()),
        address_url: etherscan_address_url(address),
        support: vote.support,
        support_label: vote.support.label().to_string(),
        support_style: support_style(vote.support).to_string(),
        proposal_url: proposal_url(vote.proposal.id.as_str()),
        proposal_label: proposal_label(vote.proposal.id.as_str(), &vote.proposal.title),
        votes_label: votes_label(vote.votes),
        reason_html,
        reason_muted,
        age: ctx.block_timestamp.map(|ts| time_ago(ts, ctx.now_secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_ago_picks_largest_unit() {
        assert_eq!(time_ago(1_000, 1_090), "1 minute ago");
        assert_eq!(time_ago(0, 7_200), "2 hours ago");
        assert_eq!(time_ago(500, 500), "just now");
        assert_eq!(time_ago(0, 59), "just now");
        assert_eq!(time_ago(0, 86_400 * 13), "1 week ago");
        assert_eq!(time_ago(0, 31_536_000 * 3 + 5), "3 years ago");
    }

    #[test]
    fn future_timestamps_are_just_now() {
        assert_eq!(time_ago(2_000, 1_000), "just now");
    }

    #[test]
    fn linkify_leaves_plain_text_alone() {
        assert_eq!(linkify("no urls & <here>"), "no urls & <here>");
        assert_eq!(linkify("mailto:a@b.c"), "mailto:a@b.c");
    }

    #[test]
    fn linkify_drops_trailing_punctuation() {
        let out = linkify("read https://nouns.wtf/vote/12.");
        assert!(out.contains(r#"href="https://nouns.wtf/vote/12""#));
        assert!(out.ends_with("</a>."));
    }

    #[test]
    fn linkify_is_case_insensitive() {
        let out = linkify("HTTPS://EXAMPLE.COM/A");
        assert!(out.contains(r#"href="HTTPS://EXAMPLE.COM/A""#));
    }

    #[test]
    fn blank_reason_renders_placeholder() {
        assert_eq!(render_reason(None), (REASON_PLACEHOLDER.to_string(), true));
        assert_eq!(render_reason(Some("  \n")), (REASON_PLACEHOLDER.to_string(), true));
    }
}
