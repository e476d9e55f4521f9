// SPDX-License-Identifier: Apache-2.0

use nouns_reasons_api::present::{
    display_name, linkify, render_reason, support_style, time_ago, vote_card, votes_label, CardContext,
    AVATAR_PLACEHOLDER, REASON_PLACEHOLDER,
};
use nouns_reasons_model::{Address, ProposalId, ProposalRef, Support, Vote};

fn vote(support: Support, votes: u64, reason: Option<&str>) -> Vote {
    Vote {
        id: "0xabc-1".to_string(),
        voter: Address::new("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").expect("address"),
        support,
        votes,
        reason: reason.map(str::to_string),
        block_number: 15_000_000,
        proposal: ProposalRef {
            id: ProposalId::new("142").expect("proposal id"),
            title: "Fund the thing".to_string(),
        },
    }
}

#[test]
fn relative_age_examples() {
    let now = 1_700_000_000;
    assert_eq!(time_ago(now - 90, now), "1 minute ago");
    assert_eq!(time_ago(now - 7_200, now), "2 hours ago");
    assert_eq!(time_ago(now, now), "just now");
}

#[test]
fn linkifier_wraps_urls_in_anchor() {
    assert_eq!(
        linkify("see http://example.com/x for details"),
        r#"see <a style="text-decoration:underline;" href="http://example.com/x" target="_blank" rel="noopener noreferrer">*link*</a> for details"#
    );
}

#[test]
fn linkifier_handles_several_urls() {
    let out = linkify("a https://h.io/x?y=1&z=2 b file:///tmp/x c");
    assert_eq!(out.matches("*link*").count(), 2);
    assert!(out.contains(r#"href="https://h.io/x?y=1&z=2""#));
    assert!(out.contains(r#"href="file:///tmp/x""#));
    assert!(out.starts_with("a <a "));
    assert!(out.ends_with("</a> c"));
}

#[test]
fn support_labels_and_styles() {
    assert_eq!(Support::For.label(), "FOR");
    assert_eq!(Support::Against.label(), "AGAINST");
    assert_eq!(Support::Abstain.label(), "ABSTAIN");
    assert_eq!(support_style(Support::For), "text-green-400");
    assert_eq!(support_style(Support::Against), "text-red-400");
    assert_eq!(support_style(Support::Abstain), "text-gray-500");
}

#[test]
fn address_fallback_is_first_eight_characters() {
    assert_eq!(
        display_name(None, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
        "0x5aAeb6"
    );
    assert_eq!(display_name(Some(""), "0x5aAeb605"), "0x5aAeb6");
    assert_eq!(display_name(Some("nouns.eth"), "0x5aAeb605"), "nouns.eth");
}

#[test]
fn vote_weight_is_pluralised() {
    assert_eq!(votes_label(1), "1 vote");
    assert_eq!(votes_label(0), "0 votes");
    assert_eq!(votes_label(12), "12 votes");
}

#[test]
fn card_without_lookups_uses_placeholders() {
    let card = vote_card(&vote(Support::Against, 3, None), &CardContext::default());
    assert_eq!(card.display_name, "0x5aAeb6");
    assert_eq!(card.avatar_url, AVATAR_PLACEHOLDER);
    assert_eq!(card.reason_html, REASON_PLACEHOLDER);
    assert!(card.reason_muted);
    assert_eq!(card.age, None);
    assert_eq!(card.support_label, "AGAINST");
    assert_eq!(card.votes_label, "3 votes");
    assert_eq!(card.proposal_url, "https://nouns.wtf/vote/142");
    assert_eq!(card.proposal_label, "Proposal 142: Fund the thing");
    assert_eq!(
        card.address_url,
        "https://etherscan.io/address/0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
    );
}

#[test]
fn card_with_lookups_uses_resolved_values() {
    let ctx = CardContext {
        ens_name: Some("vitalik.eth".to_string()),
        avatar_url: Some("https://img.example/a.png".to_string()),
        block_timestamp: Some(1_000),
        now_secs: 1_000 + 86_400 * 2,
    };
    let card = vote_card(&vote(Support::For, 1, Some("yes: https://x.io/p")), &ctx);
    assert_eq!(card.display_name, "vitalik.eth");
    assert_eq!(card.avatar_url, "https://img.example/a.png");
    assert_eq!(card.age.as_deref(), Some("2 days ago"));
    assert!(!card.reason_muted);
    assert!(card.reason_html.starts_with("yes: <a "));
    assert_eq!(card.votes_label, "1 vote");
}

#[test]
fn blank_or_whitespace_reasons_render_the_muted_placeholder() {
    for reason in [None, Some(""), Some("   "), Some("\n\t ")] {
        assert_eq!(
            render_reason(reason),
            (REASON_PLACEHOLDER.to_string(), true),
            "{reason:?}"
        );
    }
    assert_eq!(render_reason(Some(" ok ")), (" ok ".to_string(), false));
}
