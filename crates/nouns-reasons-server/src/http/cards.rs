// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use nouns_reasons_api::dto::VoteCardDto;
use nouns_reasons_api::present::{vote_card, CardContext};
use nouns_reasons_model::{Address, Vote};
use tracing::warn;

use crate::ChainClient;

#[derive(Default, Clone)]
struct VoterLookup {
    ens_name: Option<String>,
    avatar_url: Option<String>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn lookup_voter(chain: &dyn ChainClient, address: &Address) -> VoterLookup {
    let (name, avatar) = tokio::join!(chain.ens_name(address), chain.ens_avatar(address));
    let ens_name = match name {
        Ok(name) => name.map(|n| n.as_str().to_string()),
        Err(e) => {
            warn!(address = %address.as_str(), "ens name lookup failed: {e}");
            None
        }
    };
    let avatar_url = match avatar {
        Ok(url) => url,
        Err(e) => {
            warn!(address = %address.as_str(), "ens avatar lookup failed: {e}");
            None
        }
    };
    VoterLookup {
        ens_name,
        avatar_url,
    }
}

/// Decorates votes with names, avatars and ages. Lookup failures degrade
/// to the address and placeholder forms.
pub(crate) async fn build_vote_cards(
    chain: &dyn ChainClient,
    votes: &[Vote],
    enrich: bool,
) -> Vec<VoteCardDto> {
    let now_secs = unix_now();
    let mut voters: HashMap<Address, VoterLookup> = HashMap::new();
    let mut timestamps: HashMap<u64, Option<u64>> = HashMap::new();
    let mut cards = Vec::with_capacity(votes.len());
    for vote in votes {
        let mut ctx = CardContext {
            now_secs,
            ..CardContext::default()
        };
        if enrich {
            if !voters.contains_key(&vote.voter) {
                let lookup = lookup_voter(chain, &vote.voter).await;
                voters.insert(vote.voter.clone(), lookup);
            }
            if let Some(lookup) = voters.get(&vote.voter) {
                ctx.ens_name = lookup.ens_name.clone();
                ctx.avatar_url = lookup.avatar_url.clone();
            }
            if !timestamps.contains_key(&vote.block_number) {
                let ts = match chain.block_timestamp(vote.block_number).await {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        warn!(block = vote.block_number, "block timestamp lookup failed: {e}");
                        None
                    }
                };
                timestamps.insert(vote.block_number, ts);
            }
            ctx.block_timestamp = timestamps.get(&vote.block_number).copied().flatten();
        }
        cards.push(vote_card(vote, &ctx));
    }
    cards
}
