// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod cache;
mod errors;
mod key;
mod loader;
mod pager;
mod selection;
mod source;

pub use cache::{CacheStats, FallbackMap, PageCache, DEFAULT_PAGE_SIZE, DEFAULT_REVALIDATE};
pub use errors::{QueryError, QueryErrorCode};
pub use key::{derive_cache_key, CacheKey, PageDescriptor, VoteFilter, VOTES_KEY_PATH};
pub use loader::PageLoader;
pub use pager::{LoadOutcome, PaginatedVotes, PagerState, PendingPage};
pub use selection::{
    split_by_support, IndexVotesDelegate, ProposalSelection, ProposalVotesDelegate, Segment,
    SplitVotes, VoteSide,
};
pub use source::{ProposalIndex, VoteIndex, VoteQuery, PROPOSAL_VOTES_LIMIT};

pub const CRATE_NAME: &str = "nouns-reasons-query";
