// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use nouns_reasons_model::Vote;
use tracing::{debug, warn};

use crate::{CacheKey, PageDescriptor, PageLoader, QueryError, VoteFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Loading,
    HasMore,
    Exhausted,
    Error(QueryError),
}

/// A page request handed out by [`PaginatedVotes::begin_next`].
///
/// Carries the generation it was issued under; completing it after the
/// filter changed is a no-op. Not `Clone`: each claim completes once.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingPage {
    pub descriptor: PageDescriptor,
    pub key: CacheKey,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Appended(usize),
    Busy,
    Exhausted,
    Superseded,
}

/// "Load more" controller over a filtered vote listing.
#[derive(Debug, Clone)]
pub struct PaginatedVotes {
    filter: VoteFilter,
    page_size: u64,
    pages_loaded: u64,
    votes: Vec<Vote>,
    seen: HashSet<String>,
    state: PagerState,
    generation: u64,
}

impl PaginatedVotes {
    #[must_use]
    pub fn new(filter: VoteFilter, page_size: u64) -> Self {
        Self {
            filter,
            page_size: page_size.max(1),
            pages_loaded: 0,
            votes: Vec::new(),
            seen: HashSet::new(),
            state: PagerState::Idle,
            generation: 0,
        }
    }

    /// Pager sized to whatever `loader` serves.
    #[must_use]
    pub fn for_loader(filter: VoteFilter, loader: &PageLoader) -> Self {
        Self::new(filter, loader.page_size())
    }

    #[must_use]
    pub fn filter(&self) -> &VoteFilter {
        &self.filter
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    #[must_use]
    pub fn state(&self) -> &PagerState {
        &self.state
    }

    #[must_use]
    pub fn pages_loaded(&self) -> u64 {
        self.pages_loaded
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state != PagerState::Exhausted
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == PagerState::Loading
    }

    /// Starts a new pagination sequence when the filter differs. Any request
    /// still in flight for the old filter is superseded.
    pub fn set_filter(&mut self, filter: VoteFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pages_loaded = 0;
        self.votes.clear();
        self.seen.clear();
        self.state = PagerState::Idle;
    }

    /// Claims the next page. Returns `None` while a load is outstanding or
    /// once the listing is exhausted.
    pub fn begin_next(&mut self) -> Option<PendingPage> {
        if matches!(self.state, PagerState::Loading | PagerState::Exhausted) {
            return None;
        }
        let descriptor = PageDescriptor::new(self.filter.clone(), self.pages_loaded, self.page_size);
        self.state = PagerState::Loading;
        Some(PendingPage {
            key: descriptor.cache_key(),
            descriptor,
            generation: self.generation,
        })
    }

    pub fn complete(
        &mut self,
        pending: PendingPage,
        result: Result<Vec<Vote>, QueryError>,
    ) -> Result<LoadOutcome, QueryError> {
        if pending.generation != self.generation {
            debug!(key = %pending.key, "dropping superseded page");
            return Ok(LoadOutcome::Superseded);
        }
        if self.state != PagerState::Loading {
            debug!(key = %pending.key, "page already completed");
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(page) => {
                let returned = page.len() as u64;
                let before = self.votes.len();
                for vote in page {
                    if self.seen.insert(vote.id.clone()) {
                        self.votes.push(vote);
                    }
                }
                self.pages_loaded += 1;
                // An exact multiple of the page size needs one more, empty,
                // fetch before the listing reports exhaustion.
                self.state = if returned < self.page_size {
                    PagerState::Exhausted
                } else {
                    PagerState::HasMore
                };
                Ok(LoadOutcome::Appended(self.votes.len() - before))
            }
            Err(err) => {
                warn!(key = %pending.key, error = %err, "page load failed");
                self.state = PagerState::Error(err.clone());
                Err(err)
            }
        }
    }

    pub async fn load_next(&mut self, loader: &PageLoader) -> Result<LoadOutcome, QueryError> {
        let Some(pending) = self.begin_next() else {
            return Ok(if self.has_more() {
                LoadOutcome::Busy
            } else {
                LoadOutcome::Exhausted
            });
        };
        let result = loader.load(&pending.descriptor).await;
        self.complete(pending, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nouns_reasons_model::{Address, ProposalId, ProposalRef, Support};

    fn page(range: std::ops::Range<u64>) -> Vec<Vote> {
        range
            .map(|n| Vote {
                id: format!("vote-{n}"),
                voter: Address::new("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").expect("voter"),
                support: Support::For,
                votes: 1,
                reason: None,
                block_number: 1_000 + n,
                proposal: ProposalRef {
                    id: ProposalId::new("7").expect("proposal"),
                    title: "Proposal 7".to_string(),
                },
            })
            .collect()
    }

    #[test]
    fn second_completion_of_one_claim_is_ignored() {
        let mut pager = PaginatedVotes::new(VoteFilter::default(), 2);
        let pending = pager.begin_next().expect("claim");
        let duplicate = PendingPage {
            descriptor: pending.descriptor.clone(),
            key: pending.key.clone(),
            generation: pending.generation,
        };

        assert_eq!(
            pager.complete(pending, Ok(page(0..2))).expect("first"),
            LoadOutcome::Appended(2)
        );
        assert_eq!(
            pager.complete(duplicate, Ok(page(2..4))).expect("second"),
            LoadOutcome::Superseded
        );
        assert_eq!(pager.pages_loaded(), 1);
        assert_eq!(pager.votes().len(), 2);

        let next = pager.begin_next().expect("next claim");
        assert_eq!(next.descriptor.page_index, 1);
    }
}
