// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use nouns_reasons_model::Vote;
use tracing::instrument;

use crate::{PageCache, PageDescriptor, QueryError, QueryErrorCode, VoteIndex};

/// Fetches pages through the shared cache.
#[derive(Clone)]
pub struct PageLoader {
    index: Arc<dyn VoteIndex>,
    cache: Arc<PageCache>,
}

impl PageLoader {
    #[must_use]
    pub fn new(index: Arc<dyn VoteIndex>, cache: Arc<PageCache>) -> Self {
        Self { index, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    /// The only page size this loader serves; see [`PageCache::page_size`].
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.cache.page_size()
    }

    #[must_use]
    pub fn index(&self) -> &Arc<dyn VoteIndex> {
        &self.index
    }

    #[instrument(name = "page_loader_load", skip(self), fields(key = %page.cache_key(), backend = self.index.backend_tag()))]
    pub async fn load(&self, page: &PageDescriptor) -> Result<Vec<Vote>, QueryError> {
        if page.page_size != self.page_size() {
            return Err(QueryError::new(
                QueryErrorCode::InvalidRequest,
                format!(
                    "page size {} does not match the cache page size {}",
                    page.page_size,
                    self.page_size()
                ),
            ));
        }
        let key = page.cache_key();
        let query = page.query();
        let index = Arc::clone(&self.index);
        self.cache
            .get_or_fetch(&key, || async move { index.get_votes(&query).await })
            .await
    }
}
