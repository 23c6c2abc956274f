//! Paginated collection of relevant papers across several queries.

use std::collections::HashSet;

use super::planner::plan_queries;
use super::relevance::is_relevant;
use crate::client::{PaperIndex, SearchPage};
use crate::error::SurveyResult;
use crate::llm::CompletionService;
use crate::models::Paper;

/// Drives query planning, index pagination and relevance filtering until
/// enough relevant papers are found.
pub struct PaperCollector<'a> {
    index: &'a dyn PaperIndex,
    llm: &'a dyn CompletionService,
    num_queries: usize,
    max_sweeps: usize,
}

impl<'a> PaperCollector<'a> {
    /// Create a collector that plans `num_queries` queries.
    #[must_use]
    pub fn new(
        index: &'a dyn PaperIndex,
        llm: &'a dyn CompletionService,
        num_queries: usize,
    ) -> Self {
        Self { index, llm, num_queries, max_sweeps: usize::MAX }
    }

    /// Stop after this many full sweeps even if the quota is not met.
    #[must_use]
    pub const fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Collect at least `min_count` distinct relevant papers on `topic`.
    ///
    /// Every active query is asked for one page of `batch_size` papers at a
    /// shared offset; the offset advances only after a full sweep, so results
    /// interleave across queries instead of draining one query first. A query
    /// whose pages are exhausted is dropped. The quota is checked after each
    /// page, so the result may overshoot `min_count`; it falls short only if
    /// every query is exhausted or the sweep limit is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails, the index returns a fatal status, or
    /// a relevance judgement fails.
    pub async fn collect_papers(
        &self,
        topic: &str,
        min_count: usize,
        batch_size: usize,
    ) -> SurveyResult<Vec<Paper>> {
        let mut active = plan_queries(self.llm, topic, self.num_queries).await?;

        tracing::info!(min_count, batch_size, queries = active.len(), "Searching for papers");

        let mut relevant: Vec<Paper> = Vec::new();
        let mut rejected: HashSet<Paper> = HashSet::new();
        let mut offset = 0;
        let mut sweeps = 0;

        while relevant.len() < min_count && !active.is_empty() {
            if sweeps >= self.max_sweeps {
                tracing::warn!(sweeps, found = relevant.len(), "Search sweep limit reached");
                break;
            }
            sweeps += 1;

            let mut still_active = Vec::with_capacity(active.len());
            let mut queries = active.into_iter();

            while let Some(query) = queries.next() {
                let papers = match self.index.search(&query, batch_size, offset).await? {
                    SearchPage::Exhausted => {
                        tracing::debug!(query = %query, offset, "Dropping exhausted query");
                        continue;
                    }
                    SearchPage::Papers(papers) => papers,
                };
                still_active.push(query);

                for paper in papers {
                    if relevant.contains(&paper) || rejected.contains(&paper) {
                        continue;
                    }
                    if is_relevant(self.llm, &paper, topic).await? {
                        relevant.push(paper);
                    } else {
                        rejected.insert(paper);
                    }
                }

                if relevant.len() >= min_count {
                    still_active.extend(queries.by_ref());
                    break;
                }
            }

            active = still_active;
            offset += batch_size;

            tracing::info!(
                found = relevant.len(),
                target = min_count,
                active_queries = active.len(),
                offset,
                "Search sweep complete"
            );
        }

        tracing::info!(count = relevant.len(), "Found relevant papers");
        Ok(relevant)
    }
}
