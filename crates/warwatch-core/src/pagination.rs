//! Pagination controller (spec §4.5): drives the upstream over `[from,to]`
//! with backwards windowing until the stop predicate fires, or issues a
//! single call for the `Simple` strategy (§4.5.2).

use crate::attack::Attack;
use crate::error::UpstreamError;
use crate::strategy::{FetchStrategy, Method};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    NoMoreAttacks,
    PartialPage,
    ReachedStartTime,
    MaxPagesExceeded,
}

/// Spec §4.5.1, pure: given the last page's `count`/`oldest`, `from`, and
/// the upstream's page size, decide whether to stop.
pub fn stop_predicate(count: usize, oldest: i64, from: i64, page_size: usize) -> Option<StopReason> {
    if count == 0 {
        return Some(StopReason::NoMoreAttacks);
    }
    if count < page_size {
        return Some(StopReason::PartialPage);
    }
    if oldest <= from {
        return Some(StopReason::ReachedStartTime);
    }
    None
}

/// Abstraction over "fetch one page of attacks ending at `to`", so the
/// controller's looping logic can be unit tested against a scripted
/// sequence of pages without a real `UpstreamClient`.
#[async_trait]
pub trait PageSource {
    async fn page(&mut self, from: i64, to: i64) -> Result<Vec<Attack>, UpstreamError>;
    fn page_size(&self) -> usize;
}

pub struct PaginationOutcome {
    pub attacks: Vec<Attack>,
    pub stop_reason: StopReason,
    pub pages_fetched: u32,
    pub cap_exceeded: bool,
}

/// Drives `source` across `[from, to]` per the strategy. For `Simple`,
/// issues exactly one call. For `Paginated`, loops backwards until a stop
/// predicate fires or `max_pages` is exhausted (spec §4.5, §4.5.2).
pub async fn paginate<S: PageSource>(
    source: &mut S,
    strategy: &FetchStrategy,
) -> Result<PaginationOutcome, UpstreamError> {
    let from = strategy.time_range.start_epoch;
    let to = strategy.time_range.end_epoch;

    if strategy.method == Method::Simple {
        let attacks = source.page(from, to).await?;
        let count = attacks.len();
        let oldest = attacks.iter().map(|a| a.started_epoch).min().unwrap_or(to);
        let stop_reason = stop_predicate(count, oldest, from, source.page_size())
            .unwrap_or(StopReason::ReachedStartTime);
        return Ok(PaginationOutcome {
            attacks,
            stop_reason,
            pages_fetched: 1,
            cap_exceeded: false,
        });
    }

    let mut current_to = to;
    let mut collected = Vec::new();
    let mut pages_fetched = 0;

    loop {
        let page = source.page(from, current_to).await?;
        pages_fetched += 1;

        let count = page.len();
        let oldest = page.iter().map(|a| a.started_epoch).min().unwrap_or(current_to);
        collected.extend(page);

        if let Some(reason) = stop_predicate(count, oldest, from, source.page_size()) {
            return Ok(PaginationOutcome {
                attacks: collected,
                stop_reason: reason,
                pages_fetched,
                cap_exceeded: false,
            });
        }

        if pages_fetched >= strategy.pagination.max_pages {
            tracing::warn!(pages_fetched, "pagination cap exceeded, proceeding with partial results");
            return Ok(PaginationOutcome {
                attacks: collected,
                stop_reason: StopReason::MaxPagesExceeded,
                pages_fetched,
                cap_exceeded: true,
            });
        }

        current_to = oldest - 1;
    }
}
