//! Upstream client boundary (spec §6.3). The wire format is explicitly out
//! of scope for this crate — only the typed contract lives here; concrete
//! adapters (HTTP, or a scripted fake for tests) live in the `warwatch`
//! binary crate and the ledger/pagination test modules.

use crate::attack::Attack;
use crate::error::UpstreamError;
use crate::tracker::MemberStateSnapshot;
use crate::war::WarListing;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn list_wars(&self) -> Result<WarListing, UpstreamError>;

    /// Returns up to the upstream's fixed page size, ordered by
    /// `started_epoch` descending (spec §6.3, §4.5).
    async fn page_attacks(&self, from_epoch: i64, to_epoch: i64) -> Result<Vec<Attack>, UpstreamError>;

    async fn read_faction(
        &self,
        faction_id: i64,
    ) -> Result<HashMap<i64, MemberStateSnapshot>, UpstreamError>;

    /// Same as `read_faction`, with the faction id resolved from the
    /// caller's own credentials.
    async fn read_own_faction(&self) -> Result<HashMap<i64, MemberStateSnapshot>, UpstreamError>;

    /// Resolves the caller's own faction id directly from upstream,
    /// independent of any local configuration. `OWN_FACTION_ID` (spec
    /// SPEC_FULL §10.2) is only a startup hint — when absent, the binary
    /// falls back to this call once before the first cycle.
    async fn identify_own_faction(&self) -> Result<i64, UpstreamError>;

    /// The fixed page size this client's upstream returns per call
    /// (observed as 100, but kept configurable per spec §9's open
    /// question — callers should rely on `count < page_size`, not a
    /// hard-coded comparison against 100).
    fn page_size(&self) -> usize;

    /// Number of calls made since the counter was last reset (spec §6.3,
    /// §5 — must be safe to increment from concurrent callers).
    fn call_count(&self) -> u64;

    fn reset_call_count(&self);
}
