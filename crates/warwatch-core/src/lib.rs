//! Adaptive monitoring core for faction war tracking.
//!
//! This crate contains the pure, deterministic pieces of the system (phase
//! classification, fetch planning, pagination control, ledger
//! reconciliation, member-state diffing) plus the boundary traits
//! (`UpstreamClient`, `LedgerStore`, `Clock`) that the orchestrator drives.
//! Nothing in here performs I/O directly; concrete adapters live in the
//! `warwatch` binary crate.

pub mod attack;
pub mod cells;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod pagination;
pub mod phase;
pub mod planner;
pub mod retry;
pub mod store;
pub mod strategy;
pub mod tracker;
pub mod upstream;
pub mod war;

pub use attack::{Attack, AttackDirection, AttackParty, AttackResult, Modifiers};
pub use cells::Cell;
pub use clock::{Clock, MockClock, SystemClock};
pub use error::{Error, PersistenceError, Result, UpstreamError};
pub use ledger::{existing_info_from_rows, reconcile, to_row, ExistingLedgerInfo, ReconciledAttack};
pub use orchestrator::{CycleOutcome, Orchestrator};
pub use pagination::{paginate, stop_predicate, PageSource, PaginationOutcome, StopReason};
pub use phase::{Phase, PhaseClassification, PhaseStateMachine};
pub use planner::{plan_fetch, should_process_war, FetchMode, FetchPlan, TimeRange};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use store::LedgerStore;
pub use strategy::{determine_fetch_strategy, estimate_api_calls, FetchStrategy, Method as StrategyMethod, PaginationConfig};
pub use tracker::{diff_members, MemberStateSnapshot, StateChange};
pub use upstream::UpstreamClient;
pub use war::{Faction, War, WarListing};
