//! Processing orchestrator (spec §4.8): drives one cycle end to end.
//! Failure isolation is per-war — a failure processing one war is logged
//! and the cycle continues with the remaining wars and the member tracker
//! (spec §4.8, §7).

use crate::attack::Attack;
use crate::cells::Cell;
use crate::clock::Clock;
use crate::error::UpstreamError;
use crate::ledger::{self, ExistingLedgerInfo};
use crate::pagination::{self, PageSource};
use crate::phase::{Phase, PhaseStateMachine};
use crate::planner::{self, FetchMode};
use crate::store::{self, LedgerStore};
use crate::strategy;
use crate::tracker;
use crate::upstream::UpstreamClient;
use crate::war::War;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Bridges `UpstreamClient::page_attacks` into the `PageSource` trait the
/// pagination controller drives — the two signatures already line up, so
/// this is a thin pass-through.
struct UpstreamPageSource<'a> {
    upstream: &'a dyn UpstreamClient,
}

#[async_trait::async_trait]
impl<'a> PageSource for UpstreamPageSource<'a> {
    async fn page(&mut self, from: i64, to: i64) -> Result<Vec<Attack>, UpstreamError> {
        self.upstream.page_attacks(from, to).await
    }

    fn page_size(&self) -> usize {
        self.upstream.page_size()
    }
}

#[derive(Debug, Clone)]
pub struct WarFailure {
    pub war_id: i64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub phase: Phase,
    pub processed: bool,
    pub api_calls: u64,
    pub war_failures: Vec<WarFailure>,
}

pub struct Orchestrator {
    upstream: Arc<dyn UpstreamClient>,
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    state_machine: Mutex<PhaseStateMachine>,
    own_faction_id: i64,
    last_processed_wall_time: Mutex<HashMap<i64, DateTime<Utc>>>,
}

impl Orchestrator {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        own_faction_id: i64,
    ) -> Self {
        let now = clock.now();
        Self {
            upstream,
            store,
            clock,
            state_machine: Mutex::new(PhaseStateMachine::new(now)),
            own_faction_id,
            last_processed_wall_time: Mutex::new(HashMap::new()),
        }
    }

    pub fn current_phase(&self) -> Phase {
        self.state_machine.lock().expect("state machine mutex poisoned").phase()
    }

    pub fn should_process_now(&self) -> bool {
        let now = self.clock.now();
        self.state_machine
            .lock()
            .expect("state machine mutex poisoned")
            .should_process_now(now)
    }

    /// Spec §4.8: one full cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.upstream.reset_call_count();
        let now = self.clock.now();

        let listing = match self.upstream.list_wars().await {
            Ok(listing) => listing,
            Err(err) => {
                tracing::warn!(error = %err, "list_wars failed, skipping cycle");
                return CycleOutcome {
                    phase: self.current_phase(),
                    processed: false,
                    api_calls: self.upstream.call_count(),
                    war_failures: vec![],
                };
            }
        };

        let phase = {
            let mut sm = self.state_machine.lock().expect("state machine mutex poisoned");
            sm.update(&listing, now)
        };

        if !self.should_process_now() {
            tracing::info!(?phase, "skipped tick");
            return CycleOutcome {
                phase,
                processed: false,
                api_calls: self.upstream.call_count(),
                war_failures: vec![],
            };
        }

        let selected_war = self
            .state_machine
            .lock()
            .expect("state machine mutex poisoned")
            .selected_war()
            .cloned();

        let mut war_failures = Vec::new();
        let tracked_factions = self.tracked_factions(phase, selected_war.as_ref());

        if let Some(war) = selected_war.as_ref() {
            if planner::should_process_war(war, now) {
                if let Err(err) = self.process_war(war, now).await {
                    tracing::info!(war_id = war.id, error = %err, "skipped war for this cycle");
                    war_failures.push(WarFailure {
                        war_id: war.id,
                        message: err.to_string(),
                    });
                }
            }
        }

        let mut tracked_snapshots = HashMap::new();
        for faction_id in tracked_factions {
            match self.track_faction(faction_id, now).await {
                Ok(current) => {
                    tracked_snapshots.insert(faction_id, current);
                }
                Err(err) => {
                    tracing::info!(faction_id, error = %err, "member-state tracking failed for this cycle");
                }
            }
        }

        if phase != Phase::NoWars {
            if let Some(war) = selected_war.as_ref() {
                if let Err(err) = self.write_status_tab(war, &tracked_snapshots).await {
                    tracing::info!(war_id = war.id, error = %err, "failed to refresh status tab for this cycle");
                }
            }
        }

        let api_calls = self.upstream.call_count();
        tracing::info!(?phase, api_calls, "cycle complete");

        CycleOutcome {
            phase,
            processed: true,
            api_calls,
            war_failures,
        }
    }

    fn tracked_factions(&self, phase: Phase, selected_war: Option<&War>) -> Vec<i64> {
        match phase {
            Phase::NoWars => vec![self.own_faction_id],
            Phase::PreWar | Phase::ActiveWar | Phase::PostWar => selected_war
                .map(|w| vec![w.factions[0].id, w.factions[1].id])
                .unwrap_or_default(),
        }
    }

    async fn process_war(&self, war: &War, now: DateTime<Utc>) -> anyhow::Result<()> {
        let [summary_tab, records_tab, status_tab] = war.sheet_names();

        for tab in [&summary_tab, &records_tab, &status_tab] {
            self.store.ensure_tab(tab).await?;
        }

        let existing_rows = self.store.read_range(&records_tab, 2, usize::MAX).await?;
        let existing = ledger::existing_info_from_rows(&existing_rows);
        let full_mode = existing.record_count == 0;

        // Prefer the in-process cache (cheap, avoids a watermark that can
        // only advance in whole-row increments), but on a cold start — no
        // entry yet, e.g. right after a restart — fall back to the
        // persisted watermark (spec §1 resumption guarantee, §3/§8
        // completeness bound) rather than `now`, which would silently skip
        // every attack between the true watermark and the current cycle.
        let last_processed = {
            let map = self.last_processed_wall_time.lock().expect("mutex poisoned");
            map.get(&war.id).copied().unwrap_or_else(|| {
                if full_mode {
                    now
                } else {
                    DateTime::from_timestamp(existing.latest_started_epoch, 0).unwrap_or(now)
                }
            })
        };

        let plan = planner::plan_fetch(war, full_mode, last_processed, now);
        if plan.fetch_mode == FetchMode::None {
            return Ok(());
        }

        let fetch_strategy = strategy::determine_fetch_strategy(
            plan.time_range.start_epoch,
            plan.time_range.end_epoch,
        );

        let mut source = UpstreamPageSource {
            upstream: self.upstream.as_ref(),
        };
        let outcome = pagination::paginate(&mut source, &fetch_strategy).await?;
        if outcome.cap_exceeded {
            tracing::warn!(war_id = war.id, pages = outcome.pages_fetched, "pagination cap exceeded");
        }

        let war_factions = [war.factions[0].id, war.factions[1].id];
        let reconciled = ledger::reconcile(outcome.attacks, &existing, war_factions, war_factions[0]);

        if !reconciled.is_empty() {
            let rows: Vec<_> = reconciled.iter().map(ledger::to_row).collect();
            let start_row = ledger::append_start_row(existing.record_count);
            let needed_rows = start_row + rows.len();
            self.store.ensure_capacity(&records_tab, needed_rows, 32).await?;
            self.store.append_rows(&records_tab, rows).await?;
        }

        self.last_processed_wall_time
            .lock()
            .expect("mutex poisoned")
            .insert(war.id, now);

        self.write_summary(&summary_tab, war, &existing, reconciled.len()).await?;

        Ok(())
    }

    async fn write_summary(
        &self,
        summary_tab: &str,
        war: &War,
        existing: &ExistingLedgerInfo,
        newly_written: usize,
    ) -> anyhow::Result<()> {
        let total = existing.record_count + newly_written;
        let row = vec![
            Cell::Int(war.id),
            Cell::Str(war.factions[0].name.clone()),
            Cell::Int(war.factions[0].score),
            Cell::Str(war.factions[1].name.clone()),
            Cell::Int(war.factions[1].score),
            Cell::Int(total as i64),
        ];
        self.store.overwrite_range(summary_tab, 2, vec![row]).await?;
        Ok(())
    }

    async fn track_faction(
        &self,
        faction_id: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<i64, tracker::MemberStateSnapshot>> {
        let current = if faction_id == self.own_faction_id {
            self.upstream.read_own_faction().await?
        } else {
            self.upstream.read_faction(faction_id).await?
        };

        let previous_tab = store::previous_states_tab(faction_id);
        let changes_tab = store::state_changes_tab(faction_id);
        self.store.ensure_tab(&previous_tab).await?;
        self.store.ensure_tab(&changes_tab).await?;

        let had_previous = self.store.tab_exists(&previous_tab).await?
            && !self.store.read_range(&previous_tab, 2, 2).await?.is_empty();

        if had_previous {
            let previous_rows = self.store.read_range(&previous_tab, 2, usize::MAX).await?;
            let previous = snapshot_map_from_rows(&previous_rows);
            let changes = tracker::diff_members(&previous, &current, now.timestamp());
            if !changes.is_empty() {
                let rows: Vec<_> = changes.iter().map(state_change_to_row).collect();
                self.store.append_rows(&changes_tab, rows).await?;
            }
        }

        let snapshot_rows: Vec<_> = current.values().map(snapshot_to_row).collect();
        self.store.clear_range(&previous_tab, 2, usize::MAX).await?;
        self.store.overwrite_range(&previous_tab, 2, snapshot_rows).await?;

        Ok(current)
    }

    /// Refreshes the war's `Status - {warId}` tab from whichever of its two
    /// factions were tracked this cycle (spec §4.8 step 5 names this tab
    /// among the three ensured per war; its content isn't otherwise
    /// specified, so it's materialized here as a live member-status board
    /// for both sides of the war — see DESIGN.md).
    async fn write_status_tab(
        &self,
        war: &War,
        tracked_snapshots: &HashMap<i64, HashMap<i64, tracker::MemberStateSnapshot>>,
    ) -> anyhow::Result<()> {
        let status_tab = war.sheet_names()[2].clone();
        let mut rows = Vec::new();
        for faction in &war.factions {
            let Some(members) = tracked_snapshots.get(&faction.id) else {
                continue;
            };
            let mut members: Vec<_> = members.values().collect();
            members.sort_by_key(|m| m.member_id);
            for member in members {
                rows.push(vec![
                    Cell::Int(faction.id),
                    Cell::Str(faction.name.clone()),
                    Cell::Int(member.member_id),
                    Cell::Str(member.name.clone()),
                    Cell::Int(member.level as i64),
                    Cell::Str(member.status.description.clone()),
                    Cell::Str(member.status.state.clone()),
                    Cell::Str(member.last_action.status.clone()),
                ]);
            }
        }
        self.store.clear_range(&status_tab, 2, usize::MAX).await?;
        if !rows.is_empty() {
            self.store.overwrite_range(&status_tab, 2, rows).await?;
        }
        Ok(())
    }
}

fn snapshot_to_row(snapshot: &tracker::MemberStateSnapshot) -> Vec<Cell> {
    vec![
        Cell::Int(snapshot.member_id),
        Cell::Str(snapshot.name.clone()),
        Cell::Int(snapshot.level as i64),
        Cell::Str(snapshot.position.clone()),
        Cell::Str(snapshot.last_action.status.clone()),
        Cell::Int(snapshot.last_action.timestamp_epoch),
        Cell::Str(snapshot.status.description.clone()),
        Cell::Str(snapshot.status.state.clone()),
        snapshot.status.until_epoch.map(Cell::Int).unwrap_or(Cell::Empty),
        Cell::Str(snapshot.status.travel_type.clone()),
    ]
}

fn snapshot_map_from_rows(rows: &[Vec<Cell>]) -> HashMap<i64, tracker::MemberStateSnapshot> {
    rows.iter()
        .filter_map(|row| {
            let member_id = row.first()?.as_i64()?;
            Some((
                member_id,
                tracker::MemberStateSnapshot {
                    member_id,
                    name: row.get(1)?.as_str()?.to_string(),
                    level: row.get(2)?.as_i64()? as i32,
                    position: row.get(3)?.as_str().unwrap_or_default().to_string(),
                    last_action: tracker::LastAction {
                        status: row.get(4)?.as_str().unwrap_or_default().to_string(),
                        timestamp_epoch: row.get(5).and_then(|c| c.as_i64()).unwrap_or_default(),
                        human_relative: String::new(),
                    },
                    status: tracker::MemberStatus {
                        description: row.get(6)?.as_str().unwrap_or_default().to_string(),
                        state: row.get(7)?.as_str().unwrap_or_default().to_string(),
                        colour: String::new(),
                        details: String::new(),
                        until_epoch: row.get(8).and_then(|c| c.as_i64()),
                        travel_type: row.get(9).and_then(|c| c.as_str()).unwrap_or_default().to_string(),
                        plane_image_type: String::new(),
                    },
                },
            ))
        })
        .collect()
}

fn state_change_to_row(change: &tracker::StateChange) -> Vec<Cell> {
    vec![
        Cell::Int(change.observed_at_epoch),
        Cell::Int(change.member_id),
        Cell::Str(change.name.clone()),
        Cell::Str(change.current_status.state.clone()),
        Cell::Str(change.current_status.description.clone()),
        Cell::Str(change.current_last_action.status.clone()),
        Cell::Str(change.previous_state.clone().unwrap_or_default()),
        Cell::Str(change.previous_last_action_status.clone().unwrap_or_default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{AttackParty, AttackResult, Modifiers, PartyFaction};
    use crate::clock::MockClock;
    use crate::error::PersistenceError;
    use crate::tracker::{LastAction, MemberStateSnapshot, MemberStatus};
    use crate::war::{Faction, WarListing};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex as AsyncMutex;

    struct FakeUpstream {
        listing: WarListing,
        attacks: Vec<Attack>,
        factions: HashMap<i64, HashMap<i64, MemberStateSnapshot>>,
        own_faction_id: i64,
        calls: AtomicU64,
    }

    #[async_trait]
    impl UpstreamClient for FakeUpstream {
        async fn list_wars(&self) -> Result<WarListing, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.listing.clone())
        }

        async fn page_attacks(&self, from_epoch: i64, to_epoch: i64) -> Result<Vec<Attack>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .attacks
                .iter()
                .filter(|a| a.started_epoch >= from_epoch && a.started_epoch <= to_epoch)
                .cloned()
                .collect())
        }

        async fn read_faction(&self, faction_id: i64) -> Result<HashMap<i64, MemberStateSnapshot>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.factions.get(&faction_id).cloned().unwrap_or_default())
        }

        async fn read_own_faction(&self) -> Result<HashMap<i64, MemberStateSnapshot>, UpstreamError> {
            self.read_faction(self.own_faction_id).await
        }

        async fn identify_own_faction(&self) -> Result<i64, UpstreamError> {
            Ok(self.own_faction_id)
        }

        fn page_size(&self) -> usize {
            100
        }

        fn call_count(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }

        fn reset_call_count(&self) {
            self.calls.store(0, Ordering::SeqCst);
        }
    }

    struct MemoryStore {
        tabs: AsyncMutex<HashMap<String, Vec<Vec<Cell>>>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                tabs: AsyncMutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl LedgerStore for MemoryStore {
        async fn ensure_tab(&self, name: &str) -> Result<(), PersistenceError> {
            self.tabs.lock().await.entry(name.to_string()).or_default();
            Ok(())
        }

        async fn tab_exists(&self, name: &str) -> Result<bool, PersistenceError> {
            Ok(self.tabs.lock().await.contains_key(name))
        }

        async fn read_range(&self, tab: &str, start_row: usize, end_row: usize) -> Result<Vec<Vec<Cell>>, PersistenceError> {
            let tabs = self.tabs.lock().await;
            let rows = tabs.get(tab).cloned().unwrap_or_default();
            let start = start_row.saturating_sub(2).min(rows.len());
            let end = if end_row == usize::MAX {
                rows.len()
            } else {
                end_row.saturating_sub(2).saturating_add(1).min(rows.len())
            };
            Ok(rows.get(start..end.max(start)).unwrap_or_default().to_vec())
        }

        async fn overwrite_range(&self, tab: &str, _start_row: usize, rows: Vec<Vec<Cell>>) -> Result<(), PersistenceError> {
            self.tabs.lock().await.insert(tab.to_string(), rows);
            Ok(())
        }

        async fn append_rows(&self, tab: &str, rows: Vec<Vec<Cell>>) -> Result<(), PersistenceError> {
            self.tabs.lock().await.entry(tab.to_string()).or_default().extend(rows);
            Ok(())
        }

        async fn clear_range(&self, tab: &str, _start_row: usize, _end_row: usize) -> Result<(), PersistenceError> {
            self.tabs.lock().await.insert(tab.to_string(), Vec::new());
            Ok(())
        }

        async fn ensure_capacity(&self, _tab: &str, _rows: usize, _cols: usize) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    fn faction(id: i64, name: &str) -> Faction {
        Faction {
            id,
            name: name.to_string(),
            score: 0,
            chain: 0,
        }
    }

    fn attack(code: &str, started: i64, attacker_faction: i64, defender_faction: i64) -> Attack {
        Attack {
            id: 1,
            code: code.into(),
            started_epoch: started,
            ended_epoch: started + 10,
            attacker: AttackParty {
                user_id: 1,
                name: "a".into(),
                level: 1,
                faction: Some(PartyFaction {
                    id: attacker_faction,
                    name: "A".into(),
                }),
            },
            defender: AttackParty {
                user_id: 2,
                name: "b".into(),
                level: 1,
                faction: Some(PartyFaction {
                    id: defender_faction,
                    name: "B".into(),
                }),
            },
            result: AttackResult::Mugged,
            respect_gain: 1.0,
            respect_loss: 0.0,
            chain: 0,
            is_interrupted: false,
            is_stealthed: false,
            is_raid: false,
            is_ranked_war: true,
            modifiers: Modifiers {
                fair_fight: 1.0,
                war: 1.0,
                retaliation: 1.0,
                group: 1.0,
                overseas: 1.0,
                chain: 1.0,
                warlord: 1.0,
            },
            finishing_hit: None,
        }
    }

    #[tokio::test]
    async fn active_war_cycle_writes_attacks_and_no_failures() {
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let war = War {
            id: 777,
            start_epoch: now.timestamp() - 3600,
            end_epoch: Some(now.timestamp() + 3600),
            factions: [faction(10, "Us"), faction(20, "Them")],
        };
        let listing = WarListing {
            ranked: Some(war.clone()),
            raids: vec![],
            territory: vec![],
        };
        let upstream = Arc::new(FakeUpstream {
            listing,
            attacks: vec![attack("a1", now.timestamp() - 100, 10, 20)],
            factions: HashMap::new(),
            own_faction_id: 10,
            calls: AtomicU64::new(0),
        });
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new(now));
        let orchestrator = Orchestrator::new(upstream, store.clone(), clock, 10);

        let outcome = orchestrator.run_cycle().await;
        assert_eq!(outcome.phase, Phase::ActiveWar);
        assert!(outcome.processed);
        assert!(outcome.war_failures.is_empty());

        let records = store.tabs.lock().await.get("Records - 777").cloned().unwrap_or_default();
        assert_eq!(records.len(), 1);

        // The member-status board gets a row per defender even with no
        // faction-members endpoint data configured, since write_status_tab
        // only reads whatever track_faction fetched this cycle.
        let status = store.tabs.lock().await.get("Status - 777").cloned().unwrap_or_default();
        assert!(status.is_empty());
    }

    #[tokio::test]
    async fn active_war_status_tab_reflects_tracked_faction_members() {
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let war = War {
            id: 900,
            start_epoch: now.timestamp() - 3600,
            end_epoch: Some(now.timestamp() + 3600),
            factions: [faction(10, "Us"), faction(20, "Them")],
        };
        let listing = WarListing {
            ranked: Some(war.clone()),
            raids: vec![],
            territory: vec![],
        };
        let mut us_members = HashMap::new();
        us_members.insert(
            1,
            MemberStateSnapshot {
                member_id: 1,
                name: "alice".into(),
                level: 20,
                position: "Member".into(),
                last_action: LastAction {
                    status: "Online".into(),
                    timestamp_epoch: now.timestamp(),
                    human_relative: "now".into(),
                },
                status: MemberStatus {
                    description: "Okay".into(),
                    state: "Okay".into(),
                    colour: "green".into(),
                    details: String::new(),
                    until_epoch: None,
                    travel_type: String::new(),
                    plane_image_type: String::new(),
                },
            },
        );
        let mut factions = HashMap::new();
        factions.insert(10, us_members);

        let upstream = Arc::new(FakeUpstream {
            listing,
            attacks: vec![],
            factions,
            own_faction_id: 10,
            calls: AtomicU64::new(0),
        });
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new(now));
        let orchestrator = Orchestrator::new(upstream, store.clone(), clock, 10);

        orchestrator.run_cycle().await;

        let status = store.tabs.lock().await.get("Status - 900").cloned().unwrap_or_default();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0][1], Cell::Str("Us".into()));
        assert_eq!(status[0][3], Cell::Str("alice".into()));
    }

    #[tokio::test]
    async fn repeated_cycles_do_not_duplicate_attacks() {
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let war = War {
            id: 778,
            start_epoch: now.timestamp() - 3600,
            end_epoch: Some(now.timestamp() + 3600),
            factions: [faction(10, "Us"), faction(20, "Them")],
        };
        let listing = WarListing {
            ranked: Some(war.clone()),
            raids: vec![],
            territory: vec![],
        };
        let upstream = Arc::new(FakeUpstream {
            listing,
            attacks: vec![attack("a1", now.timestamp() - 100, 10, 20)],
            factions: HashMap::new(),
            own_faction_id: 10,
            calls: AtomicU64::new(0),
        });
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new(now));
        let orchestrator = Orchestrator::new(upstream, store.clone(), clock, 10);

        orchestrator.run_cycle().await;
        orchestrator.run_cycle().await;

        let records = store.tabs.lock().await.get("Records - 778").cloned().unwrap_or_default();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn no_wars_phase_tracks_own_faction_and_emits_no_change_rows_on_first_observation() {
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let mut members = HashMap::new();
        members.insert(
            1,
            MemberStateSnapshot {
                member_id: 1,
                name: "solo".into(),
                level: 10,
                position: "Member".into(),
                last_action: LastAction {
                    status: "Online".into(),
                    timestamp_epoch: now.timestamp(),
                    human_relative: "now".into(),
                },
                status: MemberStatus {
                    description: "Okay".into(),
                    state: "Okay".into(),
                    colour: "green".into(),
                    details: String::new(),
                    until_epoch: None,
                    travel_type: String::new(),
                    plane_image_type: String::new(),
                },
            },
        );
        let mut factions = HashMap::new();
        factions.insert(10, members);

        let upstream = Arc::new(FakeUpstream {
            listing: WarListing::default(),
            attacks: vec![],
            factions,
            own_faction_id: 10,
            calls: AtomicU64::new(0),
        });
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MockClock::new(now));
        let orchestrator = Orchestrator::new(upstream, store.clone(), clock, 10);

        let outcome = orchestrator.run_cycle().await;
        assert_eq!(outcome.phase, Phase::NoWars);

        let changes = store.tabs.lock().await.get("State Changes - 10").cloned().unwrap_or_default();
        assert!(changes.is_empty());

        let previous = store.tabs.lock().await.get("Previous States - 10").cloned().unwrap_or_default();
        assert_eq!(previous.len(), 1);
    }
}
