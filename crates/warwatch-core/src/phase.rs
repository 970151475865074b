//! Phase classifier (§4.1) and phase state machine (§4.2).
//!
//! Both are pure with respect to wall time: `now` always arrives as a
//! parameter, never read from inside these functions (spec §9).

use crate::war::{War, WarListing};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoWars,
    PreWar,
    ActiveWar,
    PostWar,
}

const RECENTLY_ENDED_WINDOW: i64 = 60 * 60; // 1h, spec §4.1 / §9 tunable
const UPCOMING_WINDOW: i64 = 7 * 24 * 60 * 60; // 7 days
const MIN_DWELL: Duration = Duration::from_secs(30);

/// `(selectedWar?, Phase)` — cloned out of the listing so callers don't
/// need to keep the listing borrowed alive.
#[derive(Debug, Clone)]
pub struct PhaseClassification {
    pub war: Option<War>,
    pub phase: Phase,
}

/// Pure classification per spec §4.1: partition into active / recently
/// ended / upcoming, then pick by priority.
pub fn classify(listing: &WarListing, now: DateTime<Utc>) -> PhaseClassification {
    let now_epoch = now.timestamp();
    let wars = listing.all_wars();

    let active: Vec<&War> = wars.iter().copied().filter(|w| w.is_active_at(now)).collect();
    if let Some(war) = active.iter().max_by_key(|w| w.start_epoch) {
        return PhaseClassification {
            war: Some((*war).clone()),
            phase: Phase::ActiveWar,
        };
    }

    let upcoming: Vec<&War> = wars
        .iter()
        .copied()
        .filter(|w| {
            w.start_epoch > now_epoch && w.start_epoch - now_epoch <= UPCOMING_WINDOW
        })
        .collect();
    if let Some(war) = upcoming.iter().min_by_key(|w| w.start_epoch) {
        return PhaseClassification {
            war: Some((*war).clone()),
            phase: Phase::PreWar,
        };
    }

    let recently_ended: Vec<&War> = wars
        .iter()
        .copied()
        .filter(|w| {
            w.end_epoch
                .is_some_and(|end| now_epoch - end >= 0 && now_epoch - end <= RECENTLY_ENDED_WINDOW)
        })
        .collect();
    if let Some(war) = recently_ended.iter().max_by_key(|w| w.end_epoch) {
        return PhaseClassification {
            war: Some((*war).clone()),
            phase: Phase::PostWar,
        };
    }

    PhaseClassification {
        war: None,
        phase: Phase::NoWars,
    }
}

/// Returns the next UTC instant that is Tuesday 12:05:00, strictly after
/// `now` (spec §4.2, §8 property 9).
pub fn next_matchmaking_instant(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let candidate_today = Utc
        .from_utc_datetime(&today.and_hms_opt(12, 5, 0).expect("valid time"));

    let days_until_tuesday = (Weekday::Tue.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);

    if days_until_tuesday == 0 && candidate_today > now {
        return candidate_today;
    }

    let days_to_add = if days_until_tuesday == 0 {
        7
    } else {
        days_until_tuesday
    };
    let target_date = today + chrono::Duration::days(days_to_add);
    Utc.from_utc_datetime(&target_date.and_hms_opt(12, 5, 0).expect("valid time"))
}

/// Owns current phase, last-transition time, and last selected war. The
/// orchestrator holds exactly one of these (spec §5: "a consistent triple
/// that must be updated atomically if observed from multiple threads").
#[derive(Debug)]
pub struct PhaseStateMachine {
    phase: Phase,
    last_transition: DateTime<Utc>,
    selected_war: Option<War>,
}

impl PhaseStateMachine {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::NoWars,
            last_transition: now,
            selected_war: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_war(&self) -> Option<&War> {
        self.selected_war.as_ref()
    }

    fn dwell_satisfied(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.last_transition);
        elapsed >= chrono::Duration::from_std(MIN_DWELL).expect("MIN_DWELL fits chrono::Duration")
    }

    /// Spec §4.2 anti-oscillation guard. Returns whether the transition
    /// from `self.phase` to `candidate` is permitted right now.
    fn transition_allowed(&self, candidate: Phase, now: DateTime<Utc>) -> bool {
        use Phase::*;
        match (self.phase, candidate) {
            (from, to) if from == to => true,
            (NoWars, _) => true,
            (PreWar, ActiveWar) | (PreWar, PostWar) => true,
            (PreWar, NoWars) => self.dwell_satisfied(now),
            (ActiveWar, PostWar) | (ActiveWar, PreWar) => true,
            (ActiveWar, NoWars) => false,
            (PostWar, NoWars) | (PostWar, PreWar) => self.dwell_satisfied(now),
            (PostWar, ActiveWar) => true,
            _ => true,
        }
    }

    /// Spec §4.2 `update`: classify, then apply the guard. Always refreshes
    /// the selected war, even when the candidate phase is denied.
    pub fn update(&mut self, listing: &WarListing, now: DateTime<Utc>) -> Phase {
        let classification = classify(listing, now);

        if classification.phase == self.phase {
            self.selected_war = classification.war;
            return self.phase;
        }

        if self.transition_allowed(classification.phase, now) {
            tracing::debug!(
                from = ?self.phase,
                to = ?classification.phase,
                "phase transition"
            );
            self.phase = classification.phase;
            self.last_transition = now;
        } else {
            tracing::debug!(
                from = ?self.phase,
                denied = ?classification.phase,
                "phase transition denied by anti-oscillation guard"
            );
        }
        self.selected_war = classification.war;
        self.phase
    }

    /// Spec §4.2 `shouldProcessNow`.
    pub fn should_process_now(&self, now: DateTime<Utc>) -> bool {
        match self.phase {
            Phase::ActiveWar | Phase::PreWar | Phase::PostWar => true,
            Phase::NoWars => {
                let tolerance = chrono::Duration::seconds(30);
                now >= self.next_check_at(now) - tolerance
            }
        }
    }

    /// Spec §4.2 `nextCheckAt`.
    pub fn next_check_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.phase {
            Phase::ActiveWar => now + chrono::Duration::minutes(1),
            Phase::PreWar => now + chrono::Duration::minutes(5),
            Phase::NoWars | Phase::PostWar => next_matchmaking_instant(now),
        }
    }
}
