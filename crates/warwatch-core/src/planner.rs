//! Attack-fetch planner (spec §4.3): pure function from a war and the
//! current cycle's mode to a time range and set of target sheets.

use crate::war::War;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Full,
    Incremental,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_epoch: i64,
    pub end_epoch: i64,
}

#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub fetch_mode: FetchMode,
    pub time_range: TimeRange,
    pub sheet_names: [String; 3],
}

/// Spec §4.3: full mode covers `[war.start, now]`; incremental covers
/// `[lastProcessed, now]`.
pub fn plan_fetch(
    war: &War,
    full_mode: bool,
    last_processed: DateTime<Utc>,
    now: DateTime<Utc>,
) -> FetchPlan {
    let (fetch_mode, start_epoch) = if full_mode {
        (FetchMode::Full, war.start_epoch)
    } else {
        (FetchMode::Incremental, last_processed.timestamp())
    };

    FetchPlan {
        fetch_mode,
        time_range: TimeRange {
            start_epoch,
            end_epoch: now.timestamp(),
        },
        sheet_names: war.sheet_names(),
    }
}

/// Spec §4.3 companion predicate.
pub fn should_process_war(war: &War, now: DateTime<Utc>) -> bool {
    let now_epoch = now.timestamp();
    if now_epoch < war.start_epoch {
        return false;
    }
    if let Some(end) = war.end_epoch {
        if now_epoch - end > 60 * 60 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::war::Faction;
    use chrono::TimeZone;

    fn faction(id: i64) -> Faction {
        Faction {
            id,
            name: format!("f{id}"),
            score: 0,
            chain: 0,
        }
    }

    fn war(id: i64, start: i64, end: Option<i64>) -> War {
        War {
            id,
            start_epoch: start,
            end_epoch: end,
            factions: [faction(1), faction(2)],
        }
    }

    // S1 — planner, full mode.
    #[test]
    fn s1_full_mode_ranges_from_war_start_to_now() {
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        let war = war(12345, now.timestamp() - 7200, None);
        let plan = plan_fetch(&war, true, now, now);
        assert_eq!(plan.fetch_mode, FetchMode::Full);
        assert_eq!(plan.time_range.start_epoch, war.start_epoch);
        assert_eq!(plan.time_range.end_epoch, now.timestamp());
        assert_eq!(
            plan.sheet_names,
            [
                "Summary - 12345".to_string(),
                "Records - 12345".to_string(),
                "Status - 12345".to_string(),
            ]
        );
    }

    // S2 — planner, incremental mode.
    #[test]
    fn s2_incremental_mode_ranges_from_last_processed_to_now() {
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        let last_processed = now - chrono::Duration::minutes(30);
        let war = war(12345, now.timestamp() - 7200, None);
        let plan = plan_fetch(&war, false, last_processed, now);
        assert_eq!(plan.fetch_mode, FetchMode::Incremental);
        assert_eq!(plan.time_range.start_epoch, last_processed.timestamp());
    }

    // S3 — shouldProcessWar.
    #[test]
    fn s3_should_process_war() {
        let now = Utc.timestamp_opt(10_000, 0).unwrap();

        let active = war(1, now.timestamp() - 3600, Some(now.timestamp() - 1800));
        assert!(should_process_war(&active, now));

        let long_ended = war(2, now.timestamp() - 18000, Some(now.timestamp() - 3660));
        assert!(!should_process_war(&long_ended, now));

        let not_started = war(3, now.timestamp() + 3600, None);
        assert!(!should_process_war(&not_started, now));
    }
}
