//! Fetch-strategy selector (spec §4.4): picks a single-shot call vs
//! backwards-windowed pagination based on range duration.

use crate::planner::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Simple,
    Paginated,
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub enabled: bool,
    pub max_pages: u32,
    pub stop_on_gap: bool,
    pub gap_threshold_seconds: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchStrategy {
    pub method: Method,
    pub time_range: TimeRange,
    pub pagination: PaginationConfig,
}

const SIMPLE_MAX_DURATION_SECONDS: i64 = 24 * 60 * 60;
const PAGINATED_MAX_PAGES: u32 = 100;
const PAGINATED_GAP_THRESHOLD_SECONDS: i64 = 5 * 60;

/// Spec §4.4: duration <= 24h -> Simple; otherwise Paginated with the
/// fixed knobs (maxPages=100, gapThreshold=5m).
pub fn determine_fetch_strategy(start_epoch: i64, end_epoch: i64) -> FetchStrategy {
    let duration = end_epoch - start_epoch;
    let time_range = TimeRange {
        start_epoch,
        end_epoch,
    };

    if duration <= SIMPLE_MAX_DURATION_SECONDS {
        FetchStrategy {
            method: Method::Simple,
            time_range,
            pagination: PaginationConfig {
                enabled: false,
                max_pages: 1,
                stop_on_gap: false,
                gap_threshold_seconds: PAGINATED_GAP_THRESHOLD_SECONDS,
            },
        }
    } else {
        FetchStrategy {
            method: Method::Paginated,
            time_range,
            pagination: PaginationConfig {
                enabled: true,
                max_pages: PAGINATED_MAX_PAGES,
                stop_on_gap: true,
                gap_threshold_seconds: PAGINATED_GAP_THRESHOLD_SECONDS,
            },
        }
    }
}

/// Spec §4.4 companion `estimateApiCalls`: advisory only, used for
/// telemetry, never for flow control.
pub fn estimate_api_calls(strategy: &FetchStrategy) -> u32 {
    match strategy.method {
        Method::Simple => 1,
        Method::Paginated => {
            let hours = (strategy.time_range.end_epoch - strategy.time_range.start_epoch) as f64
                / 3600.0;
            ((hours * 10.0 / 100.0).floor() as u32).max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // S4 — strategy boundary.
    #[test]
    fn s4_boundary_at_24_hours() {
        let now = 1_000_000_i64;
        let thirty_min = determine_fetch_strategy(now - 1800, now);
        assert_eq!(thirty_min.method, Method::Simple);

        let exactly_24h = determine_fetch_strategy(now - 24 * 3600, now);
        assert_eq!(exactly_24h.method, Method::Simple);

        let just_over = determine_fetch_strategy(now - 25 * 3600, now);
        assert_eq!(just_over.method, Method::Paginated);
        assert_eq!(just_over.pagination.max_pages, 100);
        assert_eq!(just_over.pagination.gap_threshold_seconds, 300);
    }

    // invariant 6 — strategy boundary holds for a spread of durations.
    #[test]
    fn invariant_strategy_boundary_matches_duration_predicate() {
        for hours in [0, 1, 12, 24, 25, 48, 200] {
            let strategy = determine_fetch_strategy(0, hours * 3600);
            let expected = if hours * 3600 <= SIMPLE_MAX_DURATION_SECONDS {
                Method::Simple
            } else {
                Method::Paginated
            };
            assert_eq!(strategy.method, expected, "hours={hours}");
        }
    }
}
