//! War and faction descriptors (spec §3 `War`, `WarListing`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: i64,
    pub name: String,
    pub score: i64,
    pub chain: i64,
}

/// Immutable descriptor of one competitive matchup between exactly two
/// factions. `end_epoch` absent means the war is still ongoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct War {
    pub id: i64,
    pub start_epoch: i64,
    pub end_epoch: Option<i64>,
    pub factions: [Faction; 2],
}

impl War {
    pub fn is_well_formed(&self) -> bool {
        let ends_after_start = self.end_epoch.map_or(true, |end| end >= self.start_epoch);
        let distinct_factions = self.factions[0].id != self.factions[1].id;
        ends_after_start && distinct_factions
    }

    pub fn has_faction(&self, faction_id: i64) -> bool {
        self.factions.iter().any(|f| f.id == faction_id)
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.start_epoch <= now && self.end_epoch.map_or(true, |end| now < end)
    }

    /// The canonical three tab names for this war (spec §6.4).
    pub fn sheet_names(&self) -> [String; 3] {
        [
            format!("Summary - {}", self.id),
            format!("Records - {}", self.id),
            format!("Status - {}", self.id),
        ]
    }
}

/// Snapshot of current wars, partitioned by matchmaking category, exactly
/// as the upstream API returns them (spec §3 `WarListing`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarListing {
    pub ranked: Option<War>,
    pub raids: Vec<War>,
    pub territory: Vec<War>,
}

impl WarListing {
    /// Flattens ranked, raids and territory in that order — the classifier
    /// relies on this order to break ties deterministically (spec §4.1).
    pub fn all_wars(&self) -> Vec<&War> {
        let mut out = Vec::new();
        if let Some(war) = &self.ranked {
            out.push(war);
        }
        out.extend(self.raids.iter());
        out.extend(self.territory.iter());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faction(id: i64) -> Faction {
        Faction {
            id,
            name: format!("faction-{id}"),
            score: 0,
            chain: 0,
        }
    }

    #[test]
    fn well_formed_requires_distinct_factions_and_ordered_times() {
        let war = War {
            id: 1,
            start_epoch: 100,
            end_epoch: Some(50),
            factions: [faction(1), faction(2)],
        };
        assert!(!war.is_well_formed());

        let war = War {
            end_epoch: Some(200),
            ..war
        };
        assert!(war.is_well_formed());

        let war = War {
            factions: [faction(1), faction(1)],
            ..war
        };
        assert!(!war.is_well_formed());
    }

    #[test]
    fn listing_flattens_ranked_before_raids_before_territory() {
        let listing = WarListing {
            ranked: Some(War {
                id: 1,
                start_epoch: 0,
                end_epoch: None,
                factions: [faction(1), faction(2)],
            }),
            raids: vec![War {
                id: 2,
                start_epoch: 0,
                end_epoch: None,
                factions: [faction(1), faction(2)],
            }],
            territory: vec![War {
                id: 3,
                start_epoch: 0,
                end_epoch: None,
                factions: [faction(1), faction(2)],
            }],
        };
        let ids: Vec<i64> = listing.all_wars().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
