//! Attack observations and the record-tab row layout (spec §3 `Attack`,
//! `AttackDirection`, §6.5 persisted format).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackResult {
    Hospitalized,
    Mugged,
    Left,
    Escape,
    Stalemate,
    Assist,
    /// Any value the upstream sends that isn't one of the known variants —
    /// carried through verbatim rather than rejected (spec §3).
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackParty {
    pub user_id: i64,
    pub name: String,
    pub level: i32,
    pub faction: Option<PartyFaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyFaction {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub fair_fight: f64,
    pub war: f64,
    pub retaliation: f64,
    pub group: f64,
    pub overseas: f64,
    pub chain: f64,
    pub warlord: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishingHit {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub id: i64,
    /// Globally unique across attacks — the dedup key (spec §3, §4.6).
    pub code: String,
    pub started_epoch: i64,
    pub ended_epoch: i64,
    pub attacker: AttackParty,
    pub defender: AttackParty,
    pub result: AttackResult,
    pub respect_gain: f64,
    pub respect_loss: f64,
    pub chain: i64,
    pub is_interrupted: bool,
    pub is_stealthed: bool,
    pub is_raid: bool,
    pub is_ranked_war: bool,
    pub modifiers: Modifiers,
    pub finishing_hit: Option<FinishingHit>,
}

/// Relative to the faction of interest; computed at reconciliation time,
/// never stored upstream (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackDirection {
    Outgoing,
    Incoming,
    Unknown,
}

impl Attack {
    pub fn direction_for(&self, faction_id: i64) -> AttackDirection {
        if self.attacker.faction.as_ref().is_some_and(|f| f.id == faction_id) {
            AttackDirection::Outgoing
        } else if self.defender.faction.as_ref().is_some_and(|f| f.id == faction_id) {
            AttackDirection::Incoming
        } else {
            AttackDirection::Unknown
        }
    }

    /// True if either side of the attack belongs to one of the war's two
    /// factions (spec §3 "Relevance", §4.6 step 1).
    pub fn is_relevant_to(&self, faction_ids: [i64; 2]) -> bool {
        let attacker_in = self
            .attacker
            .faction
            .as_ref()
            .is_some_and(|f| faction_ids.contains(&f.id));
        let defender_in = self
            .defender
            .faction
            .as_ref()
            .is_some_and(|f| faction_ids.contains(&f.id));
        attacker_in || defender_in
    }
}
