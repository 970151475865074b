//! Attack ledger (spec §4.6): reconciliation against previously persisted
//! records, plus the 32-column record-row encoding (spec §6.5).

use crate::attack::{Attack, AttackDirection, AttackResult};
use crate::cells::{optional_faction_id, Cell};
use crate::store::Row;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashSet;

const CODE_COLUMN: usize = 1;
const STARTED_COLUMN: usize = 2;

/// Materialized by reading the records tab for a war (spec §3
/// `WatermarkRecord`).
#[derive(Debug, Clone, Default)]
pub struct ExistingLedgerInfo {
    pub attack_codes: HashSet<String>,
    pub latest_started_epoch: i64,
    pub record_count: usize,
}

#[derive(Debug, Clone)]
pub struct ReconciledAttack {
    pub attack: Attack,
    pub direction: AttackDirection,
}

/// Spec §4.6: filter to war-relevant attacks, drop duplicates by code or
/// by watermark, sort ascending, tag direction relative to
/// `faction_of_interest`.
///
/// The two drop conditions (code already seen, or `started_epoch` at or
/// before the watermark) are each individually sufficient — the watermark
/// check is a conservative safety net against missed codes, not a
/// replacement for the code check (spec §4.6 step 2).
pub fn reconcile(
    fetched: Vec<Attack>,
    existing: &ExistingLedgerInfo,
    war_factions: [i64; 2],
    faction_of_interest: i64,
) -> Vec<ReconciledAttack> {
    let mut seen_in_batch: HashSet<String> = HashSet::new();
    let mut relevant: Vec<Attack> = fetched
        .into_iter()
        .filter(|a| a.is_relevant_to(war_factions))
        .filter(|a| {
            !existing.attack_codes.contains(&a.code) && a.started_epoch > existing.latest_started_epoch
        })
        // Pagination windows can overlap at their boundary second (spec
        // §4.5.1 edge policies), so the fetched batch itself may carry
        // duplicate codes — dedup here, not just against `existing`.
        .filter(|a| seen_in_batch.insert(a.code.clone()))
        .collect();

    relevant.sort_by_key(|a| a.started_epoch);

    relevant
        .into_iter()
        .map(|attack| {
            let direction = attack.direction_for(faction_of_interest);
            ReconciledAttack { attack, direction }
        })
        .collect()
}

fn format_timestamp(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn result_cell(result: &AttackResult) -> Cell {
    let s = match result {
        AttackResult::Hospitalized => "Hospitalized",
        AttackResult::Mugged => "Mugged",
        AttackResult::Left => "Left",
        AttackResult::Escape => "Escape",
        AttackResult::Stalemate => "Stalemate",
        AttackResult::Assist => "Assist",
        AttackResult::Other(s) => return Cell::Str(s.clone()),
    };
    Cell::Str(s.to_string())
}

/// Spec §6.5: the exact 32-column row layout for the records tab.
pub fn to_row(reconciled: &ReconciledAttack) -> Vec<Cell> {
    let a = &reconciled.attack;
    vec![
        Cell::Int(a.id),
        Cell::Str(a.code.clone()),
        Cell::Str(format_timestamp(a.started_epoch)),
        Cell::Str(format_timestamp(a.ended_epoch)),
        Cell::Str(
            match reconciled.direction {
                AttackDirection::Outgoing => "Outgoing",
                AttackDirection::Incoming => "Incoming",
                AttackDirection::Unknown => "Unknown",
            }
            .to_string(),
        ),
        Cell::Int(a.attacker.user_id),
        Cell::Str(a.attacker.name.clone()),
        Cell::Int(a.attacker.level as i64),
        optional_faction_id(a.attacker.faction.as_ref().map(|f| f.id)),
        Cell::Str(a.attacker.faction.as_ref().map(|f| f.name.clone()).unwrap_or_default()),
        Cell::Int(a.defender.user_id),
        Cell::Str(a.defender.name.clone()),
        Cell::Int(a.defender.level as i64),
        optional_faction_id(a.defender.faction.as_ref().map(|f| f.id)),
        Cell::Str(a.defender.faction.as_ref().map(|f| f.name.clone()).unwrap_or_default()),
        result_cell(&a.result),
        Cell::Float(a.respect_gain),
        Cell::Float(a.respect_loss),
        Cell::Int(a.chain),
        Cell::Bool(a.is_interrupted),
        Cell::Bool(a.is_stealthed),
        Cell::Bool(a.is_raid),
        Cell::Bool(a.is_ranked_war),
        Cell::Float(a.modifiers.fair_fight),
        Cell::Float(a.modifiers.war),
        Cell::Float(a.modifiers.retaliation),
        Cell::Float(a.modifiers.group),
        Cell::Float(a.modifiers.overseas),
        Cell::Float(a.modifiers.chain),
        Cell::Float(a.modifiers.warlord),
        Cell::Str(a.finishing_hit.as_ref().map(|f| f.name.clone()).unwrap_or_default()),
        a.finishing_hit.as_ref().map(|f| Cell::Int(f.value)).unwrap_or(Cell::Empty),
    ]
}

/// Spec §4.6 step 5: rows go to the exact range starting at
/// `record_count + 2` (1 header row + 1-based indexing).
pub fn append_start_row(existing_record_count: usize) -> usize {
    existing_record_count + 2
}

fn parse_timestamp(s: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

/// Spec §4.6 "Reads": scans a records tab's rows into the watermark
/// record. A row is valid iff it has a non-empty code in the designated
/// column; invalid rows still count toward `record_count` (they occupy a
/// row) but are excluded from `attack_codes`.
pub fn existing_info_from_rows(rows: &[Row]) -> ExistingLedgerInfo {
    let mut attack_codes = HashSet::new();
    let mut latest_started_epoch = 0;

    for row in rows {
        let code = row.get(CODE_COLUMN).and_then(|c| c.as_str()).filter(|s| !s.is_empty());
        if let Some(code) = code {
            attack_codes.insert(code.to_string());
            if let Some(started) = row.get(STARTED_COLUMN).and_then(|c| c.as_str()).and_then(parse_timestamp) {
                latest_started_epoch = latest_started_epoch.max(started);
            }
        }
    }

    ExistingLedgerInfo {
        attack_codes,
        latest_started_epoch,
        record_count: rows.len(),
    }
}
