//! Member-state tracker (spec §4.7): diffs two snapshots of a faction's
//! members and produces a change-feed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastAction {
    pub status: String,
    pub timestamp_epoch: i64,
    pub human_relative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatus {
    pub description: String,
    pub state: String,
    pub colour: String,
    pub details: String,
    pub until_epoch: Option<i64>,
    pub travel_type: String,
    pub plane_image_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStateSnapshot {
    pub member_id: i64,
    pub name: String,
    pub level: i32,
    pub position: String,
    pub last_action: LastAction,
    pub status: MemberStatus,
}

/// Spec §3 `StateChange`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub observed_at_epoch: i64,
    pub member_id: i64,
    pub name: String,
    pub current_status: MemberStatus,
    pub current_last_action: LastAction,
    pub previous_state: Option<String>,
    pub previous_last_action_status: Option<String>,
}

fn significant_fields_differ(previous: &MemberStateSnapshot, current: &MemberStateSnapshot) -> bool {
    previous.status.description != current.status.description
        || previous.status.state != current.status.state
        || previous.status.until_epoch != current.status.until_epoch
        || previous.status.travel_type != current.status.travel_type
        || previous.last_action.status != current.last_action.status
        || previous.last_action.timestamp_epoch != current.last_action.timestamp_epoch
}

/// Spec §4.7 steps 3-4: a member is "changed" if any significant field
/// differs, or it is newly present. On first observation (`previous` is
/// `None` for the whole faction) no change rows are emitted — that case is
/// handled by the caller never invoking this with an empty `previous` map
/// from a cold start; see `orchestrator`.
pub fn diff_members(
    previous: &HashMap<i64, MemberStateSnapshot>,
    current: &HashMap<i64, MemberStateSnapshot>,
    observed_at_epoch: i64,
) -> Vec<StateChange> {
    let mut changes = Vec::new();
    for (member_id, current_snapshot) in current {
        let changed = match previous.get(member_id) {
            None => true,
            Some(previous_snapshot) => significant_fields_differ(previous_snapshot, current_snapshot),
        };
        if !changed {
            continue;
        }
        let previous_snapshot = previous.get(member_id);
        changes.push(StateChange {
            observed_at_epoch,
            member_id: *member_id,
            name: current_snapshot.name.clone(),
            current_status: current_snapshot.status.clone(),
            current_last_action: current_snapshot.last_action.clone(),
            previous_state: previous_snapshot.map(|s| s.status.state.clone()),
            previous_last_action_status: previous_snapshot.map(|s| s.last_action.status.clone()),
        });
    }
    changes.sort_by_key(|c| c.member_id);
    changes
}
