//! HTTP `UpstreamClient` adapter. Talks to the Torn API, retries
//! transient failures with `warwatch_core::RetryPolicy`, and tracks an
//! atomic call counter the orchestrator reports per cycle (spec §5, §6.3).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use warwatch_core::attack::PartyFaction;
use warwatch_core::tracker::{LastAction, MemberStatus};
use warwatch_core::{
    Attack, AttackParty, AttackResult, Faction, MemberStateSnapshot, RetryPolicy, UpstreamClient,
    UpstreamError, War, WarListing,
};

const BASE_URL: &str = "https://api.torn.com";
const PAGE_SIZE: usize = 100;

pub struct HttpUpstreamClient {
    http: Client,
    api_key: String,
    own_faction_id: i64,
    retry: RetryPolicy,
    calls: AtomicU64,
}

impl HttpUpstreamClient {
    pub fn new(api_key: String, own_faction_id: i64) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("reqwest client builds with a static config"),
            api_key,
            own_faction_id,
            retry: RetryPolicy::upstream_default(),
            calls: AtomicU64::new(0),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str, query: &[(&str, String)]) -> Result<T, UpstreamError> {
        let url = format!("{BASE_URL}{path}");
        let mut params: Vec<(&str, String)> = query.to_vec();
        params.push(("key", self.api_key.clone()));

        self.retry
            .execute(|| {
                let url = url.clone();
                let params = params.clone();
                async move {
                    self.calls.fetch_add(1, Ordering::SeqCst);
                    let response = self
                        .http
                        .get(&url)
                        .query(&params)
                        .send()
                        .await
                        .map_err(|e| UpstreamError::Transient(e.to_string()))?;

                    match response.status() {
                        status if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
                            Err(UpstreamError::Transient(format!("http {status}")))
                        }
                        status if status.is_client_error() => {
                            Err(UpstreamError::Malformed(format!("http {status}")))
                        }
                        _ => response
                            .json::<T>()
                            .await
                            .map_err(|e| UpstreamError::Malformed(e.to_string())),
                    }
                }
            })
            .await
    }
}

#[derive(Debug, Deserialize)]
struct RawFaction {
    #[serde(rename = "ID")]
    id: i64,
    name: String,
    score: Option<i64>,
    chain: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawWar {
    war_id: i64,
    start: i64,
    end: Option<i64>,
    factions: Vec<RawFaction>,
}

impl TryFrom<RawWar> for War {
    type Error = UpstreamError;

    fn try_from(raw: RawWar) -> Result<Self, Self::Error> {
        let mut factions = raw.factions.into_iter();
        let a = factions
            .next()
            .ok_or_else(|| UpstreamError::Malformed("war has no factions".into()))?;
        let b = factions
            .next()
            .ok_or_else(|| UpstreamError::Malformed("war has only one faction".into()))?;
        Ok(War {
            id: raw.war_id,
            start_epoch: raw.start,
            end_epoch: raw.end,
            factions: [
                Faction {
                    id: a.id,
                    name: a.name,
                    score: a.score.unwrap_or_default(),
                    chain: a.chain.unwrap_or_default(),
                },
                Faction {
                    id: b.id,
                    name: b.name,
                    score: b.score.unwrap_or_default(),
                    chain: b.chain.unwrap_or_default(),
                },
            ],
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawWarsResponse {
    wars: RawWarsInner,
}

#[derive(Debug, Deserialize, Default)]
struct RawWarsInner {
    ranked: Option<RawWar>,
    raids: Option<Vec<RawWar>>,
    territory: Option<Vec<RawWar>>,
}

#[derive(Debug, Deserialize)]
struct RawAttackParty {
    id: i64,
    name: String,
    level: Option<i32>,
    faction: Option<RawAttackPartyFaction>,
}

#[derive(Debug, Deserialize)]
struct RawAttackPartyFaction {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawAttack {
    code: String,
    timestamp_started: i64,
    timestamp_ended: i64,
    attacker: Option<RawAttackParty>,
    defender: RawAttackParty,
    result: String,
    respect_gain: Option<f64>,
    respect_loss: Option<f64>,
    chain: Option<i64>,
    is_interrupted: Option<bool>,
    is_stealthed: Option<bool>,
    is_raid: Option<bool>,
    is_ranked_war: Option<bool>,
    modifiers: Option<RawModifiers>,
    finishing_hit: Option<RawFinishingHit>,
}

#[derive(Debug, Deserialize)]
struct RawFinishingHit {
    name: String,
    value: i64,
}

#[derive(Debug, Deserialize, Default)]
struct RawModifiers {
    fair_fight: Option<f64>,
    war: Option<f64>,
    retaliation: Option<f64>,
    group: Option<f64>,
    overseas: Option<f64>,
    chain: Option<f64>,
    warlord: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAttacksResponse {
    attacks: HashMap<String, RawAttack>,
}

fn parse_result(raw: &str) -> AttackResult {
    match raw {
        "Hospitalized" => AttackResult::Hospitalized,
        "Mugged" => AttackResult::Mugged,
        "Left" => AttackResult::Left,
        "Escape" => AttackResult::Escape,
        "Stalemate" => AttackResult::Stalemate,
        "Assist" => AttackResult::Assist,
        other => AttackResult::Other(other.to_string()),
    }
}

fn party_from_raw(raw: RawAttackParty) -> AttackParty {
    AttackParty {
        user_id: raw.id,
        name: raw.name,
        level: raw.level.unwrap_or_default(),
        faction: raw.faction.map(|f| PartyFaction { id: f.id, name: f.name }),
    }
}

impl From<RawAttack> for Attack {
    fn from(raw: RawAttack) -> Self {
        let modifiers = raw.modifiers.unwrap_or_default();
        Attack {
            id: 0,
            code: raw.code,
            started_epoch: raw.timestamp_started,
            ended_epoch: raw.timestamp_ended,
            attacker: raw
                .attacker
                .map(party_from_raw)
                .unwrap_or(AttackParty {
                    user_id: 0,
                    name: String::new(),
                    level: 0,
                    faction: None,
                }),
            defender: party_from_raw(raw.defender),
            result: parse_result(&raw.result),
            respect_gain: raw.respect_gain.unwrap_or_default(),
            respect_loss: raw.respect_loss.unwrap_or_default(),
            chain: raw.chain.unwrap_or_default(),
            is_interrupted: raw.is_interrupted.unwrap_or_default(),
            is_stealthed: raw.is_stealthed.unwrap_or_default(),
            is_raid: raw.is_raid.unwrap_or_default(),
            is_ranked_war: raw.is_ranked_war.unwrap_or_default(),
            modifiers: warwatch_core::Modifiers {
                fair_fight: modifiers.fair_fight.unwrap_or(1.0),
                war: modifiers.war.unwrap_or(1.0),
                retaliation: modifiers.retaliation.unwrap_or(1.0),
                group: modifiers.group.unwrap_or(1.0),
                overseas: modifiers.overseas.unwrap_or(1.0),
                chain: modifiers.chain.unwrap_or(1.0),
                warlord: modifiers.warlord.unwrap_or(1.0),
            },
            finishing_hit: raw.finishing_hit.map(|f| warwatch_core::attack::FinishingHit {
                name: f.name,
                value: f.value,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    description: String,
    state: String,
    color: Option<String>,
    details: Option<String>,
    until: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawLastAction {
    status: String,
    timestamp: i64,
    relative: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    name: String,
    level: i32,
    position: String,
    last_action: RawLastAction,
    status: RawStatus,
}

#[derive(Debug, Deserialize)]
struct RawFactionMembersResponse {
    members: HashMap<String, RawMember>,
}

#[derive(Debug, Deserialize)]
struct RawFactionBasicResponse {
    #[serde(rename = "ID")]
    id: i64,
}

fn snapshot_from_raw(member_id: i64, raw: RawMember) -> MemberStateSnapshot {
    MemberStateSnapshot {
        member_id,
        name: raw.name,
        level: raw.level,
        position: raw.position,
        last_action: LastAction {
            status: raw.last_action.status,
            timestamp_epoch: raw.last_action.timestamp,
            human_relative: raw.last_action.relative.unwrap_or_default(),
        },
        status: MemberStatus {
            description: raw.status.description,
            state: raw.status.state,
            colour: raw.status.color.unwrap_or_default(),
            details: raw.status.details.unwrap_or_default(),
            until_epoch: raw.status.until,
            travel_type: String::new(),
            plane_image_type: String::new(),
        },
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn list_wars(&self) -> Result<WarListing, UpstreamError> {
        let response: RawWarsResponse = self.get_json("/faction/", &[("selections", "wars".into())]).await?;
        let ranked = response.wars.ranked.map(War::try_from).transpose()?;
        let raids = response
            .wars
            .raids
            .unwrap_or_default()
            .into_iter()
            .map(War::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let territory = response
            .wars
            .territory
            .unwrap_or_default()
            .into_iter()
            .map(War::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WarListing { ranked, raids, territory })
    }

    async fn page_attacks(&self, from_epoch: i64, to_epoch: i64) -> Result<Vec<Attack>, UpstreamError> {
        let response: RawAttacksResponse = self
            .get_json(
                "/faction/",
                &[
                    ("selections", "attacks".into()),
                    ("from", from_epoch.to_string()),
                    ("to", to_epoch.to_string()),
                ],
            )
            .await?;
        let mut attacks: Vec<Attack> = response.attacks.into_values().map(Attack::from).collect();
        attacks.sort_by_key(|a| std::cmp::Reverse(a.started_epoch));
        Ok(attacks)
    }

    async fn read_faction(&self, faction_id: i64) -> Result<HashMap<i64, MemberStateSnapshot>, UpstreamError> {
        let response: RawFactionMembersResponse = self
            .get_json(&format!("/faction/{faction_id}"), &[("selections", "basic".into())])
            .await?;
        Ok(response
            .members
            .into_iter()
            .filter_map(|(id, raw)| id.parse().ok().map(|id| (id, snapshot_from_raw(id, raw))))
            .collect())
    }

    async fn read_own_faction(&self) -> Result<HashMap<i64, MemberStateSnapshot>, UpstreamError> {
        self.read_faction(self.own_faction_id).await
    }

    async fn identify_own_faction(&self) -> Result<i64, UpstreamError> {
        // `/faction/` with no id in the path resolves to the API key
        // owner's own faction, same endpoint `list_wars` calls.
        let response: RawFactionBasicResponse =
            self.get_json("/faction/", &[("selections", "basic".into())]).await?;
        Ok(response.id)
    }

    fn page_size(&self) -> usize {
        PAGE_SIZE
    }

    fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn reset_call_count(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}
