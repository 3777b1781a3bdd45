//! Round synchronization.
//!
//! Every round list fetched from the backend is a full snapshot: it replaces
//! each actor's rounds and the per-round projection of the match outright,
//! including a snapshot that raced with a score submission.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::errors::{Result, SgaError};
use crate::models::date::deserialize_date;
use crate::models::match_actor::MatchActor;
use crate::models::match_round::MatchRound;
use crate::models::matches::{Match, MatchRoundData};
use crate::models::serde_helpers::{deserialize_f32, deserialize_id, deserialize_opt_i32, deserialize_vec};
use crate::services::transport::parse_array;

/// One actor's entry inside a round record. `actor_id` is the account id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoundEntry {
    #[serde(rename = "actorId", default, deserialize_with = "deserialize_id")]
    pub actor_id: String,

    #[serde(default, deserialize_with = "deserialize_f32")]
    pub score: f32,

    #[serde(rename = "dateScore", default, deserialize_with = "deserialize_date")]
    pub date_score: Option<NaiveDateTime>,
}

impl RoundEntry {
    pub fn has_score(&self) -> bool {
        self.date_score.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundRecord {
    pub round_number: i32,
    pub actors: Vec<RoundEntry>,
}

#[derive(Deserialize)]
struct RawRoundRecord {
    #[serde(rename = "roundNumber", default, deserialize_with = "deserialize_opt_i32")]
    round_number: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_vec")]
    actors: Vec<RoundEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreSummary {
    pub opponent_found: bool,
    pub opponent_score: f32,
    pub local_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncReport {
    /// Round resolved for the local actor; `None` leaves `current_round` as it was.
    pub current_round: Option<i32>,
    pub rounds: usize,
}

/// What a legal score submission sends.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub actor_id: String,
    pub round_number: i32,
}

/// Decodes `[{roundNumber, actors: [{actorId, score, dateScore}]}]`.
/// Records without a round number are skipped.
pub fn parse_rounds(body: &str) -> Result<Vec<RoundRecord>> {
    let mut records = Vec::new();
    for item in parse_array(body)? {
        if !item.is_object() {
            continue;
        }
        let raw: RawRoundRecord = serde_json::from_value(item)?;
        if let Some(round_number) = raw.round_number {
            records.push(RoundRecord {
                round_number,
                actors: raw.actors,
            });
        }
    }
    Ok(records)
}

fn ascending(records: &[RoundRecord]) -> Vec<&RoundRecord> {
    let mut ordered: Vec<&RoundRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.round_number);
    ordered
}

/// First round, in ascending order, where the local actor's entry has no
/// score. When every local entry is scored, the last round the local actor
/// appears in. Rounds without a local entry are not reached yet and never
/// set the result.
pub fn resolve_current_round(records: &[RoundRecord], local_account: &str) -> Option<i32> {
    let mut last_seen = None;
    for record in ascending(records) {
        let mut present = false;
        for entry in record.actors.iter().filter(|e| e.actor_id == local_account) {
            if !entry.has_score() {
                return Some(record.round_number);
            }
            present = true;
        }
        if present {
            last_seen = Some(record.round_number);
        }
    }
    last_seen
}

/// Latest scored values on each side across the snapshot. Pure: the match
/// is not touched.
pub fn score_summary(records: &[RoundRecord], local_account: &str) -> ScoreSummary {
    let mut summary = ScoreSummary::default();
    for record in ascending(records) {
        for entry in record.actors.iter().filter(|e| e.has_score()) {
            if entry.actor_id == local_account {
                summary.local_score = entry.score;
            } else {
                summary.opponent_score = entry.score;
                summary.opponent_found = true;
            }
        }
    }
    summary
}

/// Replaces the actors' rounds and the match projection with `records`,
/// then moves `current_round` when the local actor can be resolved.
pub fn apply_snapshot(
    game: &mut Match,
    records: &[RoundRecord],
    local_account: Option<&str>,
) -> SyncReport {
    let ordered = ascending(records);

    for actor in game.users.iter_mut() {
        let mut rounds = Vec::new();
        for record in &ordered {
            for entry in record.actors.iter().filter(|e| e.actor_id == actor.id_account) {
                rounds.push(round_for(actor, record.round_number, entry));
            }
        }
        actor.rounds = rounds;
    }

    game.rounds = ordered
        .iter()
        .map(|record| MatchRoundData {
            round_number: record.round_number,
            actors: game.users.iter().map(|u| u.id_account.clone()).collect(),
            scores: game
                .users
                .iter()
                .map(|u| {
                    record
                        .actors
                        .iter()
                        .find(|e| e.actor_id == u.id_account)
                        .map(|e| round_for(u, record.round_number, e))
                        .unwrap_or_else(|| MatchRound::pending(u.id.clone(), record.round_number))
                })
                .collect(),
        })
        .collect();

    let current_round = local_account.and_then(|local| resolve_current_round(records, local));
    if let Some(round) = current_round {
        game.current_round = round;
    }

    SyncReport {
        current_round,
        rounds: game.rounds.len(),
    }
}

fn round_for(actor: &MatchActor, round_number: i32, entry: &RoundEntry) -> MatchRound {
    MatchRound {
        id: String::new(),
        id_match_actor: actor.id.clone(),
        score: entry.score,
        round_number,
        date_score: entry.date_score,
    }
}

/// Regroups flat `MatchRound` rows (keyed by match-actor id) into round
/// records keyed by account id. Rows of unknown actors are dropped.
pub fn records_from_match_rounds(users: &[MatchActor], rounds: &[MatchRound]) -> Vec<RoundRecord> {
    let mut grouped: BTreeMap<i32, Vec<RoundEntry>> = BTreeMap::new();
    for round in rounds {
        let Some(actor) = users.iter().find(|u| u.is_persisted() && u.id == round.id_match_actor) else {
            continue;
        };
        grouped.entry(round.round_number).or_default().push(RoundEntry {
            actor_id: actor.id_account.clone(),
            score: round.score,
            date_score: round.date_score,
        });
    }
    grouped
        .into_iter()
        .map(|(round_number, actors)| RoundRecord { round_number, actors })
        .collect()
}

/// Round records built from the rounds each actor already carries.
pub fn records_from_actors(users: &[MatchActor]) -> Vec<RoundRecord> {
    let mut grouped: BTreeMap<i32, Vec<RoundEntry>> = BTreeMap::new();
    for actor in users {
        for round in &actor.rounds {
            grouped.entry(round.round_number).or_default().push(RoundEntry {
                actor_id: actor.id_account.clone(),
                score: round.score,
                date_score: round.date_score,
            });
        }
    }
    grouped
        .into_iter()
        .map(|(round_number, actors)| RoundRecord { round_number, actors })
        .collect()
}

/// Decides whether the local actor may submit a score right now.
pub fn check_score_submission(game: &Match, local_account: &str) -> Result<ScoreSubmission> {
    if game.finished {
        return Err(SgaError::invalid_state("This Match is already finished"));
    }
    if game.users.is_empty() {
        return Err(SgaError::invalid_state("No Users found for this Match"));
    }
    let actor = game
        .local_actor(local_account)
        .ok_or_else(|| SgaError::invalid_state("Local user is not a participant of this Match"))?;
    if actor.round(game.current_round).is_some_and(MatchRound::has_score) {
        return Err(SgaError::invalid_state(format!(
            "Round {} is already scored",
            game.current_round
        )));
    }
    Ok(ScoreSubmission {
        actor_id: actor.id_account.clone(),
        round_number: game.current_round,
    })
}
