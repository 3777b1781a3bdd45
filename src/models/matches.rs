use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, SgaError};
use crate::models::custom_data::{to_form_value, CustomData};
use crate::models::date::{deserialize_date, format_date};
use crate::models::serde_helpers::{deserialize_opt_bool, deserialize_opt_i32, deserialize_opt_string};
use crate::models::match_actor::MatchActor;
use crate::models::match_round::MatchRound;
use crate::models::profile::Profile;
use crate::services::transport::Form;
use crate::sync;

/// Scores of every participant for one round, aligned with `actors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRoundData {
    pub round_number: i32,
    /// Account ids, in participant order.
    pub actors: Vec<String>,
    pub scores: Vec<MatchRound>,
}

impl MatchRoundData {
    pub fn score_of(&self, account_id: &str) -> Option<&MatchRound> {
        self.actors
            .iter()
            .position(|a| a == account_id)
            .and_then(|i| self.scores.get(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Empty until the match has been saved.
    pub id: String,
    pub id_tournament: String,
    pub title: String,
    pub rounds_count: i32,
    pub current_round: i32,
    pub date_creation: NaiveDateTime,
    pub date_expire: Option<NaiveDateTime>,
    pub custom_data: CustomData,
    pub(crate) users: Vec<MatchActor>,
    pub(crate) deleted_users: Vec<String>,
    pub(crate) rounds: Vec<MatchRoundData>,
    pub(crate) finished: bool,
    pub(crate) searching_quick_match: bool,
}

// Wire shape of a match document. Only keys present in the payload
// overwrite local state.
#[derive(Debug, Default, Deserialize)]
pub struct MatchPayload {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub id: Option<String>,

    #[serde(rename = "tournamentId", default, deserialize_with = "deserialize_opt_string")]
    pub tournament_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub title: Option<String>,

    #[serde(rename = "totalRounds", default, deserialize_with = "deserialize_opt_i32")]
    pub total_rounds: Option<i32>,

    #[serde(rename = "dateCreation", default, deserialize_with = "deserialize_date")]
    pub date_creation: Option<NaiveDateTime>,

    #[serde(rename = "dateExpire", default, deserialize_with = "deserialize_date")]
    pub date_expire: Option<NaiveDateTime>,

    #[serde(rename = "isFinished", default, deserialize_with = "deserialize_opt_bool")]
    pub is_finished: Option<bool>,

    #[serde(rename = "customData", default)]
    pub custom_data: Option<Value>,

    #[serde(default)]
    pub actors: Option<Vec<MatchActor>>,

    #[serde(default)]
    pub rounds: Option<Vec<MatchRound>>,
}

impl Default for Match {
    fn default() -> Self {
        Match {
            id: String::new(),
            id_tournament: String::new(),
            title: String::new(),
            rounds_count: 1,
            current_round: 0,
            date_creation: Local::now().naive_local(),
            date_expire: None,
            custom_data: CustomData::new(),
            users: Vec::new(),
            deleted_users: Vec::new(),
            rounds: Vec::new(),
            finished: false,
            searching_quick_match: false,
        }
    }
}

impl Match {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_rounds(mut self, rounds_count: i32) -> Self {
        self.rounds_count = rounds_count.max(1);
        self
    }

    /// Builds a match from a server document. `local_account` drives the
    /// current-round resolution.
    pub fn from_payload(value: Value, local_account: Option<&str>) -> Result<Self> {
        let mut game = Match::new();
        game.hydrate(value, local_account)?;
        Ok(game)
    }

    /// Applies a server document in place, e.g. the response of `save`.
    pub fn hydrate(&mut self, value: Value, local_account: Option<&str>) -> Result<()> {
        if !value.is_object() {
            return Err(SgaError::parse("match payload is not a JSON object"));
        }
        let payload: MatchPayload = serde_json::from_value(value)?;
        self.apply_payload(payload, local_account);
        Ok(())
    }

    pub fn from_json(body: &str, local_account: Option<&str>) -> Result<Self> {
        Self::from_payload(serde_json::from_str(body)?, local_account)
    }

    /// Working copy for local edits before `save`. Profiles stay shared.
    pub fn speculative_copy(&self) -> Self {
        self.clone()
    }

    /// Overwrites local state with a server snapshot. Actor and round lists
    /// are replaced, never merged.
    pub fn apply_payload(&mut self, payload: MatchPayload, local_account: Option<&str>) {
        if let Some(id) = payload.id {
            self.id = id;
        }
        if let Some(tournament_id) = payload.tournament_id {
            self.id_tournament = tournament_id;
        }
        if let Some(title) = payload.title {
            self.title = title;
        }
        if let Some(total_rounds) = payload.total_rounds {
            self.rounds_count = total_rounds.max(1);
        }
        if let Some(date_creation) = payload.date_creation {
            self.date_creation = date_creation;
        }
        if payload.date_expire.is_some() {
            self.date_expire = payload.date_expire;
        }
        if let Some(finished) = payload.is_finished {
            self.finished = finished;
        }
        if let Some(Value::Object(custom_data)) = payload.custom_data {
            self.custom_data = custom_data;
        }

        let actors_replaced = payload.actors.is_some();
        if let Some(actors) = payload.actors {
            self.users = actors;
            self.deleted_users.clear();
        }

        if let Some(rounds) = payload.rounds {
            let records = sync::records_from_match_rounds(&self.users, &rounds);
            sync::apply_snapshot(self, &records, local_account);
        } else if actors_replaced {
            let records = sync::records_from_actors(&self.users);
            sync::apply_snapshot(self, &records, local_account);
        }
    }

    pub fn users(&self) -> &[MatchActor] {
        &self.users
    }

    pub fn deleted_users(&self) -> &[String] {
        &self.deleted_users
    }

    pub fn rounds(&self) -> &[MatchRoundData] {
        &self.rounds
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_searching_quick_match(&self) -> bool {
        self.searching_quick_match
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn local_actor(&self, account_id: &str) -> Option<&MatchActor> {
        self.users.iter().find(|u| u.id_account == account_id)
    }

    /// Adds a participant locally; returns `false` if the account already
    /// takes part.
    pub fn add_user(&mut self, profile: Arc<Profile>) -> bool {
        if self.local_actor(&profile.id).is_some() {
            return false;
        }
        self.deleted_users.retain(|id| id != &profile.id);
        self.users.push(MatchActor::for_profile(self.id.clone(), profile));
        true
    }

    pub fn remove_user_id(&mut self, account_id: &str) -> bool {
        match self.users.iter().position(|u| u.id_account == account_id) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_user_name(&mut self, user_name: &str) -> bool {
        match self
            .users
            .iter()
            .position(|u| u.user_name() == Some(user_name))
        {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, index: usize) {
        let actor = self.users.remove(index);
        // Only persisted actors exist server-side
        if actor.is_persisted() {
            self.deleted_users.push(actor.id_account);
        }
    }

    /// Account ids of participants that the server does not know yet.
    pub fn new_actor_ids(&self) -> Vec<String> {
        self.users
            .iter()
            .filter(|u| !u.is_persisted())
            .map(|u| u.id_account.clone())
            .collect()
    }

    pub fn account_ids(&self) -> Vec<String> {
        self.users.iter().map(|u| u.id_account.clone()).collect()
    }

    pub fn save_form(&self) -> Form {
        let mut form = Form::new();
        form.insert("action".to_string(), "match_save".to_string());
        form.insert("Id".to_string(), self.id.clone());
        form.insert("IdTournament".to_string(), self.id_tournament.clone());
        form.insert("Title".to_string(), self.title.clone());
        form.insert("Rounds".to_string(), self.rounds_count.to_string());
        if let Some(date_expire) = &self.date_expire {
            form.insert("DateExpire".to_string(), format_date(date_expire));
        }
        form.insert("CustomData".to_string(), to_form_value(&self.custom_data));
        form.insert(
            "Users".to_string(),
            Value::from(self.new_actor_ids()).to_string(),
        );
        form.insert(
            "DeleteUsers".to_string(),
            Value::from(self.deleted_users.clone()).to_string(),
        );
        form
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }
}
