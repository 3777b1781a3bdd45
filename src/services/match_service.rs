use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{Result, SgaError};
use crate::guard::{keys, OperationGuard};
use crate::models::matches::Match;
use crate::models::search::{encode_filters, SearchCustomData};
use crate::services::transport::{missing_key, parse_array, parse_envelope, parse_object, Form, Method};
use crate::state::SgaClient;
use crate::sync::{self, RoundRecord, ScoreSummary, SyncReport};

/// A match plus the client it talks through. Per-instance operations are
/// single-flight on the handle's own guard; clones share state and guard.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    client: SgaClient,
    state: Arc<RwLock<Match>>,
    guard: OperationGuard,
}

impl MatchHandle {
    pub fn new(client: SgaClient, game: Match) -> Self {
        MatchHandle {
            client,
            state: Arc::new(RwLock::new(game)),
            guard: OperationGuard::new(),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, Match> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Match {
        self.state().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&Match) -> R) -> R {
        f(&self.state())
    }

    /// Local edits (participants, title, custom data) ahead of `save`.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Match) -> R) -> R {
        let mut game = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut game)
    }

    pub fn guard(&self) -> &OperationGuard {
        &self.guard
    }

    fn persisted_id(&self) -> Result<String> {
        let id = self.state().id.clone();
        if id.is_empty() {
            return Err(SgaError::invalid_state("Match has not been saved yet"));
        }
        Ok(id)
    }

    /// Submits the local actor's score for the current round. Local rounds
    /// are left alone; `get_score` or `sync_rounds` picks the result up.
    pub async fn score(&self, value: f32) -> Result<()> {
        let local = self.client.require_local_user()?;
        let _permit = self.guard.acquire(keys::MATCH_SCORE)?;

        let submission = sync::check_score_submission(&self.state(), &local.profile.id)?;
        let id = self.persisted_id()?;

        let mut form = Form::new();
        form.insert("ActorId".to_string(), submission.actor_id.clone());
        form.insert("Score".to_string(), value.to_string());
        form.insert("RoundNumber".to_string(), submission.round_number.to_string());

        let url = format!("api/matches/{}/rounds", id);
        let body = self.client.call(Method::Put, &url, Some(form)).await?;
        let result = parse_object(&body)?;
        if !result.contains_key("actorId") {
            let err = missing_key(&result, "actorId");
            warn!("Score for match {} rejected: {}", id, err);
            return Err(err);
        }

        info!(
            "Scored {} in round {} of match {}",
            value, submission.round_number, id
        );
        Ok(())
    }

    /// Fetches every round, applies it as a snapshot and reports the latest
    /// scores on both sides.
    pub async fn get_score(&self) -> Result<ScoreSummary> {
        let local = self.client.require_local_user()?;
        let _permit = self.guard.acquire(keys::MATCH_GET_SCORE)?;

        if self.state().users.is_empty() {
            return Err(SgaError::invalid_state("No Users found for this Match"));
        }
        let records = self.fetch_rounds().await?;

        self.edit(|game| sync::apply_snapshot(game, &records, Some(&local.profile.id)));
        Ok(sync::score_summary(&records, &local.profile.id))
    }

    /// Refreshes rounds and `current_round` without computing a summary.
    pub async fn sync_rounds(&self) -> Result<SyncReport> {
        let _permit = self.guard.acquire(keys::MATCH_SYNC_ROUNDS)?;

        let records = self.fetch_rounds().await?;
        let local = self.client.local_account_id();
        let report = self.edit(|game| sync::apply_snapshot(game, &records, local.as_deref()));
        info!("Synced {} rounds", report.rounds);
        Ok(report)
    }

    async fn fetch_rounds(&self) -> Result<Vec<RoundRecord>> {
        let id = self.persisted_id()?;
        let url = format!("api/matches/{}/rounds", id);
        let body = self.client.call(Method::Get, &url, None).await?;
        sync::parse_rounds(&body)
    }

    /// Sends added and removed participants with the scalar fields, then
    /// hydrates the match from the response so new ids land locally.
    pub async fn save(&self) -> Result<()> {
        let _permit = self.guard.acquire(keys::MATCH_SAVE)?;

        let form = {
            let game = self.state();
            if game.users.len() < 2 {
                return Err(SgaError::invalid_state("A match requires at least 2 users"));
            }
            game.save_form()
        };

        let body = self.client.call(Method::Post, "match.php", Some(form)).await?;
        let document = saved_document(&body)?;

        let local = self.client.local_account_id();
        self.edit(|game| {
            game.hydrate(document, local.as_deref())?;
            game.deleted_users.clear();
            Ok::<_, SgaError>(())
        })?;

        info!("Saved match {}", self.state().id);
        Ok(())
    }

    /// Marks the match finished server-side; the local flag flips only on success.
    pub async fn end(&self) -> Result<()> {
        let _permit = self.guard.acquire(keys::MATCH_END)?;

        if self.state().finished {
            return Err(SgaError::invalid_state("This Match is already finished"));
        }
        let id = self.persisted_id()?;

        let mut form = Form::new();
        form.insert("Id".to_string(), id.clone());
        form.insert("TournamentId".to_string(), self.state().id_tournament.clone());
        form.insert("IsFinished".to_string(), "true".to_string());

        let url = format!("api/matches/{}", id);
        let body = self.client.call(Method::Put, &url, Some(form)).await?;
        let result = parse_object(&body)?;
        if !result.contains_key("id") {
            return Err(missing_key(&result, "id"));
        }

        self.edit(Match::mark_finished);
        info!("Match {} finished", id);
        Ok(())
    }

    pub async fn quit(&self) -> Result<()> {
        self.end().await
    }

    /// Creates a new match with the same participants.
    pub async fn duplicate(&self) -> Result<MatchHandle> {
        let _permit = self.guard.acquire(keys::MATCH_DUPLICATE)?;

        let mut form = Form::new();
        form.insert(
            "actors".to_string(),
            Value::from(self.state().account_ids()).to_string(),
        );

        let body = self.client.call(Method::Post, "api/matches/actors", Some(form)).await?;
        let handle = self.client.match_from_body(&body)?;
        info!("Duplicated match {} into {}", self.state().id, handle.state().id);
        Ok(handle)
    }

    pub async fn delete(&self) -> Result<()> {
        let id = self.persisted_id()?;
        delete_match(&self.client, &id).await
    }
}

// `match.php` answers with a `{success, message}` envelope whose message is
// the match (as an object or a JSON string); a bare match document is
// accepted as well.
fn saved_document(body: &str) -> Result<Value> {
    let map = parse_object(body)?;
    if !map.contains_key("success") {
        if map.get("id").map_or(true, Value::is_null) {
            return Err(missing_key(&map, "id"));
        }
        return Ok(Value::Object(map));
    }

    match parse_envelope(body)? {
        Some(Value::String(raw)) => Ok(serde_json::from_str(&raw)?),
        Some(document @ Value::Object(_)) => Ok(document),
        _ => Err(SgaError::rejected("API response doesn't contain a match")),
    }
}

impl SgaClient {
    pub fn match_handle(&self, game: Match) -> MatchHandle {
        MatchHandle::new(self.clone(), game)
    }

    fn match_from_body(&self, body: &str) -> Result<MatchHandle> {
        let result = parse_object(body)?;
        if result.get("id").map_or(true, Value::is_null) {
            return Err(missing_key(&result, "id"));
        }
        let local = self.local_account_id();
        let game = Match::from_payload(Value::Object(result), local.as_deref())?;
        Ok(self.match_handle(game))
    }

    fn matches_from_body(&self, body: &str) -> Result<Vec<MatchHandle>> {
        let local = self.local_account_id();
        parse_array(body)?
            .into_iter()
            .filter(Value::is_object)
            .map(|item| Match::from_payload(item, local.as_deref()).map(|m| self.match_handle(m)))
            .collect()
    }
}

/// Asks the backend to pair the local user with an open match, or to open
/// a new one that is still searching for opponents.
pub async fn quick_match(
    client: &SgaClient,
    friends_only: bool,
    filters: &[SearchCustomData],
    rounds: i32,
) -> Result<MatchHandle> {
    let _permit = client.guard().acquire(keys::MATCH_QUICK_MATCH)?;

    let mut form = Form::new();
    form.insert("Friends".to_string(), if friends_only { "1" } else { "0" }.to_string());
    form.insert("CustomData".to_string(), encode_filters(filters));
    form.insert("Rounds".to_string(), rounds.max(1).to_string());

    let body = client.call(Method::Post, "api/matches", Some(form)).await?;
    let handle = client.match_from_body(&body)?;
    handle.edit(|game| game.searching_quick_match = game.users.len() < 2);

    info!("Quick match {} ready", handle.state().id);
    Ok(handle)
}

fn list_form(tournament_id: Option<&str>, title: Option<&str>) -> Form {
    let mut form = Form::new();
    if let Some(id) = tournament_id.filter(|id| !id.is_empty() && *id != "0") {
        form.insert("IdTournament".to_string(), id.to_string());
    }
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        form.insert("Title".to_string(), title.to_string());
    }
    form
}

pub async fn load_matches(
    client: &SgaClient,
    tournament_id: Option<&str>,
    title: Option<&str>,
) -> Result<Vec<MatchHandle>> {
    let _permit = client.guard().acquire(keys::MATCH_LOAD)?;

    let form = list_form(tournament_id, title);
    let body = client.call(Method::Default, "api/matches", Some(form)).await?;
    client.matches_from_body(&body)
}

pub async fn load_ongoing(
    client: &SgaClient,
    tournament_id: Option<&str>,
    title: Option<&str>,
) -> Result<Vec<MatchHandle>> {
    let _permit = client.guard().acquire(keys::MATCH_LOAD_ONGOING)?;

    let form = list_form(tournament_id, title);
    let body = client.call(Method::Default, "api/matches/ongoing", Some(form)).await?;
    client.matches_from_body(&body)
}

/// Loads one match; `"0"` asks for any match the local user takes part in.
pub async fn load_match(client: &SgaClient, id: &str) -> Result<MatchHandle> {
    let _permit = client.guard().acquire(keys::MATCH_LOAD_ONE)?;

    let mut form = Form::new();
    if !id.is_empty() && id != "0" {
        form.insert("Id".to_string(), id.to_string());
    }
    let body = client.call(Method::Default, "api/matches", Some(form)).await?;
    client.match_from_body(&body)
}

pub async fn delete_match(client: &SgaClient, id: &str) -> Result<()> {
    let _permit = client.guard().acquire(keys::MATCH_DELETE)?;

    let mut form = Form::new();
    form.insert("action".to_string(), "match_delete".to_string());
    form.insert("Id".to_string(), id.to_string());

    let body = client.call(Method::Post, "match.php", Some(form)).await?;
    parse_envelope(&body)?;
    info!("Deleted match {}", id);
    Ok(())
}
