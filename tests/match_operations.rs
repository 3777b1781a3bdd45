mod common;

use std::sync::Arc;

use serde_json::json;
use sga_client::guard::keys;
use sga_client::models::search::{SearchCustomData, SearchOperator};
use sga_client::services::match_service::{delete_match, load_match, load_matches, load_ongoing, quick_match};
use sga_client::{ErrorKind, Match, Method, Profile, SgaError};

use common::{anonymous_client, client, duel, round_list, MockTransport, ROOT};

#[tokio::test]
async fn concurrent_score_is_single_flight() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    let release = mock.hold();
    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.score(10.0).await })
    };
    mock.entered.notified().await;
    assert!(handle.guard().is_busy(keys::MATCH_SCORE));

    let err = handle.score(5.0).await.unwrap_err();
    assert_eq!(err, SgaError::AlreadyInProgress(keys::MATCH_SCORE.to_string()));
    assert_eq!(mock.request_count(), 1);

    release
        .send(Ok(json!({"actorId": "A", "score": 10}).to_string()))
        .unwrap();
    first.await.unwrap().unwrap();
    assert!(!handle.guard().is_busy(keys::MATCH_SCORE));

    // a failed call releases the key as well
    mock.fail("503 Service Unavailable");
    let err = handle.score(7.0).await.unwrap_err();
    assert_eq!(err, SgaError::transport("503 Service Unavailable"));
    assert_eq!(mock.request_count(), 2);

    mock.reply(json!({"actorId": "A"}));
    handle.score(7.0).await.unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url, format!("{}api/matches/m1/rounds", ROOT));
    assert_eq!(request.session.as_deref(), Some("session-a"));
    let form = request.form.as_ref().unwrap();
    assert_eq!(form["ActorId"], "A");
    assert_eq!(form["Score"], "10");
    assert_eq!(form["RoundNumber"], "2");
}

#[tokio::test]
async fn score_leaves_local_rounds_untouched() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);
    let before = handle.snapshot();

    mock.reply(json!({"actorId": "A", "roundNumber": 2, "dateScore": "2020-01-02 10:00:00"}));
    handle.score(4.0).await.unwrap();
    assert_eq!(handle.snapshot(), before);
}

#[tokio::test]
async fn score_requires_authentication() {
    let mock = MockTransport::new();
    let client = anonymous_client(&mock);
    let handle = duel(&client);

    assert_eq!(handle.score(1.0).await.unwrap_err(), SgaError::NotAuthenticated);
    assert!(!handle.guard().is_busy(keys::MATCH_SCORE));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn score_on_finished_match_makes_no_call() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let mut payload = common::duel_payload();
    payload["isFinished"] = json!(true);
    let handle = client.match_handle(Match::from_payload(payload, Some("A")).unwrap());

    let err = handle.score(3.0).await.unwrap_err();
    assert_eq!(err, SgaError::invalid_state("This Match is already finished"));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn score_without_participants_or_local_actor_is_invalid() {
    let mock = MockTransport::new();
    let client = client(&mock);

    let empty = client.match_handle(Match::from_payload(json!({"id": "m5"}), Some("A")).unwrap());
    assert_eq!(
        empty.score(1.0).await.unwrap_err(),
        SgaError::invalid_state("No Users found for this Match")
    );

    let strangers = client.match_handle(
        Match::from_payload(
            json!({"id": "m6", "actors": [{"id": "x1", "accountId": "C"}, {"id": "x2", "accountId": "D"}]}),
            Some("A"),
        )
        .unwrap(),
    );
    assert_eq!(
        strangers.score(1.0).await.unwrap_err().kind(),
        ErrorKind::InvalidState
    );
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn rejected_score_surfaces_server_message() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    mock.reply(json!({"message": "Round is closed"}));
    let err = handle.score(2.0).await.unwrap_err();
    assert_eq!(err, SgaError::rejected("Round is closed"));
    assert_eq!(err.message(), "Round is closed");
}

#[tokio::test]
async fn get_score_is_idempotent() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    mock.reply(round_list());
    mock.reply(round_list());
    let first = handle.get_score().await.unwrap();
    let state = handle.snapshot();
    let second = handle.get_score().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(handle.snapshot(), state);
    assert!(first.opponent_found);
    assert_eq!(first.opponent_score, 11.0);
    assert_eq!(first.local_score, 10.0);
    assert_eq!(state.current_round, 2);
    assert_eq!(state.rounds().len(), 2);
    assert_eq!(state.local_actor("B").unwrap().round(2).unwrap().score, 11.0);

    let request = &mock.requests()[1];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, format!("{}api/matches/m1/rounds", ROOT));
}

#[tokio::test]
async fn scored_current_round_blocks_resubmission() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    mock.reply(json!([
        {"roundNumber": 1, "actors": [{"actorId": "A", "score": 10, "dateScore": "2020-01-01 10:00:00"}]},
        {"roundNumber": 2, "actors": [{"actorId": "A", "score": 6, "dateScore": "2020-01-02 10:00:00"}]}
    ]));
    let summary = handle.get_score().await.unwrap();
    assert!(!summary.opponent_found);
    assert_eq!(summary.local_score, 6.0);
    assert_eq!(handle.read(|game| game.current_round), 2);

    let err = handle.score(9.0).await.unwrap_err();
    assert_eq!(err, SgaError::invalid_state("Round 2 is already scored"));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn get_score_rejects_non_list_bodies() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    mock.reply(json!({"message": "Match not found"}));
    let err = handle.get_score().await.unwrap_err();
    assert_eq!(err, SgaError::rejected("Match not found"));
    assert_eq!(handle.read(|game| game.current_round), 2);
    assert!(!handle.guard().is_busy(keys::MATCH_GET_SCORE));

    mock.reply(json!({"rounds": 2}));
    assert_eq!(handle.get_score().await.unwrap_err().kind(), ErrorKind::ParseError);
}

#[tokio::test]
async fn list_endpoints_surface_server_messages() {
    let mock = MockTransport::new();
    let client = client(&mock);

    mock.reply(json!({"message": "Tournament not found"}));
    let err = load_matches(&client, Some("t404"), None).await.unwrap_err();
    assert_eq!(err, SgaError::rejected("Tournament not found"));
    assert_eq!(err.kind(), ErrorKind::ServerRejected);
}

#[tokio::test]
async fn save_hydrates_despite_null_custom_data() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);
    handle.edit(|game| {
        game.remove_user_id("B");
        game.add_user(Arc::new(Profile::new("C", "cy")));
    });

    mock.reply(json!({
        "success": true,
        "message": {
            "id": "m1",
            "customData": null,
            "actors": [
                {"id": "ma1", "accountId": "A", "customData": null,
                 "actor": {"id": "A", "username": "ana", "customData": null}},
                {"id": "ma3", "accountId": "C", "customData": null, "rounds": null}
            ]
        }
    }));
    handle.save().await.unwrap();

    let game = handle.snapshot();
    assert!(game.deleted_users().is_empty());
    assert_eq!(game.local_actor("C").unwrap().id, "ma3");
}

#[tokio::test]
async fn cancellation_releases_the_guard() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    let _pending = mock.hold();
    let task = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.get_score().await })
    };
    mock.entered.notified().await;
    assert!(handle.guard().is_busy(keys::MATCH_GET_SCORE));

    client.cancel_requests();
    let err = task.await.unwrap().unwrap_err();
    assert_eq!(err, SgaError::Cancelled);
    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert!(!handle.guard().is_busy(keys::MATCH_GET_SCORE));

    mock.reply(round_list());
    assert!(handle.get_score().await.is_ok());
}

#[tokio::test]
async fn sync_rounds_runs_without_a_local_user() {
    let mock = MockTransport::new();
    let client = anonymous_client(&mock);
    let handle = duel(&client);

    mock.reply(round_list());
    let report = handle.sync_rounds().await.unwrap();
    assert_eq!(report.rounds, 2);
    assert_eq!(report.current_round, None);
    assert_eq!(handle.read(|game| game.rounds().len()), 2);
}

#[tokio::test]
async fn save_needs_two_users() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let mut game = Match::new().with_title("Solo");
    game.add_user(Arc::new(Profile::new("A", "ana")));
    let handle = client.match_handle(game);

    let err = handle.save().await.unwrap_err();
    assert_eq!(err, SgaError::invalid_state("A match requires at least 2 users"));
    assert_eq!(mock.request_count(), 0);
    assert!(!handle.guard().is_busy(keys::MATCH_SAVE));
}

#[tokio::test]
async fn save_hydrates_server_ids() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let mut game = Match::new().with_title("Rematch").with_rounds(2);
    game.add_user(Arc::new(Profile::new("A", "ana")));
    game.add_user(Arc::new(Profile::new("B", "bo")));
    let handle = client.match_handle(game);

    mock.reply(json!({
        "success": true,
        "message": {
            "id": "m9",
            "title": "Rematch",
            "totalRounds": 2,
            "actors": [
                {"id": "ma1", "matchId": "m9", "accountId": "A"},
                {"id": "ma2", "matchId": "m9", "accountId": "B"}
            ]
        }
    }));
    handle.save().await.unwrap();

    let saved = handle.snapshot();
    assert_eq!(saved.id, "m9");
    assert!(saved.users().iter().all(|u| u.is_persisted()));
    assert!(saved.deleted_users().is_empty());

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, format!("{}match.php", ROOT));
    let form = request.form.as_ref().unwrap();
    assert_eq!(form["action"], "match_save");
    assert_eq!(form["Id"], "");
    assert_eq!(form["Title"], "Rematch");
    assert_eq!(form["Rounds"], "2");
    assert_eq!(form["Users"], r#"["A","B"]"#);
    assert_eq!(form["DeleteUsers"], "[]");
    assert!(!form.contains_key("DateExpire"));
}

#[tokio::test]
async fn save_sends_participant_deltas() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    handle.edit(|game| {
        game.remove_user_id("B");
        game.add_user(Arc::new(Profile::new("C", "cy")));
    });
    assert_eq!(handle.read(|game| game.deleted_users().to_vec()), vec!["B".to_string()]);

    let saved = json!({
        "id": "m1",
        "actors": [
            {"id": "ma1", "matchId": "m1", "accountId": "A"},
            {"id": "ma3", "matchId": "m1", "accountId": "C"}
        ]
    });
    mock.reply(json!({"success": true, "message": saved.to_string()}));
    handle.save().await.unwrap();

    let form = mock.requests()[0].form.clone().unwrap();
    assert_eq!(form["Id"], "m1");
    assert_eq!(form["Users"], r#"["C"]"#);
    assert_eq!(form["DeleteUsers"], r#"["B"]"#);

    let game = handle.snapshot();
    assert!(game.deleted_users().is_empty());
    assert_eq!(game.local_actor("C").unwrap().id, "ma3");
}

#[tokio::test]
async fn failed_save_keeps_local_edits() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);
    handle.edit(|game| game.remove_user_id("B"));
    handle.edit(|game| game.add_user(Arc::new(Profile::new("C", "cy"))));

    mock.reply(json!({"success": false, "message": "Tournament is closed"}));
    let err = handle.save().await.unwrap_err();
    assert_eq!(err, SgaError::rejected("Tournament is closed"));
    assert_eq!(handle.read(|game| game.deleted_users().len()), 1);
}

#[tokio::test]
async fn quit_finishes_once() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    mock.reply(json!({"message": "Not your match"}));
    assert_eq!(handle.end().await.unwrap_err(), SgaError::rejected("Not your match"));
    assert!(!handle.read(Match::is_finished));

    mock.reply(json!({"id": "m1", "isFinished": true}));
    handle.quit().await.unwrap();
    assert!(handle.read(Match::is_finished));

    let request = &mock.requests()[1];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url, format!("{}api/matches/m1", ROOT));
    let form = request.form.as_ref().unwrap();
    assert_eq!(form["IsFinished"], "true");
    assert_eq!(form["TournamentId"], "t1");

    let err = handle.end().await.unwrap_err();
    assert_eq!(err, SgaError::invalid_state("This Match is already finished"));
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn unsaved_match_cannot_end() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = client.match_handle(Match::new());

    assert_eq!(
        handle.end().await.unwrap_err(),
        SgaError::invalid_state("Match has not been saved yet")
    );
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn duplicate_returns_an_independent_match() {
    let mock = MockTransport::new();
    let client = client(&mock);
    let handle = duel(&client);

    mock.reply(json!({
        "id": "m2",
        "actors": [
            {"id": "mb1", "matchId": "m2", "accountId": "A"},
            {"id": "mb2", "matchId": "m2", "accountId": "B"}
        ]
    }));
    let copy = handle.duplicate().await.unwrap();

    assert_eq!(copy.read(|game| game.id.clone()), "m2");
    copy.edit(|game| game.title = "Copy".to_string());
    assert_eq!(handle.read(|game| game.title.clone()), "Duel");

    let request = &mock.requests()[0];
    assert_eq!(request.url, format!("{}api/matches/actors", ROOT));
    assert_eq!(request.form.as_ref().unwrap()["actors"], r#"["A","B"]"#);
}

#[tokio::test]
async fn quick_match_encodes_filters() {
    let mock = MockTransport::new();
    let client = client(&mock);

    mock.reply(json!({"id": "q1", "actors": [{"id": "qa1", "accountId": "A"}]}));
    let filters = vec![
        SearchCustomData::new("level", SearchOperator::GreaterOrEquals, "3"),
        SearchCustomData::new("", SearchOperator::Equals, "ignored"),
    ];
    let handle = quick_match(&client, true, &filters, 3).await.unwrap();
    assert!(handle.read(Match::is_searching_quick_match));

    let form = mock.requests()[0].form.clone().unwrap();
    assert_eq!(form["Friends"], "1");
    assert_eq!(form["Rounds"], "3");
    assert_eq!(form["CustomData"], r#"[{"key":"level","value":"3","operator":">="}]"#);

    mock.reply(json!({"message": "No match available"}));
    let err = quick_match(&client, false, &[], 1).await.unwrap_err();
    assert_eq!(err, SgaError::rejected("No match available"));
    assert!(!client.guard().is_busy(keys::MATCH_QUICK_MATCH));
}

#[tokio::test]
async fn loading_lists_and_single_matches() {
    let mock = MockTransport::new();
    let client = client(&mock);

    mock.reply(json!([common::duel_payload(), {"id": "m7", "title": "Other"}, "garbage"]));
    let matches = load_matches(&client, Some("0"), None).await.unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].read(|game| game.current_round), 2);
    assert_eq!(mock.requests()[0].method, Method::Get);

    mock.reply(json!([]));
    assert!(load_ongoing(&client, Some("t1"), Some("Cup")).await.unwrap().is_empty());
    let request = &mock.requests()[1];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, format!("{}api/matches/ongoing", ROOT));

    mock.reply(common::duel_payload());
    let one = load_match(&client, "m1").await.unwrap();
    assert_eq!(one.read(|game| game.users().len()), 2);
    assert_eq!(mock.requests()[2].form.as_ref().unwrap()["Id"], "m1");

    mock.reply(json!({"message": "Match not found"}));
    assert_eq!(
        load_match(&client, "0").await.unwrap_err(),
        SgaError::rejected("Match not found")
    );
    assert_eq!(mock.requests()[3].method, Method::Get);
}

#[tokio::test]
async fn delete_uses_the_envelope() {
    let mock = MockTransport::new();
    let client = client(&mock);

    mock.reply(json!({"success": true, "message": "deleted"}));
    delete_match(&client, "m1").await.unwrap();
    let form = mock.requests()[0].form.clone().unwrap();
    assert_eq!(form["action"], "match_delete");
    assert_eq!(form["Id"], "m1");

    let handle = duel(&client);
    mock.reply(json!({"success": false, "message": "Match has rounds"}));
    assert_eq!(
        handle.delete().await.unwrap_err(),
        SgaError::rejected("Match has rounds")
    );
}
