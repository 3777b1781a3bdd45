#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use sga_client::models::profile::Profile;
use sga_client::{ClientConfig, Match, MatchHandle, Result, SgaClient, SgaError, Transport, WebRequest};
use tokio::sync::{oneshot, Notify};

enum Scripted {
    Reply(Result<String>),
    Held(oneshot::Receiver<Result<String>>),
}

/// Plays back scripted responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<WebRequest>>,
    pub entered: Notify,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, body: Value) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(Ok(body.to_string())));
    }

    pub fn fail(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(Err(SgaError::transport(message))));
    }

    /// Queues a response that stays pending until the sender fires.
    pub fn hold(&self) -> oneshot::Sender<Result<String>> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().push_back(Scripted::Held(rx));
        tx
    }

    pub fn requests(&self) -> Vec<WebRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: WebRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        self.entered.notify_one();
        match next {
            Some(Scripted::Reply(result)) => result,
            Some(Scripted::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(SgaError::transport("response dropped"))),
            None => Err(SgaError::transport("no scripted response")),
        }
    }
}

pub const ROOT: &str = "http://sga.test/";

pub fn anonymous_client(mock: &Arc<MockTransport>) -> SgaClient {
    SgaClient::new(ClientConfig::new(ROOT), mock.clone())
}

pub fn client(mock: &Arc<MockTransport>) -> SgaClient {
    anonymous_client(mock).with_local_user(Profile::new("A", "ana"), "session-a")
}

/// Persisted duel between A (local) and B; A still has to play round 2.
pub fn duel_payload() -> Value {
    json!({
        "id": "m1",
        "tournamentId": "t1",
        "title": "Duel",
        "totalRounds": 3,
        "actors": [
            {"id": "ma1", "matchId": "m1", "accountId": "A", "actor": {"id": "A", "username": "ana"}},
            {"id": "ma2", "matchId": "m1", "accountId": "B", "actor": {"id": "B", "username": "bo"}}
        ],
        "rounds": [
            {"matchActorId": "ma1", "roundNumber": 1, "score": 10, "dateScore": "2020-01-01 10:00:00"},
            {"matchActorId": "ma2", "roundNumber": 1, "score": 8, "dateScore": "2020-01-01 10:05:00"},
            {"matchActorId": "ma1", "roundNumber": 2, "score": 0, "dateScore": null}
        ]
    })
}

pub fn duel(client: &SgaClient) -> MatchHandle {
    let game = Match::from_payload(duel_payload(), Some("A")).unwrap();
    client.match_handle(game)
}

pub fn round_list() -> Value {
    json!([
        {"roundNumber": 1, "actors": [
            {"actorId": "A", "score": 10, "dateScore": "2020-01-01 10:00:00"},
            {"actorId": "B", "score": 8, "dateScore": "2020-01-01 10:05:00"}
        ]},
        {"roundNumber": 2, "actors": [
            {"actorId": "A", "score": 0, "dateScore": null},
            {"actorId": "B", "score": 11, "dateScore": "2020-01-02 09:00:00"}
        ]}
    ])
}
