use crate::Relay;
use ballot_relay::ViewError;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Catcher, Request, Route, State};
use serde::Serialize;
use serde_json::{json, Value};

pub type Reply = (Status, Json<Value>);

const INVALID_JSON: &str = "Invalid JSON data";

fn reply(status: Status, body: Value) -> Reply {
    (status, Json(body))
}

fn error_reply(status: Status, message: &str) -> Reply {
    reply(status, json!({ "response": { "error": message } }))
}

// View results are sent JSON-encoded inside the `response` string
fn encode_view<T: Serialize>(view: Result<T, ViewError>) -> Result<String, ViewError> {
    let view = view?;
    Ok(serde_json::to_string(&view)?)
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|val| !val.is_empty())
}

#[get("/health")]
pub fn health() -> Reply {
    reply(Status::Ok, json!({ "status": "running" }))
}

#[get("/viewVotingOptions")]
pub async fn view_voting_options(relay: &State<Relay>) -> Reply {
    match encode_view(relay.views.voting_options().await) {
        Ok(encoded) => reply(Status::Ok, json!({ "response": encoded })),
        Err(e) => {
            log::error!("{}", e);
            error_reply(Status::BadRequest, "Could not view voting options")
        }
    }
}

#[get("/viewTimeLimits")]
pub async fn view_time_limits(relay: &State<Relay>) -> Reply {
    match encode_view(relay.views.time_limits().await) {
        Ok(encoded) => reply(Status::Ok, json!({ "response": encoded })),
        Err(e) => {
            log::error!("{}", e);
            error_reply(Status::BadRequest, "Could not view time limits")
        }
    }
}

#[post("/addkey", data = "<body>")]
pub async fn add_key(relay: &State<Relay>, body: String) -> Reply {
    let failure = |message: &str| {
        reply(
            Status::BadRequest,
            json!({ "response": false, "error": message }),
        )
    };

    let request: Value = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("addkey: {}", e);
            return failure(INVALID_JSON);
        }
    };
    let key = match non_empty_str(&request, "key") {
        Some(key) => key,
        None => return failure(INVALID_JSON),
    };

    match relay.keys.enqueue_and_maybe_flush(key).await {
        Ok(_) => reply(Status::Ok, json!({ "response": true })),
        Err(e) => {
            log::error!("addkey: {}", e);
            failure("Failed to process internal functions")
        }
    }
}

#[post("/adminAddKey", data = "<body>")]
pub async fn admin_add_key(relay: &State<Relay>, body: String) -> Reply {
    let request: Value = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("adminAddKey: {}", e);
            return error_reply(Status::BadRequest, INVALID_JSON);
        }
    };

    let presented = request
        .get("adminAPIKey")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !relay.admin_key.verify(presented) {
        log::warn!("adminAddKey: rejected invalid API key");
        return error_reply(Status::Unauthorized, "Invalid API key");
    }

    match relay.keys.force_flush().await {
        Ok(report) => {
            log::info!(
                "adminAddKey: flushed {} keys ({} failed)",
                report.attempted(),
                report.failed.len()
            );
            reply(Status::Ok, json!({ "response": true }))
        }
        Err(e) => {
            log::error!("adminAddKey: {}", e);
            error_reply(Status::BadRequest, "Failed to process internal functions")
        }
    }
}

#[post("/castVote", data = "<body>")]
pub async fn cast_vote(relay: &State<Relay>, body: String) -> Reply {
    let request: Option<Value> = serde_json::from_str(&body).ok();
    let vote = request.as_ref().and_then(|request| {
        let key = non_empty_str(request, "key")?;
        let option = request.get("voting_option")?;
        Some((key, option))
    });

    let (key, option) = match vote {
        Some(vote) => vote,
        None => {
            log::warn!("castVote: malformed request");
            return error_reply(Status::BadRequest, "Failed to vote");
        }
    };

    match relay.votes.cast_vote(key, option).await {
        Ok(result) => reply(Status::Ok, json!({ "response": result.log })),
        Err(e) => {
            log::error!("castVote: {}", e);
            error_reply(Status::BadRequest, "Failed to vote")
        }
    }
}

// Lets browsers through the CORS preflight; the headers come from the fairing
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}

#[catch(404)]
pub fn not_found() -> Reply {
    error_reply(Status::BadRequest, "Endpoint not found")
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request) -> Reply {
    error_reply(status, status.reason().unwrap_or("Request failed"))
}

pub fn routes() -> Vec<Route> {
    routes![
        health,
        view_voting_options,
        view_time_limits,
        add_key,
        admin_add_key,
        cast_vote,
        preflight
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, default_catcher]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;
    use ballot_relay::*;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::{Client, LocalResponse};
    use std::sync::Arc;

    const ADMIN_KEY: &str = "admin-secret";

    struct Harness {
        client: Client,
        store: Arc<MemKeyStore>,
        ledger: Arc<MockLedger>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemKeyStore::new());
        let ledger = Arc::new(MockLedger::new());
        let relay = Relay::new(
            store.clone(),
            ledger.clone(),
            RelayPolicy::default(),
            AdminKey::new(ADMIN_KEY),
        );
        let client = Client::tracked(build(rocket::Config::figment(), relay))
            .await
            .unwrap();

        Harness {
            client,
            store,
            ledger,
        }
    }

    async fn read(res: LocalResponse<'_>) -> (Status, Value) {
        let status = res.status();
        let body = res.into_json::<Value>().await.unwrap();
        (status, body)
    }

    async fn get(client: &Client, path: &'static str) -> (Status, Value) {
        read(client.get(path).dispatch().await).await
    }

    async fn post(client: &Client, path: &'static str, body: &str) -> (Status, Value) {
        let res = client
            .post(path)
            .header(ContentType::JSON)
            .body(body)
            .dispatch()
            .await;
        read(res).await
    }

    #[rocket::async_test]
    async fn health_reports_running() {
        let h = harness().await;
        let res = h.client.get("/health").dispatch().await;
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );

        let (status, body) = read(res).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body, json!({ "status": "running" }));
    }

    #[rocket::async_test]
    async fn unknown_endpoint() {
        let h = harness().await;

        let res = h.client.get("/nope").dispatch().await;
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
        let (status, body) = read(res).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, json!({ "response": { "error": "Endpoint not found" } }));

        // Known path, wrong method
        let (status, _) = get(&h.client, "/addkey").await;
        assert_eq!(status, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn preflight_is_allowed() {
        let h = harness().await;
        let res = h.client.options("/addkey").dispatch().await;
        assert_eq!(res.status(), Status::NoContent);
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Methods"),
            Some("GET,OPTIONS,PATCH,DELETE,POST,PUT")
        );
    }

    #[rocket::async_test]
    async fn add_key_flushes_at_three() {
        let h = harness().await;

        for key in &["k1", "k2"] {
            let (status, body) =
                post(&h.client, "/addkey", &json!({ "key": key }).to_string()).await;
            assert_eq!(status, Status::Ok);
            assert_eq!(body, json!({ "response": true }));
        }
        assert_eq!(h.store.len().await.unwrap(), 2);
        assert!(h.ledger.registered_keys().is_empty());

        // Duplicates are accepted quietly and do not count
        let (status, _) = post(&h.client, "/addkey", r#"{"key":"k2"}"#).await;
        assert_eq!(status, Status::Ok);
        assert!(h.ledger.registered_keys().is_empty());

        let (status, _) = post(&h.client, "/addkey", r#"{"key":"k3"}"#).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(h.store.len().await.unwrap(), 0);

        let mut registered = h.ledger.registered_keys();
        registered.sort();
        assert_eq!(registered, vec!["k1", "k2", "k3"]);
    }

    #[rocket::async_test]
    async fn add_key_rejects_bad_requests() {
        let h = harness().await;
        let expected = json!({ "response": false, "error": "Invalid JSON data" });

        for body in &["{not json", "{}", r#"{"key":""}"#, r#"{"key":5}"#] {
            let (status, reply) = post(&h.client, "/addkey", body).await;
            assert_eq!(status, Status::BadRequest);
            assert_eq!(reply, expected);
        }
        assert_eq!(h.store.len().await.unwrap(), 0);
    }

    #[rocket::async_test]
    async fn admin_flush_requires_key() {
        let h = harness().await;
        h.store.try_register("k1").await.unwrap();

        let (status, body) = post(&h.client, "/adminAddKey", r#"{"adminAPIKey":"wrong"}"#).await;
        assert_eq!(status, Status::Unauthorized);
        assert_eq!(body, json!({ "response": { "error": "Invalid API key" } }));

        let (status, _) = post(&h.client, "/adminAddKey", "{}").await;
        assert_eq!(status, Status::Unauthorized);

        let (status, body) = post(&h.client, "/adminAddKey", "nope").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, json!({ "response": { "error": "Invalid JSON data" } }));

        // Nothing was flushed
        assert_eq!(h.store.len().await.unwrap(), 1);
        assert!(h.ledger.calls().is_empty());
    }

    #[rocket::async_test]
    async fn admin_flush_below_threshold() {
        let h = harness().await;
        h.store.try_register("k1").await.unwrap();

        let body = json!({ "adminAPIKey": ADMIN_KEY }).to_string();
        let (status, reply) = post(&h.client, "/adminAddKey", &body).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(reply, json!({ "response": true }));

        assert_eq!(h.store.len().await.unwrap(), 0);
        assert_eq!(h.ledger.registered_keys(), vec!["k1"]);

        // Empty queue is fine too
        let (status, _) = post(&h.client, "/adminAddKey", &body).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(h.ledger.registered_keys().len(), 1);
    }

    #[rocket::async_test]
    async fn cast_vote_returns_first_log() {
        let h = harness().await;
        h.ledger
            .set_vote_outcome(Ok(SubmissionOutcome::with_logs(vec!["Vote cast for Bob"])));

        let (status, body) = post(
            &h.client,
            "/castVote",
            r#"{"key":"proof","voting_option":"Bob"}"#,
        )
        .await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body, json!({ "response": "Vote cast for Bob" }));

        assert_eq!(
            h.ledger.calls(),
            vec![LedgerCall::Vote {
                key: "proof".to_owned(),
                option: json!("Bob"),
                gas: DEFAULT_GAS,
            }]
        );
    }

    #[rocket::async_test]
    async fn cast_vote_failures() {
        let h = harness().await;
        let expected = json!({ "response": { "error": "Failed to vote" } });

        let (status, body) = post(&h.client, "/castVote", r#"{"voting_option":"Bob"}"#).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, expected);
        assert!(h.ledger.calls().is_empty());

        h.ledger.set_vote_outcome(Ok(SubmissionOutcome::default()));
        let (status, body) = post(
            &h.client,
            "/castVote",
            r#"{"key":"proof","voting_option":"Bob"}"#,
        )
        .await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, expected);

        h.ledger.set_vote_outcome(Err(LedgerError::ExecutionFailed(
            "voting closed".to_owned(),
        )));
        let (status, body) = post(
            &h.client,
            "/castVote",
            r#"{"key":"proof","voting_option":"Bob"}"#,
        )
        .await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, expected);
    }

    #[rocket::async_test]
    async fn voting_options_are_reencoded() {
        let h = harness().await;
        h.ledger
            .set_voting_options(Ok(json!([["Alice", 2], ["Bob", 5]])));

        let (status, body) = get(&h.client, "/viewVotingOptions").await;
        assert_eq!(status, Status::Ok);

        let encoded = body["response"].as_str().unwrap();
        let options: Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(
            options,
            json!([{ "name": "Alice", "vote_count": 2 }, { "name": "Bob", "vote_count": 5 }])
        );

        h.ledger
            .set_voting_options(Err(LedgerError::Transport("down".to_owned())));
        let (status, body) = get(&h.client, "/viewVotingOptions").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(
            body,
            json!({ "response": { "error": "Could not view voting options" } })
        );
    }

    #[rocket::async_test]
    async fn time_limits_are_reencoded() {
        let h = harness().await;
        h.ledger.set_time_limits(Ok(json!(
            "{\"vote_time\":200,\"register_time\":100}"
        )));

        let (status, body) = get(&h.client, "/viewTimeLimits").await;
        assert_eq!(status, Status::Ok);

        let encoded = body["response"].as_str().unwrap();
        let limits: Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(limits, json!({ "voteTime": 200, "registerTime": 100 }));

        h.ledger.set_time_limits(Ok(json!([1, 2])));
        let (status, body) = get(&h.client, "/viewTimeLimits").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(
            body,
            json!({ "response": { "error": "Could not view time limits" } })
        );
    }
}
