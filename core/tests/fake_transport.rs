//! Client behavior against in-process fake transports.
//!
//! `ScriptedTransport` replays canned responses and records what it was
//! asked to send; `LedgerTransport` keeps a tiny in-memory expense list so
//! sequences of operations can be checked for client-side caching.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shishutsukan_core::{
    ApiMessage, Expense, ExpenseWithId, Genre, HttpMethod, HttpRequest, HttpResponse,
    ShishutsukanClient, ShishutsukanError, Transport, TransportError,
};
use url::Url;

fn base_url() -> Url {
    Url::parse("http://localhost:8000").unwrap()
}

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn replying(replies: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left")
    }
}

fn scripted_client(replies: Vec<Result<HttpResponse, TransportError>>) -> (ShishutsukanClient, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::replying(replies);
    let client = ShishutsukanClient::with_transport(base_url(), transport.clone());
    (client, transport)
}

/// Run every operation once against the same scripted reply.
async fn run_all_operations(reply: HttpResponse) -> Vec<ShishutsukanError> {
    let (client, _) = scripted_client((0..6).map(|_| Ok(reply.clone())).collect());
    let expense = Expense::new("2025-01-15", "食費", 1000);
    let genre = Genre::new("食費");

    vec![
        client.add_expense(&expense).await.unwrap_err(),
        client.get_expenses().await.unwrap_err(),
        client.delete_expense(1).await.unwrap_err(),
        client.get_genres().await.unwrap_err(),
        client.add_genre(&genre).await.unwrap_err(),
        client.delete_genre(1).await.unwrap_err(),
    ]
}

#[tokio::test]
async fn non_2xx_status_fails_every_operation_with_that_code() {
    for status in [404, 500] {
        // A body that would decode fine for the envelope operations.
        let errors = run_all_operations(HttpResponse::new(status, r#"{"message":"ok"}"#)).await;
        for err in errors {
            assert!(
                matches!(err, ShishutsukanError::HttpError { status_code } if status_code == status),
                "{status}: {err:?}"
            );
        }
    }
}

#[tokio::test]
async fn malformed_transport_response_is_invalid_response() {
    let (client, _) = scripted_client(vec![Err(TransportError::Malformed(
        "not an HTTP response".to_string(),
    ))]);

    let err = client.get_expenses().await.unwrap_err();
    assert!(matches!(err, ShishutsukanError::InvalidResponse));
}

#[tokio::test]
async fn network_failure_is_wrapped_with_cause() {
    let (client, _) = scripted_client(vec![Err(TransportError::network("connection refused"))]);

    let err = client.add_genre(&Genre::new("娯楽")).await.unwrap_err();
    match err {
        ShishutsukanError::NetworkError(cause) => assert_eq!(cause.to_string(), "connection refused"),
        other => panic!("expected NetworkError, got {other:?}"),
    }
}

#[tokio::test]
async fn envelope_error_on_200_is_server_error() {
    let body = r#"{"message":null,"error":"genre already exists"}"#;
    let (client, _) = scripted_client(vec![Ok(HttpResponse::new(200, body))]);

    let err = client.add_genre(&Genre::new("食費")).await.unwrap_err();
    assert!(matches!(err, ShishutsukanError::ServerError(ref m) if m == "genre already exists"));
}

#[tokio::test]
async fn delete_of_missing_id_is_plain_success() {
    let (client, transport) =
        scripted_client(vec![Ok(HttpResponse::new(200, r#"{"message":"deleted"}"#))]);

    let message = client.delete_expense(999_999).await.unwrap();
    assert_eq!(message, ApiMessage::ok("deleted"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Delete);
    assert_eq!(sent[0].url.as_str(), "http://localhost:8000/expenses/999999");
}

#[tokio::test]
async fn list_decode_failure_is_decoding_error() {
    let body = r#"[{"id":1,"name":"食費"}]"#;
    let (client, _) = scripted_client(vec![Ok(HttpResponse::new(200, body))]);

    let err = client.get_genres().await.unwrap_err();
    assert!(matches!(err, ShishutsukanError::DecodingError(_)));
}

#[tokio::test]
async fn add_expense_sends_json_body() {
    let (client, transport) = scripted_client(vec![Ok(HttpResponse::new(200, r#"{"message":"ok"}"#))]);

    let expense = Expense::new("2025-01-20", "交通費", 500);
    client.add_expense(&expense).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].header("content-type"), Some("application/json"));
    let echoed: Expense = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(echoed, expense);
}

#[tokio::test]
async fn clones_share_the_transport() {
    let (client, transport) = scripted_client(vec![
        Ok(HttpResponse::new(200, "[]")),
        Ok(HttpResponse::new(200, "[]")),
    ]);
    let other = client.clone();

    let (a, b) = tokio::join!(client.get_expenses(), other.get_genres());
    assert!(a.unwrap().is_empty());
    assert!(b.unwrap().is_empty());
    assert_eq!(transport.sent().len(), 2);
}

// ---------------------------------------------------------------------------
// Ledger transport
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Ledger {
    expenses: BTreeMap<i64, ExpenseWithId>,
    last_id: i64,
    requests: usize,
}

#[derive(Default)]
struct LedgerTransport {
    ledger: Mutex<Ledger>,
}

fn json_reply<T: serde::Serialize>(value: &T) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(200, serde_json::to_string(value).unwrap()))
}

#[async_trait]
impl Transport for LedgerTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.requests += 1;

        let segments: Vec<&str> = request.url.path_segments().unwrap().collect();
        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["expenses"]) => {
                let list: Vec<_> = ledger.expenses.values().cloned().collect();
                json_reply(&list)
            }
            (HttpMethod::Post, ["expenses"]) => {
                let expense: Expense = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
                ledger.last_id += 1;
                let id = ledger.last_id;
                ledger
                    .expenses
                    .insert(id, ExpenseWithId::new(id, expense.date, expense.genre, expense.amount));
                json_reply(&ApiMessage::ok("ok"))
            }
            (HttpMethod::Delete, ["expenses", id]) => {
                ledger.expenses.remove(&id.parse::<i64>().unwrap());
                json_reply(&ApiMessage::ok("deleted"))
            }
            _ => Ok(HttpResponse::new(404, "")),
        }
    }
}

#[tokio::test]
async fn list_reflects_acknowledged_adds_minus_deletes() {
    let transport = Arc::new(LedgerTransport::default());
    let client = ShishutsukanClient::with_transport(base_url(), transport.clone());

    // (adds, deletes-of-first-ids) per round
    let rounds = [(3, 1), (0, 0), (2, 3), (1, 0), (0, 2)];
    let mut expected = 0usize;
    let mut calls = 0usize;

    for (round, (adds, deletes)) in rounds.into_iter().enumerate() {
        for n in 0..adds {
            let expense = Expense::new(format!("2025-02-{:02}", round + 1), "食費", n as i64 + 1);
            client.add_expense(&expense).await.unwrap();
            expected += 1;
            calls += 1;
        }

        let listed = client.get_expenses().await.unwrap();
        calls += 1;
        assert_eq!(listed.len(), expected, "round {round} after adds");

        for expense in listed.iter().take(deletes) {
            client.delete_expense(expense.id).await.unwrap();
            expected -= 1;
            calls += 1;
        }

        let listed = client.get_expenses().await.unwrap();
        calls += 1;
        assert_eq!(listed.len(), expected, "round {round} after deletes");
    }

    // Every call reached the transport: nothing was served from a cache.
    assert_eq!(transport.ledger.lock().unwrap().requests, calls);
}

#[tokio::test]
async fn unknown_route_on_fake_is_http_error() {
    let client = ShishutsukanClient::with_transport(base_url(), Arc::new(LedgerTransport::default()));

    let err = client.get_genres().await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}
