//! Mock backend tests for the authenticated client.
//!
//! These tests use wiremock to stand in for the marketplace backend and check
//! credential attachment, forced logout and role gating end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::time::Duration;

use etuition_core::{
    AccessDecision, AccessGate, AccessToken, ApiUrl, Email, Error, Role, RoleCache, RoleState,
    SessionStore, UserIdentity,
};
use etuition_http::models::{
    ApplicationDetails, NewUser, PaymentDetails, TuitionDetails, TuitionQuery, TuitionStatus,
    UserUpdate,
};
use etuition_http::{
    AuthenticatedClient, ClientConfig, HttpRoleResolver, MarketplaceApi, Method, RequestOptions,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn signed_in(email: &str, token: &str) -> SessionStore {
    let store = SessionStore::new();
    store.login(
        UserIdentity::new("uid-1", "Ada", Email::new(email).unwrap()),
        Some(AccessToken::new(token)),
    );
    store
}

fn identity_only(email: &str) -> SessionStore {
    let store = SessionStore::new();
    store.login(UserIdentity::new("uid-1", "Ada", Email::new(email).unwrap()), None);
    store
}

fn physics_details() -> TuitionDetails {
    TuitionDetails {
        title: "Physics for SSC".to_string(),
        subject: "Physics".to_string(),
        class_grade: "Class 10".to_string(),
        location: "Mirpur".to_string(),
        description: String::new(),
        salary: 6000.0,
    }
}

fn request_body(request: &wiremock::Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

fn authorization_values(request: &wiremock::Request) -> Vec<String> {
    request
        .headers
        .get_all("authorization")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Credential Attachment
// ============================================================================

#[tokio::test]
async fn test_credential_attached_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin-stats"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "revenue": 1500.0, "users": 3, "tuitions": 4, "orders": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let response = client
        .request(Method::GET, "/admin-stats", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["users"], 3);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(authorization_values(&requests[0]), vec!["Bearer tok123"]);
}

#[tokio::test]
async fn test_credential_fixed_for_in_flight_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tuitions/student/my-tuitions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok-old");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();

    let in_flight = tokio::spawn({
        let client = client.clone();
        async move {
            client
                .request(Method::GET, "/tuitions/student/my-tuitions", RequestOptions::new())
                .await
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.replace_credential(AccessToken::new("tok-new")));

    in_flight.await.unwrap().unwrap();
    client
        .request(Method::GET, "/tuitions/student/my-tuitions", RequestOptions::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(authorization_values(&requests[0]), vec!["Bearer tok-old"]);
    assert_eq!(authorization_values(&requests[1]), vec!["Bearer tok-new"]);
}

#[tokio::test]
async fn test_no_credential_no_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tutors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = SessionStore::new();
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();
    client
        .request(Method::GET, "/tutors", RequestOptions::new())
        .await
        .unwrap();

    // Identity without a credential behaves the same.
    store.login(
        UserIdentity::new("uid-1", "Ada", Email::new("a@x.com").unwrap()),
        None,
    );
    client
        .request(Method::GET, "/tutors", RequestOptions::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| authorization_values(r).is_empty()));
}

#[tokio::test]
async fn test_caller_headers_kept_and_authorization_overridden() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create-payment-intent"))
        .and(header("x-request-id", "r-1"))
        .and(body_partial_json(json!({ "salary": 5000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "clientSecret": "cs_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let options = RequestOptions::new()
        .header("x-request-id", "r-1")
        .unwrap()
        .header("authorization", "Bearer forged")
        .unwrap()
        .body(json!({ "salary": 5000 }));

    let response = client
        .request(Method::POST, "/create-payment-intent", options)
        .await
        .unwrap();
    assert_eq!(response.body["clientSecret"], "cs_1");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(authorization_values(&requests[0]), vec!["Bearer tok123"]);
}

#[tokio::test]
async fn test_path_passed_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/applications/my-applications/a@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let response = client
        .request(
            Method::GET,
            "/applications/my-applications/a@x.com",
            RequestOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_absolute_path_rejected() {
    let client = AuthenticatedClient::new(
        ApiUrl::new("http://localhost:5000").unwrap(),
        signed_in("a@x.com", "tok123"),
    )
    .unwrap();

    let result = client
        .request(Method::GET, "https://evil.test/steal", RequestOptions::new())
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(client.session().snapshot().is_authenticated());
}

// ============================================================================
// Forced Logout
// ============================================================================

#[tokio::test]
async fn test_unauthorized_logs_out() {
    for status in [401u16, 403] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/admin-stats"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "message": "forbidden access" })),
            )
            .mount(&server)
            .await;

        let store = signed_in("a@x.com", "tok123");
        let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();

        let err = client
            .request(Method::GET, "/admin-stats", RequestOptions::new())
            .await
            .unwrap_err();

        assert!(err.is_auth_rejected());
        assert_eq!(err.status(), Some(status));
        let api_error = err.api_error().unwrap();
        assert_eq!(api_error.message, "forbidden access");
        assert_eq!(
            api_error.payload.as_ref().unwrap()["message"],
            "forbidden access"
        );

        let session = store.snapshot();
        assert!(session.identity().is_none());
        assert!(session.credential().is_none());
    }
}

#[tokio::test]
async fn test_rejection_without_credential_logs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/applications/my-applications/a@x.com"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let store = identity_only("a@x.com");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();

    let err = client
        .request(
            Method::GET,
            "/applications/my-applications/a@x.com",
            RequestOptions::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_auth_rejected());
    assert_eq!(err.status(), Some(403));
    assert!(!store.snapshot().is_authenticated());

    let requests = server.received_requests().await.unwrap();
    assert!(authorization_values(&requests[0]).is_empty());
}

#[tokio::test]
async fn test_concurrent_rejections_log_out_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let epoch_before = store.epoch();
    let mut changes = store.subscribe();
    changes.borrow_and_update();

    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();
    let (first, second) = tokio::join!(
        client.request(Method::GET, "/admin-stats", RequestOptions::new()),
        client.request(Method::GET, "/tuitions/student/my-tuitions", RequestOptions::new()),
    );

    assert!(first.unwrap_err().is_auth_rejected());
    assert!(second.unwrap_err().is_auth_rejected());
    assert!(!store.snapshot().is_authenticated());
    assert_eq!(store.epoch(), epoch_before + 1);
    assert!(changes.has_changed().unwrap());
    changes.borrow_and_update();
    assert!(!changes.has_changed().unwrap());
}

#[tokio::test]
async fn test_custom_rejection_handler() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tuitions/t1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let seen = Arc::new(AtomicU16::new(0));
    let store = signed_in("a@x.com", "tok123");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone())
        .unwrap()
        .on_auth_rejected({
            let seen = seen.clone();
            move |status: u16| seen.store(status, Ordering::SeqCst)
        });

    let err = client.delete::<Value>("/tuitions/t1").await.unwrap_err();
    assert!(err.is_auth_rejected());
    assert_eq!(seen.load(Ordering::SeqCst), 403);
    // The replacement handler decides; the default logout did not run.
    assert!(store.snapshot().is_authenticated());
}

// ============================================================================
// Other Failures
// ============================================================================

#[tokio::test]
async fn test_network_failure_keeps_session() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let store = signed_in("a@x.com", "tok123");
    let api = ApiUrl::new(format!("http://127.0.0.1:{port}")).unwrap();
    let client = AuthenticatedClient::new(api, store.clone()).unwrap();

    let err = client
        .request(Method::GET, "/admin-stats", RequestOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.status(), None);
    assert!(store.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin-stats"))
        .respond_with(
            ResponseTemplate::new(401).set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let config = ClientConfig::new(mock_api_url(&server)).timeout(Duration::from_millis(100));
    let client = AuthenticatedClient::with_config(config, store.clone()).unwrap();

    let err = client
        .request(Method::GET, "/admin-stats", RequestOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(store.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_client_and_server_errors_keep_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tuitions/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin-stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();

    let err = client
        .request(Method::GET, "/tuitions/missing", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Client(ref e) if e.status == 404 && e.message == "not found"));

    let err = client
        .request(Method::GET, "/admin-stats", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Server(ref e) if e.status == 500 && e.payload.is_none()));

    assert!(store.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_public_client_ignores_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tutors"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();
    let public = client.public();

    let err = public
        .request(Method::GET, "/tutors", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_auth_rejected());
    assert!(store.snapshot().is_authenticated());

    let requests = server.received_requests().await.unwrap();
    assert!(authorization_values(&requests[0]).is_empty());
}

// ============================================================================
// Role Gating
// ============================================================================

async fn gate_decision(role: &str) -> (AccessDecision, RoleState) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/a%40x.com"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "email": "a@x.com", "role": role
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();
    let cache = RoleCache::new(HttpRoleResolver::new(client));
    let gate = AccessGate::default();

    let session = store.snapshot();
    assert_eq!(
        gate.evaluate(&session, &cache.peek(&session), Role::Tutor.into()),
        AccessDecision::Pending
    );

    let state = cache.resolve(&session).await;
    // Second resolve is served from the cache (`expect(1)` above).
    assert_eq!(cache.resolve(&session).await, state);

    (gate.evaluate(&session, &state, Role::Tutor.into()), state)
}

#[tokio::test]
async fn test_student_redirected_from_tutor_area() {
    let (decision, state) = gate_decision("student").await;
    assert_eq!(state, RoleState::Loaded(Role::Student));
    assert_eq!(decision, AccessDecision::Redirect("/".to_string()));
}

#[tokio::test]
async fn test_tutor_allowed_into_tutor_area() {
    let (decision, state) = gate_decision("tutor").await;
    assert_eq!(state, RoleState::Loaded(Role::Tutor));
    assert_eq!(decision, AccessDecision::Allow);
}

#[tokio::test]
async fn test_unknown_role_fails_closed() {
    let (decision, state) = gate_decision("superuser").await;
    assert_eq!(state, RoleState::Failed);
    assert!(decision.redirect_target().is_some());
}

#[tokio::test]
async fn test_rejected_role_lookup_logs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/a%40x.com"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();
    let cache = RoleCache::new(HttpRoleResolver::new(client));

    let before = store.snapshot();
    assert_eq!(cache.resolve(&before).await, RoleState::Failed);

    let after = store.snapshot();
    assert!(!after.is_authenticated());
    let decision = AccessGate::default().evaluate_route(&after, &cache.peek(&after), "/dashboard/tutor");
    assert_eq!(decision, AccessDecision::Redirect("/".to_string()));
}

// ============================================================================
// Marketplace API
// ============================================================================

#[tokio::test]
async fn test_post_tuition_stamps_student() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tuitions"))
        .and(body_partial_json(json!({
            "subject": "Physics",
            "classGrade": "Class 10",
            "studentEmail": "a@x.com",
            "studentName": "Ada",
            "status": "pending",
            "isBooked": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "acknowledged": true, "insertedId": "t1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let ack = api.post_tuition(&physics_details()).await.unwrap();
    assert_eq!(ack.inserted_id.as_deref(), Some("t1"));
}

#[tokio::test]
async fn test_post_tuition_requires_identity() {
    let client = AuthenticatedClient::new(
        ApiUrl::new("http://localhost:5000").unwrap(),
        SessionStore::new(),
    )
    .unwrap();
    let api = MarketplaceApi::new(client);

    let err = api
        .post_tuition(&TuitionDetails {
            title: "t".to_string(),
            subject: "s".to_string(),
            class_grade: "c".to_string(),
            location: "l".to_string(),
            description: String::new(),
            salary: 1.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_public_tuition_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tuitions"))
        .and(query_param("page", "2"))
        .and(query_param("subject", "Higher Math"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tuitions": [
                { "_id": "t1", "subject": "Higher Math", "salary": 5000, "status": "approved" }
            ],
            "totalPages": 3
        })))
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let page = api
        .tuitions(&TuitionQuery {
            page: 2,
            subject: Some("Higher Math".to_string()),
            ..TuitionQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.tuitions[0].status, TuitionStatus::Approved);

    let requests = server.received_requests().await.unwrap();
    assert!(authorization_values(&requests[0]).is_empty());
}

#[tokio::test]
async fn test_typed_call_logs_out_on_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/tuitions/status/t1"))
        .and(body_partial_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in("a@x.com", "tok123");
    let client = AuthenticatedClient::new(mock_api_url(&server), store.clone()).unwrap();
    let api = MarketplaceApi::new(client);

    let err = api
        .set_tuition_status("t1", TuitionStatus::Approved)
        .await
        .unwrap_err();
    assert!(err.is_auth_rejected());
    assert!(!store.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_my_payments_encodes_email() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path("/payments/my-payments/a%40x.com"))
        .respond_with({
            let calls = calls.clone();
            move |_: &wiremock::Request| {
                calls.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(json!([
                    { "_id": "p1", "amount": 5000, "transactionId": "pi_1", "status": "success" }
                ]))
            }
        })
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let payments = api
        .my_payments(&Email::new("a@x.com").unwrap())
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].transaction_id.as_deref(), Some("pi_1"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_register_user_is_public() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_partial_json(json!({
            "name": "Tariq",
            "email": "t@x.com",
            "role": "tutor"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "acknowledged": true, "insertedId": "u9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let ack = api
        .register_user(&NewUser {
            name: "Tariq".to_string(),
            email: Email::new("t@x.com").unwrap(),
            photo: None,
            phone: None,
            role: Role::Tutor,
        })
        .await
        .unwrap();
    assert_eq!(ack.inserted_id.as_deref(), Some("u9"));

    let requests = server.received_requests().await.unwrap();
    assert!(authorization_values(&requests[0]).is_empty());
    assert!(request_body(&requests[0]).get("photo").is_none());
}

#[tokio::test]
async fn test_user_lookup_and_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/a%40x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "name": "Ada", "email": "a@x.com", "role": "admin"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/ghost%40x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("search", "ada"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "u1", "email": "a@x.com", "role": "admin" },
            { "_id": "u2", "email": "ada@x.com", "role": "student" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let user = api.user(&Email::new("a@x.com").unwrap()).await.unwrap().unwrap();
    assert_eq!(user.role, Some(Role::Admin));
    assert!(api.user(&Email::new("ghost@x.com").unwrap()).await.unwrap().is_none());

    let users = api.users(Some("ada")).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].role, Some(Role::Student));
}

#[tokio::test]
async fn test_profile_update_cannot_change_role() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/users/u1"))
        .and(body_partial_json(json!({ "name": "Ada L." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/admin/u2"))
        .and(body_partial_json(json!({ "role": "tutor" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/u3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deletedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let update = UserUpdate {
        name: Some("Ada L.".to_string()),
        role: Some(Role::Admin),
        ..UserUpdate::default()
    };
    let ack = api.update_user("u1", &update).await.unwrap();
    assert_eq!(ack.modified_count, Some(1));

    let promote = UserUpdate {
        role: Some(Role::Tutor),
        ..UserUpdate::default()
    };
    api.admin_update_user("u2", &promote).await.unwrap();

    let ack = api.delete_user("u3").await.unwrap();
    assert_eq!(ack.deleted_count, Some(1));

    let requests = server.received_requests().await.unwrap();
    let own = requests.iter().find(|r| r.url.path() == "/users/u1").unwrap();
    assert_eq!(request_body(own), json!({ "name": "Ada L." }));
}

#[tokio::test]
async fn test_tuition_edit_returns_to_moderation() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/tuitions/t1"))
        .and(body_partial_json(json!({
            "subject": "Physics",
            "classGrade": "Class 10",
            "salary": 6000.0,
            "status": "pending"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "modifiedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tuitions/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deletedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let ack = api.update_tuition("t1", &physics_details()).await.unwrap();
    assert_eq!(ack.modified_count, Some(1));
    let ack = api.delete_tuition("t1").await.unwrap();
    assert_eq!(ack.deleted_count, Some(1));
}

#[tokio::test]
async fn test_apply_stamps_tutor() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/applications"))
        .and(header("authorization", "Bearer tok123"))
        .and(body_partial_json(json!({
            "tuitionId": "t1",
            "expectedSalary": 5500.0,
            "qualifications": "BSc Physics",
            "experience": "3 years",
            "studentEmail": "s@x.com",
            "tutorEmail": "a@x.com",
            "tutorName": "Ada"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "insertedId": "ap1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let ack = api
        .apply(&ApplicationDetails {
            tuition_id: "t1".to_string(),
            expected_salary: 5500.0,
            qualifications: "BSc Physics".to_string(),
            experience: "3 years".to_string(),
            student_email: "s@x.com".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(ack.inserted_id.as_deref(), Some("ap1"));
}

#[tokio::test]
async fn test_checkout_records_payment_for_student() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create-payment-intent"))
        .and(body_partial_json(json!({ "salary": 5500.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "clientSecret": "cs_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .and(body_partial_json(json!({
            "studentEmail": "a@x.com",
            "studentName": "Ada",
            "tutorEmail": "t@x.com",
            "tutorName": "Tariq",
            "tuitionId": "t1",
            "applicationId": "ap1",
            "amount": 5500.0,
            "transactionId": "pi_1",
            "status": "success"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentResult": { "insertedId": "p1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthenticatedClient::new(mock_api_url(&server), signed_in("a@x.com", "tok123"))
        .unwrap();
    let api = MarketplaceApi::new(client);

    let intent = api.create_payment_intent(5500.0).await.unwrap();
    assert_eq!(intent.client_secret, "cs_1");

    let receipt = api
        .record_payment(&PaymentDetails {
            tutor_email: "t@x.com".to_string(),
            tutor_name: "Tariq".to_string(),
            tuition_id: "t1".to_string(),
            application_id: "ap1".to_string(),
            amount: 5500.0,
            transaction_id: "pi_1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.payment_result.unwrap().inserted_id.as_deref(), Some("p1"));

    let requests = server.received_requests().await.unwrap();
    let payment = requests.iter().find(|r| r.url.path() == "/payments").unwrap();
    let date = request_body(payment)["date"].as_str().unwrap().to_string();
    assert!(chrono::DateTime::parse_from_rfc3339(&date).is_ok());
}

#[tokio::test]
async fn test_record_payment_requires_identity() {
    let client = AuthenticatedClient::new(
        ApiUrl::new("http://localhost:5000").unwrap(),
        SessionStore::new(),
    )
    .unwrap();
    let api = MarketplaceApi::new(client);

    let err = api
        .record_payment(&PaymentDetails {
            tutor_email: "t@x.com".to_string(),
            tutor_name: "Tariq".to_string(),
            tuition_id: "t1".to_string(),
            application_id: "ap1".to_string(),
            amount: 1.0,
            transaction_id: "pi_1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
