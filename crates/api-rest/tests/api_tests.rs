//! HTTP-level tests for the REST API.
//!
//! Requests go through the full router and middleware stack over the
//! in-memory store.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use studyhub_api_rest::{create_app, AppState};
use studyhub_application::{services::PasswordHasher, ApplicationResult};
use studyhub_common::{config::AppConfig, RateLimitPolicy};
use studyhub_infrastructure::Repositories;
use studyhub_testing::fixtures::{register_request_parts, TEST_PASSWORD};
use tower::ServiceExt;

struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        Ok(format!("plain${}", password))
    }

    async fn verify(&self, password: &str, hash: &str) -> ApplicationResult<bool> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

struct TestApp {
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

struct Account {
    token: String,
    id: String,
    email: String,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(AppConfig::test())
    }

    fn with_config(config: AppConfig) -> Self {
        let state = AppState::with_password_hasher(
            config,
            Repositories::in_memory(),
            None,
            Arc::new(PlainHasher),
        );
        Self {
            router: create_app(state).unwrap(),
        }
    }

    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(request).await
    }

    async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    async fn register(&self) -> Account {
        let (email, username, display_name) = register_request_parts();
        let response = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "display_name": display_name,
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let data = &response.body["data"];
        Account {
            token: data["token"].as_str().unwrap().to_string(),
            id: data["user"]["id"].as_str().unwrap().to_string(),
            email,
        }
    }

    /// Returns the group id and its invite code
    async fn create_group(&self, owner: &Account, name: &str) -> (String, String) {
        let response = self
            .post("/api/v1/groups", &owner.token, json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let data = &response.body["data"];
        (
            data["id"].as_str().unwrap().to_string(),
            data["invite_code"].as_str().unwrap().to_string(),
        )
    }

    async fn create_question(&self, member: &Account, group_id: &str, body: Value) -> String {
        let response = self
            .post(&format!("/api/v1/groups/{}/questions", group_id), &member.token, body)
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let health = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["status"], "healthy");
    assert!(health.headers.contains_key("x-request-id"));

    let ready = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["data"]["ready"], true);
    assert_eq!(ready.body["data"]["checks"]["store"], "memory");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let response = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/api/v1/groups/{id}/stats"].is_object());
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();
    let account = app.register().await;

    let login = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": account.email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["data"]["token_type"], "Bearer");
    assert_eq!(login.body["data"]["user"]["id"], account.id.as_str());

    let token = login.body["data"]["token"].as_str().unwrap();
    let me = app.get("/api/v1/users/me", token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], account.email.as_str());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    let account = app.register().await;

    let login = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": account.email, "password": "wrong-password-1" })),
        )
        .await;

    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
    assert_eq!(login.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    let (email, username, display_name) = register_request_parts();
    let body = json!({
        "email": email,
        "username": username,
        "display_name": display_name,
        "password": TEST_PASSWORD,
    });

    let first = app
        .send(Method::POST, "/api/v1/auth/register", None, Some(body.clone()))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .send(Method::POST, "/api/v1/auth/register", None, Some(body))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let missing = app.send(Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "UNAUTHORIZED");

    let garbage = app.get("/api/v1/users/me", "not-a-jwt").await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_errors_list_fields_and_request_id() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-validation-1")
        .body(Body::from(
            json!({
                "email": "not-an-email",
                "username": "1bad",
                "display_name": "Someone",
                "password": "short",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.request(request).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "VALIDATION_FAILED");
    assert_eq!(response.body["request_id"], "req-validation-1");
    assert_eq!(response.headers["x-request-id"], "req-validation-1");

    let details = response.body["details"].as_object().unwrap();
    assert!(details.contains_key("email"));
    assert!(details.contains_key("username"));
    assert!(details.contains_key("password"));
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let app = TestApp::new();
    let account = app.register().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/groups")
        .header(header::AUTHORIZATION, format!("Bearer {}", account.token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let malformed = app.request(request).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["error"], "BAD_REQUEST");

    let bad_id = app.get("/api/v1/groups/not-a-uuid", &account.token).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_group_membership_flow() {
    let app = TestApp::new();
    let owner = app.register().await;
    let member = app.register().await;
    let outsider = app.register().await;

    let (group_id, invite_code) = app.create_group(&owner, "Graph Algorithms").await;

    let joined = app
        .post(
            "/api/v1/groups/join",
            &member.token,
            json!({ "invite_code": invite_code }),
        )
        .await;
    assert_eq!(joined.status, StatusCode::OK, "{}", joined.body);
    assert_eq!(joined.body["data"]["member_count"], 2);
    // Plain members never see the invite code
    assert!(joined.body["data"]["invite_code"].is_null());

    let members = app
        .get(&format!("/api/v1/groups/{}/members", group_id), &member.token)
        .await;
    assert_eq!(members.status, StatusCode::OK);
    assert_eq!(members.body["data"].as_array().unwrap().len(), 2);

    let forbidden = app
        .get(&format!("/api/v1/groups/{}", group_id), &outsider.token)
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["error"], "FORBIDDEN");

    let listed = app.get("/api/v1/groups", &member.token).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["pagination"]["total"], 1);
    assert_eq!(listed.body["items"][0]["id"], group_id.as_str());
}

#[tokio::test]
async fn test_unknown_invite_code_is_not_found() {
    let app = TestApp::new();
    let account = app.register().await;

    let response = app
        .post(
            "/api/v1/groups/join",
            &account.token,
            json!({ "invite_code": "ZZZZZZZZ" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_questions_responses_and_stats() {
    let app = TestApp::new();
    let owner = app.register().await;
    let member = app.register().await;
    let (group_id, invite_code) = app.create_group(&owner, "Interview Prep").await;
    app.post(
        "/api/v1/groups/join",
        &member.token,
        json!({ "invite_code": invite_code }),
    )
    .await;

    let two_sum = app
        .create_question(
            &owner,
            &group_id,
            json!({
                "title": "Two Sum",
                "link": "https://leetcode.com/problems/two-sum/",
                "platform": "leetcode",
                "difficulty": "easy",
                "tags": ["Array", "hash-table"],
            }),
        )
        .await;
    app.create_question(
        &member,
        &group_id,
        json!({ "title": "Median of Two Sorted Arrays", "difficulty": "hard" }),
    )
    .await;

    let hard = app
        .get(
            &format!("/api/v1/groups/{}/questions?difficulty=hard", group_id),
            &owner.token,
        )
        .await;
    assert_eq!(hard.status, StatusCode::OK);
    assert_eq!(hard.body["pagination"]["total"], 1);
    assert_eq!(hard.body["items"][0]["title"], "Median of Two Sorted Arrays");

    let solved = app
        .send(
            Method::PUT,
            &format!("/api/v1/questions/{}/responses", two_sum),
            Some(&member.token),
            Some(json!({ "status": "solved", "time_taken_minutes": 15 })),
        )
        .await;
    assert_eq!(solved.status, StatusCode::OK, "{}", solved.body);
    assert!(solved.body["data"]["solved_at"].is_string());

    let rated = app
        .send(
            Method::PUT,
            &format!("/api/v1/questions/{}/rating", two_sum),
            Some(&owner.token),
            Some(json!({ "rating": 2 })),
        )
        .await;
    assert_eq!(rated.status, StatusCode::OK);
    assert_eq!(rated.body["data"]["my_rating"], 2);

    let feedback = app
        .post(
            &format!("/api/v1/questions/{}/feedback", two_sum),
            &member.token,
            json!({ "body": "Use a hash map for one pass" }),
        )
        .await;
    assert_eq!(feedback.status, StatusCode::CREATED);

    let stats = app
        .get(&format!("/api/v1/questions/{}/stats", two_sum), &owner.token)
        .await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["data"]["member_count"], 2);
    assert_eq!(stats.body["data"]["solved_count"], 1);
    assert_eq!(stats.body["data"]["solve_rate"], 0.5);
    assert_eq!(stats.body["data"]["feedback_count"], 1);

    let leaderboard = app
        .get(&format!("/api/v1/groups/{}/leaderboard", group_id), &owner.token)
        .await;
    assert_eq!(leaderboard.status, StatusCode::OK);
    assert_eq!(leaderboard.body["data"][0]["user_id"], member.id.as_str());
    assert_eq!(leaderboard.body["data"][0]["rank"], 1);
    assert_eq!(leaderboard.body["data"][0]["solved_count"], 1);

    let activity = app
        .get(
            &format!("/api/v1/groups/{}/activity?days=7", group_id),
            &owner.token,
        )
        .await;
    assert_eq!(activity.status, StatusCode::OK);
    assert_eq!(activity.body["data"].as_array().unwrap().len(), 7);

    let member_stats = app
        .get(
            &format!("/api/v1/groups/{}/members/{}/stats", group_id, member.id),
            &owner.token,
        )
        .await;
    assert_eq!(member_stats.status, StatusCode::OK);
    assert_eq!(member_stats.body["data"]["solved_count"], 1);

    let mine = app.get("/api/v1/users/me/stats", &member.token).await;
    assert_eq!(mine.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected() {
    let app = TestApp::new();
    let owner = app.register().await;
    let (group_id, _) = app.create_group(&owner, "Dynamic Programming").await;
    let question = app
        .create_question(
            &owner,
            &group_id,
            json!({ "title": "Climbing Stairs", "difficulty": "easy" }),
        )
        .await;

    let response = app
        .send(
            Method::PUT,
            &format!("/api/v1/questions/{}/rating", question),
            Some(&owner.token),
            Some(json!({ "rating": 6 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["details"]["rating"].is_array());
}

#[tokio::test]
async fn test_deleting_group_removes_its_questions() {
    let app = TestApp::new();
    let owner = app.register().await;
    let (group_id, _) = app.create_group(&owner, "Weekly Contest").await;
    let question = app
        .create_question(
            &owner,
            &group_id,
            json!({ "title": "Valid Parentheses", "difficulty": "easy" }),
        )
        .await;

    let deleted = app
        .send(
            Method::DELETE,
            &format!("/api/v1/groups/{}", group_id),
            Some(&owner.token),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .get(&format!("/api/v1/questions/{}", question), &owner.token)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let mut config = AppConfig::test();
    config.rate_limit.enabled = true;
    config.rate_limit.auth = RateLimitPolicy {
        max_requests: 2,
        window_seconds: 60,
    };
    let app = TestApp::with_config(config);

    let attempt = |ip: &'static str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(
                json!({ "email": "nobody@example.com", "password": "whatever1" }).to_string(),
            ))
            .unwrap()
    };

    let first = app.request(attempt("203.0.113.7")).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);
    assert_eq!(first.headers["x-ratelimit-limit"], "2");
    assert_eq!(first.headers["x-ratelimit-remaining"], "1");

    let second = app.request(attempt("203.0.113.7")).await;
    assert_eq!(second.status, StatusCode::UNAUTHORIZED);

    let third = app.request(attempt("203.0.113.7")).await;
    assert_eq!(third.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(third.body["error"], "RATE_LIMIT_EXCEEDED");
    assert!(third.body["request_id"].is_string());
    assert!(third.headers.contains_key(header::RETRY_AFTER));
    assert_eq!(third.headers["x-ratelimit-remaining"], "0");

    let other_client = app.request(attempt("198.51.100.4")).await;
    assert_eq!(other_client.status, StatusCode::UNAUTHORIZED);
}

fn from_client(method: Method, uri: &str, ip: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", ip);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_general_rate_limit_applies_to_api_routes() {
    let mut config = AppConfig::test();
    config.rate_limit.enabled = true;
    config.rate_limit.general = RateLimitPolicy {
        max_requests: 2,
        window_seconds: 60,
    };
    let app = TestApp::with_config(config);
    // Registers from loopback, a different client than the one below
    let account = app.register().await;
    let list = || from_client(Method::GET, "/api/v1/groups", "203.0.113.9", Some(&account.token), None);

    let first = app.request(list()).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.headers["x-ratelimit-limit"], "2");
    assert_eq!(first.headers["x-ratelimit-remaining"], "1");

    let second = app.request(list()).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.headers["x-ratelimit-remaining"], "0");

    let third = app.request(list()).await;
    assert_eq!(third.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(third.body["error"], "RATE_LIMIT_EXCEEDED");
    assert!(third.body["request_id"].is_string());
    assert!(third.headers.contains_key("x-request-id"));
    let retry_after: u64 = third.headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(third.headers["x-ratelimit-limit"], "2");
    assert_eq!(third.headers["x-ratelimit-remaining"], "0");

    // Health checks share the budget with everything else
    let health = app
        .request(from_client(Method::GET, "/health", "203.0.113.9", None, None))
        .await;
    assert_eq!(health.status, StatusCode::TOO_MANY_REQUESTS);

    let other_client = app
        .request(from_client(Method::GET, "/api/v1/groups", "198.51.100.4", Some(&account.token), None))
        .await;
    assert_eq!(other_client.status, StatusCode::OK);
}

#[tokio::test]
async fn test_auth_headers_take_precedence_over_general_policy() {
    let mut config = AppConfig::test();
    config.rate_limit.enabled = true;
    config.rate_limit.general = RateLimitPolicy {
        max_requests: 100,
        window_seconds: 60,
    };
    config.rate_limit.auth = RateLimitPolicy {
        max_requests: 2,
        window_seconds: 60,
    };
    let app = TestApp::with_config(config);
    let account = app.register().await;

    let login = app
        .request(from_client(
            Method::POST,
            "/api/v1/auth/login",
            "203.0.113.20",
            None,
            Some(json!({ "email": account.email, "password": TEST_PASSWORD })),
        ))
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.headers["x-ratelimit-limit"], "2");
    assert_eq!(login.headers["x-ratelimit-remaining"], "1");

    // The login still counted against the general budget
    let me = app
        .request(from_client(Method::GET, "/api/v1/users/me", "203.0.113.20", Some(&account.token), None))
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.headers["x-ratelimit-limit"], "100");
    assert_eq!(me.headers["x-ratelimit-remaining"], "98");
}

#[tokio::test]
async fn test_disabled_rate_limiting_sends_no_headers() {
    let mut config = AppConfig::test();
    config.rate_limit.enabled = false;
    config.rate_limit.general = RateLimitPolicy {
        max_requests: 1,
        window_seconds: 60,
    };
    config.rate_limit.auth = RateLimitPolicy {
        max_requests: 1,
        window_seconds: 60,
    };
    let app = TestApp::with_config(config);
    let account = app.register().await;

    for _ in 0..3 {
        let response = app.get("/api/v1/groups", &account.token).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(!response.headers.contains_key("x-ratelimit-limit"));
        assert!(!response.headers.contains_key("x-ratelimit-remaining"));
    }

    let login = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": account.email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(!login.headers.contains_key("x-ratelimit-limit"));
}
