use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use movie_ratings::config::Config;
use movie_ratings::domain::NewUser;
use movie_ratings::services::UserService;
use movie_ratings::state::SharedState;
use serde_json::{Value, json};
use std::fmt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span::{Id, Record};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const ADMIN_EMAIL: &str = "root@movies.io";
const PASSWORD: &str = "secret123";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    config
}

/// Router over a fresh database with one administrator already present.
async fn spawn_app() -> Router {
    let shared = Arc::new(
        SharedState::new(test_config())
            .await
            .expect("Failed to create shared state"),
    );

    shared
        .users
        .create(NewUser {
            name: "Root".into(),
            email: ADMIN_EMAIL.into(),
            password: PASSWORD.into(),
            is_admin: true,
        })
        .await
        .expect("Failed to seed admin");

    movie_ratings::api::router(movie_ratings::api::create_app_state(shared, None))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/sessions",
        None,
        Some(json!({"email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/user",
        None,
        Some(json!({"name": name, "email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    login(app, email).await
}

async fn create_movie(app: &Router, admin: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/movie",
        Some(admin),
        Some(json!({
            "director": "Denis Villeneuve",
            "name": name,
            "genre": "Sci-Fi",
            "actors": "Amy Adams",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "movie create failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_banner_is_public() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/api", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        Value::String(format!("API Movies {}", env!("CARGO_PKG_VERSION")))
    );
}

#[tokio::test]
async fn test_token_is_required() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/api/user/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token not provided");

    let (status, body) = send(&app, Method::GET, "/api/movie", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token invalid");
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = spawn_app().await;
    let token = register(&app, "Ann", "ann@movies.io").await;

    let (status, profile) = send(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "ann@movies.io");
    assert_eq!(profile["is_active"], true);
    assert!(profile.get("password_hash").is_none());
    assert!(profile.get("is_admin").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/user",
        None,
        Some(json!({"name": "Again", "email": "ann@movies.io", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions",
        None,
        Some(json!({"email": "ann@movies.io", "password": "wrong-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password does not match");
}

#[tokio::test]
async fn test_validation_errors_are_collected() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/user",
        None,
        Some(json!({"email": "not-an-email", "password": "123"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "3 errors occurred");
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/sessions")
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_gates() {
    let app = spawn_app().await;
    let user = register(&app, "Ann", "ann@movies.io").await;
    let admin = login(&app, ADMIN_EMAIL).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/movie",
        Some(&user),
        Some(json!({"director": "a", "name": "b", "genre": "c", "actors": "d"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    let (status, _) = send(&app, Method::GET, "/api/user/list/admin", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/metrics", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let movie_id = create_movie(&app, &admin, "Arrival").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&admin),
        Some(json!({"movie_id": movie_id, "rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/admin",
        Some(&admin),
        Some(json!({"name": "Second", "email": "second@movies.io", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "second@movies.io");
}

#[tokio::test]
async fn test_user_lists_are_split_by_role() {
    let app = spawn_app().await;
    let user = register(&app, "Ann", "ann@movies.io").await;
    register(&app, "Bob", "bob@movies.io").await;
    let admin = login(&app, ADMIN_EMAIL).await;

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/user/list?is_admin=true&sortParam=name&sortOrder=DESC",
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);
    assert_eq!(page["data"][0]["name"], "Bob");
    assert_eq!(page["is_admin"], json!(false));

    let (status, page) = send(&app, Method::GET, "/api/user/list/admin", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["is_admin"], json!(true));
    assert_eq!(page["data"][0]["email"], ADMIN_EMAIL);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/user/list?sortOrder=sideways",
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only available DESC and ASC values.");
}

#[tokio::test]
async fn test_extreme_pagination_is_handled() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL).await;
    create_movie(&app, &admin, "Arrival").await;

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/movie?page=18446744073709551615",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["data"], json!([]));
    assert_eq!(page["currentPage"], json!(u64::MAX));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/movie?size=18446744073709551615",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "size must be less than or equal to 100");

    let (status, page) = send(&app, Method::GET, "/api/movie?size=100", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 1);
}

#[tokio::test]
async fn test_vote_rating_accepts_numeric_string() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let movie_id = create_movie(&app, &admin, "Dune").await;
    let user = register(&app, "Ann", "ann@movies.io").await;

    let (status, vote) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&user),
        Some(json!({"movie_id": movie_id, "rating": "3"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{vote}");
    assert_eq!(vote["rating"], 3);
}

#[tokio::test]
async fn test_health_and_docs_are_public() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/api/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = send(&app, Method::GET, "/api/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ready": true, "database": true}));

    let (status, doc) = send(&app, Method::GET, "/api/docs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "API Movies");
    assert!(doc["paths"]["/api/movie/{id}"]["delete"].is_object());
    assert!(doc["openapi"].as_str().unwrap().starts_with("3."));
}

/// Collects every `user_id` recorded on a span after it was opened.
#[derive(Clone, Default)]
struct RecordedUserIds(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> Layer<S> for RecordedUserIds {
    fn on_record(&self, _span: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        values.record(&mut UserIdVisitor(&self.0));
    }
}

struct UserIdVisitor<'a>(&'a Mutex<Vec<String>>);

impl Visit for UserIdVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "user_id" {
            self.0.lock().unwrap().push(format!("{value:?}"));
        }
    }
}

#[tokio::test]
async fn test_request_span_records_the_caller() {
    let recorded = RecordedUserIds::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorded.clone()));

    let app = spawn_app().await;
    let token = register(&app, "Ann", "ann@movies.io").await;

    let (status, profile) = send(&app, Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let id = profile["id"].as_str().unwrap();

    assert!(
        recorded.0.lock().unwrap().iter().any(|v| v == id),
        "user_id was not recorded on the request span"
    );
}

#[tokio::test]
async fn test_movie_lifecycle_with_votes() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let ann = register(&app, "Ann", "ann@movies.io").await;
    let bob = register(&app, "Bob", "bob@movies.io").await;

    let movie_id = create_movie(&app, &admin, "Arrival").await;
    create_movie(&app, &admin, "Dune").await;

    for (token, rating) in [(&ann, 4), (&bob, 1)] {
        let (status, vote) = send(
            &app,
            Method::POST,
            "/api/vote",
            Some(token),
            Some(json!({"movie_id": movie_id, "rating": rating})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(vote["rating"], rating);
    }

    let (status, movie) = send(
        &app,
        Method::GET,
        &format!("/api/movie/{movie_id}"),
        Some(&ann),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(movie["votes_average"], 2.5);
    assert_eq!(movie["votes"].as_array().unwrap().len(), 2);

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/movie?name=dun&size=1",
        Some(&ann),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["data"][0]["votes_average"], 0.0);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/movie/{movie_id}"),
        Some(&admin),
        Some(json!({"genre": "Drama"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["genre"], "Drama");
    assert_eq!(updated["name"], "Arrival");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/movie/{movie_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/movie/{movie_id}"),
        Some(&ann),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Movie not found");

    let (_, votes) = send(&app, Method::GET, "/api/vote", Some(&ann), None).await;
    assert_eq!(votes["count"], 0);
}

#[tokio::test]
async fn test_vote_ownership_rules() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let ann = register(&app, "Ann", "ann@movies.io").await;
    let bob = register(&app, "Bob", "bob@movies.io").await;
    let movie_id = create_movie(&app, &admin, "Arrival").await;

    let (_, vote) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&ann),
        Some(json!({"movie_id": movie_id, "rating": 2})),
    )
    .await;
    let vote_uri = format!("/api/vote/{}", vote["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&ann),
        Some(json!({"movie_id": movie_id, "rating": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You already rated this movie");

    let (status, body) = send(
        &app,
        Method::PUT,
        &vote_uri,
        Some(&bob),
        Some(json!({"rating": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - Only owner can edit vote");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &vote_uri,
        Some(&ann),
        Some(json!({"rating": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 0);

    let (status, body) = send(&app, Method::DELETE, &vote_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Unauthorized - Only owner or admins can remove vote"
    );

    let (status, _) = send(&app, Method::DELETE, &vote_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &vote_uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/vote/not-a-uuid", Some(&ann), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inactive_account_cannot_write() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL).await;
    let ann = register(&app, "Ann", "ann@movies.io").await;
    let movie_id = create_movie(&app, &admin, "Arrival").await;

    let (status, body) = send(&app, Method::PATCH, "/api/user/inactivate", Some(&ann), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&ann),
        Some(json!({"movie_id": movie_id, "rating": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - This account is inactive");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/user",
        Some(&ann),
        Some(json!({"name": "Annie"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - This account is inactive");

    let (status, body) = send(&app, Method::PATCH, "/api/user/activate", Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/user",
        Some(&ann),
        Some(json!({"name": "Annie"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Annie");
}
