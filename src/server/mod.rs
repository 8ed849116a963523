//! HTTP API of the flashcard service.
//!
//! Review endpoints:
//! - `GET /review/session?limit=` returns the due cards of the caller
//! - `POST /review/update` applies a review outcome to one card
//!
//! Plus flashcard CRUD under `/flashcards` and JSON import/export.

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use chrono::Utc;
use log::info;
use rusqlite::Connection;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use crate::database::{DbError, db};
use crate::export::json::{ExportError, import_json};
use crate::models::CreateFlashcard;
use config::{Config, ConfigError};
use routes::*;
use state::AppState;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const SAMPLE_FLASHCARDS: [(&str, &str, Option<&str>); 3] = [
    ("cześć", "hello", Some("interjection")),
    ("dziękuję", "thank you", None),
    ("proszę", "please", None),
];

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(auth::USER_ID_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/review/session", get(review_session_handler))
        .route("/review/update", post(review_update_handler))
        .route(
            "/flashcards",
            get(list_flashcards_handler).post(create_flashcard_handler),
        )
        .route("/flashcards/export", get(export_flashcards_handler))
        .route("/flashcards/import", post(import_flashcards_handler))
        .route(
            "/flashcards/{id}",
            get(get_flashcard_handler)
                .patch(update_flashcard_handler)
                .delete(delete_flashcard_handler),
        )
        .layer(cors)
        .with_state(state)
}

/// Fills an empty database with starter cards for the demo user.
///
/// Cards come from `seed_file` when configured, otherwise from a small built-in set.
pub fn seed_if_empty(conn: &Connection, config: &Config) -> Result<usize, ServerError> {
    if !config.seed || db::count_flashcards(conn)? > 0 {
        return Ok(0);
    }

    let cards: Vec<CreateFlashcard> = match &config.seed_file {
        Some(path) => import_json(path)?.flashcards,
        None => SAMPLE_FLASHCARDS
            .iter()
            .map(|(front, back, pos)| CreateFlashcard {
                front: front.to_string(),
                back: back.to_string(),
                part_of_speech: pos.map(str::to_string),
            })
            .collect(),
    };

    let seeded = db::import_flashcards(conn, config.demo_user, &cards, Utc::now())?;
    info!("Sample data created: {} cards for {}", seeded, config.demo_user);
    Ok(seeded)
}

/// Serves the API on an already bound listener until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), ServerError> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!("Initializing state...");
    let conn = db::init_database(&config.database_path)?;
    seed_if_empty(&conn, &config)?;

    let listener = TcpListener::bind(config.address()).await?;
    serve(listener, AppState::new(conn)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        state: AppState,
        user: Uuid,
    }

    impl TestApp {
        fn new() -> Self {
            let state = AppState::new(db::init_in_memory().unwrap());
            Self {
                router: router(state.clone()),
                state,
                user: Uuid::new_v4(),
            }
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            self.send_as(Some(self.user), method, uri, body).await
        }

        async fn send_as(
            &self,
            user: Option<Uuid>,
            method: &str,
            uri: &str,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(user) = user {
                builder = builder.header(auth::USER_ID_HEADER, user.to_string());
            }
            let request = match body {
                Some(body) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            self.send_request(request).await
        }

        async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn create(&self, front: &str) -> Value {
            let (status, card) = self
                .send("POST", "/flashcards", Some(json!({ "front": front, "back": "x" })))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            card
        }
    }

    #[tokio::test]
    async fn test_session_requires_user() {
        let app = TestApp::new();
        let (status, body) = app.send_as(None, "GET", "/review/session", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");

        let (status, _) = app
            .send_as(None, "GET", "/review/session?limit=abc", None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_returns_due_cards() {
        let app = TestApp::new();
        app.create("jeden").await;
        app.create("dwa").await;

        let (status, body) = app.send("GET", "/review/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cards"].as_array().unwrap().len(), 2);
        assert!(body["cards"][0].get("leitner_box").is_none());

        let (status, body) = app.send("GET", "/review/session?limit=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cards"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_session_limit_bounds() {
        let app = TestApp::new();
        for uri in [
            "/review/session?limit=0",
            "/review/session?limit=101",
            "/review/session?limit=ten",
        ] {
            let (status, _) = app.send("GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        }
        let (status, _) = app.send("GET", "/review/session?limit=100", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_review_update_moves_card() {
        let app = TestApp::new();
        let card = app.create("kot").await;
        let id = card["id"].as_str().unwrap();

        let (status, body) = app
            .send(
                "POST",
                "/review/update",
                Some(json!({ "flashcardId": id, "knewIt": true })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leitnerBox"], 2);
        assert_eq!(body["flashcardId"], id);

        // no longer due
        let (_, body) = app.send("GET", "/review/session", None).await;
        assert!(body["cards"].as_array().unwrap().is_empty());

        let (_, stored) = app.send("GET", &format!("/flashcards/{}", id), None).await;
        assert_eq!(stored["leitner_box"], 2);
    }

    #[tokio::test]
    async fn test_review_update_errors() {
        let app = TestApp::new();

        let (status, _) = app
            .send(
                "POST",
                "/review/update",
                Some(json!({ "flashcardId": Uuid::new_v4(), "knewIt": true })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .send(
                "POST",
                "/review/update",
                Some(json!({ "flashcardId": "nope", "knewIt": true })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "POST",
                "/review/update",
                Some(json!({ "flashcardId": Uuid::new_v4() })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send_as(
                None,
                "POST",
                "/review/update",
                Some(json!({ "flashcardId": Uuid::new_v4(), "knewIt": true })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cards_of_other_users_are_not_found() {
        let app = TestApp::new();
        let card = app.create("kot").await;
        let id = card["id"].as_str().unwrap();
        let stranger = Some(Uuid::new_v4());

        let (status, _) = app
            .send_as(stranger, "GET", &format!("/flashcards/{}", id), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .send_as(
                stranger,
                "POST",
                "/review/update",
                Some(json!({ "flashcardId": id, "knewIt": false })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let app = TestApp::new();
        let (status, _) = app
            .send("POST", "/flashcards", Some(json!({ "front": "", "back": "x" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send("POST", "/flashcards", Some(json!({ "back": "x" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete_flashcard() {
        let app = TestApp::new();
        let card = app.create("pies").await;
        let uri = format!("/flashcards/{}", card["id"].as_str().unwrap());

        let (status, body) = app
            .send("PATCH", &uri, Some(json!({ "back": "dog", "part_of_speech": "noun" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["back"], "dog");
        assert_eq!(body["part_of_speech"], "noun");

        let (status, _) = app.send("PATCH", &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = app.send("PATCH", &uri, Some(json!({ "colour": "red" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = app.send("PATCH", &uri, Some(json!(["back"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.send("PATCH", &uri, Some(json!({ "front": "" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app.send("PATCH", "/flashcards/123", Some(json!({ "front": "a" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.send("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.send("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send("PATCH", &uri, Some(json!({ "front": "a" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_flashcards_paginates() {
        let app = TestApp::new();
        for front in ["a", "b", "c"] {
            app.create(front).await;
        }

        let (status, body) = app
            .send("GET", "/flashcards?page=2&pageSize=2&sortBy=front&order=asc", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["front"], "c");
        assert_eq!(body["pagination"]["totalItems"], 3);
        assert_eq!(body["pagination"]["totalPages"], 2);

        let (status, _) = app.send("GET", "/flashcards?pageSize=500", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let app = TestApp::new();
        app.create("jeden").await;
        app.create("dwa").await;

        let (status, export) = app.send("GET", "/flashcards/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(export["flashcards"].as_array().unwrap().len(), 2);

        let other = Uuid::new_v4();
        let (status, body) = app
            .send_as(Some(other), "POST", "/flashcards/import", Some(export))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["importedCount"], 2);

        let conn = app.state.db().unwrap();
        assert_eq!(db::get_all_flashcards(&conn, other).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_import_rejects_empty_document() {
        let app = TestApp::new();
        let (status, _) = app
            .send("POST", "/flashcards/import", Some(json!({ "flashcards": [] })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_seed_only_fills_empty_database() {
        let conn = db::init_in_memory().unwrap();
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(seed_if_empty(&conn, &config).unwrap(), 3);
        assert_eq!(seed_if_empty(&conn, &config).unwrap(), 0);
        assert_eq!(db::get_all_flashcards(&conn, config.demo_user).unwrap().len(), 3);
    }

    #[test]
    fn test_seed_can_be_disabled() {
        let conn = db::init_in_memory().unwrap();
        let config = Config {
            seed: false,
            ..Config::from_lookup(|_| None).unwrap()
        };
        assert_eq!(seed_if_empty(&conn, &config).unwrap(), 0);
        assert_eq!(db::count_flashcards(&conn).unwrap(), 0);
    }
}
