//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{Router, body::Body};
use tempfile::TempDir;
use tokio_rusqlite::Connection;

use huddle::api::AppState;
use huddle::api::app;
use huddle::core::AppConfig;
use huddle::core::db::{async_db, initialize_db};
use huddle::directory::{User, create_user};

pub struct TestApp {
    pub router: Router,
    pub db: Connection,
    // Removed from disk when the fixture is dropped
    _dir: TempDir,
}

/// Creates a test application router backed by a fresh database in a
/// temporary directory.
///
/// Tests share nothing but are still marked `#[serial]` to keep
/// tracing output readable.
pub async fn test_app() -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = AppConfig::with_storage_path(dir.path().to_str().unwrap());

    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let app_state = AppState::new(db.clone(), config);
    TestApp {
        router: app(Arc::new(app_state)),
        db,
        _dir: dir,
    }
}

/// Adds the people used across the API tests: an organizer and three
/// possible invitees.
pub async fn seed_users(db: &Connection) -> Vec<User> {
    let mut users = vec![];
    for (id, name) in [
        ("olivia", "Olivia Organizer"),
        ("ann", "Ann"),
        ("ben", "Ben"),
        ("cal", "Cal"),
    ] {
        let user = create_user(db, Some(id), name, &format!("{}@example.com", id))
            .await
            .expect("Failed to create user");
        users.push(user);
    }
    users
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    let text = body_to_string(body).await;
    serde_json::from_str(&text).expect("Body is not json")
}
