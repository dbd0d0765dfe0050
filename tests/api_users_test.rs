//! Integration tests for the users, inbox and push API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serial_test::serial;
    use tower::util::ServiceExt;

    use huddle::notify::{find_push_subscriptions_for_user, insert_inbox_message};

    use crate::test_utils::{body_to_json, body_to_string, seed_users, test_app};

    /// Tests the roster is empty on a new database
    #[tokio::test]
    #[serial]
    async fn it_lists_no_users_initially() {
        let test = test_app().await;

        let response = test
            .router
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, "[]");
    }

    /// Tests adding a user and reading the roster back
    #[tokio::test]
    #[serial]
    async fn it_adds_a_user() {
        let test = test_app().await;

        let response = test
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "id": "dee",
                            "name": "Dee",
                            "email": "dee@example.com"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = test
            .router
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body[0]["id"], "dee");
        assert_eq!(body[0]["email"], "dee@example.com");
    }

    /// Tests adding a user with a blank name returns 400
    #[tokio::test]
    #[serial]
    async fn it_returns_400_for_blank_name() {
        let test = test_app().await;

        let response = test
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"name": " ", "email": "x@example.com"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["kind"], "invalid_user");
    }

    /// Tests registering an id or email twice returns 409
    #[tokio::test]
    #[serial]
    async fn it_returns_409_for_duplicate_user() {
        let test = test_app().await;
        seed_users(&test.db).await;

        for payload in [
            serde_json::json!({"id": "ann", "name": "Another Ann", "email": "ann2@example.com"}),
            serde_json::json!({"id": "ann2", "name": "Ann Again", "email": "ann@example.com"}),
        ] {
            let response = test
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/users")
                        .method("POST")
                        .header("content-type", "application/json")
                        .body(Body::from(payload.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::CONFLICT);
            let body = body_to_json(response.into_body()).await;
            assert_eq!(body["kind"], "duplicate_user");
            assert_eq!(body["recovery"], "fix_input");
        }
    }

    /// Tests adding a user without an email returns 422
    #[tokio::test]
    #[serial]
    async fn it_returns_422_for_missing_email() {
        let test = test_app().await;

        let response = test
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::json!({"name": "Dee"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Missing required field should return 422 (validation error)
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    /// Tests reading a user's inbox
    #[tokio::test]
    #[serial]
    async fn it_reads_the_inbox() {
        let test = test_app().await;
        seed_users(&test.db).await;
        insert_inbox_message(&test.db, "ann", "olivia", "See you at 9")
            .await
            .unwrap();

        let response = test
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/inbox/ann")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body[0]["sender_id"], "olivia");
        assert_eq!(body[0]["body"], "See you at 9");
    }

    /// Tests the inbox of an unknown user returns 404
    #[tokio::test]
    #[serial]
    async fn it_returns_404_for_unknown_inbox() {
        let test = test_app().await;

        let response = test
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/inbox/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests registering a push subscription for a user
    #[tokio::test]
    #[serial]
    async fn it_subscribes_to_push_notifications() {
        let test = test_app().await;
        seed_users(&test.db).await;

        let response = test
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/push/subscribe")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "user_id": "ann",
                            "endpoint": "https://example.com/push",
                            "keys": {
                                "p256dh": "test-p256dh-key",
                                "auth": "test-auth-key"
                            }
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("\"success\":true"));

        let subscriptions = find_push_subscriptions_for_user(&test.db, "ann")
            .await
            .unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].p256dh, "test-p256dh-key");
    }

    /// Tests push subscription returns 400 for a missing key
    #[tokio::test]
    #[serial]
    async fn it_returns_400_for_missing_auth_key() {
        let test = test_app().await;
        seed_users(&test.db).await;

        let response = test
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/push/subscribe")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "user_id": "ann",
                            "endpoint": "https://example.com/push",
                            "keys": {
                                "p256dh": "test-p256dh-key"
                            }
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
