mod common;

use common::{spawn_app, POLKA_KEY};
use serde_json::{json, Value};

// --- Registration ---

#[tokio::test]
async fn register_returns_201_without_password_hash() {
    let app = spawn_app();

    let response = app.register("walt@breakingbad.com", "04234").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "walt@breakingbad.com");
    assert_eq!(body["is_chirpy_red"], false);
    assert!(body.get("id").is_some());
    assert!(body.get("hashed_password").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_returns_409_for_duplicate_email() {
    let app = spawn_app();

    assert_eq!(201, app.register("walt@breakingbad.com", "04234").await.status().as_u16());
    assert_eq!(409, app.register("walt@breakingbad.com", "other").await.status().as_u16());
}

#[tokio::test]
async fn register_returns_400_for_empty_fields() {
    let app = spawn_app();

    let test_cases = vec![("", "04234", "empty email"), ("walt@breakingbad.com", "", "empty password")];

    for (email, password, reason) in test_cases {
        let response = app.register(email, password).await;
        assert_eq!(400, response.status().as_u16(), "Should reject {}", reason);
    }
}

// --- Login ---

#[tokio::test]
async fn login_returns_both_tokens() {
    let app = spawn_app();
    let body = app.signed_in("walt@breakingbad.com", "04234").await;

    let token = body["token"].as_str().unwrap();
    let refresh_token = body["refresh_token"].as_str().unwrap();

    assert_eq!(token.split('.').count(), 3);
    assert_eq!(refresh_token.len(), 64);
    assert!(!refresh_token.contains('.'));
    assert_eq!(body["email"], "walt@breakingbad.com");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    app.register("walt@breakingbad.com", "04234").await;

    let wrong_password = app.login("walt@breakingbad.com", "wrong").await;
    let unknown_email = app.login("jesse@breakingbad.com", "04234").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["code"], b["code"]);
    assert_eq!(a["message"], b["message"]);
}

// --- Refresh / revoke ---

#[tokio::test]
async fn refresh_then_revoke_scenario() {
    let app = spawn_app();
    let login = app.signed_in("walt@breakingbad.com", "04234").await;
    let access_token = login["token"].as_str().unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, response.status().as_u16());
    let refreshed: Value = response.json().await.unwrap();
    let new_token = refreshed["token"].as_str().unwrap();
    assert_ne!(new_token, access_token);

    // The new access token works on a protected route
    let response = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", new_token))
        .json(&json!({ "email": "walt@breakingbad.com", "password": "04234" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["id"], login["id"]);

    let response = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());
    assert!(response.bytes().await.unwrap().is_empty());

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn revoking_one_session_leaves_the_other() {
    let app = spawn_app();
    let first = app.signed_in("walt@breakingbad.com", "04234").await;
    let second: Value = app
        .login("walt@breakingbad.com", "04234")
        .await
        .json()
        .await
        .unwrap();

    let first_token = first["refresh_token"].as_str().unwrap();
    let second_token = second["refresh_token"].as_str().unwrap();
    assert_ne!(first_token, second_token);

    assert_eq!(204, app.post_with_bearer("/api/revoke", first_token).await.status().as_u16());

    assert_eq!(401, app.post_with_bearer("/api/refresh", first_token).await.status().as_u16());
    assert_eq!(200, app.post_with_bearer("/api/refresh", second_token).await.status().as_u16());
}

#[tokio::test]
async fn refresh_and_revoke_reject_bad_credentials() {
    let app = spawn_app();

    for path in ["/api/refresh", "/api/revoke"] {
        let missing = app
            .client
            .post(app.url(path))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(401, missing.status().as_u16());
        let body: Value = missing.json().await.unwrap();
        assert_eq!(body["code"], "MISSING_TOKEN");

        let malformed = app
            .client
            .post(app.url(path))
            .header("Authorization", "Token abc123")
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(401, malformed.status().as_u16());
        let body: Value = malformed.json().await.unwrap();
        assert_eq!(body["code"], "MALFORMED_TOKEN");

        let unknown = app.post_with_bearer(path, "not-a-real-token").await;
        assert_eq!(401, unknown.status().as_u16());
    }
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let app = spawn_app();
    let login = app.signed_in("walt@breakingbad.com", "04234").await;

    let response = app
        .post_with_bearer("/api/refresh", login["token"].as_str().unwrap())
        .await;
    assert_eq!(401, response.status().as_u16());
}

// --- Protected routes ---

#[tokio::test]
async fn update_user_requires_access_token() {
    let app = spawn_app();
    let login = app.signed_in("walt@breakingbad.com", "04234").await;
    let body = json!({ "email": "heisenberg@breakingbad.com", "password": "losPollos" });

    let no_header = app
        .client
        .put(app.url("/api/users"))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, no_header.status().as_u16());

    let with_refresh_token = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", login["refresh_token"].as_str().unwrap()))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, with_refresh_token.status().as_u16());

    let ok = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", login["token"].as_str().unwrap()))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, ok.status().as_u16());

    assert_eq!(401, app.login("walt@breakingbad.com", "04234").await.status().as_u16());
    assert_eq!(200, app.login("heisenberg@breakingbad.com", "losPollos").await.status().as_u16());
}

// --- Payment webhook ---

#[tokio::test]
async fn polka_webhook_upgrades_user() {
    let app = spawn_app();
    let login = app.signed_in("walt@breakingbad.com", "04234").await;
    let body = json!({ "event": "user.upgraded", "data": { "user_id": login["id"] } });

    let wrong_key = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", "ApiKey wrong")
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, wrong_key.status().as_u16());

    let response = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let relogin: Value = app
        .login("walt@breakingbad.com", "04234")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(relogin["is_chirpy_red"], true);
}

#[tokio::test]
async fn polka_webhook_ignores_other_events_and_unknown_users() {
    let app = spawn_app();

    let ignored = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&json!({ "event": "user.payment_failed", "data": { "user_id": uuid::Uuid::new_v4() } }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, ignored.status().as_u16());

    let unknown = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": uuid::Uuid::new_v4() } }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, unknown.status().as_u16());
}

#[tokio::test]
async fn polka_webhook_checks_key_before_body() {
    let app = spawn_app();

    let missing_key = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, missing_key.status().as_u16());

    let wrong_key = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", "ApiKey wrong")
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, wrong_key.status().as_u16());

    let malformed = app
        .client
        .post(app.url("/api/polka/webhooks"))
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(400, malformed.status().as_u16());
}
