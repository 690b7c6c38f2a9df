mod common;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use serde_json::json;

// ── Health & public paths ───────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/api/customers")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "status": "error", "message": "authentication token not found" })
    );
}

#[tokio::test]
async fn garbage_token_is_invalid() {
    let app = common::spawn_app().await;

    let (body, status) = app.get_auth("/api/customers", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "authentication token invalid");
}

#[tokio::test]
async fn non_bearer_header_is_not_found() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/api/customers"))
        .header(AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "authentication token not found");
}

// ── Registration & login ────────────────────────────────────────

#[tokio::test]
async fn register_and_login() {
    let app = common::spawn_app().await;

    let (body, status) = app.register("Ada", "ada@example.com", common::PASSWORD).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"].get("password_hash").is_none());

    let (body, status) = app.login("ada@example.com", common::PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "Bearer");
    let token = body["data"]["token"].as_str().unwrap();

    let (body, status) = app.get_auth("/api/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");
}

#[tokio::test]
async fn register_validation_errors_list_fields() {
    let app = common::spawn_app().await;

    let (body, status) = app.register("", "not-an-email", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    let fields: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let app = common::spawn_app().await;
    app.register("Ada", "ada@example.com", common::PASSWORD).await;

    let (_, status) = app.register("Ada", "ada@example.com", common::PASSWORD).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_401_then_throttled() {
    let app = common::spawn_app().await;
    app.register("Ada", "ada@example.com", common::PASSWORD).await;

    for _ in 0..5 {
        let (_, status) = app.login("ada@example.com", "wrong-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (_, status) = app.login("ada@example.com", common::PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn login_sets_session_cookie_that_authenticates() {
    let app = common::spawn_app().await;
    app.register("Ada", "ada@example.com", common::PASSWORD).await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "ada@example.com", "password": common::PASSWORD }))
        .send()
        .await
        .unwrap();
    let cookie = resp.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let resp = app
        .client
        .get(app.url("/api/auth/me"))
        .header(COOKIE, pair)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_token_as_expired() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (_, status) = app.post_auth("/api/auth/logout", &token, &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (body, status) = app.get_auth("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "authentication token expired");
}

#[tokio::test]
async fn password_change_ends_sessions() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (_, status) = app
        .put_auth(
            "/api/users/me/password",
            &token,
            &json!({ "current_password": common::PASSWORD, "new_password": "another-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.get_auth("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, status) = app.login("ada@example.com", "another-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_to_taken_email_is_conflict() {
    let app = common::spawn_app().await;
    app.register("Grace", "grace@example.com", common::PASSWORD).await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (_, status) = app
        .put_auth(
            "/api/users/me",
            &token,
            &json!({ "name": "Ada", "email": "grace@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (body, status) = app
        .put_auth(
            "/api/users/me",
            &token,
            &json!({ "name": "Ada Lovelace", "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada Lovelace");
}

// ── Customers ───────────────────────────────────────────────────

#[tokio::test]
async fn customer_crud_round() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (body, status) = app
        .create_customer(
            &token,
            &[("name", "Grace"), ("email", "grace@example.com"), ("phone", "555-0100")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["type"], "Regular");
    assert!(body["data"]["image_url"].is_null());
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (body, status) = app.get_auth(&format!("/api/customers/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Grace");

    let (body, status) = app
        .put_auth(
            &format!("/api/customers/{id}"),
            &token,
            &json!({ "name": "Grace Hopper", "email": "grace@example.com", "type": "VIP" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Grace Hopper");
    assert_eq!(body["data"]["type"], "VIP");

    let (body, _) = app.get_auth("/api/customers", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, status) = app.delete_auth(&format!("/api/customers/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (_, status) = app.get_auth(&format!("/api/customers/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_customer_is_rejected() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (body, status) = app
        .create_customer(
            &token,
            &[("name", "Grace"), ("email", "nope"), ("phone", "123456789012345678901")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (body, _) = app.get_auth("/api/customers", &token).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_customer_id_is_a_json_400() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (body, status) = app.get_auth("/api/customers/not-a-uuid", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());

    let (body, status) = app.delete_auth("/api/customers/not-a-uuid", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn other_users_records_are_invisible() {
    let app = common::spawn_app().await;
    let ada = app.sign_up("Ada", "ada@example.com").await;
    let grace = app.sign_up("Grace", "grace@example.com").await;

    let (body, _) = app
        .create_customer(&ada, &[("name", "Alan"), ("email", "alan@example.com"), ("type", "VIP")], None)
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, status) = app.get_auth(&format!("/api/customers/{id}"), &grace).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, missing) = app
        .get_auth(&format!("/api/customers/{}", uuid::Uuid::new_v4()), &grace)
        .await;
    assert_eq!(missing, StatusCode::NOT_FOUND);

    let (_, status) = app
        .put_auth(
            &format!("/api/customers/{id}"),
            &grace,
            &json!({ "name": "Mallory", "email": "m@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, status) = app.delete_auth(&format!("/api/customers/{id}"), &grace).await;
    assert_eq!(status, StatusCode::OK);

    let (body, _) = app.get_auth("/api/customers", &grace).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    let (body, _) = app.get_auth("/api/customers/chart", &grace).await;
    assert_eq!(body["data"], json!({}));

    let (body, status) = app.get_auth(&format!("/api/customers/{id}"), &ada).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alan");
}

#[tokio::test]
async fn image_lifecycle() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (body, status) = app
        .create_customer(
            &token,
            &[("name", "Grace"), ("email", "grace@example.com")],
            Some(("photo.png", b"first")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let first = body["data"]["image_url"].as_str().unwrap().to_string();
    assert_eq!(first, format!("cover_{id}.png"));
    assert!(app.stored(&first).is_file());

    // Stored images are served without a token.
    let resp = app
        .client
        .get(app.url(&format!("/uploads/{first}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"first");

    let (body, status) = app.upload_image(&token, &id, Some(("new.jpg", b"second"))).await;
    assert_eq!(status, StatusCode::OK);
    let second = body["data"]["image_url"].as_str().unwrap().to_string();
    assert_ne!(second, first);
    assert!(second.ends_with(&format!("_{id}.jpg")));
    assert!(!app.stored(&first).exists());
    assert!(app.stored(&second).is_file());

    let (_, status) = app.upload_image(&token, &id, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, status) = app.delete_auth(&format!("/api/customers/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.stored(&second).exists());
}

#[tokio::test]
async fn empty_image_part_is_ignored_on_create() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    let (body, status) = app
        .create_customer(
            &token,
            &[("name", "Grace"), ("email", "grace@example.com")],
            Some(("empty.png", b"")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["image_url"].is_null());
    assert!(!app.upload_dir.exists());
}

// ── Dashboard ───────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_aggregates() {
    let app = common::spawn_app().await;
    let token = app.sign_up("Ada", "ada@example.com").await;

    for (i, t) in ["VIP", "vip", "Regular", "Regular"].into_iter().enumerate() {
        let email = format!("c{i}@example.com");
        let (_, status) = app
            .create_customer(&token, &[("name", "C"), ("email", email.as_str()), ("type", t)], None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (body, status) = app.get_auth("/api/dashboard", &token).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_customers"], 4);
    assert_eq!(data["vip_count"], 2);
    assert_eq!(data["new_member_count"], 2);
    assert_eq!(data["chart_data"], json!({ "VIP": 1, "vip": 1, "Regular": 2 }));
    assert_eq!(data["recent_customers"].as_array().unwrap().len(), 4);

    let (body, _) = app.get_auth("/api/customers/chart", &token).await;
    assert_eq!(body["data"], data["chart_data"]);
}
