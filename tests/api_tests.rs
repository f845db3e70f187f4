use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bookstore::api::AppState;
use bookstore::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Router, Arc<AppState>) {
    let db_path =
        std::env::temp_dir().join(format!("bookstore-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.argon2_memory_cost_kib = 8;
    config.security.argon2_time_cost = 1;
    config.scheduler.enabled = false;

    let state = bookstore::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    (bookstore::api::router(state.clone()).await, state)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Logs in and returns the `name=value` pair of the session cookie.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/authenticate",
            None,
            &json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "UP");
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (app, _) = spawn_app().await;

    for uri in ["/api/account", "/api/authors", "/api/books", "/api/metrics"] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/account", Some("id=not-a-session")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_flow() {
    let (app, state) = spawn_app().await;

    let registration = json!({
        "login": "johndoe",
        "password": "johndoe",
        "firstName": "John",
        "lastName": "Doe",
        "email": "john.doe@localhost",
        "langKey": "en"
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/register", None, &registration))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["login"], "johndoe");
    assert_eq!(body["data"]["activated"], false);
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("activationKey").is_none());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/register", None, &registration))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/authenticate",
            None,
            &json!({ "username": "johndoe", "password": "johndoe" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let key = state
        .store()
        .user_repo()
        .find_by_login("johndoe")
        .await
        .unwrap()
        .unwrap()
        .activation_key
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/activate?key=bogus", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/activate?key={key}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = login(&app, "johndoe", "johndoe").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/account", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["login"], "johndoe");
    assert_eq!(body["data"]["activated"], true);
    assert_eq!(body["data"]["authorities"], json!(["ROLE_USER"]));
    assert_eq!(body["data"]["firstName"], "John");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/logout",
            Some(&cookie),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/account", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation() {
    let (app, _) = spawn_app().await;

    let invalid = [
        json!({ "login": "", "password": "secret", "email": "a@localhost" }),
        json!({ "login": "john doe", "password": "secret", "email": "a@localhost" }),
        json!({ "login": "john", "password": "abc", "email": "a@localhost" }),
        json!({ "login": "john", "password": "secret", "email": "localhost" }),
    ];

    for payload in invalid {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/register", None, &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
    }
}

#[tokio::test]
async fn test_password_reset_flow() {
    let (app, state) = spawn_app().await;

    for email in ["user@localhost", "nobody@localhost"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/account/reset_password/init",
                None,
                &json!({ "email": email }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let key = state
        .store()
        .user_repo()
        .find_by_email("user@localhost")
        .await
        .unwrap()
        .unwrap()
        .reset_key
        .expect("reset key should be issued");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/reset_password/finish",
            None,
            &json!({ "key": "bogus", "newPassword": "fresh-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/reset_password/finish",
            None,
            &json!({ "key": key, "newPassword": "fresh-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "user", "fresh-password").await;
}

#[tokio::test]
async fn test_change_password() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, "user", "user").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/change_password",
            Some(&cookie),
            &json!({ "password": "x" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/account/change_password",
            Some(&cookie),
            &json!({ "password": "better-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "user", "better-password").await;
}

#[tokio::test]
async fn test_author_crud() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, "admin", "admin").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/authors",
            Some(&cookie),
            &json!({ "id": 5, "name": "Jane", "surname": "Austen" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/authors",
            Some(&cookie),
            &json!({ "name": "Jane", "surname": "Austen", "birthDate": "1775-12-16" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["birthDate"], "1775-12-16");

    let response = app
        .clone()
        .oneshot(get_request("/api/authors", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-total-count"], "1");
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/authors",
            Some(&cookie),
            &json!({ "id": id, "name": "Jane", "surname": "Austen", "description": "Novelist" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["description"], "Novelist");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/authors",
            Some(&cookie),
            &json!({ "id": 9999, "name": "No", "surname": "Body" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/authors/{id}"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/authors/{id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/authors/{id}"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_requires_existing_author() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, "user", "user").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/books",
            Some(&cookie),
            &json!({ "title": "Emma", "authorId": 4242 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/authors",
            Some(&cookie),
            &json!({ "name": "Jane", "surname": "Austen" }),
        ))
        .await
        .unwrap();
    let author_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/books",
            Some(&cookie),
            &json!({ "title": "Emma", "price": 9.5, "publicationDate": "1815-12-23", "authorId": author_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let book = body_json(response).await;
    assert_eq!(book["data"]["authorId"], author_id);

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/authors/{author_id}/books"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"][0]["title"], "Emma");

    let response = app
        .clone()
        .oneshot(get_request("/api/books/9999", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_out_of_range_catalog_requests() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, "admin", "admin").await;

    for uri in [
        "/api/authors/9223372036854775807",
        "/api/authors/9223372036854775807/books",
        "/api/books/2147483648",
    ] {
        let response = app
            .clone()
            .oneshot(get_request(uri, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["success"], false, "{uri}");
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/authors/abc", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);

    for uri in [
        "/api/authors?page=18446744073709551615&per_page=100",
        "/api/books?page=9223372036854775807",
    ] {
        let response = app
            .clone()
            .oneshot(get_request(uri, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}
