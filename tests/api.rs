use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use devconnect::{app::build_app, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        Self {
            router: build_app(AppState::for_tests()),
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header("x-auth-token", t);
        }
        let body = match body {
            Some(v) => {
                req = req.header(CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = self
            .router
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn register(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/users/create",
                None,
                Some(json!({ "name": name, "email": email, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_profile(&self, token: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/profile",
                Some(token),
                Some(json!({ "status": "Developer", "skills": "rust, sql" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["profile"].clone()
    }
}

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::new();
    let res = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn register_login_and_fetch_current_user() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;

    let (status, body) = app.call(Method::GET, "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["name"], "Ada");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth",
            None,
            Some(json!({ "email": "ada@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/create",
            None,
            Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "errors": [{ "msg": "User already exists" }] })
    );
}

#[tokio::test]
async fn login_errors_do_not_reveal_which_part_failed() {
    let app = TestApp::new();
    app.register("Ada", "ada@example.com").await;

    let wrong_password = app
        .call(
            Method::POST,
            "/api/auth",
            None,
            Some(json!({ "email": "ada@example.com", "password": "not-the-password" })),
        )
        .await;
    let unknown_email = app
        .call(
            Method::POST,
            "/api/auth",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.1["errors"][0]["msg"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new();
    let routes = [
        (Method::GET, "/api/auth"),
        (Method::GET, "/api/profile/me"),
        (Method::DELETE, "/api/profile"),
        (Method::GET, "/api/posts"),
        (Method::DELETE, "/api/profile/experience/x"),
    ];
    for (method, uri) in routes {
        let (status, body) = app.call(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["errors"][0]["msg"], "No token, authorization failed.");

        let (status, body) = app.call(method, uri, Some("tampered.token.value"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["errors"][0]["msg"], "Token is not valid.");
    }
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let app = TestApp::new();
    let res = app
        .router
        .clone()
        .oneshot(
            Request::post("/api/users/create")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errors"][0]["msg"].is_string());
}

#[tokio::test]
async fn profile_submission_validates_and_upserts() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;

    let (status, body) = app
        .call(Method::POST, "/api/profile", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let created = app.create_profile(&token).await;
    assert_eq!(created["skills"], json!(["rust", "sql"]));

    let (status, body) = app
        .call(
            Method::POST,
            "/api/profile",
            Some(&token),
            Some(json!({ "status": "Lead", "skills": "rust", "twitter": "https://twitter.com/ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["id"], created["id"]);
    assert_eq!(body["profile"]["status"], "Lead");
    assert_eq!(body["profile"]["social"]["twitter"], "https://twitter.com/ada");

    let (_, body) = app.call(Method::GET, "/api/profile", None, None).await;
    let profiles = body["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["user"]["name"], "Ada");

    let user_id = profiles[0]["user_id"].as_str().unwrap();
    let (status, body) = app
        .call(Method::GET, &format!("/api/profile/user/{user_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["status"], "Lead");

    let (status, _) = app
        .call(Method::GET, "/api/profile/user/not-an-id", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn experience_and_education_round_trip() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    app.create_profile(&token).await;

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/profile/experience",
            Some(&token),
            Some(json!({ "title": "Engineer", "company": "Initech", "from": "2018-04-01", "current": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let exp = &body["profile"]["experience"];
    assert_eq!(exp.as_array().unwrap().len(), 1);
    assert_eq!(exp[0]["from"], "2018-04-01");
    let exp_id = exp[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/profile/experience/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["msg"], "Entry not found");

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/profile/experience/{exp_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["experience"], json!([]));

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/profile/education",
            Some(&token),
            Some(json!({ "school": "MIT" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/profile/education",
            Some(&token),
            Some(json!({ "school": "MIT", "degree": "BSc", "fieldofstudy": "CS", "from": "2010-09-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let edu_id = body["profile"]["education"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/profile/education/{edu_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["education"], json!([]));
}

#[tokio::test]
async fn experience_without_profile_is_not_found() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    let (status, body) = app
        .call(
            Method::PUT,
            "/api/profile/experience",
            Some(&token),
            Some(json!({ "title": "Engineer", "company": "Initech", "from": "2018-04-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["msg"], "Profile does not exist");
}

#[tokio::test]
async fn deleting_profile_removes_user() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    app.create_profile(&token).await;

    let (status, body) = app.call(Method::DELETE, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Profile successfully removed");

    let (status, _) = app.call(Method::GET, "/api/profile/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::GET, "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the token still verifies, but its user is gone
    let (status, body) = app
        .call(
            Method::POST,
            "/api/profile",
            Some(&token),
            Some(json!({ "status": "Developer", "skills": "rust" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["msg"], "User not found");
    let (_, body) = app.call(Method::GET, "/api/profile", None, None).await;
    assert_eq!(body["profiles"], json!([]));
}

#[tokio::test]
async fn posts_are_newest_first_and_owner_scoped() {
    let app = TestApp::new();
    let ada = app.register("Ada", "ada@example.com").await;
    let eve = app.register("Eve", "eve@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&ada),
            Some(json!({ "text": "first", "date": "2024-01-01T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["post"]["name"], "Ada");
    let p1 = body["post"]["id"].as_str().unwrap().to_string();

    let (_, body) = app
        .call(
            Method::POST,
            "/api/posts",
            Some(&ada),
            Some(json!({ "text": "second", "date": "2024-02-01T00:00:00Z" })),
        )
        .await;
    let p2 = body["post"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.call(Method::GET, "/api/posts", Some(&eve), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec![p2.clone(), p1.clone()]);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/posts/{p1}"), Some(&eve), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(Method::GET, &format!("/api/posts/{p1}"), Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["text"], "first");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/posts/{p1}"), Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::GET, "/api/posts/not-an-id", Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["msg"], "Post not found");
}

#[tokio::test]
async fn empty_post_text_is_rejected() {
    let app = TestApp::new();
    let token = app.register("Ada", "ada@example.com").await;
    let (status, body) = app
        .call(Method::POST, "/api/posts", Some(&token), Some(json!({ "text": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["param"], "text");
}
