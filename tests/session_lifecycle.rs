mod common;

use common::{record, spawn_app, spawn_app_with};
use mockito::Matcher;
use serde_json::json;
use wellstride::auth::{AuthError, LoginRequest, RedirectOutcome, SignupForm, Status};
use wellstride::client::RequestOptions;
use wellstride::models::{Credential, SessionRecord};
use wellstride::ui::Navigation;

/// Test that a sign-in response with a token is persisted as-is and authenticates.
#[tokio::test]
async fn test_login_persists_token_response() {
    let mut app = spawn_app().await;
    let mock = app
        .server
        .mock("POST", "/api/auth/signin")
        .match_body(Matcher::Json(json!({"username": "jane", "password": "secret"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "token": "abc123",
                "id": 4,
                "username": "jane",
                "email": "jane@example.com",
                "roles": ["ROLE_USER"]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let record = app
        .state
        .auth
        .login(&LoginRequest::new("jane", "secret"))
        .await
        .unwrap()
        .unwrap();
    mock.assert_async().await;

    assert_eq!(record.credential(), &Credential::from("abc123"));
    assert_eq!(record.username(), Some("jane"));
    assert!(!record.is_admin());

    let state = app.state.auth.state();
    assert!(state.is_authenticated);
    assert_eq!(state.status, Status::Succeeded);
    assert_eq!(state.error, None);
    assert_eq!(state.user.as_ref(), Some(&record));
    assert_eq!(app.state.session.read().await, Some(record));
    assert!(app.history.entries().is_empty());
}

/// Test that the server's message becomes the form error and nothing is stored.
#[tokio::test]
async fn test_login_failure_uses_server_message() {
    let mut app = spawn_app().await;
    let _mock = app
        .server
        .mock("POST", "/api/auth/signin")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Bad credentials","status":false}"#)
        .create_async()
        .await;

    let err = app
        .state
        .auth
        .login(&LoginRequest::new("jane", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected(ref m) if m == "Bad credentials"));

    let state = app.state.auth.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.user, None);
    assert_eq!(state.status, Status::Failed);
    assert_eq!(state.error.as_deref(), Some("Bad credentials"));

    // sign-in is exempt: no forced logout
    assert!(app.history.entries().is_empty());
    assert_eq!(app.stored_raw().await, None);

    app.state.auth.clear_error();
    assert_eq!(app.state.auth.state().status, Status::Idle);
    assert_eq!(app.state.auth.state().error, None);
}

#[tokio::test]
async fn test_login_without_token_is_not_persisted() {
    let mut app = spawn_app().await;
    let _mock = app
        .server
        .mock("POST", "/api/auth/signin")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Signed in"}"#)
        .create_async()
        .await;

    let record = app
        .state
        .auth
        .login(&LoginRequest::new("jane", "secret"))
        .await
        .unwrap();
    assert_eq!(record, None);

    let state = app.state.auth.state();
    assert!(state.is_authenticated);
    assert_eq!(state.user, None);
    assert_eq!(app.stored_raw().await, None);
}

/// Test that registering never signs the user in.
#[tokio::test]
async fn test_register_success_does_not_authenticate() {
    let mut app = spawn_app().await;
    let mock = app
        .server
        .mock("POST", "/api/auth/signup")
        .match_body(Matcher::Json(json!({
            "username": "jane",
            "email": "jane@example.com",
            "password": "secret"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"User registered successfully!"}"#)
        .create_async()
        .await;

    let form = SignupForm {
        username: "jane".to_string(),
        email: "jane@example.com".to_string(),
        password: "secret".to_string(),
        confirm_password: "secret".to_string(),
    };
    app.state.auth.register(&form).await.unwrap();
    mock.assert_async().await;

    let state = app.state.auth.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.status, Status::Succeeded);
    assert_eq!(app.stored_raw().await, None);
}

#[tokio::test]
async fn test_register_failure_populates_error() {
    let mut app = spawn_app().await;
    let _mock = app
        .server
        .mock("POST", "/api/auth/signup")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Error: Username is already taken!"}"#)
        .create_async()
        .await;

    let form = SignupForm {
        username: "jane".to_string(),
        email: "jane@example.com".to_string(),
        password: "secret".to_string(),
        confirm_password: "secret".to_string(),
    };
    assert!(app.state.auth.register(&form).await.is_err());

    let state = app.state.auth.state();
    assert_eq!(state.status, Status::Failed);
    assert_eq!(state.error.as_deref(), Some("Error: Username is already taken!"));
}

#[tokio::test]
async fn test_mismatched_passwords_never_reach_the_server() {
    let mut app = spawn_app().await;
    let mock = app
        .server
        .mock("POST", "/api/auth/signup")
        .expect(0)
        .create_async()
        .await;

    let form = SignupForm {
        username: "jane".to_string(),
        email: "jane@example.com".to_string(),
        password: "secret".to_string(),
        confirm_password: "secret!".to_string(),
    };
    let err = app.state.auth.register(&form).await.unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");
    mock.assert_async().await;
}

/// Test that a 401 from a non-exempt path clears the store and the in-memory
/// session, and forces a full navigation to the login page.
#[tokio::test]
async fn test_unauthorized_forces_logout() {
    let mut app = spawn_app().await;
    app.sign_in_as(&record("abc123", "jane", &["ROLE_USER"])).await;
    let mut rx = app.state.auth.subscribe();
    let _mock = app
        .server
        .mock("GET", "/api/auth/user")
        .with_status(401)
        .create_async()
        .await;

    let err = app
        .state
        .api
        .get("/api/auth/user", RequestOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    assert_eq!(app.stored_raw().await, None);
    assert_eq!(
        app.history.entries(),
        vec![Navigation::Location("/login".to_string())]
    );
    assert!(!app.state.auth.is_authenticated());
    assert_eq!(app.state.auth.state().user, None);
    assert!(!rx.borrow_and_update().is_authenticated);
}

/// Test that after a forced logout the next external login is processed
/// instead of being treated as an existing session.
#[tokio::test]
async fn test_redirect_after_forced_logout_fetches_profile() {
    let mut app = spawn_app().await;
    app.sign_in_as(&record("abc123", "jane", &["ROLE_USER"])).await;
    let _expired = app
        .server
        .mock("GET", "/api/progress")
        .with_status(401)
        .create_async()
        .await;
    let profile = app
        .server
        .mock("GET", "/api/auth/user")
        .match_header("authorization", "Bearer new")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"username":"jane","roles":["ROLE_USER"]}"#)
        .create_async()
        .await;

    assert!(app
        .state
        .api
        .get("/api/progress", RequestOptions::new())
        .await
        .is_err());

    let outcome = app
        .state
        .auth
        .complete_external_redirect("/oauth2/redirect#token=new")
        .await
        .unwrap();
    profile.assert_async().await;
    assert!(matches!(outcome, RedirectOutcome::Authenticated(_)));
    assert_eq!(
        app.state.session.read().await.map(|r| r.credential().clone()),
        Some(Credential::from("new"))
    );
}

#[tokio::test]
async fn test_exempt_unauthorized_keeps_session() {
    let mut app = spawn_app().await;
    let existing = record("abc123", "jane", &["ROLE_USER"]);
    app.sign_in_as(&existing).await;
    for path in ["/api/auth/signin", "/api/auth/forgot-password"] {
        let _mock = app
            .server
            .mock("POST", path)
            .with_status(401)
            .create_async()
            .await;
        let result = app.state.api.post(path, &json!({}), RequestOptions::new()).await;
        assert!(result.unwrap_err().is_unauthorized());
    }

    assert_eq!(app.state.session.read().await, Some(existing));
    assert!(app.history.entries().is_empty());
}

/// Test that other failures never log the user out.
#[tokio::test]
async fn test_server_error_keeps_session() {
    let mut app = spawn_app().await;
    let existing = record("abc123", "jane", &[]);
    app.sign_in_as(&existing).await;
    let _mock = app
        .server
        .mock("GET", "/api/progress/dashboard")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = app
        .state
        .api
        .get("/api/progress/dashboard", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(app.state.session.read().await, Some(existing));
    assert!(app.history.entries().is_empty());
}

/// Test that both clients send exactly one bearer prefix.
#[tokio::test]
async fn test_single_bearer_prefix_on_both_clients() {
    let mut app = spawn_app().await;
    let mock = app
        .server
        .mock("GET", "/api/ping")
        .match_header("authorization", "Bearer abc123")
        .with_status(200)
        .expect(4)
        .create_async()
        .await;

    for stored in ["abc123", "Bearer abc123"] {
        app.state.session.write(&SessionRecord::new(stored)).await.unwrap();
        app.state.api.get("/api/ping", RequestOptions::new()).await.unwrap();
        app.state
            .direct
            .get("/api/ping", RequestOptions::new())
            .await
            .unwrap();
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_without_session() {
    let mut app = spawn_app().await;
    let mock = app
        .server
        .mock("GET", "/api/ping")
        .match_header("authorization", Matcher::Missing)
        .match_header("content-type", "application/json")
        .with_status(200)
        .create_async()
        .await;

    app.state.direct.get("/api/ping", RequestOptions::new()).await.unwrap();
    mock.assert_async().await;
}

/// Test that extra headers are merged over the defaults, and absolute URLs are used as-is.
#[tokio::test]
async fn test_direct_client_headers_and_absolute_urls() {
    let mut app = spawn_app().await;
    app.state.session.write(&SessionRecord::new("abc123")).await.unwrap();
    let mock = app
        .server
        .mock("GET", "/api/ping")
        .match_header("authorization", "Bearer abc123")
        .match_header("x-request-source", "cli")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let url = format!("{}/api/ping", app.server.url());
    let options = RequestOptions::new().header("x-request-source", "cli").unwrap();
    let body = app.state.direct.get(&url, options).await.unwrap();
    assert_eq!(body.into_value(), json!({"ok": true}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_direct_client_text_and_error_bodies() {
    let mut app = spawn_app().await;
    let _mock = app
        .server
        .mock("DELETE", "/api/goals/1")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("Goal deleted")
        .create_async()
        .await;
    let _mock = app
        .server
        .mock("GET", "/api/empty-failure")
        .with_status(503)
        .create_async()
        .await;

    let body = app
        .state
        .direct
        .delete("/api/goals/1", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(body, wellstride::client::ResponseBody::Text("Goal deleted".to_string()));

    let err = app
        .state
        .direct
        .get("/api/empty-failure", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 503");
}

/// Test that the direct client leaves a 401 to the caller by default.
#[tokio::test]
async fn test_direct_client_does_not_force_logout() {
    let mut app = spawn_app().await;
    let existing = record("abc123", "jane", &[]);
    app.sign_in_as(&existing).await;
    let _mock = app
        .server
        .mock("GET", "/api/goals")
        .with_status(401)
        .create_async()
        .await;

    assert!(app.state.goals.list().await.is_err());
    assert_eq!(app.state.session.read().await, Some(existing));
    assert!(app.history.entries().is_empty());
}

#[tokio::test]
async fn test_direct_client_can_opt_into_forced_logout() {
    let mut app = spawn_app_with(true).await;
    app.sign_in_as(&record("abc123", "jane", &[])).await;
    let _mock = app
        .server
        .mock("GET", "/api/goals")
        .with_status(401)
        .create_async()
        .await;

    assert!(app.state.goals.list().await.is_err());
    assert_eq!(app.stored_raw().await, None);
    assert_eq!(app.history.last(), Some(Navigation::Location("/login".to_string())));
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let app = spawn_app().await;
    app.sign_in_as(&record("abc123", "jane", &[])).await;

    app.state.auth.logout().await;
    app.state.auth.logout().await;

    assert_eq!(app.stored_raw().await, None);
    let state = app.state.auth.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.status, Status::Idle);
    assert_eq!(
        *app.notifier.successes.lock().unwrap(),
        vec!["Logged out successfully".to_string(); 2]
    );
}

/// Test that observers see every state change.
#[tokio::test]
async fn test_subscribers_see_logout() {
    let app = spawn_app().await;
    app.sign_in_as(&record("abc123", "jane", &[])).await;
    let mut rx = app.state.auth.subscribe();
    assert!(rx.borrow_and_update().is_authenticated);

    app.state.auth.logout().await;
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated);
}

#[tokio::test]
async fn test_malformed_stored_session_is_ignored() {
    use wellstride::store::Storage;

    let app = spawn_app().await;
    app.storage.set_item("user", "{not json").await.unwrap();
    assert_eq!(app.state.session.read().await, None);
    assert!(!app.state.auth.restore().await.is_authenticated);
}
