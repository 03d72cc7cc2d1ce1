//! Identity Toolkit adapter over a mock server, and the session context.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neuracare_core::session::{
    AuthFault, AuthForm, AuthMode, Credentials, IdentityProvider, IdentityToolkitProvider,
    Session, SessionContext, SessionState,
};

fn error_reply(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": {"code": 400, "message": message, "errors": []}
    }))
}

fn account_reply(uid: &str, email: &str, display_name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": uid,
        "email": email,
        "displayName": display_name,
        "idToken": "id-token",
        "refreshToken": "refresh-token",
        "expiresIn": "3600"
    }))
}

#[tokio::test]
async fn sign_in_publishes_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .and(query_param("key", "web-key"))
        .and(body_partial_json(json!({
            "email": "maya@example.com",
            "password": "hunter22",
            "returnSecureToken": true
        })))
        .respond_with(account_reply("u-1", "maya@example.com", "Maya Lin"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = IdentityToolkitProvider::new(&server.uri(), "web-key");
    let mut ctx = SessionContext::new();
    ctx.observe(&provider);
    assert!(ctx.sync());
    assert_eq!(ctx.state(), &SessionState::SignedOut);

    let session = provider
        .sign_in(&Credentials::new(" maya@example.com ", "hunter22"))
        .await
        .unwrap();
    assert_eq!(session.uid, "u-1");
    assert_eq!(session.greeting_name(), Some("Maya"));
    assert_eq!(provider.id_token().as_deref(), Some("id-token"));

    assert!(ctx.sync());
    assert_eq!(ctx.session(), Some(&session));

    provider.sign_out().await.unwrap();
    assert!(ctx.sync());
    assert_eq!(ctx.state(), &SessionState::SignedOut);
    assert_eq!(provider.id_token(), None);
}

#[tokio::test]
async fn provider_error_codes_map_to_faults() {
    let cases = [
        ("signInWithPassword", "INVALID_LOGIN_CREDENTIALS", AuthFault::InvalidCredentials),
        ("signInWithPassword", "EMAIL_NOT_FOUND", AuthFault::InvalidCredentials),
        ("signUp", "EMAIL_EXISTS", AuthFault::EmailAlreadyInUse),
        (
            "signUp",
            "WEAK_PASSWORD : Password should be at least 6 characters",
            AuthFault::WeakPassword,
        ),
        ("signUp", "INVALID_EMAIL", AuthFault::InvalidEmail),
        ("signUp", "TOO_MANY_ATTEMPTS_TRY_LATER", AuthFault::Unknown),
    ];

    for (endpoint, message, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/accounts:{endpoint}")))
            .respond_with(error_reply(message))
            .mount(&server)
            .await;

        let provider = IdentityToolkitProvider::new(&server.uri(), "web-key");
        let credentials = Credentials::new("maya@example.com", "pw");
        let fault = match endpoint {
            "signUp" => provider.sign_up(&credentials).await,
            _ => provider.sign_in(&credentials).await,
        }
        .unwrap_err();
        assert_eq!(fault, expected, "{message}");
        assert_eq!(*provider.subscribe().borrow(), None);
    }
}

#[tokio::test]
async fn unreadable_error_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let provider = IdentityToolkitProvider::new(&server.uri(), "web-key");
    let fault = provider
        .sign_in(&Credentials::new("maya@example.com", "hunter22"))
        .await
        .unwrap_err();
    assert_eq!(fault, AuthFault::Unknown);
    assert_eq!(fault.to_string(), "An unexpected error occurred. Please try again.");
}

#[tokio::test]
async fn form_shows_fault_and_keeps_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(error_reply("EMAIL_EXISTS"))
        .mount(&server)
        .await;

    let provider = IdentityToolkitProvider::new(&server.uri(), "web-key");
    let mut form = AuthForm::new();
    form.toggle_mode();
    assert_eq!(form.mode(), AuthMode::SignUp);
    form.email = "maya@example.com".to_string();
    form.password = "hunter22".to_string();

    let fault = form.submit(&provider).await.unwrap_err();
    assert_eq!(fault, AuthFault::EmailAlreadyInUse);
    assert_eq!(form.error(), Some(AuthFault::EmailAlreadyInUse));
    assert_eq!(
        form.error().unwrap().to_string(),
        "An account with this email already exists. Please sign in."
    );
    assert_eq!(form.password, "hunter22");
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn form_sign_up_success_clears_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(account_reply("u-2", "sam@example.com", ""))
        .mount(&server)
        .await;

    let provider = IdentityToolkitProvider::new(&server.uri(), "web-key");
    let mut form = AuthForm::new();
    form.toggle_mode();
    form.email = "sam@example.com".to_string();
    form.password = "correct horse".to_string();

    let session = form.submit(&provider).await.unwrap();
    assert_eq!(
        session,
        Session {
            uid: "u-2".to_string(),
            email: Some("sam@example.com".to_string()),
            display_name: None,
        }
    );
    assert_eq!(session.greeting_name(), Some("sam"));
    assert!(form.password.is_empty());
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn context_waits_for_first_value() {
    let provider = IdentityToolkitProvider::new("http://127.0.0.1:1", "web-key");
    let mut ctx = SessionContext::new();
    assert_eq!(ctx.state(), &SessionState::Uninitialized);
    assert!(!ctx.is_resolved());

    ctx.observe(&provider);
    assert_eq!(ctx.state(), &SessionState::Observing);
    assert!(!ctx.is_resolved());

    assert!(ctx.changed().await);
    assert!(ctx.is_resolved());
    assert_eq!(ctx.session(), None);

    ctx.unsubscribe();
    assert_eq!(ctx.state(), &SessionState::Uninitialized);
    assert!(!ctx.sync());
}
