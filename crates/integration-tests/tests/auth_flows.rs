//! Tests for the authentication flows: login, OTP registration, Google
//! sign-in, logout, and the auth-skip guarantee.

#![allow(clippy::unwrap_used)]

use mockito::Matcher;
use secrecy::SecretString;
use serde_json::json;

use nivasity_core::UserId;

use nivasity_client::{ApiError, SessionEvent};
use nivasity_integration_tests::{
    TestContext, error_envelope, sample_user_payload, success_envelope,
};

/// Login with valid credentials persists the tokens under the fixed keys
/// and yields the normalized user.
#[tokio::test]
async fn login_persists_tokens_and_normalized_user() {
    let mut ctx = TestContext::new().await;

    let login_mock = ctx
        .server
        .mock("POST", "/auth/login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "email": "ada@unilag.edu.ng",
            "password": "correct-horse"
        })))
        .with_status(200)
        .with_body(success_envelope(json!({
            "access_token": "a",
            "refresh_token": "r",
            "user": sample_user_payload()
        })))
        .expect(1)
        .create_async()
        .await;

    let session = ctx
        .client
        .login("ada@unilag.edu.ng", &SecretString::from("correct-horse"))
        .await
        .unwrap();

    login_mock.assert_async().await;

    assert_eq!(session.user.id, UserId::new(12));
    assert_eq!(session.user.full_name(), "Ada Obi");
    assert_eq!(session.user.phone.as_ref().unwrap().as_str(), "+2348031234567");

    let (access, refresh, user) = ctx.stored_session_keys();
    assert_eq!(access.as_deref(), Some("a"));
    assert_eq!(refresh.as_deref(), Some("r"));
    assert!(user.unwrap().contains("ada@unilag.edu.ng"));

    assert!(ctx.client.is_authenticated().await);
    assert_eq!(
        ctx.client.current_user().unwrap().unwrap().id,
        UserId::new(12)
    );
}

/// A business error (wrong password) surfaces the backend's message and
/// leaves storage untouched.
#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let mut ctx = TestContext::new().await;

    let login_mock = ctx
        .server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(error_envelope("Incorrect email or password"))
        .expect(1)
        .create_async()
        .await;

    let result = ctx
        .client
        .login("ada@unilag.edu.ng", &SecretString::from("wrong"))
        .await;

    login_mock.assert_async().await;
    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    let (access, refresh, user) = ctx.stored_session_keys();
    assert_eq!((access, refresh, user), (None, None, None));
}

/// The OTP registration flow: register acks with a message, verify-otp
/// issues the session.
#[tokio::test]
async fn otp_registration_flow() {
    let mut ctx = TestContext::new().await;

    let register_mock = ctx
        .server
        .mock("POST", "/auth/register")
        .match_body(Matcher::PartialJson(json!({
            "email": "tunde@futa.edu.ng",
            "school_id": 3,
            "department_id": 41
        })))
        .with_status(200)
        .with_body(r#"{"status":"success","message":"OTP sent to tunde@futa.edu.ng"}"#)
        .expect(1)
        .create_async()
        .await;

    let verify_mock = ctx
        .server
        .mock("POST", "/auth/verify-otp")
        .match_body(Matcher::PartialJson(json!({
            "email": "tunde@futa.edu.ng",
            "code": "482913"
        })))
        .with_status(200)
        .with_body(success_envelope(json!({
            "access_token": "a2",
            "refresh_token": "r2",
            "user": {"id": 7, "email": "tunde@futa.edu.ng", "first_name": "Tunde"}
        })))
        .expect(1)
        .create_async()
        .await;

    let message = ctx
        .client
        .register(&nivasity_client::RegistrationInput {
            first_name: "Tunde".to_string(),
            last_name: "Bakare".to_string(),
            email: "tunde@futa.edu.ng".to_string(),
            phone: "08031234567".to_string(),
            password: SecretString::from("hunter2secret"),
            school_id: nivasity_core::SchoolId::new(3),
            department_id: nivasity_core::DepartmentId::new(41),
            admission_number: "190404002".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(message, "OTP sent to tunde@futa.edu.ng");

    let session = ctx
        .client
        .verify_otp("tunde@futa.edu.ng", "482913")
        .await
        .unwrap();
    assert_eq!(session.user.id, UserId::new(7));

    register_mock.assert_async().await;
    verify_mock.assert_async().await;

    let (access, refresh, _) = ctx.stored_session_keys();
    assert_eq!(access.as_deref(), Some("a2"));
    assert_eq!(refresh.as_deref(), Some("r2"));
}

/// Google sign-in exchanges the ID token for a session.
#[tokio::test]
async fn google_sign_in_installs_session() {
    let mut ctx = TestContext::new().await;

    let google_mock = ctx
        .server
        .mock("POST", "/auth/google")
        .match_body(Matcher::PartialJson(json!({ "id_token": "g-id-token" })))
        .with_status(200)
        .with_body(success_envelope(json!({
            "access_token": "ga",
            "refresh_token": "gr",
            "user": sample_user_payload()
        })))
        .expect(1)
        .create_async()
        .await;

    let session = ctx
        .client
        .login_with_google(&SecretString::from("g-id-token"))
        .await
        .unwrap();
    assert_eq!(session.access_token, "ga");

    google_mock.assert_async().await;
    assert!(ctx.client.is_authenticated().await);
}

/// Requests marked to skip authentication never carry an Authorization
/// header, and a 401 on them never triggers refresh logic.
#[tokio::test]
async fn auth_skip_requests_never_authenticate_or_refresh() {
    let mut ctx = TestContext::signed_in("stored-access", "stored-refresh").await;

    let refresh_mock = ctx
        .server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    // The header matcher fails the test if the client ever attaches a token
    let resend_mock = ctx
        .server
        .mock("POST", "/auth/resend-otp")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_body(error_envelope("OTP requests are rate limited"))
        .expect(1)
        .create_async()
        .await;

    let result = ctx.client.resend_otp("ada@unilag.edu.ng").await;

    resend_mock.assert_async().await;
    refresh_mock.assert_async().await;

    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "OTP requests are rate limited");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // The stored session was not touched
    let (access, refresh, _) = ctx.stored_session_keys();
    assert_eq!(access.as_deref(), Some("stored-access"));
    assert_eq!(refresh.as_deref(), Some("stored-refresh"));
}

/// Logout clears the session, emits `LoggedOut`, and tells the backend
/// best-effort.
#[tokio::test]
async fn logout_clears_session_and_notifies() {
    let mut ctx = TestContext::signed_in("a", "r").await;
    let mut events = ctx.client.subscribe();

    let logout_mock = ctx
        .server
        .mock("POST", "/auth/logout")
        .match_header("authorization", "Bearer a")
        .with_status(200)
        .with_body(r#"{"status":"success","message":"Signed out"}"#)
        .expect(1)
        .create_async()
        .await;

    ctx.client.logout().await.unwrap();

    logout_mock.assert_async().await;
    let (access, refresh, user) = ctx.stored_session_keys();
    assert_eq!((access, refresh, user), (None, None, None));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);
    assert!(events.try_recv().is_err());
    assert!(!ctx.client.is_authenticated().await);
}

/// Logout still clears locally when the backend is unreachable for the
/// revocation call.
#[tokio::test]
async fn logout_is_local_first_when_server_errors() {
    let mut ctx = TestContext::signed_in("a", "r").await;

    let logout_mock = ctx
        .server
        .mock("POST", "/auth/logout")
        .with_status(500)
        .with_body(error_envelope("downstream unavailable"))
        .expect(1)
        .create_async()
        .await;

    ctx.client.logout().await.unwrap();

    logout_mock.assert_async().await;
    let (access, refresh, user) = ctx.stored_session_keys();
    assert_eq!((access, refresh, user), (None, None, None));
}
