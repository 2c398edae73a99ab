//! Authentication endpoints.
//!
//! The canonical flows: email/password login, OTP-based registration
//! (register → OTP email → verify), Google sign-in with an ID token, and
//! silent token refresh. Every call here is marked auth-skip - these
//! endpoints never carry a bearer token and never trigger refresh logic.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use nivasity_core::{DepartmentId, SchoolId};

use crate::client::{ApiRequest, NivasityClient};
use crate::config::ClientConfig;
use crate::envelope::{self, Envelope};
use crate::error::ApiError;
use crate::models::user::RawUser;
use crate::session::{Session, TokenPair};

/// Session payload returned by login, OTP verification, and Google
/// sign-in. Older deployments sent `token` instead of `access_token`.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    #[serde(alias = "token")]
    access_token: String,
    refresh_token: String,
    user: RawUser,
}

impl SessionPayload {
    fn into_session(self) -> Result<Session, ApiError> {
        Ok(Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user: self.user.normalize()?,
        })
    }
}

/// Input for the registration endpoint.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Account email; the OTP is sent here.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Account password.
    pub password: SecretString,
    /// School the student belongs to.
    pub school_id: SchoolId,
    /// Department within the school.
    pub department_id: DepartmentId,
    /// Admission (matriculation) number.
    pub admission_number: String,
}

/// Exchange a refresh token for a new access token.
///
/// This is a free function on purpose: it is called from inside the 401
/// recovery path and must never re-enter the client's own dispatch logic.
#[instrument(skip_all)]
pub(crate) async fn refresh(
    http: &reqwest::Client,
    config: &ClientConfig,
    refresh_token: &str,
) -> Result<TokenPair, ApiError> {
    let response = http
        .post(config.endpoint("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: envelope::error_message(&body),
        });
    }

    let parsed: Envelope<TokenPair> = serde_json::from_str(&body)?;
    parsed.into_result(status.as_u16())
}

impl NivasityClient {
    /// Sign in with email and password. On success the session is
    /// persisted and returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message on invalid
    /// credentials, or other variants for transport/storage failures.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, ApiError> {
        let payload: SessionPayload = self
            .execute(
                ApiRequest::post(
                    "/auth/login",
                    serde_json::json!({
                        "email": email,
                        "password": password.expose_secret(),
                    }),
                )
                .skip_auth(),
            )
            .await?;

        let session = payload.into_session()?;
        self.install_session(&session).await?;
        Ok(session)
    }

    /// Create an account. The backend emails a one-time code; the session
    /// is only issued after [`Self::verify_otp`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the email
    /// is already registered or a field fails validation.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: &RegistrationInput) -> Result<String, ApiError> {
        self.execute_ack(
            ApiRequest::post(
                "/auth/register",
                serde_json::json!({
                    "first_name": input.first_name,
                    "last_name": input.last_name,
                    "email": input.email,
                    "phone": input.phone,
                    "password": input.password.expose_secret(),
                    "school_id": input.school_id,
                    "department_id": input.department_id,
                    "admission_number": input.admission_number,
                }),
            )
            .skip_auth(),
        )
        .await
    }

    /// Verify the one-time code sent during registration. On success the
    /// session is persisted and returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message on a wrong or
    /// expired code.
    #[instrument(skip(self, code), fields(email = %email))]
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Session, ApiError> {
        let payload: SessionPayload = self
            .execute(
                ApiRequest::post(
                    "/auth/verify-otp",
                    serde_json::json!({ "email": email, "code": code }),
                )
                .skip_auth(),
            )
            .await?;

        let session = payload.into_session()?;
        self.install_session(&session).await?;
        Ok(session)
    }

    /// Ask the backend to email a fresh one-time code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the email
    /// is unknown or rate limited.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn resend_otp(&self, email: &str) -> Result<String, ApiError> {
        self.execute_ack(
            ApiRequest::post(
                "/auth/resend-otp",
                serde_json::json!({ "email": email }),
            )
            .skip_auth(),
        )
        .await
    }

    /// Sign in with a Google ID token obtained from the platform's Google
    /// sign-in SDK. On success the session is persisted and returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the token
    /// is rejected.
    #[instrument(skip_all)]
    pub async fn login_with_google(&self, id_token: &SecretString) -> Result<Session, ApiError> {
        let payload: SessionPayload = self
            .execute(
                ApiRequest::post(
                    "/auth/google",
                    serde_json::json!({ "id_token": id_token.expose_secret() }),
                )
                .skip_auth(),
            )
            .await?;

        let session = payload.into_session()?;
        self.install_session(&session).await?;
        Ok(session)
    }

    /// Sign out. The server-side revocation is best-effort; the local
    /// session is always cleared and [`crate::SessionEvent::LoggedOut`] is
    /// broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Store`] only if clearing local storage fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.inner.session.access_token().await {
            let result = self
                .inner
                .http
                .post(self.inner.config.endpoint("/auth/logout"))
                .bearer_auth(token)
                .send()
                .await;
            if let Err(err) = result {
                tracing::debug!(error = %err, "server-side logout failed; clearing local session anyway");
            }
        }

        self.inner.session.logout_local().await?;
        Ok(())
    }
}
