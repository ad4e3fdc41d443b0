use chrono::{DateTime, Utc};
use rocket::FromFormField;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[field(value = "active")]
    Active,
    #[field(value = "expired")]
    Expired,
    #[field(value = "completed")]
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Expired => write!(f, "expired"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A stored verification session.
///
/// The status is not part of the stored record; it is derived from
/// `expires_at`, `responses` and `max_responses` whenever it is needed.
/// Records written by older clients may still carry a `status` key, which is
/// ignored on read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSession {
    pub id: String,
    pub company_id: String,
    pub company_name: String,
    pub session_name: String,
    #[serde(default)]
    pub description: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub driver_link: String,
    pub qr_code: String,
    #[serde(default)]
    pub responses: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_responses: Option<u32>,
}

impl VerificationSession {
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        derive_status(self, now)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Expiry wins over completion; a zero `max_responses` counts as unset.
pub fn derive_status(session: &VerificationSession, now: DateTime<Utc>) -> SessionStatus {
    if session.is_expired_at(now) {
        return SessionStatus::Expired;
    }

    match session.max_responses {
        Some(max) if max > 0 && session.responses >= max => SessionStatus::Completed,
        _ => SessionStatus::Active,
    }
}

fn default_expires_in() -> i64 {
    7
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct SessionRequest {
    #[validate(length(min = 1, message = "Session name is required"))]
    pub session_name: String,
    #[serde(default)]
    pub description: String,
    /// Days until the session expires. Not bounded.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[validate(range(min = 1))]
    pub max_responses: Option<u32>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SessionResponse {
    pub id: String,
    pub company_id: String,
    pub company_name: String,
    pub session_name: String,
    pub description: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub driver_link: String,
    pub qr_code: String,
    pub responses: u32,
    pub max_responses: Option<u32>,
}

impl SessionResponse {
    pub fn from_session(session: &VerificationSession, now: DateTime<Utc>) -> Self {
        Self {
            id: session.id.clone(),
            company_id: session.company_id.clone(),
            company_name: session.company_name.clone(),
            session_name: session.session_name.clone(),
            description: session.description.clone(),
            expires_at: session.expires_at,
            created_at: session.created_at,
            status: session.status_at(now),
            driver_link: session.driver_link.clone(),
            qr_code: session.qr_code.clone(),
            responses: session.responses,
            max_responses: session.max_responses,
        }
    }
}

/// What a driver sees after resolving a session link.
#[derive(Serialize, Debug, JsonSchema)]
pub struct SessionSummary {
    pub id: String,
    pub company_name: String,
    pub session_name: String,
    pub description: String,
    pub expires_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl SessionSummary {
    pub fn from_session(session: &VerificationSession, now: DateTime<Utc>) -> Self {
        Self {
            id: session.id.clone(),
            company_name: session.company_name.clone(),
            session_name: session.session_name.clone(),
            description: session.description.clone(),
            expires_at: session.expires_at,
            status: session.status_at(now),
        }
    }
}
