//! # Authentication & Sessions
//!
//! Bearer-token sessions for logged-in drivers.
//!
//! ## Token Lifecycle
//!
//! `POST /accounts/login` checks the driver's password and opens a session.
//! The response carries a random 256-bit token, hex encoded. The server keeps
//! only the SHA-256 digest of that token, so the session table never holds a
//! usable credential. Sessions last two weeks, or until logout or deletion of
//! the driver.
//!
//! ## CurrentDriver
//!
//! Every authenticated request gets a [`CurrentDriver`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use taxi_core::{Driver, DriverId};

use crate::error::{AppError, ErrorBody, ErrorDetail};
use crate::state::AppState;

/// How long a session stays valid after login.
pub const SESSION_LIFETIME_DAYS: i64 = 14;

/// Random bytes in a session token.
const TOKEN_BYTES: usize = 32;

// ── Session Token ───────────────────────────────────────────────────────────

/// A bearer token as handed to the client.
///
/// Custom `Debug` redacts the value to prevent credential leakage in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draw a fresh token from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// The token value, for the login response only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Key under which the session is stored.
    pub fn digest(&self) -> String {
        token_digest(&self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Hex SHA-256 of a raw token.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

// ── Session Store ───────────────────────────────────────────────────────────

/// One logged-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub driver: DriverId,
    pub created_at: DateTime<Utc>,
    /// Visits to the home page during this session.
    pub num_visits: u64,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::days(SESSION_LIFETIME_DAYS)
    }
}

/// Open sessions keyed by token digest.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `driver` and return its token.
    pub fn create(&self, driver: DriverId) -> SessionToken {
        self.create_at(driver, Utc::now())
    }

    /// Expired sessions of every driver are pruned before the insert.
    fn create_at(&self, driver: DriverId, created_at: DateTime<Utc>) -> SessionToken {
        let token = SessionToken::generate();
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(
            token.digest(),
            Session {
                driver,
                created_at,
                num_visits: 0,
            },
        );
        token
    }

    /// The session stored under `digest`, dropping it if it has expired.
    pub fn lookup(&self, digest: &str) -> Option<Session> {
        let now = Utc::now();
        let session = self.sessions.read().get(digest).cloned()?;
        if session.is_expired(now) {
            self.sessions.write().remove(digest);
            return None;
        }
        Some(session)
    }

    /// Count a home page visit and return the new total.
    pub fn record_visit(&self, digest: &str) -> Option<u64> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(digest)?;
        session.num_visits += 1;
        Some(session.num_visits)
    }

    /// End one session. Returns whether it existed.
    pub fn end(&self, digest: &str) -> bool {
        self.sessions.write().remove(digest).is_some()
    }

    /// End every session of `driver`.
    pub fn end_all_for(&self, driver: DriverId) {
        self.sessions.write().retain(|_, s| s.driver != driver);
    }

    /// Number of stored sessions. Expired ones count until the next login or
    /// lookup removes them.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── CurrentDriver ───────────────────────────────────────────────────────────

/// The driver behind the bearer token of the current request.
#[derive(Debug, Clone)]
pub struct CurrentDriver {
    pub driver: Driver,
    /// Digest of the session token used for this request.
    pub session: String,
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present (middleware didn't run or failed).
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CurrentDriver {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentDriver>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no driver in request context".into()))
    }
}

// ── Credentials ─────────────────────────────────────────────────────────────

/// Check a username and password against the stored drivers.
///
/// An unknown username still pays for one password hash, so response time
/// does not reveal which usernames exist.
pub fn authenticate(state: &AppState, username: &str, password: &str) -> Result<Driver, AppError> {
    let driver = state
        .drivers
        .read()
        .values()
        .find(|d| d.username == username)
        .cloned();

    match driver {
        Some(driver) => {
            if state.passwords.verify(password, &driver.password_hash)? {
                Ok(driver)
            } else {
                tracing::warn!(username, "login failed: wrong password");
                Err(invalid_credentials())
            }
        }
        None => {
            let _ = state.passwords.hash(password)?;
            tracing::warn!(username, "login failed: unknown username");
            Err(invalid_credentials())
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("please enter a correct username and password".into())
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Resolve the Bearer token to a session and driver.
///
/// Injects [`CurrentDriver`] into request extensions for downstream handlers.
/// Any failure answers 401 before the handler runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request.headers().typed_get::<Authorization<Bearer>>();
    let token = match bearer {
        Some(Authorization(bearer)) => bearer.token().to_string(),
        None if request.headers().contains_key(header::AUTHORIZATION) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            return unauthorized_response("authorization header must use Bearer scheme");
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            return unauthorized_response("missing authorization header");
        }
    };

    let digest = token_digest(&token);
    let Some(session) = state.sessions.lookup(&digest) else {
        tracing::warn!("authentication failed: unknown or expired session");
        return unauthorized_response("invalid or expired session token");
    };
    let Some(driver) = state.drivers.get(session.driver) else {
        state.sessions.end(&digest);
        tracing::warn!(driver = %session.driver, "authentication failed: driver no longer exists");
        return unauthorized_response("invalid or expired session token");
    };

    request.extensions_mut().insert(CurrentDriver {
        driver,
        session: digest,
    });
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
