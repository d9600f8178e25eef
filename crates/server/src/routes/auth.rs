use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use daybook_api::crypto::{self, PasswordHash};
use daybook_api::{
    db, google, service, AuthResponse, GoogleLoginRequest, LoginRequest, OkResponse,
    RegisterRequest, User,
};

use crate::error::{ApiErr, ApiJson};
use crate::storage::{sq_execute, sq_query_row, user_from_row, Db};
use crate::{now_unix, AppConfig, AppState};

// ---------------------------------------------------------------------------
// Auth extractor
// ---------------------------------------------------------------------------

/// Authenticated user resolved from the session cookie, or from an
/// `Authorization: Bearer <token>` header for non-browser clients.
pub struct AuthUser {
    pub user: User,
    pub token_hash: String,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Pull the raw session token out of the request headers.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(service::session_token_from_cookie_header)
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Db: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| ApiErr::unauthorized("not signed in"))?;
        let token_hash = crypto::hash_token(&token);
        let now = service::sqlite_now(now_unix());

        let db = Db::from_ref(state);
        let conn = db.conn();
        let user = sq_query_row(
            &conn,
            db::sessions::lookup_user(&token_hash, &now),
            user_from_row,
        )
        .optional()
        .map_err(ApiErr::from_db("session lookup"))?
        .ok_or_else(|| ApiErr::unauthorized("session expired or invalid"))?;

        Ok(AuthUser { user, token_hash })
    }
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

type SessionResponse = ([(HeaderName, String); 1], Json<AuthResponse>);

/// Insert a session row for `user` and build the cookie + body.
fn start_session(
    conn: &Connection,
    config: &AppConfig,
    user: User,
    now: u64,
) -> Result<SessionResponse, ApiErr> {
    let bundle = service::prepare_session(now, config.session_days)?;
    sq_execute(
        conn,
        db::sessions::insert(
            &bundle.session_id,
            &user.id,
            &bundle.token_hash,
            &bundle.expires_at,
        ),
    )
    .map_err(ApiErr::from_db("session insert"))?;

    let cookie = service::session_cookie(&bundle.token, bundle.max_age_secs, config.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user,
            session_token: bundle.token,
            expires_at: bundle.expires_at,
        }),
    ))
}

fn invalid_credentials() -> ApiErr {
    ApiErr::unauthorized("invalid email or password")
}

/// Run CPU-heavy password work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, ApiErr>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ApiErr::from_db("password worker"))
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response, ApiErr> {
    if !state.config.registration_open {
        return Err(ApiErr::forbidden("registration is currently closed"));
    }

    let username = service::validate_username(&req.username)?;
    let email = service::validate_email(&req.email)?;
    service::validate_password(&req.password)?;

    {
        let conn = state.db.conn();
        let exists: bool = sq_query_row(&conn, db::users::email_exists(&email), |row| row.get(0))
            .map_err(ApiErr::from_db("email lookup"))?;
        if exists {
            return Err(ApiErr::conflict("email already registered"));
        }
    }

    let iterations = state.config.password_iterations;
    let password = req.password;
    let hashed = blocking(move || crypto::hash_password(&password, iterations)).await??;

    let user_id = Uuid::new_v4().to_string();
    let now = now_unix();
    let conn = state.db.conn();
    match sq_execute(
        &conn,
        db::users::insert_with_password(&user_id, &username, &email, &hashed),
    ) {
        Ok(_) => {}
        // lost a race with a concurrent registration
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(ApiErr::conflict("email already registered"));
        }
        Err(e) => return Err(ApiErr::from_db("register insert")(e)),
    }

    let user = sq_query_row(&conn, db::users::get_by_id(&user_id), user_from_row)
        .map_err(ApiErr::from_db("register reload"))?;
    tracing::info!(user_id = %user.id, "registered user");

    let session = start_session(&conn, &state.config, user, now)?;
    Ok((StatusCode::CREATED, session).into_response())
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<SessionResponse, ApiErr> {
    let email = req.email.trim().to_lowercase();

    let found = {
        let conn = state.db.conn();
        sq_query_row(&conn, db::users::get_by_email_for_login(&email), |row| {
            let user = user_from_row(row)?;
            let hash: Option<String> = row.get(6)?;
            let salt: Option<String> = row.get(7)?;
            let iterations: Option<i64> = row.get(8)?;
            Ok((user, hash, salt, iterations))
        })
        .optional()
        .map_err(ApiErr::from_db("login lookup"))?
    };

    // Unknown email and Google-only accounts look the same as a bad password,
    // including the time spent hashing.
    let Some((user, Some(hash), Some(salt), Some(iterations))) = found else {
        let decoy = crypto::decoy_password_hash(state.config.password_iterations);
        let password = req.password;
        blocking(move || crypto::verify_password(&password, &decoy)).await?;
        return Err(invalid_credentials());
    };
    let stored = PasswordHash {
        hash,
        salt,
        iterations: u32::try_from(iterations).unwrap_or(0),
    };

    let password = req.password;
    let valid = blocking(move || crypto::verify_password(&password, &stored)).await?;
    if !valid {
        tracing::info!(user_id = %user.id, "rejected login");
        return Err(invalid_credentials());
    }

    let now = now_unix();
    let conn = state.db.conn();
    sq_execute(
        &conn,
        db::sessions::delete_expired(&service::sqlite_now(now)),
    )
    .map_err(ApiErr::from_db("session purge"))?;

    start_session(&conn, &state.config, user, now)
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiErr> {
    let conn = state.db.conn();
    sq_execute(&conn, db::sessions::delete_by_token_hash(&user.token_hash))
        .map_err(ApiErr::from_db("logout"))?;

    Ok((
        [(
            header::SET_COOKIE,
            service::clear_session_cookie(state.config.cookie_secure),
        )],
        Json(OkResponse { ok: true }),
    ))
}

// ---------------------------------------------------------------------------
// Current user
// ---------------------------------------------------------------------------

pub async fn me(user: AuthUser) -> Json<User> {
    Json(user.user)
}

// ---------------------------------------------------------------------------
// Google sign-in
// ---------------------------------------------------------------------------

/// POST /api/auth/google — exchange a Google ID token for a session.
///
/// The token is verified against the tokeninfo endpoint. The account is
/// matched by Google id first, then linked by email, and created last.
pub async fn google(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GoogleLoginRequest>,
) -> Result<SessionResponse, ApiErr> {
    let Some(config) = state.config.google.as_ref() else {
        return Err(ApiErr::not_found("Google sign-in is not configured"));
    };
    let credential = req.credential.trim();
    if credential.is_empty() {
        return Err(ApiErr::bad_request("credential is required"));
    }

    let claims: serde_json::Value = state
        .http
        .get(google::build_tokeninfo_url(config, credential))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Google tokeninfo request failed: {e}");
            ApiErr::internal("could not verify Google credential")
        })?
        .json()
        .await
        .map_err(|e| {
            tracing::error!("Google tokeninfo response unreadable: {e}");
            ApiErr::internal("could not verify Google credential")
        })?;

    let now = now_unix();
    let profile = google::extract_profile(config, &claims, now)?;

    let conn = state.db.conn();
    let user = upsert_google_user(&conn, &profile, state.config.registration_open)?;
    start_session(&conn, &state.config, user, now)
}

fn upsert_google_user(
    conn: &Connection,
    profile: &google::GoogleProfile,
    registration_open: bool,
) -> Result<User, ApiErr> {
    if let Some(user) = sq_query_row(
        conn,
        db::users::get_by_google_id(&profile.google_id),
        user_from_row,
    )
    .optional()
    .map_err(ApiErr::from_db("google user lookup"))?
    {
        return Ok(user);
    }

    let user_id = match sq_query_row(conn, db::users::get_by_email(&profile.email), user_from_row)
        .optional()
        .map_err(ApiErr::from_db("email lookup"))?
    {
        Some(existing) => {
            // keep whatever profile the user already has
            let display_name = existing.display_name.as_deref().or(profile.name.as_deref());
            let avatar_url = existing.avatar_url.as_deref().or(profile.picture.as_deref());
            sq_execute(
                conn,
                db::users::link_google(&existing.id, &profile.google_id, display_name, avatar_url),
            )
            .map_err(ApiErr::from_db("google link"))?;
            tracing::info!(user_id = %existing.id, "linked Google account");
            existing.id
        }
        None => {
            if !registration_open {
                return Err(ApiErr::forbidden("registration is currently closed"));
            }
            let user_id = Uuid::new_v4().to_string();
            sq_execute(
                conn,
                db::users::insert_google(
                    &user_id,
                    &google::username_for(profile),
                    &profile.email,
                    &profile.google_id,
                    profile.name.as_deref(),
                    profile.picture.as_deref(),
                ),
            )
            .map_err(ApiErr::from_db("google user insert"))?;
            tracing::info!(user_id = %user_id, "registered user via Google");
            user_id
        }
    };

    sq_query_row(conn, db::users::get_by_id(&user_id), user_from_row)
        .map_err(ApiErr::from_db("google user reload"))
}
