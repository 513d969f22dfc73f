use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::{AuthUser, SESSION_COOKIE},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        session::SessionToken,
    },
    error::{is_unique_violation, ApiError},
    extract::Json,
    state::AppState,
    users::{
        dto::{SignInRequest, SignInResponse, SignUpRequest, UpdateUserRequest},
        repo::User,
    },
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/sign-up", post(sign_up))
        .route("/user/sign-in", post(sign_in))
        .route("/user/sign-out", post(sign_out))
        .route(
            "/user",
            get(list_users).put(update_user).delete(delete_user),
        )
        .route("/user/:user_id", get(get_user))
}

fn session_cookie(token: String, keys: &JwtKeys) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::seconds(keys.ttl.as_secs() as i64))
        .build()
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(mut payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidInput("Missing data".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::InvalidInput("Invalid email".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict(
            "User already exists, please choose a different email or sign in instead".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(
        &state.db,
        payload.name.trim(),
        &payload.email,
        &hash,
        payload.phone_number,
    )
    .await
    {
        Ok(u) => u,
        // Lost the lookup-before-insert race; the unique index settles it.
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "User already exists, please choose a different email or sign in instead".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, jar, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidInput("Missing data".into()));
    }

    // Uniform failure whether the email is unknown or the password is wrong
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "sign-in unknown email");
            return Err(ApiError::Unauthenticated("Invalid email or password".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "sign-in invalid password");
        return Err(ApiError::Unauthenticated("Invalid email or password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    // Single active session: a fresh token replaces any stored one
    SessionToken::replace_for_user(&state.db, user.id, &access_token).await?;

    let jar = jar.add(session_cookie(access_token.clone(), &keys));

    info!(user_id = %user.id, "user signed in");
    Ok((jar, Json(SignInResponse { access_token, user })))
}

#[instrument(skip(state, jar))]
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(ApiError::NotFound(
            "There is no session cookie yet, please sign in first".into(),
        ));
    };

    // Best-effort revocation of the stored session; an unreadable token
    // still gets its cookie cleared
    let keys = JwtKeys::from_ref(&state);
    if let Ok(claims) = keys.verify(cookie.value()) {
        SessionToken::delete_for_user(&state.db, claims.sub).await?;
        info!(user_id = %claims.sub, "session revoked");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "message": "Signed out successfully" }))))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("There are no users yet".into()));
    }
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("There is no user with this id".into()))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidInput("Missing data".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::InvalidInput("Invalid email".into()));
    }

    let hash = hash_password(&payload.password)?;

    let updated = match User::update(
        &state.db,
        user_id,
        payload.name.trim(),
        &payload.email,
        &hash,
        payload.phone_number,
    )
    .await
    {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(
                "This email is already taken, please choose a different one".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let user = updated
        .ok_or_else(|| ApiError::NotFound("User was not updated, please provide new data".into()))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state, jar))]
pub async fn delete_user(
    State(state): State<AppState>,
    jar: CookieJar,
    AuthUser(user_id): AuthUser,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let deleted = User::delete(&state.db, user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("There is no user with this id".into()));
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    info!(user_id = %user_id, "user deleted");
    Ok((jar, Json(json!({ "message": "User deleted successfully" }))))
}
