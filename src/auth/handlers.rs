use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    api::{message, MessageBody, ValidJson},
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        services::{authenticate, register_user},
        session::{bind_identity, clear_identity, Authenticated, Identity},
    },
    error::AppError,
    state::AppState,
    store::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me))
}

#[instrument(skip(state, session, payload))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let registration = payload.validate()?;
    let user = register_user(state.store.as_ref(), registration).await?;

    bind_identity(
        &session,
        Identity {
            user_id: user.id,
            user_type: user.user_type,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, user_type = %user.user_type, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user_id: user.id.to_string(),
        }),
    ))
}

#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (email, password) = payload.validate()?;
    let user = authenticate(state.store.as_ref(), &email, &password).await?;

    bind_identity(
        &session,
        Identity {
            user_id: user.id,
            user_type: user.user_type,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        message: "Logged in successfully".into(),
        user_type: user.user_type,
    }))
}

#[instrument(skip(session))]
pub async fn logout(
    session: Session,
    Authenticated(identity): Authenticated,
) -> Result<Json<MessageBody>, AppError> {
    clear_identity(&session).await?;
    info!(user_id = %identity.user_id, "user logged out");
    Ok(message("Logged out successfully"))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> Result<Json<User>, AppError> {
    match state.store.find_user_by_id(identity.user_id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            warn!(user_id = %identity.user_id, "session bound to a missing user");
            Err(AppError::NotFound("User not found".into()))
        }
    }
}
