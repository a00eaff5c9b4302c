//! Session-bound identity and the authorization guards built on it.
//!
//! Handlers name the tier they need in their signature: [`Authenticated`],
//! [`FarmerOnly`] or [`BuyerOnly`]. Anonymous handlers take none of them.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{error::AppError, store::Role};

/// Session key under which the identity is stored.
pub const IDENTITY_KEY: &str = "identity";

/// Who the session belongs to. The role here is authoritative for guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub user_type: Role,
}

/// Rotates the session id, then binds `identity` to it.
pub async fn bind_identity(session: &Session, identity: Identity) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(IDENTITY_KEY, identity).await?;
    Ok(())
}

pub async fn clear_identity(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}

async fn current_identity(parts: &Parts) -> Result<Identity, AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Internal("session layer is not installed".into()))?;
    session
        .get::<Identity>(IDENTITY_KEY)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))
}

async fn require_role(parts: &Parts, role: Role) -> Result<Identity, AppError> {
    let identity = current_identity(parts).await?;
    if identity.user_type != role {
        let who = match role {
            Role::Farmer => "Farmer",
            Role::Buyer => "Buyer",
        };
        return Err(AppError::Forbidden(format!(
            "Forbidden: {who} access required"
        )));
    }
    Ok(identity)
}

/// Any logged-in user.
#[derive(Debug)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_identity(parts).await.map(Self)
    }
}

#[derive(Debug)]
pub struct FarmerOnly(pub Identity);

impl<S> FromRequestParts<S> for FarmerOnly
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Farmer).await.map(Self)
    }
}

#[derive(Debug)]
pub struct BuyerOnly(pub Identity);

impl<S> FromRequestParts<S> for BuyerOnly
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Buyer).await.map(Self)
    }
}
