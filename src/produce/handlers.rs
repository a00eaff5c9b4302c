use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    api::{message, parse_id, MessageBody, ValidJson},
    auth::session::{Authenticated, FarmerOnly, Identity},
    error::AppError,
    state::AppState,
    store::{ProduceListing, Store},
};

use super::dto::{
    CreateListingRequest, ListingCreated, MatchItem, MatchResponse, UpdateListingRequest,
};

const NOT_FOUND: &str = "Listing not found";

pub fn produce_routes() -> Router<AppState> {
    Router::new()
        .route("/api/produce", post(create_listing).get(list_listings))
        .route("/api/produce/", post(create_listing).get(list_listings))
        .route(
            "/api/produce/{id}",
            get(get_listing).put(update_listing).delete(delete_listing),
        )
        .route("/api/produce/{id}/match", get(match_listing))
}

/// Existence first, then ownership.
async fn owned_listing(
    store: &dyn Store,
    raw_id: &str,
    farmer: &Identity,
    denied: &str,
) -> Result<ProduceListing, AppError> {
    let id = parse_id(raw_id, NOT_FOUND)?;
    let listing = store
        .find_listing(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    if listing.farmer_id != farmer.user_id {
        warn!(listing_id = %id, user_id = %farmer.user_id, "listing owned by someone else");
        return Err(AppError::Forbidden(denied.into()));
    }
    Ok(listing)
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    FarmerOnly(farmer): FarmerOnly,
    ValidJson(payload): ValidJson<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingCreated>), AppError> {
    let new_listing = payload.validate(farmer.user_id)?;
    let listing = state.store.insert_listing(new_listing).await.map_err(|e| {
        error!(error = %e, "insert listing failed");
        AppError::Internal(format!("Failed to add listing: {e}"))
    })?;

    info!(listing_id = %listing.id, farmer_id = %farmer.user_id, "listing created");
    Ok((
        StatusCode::CREATED,
        Json(ListingCreated {
            message: "Produce listing added successfully".into(),
            listing_id: listing.id.to_string(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_listings(
    State(state): State<AppState>,
    Authenticated(_user): Authenticated,
) -> Result<Json<Vec<ProduceListing>>, AppError> {
    Ok(Json(state.store.active_listings().await?))
}

#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    Authenticated(_user): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ProduceListing>, AppError> {
    let id: Uuid = parse_id(&id, NOT_FOUND)?;
    state
        .store
        .find_listing(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_listing(
    State(state): State<AppState>,
    FarmerOnly(farmer): FarmerOnly,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateListingRequest>,
) -> Result<Json<MessageBody>, AppError> {
    let listing = owned_listing(
        state.store.as_ref(),
        &id,
        &farmer,
        "Forbidden: You can only update your own listings",
    )
    .await?;

    let updated = state
        .store
        .update_listing(listing.id, payload.into())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update listing: {e}")))?;
    if !updated {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }

    info!(listing_id = %listing.id, "listing updated");
    Ok(message("Listing updated successfully"))
}

#[instrument(skip(state))]
pub async fn delete_listing(
    State(state): State<AppState>,
    FarmerOnly(farmer): FarmerOnly,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    let listing = owned_listing(
        state.store.as_ref(),
        &id,
        &farmer,
        "Forbidden: You can only delete your own listings",
    )
    .await?;

    state
        .store
        .delete_listing(listing.id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to delete listing: {e}")))?;

    info!(listing_id = %listing.id, "listing deleted");
    Ok(message("Listing deleted successfully"))
}

#[instrument(skip(state))]
pub async fn match_listing(
    State(state): State<AppState>,
    FarmerOnly(farmer): FarmerOnly,
    Path(id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let listing = owned_listing(state.store.as_ref(), &id, &farmer, "Forbidden").await?;

    let matches: Vec<MatchItem> = state
        .matcher
        .find_matches(&listing)
        .await?
        .into_iter()
        .map(MatchItem::from)
        .collect();

    info!(listing_id = %listing.id, count = matches.len(), "matches computed");
    Ok(Json(MatchResponse {
        message: "Potential matches found".into(),
        matches,
    }))
}
