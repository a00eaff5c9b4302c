use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    api::{message, parse_id, MessageBody, ValidJson},
    auth::session::{Authenticated, BuyerOnly, Identity},
    error::AppError,
    state::AppState,
    store::{BuyerRequest, Store},
};

use super::dto::{CreateBuyerRequest, RequestCreated, UpdateBuyerRequest};

const NOT_FOUND: &str = "Request not found";

pub fn buyer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/buyer", post(create_request).get(list_requests))
        .route("/api/buyer/", post(create_request).get(list_requests))
        .route(
            "/api/buyer/{id}",
            get(get_request).put(update_request).delete(delete_request),
        )
}

async fn owned_request(
    store: &dyn Store,
    raw_id: &str,
    buyer: &Identity,
    denied: &str,
) -> Result<BuyerRequest, AppError> {
    let id = parse_id(raw_id, NOT_FOUND)?;
    let Some(request) = store.find_request(id).await? else {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    };
    if request.buyer_id != buyer.user_id {
        warn!(request_id = %id, user_id = %buyer.user_id, "request owned by someone else");
        return Err(AppError::Forbidden(denied.into()));
    }
    Ok(request)
}

#[instrument(skip(state, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    BuyerOnly(buyer): BuyerOnly,
    ValidJson(payload): ValidJson<CreateBuyerRequest>,
) -> Result<(StatusCode, Json<RequestCreated>), AppError> {
    let new_request = payload.validate(buyer.user_id)?;
    let request = state.store.insert_request(new_request).await.map_err(|e| {
        error!(error = %e, "insert buyer request failed");
        AppError::Internal(format!("Failed to add request: {e}"))
    })?;

    info!(request_id = %request.id, buyer_id = %buyer.user_id, "buyer request created");
    Ok((
        StatusCode::CREATED,
        Json(RequestCreated {
            message: "Buyer request added successfully".into(),
            request_id: request.id.to_string(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    Authenticated(_user): Authenticated,
) -> Result<Json<Vec<BuyerRequest>>, AppError> {
    Ok(Json(state.store.active_requests().await?))
}

#[instrument(skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    Authenticated(_user): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<BuyerRequest>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    match state.store.find_request(id).await? {
        Some(request) => Ok(Json(request)),
        None => Err(AppError::NotFound(NOT_FOUND.into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn update_request(
    State(state): State<AppState>,
    BuyerOnly(buyer): BuyerOnly,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateBuyerRequest>,
) -> Result<Json<MessageBody>, AppError> {
    let request = owned_request(
        state.store.as_ref(),
        &id,
        &buyer,
        "Forbidden: You can only update your own requests",
    )
    .await?;

    if !state.store.update_request(request.id, payload.into()).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }

    info!(request_id = %request.id, "buyer request updated");
    Ok(message("Request updated successfully"))
}

#[instrument(skip(state))]
pub async fn delete_request(
    State(state): State<AppState>,
    BuyerOnly(buyer): BuyerOnly,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    let request = owned_request(
        state.store.as_ref(),
        &id,
        &buyer,
        "Forbidden: You can only delete your own requests",
    )
    .await?;

    state.store.delete_request(request.id).await?;

    info!(request_id = %request.id, "buyer request deleted");
    Ok(message("Request deleted successfully"))
}
