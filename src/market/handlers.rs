use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use crate::{
    api::{message, MessageBody, ValidJson, ValidQuery},
    auth::session::Authenticated,
    error::AppError,
    state::AppState,
    store::MarketPrice,
};

use super::alerts::send_price_alert;
use super::dto::{CreatePriceRequest, PriceAlertRequest, PriceCreated, PriceQuery};

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/api/market", post(add_price).get(list_prices))
        .route("/api/market/", post(add_price).get(list_prices))
        .route("/api/market/send_price_alert", post(price_alert))
}

#[instrument(skip(state, payload))]
pub async fn add_price(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    ValidJson(payload): ValidJson<CreatePriceRequest>,
) -> Result<(StatusCode, Json<PriceCreated>), AppError> {
    let today = OffsetDateTime::now_utc().date();
    let new_price = payload.validate(today)?;
    let price = state.store.insert_price(new_price).await.map_err(|e| {
        error!(error = %e, "insert market price failed");
        AppError::Internal(format!("Failed to add price: {e}"))
    })?;

    info!(price_id = %price.id, recorded_by = %user.user_id, "market price recorded");
    Ok((
        StatusCode::CREATED,
        Json(PriceCreated {
            message: "Market price added successfully".into(),
            price_id: price.id.to_string(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_prices(
    State(state): State<AppState>,
    Authenticated(_user): Authenticated,
    ValidQuery(query): ValidQuery<PriceQuery>,
) -> Result<Json<Vec<MarketPrice>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.store.query_prices(&filter).await?))
}

#[instrument(skip(state, payload))]
pub async fn price_alert(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    ValidJson(payload): ValidJson<PriceAlertRequest>,
) -> Result<Json<MessageBody>, AppError> {
    let alert = payload.validate()?;
    let email = send_price_alert(
        state.store.as_ref(),
        state.notifier.as_ref(),
        user.user_id,
        &alert,
    )
    .await?;
    Ok(message(format!("Price alert sent to {email}")))
}
