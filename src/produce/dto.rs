use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::dates;
use crate::error::AppError;
use crate::store::{BuyerRequest, ListingPatch, NewListing};

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub produce_type: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    #[serde(default, with = "dates::calendar_opt")]
    pub available_from: Option<Date>,
    #[serde(default, with = "dates::calendar_opt")]
    pub available_until: Option<Date>,
}

impl CreateListingRequest {
    pub fn validate(self, farmer_id: Uuid) -> Result<NewListing, AppError> {
        let missing = [
            ("produce_type", self.produce_type.is_none()),
            ("quantity", self.quantity.is_none()),
            ("unit", self.unit.is_none()),
            ("price_per_unit", self.price_per_unit.is_none()),
            ("available_from", self.available_from.is_none()),
            ("available_until", self.available_until.is_none()),
        ];
        match (
            self.produce_type,
            self.quantity,
            self.unit,
            self.price_per_unit,
            self.available_from,
            self.available_until,
        ) {
            (
                Some(produce_type),
                Some(quantity),
                Some(unit),
                Some(price_per_unit),
                Some(available_from),
                Some(available_until),
            ) => Ok(NewListing {
                farmer_id,
                produce_type,
                quantity,
                unit,
                price_per_unit,
                available_from,
                available_until,
            }),
            _ => Err(AppError::missing_fields(&missing)),
        }
    }
}

/// Owner and timestamps are not client-writable, so they are not here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateListingRequest {
    pub produce_type: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    #[serde(default, with = "dates::calendar_opt")]
    pub available_from: Option<Date>,
    #[serde(default, with = "dates::calendar_opt")]
    pub available_until: Option<Date>,
    pub is_active: Option<bool>,
}

impl From<UpdateListingRequest> for ListingPatch {
    fn from(r: UpdateListingRequest) -> Self {
        Self {
            produce_type: r.produce_type,
            quantity: r.quantity,
            unit: r.unit,
            price_per_unit: r.price_per_unit,
            available_from: r.available_from,
            available_until: r.available_until,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingCreated {
    pub message: String,
    pub listing_id: String,
}

#[derive(Debug, Serialize)]
pub struct MatchItem {
    pub request_id: String,
    pub buyer_id: String,
    pub quantity_needed: f64,
    pub delivery_location: String,
    pub target_price: Option<f64>,
}

impl From<BuyerRequest> for MatchItem {
    fn from(r: BuyerRequest) -> Self {
        Self {
            request_id: r.id.to_string(),
            buyer_id: r.buyer_id.to_string(),
            quantity_needed: r.quantity_needed,
            delivery_location: r.delivery_location,
            target_price: r.target_price_per_unit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub message: String,
    pub matches: Vec<MatchItem>,
}
