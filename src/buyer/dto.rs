use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{NewBuyerRequest, RequestPatch};

#[derive(Debug, Deserialize)]
pub struct CreateBuyerRequest {
    pub produce_type: Option<String>,
    pub quantity_needed: Option<f64>,
    pub unit: Option<String>,
    pub delivery_location: Option<String>,
    pub target_price_per_unit: Option<f64>,
}

impl CreateBuyerRequest {
    pub fn validate(self, buyer_id: Uuid) -> Result<NewBuyerRequest, AppError> {
        let missing = [
            ("produce_type", self.produce_type.is_none()),
            ("quantity_needed", self.quantity_needed.is_none()),
            ("unit", self.unit.is_none()),
            ("delivery_location", self.delivery_location.is_none()),
        ];
        let (Some(produce_type), Some(quantity_needed), Some(unit), Some(delivery_location)) = (
            self.produce_type,
            self.quantity_needed,
            self.unit,
            self.delivery_location,
        ) else {
            return Err(AppError::missing_fields(&missing));
        };

        Ok(NewBuyerRequest {
            buyer_id,
            produce_type,
            quantity_needed,
            unit,
            delivery_location,
            target_price_per_unit: self.target_price_per_unit,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBuyerRequest {
    pub produce_type: Option<String>,
    pub quantity_needed: Option<f64>,
    pub unit: Option<String>,
    pub delivery_location: Option<String>,
    pub target_price_per_unit: Option<f64>,
    pub is_active: Option<bool>,
}

impl From<UpdateBuyerRequest> for RequestPatch {
    fn from(r: UpdateBuyerRequest) -> Self {
        Self {
            produce_type: r.produce_type,
            quantity_needed: r.quantity_needed,
            unit: r.unit,
            delivery_location: r.delivery_location,
            target_price_per_unit: r.target_price_per_unit,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestCreated {
    pub message: String,
    pub request_id: String,
}
