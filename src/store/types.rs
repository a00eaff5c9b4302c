use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dates;

/// Account role. Gates which half of the marketplace a user may write to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Farmer,
    Buyer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "buyer" => Ok(Role::Buyer),
            other => Err(format!("unknown user_type `{other}`")),
        }
    }
}

/// User record.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub user_type: Role,
    pub contact_number: String,
    pub location: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub user_type: Role,
    pub contact_number: String,
    pub location: String,
    pub name: String,
}

/// A farmer's offer to sell produce within a window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProduceListing {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub produce_type: String,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
    #[serde(with = "dates::calendar")]
    pub available_from: Date,
    #[serde(with = "dates::calendar")]
    pub available_until: Date,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewListing {
    pub farmer_id: Uuid,
    pub produce_type: String,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
    pub available_from: Date,
    pub available_until: Date,
}

/// Client-writable listing fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub produce_type: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price_per_unit: Option<f64>,
    pub available_from: Option<Date>,
    pub available_until: Option<Date>,
    pub is_active: Option<bool>,
}

/// A buyer's stated demand.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BuyerRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub produce_type: String,
    pub quantity_needed: f64,
    pub unit: String,
    pub delivery_location: String,
    pub target_price_per_unit: Option<f64>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewBuyerRequest {
    pub buyer_id: Uuid,
    pub produce_type: String,
    pub quantity_needed: f64,
    pub unit: String,
    pub delivery_location: String,
    pub target_price_per_unit: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestPatch {
    pub produce_type: Option<String>,
    pub quantity_needed: Option<f64>,
    pub unit: Option<String>,
    pub delivery_location: Option<String>,
    pub target_price_per_unit: Option<f64>,
    pub is_active: Option<bool>,
}

/// One observed market price. Append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MarketPrice {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub produce_type: String,
    pub region: String,
    pub price: f64,
    pub unit: String,
    #[serde(with = "dates::calendar")]
    pub date_recorded: Date,
}

#[derive(Debug, Clone)]
pub struct NewMarketPrice {
    pub produce_type: String,
    pub region: String,
    pub price: f64,
    pub unit: String,
    pub date_recorded: Date,
}

/// Market price query. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFilter {
    pub produce_type: Option<String>,
    pub region: Option<String>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
}
