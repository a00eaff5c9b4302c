use serde::{Deserialize, Serialize};
use serde_json::Number;
use time::Date;

use crate::api::non_blank;
use crate::dates::parse_date;
use crate::error::AppError;
use crate::store::{NewMarketPrice, PriceFilter};

#[derive(Debug, Deserialize)]
pub struct CreatePriceRequest {
    pub produce_type: Option<String>,
    pub region: Option<String>,
    pub price: Option<f64>,
    pub unit: Option<String>,
}

impl CreatePriceRequest {
    /// `date_recorded` is server-stamped; clients cannot backdate prices.
    pub fn validate(self, today: Date) -> Result<NewMarketPrice, AppError> {
        let missing = [
            ("produce_type", self.produce_type.is_none()),
            ("region", self.region.is_none()),
            ("price", self.price.is_none()),
            ("unit", self.unit.is_none()),
        ];
        let (Some(produce_type), Some(region), Some(price), Some(unit)) =
            (self.produce_type, self.region, self.price, self.unit)
        else {
            return Err(AppError::missing_fields(&missing));
        };
        Ok(NewMarketPrice {
            produce_type,
            region,
            price,
            unit,
            date_recorded: today,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PriceCreated {
    pub message: String,
    pub price_id: String,
}

/// Query string of `GET /api/market`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    pub produce_type: Option<String>,
    pub region: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl PriceQuery {
    pub fn into_filter(self) -> Result<PriceFilter, AppError> {
        Ok(PriceFilter {
            produce_type: non_blank(self.produce_type),
            region: non_blank(self.region),
            date_from: bound("date_from", self.date_from)?,
            date_to: bound("date_to", self.date_to)?,
        })
    }
}

fn bound(name: &str, raw: Option<String>) -> Result<Option<Date>, AppError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => parse_date(&raw).map(Some).ok_or_else(|| {
            AppError::Validation(format!("Invalid {name} `{raw}`, expected YYYY-MM-DD"))
        }),
    }
}

/// Alert price as sent, either a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AlertPrice {
    Number(Number),
    Text(String),
}

impl AlertPrice {
    /// Text for the SMS, or `None` when the price counts as missing
    /// (zero or blank).
    fn into_text(self) -> Option<String> {
        match self {
            AlertPrice::Number(n) if n.as_f64() == Some(0.0) => None,
            AlertPrice::Number(n) => Some(n.to_string()),
            AlertPrice::Text(s) => non_blank(Some(s)).map(|s| s.trim().to_string()),
        }
    }
}

/// Body of `POST /api/market/send_price_alert`.
#[derive(Debug, Deserialize)]
pub struct PriceAlertRequest {
    pub produce_type: Option<String>,
    pub region: Option<String>,
    pub price: Option<AlertPrice>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub produce_type: String,
    pub region: String,
    pub price: String,
    pub unit: String,
}

impl PriceAlertRequest {
    pub fn validate(self) -> Result<PriceAlert, AppError> {
        match (
            non_blank(self.produce_type),
            non_blank(self.region),
            self.price.and_then(AlertPrice::into_text),
            non_blank(self.unit),
        ) {
            (Some(produce_type), Some(region), Some(price), Some(unit)) => Ok(PriceAlert {
                produce_type,
                region,
                price,
                unit,
            }),
            _ => Err(AppError::Validation(
                "Missing required fields for alert".into(),
            )),
        }
    }
}
