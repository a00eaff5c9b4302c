//! Persistence gateway.
//!
//! Typed CRUD over the four collections. Handlers only ever see the
//! [`Store`] trait; Postgres backs it in production and an in-memory
//! implementation backs the tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;
mod types;

pub use types::{
    BuyerRequest, ListingPatch, MarketPrice, NewBuyerRequest, NewListing, NewMarketPrice,
    NewUser, PriceFilter, ProduceListing, RequestPatch, Role, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn insert_listing(&self, listing: NewListing) -> StoreResult<ProduceListing>;
    async fn active_listings(&self) -> StoreResult<Vec<ProduceListing>>;
    async fn find_listing(&self, id: Uuid) -> StoreResult<Option<ProduceListing>>;
    /// Returns `false` when no listing has this id.
    async fn update_listing(&self, id: Uuid, patch: ListingPatch) -> StoreResult<bool>;
    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_request(&self, request: NewBuyerRequest) -> StoreResult<BuyerRequest>;
    async fn active_requests(&self) -> StoreResult<Vec<BuyerRequest>>;
    async fn find_request(&self, id: Uuid) -> StoreResult<Option<BuyerRequest>>;
    async fn update_request(&self, id: Uuid, patch: RequestPatch) -> StoreResult<bool>;
    async fn delete_request(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_price(&self, price: NewMarketPrice) -> StoreResult<MarketPrice>;
    /// Matching records, most recent `date_recorded` first.
    async fn query_prices(&self, filter: &PriceFilter) -> StoreResult<Vec<MarketPrice>>;
}
