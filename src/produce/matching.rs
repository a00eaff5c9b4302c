//! Listing-to-request matching.
//!
//! A request matches a listing iff it is active and its `produce_type` is
//! exactly the listing's. Nothing is scored or ranked.

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{BuyerRequest, ProduceListing, Store, StoreResult};

/// Finds the buyer requests a listing could serve. Callers only see this
/// trait, so an indexed lookup can replace the scan.
#[async_trait]
pub trait MatchFinder: Send + Sync {
    async fn find_matches(&self, listing: &ProduceListing) -> StoreResult<Vec<BuyerRequest>>;
}

pub fn is_match(listing: &ProduceListing, request: &BuyerRequest) -> bool {
    request.is_active && request.produce_type == listing.produce_type
}

/// O(active requests) per call.
pub struct ActiveRequestScan {
    store: Arc<dyn Store>,
}

impl ActiveRequestScan {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MatchFinder for ActiveRequestScan {
    async fn find_matches(&self, listing: &ProduceListing) -> StoreResult<Vec<BuyerRequest>> {
        let requests = self.store.active_requests().await?;
        Ok(requests
            .into_iter()
            .filter(|r| is_match(listing, r))
            .collect())
    }
}
