use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BuyerRequest, ListingPatch, MarketPrice, NewBuyerRequest, NewListing, NewMarketPrice,
    NewUser, PriceFilter, ProduceListing, RequestPatch, Store, StoreError, StoreResult, User,
};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    listings: Vec<ProduceListing>,
    requests: Vec<BuyerRequest>,
    prices: Vec<MarketPrice>,
}

/// Process-local store. Collections keep insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListingPatch {
    fn apply_to(self, listing: &mut ProduceListing) {
        if let Some(v) = self.produce_type {
            listing.produce_type = v;
        }
        if let Some(v) = self.quantity {
            listing.quantity = v;
        }
        if let Some(v) = self.unit {
            listing.unit = v;
        }
        if let Some(v) = self.price_per_unit {
            listing.price_per_unit = v;
        }
        if let Some(v) = self.available_from {
            listing.available_from = v;
        }
        if let Some(v) = self.available_until {
            listing.available_until = v;
        }
        if let Some(v) = self.is_active {
            listing.is_active = v;
        }
    }
}

impl RequestPatch {
    fn apply_to(self, request: &mut BuyerRequest) {
        if let Some(v) = self.produce_type {
            request.produce_type = v;
        }
        if let Some(v) = self.quantity_needed {
            request.quantity_needed = v;
        }
        if let Some(v) = self.unit {
            request.unit = v;
        }
        if let Some(v) = self.delivery_location {
            request.delivery_location = v;
        }
        if let Some(v) = self.target_price_per_unit {
            request.target_price_per_unit = Some(v);
        }
        if let Some(v) = self.is_active {
            request.is_active = v;
        }
    }
}

impl PriceFilter {
    fn matches(&self, price: &MarketPrice) -> bool {
        self.produce_type
            .as_deref()
            .map_or(true, |t| price.produce_type == t)
            && self.region.as_deref().map_or(true, |r| price.region == r)
            && self.date_from.map_or(true, |from| price.date_recorded >= from)
            && self.date_to.map_or(true, |to| price.date_recorded <= to)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut c = self.inner.write().await;
        if c.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            user_type: user.user_type,
            contact_number: user.contact_number,
            location: user.location,
            name: user.name,
            created_at: OffsetDateTime::now_utc(),
        };
        c.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let c = self.inner.read().await;
        Ok(c.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let c = self.inner.read().await;
        Ok(c.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_listing(&self, listing: NewListing) -> StoreResult<ProduceListing> {
        let now = OffsetDateTime::now_utc();
        let listing = ProduceListing {
            id: Uuid::new_v4(),
            farmer_id: listing.farmer_id,
            produce_type: listing.produce_type,
            quantity: listing.quantity,
            unit: listing.unit,
            price_per_unit: listing.price_per_unit,
            available_from: listing.available_from,
            available_until: listing.available_until,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.listings.push(listing.clone());
        Ok(listing)
    }

    async fn active_listings(&self) -> StoreResult<Vec<ProduceListing>> {
        let c = self.inner.read().await;
        Ok(c.listings.iter().filter(|l| l.is_active).cloned().collect())
    }

    async fn find_listing(&self, id: Uuid) -> StoreResult<Option<ProduceListing>> {
        let c = self.inner.read().await;
        Ok(c.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn update_listing(&self, id: Uuid, patch: ListingPatch) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let Some(listing) = c.listings.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        patch.apply_to(listing);
        listing.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }

    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let before = c.listings.len();
        c.listings.retain(|l| l.id != id);
        Ok(c.listings.len() != before)
    }

    async fn insert_request(&self, request: NewBuyerRequest) -> StoreResult<BuyerRequest> {
        let request = BuyerRequest {
            id: Uuid::new_v4(),
            buyer_id: request.buyer_id,
            produce_type: request.produce_type,
            quantity_needed: request.quantity_needed,
            unit: request.unit,
            delivery_location: request.delivery_location,
            target_price_per_unit: request.target_price_per_unit,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.write().await.requests.push(request.clone());
        Ok(request)
    }

    async fn active_requests(&self) -> StoreResult<Vec<BuyerRequest>> {
        let c = self.inner.read().await;
        Ok(c.requests.iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<BuyerRequest>> {
        let c = self.inner.read().await;
        Ok(c.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn update_request(&self, id: Uuid, patch: RequestPatch) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let Some(request) = c.requests.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        patch.apply_to(request);
        Ok(true)
    }

    async fn delete_request(&self, id: Uuid) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let before = c.requests.len();
        c.requests.retain(|r| r.id != id);
        Ok(c.requests.len() != before)
    }

    async fn insert_price(&self, price: NewMarketPrice) -> StoreResult<MarketPrice> {
        let price = MarketPrice {
            id: Uuid::new_v4(),
            produce_type: price.produce_type,
            region: price.region,
            price: price.price,
            unit: price.unit,
            date_recorded: price.date_recorded,
        };
        self.inner.write().await.prices.push(price.clone());
        Ok(price)
    }

    async fn query_prices(&self, filter: &PriceFilter) -> StoreResult<Vec<MarketPrice>> {
        let c = self.inner.read().await;
        let mut rows: Vec<MarketPrice> =
            c.prices.iter().filter(|p| filter.matches(p)).cloned().collect();
        rows.sort_by(|a, b| b.date_recorded.cmp(&a.date_recorded));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Role;
    use time::macros::date;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            user_type: Role::Buyer,
            contact_number: "0700000000".into(),
            location: "Eldoret".into(),
            name: "B".into(),
        }
    }

    fn new_price(produce_type: &str, day: time::Date) -> NewMarketPrice {
        NewMarketPrice {
            produce_type: produce_type.into(),
            region: "Nakuru".into(),
            price: 30.0,
            unit: "kg".into(),
            date_recorded: day,
        }
    }

    fn price(produce_type: &str, region: &str, day: time::Date) -> MarketPrice {
        MarketPrice {
            id: Uuid::new_v4(),
            produce_type: produce_type.into(),
            region: region.into(),
            price: 40.0,
            unit: "kg".into(),
            date_recorded: day,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let p = price("maize", "Nakuru", date!(2024 - 05 - 01));
        assert!(PriceFilter::default().matches(&p));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = PriceFilter {
            date_from: Some(date!(2024 - 05 - 01)),
            date_to: Some(date!(2024 - 05 - 03)),
            ..Default::default()
        };
        assert!(filter.matches(&price("maize", "Nakuru", date!(2024 - 05 - 01))));
        assert!(filter.matches(&price("maize", "Nakuru", date!(2024 - 05 - 03))));
        assert!(!filter.matches(&price("maize", "Nakuru", date!(2024 - 04 - 30))));
        assert!(!filter.matches(&price("maize", "Nakuru", date!(2024 - 05 - 04))));
    }

    #[test]
    fn type_and_region_are_exact() {
        let filter = PriceFilter {
            produce_type: Some("maize".into()),
            region: Some("Nakuru".into()),
            ..Default::default()
        };
        assert!(filter.matches(&price("maize", "Nakuru", date!(2024 - 05 - 01))));
        assert!(!filter.matches(&price("Maize", "Nakuru", date!(2024 - 05 - 01))));
        assert!(!filter.matches(&price("maize", "Eldoret", date!(2024 - 05 - 01))));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.insert_user(new_user("b@x.com")).await.unwrap();
        let err = store.insert_user(new_user("b@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn prices_come_back_newest_first() {
        let store = InMemoryStore::new();
        store.insert_price(new_price("maize", date!(2024 - 05 - 02))).await.unwrap();
        store.insert_price(new_price("maize", date!(2024 - 05 - 05))).await.unwrap();
        store.insert_price(new_price("beans", date!(2024 - 05 - 01))).await.unwrap();

        let all = store.query_prices(&PriceFilter::default()).await.unwrap();
        let days: Vec<_> = all.iter().map(|p| p.date_recorded).collect();
        assert_eq!(
            days,
            vec![date!(2024 - 05 - 05), date!(2024 - 05 - 02), date!(2024 - 05 - 01)]
        );

        let maize = store
            .query_prices(&PriceFilter {
                produce_type: Some("maize".into()),
                date_to: Some(date!(2024 - 05 - 04)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(maize.len(), 1);
        assert_eq!(maize[0].date_recorded, date!(2024 - 05 - 02));
    }

    #[tokio::test]
    async fn deactivated_listings_drop_out_of_active_set() {
        let store = InMemoryStore::new();
        let listing = store
            .insert_listing(NewListing {
                farmer_id: Uuid::new_v4(),
                produce_type: "maize".into(),
                quantity: 100.0,
                unit: "kg".into(),
                price_per_unit: 35.0,
                available_from: date!(2024 - 05 - 01),
                available_until: date!(2024 - 06 - 01),
            })
            .await
            .unwrap();
        assert_eq!(store.active_listings().await.unwrap().len(), 1);

        let patch = ListingPatch {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(store.update_listing(listing.id, patch).await.unwrap());
        assert!(store.active_listings().await.unwrap().is_empty());

        let stored = store.find_listing(listing.id).await.unwrap().unwrap();
        assert!(stored.updated_at >= stored.created_at);
        assert!(!store
            .update_listing(Uuid::new_v4(), ListingPatch::default())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_went() {
        let store = InMemoryStore::new();
        let request = store
            .insert_request(NewBuyerRequest {
                buyer_id: Uuid::new_v4(),
                produce_type: "beans".into(),
                quantity_needed: 20.0,
                unit: "kg".into(),
                delivery_location: "Kisumu".into(),
                target_price_per_unit: None,
            })
            .await
            .unwrap();
        assert!(store.delete_request(request.id).await.unwrap());
        assert!(!store.delete_request(request.id).await.unwrap());
        assert!(store.find_request(request.id).await.unwrap().is_none());
    }
}
