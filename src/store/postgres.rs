use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    BuyerRequest, ListingPatch, MarketPrice, NewBuyerRequest, NewListing, NewMarketPrice,
    NewUser, PriceFilter, ProduceListing, RequestPatch, Store, StoreError, StoreResult, User,
};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// `users` row; the role column is plain text.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    user_type: String,
    contact_number: String,
    location: String,
    name: String,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_type: r.user_type.parse().map_err(StoreError::Corrupt)?,
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            contact_number: r.contact_number,
            location: r.location,
            name: r.name,
            created_at: r.created_at,
        })
    }
}

fn unique_violation(e: sqlx::Error, what: &'static str) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate(what),
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, user_type, contact_number, location, name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, password_hash, user_type, contact_number, location, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .bind(&user.contact_number)
        .bind(&user.location)
        .bind(&user.name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| unique_violation(e, "email"))?;
        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, user_type, contact_number, location, name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, user_type, contact_number, location, name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn insert_listing(&self, listing: NewListing) -> StoreResult<ProduceListing> {
        let row = sqlx::query_as::<_, ProduceListing>(
            r#"
            INSERT INTO produce_listings
                (id, farmer_id, produce_type, quantity, unit, price_per_unit,
                 available_from, available_until, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING id, farmer_id, produce_type, quantity, unit, price_per_unit,
                      available_from, available_until, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing.farmer_id)
        .bind(&listing.produce_type)
        .bind(listing.quantity)
        .bind(&listing.unit)
        .bind(listing.price_per_unit)
        .bind(listing.available_from)
        .bind(listing.available_until)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn active_listings(&self) -> StoreResult<Vec<ProduceListing>> {
        let rows = sqlx::query_as::<_, ProduceListing>(
            r#"
            SELECT id, farmer_id, produce_type, quantity, unit, price_per_unit,
                   available_from, available_until, is_active, created_at, updated_at
            FROM produce_listings
            WHERE is_active
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_listing(&self, id: Uuid) -> StoreResult<Option<ProduceListing>> {
        let row = sqlx::query_as::<_, ProduceListing>(
            r#"
            SELECT id, farmer_id, produce_type, quantity, unit, price_per_unit,
                   available_from, available_until, is_active, created_at, updated_at
            FROM produce_listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update_listing(&self, id: Uuid, patch: ListingPatch) -> StoreResult<bool> {
        let done = sqlx::query(
            r#"
            UPDATE produce_listings SET
                produce_type    = COALESCE($2, produce_type),
                quantity        = COALESCE($3, quantity),
                unit            = COALESCE($4, unit),
                price_per_unit  = COALESCE($5, price_per_unit),
                available_from  = COALESCE($6, available_from),
                available_until = COALESCE($7, available_until),
                is_active       = COALESCE($8, is_active),
                updated_at      = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.produce_type)
        .bind(patch.quantity)
        .bind(patch.unit)
        .bind(patch.price_per_unit)
        .bind(patch.available_from)
        .bind(patch.available_until)
        .bind(patch.is_active)
        .execute(&self.db)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_listing(&self, id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM produce_listings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_request(&self, request: NewBuyerRequest) -> StoreResult<BuyerRequest> {
        let row = sqlx::query_as::<_, BuyerRequest>(
            r#"
            INSERT INTO buyer_requests
                (id, buyer_id, produce_type, quantity_needed, unit, delivery_location,
                 target_price_per_unit, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING id, buyer_id, produce_type, quantity_needed, unit, delivery_location,
                      target_price_per_unit, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.buyer_id)
        .bind(&request.produce_type)
        .bind(request.quantity_needed)
        .bind(&request.unit)
        .bind(&request.delivery_location)
        .bind(request.target_price_per_unit)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn active_requests(&self) -> StoreResult<Vec<BuyerRequest>> {
        let rows = sqlx::query_as::<_, BuyerRequest>(
            r#"
            SELECT id, buyer_id, produce_type, quantity_needed, unit, delivery_location,
                   target_price_per_unit, is_active, created_at
            FROM buyer_requests
            WHERE is_active
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<BuyerRequest>> {
        let row = sqlx::query_as::<_, BuyerRequest>(
            r#"
            SELECT id, buyer_id, produce_type, quantity_needed, unit, delivery_location,
                   target_price_per_unit, is_active, created_at
            FROM buyer_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update_request(&self, id: Uuid, patch: RequestPatch) -> StoreResult<bool> {
        let done = sqlx::query(
            r#"
            UPDATE buyer_requests SET
                produce_type          = COALESCE($2, produce_type),
                quantity_needed       = COALESCE($3, quantity_needed),
                unit                  = COALESCE($4, unit),
                delivery_location     = COALESCE($5, delivery_location),
                target_price_per_unit = COALESCE($6, target_price_per_unit),
                is_active             = COALESCE($7, is_active)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.produce_type)
        .bind(patch.quantity_needed)
        .bind(patch.unit)
        .bind(patch.delivery_location)
        .bind(patch.target_price_per_unit)
        .bind(patch.is_active)
        .execute(&self.db)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_request(&self, id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM buyer_requests WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_price(&self, price: NewMarketPrice) -> StoreResult<MarketPrice> {
        let row = sqlx::query_as::<_, MarketPrice>(
            r#"
            INSERT INTO market_prices (id, produce_type, region, price, unit, date_recorded)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, produce_type, region, price, unit, date_recorded
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&price.produce_type)
        .bind(&price.region)
        .bind(price.price)
        .bind(&price.unit)
        .bind(price.date_recorded)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn query_prices(&self, filter: &PriceFilter) -> StoreResult<Vec<MarketPrice>> {
        let rows = sqlx::query_as::<_, MarketPrice>(
            r#"
            SELECT id, produce_type, region, price, unit, date_recorded
            FROM market_prices
            WHERE ($1::text IS NULL OR produce_type = $1)
              AND ($2::text IS NULL OR region = $2)
              AND ($3::date IS NULL OR date_recorded >= $3)
              AND ($4::date IS NULL OR date_recorded <= $4)
            ORDER BY date_recorded DESC
            "#,
        )
        .bind(filter.produce_type.as_deref())
        .bind(filter.region.as_deref())
        .bind(filter.date_from)
        .bind(filter.date_to)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
