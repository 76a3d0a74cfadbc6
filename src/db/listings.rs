use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Create a new listing
pub async fn create_listing(pool: &DbPool, new_listing: &NewListing) -> Result<Listing> {
    let now = Utc::now();

    let listing = sqlx::query_as::<_, Listing>(
        r#"
        INSERT INTO listings (
            farmer_id, title, description, category, price_cents,
            quantity, unit, status, image_data, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new_listing.farmer_id)
    .bind(&new_listing.title)
    .bind(&new_listing.description)
    .bind(&new_listing.category)
    .bind(new_listing.price_cents)
    .bind(new_listing.quantity)
    .bind(&new_listing.unit)
    .bind(&new_listing.image_data)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(listing)
}

/// Get listing by ID
pub async fn get_listing(pool: &DbPool, listing_id: i64) -> Result<Listing> {
    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = ?")
        .bind(listing_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Listing {listing_id} not found")))?;

    Ok(listing)
}

/// Get listing with farmer info
pub async fn get_listing_with_farmer(pool: &DbPool, listing_id: i64) -> Result<ListingWithFarmer> {
    let listing = get_listing(pool, listing_id).await?;

    let farmer: FarmerInfo =
        sqlx::query_as("SELECT id, display_name, location FROM users WHERE id = ?")
            .bind(listing.farmer_id)
            .fetch_one(pool)
            .await?;

    Ok(ListingWithFarmer { listing, farmer })
}

/// List listings, newest first, optionally filtered by category and/or farmer
pub async fn list_listings(
    pool: &DbPool,
    category: Option<&str>,
    farmer_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Listing>> {
    let listings = sqlx::query_as::<_, Listing>(
        r#"
        SELECT * FROM listings
        WHERE status = 'active'
          AND (? IS NULL OR category = ?)
          AND (? IS NULL OR farmer_id = ?)
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(category)
    .bind(category)
    .bind(farmer_id)
    .bind(farmer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(listings)
}

/// Count active listings matching the same filters as `list_listings`
pub async fn count_listings(
    pool: &DbPool,
    category: Option<&str>,
    farmer_id: Option<i64>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM listings
        WHERE status = 'active'
          AND (? IS NULL OR category = ?)
          AND (? IS NULL OR farmer_id = ?)
        "#,
    )
    .bind(category)
    .bind(category)
    .bind(farmer_id)
    .bind(farmer_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Update listing status
pub async fn update_listing_status(pool: &DbPool, listing_id: i64, status: &str) -> Result<()> {
    let now = Utc::now();

    let result = sqlx::query("UPDATE listings SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(listing_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Listing {listing_id} not found")));
    }

    Ok(())
}

/// Count all listings regardless of status
pub async fn count_all_listings(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
