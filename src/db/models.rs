use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub role: String,
    pub display_name: String,
    pub email: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub role: String,
    pub display_name: String,
    pub email: String,
    pub location: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: i64,
    pub farmer_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub unit: String,
    pub status: String,
    /// Raw photo payload as submitted by whichever client era wrote the row.
    /// Shape varies across historical rows; resolved at read time by
    /// `media::ImageResolver`, never rewritten in place.
    pub image_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub farmer_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub unit: String,
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
    pub total_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub listing_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FarmerInfo {
    pub id: i64,
    pub display_name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingWithFarmer {
    #[serde(flatten)]
    pub listing: Listing,
    pub farmer: FarmerInfo,
}
