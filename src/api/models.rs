use serde::{Deserialize, Serialize};

/// Listing list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub farmer_id: Option<i64>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

/// Listing list response
#[derive(Debug, Clone, Serialize)]
pub struct ListingsResponse {
    pub listings: Vec<ListingCard>,
    pub pagination: Pagination,
}

/// Listing card for browse views. `images` is already resolved to absolute
/// URLs; an empty list means the client should show its placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct ListingCard {
    pub id: i64,
    pub title: String,
    pub category: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub unit: String,
    pub status: String,
    pub images: Vec<String>,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Full listing details
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub unit: String,
    pub status: String,
    pub images: Vec<String>,
    pub farmer: FarmerProfile,
    pub created_at: String,
}

/// Farmer info embedded in listing details
#[derive(Debug, Clone, Serialize)]
pub struct FarmerProfile {
    pub id: i64,
    pub display_name: String,
    pub location: Option<String>,
}

/// Create listing request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    pub farmer_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub unit: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Create order request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub listing_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
}

/// Order list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct OrderListParams {
    pub buyer_id: i64,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Order list response
#[derive(Debug, Clone, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderDetail>,
    pub pagination: Pagination,
}

/// Status update request for listings and orders
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Order details
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
}

/// Profile upsert request; matched to an existing account by email
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertUserRequest {
    pub role: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Profile update request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Public user profile
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub role: String,
    pub display_name: String,
    pub email: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

/// System statistics
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_users: i64,
    pub total_listings: i64,
    pub total_orders: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: String,
}
