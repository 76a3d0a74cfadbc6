use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*,
    db::{self, models::Listing},
    media::ImageResolver,
    utils::validation,
    Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub resolver: Arc<ImageResolver>,
    pub settings: crate::config::Settings,
}

/// Resolve a listing row's raw photo payload into absolute image URLs.
///
/// `image_data` holds whatever JSON the writing client's era produced; rows
/// that fail to parse simply resolve to no images.
fn resolve_images(resolver: &ImageResolver, listing: &Listing) -> Vec<String> {
    let record = listing
        .image_data
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or(serde_json::Value::Null);

    resolver.extract(&record)
}

fn listing_card(resolver: &ImageResolver, listing: Listing) -> ListingCard {
    let images = resolve_images(resolver, &listing);

    ListingCard {
        id: listing.id,
        title: listing.title,
        category: listing.category,
        price_cents: listing.price_cents,
        quantity: listing.quantity,
        unit: listing.unit,
        status: listing.status,
        images,
    }
}

/// GET /api/listings - Browse listings
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingsResponse>> {
    debug!("List listings request: {:?}", params);

    let limit = params
        .limit
        .clamp(1, state.settings.pagination.api_max_limit);
    let offset = params.page.saturating_sub(1) * limit;

    let listings = db::listings::list_listings(
        &state.pool,
        params.category.as_deref(),
        params.farmer_id,
        limit as i64,
        offset as i64,
    )
    .await?;

    let total =
        db::listings::count_listings(&state.pool, params.category.as_deref(), params.farmer_id)
            .await?;

    let cards = listings
        .into_iter()
        .map(|listing| listing_card(&state.resolver, listing))
        .collect();

    let total_pages = (total as usize).div_ceil(limit);

    Ok(Json(ListingsResponse {
        listings: cards,
        pagination: Pagination {
            page: params.page,
            limit,
            total: total as usize,
            total_pages,
        },
    }))
}

/// GET /api/listings/:id - Get listing details
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ListingDetail>> {
    debug!("Get listing request: {}", id);

    let with_farmer = db::listings::get_listing_with_farmer(&state.pool, id).await?;
    let images = resolve_images(&state.resolver, &with_farmer.listing);
    let listing = with_farmer.listing;

    Ok(Json(ListingDetail {
        id: listing.id,
        title: listing.title,
        description: listing.description,
        category: listing.category,
        price_cents: listing.price_cents,
        quantity: listing.quantity,
        unit: listing.unit,
        status: listing.status,
        images,
        farmer: FarmerProfile {
            id: with_farmer.farmer.id,
            display_name: with_farmer.farmer.display_name,
            location: with_farmer.farmer.location,
        },
        created_at: listing.created_at.to_rfc3339(),
    }))
}

/// POST /api/listings - Create a listing
pub async fn create_listing(
    State(state): State<AppState>,
    Json(req): Json<CreateListingRequest>,
) -> Result<Json<ListingCard>> {
    debug!("Create listing request from farmer {}", req.farmer_id);

    validation::validate_price_cents(req.price_cents)?;
    validation::validate_quantity(req.quantity)?;

    if req.title.trim().is_empty() {
        return Err(Error::Validation("Title must not be empty".to_string()));
    }

    let farmer = db::users::get_user(&state.pool, req.farmer_id).await?;
    if farmer.role != "farmer" {
        return Err(Error::Validation(format!(
            "User {} is not a farmer",
            farmer.id
        )));
    }

    // New writes always use the structured shape; older shapes only ever
    // arrive from existing rows.
    let image_data = if req.images.is_empty() {
        None
    } else {
        Some(serde_json::json!({ "images": req.images }).to_string())
    };

    let listing = db::listings::create_listing(
        &state.pool,
        &crate::db::models::NewListing {
            farmer_id: req.farmer_id,
            title: req.title,
            description: req.description,
            category: req.category,
            price_cents: req.price_cents,
            quantity: req.quantity,
            unit: req.unit,
            image_data,
        },
    )
    .await?;

    Ok(Json(listing_card(&state.resolver, listing)))
}

/// POST /api/orders - Place an order
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderDetail>> {
    debug!(
        "Create order request: listing {} buyer {}",
        req.listing_id, req.buyer_id
    );

    validation::validate_quantity(req.quantity)?;

    let buyer = db::users::get_user(&state.pool, req.buyer_id).await?;
    if buyer.role != "buyer" {
        return Err(Error::Validation(format!(
            "User {} is not a buyer",
            buyer.id
        )));
    }

    let order = db::orders::create_order(
        &state.pool,
        &crate::db::models::NewOrder {
            listing_id: req.listing_id,
            buyer_id: req.buyer_id,
            quantity: req.quantity,
        },
    )
    .await?;

    Ok(Json(order_detail(order)))
}

/// GET /api/orders - List a buyer's orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<OrdersResponse>> {
    debug!("List orders request: {:?}", params);

    let limit = params
        .limit
        .clamp(1, state.settings.pagination.api_max_limit);
    let offset = params.page.saturating_sub(1) * limit;

    let orders = db::orders::list_orders_by_buyer(
        &state.pool,
        params.buyer_id,
        limit as i64,
        offset as i64,
    )
    .await?;

    let total = db::orders::count_orders_by_buyer(&state.pool, params.buyer_id).await?;
    let total_pages = (total as usize).div_ceil(limit);

    Ok(Json(OrdersResponse {
        orders: orders.into_iter().map(order_detail).collect(),
        pagination: Pagination {
            page: params.page,
            limit,
            total: total as usize,
            total_pages,
        },
    }))
}

/// GET /api/orders/:id - Get order details
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>> {
    debug!("Get order request: {}", id);

    let order = db::orders::get_order(&state.pool, id).await?;
    Ok(Json(order_detail(order)))
}

/// PUT /api/orders/:id/status - Update order status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderDetail>> {
    debug!("Update order status request: {} -> {}", id, req.status);

    validation::validate_order_status(&req.status)?;
    db::orders::update_order_status(&state.pool, id, &req.status).await?;

    let order = db::orders::get_order(&state.pool, id).await?;
    Ok(Json(order_detail(order)))
}

/// PUT /api/listings/:id/status - Update listing status
pub async fn update_listing_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ListingCard>> {
    debug!("Update listing status request: {} -> {}", id, req.status);

    validation::validate_listing_status(&req.status)?;
    db::listings::update_listing_status(&state.pool, id, &req.status).await?;

    let listing = db::listings::get_listing(&state.pool, id).await?;
    Ok(Json(listing_card(&state.resolver, listing)))
}

fn order_detail(order: crate::db::models::Order) -> OrderDetail {
    OrderDetail {
        id: order.id,
        listing_id: order.listing_id,
        buyer_id: order.buyer_id,
        quantity: order.quantity,
        total_cents: order.total_cents,
        status: order.status,
        created_at: order.created_at.to_rfc3339(),
    }
}

/// POST /api/users - Register or update a profile (matched by email)
pub async fn upsert_user(
    State(state): State<AppState>,
    Json(req): Json<UpsertUserRequest>,
) -> Result<Json<UserProfile>> {
    debug!("Upsert user request: {}", req.email);

    validation::validate_role(&req.role)?;

    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(Error::Validation("Invalid email address".to_string()));
    }

    let user = match db::users::get_user_by_email(&state.pool, &req.email).await? {
        Some(existing) => {
            db::users::update_profile(
                &state.pool,
                existing.id,
                &crate::db::models::UpdateUser {
                    display_name: Some(req.display_name),
                    location: req.location,
                    bio: req.bio,
                },
            )
            .await?
        }
        None => {
            db::users::create_user(
                &state.pool,
                &crate::db::models::NewUser {
                    role: req.role,
                    display_name: req.display_name,
                    email: req.email,
                    location: req.location,
                    bio: req.bio,
                },
            )
            .await?
        }
    };

    Ok(Json(user_profile(user)))
}

/// GET /api/users/:id - Get profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>> {
    debug!("Get user request: {}", id);

    let user = db::users::get_user(&state.pool, id).await?;
    Ok(Json(user_profile(user)))
}

/// PUT /api/users/:id - Update profile fields
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    debug!("Update user request: {}", id);

    let user = db::users::update_profile(
        &state.pool,
        id,
        &crate::db::models::UpdateUser {
            display_name: req.display_name,
            location: req.location,
            bio: req.bio,
        },
    )
    .await?;

    Ok(Json(user_profile(user)))
}

fn user_profile(user: crate::db::models::User) -> UserProfile {
    UserProfile {
        id: user.id,
        role: user.role,
        display_name: user.display_name,
        email: user.email,
        location: user.location,
        bio: user.bio,
        created_at: user.created_at.to_rfc3339(),
    }
}

/// GET /api/stats - Get system statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    debug!("Get stats request");

    let total_users = db::users::count_users(&state.pool).await?;
    let total_listings = db::listings::count_all_listings(&state.pool).await?;
    let total_orders = db::orders::count_orders(&state.pool).await?;

    Ok(Json(Stats {
        total_users,
        total_listings,
        total_orders,
    }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    // Check database connectivity
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    Ok(Json(ReadinessResponse {
        ready: db_healthy,
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    }))
}
