use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use farmstand::api::handlers::AppState;
use farmstand::api::routes::create_router;
use farmstand::config::{
    DatabaseConfig, MediaConfig, PaginationConfig, ServerConfig, Settings,
};
use farmstand::db::models::{NewListing, NewUser};
use farmstand::db::{listings, users};
use farmstand::media::ImageResolver;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

fn test_settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            url: ":memory:".to_string(),
            max_connections: 5,
            min_connections: 2,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            api_rate_limit: 100,
        },
        media: MediaConfig {
            base_url: "http://api.example.com".to_string(),
            max_listing_images: 50,
        },
        pagination: PaginationConfig {
            api_max_limit: 100,
            max_request_body_size: 1048576,
        },
    }
}

async fn setup() -> (AppState, i64) {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let farmer = users::create_user(
        &pool,
        &NewUser {
            role: "farmer".to_string(),
            display_name: "Green Acres".to_string(),
            email: "farm@example.com".to_string(),
            location: Some("Vermont".to_string()),
            bio: None,
        },
    )
    .await
    .expect("Failed to create farmer");

    let settings = test_settings();
    let resolver = Arc::new(ImageResolver::from_config(&settings.media));

    (
        AppState {
            pool,
            resolver,
            settings,
        },
        farmer.id,
    )
}

async fn insert_listing(state: &AppState, farmer_id: i64, image_data: Option<&str>) -> i64 {
    let listing = listings::create_listing(
        &state.pool,
        &NewListing {
            farmer_id,
            title: "Heirloom Tomatoes".to_string(),
            description: Some("Vine ripened".to_string()),
            category: Some("vegetables".to_string()),
            price_cents: 450,
            quantity: 20,
            unit: "lb".to_string(),
            image_data: image_data.map(|s| s.to_string()),
        },
    )
    .await
    .expect("Failed to create listing");

    listing.id
}

async fn fetch_listing_images(state: &AppState, listing_id: i64) -> Vec<String> {
    let app = create_router(state.clone(), &state.settings);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/listings/{listing_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let detail: serde_json::Value = serde_json::from_slice(&bytes).expect("Invalid JSON body");

    detail["images"]
        .as_array()
        .expect("images must be an array")
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_structured_images_array() {
    let (state, farmer_id) = setup().await;
    let id = insert_listing(
        &state,
        farmer_id,
        Some(r#"{"images": ["/uploads/a.jpg", {"url": "b.jpg"}, {"path": "c.jpg"}]}"#),
    )
    .await;

    assert_eq!(
        fetch_listing_images(&state, id).await,
        vec![
            "http://api.example.com/uploads/a.jpg",
            "http://api.example.com/b.jpg",
            "http://api.example.com/c.jpg",
        ]
    );
}

#[tokio::test]
async fn test_legacy_json_encoded_string() {
    let (state, farmer_id) = setup().await;
    let id = insert_listing(
        &state,
        farmer_id,
        Some(r#"{"image_urls": "[\"p/1.jpg\",\"http://cdn/2.jpg\"]"}"#),
    )
    .await;

    assert_eq!(
        fetch_listing_images(&state, id).await,
        vec!["http://api.example.com/p/1.jpg", "http://cdn/2.jpg"]
    );
}

#[tokio::test]
async fn test_legacy_comma_separated_string() {
    let (state, farmer_id) = setup().await;
    let id = insert_listing(&state, farmer_id, Some(r#"{"image_urls": "d.jpg, e.jpg"}"#)).await;

    assert_eq!(
        fetch_listing_images(&state, id).await,
        vec!["http://api.example.com/d.jpg", "http://api.example.com/e.jpg"]
    );
}

#[tokio::test]
async fn test_legacy_scalar_image_field() {
    let (state, farmer_id) = setup().await;
    let id = insert_listing(&state, farmer_id, Some(r#"{"image": {"url": "f.jpg"}}"#)).await;

    assert_eq!(
        fetch_listing_images(&state, id).await,
        vec!["http://api.example.com/f.jpg"]
    );
}

#[tokio::test]
async fn test_precedence_skips_lower_sources() {
    let (state, farmer_id) = setup().await;
    let id = insert_listing(
        &state,
        farmer_id,
        Some(r#"{"images": [], "image_urls": "[\"p/1.jpg\",\"http://cdn/2.jpg\"]", "image": "z.jpg"}"#),
    )
    .await;

    // Empty `images` falls through; `image_urls` contributes, so the scalar
    // `image` is never reached
    assert_eq!(
        fetch_listing_images(&state, id).await,
        vec!["http://api.example.com/p/1.jpg", "http://cdn/2.jpg"]
    );
}

#[tokio::test]
async fn test_missing_and_malformed_image_data() {
    let (state, farmer_id) = setup().await;

    let absent = insert_listing(&state, farmer_id, None).await;
    assert!(fetch_listing_images(&state, absent).await.is_empty());

    let malformed = insert_listing(&state, farmer_id, Some("not json at all {{{")).await;
    assert!(fetch_listing_images(&state, malformed).await.is_empty());
}

#[tokio::test]
async fn test_listing_cards_carry_resolved_images() {
    let (state, farmer_id) = setup().await;
    insert_listing(&state, farmer_id, Some(r#"{"uploadedImages": ["g.jpg"]}"#)).await;

    let app = create_router(state.clone(), &state.settings);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/listings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("Invalid JSON body");

    let cards = body["listings"].as_array().expect("listings array");
    assert_eq!(cards.len(), 1);
    assert_eq!(
        cards[0]["images"],
        serde_json::json!(["http://api.example.com/g.jpg"])
    );
}
