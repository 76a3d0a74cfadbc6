use crate::media::ImageResolver;
use crate::Result;
use serde_json::Value;

/// Resolve and print the image URLs of a listing record read from a file.
///
/// Useful for checking what a given historical row will render as without
/// going through the API.
pub async fn resolve_listing_images(resolver: &ImageResolver, path: &str) -> Result<()> {
    let raw = tokio::fs::read_to_string(path).await?;

    // Malformed records resolve to no images, same as at the API boundary
    let record: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
    let urls = resolver.extract(&record);

    if urls.is_empty() {
        println!("No images found");
        return Ok(());
    }

    for url in urls {
        println!("{url}");
    }

    Ok(())
}
