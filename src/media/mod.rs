// Listing image resolution
//
// Listing photos have been stored in several different shapes over the life of
// the marketplace: a structured array, a JSON-encoded string, a comma-separated
// string, a couple of alternate field names, and a single scalar field. The
// resolver reconciles all of them into one ordered, deduplicated list of
// absolute URLs that views can render directly.

use serde_json::Value;
use std::collections::HashSet;

use crate::config::MediaConfig;

/// Resolves the image references of a listing record into absolute URLs.
///
/// The base origin is fixed at construction, so the same input always yields
/// the same output for a given resolver instance. Holds no other state and
/// performs no I/O; safe to share across handlers.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base: String,
    max_images: usize,
}

/// Array-shaped fallback fields probed after `images` and `image_urls`, in
/// descending precedence. `image_urls` (snake_case) deliberately outranks
/// `imageUrls` (camelCase); that is the order historical writers were
/// layered in.
const ARRAY_FIELDS: &[&str] = &["imageUrls", "uploadedImages", "uploaded_images"];

impl ImageResolver {
    pub fn new(base: impl Into<String>, max_images: usize) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base, max_images }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.base_url.clone(), config.max_listing_images)
    }

    /// Convert one image reference into an absolute URL.
    ///
    /// Already-absolute references are returned unchanged, byte-for-byte.
    /// Relative references are joined onto the base origin with exactly one
    /// separating slash. Empty references resolve to `None`.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Some(raw.to_string());
        }
        let cleaned = raw.strip_prefix('/').unwrap_or(raw);
        Some(format!("{}/{}", self.base, cleaned))
    }

    /// Extract every image URL a listing record carries.
    ///
    /// Sources are probed in fixed precedence order; the first source that
    /// contributes at least one URL wins and all lower-precedence sources are
    /// skipped. A field holding an empty array does not stop the scan.
    /// Malformed data never errors, it only narrows the output, down to an
    /// empty list at worst.
    pub fn extract(&self, listing: &Value) -> Vec<String> {
        let mut urls = Vec::new();
        let mut seen = HashSet::new();

        let Some(record) = listing.as_object() else {
            return urls;
        };

        if let Some(Value::Array(items)) = record.get("images") {
            self.collect_elements(items, &mut urls, &mut seen);
        }

        if urls.is_empty() {
            match record.get("image_urls") {
                Some(Value::Array(items)) => self.collect_elements(items, &mut urls, &mut seen),
                Some(Value::String(raw)) => self.collect_encoded(raw, &mut urls, &mut seen),
                _ => {}
            }
        }

        for field in ARRAY_FIELDS {
            if !urls.is_empty() {
                break;
            }
            if let Some(Value::Array(items)) = record.get(*field) {
                self.collect_elements(items, &mut urls, &mut seen);
            }
        }

        if urls.is_empty() {
            if let Some(element) = record.get("image") {
                self.push_element(element, &mut urls, &mut seen);
            }
        }

        urls
    }

    /// Resolve each element of an array-shaped source.
    fn collect_elements(&self, items: &[Value], urls: &mut Vec<String>, seen: &mut HashSet<String>) {
        for element in items {
            self.push_element(element, urls, seen);
        }
    }

    /// Resolve a string-shaped `image_urls` value: a JSON-encoded array when it
    /// parses as one, otherwise a comma-separated list of raw references.
    fn collect_encoded(&self, raw: &str, urls: &mut Vec<String>, seen: &mut HashSet<String>) {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => self.collect_elements(&items, urls, seen),
            // Valid JSON that is not an array contributes nothing; the scan
            // falls through to the next source.
            Ok(_) => {}
            Err(_) => {
                for piece in raw.split(',') {
                    self.push_raw(piece.trim(), urls, seen);
                }
            }
        }
    }

    /// Resolve one element: a raw string, or a mapping carrying `url`/`path`.
    /// Anything else is skipped silently.
    fn push_element(&self, element: &Value, urls: &mut Vec<String>, seen: &mut HashSet<String>) {
        match element {
            Value::String(raw) => self.push_raw(raw, urls, seen),
            Value::Object(map) => {
                let raw = map
                    .get("url")
                    .and_then(Value::as_str)
                    .or_else(|| map.get("path").and_then(Value::as_str));
                if let Some(raw) = raw {
                    self.push_raw(raw, urls, seen);
                }
            }
            _ => {}
        }
    }

    fn push_raw(&self, raw: &str, urls: &mut Vec<String>, seen: &mut HashSet<String>) {
        if urls.len() >= self.max_images {
            return;
        }
        if let Some(url) = self.normalize(raw) {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAX: usize = 50;

    fn resolver() -> ImageResolver {
        ImageResolver::new("http://localhost:5000", MAX)
    }

    #[test]
    fn test_normalize_relative_path() {
        let r = resolver();
        assert_eq!(
            r.normalize("uploads/a.jpg"),
            Some("http://localhost:5000/uploads/a.jpg".to_string())
        );
        // At most one leading slash is stripped
        assert_eq!(
            r.normalize("/uploads/a.jpg"),
            Some("http://localhost:5000/uploads/a.jpg".to_string())
        );
    }

    #[test]
    fn test_normalize_absolute_is_idempotent() {
        let r = resolver();
        let absolute = "https://cdn.example.com/a.jpg";
        let once = r.normalize(absolute).unwrap();
        assert_eq!(once, absolute);
        assert_eq!(r.normalize(&once).unwrap(), once);
    }

    #[test]
    fn test_normalize_empty_is_none() {
        assert_eq!(resolver().normalize(""), None);
    }

    #[test]
    fn test_trailing_slash_on_base_is_stripped() {
        let r = ImageResolver::new("http://x/", MAX);
        assert_eq!(r.normalize("a.jpg"), Some("http://x/a.jpg".to_string()));
    }

    #[test]
    fn test_images_array_of_strings_and_objects() {
        let r = resolver();
        let listing = json!({
            "images": ["a.jpg", {"url": "b.jpg"}, {"path": "c.jpg"}, 42, null]
        });
        assert_eq!(
            r.extract(&listing),
            vec![
                "http://localhost:5000/a.jpg",
                "http://localhost:5000/b.jpg",
                "http://localhost:5000/c.jpg",
            ]
        );
    }

    #[test]
    fn test_images_outranks_scalar_image() {
        let r = resolver();
        let listing = json!({
            "images": ["a.jpg"],
            "image": "z.jpg"
        });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/a.jpg"]);
    }

    #[test]
    fn test_empty_array_falls_through() {
        let r = resolver();
        let listing = json!({
            "images": [],
            "imageUrls": ["a.jpg"]
        });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/a.jpg"]);
    }

    #[test]
    fn test_dedup_after_normalization() {
        let r = ImageResolver::new("http://x", MAX);
        let listing = json!({
            "images": ["http://x/a.jpg", "/a.jpg"]
        });
        assert_eq!(r.extract(&listing), vec!["http://x/a.jpg"]);
    }

    #[test]
    fn test_image_urls_json_encoded_string() {
        let r = resolver();
        let listing = json!({
            "image_urls": "[\"b.jpg\",\"c.jpg\"]"
        });
        assert_eq!(
            r.extract(&listing),
            vec!["http://localhost:5000/b.jpg", "http://localhost:5000/c.jpg"]
        );
    }

    #[test]
    fn test_image_urls_comma_separated_fallback() {
        let r = resolver();
        let listing = json!({
            "image_urls": "d.jpg, e.jpg"
        });
        assert_eq!(
            r.extract(&listing),
            vec!["http://localhost:5000/d.jpg", "http://localhost:5000/e.jpg"]
        );
    }

    #[test]
    fn test_snake_case_image_urls_outranks_camel_case() {
        let r = resolver();
        let listing = json!({
            "image_urls": ["a.jpg"],
            "imageUrls": ["b.jpg"]
        });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/a.jpg"]);
    }

    #[test]
    fn test_uploaded_images_variants() {
        let r = resolver();
        let listing = json!({ "uploadedImages": ["a.jpg"] });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/a.jpg"]);

        let listing = json!({ "uploaded_images": [{"url": "b.jpg"}] });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/b.jpg"]);
    }

    #[test]
    fn test_scalar_image_string_and_object() {
        let r = resolver();
        let listing = json!({ "image": {"url": "f.jpg"} });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/f.jpg"]);

        let listing = json!({ "image": "g.jpg" });
        assert_eq!(r.extract(&listing), vec!["http://localhost:5000/g.jpg"]);
    }

    #[test]
    fn test_no_image_fields_yields_empty() {
        let r = resolver();
        assert_eq!(r.extract(&json!({"title": "Carrots"})), Vec::<String>::new());
        assert_eq!(r.extract(&json!(null)), Vec::<String>::new());
        assert_eq!(r.extract(&json!("not an object")), Vec::<String>::new());
    }

    #[test]
    fn test_first_contributing_source_wins() {
        let r = ImageResolver::new("http://api.example.com", MAX);
        let listing = json!({
            "images": [],
            "image_urls": "[\"p/1.jpg\",\"http://cdn/2.jpg\"]",
            "image": "z.jpg"
        });
        assert_eq!(
            r.extract(&listing),
            vec!["http://api.example.com/p/1.jpg", "http://cdn/2.jpg"]
        );
    }

    #[test]
    fn test_cap_bounds_output() {
        let r = ImageResolver::new("http://x", 2);
        let listing = json!({
            "images": ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]
        });
        assert_eq!(r.extract(&listing), vec!["http://x/a.jpg", "http://x/b.jpg"]);
    }

    #[test]
    fn test_csv_pieces_are_trimmed_and_blanks_skipped() {
        let r = resolver();
        let listing = json!({ "image_urls": " a.jpg , , b.jpg ," });
        assert_eq!(
            r.extract(&listing),
            vec!["http://localhost:5000/a.jpg", "http://localhost:5000/b.jpg"]
        );
    }
}
