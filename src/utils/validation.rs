// Validation utilities
use crate::error::{Error, Result};
use url::Url;

/// Validate the configured media base origin: must parse as an http(s) URL
/// with a host. Relative image references are joined onto it verbatim, so a
/// bad value here would poison every resolved URL.
pub fn validate_base_origin(origin: &str) -> Result<Url> {
    let url = Url::parse(origin)?;

    match url.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(Error::Validation(format!(
                "Base origin must use http or https scheme: {origin}"
            )));
        }
    }

    url.host_str()
        .ok_or_else(|| Error::Validation("Base origin must have a valid host".to_string()))?;

    Ok(url)
}

/// Validate a user role
pub fn validate_role(role: &str) -> Result<()> {
    match role {
        "farmer" | "buyer" => Ok(()),
        _ => Err(Error::Validation(format!(
            "Invalid role: {role}. Must be farmer or buyer"
        ))),
    }
}

/// Validate a listing status
pub fn validate_listing_status(status: &str) -> Result<()> {
    match status {
        "active" | "sold_out" | "archived" => Ok(()),
        _ => Err(Error::Validation(format!(
            "Invalid listing status: {status}. Must be active, sold_out, or archived"
        ))),
    }
}

/// Validate an order status
pub fn validate_order_status(status: &str) -> Result<()> {
    match status {
        "pending" | "confirmed" | "fulfilled" | "cancelled" => Ok(()),
        _ => Err(Error::Validation(format!(
            "Invalid order status: {status}. Must be pending, confirmed, fulfilled, or cancelled"
        ))),
    }
}

/// Validate a price in cents
pub fn validate_price_cents(price_cents: i64) -> Result<()> {
    if price_cents <= 0 {
        return Err(Error::Validation(
            "Price must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Validate a quantity
pub fn validate_quantity(quantity: i64) -> Result<()> {
    if quantity <= 0 {
        return Err(Error::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
