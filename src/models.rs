//! Data models for the proofing shop.
//!
//! Albums (and folders of albums), photos, product formats and orders.
//! Everything here is stored as JSON in sled, see `store`.

use crate::cart::{PhotoId, PricingOption};
use crate::pricing::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price of buying every photo of an album as one item.
pub const DEFAULT_FULL_SET_PRICE: Price = Price::from_cents(250_000);

/// Orders at or above this total earn the bonus.
pub const BONUS_THRESHOLD: Price = Price::from_cents(250_000);

// ============================================================================
// Albums and Photos
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub full_set_price: Price,
    pub parent: Option<u64>,
    /// A folder holds other albums; a plain album holds photos.
    pub is_folder: bool,
}

impl Album {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(until) if now > until)
    }

    pub fn share_path(&self) -> String {
        format!("/album/{}", self.access_token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: u64,
    pub album_id: u64,
    /// Original upload, relative to the originals directory.
    pub file_name: String,
    /// Watermarked preview, relative to the public media directory.
    #[serde(default)]
    pub preview_file: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl Photo {
    /// Identifier carried by this photo's card in the gallery.
    pub fn photo_id(&self) -> PhotoId {
        self.id.to_string()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.preview_file.as_ref().map(|f| format!("/media/{}", f))
    }
}

// ============================================================================
// Product Formats
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFormat {
    pub id: u64,
    pub name: String,
    pub price: Price,
}

impl ProductFormat {
    pub fn pricing_option(&self) -> PricingOption {
        PricingOption::new(self.id.to_string(), self.price)
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    New,
    Paid,
    Processing,
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "new"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    /// Split a free-form name into first name and the rest.
    pub fn from_form(full_name: &str, email: Option<String>, phone: Option<String>) -> Self {
        let mut parts = full_name.split_whitespace();
        let first_name = parts.next().unwrap_or("Guest").to_string();
        let rest: Vec<&str> = parts.collect();
        let blank_to_none = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            first_name,
            last_name: rest.join(" "),
            email: blank_to_none(email),
            phone: blank_to_none(phone),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub photo_id: Option<u64>,
    pub format_id: Option<u64>,
    pub full_set_album: Option<u64>,
    pub label: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl OrderItem {
    pub fn cost(&self) -> Price {
        self.unit_price.times(self.quantity as usize)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub customer: Customer,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub receipt: Option<String>,
    pub received_bonus: bool,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total(&self) -> Price {
        self.items
            .iter()
            .fold(Price::ZERO, |acc, item| acc.saturating_add(item.cost()))
    }
}

// ============================================================================
// Admin Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewAlbumRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub full_set_price: Option<Price>,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub is_folder: bool,
}

/// `parent: null` moves the album to the top level.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveAlbumRequest {
    pub parent: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFormatRequest {
    pub name: String,
    pub price: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(cents: u64, quantity: u32) -> OrderItem {
        OrderItem {
            photo_id: Some(1),
            format_id: Some(1),
            full_set_album: None,
            label: "10x15".to_string(),
            unit_price: Price::from_cents(cents),
            quantity,
        }
    }

    #[test]
    fn test_customer_name_split() {
        let c = Customer::from_form("  Anna Maria Petrova ", Some("".to_string()), None);
        assert_eq!(c.first_name, "Anna");
        assert_eq!(c.last_name, "Maria Petrova");
        assert_eq!(c.email, None);

        let c = Customer::from_form("", None, Some("+100".to_string()));
        assert_eq!(c.first_name, "Guest");
        assert_eq!(c.last_name, "");
        assert_eq!(c.full_name(), "Guest");
        assert_eq!(c.phone.as_deref(), Some("+100"));
    }

    #[test]
    fn test_order_total() {
        let order = Order {
            id: 1,
            customer: Customer::from_form("A", None, None),
            created_at: Utc::now(),
            status: OrderStatus::New,
            receipt: None,
            received_bonus: false,
            items: vec![item(250, 2), item(1000, 1)],
        };
        assert_eq!(order.total(), Price::from_cents(1500));
    }

    #[test]
    fn test_album_expiry() {
        let now = Utc::now();
        let mut album = Album {
            id: 1,
            title: "Class of 2026".to_string(),
            description: String::new(),
            access_token: "tok".to_string(),
            created_at: now,
            expires_at: None,
            full_set_price: DEFAULT_FULL_SET_PRICE,
            parent: None,
            is_folder: false,
        };
        assert!(!album.is_expired_at(now));

        album.expires_at = Some(now - Duration::hours(1));
        assert!(album.is_expired_at(now));

        album.expires_at = Some(now + Duration::hours(1));
        assert!(!album.is_expired_at(now));
        assert_eq!(album.share_path(), "/album/tok");
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: StatusUpdateRequest = serde_json::from_str(r#"{"status":"paid"}"#).unwrap();
        assert_eq!(back.status, OrderStatus::Paid);
    }
}
