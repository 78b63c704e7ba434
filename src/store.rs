//! sled-backed persistence.
//!
//! One tree per model, keyed by big-endian `u64` ids so iteration follows
//! creation order, with JSON values.

use crate::models::{
    Album, Customer, NewAlbumRequest, NewFormatRequest, Order, OrderItem, OrderStatus, Photo,
    ProductFormat, BONUS_THRESHOLD, DEFAULT_FULL_SET_PRICE,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const ALBUMS_TREE: &str = "albums";
const PHOTOS_TREE: &str = "photos";
const FORMATS_TREE: &str = "formats";
const ORDERS_TREE: &str = "orders";

/// Length of generated album access codes.
const ACCESS_TOKEN_LEN: usize = 24;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Generic helpers
// ============================================================================

fn put<T: Serialize>(db: &sled::Db, tree: &str, id: u64, value: &T) -> StoreResult<()> {
    let json = serde_json::to_vec(value)?;
    db.open_tree(tree)?.insert(id.to_be_bytes(), json)?;
    Ok(())
}

fn get<T: DeserializeOwned>(db: &sled::Db, tree: &str, id: u64) -> StoreResult<Option<T>> {
    match db.open_tree(tree)?.get(id.to_be_bytes())? {
        Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
        None => Ok(None),
    }
}

fn all<T: DeserializeOwned>(db: &sled::Db, tree: &str) -> StoreResult<Vec<T>> {
    db.open_tree(tree)?
        .iter()
        .values()
        .map(|v| -> StoreResult<T> { Ok(serde_json::from_slice(&v?)?) })
        .collect()
}

fn next_id(db: &sled::Db) -> StoreResult<u64> {
    // sled ids start at zero; keep zero free so it never reads as "unset".
    Ok(db.generate_id()? + 1)
}

fn generate_access_token() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(ACCESS_TOKEN_LEN)
        .map(char::from)
        .collect()
}

// ============================================================================
// Albums
// ============================================================================

pub fn create_album(db: &sled::Db, req: NewAlbumRequest, now: DateTime<Utc>) -> StoreResult<Album> {
    if req.title.trim().is_empty() {
        return Err(StoreError::Invalid("Album title is required".to_string()));
    }
    if let Some(parent_id) = req.parent {
        check_parent(db, parent_id)?;
    }

    let album = Album {
        id: next_id(db)?,
        title: req.title.trim().to_string(),
        description: req.description,
        access_token: generate_access_token(),
        created_at: now,
        expires_at: req.expires_at,
        full_set_price: req.full_set_price.unwrap_or(DEFAULT_FULL_SET_PRICE),
        parent: req.parent,
        is_folder: req.is_folder,
    };
    put(db, ALBUMS_TREE, album.id, &album)?;
    Ok(album)
}

fn check_parent(db: &sled::Db, parent_id: u64) -> StoreResult<()> {
    let parent: Album = get(db, ALBUMS_TREE, parent_id)?.ok_or(StoreError::NotFound("Parent folder"))?;
    if !parent.is_folder {
        return Err(StoreError::Invalid(
            "Only folders can contain other albums".to_string(),
        ));
    }
    Ok(())
}

/// Re-home an album under another folder (or at the top level).
pub fn move_album(db: &sled::Db, album_id: u64, parent: Option<u64>) -> StoreResult<Album> {
    let mut album = get_album(db, album_id)?.ok_or(StoreError::NotFound("Album"))?;
    if let Some(parent_id) = parent {
        if parent_id == album_id || is_ancestor(db, album_id, parent_id)? {
            return Err(StoreError::Invalid(
                "An album cannot be moved into itself or one of its sub-folders".to_string(),
            ));
        }
        check_parent(db, parent_id)?;
    }
    album.parent = parent;
    put(db, ALBUMS_TREE, album.id, &album)?;
    Ok(album)
}

/// Whether `ancestor` appears on the parent chain above `album_id`.
fn is_ancestor(db: &sled::Db, ancestor: u64, album_id: u64) -> StoreResult<bool> {
    let mut seen = std::collections::HashSet::new();
    let mut current = get_album(db, album_id)?.and_then(|a| a.parent);
    while let Some(id) = current {
        if id == ancestor {
            return Ok(true);
        }
        // stop on a pre-existing loop
        if !seen.insert(id) {
            return Ok(false);
        }
        current = get_album(db, id)?.and_then(|a| a.parent);
    }
    Ok(false)
}

pub fn get_album(db: &sled::Db, id: u64) -> StoreResult<Option<Album>> {
    get(db, ALBUMS_TREE, id)
}

pub fn find_album_by_token(db: &sled::Db, token: &str) -> StoreResult<Option<Album>> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    Ok(all::<Album>(db, ALBUMS_TREE)?
        .into_iter()
        .find(|a| a.access_token == token))
}

/// Albums directly under `parent` (top level for `None`), sorted by title.
pub fn all_albums(db: &sled::Db) -> StoreResult<Vec<Album>> {
    all(db, ALBUMS_TREE)
}

pub fn child_albums(db: &sled::Db, parent: Option<u64>) -> StoreResult<Vec<Album>> {
    let mut albums: Vec<Album> = all::<Album>(db, ALBUMS_TREE)?
        .into_iter()
        .filter(|a| a.parent == parent)
        .collect();
    albums.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(albums)
}

// ============================================================================
// Photos
// ============================================================================

pub fn add_photo(
    db: &sled::Db,
    album_id: u64,
    file_name: &str,
    preview_file: Option<&str>,
    now: DateTime<Utc>,
) -> StoreResult<Photo> {
    let album = get_album(db, album_id)?.ok_or(StoreError::NotFound("Album"))?;
    if album.is_folder {
        return Err(StoreError::Invalid(
            "Photos belong in albums, not folders".to_string(),
        ));
    }

    let photo = Photo {
        id: next_id(db)?,
        album_id,
        file_name: file_name.to_string(),
        preview_file: preview_file.map(str::to_string),
        uploaded_at: now,
    };
    put(db, PHOTOS_TREE, photo.id, &photo)?;
    Ok(photo)
}

pub fn get_photo(db: &sled::Db, id: u64) -> StoreResult<Option<Photo>> {
    get(db, PHOTOS_TREE, id)
}

/// Photos of one album in upload order.
pub fn album_photos(db: &sled::Db, album_id: u64) -> StoreResult<Vec<Photo>> {
    Ok(all::<Photo>(db, PHOTOS_TREE)?
        .into_iter()
        .filter(|p| p.album_id == album_id)
        .collect())
}

// ============================================================================
// Product Formats
// ============================================================================

pub fn create_format(db: &sled::Db, req: NewFormatRequest) -> StoreResult<ProductFormat> {
    if req.name.trim().is_empty() {
        return Err(StoreError::Invalid("Format name is required".to_string()));
    }
    let format = ProductFormat {
        id: next_id(db)?,
        name: req.name.trim().to_string(),
        price: req.price,
    };
    put(db, FORMATS_TREE, format.id, &format)?;
    Ok(format)
}

pub fn get_format(db: &sled::Db, id: u64) -> StoreResult<Option<ProductFormat>> {
    get(db, FORMATS_TREE, id)
}

pub fn list_formats(db: &sled::Db) -> StoreResult<Vec<ProductFormat>> {
    all(db, FORMATS_TREE)
}

// ============================================================================
// Orders
// ============================================================================

/// Persist a new order. The bonus flag is decided here from the item total.
pub fn create_order(
    db: &sled::Db,
    customer: Customer,
    items: Vec<OrderItem>,
    now: DateTime<Utc>,
) -> StoreResult<Order> {
    let mut order = Order {
        id: next_id(db)?,
        customer,
        created_at: now,
        status: OrderStatus::New,
        receipt: None,
        received_bonus: false,
        items,
    };
    order.received_bonus = order.total() >= BONUS_THRESHOLD;
    put(db, ORDERS_TREE, order.id, &order)?;
    Ok(order)
}

pub fn get_order(db: &sled::Db, id: u64) -> StoreResult<Option<Order>> {
    get(db, ORDERS_TREE, id)
}

/// All orders, newest first.
pub fn list_orders(db: &sled::Db) -> StoreResult<Vec<Order>> {
    let mut orders: Vec<Order> = all(db, ORDERS_TREE)?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(orders)
}

pub fn set_order_status(db: &sled::Db, id: u64, status: OrderStatus) -> StoreResult<Order> {
    let mut order = get_order(db, id)?.ok_or(StoreError::NotFound("Order"))?;
    order.status = status;
    put(db, ORDERS_TREE, order.id, &order)?;
    Ok(order)
}

/// Attach an uploaded receipt and mark the order paid.
pub fn attach_receipt(db: &sled::Db, id: u64, receipt: &str) -> StoreResult<Order> {
    let mut order = get_order(db, id)?.ok_or(StoreError::NotFound("Order"))?;
    order.receipt = Some(receipt.to_string());
    order.status = OrderStatus::Paid;
    put(db, ORDERS_TREE, order.id, &order)?;
    Ok(order)
}
