//! Turning a submitted checkout form into order items.
//!
//! The browser posts the photo list and format id it serialized at checkout.
//! Nothing in that payload is trusted for pricing: the selection is replayed
//! through a `SelectionCart` over a `HeadlessSurface` with the stored format,
//! and the cart's own checkout output becomes the order's item list.

use crate::cart::{CheckoutForm, CheckoutPayload, HeadlessSurface, PhotoId, SelectionCart};
use crate::error::AppError;
use crate::models::{Album, OrderItem, Photo, ProductFormat};
use crate::pricing::Price;
use crate::store;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Fields of the gallery's checkout form.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSubmission {
    pub photos: String,
    pub format_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

/// Server-side stand-in for the hidden order form.
#[derive(Debug, Default)]
pub struct OrderDraft {
    photos_json: String,
    format_id: String,
}

impl CheckoutForm for OrderDraft {
    type Submitted = CheckoutPayload;

    fn set_photos(&mut self, photos_json: String) {
        self.photos_json = photos_json;
    }

    fn set_format(&mut self, format_id: String) {
        self.format_id = format_id;
    }

    fn submit(self) -> CheckoutPayload {
        CheckoutPayload {
            photos_json: self.photos_json,
            format_id: self.format_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedSelection {
    pub format: ProductFormat,
    pub items: Vec<OrderItem>,
    pub total: Price,
}

pub fn parse_photo_list(photos_json: &str) -> Result<Vec<PhotoId>, AppError> {
    serde_json::from_str(photos_json)
        .map_err(|e| AppError::BadRequest(format!("Invalid photo list: {}", e)))
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Re-price a submitted selection against stored photos and formats.
///
/// Unknown photo ids are dropped and duplicates collapse; if nothing is left
/// the request is rejected with the empty-selection message. All photos must
/// come from one album, and that album must still be open.
pub fn price_submission(db: &sled::Db, submission: &OrderSubmission) -> Result<PricedSelection, AppError> {
    price_submission_at(db, submission, Utc::now())
}

pub fn price_submission_at(
    db: &sled::Db,
    submission: &OrderSubmission,
    now: DateTime<Utc>,
) -> Result<PricedSelection, AppError> {
    let submitted = parse_photo_list(&submission.photos)?;

    let format = parse_id(&submission.format_id)
        .map(|id| store::get_format(db, id))
        .transpose()?
        .flatten()
        .ok_or_else(|| AppError::BadRequest("Unknown product format".to_string()))?;

    let mut cart = SelectionCart::initialize(HeadlessSurface::new(Some(format.pricing_option())));
    let mut album: Option<Album> = None;
    for id in &submitted {
        if cart.state().is_selected(id) {
            continue;
        }
        let photo = match parse_id(id) {
            Some(photo_id) => store::get_photo(db, photo_id)?,
            None => None,
        };
        let photo = match photo {
            Some(p) => p,
            None => {
                log::warn!("Ignoring unknown photo id {:?} in order submission", id);
                continue;
            }
        };

        match &album {
            Some(a) if a.id != photo.album_id => {
                return Err(AppError::BadRequest(
                    "An order can only contain photos from one album".to_string(),
                ));
            }
            Some(_) => {}
            None => album = Some(open_album(db, photo.album_id, now)?),
        }
        cart.toggle_photo(id);
    }

    let total = cart.state().total();
    let payload = cart
        .checkout(OrderDraft::default())
        .map_err(|rejected| AppError::BadRequest(rejected.error.to_string()))?;

    let mut items = Vec::new();
    for id in parse_photo_list(&payload.photos_json)? {
        items.push(OrderItem {
            photo_id: parse_id(&id),
            format_id: Some(format.id),
            full_set_album: None,
            label: format.name.clone(),
            unit_price: format.price,
            quantity: 1,
        });
    }

    Ok(PricedSelection {
        format,
        items,
        total,
    })
}

/// The album a submitted photo belongs to, refused once it has expired.
fn open_album(db: &sled::Db, album_id: u64, now: DateTime<Utc>) -> Result<Album, AppError> {
    let album = store::get_album(db, album_id)?
        .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;
    if album.is_expired_at(now) {
        return Err(AppError::BadRequest("Access to this album has expired".to_string()));
    }
    Ok(album)
}

/// Single item buying every photo of `album`.
pub fn full_set_item(album: &Album, photos: &[Photo]) -> OrderItem {
    OrderItem {
        photo_id: None,
        format_id: None,
        full_set_album: Some(album.id),
        label: format!("Full set of '{}' ({} photos)", album.title, photos.len()),
        unit_price: album.full_set_price,
        quantity: 1,
    }
}
