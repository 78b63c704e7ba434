//! Admin area: album tree with share links, uploads, formats and orders.
//!
//! Pages redirect to `/login` without a session; JSON endpoints answer 401.

use crate::error::AppError;
use crate::models::{
    Album, MoveAlbumRequest, NewAlbumRequest, NewFormatRequest, Order, OrderItem, Photo,
    ProductFormat, StatusUpdateRequest,
};
use crate::preview::{preview_name, render_preview_blocking};
use crate::store;
use crate::templates::{base_html, copy_link_script, html_escape};
use crate::{store_media_file, AppState};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

fn require_admin(state: &AppState, jar: &CookieJar) -> Result<(), AppError> {
    if state.is_admin(jar) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

// ============================================================================
// Albums Page
// ============================================================================

fn album_tree_html(state: &AppState, parent: Option<u64>, depth: usize) -> Result<String, AppError> {
    let albums = store::child_albums(&state.db, parent)?;
    if albums.is_empty() {
        return Ok(String::new());
    }

    let mut html = format!(
        r#"<ul class="album-list" style="margin-left: {}rem">"#,
        depth * 2
    );
    for album in &albums {
        let badge = if album.is_folder {
            r#"<span class="folder-badge">folder</span>"#
        } else {
            ""
        };
        let share_path = album.share_path();
        let expires = album
            .expires_at
            .map(|at| format!("expires {}", at.format("%d.%m.%Y")))
            .unwrap_or_default();

        html.push_str(&format!(
            r#"<li class="album-item">
                <span>{badge}<a href="{path}">{title}</a> <small>#{id}</small></span>
                <span class="meta">{expires} <code>{path}</code>
                    <button class="copy-link-btn" onclick="copyToClipboard('{path}', this)">Copy link</button>
                </span>
            </li>"#,
            badge = badge,
            path = html_escape(&share_path),
            title = html_escape(&album.title),
            id = album.id,
            expires = expires,
        ));

        if album.is_folder {
            html.push_str(&album_tree_html(state, Some(album.id), depth + 1)?);
        }
    }
    html.push_str("</ul>");
    Ok(html)
}

pub async fn admin_albums(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if !state.is_admin(&jar) {
        return Ok(Redirect::to("/login").into_response());
    }

    let tree = album_tree_html(&state, None, 0)?;
    let html = if tree.is_empty() {
        "<h1>Albums</h1><p>No albums yet.</p>".to_string()
    } else {
        format!("<h1>Albums</h1>{}", tree)
    };

    Ok(Html(base_html("Albums", &html, true, &copy_link_script())).into_response())
}

// ============================================================================
// Album API
// ============================================================================

pub async fn create_album_api(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<NewAlbumRequest>,
) -> Result<Json<Album>, AppError> {
    require_admin(&state, &jar)?;
    let album = store::create_album(&state.db, req, Utc::now())?;
    log::info!("Created {} #{} '{}'", if album.is_folder { "folder" } else { "album" }, album.id, album.title);
    Ok(Json(album))
}

pub async fn move_album_api(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<MoveAlbumRequest>,
) -> Result<Json<Album>, AppError> {
    require_admin(&state, &jar)?;
    Ok(Json(store::move_album(&state.db, id, req.parent)?))
}

pub async fn upload_photos(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Json<Vec<Photo>>, AppError> {
    require_admin(&state, &jar)?;

    let album = store::get_album(&state.db, id)?
        .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;
    if album.is_folder {
        return Err(AppError::BadRequest("Photos belong in albums, not folders".to_string()));
    }

    let subdir = format!("photos/{}", album.id);
    let batch = Utc::now().timestamp_millis();
    let mut photos = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
        if bytes.is_empty() {
            continue;
        }

        let preview = render_preview_blocking(bytes.to_vec())
            .await?
            .map_err(|e| AppError::BadRequest(format!("{}: {}", file_name, e)))?;

        let prefix = format!("{}_{}", batch, photos.len());
        let original =
            store_media_file(&state.config.originals_dir(), &subdir, &prefix, &file_name, &bytes).await?;
        let preview_file = store_media_file(
            &state.config.public_media_dir(),
            &subdir,
            &prefix,
            &preview_name(&file_name),
            &preview,
        )
        .await?;
        photos.push(store::add_photo(&state.db, album.id, &original, Some(&preview_file), Utc::now())?);
    }

    if photos.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }
    log::info!("Uploaded {} photos to album #{}", photos.len(), album.id);
    Ok(Json(photos))
}

pub async fn create_format_api(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<NewFormatRequest>,
) -> Result<Json<ProductFormat>, AppError> {
    require_admin(&state, &jar)?;
    Ok(Json(store::create_format(&state.db, req)?))
}

// ============================================================================
// Orders
// ============================================================================

/// Where one order item came from.
struct ItemSource {
    album: Option<Album>,
    photo: Option<Photo>,
}

fn item_source(state: &AppState, item: &OrderItem) -> Result<ItemSource, AppError> {
    let photo = match item.photo_id {
        Some(id) => store::get_photo(&state.db, id)?,
        None => None,
    };
    let album_id = item.full_set_album.or(photo.as_ref().map(|p| p.album_id));
    let album = match album_id {
        Some(id) => store::get_album(&state.db, id)?,
        None => None,
    };
    Ok(ItemSource { album, photo })
}

/// An order with the per-order figures shown in the orders table.
struct OrderOverview {
    order: Order,
    photo_count: usize,
    albums: Vec<Album>,
}

impl OrderOverview {
    fn load(state: &AppState, order: Order) -> Result<Self, AppError> {
        let mut photo_count = 0;
        let mut albums: Vec<Album> = Vec::new();
        for item in &order.items {
            let source = item_source(state, item)?;
            photo_count += match (item.full_set_album, &source.album) {
                (Some(_), Some(album)) => store::album_photos(&state.db, album.id)?.len(),
                (Some(_), None) => 0,
                (None, _) => item.quantity as usize,
            };
            if let Some(album) = source.album {
                if !albums.iter().any(|a| a.id == album.id) {
                    albums.push(album);
                }
            }
        }
        albums.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(Self { order, photo_count, albums })
    }

    fn includes_album(&self, album_id: u64) -> bool {
        self.albums.iter().any(|a| a.id == album_id)
    }

    fn album_titles(&self) -> String {
        if self.albums.is_empty() {
            return "-".to_string();
        }
        self.albums
            .iter()
            .map(|a| a.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `?album=<id>` keeps orders with at least one item from that album.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub album: Option<u64>,
}

/// The "All albums" choice submits `album=`.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn filtered_orders(state: &AppState, filter: &OrderFilter) -> Result<Vec<OrderOverview>, AppError> {
    let mut overviews = Vec::new();
    for order in store::list_orders(&state.db)? {
        let overview = OrderOverview::load(state, order)?;
        if filter.album.map_or(true, |id| overview.includes_album(id)) {
            overviews.push(overview);
        }
    }
    Ok(overviews)
}

fn order_row(overview: &OrderOverview) -> String {
    let order = &overview.order;
    let receipt = match &order.receipt {
        Some(path) => format!(r#"<a href="/media/{}">receipt</a>"#, html_escape(path)),
        None => "-".to_string(),
    };
    let contact = [order.customer.email.as_deref(), order.customer.phone.as_deref()]
        .into_iter()
        .flatten()
        .map(html_escape)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<tr>
            <td><a href="/orders/{id}/confirmation">#{id}</a></td>
            <td>{date}</td>
            <td>{name}<br><small>{contact}</small></td>
            <td>{albums}</td>
            <td class="num">{photos}</td>
            <td class="num">{total}{bonus}</td>
            <td><span class="status-badge">{status}</span></td>
            <td>{receipt}</td>
        </tr>"#,
        id = order.id,
        date = order.created_at.format("%Y-%m-%d %H:%M"),
        name = html_escape(&order.customer.full_name()),
        contact = contact,
        albums = html_escape(&overview.album_titles()),
        photos = overview.photo_count,
        total = order.total(),
        bonus = if order.received_bonus { " &#127873;" } else { "" },
        status = order.status,
        receipt = receipt,
    )
}

fn album_filter_form(state: &AppState, filter: &OrderFilter) -> Result<String, AppError> {
    let mut albums = store::all_albums(&state.db)?;
    albums.retain(|a| !a.is_folder);
    albums.sort_by(|a, b| a.title.cmp(&b.title));

    let mut options = String::from(r#"<option value="">All albums</option>"#);
    for album in &albums {
        options.push_str(&format!(
            r#"<option value="{id}"{selected}>{title}</option>"#,
            id = album.id,
            selected = if filter.album == Some(album.id) { " selected" } else { "" },
            title = html_escape(&album.title),
        ));
    }
    let export = match filter.album {
        Some(id) => format!("/admin/orders/export.csv?album={}", id),
        None => "/admin/orders/export.csv".to_string(),
    };

    Ok(format!(
        r#"<form method="GET" action="/admin/orders" class="order-filter">
            <select name="album">{options}</select>
            <button type="submit">Filter</button>
            <a href="{export}">Export CSV</a>
        </form>"#,
        options = options,
        export = export,
    ))
}

pub async fn admin_orders(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<OrderFilter>,
) -> Result<Response, AppError> {
    if !state.is_admin(&jar) {
        return Ok(Redirect::to("/login").into_response());
    }

    let orders = filtered_orders(&state, &filter)?;
    let mut html = format!("<h1>Orders</h1>{}<p>{} orders</p>", album_filter_form(&state, &filter)?, orders.len());
    html.push_str(
        r#"<table class="order-table">
            <tr><th>Order</th><th>Date</th><th>Customer</th><th>Albums</th><th class="num">Photos</th>
            <th class="num">Total</th><th>Status</th><th>Receipt</th></tr>"#,
    );
    for overview in &orders {
        html.push_str(&order_row(overview));
    }
    html.push_str("</table>");

    Ok(Html(base_html("Orders", &html, true, "")).into_response())
}

/// One spreadsheet line per order item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportRow {
    order: u64,
    customer: String,
    email: Option<String>,
    phone: Option<String>,
    date: String,
    status: String,
    bonus: &'static str,
    product: String,
    album: Option<String>,
    file: Option<String>,
    quantity: u32,
    cost: String,
}

pub async fn export_orders_csv(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<OrderFilter>,
) -> Result<Response, AppError> {
    require_admin(&state, &jar)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut rows = 0;
    for overview in filtered_orders(&state, &filter)? {
        let order = &overview.order;
        for item in &order.items {
            let source = item_source(&state, item)?;
            writer.serialize(ExportRow {
                order: order.id,
                customer: order.customer.full_name(),
                email: order.customer.email.clone(),
                phone: order.customer.phone.clone(),
                date: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
                status: order.status.to_string(),
                bonus: if order.received_bonus { "yes" } else { "no" },
                product: item.label.clone(),
                album: source.album.map(|a| a.title),
                file: source.photo.map(|p| file_label(&p.file_name)),
                quantity: item.quantity,
                cost: item.cost().to_string(),
            })?;
            rows += 1;
        }
    }
    let bytes = writer.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
    log::info!("Exported {} order lines", rows);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"orders.csv\""),
        ],
        bytes,
    )
        .into_response())
}

/// Last path component of a stored file.
fn file_label(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

pub async fn set_status_api(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, AppError> {
    require_admin(&state, &jar)?;
    let order = store::set_order_status(&state.db, id, req.status)?;
    log::info!("Order #{} is now {}", order.id, order.status);
    Ok(Json(order))
}
