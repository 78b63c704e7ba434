//! HTTP route handlers for the customer-facing side of the shop.
//!
//! Landing page and access codes, album and gallery pages, order placement
//! and receipt upload, plus admin login/logout.

use crate::auth::{clear_session_cookie, create_session, password_matches, session_cookie};
use crate::cart::{SelectionCart, EMPTY_SELECTION_MESSAGE};
use crate::error::AppError;
use crate::models::{Album, Customer, Order};
use crate::orders::{full_set_item, price_submission, OrderSubmission};
use crate::store;
use crate::templates::{base_html, gallery_script, html_escape, message_html, HtmlGallery, MessageKind};
use crate::{store_media_file, AppState};
use axum::{
    extract::{Form, Multipart, Path, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

// ============================================================================
// Landing Page
// ============================================================================

fn landing_html(message: Option<(MessageKind, &str)>) -> String {
    let notice = message
        .map(|(kind, text)| message_html(kind, text))
        .unwrap_or_default();
    format!(
        r#"<div class="access-form">
            <h1>View your photos</h1>
            {notice}
            <form method="POST" action="/">
                <input type="text" name="access_code" placeholder="Access code" autofocus required>
                <button type="submit" class="primary">Open album</button>
            </form>
        </div>"#,
        notice = notice
    )
}

pub async fn landing(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    Html(base_html("Photos", &landing_html(None), state.is_admin(&jar), ""))
}

#[derive(Deserialize)]
pub struct AccessForm {
    #[serde(default)]
    pub access_code: String,
}

pub async fn landing_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<AccessForm>,
) -> Result<Response, AppError> {
    let logged_in = state.is_admin(&jar);
    let code = form.access_code.trim();

    if code.is_empty() {
        let html = landing_html(Some((MessageKind::Warning, "Please enter an access code.")));
        return Ok(Html(base_html("Photos", &html, logged_in, "")).into_response());
    }

    match store::find_album_by_token(&state.db, code)? {
        Some(album) => Ok(Redirect::to(&album.share_path()).into_response()),
        None => {
            let html = landing_html(Some((MessageKind::Error, "No album matches that access code.")));
            Ok(Html(base_html("Photos", &html, logged_in, "")).into_response())
        }
    }
}

// ============================================================================
// Album Pages
// ============================================================================

fn expiry_notice(album: &Album) -> Option<String> {
    album
        .expires_at
        .filter(|_| album.is_expired_at(Utc::now()))
        .map(|at| format!("Access to this album expired on {}.", at.format("%d.%m.%Y")))
}

fn folder_html(folder: &Album, children: &[Album], notice: Option<&str>) -> String {
    let mut html = format!("<h1>{}</h1>", html_escape(&folder.title));
    if let Some(msg) = notice {
        html.push_str(&message_html(MessageKind::Warning, msg));
    }
    if children.is_empty() {
        html.push_str("<p>This folder is empty.</p>");
        return html;
    }

    html.push_str(r#"<ul class="album-list">"#);
    for child in children {
        let badge = if child.is_folder {
            r#"<span class="folder-badge">folder</span>"#
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<li class="album-item"><span>{badge}<a href="{href}">{title}</a></span></li>"#,
            badge = badge,
            href = html_escape(&child.share_path()),
            title = html_escape(&child.title),
        ));
    }
    html.push_str("</ul>");
    html
}

pub async fn album_detail(
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let logged_in = state.is_admin(&jar);
    let album = store::find_album_by_token(&state.db, &token)?
        .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;
    let notice = expiry_notice(&album);

    if album.is_folder {
        let children = store::child_albums(&state.db, Some(album.id))?;
        let html = folder_html(&album, &children, notice.as_deref());
        return Ok(Html(base_html(&album.title, &html, logged_in, "")).into_response());
    }

    let photos = store::album_photos(&state.db, album.id)?;
    let formats = store::list_formats(&state.db)?;
    let title = album.title.clone();

    let mut gallery = HtmlGallery::new(album, photos, formats);
    let script = if notice.is_some() {
        gallery = gallery.without_checkout();
        String::new()
    } else {
        gallery_script(EMPTY_SELECTION_MESSAGE)
    };

    let cart = SelectionCart::initialize(gallery);
    let body = cart.surface().render_html(notice.as_deref());

    Ok(Html(base_html(&title, &body, logged_in, &script)).into_response())
}

// ============================================================================
// Orders
// ============================================================================

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<OrderSubmission>,
) -> Result<Response, AppError> {
    let priced = price_submission(&state.db, &submission)?;
    let customer = Customer::from_form(
        &submission.customer_name,
        submission.customer_email.clone(),
        submission.customer_phone.clone(),
    );

    let order = store::create_order(&state.db, customer, priced.items, Utc::now())?;
    log::info!(
        "Order #{} placed: {} x {} = {}",
        order.id,
        order.items.len(),
        priced.format.name,
        priced.total
    );

    Ok(Redirect::to(&format!("/orders/{}/confirmation", order.id)).into_response())
}

#[derive(Deserialize)]
pub struct FullSetForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

pub async fn full_set_order(
    Path(album_id): Path<u64>,
    State(state): State<Arc<AppState>>,
    Form(form): Form<FullSetForm>,
) -> Result<Response, AppError> {
    let album = store::get_album(&state.db, album_id)?
        .ok_or_else(|| AppError::NotFound("Album not found".to_string()))?;
    if album.is_folder {
        return Err(AppError::BadRequest("Folders cannot be ordered".to_string()));
    }
    if album.is_expired_at(Utc::now()) {
        return Err(AppError::BadRequest("Access to this album has expired".to_string()));
    }

    let photos = store::album_photos(&state.db, album.id)?;
    if photos.is_empty() {
        return Err(AppError::BadRequest("This album has no photos yet".to_string()));
    }

    let customer = Customer::from_form(&form.customer_name, form.customer_email, form.customer_phone);
    let order = store::create_order(&state.db, customer, vec![full_set_item(&album, &photos)], Utc::now())?;
    log::info!("Order #{} placed: full set of album {} = {}", order.id, album.id, order.total());

    Ok(Redirect::to(&format!("/orders/{}/confirmation", order.id)).into_response())
}

fn load_order(state: &AppState, id: u64) -> Result<Order, AppError> {
    store::get_order(&state.db, id)?.ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

fn order_summary_html(order: &Order) -> String {
    let mut html = String::from(
        r#"<table class="order-table">
            <tr><th>Item</th><th class="num">Qty</th><th class="num">Price</th><th class="num">Sum</th></tr>"#,
    );
    for item in &order.items {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            html_escape(&item.label),
            item.quantity,
            item.unit_price,
            item.cost(),
        ));
    }
    html.push_str(&format!(
        r#"<tr><th colspan="3">Total</th><th class="num">{}</th></tr></table>"#,
        order.total()
    ));
    if order.received_bonus {
        html.push_str(&message_html(
            MessageKind::Info,
            "This order qualifies for a bonus gift.",
        ));
    }
    html
}

pub async fn order_confirmation(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let order = load_order(&state, id)?;

    let html = format!(
        r#"<h1>Order #{id}</h1>
        <p>Thank you, {name}. Your order has been received.</p>
        {summary}
        <h2>Payment</h2>
        <p>Upload your payment receipt to confirm the order.</p>
        <form method="POST" action="/orders/{id}/receipt" enctype="multipart/form-data">
            <input type="file" name="receipt" required>
            <button type="submit" class="primary">Upload receipt</button>
        </form>"#,
        id = order.id,
        name = html_escape(&order.customer.full_name()),
        summary = order_summary_html(&order),
    );

    Ok(Html(base_html(&format!("Order #{}", order.id), &html, state.is_admin(&jar), "")).into_response())
}

pub async fn upload_receipt(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let order = load_order(&state, id)?;

    let mut file_name = String::new();
    let mut data = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("receipt") {
            file_name = field.file_name().unwrap_or("receipt").to_string();
            data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?
                .to_vec();
            break;
        }
    }

    if data.is_empty() {
        return Ok(Redirect::to(&format!("/orders/{}/confirmation", order.id)).into_response());
    }

    let stored = store_media_file(
        &state.config.public_media_dir(),
        "receipts",
        &order.id.to_string(),
        &file_name,
        &data,
    )
    .await?;
    store::attach_receipt(&state.db, order.id, &stored)?;
    log::info!("Receipt for order #{} stored as {}", order.id, stored);

    Ok(Redirect::to(&format!("/orders/{}/complete", order.id)).into_response())
}

pub async fn order_complete(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let order = load_order(&state, id)?;
    let html = format!(
        r#"<h1>Thank you!</h1>
        <p>Payment for order #{} has been received. We will let you know when your prints are ready.</p>
        <p><a href="/">Back to the start page</a></p>"#,
        order.id
    );
    Ok(Html(base_html("Thank you", &html, state.is_admin(&jar), "")).into_response())
}

// ============================================================================
// Authentication Handlers
// ============================================================================

fn login_html(error: Option<&str>) -> String {
    let notice = error
        .map(|e| message_html(MessageKind::Error, e))
        .unwrap_or_default();
    format!(
        r#"<div class="login-form">
            {}
            <h1>Login</h1>
            <form method="POST" action="/login">
                <input type="password" name="password" placeholder="Password" autofocus required>
                <button type="submit">Login</button>
            </form>
        </div>"#,
        notice
    )
}

fn with_cookie(cookie: &str, to: &str) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.insert(SET_COOKIE, value);
    }
    (headers, Redirect::to(to)).into_response()
}

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if state.is_admin(&jar) {
        return Redirect::to("/admin/albums").into_response();
    }
    Html(base_html("Login", &login_html(None), false, "")).into_response()
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = match state.config.admin_password.as_deref() {
        Some(p) => p,
        None => {
            let html = message_html(MessageKind::Error, "Authentication not configured.");
            return Html(base_html("Error", &html, false, "")).into_response();
        }
    };

    if !password_matches(&form.password, password) {
        log::warn!("Failed admin login attempt");
        return Html(base_html("Login", &login_html(Some("Invalid password.")), false, "")).into_response();
    }

    let token = match create_session(password.as_bytes()) {
        Some(t) => t,
        None => {
            let html = message_html(MessageKind::Error, "Failed to create session.");
            return Html(base_html("Error", &html, false, "")).into_response();
        }
    };

    log::info!("Admin logged in");
    with_cookie(&session_cookie(&token), "/admin/albums")
}

pub async fn logout() -> Response {
    with_cookie(&clear_session_cookie(), "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{NewAlbumRequest, NewFormatRequest, OrderStatus};
    use axum::http::{header::LOCATION, StatusCode};
    use chrono::Duration;

    fn test_state() -> Arc<AppState> {
        let db = sled::Config::new().temporary(true).open().unwrap();
        Arc::new(AppState { config: Config::default(), db })
    }

    fn album(state: &AppState, title: &str) -> Album {
        album_expiring(state, title, None)
    }

    fn album_expiring(state: &AppState, title: &str, expires_at: Option<chrono::DateTime<Utc>>) -> Album {
        store::create_album(
            &state.db,
            NewAlbumRequest {
                title: title.to_string(),
                description: String::new(),
                expires_at,
                full_set_price: None,
                parent: None,
                is_folder: false,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_access_code_redirects_to_album() {
        let state = test_state();
        let album = album(&state, "Class 3B");

        let form = AccessForm { access_code: format!("  {} ", album.access_token) };
        let response = landing_submit(State(state), CookieJar::new(), Form(form)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), album.share_path());
    }

    #[tokio::test]
    async fn test_empty_access_code_shows_warning() {
        let state = test_state();
        let form = AccessForm { access_code: "   ".to_string() };
        let response = landing_submit(State(state), CookieJar::new(), Form(form)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Please enter an access code."));
    }

    #[tokio::test]
    async fn test_unknown_album_is_not_found() {
        let state = test_state();
        let err = album_detail(Path("nope".to_string()), State(state), CookieJar::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_gallery_page_has_cart_markup() {
        let state = test_state();
        let album = album(&state, "Class 3B");
        store::add_photo(&state.db, album.id, "photos/1/a.jpg", None, Utc::now()).unwrap();
        store::create_format(
            &state.db,
            NewFormatRequest { name: "A4".to_string(), price: "2.50".parse().unwrap() },
        )
        .unwrap();

        let response = album_detail(Path(album.access_token.clone()), State(state), CookieJar::new())
            .await
            .unwrap();
        let html = body_text(response).await;

        assert!(html.contains(r#"id="order-panel""#));
        assert!(html.contains(r#"id="total-price">0.00<"#));
        assert!(html.contains("Please select at least one photo."));
    }

    #[tokio::test]
    async fn test_expired_album_hides_checkout() {
        let state = test_state();
        let album = album_expiring(&state, "Old", Some(Utc::now() - Duration::days(2)));

        let response = album_detail(Path(album.access_token.clone()), State(state), CookieJar::new())
            .await
            .unwrap();
        let html = body_text(response).await;

        assert!(html.contains("expired on"));
        assert!(!html.contains(r#"id="order-panel""#));
    }

    #[tokio::test]
    async fn test_create_order_redirects_to_confirmation() {
        let state = test_state();
        let album = album(&state, "Class 3B");
        let p1 = store::add_photo(&state.db, album.id, "photos/1/a.jpg", None, Utc::now()).unwrap();
        let p2 = store::add_photo(&state.db, album.id, "photos/1/b.jpg", None, Utc::now()).unwrap();
        let format = store::create_format(
            &state.db,
            NewFormatRequest { name: "A4".to_string(), price: "2.50".parse().unwrap() },
        )
        .unwrap();

        let submission = OrderSubmission {
            photos: format!(r#"["{}","{}"]"#, p1.id, p2.id),
            format_id: format.id.to_string(),
            customer_name: "Ada Lovelace".to_string(),
            customer_email: Some(String::new()),
            customer_phone: None,
        };
        let response = create_order(State(state.clone()), Form(submission)).await.unwrap();

        let orders = store::list_orders(&state.db).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(location(&response), format!("/orders/{}/confirmation", orders[0].id));
        assert_eq!(orders[0].total().to_string(), "5.00");
        assert_eq!(orders[0].customer.last_name, "Lovelace");
        assert_eq!(orders[0].customer.email, None);
        assert_eq!(orders[0].status, OrderStatus::New);
    }

    #[tokio::test]
    async fn test_order_from_expired_album_is_rejected() {
        let state = test_state();
        let album = album_expiring(&state, "Old", Some(Utc::now() - Duration::days(2)));
        let photo = store::add_photo(&state.db, album.id, "photos/1/a.jpg", None, Utc::now()).unwrap();
        let format = store::create_format(
            &state.db,
            NewFormatRequest { name: "A4".to_string(), price: "2.50".parse().unwrap() },
        )
        .unwrap();

        let submission = OrderSubmission {
            photos: format!(r#"["{}"]"#, photo.id),
            format_id: format.id.to_string(),
            customer_name: "Ada".to_string(),
            customer_email: None,
            customer_phone: None,
        };
        let err = create_order(State(state.clone()), Form(submission)).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(store::list_orders(&state.db).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let state = test_state();
        let format = store::create_format(
            &state.db,
            NewFormatRequest { name: "A4".to_string(), price: "2.50".parse().unwrap() },
        )
        .unwrap();
        let submission = OrderSubmission {
            photos: r#"["999"]"#.to_string(),
            format_id: format.id.to_string(),
            customer_name: String::new(),
            customer_email: None,
            customer_phone: None,
        };
        let err = create_order(State(state), Form(submission)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), EMPTY_SELECTION_MESSAGE);
    }

    #[tokio::test]
    async fn test_full_set_order_earns_bonus() {
        let state = test_state();
        let album = album(&state, "Class 3B");
        store::add_photo(&state.db, album.id, "photos/1/a.jpg", None, Utc::now()).unwrap();

        let form = FullSetForm {
            customer_name: "Grace".to_string(),
            customer_email: None,
            customer_phone: None,
        };
        full_set_order(Path(album.id), State(state.clone()), Form(form)).await.unwrap();

        let orders = store::list_orders(&state.db).unwrap();
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].full_set_album, Some(album.id));
        assert!(orders[0].received_bonus);
    }

    #[tokio::test]
    async fn test_login_without_password_configured() {
        let state = test_state();
        let form = LoginForm { password: "x".to_string() };
        let response = login_submit(State(state), Form(form)).await;
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let config = Config {
            admin_password: Some("hunter2".to_string()),
            ..Config::default()
        };
        let state = Arc::new(AppState { config, db });

        let bad = login_submit(State(state.clone()), Form(LoginForm { password: "nope".to_string() })).await;
        assert!(bad.headers().get(SET_COOKIE).is_none());

        let good = login_submit(State(state), Form(LoginForm { password: "hunter2".to_string() })).await;
        let cookie = good.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("proofroom_session="));
        assert_eq!(location(&good), "/admin/albums");
    }
}
