//! Gallery page: photo grid, format picker, order panel and checkout form.
//!
//! `HtmlGallery` is the server-side surface of the selection cart. The page
//! handler runs `SelectionCart::initialize` against it so the first paint is
//! exactly what the cart would draw; the embedded script then takes over and
//! runs the same state machine in the browser.

use crate::cart::{CartViewModel, GallerySurface, PricingOption};
use crate::models::{Album, Photo, ProductFormat};

use super::components::{html_escape, message_html, MessageKind};

/// Panel transform when the selection is empty: slid fully off-screen.
const PANEL_HIDDEN_TRANSFORM: &str = "translateY(100%)";
const PANEL_SHOWN_TRANSFORM: &str = "translateY(0)";

pub struct HtmlGallery {
    album: Album,
    photos: Vec<Photo>,
    formats: Vec<ProductFormat>,
    /// Index of the initially selected `<option>`.
    selected_format: usize,
    checkout_enabled: bool,
    view: Option<CartViewModel>,
    alerts: Vec<String>,
}

impl HtmlGallery {
    pub fn new(album: Album, photos: Vec<Photo>, formats: Vec<ProductFormat>) -> Self {
        Self {
            album,
            photos,
            formats,
            selected_format: 0,
            checkout_enabled: true,
            view: None,
            alerts: Vec::new(),
        }
    }

    /// Expired albums stay viewable but cannot be ordered from.
    pub fn without_checkout(mut self) -> Self {
        self.checkout_enabled = false;
        self
    }

    pub fn view(&self) -> Option<&CartViewModel> {
        self.view.as_ref()
    }

    fn photo_cards(&self) -> String {
        let mut html = String::from(r#"<div id="photo-grid" class="photo-grid">"#);
        for photo in &self.photos {
            let id = photo.photo_id();
            let selected = self.view.as_ref().is_some_and(|v| v.is_selected(&id));
            let picture = match photo.preview_url() {
                Some(src) => format!(
                    r#"<img src="{}" alt="Photo {}" loading="lazy">"#,
                    html_escape(&src),
                    html_escape(&id)
                ),
                None => r#"<div class="preview-pending">Preview pending</div>"#.to_string(),
            };
            html.push_str(&format!(
                r#"<div class="photo-card{card_class}" data-photo-id="{id}">
                    {picture}
                    <span class="selected-icon{icon_class}">&#10003;</span>
                </div>"#,
                card_class = if selected { " selected" } else { "" },
                icon_class = if selected { "" } else { " hidden" },
                id = html_escape(&id),
                picture = picture,
            ));
        }
        html.push_str("</div>");
        html
    }

    fn format_options(&self) -> String {
        self.formats
            .iter()
            .enumerate()
            .map(|(idx, format)| {
                format!(
                    r#"<option value="{id}" data-price="{price}"{selected}>{name} ({price})</option>"#,
                    id = format.id,
                    price = format.price,
                    selected = if idx == self.selected_format { " selected" } else { "" },
                    name = html_escape(&format.name),
                )
            })
            .collect()
    }

    fn order_panel(&self) -> String {
        let (count, total, visible) = match &self.view {
            Some(v) => (v.count, v.total_text.clone(), v.panel_visible),
            None => (0, "0.00".to_string(), false),
        };
        let transform = if visible {
            PANEL_SHOWN_TRANSFORM
        } else {
            PANEL_HIDDEN_TRANSFORM
        };

        format!(
            r#"<div id="order-panel" class="order-panel" style="transform: {transform}">
            <form id="order-form" method="POST" action="/orders">
                <span class="order-summary">
                    Selected: <span id="selected-count">{count}</span>,
                    total: <span id="total-price">{total}</span>
                </span>
                <select id="product-format">{options}</select>
                <input type="hidden" id="form-photos" name="photos" value="[]">
                <input type="hidden" id="form-format-id" name="format_id" value="">
                <input type="text" name="customer_name" placeholder="Your name" required>
                <input type="email" name="customer_email" placeholder="Email">
                <input type="tel" name="customer_phone" placeholder="Phone">
                <button type="button" id="checkout-button" class="primary">Place order</button>
            </form>
        </div>"#,
            transform = transform,
            count = count,
            total = total,
            options = self.format_options(),
        )
    }

    /// Page body. Includes the order panel only when checkout is enabled.
    pub fn render_html(&self, expired_message: Option<&str>) -> String {
        let mut html = format!(
            r#"<h1>{title}</h1>"#,
            title = html_escape(&self.album.title)
        );
        if !self.album.description.is_empty() {
            html.push_str(&format!("<p>{}</p>", html_escape(&self.album.description)));
        }
        if let Some(msg) = expired_message {
            html.push_str(&message_html(MessageKind::Warning, msg));
        }
        for alert in &self.alerts {
            html.push_str(&message_html(MessageKind::Error, alert));
        }

        if self.checkout_enabled && !self.photos.is_empty() {
            html.push_str(&format!(
                r#"<form class="full-set-form" method="POST" action="/orders/full-set/{id}">
                    <input type="text" name="customer_name" placeholder="Your name" required>
                    <input type="email" name="customer_email" placeholder="Email">
                    <input type="tel" name="customer_phone" placeholder="Phone">
                    <button type="submit">Buy the full set ({price})</button>
                </form>"#,
                id = self.album.id,
                price = self.album.full_set_price,
            ));
        }

        html.push_str(&self.photo_cards());

        if self.checkout_enabled {
            html.push_str(&self.order_panel());
        }
        html
    }
}

impl GallerySurface for HtmlGallery {
    fn current_option(&self) -> Option<PricingOption> {
        self.formats
            .get(self.selected_format)
            .map(ProductFormat::pricing_option)
    }

    fn apply(&mut self, view: &CartViewModel) {
        self.view = Some(view.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

// ============================================================================
// Cart Script
// ============================================================================

/// Browser rendition of `SelectionCart`: toggle on card click, re-price on
/// format change, validate and submit on checkout. `Set` keeps insertion
/// order, which is the order the photo list is serialized in.
pub fn gallery_script(empty_selection_message: &str) -> String {
    format!(
        r#"
    document.addEventListener('DOMContentLoaded', () => {{
        const photoGrid = document.getElementById('photo-grid');
        const orderPanel = document.getElementById('order-panel');
        if (!photoGrid || !orderPanel) return;

        const selectedCountSpan = document.getElementById('selected-count');
        const totalPriceSpan = document.getElementById('total-price');
        const formatSelect = document.getElementById('product-format');
        const checkoutButton = document.getElementById('checkout-button');
        const orderForm = document.getElementById('order-form');
        const formPhotosInput = document.getElementById('form-photos');
        const formFormatIdInput = document.getElementById('form-format-id');

        const selectedPhotos = new Set();
        let currentOption = readOption();

        function readOption() {{
            const option = formatSelect.options[formatSelect.selectedIndex];
            if (!option) return null;
            return {{ id: option.value, unitPrice: parseFloat(option.dataset.price) || 0 }};
        }}

        function render() {{
            const count = selectedPhotos.size;
            const unitPrice = currentOption ? currentOption.unitPrice : 0;
            selectedCountSpan.textContent = count;
            totalPriceSpan.textContent = (count * unitPrice).toFixed(2);

            document.querySelectorAll('.photo-card').forEach(card => {{
                const selected = selectedPhotos.has(card.dataset.photoId);
                card.classList.toggle('selected', selected);
                const icon = card.querySelector('.selected-icon');
                if (icon) icon.classList.toggle('hidden', !selected);
            }});

            orderPanel.style.transform = count > 0 ? '{shown}' : '{hidden}';
        }}

        photoGrid.addEventListener('click', (event) => {{
            const card = event.target.closest('.photo-card');
            if (!card) return;
            const photoId = card.dataset.photoId;
            if (selectedPhotos.has(photoId)) {{
                selectedPhotos.delete(photoId);
            }} else {{
                selectedPhotos.add(photoId);
            }}
            render();
        }});

        formatSelect.addEventListener('change', () => {{
            currentOption = readOption();
            render();
        }});

        checkoutButton.addEventListener('click', () => {{
            if (selectedPhotos.size === 0) {{
                alert({message});
                return;
            }}
            if (!orderForm.reportValidity()) return;
            formPhotosInput.value = JSON.stringify(Array.from(selectedPhotos));
            formFormatIdInput.value = currentOption ? currentOption.id : '';
            orderForm.submit();
        }});

        render();
    }});
"#,
        shown = PANEL_SHOWN_TRANSFORM,
        hidden = PANEL_HIDDEN_TRANSFORM,
        message = serde_json::to_string(empty_selection_message).unwrap_or_else(|_| "\"\"".to_string()),
    )
}
