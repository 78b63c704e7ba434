//! Photo selection cart.
//!
//! A `SelectionCart` lives for one gallery page view. It owns the set of
//! selected photo ids and the current pricing option, and after every
//! mutation derives a `CartViewModel` that it hands to its rendering
//! surface. The surface is only ever written to for display; it is never the
//! source of truth for the selection.
//!
//! The same state machine runs in three places:
//! - server-side, against `templates::HtmlGallery`, to produce the initial page
//! - in the browser script emitted by `templates::gallery_script`
//! - server-side again, against `HeadlessSurface`, to replay a submitted order

use crate::pricing::Price;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

/// Opaque identifier of one photo card.
pub type PhotoId = String;

/// Message shown when checkout is attempted with nothing selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one photo.";

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOption {
    pub id: String,
    pub unit_price: Price,
}

impl PricingOption {
    pub fn new(id: impl Into<String>, unit_price: Price) -> Self {
        Self {
            id: id.into(),
            unit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    Empty,
    NonEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("{}", EMPTY_SELECTION_MESSAGE)]
    EmptySelection,
}

/// Selected ids (insertion order, no duplicates) plus the current option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Vec<PhotoId>,
    current_option: Option<PricingOption>,
}

impl SelectionState {
    pub fn new(current_option: Option<PricingOption>) -> Self {
        Self {
            selected: Vec::new(),
            current_option,
        }
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.selected.iter().position(|s| s == id) {
            Some(idx) => {
                self.selected.remove(idx);
                false
            }
            None => {
                self.selected.push(id.to_string());
                true
            }
        }
    }

    pub fn set_option(&mut self, option: Option<PricingOption>) {
        self.current_option = option;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn selected(&self) -> &[PhotoId] {
        &self.selected
    }

    pub fn current_option(&self) -> Option<&PricingOption> {
        self.current_option.as_ref()
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// `count × unit price`; an undefined option prices at zero.
    pub fn total(&self) -> Price {
        self.current_option
            .as_ref()
            .map(|o| o.unit_price)
            .unwrap_or(Price::ZERO)
            .times(self.count())
    }

    pub fn phase(&self) -> CartPhase {
        if self.selected.is_empty() {
            CartPhase::Empty
        } else {
            CartPhase::NonEmpty
        }
    }

    pub fn view_model(&self) -> CartViewModel {
        let total = self.total();
        CartViewModel {
            selected: self.selected.clone(),
            count: self.count(),
            total,
            total_text: total.to_string(),
            panel_visible: self.phase() == CartPhase::NonEmpty,
            option_id: self.current_option.as_ref().map(|o| o.id.clone()),
        }
    }

    /// Values for the checkout form, or `EmptySelection`.
    pub fn payload(&self) -> Result<CheckoutPayload, CartError> {
        if self.selected.is_empty() {
            return Err(CartError::EmptySelection);
        }
        let photos_json =
            serde_json::to_string(&self.selected).unwrap_or_else(|_| "[]".to_string());
        Ok(CheckoutPayload {
            photos_json,
            format_id: self
                .current_option
                .as_ref()
                .map(|o| o.id.clone())
                .unwrap_or_default(),
        })
    }
}

// ============================================================================
// View Model
// ============================================================================

/// Everything a surface needs to draw the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartViewModel {
    pub selected: Vec<PhotoId>,
    pub count: usize,
    pub total: Price,
    pub total_text: String,
    pub panel_visible: bool,
    pub option_id: Option<String>,
}

impl CartViewModel {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPayload {
    pub photos_json: String,
    pub format_id: String,
}

// ============================================================================
// Collaborators
// ============================================================================

/// The page the cart draws into: photo cards, the pricing control, the order
/// panel and a blocking message channel.
pub trait GallerySurface {
    /// Option currently chosen in the pricing control, if it has any options.
    fn current_option(&self) -> Option<PricingOption>;

    /// Reflect the view model: card indicators, count, total, panel position.
    fn apply(&mut self, view: &CartViewModel);

    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
}

/// The hidden order form filled in at checkout.
pub trait CheckoutForm {
    type Submitted;

    fn set_photos(&mut self, photos_json: String);
    fn set_format(&mut self, format_id: String);
    fn submit(self) -> Self::Submitted;
}

// ============================================================================
// Selection Cart
// ============================================================================

pub struct SelectionCart<S: GallerySurface> {
    state: SelectionState,
    surface: S,
}

impl<S: GallerySurface> SelectionCart<S> {
    /// Read the initial option from the surface, start empty, draw once.
    pub fn initialize(surface: S) -> Self {
        let state = SelectionState::new(surface.current_option());
        let mut cart = Self { state, surface };
        cart.render();
        cart
    }

    pub fn toggle_photo(&mut self, id: &str) {
        self.state.toggle(id);
        self.render();
    }

    pub fn change_option(&mut self, option: PricingOption) {
        self.state.set_option(Some(option));
        self.render();
    }

    /// Push the current view model to the surface. Safe to call redundantly.
    pub fn render(&mut self) {
        let view = self.state.view_model();
        self.surface.apply(&view);
    }

    /// Fill and submit `form`, consuming the cart. With nothing selected the
    /// surface gets an alert, the form is dropped unsubmitted and the cart
    /// comes back inside the error.
    pub fn checkout<F: CheckoutForm>(mut self, mut form: F) -> Result<F::Submitted, CheckoutRejected<S>> {
        let payload = match self.state.payload() {
            Ok(p) => p,
            Err(error) => {
                self.surface.alert(&error.to_string());
                return Err(CheckoutRejected { cart: self, error });
            }
        };
        form.set_photos(payload.photos_json);
        form.set_format(payload.format_id);
        Ok(form.submit())
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// A refused checkout: the reason plus the untouched cart.
#[derive(Error)]
#[error("{error}")]
pub struct CheckoutRejected<S: GallerySurface> {
    pub cart: SelectionCart<S>,
    pub error: CartError,
}

impl<S: GallerySurface> std::fmt::Debug for CheckoutRejected<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutRejected")
            .field("error", &self.error)
            .field("state", &self.cart.state)
            .finish()
    }
}

// ============================================================================
// Headless Surface
// ============================================================================

/// Surface with no display, used to replay a submitted selection.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    option: Option<PricingOption>,
    last_view: Option<CartViewModel>,
    alerts: Vec<String>,
}

impl HeadlessSurface {
    pub fn new(option: Option<PricingOption>) -> Self {
        Self {
            option,
            ..Self::default()
        }
    }

    pub fn last_view(&self) -> Option<&CartViewModel> {
        self.last_view.as_ref()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }
}

impl GallerySurface for HeadlessSurface {
    fn current_option(&self) -> Option<PricingOption> {
        self.option.clone()
    }

    fn apply(&mut self, view: &CartViewModel) {
        self.last_view = Some(view.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
