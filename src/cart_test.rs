//! Tests for the selection cart state machine.
//!
//! Everything runs against an in-memory surface that records what the cart
//! drew, so no browser is involved.

use super::*;
use std::collections::HashMap;

// ============================================================================
// Helpers
// ============================================================================

/// Surface that remembers every view model it was given and every alert.
struct RecordingSurface {
    option: Option<PricingOption>,
    cards: Vec<String>,
    indicators: HashMap<String, bool>,
    views: Vec<CartViewModel>,
    alerts: Vec<String>,
}

impl RecordingSurface {
    fn new(option: Option<PricingOption>, cards: &[&str]) -> Self {
        Self {
            option,
            cards: cards.iter().map(|c| c.to_string()).collect(),
            indicators: HashMap::new(),
            views: Vec::new(),
            alerts: Vec::new(),
        }
    }

    fn last(&self) -> &CartViewModel {
        self.views.last().expect("cart rendered at least once")
    }
}

impl GallerySurface for RecordingSurface {
    fn current_option(&self) -> Option<PricingOption> {
        self.option.clone()
    }

    fn apply(&mut self, view: &CartViewModel) {
        for card in &self.cards {
            self.indicators.insert(card.clone(), view.is_selected(card));
        }
        self.views.push(view.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[derive(Default)]
struct RecordingForm {
    photos: Option<String>,
    format: Option<String>,
    submitted: bool,
}

impl CheckoutForm for &mut RecordingForm {
    type Submitted = ();

    fn set_photos(&mut self, photos_json: String) {
        self.photos = Some(photos_json);
    }

    fn set_format(&mut self, format_id: String) {
        self.format = Some(format_id);
    }

    fn submit(self) {
        self.submitted = true;
    }
}

fn price(s: &str) -> Price {
    s.parse().unwrap()
}

fn a4() -> PricingOption {
    PricingOption::new("A4", price("2.50"))
}

fn cart_with(cards: &[&str]) -> SelectionCart<RecordingSurface> {
    SelectionCart::initialize(RecordingSurface::new(Some(a4()), cards))
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_initialize_renders_empty_state() {
    let cart = cart_with(&["p1", "p2"]);
    let surface = cart.surface();

    assert_eq!(surface.views.len(), 1);
    let view = surface.last();
    assert_eq!(view.count, 0);
    assert_eq!(view.total_text, "0.00");
    assert!(!view.panel_visible);
    assert_eq!(view.option_id.as_deref(), Some("A4"));
    assert_eq!(cart.state().phase(), CartPhase::Empty);
    assert!(surface.indicators.values().all(|selected| !selected));
}

#[test]
fn test_initialize_without_options_prices_at_zero() {
    let mut cart = SelectionCart::initialize(RecordingSurface::new(None, &["p1"]));
    cart.toggle_photo("p1");

    let view = cart.surface().last();
    assert_eq!(view.count, 1);
    assert_eq!(view.total, Price::ZERO);
    assert_eq!(view.option_id, None);
}

// ============================================================================
// Toggling
// ============================================================================

#[test]
fn test_toggle_twice_restores_state() {
    let mut cart = cart_with(&["p1"]);
    let before = cart.state().clone();

    cart.toggle_photo("p1");
    assert!(cart.state().is_selected("p1"));
    cart.toggle_photo("p1");

    assert_eq!(cart.state(), &before);
}

#[test]
fn test_count_matches_odd_toggles() {
    let mut cart = cart_with(&[]);
    let sequence = ["a", "b", "a", "c", "c", "c", "d", "b", "e", "a"];

    let mut toggles: HashMap<&str, usize> = HashMap::new();
    for id in sequence {
        cart.toggle_photo(id);
        *toggles.entry(id).or_insert(0) += 1;

        let expected = toggles.values().filter(|n| *n % 2 == 1).count();
        assert_eq!(cart.state().count(), expected);
    }

    let selected: Vec<&str> = cart.state().selected().iter().map(String::as_str).collect();
    assert_eq!(selected, vec!["c", "d", "e", "a"]);
}

#[test]
fn test_every_mutation_renders_fresh_total_and_panel() {
    let mut cart = cart_with(&["p1", "p2", "p3"]);

    cart.toggle_photo("p1");
    cart.toggle_photo("p2");
    cart.change_option(PricingOption::new("A3", price("4.00")));
    cart.toggle_photo("p2");
    cart.toggle_photo("p1");

    let views = &cart.surface().views;
    assert_eq!(views.len(), 6);
    let unit_prices = ["2.50", "2.50", "2.50", "4.00", "4.00", "4.00"];
    for (view, unit) in views.iter().zip(unit_prices) {
        assert_eq!(view.total, price(unit).times(view.count));
        assert_eq!(view.panel_visible, view.count > 0);
    }
}

#[test]
fn test_card_indicators_follow_selection() {
    let mut cart = cart_with(&["p1", "p2"]);
    cart.toggle_photo("p2");

    let surface = cart.surface();
    assert_eq!(surface.indicators.get("p1"), Some(&false));
    assert_eq!(surface.indicators.get("p2"), Some(&true));
}

#[test]
fn test_render_is_idempotent() {
    let mut cart = cart_with(&["p1"]);
    cart.toggle_photo("p1");
    cart.render();
    cart.render();

    let views = &cart.surface().views;
    assert_eq!(views[views.len() - 1], views[views.len() - 2]);
    assert_eq!(views[views.len() - 2], views[views.len() - 3]);
}

// ============================================================================
// Phases
// ============================================================================

#[test]
fn test_phase_transitions() {
    let mut cart = cart_with(&["p1", "p2"]);
    assert_eq!(cart.state().phase(), CartPhase::Empty);

    cart.toggle_photo("p1");
    assert_eq!(cart.state().phase(), CartPhase::NonEmpty);

    cart.toggle_photo("p2");
    assert_eq!(cart.state().phase(), CartPhase::NonEmpty);

    cart.change_option(PricingOption::new("A3", price("4.00")));
    assert_eq!(cart.state().phase(), CartPhase::NonEmpty);

    cart.toggle_photo("p1");
    cart.toggle_photo("p2");
    assert_eq!(cart.state().phase(), CartPhase::Empty);
    assert!(!cart.surface().last().panel_visible);
}

#[test]
fn test_select_deselect_then_change_option() {
    let mut cart = cart_with(&["p1", "p2"]);

    cart.toggle_photo("p1");
    assert_eq!(cart.surface().last().count, 1);
    assert!(cart.surface().last().panel_visible);

    cart.toggle_photo("p2");
    assert_eq!(cart.surface().last().count, 2);

    cart.toggle_photo("p1");
    assert_eq!(cart.surface().last().count, 1);

    cart.change_option(PricingOption::new("A3", price("5.00")));
    let view = cart.surface().last();
    assert_eq!(view.count, 1);
    assert_eq!(view.total_text, "5.00");
    assert_eq!(cart.state().selected(), &["p2".to_string()]);
}

// ============================================================================
// Checkout
// ============================================================================

#[test]
fn test_checkout_empty_alerts_and_does_not_submit() {
    let cart = cart_with(&["p1"]);
    let mut form = RecordingForm::default();

    let rejected = cart.checkout(&mut form).unwrap_err();

    assert_eq!(rejected.error, CartError::EmptySelection);
    assert_eq!(rejected.to_string(), EMPTY_SELECTION_MESSAGE);
    assert!(!form.submitted);
    assert!(form.photos.is_none());
    assert!(form.format.is_none());
    assert_eq!(rejected.cart.surface().alerts, vec![EMPTY_SELECTION_MESSAGE.to_string()]);
    assert_eq!(rejected.cart.state().count(), 0);
}

#[test]
fn test_rejected_cart_stays_usable() {
    let cart = cart_with(&["p1", "p2"]);
    let mut cart = cart.checkout(&mut RecordingForm::default()).unwrap_err().cart;

    cart.toggle_photo("p2");
    assert_eq!(cart.surface().last().total_text, "2.50");

    let mut form = RecordingForm::default();
    cart.checkout(&mut form).unwrap();
    assert_eq!(form.photos.as_deref(), Some(r#"["p2"]"#));
}

#[test]
fn test_checkout_three_photos_a4() {
    let mut cart = cart_with(&["p1", "p2", "p3", "p4"]);
    cart.toggle_photo("p3");
    cart.toggle_photo("p1");
    cart.toggle_photo("p4");
    assert_eq!(cart.surface().last().total_text, "7.50");

    let mut form = RecordingForm::default();
    cart.checkout(&mut form).unwrap();

    assert!(form.submitted);
    assert_eq!(form.format.as_deref(), Some("A4"));
    let photos: Vec<String> = serde_json::from_str(form.photos.as_deref().unwrap()).unwrap();
    assert_eq!(photos, vec!["p3", "p1", "p4"]);
}

#[test]
fn test_checkout_without_option_sends_empty_format() {
    let mut cart = SelectionCart::initialize(RecordingSurface::new(None, &["p1"]));
    cart.toggle_photo("p1");

    let mut form = RecordingForm::default();
    cart.checkout(&mut form).unwrap();

    assert_eq!(form.format.as_deref(), Some(""));
}

#[test]
fn test_headless_surface_keeps_last_view() {
    let mut cart = SelectionCart::initialize(HeadlessSurface::new(Some(a4())));
    cart.toggle_photo("7");
    cart.toggle_photo("9");

    let surface = cart.into_surface();
    let view = surface.last_view().unwrap();
    assert_eq!(view.count, 2);
    assert_eq!(view.total_text, "5.00");
    assert!(surface.alerts().is_empty());
}
