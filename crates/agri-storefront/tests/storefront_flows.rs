//! Whole-page flows against an in-memory page and a scripted backend.

use std::rc::Rc;
use std::time::Duration;

use agri_data::{FetchClient, Method, MockTransport};
use agri_observability::{LogLevel, MemorySink, StructuredLogger};
use agri_storefront::prelude::*;
use serde_json::json;

struct Page {
    doc: Rc<MemoryDocument>,
    host: Rc<MemoryHost>,
    mock: Rc<MockTransport>,
    logs: MemorySink,
    storefront: Rc<Storefront<MemoryDocument, MemoryHost>>,
}

impl Page {
    fn load(html: &str) -> Self {
        Self::load_with(html, StorefrontConfig::default(), |_| {})
    }

    /// `script` runs before the page starts, so it can queue startup replies.
    fn load_with(
        html: &str,
        config: StorefrontConfig,
        script: impl FnOnce(&MockTransport),
    ) -> Self {
        let doc = Rc::new(MemoryDocument::parse(html));
        let host = Rc::new(MemoryHost::new());
        let mock = Rc::new(MockTransport::new());
        script(&mock);

        let (logger, logs) = StructuredLogger::memory();
        let storefront = Storefront::new(
            doc.clone(),
            host.clone(),
            FetchClient::new(mock.clone()),
            config,
            logger,
        );
        storefront.start();
        host.run_until_stalled();

        Self {
            doc,
            host,
            mock,
            logs,
            storefront,
        }
    }

    fn node(&self, selector: &str) -> NodeId {
        self.doc
            .query(selector)
            .unwrap_or_else(|| panic!("no element for {selector}"))
    }

    fn click(&self, selector: &str) {
        self.doc.click(&self.node(selector));
        self.host.run_until_stalled();
    }

    fn text(&self, selector: &str) -> String {
        self.doc.text(&self.node(selector))
    }

    fn alerts(&self) -> Vec<(String, String)> {
        self.doc
            .query_all(".alert-container .alert")
            .iter()
            .map(|alert| {
                let class = self.doc.attr(alert, "class").unwrap_or_default();
                let message = self
                    .doc
                    .query_in(alert, ".alert-message")
                    .map(|m| self.doc.text(&m))
                    .unwrap_or_default();
                (class, message)
            })
            .collect()
    }

    fn last_alert(&self) -> (String, String) {
        self.alerts().pop().expect("no alert shown")
    }
}

const TOKEN_META: &str = r#"<meta name="csrf-token" content="tok-123">"#;

fn product_page() -> String {
    format!(
        r#"<html><head>{TOKEN_META}</head><body>
            <nav><span id="cart-badge" style="display: none"></span></nav>
            <button class="btn btn-outline-success add-to-cart-btn" data-product-id="p1" data-quantity="2"><i class="fas fa-cart-plus"></i> Add to Cart</button>
            <button class="btn btn-outline-success add-to-cart-btn" id="no-id">Add</button>
        </body></html>"#
    )
}

// === Initialization ===

#[test]
fn test_start_seeds_badge() {
    let page = Page::load_with(&product_page(), StorefrontConfig::default(), |mock| {
        mock.on_json(Method::Get, "/api/cart_count", json!({"count": 5}));
    });

    assert_eq!(page.text("#cart-badge"), "5");
    let badge = page.node("#cart-badge");
    assert_eq!(page.doc.style(&badge, "display").as_deref(), Some("block"));
    assert_eq!(page.storefront.cart_count(), Some(CartCount::new(5)));
}

#[test]
fn test_start_without_badge_skips_count() {
    let page = Page::load("<body><p>About us</p></body>");
    assert!(page.mock.requests().is_empty());
}

#[test]
fn test_start_count_failure_is_logged_only() {
    let page = Page::load_with(&product_page(), StorefrontConfig::default(), |mock| {
        mock.fail(Method::Get, "/api/cart_count", "offline");
    });

    assert_eq!(page.storefront.cart_count(), None);
    assert!(page.alerts().is_empty());
    assert_eq!(page.logs.at_least(LogLevel::Error).len(), 1);
}

// === Add to cart ===

#[test]
fn test_add_to_cart_success() {
    let page = Page::load(&product_page());
    let pending = page.mock.defer(Method::Post, "/add_to_cart");
    let button = page.node("[data-product-id=p1]");
    let original = page.doc.inner_html(&button);

    page.click("[data-product-id=p1]");
    assert!(page.doc.is_disabled(&button));
    assert!(page.doc.inner_html(&button).contains("Adding..."));

    pending.respond_json(json!({"success": true, "message": "Added to cart", "cart_count": 7}));
    page.host.run_until_stalled();

    let form = page.mock.requests_to("/add_to_cart")[0].form().unwrap();
    assert_eq!(form.get("product_id"), Some("p1"));
    assert_eq!(form.get("quantity"), Some("2"));
    assert_eq!(form.get("csrf_token"), Some("tok-123"));

    assert_eq!(page.text("#cart-badge"), "7");
    assert!(page.doc.has_class(&button, "btn-success"));
    assert!(page.doc.inner_html(&button).contains("Added!"));
    let (class, message) = page.last_alert();
    assert!(class.contains("alert-success"));
    assert_eq!(message, "Added to cart");

    page.host.advance(Duration::from_secs(2));
    assert_eq!(page.doc.inner_html(&button), original);
    assert!(!page.doc.is_disabled(&button));
    assert!(page.doc.has_class(&button, "btn-outline-success"));
    assert!(!page.doc.has_class(&button, "btn-success"));
}

#[test]
fn test_add_to_cart_zero_count_hides_badge() {
    let page = Page::load(&product_page());
    page.mock.on_json(
        Method::Post,
        "/add_to_cart",
        json!({"success": true, "message": "ok", "cart_count": 0}),
    );

    page.click("[data-product-id=p1]");
    let badge = page.node("#cart-badge");
    assert_eq!(page.doc.style(&badge, "display").as_deref(), Some("none"));
}

#[test]
fn test_add_to_cart_rejected_restores_button() {
    let page = Page::load_with(&product_page(), StorefrontConfig::default(), |mock| {
        mock.on_json(Method::Get, "/api/cart_count", json!({"count": 4}));
    });
    page.mock.on_json(
        Method::Post,
        "/add_to_cart",
        json!({"success": false, "message": "Only 1 kg left"}),
    );
    let button = page.node("[data-product-id=p1]");
    let original = page.doc.inner_html(&button);

    page.click("[data-product-id=p1]");

    assert_eq!(page.doc.inner_html(&button), original);
    assert!(!page.doc.is_disabled(&button));
    assert_eq!(page.storefront.cart_count(), Some(CartCount::new(4)));
    assert_eq!(page.text("#cart-badge"), "4");
    let (class, message) = page.last_alert();
    assert!(class.contains("alert-danger"));
    assert_eq!(message, "Only 1 kg left");
}

#[test]
fn test_add_to_cart_network_failure_uses_fallback() {
    let page = Page::load(&product_page());
    page.mock.fail(Method::Post, "/add_to_cart", "connection reset");
    let button = page.node("[data-product-id=p1]");

    page.click("[data-product-id=p1]");

    assert!(!page.doc.is_disabled(&button));
    assert_eq!(page.last_alert().1, "Error adding item to cart");
    assert!(page
        .logs
        .at_least(LogLevel::Error)
        .iter()
        .any(|e| e.field("endpoint") == Some("/add_to_cart")));
}

#[test]
fn test_add_to_cart_without_product_id_sends_nothing() {
    let page = Page::load(&product_page());
    page.click("#no-id");

    assert!(page.mock.requests_to("/add_to_cart").is_empty());
    assert_eq!(page.last_alert().1, "Error adding item to cart");
}

// === Cart page ===

fn cart_page() -> String {
    format!(
        r#"<html><head>{TOKEN_META}</head><body>
        <div class="cart-item-row" id="row-a">
            <span class="selection-checkbox" data-item-id="a"><i class="far fa-circle"></i></span>
            <input type="number" data-item-id="a" value="2">
            <button class="update-cart-btn" data-item-id="a">Update</button>
            <button class="remove-cart-btn" data-item-id="a">Remove</button>
            <span class="item-total">&#8377;100.00</span>
        </div>
        <div class="cart-item-row" id="row-b">
            <span class="selection-checkbox" data-item-id="b"><i class="far fa-circle"></i></span>
            <input type="number" data-item-id="b" value="1">
            <span class="item-total">&#8377;bad</span>
        </div>
        <div class="cart-item-row selected" id="row-c">
            <span class="selection-checkbox selected" data-item-id="c"></span>
            <span class="item-total">&#8377;50.50</span>
        </div>
        <strong id="selected-total">&#8377;50.50</strong>
        <button id="negotiate-selected-btn">Negotiate</button>
        </body></html>"#
    )
}

#[test]
fn test_update_quantity_reloads() {
    let page = Page::load(&cart_page());
    page.mock
        .on_json(Method::Post, "/update_cart_item", json!({"success": true}));
    page.doc.set_value(&page.node("input[data-item-id=a]"), "3");

    page.click(".update-cart-btn");

    let sent = &page.mock.requests_to("/update_cart_item")[0];
    assert_eq!(sent.json().unwrap(), json!({"item_id": "a", "quantity": 3}));
    assert_eq!(sent.header("X-CSRFToken"), Some("tok-123"));
    assert_eq!(page.last_alert().1, "Cart updated successfully");
    assert_eq!(page.host.reloads(), 1);
    assert!(page.host.confirmations().is_empty());
}

#[test]
fn test_zero_quantity_confirmed_sends_zero() {
    let page = Page::load(&cart_page());
    page.mock
        .on_json(Method::Post, "/update_cart_item", json!({"success": true}));
    page.doc.set_value(&page.node("input[data-item-id=a]"), "-4");
    page.host.queue_confirm(true);

    page.click(".update-cart-btn");

    assert_eq!(
        page.host.confirmations(),
        vec!["Are you sure you want to remove this item from your cart?".to_string()]
    );
    let sent = &page.mock.requests_to("/update_cart_item")[0];
    assert_eq!(sent.json().unwrap()["quantity"], 0);
}

#[test]
fn test_zero_quantity_declined_sends_nothing() {
    let page = Page::load(&cart_page());
    page.doc.set_value(&page.node("input[data-item-id=a]"), "0");
    page.host.queue_confirm(false);

    page.click(".update-cart-btn");

    assert_eq!(page.host.confirmations().len(), 1);
    assert!(page.mock.requests_to("/update_cart_item").is_empty());
    assert_eq!(page.host.reloads(), 0);
}

#[test]
fn test_unreadable_quantity_rejected_locally() {
    let page = Page::load(&cart_page());
    page.doc.set_value(&page.node("input[data-item-id=a]"), "lots");

    page.click(".update-cart-btn");

    assert!(page.mock.requests_to("/update_cart_item").is_empty());
    assert_eq!(page.last_alert().1, "Please enter a valid quantity");
}

#[test]
fn test_update_failure_keeps_page() {
    let page = Page::load(&cart_page());
    page.mock.on_json(
        Method::Post,
        "/update_cart_item",
        json!({"success": false, "message": "Insufficient stock"}),
    );

    page.click(".update-cart-btn");

    assert_eq!(page.last_alert().1, "Insufficient stock");
    assert_eq!(page.host.reloads(), 0);
}

#[test]
fn test_remove_confirms_then_sends_zero() {
    let page = Page::load(&cart_page());
    page.mock
        .on_json(Method::Post, "/update_cart_item", json!({"success": true}));

    page.click(".remove-cart-btn");

    assert_eq!(page.host.confirmations().len(), 1);
    let sent = &page.mock.requests_to("/update_cart_item")[0];
    assert_eq!(sent.json().unwrap(), json!({"item_id": "a", "quantity": 0}));
    assert_eq!(page.host.reloads(), 1);
}

// === Selection ===

#[test]
fn test_toggle_selects_row_and_updates_total() {
    let page = Page::load(&cart_page());
    page.mock.on_json(
        Method::Post,
        "/toggle_cart_item_selection",
        json!({"success": true, "selected": true}),
    );

    page.click("#row-a .selection-checkbox");

    let row = page.node("#row-a");
    let control = page.node("#row-a .selection-checkbox");
    assert!(page.doc.has_class(&row, "selected"));
    assert!(page.doc.has_class(&control, "selected"));
    assert!(page.doc.query_in(&control, "i.fa-check-circle").is_some());
    assert!(page.doc.has_class(&row, "selection-highlight"));
    assert_eq!(page.text("#selected-total"), "\u{20b9}150.50");

    page.host.advance(Duration::from_millis(300));
    assert!(!page.doc.has_class(&row, "selection-highlight"));
}

#[test]
fn test_toggle_deselect_disables_negotiate() {
    let page = Page::load(&cart_page());
    page.mock.on_json(
        Method::Post,
        "/toggle_cart_item_selection",
        json!({"success": true, "selected": false}),
    );

    page.click("#row-c .selection-checkbox");

    assert!(!page.doc.has_class(&page.node("#row-c"), "selected"));
    assert_eq!(page.text("#selected-total"), "\u{20b9}0.00");
    assert!(page.doc.is_disabled(&page.node("#negotiate-selected-btn")));
}

#[test]
fn test_subtotal_skips_unreadable_selected_rows() {
    // "₹100.00" selected + "₹bad" selected + "₹50.50" unselected
    let page = Page::load(&cart_page());
    for id in ["#row-a", "#row-b"] {
        page.doc.add_class(&page.node(id), "selected");
    }
    page.doc.remove_class(&page.node("#row-c"), "selected");

    let summary = page.storefront.update_selected_total();

    assert_eq!(page.text("#selected-total"), "\u{20b9}100.00");
    assert_eq!(summary.selected_rows, 2);
    assert_eq!(summary.skipped_rows, 1);
    assert!(!page.doc.is_disabled(&page.node("#negotiate-selected-btn")));
}

#[test]
fn test_last_toggle_response_wins() {
    let page = Page::load(&cart_page());
    let first = page.mock.defer(Method::Post, "/toggle_cart_item_selection");
    let second = page.mock.defer(Method::Post, "/toggle_cart_item_selection");

    page.click("#row-a .selection-checkbox");
    page.click("#row-a .selection-checkbox");
    assert_eq!(page.mock.requests_to("/toggle_cart_item_selection").len(), 2);

    second.respond_json(json!({"success": true, "selected": true}));
    page.host.run_until_stalled();
    first.respond_json(json!({"success": true, "selected": false}));
    page.host.run_until_stalled();

    assert!(!page.doc.has_class(&page.node("#row-a"), "selected"));
}

#[test]
fn test_toggle_failure_leaves_dom() {
    let page = Page::load(&cart_page());
    page.mock
        .fail(Method::Post, "/toggle_cart_item_selection", "offline");
    let control = page.node("#row-a .selection-checkbox");

    page.click("#row-a .selection-checkbox");

    let (_, message) = page.last_alert();
    assert_eq!(message, "Error updating selection");
    assert!(!page.doc.has_class(&page.node("#row-a"), "selected"));
    assert!(page.doc.inner_html(&control).contains("far fa-circle"));
    assert_eq!(page.text("#selected-total"), "\u{20b9}50.50");
}

// === Offers ===

fn offer_page() -> String {
    r#"<body>
        <div class="modal show" id="offerModal">
          <form id="offerForm">
            <input type="hidden" name="product_id" value="p1">
            <input type="number" name="offered_price" value="90">
            <textarea name="message">Bulk order</textarea>
            <button type="submit">Send Offer</button>
          </form>
        </div>
        <input type="hidden" name="csrf_token" value="page-token">
    </body>"#
        .to_string()
}

#[test]
fn test_offer_success_resets_and_closes() {
    let page = Page::load(&offer_page());
    let pending = page.mock.defer(Method::Post, "/send_offer");
    let form = page.node("#offerForm");
    let submit = page.node("#offerForm button");

    page.doc.set_value(&page.node("[name=offered_price]"), "85");
    page.doc.submit(&form);
    page.host.run_until_stalled();
    assert!(page.doc.is_disabled(&submit));
    assert!(page.doc.inner_html(&submit).contains("Sending..."));

    pending.respond_json(json!({"success": true, "message": "Offer sent"}));
    page.host.run_until_stalled();

    let sent = page.mock.requests_to("/send_offer")[0].form().unwrap();
    assert_eq!(sent.get("offered_price"), Some("85"));
    assert_eq!(sent.get("message"), Some("Bulk order"));
    assert_eq!(sent.get("csrf_token"), Some("page-token"));

    assert_eq!(page.doc.value(&page.node("[name=offered_price]")), "90");
    assert_eq!(page.doc.hidden_modals(), vec![page.node("#offerModal")]);
    assert!(!page.doc.is_disabled(&submit));
    assert_eq!(page.doc.inner_html(&submit), "Send Offer");
    assert_eq!(page.last_alert().1, "Offer sent");
}

#[test]
fn test_offer_failure_restores_and_keeps_fields() {
    let page = Page::load(&offer_page());
    page.mock.fail(Method::Post, "/send_offer", "offline");
    let submit = page.node("#offerForm button");
    page.doc.set_value(&page.node("[name=offered_price]"), "85");

    page.doc.submit(&page.node("#offerForm"));
    page.host.run_until_stalled();

    assert!(!page.doc.is_disabled(&submit));
    assert_eq!(page.doc.inner_html(&submit), "Send Offer");
    assert_eq!(page.doc.value(&page.node("[name=offered_price]")), "85");
    assert!(page.doc.hidden_modals().is_empty());
    assert_eq!(page.last_alert().1, "Error sending offer");
}

#[test]
fn test_offer_keeps_form_token() {
    let html = offer_page().replace(
        r#"<button type="submit">"#,
        r#"<input type="hidden" name="csrf_token" value="form-token"><button type="submit">"#,
    );
    let page = Page::load(&html);
    page.mock
        .on_json(Method::Post, "/send_offer", json!({"success": true}));

    page.doc.submit(&page.node("#offerForm"));
    page.host.run_until_stalled();

    let sent = page.mock.requests_to("/send_offer")[0].form().unwrap();
    assert_eq!(sent.fields().len(), 4);
    assert_eq!(sent.get("csrf_token"), Some("form-token"));
}

#[test]
fn test_respond_to_offer() {
    let page = Page::load(
        r#"<button class="respond-offer-btn" data-offer-id="o7" data-action="accept">Accept</button>
           <button class="respond-offer-btn" id="bad" data-offer-id="o7" data-action="haggle">?</button>"#,
    );
    page.mock.on_json(
        Method::Get,
        "/respond_to_offer/o7/accept",
        json!({"success": true, "message": "Offer accepted"}),
    );

    page.click("[data-action=accept]");
    assert_eq!(page.last_alert().1, "Offer accepted");
    assert_eq!(page.host.reloads(), 1);

    page.click("#bad");
    assert_eq!(page.mock.requests().len(), 1);
    assert_eq!(page.last_alert().1, "Error responding to offer");
}

// === Steppers and filters ===

#[test]
fn test_stepper_bounds_and_change_events() {
    let page = Page::load(
        r#"<div class="quantity-control">
             <button class="qty-minus">-</button>
             <input type="number" value="1" max="3">
             <button class="qty-plus">+</button>
           </div>"#,
    );
    let input = page.node(".quantity-control input");

    page.click(".qty-minus");
    assert_eq!(page.doc.value(&input), "1");

    for _ in 0..5 {
        page.click(".qty-plus");
    }
    assert_eq!(page.doc.value(&input), "3");

    page.click(".qty-minus");
    assert_eq!(page.doc.value(&input), "2");

    let changes = page
        .doc
        .dispatched()
        .into_iter()
        .filter(|(node, kind)| *node == input && *kind == EventKind::Change)
        .count();
    assert_eq!(changes, 3);
}

#[test]
fn test_stepper_default_max() {
    let page = Page::load(
        r#"<div class="quantity-control">
             <button class="qty-minus">-</button>
             <input type="number" value="999">
             <button class="qty-plus">+</button>
           </div>"#,
    );
    page.click(".qty-plus");
    assert_eq!(page.doc.value(&page.node("input")), "999");
}

#[test]
fn test_search_filter_submits_form() {
    let page = Page::load(
        r#"<form id="search" action="/products">
             <select class="search-filter" name="category">
               <option value="">All</option><option value="grains">Grains</option>
             </select>
           </form>
           <select class="search-filter" id="orphan"><option>x</option></select>"#,
    );

    page.doc
        .change_value(&page.node("select[name=category]"), "grains");
    page.doc.change_value(&page.node("#orphan"), "x");

    assert_eq!(page.doc.submitted_forms(), vec![page.node("#search")]);
}

// === Product deletion ===

#[test]
fn test_delete_product() {
    let page = Page::load(&format!(
        r#"<html><head>{TOKEN_META}</head><body>
           <button class="delete-product-btn" data-product-id="p9">Delete</button>
           </body></html>"#
    ));
    page.mock.on_json(
        Method::Post,
        "/farmer/delete_product/p9",
        json!({"success": true, "message": "Product deleted"}),
    );

    page.host.queue_confirm(false);
    page.click(".delete-product-btn");
    assert!(page.mock.requests().is_empty());

    page.click(".delete-product-btn");
    let sent = &page.mock.requests_to("/farmer/delete_product/p9")[0];
    assert_eq!(sent.header("X-CSRFToken"), Some("tok-123"));
    assert_eq!(sent.form().unwrap().get("csrf_token"), Some("tok-123"));
    assert_eq!(page.host.reloads(), 1);
    assert_eq!(
        page.host.confirmations()[1],
        "Are you sure you want to delete this product?"
    );
}

// === Page-script surface ===

#[test]
fn test_show_alert_and_badge_surface() {
    let page = Page::load(&product_page());

    page.storefront
        .show_alert("warning", "Heads up", Some(Duration::from_secs(1)));
    page.storefront.show_alert("sparkly", "Still shown", None);
    let alerts = page.alerts();
    assert!(alerts[0].0.contains("alert-warning"));
    assert!(alerts[1].0.contains("alert-info"));

    page.host.advance(Duration::from_secs(1));
    assert_eq!(page.alerts().len(), 1);

    page.storefront.update_cart_badge(Some(12));
    assert_eq!(page.text("#cart-badge"), "12");

    page.mock
        .on_json(Method::Get, "/api/cart_count", json!({"count": 2}));
    page.storefront.update_cart_badge(None);
    page.host.run_until_stalled();
    assert_eq!(page.text("#cart-badge"), "2");

    assert_eq!(page.storefront.csrf_token().as_str(), "tok-123");
}
