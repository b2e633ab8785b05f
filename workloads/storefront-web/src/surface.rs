//! `window.AgriConnect`.

use std::rc::{Rc, Weak};

use agri_commerce::Currency;
use agri_storefront::format::{format_date, format_price};
use anyhow::{anyhow, Context};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::args::{alert_duration, badge_count, price_amount};
use crate::boot::WebStorefront;

const GLOBAL_NAME: &str = "AgriConnect";

pub(crate) fn install(storefront: &Rc<WebStorefront>) -> anyhow::Result<()> {
    let window = web_sys::window().context("no window")?;
    let api = Object::new();

    let weak = Rc::downgrade(storefront);
    export(
        &api,
        "showAlert",
        Closure::<dyn Fn(JsValue, JsValue, JsValue)>::new(move |kind, message, duration| {
            if let Some(storefront) = weak.upgrade() {
                storefront.show_alert(
                    &kind.as_string().unwrap_or_default(),
                    &text_of(&message),
                    alert_duration(duration.as_f64()),
                );
            }
        }),
    )?;

    let weak: Weak<WebStorefront> = Rc::downgrade(storefront);
    export(
        &api,
        "updateCartBadge",
        Closure::<dyn Fn(JsValue)>::new(move |count: JsValue| {
            if let Some(storefront) = weak.upgrade() {
                storefront.update_cart_badge(badge_count(count.as_f64()));
            }
        }),
    )?;

    export(
        &api,
        "formatPrice",
        Closure::<dyn Fn(JsValue) -> String>::new(|amount: JsValue| {
            match price_amount(amount.as_f64(), amount.as_string().as_deref()) {
                Some(amount) => format_price(amount),
                None => format!("{}NaN", Currency::INR.symbol()),
            }
        }),
    )?;

    export(
        &api,
        "formatDate",
        Closure::<dyn Fn(JsValue) -> String>::new(|text: JsValue| format_date(&text_of(&text))),
    )?;

    let weak: Weak<WebStorefront> = Rc::downgrade(storefront);
    export(
        &api,
        "getCSRFToken",
        Closure::<dyn Fn() -> String>::new(move || {
            weak.upgrade()
                .map(|storefront| storefront.csrf_token().to_string())
                .unwrap_or_default()
        }),
    )?;

    Reflect::set(&window, &JsValue::from_str(GLOBAL_NAME), &api)
        .map_err(|e| anyhow!("failed to export window.{GLOBAL_NAME}: {e:?}"))?;
    Ok(())
}

fn export<T: ?Sized>(api: &Object, name: &str, function: Closure<T>) -> anyhow::Result<()> {
    Reflect::set(api, &JsValue::from_str(name), function.as_ref())
        .map_err(|e| anyhow!("failed to export {name}: {e:?}"))?;
    function.forget();
    Ok(())
}

fn text_of(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.as_f64().map(|n| n.to_string()))
        .unwrap_or_default()
}
