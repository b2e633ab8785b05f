//! Page boot.

use std::cell::RefCell;
use std::rc::Rc;

use agri_data::FetchClient;
use agri_observability::SessionId;
use agri_storefront::dom::{WebDocument, WebHost};
use agri_storefront::{Storefront, StorefrontConfig};
use anyhow::{anyhow, Context};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::surface;

pub(crate) type WebStorefront = Storefront<WebDocument, WebHost>;

thread_local! {
    static STOREFRONT: RefCell<Option<Rc<WebStorefront>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    when_ready().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

/// Launch now, or on `DOMContentLoaded` while the page is still parsing.
fn when_ready() -> anyhow::Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .context("no document to attach to")?;
    if document.ready_state() != "loading" {
        return launch();
    }

    let on_ready = Closure::once_into_js(|| {
        if let Err(e) = launch() {
            web_sys::console::error_1(&JsValue::from_str(&format!(
                "AgriConnect failed to start: {e:#}"
            )));
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        .map_err(|e| anyhow!("failed to listen for DOMContentLoaded: {e:?}"))
}

fn launch() -> anyhow::Result<()> {
    if STOREFRONT.with(|slot| slot.borrow().is_some()) {
        return Ok(());
    }

    let doc = Rc::new(WebDocument::current().context("no document")?);
    let host = Rc::new(WebHost::current().context("no window")?);
    let (config, config_error) = StorefrontConfig::from_document_or_default(&*doc);

    let mut logger = config.logger(SessionId::generate());
    if let Some(page) = web_sys::window().and_then(|w| w.location().pathname().ok()) {
        logger = logger.with_page(page);
    }
    if let Some(error) = config_error {
        logger
            .warn_builder("Invalid storefront config, using defaults")
            .display("error", &error)
            .emit();
    }

    let storefront = Storefront::new(doc, host, FetchClient::browser(), config, logger);
    storefront.start();
    surface::install(&storefront)?;

    STOREFRONT.with(|slot| *slot.borrow_mut() = Some(storefront));
    Ok(())
}
