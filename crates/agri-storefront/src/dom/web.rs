//! The live page through `web-sys`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use agri_data::FormBody;
use futures::future::LocalBoxFuture;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, Event, EventInit, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use super::{Document, EventKind, Host, Listener, ViewportOptions, VisibilityCallback};

/// A listener attached through [`Document::listen`]. Its closure stays
/// alive until [`Document::release_listeners`] detaches it.
struct Bound {
    node: Element,
    kind: EventKind,
    callback: Closure<dyn FnMut(Event)>,
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("node", &self.node)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The window's `document`.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
    bound: Rc<RefCell<Vec<Bound>>>,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            bound: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// The current page, if running inside a window.
    pub fn current() -> Option<Self> {
        web_sys::window()
            .and_then(|w| w.document())
            .map(Self::new)
    }

    fn collect(list: web_sys::NodeList) -> Vec<Element> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

fn js_get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

impl Document for WebDocument {
    type Node = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(Self::collect)
            .unwrap_or_default()
    }

    fn query_in(&self, root: &Element, selector: &str) -> Option<Element> {
        root.query_selector(selector).ok().flatten()
    }

    fn query_all_in(&self, root: &Element, selector: &str) -> Vec<Element> {
        root.query_selector_all(selector)
            .map(Self::collect)
            .unwrap_or_default()
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attr(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attr(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn style(&self, node: &Element, property: &str) -> Option<String> {
        node.dyn_ref::<HtmlElement>()
            .and_then(|el| el.style().get_property_value(property).ok())
            .filter(|v| !v.is_empty())
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }

    fn value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            node.get_attribute("value").unwrap_or_default()
        }
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else {
            let _ = node.set_attribute("value", value);
        }
    }

    fn is_disabled(&self, node: &Element) -> bool {
        js_get(node, "disabled")
            .and_then(|v| v.as_bool())
            .unwrap_or_else(|| node.has_attribute("disabled"))
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        let _ = Reflect::set(node, &JsValue::from_str("disabled"), &JsValue::from_bool(disabled));
    }

    fn form_data(&self, form: &Element) -> FormBody {
        let mut body = FormBody::new();
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return body;
        };
        let Ok(data) = web_sys::FormData::new_with_form(form) else {
            return body;
        };
        if let Ok(Some(entries)) = js_sys::try_iter(&data) {
            for entry in entries.flatten() {
                let pair: Array = entry.unchecked_into();
                // File inputs yield Blob values; only text fields are sent.
                if let (Some(k), Some(v)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                    body.append(k, v);
                }
            }
        }
        body
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn submit_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            let _ = form.submit();
        }
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn listen(&self, node: &Element, kind: EventKind, listener: Listener) {
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if kind.prevents_default() {
                event.prevent_default();
            }
            listener();
        });
        let _ = node
            .add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref());
        self.bound.borrow_mut().push(Bound {
            node: node.clone(),
            kind,
            callback,
        });
    }

    fn release_listeners(&self, root: &Element) {
        let released: Vec<Bound> = {
            let mut bound = self.bound.borrow_mut();
            let (released, kept): (Vec<Bound>, Vec<Bound>) =
                std::mem::take(&mut *bound).into_iter().partition(|b| {
                    let node: &web_sys::Node = b.node.as_ref();
                    root.contains(Some(node))
                });
            *bound = kept;
            released
        };
        if released.is_empty() {
            return;
        }
        for b in &released {
            let _ = b.node.remove_event_listener_with_callback(
                b.kind.as_str(),
                b.callback.as_ref().unchecked_ref(),
            );
        }
        // The event being handled may be running one of these closures.
        wasm_bindgen_futures::spawn_local(async move { drop(released) });
    }

    fn dispatch(&self, node: &Element, kind: EventKind) {
        let init = EventInit::new();
        init.set_bubbles(true);
        if let Ok(event) = Event::new_with_event_init_dict(kind.as_str(), &init) {
            let _ = node.dispatch_event(&event);
        }
    }

    fn hide_modal(&self, modal: &Element) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(modal_class) = js_get(&window, "bootstrap").and_then(|b| js_get(&b, "Modal"))
        else {
            return;
        };
        let instance = js_get(&modal_class, "getInstance")
            .and_then(|f| f.dyn_into::<Function>().ok())
            .and_then(|get_instance| get_instance.call1(&modal_class, modal).ok())
            .filter(|v| !v.is_null() && !v.is_undefined());
        if let Some(instance) = instance {
            if let Some(hide) = js_get(&instance, "hide").and_then(|f| f.dyn_into::<Function>().ok())
            {
                let _ = hide.call0(&instance);
            }
        }
    }

    fn observe_viewport(
        &self,
        targets: Vec<Element>,
        options: &ViewportOptions,
        on_visible: VisibilityCallback<Element>,
    ) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        if !Reflect::has(&window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false) {
            return false;
        }

        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    if on_visible(&target) {
                        observer.unobserve(&target);
                    }
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let Ok(observer) =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
        else {
            return false;
        };
        for target in &targets {
            observer.observe(target);
        }
        callback.forget();
        true
    }
}

/// The browser window.
#[derive(Debug, Clone)]
pub struct WebHost {
    window: web_sys::Window,
}

impl WebHost {
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }

    pub fn current() -> Option<Self> {
        web_sys::window().map(Self::new)
    }
}

impl Host for WebHost {
    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn reload(&self) {
        let _ = self.window.location().reload();
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || callback());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let _ = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis,
            );
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
