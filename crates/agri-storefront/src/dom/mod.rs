//! Page access behind two traits.
//!
//! [`Document`] is the element tree and its events; [`Host`] is everything
//! the window owns (dialogs, reload, timers, the task queue). Handlers are
//! written against these so the same code drives the real page through
//! `web-sys` and the in-memory page used by the tests.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use agri_data::FormBody;
use futures::future::LocalBoxFuture;

pub mod memory;
mod selector;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::{MemoryDocument, MemoryHost, NodeId};

#[cfg(target_arch = "wasm32")]
pub use web::{WebDocument, WebHost};

/// DOM events the storefront listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Change => "change",
        }
    }

    /// Clicks and submits are fully handled in script, so the browser's
    /// default action (navigation, form post) is suppressed for them.
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Click | Self::Submit)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event callback. Receives nothing: handlers capture the node they were
/// bound to.
pub type Listener = Rc<dyn Fn()>;

/// Called when an observed element enters the viewport. Returning `true`
/// stops observing that element.
pub type VisibilityCallback<N> = Rc<dyn Fn(&N) -> bool>;

/// Intersection observer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportOptions {
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

/// The page's element tree.
///
/// Selector lookups that fail to parse behave like lookups that match
/// nothing.
pub trait Document: 'static {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    // === Lookup ===

    fn query(&self, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn query_in(&self, root: &Self::Node, selector: &str) -> Option<Self::Node>;
    fn query_all_in(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;

    // === Attributes and classes ===

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attr(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attr(&self, node: &Self::Node, name: &str);

    /// `data-<key>` attribute, `key` in kebab case.
    fn data(&self, node: &Self::Node, key: &str) -> Option<String> {
        self.attr(node, &format!("data-{key}"))
    }

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    fn set_class(&self, node: &Self::Node, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    // === Content ===

    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn inner_html(&self, node: &Self::Node) -> String;
    /// Only ever called with markup built from constants.
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    // === Form controls ===

    fn value(&self, node: &Self::Node) -> String;
    fn set_value(&self, node: &Self::Node, value: &str);
    fn is_disabled(&self, node: &Self::Node) -> bool;
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    /// Successful controls of `form`, as `new FormData(form)` would collect.
    fn form_data(&self, form: &Self::Node) -> FormBody;
    fn reset_form(&self, form: &Self::Node);
    /// Native submission (navigates; no `submit` event fires).
    fn submit_form(&self, form: &Self::Node);

    // === Tree ===

    /// `None` only for tag names the host rejects.
    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove(&self, node: &Self::Node);
    fn is_connected(&self, node: &Self::Node) -> bool;

    // === Events ===

    fn listen(&self, node: &Self::Node, kind: EventKind, listener: Listener);
    /// Drop every listener bound on `root` or its descendants. Safe to call
    /// from inside one of those listeners.
    fn release_listeners(&self, root: &Self::Node);
    /// Fire `kind` at `node` as a script-created, bubbling event.
    fn dispatch(&self, node: &Self::Node, kind: EventKind);

    // === Overlays and viewport ===

    /// Hide a modal dialog if the page's modal widget manages it.
    fn hide_modal(&self, modal: &Self::Node);

    /// Watch `targets` for viewport entry. Returns `false` when the host
    /// has no intersection observer, in which case nothing is watched.
    fn observe_viewport(
        &self,
        targets: Vec<Self::Node>,
        options: &ViewportOptions,
        on_visible: VisibilityCallback<Self::Node>,
    ) -> bool;
}

/// The window around the document.
pub trait Host: 'static {
    /// Blocking yes/no dialog.
    fn confirm(&self, message: &str) -> bool;
    fn reload(&self);
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>);
    /// Run a handler task on the page's event loop.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Quote `value` for use inside a `[attr="..."]` selector.
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_string_escapes() {
        assert_eq!(css_string("abc"), "\"abc\"");
        assert_eq!(css_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_event_kind_defaults() {
        assert!(EventKind::Click.prevents_default());
        assert!(EventKind::Submit.prevents_default());
        assert!(!EventKind::Change.prevents_default());
        assert_eq!(EventKind::Change.to_string(), "change");
    }
}
