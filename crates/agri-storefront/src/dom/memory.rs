//! In-memory page: an arena element tree and a manually clocked window.
//!
//! Used by the test suite and for running handlers natively. The tree
//! understands enough HTML to load page fixtures and the constant markup the
//! handlers write; the host queues tasks on a `futures` [`LocalPool`] and
//! fires timers only when [`MemoryHost::advance`] moves its clock.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use agri_data::FormBody;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use super::selector::{SelectorList, Tree};
use super::{Document, EventKind, Host, Listener, ViewportOptions, VisibilityCallback};

/// Handle to a node in a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    /// Live value of a form control once script or the user changed it.
    value: Option<String>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: None,
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct Dom {
    nodes: Vec<Node>,
}

const ROOT: NodeId = NodeId(0);

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

impl Dom {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
        }
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn clear_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Element descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.element(id).is_some() {
                out.push(id);
            }
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn text_content(&self, id: NodeId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => self.nodes[id.0]
                .children
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
        }
    }

    fn is_connected(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ROOT {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.nodes[current.0].parent;
        }
        out
    }

    // === Serialization ===

    fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            self.serialize_into(*child, &mut out);
        }
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Root => out.push_str(&self.serialize_children(id)),
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (k, v) in &el.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape(v, true));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                out.push_str(&self.serialize_children(id));
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    // === Parsing ===

    /// Parse `html` and append the result under `parent`.
    fn parse_into(&mut self, parent: NodeId, html: &str) {
        let mut stack = vec![parent];
        let mut rest = html;

        while !rest.is_empty() {
            let current = stack.last().copied().unwrap_or(parent);

            if let Some(after) = rest.strip_prefix("<!--") {
                rest = after.find("-->").map(|i| &after[i + 3..]).unwrap_or("");
            } else if rest.starts_with("<!") {
                rest = rest.find('>').map(|i| &rest[i + 1..]).unwrap_or("");
            } else if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').unwrap_or(after.len());
                let tag = after[..end].trim().to_ascii_lowercase();
                if let Some(pos) = stack.iter().rposition(|id| {
                    self.element(*id).is_some_and(|el| el.tag == tag)
                }) {
                    stack.truncate(pos.max(1));
                }
                rest = after.get(end + 1..).unwrap_or("");
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                let (element, self_closing, after) = parse_tag(&rest[1..]);
                let tag = element.tag.clone();
                let id = self.push(Some(current), NodeKind::Element(element));
                rest = after;

                if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                    let close = format!("</{tag}");
                    let end = find_ascii_ci(rest, &close).unwrap_or(rest.len());
                    if end > 0 {
                        let raw = &rest[..end];
                        let text = match tag.as_str() {
                            "textarea" | "title" => unescape(raw),
                            _ => raw.to_string(),
                        };
                        self.push(Some(id), NodeKind::Text(text));
                    }
                    rest = &rest[end..];
                    rest = rest.find('>').map(|i| &rest[i + 1..]).unwrap_or("");
                } else if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                    stack.push(id);
                }
            } else {
                let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                let end = rest[first..]
                    .find('<')
                    .map(|i| i + first)
                    .unwrap_or(rest.len());
                let text = unescape(&rest[..end]);
                if !text.is_empty() {
                    self.push(Some(current), NodeKind::Text(text));
                }
                rest = &rest[end..];
            }
        }
    }
}

impl Tree for Dom {
    type Id = NodeId;

    fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }
}

/// Parses after `<` through the closing `>` of an opening tag.
fn parse_tag(input: &str) -> (Element, bool, &str) {
    let name_end = input
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(input.len());
    let mut element = Element::new(&input[..name_end]);
    let mut rest = &input[name_end..];

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("/>") {
            return (element, true, after);
        }
        if let Some(after) = rest.strip_prefix('>') {
            return (element, false, after);
        }
        if rest.is_empty() {
            return (element, false, rest);
        }
        if let Some(after) = rest.strip_prefix('/') {
            rest = after;
            continue;
        }

        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            match after.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("");
                    unescape(&body[..end])
                }
                _ => {
                    let end = after
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(after.len());
                    rest = &after[end..];
                    unescape(&after[..end])
                }
            }
        } else {
            String::new()
        };
        if !key.is_empty() {
            element.set_attr(&key, &value);
        }
    }
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

fn escape(text: &str, attr: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn style_pairs(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            (!k.is_empty()).then(|| (k.to_string(), v.trim().to_string()))
        })
        .collect()
}

struct Observer {
    targets: Vec<NodeId>,
    options: ViewportOptions,
    callback: VisibilityCallback<NodeId>,
}

/// An in-memory [`Document`].
pub struct MemoryDocument {
    dom: RefCell<Dom>,
    listeners: RefCell<Vec<(NodeId, EventKind, Listener)>>,
    dispatched: RefCell<Vec<(NodeId, EventKind)>>,
    observers: RefCell<Vec<Observer>>,
    intersection_supported: Cell<bool>,
    submitted_forms: RefCell<Vec<NodeId>>,
    hidden_modals: RefCell<Vec<NodeId>>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.dom.borrow().nodes.len())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl MemoryDocument {
    /// Load a page. Markup without a `<body>` is placed inside one.
    pub fn parse(html: &str) -> Self {
        let mut dom = Dom::new();
        if find_ascii_ci(html, "<body").is_some() {
            dom.parse_into(ROOT, html);
        } else {
            let root_el = dom.push(Some(ROOT), NodeKind::Element(Element::new("html")));
            dom.push(Some(root_el), NodeKind::Element(Element::new("head")));
            let body = dom.push(Some(root_el), NodeKind::Element(Element::new("body")));
            dom.parse_into(body, html);
        }
        Self {
            dom: RefCell::new(dom),
            listeners: RefCell::new(Vec::new()),
            dispatched: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            intersection_supported: Cell::new(true),
            submitted_forms: RefCell::new(Vec::new()),
            hidden_modals: RefCell::new(Vec::new()),
        }
    }

    /// Simulate a host without `IntersectionObserver`.
    pub fn without_intersection_observer(self) -> Self {
        self.intersection_supported.set(false);
        self
    }

    // === Interaction ===

    pub fn click(&self, node: &NodeId) {
        self.dispatch(node, EventKind::Click);
    }

    pub fn submit(&self, node: &NodeId) {
        self.dispatch(node, EventKind::Submit);
    }

    /// Type into a control and fire `change`, as a user edit would.
    pub fn change_value(&self, node: &NodeId, value: &str) {
        self.set_value(node, value);
        self.dispatch(node, EventKind::Change);
    }

    /// Report `node` as visible to every observer watching it. Returns the
    /// number of callbacks run.
    pub fn intersect(&self, node: &NodeId) -> usize {
        let callbacks: Vec<(usize, VisibilityCallback<NodeId>)> = self
            .observers
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, o)| o.targets.contains(node))
            .map(|(i, o)| (i, o.callback.clone()))
            .collect();

        let ran = callbacks.len();
        for (index, callback) in callbacks {
            if callback(node) {
                if let Some(observer) = self.observers.borrow_mut().get_mut(index) {
                    observer.targets.retain(|t| t != node);
                }
            }
        }
        ran
    }

    // === Inspection ===

    pub fn is_observed(&self, node: &NodeId) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|o| o.targets.contains(node))
    }

    /// Options of every observer created so far.
    pub fn observer_options(&self) -> Vec<ViewportOptions> {
        self.observers
            .borrow()
            .iter()
            .map(|o| o.options.clone())
            .collect()
    }

    /// Events fired with [`Document::dispatch`] or the interaction helpers.
    pub fn dispatched(&self) -> Vec<(NodeId, EventKind)> {
        self.dispatched.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn submitted_forms(&self) -> Vec<NodeId> {
        self.submitted_forms.borrow().clone()
    }

    pub fn hidden_modals(&self) -> Vec<NodeId> {
        self.hidden_modals.borrow().clone()
    }

    /// Serialized markup of the whole page.
    pub fn html(&self) -> String {
        self.dom.borrow().serialize_children(ROOT)
    }

    fn select(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        let dom = self.dom.borrow();
        dom.descendants(root)
            .into_iter()
            .filter(|id| list.matches(&*dom, *id))
            .collect()
    }

    fn with_element<R>(&self, node: &NodeId, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.dom.borrow().element(*node).map(f)
    }

    fn with_element_mut(&self, node: &NodeId, f: impl FnOnce(&mut Element)) {
        if let Some(el) = self.dom.borrow_mut().element_mut(*node) {
            f(el);
        }
    }

    fn is_control(tag: &str) -> bool {
        matches!(tag, "input" | "select" | "textarea")
    }

    fn select_value(&self, select: &NodeId) -> String {
        let options = self.query_all_in(select, "option");
        let chosen = options
            .iter()
            .find(|o| self.attr(o, "selected").is_some())
            .or_else(|| options.first());
        chosen
            .map(|o| self.attr(o, "value").unwrap_or_else(|| self.text(o)))
            .unwrap_or_default()
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.select(ROOT, selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(ROOT, selector)
    }

    fn query_in(&self, root: &NodeId, selector: &str) -> Option<NodeId> {
        self.select(*root, selector).into_iter().next()
    }

    fn query_all_in(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        self.select(*root, selector)
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let dom = self.dom.borrow();
        dom.descendants(ROOT)
            .into_iter()
            .find(|n| dom.attr(*n, "id") == Some(id))
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector)?;
        let dom = self.dom.borrow();
        dom.ancestors_inclusive(*node)
            .into_iter()
            .find(|id| list.matches(&*dom, *id))
    }

    fn body(&self) -> Option<NodeId> {
        self.query("body")
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.with_element(node, |el| el.attr(name).map(str::to_string))
            .flatten()
    }

    fn set_attr(&self, node: &NodeId, name: &str, value: &str) {
        self.with_element_mut(node, |el| el.set_attr(name, value));
    }

    fn remove_attr(&self, node: &NodeId, name: &str) {
        self.with_element_mut(node, |el| el.remove_attr(name));
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|c| c.split_whitespace().any(|have| have == class))
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let mut classes = self.attr(node, "class").unwrap_or_default();
        if !classes.trim().is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self.set_attr(node, "class", classes.trim_start());
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        if let Some(classes) = self.attr(node, "class") {
            let kept: Vec<&str> = classes
                .split_whitespace()
                .filter(|have| *have != class)
                .collect();
            self.set_attr(node, "class", &kept.join(" "));
        }
    }

    fn text(&self, node: &NodeId) -> String {
        self.dom.borrow().text_content(*node)
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.clear_children(*node);
        if !text.is_empty() {
            dom.push(Some(*node), NodeKind::Text(text.to_string()));
        }
    }

    fn inner_html(&self, node: &NodeId) -> String {
        self.dom.borrow().serialize_children(*node)
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.clear_children(*node);
        dom.parse_into(*node, html);
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        let style = self.attr(node, "style")?;
        style_pairs(&style)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut pairs = style_pairs(&self.attr(node, "style").unwrap_or_default());
        match pairs.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => pairs.push((property.to_string(), value.to_string())),
        }
        let style = pairs
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "style", &style);
    }

    fn value(&self, node: &NodeId) -> String {
        let Some((tag, live, attr)) = self.with_element(node, |el| {
            (el.tag.clone(), el.value.clone(), el.attr("value").map(str::to_string))
        }) else {
            return String::new();
        };
        if let Some(live) = live {
            return live;
        }
        match tag.as_str() {
            "textarea" => self.text(node),
            "select" => self.select_value(node),
            _ => attr.unwrap_or_default(),
        }
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        self.with_element_mut(node, |el| el.value = Some(value.to_string()));
    }

    fn is_disabled(&self, node: &NodeId) -> bool {
        self.attr(node, "disabled").is_some()
    }

    fn set_disabled(&self, node: &NodeId, disabled: bool) {
        if disabled {
            self.set_attr(node, "disabled", "");
        } else {
            self.remove_attr(node, "disabled");
        }
    }

    fn form_data(&self, form: &NodeId) -> FormBody {
        let mut body = FormBody::new();
        for control in self.query_all_in(form, "[name]") {
            let Some(tag) = self.with_element(&control, |el| el.tag.clone()) else {
                continue;
            };
            if !Self::is_control(&tag) || self.is_disabled(&control) {
                continue;
            }
            let kind = self.attr(&control, "type").unwrap_or_default();
            match kind.as_str() {
                "submit" | "button" | "reset" | "file" | "image" => continue,
                "checkbox" | "radio" if self.attr(&control, "checked").is_none() => continue,
                _ => {}
            }
            let name = self.attr(&control, "name").unwrap_or_default();
            let value = match kind.as_str() {
                "checkbox" | "radio" => self
                    .attr(&control, "value")
                    .unwrap_or_else(|| "on".to_string()),
                _ => self.value(&control),
            };
            body.append(name, value);
        }
        body
    }

    fn reset_form(&self, form: &NodeId) {
        for control in self.query_all_in(form, "input, select, textarea") {
            self.with_element_mut(&control, |el| el.value = None);
        }
    }

    fn submit_form(&self, form: &NodeId) {
        self.submitted_forms.borrow_mut().push(*form);
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(
            self.dom
                .borrow_mut()
                .push(None, NodeKind::Element(Element::new(tag))),
        )
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.dom.borrow_mut().append(*parent, *child);
    }

    fn remove(&self, node: &NodeId) {
        self.dom.borrow_mut().detach(*node);
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.dom.borrow().is_connected(*node)
    }

    fn listen(&self, node: &NodeId, kind: EventKind, listener: Listener) {
        self.listeners.borrow_mut().push((*node, kind, listener));
    }

    fn release_listeners(&self, root: &NodeId) {
        let mut released = self.dom.borrow().descendants(*root);
        released.push(*root);
        self.listeners
            .borrow_mut()
            .retain(|(id, _, _)| !released.contains(id));
    }

    fn dispatch(&self, node: &NodeId, kind: EventKind) {
        self.dispatched.borrow_mut().push((*node, kind));
        let path = self.dom.borrow().ancestors_inclusive(*node);
        for target in path {
            let listeners: Vec<Listener> = self
                .listeners
                .borrow()
                .iter()
                .filter(|(id, k, _)| *id == target && *k == kind)
                .map(|(_, _, l)| l.clone())
                .collect();
            for listener in listeners {
                listener();
            }
        }
    }

    fn hide_modal(&self, modal: &NodeId) {
        self.remove_class(modal, "show");
        self.set_style(modal, "display", "none");
        self.hidden_modals.borrow_mut().push(*modal);
    }

    fn observe_viewport(
        &self,
        targets: Vec<NodeId>,
        options: &ViewportOptions,
        on_visible: VisibilityCallback<NodeId>,
    ) -> bool {
        if !self.intersection_supported.get() {
            return false;
        }
        self.observers.borrow_mut().push(Observer {
            targets,
            options: options.clone(),
            callback: on_visible,
        });
        true
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

/// An in-memory [`Host`] with a manual clock.
pub struct MemoryHost {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
    confirm_script: RefCell<VecDeque<bool>>,
    confirm_default: Cell<bool>,
    confirmations: RefCell<Vec<String>>,
    reloads: Cell<usize>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("now", &self.now.get())
            .field("timers", &self.timers.borrow().len())
            .field("reloads", &self.reloads.get())
            .finish()
    }
}

impl MemoryHost {
    /// A host whose confirm dialogs answer "yes".
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            now: Cell::new(Duration::ZERO),
            next_seq: Cell::new(0),
            timers: RefCell::new(Vec::new()),
            confirm_script: RefCell::new(VecDeque::new()),
            confirm_default: Cell::new(true),
            confirmations: RefCell::new(Vec::new()),
            reloads: Cell::new(0),
        }
    }

    /// Answer for confirm dialogs once the scripted answers run out.
    pub fn answer_confirms(&self, answer: bool) {
        self.confirm_default.set(answer);
    }

    /// Queue an answer for the next confirm dialog.
    pub fn queue_confirm(&self, answer: bool) {
        self.confirm_script.borrow_mut().push_back(answer);
    }

    /// Messages of every confirm dialog shown.
    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.borrow().clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Poll spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Move the clock forward, firing due timers in order and letting tasks
    /// settle after each.
    pub fn advance(&self, by: Duration) {
        self.run_until_stalled();
        let target = self.now.get() + by;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);
                index.map(|i| timers.remove(i))
            };
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.callback)();
            self.run_until_stalled();
        }
        self.now.set(target);
    }
}

impl Host for MemoryHost {
    fn confirm(&self, message: &str) -> bool {
        self.confirmations.borrow_mut().push(message.to_string());
        self.confirm_script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.confirm_default.get())
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay,
            seq,
            callback,
        });
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        // Only fails once the pool is gone, when nothing could run it anyway.
        let _ = self.spawner.spawn_local(task);
    }
}
