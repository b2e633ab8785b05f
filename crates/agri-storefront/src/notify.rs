//! Transient notifications.
//!
//! Alerts stack in a fixed `.alert-container` in the top corner, created on
//! first use. Each one closes on its own timer or from its close button;
//! closing an alert that is already gone does nothing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::dom::{Document, EventKind, Host};
use crate::error::{Result, StorefrontError};

const CONTAINER_SELECTOR: &str = ".alert-container";
const CONTAINER_CLASS: &str = "alert-container position-fixed top-0 end-0 p-3";
const CONTAINER_Z_INDEX: &str = "1050";

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

impl Severity {
    /// Read a severity name as page scripts pass it. `danger` is accepted
    /// for `error`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "success" => Some(Self::Success),
            "error" | "danger" => Some(Self::Error),
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Bootstrap contextual class suffix.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "danger",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        };
        f.write_str(name)
    }
}

/// Handle to one shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

type Live<N> = RefCell<Vec<(NotificationId, N)>>;

/// Shows and dismisses notifications on one page.
pub struct NotificationCenter<D: Document, H: Host> {
    doc: Rc<D>,
    host: Rc<H>,
    default_duration: Duration,
    next_id: Cell<u64>,
    live: Rc<Live<D::Node>>,
}

impl<D: Document, H: Host> NotificationCenter<D, H> {
    pub fn new(doc: Rc<D>, host: Rc<H>, default_duration: Duration) -> Self {
        Self {
            doc,
            host,
            default_duration,
            next_id: Cell::new(1),
            live: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Show `message` as plain text. `duration` defaults to the center's
    /// lifetime.
    pub fn show(
        &self,
        severity: Severity,
        message: &str,
        duration: Option<Duration>,
    ) -> Result<NotificationId> {
        let doc = &*self.doc;
        let container = self.container()?;

        let id = NotificationId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let alert = create(doc, "div")?;
        doc.set_attr(
            &alert,
            "class",
            &format!(
                "alert alert-{} alert-dismissible fade show",
                severity.css_class()
            ),
        );
        doc.set_attr(&alert, "role", "alert");
        doc.set_attr(&alert, "data-notification-id", &id.0.to_string());

        let text = create(doc, "span")?;
        doc.set_attr(&text, "class", "alert-message");
        doc.set_text(&text, message);
        doc.append_child(&alert, &text);

        let close = create(doc, "button")?;
        doc.set_attr(&close, "type", "button");
        doc.set_attr(&close, "class", "btn-close");
        doc.set_attr(&close, "data-bs-dismiss", "alert");
        doc.set_attr(&close, "aria-label", "Close");
        doc.append_child(&alert, &close);

        doc.append_child(&container, &alert);
        self.live.borrow_mut().push((id, alert));

        let (weak_doc, weak_live) = (Rc::downgrade(&self.doc), Rc::downgrade(&self.live));
        doc.listen(
            &close,
            EventKind::Click,
            Rc::new(move || {
                dismiss_in(&weak_doc, &weak_live, id);
            }),
        );

        let (weak_doc, weak_live) = (Rc::downgrade(&self.doc), Rc::downgrade(&self.live));
        self.host.set_timeout(
            duration.unwrap_or(self.default_duration),
            Box::new(move || {
                dismiss_in(&weak_doc, &weak_live, id);
            }),
        );

        Ok(id)
    }

    /// Remove a notification. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        dismiss_in(&Rc::downgrade(&self.doc), &Rc::downgrade(&self.live), id)
    }

    /// Notifications currently on the page, oldest first.
    pub fn active(&self) -> Vec<NotificationId> {
        self.live.borrow().iter().map(|(id, _)| *id).collect()
    }

    fn container(&self) -> Result<D::Node> {
        let doc = &*self.doc;
        if let Some(existing) = doc.query(CONTAINER_SELECTOR) {
            return Ok(existing);
        }
        let body = doc
            .body()
            .ok_or_else(|| StorefrontError::MissingElement("body".to_string()))?;
        let container = create(doc, "div")?;
        doc.set_attr(&container, "class", CONTAINER_CLASS);
        doc.set_style(&container, "z-index", CONTAINER_Z_INDEX);
        doc.append_child(&body, &container);
        Ok(container)
    }
}

fn create<D: Document>(doc: &D, tag: &str) -> Result<D::Node> {
    doc.create_element(tag)
        .ok_or_else(|| StorefrontError::MissingElement(tag.to_string()))
}

fn dismiss_in<D: Document>(
    doc: &Weak<D>,
    live: &Weak<Live<D::Node>>,
    id: NotificationId,
) -> bool {
    let (Some(doc), Some(live)) = (doc.upgrade(), live.upgrade()) else {
        return false;
    };
    let node = {
        let mut live = live.borrow_mut();
        let Some(index) = live.iter().position(|(live_id, _)| *live_id == id) else {
            return false;
        };
        live.remove(index).1
    };
    doc.release_listeners(&node);
    if doc.is_connected(&node) {
        doc.remove(&node);
    }
    true
}
