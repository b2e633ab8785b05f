//! The page controller.

use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use agri_data::FetchClient;
use agri_observability::StructuredLogger;

use crate::config::StorefrontConfig;
use crate::csrf::CsrfToken;
use crate::dispatcher::Dispatcher;
use crate::dom::{Document, EventKind, Host};
use crate::error::DispatchError;
use crate::notify::{NotificationCenter, NotificationId, Severity};
use crate::reveal;
use crate::session::{CartCount, CartSession, BADGE_ID};

/// Everything one page load needs: the page, its window, the backend and
/// the cart badge state.
///
/// Held in an `Rc`; event listeners keep only weak references to it, so
/// the embedder owns its lifetime.
pub struct Storefront<D: Document, H: Host> {
    pub(crate) doc: Rc<D>,
    pub(crate) host: Rc<H>,
    pub(crate) config: StorefrontConfig,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) session: CartSession,
    pub(crate) notices: NotificationCenter<D, H>,
    pub(crate) logger: StructuredLogger,
}

impl<D: Document, H: Host> fmt::Debug for Storefront<D, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.config)
            .field("cart_count", &self.session.count())
            .finish_non_exhaustive()
    }
}

impl<D: Document, H: Host> Storefront<D, H> {
    pub fn new(
        doc: Rc<D>,
        host: Rc<H>,
        client: FetchClient,
        config: StorefrontConfig,
        logger: StructuredLogger,
    ) -> Rc<Self> {
        let client = match &config.base_url {
            Some(base) => client.with_base_url(base.clone()),
            None => client,
        };
        let dispatcher = Dispatcher::new(client, config.endpoints.clone(), logger.clone());
        let notices =
            NotificationCenter::new(doc.clone(), host.clone(), config.timing.notification());

        Rc::new(Self {
            doc,
            host,
            config,
            dispatcher,
            session: CartSession::new(),
            notices,
            logger,
        })
    }

    /// Seed the cart badge, bind every handler and start the viewport
    /// watchers. Call once per page load.
    pub fn start(self: &Rc<Self>) {
        if self.doc.by_id(BADGE_ID).is_some() {
            self.refresh_cart_badge();
        }

        let bound = self.bind_handlers();

        let reveal = &self.config.reveal;
        let animating = reveal::watch_entrances(&self.doc, reveal);
        let lazy = reveal.lazy_images && reveal::watch_lazy_images(&self.doc);

        self.logger
            .info_builder("Storefront started")
            .field_i64("handlers", bound as i64)
            .field_bool("entrance_animations", animating)
            .field_bool("lazy_images", lazy)
            .emit();
    }

    // === Page-script surface ===

    /// Show a notification. Unknown `kind`s are shown as info.
    pub fn show_alert(
        &self,
        kind: &str,
        message: &str,
        duration: Option<Duration>,
    ) -> Option<NotificationId> {
        let severity = Severity::parse(kind).unwrap_or(Severity::Info);
        self.show(severity, message, duration)
    }

    /// With a count, store and show it. Without one, ask the server.
    /// Pages without a badge are left alone.
    pub fn update_cart_badge(self: &Rc<Self>, count: Option<u32>) {
        if self.doc.by_id(BADGE_ID).is_none() {
            return;
        }
        match count {
            Some(count) => {
                self.session.apply(CartCount::new(count));
                self.session.render(&*self.doc);
            }
            None => self.refresh_cart_badge(),
        }
    }

    pub fn csrf_token(&self) -> CsrfToken {
        CsrfToken::read(&*self.doc)
    }

    pub fn cart_count(&self) -> Option<CartCount> {
        self.session.count()
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn notifications(&self) -> &NotificationCenter<D, H> {
        &self.notices
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    // === Shared helpers ===

    pub(crate) fn refresh_cart_badge(self: &Rc<Self>) {
        let this = Rc::clone(self);
        self.spawn(async move {
            // Failures are logged by the dispatcher; the badge stays as it was.
            if this.session.refresh(&this.dispatcher).await.is_ok() {
                this.session.render(&*this.doc);
            }
        });
    }

    pub(crate) fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        self.host.spawn(Box::pin(task));
    }

    pub(crate) fn after(&self, delay: Duration, callback: impl FnOnce() + 'static) {
        self.host.set_timeout(delay, Box::new(callback));
    }

    pub(crate) fn notify(&self, severity: Severity, message: &str) -> Option<NotificationId> {
        self.show(severity, message, None)
    }

    /// Error notification for a failed command.
    pub(crate) fn report(&self, error: &DispatchError, fallback: &str) {
        self.notify(Severity::Error, error.user_message(fallback));
    }

    /// A required `data-*` attribute was missing on a control.
    pub(crate) fn missing_data(&self, control: &D::Node, key: &str, fallback: &str) {
        self.logger
            .warn_builder("Control is missing data attribute")
            .field("attribute", format!("data-{key}"))
            .field("node", format!("{control:?}"))
            .emit();
        self.notify(Severity::Error, fallback);
    }

    fn show(
        &self,
        severity: Severity,
        message: &str,
        duration: Option<Duration>,
    ) -> Option<NotificationId> {
        match self.notices.show(severity, message, duration) {
            Ok(id) => Some(id),
            Err(error) => {
                self.logger
                    .error_builder("Failed to show notification")
                    .display("error", &error)
                    .field("message", message)
                    .emit();
                None
            }
        }
    }

    // === Binding ===

    /// Run `handler` whenever `node` fires `kind`.
    pub(crate) fn bind(
        self: &Rc<Self>,
        node: &D::Node,
        kind: EventKind,
        handler: impl Fn(&Rc<Self>) + 'static,
    ) {
        let this = Rc::downgrade(self);
        self.doc.listen(
            node,
            kind,
            Rc::new(move || {
                if let Some(this) = this.upgrade() {
                    handler(&this);
                }
            }),
        );
    }

    /// Bind `handler` on every element matching `selector`, passing the
    /// element it fired on. Returns how many were bound.
    pub(crate) fn bind_each(
        self: &Rc<Self>,
        selector: &str,
        kind: EventKind,
        handler: fn(&Rc<Self>, &D::Node),
    ) -> usize {
        let nodes = self.doc.query_all(selector);
        for node in &nodes {
            let target = node.clone();
            self.bind(node, kind, move |this| handler(this, &target));
        }
        nodes.len()
    }
}
