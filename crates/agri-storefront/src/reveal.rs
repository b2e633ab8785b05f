//! Viewport-driven entrance animations and lazy images.

use std::rc::{Rc, Weak};

use crate::config::RevealConfig;
use crate::dom::{Document, ViewportOptions};

/// Add the marker class to each element matching the reveal selector as it
/// scrolls into view. Elements stay observed; re-entry re-adds the class.
///
/// Returns `false` when the host cannot observe the viewport.
pub fn watch_entrances<D: Document>(doc: &Rc<D>, config: &RevealConfig) -> bool {
    let targets = doc.query_all(&config.selector);
    let marker = config.marker_class.clone();
    let weak: Weak<D> = Rc::downgrade(doc);
    doc.observe_viewport(
        targets,
        &config.viewport(),
        Rc::new(move |node: &D::Node| {
            if let Some(doc) = weak.upgrade() {
                doc.add_class(node, &marker);
            }
            false
        }),
    )
}

/// Load `img[data-src]` images once they are visible: copy `data-src` to
/// `src`, drop the `lazy` class and stop observing.
pub fn watch_lazy_images<D: Document>(doc: &Rc<D>) -> bool {
    let images = doc.query_all("img[data-src]");
    let weak: Weak<D> = Rc::downgrade(doc);
    doc.observe_viewport(
        images,
        &ViewportOptions::default(),
        Rc::new(move |img: &D::Node| {
            let Some(doc) = weak.upgrade() else {
                return true;
            };
            if let Some(src) = doc.data(img, "src") {
                doc.set_attr(img, "src", &src);
            }
            doc.remove_class(img, "lazy");
            true
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    const PAGE: &str = r#"
        <section class="fade-in" id="hero"></section>
        <div class="slide-up" id="features"></div>
        <div class="card" id="plain"></div>
        <img class="lazy" id="photo" data-src="/static/tomato.jpg">
    "#;

    // === Entrances ===

    #[test]
    fn test_entrance_marks_on_intersection() {
        let doc = Rc::new(MemoryDocument::parse(PAGE));
        assert!(watch_entrances(&doc, &RevealConfig::default()));

        let hero = doc.by_id("hero").unwrap();
        let features = doc.by_id("features").unwrap();
        let plain = doc.by_id("plain").unwrap();
        assert!(doc.is_observed(&hero));
        assert!(!doc.is_observed(&plain));

        doc.intersect(&hero);
        assert!(doc.has_class(&hero, "animate"));
        assert!(!doc.has_class(&features, "animate"));
        // Still observed after the first reveal.
        assert!(doc.is_observed(&hero));

        let options = doc.observer_options();
        assert_eq!(options[0].threshold, 0.1);
        assert_eq!(options[0].root_margin, "0px 0px -50px 0px");
    }

    #[test]
    fn test_entrance_without_observer() {
        let doc = Rc::new(MemoryDocument::parse(PAGE).without_intersection_observer());
        assert!(!watch_entrances(&doc, &RevealConfig::default()));
        assert!(!doc.is_observed(&doc.by_id("hero").unwrap()));
    }

    #[test]
    fn test_custom_marker() {
        let doc = Rc::new(MemoryDocument::parse(PAGE));
        let config = RevealConfig {
            marker_class: "visible".into(),
            ..RevealConfig::default()
        };
        watch_entrances(&doc, &config);

        let features = doc.by_id("features").unwrap();
        doc.intersect(&features);
        assert!(doc.has_class(&features, "visible"));
    }

    // === Lazy images ===

    #[test]
    fn test_lazy_image_loads_once() {
        let doc = Rc::new(MemoryDocument::parse(PAGE));
        assert!(watch_lazy_images(&doc));

        let photo = doc.by_id("photo").unwrap();
        assert_eq!(doc.attr(&photo, "src"), None);

        assert_eq!(doc.intersect(&photo), 1);
        assert_eq!(doc.attr(&photo, "src").as_deref(), Some("/static/tomato.jpg"));
        assert!(!doc.has_class(&photo, "lazy"));
        assert!(!doc.is_observed(&photo));
        assert_eq!(doc.intersect(&photo), 0);
    }
}
