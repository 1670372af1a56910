//! Horizontal swipe carousel around the viewer slides.

use crate::constants::{SLIDING_CLASS_MS, VIEWER_CLASS};
use crate::dom::{self, Listener};
use exhibit_core::carousel::{drag_transform, slide_transform, SlideTrack};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const SETTLE_TRANSITION: &str = "transform 0.3s ease-out";

struct Carousel {
    track: RefCell<SlideTrack>,
    container: web::HtmlElement,
    wrapper: web::HtmlElement,
    app: Option<web::Element>,
    dots: Vec<web::Element>,
    on_change: Box<dyn Fn(usize)>,
}

impl Carousel {
    fn set_sliding(&self, on: bool) {
        if let Some(app) = &self.app {
            dom::set_class(app, "sliding", on);
        }
    }

    fn width(&self) -> f64 {
        self.container.offset_width() as f64
    }

    /// Settle on `index` and tell the page which slide is now visible.
    fn show(self: &Rc<Self>, index: usize) {
        let index = self.track.borrow_mut().go_to(index);
        self.set_sliding(true);
        dom::set_style(&self.wrapper, "transform", &slide_transform(index));

        let this = self.clone();
        let done = Closure::once_into_js(move || this.set_sliding(false));
        if let Some(w) = web::window() {
            _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(
                done.unchecked_ref(),
                SLIDING_CLASS_MS,
            );
        }

        for (i, dot) in self.dots.iter().enumerate() {
            dom::set_class(dot, "active", i == index);
        }
        (self.on_change)(index);
    }

    fn begin(&self, x: f64) {
        self.track.borrow_mut().begin_drag(x);
        dom::set_style(&self.wrapper, "transition", "none");
    }

    fn follow(&self, x: f64) {
        let offset = self.track.borrow_mut().drag_to(x, self.width());
        if let Some(offset) = offset {
            dom::set_style(&self.wrapper, "transform", &drag_transform(offset));
        }
    }

    fn release(self: &Rc<Self>) {
        let target = self.track.borrow_mut().release(self.width());
        if let Some(index) = target {
            dom::set_style(&self.wrapper, "transition", SETTLE_TRANSITION);
            self.show(index);
        }
    }

    fn snap_back(self: &Rc<Self>) {
        let current = self.track.borrow_mut().cancel();
        if let Some(index) = current {
            dom::set_style(&self.wrapper, "transition", SETTLE_TRANSITION);
            self.show(index);
        }
    }
}

fn list_elements(document: &web::Document, selector: &str) -> Vec<web::Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into::<web::Element>().ok())
        .collect()
}

/// Wire the carousel if the page has one. `on_change` runs for every settle,
/// including the initial one on slide 0.
pub fn init(document: &web::Document, on_change: impl Fn(usize) + 'static) -> bool {
    let Some(container) = dom::element_by_id::<web::HtmlElement>(document, "swipe-container") else {
        return false;
    };
    let Some(wrapper) = dom::element_by_id::<web::HtmlElement>(document, "slides-wrapper") else {
        return false;
    };
    let slides = list_elements(document, ".slide");
    let carousel = Rc::new(Carousel {
        track: RefCell::new(SlideTrack::new(slides.len())),
        container: container.clone(),
        wrapper,
        app: document.query_selector(".app-container").ok().flatten(),
        dots: list_elements(document, ".dot"),
        on_change: Box::new(on_change),
    });
    let viewer_selector = format!(".{VIEWER_CLASS}");

    {
        let c = carousel.clone();
        let sel = viewer_selector.clone();
        Listener::new(&container, "touchstart", Some(true), move |ev: web::TouchEvent| {
            if dom::is_inside(ev.target(), &sel) {
                return;
            }
            if let Some(t) = ev.touches().get(0) {
                c.begin(t.client_x() as f64);
            }
        })
        .forget();
    }
    {
        let c = carousel.clone();
        let sel = viewer_selector.clone();
        Listener::new(&container, "touchmove", Some(true), move |ev: web::TouchEvent| {
            if !c.track.borrow().is_dragging() || dom::is_inside(ev.target(), &sel) {
                return;
            }
            if let Some(t) = ev.touches().get(0) {
                c.follow(t.client_x() as f64);
            }
        })
        .forget();
    }
    {
        let c = carousel.clone();
        Listener::new(&container, "touchend", None, move |_: web::TouchEvent| c.release()).forget();
    }
    {
        let c = carousel.clone();
        let sel = viewer_selector;
        Listener::new(&container, "mousedown", None, move |ev: web::MouseEvent| {
            if dom::is_inside(ev.target(), &sel) {
                return;
            }
            c.begin(ev.client_x() as f64);
            c.set_sliding(true);
        })
        .forget();
    }
    {
        let c = carousel.clone();
        Listener::new(&container, "mousemove", None, move |ev: web::MouseEvent| {
            if !c.track.borrow().is_dragging() {
                return;
            }
            // selecting text is not a swipe
            if !dom::selected_text().is_empty() {
                c.snap_back();
                return;
            }
            c.follow(ev.client_x() as f64);
        })
        .forget();
    }
    {
        let c = carousel.clone();
        Listener::new(&container, "mouseup", None, move |_: web::MouseEvent| {
            if !dom::selected_text().is_empty() {
                c.track.borrow_mut().cancel();
                return;
            }
            c.release();
        })
        .forget();
    }
    {
        let c = carousel.clone();
        Listener::new(&container, "mouseleave", None, move |_: web::MouseEvent| c.snap_back())
            .forget();
    }
    for (i, dot) in carousel.dots.iter().enumerate() {
        let c = carousel.clone();
        Listener::new(dot, "click", None, move |_: web::MouseEvent| c.show(i)).forget();
    }

    log::info!("[carousel] {} slides", carousel.track.borrow().count());
    carousel.show(0);
    true
}
