use crate::constants::MAX_DEVICE_PIXEL_RATIO;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn element_by_id<T: JsCast>(document: &web::Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        Listener::new(&el, "click", None, move |_: web::Event| handler()).forget();
    }
}

/// Device pixel ratio, capped so large displays do not allocate huge surfaces.
pub fn device_pixel_ratio() -> f64 {
    web::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .min(MAX_DEVICE_PIXEL_RATIO)
}

/// Size the canvas backing store to `css_width` x `css_height` at the capped DPR.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, css_width: f64, css_height: f64) {
    let dpr = device_pixel_ratio();
    canvas.set_width(((css_width * dpr) as u32).max(1));
    canvas.set_height(((css_height * dpr) as u32).max(1));
}

#[inline]
pub fn set_style(el: &web::HtmlElement, property: &str, value: &str) {
    _ = el.style().set_property(property, value);
}

#[inline]
pub fn set_display(el: &web::HtmlElement, visible: bool) {
    set_style(el, "display", if visible { "block" } else { "none" });
}

#[inline]
pub fn set_class(el: &web::Element, class: &str, on: bool) {
    _ = el.class_list().toggle_with_force(class, on);
}

/// Boolean data attribute: present and not `"false"`.
pub fn data_flag(el: &web::Element, attr: &str) -> bool {
    el.get_attribute(attr)
        .map(|v| !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

/// Whether `target` sits inside an element matching `selector`.
pub fn is_inside(target: Option<web::EventTarget>, selector: &str) -> bool {
    target
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
        .is_some()
}

pub fn selected_text() -> String {
    web::window()
        .and_then(|w| w.get_selection().ok().flatten())
        .and_then(|s| s.to_string().as_string())
        .unwrap_or_default()
}

/// An event listener that is removed from its target when dropped.
pub struct Listener {
    target: web::EventTarget,
    event: &'static str,
    closure: Option<Closure<dyn FnMut(web::Event)>>,
}

impl Listener {
    /// Register `handler` for `event`. Events that are not an `E` are skipped.
    /// `passive` is only passed to the browser when set.
    pub fn new<E, F>(
        target: &web::EventTarget,
        event: &'static str,
        passive: Option<bool>,
        mut handler: F,
    ) -> Self
    where
        E: JsCast,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            if let Ok(ev) = ev.dyn_into::<E>() {
                handler(ev);
            }
        }) as Box<dyn FnMut(web::Event)>);
        let callback = closure.as_ref().unchecked_ref();
        match passive {
            Some(passive) => {
                let opts = web::AddEventListenerOptions::new();
                opts.set_passive(passive);
                _ = target.add_event_listener_with_callback_and_add_event_listener_options(
                    event, callback, &opts,
                );
            }
            None => {
                _ = target.add_event_listener_with_callback(event, callback);
            }
        }
        Self {
            target: target.clone(),
            event,
            closure: Some(closure),
        }
    }

    /// Keep the listener registered for the rest of the page's life.
    pub fn forget(mut self) {
        if let Some(closure) = self.closure.take() {
            closure.forget();
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(closure) = self.closure.take() {
            _ = self
                .target
                .remove_event_listener_with_callback(self.event, closure.as_ref().unchecked_ref());
        }
    }
}

#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Listener>,
}

impl ListenerSet {
    pub fn push(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Remove every listener in the set from its target.
    pub fn dispose(&mut self) {
        self.listeners.clear();
    }
}
