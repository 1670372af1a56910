use crate::constants::{SLIDER_CLASS, SLIDER_THUMB_CLASS, SLIDER_TRACK_CLASS};
use crate::dom::{self, Listener, ListenerSet};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Vertical pan slider shown on touch devices while zoomed in.
pub struct PanSlider {
    root: web::HtmlElement,
    thumb: web::HtmlElement,
    _listeners: ListenerSet,
}

impl PanSlider {
    /// Build the slider inside `container`. `on_seek` receives the touch
    /// position along the track, `0.0` at the top.
    pub fn create(
        document: &web::Document,
        container: &web::Element,
        on_seek: impl Fn(f32) + 'static,
    ) -> Option<Self> {
        let root: web::HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
        root.set_class_name(SLIDER_CLASS);
        root.set_inner_html(&format!(
            r#"<div class="{SLIDER_TRACK_CLASS}"><div class="{SLIDER_THUMB_CLASS}"></div></div>"#
        ));
        container.append_child(&root).ok()?;
        let track: web::HtmlElement = root
            .query_selector(&format!(".{SLIDER_TRACK_CLASS}"))
            .ok()??
            .dyn_into()
            .ok()?;
        let thumb: web::HtmlElement = root
            .query_selector(&format!(".{SLIDER_THUMB_CLASS}"))
            .ok()??
            .dyn_into()
            .ok()?;

        let on_seek = Rc::new(on_seek);
        let dragging = Rc::new(Cell::new(false));
        let mut listeners = ListenerSet::default();

        let seek = {
            let track = track.clone();
            let on_seek = on_seek.clone();
            move |ev: &web::TouchEvent| {
                if let Some(touch) = ev.touches().get(0) {
                    let rect = track.get_bounding_client_rect();
                    if rect.height() > 0.0 {
                        let y = (touch.client_y() as f64 - rect.top()) / rect.height();
                        on_seek(y.clamp(0.0, 1.0) as f32);
                    }
                }
            }
        };

        {
            let dragging = dragging.clone();
            let seek = seek.clone();
            listeners.push(Listener::new(
                &track,
                "touchstart",
                Some(false),
                move |ev: web::TouchEvent| {
                    ev.stop_propagation();
                    dragging.set(true);
                    seek(&ev);
                },
            ));
        }
        {
            let dragging = dragging.clone();
            listeners.push(Listener::new(
                &track,
                "touchmove",
                Some(false),
                move |ev: web::TouchEvent| {
                    if !dragging.get() {
                        return;
                    }
                    ev.prevent_default();
                    ev.stop_propagation();
                    seek(&ev);
                },
            ));
        }
        listeners.push(Listener::new(
            &track,
            "touchend",
            None,
            move |_: web::TouchEvent| dragging.set(false),
        ));

        Some(Self {
            root,
            thumb,
            _listeners: listeners,
        })
    }

    pub fn update(&self, visible: bool, thumb_position: f32) {
        dom::set_style(&self.root, "opacity", if visible { "1" } else { "0" });
        dom::set_style(&self.root, "pointer-events", if visible { "auto" } else { "none" });
        dom::set_style(&self.thumb, "top", &format!("{}%", thumb_position * 100.0));
    }
}
