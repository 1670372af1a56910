use super::with_viewer;
use crate::dom::{Listener, ListenerSet};
use crate::viewer::Viewer;
use exhibit_core::{TouchPoint, TouchPoints};
use std::rc::Rc;
use web_sys as web;

fn touch_points(ev: &web::TouchEvent) -> TouchPoints {
    let list = ev.touches();
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(t.client_x() as f32, t.client_y() as f32))
        .collect()
}

pub fn wire(viewer: &Rc<Viewer>, listeners: &mut ListenerSet) {
    let canvas = viewer.canvas.clone();

    listeners.push(Listener::new(
        &canvas,
        "touchstart",
        Some(false),
        with_viewer(viewer, |v, ev: web::TouchEvent| {
            let points = touch_points(&ev);
            let consumed = v.state.borrow_mut().gestures.touch_start(&points);
            if consumed {
                ev.prevent_default();
            }
        }),
    ));

    listeners.push(Listener::new(
        &canvas,
        "touchmove",
        Some(false),
        with_viewer(viewer, |v, ev: web::TouchEvent| {
            let points = touch_points(&ev);
            let consumed = v.state.borrow_mut().gestures.touch_move(&points);
            if consumed {
                ev.prevent_default();
                v.refresh_slider();
            }
        }),
    ));

    listeners.push(Listener::new(
        &canvas,
        "touchend",
        None,
        with_viewer(viewer, |v, _: web::TouchEvent| {
            v.state.borrow_mut().gestures.touch_end();
        }),
    ));
}
