use super::with_viewer;
use crate::dom::{Listener, ListenerSet};
use crate::viewer::Viewer;
use std::rc::Rc;
use web_sys as web;

// Touch input is handled by the touch listeners; the pointer events the
// browser synthesises for it would rotate the model a second time.
#[inline]
fn is_touch(ev: &web::PointerEvent) -> bool {
    ev.pointer_type() == "touch"
}

pub fn wire(viewer: &Rc<Viewer>, listeners: &mut ListenerSet) {
    let canvas = viewer.canvas.clone();

    listeners.push(Listener::new(
        &canvas,
        "pointerdown",
        None,
        with_viewer(viewer, |v, ev: web::PointerEvent| {
            if is_touch(&ev) {
                return;
            }
            v.state.borrow_mut().gestures.pointer_down(
                ev.button(),
                ev.client_x() as f32,
                ev.client_y() as f32,
            );
            v.sync_cursor();
        }),
    ));

    listeners.push(Listener::new(
        &canvas,
        "pointermove",
        None,
        with_viewer(viewer, |v, ev: web::PointerEvent| {
            if is_touch(&ev) {
                return;
            }
            v.state
                .borrow_mut()
                .gestures
                .pointer_move(ev.client_x() as f32, ev.client_y() as f32);
        }),
    ));

    for event in ["pointerup", "pointerleave"] {
        listeners.push(Listener::new(
            &canvas,
            event,
            None,
            with_viewer(viewer, |v, _: web::PointerEvent| {
                v.state.borrow_mut().gestures.pointer_up();
                v.sync_cursor();
            }),
        ));
    }

    listeners.push(Listener::new(
        &canvas,
        "wheel",
        Some(false),
        with_viewer(viewer, |v, ev: web::WheelEvent| {
            ev.prevent_default();
            v.state.borrow_mut().gestures.wheel(ev.delta_y() as f32);
            v.refresh_slider();
        }),
    ));

    listeners.push(Listener::new(
        &canvas,
        "contextmenu",
        None,
        |ev: web::MouseEvent| ev.prevent_default(),
    ));
}
