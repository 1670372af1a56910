use crate::dom::ListenerSet;
use crate::viewer::Viewer;
use std::rc::Rc;

mod pointer;
mod touch;

/// Attach every input listener of a viewer's canvas.
pub fn wire_viewer(viewer: &Rc<Viewer>) -> ListenerSet {
    let mut listeners = ListenerSet::default();
    pointer::wire(viewer, &mut listeners);
    touch::wire(viewer, &mut listeners);
    listeners
}

/// Adapt a handler to run only while the viewer is alive.
fn with_viewer<E>(viewer: &Rc<Viewer>, handler: impl Fn(&Viewer, E) + 'static) -> impl FnMut(E) + 'static {
    let weak = Rc::downgrade(viewer);
    move |ev| {
        if let Some(v) = weak.upgrade() {
            handler(&v, ev);
        }
    }
}
