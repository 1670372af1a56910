use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `ResizeObserver` on one element; disconnects when dropped.
pub struct ResizeWatch {
    observer: web::ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, web::ResizeObserver)>,
}

impl ResizeWatch {
    pub fn observe(target: &web::Element, mut on_resize: impl FnMut() + 'static) -> Option<Self> {
        let callback = Closure::wrap(Box::new(move |_: js_sys::Array, _: web::ResizeObserver| {
            on_resize();
        }) as Box<dyn FnMut(js_sys::Array, web::ResizeObserver)>);
        let observer = match web::ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("ResizeObserver unavailable: {:?}", e);
                return None;
            }
        };
        observer.observe(target);
        Some(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
