//! One interactive viewer per carousel slide, kept for the page session.

use crate::constants::{
    CANVAS_ID_PREFIX, CONTAINER_ID_PREFIX, MODEL_PATH_ATTR, RECENTER_ON_ZOOM_OUT_ATTR,
    TWO_FINGER_PAN_ATTR,
};
use crate::dom::{self, ListenerSet};
use crate::events;
use crate::frame;
use crate::loader;
use crate::overlay::LoadingOverlay;
use crate::render::GpuState;
use crate::resize::ResizeWatch;
use crate::slider::PanSlider;
use exhibit_core::config::is_touch_primary;
use exhibit_core::model::ModelMesh;
use exhibit_core::{
    camera_framing, fit_model, Bounds, CameraFraming, GestureState, GestureTuning,
    ModelPlacement, ViewerRegistry,
};
use instant::Instant;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

thread_local! {
    static VIEWERS: RefCell<ViewerRegistry<Rc<Viewer>>> = RefCell::new(ViewerRegistry::new());
}

/// Create the viewer for slide `index` unless it already exists.
///
/// Returns `false` when the slide has no canvas, container or model path.
#[wasm_bindgen]
pub fn init_model_viewer(index: usize) -> bool {
    let mut created = None;
    let viewer = VIEWERS.with(|viewers| {
        viewers.borrow_mut().get_or_try_insert_with(index, || {
            let v = Viewer::build(index)?;
            created = Some(v.clone());
            Some(v)
        })
    });
    if let Some(v) = created {
        v.start();
    }
    viewer.is_some()
}

#[wasm_bindgen]
pub fn reset_viewer_view(index: usize) {
    if let Some(v) = get_viewer(index) {
        v.reset();
    }
}

#[wasm_bindgen]
pub fn has_viewer(index: usize) -> bool {
    VIEWERS.with(|viewers| viewers.borrow().contains(index))
}

/// Detach the input listeners and resize observer of viewer `index`.
/// Rendering continues.
#[wasm_bindgen]
pub fn dispose_viewer_controls(index: usize) {
    if let Some(v) = get_viewer(index) {
        v.dispose_controls();
    }
}

pub fn get_viewer(index: usize) -> Option<Rc<Viewer>> {
    VIEWERS.with(|viewers| viewers.borrow().get(index))
}

pub struct LoadedModel {
    /// Bounds of the untransformed model; every refit starts from these.
    pub bounds: Bounds,
    pub placement: ModelPlacement,
}

pub struct ViewerState {
    pub gestures: GestureState,
    pub framing: CameraFraming,
    pub container_width: f32,
    pub model: Option<LoadedModel>,
    pub gpu: Option<GpuState>,
    pub last_frame: Instant,
}

pub struct Viewer {
    pub index: usize,
    pub canvas: web::HtmlCanvasElement,
    pub container: web::HtmlElement,
    pub state: RefCell<ViewerState>,
    model_path: String,
    touch_primary: bool,
    listeners: RefCell<ListenerSet>,
    slider: RefCell<Option<PanSlider>>,
    resize: RefCell<Option<ResizeWatch>>,
    weak_self: Weak<Viewer>,
}

impl Viewer {
    fn build(index: usize) -> Option<Rc<Self>> {
        let window = web::window()?;
        let document = window.document()?;
        let canvas: web::HtmlCanvasElement =
            dom::element_by_id(&document, &format!("{CANVAS_ID_PREFIX}{index}"))?;
        let container: web::HtmlElement =
            dom::element_by_id(&document, &format!("{CONTAINER_ID_PREFIX}{index}"))?;
        let model_path = container
            .get_attribute(MODEL_PATH_ATTR)
            .filter(|p| !p.trim().is_empty())?;

        let tuning = GestureTuning {
            two_finger_pan: dom::data_flag(&container, TWO_FINGER_PAN_ATTR),
            recenter_pan_on_zoom_out: dom::data_flag(&container, RECENTER_ON_ZOOM_OUT_ATTR),
            ..GestureTuning::default()
        };
        let user_agent = window.navigator().user_agent().unwrap_or_default();
        let has_touch = js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart"))
            .unwrap_or(false);

        let width = container.offset_width() as f32;
        let height = container.offset_height() as f32;
        log::info!("[viewer {index}] init {model_path} ({width}x{height})");

        Some(Rc::new_cyclic(|weak_self| Self {
            index,
            canvas,
            container,
            state: RefCell::new(ViewerState {
                gestures: GestureState::new(tuning),
                framing: camera_framing(width, height),
                container_width: width,
                model: None,
                gpu: None,
                last_frame: Instant::now(),
            }),
            model_path,
            touch_primary: is_touch_primary(&user_agent, has_touch),
            listeners: RefCell::new(ListenerSet::default()),
            slider: RefCell::new(None),
            resize: RefCell::new(None),
            weak_self: weak_self.clone(),
        }))
    }

    fn start(self: &Rc<Self>) {
        self.relayout();
        self.sync_cursor();
        *self.listeners.borrow_mut() = events::wire_viewer(self);

        let weak = self.weak_self.clone();
        *self.resize.borrow_mut() = ResizeWatch::observe(&self.container, move || {
            if let Some(v) = weak.upgrade() {
                v.relayout();
            }
        });

        let overlay = dom::window_document()
            .and_then(|doc| LoadingOverlay::attach(&doc, &self.container));
        spawn_local(boot(self.clone(), overlay));
        frame::start_loop(self.clone());
    }

    /// Re-derive framing, surface size and model fit from the container size.
    pub fn relayout(&self) {
        let width = self.container.offset_width() as f32;
        let height = self.container.offset_height() as f32;
        dom::set_style(&self.canvas, "width", &format!("{width}px"));
        dom::set_style(&self.canvas, "height", &format!("{height}px"));
        dom::sync_canvas_backing_size(&self.canvas, width as f64, height as f64);

        let mut st = self.state.borrow_mut();
        st.framing = camera_framing(width, height);
        st.container_width = width;
        if let Some(model) = st.model.as_mut() {
            model.placement = fit_model(&model.bounds, width);
        }
    }

    pub fn reset(&self) {
        self.state.borrow_mut().gestures.reset();
        self.refresh_slider();
        self.sync_cursor();
    }

    /// Remove input listeners and stop observing container resizes.
    pub fn dispose_controls(&self) {
        let mut listeners = self.listeners.borrow_mut();
        log::debug!("[viewer {}] removing {} listeners", self.index, listeners.len());
        listeners.dispose();
        // dropping the watch disconnects the observer
        self.resize.borrow_mut().take();
    }

    pub fn sync_cursor(&self) {
        let cursor = self.state.borrow().gestures.cursor();
        dom::set_style(&self.canvas, "cursor", cursor);
    }

    /// Show, hide and position the pan slider for the current zoom and pan.
    pub fn refresh_slider(&self) {
        if !self.touch_primary {
            return;
        }
        let (visible, thumb) = {
            let st = self.state.borrow();
            (
                st.gestures.slider_visible(true),
                st.gestures.slider_thumb(),
            )
        };
        let mut slider = self.slider.borrow_mut();
        if slider.is_none() && visible {
            let weak = self.weak_self.clone();
            *slider = dom::window_document().and_then(|doc| {
                PanSlider::create(&doc, &self.container, move |fraction| {
                    if let Some(v) = weak.upgrade() {
                        v.state.borrow_mut().gestures.slider_seek(fraction);
                    }
                })
            });
        }
        if let Some(s) = slider.as_ref() {
            s.update(visible, thumb);
        }
    }

    fn install_model(&self, mesh: &ModelMesh) {
        let mut st = self.state.borrow_mut();
        let placement = fit_model(&mesh.bounds, st.container_width);
        log::info!(
            "[viewer {}] model loaded: {} scale={:.3} height={:.3}",
            self.index,
            self.model_path,
            placement.scale,
            mesh.bounds.size().y * placement.scale
        );
        if let Some(gpu) = st.gpu.as_mut() {
            gpu.upload_model(mesh);
        }
        st.model = Some(LoadedModel {
            bounds: mesh.bounds,
            placement,
        });
    }
}

async fn boot(viewer: Rc<Viewer>, overlay: Option<LoadingOverlay>) {
    match GpuState::new(&viewer.canvas).await {
        Ok(gpu) => viewer.state.borrow_mut().gpu = Some(gpu),
        Err(e) => {
            log::error!("[viewer {}] WebGPU init error: {:?}", viewer.index, e);
            if let Some(o) = &overlay {
                o.show_error();
            }
            return;
        }
    }

    let result = loader::load_model(&viewer.model_path, |pct| {
        if let Some(o) = &overlay {
            o.set_progress(pct);
        }
    })
    .await;
    match result {
        Ok(mesh) => {
            if let Some(o) = &overlay {
                o.remove();
            }
            viewer.install_model(&mesh);
        }
        Err(e) => {
            log::error!("[viewer {}] error loading {}: {:?}", viewer.index, viewer.model_path, e);
            if let Some(o) = &overlay {
                o.show_error();
            }
        }
    }
}
