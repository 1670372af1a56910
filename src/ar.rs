//! AR page: wall placement component for the A-Frame scene and the
//! WebXR start screen.

use crate::dom::{self, Listener};
use anyhow::anyhow;
use exhibit_core::placement::{PlacementState, Pose, WallPlacement};
use glam::{Quat, Vec3};
use instant::Instant;
use js_sys::{Array, Function, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub const COMPONENT_NAME: &str = "ar-wall-spawner";

const READY_COLOR: &str = "#28a745";
const SCANNING_COLOR: &str = "yellow";

thread_local! {
    static HUD: RefCell<Option<Rc<PlacementHud>>> = const { RefCell::new(None) };
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
}

fn get_f32(target: &JsValue, key: &str) -> Result<f32, JsValue> {
    Ok(get(target, key)?.as_f64().unwrap_or(0.0) as f32)
}

fn method(target: &JsValue, name: &str) -> Result<Function, JsValue> {
    get(target, name)?.dyn_into::<Function>()
}

/// Position and orientation of an A-Frame entity's `object3D`.
fn read_pose(entity: &web::Element) -> Result<Pose, JsValue> {
    let object3d = get(entity, "object3D")?;
    let p = get(&object3d, "position")?;
    let q = get(&object3d, "quaternion")?;
    Ok(Pose {
        position: Vec3::new(get_f32(&p, "x")?, get_f32(&p, "y")?, get_f32(&p, "z")?),
        orientation: Quat::from_xyzw(
            get_f32(&q, "x")?,
            get_f32(&q, "y")?,
            get_f32(&q, "z")?,
            get_f32(&q, "w")?,
        ),
    })
}

fn write_pose(entity: &web::Element, pose: &Pose) -> Result<(), JsValue> {
    let object3d = get(entity, "object3D")?;
    let p = get(&object3d, "position")?;
    method(&p, "set")?.call3(
        &p,
        &pose.position.x.into(),
        &pose.position.y.into(),
        &pose.position.z.into(),
    )?;
    let q = get(&object3d, "quaternion")?;
    let o = pose.orientation;
    let args = Array::of4(&o.x.into(), &o.y.into(), &o.z.into(), &o.w.into());
    method(&q, "set")?.apply(&q, &args)?;
    Ok(())
}

/// Elements driven by the placement component plus its state machine.
struct PlacementHud {
    tracker: web::Element,
    model: web::Element,
    place_btn: web::HtmlButtonElement,
    reticle: web::HtmlElement,
    placement: RefCell<WallPlacement>,
}

impl PlacementHud {
    fn find(document: &web::Document) -> Option<Self> {
        Some(Self {
            tracker: document.get_element_by_id("ghost-tracker")?,
            model: document.get_element_by_id("placed-model")?,
            place_btn: dom::element_by_id(document, "place-btn")?,
            reticle: dom::element_by_id(document, "aiming-reticle")?,
            placement: RefCell::new(WallPlacement::default()),
        })
    }

    fn poll(&self) {
        let position = match read_pose(&self.tracker) {
            Ok(pose) => pose.position,
            Err(e) => {
                log::warn!("[ar] tracker unreadable: {:?}", e);
                return;
            }
        };
        let changed = self.placement.borrow_mut().poll(Instant::now(), position);
        if let Some(state) = changed {
            self.show_state(state);
        }
    }

    fn show_state(&self, state: PlacementState) {
        let btn = &self.place_btn;
        match state {
            PlacementState::Ready => {
                btn.set_text_content(Some("Place Object"));
                dom::set_style(btn, "background", READY_COLOR);
                dom::set_style(btn, "color", "white");
                dom::set_style(btn, "border-color", READY_COLOR);
                dom::set_style(btn, "opacity", "1");
                btn.set_disabled(false);
                dom::set_style(&self.reticle, "border-color", READY_COLOR);
            }
            PlacementState::Scanning => {
                btn.set_text_content(Some("Scanning wall..."));
                dom::set_style(btn, "background", "rgba(50, 50, 50, 0.8)");
                dom::set_style(btn, "color", "#aaa");
                dom::set_style(btn, "border-color", SCANNING_COLOR);
                btn.set_disabled(true);
                dom::set_style(&self.reticle, "border-color", SCANNING_COLOR);
            }
            PlacementState::Placed => {
                dom::set_display(btn, false);
                dom::set_display(&self.reticle, false);
            }
        }
    }

    fn place(&self) {
        let tracker = match read_pose(&self.tracker) {
            Ok(pose) => pose,
            Err(e) => {
                log::warn!("[ar] tracker unreadable: {:?}", e);
                return;
            }
        };
        let Some(pose) = self.placement.borrow_mut().confirm(tracker) else {
            return;
        };
        if let Err(e) = write_pose(&self.model, &pose) {
            log::error!("[ar] could not move model: {:?}", e);
            return;
        }
        _ = self.model.set_attribute("visible", "true");
        self.show_state(PlacementState::Placed);
        log::info!("[ar] placed at {:?}", pose.position);
    }
}

fn component_init() {
    let Some(document) = dom::window_document() else {
        return;
    };
    let Some(hud) = PlacementHud::find(&document) else {
        log::error!("[ar] placement markup incomplete");
        return;
    };
    let hud = Rc::new(hud);
    {
        let btn = hud.place_btn.clone();
        let hud = hud.clone();
        Listener::new(&btn, "click", None, move |_: web::MouseEvent| {
            hud.place();
        })
        .forget();
    }
    HUD.with(|h| *h.borrow_mut() = Some(hud));
}

fn component_tick() {
    let hud = HUD.with(|h| h.borrow().clone());
    if let Some(hud) = hud {
        hud.poll();
    }
}

/// Register the wall placement component with A-Frame. Must run before the
/// scene initialises its entities.
pub fn register_component() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let aframe = get(&window, "AFRAME").map_err(|e| anyhow!("{:?}", e))?;
    if aframe.is_undefined() {
        log::debug!("[ar] A-Frame not loaded, skipping {COMPONENT_NAME}");
        return Ok(());
    }

    let definition = Object::new();
    let init = Closure::wrap(Box::new(component_init) as Box<dyn FnMut()>).into_js_value();
    let tick = Closure::wrap(Box::new(component_tick) as Box<dyn FnMut()>).into_js_value();
    Reflect::set(&definition, &"init".into(), &init).map_err(|e| anyhow!("{:?}", e))?;
    Reflect::set(&definition, &"tick".into(), &tick).map_err(|e| anyhow!("{:?}", e))?;

    method(&aframe, "registerComponent")
        .and_then(|register| register.call2(&aframe, &COMPONENT_NAME.into(), &definition))
        .map_err(|e| anyhow!("{:?}", e))?;
    log::info!("[ar] registered {COMPONENT_NAME}");
    Ok(())
}

fn disable_start(
    start_btn: &web::HtmlButtonElement,
    error_msg: Option<&web::HtmlElement>,
    label: &str,
    message: &str,
) {
    start_btn.set_disabled(true);
    start_btn.set_inner_text(label);
    if let Some(el) = error_msg {
        dom::set_display(el, true);
        el.set_inner_text(message);
    }
}

async fn check_xr_support(
    navigator: web::Navigator,
    start_btn: web::HtmlButtonElement,
    error_msg: Option<web::HtmlElement>,
) {
    let xr = get(&navigator, "xr").unwrap_or(JsValue::UNDEFINED);
    if xr.is_undefined() || xr.is_null() {
        disable_start(
            &start_btn,
            error_msg.as_ref(),
            "No WebXR",
            "WebXR API not found. Please use Chrome on Android.",
        );
        return;
    }
    let supported = match method(&xr, "isSessionSupported")
        .and_then(|f| f.call1(&xr, &"immersive-ar".into()))
        .and_then(|p| p.dyn_into::<js_sys::Promise>())
    {
        Ok(promise) => JsFuture::from(promise).await.map(|v| v.is_truthy()).unwrap_or(false),
        Err(e) => {
            log::warn!("[ar] isSessionSupported failed: {:?}", e);
            false
        }
    };
    if !supported {
        disable_start(
            &start_btn,
            error_msg.as_ref(),
            "AR Not Supported",
            "Your device does not support WebXR Immersive AR.",
        );
    }
}

/// Wire the AR page. Returns `false` when the page has no A-Frame scene.
pub fn init(document: &web::Document) -> bool {
    let Some(scene) = document.query_selector("a-scene").ok().flatten() else {
        return false;
    };
    let error_msg: Option<web::HtmlElement> = dom::element_by_id(document, "error-msg");

    if let Some(start_btn) = dom::element_by_id::<web::HtmlButtonElement>(document, "start-btn") {
        if let Some(window) = web::window() {
            spawn_local(check_xr_support(window.navigator(), start_btn.clone(), error_msg));
        }
        let scene = scene.clone();
        Listener::new(&start_btn, "click", None, move |_: web::MouseEvent| {
            if let Err(e) = method(&scene, "enterVR").and_then(|f| f.call0(&scene)) {
                log::error!("[ar] enterVR failed: {:?}", e);
            }
            if let Some(doc) = dom::window_document() {
                if let Some(el) = dom::element_by_id::<web::HtmlElement>(&doc, "start-screen") {
                    dom::set_display(&el, false);
                }
                if let Some(el) = dom::element_by_id::<web::HtmlElement>(&doc, "ar-hud") {
                    dom::set_display(&el, true);
                }
            }
        })
        .forget();
    }

    Listener::new(&scene, "exit-vr", None, |_: web::Event| {
        if let Some(w) = web::window() {
            _ = w.location().reload();
        }
    })
    .forget();

    log::info!("[ar] page ready");
    true
}
