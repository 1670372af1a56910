use crate::constants::MAX_FRAME_DT_SEC;
use crate::render::SceneFrame;
use crate::viewer::Viewer;
use exhibit_core::PivotPose;
use glam::{Mat4, Quat, Vec3};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Pivot transform: vertical offset plus pan, Y rotation, uniform zoom.
pub fn pivot_matrix(pivot_y: f32, pose: &PivotPose) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(pose.scale),
        Quat::from_rotation_y(pose.rotation_y),
        Vec3::new(0.0, pivot_y + pose.pan_y, 0.0),
    )
}

impl Viewer {
    pub fn frame(&self) {
        {
            let mut st = self.state.borrow_mut();
            let now = Instant::now();
            let dt_sec = (now - st.last_frame).as_secs_f32().min(MAX_FRAME_DT_SEC);
            st.last_frame = now;

            let pose = st.gestures.step(dt_sec);
            let pivot = pivot_matrix(st.framing.pivot_y, &pose);
            let (model, plane) = match &st.model {
                Some(m) => (
                    pivot * m.placement.matrix(),
                    pivot * m.placement.shadow_plane_matrix(),
                ),
                None => (pivot, pivot),
            };
            let scene = SceneFrame {
                camera: st.framing.camera(),
                model,
                plane,
            };

            let (w, h) = (self.canvas.width(), self.canvas.height());
            if let Some(g) = st.gpu.as_mut() {
                g.resize_if_needed(w, h);
                match g.render(&scene) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => g.reconfigure(),
                    Err(e) => log::error!("[viewer {}] render error: {:?}", self.index, e),
                }
            }
        }
        self.refresh_slider();
    }
}

pub fn start_loop(viewer: Rc<Viewer>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        viewer.frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
