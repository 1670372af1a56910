//! Pointer, touch and wheel input mapped onto the viewer pivot.
//!
//! Input handlers only ever move *targets* (rotation, pan) or the zoom
//! scale; [`GestureState::step`] runs once per frame and eases the current
//! values toward those targets. Every target is clamped before it is stored.

use crate::motion::{Eased, IdleSway};
use smallvec::SmallVec;

/// Mouse button index reported by pointer events for the secondary button.
pub const SECONDARY_BUTTON: i16 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureTuning {
    pub rotate_per_px: f32,
    pub touch_rotate_per_px: f32,
    pub pan_per_px: f32,
    pub wheel_zoom_per_unit: f32,
    pub pinch_zoom_per_px: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub neutral_scale: f32,
    /// Pan range per unit of zoom beyond `pan_free_scale`.
    pub pan_base_range: f32,
    /// Below this zoom the model cannot be panned at all.
    pub pan_free_scale: f32,
    pub smoothing: f32,
    pub snap_epsilon: f32,
    pub idle_amplitude: f32,
    pub idle_speed: f32,
    /// Zoom above which touch devices get the vertical pan slider.
    pub slider_scale_threshold: f32,
    pub two_finger_pan: bool,
    pub recenter_pan_on_zoom_out: bool,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            rotate_per_px: 0.01,
            touch_rotate_per_px: 0.008,
            pan_per_px: 0.01,
            wheel_zoom_per_unit: 0.001,
            pinch_zoom_per_px: 0.004,
            min_scale: 0.5,
            max_scale: 4.0,
            neutral_scale: 1.0,
            pan_base_range: 3.5,
            pan_free_scale: 0.8,
            smoothing: 0.08,
            snap_epsilon: 1e-4,
            idle_amplitude: 0.15,
            idle_speed: 0.2,
            slider_scale_threshold: 1.3,
            two_finger_pan: false,
            recenter_pan_on_zoom_out: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanRange {
    pub min: f32,
    pub max: f32,
}

impl PanRange {
    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub type TouchPoints = SmallVec<[TouchPoint; 2]>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum PointerDrag {
    #[default]
    Idle,
    Rotate {
        last_x: f32,
    },
    Pan {
        last_y: f32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum TouchGesture {
    #[default]
    Idle,
    Rotate {
        last_x: f32,
    },
    Pinch {
        last_distance: f32,
        last_mid_y: f32,
    },
}

/// Pivot transform for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PivotPose {
    pub rotation_y: f32,
    pub pan_y: f32,
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct GestureState {
    tuning: GestureTuning,
    rotation: Eased,
    pan: Eased,
    scale: f32,
    interacted: bool,
    idle: IdleSway,
    pointer: PointerDrag,
    touch: TouchGesture,
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new(GestureTuning::default())
    }
}

impl GestureState {
    pub fn new(tuning: GestureTuning) -> Self {
        Self {
            rotation: Eased::at(0.0),
            pan: Eased::at(0.0),
            scale: tuning.neutral_scale,
            interacted: false,
            idle: IdleSway::new(tuning.idle_amplitude, tuning.idle_speed),
            pointer: PointerDrag::Idle,
            touch: TouchGesture::Idle,
            tuning,
        }
    }

    pub fn tuning(&self) -> &GestureTuning {
        &self.tuning
    }

    pub fn rotation(&self) -> f32 {
        self.rotation.current
    }

    pub fn target_rotation(&self) -> f32 {
        self.rotation.target
    }

    pub fn pan(&self) -> f32 {
        self.pan.current
    }

    pub fn target_pan(&self) -> f32 {
        self.pan.target
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    /// CSS cursor matching the active pointer gesture.
    pub fn cursor(&self) -> &'static str {
        match self.pointer {
            PointerDrag::Idle => "grab",
            PointerDrag::Rotate { .. } => "grabbing",
            PointerDrag::Pan { .. } => "ns-resize",
        }
    }

    /// Vertical pan allowed at the current zoom; empty at or below `pan_free_scale`.
    pub fn pan_range(&self) -> PanRange {
        let zoom_factor = (self.scale - self.tuning.pan_free_scale).max(0.0);
        let range = self.tuning.pan_base_range * zoom_factor;
        PanRange {
            min: -range,
            max: range,
        }
    }

    // ---------------- Pointer (mouse-style) ----------------

    pub fn pointer_down(&mut self, button: i16, x: f32, y: f32) {
        self.interacted = true;
        self.pointer = if button == SECONDARY_BUTTON {
            PointerDrag::Pan { last_y: y }
        } else {
            PointerDrag::Rotate { last_x: x }
        };
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        match self.pointer {
            PointerDrag::Pan { last_y } => {
                self.nudge_pan(-(y - last_y) * self.tuning.pan_per_px);
                self.pointer = PointerDrag::Pan { last_y: y };
            }
            PointerDrag::Rotate { last_x } => {
                self.rotation.target += (x - last_x) * self.tuning.rotate_per_px;
                self.pointer = PointerDrag::Rotate { last_x: x };
            }
            PointerDrag::Idle => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.pointer = PointerDrag::Idle;
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.interacted = true;
        self.zoom_to(self.scale - delta_y * self.tuning.wheel_zoom_per_unit);
    }

    // ---------------- Touch ----------------

    /// Returns `true` when the event should not fall through to the page.
    pub fn touch_start(&mut self, touches: &[TouchPoint]) -> bool {
        self.interacted = true;
        match touches {
            [a, b] => {
                self.touch = TouchGesture::Pinch {
                    last_distance: distance(a, b),
                    last_mid_y: (a.y + b.y) * 0.5,
                };
                true
            }
            [a] => {
                self.touch = TouchGesture::Rotate { last_x: a.x };
                false
            }
            _ => false,
        }
    }

    /// Returns `true` when the move was consumed by a gesture.
    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> bool {
        match (touches, self.touch) {
            (
                [a, b],
                TouchGesture::Pinch {
                    last_distance,
                    last_mid_y,
                },
            ) => {
                let d = distance(a, b);
                let mid_y = (a.y + b.y) * 0.5;
                self.zoom_to(self.scale + (d - last_distance) * self.tuning.pinch_zoom_per_px);
                if self.tuning.two_finger_pan {
                    self.nudge_pan(-(mid_y - last_mid_y) * self.tuning.pan_per_px);
                }
                self.touch = TouchGesture::Pinch {
                    last_distance: d,
                    last_mid_y: mid_y,
                };
                true
            }
            ([a, b], _) => {
                // second finger landed mid-gesture: start measuring from here
                self.touch = TouchGesture::Pinch {
                    last_distance: distance(a, b),
                    last_mid_y: (a.y + b.y) * 0.5,
                };
                true
            }
            ([a], TouchGesture::Rotate { last_x }) => {
                self.rotation.target += (a.x - last_x) * self.tuning.touch_rotate_per_px;
                self.touch = TouchGesture::Rotate { last_x: a.x };
                true
            }
            _ => false,
        }
    }

    pub fn touch_end(&mut self) {
        self.touch = TouchGesture::Idle;
    }

    // ---------------- Slider ----------------

    pub fn slider_visible(&self, touch_primary: bool) -> bool {
        touch_primary && self.scale > self.tuning.slider_scale_threshold
    }

    /// Thumb position in `[0, 1]`, top to bottom.
    pub fn slider_thumb(&self) -> f32 {
        let range = self.pan_range();
        let pos = if range.span() > 0.0 {
            (range.max - self.pan.current) / range.span()
        } else {
            0.5
        };
        pos.clamp(0.0, 1.0)
    }

    /// Map a slider position (`0` = top) onto the target pan.
    pub fn slider_seek(&mut self, fraction: f32) {
        let range = self.pan_range();
        let f = fraction.clamp(0.0, 1.0);
        self.pan.target = range.max - f * range.span();
    }

    // ---------------- Frame ----------------

    /// Advance one frame and return the pose to apply to the pivot.
    pub fn step(&mut self, dt_sec: f32) -> PivotPose {
        if !self.interacted {
            self.rotation.target = self.idle.advance(dt_sec);
        }
        let f = self.tuning.smoothing;
        let eps = self.tuning.snap_epsilon;
        self.rotation.step(f, eps);
        self.pan.step(f, eps);
        self.pose()
    }

    pub fn pose(&self) -> PivotPose {
        PivotPose {
            rotation_y: self.rotation.current,
            pan_y: self.pan.current,
            scale: self.scale,
        }
    }

    /// Back to neutral. The idle sway stays off once the visitor has interacted.
    pub fn reset(&mut self) {
        self.rotation.jump_to(0.0);
        self.pan.jump_to(0.0);
        self.scale = self.tuning.neutral_scale;
        self.pointer = PointerDrag::Idle;
        self.touch = TouchGesture::Idle;
    }

    fn nudge_pan(&mut self, delta: f32) {
        let range = self.pan_range();
        self.pan.target = range.clamp(self.pan.target + delta);
    }

    fn zoom_to(&mut self, scale: f32) {
        let previous = self.scale;
        self.scale = scale.clamp(self.tuning.min_scale, self.tuning.max_scale);
        if self.tuning.recenter_pan_on_zoom_out
            && self.scale < previous
            && self.scale <= self.tuning.neutral_scale
        {
            self.pan.jump_to(0.0);
        }
        let range = self.pan_range();
        self.pan.target = range.clamp(self.pan.target);
    }
}

#[inline]
fn distance(a: &TouchPoint, b: &TouchPoint) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}
