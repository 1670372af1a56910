//! Aspect-ratio driven camera framing and model fitting.
//!
//! Both functions here are pure: they are evaluated once when a viewer is
//! built and again on every container resize, so repeated layout changes
//! always land on the same framing.

use crate::bounds::Bounds;
use crate::camera::Camera;
use glam::{Mat4, Vec3};

pub const CAMERA_X: f32 = -2.0;
pub const LOOK_AT_X: f32 = 0.2;

/// One row of the aspect-ratio table. `max_aspect` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramingBand {
    pub max_aspect: f32,
    pub camera_z: f32,
    pub camera_y: f32,
    pub look_at_y: f32,
    pub pivot_y: f32,
}

/// Narrow containers push the camera back and up so tall models stay in frame.
pub const FRAMING_BANDS: [FramingBand; 5] = [
    FramingBand { max_aspect: 0.7, camera_z: 10.5, camera_y: 1.8, look_at_y: 0.5, pivot_y: -0.3 },
    FramingBand { max_aspect: 1.0, camera_z: 9.5, camera_y: 1.7, look_at_y: 0.5, pivot_y: -0.3 },
    FramingBand { max_aspect: 1.5, camera_z: 7.5, camera_y: 1.6, look_at_y: 0.5, pivot_y: -0.3 },
    FramingBand { max_aspect: 2.0, camera_z: 7.0, camera_y: 1.5, look_at_y: 0.4, pivot_y: -0.3 },
    FramingBand { max_aspect: f32::INFINITY, camera_z: 6.5, camera_y: 1.4, look_at_y: 0.4, pivot_y: -0.4 },
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFraming {
    pub aspect: f32,
    pub eye: Vec3,
    pub look_at: Vec3,
    pub pivot_y: f32,
}

impl CameraFraming {
    pub fn distance(&self) -> f32 {
        self.eye.z
    }

    pub fn height(&self) -> f32 {
        self.eye.y
    }

    pub fn look_at_height(&self) -> f32 {
        self.look_at.y
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.eye, self.look_at, self.aspect)
    }
}

pub fn band_for_aspect(aspect: f32) -> &'static FramingBand {
    FRAMING_BANDS
        .iter()
        .find(|b| aspect < b.max_aspect)
        .unwrap_or(&FRAMING_BANDS[FRAMING_BANDS.len() - 1])
}

/// Framing for a container of `width` x `height` CSS pixels.
///
/// A zero height is treated as one pixel so a collapsed container still
/// produces a finite (very wide) aspect instead of NaN.
pub fn camera_framing(width: f32, height: f32) -> CameraFraming {
    let aspect = width / height.max(1.0);
    let band = band_for_aspect(aspect);
    CameraFraming {
        aspect,
        eye: Vec3::new(CAMERA_X, band.camera_y, band.camera_z),
        look_at: Vec3::new(LOOK_AT_X, band.look_at_y, 0.0),
        pivot_y: band.pivot_y,
    }
}

// Model fitting
pub const FIT_EXTENT: f32 = 4.0;
pub const FIT_PADDING: f32 = 0.75;
/// Models flatter than this (height / largest extent) sit lower in the frame.
pub const FLAT_HEIGHT_RATIO: f32 = 0.7;
pub const FLAT_VERTICAL_FACTOR: f32 = 0.3;
pub const TALL_VERTICAL_FACTOR: f32 = 0.5;
/// Gap between the model placement and the shadow plane.
pub const SHADOW_PLANE_DROP: f32 = 0.15;

/// Width-dependent multiplier: small screens get a relatively larger model.
pub fn viewport_scale(container_width: f32) -> f32 {
    if container_width < 768.0 {
        (container_width / 320.0).min(1.4)
    } else if container_width < 1024.0 {
        (container_width / 400.0).min(1.2)
    } else {
        (container_width / 500.0).min(1.0)
    }
}

/// Scale and offset applied to a loaded model, relative to the pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelPlacement {
    pub scale: f32,
    pub offset: Vec3,
    pub shadow_y: f32,
}

impl ModelPlacement {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset) * Mat4::from_scale(Vec3::splat(self.scale))
    }

    pub fn shadow_plane_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.shadow_y, 0.0))
    }
}

/// Fit untransformed model `bounds` into a container `container_width` wide.
///
/// The result never depends on the gesture zoom: the pivot applies that on
/// top, so refitting at any zoom leaves the on-screen size unchanged.
pub fn fit_model(bounds: &Bounds, container_width: f32) -> ModelPlacement {
    let size = bounds.size();
    let center = bounds.center();
    let max_dim = size.x.max(size.z).max(size.y);
    let target_scale = if max_dim > f32::EPSILON {
        (FIT_EXTENT * FIT_PADDING) / max_dim
    } else {
        1.0
    };
    let scale = target_scale * viewport_scale(container_width);

    let scaled_height = size.y * scale;
    let min_y = if bounds.is_empty() { 0.0 } else { bounds.min.y };
    let scaled_min_y = min_y * scale;
    let height_ratio = if max_dim > f32::EPSILON { size.y / max_dim } else { 1.0 };
    let vertical_factor = if height_ratio < FLAT_HEIGHT_RATIO {
        FLAT_VERTICAL_FACTOR
    } else {
        TALL_VERTICAL_FACTOR
    };
    let offset_y = -scaled_min_y - (scaled_height / 2.0) * vertical_factor;

    ModelPlacement {
        scale,
        offset: Vec3::new(-center.x * scale, offset_y, -center.z * scale),
        shadow_y: offset_y - SHADOW_PLANE_DROP,
    }
}
