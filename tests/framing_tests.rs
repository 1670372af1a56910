// Host-side tests for camera framing and model fitting.

use exhibit_core::*;
use glam::Vec3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn bands_switch_exactly_at_their_upper_bound() {
    assert_eq!(band_for_aspect(0.69).camera_z, 10.5);
    assert_eq!(band_for_aspect(0.7).camera_z, 9.5);
    assert_eq!(band_for_aspect(0.99).camera_z, 9.5);
    assert_eq!(band_for_aspect(1.0).camera_z, 7.5);
    assert_eq!(band_for_aspect(1.49).camera_z, 7.5);
    assert_eq!(band_for_aspect(1.5).camera_z, 7.0);
    assert_eq!(band_for_aspect(1.99).camera_z, 7.0);
    assert_eq!(band_for_aspect(2.0).camera_z, 6.5);
    assert_eq!(band_for_aspect(2.0).pivot_y, -0.4);
    assert_eq!(band_for_aspect(1000.0).camera_z, 6.5);
}

#[test]
fn narrow_containers_push_the_camera_back_and_up() {
    let mut prev = band_for_aspect(0.1);
    for aspect in [0.8, 1.2, 1.7, 3.0] {
        let band = band_for_aspect(aspect);
        assert!(band.camera_z < prev.camera_z, "distance not shrinking at {aspect}");
        assert!(band.camera_y < prev.camera_y, "height not shrinking at {aspect}");
        prev = band;
    }
}

#[test]
fn landscape_1024x768_uses_the_below_1_5_band() {
    let f = camera_framing(1024.0, 768.0);
    assert!(approx(f.aspect, 1024.0 / 768.0));
    assert_eq!(f.distance(), 7.5);
    assert_eq!(f.height(), 1.6);
    assert_eq!(f.look_at_height(), 0.5);
    assert_eq!(f.pivot_y, -0.3);
    assert_eq!(f.eye.x, CAMERA_X);
    assert_eq!(f.look_at.x, LOOK_AT_X);
}

#[test]
fn collapsed_container_still_frames_finitely() {
    let f = camera_framing(800.0, 0.0);
    assert!(f.aspect.is_finite());
    assert_eq!(f.distance(), 6.5);
    let vp = f.camera().view_projection();
    assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
}

#[test]
fn viewport_scale_breakpoints() {
    assert!(approx(viewport_scale(320.0), 1.0));
    assert!(approx(viewport_scale(400.0), 1.25));
    assert!(approx(viewport_scale(600.0), 1.4));
    assert!(approx(viewport_scale(800.0), 1.2));
    assert!(approx(viewport_scale(1023.0), 1.2));
    assert!(approx(viewport_scale(1024.0), 1.0));
    assert!(approx(viewport_scale(2560.0), 1.0));
}

#[test]
fn model_with_max_dimension_two_fits_at_scale_one_and_a_half() {
    let bounds = Bounds::new(Vec3::new(-1.0, 0.0, -0.5), Vec3::new(1.0, 1.0, 0.5));
    let p = fit_model(&bounds, 1024.0);
    assert!(approx(p.scale, 1.5));
    // flat model (height ratio 0.5) sits lower
    assert!(approx(p.offset.y, -(1.5 / 2.0) * FLAT_VERTICAL_FACTOR));
    assert!(approx(p.shadow_y, p.offset.y - SHADOW_PLANE_DROP));
    assert!(approx(p.offset.x, 0.0));
    assert!(approx(p.offset.z, 0.0));
}

#[test]
fn tall_models_use_the_larger_vertical_factor_and_are_centred() {
    let bounds = Bounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 5.0, 4.0));
    let p = fit_model(&bounds, 1200.0);
    let scale = FIT_EXTENT * FIT_PADDING / 3.0;
    assert!(approx(p.scale, scale));
    let expected_y = -2.0 * scale - (3.0 * scale / 2.0) * TALL_VERTICAL_FACTOR;
    assert!(approx(p.offset.y, expected_y));
    assert!(approx(p.offset.x, -1.5 * scale));
    assert!(approx(p.offset.z, -3.5 * scale));
}

#[test]
fn refit_while_zoomed_keeps_the_on_screen_size() {
    let bounds = Bounds::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let mut gestures = GestureState::new(GestureTuning::default());
    let neutral = gestures.pose().scale * fit_model(&bounds, 1024.0).scale;

    gestures.wheel(-1000.0);
    assert!(gestures.scale() > GestureTuning::default().neutral_scale);
    let placement = fit_model(&bounds, 1024.0);
    let before = gestures.pose().scale * placement.scale;

    // a same-size relayout refits from the stored bounds
    let refit = fit_model(&bounds, 1024.0);
    assert_eq!(refit, placement);
    assert!(approx(gestures.pose().scale * refit.scale, before));

    gestures.reset();
    assert!(approx(gestures.pose().scale * refit.scale, neutral));
}

#[test]
fn degenerate_bounds_fall_back_to_unit_scale() {
    let empty = fit_model(&Bounds::EMPTY, 1024.0);
    assert!(approx(empty.scale, 1.0));
    assert!(empty.offset.is_finite());

    let point = Bounds::from_points([Vec3::new(0.5, 0.5, 0.5)]);
    let p = fit_model(&point, 320.0);
    assert!(approx(p.scale, 1.0));
    assert!(p.offset.is_finite());
    assert!(p.shadow_y.is_finite());
}

#[test]
fn bounds_grow_with_points() {
    let b = Bounds::from_points([Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, -2.0, 0.0)]);
    assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(b.max, Vec3::new(3.0, 0.0, 2.0));
    assert_eq!(b.size(), Vec3::new(4.0, 2.0, 2.0));
    assert_eq!(b.center(), Vec3::new(1.0, -1.0, 1.0));
    assert!(Bounds::default().is_empty());
    assert_eq!(Bounds::EMPTY.size(), Vec3::ZERO);
}

#[test]
fn placement_matrix_scales_then_translates() {
    let p = ModelPlacement {
        scale: 2.0,
        offset: Vec3::new(0.0, -1.0, 0.0),
        shadow_y: -1.15,
    };
    let v = p.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
    assert!(v.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-6));
    let s = p.shadow_plane_matrix().transform_point3(Vec3::ZERO);
    assert!(approx(s.y, -1.15));
}
