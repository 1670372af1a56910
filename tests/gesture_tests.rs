// Host-side tests for gesture handling and easing.

use exhibit_core::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn settle(g: &mut GestureState) -> PivotPose {
    let mut pose = g.pose();
    for _ in 0..2000 {
        pose = g.step(1.0 / 60.0);
    }
    pose
}

#[test]
fn wheel_zoom_is_immediate_and_clamped() {
    let mut g = GestureState::default();
    g.wheel(-100.0);
    assert!(approx(g.scale(), 1.1));
    g.wheel(-1.0e6);
    assert_eq!(g.scale(), 4.0);
    g.wheel(1.0e6);
    assert_eq!(g.scale(), 0.5);
}

#[test]
fn pan_range_grows_beyond_the_free_scale() {
    let mut g = GestureState::default();
    assert!(approx(g.pan_range().max, 3.5 * 0.2));
    g.wheel(1.0e6);
    assert_eq!(g.pan_range().span(), 0.0);
    g.wheel(-1.0e6);
    assert!(approx(g.pan_range().max, 3.5 * 3.2));
    assert!(approx(g.pan_range().min, -3.5 * 3.2));
}

#[test]
fn secondary_drag_pans_within_range() {
    let mut g = GestureState::default();
    g.pointer_down(SECONDARY_BUTTON, 0.0, 0.0);
    assert_eq!(g.cursor(), "ns-resize");
    g.pointer_move(0.0, -1000.0);
    assert_eq!(g.target_pan(), g.pan_range().max);
    g.pointer_move(0.0, 5000.0);
    assert_eq!(g.target_pan(), g.pan_range().min);
    g.pointer_up();
    assert_eq!(g.cursor(), "grab");
}

#[test]
fn primary_drag_rotates_proportionally() {
    let mut g = GestureState::default();
    g.pointer_down(0, 10.0, 0.0);
    assert_eq!(g.cursor(), "grabbing");
    g.pointer_move(110.0, 0.0);
    assert!(approx(g.target_rotation(), 1.0));
    // rotation eases, it does not jump
    let pose = g.step(1.0 / 60.0);
    assert!(pose.rotation_y > 0.0 && pose.rotation_y < 1.0);
    let pose = settle(&mut g);
    assert_eq!(pose.rotation_y, g.target_rotation());
}

#[test]
fn moves_without_a_press_do_nothing() {
    let mut g = GestureState::default();
    g.pointer_move(300.0, 300.0);
    assert_eq!(g.target_rotation(), 0.0);
    assert_eq!(g.target_pan(), 0.0);
}

#[test]
fn zooming_out_clamps_an_existing_pan() {
    let mut g = GestureState::default();
    g.wheel(-2000.0);
    g.pointer_down(SECONDARY_BUTTON, 0.0, 0.0);
    g.pointer_move(0.0, -10_000.0);
    assert!(g.target_pan() > 3.0);
    g.wheel(1000.0);
    assert!(g.target_pan() <= g.pan_range().max);
}

#[test]
fn zoom_out_recentres_pan_when_enabled() {
    let mut g = GestureState::new(GestureTuning {
        recenter_pan_on_zoom_out: true,
        ..GestureTuning::default()
    });
    g.wheel(-1000.0);
    g.pointer_down(SECONDARY_BUTTON, 0.0, 0.0);
    g.pointer_move(0.0, -200.0);
    settle(&mut g);
    assert!(g.pan() > 0.0);

    g.wheel(2000.0);
    assert!(g.scale() <= 1.0);
    assert_eq!(g.pan(), 0.0);
    assert_eq!(g.target_pan(), 0.0);
}

#[test]
fn idle_sway_runs_until_first_interaction() {
    let mut g = GestureState::default();
    g.step(1.0);
    let expected = (1.0_f32 * 0.2).sin() * 0.15;
    assert!(approx(g.target_rotation(), expected));

    g.pointer_down(0, 0.0, 0.0);
    g.pointer_up();
    let before = g.target_rotation();
    g.step(5.0);
    assert_eq!(g.target_rotation(), before);
}

#[test]
fn reset_returns_to_neutral_and_keeps_idle_off() {
    let mut g = GestureState::default();
    g.wheel(-1500.0);
    g.pointer_down(0, 0.0, 0.0);
    g.pointer_move(250.0, 0.0);
    settle(&mut g);

    g.reset();
    assert_eq!(g.scale(), 1.0);
    assert_eq!(g.rotation(), 0.0);
    assert_eq!(g.target_rotation(), 0.0);
    assert_eq!(g.pan(), 0.0);
    assert_eq!(g.cursor(), "grab");
    assert!(g.has_interacted());
    g.step(3.0);
    assert_eq!(g.target_rotation(), 0.0);
}

#[test]
fn single_finger_rotates_and_does_not_block_scrolling_on_start() {
    let mut g = GestureState::default();
    assert!(!g.touch_start(&[TouchPoint::new(100.0, 100.0)]));
    assert!(g.touch_move(&[TouchPoint::new(200.0, 100.0)]));
    assert!(approx(g.target_rotation(), 100.0 * 0.008));
    g.touch_end();
    assert!(!g.touch_move(&[TouchPoint::new(300.0, 100.0)]));
}

#[test]
fn pinch_zooms_by_finger_distance() {
    let mut g = GestureState::default();
    assert!(g.touch_start(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(100.0, 0.0)]));
    assert!(g.touch_move(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(200.0, 0.0)]));
    assert!(approx(g.scale(), 1.4));
    // no two-finger pan unless configured
    assert!(g.touch_move(&[TouchPoint::new(0.0, -100.0), TouchPoint::new(200.0, -100.0)]));
    assert_eq!(g.target_pan(), 0.0);
}

#[test]
fn two_finger_drag_pans_when_configured() {
    let mut g = GestureState::new(GestureTuning {
        two_finger_pan: true,
        ..GestureTuning::default()
    });
    g.wheel(-1000.0);
    g.touch_start(&[TouchPoint::new(0.0, 100.0), TouchPoint::new(100.0, 100.0)]);
    g.touch_move(&[TouchPoint::new(0.0, 50.0), TouchPoint::new(100.0, 50.0)]);
    assert!(approx(g.target_pan(), 0.5));
}

#[test]
fn second_finger_mid_gesture_starts_a_fresh_pinch() {
    let mut g = GestureState::default();
    g.touch_start(&[TouchPoint::new(0.0, 0.0)]);
    assert!(g.touch_move(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(50.0, 0.0)]));
    assert_eq!(g.scale(), 1.0);
    g.touch_move(&[TouchPoint::new(0.0, 0.0), TouchPoint::new(100.0, 0.0)]);
    assert!(approx(g.scale(), 1.2));
}

#[test]
fn slider_tracks_pan_and_seeks_it() {
    let mut g = GestureState::default();
    assert!(!g.slider_visible(true));
    g.wheel(-500.0);
    assert!(g.slider_visible(true));
    assert!(!g.slider_visible(false));
    assert!(approx(g.slider_thumb(), 0.5));

    g.slider_seek(0.0);
    assert_eq!(g.target_pan(), g.pan_range().max);
    g.slider_seek(1.0);
    assert!(approx(g.target_pan(), g.pan_range().min));
    settle(&mut g);
    assert!(approx(g.slider_thumb(), 1.0));
}

#[test]
fn eased_value_snaps_onto_its_target() {
    let mut e = motion::Eased::at(0.0);
    e.target = 1.0;
    e.step(0.5, 1e-3);
    assert_eq!(e.current, 0.5);
    for _ in 0..20 {
        e.step(0.5, 1e-3);
    }
    assert!(e.is_settled());
    assert_eq!(e.current, 1.0);
}

#[test]
fn idle_clock_ignores_negative_steps() {
    let mut sway = motion::IdleSway::new(0.15, 0.2);
    sway.advance(2.0);
    sway.advance(-1.0);
    assert_eq!(sway.clock(), 2.0);
}
