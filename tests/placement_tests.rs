// Host-side tests for AR wall placement and environment config.

use exhibit_core::config::*;
use exhibit_core::placement::*;
use glam::{Quat, Vec3};
use instant::{Duration, Instant};

const HIT: Vec3 = Vec3::new(0.2, 1.4, -1.8);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn ready(t0: Instant) -> WallPlacement {
    let mut p = WallPlacement::default();
    assert_eq!(p.poll(t0, HIT), Some(PlacementState::Ready));
    p
}

#[test]
fn scanning_until_the_tracker_leaves_the_origin() {
    let t0 = Instant::now();
    let mut p = WallPlacement::default();
    assert_eq!(p.state(), PlacementState::Scanning);
    assert!(p.is_due(t0));
    assert_eq!(p.poll(t0, Vec3::ZERO), None);
    assert_eq!(p.poll(t0 + ms(100), HIT), Some(PlacementState::Ready));
    assert_eq!(p.poll(t0 + ms(200), HIT), None);
    assert_eq!(p.poll(t0 + ms(300), Vec3::ZERO), Some(PlacementState::Scanning));
}

#[test]
fn polls_are_throttled() {
    let t0 = Instant::now();
    let mut p = WallPlacement::default();
    p.poll(t0, Vec3::ZERO);
    assert!(!p.is_due(t0 + ms(99)));
    assert_eq!(p.poll(t0 + ms(50), HIT), None);
    assert_eq!(p.state(), PlacementState::Scanning);
    assert_eq!(p.poll(t0 + ms(100), HIT), Some(PlacementState::Ready));
}

#[test]
fn confirm_only_works_when_ready() {
    let t0 = Instant::now();
    let tracker = Pose {
        position: HIT,
        orientation: Quat::IDENTITY,
    };
    let mut scanning = WallPlacement::default();
    assert_eq!(scanning.confirm(tracker), None);
    assert_eq!(scanning.state(), PlacementState::Scanning);

    let mut p = ready(t0);
    let placed = p.confirm(tracker).unwrap();
    assert_eq!(p.state(), PlacementState::Placed);
    assert_eq!(placed.position, HIT);
    assert_eq!(p.confirm(tracker), None);
}

#[test]
fn placed_is_terminal() {
    let t0 = Instant::now();
    let mut p = ready(t0);
    p.confirm(Pose {
        position: HIT,
        orientation: Quat::IDENTITY,
    });
    assert_eq!(p.poll(t0 + ms(500), Vec3::ZERO), None);
    assert_eq!(p.poll(t0 + ms(1000), HIT), None);
    assert_eq!(p.state(), PlacementState::Placed);
}

#[test]
fn wall_correction_tips_the_model_off_the_wall() {
    let yaw = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let pose = corrected_pose(Pose {
        position: Vec3::ONE,
        orientation: yaw,
    });
    assert_eq!(pose.position, Vec3::ONE);
    // rotation is applied about the local X axis, after the tracker rotation
    let expected = yaw * Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
    assert!(pose.orientation.abs_diff_eq(expected, 1e-6));
    let upright = corrected_pose(Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    });
    let up = upright.orientation * Vec3::Y;
    assert!(up.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
}

#[test]
fn api_endpoints_follow_the_origin() {
    let api = ApiConfig::with_origin("https://example.test/");
    assert_eq!(api.origin(), "https://example.test");
    assert_eq!(api.login_url(), "https://example.test/narrenhaeusel/api/cms-login");
    assert_eq!(api.data_url(), "https://example.test/narrenhaeusel/api/get-data");
    assert_eq!(api.save_url(), "https://example.test/narrenhaeusel/api/save");

    let dev = ApiConfig::for_environment(Environment::Development);
    assert_eq!(dev.login_url(), "/proxy/narrenhaeusel/api/cms-login");
    let prod = ApiConfig::for_environment(Environment::Production);
    assert_eq!(prod.origin(), PRODUCTION_ORIGIN);
}

#[test]
fn environment_log_levels() {
    assert_eq!(Environment::Development.log_level(), log::Level::Debug);
    assert_eq!(Environment::Production.log_level(), log::Level::Info);
}

#[test]
fn touch_primary_detection() {
    let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
    let desktop = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
    assert!(is_touch_primary(iphone, false));
    assert!(!is_touch_primary(desktop, false));
    assert!(is_touch_primary(desktop, true));
    assert!(is_touch_primary("Opera Mini/8.0", false));
}
