// Host-side tests for slide bookkeeping and the viewer registry.

use exhibit_core::carousel::*;
use exhibit_core::ViewerRegistry;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn swipe_left_past_threshold_advances() {
    let mut track = SlideTrack::new(3);
    track.begin_drag(500.0);
    assert!(track.is_dragging());
    assert_eq!(track.drag_to(250.0, 1000.0), Some(-25.0));
    assert_eq!(track.release(1000.0), Some(1));
    assert!(!track.is_dragging());
    assert_eq!(track.current(), 1);
}

#[test]
fn short_swipes_settle_back() {
    let mut track = SlideTrack::new(3);
    track.go_to(1);
    track.begin_drag(500.0);
    track.drag_to(650.0, 1000.0);
    assert_eq!(track.release(1000.0), Some(1));
    // exactly on the threshold is not enough
    track.begin_drag(500.0);
    track.drag_to(700.0, 1000.0);
    assert_eq!(track.release(1000.0), Some(1));
}

#[test]
fn swipes_stop_at_either_end() {
    let mut track = SlideTrack::new(2);
    track.begin_drag(0.0);
    track.drag_to(600.0, 1000.0);
    assert_eq!(track.release(1000.0), Some(0));

    track.go_to(1);
    track.begin_drag(900.0);
    track.drag_to(100.0, 1000.0);
    assert_eq!(track.release(1000.0), Some(1));

    track.begin_drag(100.0);
    track.drag_to(900.0, 1000.0);
    assert_eq!(track.release(1000.0), Some(0));
}

#[test]
fn live_offset_starts_from_the_current_slide() {
    let mut track = SlideTrack::new(4);
    track.go_to(2);
    track.begin_drag(100.0);
    assert_eq!(track.drag_to(200.0, 400.0), Some(-175.0));
    // a zero-width container is treated as one pixel wide
    assert_eq!(track.drag_to(0.0, 0.0), Some(-10_200.0));
}

#[test]
fn release_and_moves_without_a_drag_are_ignored() {
    let mut track = SlideTrack::new(3);
    assert_eq!(track.drag_to(10.0, 100.0), None);
    assert_eq!(track.release(100.0), None);
    assert_eq!(track.cancel(), None);
}

#[test]
fn cancel_keeps_the_current_slide() {
    let mut track = SlideTrack::new(3);
    track.go_to(2);
    track.begin_drag(800.0);
    track.drag_to(0.0, 1000.0);
    assert_eq!(track.cancel(), Some(2));
    assert_eq!(track.release(1000.0), None);
}

#[test]
fn go_to_clamps_to_the_last_slide() {
    let mut track = SlideTrack::new(3);
    assert_eq!(track.go_to(10), 2);
    let mut empty = SlideTrack::new(0);
    assert_eq!(empty.go_to(4), 0);
}

#[test]
fn transforms_are_percent_translations() {
    assert_eq!(slide_transform(0), "translateX(-0%)");
    assert_eq!(slide_transform(2), "translateX(-200%)");
    assert_eq!(drag_transform(-37.5), "translateX(-37.5%)");
}

#[test]
fn registry_builds_each_slot_once() {
    let builds = Rc::new(Cell::new(0));
    let mut registry: ViewerRegistry<Rc<String>> = ViewerRegistry::new();
    for _ in 0..3 {
        let b = builds.clone();
        let v = registry.get_or_try_insert_with(1, move || {
            b.set(b.get() + 1);
            Some(Rc::new("viewer-1".to_owned()))
        });
        assert_eq!(v.as_deref().map(String::as_str), Some("viewer-1"));
    }
    assert_eq!(builds.get(), 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(1));
    assert!(!registry.contains(0));
}

#[test]
fn failed_builds_leave_the_slot_open() {
    let mut registry: ViewerRegistry<u32> = ViewerRegistry::new();
    assert_eq!(registry.get_or_try_insert_with(0, || None), None);
    assert!(registry.is_empty());
    assert_eq!(registry.get_or_try_insert_with(0, || Some(7)), Some(7));
    assert_eq!(registry.get(0), Some(7));
    assert_eq!(registry.indices().collect::<Vec<_>>(), vec![0]);
}
