use super::*;
use std::thread;

#[test]
fn limits_depth_only() {
    let limits = SearchLimits::depth(5);
    assert_eq!(limits.depth, 5);
    assert!(limits.move_time.is_none());
    assert!(!limits.should_stop());
}

#[test]
fn limits_with_time() {
    let limits = SearchLimits::depth_and_time(4, Duration::from_millis(100));
    assert_eq!(limits.depth, 4);
    assert_eq!(limits.move_time, Some(Duration::from_millis(100)));
}

#[test]
fn limits_infinite_never_expire() {
    let limits = SearchLimits::infinite();
    assert_eq!(limits.depth, u8::MAX);
    limits.start();
    thread::sleep(Duration::from_millis(5));
    assert!(!limits.time_control.check_time());
}

#[test]
fn clock_expiry_trips_the_flag() {
    let tc = TimeControl::new(Some(Duration::from_millis(10)));
    tc.start();
    assert!(!tc.is_stopped());

    thread::sleep(Duration::from_millis(20));
    assert!(tc.check_time());
    assert!(tc.is_stopped());
}

#[test]
fn manual_stop_is_visible_through_clones() {
    let tc = TimeControl::new(None);
    let handle = tc.clone();
    tc.start();
    assert!(!tc.is_stopped());
    handle.stop();
    assert!(tc.is_stopped());
}

#[test]
fn restart_clears_the_flag() {
    let tc = TimeControl::new(None);
    tc.stop();
    assert!(tc.is_stopped());
    tc.start();
    assert!(!tc.is_stopped());
}

#[test]
fn poll_interval() {
    let tc = TimeControl::new(None);
    assert!(tc.should_check_time(0));
    assert!(tc.should_check_time(TimeControl::CHECK_INTERVAL));
    assert!(!tc.should_check_time(TimeControl::CHECK_INTERVAL + 1));
}
