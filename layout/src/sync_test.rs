use super::*;
use crate::persist::LayoutEntry;

fn body(id: &str) -> LayoutSnapshot {
    LayoutSnapshot {
        stats: vec![LayoutEntry { id: id.into(), visible: true, size: None, span: None, pin: None }],
        ..LayoutSnapshot::default()
    }
}

// =============================================================
// Debounce
// =============================================================

#[test]
fn new_queue_is_idle() {
    let mut queue = SaveQueue::new(250);
    assert!(queue.is_idle());
    assert_eq!(queue.poll(10_000), None);
}

#[test]
fn poll_waits_for_debounce_window() {
    let mut queue = SaveQueue::new(250);
    queue.schedule(body("a"), 1000);
    assert_eq!(queue.poll(1249), None);
    let request = queue.poll(1250).unwrap();
    assert_eq!(request.seq, 1);
    assert_eq!(request.body, body("a"));
    assert!(!queue.has_pending());
}

#[test]
fn newer_schedule_supersedes_and_restarts_window() {
    let mut queue = SaveQueue::new(250);
    queue.schedule(body("a"), 1000);
    queue.schedule(body("b"), 1200);
    assert_eq!(queue.poll(1300), None);
    assert_eq!(queue.poll(1450).unwrap().body, body("b"));
}

#[test]
fn flush_skips_the_window() {
    let mut queue = SaveQueue::new(250);
    queue.schedule(body("a"), 1000);
    assert_eq!(queue.flush(1001).unwrap().seq, 1);
    assert_eq!(queue.flush(1002), None);
}

// =============================================================
// Single flight
// =============================================================

#[test]
fn one_request_in_flight() {
    let mut queue = SaveQueue::new(0);
    queue.schedule(body("a"), 0);
    let first = queue.poll(0).unwrap();
    queue.schedule(body("b"), 1);
    assert_eq!(queue.poll(5), None);
    assert_eq!(queue.in_flight(), Some(first.seq));

    assert!(queue.complete(first.seq, true));
    let second = queue.poll(5).unwrap();
    assert_eq!(second.seq, 2);
    assert_eq!(second.body, body("b"));
}

#[test]
fn clear_pending_keeps_in_flight() {
    let mut queue = SaveQueue::new(0);
    queue.schedule(body("a"), 0);
    let first = queue.poll(0).unwrap();
    queue.schedule(body("b"), 1);
    queue.clear_pending();
    assert!(!queue.has_pending());
    assert_eq!(queue.in_flight(), Some(first.seq));
    assert!(queue.complete(first.seq, true));
    assert_eq!(queue.poll(10), None);
    assert!(queue.is_idle());
}

#[test]
fn stale_completion_is_ignored() {
    let mut queue = SaveQueue::new(0);
    queue.schedule(body("a"), 0);
    let first = queue.poll(0).unwrap();
    assert!(!queue.complete(first.seq + 7, true));
    assert_eq!(queue.in_flight(), Some(first.seq));
    assert!(queue.complete(first.seq, false));
    assert!(!queue.complete(first.seq, true));
    assert!(queue.is_idle());
}
