mod common;

use common::*;
use hitmap::config::ViewerParams;
use hitmap::events::EventHub;
use hitmap::viewer::{bind_viewer, AcquisitionEvent};
use hitmap::{HitMapViewer, ViewerState};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_handlers_run_until_subscription_dropped() {
    let hub: EventHub<u32> = EventHub::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let sub = hub.subscribe(move |v| sink.borrow_mut().push(*v));
    hub.publish(&1);
    assert_eq!(hub.subscriber_count(), 1);

    drop(sub);
    hub.publish(&2);
    assert_eq!(hub.subscriber_count(), 0);
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn test_explicit_unsubscribe_and_order() {
    let hub: EventHub<&'static str> = EventHub::new();
    let log = Rc::new(RefCell::new(String::new()));

    let a = log.clone();
    let first = hub.subscribe(move |e| a.borrow_mut().push_str(&format!("a:{} ", e)));
    let b = log.clone();
    let _second = hub.subscribe(move |e| b.borrow_mut().push_str(&format!("b:{} ", e)));

    hub.publish(&"x");
    first.unsubscribe();
    hub.publish(&"y");
    assert_eq!(*log.borrow(), "a:x b:x b:y ");
}

#[test]
fn test_subscription_outliving_hub() {
    let hub: EventHub<()> = EventHub::new();
    let sub = hub.subscribe(|_| {});
    drop(hub);
    drop(sub);
}

#[test]
fn test_bound_viewer_follows_acquisition() {
    let dc = mesh_collection(3, 3);
    let viewer = Rc::new(RefCell::new(HitMapViewer::new(ViewerParams::default())));
    viewer.borrow_mut().associate(&dc);

    let hub = EventHub::new();
    let sub = bind_viewer(&viewer, &hub);

    hub.publish(&AcquisitionEvent::ResultsReady {
        results: mesh_scores(vec![vec![1.0, 2.0, 3.0]; 3]),
        best_positions: vec![best(0, 1.0), best(4, 6.0)],
    });
    assert_eq!(viewer.borrow().state(), ViewerState::Live);

    hub.publish(&AcquisitionEvent::Finished);
    assert_eq!(viewer.borrow().state(), ViewerState::Final);
    assert_eq!(viewer.borrow().best_position_table()[0].index, 4);

    drop(sub);
    hub.publish(&AcquisitionEvent::Reset);
    assert_eq!(viewer.borrow().state(), ViewerState::Final);
}

#[test]
fn test_dropped_viewer_ignores_events() {
    let hub = EventHub::new();
    let viewer = Rc::new(RefCell::new(HitMapViewer::new(ViewerParams::default())));
    let _sub = bind_viewer(&viewer, &hub);
    drop(viewer);
    hub.publish(&AcquisitionEvent::Finished);
}
