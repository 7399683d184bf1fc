use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gridpack_core::events::names;
use gridpack_core::{Debouncer, Emitter, GridEvent};

#[test]
fn listeners_run_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut em: Emitter<u32> = Emitter::new();
    let l1 = log.clone();
    em.on("tick", move |v| l1.borrow_mut().push(("first", *v)));
    let l2 = log.clone();
    em.on("tick", move |v| l2.borrow_mut().push(("second", *v)));

    assert_eq!(em.emit("tick", &7), 2);
    assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    assert_eq!(em.emit("other", &1), 0);
}

#[test]
fn once_listener_fires_at_most_once() {
    let hits = Rc::new(RefCell::new(0));
    let mut em: Emitter<()> = Emitter::new();
    let h = hits.clone();
    em.once("done", move |_| *h.borrow_mut() += 1);
    assert_eq!(em.listener_count("done"), 1);
    em.emit("done", &());
    em.emit("done", &());
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(em.listener_count("done"), 0);
}

#[test]
fn off_removes_only_the_named_listener() {
    let hits = Rc::new(RefCell::new(0));
    let mut em: Emitter<()> = Emitter::new();
    let h = hits.clone();
    let id = em.on("a", move |_| *h.borrow_mut() += 1);
    let h = hits.clone();
    em.on("a", move |_| *h.borrow_mut() += 10);

    assert!(!em.off("b", id));
    assert!(em.off("a", id));
    assert!(!em.off("a", id));
    em.emit("a", &());
    assert_eq!(*hits.borrow(), 10);

    em.all_off();
    assert_eq!(em.listener_count("a"), 0);
}

#[test]
fn grid_events_carry_names_and_keys() {
    let ev = GridEvent::HideComplete(vec!["a", "b"]);
    assert_eq!(ev.name(), names::HIDE_COMPLETE);
    assert_eq!(ev.keys(), ["a", "b"]);
    assert_eq!(
        GridEvent::<&str>::ArrangeComplete(vec![]).name(),
        "arrangeComplete"
    );
}

#[test]
fn debouncer_fires_once_after_quiet_window() {
    let t0 = Instant::now();
    let ms = Duration::from_millis;
    let mut d = Debouncer::from_millis(100);
    assert!(!d.poll(t0));

    d.request(t0);
    assert!(d.is_pending());
    assert!(!d.poll(t0 + ms(50)));
    d.request(t0 + ms(50));
    assert_eq!(d.coalesced(), 1);
    // window restarts at the latest request
    assert!(!d.poll(t0 + ms(120)));
    assert_eq!(d.remaining(t0 + ms(120)), Some(ms(30)));
    assert!(d.poll(t0 + ms(150)));
    assert!(!d.poll(t0 + ms(400)));
    assert!(!d.is_pending());
    assert_eq!(d.coalesced(), 0);
}

#[test]
fn cancelled_request_never_fires() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(10));
    d.request(t0);
    d.cancel();
    assert!(!d.poll(t0 + Duration::from_secs(1)));
    assert_eq!(d.remaining(t0), None);
}
