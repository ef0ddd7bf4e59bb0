//! Two sessions on separate threads over an in-process channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use textsync_core::{MemoryChannel, Replica, ReplicaConfig, ReplicaEvent, Session};

/// Keep pumping until both sides have had every edit acknowledged
fn pump_until_settled(session: &mut Session<MemoryChannel>, settled: &AtomicUsize) {
    let mut counted = false;
    loop {
        session.pump().unwrap();
        if !counted && session.replica().is_quiescent() {
            settled.fetch_add(1, Ordering::SeqCst);
            counted = true;
        }
        if counted && settled.load(Ordering::SeqCst) == 2 {
            break;
        }
        thread::yield_now();
    }
}

#[test]
fn sessions_converge_across_threads() {
    let (left, right) = MemoryChannel::pair();
    let settled = Arc::new(AtomicUsize::new(0));

    let input_settled = Arc::clone(&settled);
    let input = thread::spawn(move || {
        let replica = Replica::with_text("input".to_string(), ReplicaConfig::primary(), "0123");
        let mut session = Session::new(replica, left);

        for i in 0..50 {
            let end = session.replica().visible().len();
            session.submit_local_edit(end, end, "i").unwrap();
            if i % 7 == 0 {
                session.pump().unwrap();
            }
        }

        pump_until_settled(&mut session, &input_settled);
        session
    });

    let logic_settled = Arc::clone(&settled);
    let logic = thread::spawn(move || {
        let replica =
            Replica::with_text("logic".to_string(), ReplicaConfig::secondary(), "0123");
        let mut session = Session::new(replica, right);

        for i in 0..30 {
            let len = session.replica().visible().len();
            if i % 3 == 0 && len > 0 {
                session.submit_local_edit(0, 1, "").unwrap();
            } else {
                session.submit_local_edit(0, 0, "L").unwrap();
            }
            if i % 5 == 0 {
                session.pump().unwrap();
            }
        }

        pump_until_settled(&mut session, &logic_settled);
        session
    });

    let mut input = input.join().unwrap();
    let mut logic = logic.join().unwrap();

    assert_eq!(input.replica().text(), logic.replica().text());
    assert!(input.replica().is_quiescent());
    assert!(logic.replica().is_quiescent());

    // Every one of the 50 appended characters survives at the end
    assert!(input.replica().text().ends_with(&"i".repeat(50)));

    let degraded = input
        .drain_events()
        .into_iter()
        .chain(logic.drain_events())
        .any(|event| matches!(event, ReplicaEvent::SessionDegraded { .. }));
    assert!(!degraded);
}
