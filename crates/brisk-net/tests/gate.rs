//! Dispatch gate and dispatcher behavior under load

use brisk_net::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transport that sleeps per request and records peak concurrency
struct SlowTransport {
    delay: Duration,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Transport for SlowTransport {
    fn execute(&self, request: Request) -> BoxFuture<Result<Response, NetError>> {
        let delay = self.delay;
        let running = self.running.clone();
        let peak = self.peak.clone();
        Box::pin(async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            smol::Timer::after(delay).await;
            running.fetch_sub(1, Ordering::SeqCst);
            if request.url.ends_with("/fail") {
                Ok(Response::with_status(500, "nope"))
            } else {
                Ok(Response::ok(request.url))
            }
        })
    }
}

// ============================================================================
// GATE
// ============================================================================

#[test]
fn test_gate_never_exceeds_cap() {
    let cap = 6;
    let extra = 5;
    let gate = DispatchGate::new(cap);
    let completed = Arc::new(AtomicUsize::new(0));
    let samples = Arc::new(Mutex::new(Vec::new()));

    smol::block_on(async {
        let tasks: Vec<_> = (0..cap + extra)
            .map(|_| {
                let gate = gate.clone();
                let completed = completed.clone();
                let samples = samples.clone();
                smol::spawn(async move {
                    gate.run(async {
                        samples.lock().unwrap().push(gate.in_flight());
                        smol::Timer::after(Duration::from_millis(10)).await;
                        completed.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
                })
            })
            .collect();
        for task in tasks {
            task.await;
        }
    });

    assert_eq!(completed.load(Ordering::SeqCst), cap + extra);
    assert!(samples.lock().unwrap().iter().all(|&n| n <= cap));
    assert!(gate.peak() <= cap);
    assert_eq!(gate.in_flight(), 0);
    assert_eq!(gate.total_admitted(), cap + extra);
}

#[test]
fn test_waiting_admission_proceeds_after_release() {
    let gate = DispatchGate::new(1);
    let held = gate.try_admit().unwrap();
    let waiter = {
        let gate = gate.clone();
        smol::spawn(async move {
            let _admission = gate.admit().await;
            gate.in_flight()
        })
    };
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(gate.in_flight(), 1);
    drop(held);
    assert_eq!(smol::block_on(waiter), 1);
}

// ============================================================================
// DISPATCHER
// ============================================================================

#[test]
fn test_dispatcher_bounds_transport_concurrency() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let transport = SlowTransport {
        delay: Duration::from_millis(15),
        running: running.clone(),
        peak: peak.clone(),
    };
    let mut dispatcher = Dispatcher::new(Arc::new(transport), DispatchGate::new(3));

    let tickets: Vec<Ticket> = (0..10)
        .map(|i| dispatcher.submit(Request::get(&format!("https://example.com/{i}"))))
        .collect();
    assert_eq!(dispatcher.outstanding(), 10);

    let mut seen = Vec::new();
    smol::block_on(async {
        while let Some(completion) = dispatcher.next().await {
            assert!(completion.result.is_ok());
            seen.push(completion.ticket);
        }
    });

    seen.sort();
    assert_eq!(seen, tickets);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert_eq!(dispatcher.gate().in_flight(), 0);
    assert_eq!(dispatcher.outstanding(), 0);
}

#[test]
fn test_error_status_releases_slot() {
    let transport = SlowTransport {
        delay: Duration::from_millis(1),
        running: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    };
    let mut dispatcher = Dispatcher::new(Arc::new(transport), DispatchGate::new(1));
    dispatcher.submit(Request::get("https://example.com/fail"));
    dispatcher.submit(Request::get("https://example.com/ok"));

    let results: Vec<_> = smol::block_on(async {
        let mut out = Vec::new();
        while let Some(c) = dispatcher.next().await {
            out.push(c.result);
        }
        out
    });

    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|r| matches!(r, Err(NetError::HttpError { status: 500, .. }))));
    assert!(results.iter().any(|r| r.is_ok()));
    assert_eq!(dispatcher.gate().in_flight(), 0);
}

#[test]
fn test_try_next_empty() {
    let transport = SlowTransport {
        delay: Duration::from_millis(1),
        running: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    };
    let mut dispatcher = Dispatcher::new(Arc::new(transport), DispatchGate::default());
    assert!(dispatcher.try_next().is_none());
    assert!(smol::block_on(dispatcher.next()).is_none());
}
