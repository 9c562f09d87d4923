// Many producers and consumers hammering queues with small byte budgets, so
// both sides spend most of their time blocked on each other.

use dmxp_msgq::{Errno, GetFlags, Key, MessageRegistry, MsgFlags, QueueId, RegistryBuilder};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn registry_with_budget(max_bytes: usize) -> Arc<MessageRegistry> {
    Arc::new(
        RegistryBuilder::new()
            .with_default_max_bytes(max_bytes)
            .build()
            .unwrap(),
    )
}

fn open_queue(registry: &MessageRegistry, key: i32) -> QueueId {
    registry
        .get(Key(key), GetFlags::CREATE | GetFlags::mode_bits(0o666))
        .unwrap()
}

// [producer][seq as 4 LE bytes][random filler]
fn encode(producer: u8, seq: u32) -> Vec<u8> {
    let mut body = vec![producer];
    body.extend_from_slice(&seq.to_le_bytes());
    body.extend(std::iter::repeat(0xAB).take(fastrand::usize(0..24)));
    body
}

fn decode(body: &[u8]) -> (u8, u32) {
    (body[0], u32::from_le_bytes([body[1], body[2], body[3], body[4]]))
}

// Panics if parking_lot sees a lock cycle while `done` is unset.
fn spawn_watchdog(done: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !done.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(50));
            let deadlocks = parking_lot::deadlock::check_deadlock();
            if !deadlocks.is_empty() {
                for (i, threads) in deadlocks.iter().enumerate() {
                    for t in threads {
                        eprintln!("deadlock #{i}: thread {:?}\n{:?}", t.thread_id(), t.backtrace());
                    }
                }
                panic!("{} deadlock(s) detected", deadlocks.len());
            }
        }
    })
}

fn wait_for(count: &AtomicUsize, target: usize) {
    let deadline = Instant::now() + Duration::from_secs(60);
    while count.load(Ordering::Acquire) < target {
        assert!(Instant::now() < deadline, "stalled at {} of {target}", count.load(Ordering::Acquire));
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn mpmc_stress_with_small_budget() {
    let registry = registry_with_budget(256);
    let id = open_queue(&registry, 1);

    let producers = 4;
    let consumers = 4;
    let per_producer = 2_000u32;
    let total = producers * per_producer as usize;

    let done = Arc::new(AtomicBool::new(false));
    let consumed = Arc::new(AtomicUsize::new(0));
    let watchdog = spawn_watchdog(done.clone());

    let monitor = {
        let registry = registry.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut samples = 0usize;
            while !done.load(Ordering::Acquire) {
                match registry.stat(id) {
                    Ok(stat) => assert!(stat.cbytes <= stat.qbytes, "{} > {}", stat.cbytes, stat.qbytes),
                    Err(Errno::Removed) => break,
                    Err(e) => panic!("stat failed: {e}"),
                }
                samples += 1;
                thread::yield_now();
            }
            samples
        })
    };

    let mut producer_handles = Vec::new();
    for p in 0..producers {
        let registry = registry.clone();
        producer_handles.push(thread::spawn(move || {
            for seq in 0..per_producer {
                let mtype = fastrand::i64(1..=3);
                registry.send(id, mtype, &encode(p as u8, seq), MsgFlags::empty()).unwrap();
            }
        }));
    }

    let mut consumer_handles = Vec::new();
    for _ in 0..consumers {
        let registry = registry.clone();
        let consumed = consumed.clone();
        consumer_handles.push(thread::spawn(move || {
            let mut seen = 0usize;
            loop {
                // Mix plain, exact and ranged selectors.
                let mtype = match fastrand::u8(0..3) {
                    0 => 0,
                    1 => -3,
                    _ => fastrand::i64(1..=3) * if fastrand::bool() { 1 } else { -1 },
                };
                // Only selectors that accept every type may block; a narrow one
                // could wait behind a full queue of other types forever.
                let flags = if mtype == 0 || mtype == -3 {
                    MsgFlags::empty()
                } else {
                    MsgFlags::NOWAIT
                };
                match registry.receive_owned(id, 64, mtype, flags) {
                    Ok((got, body)) => {
                        assert!((1..=3).contains(&got));
                        assert!(body.len() >= 5);
                        seen += 1;
                        consumed.fetch_add(1, Ordering::AcqRel);
                    }
                    Err(Errno::NoMessage) => thread::yield_now(),
                    Err(Errno::Removed) => return seen,
                    Err(e) => panic!("receive failed: {e}"),
                }
            }
        }));
    }

    for h in producer_handles {
        h.join().unwrap();
    }
    wait_for(&consumed, total);
    registry.remove(id).unwrap();

    let per_consumer: Vec<usize> = consumer_handles.into_iter().map(|h| h.join().unwrap()).collect();
    done.store(true, Ordering::Release);
    let samples = monitor.join().unwrap();
    watchdog.join().unwrap();

    println!("consumed per consumer: {per_consumer:?}, budget samples: {samples}");
    assert_eq!(per_consumer.iter().sum::<usize>(), total);
    assert_eq!(registry.queue_count(), 0);
}

#[test]
fn single_consumer_sees_each_producer_in_order() {
    let registry = registry_with_budget(64);
    let id = open_queue(&registry, 2);

    let producers = 3u8;
    let per_producer = 1_000u32;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let registry = registry.clone();
            thread::spawn(move || {
                for seq in 0..per_producer {
                    registry.send(id, 1, &encode(p, seq), MsgFlags::empty()).unwrap();
                }
            })
        })
        .collect();

    let mut next = vec![0u32; producers as usize];
    for _ in 0..producers as u32 * per_producer {
        let (_, body) = registry.receive_owned(id, 64, 0, MsgFlags::empty()).unwrap();
        let (p, seq) = decode(&body);
        assert_eq!(seq, next[p as usize], "producer {p} out of order");
        next[p as usize] += 1;
    }
    for h in handles {
        h.join().unwrap();
    }

    assert!(next.iter().all(|&n| n == per_producer));
    assert_eq!(registry.stat(id).unwrap().qnum, 0);
}

#[test]
fn typed_consumers_only_take_their_own_type() {
    let registry = registry_with_budget(128);
    let id = open_queue(&registry, 3);

    let lanes = 3i64;
    let per_lane = 500u32;

    let consumers: Vec<_> = (1..=lanes)
        .map(|lane| {
            let registry = registry.clone();
            thread::spawn(move || {
                for expected in 0..per_lane {
                    let (mtype, body) = registry.receive_owned(id, 64, lane, MsgFlags::empty()).unwrap();
                    assert_eq!(mtype, lane);
                    assert_eq!(decode(&body), (lane as u8, expected));
                }
            })
        })
        .collect();

    // One producer interleaving every lane keeps all consumers fed.
    for seq in 0..per_lane {
        for lane in 1..=lanes {
            registry.send(id, lane, &encode(lane as u8, seq), MsgFlags::empty()).unwrap();
        }
    }

    for h in consumers {
        h.join().unwrap();
    }
    assert_eq!(registry.stat(id).unwrap().cbytes, 0);
}
