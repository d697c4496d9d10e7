//! Scenario 5: two threads hammering the same property slot with two
//! distinct values must never produce an observed intermediate value — only
//! ever exactly one of the values actually written.

use std::thread;

use synthizer_core::property::{PropertyQueue, PropertyValue};

const ITERATIONS: usize = 20_000;

#[test]
fn concurrent_writers_never_produce_an_intermediate_value() {
    let (tx, mut rx) = PropertyQueue::new(4096);
    let tx_a = tx.clone();
    let tx_b = tx.clone();

    let writer_a = thread::spawn(move || {
        for _ in 0..ITERATIONS {
            tx_a.send(0, PropertyValue::Double(0.0));
        }
    });
    let writer_b = thread::spawn(move || {
        for _ in 0..ITERATIONS {
            tx_b.send(0, PropertyValue::Double(1.0));
        }
    });

    let mut observed_any = false;
    for _ in 0..ITERATIONS * 2 {
        rx.drain(|write| {
            observed_any = true;
            match write.value {
                PropertyValue::Double(v) => {
                    assert!(v == 0.0 || v == 1.0, "observed intermediate value {v}");
                }
                other => panic!("unexpected property kind: {other:?}"),
            }
        });
    }

    writer_a.join().unwrap();
    writer_b.join().unwrap();
    rx.drain(|_| observed_any = true);
    assert!(observed_any);
}
