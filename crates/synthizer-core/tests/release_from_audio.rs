//! Scenario 6: releasing objects from the audio thread must never run their
//! destructors there; the background deletion thread runs them instead,
//! promptly.

use std::sync::mpsc;
use std::time::Duration;

use synthizer_core::command::{DeletionThread, Garbage};

const COUNT: usize = 10_000;

struct Tracked {
    dropped_on: mpsc::Sender<Option<String>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let _ = self
            .dropped_on
            .send(std::thread::current().name().map(str::to_owned));
    }
}

#[test]
fn released_objects_are_dropped_off_the_audio_thread_within_a_second() {
    let (thread, sender) = DeletionThread::spawn();
    let (drop_tx, drop_rx) = mpsc::channel();

    // Simulate the audio thread retiring a batch of released handles: named
    // "syz-audio" so any destructor that actually ran here would be caught.
    let retire_sender = sender.clone();
    let audio_thread = std::thread::Builder::new()
        .name("syz-audio".into())
        .spawn(move || {
            for _ in 0..COUNT {
                let tracked = Tracked {
                    dropped_on: drop_tx.clone(),
                };
                retire_sender.retire(Garbage::Buffer(Box::new(tracked)));
            }
        })
        .unwrap();
    audio_thread.join().unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(1);
    let mut dropped_names = Vec::with_capacity(COUNT);
    while dropped_names.len() < COUNT {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        let name = drop_rx
            .recv_timeout(remaining)
            .expect("deletion thread did not finish within its budget");
        dropped_names.push(name);
    }

    assert!(dropped_names
        .iter()
        .all(|name| name.as_deref() != Some("syz-audio")));
    assert!(dropped_names
        .iter()
        .all(|name| name.as_deref() == Some("syz-deleter")));

    drop(sender);
    drop(thread);
}
