//! Structural command queue and deferred deletion.
//!
//! Grounded on the teacher's `EngineCommandQueue` (an `Arc<ArrayQueue<_>>`
//! drained once per tick by `drain_command_queue`) and its deferred-cleanup
//! pattern for objects that must not be dropped on the audio thread.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use crossbeam_queue::ArrayQueue;

use crate::effect::Effect;
use crate::handle::Handle;
use crate::router::RouteId;
use crate::source::SourceBase;

/// The constructed object an [`Command::Attach`] transports across the
/// thread boundary into the scheduler's maps.
pub enum AttachPayload {
    /// A fully constructed source, ready to be inserted under its handle.
    Source(SourceBase),
    /// A fully constructed effect, ready to be inserted under its handle.
    Effect(Box<dyn Effect + Send>),
}

/// A structural change to the mixing graph, queued from an external thread
/// and applied atomically at the start of the next audio-thread tick.
pub enum Command {
    /// Attach a newly constructed source/effect into the graph under
    /// `handle`, carrying the object itself.
    Attach(Handle, AttachPayload),
    /// Detach an object from the graph without destroying it.
    Detach(Handle),
    /// Create a route between a source and an effect/destination.
    Route {
        /// Source-side endpoint.
        from: Handle,
        /// Effect/destination-side endpoint.
        to: Handle,
        /// Initial gain to fade in to.
        gain: f32,
        /// Route identity, pre-allocated by the caller.
        id: RouteId,
    },
    /// Begin fading out and removing a route.
    Unroute(RouteId),
    /// Release a handle's last external reference; the object is queued for
    /// background destruction once the audio thread drops its own reference.
    Release(Handle),
}

/// Producer handle for the command queue, cheaply `Clone`-able.
#[derive(Clone)]
pub struct CommandSender {
    queue: Arc<ArrayQueue<Command>>,
}

impl CommandSender {
    /// Enqueues `command`, returning it back on failure if the queue is full
    /// so the caller can decide how to handle backpressure.
    pub fn try_send(&self, command: Command) -> Result<(), Command> {
        self.queue.push(command)
    }
}

/// Consumer half, owned exclusively by the audio thread.
pub struct CommandReceiver {
    queue: Arc<ArrayQueue<Command>>,
}

impl CommandReceiver {
    /// Drains all commands currently queued, applying `apply` to each in
    /// FIFO order. Called once at the start of every tick.
    pub fn drain(&mut self, mut apply: impl FnMut(Command)) {
        while let Some(command) = self.queue.pop() {
            apply(command);
        }
    }
}

/// Splits a fresh command queue into its sender/receiver halves.
pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    let queue = Arc::new(ArrayQueue::new(capacity.max(1)));
    (
        CommandSender {
            queue: queue.clone(),
        },
        CommandReceiver { queue },
    )
}

/// An object whose destructor the audio thread must never run. Pushed onto
/// the deferred-deletion channel instead of being dropped in place.
pub enum Garbage {
    /// A decoded audio buffer, dropped off-thread since freeing a large
    /// allocation can take unbounded time.
    Buffer(Box<dyn std::any::Any + Send>),
}

/// Sending half of the process-wide deferred-deletion channel. The audio
/// thread holds this and pushes garbage here instead of dropping it inline.
#[derive(Clone)]
pub struct DeletionSender {
    tx: Sender<Garbage>,
}

impl DeletionSender {
    /// Hands `garbage` off to the background deletion thread. Never blocks:
    /// the channel is unbounded, trading a small amount of memory for the
    /// guarantee that this call cannot stall the audio thread.
    pub fn retire(&self, garbage: Garbage) {
        // An error here means the background thread has exited, which only
        // happens at process shutdown; dropping in place at that point is
        // harmless since the audio thread is tearing down too.
        let _ = self.tx.send(garbage);
    }
}

/// Owns the background thread that actually drops [`Garbage`]. Join on drop.
///
/// Holds no [`Sender`] of its own: the channel closes (and the thread's
/// `rx.iter()` loop exits) once every [`DeletionSender`] clone handed out by
/// [`DeletionThread::spawn`] has been dropped. Callers that want a clean
/// join must ensure no `DeletionSender` outlives this handle.
pub struct DeletionThread {
    handle: Option<JoinHandle<()>>,
}

impl DeletionThread {
    /// Spawns the background deletion thread and returns it paired with a
    /// [`DeletionSender`] for the audio thread to retire garbage through.
    pub fn spawn() -> (Self, DeletionSender) {
        let (tx, rx): (Sender<Garbage>, Receiver<Garbage>) = unbounded();
        let handle = std::thread::Builder::new()
            .name("syz-deleter".into())
            .spawn(move || {
                for garbage in rx.iter() {
                    drop(garbage);
                }
            })
            .expect("failed to spawn deletion thread");
        (
            Self {
                handle: Some(handle),
            },
            DeletionSender { tx },
        )
    }
}

impl Drop for DeletionThread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
