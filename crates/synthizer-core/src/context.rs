//! The root object external code talks to: owns the audio thread and
//! exposes the command/property protocols as its public API surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::backend::AudioBackend;
use crate::command::{self, AttachPayload, Command, CommandSender};
use crate::config::EngineConfig;
use crate::effect::Effect;
use crate::error::SynthizerError;
use crate::events::{event_queue, EventReceiver};
use crate::handle::Handle;
use crate::init;
use crate::property::{self, PropertyEndpoint, PropertyValue};
use crate::router::RouteId;
use crate::scheduler::Scheduler;
use crate::source::{SourceBase, SourceKind};

/// The engine's root handle. Owns the audio thread for its entire lifetime;
/// dropping it signals the thread to stop and joins it.
pub struct Context {
    config: EngineConfig,
    commands: CommandSender,
    events: EventReceiver,
    stop: Arc<AtomicBool>,
    audio_thread: Option<JoinHandle<()>>,
    next_route_id: u64,
    /// Every live handle's property endpoint, registered once its `Attach`
    /// has been sent so `set_property`/`get_property` never need a round
    /// trip through the audio thread to validate a call.
    properties: Arc<Mutex<HashMap<Handle, PropertyEndpoint>>>,
}

impl Context {
    /// Creates a context with the given configuration and backend, spawning
    /// the dedicated audio thread immediately. Implicitly calls
    /// [`init::library_init`].
    pub fn new(config: EngineConfig, backend: Box<dyn AudioBackend>) -> Self {
        init::library_init();

        let (command_tx, command_rx) = command::command_queue(config.command_queue_capacity);
        let (event_tx, event_rx) = event_queue(config.event_queue_capacity);
        let scheduler = Scheduler::new(config, command_rx, event_tx, backend);

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let audio_thread = std::thread::Builder::new()
            .name("syz-audio".into())
            .spawn(move || scheduler.run_forever(thread_stop))
            .expect("failed to spawn audio thread");

        Self {
            config,
            commands: command_tx,
            events: event_rx,
            stop,
            audio_thread: Some(audio_thread),
            next_route_id: 1,
            properties: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The configuration this context was constructed with.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Constructs a source of `kind` with `channels` channels and attaches it
    /// to the running graph, returning the [`Handle`] used to route and
    /// release it and to address its properties via
    /// [`Context::set_property`]/[`Context::get_property`].
    pub fn create_source(&self, channels: usize, kind: SourceKind) -> Result<Handle, SynthizerError> {
        let handle = Handle::allocate();
        let (source, endpoint) = SourceBase::new(
            handle,
            channels,
            self.config.block_size,
            self.config.sample_rate as f64,
            self.config.property_queue_capacity,
            kind,
        );
        self.commands
            .try_send(Command::Attach(handle, AttachPayload::Source(source)))
            .map_err(|_| SynthizerError::ResourceExhausted("command queue"))?;
        // Only registered once the Attach has actually been enqueued, so a
        // failed send never leaves a handle addressable for properties that
        // will never reach the audio thread.
        self.properties.lock().insert(handle, endpoint);
        Ok(handle)
    }

    /// Attaches an already-constructed effect to the running graph,
    /// returning the [`Handle`] used to route into it and release it.
    /// Effects that declare no property table (see
    /// [`Effect::property_endpoint`]) are attached but not registered for
    /// `set_property`/`get_property`.
    pub fn create_effect(&self, effect: Box<dyn Effect + Send>) -> Result<Handle, SynthizerError> {
        let handle = Handle::allocate();
        let endpoint = effect.property_endpoint();
        self.commands
            .try_send(Command::Attach(handle, AttachPayload::Effect(effect)))
            .map_err(|_| SynthizerError::ResourceExhausted("command queue"))?;
        if let Some(endpoint) = endpoint {
            self.properties.lock().insert(handle, endpoint);
        }
        Ok(handle)
    }

    /// Enqueues a write to `handle`'s `name` property, validating it against
    /// the object's schema before it ever reaches the property queue.
    pub fn set_property(
        &self,
        handle: Handle,
        name: &'static str,
        value: PropertyValue,
    ) -> Result<(), SynthizerError> {
        let endpoint = self
            .properties
            .lock()
            .get(&handle)
            .cloned()
            .ok_or(SynthizerError::InvalidHandle)?;
        let slot = property::index_of(endpoint.table, name)
            .ok_or(SynthizerError::UnknownProperty(name))?;
        property::validate(&endpoint.table[slot], &value)?;
        if !endpoint.sender.send(slot, value) {
            return Err(SynthizerError::ResourceExhausted("property queue"));
        }
        Ok(())
    }

    /// Reads `handle`'s `name` property through its coherent shadow view.
    /// Reflects the last write the audio thread has drained, or a value it
    /// advanced itself (e.g. a buffer generator's playback position), never
    /// a value torn mid-update.
    pub fn get_property(&self, handle: Handle, name: &'static str) -> Result<PropertyValue, SynthizerError> {
        let endpoint = self
            .properties
            .lock()
            .get(&handle)
            .cloned()
            .ok_or(SynthizerError::InvalidHandle)?;
        let slot = property::index_of(endpoint.table, name)
            .ok_or(SynthizerError::UnknownProperty(name))?;
        endpoint
            .shadow
            .get(slot)
            .ok_or_else(|| SynthizerError::internal("property schema/shadow length mismatch"))
    }

    /// Creates a route between `from` and `to`, fading in over one block.
    pub fn route(&mut self, from: Handle, to: Handle, gain: f32) -> Result<RouteId, SynthizerError> {
        let id = RouteId(self.next_route_id);
        self.next_route_id += 1;
        self.commands
            .try_send(Command::Route { from, to, gain, id })
            .map(|_| id)
            .map_err(|_| SynthizerError::ResourceExhausted("command queue"))
    }

    /// Begins removing a route, fading out over one block.
    pub fn unroute(&self, id: RouteId) -> Result<(), SynthizerError> {
        self.commands
            .try_send(Command::Unroute(id))
            .map_err(|_| SynthizerError::ResourceExhausted("command queue"))
    }

    /// Releases a handle's last external reference.
    pub fn release(&self, handle: Handle) -> Result<(), SynthizerError> {
        self.commands
            .try_send(Command::Release(handle))
            .map_err(|_| SynthizerError::ResourceExhausted("command queue"))?;
        self.properties.lock().remove(&handle);
        Ok(())
    }

    /// Polls for the next lifecycle event, if any.
    pub fn try_recv_event(&mut self) -> Option<crate::events::Event> {
        self.events.try_recv()
    }

    /// Direct, same-thread access to a freshly built [`Scheduler`] for
    /// offline/test use, bypassing the audio thread entirely. Most host
    /// integrations should use [`Context::new`] instead.
    pub fn build_scheduler(
        config: EngineConfig,
        backend: Box<dyn AudioBackend>,
    ) -> (Scheduler, CommandSender) {
        let (command_tx, command_rx) = command::command_queue(config.command_queue_capacity);
        let (event_tx, _event_rx) = event_queue(config.event_queue_capacity);
        (Scheduler::new(config, command_rx, event_tx, backend), command_tx)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}
