// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide entry point: readiness, creation and event routing.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    fmt,
    pin::Pin,
    rc::{Rc, Weak},
    task::{Context, Poll},
};

use futures::channel::oneshot;
use serde_json::Value;
use snafu::ensure;
use tracing::{debug, info, trace, warn};

use crate::{
    backend::{NativePlayerId, PlayerBackend},
    bridge,
    config::{BindingConfig, EarlyEventPolicy, PlayerConfig},
    err::{
        DuplicateMountSnafu, LibraryDroppedSnafu, MountNotFoundSnafu, PendingQueueFullSnafu,
        Result,
    },
    event::{EventKind, PlayerEvent},
    handle::{HandleInner, Lifecycle, PlayerHandle},
    signal::ReadySignal,
};

struct PendingCreate {
    mount_id: String,
    config:   PlayerConfig,
    reply:    oneshot::Sender<Result<PlayerHandle>>,
}

struct NativeEvent {
    player:  NativePlayerId,
    name:    String,
    payload: Value,
}

pub(crate) struct LibraryInner {
    config:      BindingConfig,
    backend:     ReadySignal<Rc<dyn PlayerBackend>>,
    pending:     RefCell<VecDeque<PendingCreate>>,
    players:     RefCell<HashMap<NativePlayerId, PlayerHandle>>,
    mounts:      RefCell<HashMap<String, NativePlayerId>>,
    inbox:       RefCell<VecDeque<NativeEvent>>,
    dispatching: Cell<bool>,
}

/// The externally loaded player library, as seen from the host.
///
/// Creation requests made before the library signals readiness are queued and
/// run, in call order, by [`PlayerLibrary::library_ready`]. Clones share the
/// same state.
///
/// Callbacks registered in a [`PlayerConfig`] are owned by the library once
/// the creation is requested. A callback that needs the library should capture
/// a [`WeakPlayerLibrary`] from [`PlayerLibrary::downgrade`]; a captured clone
/// keeps the library alive after the host drops it.
///
/// ```
/// use std::rc::Rc;
///
/// use mixdeck_player::{MemoryBackend, PlayerConfig, PlayerLibrary};
///
/// let library = PlayerLibrary::default();
/// let pending = library
///     .create("player", PlayerConfig::builder().video_id("M7lc1UVf-VE".to_string()).build())
///     .unwrap();
///
/// library.library_ready(Rc::new(MemoryBackend::with_mounts(["player"])));
/// let player = futures::executor::block_on(pending).unwrap();
/// assert_eq!(player.mount_id(), "player");
/// ```
#[derive(Clone)]
pub struct PlayerLibrary {
    inner: Rc<LibraryInner>,
}

impl Default for PlayerLibrary {
    fn default() -> Self { Self::new(BindingConfig::default()) }
}

impl PlayerLibrary {
    pub fn new(config: BindingConfig) -> Self {
        Self {
            inner: Rc::new(LibraryInner {
                config,
                backend: ReadySignal::new(),
                pending: RefCell::new(VecDeque::new()),
                players: RefCell::new(HashMap::new()),
                mounts: RefCell::new(HashMap::new()),
                inbox: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    pub fn config(&self) -> &BindingConfig { &self.inner.config }

    /// Non-owning reference, for capture in event callbacks.
    pub fn downgrade(&self) -> WeakPlayerLibrary {
        WeakPlayerLibrary {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn is_ready(&self) -> bool { self.inner.backend.is_fulfilled() }

    /// Resolves once the library is ready; immediately if it already is.
    /// Yields `false` if the library is dropped first.
    pub fn ready(&self) -> impl Future<Output = bool> + 'static {
        let wait = self.inner.backend.wait();
        async move { wait.await.is_some() }
    }

    /// Creation requests waiting for the library.
    pub fn pending_creates(&self) -> usize { self.inner.pending.borrow().len() }

    /// Players created and not yet destroyed.
    pub fn live_players(&self) -> usize { self.inner.players.borrow().len() }

    /// The live player attached to `mount_id`, if any.
    pub fn player_on(&self, mount_id: &str) -> Option<PlayerHandle> {
        let native = self.inner.mounts.borrow().get(mount_id).copied()?;
        self.inner.players.borrow().get(&native).cloned()
    }

    /// Requests a player on `mount_id`.
    ///
    /// The configuration is validated here, before anything reaches the
    /// external library. Mount and duplicate checks need the external library,
    /// so `MountNotFound` and `DuplicateMount` are returned here only once it
    /// is ready; for queued requests they surface through the returned
    /// [`PendingPlayer`].
    pub fn create(&self, mount_id: impl Into<String>, config: PlayerConfig) -> Result<PendingPlayer> {
        let mount_id = mount_id.into();
        config.validate()?;

        if let Some(backend) = self.inner.backend.get().cloned() {
            let handle = self.inner.construct(&backend, mount_id.clone(), config)?;
            return Ok(PendingPlayer::resolved(mount_id, handle));
        }

        let mut pending = self.inner.pending.borrow_mut();
        let capacity = self.inner.config.max_pending_creates;
        ensure!(pending.len() < capacity, PendingQueueFullSnafu { capacity });

        let (reply, rx) = oneshot::channel();
        debug!(%mount_id, position = pending.len(), "library not ready, queueing player creation");
        pending.push_back(PendingCreate {
            mount_id: mount_id.clone(),
            config,
            reply,
        });
        Ok(PendingPlayer::waiting(mount_id, rx))
    }

    /// One-time readiness signal from the external library.
    ///
    /// Runs every queued creation in the order it was requested. Repeated
    /// signals are ignored.
    pub fn library_ready(&self, backend: Rc<dyn PlayerBackend>) {
        if !self.inner.backend.fulfill(Rc::clone(&backend)) {
            warn!("player library signalled ready more than once, ignoring");
            return;
        }

        let queued: Vec<PendingCreate> = self.inner.pending.borrow_mut().drain(..).collect();
        info!(queued = queued.len(), "player library ready");

        for PendingCreate {
            mount_id,
            config,
            reply,
        } in queued
        {
            let result = self.inner.construct(&backend, mount_id.clone(), config);
            if let Err(err) = &result {
                warn!(%mount_id, %err, "queued player creation failed");
            }
            if reply.send(result).is_err() {
                warn!(%mount_id, "creation requester went away, player stays registered");
            }
        }
    }

    /// Routes a native event into the binding.
    ///
    /// Events raised while callbacks are running (including from inside a
    /// callback) are queued and delivered after the current one, in arrival
    /// order. Events for destroyed or unknown players are dropped.
    pub fn dispatch_native(&self, player: NativePlayerId, event: &str, payload: Value) {
        self.inner.inbox.borrow_mut().push_back(NativeEvent {
            player,
            name: event.to_owned(),
            payload,
        });
        if self.inner.dispatching.replace(true) {
            return;
        }

        let _guard = DispatchGuard(&self.inner.dispatching);
        loop {
            let next = self.inner.inbox.borrow_mut().pop_front();
            let Some(event) = next else { break };
            self.inner.deliver(event);
        }
    }

    /// Destroys every live player.
    pub fn destroy_all(&self) {
        let players: Vec<PlayerHandle> = self.inner.players.borrow().values().cloned().collect();
        for player in players {
            player.destroy();
        }
    }
}

impl fmt::Debug for PlayerLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerLibrary")
            .field("ready", &self.is_ready())
            .field("pending_creates", &self.pending_creates())
            .field("live_players", &self.live_players())
            .finish_non_exhaustive()
    }
}

/// Reference to a [`PlayerLibrary`] that does not keep it alive.
#[derive(Clone)]
pub struct WeakPlayerLibrary {
    inner: Weak<LibraryInner>,
}

impl WeakPlayerLibrary {
    /// The library, unless every [`PlayerLibrary`] clone has been dropped.
    pub fn upgrade(&self) -> Option<PlayerLibrary> {
        self.inner.upgrade().map(|inner| PlayerLibrary { inner })
    }
}

impl fmt::Debug for WeakPlayerLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakPlayerLibrary")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Resets the dispatching flag even if a callback panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) { self.0.set(false); }
}

impl LibraryInner {
    fn construct(
        self: &Rc<Self>,
        backend: &Rc<dyn PlayerBackend>,
        mount_id: String,
        config: PlayerConfig,
    ) -> Result<PlayerHandle> {
        ensure!(backend.has_mount(&mount_id), MountNotFoundSnafu { mount_id });
        ensure!(
            !self.mounts.borrow().contains_key(&mount_id),
            DuplicateMountSnafu { mount_id }
        );

        let options = bridge::encode_options(&config)?;
        let native = backend.construct(&mount_id, &options);
        let handle = PlayerHandle::new(HandleInner {
            native,
            mount_id: mount_id.clone(),
            backend: Rc::clone(backend),
            library: Rc::downgrade(self),
            events: RefCell::new(config.events),
            lifecycle: Cell::new(Lifecycle::AwaitingReady),
            early: RefCell::new(VecDeque::new()),
            initial_rate: Cell::new(config.playback_rate),
        });

        self.players.borrow_mut().insert(native, handle.clone());
        self.mounts.borrow_mut().insert(mount_id.clone(), native);
        info!(player = %native, %mount_id, "player created");
        Ok(handle)
    }

    pub(crate) fn unregister(&self, native: NativePlayerId, mount_id: &str) {
        self.players.borrow_mut().remove(&native);
        let mut mounts = self.mounts.borrow_mut();
        if mounts.get(mount_id) == Some(&native) {
            mounts.remove(mount_id);
        }
    }

    fn deliver(&self, event: NativeEvent) {
        let NativeEvent {
            player,
            name,
            payload,
        } = event;

        let target = self.players.borrow().get(&player).cloned();
        let Some(target) = target else {
            debug!(%player, event = %name, "dropping event for unknown or destroyed player");
            return;
        };
        let kind = match bridge::decode_event(&name, &payload) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(%player, %err, "dropping undecodable player event");
                return;
            }
        };

        match (target.inner.lifecycle.get(), kind) {
            (Lifecycle::Destroyed, _) => {}
            (Lifecycle::AwaitingReady, EventKind::Ready) => become_ready(&target),
            (Lifecycle::AwaitingReady, kind) => self.hold_early(&target, kind),
            (Lifecycle::Ready, EventKind::Ready) => {
                warn!(%player, "duplicate ready event ignored");
            }
            (Lifecycle::Ready, kind) => fire(&target, kind),
        }
    }

    fn hold_early(&self, target: &PlayerHandle, kind: EventKind) {
        let player = target.native_id();
        match self.config.early_events {
            EarlyEventPolicy::Drop => {
                debug!(%player, event = %kind.name(), "dropping event received before ready");
            }
            EarlyEventPolicy::Buffer => {
                let mut early = target.inner.early.borrow_mut();
                if early.len() >= self.config.max_early_events {
                    warn!(%player, event = %kind.name(), "early event buffer full, dropping event");
                } else {
                    early.push_back(kind);
                }
            }
        }
    }
}

fn become_ready(target: &PlayerHandle) {
    target.inner.lifecycle.set(Lifecycle::Ready);
    if let Some(rate) = target.inner.initial_rate.take() {
        if let Err(err) = target.set_playback_rate(rate) {
            warn!(player = %target.native_id(), %err, "failed to apply initial playback rate");
        }
    }
    fire(target, EventKind::Ready);

    let early = target.inner.early.take();
    if !early.is_empty() {
        debug!(player = %target.native_id(), count = early.len(), "replaying early events");
    }
    for kind in early {
        if target.is_destroyed() {
            break;
        }
        fire(target, kind);
    }
}

fn fire(target: &PlayerHandle, kind: EventKind) {
    if target.is_destroyed() {
        return;
    }
    let callback = target.inner.events.borrow().callback(kind.name()).cloned();
    let Some(callback) = callback else {
        return;
    };
    trace!(player = %target.native_id(), event = %kind.name(), "delivering event");
    callback(&PlayerEvent {
        target: target.clone(),
        kind,
    });
}

enum Pending {
    Resolved(Option<PlayerHandle>),
    Waiting(oneshot::Receiver<Result<PlayerHandle>>),
}

/// Player whose construction may still be waiting on the library.
///
/// Resolves to the handle, or to the error construction failed with. Resolves
/// to `LibraryDropped` if every [`PlayerLibrary`] clone is dropped before the
/// library became ready. Clones captured by the queued creation's own
/// callbacks count; capture a [`WeakPlayerLibrary`] there instead.
#[must_use = "the handle is only reachable through the pending player"]
pub struct PendingPlayer {
    mount_id: String,
    state:    Pending,
}

impl PendingPlayer {
    fn resolved(mount_id: String, handle: PlayerHandle) -> Self {
        Self {
            mount_id,
            state: Pending::Resolved(Some(handle)),
        }
    }

    fn waiting(mount_id: String, rx: oneshot::Receiver<Result<PlayerHandle>>) -> Self {
        Self {
            mount_id,
            state: Pending::Waiting(rx),
        }
    }

    pub fn mount_id(&self) -> &str { &self.mount_id }

    /// Takes the outcome without waiting. `None` while construction is still
    /// queued, and after the outcome has been taken.
    pub fn try_take(&mut self) -> Option<Result<PlayerHandle>> {
        let outcome = match &mut self.state {
            Pending::Resolved(handle) => handle.take().map(Ok),
            Pending::Waiting(rx) => match rx.try_recv() {
                Ok(None) => return None,
                Ok(Some(result)) => Some(result),
                Err(oneshot::Canceled) => Some(library_dropped(&self.mount_id)),
            },
        };
        self.state = Pending::Resolved(None);
        outcome
    }
}

fn library_dropped(mount_id: &str) -> Result<PlayerHandle> {
    LibraryDroppedSnafu { mount_id }.fail()
}

impl Future for PendingPlayer {
    type Output = Result<PlayerHandle>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let outcome = match &mut this.state {
            Pending::Resolved(handle) => {
                Ok(handle.take().expect("PendingPlayer polled after completion"))
            }
            Pending::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(result)) => result,
                Poll::Ready(Err(oneshot::Canceled)) => library_dropped(&this.mount_id),
            },
        };
        this.state = Pending::Resolved(None);
        Poll::Ready(outcome)
    }
}

impl fmt::Debug for PendingPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            Pending::Resolved(Some(_)) => "resolved",
            Pending::Resolved(None) => "taken",
            Pending::Waiting(_) => "waiting",
        };
        f.debug_struct("PendingPlayer")
            .field("mount_id", &self.mount_id)
            .field("state", &state)
            .finish()
    }
}
