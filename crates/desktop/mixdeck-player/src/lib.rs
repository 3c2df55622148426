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

//! Typed binding over an externally loaded YouTube IFrame player library.
//!
//! The external library loads asynchronously and announces itself once
//! through [`PlayerLibrary::library_ready`]. Players requested earlier are
//! queued and constructed in request order at that point. Each constructed
//! player is driven through a [`PlayerHandle`]:
//!
//! - commands ([`PlayerHandle::play`], [`PlayerHandle::seek_to`], ...) are
//!   validated and forwarded fire-and-forget,
//! - queries ([`PlayerHandle::current_time`], ...) read what the player last
//!   reported,
//! - lifecycle callbacks registered in [`PlayerEvents`] receive a
//!   [`PlayerEvent`]; `Ready` always comes first,
//! - [`PlayerHandle::destroy`] releases the player, after which every command
//!   and query fails with [`Error::HandleDestroyed`] and no further event is
//!   delivered.
//!
//! Everything here is single-threaded. The external library sits behind
//! [`PlayerBackend`]; [`MemoryBackend`] is a headless implementation.
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use futures::executor::block_on;
//! use mixdeck_player::{
//!     EventKind, MemoryBackend, PlayerConfig, PlayerEvents, PlayerLibrary, PlayerState,
//! };
//! use serde_json::json;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let events = PlayerEvents::new()
//!     .on_ready(|event| event.target.play().unwrap())
//!     .on_state_change({
//!         let seen = Rc::clone(&seen);
//!         move |event| seen.borrow_mut().push(event.kind.clone())
//!     });
//!
//! let library = PlayerLibrary::default();
//! let pending = library
//!     .create(
//!         "player",
//!         PlayerConfig::builder()
//!             .video_id("M7lc1UVf-VE".to_string())
//!             .events(events)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let backend = Rc::new(MemoryBackend::with_mounts(["player"]));
//! library.library_ready(backend.clone());
//! let player = block_on(pending).unwrap();
//!
//! library.dispatch_native(player.native_id(), "onReady", json!(null));
//! library.dispatch_native(player.native_id(), "onStateChange", json!(1));
//!
//! assert_eq!(player.player_state().unwrap(), PlayerState::Playing);
//! assert_eq!(*seen.borrow(), [EventKind::StateChange(PlayerState::Playing)]);
//! ```

mod backend;
mod bridge;
mod command;
mod config;
mod err;
mod event;
mod handle;
mod library;
mod memory;
mod signal;
mod state;

pub use backend::{NativePlayerId, PlayerBackend};
pub use bridge::NativeCall;
pub use command::{Command, Query, VideoLoad};
pub use config::{
    BindingConfig, Dimension, EarlyEventPolicy, EventCallback, PlayerConfig, PlayerEvents,
    PlayerVars,
};
pub use err::{Error, Result};
pub use event::{EventKind, EventName, PlayerEvent};
pub use handle::PlayerHandle;
pub use library::{PendingPlayer, PlayerLibrary, WeakPlayerLibrary};
pub use memory::{MemoryBackend, RecordedCall};
pub use signal::ReadySignal;
pub use state::{PlayerErrorCode, PlayerState};
