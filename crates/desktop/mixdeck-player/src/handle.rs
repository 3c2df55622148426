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

//! Typed façade over one constructed player.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
};

use serde_json::Value;
use snafu::ensure;
use tracing::{debug, info};

use crate::{
    backend::{NativePlayerId, PlayerBackend},
    bridge,
    command::{Command, Query, VideoLoad},
    config::PlayerEvents,
    err::{HandleDestroyedSnafu, Result},
    event::EventKind,
    library::LibraryInner,
    state::PlayerState,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    /// Constructed, `onReady` not yet seen.
    AwaitingReady,
    Ready,
    Destroyed,
}

pub(crate) struct HandleInner {
    pub(crate) native:       NativePlayerId,
    pub(crate) mount_id:     String,
    pub(crate) backend:      Rc<dyn PlayerBackend>,
    pub(crate) library:      Weak<LibraryInner>,
    pub(crate) events:       RefCell<PlayerEvents>,
    pub(crate) lifecycle:    Cell<Lifecycle>,
    /// Events that arrived before `onReady`, replayed right after it.
    pub(crate) early:        RefCell<VecDeque<EventKind>>,
    /// Rate requested at creation, applied once the player is ready.
    pub(crate) initial_rate: Cell<Option<f64>>,
}

/// Handle to one external player.
///
/// Clones are cheap and all refer to the same player. Dropping every clone
/// does not tear the player down: the library keeps it registered until
/// [`PlayerHandle::destroy`] or [`PlayerLibrary::destroy_all`](crate::PlayerLibrary::destroy_all).
#[derive(Clone)]
pub struct PlayerHandle {
    pub(crate) inner: Rc<HandleInner>,
}

impl PlayerHandle {
    pub(crate) fn new(inner: HandleInner) -> Self {
        Self {
            inner: Rc::new(inner),
        }
    }

    pub fn mount_id(&self) -> &str { &self.inner.mount_id }

    pub fn native_id(&self) -> NativePlayerId { self.inner.native }

    pub fn is_ready(&self) -> bool { self.inner.lifecycle.get() == Lifecycle::Ready }

    pub fn is_destroyed(&self) -> bool { self.inner.lifecycle.get() == Lifecycle::Destroyed }

    /// Whether both handles refer to the same player.
    pub fn same_player(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }

    fn ensure_alive(&self) -> Result<()> {
        ensure!(
            !self.is_destroyed(),
            HandleDestroyedSnafu {
                mount_id: self.inner.mount_id.clone(),
            }
        );
        Ok(())
    }

    /// Validates and forwards a command to the external player.
    pub fn send(&self, command: Command) -> Result<()> {
        self.ensure_alive()?;
        command.validate()?;
        let call = bridge::encode_command(&command);
        debug!(player = %self.inner.native, method = call.method, "sending command");
        self.inner.backend.call(self.inner.native, &call);
        Ok(())
    }

    pub fn play(&self) -> Result<()> { self.send(Command::Play) }

    pub fn pause(&self) -> Result<()> { self.send(Command::Pause) }

    pub fn stop(&self) -> Result<()> { self.send(Command::Stop) }

    pub fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> Result<()> {
        self.send(Command::SeekTo {
            seconds,
            allow_seek_ahead,
        })
    }

    /// Loads and starts playing a video by id.
    ///
    /// ```no_run
    /// # fn demo(player: &mixdeck_player::PlayerHandle) -> mixdeck_player::Result<()> {
    /// use mixdeck_player::VideoLoad;
    ///
    /// player.load_video_by_id("M7lc1UVf-VE")?;
    /// player.load_video_by_id(VideoLoad::new("M7lc1UVf-VE").start_seconds(30.0).build())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_video_by_id(&self, video: impl Into<VideoLoad>) -> Result<()> {
        self.send(Command::LoadVideoById(video.into()))
    }

    pub fn load_video_by_url(&self, media: impl Into<VideoLoad>) -> Result<()> {
        self.send(Command::LoadVideoByUrl(media.into()))
    }

    /// Like [`Self::load_video_by_id`] but stops at the thumbnail until played.
    pub fn cue_video_by_id(&self, video: impl Into<VideoLoad>) -> Result<()> {
        self.send(Command::CueVideoById(video.into()))
    }

    pub fn cue_video_by_url(&self, media: impl Into<VideoLoad>) -> Result<()> {
        self.send(Command::CueVideoByUrl(media.into()))
    }

    /// Volume in `0..=100`.
    pub fn set_volume(&self, volume: u8) -> Result<()> { self.send(Command::SetVolume(volume)) }

    pub fn mute(&self) -> Result<()> { self.send(Command::Mute) }

    pub fn unmute(&self) -> Result<()> { self.send(Command::Unmute) }

    /// Suggested rate. The player may round it to one of
    /// [`Self::available_playback_rates`] and reports the outcome through
    /// `PlaybackRateChange`.
    pub fn set_playback_rate(&self, rate: f64) -> Result<()> {
        self.send(Command::SetPlaybackRate(rate))
    }

    pub fn set_playback_quality(&self, quality: impl Into<String>) -> Result<()> {
        self.send(Command::SetPlaybackQuality(quality.into()))
    }

    /// Playlist looping.
    pub fn set_loop(&self, enabled: bool) -> Result<()> { self.send(Command::SetLoop(enabled)) }

    pub fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetShuffle(enabled))
    }

    pub fn set_size(&self, width: u32, height: u32) -> Result<()> {
        self.send(Command::SetSize { width, height })
    }

    pub fn next_video(&self) -> Result<()> { self.send(Command::NextVideo) }

    pub fn previous_video(&self) -> Result<()> { self.send(Command::PreviousVideo) }

    fn query(&self, query: Query) -> Result<Value> {
        self.ensure_alive()?;
        Ok(self.inner.backend.query(self.inner.native, query.method()))
    }

    fn query_as<T: serde::de::DeserializeOwned>(&self, query: Query) -> Result<T> {
        bridge::decode_reply(query, &self.query(query)?)
    }

    /// Elapsed seconds since the start of the video.
    pub fn current_time(&self) -> Result<f64> { self.query_as(Query::CurrentTime) }

    /// Seconds; `0` until the video metadata has loaded.
    pub fn duration(&self) -> Result<f64> { self.query_as(Query::Duration) }

    pub fn playback_rate(&self) -> Result<f64> { self.query_as(Query::PlaybackRate) }

    pub fn playback_quality(&self) -> Result<String> { self.query_as(Query::PlaybackQuality) }

    pub fn available_quality_levels(&self) -> Result<Vec<String>> {
        self.query_as(Query::AvailableQualityLevels)
    }

    pub fn available_playback_rates(&self) -> Result<Vec<f64>> {
        self.query_as(Query::AvailablePlaybackRates)
    }

    pub fn volume(&self) -> Result<u8> { self.query_as(Query::Volume) }

    pub fn is_muted(&self) -> Result<bool> { self.query_as(Query::IsMuted) }

    /// Fraction of the video buffered so far, in `0.0..=1.0`.
    pub fn video_loaded_fraction(&self) -> Result<f64> {
        self.query_as(Query::VideoLoadedFraction)
    }

    pub fn video_url(&self) -> Result<String> { self.query_as(Query::VideoUrl) }

    pub fn video_embed_code(&self) -> Result<String> { self.query_as(Query::VideoEmbedCode) }

    pub fn player_state(&self) -> Result<PlayerState> {
        bridge::decode_state(&self.query(Query::PlayerState)?)
    }

    /// Tears the player down and releases its frame.
    ///
    /// Idempotent. Pending and future events for this player are discarded,
    /// including ones already queued behind the event currently being
    /// delivered.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if inner.lifecycle.replace(Lifecycle::Destroyed) == Lifecycle::Destroyed {
            return;
        }
        inner.backend.destroy(inner.native);
        inner.early.borrow_mut().clear();
        let callbacks = inner.events.take();
        if let Some(library) = inner.library.upgrade() {
            library.unregister(inner.native, &inner.mount_id);
        }
        info!(player = %inner.native, mount_id = %inner.mount_id, "player destroyed");
        drop(callbacks);
    }
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("native", &self.inner.native)
            .field("mount_id", &self.inner.mount_id)
            .field("lifecycle", &self.inner.lifecycle.get())
            .finish_non_exhaustive()
    }
}
