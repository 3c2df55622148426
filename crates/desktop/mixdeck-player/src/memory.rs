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

//! In-process stand-in for the external player library.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use serde_json::{Value, json};
use tracing::trace;

use crate::{
    backend::{NativePlayerId, PlayerBackend},
    bridge::NativeCall,
    state::PlayerState,
};

/// One call made through the [`PlayerBackend`] surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Construct {
        player:   NativePlayerId,
        mount_id: String,
        options:  Value,
    },
    Call {
        player: NativePlayerId,
        call:   NativeCall,
    },
    Query {
        player: NativePlayerId,
        method: &'static str,
    },
    Destroy {
        player: NativePlayerId,
    },
}

impl RecordedCall {
    pub const fn player(&self) -> NativePlayerId {
        match self {
            Self::Construct { player, .. }
            | Self::Call { player, .. }
            | Self::Query { player, .. }
            | Self::Destroy { player } => *player,
        }
    }
}

/// Headless [`PlayerBackend`].
///
/// Records every call, answers getters from a per-player reply table, and
/// updates that table for commands with an obvious effect (volume, mute,
/// seeking, loading). Replies can be scripted with
/// [`MemoryBackend::set_reply`]. Events are never raised on its own; the host
/// feeds them through [`PlayerLibrary::dispatch_native`](crate::PlayerLibrary::dispatch_native).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RefCell<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    mounts:  BTreeSet<String>,
    next_id: u64,
    players: BTreeMap<NativePlayerId, MemoryPlayer>,
    log:     Vec<RecordedCall>,
}

#[derive(Debug)]
struct MemoryPlayer {
    mount_id:  String,
    destroyed: bool,
    replies:   HashMap<&'static str, Value>,
}

impl MemoryPlayer {
    fn new(mount_id: &str, options: &Value) -> Self {
        let replies = HashMap::from([
            ("getCurrentTime", json!(0.0)),
            ("getDuration", json!(0.0)),
            ("getPlaybackRate", json!(1.0)),
            ("getPlaybackQuality", json!("default")),
            ("getAvailableQualityLevels", json!([])),
            ("getAvailablePlaybackRates", json!([0.25, 0.5, 1.0, 1.5, 2.0])),
            ("getVolume", json!(100)),
            ("isMuted", json!(false)),
            ("getVideoLoadedFraction", json!(0.0)),
            ("getVideoUrl", json!("")),
            ("getVideoEmbedCode", json!("")),
            ("getPlayerState", json!(PlayerState::Unstarted.code())),
        ]);
        let mut player = Self {
            mount_id: mount_id.to_owned(),
            destroyed: false,
            replies,
        };
        if let Some(video_id) = options.get("videoId").and_then(Value::as_str) {
            player.show_video(video_id);
            player.set("getPlayerState", json!(PlayerState::Cued.code()));
        }
        player
    }

    fn set(&mut self, method: &'static str, value: Value) { self.replies.insert(method, value); }

    fn show_video(&mut self, video_id: &str) {
        self.set(
            "getVideoUrl",
            json!(format!("https://www.youtube.com/watch?v={video_id}")),
        );
        self.set(
            "getVideoEmbedCode",
            json!(format!(
                r#"<iframe src="https://www.youtube.com/embed/{video_id}" allowfullscreen></iframe>"#
            )),
        );
    }

    fn apply(&mut self, call: &NativeCall) {
        let arg = |index: usize| call.args.get(index).cloned().unwrap_or(Value::Null);
        match call.method {
            "playVideo" => self.set("getPlayerState", json!(PlayerState::Playing.code())),
            "pauseVideo" => self.set("getPlayerState", json!(PlayerState::Paused.code())),
            "stopVideo" => self.set("getPlayerState", json!(PlayerState::Unstarted.code())),
            "seekTo" => self.set("getCurrentTime", arg(0)),
            "setVolume" => self.set("getVolume", arg(0)),
            "mute" => self.set("isMuted", json!(true)),
            "unMute" => self.set("isMuted", json!(false)),
            "setPlaybackRate" => self.set("getPlaybackRate", arg(0)),
            "setPlaybackQuality" => self.set("getPlaybackQuality", arg(0)),
            "loadVideoById" | "cueVideoById" | "loadVideoByUrl" | "cueVideoByUrl" => {
                let cued = call.method.starts_with("cue");
                let (target, start) = load_target(&call.args);
                if let Some(target) = target {
                    if call.method.ends_with("ById") {
                        self.show_video(&target);
                    } else {
                        self.set("getVideoUrl", json!(target));
                    }
                }
                self.set("getCurrentTime", json!(start));
                let state = if cued {
                    PlayerState::Cued
                } else {
                    PlayerState::Playing
                };
                self.set("getPlayerState", json!(state.code()));
            }
            _ => {}
        }
    }
}

/// Target and start offset from either the positional or the object form of
/// a load/cue call.
fn load_target(args: &[Value]) -> (Option<String>, f64) {
    match args.first() {
        Some(Value::Object(obj)) => {
            let target = obj
                .get("videoId")
                .or_else(|| obj.get("mediaContentUrl"))
                .and_then(Value::as_str)
                .map(str::to_owned);
            let start = obj
                .get("startSeconds")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            (target, start)
        }
        Some(Value::String(target)) => {
            let start = args.get(1).and_then(Value::as_f64).unwrap_or(0.0);
            (Some(target.clone()), start)
        }
        _ => (None, 0.0),
    }
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }

    /// Backend whose document already contains the given mount points.
    pub fn with_mounts<I, S>(mounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        for mount in mounts {
            backend.add_mount(mount);
        }
        backend
    }

    pub fn add_mount(&self, mount_id: impl Into<String>) {
        self.state.borrow_mut().mounts.insert(mount_id.into());
    }

    pub fn remove_mount(&self, mount_id: &str) -> bool {
        self.state.borrow_mut().mounts.remove(mount_id)
    }

    /// Overrides what the getter `method` returns for `player`.
    pub fn set_reply(&self, player: NativePlayerId, method: &'static str, value: Value) {
        if let Some(player) = self.state.borrow_mut().players.get_mut(&player) {
            player.set(method, value);
        }
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> { self.state.borrow().log.clone() }

    /// Commands sent to `player`, oldest first.
    pub fn commands(&self, player: NativePlayerId) -> Vec<NativeCall> {
        self.state
            .borrow()
            .log
            .iter()
            .filter_map(|entry| match entry {
                RecordedCall::Call { player: p, call } if *p == player => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Native options `player` was constructed with.
    pub fn options(&self, player: NativePlayerId) -> Option<Value> {
        self.state.borrow().log.iter().find_map(|entry| match entry {
            RecordedCall::Construct {
                player: p, options, ..
            } if *p == player => Some(options.clone()),
            _ => None,
        })
    }

    /// Mount point `player` was attached to.
    pub fn mount_of(&self, player: NativePlayerId) -> Option<String> {
        self.state
            .borrow()
            .players
            .get(&player)
            .map(|p| p.mount_id.clone())
    }

    pub fn constructed(&self) -> usize { self.state.borrow().players.len() }

    pub fn is_destroyed(&self, player: NativePlayerId) -> bool {
        self.state
            .borrow()
            .players
            .get(&player)
            .is_some_and(|p| p.destroyed)
    }
}

impl PlayerBackend for MemoryBackend {
    fn has_mount(&self, mount_id: &str) -> bool { self.state.borrow().mounts.contains(mount_id) }

    fn construct(&self, mount_id: &str, options: &Value) -> NativePlayerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let player = NativePlayerId(state.next_id);
        state
            .players
            .insert(player, MemoryPlayer::new(mount_id, options));
        state.log.push(RecordedCall::Construct {
            player,
            mount_id: mount_id.to_owned(),
            options: options.clone(),
        });
        trace!(%player, mount_id, "constructed in-memory player");
        player
    }

    fn call(&self, player: NativePlayerId, call: &NativeCall) {
        let mut state = self.state.borrow_mut();
        if let Some(target) = state.players.get_mut(&player).filter(|p| !p.destroyed) {
            target.apply(call);
        }
        state.log.push(RecordedCall::Call {
            player,
            call: call.clone(),
        });
    }

    fn query(&self, player: NativePlayerId, method: &'static str) -> Value {
        let mut state = self.state.borrow_mut();
        state.log.push(RecordedCall::Query { player, method });
        state
            .players
            .get(&player)
            .and_then(|p| p.replies.get(method).cloned())
            .unwrap_or(Value::Null)
    }

    fn destroy(&self, player: NativePlayerId) {
        let mut state = self.state.borrow_mut();
        if let Some(target) = state.players.get_mut(&player) {
            target.destroyed = true;
        }
        state.log.push(RecordedCall::Destroy { player });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: &'static str, args: Vec<Value>) -> NativeCall {
        NativeCall {
            method,
            args,
        }
    }

    #[test]
    fn commands_update_replies() {
        let backend = MemoryBackend::with_mounts(["a"]);
        let id = backend.construct("a", &json!({ "videoId": "M7lc1UVf-VE" }));

        assert_eq!(
            backend.query(id, "getVideoUrl"),
            json!("https://www.youtube.com/watch?v=M7lc1UVf-VE")
        );
        assert_eq!(backend.query(id, "getPlayerState"), json!(5));

        backend.call(id, &call("setVolume", vec![json!(30)]));
        backend.call(id, &call("mute", vec![]));
        backend.call(id, &call("seekTo", vec![json!(12.5), json!(true)]));
        assert_eq!(backend.query(id, "getVolume"), json!(30));
        assert_eq!(backend.query(id, "isMuted"), json!(true));
        assert_eq!(backend.query(id, "getCurrentTime"), json!(12.5));
    }

    #[test]
    fn load_accepts_object_form() {
        let backend = MemoryBackend::with_mounts(["a"]);
        let id = backend.construct("a", &json!({}));
        backend.call(
            id,
            &call(
                "loadVideoByUrl",
                vec![json!({
                    "mediaContentUrl": "https://www.youtube.com/v/bHQqvYy5KYo",
                    "startSeconds": 4.0,
                    "endSeconds": 10.0,
                })],
            ),
        );
        assert_eq!(
            backend.query(id, "getVideoUrl"),
            json!("https://www.youtube.com/v/bHQqvYy5KYo")
        );
        assert_eq!(backend.query(id, "getCurrentTime"), json!(4.0));
        assert_eq!(backend.query(id, "getPlayerState"), json!(1));
    }

    #[test]
    fn destroyed_players_ignore_commands_but_keep_the_log() {
        let backend = MemoryBackend::with_mounts(["a"]);
        let id = backend.construct("a", &json!({}));
        backend.destroy(id);
        backend.call(id, &call("setVolume", vec![json!(5)]));

        assert!(backend.is_destroyed(id));
        assert_eq!(backend.query(id, "getVolume"), json!(100));
        assert_eq!(backend.commands(id).len(), 1);
        assert_eq!(backend.mount_of(id).as_deref(), Some("a"));
    }

    #[test]
    fn unknown_players_answer_null() {
        let backend = MemoryBackend::new();
        assert!(!backend.has_mount("a"));
        assert_eq!(backend.query(NativePlayerId(9), "getVolume"), Value::Null);
        assert_eq!(backend.calls()[0].player(), NativePlayerId(9));
    }
}
