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

use crate::{
    handle::PlayerHandle,
    state::{PlayerErrorCode, PlayerState},
};

/// Native name of each lifecycle event, as used in the `events` option.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum EventName {
    #[strum(serialize = "onReady")]
    Ready,
    #[strum(serialize = "onStateChange")]
    StateChange,
    #[strum(serialize = "onPlaybackQualityChange")]
    PlaybackQualityChange,
    #[strum(serialize = "onPlaybackRateChange")]
    PlaybackRateChange,
    #[strum(serialize = "onError")]
    Error,
    #[strum(serialize = "onApiChange")]
    ApiChange,
}

impl EventName {
    pub fn as_native(self) -> &'static str { self.into() }
}

/// Decoded payload of a player event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    Ready,
    StateChange(PlayerState),
    /// Suggested quality level now in effect, e.g. `"hd720"`.
    PlaybackQualityChange(String),
    PlaybackRateChange(f64),
    Error(PlayerErrorCode),
    /// A module (captions, for instance) was loaded or unloaded.
    ApiChange,
}

impl EventKind {
    pub const fn name(&self) -> EventName {
        match self {
            Self::Ready => EventName::Ready,
            Self::StateChange(_) => EventName::StateChange,
            Self::PlaybackQualityChange(_) => EventName::PlaybackQualityChange,
            Self::PlaybackRateChange(_) => EventName::PlaybackRateChange,
            Self::Error(_) => EventName::Error,
            Self::ApiChange => EventName::ApiChange,
        }
    }
}

/// Event record handed to callbacks.
#[derive(Clone, Debug)]
pub struct PlayerEvent {
    /// Player the event originated from. Commands may be issued on it directly.
    pub target: PlayerHandle,
    pub kind:   EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_names_round_trip() {
        for name in <EventName as strum::IntoEnumIterator>::iter() {
            assert_eq!(name.as_native().parse::<EventName>().unwrap(), name);
        }
        assert_eq!(EventName::PlaybackRateChange.as_native(), "onPlaybackRateChange");
        assert!("onVolumeChange".parse::<EventName>().is_err());
    }

    #[test]
    fn kinds_report_their_name() {
        assert_eq!(
            EventKind::StateChange(PlayerState::Paused).name(),
            EventName::StateChange
        );
        assert_eq!(
            EventKind::Error(PlayerErrorCode::NotFound).name(),
            EventName::Error
        );
    }
}
