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

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

/// Playback state as reported by the embedded player.
///
/// Discriminants are the native codes carried by `onStateChange` and returned
/// by `getPlayerState`. The binding never infers a state on its own.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    strum_macros::Display,
)]
#[repr(i8)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerState {
    Unstarted = -1,
    Ended = 0,
    Playing = 1,
    Paused = 2,
    Buffering = 3,
    Cued = 5,
}

impl PlayerState {
    /// Maps a native code, `None` for anything outside the documented set.
    pub fn from_code(code: i64) -> Option<Self> {
        i8::try_from(code)
            .ok()
            .and_then(|code| Self::try_from(code).ok())
    }

    pub fn code(self) -> i8 { self.into() }

    /// Whether media is moving or about to (buffering mid-play).
    pub const fn is_active(self) -> bool { matches!(self, Self::Playing | Self::Buffering) }
}

/// Error reported through the player's `onError` event.
///
/// These describe media conditions, not misuse of the binding, and reach the
/// owner as event data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerErrorCode {
    /// The request contained an invalid parameter, e.g. a malformed video id.
    InvalidParameter,
    /// The content cannot be played in an HTML5 player.
    Html5Error,
    /// The video was removed or marked private.
    NotFound,
    /// The owner does not allow embedded playback.
    EmbedNotAllowed,
    /// Same as `EmbedNotAllowed`, reported under a different code.
    EmbedNotAllowedDisguised,
    /// A code this binding does not know about yet.
    Other(i64),
}

impl PlayerErrorCode {
    pub const fn code(self) -> i64 {
        match self {
            Self::InvalidParameter => 2,
            Self::Html5Error => 5,
            Self::NotFound => 100,
            Self::EmbedNotAllowed => 101,
            Self::EmbedNotAllowedDisguised => 150,
            Self::Other(code) => code,
        }
    }

    pub const fn is_embed_restriction(self) -> bool {
        matches!(self, Self::EmbedNotAllowed | Self::EmbedNotAllowedDisguised)
    }
}

impl From<i64> for PlayerErrorCode {
    fn from(code: i64) -> Self {
        match code {
            2 => Self::InvalidParameter,
            5 => Self::Html5Error,
            100 => Self::NotFound,
            101 => Self::EmbedNotAllowed,
            150 => Self::EmbedNotAllowedDisguised,
            other => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_codes_map_to_states() {
        assert_eq!(PlayerState::from_code(-1), Some(PlayerState::Unstarted));
        assert_eq!(PlayerState::from_code(5), Some(PlayerState::Cued));
        assert_eq!(PlayerState::from_code(4), None);
        assert_eq!(PlayerState::from_code(1_000), None);
        assert_eq!(PlayerState::Buffering.code(), 3);
    }

    #[test]
    fn only_playing_and_buffering_are_active() {
        assert!(PlayerState::Playing.is_active());
        assert!(PlayerState::Buffering.is_active());
        assert!(!PlayerState::Paused.is_active());
        assert!(!PlayerState::Cued.is_active());
    }

    #[test]
    fn unknown_error_codes_are_preserved() {
        assert_eq!(PlayerErrorCode::from(101), PlayerErrorCode::EmbedNotAllowed);
        assert_eq!(PlayerErrorCode::from(7), PlayerErrorCode::Other(7));
        assert_eq!(PlayerErrorCode::from(7).code(), 7);
        assert!(PlayerErrorCode::from(150).is_embed_restriction());
        assert!(!PlayerErrorCode::NotFound.is_embed_restriction());
    }
}
