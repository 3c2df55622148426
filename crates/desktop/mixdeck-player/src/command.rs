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

//! Closed set of imperative operations and synchronous reads.

use snafu::ensure;

use crate::{
    config::non_negative,
    err::{InvalidConfigSnafu, Result},
};

/// Video to load or cue, by id or by media URL depending on the command.
#[derive(Debug, Clone, PartialEq, bon::Builder)]
#[builder(on(String, into), start_fn = new)]
pub struct VideoLoad {
    #[builder(start_fn)]
    pub target:        String,
    pub start_seconds: Option<f64>,
    pub end_seconds:   Option<f64>,
}

impl From<&str> for VideoLoad {
    fn from(target: &str) -> Self { Self::new(target).build() }
}

impl VideoLoad {
    fn validate(&self, field: &'static str) -> Result<()> {
        ensure!(
            !self.target.trim().is_empty(),
            InvalidConfigSnafu {
                field,
                reason: "must not be blank",
            }
        );
        if let Some(start) = self.start_seconds {
            non_negative("startSeconds", start)?;
        }
        if let Some(end) = self.end_seconds {
            non_negative("endSeconds", end)?;
            if let Some(start) = self.start_seconds {
                ensure!(
                    end > start,
                    InvalidConfigSnafu {
                        field:  "endSeconds",
                        reason: format!("{end} does not come after startSeconds {start}"),
                    }
                );
            }
        }
        Ok(())
    }
}

/// Commands are fire-and-forget: their effect is observed through events.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    SeekTo {
        seconds:          f64,
        /// Allow a request to the server when seeking past the buffered range.
        allow_seek_ahead: bool,
    },
    LoadVideoById(VideoLoad),
    LoadVideoByUrl(VideoLoad),
    CueVideoById(VideoLoad),
    CueVideoByUrl(VideoLoad),
    /// Volume in `0..=100`.
    SetVolume(u8),
    Mute,
    Unmute,
    SetPlaybackRate(f64),
    SetPlaybackQuality(String),
    SetLoop(bool),
    SetShuffle(bool),
    SetSize {
        width:  u32,
        height: u32,
    },
    NextVideo,
    PreviousVideo,
}

impl Command {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::SeekTo { seconds, .. } => non_negative("seconds", *seconds),
            Self::LoadVideoById(load) | Self::CueVideoById(load) => load.validate("videoId"),
            Self::LoadVideoByUrl(load) | Self::CueVideoByUrl(load) => {
                load.validate("mediaContentUrl")
            }
            Self::SetVolume(volume) => {
                ensure!(
                    *volume <= 100,
                    InvalidConfigSnafu {
                        field:  "volume",
                        reason: format!("{volume} is outside 0..=100"),
                    }
                );
                Ok(())
            }
            Self::SetPlaybackRate(rate) => non_negative("suggestedRate", *rate),
            Self::SetPlaybackQuality(quality) => {
                ensure!(
                    !quality.trim().is_empty(),
                    InvalidConfigSnafu {
                        field:  "suggestedQuality",
                        reason: "must not be blank",
                    }
                );
                Ok(())
            }
            Self::Play
            | Self::Pause
            | Self::Stop
            | Self::Mute
            | Self::Unmute
            | Self::SetLoop(_)
            | Self::SetShuffle(_)
            | Self::SetSize { .. }
            | Self::NextVideo
            | Self::PreviousVideo => Ok(()),
        }
    }
}

/// Synchronous reads. Values are whatever the player last reported and may
/// lag behind commands that have not taken effect yet.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::IntoStaticStr,
)]
pub enum Query {
    #[strum(serialize = "getCurrentTime")]
    CurrentTime,
    #[strum(serialize = "getDuration")]
    Duration,
    #[strum(serialize = "getPlaybackRate")]
    PlaybackRate,
    #[strum(serialize = "getPlaybackQuality")]
    PlaybackQuality,
    #[strum(serialize = "getAvailableQualityLevels")]
    AvailableQualityLevels,
    #[strum(serialize = "getAvailablePlaybackRates")]
    AvailablePlaybackRates,
    #[strum(serialize = "getVolume")]
    Volume,
    #[strum(serialize = "isMuted")]
    IsMuted,
    #[strum(serialize = "getVideoLoadedFraction")]
    VideoLoadedFraction,
    #[strum(serialize = "getVideoUrl")]
    VideoUrl,
    #[strum(serialize = "getVideoEmbedCode")]
    VideoEmbedCode,
    #[strum(serialize = "getPlayerState")]
    PlayerState,
}

impl Query {
    /// Native getter name.
    pub fn method(self) -> &'static str { self.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn rejected(cmd: &Command) -> &'static str {
        match cmd.validate() {
            Err(Error::InvalidConfig { field, .. }) => field,
            other => panic!("expected InvalidConfig for {cmd:?}, got {other:?}"),
        }
    }

    #[test]
    fn numeric_arguments_must_be_non_negative() {
        let seek = Command::SeekTo {
            seconds:          -0.5,
            allow_seek_ahead: true,
        };
        assert_eq!(rejected(&seek), "seconds");
        assert_eq!(rejected(&Command::SetPlaybackRate(-1.0)), "suggestedRate");
        assert_eq!(rejected(&Command::SetVolume(101)), "volume");

        assert!(Command::SetPlaybackRate(0.0).validate().is_ok());
        assert!(Command::SetVolume(100).validate().is_ok());
    }

    #[test]
    fn video_loads_check_target_and_range() {
        assert_eq!(rejected(&Command::LoadVideoById("".into())), "videoId");
        assert_eq!(
            rejected(&Command::CueVideoByUrl(" ".into())),
            "mediaContentUrl"
        );

        let backwards = VideoLoad::new("M7lc1UVf-VE")
            .start_seconds(30.0)
            .end_seconds(5.0)
            .build();
        assert_eq!(rejected(&Command::LoadVideoById(backwards)), "endSeconds");

        let clip = VideoLoad::new("M7lc1UVf-VE")
            .start_seconds(5.0)
            .end_seconds(30.0)
            .build();
        assert!(Command::LoadVideoById(clip).validate().is_ok());
    }

    #[test]
    fn queries_map_to_native_getters() {
        assert_eq!(Query::CurrentTime.method(), "getCurrentTime");
        assert_eq!(Query::IsMuted.method(), "isMuted");
        assert_eq!(Query::PlayerState.to_string(), "getPlayerState");
    }
}
