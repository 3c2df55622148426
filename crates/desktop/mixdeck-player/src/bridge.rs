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

//! Translation between typed commands/events and the native player API.
//!
//! This is the only module that knows native method names, argument shapes
//! and payload encodings.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use snafu::{OptionExt, ResultExt};
use strum::IntoEnumIterator;

use crate::{
    command::{Command, Query, VideoLoad},
    config::PlayerConfig,
    err::{
        EncodeOptionsSnafu, MalformedEventSnafu, MalformedReplySnafu, Result, UnknownEventSnafu,
    },
    event::{EventKind, EventName},
    state::PlayerState,
};

/// One native method invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeCall {
    pub method: &'static str,
    pub args:   Vec<Value>,
}

impl NativeCall {
    fn new(method: &'static str, args: Vec<Value>) -> Self { Self { method, args } }
}

pub(crate) fn encode_command(cmd: &Command) -> NativeCall {
    match cmd {
        Command::Play => NativeCall::new("playVideo", vec![]),
        Command::Pause => NativeCall::new("pauseVideo", vec![]),
        Command::Stop => NativeCall::new("stopVideo", vec![]),
        Command::SeekTo {
            seconds,
            allow_seek_ahead,
        } => NativeCall::new("seekTo", vec![json!(seconds), json!(allow_seek_ahead)]),
        Command::LoadVideoById(load) => {
            NativeCall::new("loadVideoById", load_args("videoId", load))
        }
        Command::LoadVideoByUrl(load) => {
            NativeCall::new("loadVideoByUrl", load_args("mediaContentUrl", load))
        }
        Command::CueVideoById(load) => NativeCall::new("cueVideoById", load_args("videoId", load)),
        Command::CueVideoByUrl(load) => {
            NativeCall::new("cueVideoByUrl", load_args("mediaContentUrl", load))
        }
        Command::SetVolume(volume) => NativeCall::new("setVolume", vec![json!(volume)]),
        Command::Mute => NativeCall::new("mute", vec![]),
        Command::Unmute => NativeCall::new("unMute", vec![]),
        Command::SetPlaybackRate(rate) => NativeCall::new("setPlaybackRate", vec![json!(rate)]),
        Command::SetPlaybackQuality(quality) => {
            NativeCall::new("setPlaybackQuality", vec![json!(quality)])
        }
        Command::SetLoop(enabled) => NativeCall::new("setLoop", vec![json!(enabled)]),
        Command::SetShuffle(enabled) => NativeCall::new("setShuffle", vec![json!(enabled)]),
        Command::SetSize { width, height } => {
            NativeCall::new("setSize", vec![json!(width), json!(height)])
        }
        Command::NextVideo => NativeCall::new("nextVideo", vec![]),
        Command::PreviousVideo => NativeCall::new("previousVideo", vec![]),
    }
}

/// The native loaders accept `(target, startSeconds?)` positionally, but an
/// end time is only expressible through the object form.
fn load_args(key: &str, load: &VideoLoad) -> Vec<Value> {
    if let Some(end) = load.end_seconds {
        let mut obj = Map::new();
        obj.insert(key.to_owned(), json!(load.target));
        if let Some(start) = load.start_seconds {
            obj.insert("startSeconds".to_owned(), json!(start));
        }
        obj.insert("endSeconds".to_owned(), json!(end));
        return vec![Value::Object(obj)];
    }
    let mut args = vec![json!(load.target)];
    if let Some(start) = load.start_seconds {
        args.push(json!(start));
    }
    args
}

/// Builds the native options object. `events` lists the native event names
/// the binding wants delivered; `onReady` is always among them.
pub(crate) fn encode_options(config: &PlayerConfig) -> Result<Value> {
    let mut options = serde_json::to_value(config).context(EncodeOptionsSnafu)?;
    let events: Vec<&'static str> = EventName::iter()
        .filter(|name| *name == EventName::Ready || config.events.is_registered(*name))
        .map(EventName::as_native)
        .collect();
    if let Value::Object(map) = &mut options {
        map.insert("events".to_owned(), json!(events));
    }
    Ok(options)
}

pub(crate) fn decode_reply<T: DeserializeOwned>(query: Query, value: &Value) -> Result<T> {
    <T as serde::Deserialize>::deserialize(value).ok().context(MalformedReplySnafu {
        method: query.method(),
        value:  value.to_string(),
    })
}

pub(crate) fn decode_state(value: &Value) -> Result<PlayerState> {
    decode_reply::<i64>(Query::PlayerState, value)
        .ok()
        .and_then(PlayerState::from_code)
        .context(MalformedReplySnafu {
            method: Query::PlayerState.method(),
            value:  value.to_string(),
        })
}

pub(crate) fn decode_event(name: &str, payload: &Value) -> Result<EventKind> {
    let event = name.parse::<EventName>().ok().context(UnknownEventSnafu { name })?;
    let malformed = || MalformedEventSnafu {
        name:    event.as_native(),
        payload: payload.to_string(),
    };
    let kind = match event {
        EventName::Ready => EventKind::Ready,
        EventName::ApiChange => EventKind::ApiChange,
        EventName::StateChange => payload
            .as_i64()
            .and_then(PlayerState::from_code)
            .map(EventKind::StateChange)
            .with_context(malformed)?,
        EventName::PlaybackQualityChange => payload
            .as_str()
            .map(|quality| EventKind::PlaybackQualityChange(quality.to_owned()))
            .with_context(malformed)?,
        EventName::PlaybackRateChange => payload
            .as_f64()
            .map(EventKind::PlaybackRateChange)
            .with_context(malformed)?,
        EventName::Error => payload
            .as_i64()
            .map(|code| EventKind::Error(code.into()))
            .with_context(malformed)?,
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        config::{Dimension, PlayerEvents, PlayerVars},
        state::PlayerErrorCode,
    };

    #[test]
    fn seek_and_size_keep_argument_order() {
        let call = encode_command(&Command::SeekTo {
            seconds:          42.5,
            allow_seek_ahead: false,
        });
        assert_eq!(call, NativeCall::new("seekTo", vec![json!(42.5), json!(false)]));

        let call = encode_command(&Command::SetSize {
            width:  640,
            height: 360,
        });
        assert_eq!(call.args, vec![json!(640), json!(360)]);
    }

    #[test]
    fn unmute_uses_native_casing() {
        assert_eq!(encode_command(&Command::Unmute).method, "unMute");
    }

    #[test]
    fn loads_switch_to_object_form_with_end_time() {
        let positional = encode_command(&Command::LoadVideoById(
            VideoLoad::new("abc").start_seconds(12.0).build(),
        ));
        assert_eq!(positional.args, vec![json!("abc"), json!(12.0)]);

        let object = encode_command(&Command::CueVideoByUrl(
            VideoLoad::new("https://www.youtube.com/v/abc")
                .end_seconds(60.0)
                .build(),
        ));
        assert_eq!(object.method, "cueVideoByUrl");
        assert_eq!(
            object.args,
            vec![json!({ "mediaContentUrl": "https://www.youtube.com/v/abc", "endSeconds": 60.0 })]
        );
    }

    #[test]
    fn options_use_native_keys_and_list_subscribed_events() {
        let config = PlayerConfig::builder()
            .width(Dimension::Pixels(640))
            .height("100%")
            .video_id("M7lc1UVf-VE".to_string())
            .playback_rate(1.5)
            .player_vars(PlayerVars::builder().autoplay(1).looping(0).build())
            .events(PlayerEvents::new().on_state_change(|_| {}))
            .build();

        let options = encode_options(&config).unwrap();
        assert_eq!(
            options,
            json!({
                "width": 640,
                "height": "100%",
                "videoId": "M7lc1UVf-VE",
                "playerVars": { "autoplay": 1, "loop": 0 },
                "events": ["onReady", "onStateChange"],
            })
        );
    }

    #[test]
    fn replies_of_the_wrong_shape_are_rejected() {
        let duration: f64 = decode_reply(Query::Duration, &json!(212.3)).unwrap();
        assert!((duration - 212.3).abs() < 1e-9);
        let err = decode_reply::<bool>(Query::IsMuted, &json!("yes")).unwrap_err();
        assert!(matches!(err, Error::MalformedReply { method: "isMuted", .. }));

        assert_eq!(decode_state(&json!(2)).unwrap(), PlayerState::Paused);
        assert!(decode_state(&json!(4)).is_err());
    }

    #[test]
    fn events_decode_into_typed_payloads() {
        assert_eq!(
            decode_event("onStateChange", &json!(1)).unwrap(),
            EventKind::StateChange(PlayerState::Playing)
        );
        assert_eq!(
            decode_event("onError", &json!(150)).unwrap(),
            EventKind::Error(PlayerErrorCode::EmbedNotAllowedDisguised)
        );
        assert_eq!(
            decode_event("onPlaybackQualityChange", &json!("hd720")).unwrap(),
            EventKind::PlaybackQualityChange("hd720".into())
        );
        assert_eq!(decode_event("onReady", &Value::Null).unwrap(), EventKind::Ready);
    }

    #[test]
    fn bad_events_are_reported() {
        assert!(matches!(
            decode_event("onVolumeChange", &Value::Null),
            Err(Error::UnknownEvent { .. })
        ));
        assert!(matches!(
            decode_event("onStateChange", &json!("playing")),
            Err(Error::MalformedEvent { name: "onStateChange", .. })
        ));
    }
}
