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

//! Binding-wide settings and per-player creation options.

use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use snafu::ensure;

use crate::{
    err::{InvalidConfigSnafu, Result},
    event::{EventName, PlayerEvent},
};

/// What to do with events that arrive for a player before its `onReady`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyEventPolicy {
    /// Hold them and replay them, in order, right after `ready`.
    #[default]
    Buffer,
    /// Discard them.
    Drop,
}

/// Settings for a [`PlayerLibrary`](crate::PlayerLibrary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault, bon::Builder)]
#[serde(default)]
pub struct BindingConfig {
    /// Upper bound on `create` calls queued while the library loads.
    #[default = 64]
    #[builder(default = 64, getter)]
    pub max_pending_creates: usize,

    #[builder(default, getter)]
    pub early_events: EarlyEventPolicy,

    /// Per-player cap on buffered early events; the oldest are kept.
    #[default = 32]
    #[builder(default = 32, getter)]
    pub max_early_events: usize,
}

/// Width or height as accepted by the native constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(u32),
    /// Any CSS length, e.g. `"100%"`.
    Css(String),
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self { Self::Pixels(px) }
}

impl From<&str> for Dimension {
    fn from(css: &str) -> Self { Self::Css(css.to_owned()) }
}

/// Native `playerVars`, kept in their raw wire form.
///
/// Values come from untyped host input, so nothing here is trusted until
/// [`PlayerVars::validate`] has accepted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct PlayerVars {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoplay:        Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_load_policy:  Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color:           Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls:        Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disablekb:       Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enablejsapi:     Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end:             Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs:              Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hl:              Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv_load_policy:  Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list:            Option<String>,
    #[serde(rename = "listType", skip_serializing_if = "Option::is_none")]
    pub list_type:       Option<String>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub looping:         Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modestbranding:  Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin:          Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playsinline:     Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel:             Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start:           Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_referrer: Option<String>,
}

const TOGGLE: &[i64] = &[0, 1];

impl PlayerVars {
    /// Checks every set value against its documented domain.
    pub fn validate(&self) -> Result<()> {
        one_of("autoplay", self.autoplay, TOGGLE)?;
        one_of("cc_load_policy", self.cc_load_policy, &[1])?;
        one_of("controls", self.controls, &[0, 1, 2])?;
        one_of("disablekb", self.disablekb, TOGGLE)?;
        one_of("enablejsapi", self.enablejsapi, TOGGLE)?;
        one_of("fs", self.fs, TOGGLE)?;
        one_of("iv_load_policy", self.iv_load_policy, &[1, 3])?;
        one_of("loop", self.looping, TOGGLE)?;
        one_of("modestbranding", self.modestbranding, &[1])?;
        one_of("playsinline", self.playsinline, TOGGLE)?;
        one_of("rel", self.rel, TOGGLE)?;

        str_one_of("color", self.color.as_deref(), &["red", "white"])?;
        str_one_of(
            "listType",
            self.list_type.as_deref(),
            &["playlist", "search", "user_uploads"],
        )?;

        if let Some(start) = self.start {
            non_negative("start", start)?;
        }
        if let Some(end) = self.end {
            non_negative("end", end)?;
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            ensure!(
                end > start,
                InvalidConfigSnafu {
                    field:  "end",
                    reason: format!("{end} does not come after start {start}"),
                }
            );
        }
        Ok(())
    }
}

/// Callback invoked with each delivered event.
pub type EventCallback = Rc<dyn Fn(&PlayerEvent)>;

/// Lifecycle callbacks registered at creation.
///
/// ```
/// use mixdeck_player::PlayerEvents;
///
/// let events = PlayerEvents::new()
///     .on_ready(|event| event.target.play().unwrap())
///     .on_error(|event| eprintln!("{:?}", event.kind));
/// assert!(events.is_registered(mixdeck_player::EventName::Ready));
/// ```
#[derive(Clone, Default)]
pub struct PlayerEvents {
    on_ready:                   Option<EventCallback>,
    on_state_change:            Option<EventCallback>,
    on_playback_quality_change: Option<EventCallback>,
    on_playback_rate_change:    Option<EventCallback>,
    on_error:                   Option<EventCallback>,
    on_api_change:              Option<EventCallback>,
}

impl PlayerEvents {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn on_ready(mut self, f: impl Fn(&PlayerEvent) + 'static) -> Self {
        self.on_ready = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_state_change(mut self, f: impl Fn(&PlayerEvent) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_playback_quality_change(mut self, f: impl Fn(&PlayerEvent) + 'static) -> Self {
        self.on_playback_quality_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_playback_rate_change(mut self, f: impl Fn(&PlayerEvent) + 'static) -> Self {
        self.on_playback_rate_change = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&PlayerEvent) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_api_change(mut self, f: impl Fn(&PlayerEvent) + 'static) -> Self {
        self.on_api_change = Some(Rc::new(f));
        self
    }

    pub const fn callback(&self, name: EventName) -> Option<&EventCallback> {
        match name {
            EventName::Ready => self.on_ready.as_ref(),
            EventName::StateChange => self.on_state_change.as_ref(),
            EventName::PlaybackQualityChange => self.on_playback_quality_change.as_ref(),
            EventName::PlaybackRateChange => self.on_playback_rate_change.as_ref(),
            EventName::Error => self.on_error.as_ref(),
            EventName::ApiChange => self.on_api_change.as_ref(),
        }
    }

    pub const fn is_registered(&self, name: EventName) -> bool { self.callback(name).is_some() }
}

impl fmt::Debug for PlayerEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for name in <EventName as strum::IntoEnumIterator>::iter() {
            if self.is_registered(name) {
                set.entry(&name);
            }
        }
        set.finish()
    }
}

/// Everything needed to construct one embedded player.
#[derive(Debug, Clone, Default, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub width:         Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub height:        Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id:      Option<String>,
    /// Rate applied right after creation; not part of the native options.
    #[serde(skip_serializing)]
    pub playback_rate: Option<f64>,
    #[serde(default)]
    #[builder(default)]
    pub player_vars:   PlayerVars,
    #[serde(skip)]
    #[builder(default)]
    pub events:        PlayerEvents,
}

impl PlayerConfig {
    /// Rejects anything the native player would misinterpret, before it is
    /// forwarded.
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.playback_rate {
            non_negative("playbackRate", rate)?;
        }
        if let Some(video_id) = &self.video_id {
            ensure!(
                !video_id.trim().is_empty(),
                InvalidConfigSnafu {
                    field:  "videoId",
                    reason: "must not be blank",
                }
            );
        }
        dimension("width", self.width.as_ref())?;
        dimension("height", self.height.as_ref())?;
        self.player_vars.validate()
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        InvalidConfigSnafu {
            field,
            reason: format!("{value} is not a finite non-negative number"),
        }
    );
    Ok(())
}

fn one_of(field: &'static str, value: Option<i64>, allowed: &[i64]) -> Result<()> {
    let Some(value) = value else { return Ok(()) };
    ensure!(
        allowed.contains(&value),
        InvalidConfigSnafu {
            field,
            reason: format!("{value} is not one of {allowed:?}"),
        }
    );
    Ok(())
}

fn str_one_of(field: &'static str, value: Option<&str>, allowed: &[&str]) -> Result<()> {
    let Some(value) = value else { return Ok(()) };
    ensure!(
        allowed.contains(&value),
        InvalidConfigSnafu {
            field,
            reason: format!("{value:?} is not one of {allowed:?}"),
        }
    );
    Ok(())
}

fn dimension(field: &'static str, value: Option<&Dimension>) -> Result<()> {
    if let Some(Dimension::Css(css)) = value {
        ensure!(
            !css.trim().is_empty(),
            InvalidConfigSnafu {
                field,
                reason: "must not be blank",
            }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Error;

    fn invalid_field(result: Result<()>) -> &'static str {
        match result {
            Err(Error::InvalidConfig { field, .. }) => field,
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn documented_values_pass() {
        let vars = PlayerVars::builder()
            .autoplay(1)
            .controls(2)
            .iv_load_policy(3)
            .color("white".to_string())
            .list_type("user_uploads".to_string())
            .start(10.0)
            .end(20.0)
            .build();
        assert!(vars.validate().is_ok());
    }

    #[test]
    fn out_of_range_flags_are_rejected() {
        let cases = [
            (PlayerVars::builder().autoplay(2).build(), "autoplay"),
            (PlayerVars::builder().controls(-1).build(), "controls"),
            (PlayerVars::builder().cc_load_policy(0).build(), "cc_load_policy"),
            (PlayerVars::builder().iv_load_policy(2).build(), "iv_load_policy"),
            (PlayerVars::builder().looping(5).build(), "loop"),
            (PlayerVars::builder().color("blue".to_string()).build(), "color"),
            (PlayerVars::builder().list_type("channel".to_string()).build(), "listType"),
            (PlayerVars::builder().start(-3.0).build(), "start"),
            (PlayerVars::builder().start(30.0).end(10.0).build(), "end"),
        ];
        for (vars, field) in cases {
            assert_eq!(invalid_field(vars.validate()), field);
        }
    }

    #[test]
    fn negative_or_nan_playback_rate_is_rejected() {
        for rate in [-1.0, f64::NAN, f64::INFINITY] {
            let config = PlayerConfig::builder().playback_rate(rate).build();
            assert_eq!(invalid_field(config.validate()), "playbackRate");
        }
        let ok = PlayerConfig::builder().playback_rate(0.0).build();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn blank_video_id_and_dimensions_are_rejected() {
        let config = PlayerConfig::builder().video_id("  ".to_string()).build();
        assert_eq!(invalid_field(config.validate()), "videoId");

        let config = PlayerConfig::builder().width("").build();
        assert_eq!(invalid_field(config.validate()), "width");
    }

    #[test]
    fn deserializes_native_option_shape() {
        let config: PlayerConfig = serde_json::from_value(json!({
            "width": 640,
            "height": "100%",
            "videoId": "M7lc1UVf-VE",
            "playerVars": { "autoplay": 1, "loop": 1, "listType": "playlist" }
        }))
        .unwrap();

        assert_eq!(config.width, Some(Dimension::Pixels(640)));
        assert_eq!(config.height, Some(Dimension::Css("100%".into())));
        assert_eq!(config.player_vars.looping, Some(1));
        assert_eq!(config.player_vars.list_type.as_deref(), Some("playlist"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn untyped_input_with_bad_flag_fails_validation() {
        let config: PlayerConfig =
            serde_json::from_value(json!({ "playerVars": { "disablekb": 9 } })).unwrap();
        assert_eq!(invalid_field(config.validate()), "disablekb");
    }

    #[test]
    fn binding_config_defaults() {
        let config = BindingConfig::default();
        assert_eq!(config, BindingConfig::builder().build());
        assert_eq!(config.max_pending_creates, 64);
        assert_eq!(config.early_events, EarlyEventPolicy::Buffer);

        let parsed: BindingConfig = serde_json::from_str(r#"{"early_events":"drop"}"#).unwrap();
        assert_eq!(parsed.early_events, EarlyEventPolicy::Drop);
        assert_eq!(parsed.max_early_events, 32);
    }

    #[test]
    fn events_debug_lists_registered_callbacks() {
        let events = PlayerEvents::new().on_ready(|_| {}).on_error(|_| {});
        assert_eq!(format!("{events:?}"), "{Ready, Error}");
    }
}
