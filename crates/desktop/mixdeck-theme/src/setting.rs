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

use serde::{Deserialize, Serialize};

/// User-facing display-mode preference.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThemeSetting {
    Dark,
    Light,
    /// Follow whatever appearance the host platform reports.
    #[default]
    System,
}

/// Concrete appearance a theme resolves to once `System` is taken into
/// account.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Appearance {
    #[default]
    Dark,
    Light,
}

impl ThemeSetting {
    /// Collapses the preference into an appearance, using `system` for
    /// [`ThemeSetting::System`].
    pub const fn resolve(self, system: Appearance) -> Appearance {
        match self {
            Self::Dark => Appearance::Dark,
            Self::Light => Appearance::Light,
            Self::System => system,
        }
    }
}

impl From<Appearance> for ThemeSetting {
    fn from(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self::Dark,
            Appearance::Light => Self::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn explicit_settings_ignore_system_appearance() {
        for system in [Appearance::Dark, Appearance::Light] {
            assert_eq!(ThemeSetting::Dark.resolve(system), Appearance::Dark);
            assert_eq!(ThemeSetting::Light.resolve(system), Appearance::Light);
            assert_eq!(ThemeSetting::System.resolve(system), system);
        }
    }

    #[test]
    fn textual_form_is_lowercase() {
        let names: Vec<String> = ThemeSetting::iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["dark", "light", "system"]);
        assert_eq!("light".parse::<ThemeSetting>().unwrap(), ThemeSetting::Light);
        assert!("sepia".parse::<ThemeSetting>().is_err());
    }

    #[test]
    fn serde_uses_the_same_names() {
        assert_eq!(
            serde_json::to_string(&ThemeSetting::System).unwrap(),
            "\"system\""
        );
        let parsed: ThemeSetting = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(parsed, ThemeSetting::Dark);
    }

    #[test]
    fn default_follows_the_platform() {
        assert_eq!(ThemeSetting::default(), ThemeSetting::System);
        assert_eq!(ThemeSetting::from(Appearance::Light), ThemeSetting::Light);
    }
}
