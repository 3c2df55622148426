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

//! Colour set used to render the mixer in a given appearance.
//!
//! Groups mirror how the page is drawn: surfaces, text, the accent used by
//! active decks, and the progress bar under each player.

use crate::setting::Appearance;

/// Straight-alpha colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Builds an opaque colour from a 24-bit `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self { Self::from_hex_alpha(hex, 1.0) }

    pub fn from_hex_alpha(hex: u32, alpha: f32) -> Self {
        let channel = |shift: u32| f32::from(((hex >> shift) & 0xFF) as u8) / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: alpha.clamp(0.0, 1.0),
        }
    }

    /// Returns the colour as `0xRRGGBB`, dropping alpha.
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| u32::from((v.clamp(0.0, 1.0) * 255.0).round() as u8);
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub appearance: Appearance,

    pub background:       Rgba,
    pub surface:          Rgba,
    pub surface_elevated: Rgba,

    pub text_primary:   Rgba,
    pub text_secondary: Rgba,

    /// Highlight for the deck that currently has focus.
    pub accent: Rgba,
    pub border: Rgba,

    pub progress_track: Rgba,
    pub progress_fill:  Rgba,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            appearance:       Appearance::Dark,
            background:       Rgba::from_hex(0x0f1115),
            surface:          Rgba::from_hex(0x181b21),
            surface_elevated: Rgba::from_hex(0x232730),
            text_primary:     Rgba::from_hex(0xf2f4f8),
            text_secondary:   Rgba::from_hex(0x9aa3b2),
            accent:           Rgba::from_hex(0x6c8cff),
            border:           Rgba::from_hex(0x2c313c),
            progress_track:   Rgba::from_hex(0x3a404c),
            progress_fill:    Rgba::from_hex(0x6c8cff),
        }
    }

    pub fn light() -> Self {
        Self {
            appearance:       Appearance::Light,
            background:       Rgba::from_hex(0xfafbfc),
            surface:          Rgba::from_hex(0xffffff),
            surface_elevated: Rgba::from_hex(0xf0f2f5),
            text_primary:     Rgba::from_hex(0x14171c),
            text_secondary:   Rgba::from_hex(0x5b6472),
            accent:           Rgba::from_hex(0x3d5afe),
            border:           Rgba::from_hex(0xdde1e7),
            progress_track:   Rgba::from_hex(0xd3d8df),
            progress_fill:    Rgba::from_hex(0x3d5afe),
        }
    }

    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self::dark(),
            Appearance::Light => Self::light(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self { Self::for_appearance(Appearance::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips() {
        for hex in [0x000000, 0xffffff, 0x6c8cff, 0x0f1115] {
            assert_eq!(Rgba::from_hex(hex).to_hex(), hex);
        }
    }

    #[test]
    fn alpha_is_clamped() {
        assert!((Rgba::from_hex_alpha(0xff0000, 1.5).a - 1.0).abs() < f32::EPSILON);
        assert!(Rgba::from_hex_alpha(0xff0000, -0.2).a.abs() < f32::EPSILON);
    }

    #[test]
    fn palette_matches_requested_appearance() {
        assert_eq!(Palette::for_appearance(Appearance::Light), Palette::light());
        assert_eq!(Palette::default().appearance, Appearance::Dark);
        assert_ne!(Palette::dark().background, Palette::light().background);
    }
}
