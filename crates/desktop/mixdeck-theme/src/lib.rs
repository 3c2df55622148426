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

//! Display-mode preference shared across a component tree.
//!
//! A [`ThemeProvider`] owns the current [`ThemeSetting`] and is provisioned
//! once near the root. Components receive a [`Scope`] argument from their
//! parent and call [`use_theme`] (or [`ThemeExt::theme`]) to obtain a
//! [`ThemeHandle`] that reads and writes the provider's value:
//!
//! ```
//! use mixdeck_theme::{Scope, ThemeExt, ThemeSetting};
//!
//! let root = Scope::root().provide_theme(ThemeSetting::System);
//! let sidebar = root.child();
//! let player = root.child().child();
//!
//! sidebar.theme().unwrap().set(ThemeSetting::Dark);
//! assert_eq!(player.theme().unwrap().read(), ThemeSetting::Dark);
//! ```

mod err;
mod palette;
mod provider;
mod scope;
mod setting;

pub use err::{ContextUnavailableSnafu, Error, Result};
pub use palette::{Palette, Rgba};
pub use provider::{ThemeHandle, ThemeProvider};
pub use scope::{Scope, ThemeExt, use_theme};
pub use setting::{Appearance, ThemeSetting};
