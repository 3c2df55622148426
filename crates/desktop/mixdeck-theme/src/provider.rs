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

//! Owner of the shared theme value and the capability handed to consumers.

use std::{cell::Cell, fmt, rc::Rc};

use tracing::debug;

use crate::{
    palette::Palette,
    setting::{Appearance, ThemeSetting},
};

/// Root-level owner of the current [`ThemeSetting`].
///
/// There is one value per provider. Every [`ThemeHandle`] obtained from it
/// (directly or through a [`Scope`](crate::Scope)) points at that value, so a
/// write through any handle is visible to all of them on their next read.
pub struct ThemeProvider {
    handle: ThemeHandle,
}

impl ThemeProvider {
    /// Establishes the shared value with `initial`.
    pub fn provision(initial: ThemeSetting) -> Self {
        debug!(%initial, "theme provisioned");
        Self {
            handle: ThemeHandle {
                current: Rc::new(Cell::new(initial)),
            },
        }
    }

    /// Capability to read and write this provider's value.
    pub fn handle(&self) -> ThemeHandle { self.handle.clone() }
}

impl fmt::Debug for ThemeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeProvider")
            .field("current", &self.handle.read())
            .finish()
    }
}

/// Read/write access to a provider's theme value.
///
/// Cloning a handle never copies the value.
#[derive(Clone)]
pub struct ThemeHandle {
    current: Rc<Cell<ThemeSetting>>,
}

impl ThemeHandle {
    pub fn read(&self) -> ThemeSetting { self.current.get() }

    /// Replaces the value. There is no batching: the next `read` through any
    /// handle of the same provider returns `next`.
    pub fn set(&self, next: ThemeSetting) {
        let prev = self.current.replace(next);
        if prev != next {
            debug!(%prev, %next, "theme changed");
        }
    }

    /// Current value with `System` collapsed onto the host `system`
    /// appearance.
    pub fn resolved(&self, system: Appearance) -> Appearance { self.read().resolve(system) }

    pub fn palette(&self, system: Appearance) -> Palette {
        Palette::for_appearance(self.resolved(system))
    }

    /// Whether both handles were obtained from the same provider.
    pub fn same_provider(&self, other: &Self) -> bool { Rc::ptr_eq(&self.current, &other.current) }
}

impl fmt::Debug for ThemeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ThemeHandle").field(&self.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_across_handles() {
        let provider = ThemeProvider::provision(ThemeSetting::Light);
        let a = provider.handle();
        let b = provider.handle();

        let writes = [
            ThemeSetting::Dark,
            ThemeSetting::System,
            ThemeSetting::System,
            ThemeSetting::Light,
            ThemeSetting::Dark,
        ];
        for (i, next) in writes.into_iter().enumerate() {
            let writer = if i % 2 == 0 { &a } else { &b };
            writer.set(next);
            assert_eq!(a.read(), next);
            assert_eq!(b.read(), next);
        }
    }

    #[test]
    fn separate_providers_do_not_share_state() {
        let first = ThemeProvider::provision(ThemeSetting::Dark);
        let second = ThemeProvider::provision(ThemeSetting::Dark);
        second.handle().set(ThemeSetting::Light);

        assert_eq!(first.handle().read(), ThemeSetting::Dark);
        assert!(!first.handle().same_provider(&second.handle()));
        assert!(first.handle().same_provider(&first.handle()));
    }

    #[test]
    fn palette_follows_resolved_appearance() {
        let handle = ThemeProvider::provision(ThemeSetting::System).handle();
        assert_eq!(handle.palette(Appearance::Light), Palette::light());

        handle.set(ThemeSetting::Dark);
        assert_eq!(handle.resolved(Appearance::Light), Appearance::Dark);
        assert_eq!(handle.palette(Appearance::Light), Palette::dark());
    }
}
