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

//! Explicit context threading for theme consumers.
//!
//! A [`Scope`] is passed from parent to child component by value. It either
//! carries a [`ThemeHandle`] (it is inside a provisioning scope) or it does
//! not, and [`use_theme`] fails fast in the latter case.

use snafu::OptionExt;
use tracing::warn;

use crate::{
    err::{ContextUnavailableSnafu, Result},
    provider::{ThemeHandle, ThemeProvider},
    setting::ThemeSetting,
};

#[derive(Clone, Debug, Default)]
pub struct Scope {
    theme: Option<ThemeHandle>,
    depth: usize,
}

impl Scope {
    /// The scope above the tree root. Nothing is provided here.
    pub fn root() -> Self { Self::default() }

    /// Scope for a nested component, inheriting everything from `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            theme: self.theme.clone(),
            depth: self.depth + 1,
        }
    }

    /// Provisions a new theme value for the subtree below the returned scope.
    ///
    /// Provisioning inside an already provisioned scope shadows the outer
    /// provider for that subtree. It is allowed but almost always a wiring
    /// mistake, so it is logged.
    #[must_use]
    pub fn provide_theme(&self, initial: ThemeSetting) -> Self {
        self.with_provider(&ThemeProvider::provision(initial))
    }

    /// Like [`Scope::provide_theme`], for a provider the caller already owns.
    #[must_use]
    pub fn with_provider(&self, provider: &ThemeProvider) -> Self {
        if self.theme.is_some() {
            warn!(depth = self.depth, "theme provider shadows an enclosing provider");
        }
        Self {
            theme: Some(provider.handle()),
            depth: self.depth + 1,
        }
    }

    /// Nesting depth below [`Scope::root`].
    pub const fn depth(&self) -> usize { self.depth }

    pub const fn is_provisioned(&self) -> bool { self.theme.is_some() }
}

/// Returns the theme capability of the nearest enclosing provider.
///
/// Fails with [`Error::ContextUnavailable`](crate::Error::ContextUnavailable)
/// on every call made outside a provisioning scope.
pub fn use_theme(scope: &Scope) -> Result<ThemeHandle> {
    scope.theme.clone().context(ContextUnavailableSnafu { depth: scope.depth })
}

/// Extension trait for reaching the theme from anything that carries a
/// [`Scope`].
pub trait ThemeExt {
    fn theme(&self) -> Result<ThemeHandle>;
}

impl ThemeExt for Scope {
    fn theme(&self) -> Result<ThemeHandle> { use_theme(self) }
}

#[cfg(test)]
mod tests {
    use mixdeck_error::{ErrorExt, StatusCode};

    use super::*;
    use crate::Error;

    #[test]
    fn unprovisioned_scope_fails_every_time() {
        let orphan = Scope::root().child().child();
        for _ in 0..3 {
            let err = use_theme(&orphan).unwrap_err();
            assert!(matches!(err, Error::ContextUnavailable { depth: 2, .. }));
            assert_eq!(err.status_code(), StatusCode::FailedPrecondition);
        }
    }

    #[test]
    fn children_inherit_the_provider() {
        let root = Scope::root().provide_theme(ThemeSetting::Light);
        let leaf = root.child().child().child();
        assert!(leaf.is_provisioned());
        assert_eq!(leaf.depth(), 4);
        assert!(leaf.theme().unwrap().same_provider(&root.theme().unwrap()));
    }

    #[test]
    fn inner_provider_shadows_outer_for_its_subtree_only() {
        let outer = Scope::root().provide_theme(ThemeSetting::Dark);
        let inner = outer.child().provide_theme(ThemeSetting::Light);

        inner.child().theme().unwrap().set(ThemeSetting::System);

        assert_eq!(outer.theme().unwrap().read(), ThemeSetting::Dark);
        assert_eq!(inner.theme().unwrap().read(), ThemeSetting::System);
    }

    #[test]
    fn caller_owned_provider_is_shared_with_scope() {
        let provider = ThemeProvider::provision(ThemeSetting::Dark);
        let scope = Scope::root().with_provider(&provider);
        scope.child().theme().unwrap().set(ThemeSetting::Light);
        assert_eq!(provider.handle().read(), ThemeSetting::Light);
    }
}
