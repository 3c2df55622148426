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

use std::any::Any;

use mixdeck_error::{ErrorExt, StatusCode};
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A consumer asked for the theme without an enclosing provider. There is
    /// no fallback theme.
    #[snafu(display("theme accessed outside of a ThemeProvider scope (depth {depth})"))]
    ContextUnavailable {
        depth: usize,
        #[snafu(implicit)]
        loc:   snafu::Location,
    },
}

impl ErrorExt for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ContextUnavailable { .. } => StatusCode::FailedPrecondition,
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}
