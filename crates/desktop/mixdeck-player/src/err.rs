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
    #[snafu(display("no mount point with id {mount_id:?}"))]
    MountNotFound {
        mount_id: String,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },
    #[snafu(display("mount point {mount_id:?} already hosts a live player"))]
    DuplicateMount {
        mount_id: String,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },
    #[snafu(display("invalid value for `{field}`: {reason}"))]
    InvalidConfig {
        field:  &'static str,
        reason: String,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("player on {mount_id:?} has been destroyed"))]
    HandleDestroyed {
        mount_id: String,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },
    #[snafu(display("{capacity} player creations already waiting for the library"))]
    PendingQueueFull {
        capacity: usize,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },
    #[snafu(display("player library was dropped before {mount_id:?} could be created"))]
    LibraryDropped {
        mount_id: String,
        #[snafu(implicit)]
        loc:      snafu::Location,
    },
    #[snafu(display("unexpected reply from {method}: {value}"))]
    MalformedReply {
        method: &'static str,
        value:  String,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
    #[snafu(display("unknown player event {name:?}"))]
    UnknownEvent {
        name: String,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },
    #[snafu(display("undecodable payload for {name}: {payload}"))]
    MalformedEvent {
        name:    &'static str,
        payload: String,
        #[snafu(implicit)]
        loc:     snafu::Location,
    },
    #[snafu(display("failed to encode player options"))]
    EncodeOptions {
        source: serde_json::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

impl ErrorExt for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MountNotFound { .. } => StatusCode::NotFound,
            Self::DuplicateMount { .. } => StatusCode::Conflict,
            Self::InvalidConfig { .. } => StatusCode::InvalidArgument,
            Self::HandleDestroyed { .. } | Self::LibraryDropped { .. } => {
                StatusCode::FailedPrecondition
            }
            Self::PendingQueueFull { .. } => StatusCode::ResourceExhausted,
            Self::MalformedReply { .. }
            | Self::UnknownEvent { .. }
            | Self::MalformedEvent { .. }
            | Self::EncodeOptions { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}
