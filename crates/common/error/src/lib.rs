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

//! Status codes shared by every mixdeck crate.
//!
//! Each crate keeps its own `snafu` error enum and implements [`ErrorExt`] so
//! callers can classify failures without matching on crate-specific variants.

use std::{any::Any, error::Error as StdError};

use serde::Serialize;
use strum::EnumProperty;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumProperty,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusCode {
    #[strum(props(caller_defect = "true"))]
    InvalidArgument,
    #[strum(props(caller_defect = "true"))]
    NotFound,
    #[strum(props(caller_defect = "true"))]
    Conflict,
    #[strum(props(caller_defect = "true"))]
    FailedPrecondition,
    #[strum(props(caller_defect = "true"))]
    ResourceExhausted,
    #[strum(props(caller_defect = "false"))]
    Internal,
    #[strum(props(caller_defect = "false"))]
    Unknown,
}

impl StatusCode {
    /// Whether the failure points at a wiring or usage mistake on the caller
    /// side rather than at the binding itself.
    pub fn is_caller_defect(self) -> bool {
        self.get_str("caller_defect")
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(false)
    }
}

pub trait ErrorExt: StdError {
    fn status_code(&self) -> StatusCode { StatusCode::Unknown }

    fn as_any(&self) -> &dyn Any;

    /// Message suitable for surfacing to the owner of the failing call.
    ///
    /// Internal failures only expose their status code.
    fn output_msg(&self) -> String
    where
        Self: Sized,
    {
        let code = self.status_code();
        if !code.is_caller_defect() {
            return format!("Internal error: {code}");
        }
        match self.root_cause() {
            Some(root) => format!("{self}: {root}"),
            None => format!("{self}"),
        }
    }

    fn root_cause(&self) -> Option<&dyn StdError>
    where
        Self: Sized,
    {
        let mut source = self.source()?;
        while let Some(next) = source.source() {
            source = next;
        }
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use snafu::{ResultExt, Snafu};

    use super::*;

    #[derive(Debug, Snafu)]
    enum Inner {
        #[snafu(display("value {value} is negative"))]
        Negative { value: i64 },
    }

    #[derive(Debug, Snafu)]
    enum Outer {
        #[snafu(display("bad argument"))]
        BadArgument { source: Inner },
        #[snafu(display("binding state corrupted"))]
        Corrupted,
    }

    impl ErrorExt for Outer {
        fn status_code(&self) -> StatusCode {
            match self {
                Self::BadArgument { .. } => StatusCode::InvalidArgument,
                Self::Corrupted => StatusCode::Internal,
            }
        }

        fn as_any(&self) -> &dyn Any { self }
    }

    fn bad_argument() -> Outer {
        let inner: Result<(), Inner> = NegativeSnafu { value: -1 }.fail();
        inner.context(BadArgumentSnafu).unwrap_err()
    }

    #[test]
    fn caller_defects_are_classified() {
        assert!(StatusCode::InvalidArgument.is_caller_defect());
        assert!(StatusCode::FailedPrecondition.is_caller_defect());
        assert!(!StatusCode::Internal.is_caller_defect());
        assert!(!StatusCode::Unknown.is_caller_defect());
    }

    #[test]
    fn status_code_round_trips_through_str() {
        assert_eq!(StatusCode::ResourceExhausted.to_string(), "resource_exhausted");
        assert_eq!(
            "not_found".parse::<StatusCode>().unwrap(),
            StatusCode::NotFound
        );
    }

    #[test]
    fn output_msg_includes_root_cause() {
        let err = bad_argument();
        assert_eq!(err.output_msg(), "bad argument: value -1 is negative");
        assert_eq!(
            err.root_cause().map(ToString::to_string).as_deref(),
            Some("value -1 is negative")
        );
    }

    #[test]
    fn output_msg_hides_internal_details() {
        let err = Outer::Corrupted;
        assert_eq!(err.output_msg(), "Internal error: internal");
        assert!(err.root_cause().is_none());
    }
}
