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

//! Seam to the externally loaded player library.

use serde_json::Value;

use crate::bridge::NativeCall;

/// Identifier the external library assigns to a constructed player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("native#{_0}")]
pub struct NativePlayerId(pub u64);

/// Untyped surface of the external player library.
///
/// Everything crossing this trait is in native form (method names and JSON
/// values); typing happens in the binding on either side of it. Implementors
/// are called on the single UI thread and must not call back into the
/// [`PlayerLibrary`](crate::PlayerLibrary) synchronously; events are reported
/// later through [`PlayerLibrary::dispatch_native`](crate::PlayerLibrary::dispatch_native).
pub trait PlayerBackend {
    /// Whether an element with `mount_id` exists for a player to attach to.
    fn has_mount(&self, mount_id: &str) -> bool;

    /// `new Player(mount_id, options)`.
    fn construct(&self, mount_id: &str, options: &Value) -> NativePlayerId;

    /// Invokes a command method. The native return value is ignored.
    fn call(&self, player: NativePlayerId, call: &NativeCall);

    /// Invokes a getter and returns its raw result.
    fn query(&self, player: NativePlayerId, method: &'static str) -> Value;

    /// Tears the player down and removes its frame from the mount point.
    fn destroy(&self, player: NativePlayerId);
}
