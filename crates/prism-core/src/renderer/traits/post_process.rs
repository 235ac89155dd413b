// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The post-process collaborator.

use crate::math::Extent2D;
use crate::renderer::api::{Camera, CommandStream, RenderTarget};

/// A post-process stack that composites the intermediate color onto the camera target.
pub trait PostProcessStack: Send {
    /// Prepares the stack for a camera. Called before [`PostProcessStack::is_active`].
    fn setup(&mut self, camera: &Camera, buffer_size: Extent2D, use_hdr: bool);

    /// Returns `true` if the stack will composite this camera.
    fn is_active(&self) -> bool;

    /// Records the stack's passes, reading `source` and writing the camera target.
    fn composite(&mut self, commands: &mut CommandStream, source: RenderTarget);
}
