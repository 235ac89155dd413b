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

//! The device contract the pipeline records against.

use crate::renderer::api::{CommandStream, TextureDescriptor, TextureId};
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// Optional device capabilities the pipeline checks before relying on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFeature {
    /// Direct texture-to-texture copies. Without it, copies fall back to full-screen draws.
    CopyTexture,
}

/// The device the pipeline records for.
///
/// Long-lived textures (lookup tables, temporal history) are created and destroyed
/// through this trait directly. Everything else is recorded into a
/// [`CommandStream`] and handed over with [`GraphicsDevice::submit`].
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a new long-lived texture.
    /// ## Errors
    /// * `ResourceError` - If the device cannot honour the descriptor.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a texture created with [`GraphicsDevice::create_texture`].
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle is not live.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Uploads the texels of one array layer.
    ///
    /// `data` must hold exactly one layer in the texture's format, rows tightly packed.
    fn write_texture(&self, id: TextureId, layer: u32, data: &[u8]) -> Result<(), ResourceError>;

    /// Returns `true` if the device supports `feature`.
    fn supports_feature(&self, feature: DeviceFeature) -> bool;

    /// Hands a finished command stream to the device for execution.
    fn submit(&self, commands: CommandStream);
}
