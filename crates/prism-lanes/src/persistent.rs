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

//! Long-lived device textures that are recreated only when their description changes.

use prism_core::renderer::{GraphicsDevice, ResourceError, TextureDescriptor, TextureId};

/// A single device texture owned across frames.
///
/// [`PersistentTexture::ensure`] reuses the live texture while its descriptor stays
/// compatible and recreates it otherwise. Nothing is freed implicitly: the owner
/// calls [`PersistentTexture::release`].
#[derive(Debug, Default)]
pub struct PersistentTexture {
    slot: Option<(TextureId, TextureDescriptor)>,
}

impl PersistentTexture {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure a texture matching `descriptor` exists.
    ///
    /// Returns the texture and whether it was (re)created by this call.
    pub fn ensure(
        &mut self,
        device: &dyn GraphicsDevice,
        descriptor: &TextureDescriptor,
    ) -> Result<(TextureId, bool), ResourceError> {
        if let Some((id, current)) = &self.slot {
            if current.is_compatible_with(descriptor) {
                return Ok((*id, false));
            }
            log::debug!(
                "Recreating texture {:?} ({:?} -> {:?})",
                current.label,
                current.extent_2d(),
                descriptor.extent_2d()
            );
            let stale = *id;
            self.slot = None;
            device.destroy_texture(stale)?;
        }

        let id = device.create_texture(descriptor)?;
        self.slot = Some((id, descriptor.clone()));
        Ok((id, true))
    }

    /// The live texture, if any.
    pub fn id(&self) -> Option<TextureId> {
        self.slot.as_ref().map(|(id, _)| *id)
    }

    /// The descriptor of the live texture, if any.
    pub fn descriptor(&self) -> Option<&TextureDescriptor> {
        self.slot.as_ref().map(|(_, desc)| desc)
    }

    /// Destroys the live texture. Returns `false` if the slot was already empty.
    pub fn release(&mut self, device: &dyn GraphicsDevice) -> Result<bool, ResourceError> {
        match self.slot.take() {
            Some((id, _)) => {
                device.destroy_texture(id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
