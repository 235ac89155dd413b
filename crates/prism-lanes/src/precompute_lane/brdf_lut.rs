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

//! The pre-integrated split-sum BRDF lookup table.

use crate::persistent::PersistentTexture;
use prism_core::math::Extent2D;
use prism_core::renderer::{
    properties, BlendMode, Command, CommandStream, FilterMode, FullscreenDraw, FullscreenProgram,
    GraphicsDevice, LoadOp, RenderTarget, ResourceError, TextureDescriptor, TextureFormat,
    TextureId,
};

/// The width and height of the table.
pub const BRDF_LUT_SIZE: u32 = 512;

/// Owns the BRDF lookup texture and records its integration pass.
#[derive(Debug, Default)]
pub struct BrdfLut {
    texture: PersistentTexture,
}

impl BrdfLut {
    /// Creates the cache without allocating anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The descriptor of the lookup texture.
    pub fn descriptor() -> TextureDescriptor {
        TextureDescriptor::render_target(
            "BRDF LUT",
            Extent2D::new(BRDF_LUT_SIZE, BRDF_LUT_SIZE),
            TextureFormat::Rgba16Float,
            FilterMode::Nearest,
        )
    }

    /// Ensures the texture, integrates into it and binds it globally.
    pub fn setup(
        &mut self,
        commands: &mut CommandStream,
        device: &dyn GraphicsDevice,
    ) -> Result<TextureId, ResourceError> {
        let (id, created) = self.texture.ensure(device, &Self::descriptor())?;
        if created {
            log::debug!("Created BRDF lookup table {id:?}");
        }
        commands.push(Command::DrawFullscreen(FullscreenDraw {
            program: FullscreenProgram::BrdfIntegration,
            source: None,
            destination: RenderTarget::Texture(id),
            load: LoadOp::DontCare,
            blend: BlendMode::OPAQUE,
        }));
        commands.set_global_texture(properties::BRDF_LUT, RenderTarget::Texture(id));
        Ok(id)
    }

    /// The live texture, if any.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture.id()
    }

    /// Destroys the texture.
    pub fn teardown(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        self.texture.release(device).map(|_| ())
    }
}
