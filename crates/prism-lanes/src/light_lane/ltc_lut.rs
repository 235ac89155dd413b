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

//! The linearly-transformed-cosines lookup table used to shade area lights.
//!
//! The table is a 64x64 texture array. Layer 0 holds the inverse GGX transform,
//! layer 1 the inverse diffuse transform, layer 2 is reserved. Each texel packs
//! the four non-trivial coefficients `(m00, m02, m11, m20)` of a row-major inverse
//! matrix, indexed by roughness along X and `sqrt(1 - cos theta)` along Y.

use crate::persistent::PersistentTexture;
use prism_core::math::Extent2D;
use prism_core::renderer::{
    properties, CommandStream, FilterMode, GraphicsDevice, RenderTarget, ResourceError,
    TextureDescriptor, TextureDimension, TextureFormat, TextureId, TextureUsage,
};
use thiserror::Error;

/// The width and height of each table layer.
pub const LTC_LUT_SIZE: u32 = 64;
/// The number of layers in the table.
pub const LTC_LUT_LAYERS: u32 = 3;

const TEXELS_PER_LAYER: usize = (LTC_LUT_SIZE * LTC_LUT_SIZE) as usize;

/// Errors raised while preparing the area-light lookup table.
#[derive(Debug, Error)]
pub enum LutError {
    /// A fitted table does not have one matrix per texel.
    #[error("LTC table '{table}' has {actual} matrices, expected {expected}")]
    InvalidTableSize {
        /// The table name.
        table: &'static str,
        /// The required number of matrices.
        expected: usize,
        /// The supplied number of matrices.
        actual: usize,
    },
}

/// Row-major 3x3 inverse LTC matrices, one per texel.
#[derive(Debug, Clone, PartialEq)]
pub struct LtcTables {
    /// Inverse transforms fitted to the GGX specular lobe.
    pub ggx: Vec<[f32; 9]>,
    /// Inverse transforms fitted to the diffuse lobe.
    pub diffuse: Vec<[f32; 9]>,
}

impl LtcTables {
    /// Builds an analytic isotropic approximation of the fitted tables.
    ///
    /// The GGX inverse scales the lobe by `1 / alpha` and skews it towards the
    /// reflection direction at grazing angles. The diffuse lobe is the cosine
    /// itself, so its inverse is the identity.
    pub fn analytic() -> Self {
        let n = LTC_LUT_SIZE as usize;
        let mut ggx = Vec::with_capacity(TEXELS_PER_LAYER);
        for row in 0..n {
            let v = row as f32 / (n - 1) as f32;
            let cos_theta = (1.0 - v * v).max(0.0).sqrt();
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
            for column in 0..n {
                let roughness = column as f32 / (n - 1) as f32;
                let alpha = (roughness * roughness).max(1e-3);
                let inv_alpha = 1.0 / alpha;
                let skew = -sin_theta * (1.0 - roughness) * inv_alpha;
                ggx.push([
                    inv_alpha, 0.0, skew, //
                    0.0, inv_alpha, 0.0, //
                    0.0, 0.0, 1.0,
                ]);
            }
        }
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        Self {
            ggx,
            diffuse: vec![identity; TEXELS_PER_LAYER],
        }
    }

    fn validate(&self) -> Result<(), LutError> {
        for (table, data) in [("ggx", &self.ggx), ("diffuse", &self.diffuse)] {
            if data.len() != TEXELS_PER_LAYER {
                return Err(LutError::InvalidTableSize {
                    table,
                    expected: TEXELS_PER_LAYER,
                    actual: data.len(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LtcTables {
    fn default() -> Self {
        Self::analytic()
    }
}

/// Packs the non-trivial coefficients of a row-major inverse matrix into a texel.
fn pack_texel(m: &[f32; 9]) -> [f32; 4] {
    [m[0], m[2], m[4], m[6]]
}

/// The lazily-built area-light lookup table.
///
/// Built on first use by [`LtcAreaLightLut::ensure`], then cached until
/// [`LtcAreaLightLut::teardown`].
#[derive(Debug)]
pub struct LtcAreaLightLut {
    tables: LtcTables,
    texture: PersistentTexture,
}

impl Default for LtcAreaLightLut {
    fn default() -> Self {
        Self {
            tables: LtcTables::analytic(),
            texture: PersistentTexture::new(),
        }
    }
}

impl LtcAreaLightLut {
    /// Creates a lookup table built from the analytic approximation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lookup table built from fitted tables.
    pub fn with_tables(tables: LtcTables) -> Result<Self, LutError> {
        tables.validate()?;
        Ok(Self {
            tables,
            texture: PersistentTexture::new(),
        })
    }

    /// The texture descriptor of the table.
    pub fn descriptor() -> TextureDescriptor {
        TextureDescriptor {
            label: Some("LTC Area Light LUT".into()),
            size: Extent2D::new(LTC_LUT_SIZE, LTC_LUT_SIZE).with_layers(LTC_LUT_LAYERS),
            dimension: TextureDimension::D2Array,
            format: TextureFormat::Rgba32Float,
            filter: FilterMode::Linear,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        }
    }

    /// Builds and uploads the table if it does not exist yet.
    pub fn ensure(&mut self, device: &dyn GraphicsDevice) -> Result<TextureId, ResourceError> {
        let (id, created) = self.texture.ensure(device, &Self::descriptor())?;
        if created {
            let layers: [Vec<[f32; 4]>; 3] = [
                self.tables.ggx.iter().map(pack_texel).collect(),
                self.tables.diffuse.iter().map(pack_texel).collect(),
                vec![[0.0; 4]; TEXELS_PER_LAYER],
            ];
            let uploaded = layers.iter().enumerate().try_for_each(|(layer, texels)| {
                device.write_texture(id, layer as u32, bytemuck::cast_slice(texels))
            });
            if let Err(err) = uploaded {
                // A partially written table must not stay cached.
                self.texture.release(device)?;
                return Err(err);
            }
            log::info!("Built LTC area-light lookup table {id:?}");
        }
        Ok(id)
    }

    /// Binds the table globally, if it exists.
    pub fn bind(&self, commands: &mut CommandStream) {
        if let Some(id) = self.texture.id() {
            commands.set_global_texture(properties::LTC_DATA, RenderTarget::Texture(id));
        }
    }

    /// The live table texture, if built.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture.id()
    }

    /// Destroys the table. It is rebuilt on the next [`LtcAreaLightLut::ensure`].
    pub fn teardown(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        if self.texture.release(device)? {
            log::debug!("Released LTC area-light lookup table");
        }
        Ok(())
    }
}
