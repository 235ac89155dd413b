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

//! Defines data structures related to GPU textures and render surfaces.

use crate::math::{Extent2D, Extent3D};
use bitflags::bitflags;
use std::borrow::Cow;

/// An opaque handle to a long-lived GPU texture owned by a [`GraphicsDevice`].
///
/// [`GraphicsDevice`]: crate::renderer::traits::GraphicsDevice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a temporary render surface.
///
/// Temporary surfaces are acquired and released through the command stream and
/// never outlive the camera render call that acquired them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A two-dimensional texture.
    D2,
    /// An array of two-dimensional layers.
    D2Array,
}

/// Defines the filtering mode used when the texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation between the four nearest texels.
    Linear,
}

/// The texel formats the pipeline allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit unsigned normalized RGBA. The default low-dynamic-range color format.
    Rgba8Unorm,
    /// 16-bit float RGBA. The default high-dynamic-range color format.
    Rgba16Float,
    /// 32-bit float RGBA.
    Rgba32Float,
    /// 32-bit float depth.
    Depth32Float,
}

impl TextureFormat {
    /// The default color format for the given dynamic range.
    pub const fn default_color(hdr: bool) -> Self {
        if hdr {
            TextureFormat::Rgba16Float
        } else {
            TextureFormat::Rgba8Unorm
        }
    }

    /// Returns the size in bytes of a single texel.
    pub const fn bytes_per_texel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Depth32Float => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns `true` if this is a depth format.
    pub const fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }
}

bitflags! {
    /// A set of flags describing the allowed usages of a texture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// The texture can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The texture can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The texture can be bound in a shader for sampling.
        const TEXTURE_BINDING = 1 << 2;
        /// The texture can be used as a color attachment.
        const RENDER_ATTACHMENT = 1 << 3;
        /// The texture can be used as a depth attachment.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 4;
    }
}

/// A descriptor used to create a texture or acquire a temporary surface.
///
/// Two descriptors compare equal when every field matches; caches use this to
/// decide whether an existing resource can be reused.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    /// An optional debug label.
    pub label: Option<Cow<'static, str>>,
    /// The dimensions (width, height, layers) of the texture.
    pub size: Extent3D,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The format of the texels in the texture.
    pub format: TextureFormat,
    /// The filtering applied when the texture is sampled.
    pub filter: FilterMode,
    /// A bitmask of [`TextureUsage`] flags describing how the texture will be used.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Describes a sampled 2D render target of the given size and format.
    pub fn render_target(
        label: impl Into<Cow<'static, str>>,
        size: Extent2D,
        format: TextureFormat,
        filter: FilterMode,
    ) -> Self {
        let attachment = if format.is_depth() {
            TextureUsage::DEPTH_STENCIL_ATTACHMENT
        } else {
            TextureUsage::RENDER_ATTACHMENT
        };
        Self {
            label: Some(label.into()),
            size: size.with_layers(1),
            dimension: TextureDimension::D2,
            format,
            filter,
            usage: attachment
                | TextureUsage::TEXTURE_BINDING
                | TextureUsage::COPY_SRC
                | TextureUsage::COPY_DST,
        }
    }

    /// Returns the 2D extent of a single layer.
    pub fn extent_2d(&self) -> Extent2D {
        Extent2D::new(self.size.width, self.size.height)
    }

    /// Returns `true` if `other` describes a resource this one can stand in for.
    ///
    /// Labels are ignored; size, format, filter, dimension and usage must match.
    pub fn is_compatible_with(&self, other: &TextureDescriptor) -> bool {
        self.size == other.size
            && self.dimension == other.dimension
            && self.format == other.format
            && self.filter == other.filter
            && self.usage == other.usage
    }

    /// Returns the byte size of one layer of this texture.
    pub fn layer_size_in_bytes(&self) -> usize {
        self.size.width as usize * self.size.height as usize * self.format.bytes_per_texel() as usize
    }
}
