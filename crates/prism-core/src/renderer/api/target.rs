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

//! Render-target bindings, attachment operations and blend factors.

use super::texture::{SurfaceId, TextureId};
use serde::{Deserialize, Serialize};

/// Something the pipeline can draw into or sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// A temporary surface acquired earlier in the same command stream.
    Temporary(SurfaceId),
    /// A long-lived texture owned by the device.
    Texture(TextureId),
    /// The camera's final output surface (back buffer or target texture).
    CameraTarget,
}

/// Describes what happens to an attachment's contents when it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// The existing contents are preserved.
    Load,
    /// The existing contents are undefined and will be overwritten.
    DontCare,
}

/// Describes what happens to an attachment's contents when it is unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// The results are stored to the attachment's memory.
    Store,
    /// The results are discarded.
    Discard,
}

/// A full render-target binding: one or more color attachments and an optional depth one.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetBinding {
    /// The color attachments, in slot order.
    pub colors: Vec<RenderTarget>,
    /// The depth attachment, if any.
    pub depth: Option<RenderTarget>,
    /// The load operation applied to every attachment.
    pub load: LoadOp,
    /// The store operation applied to every attachment.
    pub store: StoreOp,
}

impl RenderTargetBinding {
    /// Binds a single color attachment with a depth attachment.
    pub fn color_depth(color: RenderTarget, depth: RenderTarget, load: LoadOp) -> Self {
        Self {
            colors: vec![color],
            depth: Some(depth),
            load,
            store: StoreOp::Store,
        }
    }

    /// Binds a single color attachment without depth.
    pub fn color_only(color: RenderTarget, load: LoadOp) -> Self {
        Self {
            colors: vec![color],
            depth: None,
            load,
            store: StoreOp::Store,
        }
    }
}

/// A pixel rectangle of the output surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

/// A blend factor applied to the source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// The source alpha.
    SrcAlpha,
    /// `1.0 - source alpha`
    OneMinusSrcAlpha,
}

/// A (source, destination) blend-factor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendMode {
    /// The factor applied to the incoming color.
    pub source: BlendFactor,
    /// The factor applied to the color already in the target.
    pub destination: BlendFactor,
}

impl BlendMode {
    /// The opaque copy `(One, Zero)`.
    pub const OPAQUE: Self = Self {
        source: BlendFactor::One,
        destination: BlendFactor::Zero,
    };

    /// Returns the load operation a draw with this blend needs on its target.
    ///
    /// A destination factor of `Zero` never reads the target, so its previous
    /// contents can be discarded.
    pub fn target_load_op(&self) -> LoadOp {
        if self.destination == BlendFactor::Zero {
            LoadOp::DontCare
        } else {
            LoadOp::Load
        }
    }
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::OPAQUE
    }
}
