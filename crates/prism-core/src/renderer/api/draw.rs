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

//! Geometry submission: the description of one batched renderer draw.

use super::shader::ShaderPassTag;
use super::scene::VisibilityHandle;
use bitflags::bitflags;
use std::sync::Arc;

/// The order in which visible renderers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortingCriteria {
    /// Front-to-back with state-change minimisation, for opaque geometry.
    CommonOpaque,
    /// Back-to-front, for blended geometry.
    CommonTransparent,
}

/// The render-queue range a draw filters renderers by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderQueueRange {
    /// Opaque and alpha-tested renderers.
    Opaque,
    /// Blended renderers.
    Transparent,
}

bitflags! {
    /// Per-object data the device must provide to shaders for a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PerObjectData: u32 {
        /// Baked lightmap data.
        const LIGHTMAPS = 1 << 0;
        /// Light probe data.
        const LIGHT_PROBE = 1 << 1;
        /// Reflection probe data.
        const REFLECTION_PROBES = 1 << 2;
        /// Per-object light data (counts).
        const LIGHT_DATA = 1 << 3;
        /// Per-object light indices, resolved through the light index map.
        const LIGHT_INDICES = 1 << 4;
        /// Previous-frame transforms for motion vectors.
        const MOTION_VECTORS = 1 << 5;
    }
}

/// A request to draw every visible renderer that passes the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRenderers {
    /// The visibility set the renderers come from.
    pub visibility: VisibilityHandle,
    /// The draw order.
    pub sorting: SortingCriteria,
    /// The render-queue filter.
    pub queue: RenderQueueRange,
    /// The rendering-layer filter.
    pub rendering_layer_mask: u32,
    /// The shader passes drawn, in priority order.
    pub pass_tags: Vec<ShaderPassTag>,
    /// The per-object data the shaders need.
    pub per_object_data: PerObjectData,
    /// The compact light slot of every visible light, present with per-object lighting.
    pub light_index_map: Option<Arc<[i32]>>,
    /// Allows dynamic batching of small meshes.
    pub enable_dynamic_batching: bool,
    /// Allows GPU instancing.
    pub enable_instancing: bool,
}
