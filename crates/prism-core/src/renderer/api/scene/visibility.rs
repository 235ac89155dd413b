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

//! The result of culling a camera's view.

use crate::math::Mat4;
use crate::renderer::light::{AreaLightSettings, LightType};
use std::sync::Arc;

/// An opaque handle identifying the renderer list of one culling result.
///
/// Geometry draws reference it instead of carrying the renderer list themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibilityHandle(pub u64);

/// A light that survived culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleLight {
    /// The light's type and parameters.
    pub light: LightType,
    /// The light's local-to-world transform. Column 2 is its local +Z axis.
    pub local_to_world: Mat4,
    /// The rendering layers the light affects.
    pub rendering_layer_mask: u32,
    /// Area metadata. A spot light carrying it is shaded as an area light.
    pub area: Option<AreaLightSettings>,
}

impl VisibleLight {
    /// Creates a visible light affecting every rendering layer.
    pub fn new(light: LightType, local_to_world: Mat4) -> Self {
        Self {
            light,
            local_to_world,
            rendering_layer_mask: u32::MAX,
            area: None,
        }
    }

    /// Returns the area metadata that applies to this light, if it is shaded as an area light.
    pub fn area_settings(&self) -> Option<AreaLightSettings> {
        match self.light {
            LightType::Area(area) => Some(area.settings),
            LightType::Spot(_) => self.area,
            _ => None,
        }
    }
}

/// The renderers and lights visible to a camera this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilitySet {
    /// The handle geometry draws use to reference the renderer list.
    pub handle: VisibilityHandle,
    /// The visible lights, in culling order.
    pub visible_lights: Vec<VisibleLight>,
    /// Lights the culler tracks for per-object indexing that are not visible.
    pub offscreen_light_count: usize,
    light_index_map: Option<Arc<[i32]>>,
}

impl VisibilitySet {
    /// Creates a visibility set with the given lights.
    pub fn new(handle: VisibilityHandle, visible_lights: Vec<VisibleLight>) -> Self {
        Self {
            handle,
            visible_lights,
            offscreen_light_count: 0,
            light_index_map: None,
        }
    }

    /// The number of entries a per-object light index map must have.
    pub fn light_index_map_len(&self) -> usize {
        self.visible_lights.len() + self.offscreen_light_count
    }

    /// Publishes the per-object light index map consumed by geometry draws.
    pub fn set_light_index_map(&mut self, map: Arc<[i32]>) {
        self.light_index_map = Some(map);
    }

    /// Removes any published light index map.
    pub fn clear_light_index_map(&mut self) {
        self.light_index_map = None;
    }

    /// The published per-object light index map, if any.
    pub fn light_index_map(&self) -> Option<&Arc<[i32]>> {
        self.light_index_map.as_ref()
    }
}
