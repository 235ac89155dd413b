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

//! The temporary surfaces one camera's geometry pass renders into.

use prism_core::renderer::{CommandStream, RenderTarget, SurfaceId};

/// Handles of every temporary surface a geometry lane acquired for one camera.
///
/// Attachments that were not allocated resolve to the camera target. The set must
/// be released with [`RenderSurfaceSet::release`] before the stream is submitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderSurfaceSet {
    /// The intermediate color attachment.
    pub color: Option<SurfaceId>,
    /// The intermediate depth attachment.
    pub depth: Option<SurfaceId>,
    /// The geometry-buffer channels, in `_GBufferA.._GBufferF` order.
    pub gbuffer: Vec<SurfaceId>,
    /// The sampled copy of the color attachment.
    pub color_copy: Option<SurfaceId>,
    /// The sampled copy of the depth attachment.
    pub depth_copy: Option<SurfaceId>,
    released: bool,
}

impl RenderSurfaceSet {
    /// A set that renders straight to the camera target.
    pub fn direct() -> Self {
        Self::default()
    }

    /// The color attachment to render into.
    pub fn color_target(&self) -> RenderTarget {
        self.color
            .map_or(RenderTarget::CameraTarget, RenderTarget::Temporary)
    }

    /// The depth attachment to render into.
    pub fn depth_target(&self) -> RenderTarget {
        self.depth
            .map_or(RenderTarget::CameraTarget, RenderTarget::Temporary)
    }

    /// Every allocated surface, attachments first.
    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.color
            .iter()
            .chain(self.depth.iter())
            .chain(self.gbuffer.iter())
            .chain(self.color_copy.iter())
            .chain(self.depth_copy.iter())
            .copied()
    }

    /// The number of allocated surfaces.
    pub fn allocated_count(&self) -> usize {
        self.surfaces().count()
    }

    /// Records the release of every allocated surface. Later calls record nothing.
    pub fn release(&mut self, commands: &mut CommandStream) {
        if self.released {
            return;
        }
        let surfaces: Vec<_> = self.surfaces().collect();
        for surface in surfaces {
            commands.release_temporary(surface);
        }
        self.released = true;
    }

    /// Returns `true` once [`RenderSurfaceSet::release`] ran.
    pub fn is_released(&self) -> bool {
        self.released
    }
}
